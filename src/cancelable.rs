//! Futures whose outcome can be discarded after the fact.
//!
//! A [`CancelablePromise`] wraps an operation that is already underway from
//! the caller's point of view. Canceling never interrupts the operation: the
//! wrapper keeps driving it to completion and only decides, at the moment the
//! outcome is observed, whether to surface it or [`CancelError::Canceled`].
//!
//! State machine (single `AtomicU8`):
//!
//! ```text
//! PENDING ──cancel()──▶ CANCEL_REQUESTED ──settle──▶ CANCELED
//!    │
//!    └──settle──▶ RESOLVED | REJECTED
//! ```
//!
//! The latch is sampled exactly once, on the poll that sees the operation
//! finish. A value the operation produced earlier but that has not been
//! observed yet is still discarded if `cancel()` got in first.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

const PENDING: u8 = 0;
const CANCEL_REQUESTED: u8 = 1;
const RESOLVED: u8 = 2;
const REJECTED: u8 = 3;
const CANCELED: u8 = 4;

/// Observable state of a [`CancelablePromise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelableState {
    /// Not settled yet (a cancel request may be latched).
    Pending,
    Resolved,
    Rejected,
    Canceled,
}

/// Failure side of a settled [`CancelablePromise`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CancelError<E> {
    /// Cancel was requested before the outcome was observed; the real outcome was dropped.
    #[error("operation canceled")]
    Canceled,
    /// The operation itself failed.
    #[error("{0}")]
    Failed(E),
}

impl<E> CancelError<E> {
    pub fn is_canceled(&self) -> bool {
        matches!(self, CancelError::Canceled)
    }

    /// The operation's own error, if that is what settled the promise.
    pub fn into_failure(self) -> Option<E> {
        match self {
            CancelError::Failed(e) => Some(e),
            CancelError::Canceled => None,
        }
    }
}

/// Cloneable handle that can cancel a promise while it is being awaited elsewhere.
#[derive(Clone)]
pub struct Canceler {
    state: Arc<AtomicU8>,
}

impl Canceler {
    fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(PENDING)),
        }
    }

    /// Latch a cancel request. Returns `true` if the promise will settle as
    /// canceled, `false` if it had already settled (the call then has no effect).
    pub fn cancel(&self) -> bool {
        match self.state.compare_exchange(
            PENDING,
            CANCEL_REQUESTED,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                tracing::debug!("cancel requested for pending operation");
                true
            }
            Err(CANCEL_REQUESTED) => true,
            Err(_) => false,
        }
    }

    pub fn state(&self) -> CancelableState {
        match self.state.load(Ordering::Acquire) {
            PENDING | CANCEL_REQUESTED => CancelableState::Pending,
            RESOLVED => CancelableState::Resolved,
            REJECTED => CancelableState::Rejected,
            _ => CancelableState::Canceled,
        }
    }

    /// Whether a cancel request was latched before settlement.
    pub fn is_cancel_requested(&self) -> bool {
        matches!(
            self.state.load(Ordering::Acquire),
            CANCEL_REQUESTED | CANCELED
        )
    }

    /// Sample the latch once and decide which outcome to surface.
    fn settle<T, E>(&self, outcome: Result<T, E>) -> Result<T, CancelError<E>> {
        let settled = if outcome.is_ok() { RESOLVED } else { REJECTED };
        match self
            .state
            .compare_exchange(PENDING, settled, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => outcome.map_err(CancelError::Failed),
            Err(_) => {
                self.state.store(CANCELED, Ordering::Release);
                tracing::debug!(
                    succeeded = outcome.is_ok(),
                    "discarding outcome of canceled operation"
                );
                Err(CancelError::Canceled)
            }
        }
    }
}

impl fmt::Debug for Canceler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canceler")
            .field("state", &self.state())
            .field("cancel_requested", &self.is_cancel_requested())
            .finish()
    }
}

/// Wraps an operation producing `Result<T, E>` with a cooperative cancel latch.
///
/// The promise is itself the settlement future: await it (or
/// [`CancelablePromise::get_promise`]) to get `Result<T, CancelError<E>>`.
/// Awaiting consumes the promise, so take a [`Canceler`] first if the outcome
/// may need discarding later. The operation only makes progress while the
/// promise is polled, and dropping the promise drops the operation with it.
pub struct CancelablePromise<F> {
    operation: Option<Pin<Box<F>>>,
    canceler: Canceler,
}

impl<F, T, E> CancelablePromise<F>
where
    F: Future<Output = Result<T, E>>,
{
    pub fn new(operation: F) -> Self {
        Self {
            operation: Some(Box::pin(operation)),
            canceler: Canceler::new(),
        }
    }
}

impl<F> CancelablePromise<F> {
    /// The settlement the caller awaits. Consumes the promise, so the
    /// outcome is observed exactly once:
    ///
    /// ```compile_fail
    /// # use consolekit::CancelablePromise;
    /// # async fn twice() {
    /// let promise = CancelablePromise::new(async { Ok::<_, ()>(1) });
    /// let _ = promise.get_promise().await;
    /// let _ = promise.get_promise().await;
    /// # }
    /// ```
    pub fn get_promise(self) -> Self {
        self
    }

    /// See [`Canceler::cancel`].
    pub fn cancel(&self) -> bool {
        self.canceler.cancel()
    }

    /// Handle for canceling from elsewhere while this promise is being awaited.
    pub fn canceler(&self) -> Canceler {
        self.canceler.clone()
    }

    pub fn state(&self) -> CancelableState {
        self.canceler.state()
    }

    pub fn is_settled(&self) -> bool {
        self.state() != CancelableState::Pending
    }
}

impl<F, T, E> Future for CancelablePromise<F>
where
    F: Future<Output = Result<T, E>>,
{
    type Output = Result<T, CancelError<E>>;

    /// # Panics
    ///
    /// When polled again after returning `Ready`, like any other future.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let Some(operation) = this.operation.as_mut() else {
            panic!("CancelablePromise polled after it settled");
        };
        let outcome = match operation.as_mut().poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(outcome) => outcome,
        };
        this.operation = None;
        Poll::Ready(this.canceler.settle(outcome))
    }
}

impl<F> fmt::Debug for CancelablePromise<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelablePromise")
            .field("state", &self.state())
            .field("cancel_requested", &self.canceler.is_cancel_requested())
            .finish()
    }
}
