//! Shared utility layer for the management console.
//!
//! Views call into these modules for query strings, URL parts, display-ready
//! error messages, byte/host metrics, and futures whose outcome may be discarded.

pub mod config;
pub mod logging;

pub mod cancelable;
pub mod error_message;
pub mod metrics;
pub mod url_model;

pub use cancelable::{CancelError, CancelablePromise, CancelableState, Canceler};
pub use config::{ConfigError, ConfigStore, ConfigurationProperties};
pub use error_message::{normalize, ApiError, Localizer, NormalizedError};
pub use url_model::{UrlError, UrlParts};
