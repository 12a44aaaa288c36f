//! Reduction of an [`ApiError`] to the single message a view displays.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::payload::{ApiError, ErrorPayload};

/// Localization key of the "item not found" message.
pub const ITEM_NOT_FOUND_KEY: &str = "errors.itemNotFound";

/// Source of localized strings.
pub trait Localizer {
    fn lookup(&self, key: &str) -> String;
}

impl<F> Localizer for F
where
    F: Fn(&str) -> String,
{
    fn lookup(&self, key: &str) -> String {
        self(key)
    }
}

/// In-memory message catalog. Unknown keys resolve to the key itself.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MessageCatalog {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            messages: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Localizer for MessageCatalog {
    fn lookup(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

/// The only error representation views see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedError {
    #[serde(rename = "_generic")]
    pub generic: Option<String>,
}

impl NormalizedError {
    pub fn message(&self) -> Option<&str> {
        self.generic.as_deref()
    }
}

/// Picks the display message of `err`. Never fails: an error with nothing
/// displayable yields `generic: None`.
pub fn normalize<L: Localizer + ?Sized>(err: &ApiError, localizer: &L) -> NormalizedError {
    let generic = match err.payload() {
        ErrorPayload::NotFound => Some(localizer.lookup(ITEM_NOT_FOUND_KEY)),
        ErrorPayload::Structured(msg) | ErrorPayload::BodyMessage(msg) | ErrorPayload::Flat(msg) => {
            Some(msg.to_string())
        }
        ErrorPayload::Unrecognized => {
            tracing::debug!(status = ?err.status, "error payload carries no displayable message");
            None
        }
    };
    NormalizedError { generic }
}
