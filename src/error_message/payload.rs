//! Error payload shapes produced by the console's API client.

use serde::{Deserialize, Deserializer, Serialize};

/// HTTP status the console reports as "item not found".
pub const NOT_FOUND_STATUS: u16 = 404;

/// Error object as handed over by the API client.
///
/// Every field is optional; which ones are present depends on where the
/// failure happened (HTTP layer, service validation, client-side code).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub status: Option<u16>,
    /// Absent unless the response body parsed as a JSON object of the expected shape.
    #[serde(rename = "_body", default, deserialize_with = "body_or_none")]
    pub body: Option<ErrorBody>,
    pub message: Option<String>,
    pub status_text: Option<String>,
    pub response_text: Option<String>,
}

/// Structured response body of a failed service call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ServiceErrorEntry>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceErrorEntry {
    pub system_message: Option<String>,
}

/// The one shape of an [`ApiError`] that decides its display message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPayload<'a> {
    /// Status 404; displayed through the localized not-found string.
    NotFound,
    /// First entry of the body's `errors` list.
    Structured(&'a str),
    /// Body-level `message`.
    BodyMessage(&'a str),
    /// Top-level `message`, `statusText` or `responseText`.
    Flat(&'a str),
    Unrecognized,
}

/// Accepts any `_body` value; text or otherwise unexpected bodies become `None`
/// so the flat fields still decide the message.
fn body_or_none<'de, D>(deserializer: D) -> Result<Option<ErrorBody>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(None);
    }
    match ErrorBody::deserialize(&raw) {
        Ok(body) => Ok(Some(body)),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unstructured error body");
            Ok(None)
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

impl ApiError {
    pub fn with_status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Classifies this error. A non-empty `errors` list shadows the body's
    /// `message` even when its first entry has no `systemMessage`; the flat
    /// fields are then the fallback.
    pub fn payload(&self) -> ErrorPayload<'_> {
        if self.status == Some(NOT_FOUND_STATUS) {
            return ErrorPayload::NotFound;
        }

        if let Some(body) = &self.body {
            if let Some(first) = body.errors.first() {
                if let Some(msg) = non_empty(first.system_message.as_ref()) {
                    return ErrorPayload::Structured(msg);
                }
            } else if let Some(msg) = non_empty(body.message.as_ref()) {
                return ErrorPayload::BodyMessage(msg);
            }
        }

        non_empty(self.message.as_ref())
            .or_else(|| non_empty(self.status_text.as_ref()))
            .or_else(|| non_empty(self.response_text.as_ref()))
            .map_or(ErrorPayload::Unrecognized, ErrorPayload::Flat)
    }
}
