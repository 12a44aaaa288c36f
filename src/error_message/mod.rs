//! Display messages for failed API calls.
//!
//! The API client hands over loosely shaped error objects; [`ApiError::payload`]
//! classifies them and [`normalize`] turns the result into a [`NormalizedError`].

mod normalize;
mod payload;

pub use normalize::{normalize, Localizer, MessageCatalog, NormalizedError, ITEM_NOT_FOUND_KEY};
pub use payload::{ApiError, ErrorBody, ErrorPayload, ServiceErrorEntry, NOT_FOUND_STATUS};
