//! Display metrics: byte-size magnitudes and host resource percentages.

pub mod bytes;
pub mod host;

pub use bytes::{format_bytes, magnitude_index, magnitude_label, scale, FormattedBytes, MAGNITUDES};
pub use host::{
    cpu_percent, custom_property_value, display_name, memory_percent, CustomProperties, Host,
};

/// Rounds to two decimals, halves toward positive infinity (`45.678` → `45.68`).
pub(crate) fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}
