//! Byte counts scaled into power-of-1024 units.

use std::fmt;

use super::round_to_hundredths;

/// Unit prefixes by magnitude index (0 = bytes, 1 = K, 2 = M, ...).
pub const MAGNITUDES: [&str; 9] = ["", "K", "M", "G", "T", "P", "E", "Z", "Y"];

const BASE: f64 = 1024.0;

/// Power-of-1024 bucket of `bytes`: `floor(log1024(bytes))`, or 0 below one byte.
///
/// The result is not clamped; see [`magnitude_label`]. Non-finite input maps to 0.
pub fn magnitude_index(bytes: f64) -> usize {
    if !bytes.is_finite() || bytes < 1.0 {
        return 0;
    }
    let mut index = (bytes.ln() / BASE.ln()).floor() as usize;
    // The float quotient can land one bucket off around exact powers of 1024.
    if BASE.powi(index as i32 + 1) <= bytes {
        index += 1;
    } else if index > 0 && BASE.powi(index as i32) > bytes {
        index -= 1;
    }
    index
}

/// Unit prefix for `index`, clamped to the largest known unit.
pub fn magnitude_label(index: usize) -> &'static str {
    MAGNITUDES[index.min(MAGNITUDES.len() - 1)]
}

/// `bytes / 1024^index`, rounded to two decimals. Zero stays zero.
pub fn scale(bytes: f64, index: usize) -> f64 {
    if bytes == 0.0 {
        return 0.0;
    }
    let exponent = i32::try_from(index).unwrap_or(i32::MAX);
    round_to_hundredths(bytes / BASE.powi(exponent))
}

/// A byte count ready for display, e.g. `1.5 KB`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormattedBytes {
    pub value: f64,
    pub unit: &'static str,
}

impl fmt::Display for FormattedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}B", self.value, self.unit)
    }
}

/// Scales `bytes` into its largest whole unit (clamped to `Y`).
pub fn format_bytes(bytes: f64) -> FormattedBytes {
    let index = magnitude_index(bytes).min(MAGNITUDES.len() - 1);
    FormattedBytes {
        value: scale(bytes, index),
        unit: MAGNITUDES[index],
    }
}
