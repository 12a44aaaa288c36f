//! Host display name and resource usage derived from the host document.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::round_to_hundredths;
use crate::url_model::{UrlError, UrlParts};

/// String-encoded metadata attached to a host document.
pub type CustomProperties = HashMap<String, String>;

pub const CPU_USAGE_PROPERTY: &str = "__CpuUsage";
pub const MEM_TOTAL_PROPERTY: &str = "__MemTotal";
pub const MEM_AVAILABLE_PROPERTY: &str = "__MemAvailable";
pub const HOST_ALIAS_PROPERTY: &str = "__hostAlias";
pub const HOST_NAME_PROPERTY: &str = "__Name";

/// Host document as delivered by the document service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub name: Option<String>,
    #[serde(default)]
    pub address: String,
    pub custom_properties: Option<CustomProperties>,
}

impl Host {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Sets a custom property, creating the bag if needed.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_properties
            .get_or_insert_with(CustomProperties::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn custom_property(&self, name: &str) -> Option<&str> {
        custom_property_value(self.custom_properties.as_ref(), name)
    }

    fn numeric_property(&self, name: &str) -> Option<f64> {
        let raw = self.custom_property(name)?;
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                tracing::debug!(property = name, value = raw, "non-numeric host metric ignored");
                None
            }
        }
    }
}

/// Looks up `name` in a property bag; empty strings count as absent.
pub fn custom_property_value<'a>(
    properties: Option<&'a CustomProperties>,
    name: &str,
) -> Option<&'a str> {
    properties?
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Name shown for `host`: its `name`, then the `__hostAlias` and `__Name`
/// properties, then the host part of its address.
///
/// Fails only when the address has to be parsed and is not a valid URL.
pub fn display_name(host: Option<&Host>) -> Result<Option<String>, UrlError> {
    let Some(host) = host else {
        return Ok(None);
    };

    let explicit = host
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .or_else(|| host.custom_property(HOST_ALIAS_PROPERTY))
        .or_else(|| host.custom_property(HOST_NAME_PROPERTY));
    if let Some(name) = explicit {
        return Ok(Some(name.to_string()));
    }

    Ok(Some(UrlParts::parse(&host.address)?.host))
}

fn round_percent(value: f64, rounded: bool) -> f64 {
    if rounded {
        value.floor()
    } else {
        round_to_hundredths(value)
    }
}

/// CPU usage in percent from `__CpuUsage`; 0 when missing.
/// `rounded` floors to an integer, otherwise the value keeps two decimals.
pub fn cpu_percent(host: &Host, rounded: bool) -> f64 {
    host.numeric_property(CPU_USAGE_PROPERTY)
        .map_or(0.0, |usage| round_percent(usage, rounded))
}

/// Used memory in percent from `__MemTotal` and `__MemAvailable`; 0 unless
/// both are finite numbers and the total is non-zero. Rounding as in [`cpu_percent`].
pub fn memory_percent(host: &Host, rounded: bool) -> f64 {
    let (Some(total), Some(available)) = (
        host.numeric_property(MEM_TOTAL_PROPERTY),
        host.numeric_property(MEM_AVAILABLE_PROPERTY),
    ) else {
        return 0.0;
    };
    let used = (total - available) / total * 100.0;
    if !used.is_finite() {
        return 0.0;
    }
    round_percent(used, rounded)
}
