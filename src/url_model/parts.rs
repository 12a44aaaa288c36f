//! Decomposition of host addresses into scheme, host, port, path, query and fragment.

use serde::Serialize;
use std::borrow::Cow;

/// Scheme prepended to scheme-less addresses so they parse structurally.
/// It is never reported back in [`UrlParts::scheme`].
const ASSUMED_SCHEME_PREFIX: &str = "http://";

/// Failure to decompose an address. The underlying parser's error is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("invalid URL {input:?}: {source}")]
    Parse {
        input: String,
        #[source]
        source: url::ParseError,
    },
}

/// Parts of an absolute or scheme-less URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UrlParts {
    /// Scheme without `:`; empty when the input had no `scheme://` prefix.
    pub scheme: String,
    pub host: String,
    /// Explicit, non-default port. Port `0` is reported as `None`.
    pub port: Option<u16>,
    pub path: String,
    /// Query without the leading `?`.
    pub query: String,
    /// Fragment including the leading `#`, or empty.
    pub fragment: String,
}

impl UrlParts {
    /// Parses `input`, assuming `http://` when it carries no `scheme://`.
    ///
    /// # Examples
    ///
    /// - `"tcp://10.0.0.5:2376"` → scheme `tcp`, host `10.0.0.5`, port `2376`
    /// - `"docker-host:2376/v1"` → scheme `""`, host `docker-host`, port `2376`, path `/v1`
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        let has_scheme = input.contains("://");
        let candidate: Cow<'_, str> = if has_scheme {
            Cow::Borrowed(input)
        } else {
            Cow::Owned(format!("{ASSUMED_SCHEME_PREFIX}{input}"))
        };

        let parsed = url::Url::parse(&candidate).map_err(|source| UrlError::Parse {
            input: input.to_string(),
            source,
        })?;

        let scheme = if has_scheme {
            parsed.scheme().to_string()
        } else {
            String::new()
        };
        let fragment = match parsed.fragment() {
            Some(f) if !f.is_empty() => format!("#{f}"),
            _ => String::new(),
        };

        Ok(Self {
            scheme,
            host: parsed.host_str().unwrap_or_default().to_string(),
            port: parsed.port().filter(|&port| port != 0),
            path: parsed.path().to_string(),
            query: parsed.query().unwrap_or_default().to_string(),
            fragment,
        })
    }
}
