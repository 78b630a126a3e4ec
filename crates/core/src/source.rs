// Remote media source address

use crate::error::{AudioError, Result};
use std::fmt;
use url::Url;

/// Validated http(s) URL of a single remote media file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrl {
    url: Url,
}

impl SourceUrl {
    pub fn parse(input: &str) -> Result<Self> {
        // The URL parser would silently strip or escape these
        if input.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(AudioError::SourceAttach(format!(
                "unescaped whitespace in {:?}",
                input
            )));
        }

        let url = Url::parse(input)
            .map_err(|e| AudioError::SourceAttach(format!("invalid url {:?}: {}", input, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AudioError::SourceAttach(format!(
                "unsupported scheme {:?}, expected http or https",
                url.scheme()
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(AudioError::SourceAttach(format!("missing host in {:?}", input)));
        }

        Ok(Self { url })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Lowercased file extension of the last path segment, if any
    pub fn extension(&self) -> Option<String> {
        let segment = self.url.path_segments()?.next_back()?;
        let (_, ext) = segment.rsplit_once('.')?;
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
