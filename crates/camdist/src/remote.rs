//! Anchor retrieval: remote copy first, shipped default as fallback.

use std::fmt;

use tracing::error;

use crate::error::Result;
use crate::platform::Platform;

/// Where an anchor string came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorOrigin {
    Remote,
    Config,
    Builtin,
}

impl fmt::Display for AnchorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorOrigin::Remote => write!(f, "remote"),
            AnchorOrigin::Config => write!(f, "config"),
            AnchorOrigin::Builtin => write!(f, "built-in default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAnchor {
    pub hex: String,
    pub origin: AnchorOrigin,
}

impl ResolvedAnchor {
    pub fn builtin(platform: Platform) -> Self {
        Self {
            hex: platform.default_anchor().to_string(),
            origin: AnchorOrigin::Builtin,
        }
    }
}

/// Download the published anchor from `url`.
#[cfg(feature = "remote")]
pub fn fetch_anchor(url: &str) -> Result<String> {
    use std::time::Duration;

    use tracing::debug;

    use crate::anchor::normalize_hex;
    use crate::error::Error;

    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(10)))
        .build();
    let agent: ureq::Agent = config.into();

    let mut resp = agent
        .get(url)
        .call()
        .map_err(|e| Error::Network(e.to_string()))?;
    let text = resp
        .body_mut()
        .read_to_string()
        .map_err(|e| Error::Network(e.to_string()))?;
    debug!("String {:?} received from {}", text, url);

    let anchor = text.trim().to_string();
    normalize_hex(&anchor)?;
    Ok(anchor)
}

#[cfg(not(feature = "remote"))]
pub fn fetch_anchor(url: &str) -> Result<String> {
    Err(crate::error::Error::Network(format!(
        "built without remote support, cannot fetch {}",
        url
    )))
}

/// Fetch the platform's published anchor, falling back to the shipped default.
pub fn fetch_or_default(platform: Platform) -> ResolvedAnchor {
    fetch_or_default_from(platform, &platform.anchor_url())
}

pub fn fetch_or_default_from(platform: Platform, url: &str) -> ResolvedAnchor {
    match fetch_anchor(url) {
        Ok(hex) => ResolvedAnchor {
            hex,
            origin: AnchorOrigin::Remote,
        },
        Err(e) => {
            error!("Couldn't receive anchor ({}), using the default one", e);
            ResolvedAnchor::builtin(platform)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_url_falls_back_to_builtin() {
        let anchor = fetch_or_default_from(Platform::Linux, "http://127.0.0.1:9/anchor");
        assert_eq!(anchor.origin, AnchorOrigin::Builtin);
        assert_eq!(anchor.hex, Platform::Linux.default_anchor());
    }

    #[test]
    fn test_origin_display() {
        assert_eq!(AnchorOrigin::Builtin.to_string(), "built-in default");
        assert_eq!(AnchorOrigin::Remote.to_string(), "remote");
    }
}
