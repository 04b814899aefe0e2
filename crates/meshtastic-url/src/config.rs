//! Runtime configuration.
//!
//! ```yaml
//! channel_url_prefix: https://meshtastic.org/e/
//! canonical_host: meshtastic.org
//! min_qr_payload_len: 30
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{UrlError, UrlResult};

/// Default prefix for generated channel URLs.
pub const DEFAULT_CHANNEL_URL_PREFIX: &str = "https://meshtastic.org/e/";

/// Default host that marks scanned text as a share URL.
pub const DEFAULT_CANONICAL_HOST: &str = "meshtastic.org";

/// Default minimum length of scanned text without the canonical host.
pub const DEFAULT_MIN_QR_PAYLOAD_LEN: usize = 30;

/// Codec settings. Every key is optional in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Prefix the encoder puts before `#<payload>`.
    pub channel_url_prefix: String,
    /// Host name that qualifies scanned text for decoding.
    pub canonical_host: String,
    /// Scanned text with a path marker must be longer than this.
    pub min_qr_payload_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            channel_url_prefix: DEFAULT_CHANNEL_URL_PREFIX.to_string(),
            canonical_host: DEFAULT_CANONICAL_HOST.to_string(),
            min_qr_payload_len: DEFAULT_MIN_QR_PAYLOAD_LEN,
        }
    }
}

impl CodecConfig {
    /// Parse YAML text.
    pub fn from_yaml_str(text: &str) -> UrlResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a YAML file.
    pub fn load(path: &Path) -> UrlResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| UrlError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = CodecConfig::from_yaml_str("channel_url_prefix: https://example.org/e/\n").unwrap();
        assert_eq!(config.channel_url_prefix, "https://example.org/e/");
        assert_eq!(config.canonical_host, DEFAULT_CANONICAL_HOST);
        assert_eq!(config.min_qr_payload_len, 30);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(CodecConfig::from_yaml_str("").unwrap(), CodecConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = CodecConfig::from_yaml_str("prefix: x\n").unwrap_err();
        assert!(matches!(err, UrlError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = CodecConfig::load(Path::new("/nonexistent/mturl.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/mturl.yaml"));
    }
}
