//! Caller-facing decode response mappings.
//!
//! | Outcome   | Keys                                                   |
//! |-----------|--------------------------------------------------------|
//! | matched   | `success`, `url`, one section key                      |
//! | unmatched | `success`, `error`, `decode_attempts`, `raw_data`      |
//! | failed    | `success`, `error`, `url`                              |

use meshtastic_proto::Fields;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::decode::{DecodeOutcome, DecodedUrl};
use crate::schema::ResultSection;
use crate::{UrlError, UrlResult};

/// Error text for an exhausted candidate list.
pub const UNMATCHED_ERROR: &str = "Unable to decode protobuf data";

/// Diagnostics for a payload no candidate accepted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RawData {
    pub url: String,
    pub encoded_data: String,
    pub encoded_length: usize,
    pub decoded_length: usize,
    pub hex_data: String,
    pub raw_bytes: Vec<u8>,
}

/// A decode result as a structured mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeResponse {
    /// A candidate matched.
    Success {
        url: String,
        section: ResultSection,
        fields: Fields,
    },
    /// The payload decoded from base64 but nothing accepted it.
    Unmatched {
        error: String,
        decode_attempts: Vec<String>,
        raw_data: RawData,
    },
    /// Extraction or base64 failed before any candidate was tried.
    Failed { error: String, url: String },
}

impl DecodeResponse {
    /// Build the response for a decode call.
    pub fn from_result(url: &str, result: UrlResult<DecodedUrl>) -> Self {
        match result {
            Ok(decoded) => Self::from_decoded(decoded),
            Err(err) => Self::failed(url, &err),
        }
    }

    /// Response for a hard failure.
    pub fn failed(url: &str, err: &UrlError) -> Self {
        DecodeResponse::Failed {
            error: err.to_string(),
            url: url.to_string(),
        }
    }

    fn from_decoded(decoded: DecodedUrl) -> Self {
        match decoded.outcome {
            DecodeOutcome::Matched(record) => DecodeResponse::Success {
                url: decoded.url,
                section: record.section,
                fields: record.fields,
            },
            DecodeOutcome::Unmatched { attempts, raw } => DecodeResponse::Unmatched {
                error: UNMATCHED_ERROR.to_string(),
                decode_attempts: attempts.lines(),
                raw_data: RawData {
                    encoded_length: decoded.encoded.chars().count(),
                    decoded_length: raw.len(),
                    hex_data: raw.hex(),
                    raw_bytes: raw.as_bytes().to_vec(),
                    encoded_data: decoded.encoded,
                    url: decoded.url,
                },
            },
        }
    }

    /// Whether a candidate matched.
    pub fn is_success(&self) -> bool {
        matches!(self, DecodeResponse::Success { .. })
    }

    /// Matched section and fields.
    pub fn section(&self) -> Option<(ResultSection, &Fields)> {
        match self {
            DecodeResponse::Success {
                section, fields, ..
            } => Some((*section, fields)),
            _ => None,
        }
    }

    /// Error text, for failures.
    pub fn error(&self) -> Option<&str> {
        match self {
            DecodeResponse::Success { .. } => None,
            DecodeResponse::Unmatched { error, .. } | DecodeResponse::Failed { error, .. } => {
                Some(error.as_str())
            }
        }
    }

    /// Render as a JSON value.
    pub fn to_value(&self) -> serde_json::Value {
        // Every field is a plain string, number, list or map.
        self.serialize(serde_json::value::Serializer)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for DecodeResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            DecodeResponse::Success {
                url,
                section,
                fields,
            } => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("url", url)?;
                map.serialize_entry(section.key(), fields)?;
            }
            DecodeResponse::Unmatched {
                error,
                decode_attempts,
                raw_data,
            } => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.serialize_entry("decode_attempts", decode_attempts)?;
                map.serialize_entry("raw_data", raw_data)?;
            }
            DecodeResponse::Failed { error, url } => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.serialize_entry("url", url)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Decoder;
    use serde_json::json;

    #[test]
    fn test_success_mapping() {
        let url = "https://meshtastic.org/e/#CgcSAQE6AggNEgwIATgBQANIAVAeaAE";
        let value = Decoder::new().decode_channel_url(url).to_value();
        assert_eq!(
            value,
            json!({
                "success": true,
                "url": url,
                "Config": {
                    "settings": [{"psk": "AQ==", "module_settings": {"position_precision": 13}}],
                    "lora_config": {
                        "use_preset": true,
                        "region": "US",
                        "hop_limit": 3,
                        "tx_enabled": true,
                        "tx_power": 30,
                        "sx126x_rx_boosted_gain": true
                    }
                }
            })
        );
    }

    #[test]
    fn test_unmatched_mapping() {
        // 0x0F: field 1 with wire type 7.
        let url = "https://meshtastic.org/e/#DwE";
        let value = Decoder::new().decode_channel_url(url).to_value();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], UNMATCHED_ERROR);
        assert_eq!(value["decode_attempts"].as_array().unwrap().len(), 7);
        assert_eq!(
            value["raw_data"],
            json!({
                "url": url,
                "encoded_data": "DwE",
                "encoded_length": 3,
                "decoded_length": 2,
                "hex_data": "0f01",
                "raw_bytes": [15, 1]
            })
        );
    }

    #[test]
    fn test_failed_mapping() {
        let url = "https://meshtastic.org/e/";
        let response = Decoder::new().decode_channel_url(url);
        assert_eq!(
            response.to_value(),
            json!({
                "success": false,
                "error": "No encoded channel data found in URL",
                "url": url
            })
        );
        assert!(!response.is_success());
        assert!(response.section().is_none());
    }
}
