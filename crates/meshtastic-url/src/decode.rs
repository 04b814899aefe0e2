//! The decode engine.
//!
//! Candidates are tried in the order chosen by the URL classification. The
//! first one that parses and passes its plausibility predicate wins; every
//! rejected candidate leaves one entry in the [`AttemptLog`]. Only payload
//! extraction and base64 failures are hard errors.

use std::fmt;

use meshtastic_proto::Fields;
use tracing::{debug, trace};

use crate::base64url;
use crate::extract::{extract, UrlClassification};
use crate::response::DecodeResponse;
use crate::schema::{candidate_order, CandidateSchema, ParsedMessage, ResultSection};
use crate::{UrlError, UrlResult};

// ============================================================================
// Raw payload
// ============================================================================

/// The base64url-decoded bytes of a URL payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    bytes: Vec<u8>,
}

impl RawPayload {
    /// Wrap decoded bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        RawPayload { bytes }
    }

    /// The bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte count.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercase hex rendering.
    pub fn hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

// ============================================================================
// Attempt log
// ============================================================================

/// Why one candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// Candidate schema name.
    pub schema: &'static str,
    /// Parse error or plausibility failure.
    pub reason: String,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.schema, self.reason)
    }
}

/// Ordered record of rejected candidates for one decode call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptLog {
    entries: Vec<Attempt>,
}

impl AttemptLog {
    /// Start an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, schema: &CandidateSchema, reason: String) {
        debug!("Decoder: {} rejected: {}", schema.name, reason);
        self.entries.push(Attempt {
            schema: schema.name,
            reason,
        });
    }

    /// Entries in trial order.
    pub fn entries(&self) -> &[Attempt] {
        &self.entries
    }

    /// Number of rejected candidates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was rejected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries rendered as `"<Schema> failed: <reason>"`.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// A candidate that parsed and looked real.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRecord {
    /// Name of the matching schema.
    pub schema: &'static str,
    /// Response key for the match.
    pub section: ResultSection,
    /// The typed message.
    pub message: ParsedMessage,
    /// The message rendered as a field mapping.
    pub fields: Fields,
}

/// Result of running the engine over one payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// A candidate was accepted.
    Matched(MatchedRecord),
    /// Every candidate was rejected.
    Unmatched {
        /// One entry per rejected candidate.
        attempts: AttemptLog,
        /// The payload that nothing accepted.
        raw: RawPayload,
    },
}

impl DecodeOutcome {
    /// The match, if any.
    pub fn matched(&self) -> Option<&MatchedRecord> {
        match self {
            DecodeOutcome::Matched(record) => Some(record),
            DecodeOutcome::Unmatched { .. } => None,
        }
    }

    /// Convert exhaustion into [`UrlError::AllCandidatesExhausted`].
    pub fn into_result(self) -> UrlResult<MatchedRecord> {
        match self {
            DecodeOutcome::Matched(record) => Ok(record),
            DecodeOutcome::Unmatched { attempts, .. } => Err(UrlError::AllCandidatesExhausted {
                attempts: attempts.lines(),
            }),
        }
    }
}

/// A URL taken through extraction, base64 and the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedUrl {
    /// The URL as given.
    pub url: String,
    /// Payload text as extracted.
    pub encoded: String,
    /// Classification used for candidate ordering.
    pub classification: UrlClassification,
    /// Engine result.
    pub outcome: DecodeOutcome,
}

// ============================================================================
// Decoder
// ============================================================================

/// Stateless decoder; one instance may be shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder;

impl Decoder {
    /// Create a decoder.
    pub fn new() -> Self {
        Decoder
    }

    /// Run the candidate list over raw bytes.
    pub fn decode_payload(&self, bytes: &[u8], classification: UrlClassification) -> DecodeOutcome {
        trace!(
            "Decoder: {} payload bytes, classification {:?}",
            bytes.len(),
            classification
        );
        let mut attempts = AttemptLog::new();

        for schema in candidate_order(classification) {
            match schema.parse(bytes) {
                Ok(message) if schema.is_plausible(&message) => {
                    debug!("Decoder: matched {} as {}", schema.name, schema.section.key());
                    let fields = message.to_fields();
                    return DecodeOutcome::Matched(MatchedRecord {
                        schema: schema.name,
                        section: schema.section,
                        message,
                        fields,
                    });
                }
                Ok(_) => attempts.record(schema, "no plausible fields".to_string()),
                Err(err) => attempts.record(schema, err.to_string()),
            }
        }

        DecodeOutcome::Unmatched {
            attempts,
            raw: RawPayload::new(bytes.to_vec()),
        }
    }

    /// Extract, base64-decode and run the engine, classifying from the URL.
    pub fn decode_url(&self, url: &str) -> UrlResult<DecodedUrl> {
        let (encoded, classification) = extract(url)?;
        self.decode_extracted(url, encoded, classification)
    }

    /// Like [`Decoder::decode_url`], but with a forced classification.
    pub fn decode_url_as(
        &self,
        url: &str,
        classification: UrlClassification,
    ) -> UrlResult<DecodedUrl> {
        let (encoded, _) = extract(url)?;
        self.decode_extracted(url, encoded, classification)
    }

    fn decode_extracted(
        &self,
        url: &str,
        encoded: String,
        classification: UrlClassification,
    ) -> UrlResult<DecodedUrl> {
        trace!("Decoder: {} encoded characters", encoded.len());
        let bytes = base64url::decode(&encoded)?;
        let outcome = self.decode_payload(&bytes, classification);
        Ok(DecodedUrl {
            url: url.to_string(),
            encoded,
            classification,
            outcome,
        })
    }

    /// Decode a URL into a response mapping; never fails.
    pub fn decode_channel_url(&self, url: &str) -> DecodeResponse {
        DecodeResponse::from_result(url, self.decode_url(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshtastic_proto::{ChannelSet, Message};

    const DEFAULT_CHANNEL: &str = "0a071201013a02080d120c0801380140034801501e6801";

    #[test]
    fn test_default_channel_matches_channel_set() {
        let bytes = hex::decode(DEFAULT_CHANNEL).unwrap();
        let outcome = Decoder::new().decode_payload(&bytes, UrlClassification::ChannelLike);
        let record = outcome.matched().unwrap();

        assert_eq!(record.schema, "ChannelSet");
        assert_eq!(record.section, ResultSection::Config);
        assert_eq!(
            record.message,
            ParsedMessage::ChannelSet(ChannelSet::decode(&bytes).unwrap())
        );
        assert_eq!(record.fields["lora_config"]["region"], "US");
    }

    #[test]
    fn test_order_depends_on_classification() {
        // Field 1 varint: NodeInfo.num and Channel.index alike.
        let bytes = [0x08, 0x05];
        let decoder = Decoder::new();

        let node = decoder.decode_payload(&bytes, UrlClassification::NodeLike);
        assert_eq!(node.matched().unwrap().schema, "NodeInfo");

        let channel = decoder.decode_payload(&bytes, UrlClassification::ChannelLike);
        let record = channel.matched().unwrap();
        assert_eq!(record.schema, "Channel");
        assert_eq!(record.fields["index"], 5);
    }

    #[test]
    fn test_exhaustion_logs_every_candidate() {
        let bytes = [0x0F, 0x01, 0x02];
        let outcome = Decoder::new().decode_payload(&bytes, UrlClassification::NodeLike);

        match outcome {
            DecodeOutcome::Unmatched { attempts, raw } => {
                let schemas: Vec<_> = attempts.entries().iter().map(|a| a.schema).collect();
                assert_eq!(
                    schemas,
                    vec!["NodeInfo", "User", "Position", "MyNodeInfo", "ChannelSet", "Channel", "MeshPacket"]
                );
                assert!(attempts.lines()[0].starts_with("NodeInfo failed: Invalid wire type 7"));
                assert_eq!(raw.len(), 3);
                assert_eq!(raw.hex(), "0f0102");
            }
            other => panic!("expected Unmatched, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_payload_falls_through_to_mesh_packet() {
        let outcome = Decoder::new().decode_payload(&[], UrlClassification::ChannelLike);
        let record = outcome.matched().unwrap();
        assert_eq!(record.schema, "MeshPacket");
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_into_result() {
        let outcome = Decoder::new().decode_payload(&[0x0F], UrlClassification::Unknown);
        match outcome.into_result() {
            Err(UrlError::AllCandidatesExhausted { attempts }) => assert_eq!(attempts.len(), 7),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_url_hard_failures() {
        let decoder = Decoder::new();
        assert_eq!(
            decoder.decode_url("https://meshtastic.org/e/#"),
            Err(UrlError::NoEncodedData)
        );
        assert!(matches!(
            decoder.decode_url("https://meshtastic.org/e/#a!!"),
            Err(UrlError::MalformedEncoding(_))
        ));
    }
}
