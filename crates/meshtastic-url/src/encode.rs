//! Channel URL encoder.
//!
//! Builds a `ChannelSet` (or a bare `Channel`) from loosely typed input,
//! serializes it, forms the share URL and decodes that URL again as a
//! self-check. The self-check's field mapping is returned so callers see
//! exactly what a receiver would see.

use meshtastic_proto::{
    modem_preset_from_name, region_from_name, Channel, ChannelRole, ChannelSet, ChannelSettings,
    Fields, LoRaConfig, Message, ModuleSettings,
};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::coerce::{
    field, opt_bool, opt_f32, opt_i32, opt_string, opt_u32, to_bool, to_i32, to_str,
};
use crate::psk::normalize_psk;
use crate::qr::{QrRenderer, SvgQrRenderer};
use crate::schema::{ParsedMessage, ResultSection};
use crate::{base64url, CodecConfig, Decoder, UrlClassification, UrlError, UrlResult};

/// Position precision meaning "full precision".
pub const FULL_POSITION_PRECISION: u32 = 32;

/// Region used when a region name is given but not recognized (`US`).
pub const DEFAULT_REGION: i32 = 1;

/// Preset used when a preset name is given but not recognized (`LONG_FAST`).
pub const DEFAULT_MODEM_PRESET: i32 = 0;

/// Accepted spellings of the mute flag, in lookup order.
pub const MUTE_ALIASES: [&str; 3] = ["is_muted", "is_client_muted", "muted"];

// ============================================================================
// Channel spec
// ============================================================================

/// Encoder input for one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSpec {
    /// Slot index; only serialized for single-channel records.
    pub index: Option<u32>,
    /// Channel role.
    pub role: ChannelRole,
    /// Channel name.
    pub name: Option<String>,
    /// Key text in `0x` hex, base64 or raw form.
    pub psk: Option<String>,
    pub uplink_enabled: Option<bool>,
    pub downlink_enabled: Option<bool>,
    /// Defaults to [`FULL_POSITION_PRECISION`].
    pub position_precision: Option<u32>,
    pub is_muted: Option<bool>,
}

impl Default for ChannelSpec {
    fn default() -> Self {
        ChannelSpec {
            index: None,
            role: ChannelRole::Secondary,
            name: None,
            psk: None,
            uplink_enabled: None,
            downlink_enabled: None,
            position_precision: None,
            is_muted: None,
        }
    }
}

/// Map a role value to a role; anything unrecognized is secondary.
fn parse_role(value: Option<&Value>) -> ChannelRole {
    let role = match value {
        Some(Value::String(name)) => ChannelRole::from_name(name),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .and_then(ChannelRole::from_i32),
        _ => None,
    };
    role.unwrap_or(ChannelRole::Secondary)
}

impl ChannelSpec {
    /// Read a channel spec from a JSON object.
    ///
    /// Module settings are read from a nested `module_settings` object when
    /// present, otherwise from the channel object itself.
    pub fn from_json(value: &Value) -> UrlResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| UrlError::InvalidSpec("channel must be an object".to_string()))?;

        let index = opt_u32(obj, "index")?;
        if let Some(i) = index.filter(|i| i32::try_from(*i).is_err()) {
            return Err(UrlError::coercion("index", "32-bit integer", &Value::from(i)));
        }

        let module = match field(obj, "module_settings") {
            Some(Value::Object(module)) => module,
            Some(other) => return Err(UrlError::coercion("module_settings", "object", other)),
            None => obj,
        };
        let is_muted = MUTE_ALIASES
            .iter()
            .find_map(|alias| field(module, alias).map(|v| (*alias, v)))
            .map(|(alias, v)| to_bool(alias, v))
            .transpose()?;

        let psk = match field(obj, "psk") {
            Some(v) => Some(to_str("psk", v)?.to_string()).filter(|s| !s.is_empty()),
            None => None,
        };

        Ok(ChannelSpec {
            index,
            role: parse_role(field(obj, "role")),
            name: opt_string(obj, "name")?,
            psk,
            uplink_enabled: opt_bool(obj, "uplink_enabled")?,
            downlink_enabled: opt_bool(obj, "downlink_enabled")?,
            position_precision: opt_u32(module, "position_precision")?,
            is_muted,
        })
    }

    /// Build the settings block.
    pub fn to_settings(&self) -> ChannelSettings {
        let psk = self.psk.as_deref().filter(|s| !s.is_empty()).map(|text| {
            let (bytes, form) = normalize_psk(text);
            trace!("Encoder: psk read as {:?}, {} bytes", form, bytes.len());
            bytes
        });
        ChannelSettings {
            channel_num: None,
            psk,
            name: self.name.clone(),
            id: None,
            uplink_enabled: self.uplink_enabled,
            downlink_enabled: self.downlink_enabled,
            module_settings: Some(ModuleSettings {
                position_precision: Some(
                    self.position_precision.unwrap_or(FULL_POSITION_PRECISION),
                ),
                is_muted: Some(self.is_muted.unwrap_or(false)),
            }),
        }
    }

    /// Build a full channel record, index defaulting to 0.
    pub fn to_channel(&self) -> UrlResult<Channel> {
        let index = self.index.unwrap_or(0);
        let index = i32::try_from(index)
            .map_err(|_| UrlError::coercion("index", "32-bit integer", &Value::from(index)))?;
        Ok(Channel {
            index: Some(index),
            settings: Some(self.to_settings()),
            role: Some(self.role.as_i32()),
        })
    }
}

// ============================================================================
// LoRa spec
// ============================================================================

/// Encoder input for the radio block. Absent fields stay absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoRaSpec {
    pub use_preset: Option<bool>,
    /// Raw preset code.
    pub modem_preset: Option<i32>,
    pub bandwidth: Option<u32>,
    pub spread_factor: Option<u32>,
    pub coding_rate: Option<u32>,
    pub frequency_offset: Option<f32>,
    /// Raw region code.
    pub region: Option<i32>,
    pub hop_limit: Option<u32>,
    pub tx_enabled: Option<bool>,
    pub tx_power: Option<i32>,
    pub channel_num: Option<u32>,
    pub override_duty_cycle: Option<bool>,
    pub sx126x_rx_boosted_gain: Option<bool>,
    pub override_frequency: Option<f32>,
}

fn enum_code(
    obj: &Map<String, Value>,
    key: &str,
    lookup: fn(&str) -> Option<i32>,
    fallback: i32,
) -> UrlResult<Option<i32>> {
    match field(obj, key) {
        None => Ok(None),
        Some(Value::String(name)) => Ok(Some(lookup(name).unwrap_or_else(|| {
            debug!("Encoder: unknown {} {:?}, using {}", key, name, fallback);
            fallback
        }))),
        Some(other) => to_i32(key, other).map(Some),
    }
}

impl LoRaSpec {
    /// Read a LoRa spec from a JSON object.
    pub fn from_json(value: &Value) -> UrlResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| UrlError::InvalidSpec("lora_config must be an object".to_string()))?;
        Ok(LoRaSpec {
            use_preset: opt_bool(obj, "use_preset")?,
            modem_preset: enum_code(
                obj,
                "modem_preset",
                modem_preset_from_name,
                DEFAULT_MODEM_PRESET,
            )?,
            bandwidth: opt_u32(obj, "bandwidth")?,
            spread_factor: opt_u32(obj, "spread_factor")?,
            coding_rate: opt_u32(obj, "coding_rate")?,
            frequency_offset: opt_f32(obj, "frequency_offset")?,
            region: enum_code(obj, "region", region_from_name, DEFAULT_REGION)?,
            hop_limit: opt_u32(obj, "hop_limit")?,
            tx_enabled: opt_bool(obj, "tx_enabled")?,
            tx_power: opt_i32(obj, "tx_power")?,
            channel_num: opt_u32(obj, "channel_num")?,
            override_duty_cycle: opt_bool(obj, "override_duty_cycle")?,
            sx126x_rx_boosted_gain: opt_bool(obj, "sx126x_rx_boosted_gain")?,
            override_frequency: opt_f32(obj, "override_frequency")?,
        })
    }

    /// Build the radio block.
    pub fn to_config(&self) -> LoRaConfig {
        LoRaConfig {
            use_preset: self.use_preset,
            modem_preset: self.modem_preset,
            bandwidth: self.bandwidth,
            spread_factor: self.spread_factor,
            coding_rate: self.coding_rate,
            frequency_offset: self.frequency_offset,
            region: self.region,
            hop_limit: self.hop_limit,
            tx_enabled: self.tx_enabled,
            tx_power: self.tx_power,
            channel_num: self.channel_num,
            override_duty_cycle: self.override_duty_cycle,
            sx126x_rx_boosted_gain: self.sx126x_rx_boosted_gain,
            override_frequency: self.override_frequency,
            ..Default::default()
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// A parsed encode request.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeRequest {
    /// `channels` list plus optional `lora_config`.
    ChannelSet {
        channels: Vec<ChannelSpec>,
        lora: Option<LoRaSpec>,
    },
    /// Legacy single `channel`.
    SingleChannel(ChannelSpec),
}

impl EncodeRequest {
    /// Read a request mapping.
    pub fn from_json(value: &Value) -> UrlResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| UrlError::InvalidSpec("request must be an object".to_string()))?;

        if let Some(channels) = field(obj, "channels") {
            let list = channels
                .as_array()
                .ok_or_else(|| UrlError::InvalidSpec("channels must be a list".to_string()))?;
            let channels = list
                .iter()
                .map(ChannelSpec::from_json)
                .collect::<UrlResult<Vec<_>>>()?;
            let lora = field(obj, "lora_config")
                .map(LoRaSpec::from_json)
                .transpose()?;
            return Ok(EncodeRequest::ChannelSet { channels, lora });
        }

        match field(obj, "channel") {
            Some(channel) => Ok(EncodeRequest::SingleChannel(ChannelSpec::from_json(channel)?)),
            None => Err(UrlError::InvalidSpec(
                "expected 'channels' or 'channel'".to_string(),
            )),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// A successful encode.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeResponse {
    /// The share URL.
    pub url: String,
    /// QR image as a data URI, when rendering succeeded.
    pub qr_code: Option<String>,
    /// Number of channels, for channel-set requests.
    pub channels_count: Option<usize>,
    /// Serialized payload size in bytes.
    pub encoded_size: usize,
    /// The URL as decoded by the self-check.
    pub config: Fields,
}

impl EncodeResponse {
    /// Render as a JSON value.
    pub fn to_value(&self) -> Value {
        self.serialize(serde_json::value::Serializer)
            .unwrap_or(Value::Null)
    }

    /// Render an encode result as a success or failure mapping.
    pub fn render(result: &UrlResult<EncodeResponse>) -> Value {
        match result {
            Ok(response) => response.to_value(),
            Err(err) => serde_json::json!({"success": false, "error": err.to_string()}),
        }
    }
}

impl Serialize for EncodeResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("success", &true)?;
        map.serialize_entry("url", &self.url)?;
        map.serialize_entry("qr_code", &self.qr_code)?;
        if let Some(count) = self.channels_count {
            map.serialize_entry("channels_count", &count)?;
        }
        map.serialize_entry("encoded_size", &self.encoded_size)?;
        map.serialize_entry(ResultSection::Config.key(), &self.config)?;
        map.end()
    }
}

// ============================================================================
// Encoder
// ============================================================================

/// Channel URL encoder.
pub struct Encoder {
    config: CodecConfig,
    decoder: Decoder,
    renderer: Option<Box<dyn QrRenderer + Send + Sync>>,
}

impl std::fmt::Debug for Encoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encoder")
            .field("config", &self.config)
            .field("qr", &self.renderer.is_some())
            .finish()
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl Encoder {
    /// Create an encoder that renders SVG QR codes.
    pub fn new(config: CodecConfig) -> Self {
        Encoder {
            config,
            decoder: Decoder::new(),
            renderer: Some(Box::new(SvgQrRenderer::default())),
        }
    }

    /// Replace the QR renderer.
    pub fn with_renderer(mut self, renderer: Box<dyn QrRenderer + Send + Sync>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Skip QR rendering; `qr_code` will be `None`.
    pub fn without_qr(mut self) -> Self {
        self.renderer = None;
        self
    }

    /// Encode a parsed request.
    pub fn encode(&self, request: &EncodeRequest) -> UrlResult<EncodeResponse> {
        match request {
            EncodeRequest::ChannelSet { channels, lora } => {
                self.encode_channel_set(channels, lora.as_ref())
            }
            EncodeRequest::SingleChannel(channel) => self.encode_single_channel(channel),
        }
    }

    /// Parse and encode a JSON request.
    pub fn encode_json(&self, request: &Value) -> UrlResult<EncodeResponse> {
        self.encode(&EncodeRequest::from_json(request)?)
    }

    /// Encode channels and optional radio settings as a `ChannelSet` URL.
    ///
    /// An empty channel list is accepted only alongside a non-empty radio block.
    pub fn encode_channel_set(
        &self,
        channels: &[ChannelSpec],
        lora: Option<&LoRaSpec>,
    ) -> UrlResult<EncodeResponse> {
        let lora_config = lora.map(LoRaSpec::to_config).filter(|c| !c.is_empty());
        if channels.is_empty() && lora_config.is_none() {
            return Err(UrlError::InvalidSpec(
                "at least one channel or a non-empty lora_config is required".to_string(),
            ));
        }
        // Only the settings travel; slot order stands in for the index.
        let record = ChannelSet {
            settings: channels.iter().map(ChannelSpec::to_settings).collect(),
            lora_config,
        };
        self.finish(
            &record.encode(),
            Some(channels.len()),
            &ParsedMessage::ChannelSet(record),
        )
    }

    /// Encode one channel as a bare `Channel` URL.
    ///
    /// Fails with [`UrlError::SelfCheckFailed`] when a receiver would read the
    /// bytes as a different record. A set `uplink_enabled` does this: the
    /// settings block then parses as a non-empty `ChannelSet` radio block.
    pub fn encode_single_channel(&self, channel: &ChannelSpec) -> UrlResult<EncodeResponse> {
        let record = channel.to_channel()?;
        self.finish(&record.encode(), None, &ParsedMessage::Channel(record))
    }

    fn finish(
        &self,
        payload: &[u8],
        channels_count: Option<usize>,
        expected: &ParsedMessage,
    ) -> UrlResult<EncodeResponse> {
        let encoded = base64url::encode(payload);
        let url = format!("{}#{}", self.config.channel_url_prefix, encoded);
        debug!("Encoder: {} bytes -> {}", payload.len(), url);

        let config = self.self_check(&url, expected)?;
        let qr_code = self.renderer.as_ref().and_then(|renderer| {
            renderer
                .render_data_uri(&url)
                .map_err(|e| warn!("Encoder: QR rendering failed: {}", e))
                .ok()
        });

        Ok(EncodeResponse {
            url,
            qr_code,
            channels_count,
            encoded_size: payload.len(),
            config,
        })
    }

    /// Decode `url` as a receiver would and require the record that was encoded.
    fn self_check(&self, url: &str, expected: &ParsedMessage) -> UrlResult<Fields> {
        let result = self
            .decoder
            .decode_url_as(url, UrlClassification::ChannelLike)
            .and_then(|decoded| decoded.outcome.into_result())
            .and_then(|record| {
                if record.schema != expected.schema_name() {
                    return Err(UrlError::SelfCheckFailed(format!(
                        "decoded as {} instead of {}",
                        record.schema,
                        expected.schema_name()
                    )));
                }
                let actual = record.message.channel_count();
                if actual != expected.channel_count() {
                    return Err(UrlError::SelfCheckFailed(format!(
                        "decoded {} channels, expected {}",
                        actual.unwrap_or(0),
                        expected.channel_count().unwrap_or(0)
                    )));
                }
                // Compared as fields: a NaN float never equals itself.
                if record.fields != expected.to_fields() {
                    return Err(UrlError::SelfCheckFailed(format!(
                        "decoded {} differs from the encoded record",
                        record.schema
                    )));
                }
                debug!("Encoder: self-check decoded {}", record.schema);
                Ok(record.fields)
            });

        result.map_err(|err| {
            warn!("Encoder: self-check failed for {}: {}", url, err);
            match err {
                UrlError::SelfCheckFailed(_) => err,
                other => UrlError::SelfCheckFailed(other.to_string()),
            }
        })
    }
}
