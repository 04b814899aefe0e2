//! Channel messages: `Channel`, `ChannelSettings`, `ModuleSettings`,
//! `ChannelSet` and the `LoRaConfig` block that travels with a channel set.
//!
//! ## Field numbers
//!
//! | Message          | # | Field                 | Type            |
//! |------------------|---|-----------------------|-----------------|
//! | ModuleSettings   | 1 | position_precision    | uint32          |
//! |                  | 2 | is_muted              | bool            |
//! | ChannelSettings  | 1 | channel_num           | uint32          |
//! |                  | 2 | psk                   | bytes           |
//! |                  | 3 | name                  | string          |
//! |                  | 4 | id                    | fixed32         |
//! |                  | 5 | uplink_enabled        | bool            |
//! |                  | 6 | downlink_enabled      | bool            |
//! |                  | 7 | module_settings       | ModuleSettings  |
//! | Channel          | 1 | index                 | int32           |
//! |                  | 2 | settings              | ChannelSettings |
//! |                  | 3 | role                  | Role            |
//! | ChannelSet       | 1 | settings (repeated)   | ChannelSettings |
//! |                  | 2 | lora_config           | LoRaConfig      |

use crate::enums::{ChannelRole, CHANNEL_ROLE, MODEM_PRESET, REGION_CODE};
use crate::message::{merge_nested, set_if};
use crate::wire::{push_repeated_uint32, utf8, WireValue, WireWriter};
use crate::{Fields, FieldsBuilder, Message, ProtoResult};

/// Largest PSK the firmware accepts (AES-256).
pub const MAX_PSK_SIZE: usize = 32;

// ============================================================================
// ModuleSettings
// ============================================================================

/// Per-channel module settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleSettings {
    /// Bits of position precision shared on this channel; 32 is full precision.
    pub position_precision: Option<u32>,
    /// Whether the client should suppress notifications for this channel.
    pub is_muted: Option<bool>,
}

impl Message for ModuleSettings {
    const NAME: &'static str = "ModuleSettings";

    fn merge_field(&mut self, field: u32, value: WireValue<'_>) -> ProtoResult<()> {
        match field {
            1 => set_if(&mut self.position_precision, value.as_uint32()),
            2 => set_if(&mut self.is_muted, value.as_bool()),
            _ => {}
        }
        Ok(())
    }

    fn encode_fields(&self, w: &mut WireWriter) {
        w.uint32(1, self.position_precision);
        w.boolean(2, self.is_muted);
    }

    fn to_fields(&self) -> Fields {
        FieldsBuilder::new()
            .uint("position_precision", self.position_precision)
            .boolean("is_muted", self.is_muted)
            .build()
    }
}

// ============================================================================
// ChannelSettings
// ============================================================================

/// Settings of one channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelSettings {
    /// Deprecated frequency slot override.
    pub channel_num: Option<u32>,
    /// Pre-shared key: empty (no crypto), one byte (default key index) or 16/32 bytes.
    pub psk: Option<Vec<u8>>,
    /// Channel name.
    pub name: Option<String>,
    /// Unique channel id.
    pub id: Option<u32>,
    /// Forward messages from the mesh to MQTT.
    pub uplink_enabled: Option<bool>,
    /// Forward messages from MQTT to the mesh.
    pub downlink_enabled: Option<bool>,
    /// Module settings.
    pub module_settings: Option<ModuleSettings>,
}

impl Message for ChannelSettings {
    const NAME: &'static str = "ChannelSettings";

    fn merge_field(&mut self, field: u32, value: WireValue<'_>) -> ProtoResult<()> {
        match field {
            1 => set_if(&mut self.channel_num, value.as_uint32()),
            2 => set_if(&mut self.psk, value.as_bytes().map(<[u8]>::to_vec)),
            3 => {
                if let Some(bytes) = value.as_bytes() {
                    self.name = Some(utf8(bytes, "ChannelSettings.name")?);
                }
            }
            4 => set_if(&mut self.id, value.as_fixed32()),
            5 => set_if(&mut self.uplink_enabled, value.as_bool()),
            6 => set_if(&mut self.downlink_enabled, value.as_bool()),
            7 => merge_nested(&mut self.module_settings, value)?,
            _ => {}
        }
        Ok(())
    }

    fn encode_fields(&self, w: &mut WireWriter) {
        w.uint32(1, self.channel_num);
        w.bytes(2, self.psk.as_deref());
        w.string(3, self.name.as_deref());
        w.fixed32(4, self.id);
        w.boolean(5, self.uplink_enabled);
        w.boolean(6, self.downlink_enabled);
        w.message(7, self.module_settings.as_ref());
    }

    fn to_fields(&self) -> Fields {
        FieldsBuilder::new()
            .uint("channel_num", self.channel_num)
            .bytes("psk", self.psk.as_deref())
            .string("name", self.name.as_deref())
            .uint("id", self.id)
            .boolean("uplink_enabled", self.uplink_enabled)
            .boolean("downlink_enabled", self.downlink_enabled)
            .message("module_settings", self.module_settings.as_ref())
            .build()
    }
}

// ============================================================================
// Channel
// ============================================================================

/// A channel slot: index, settings and role.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Channel {
    /// Slot index; zero is a valid, meaningful index.
    pub index: Option<i32>,
    /// Channel settings.
    pub settings: Option<ChannelSettings>,
    /// Raw role value, see [`ChannelRole`].
    pub role: Option<i32>,
}

impl Channel {
    /// Role as a typed value, when present and known.
    pub fn channel_role(&self) -> Option<ChannelRole> {
        self.role.and_then(ChannelRole::from_i32)
    }
}

impl Message for Channel {
    const NAME: &'static str = "Channel";

    fn merge_field(&mut self, field: u32, value: WireValue<'_>) -> ProtoResult<()> {
        match field {
            1 => set_if(&mut self.index, value.as_int32()),
            2 => merge_nested(&mut self.settings, value)?,
            3 => set_if(&mut self.role, value.as_int32()),
            _ => {}
        }
        Ok(())
    }

    fn encode_fields(&self, w: &mut WireWriter) {
        w.int32(1, self.index);
        w.message(2, self.settings.as_ref());
        w.enumeration(3, self.role);
    }

    fn to_fields(&self) -> Fields {
        FieldsBuilder::new()
            .int("index", self.index)
            .message("settings", self.settings.as_ref())
            .enumeration("role", self.role, &CHANNEL_ROLE)
            .build()
    }
}

// ============================================================================
// LoRaConfig
// ============================================================================

/// Radio parameters shared through a channel set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoRaConfig {
    /// Use `modem_preset` instead of the explicit bandwidth/SF/CR.
    pub use_preset: Option<bool>,
    /// Raw `ModemPreset` value.
    pub modem_preset: Option<i32>,
    /// Bandwidth in kHz.
    pub bandwidth: Option<u32>,
    /// Spreading factor.
    pub spread_factor: Option<u32>,
    /// Coding rate denominator.
    pub coding_rate: Option<u32>,
    /// Frequency offset in MHz.
    pub frequency_offset: Option<f32>,
    /// Raw `RegionCode` value.
    pub region: Option<i32>,
    /// Maximum hops.
    pub hop_limit: Option<u32>,
    /// Transmitter enabled.
    pub tx_enabled: Option<bool>,
    /// Transmit power in dBm.
    pub tx_power: Option<i32>,
    /// Frequency slot.
    pub channel_num: Option<u32>,
    /// Ignore the regional duty cycle limit.
    pub override_duty_cycle: Option<bool>,
    /// SX126x boosted receive gain.
    pub sx126x_rx_boosted_gain: Option<bool>,
    /// Explicit frequency in MHz.
    pub override_frequency: Option<f32>,
    /// Disable the PA fan.
    pub pa_fan_disabled: Option<bool>,
    /// Node numbers whose packets are dropped.
    pub ignore_incoming: Vec<u32>,
    /// Drop packets that came in via MQTT.
    pub ignore_mqtt: Option<bool>,
    /// Allow uplinking this device's packets to MQTT.
    pub config_ok_to_mqtt: Option<bool>,
}

impl Message for LoRaConfig {
    const NAME: &'static str = "LoRaConfig";

    fn merge_field(&mut self, field: u32, value: WireValue<'_>) -> ProtoResult<()> {
        match field {
            1 => set_if(&mut self.use_preset, value.as_bool()),
            2 => set_if(&mut self.modem_preset, value.as_int32()),
            3 => set_if(&mut self.bandwidth, value.as_uint32()),
            4 => set_if(&mut self.spread_factor, value.as_uint32()),
            5 => set_if(&mut self.coding_rate, value.as_uint32()),
            6 => set_if(&mut self.frequency_offset, value.as_float()),
            7 => set_if(&mut self.region, value.as_int32()),
            8 => set_if(&mut self.hop_limit, value.as_uint32()),
            9 => set_if(&mut self.tx_enabled, value.as_bool()),
            10 => set_if(&mut self.tx_power, value.as_int32()),
            11 => set_if(&mut self.channel_num, value.as_uint32()),
            12 => set_if(&mut self.override_duty_cycle, value.as_bool()),
            13 => set_if(&mut self.sx126x_rx_boosted_gain, value.as_bool()),
            14 => set_if(&mut self.override_frequency, value.as_float()),
            15 => set_if(&mut self.pa_fan_disabled, value.as_bool()),
            103 => push_repeated_uint32(value, &mut self.ignore_incoming)?,
            104 => set_if(&mut self.ignore_mqtt, value.as_bool()),
            105 => set_if(&mut self.config_ok_to_mqtt, value.as_bool()),
            _ => {}
        }
        Ok(())
    }

    fn encode_fields(&self, w: &mut WireWriter) {
        w.boolean(1, self.use_preset);
        w.enumeration(2, self.modem_preset);
        w.uint32(3, self.bandwidth);
        w.uint32(4, self.spread_factor);
        w.uint32(5, self.coding_rate);
        w.float(6, self.frequency_offset);
        w.enumeration(7, self.region);
        w.uint32(8, self.hop_limit);
        w.boolean(9, self.tx_enabled);
        w.int32(10, self.tx_power);
        w.uint32(11, self.channel_num);
        w.boolean(12, self.override_duty_cycle);
        w.boolean(13, self.sx126x_rx_boosted_gain);
        w.float(14, self.override_frequency);
        w.boolean(15, self.pa_fan_disabled);
        w.packed_uint32(103, &self.ignore_incoming);
        w.boolean(104, self.ignore_mqtt);
        w.boolean(105, self.config_ok_to_mqtt);
    }

    fn to_fields(&self) -> Fields {
        FieldsBuilder::new()
            .boolean("use_preset", self.use_preset)
            .enumeration("modem_preset", self.modem_preset, &MODEM_PRESET)
            .uint("bandwidth", self.bandwidth)
            .uint("spread_factor", self.spread_factor)
            .uint("coding_rate", self.coding_rate)
            .float("frequency_offset", self.frequency_offset)
            .enumeration("region", self.region, &REGION_CODE)
            .uint("hop_limit", self.hop_limit)
            .boolean("tx_enabled", self.tx_enabled)
            .int("tx_power", self.tx_power)
            .uint("channel_num", self.channel_num)
            .boolean("override_duty_cycle", self.override_duty_cycle)
            .boolean("sx126x_rx_boosted_gain", self.sx126x_rx_boosted_gain)
            .float("override_frequency", self.override_frequency)
            .boolean("pa_fan_disabled", self.pa_fan_disabled)
            .uints("ignore_incoming", &self.ignore_incoming)
            .boolean("ignore_mqtt", self.ignore_mqtt)
            .boolean("config_ok_to_mqtt", self.config_ok_to_mqtt)
            .build()
    }
}

// ============================================================================
// ChannelSet
// ============================================================================

/// The record embedded in a channel share URL.
///
/// Holds channel settings only; slot indices and roles are implied by
/// position (the first entry is the primary channel).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelSet {
    /// Channel settings in slot order.
    pub settings: Vec<ChannelSettings>,
    /// Radio parameters.
    pub lora_config: Option<LoRaConfig>,
}

impl Message for ChannelSet {
    const NAME: &'static str = "ChannelSet";

    fn merge_field(&mut self, field: u32, value: WireValue<'_>) -> ProtoResult<()> {
        match field {
            1 => {
                if let Some(bytes) = value.as_bytes() {
                    self.settings.push(ChannelSettings::decode(bytes)?);
                }
            }
            2 => merge_nested(&mut self.lora_config, value)?,
            _ => {}
        }
        Ok(())
    }

    fn encode_fields(&self, w: &mut WireWriter) {
        w.repeated_message(1, &self.settings);
        w.message(2, self.lora_config.as_ref());
    }

    fn to_fields(&self) -> Fields {
        FieldsBuilder::new()
            .messages("settings", &self.settings)
            .message("lora_config", self.lora_config.as_ref())
            .build()
    }
}
