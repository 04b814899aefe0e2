//! Enumeration tables.
//!
//! Enum fields are kept as raw `i32` values on the message structs so that
//! values unknown to this crate survive a decode. The tables below map them
//! to and from their protobuf names.

use serde_json::Value;

/// A fixed name/value table for one protobuf enum.
#[derive(Debug)]
pub struct EnumTable {
    /// Protobuf enum name.
    pub name: &'static str,
    entries: &'static [(i32, &'static str)],
}

impl EnumTable {
    /// Create a table over a static list of `(value, NAME)` pairs.
    pub const fn new(name: &'static str, entries: &'static [(i32, &'static str)]) -> Self {
        EnumTable { name, entries }
    }

    /// Name for a numeric value.
    pub fn name_of(&self, value: i32) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, name)| *name)
    }

    /// Numeric value for an exact protobuf name.
    pub fn value_of(&self, name: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(v, _)| *v)
    }

    /// JSON rendering: the name when known, otherwise the bare number.
    pub fn render(&self, value: i32) -> Value {
        match self.name_of(value) {
            Some(name) => Value::String(name.to_string()),
            None => Value::from(value),
        }
    }

    /// All `(value, NAME)` pairs in declaration order.
    pub fn entries(&self) -> &'static [(i32, &'static str)] {
        self.entries
    }
}

// ============================================================================
// Channel Role
// ============================================================================

/// Role of a channel slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelRole {
    /// Slot unused.
    Disabled,
    /// The primary channel; exactly one per device.
    Primary,
    /// An additional channel.
    Secondary,
}

impl ChannelRole {
    /// Wire value.
    pub fn as_i32(self) -> i32 {
        match self {
            ChannelRole::Disabled => 0,
            ChannelRole::Primary => 1,
            ChannelRole::Secondary => 2,
        }
    }

    /// Parse from a wire value.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(ChannelRole::Disabled),
            1 => Some(ChannelRole::Primary),
            2 => Some(ChannelRole::Secondary),
            _ => None,
        }
    }

    /// Parse a role name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        CHANNEL_ROLE
            .value_of(&name.trim().to_ascii_uppercase())
            .and_then(Self::from_i32)
    }
}

/// `Channel.Role`.
pub static CHANNEL_ROLE: EnumTable =
    EnumTable::new("Role", &[(0, "DISABLED"), (1, "PRIMARY"), (2, "SECONDARY")]);

// ============================================================================
// LoRa Configuration
// ============================================================================

/// `Config.LoRaConfig.ModemPreset`.
pub static MODEM_PRESET: EnumTable = EnumTable::new(
    "ModemPreset",
    &[
        (0, "LONG_FAST"),
        (1, "LONG_SLOW"),
        (2, "VERY_LONG_SLOW"),
        (3, "MEDIUM_SLOW"),
        (4, "MEDIUM_FAST"),
        (5, "SHORT_SLOW"),
        (6, "SHORT_FAST"),
        (7, "LONG_MODERATE"),
        (8, "SHORT_TURBO"),
    ],
);

/// Lowercase preset spellings used by older apps and share links.
const LEGACY_MODEM_PRESET_ALIASES: &[(&str, i32)] = &[
    ("longfast", 0),
    ("longslow", 1),
    ("verylongslow", 2),
    ("vlongslow", 2),
    ("mediumslow", 3),
    ("medslow", 3),
    ("mediumfast", 4),
    ("medfast", 4),
    ("shortslow", 5),
    ("shortfast", 6),
    ("longmoderate", 7),
    ("longmod", 7),
    ("shortturbo", 8),
];

/// Look up a modem preset by protobuf name (any case) or legacy alias.
pub fn modem_preset_from_name(name: &str) -> Option<i32> {
    let name = name.trim();
    MODEM_PRESET
        .value_of(&name.to_ascii_uppercase())
        .or_else(|| {
            let lower = name.to_ascii_lowercase();
            LEGACY_MODEM_PRESET_ALIASES
                .iter()
                .find(|(alias, _)| *alias == lower)
                .map(|(_, code)| *code)
        })
}

/// `Config.LoRaConfig.RegionCode`.
pub static REGION_CODE: EnumTable = EnumTable::new(
    "RegionCode",
    &[
        (0, "UNSET"),
        (1, "US"),
        (2, "EU_433"),
        (3, "EU_868"),
        (4, "CN"),
        (5, "JP"),
        (6, "ANZ"),
        (7, "KR"),
        (8, "TW"),
        (9, "RU"),
        (10, "IN"),
        (11, "NZ_865"),
        (12, "TH"),
        (13, "LORA_24"),
        (14, "UA_433"),
        (15, "UA_868"),
        (16, "MY_433"),
        (17, "MY_919"),
        (18, "SG_923"),
        (19, "PH_433"),
        (20, "PH_868"),
        (21, "PH_915"),
        (22, "ANZ_433"),
        (23, "KZ_433"),
        (24, "KZ_863"),
        (25, "NP_865"),
        (26, "BR_902"),
    ],
);

/// Look up a region by protobuf name, ignoring case.
pub fn region_from_name(name: &str) -> Option<i32> {
    REGION_CODE.value_of(&name.trim().to_ascii_uppercase())
}

// ============================================================================
// Node Information
// ============================================================================

/// `Config.DeviceConfig.Role`.
pub static DEVICE_ROLE: EnumTable = EnumTable::new(
    "Role",
    &[
        (0, "CLIENT"),
        (1, "CLIENT_MUTE"),
        (2, "ROUTER"),
        (3, "ROUTER_CLIENT"),
        (4, "REPEATER"),
        (5, "TRACKER"),
        (6, "SENSOR"),
        (7, "TAK"),
        (8, "CLIENT_HIDDEN"),
        (9, "LOST_AND_FOUND"),
        (10, "TAK_TRACKER"),
        (11, "ROUTER_LATE"),
    ],
);

/// `HardwareModel`.
pub static HARDWARE_MODEL: EnumTable = EnumTable::new(
    "HardwareModel",
    &[
        (0, "UNSET"),
        (1, "TLORA_V2"),
        (2, "TLORA_V1"),
        (3, "TLORA_V2_1_1P6"),
        (4, "TBEAM"),
        (5, "HELTEC_V2_0"),
        (6, "TBEAM_V0P7"),
        (7, "T_ECHO"),
        (8, "TLORA_V1_1P3"),
        (9, "RAK4631"),
        (10, "HELTEC_V2_1"),
        (11, "HELTEC_V1"),
        (12, "LILYGO_TBEAM_S3_CORE"),
        (13, "RAK11200"),
        (14, "NANO_G1"),
        (15, "TLORA_V2_1_1P8"),
        (16, "TLORA_T3_S3"),
        (17, "NANO_G1_EXPLORER"),
        (18, "NANO_G2_ULTRA"),
        (19, "LORA_TYPE"),
        (20, "WIPHONE"),
        (21, "WIO_WM1110"),
        (22, "RAK2560"),
        (23, "HELTEC_HRU_3601"),
        (24, "HELTEC_WIRELESS_BRIDGE"),
        (25, "STATION_G1"),
        (26, "RAK11310"),
        (27, "SENSELORA_RP2040"),
        (28, "SENSELORA_S3"),
        (29, "CANARYONE"),
        (30, "RP2040_LORA"),
        (31, "STATION_G2"),
        (32, "LORA_RELAY_V1"),
        (33, "NRF52840DK"),
        (34, "PPR"),
        (35, "GENIEBLOCKS"),
        (36, "NRF52_UNKNOWN"),
        (37, "PORTDUINO"),
        (38, "ANDROID_SIM"),
        (39, "DIY_V1"),
        (40, "NRF52840_PCA10059"),
        (41, "DR_DEV"),
        (42, "M5STACK"),
        (43, "HELTEC_V3"),
        (44, "HELTEC_WSL_V3"),
        (45, "BETAFPV_2400_TX"),
        (46, "BETAFPV_900_NANO_TX"),
        (47, "RPI_PICO"),
        (48, "HELTEC_WIRELESS_TRACKER"),
        (49, "HELTEC_WIRELESS_PAPER"),
        (50, "T_DECK"),
        (51, "T_WATCH_S3"),
        (52, "PICOMPUTER_S3"),
        (53, "HELTEC_HT62"),
        (54, "EBYTE_ESP32_S3"),
        (55, "ESP32_S3_PICO"),
        (56, "CHATTER_2"),
        (57, "HELTEC_WIRELESS_PAPER_V1_0"),
        (58, "HELTEC_WIRELESS_TRACKER_V1_0"),
        (59, "UNPHONE"),
        (60, "TD_LORAC"),
        (61, "CDEBYTE_EORA_S3"),
        (62, "TWC_MESH_V4"),
        (63, "NRF52_PROMICRO_DIY"),
        (64, "RADIOMASTER_900_BANDIT_NANO"),
        (65, "HELTEC_CAPSULE_SENSOR_V3"),
        (66, "HELTEC_VISION_MASTER_T190"),
        (67, "HELTEC_VISION_MASTER_E213"),
        (68, "HELTEC_VISION_MASTER_E290"),
        (69, "HELTEC_MESH_NODE_T114"),
        (255, "PRIVATE_HW"),
    ],
);

/// `Position.LocSource`.
pub static LOCATION_SOURCE: EnumTable = EnumTable::new(
    "LocSource",
    &[
        (0, "LOC_UNSET"),
        (1, "LOC_MANUAL"),
        (2, "LOC_INTERNAL"),
        (3, "LOC_EXTERNAL"),
    ],
);

/// `Position.AltSource`.
pub static ALTITUDE_SOURCE: EnumTable = EnumTable::new(
    "AltSource",
    &[
        (0, "ALT_UNSET"),
        (1, "ALT_MANUAL"),
        (2, "ALT_INTERNAL"),
        (3, "ALT_EXTERNAL"),
        (4, "ALT_BAROMETRIC"),
    ],
);

// ============================================================================
// Mesh Packets
// ============================================================================

/// `MeshPacket.Priority`.
pub static PRIORITY: EnumTable = EnumTable::new(
    "Priority",
    &[
        (0, "UNSET"),
        (1, "MIN"),
        (10, "BACKGROUND"),
        (64, "DEFAULT"),
        (70, "RELIABLE"),
        (80, "RESPONSE"),
        (100, "HIGH"),
        (110, "ALERT"),
        (120, "ACK"),
        (127, "MAX"),
    ],
);

/// `PortNum`.
pub static PORT_NUM: EnumTable = EnumTable::new(
    "PortNum",
    &[
        (0, "UNKNOWN_APP"),
        (1, "TEXT_MESSAGE_APP"),
        (2, "REMOTE_HARDWARE_APP"),
        (3, "POSITION_APP"),
        (4, "NODEINFO_APP"),
        (5, "ROUTING_APP"),
        (6, "ADMIN_APP"),
        (7, "TEXT_MESSAGE_COMPRESSED_APP"),
        (8, "WAYPOINT_APP"),
        (9, "AUDIO_APP"),
        (10, "DETECTION_SENSOR_APP"),
        (32, "REPLY_APP"),
        (33, "IP_TUNNEL_APP"),
        (34, "PAXCOUNTER_APP"),
        (64, "SERIAL_APP"),
        (65, "STORE_FORWARD_APP"),
        (66, "RANGE_TEST_APP"),
        (67, "TELEMETRY_APP"),
        (68, "ZPS_APP"),
        (69, "SIMULATOR_APP"),
        (70, "TRACEROUTE_APP"),
        (71, "NEIGHBORINFO_APP"),
        (72, "ATAK_PLUGIN"),
        (73, "MAP_REPORT_APP"),
        (256, "PRIVATE_APP"),
        (257, "ATAK_FORWARDER"),
        (511, "MAX"),
    ],
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_role_names() {
        assert_eq!(ChannelRole::from_name("primary"), Some(ChannelRole::Primary));
        assert_eq!(ChannelRole::from_name("SECONDARY"), Some(ChannelRole::Secondary));
        assert_eq!(ChannelRole::from_name("Disabled"), Some(ChannelRole::Disabled));
        assert_eq!(ChannelRole::from_name("admin"), None);
        assert_eq!(ChannelRole::Primary.as_i32(), 1);
    }

    #[test]
    fn test_modem_preset_lookup() {
        assert_eq!(modem_preset_from_name("LONG_FAST"), Some(0));
        assert_eq!(modem_preset_from_name("medium_fast"), Some(4));
        assert_eq!(modem_preset_from_name("shortturbo"), Some(8));
        assert_eq!(modem_preset_from_name("vlongslow"), Some(2));
        assert_eq!(modem_preset_from_name("warp"), None);
    }

    #[test]
    fn test_region_lookup() {
        assert_eq!(region_from_name("US"), Some(1));
        assert_eq!(region_from_name("eu_868"), Some(3));
        assert_eq!(region_from_name("ATLANTIS"), None);
    }

    #[test]
    fn test_render_unknown_value_as_number() {
        assert_eq!(PORT_NUM.render(1), Value::from("TEXT_MESSAGE_APP"));
        assert_eq!(PORT_NUM.render(9999), Value::from(9999));
    }
}
