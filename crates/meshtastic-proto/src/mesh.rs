//! Node and packet messages: `User`, `Position`, `DeviceMetrics`,
//! `NodeInfo`, `MyNodeInfo`, `Data` and `MeshPacket`.

use crate::enums::{
    ALTITUDE_SOURCE, DEVICE_ROLE, HARDWARE_MODEL, LOCATION_SOURCE, PORT_NUM, PRIORITY,
};
use crate::message::{merge_nested, set_if};
use crate::wire::{utf8, WireValue, WireWriter};
use crate::{Fields, FieldsBuilder, Message, ProtoResult};

fn merge_string(slot: &mut Option<String>, value: WireValue<'_>, field: &str) -> ProtoResult<()> {
    if let Some(bytes) = value.as_bytes() {
        *slot = Some(utf8(bytes, field)?);
    }
    Ok(())
}

fn merge_bytes(slot: &mut Option<Vec<u8>>, value: WireValue<'_>) {
    set_if(slot, value.as_bytes().map(<[u8]>::to_vec));
}

// ============================================================================
// User
// ============================================================================

/// Identity a node broadcasts about itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    /// Node id, e.g. `!a1b2c3d4`.
    pub id: Option<String>,
    /// Full display name.
    pub long_name: Option<String>,
    /// Up to four character name.
    pub short_name: Option<String>,
    /// Deprecated MAC address.
    pub macaddr: Option<Vec<u8>>,
    /// Raw `HardwareModel` value.
    pub hw_model: Option<i32>,
    /// Licensed amateur radio operator.
    pub is_licensed: Option<bool>,
    /// Raw device `Role` value.
    pub role: Option<i32>,
    /// X25519 public key.
    pub public_key: Option<Vec<u8>>,
    /// Node does not accept direct messages.
    pub is_unmessagable: Option<bool>,
}

impl Message for User {
    const NAME: &'static str = "User";

    fn merge_field(&mut self, field: u32, value: WireValue<'_>) -> ProtoResult<()> {
        match field {
            1 => merge_string(&mut self.id, value, "User.id")?,
            2 => merge_string(&mut self.long_name, value, "User.long_name")?,
            3 => merge_string(&mut self.short_name, value, "User.short_name")?,
            4 => merge_bytes(&mut self.macaddr, value),
            5 => set_if(&mut self.hw_model, value.as_int32()),
            6 => set_if(&mut self.is_licensed, value.as_bool()),
            7 => set_if(&mut self.role, value.as_int32()),
            8 => merge_bytes(&mut self.public_key, value),
            9 => set_if(&mut self.is_unmessagable, value.as_bool()),
            _ => {}
        }
        Ok(())
    }

    fn encode_fields(&self, w: &mut WireWriter) {
        w.string(1, self.id.as_deref());
        w.string(2, self.long_name.as_deref());
        w.string(3, self.short_name.as_deref());
        w.bytes(4, self.macaddr.as_deref());
        w.enumeration(5, self.hw_model);
        w.boolean(6, self.is_licensed);
        w.enumeration(7, self.role);
        w.bytes(8, self.public_key.as_deref());
        w.boolean(9, self.is_unmessagable);
    }

    fn to_fields(&self) -> Fields {
        FieldsBuilder::new()
            .string("id", self.id.as_deref())
            .string("long_name", self.long_name.as_deref())
            .string("short_name", self.short_name.as_deref())
            .bytes("macaddr", self.macaddr.as_deref())
            .enumeration("hw_model", self.hw_model, &HARDWARE_MODEL)
            .boolean("is_licensed", self.is_licensed)
            .enumeration("role", self.role, &DEVICE_ROLE)
            .bytes("public_key", self.public_key.as_deref())
            .boolean("is_unmessagable", self.is_unmessagable)
            .build()
    }
}

// ============================================================================
// Position
// ============================================================================

/// A position report. Coordinates are degrees × 1e7.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Position {
    pub latitude_i: Option<i32>,
    pub longitude_i: Option<i32>,
    /// Metres above mean sea level.
    pub altitude: Option<i32>,
    /// Seconds since the epoch.
    pub time: Option<u32>,
    pub location_source: Option<i32>,
    pub altitude_source: Option<i32>,
    pub timestamp: Option<u32>,
    pub timestamp_millis_adjust: Option<i32>,
    pub altitude_hae: Option<i32>,
    pub altitude_geoidal_separation: Option<i32>,
    pub pdop: Option<u32>,
    pub hdop: Option<u32>,
    pub vdop: Option<u32>,
    pub gps_accuracy: Option<u32>,
    pub ground_speed: Option<u32>,
    pub ground_track: Option<u32>,
    pub fix_quality: Option<u32>,
    pub fix_type: Option<u32>,
    pub sats_in_view: Option<u32>,
    pub sensor_id: Option<u32>,
    pub next_update: Option<u32>,
    pub seq_number: Option<u32>,
    pub precision_bits: Option<u32>,
}

impl Position {
    /// Latitude in degrees.
    pub fn latitude(&self) -> Option<f64> {
        self.latitude_i.map(|v| f64::from(v) * 1e-7)
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> Option<f64> {
        self.longitude_i.map(|v| f64::from(v) * 1e-7)
    }
}

impl Message for Position {
    const NAME: &'static str = "Position";

    fn merge_field(&mut self, field: u32, value: WireValue<'_>) -> ProtoResult<()> {
        match field {
            1 => set_if(&mut self.latitude_i, value.as_sfixed32()),
            2 => set_if(&mut self.longitude_i, value.as_sfixed32()),
            3 => set_if(&mut self.altitude, value.as_int32()),
            4 => set_if(&mut self.time, value.as_fixed32()),
            5 => set_if(&mut self.location_source, value.as_int32()),
            6 => set_if(&mut self.altitude_source, value.as_int32()),
            7 => set_if(&mut self.timestamp, value.as_fixed32()),
            8 => set_if(&mut self.timestamp_millis_adjust, value.as_int32()),
            9 => set_if(&mut self.altitude_hae, value.as_sint32()),
            10 => set_if(&mut self.altitude_geoidal_separation, value.as_sint32()),
            11 => set_if(&mut self.pdop, value.as_uint32()),
            12 => set_if(&mut self.hdop, value.as_uint32()),
            13 => set_if(&mut self.vdop, value.as_uint32()),
            14 => set_if(&mut self.gps_accuracy, value.as_uint32()),
            15 => set_if(&mut self.ground_speed, value.as_uint32()),
            16 => set_if(&mut self.ground_track, value.as_uint32()),
            17 => set_if(&mut self.fix_quality, value.as_uint32()),
            18 => set_if(&mut self.fix_type, value.as_uint32()),
            19 => set_if(&mut self.sats_in_view, value.as_uint32()),
            20 => set_if(&mut self.sensor_id, value.as_uint32()),
            21 => set_if(&mut self.next_update, value.as_uint32()),
            22 => set_if(&mut self.seq_number, value.as_uint32()),
            23 => set_if(&mut self.precision_bits, value.as_uint32()),
            _ => {}
        }
        Ok(())
    }

    fn encode_fields(&self, w: &mut WireWriter) {
        w.sfixed32(1, self.latitude_i);
        w.sfixed32(2, self.longitude_i);
        w.int32(3, self.altitude);
        w.fixed32(4, self.time);
        w.enumeration(5, self.location_source);
        w.enumeration(6, self.altitude_source);
        w.fixed32(7, self.timestamp);
        w.int32(8, self.timestamp_millis_adjust);
        w.sint32(9, self.altitude_hae);
        w.sint32(10, self.altitude_geoidal_separation);
        w.uint32(11, self.pdop);
        w.uint32(12, self.hdop);
        w.uint32(13, self.vdop);
        w.uint32(14, self.gps_accuracy);
        w.uint32(15, self.ground_speed);
        w.uint32(16, self.ground_track);
        w.uint32(17, self.fix_quality);
        w.uint32(18, self.fix_type);
        w.uint32(19, self.sats_in_view);
        w.uint32(20, self.sensor_id);
        w.uint32(21, self.next_update);
        w.uint32(22, self.seq_number);
        w.uint32(23, self.precision_bits);
    }

    fn to_fields(&self) -> Fields {
        FieldsBuilder::new()
            .int("latitude_i", self.latitude_i)
            .int("longitude_i", self.longitude_i)
            .int("altitude", self.altitude)
            .uint("time", self.time)
            .enumeration("location_source", self.location_source, &LOCATION_SOURCE)
            .enumeration("altitude_source", self.altitude_source, &ALTITUDE_SOURCE)
            .uint("timestamp", self.timestamp)
            .int("timestamp_millis_adjust", self.timestamp_millis_adjust)
            .int("altitude_hae", self.altitude_hae)
            .int("altitude_geoidal_separation", self.altitude_geoidal_separation)
            .uint("PDOP", self.pdop)
            .uint("HDOP", self.hdop)
            .uint("VDOP", self.vdop)
            .uint("gps_accuracy", self.gps_accuracy)
            .uint("ground_speed", self.ground_speed)
            .uint("ground_track", self.ground_track)
            .uint("fix_quality", self.fix_quality)
            .uint("fix_type", self.fix_type)
            .uint("sats_in_view", self.sats_in_view)
            .uint("sensor_id", self.sensor_id)
            .uint("next_update", self.next_update)
            .uint("seq_number", self.seq_number)
            .uint("precision_bits", self.precision_bits)
            .build()
    }
}

// ============================================================================
// DeviceMetrics
// ============================================================================

/// Battery and airtime telemetry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceMetrics {
    pub battery_level: Option<u32>,
    pub voltage: Option<f32>,
    pub channel_utilization: Option<f32>,
    pub air_util_tx: Option<f32>,
    pub uptime_seconds: Option<u32>,
}

impl Message for DeviceMetrics {
    const NAME: &'static str = "DeviceMetrics";

    fn merge_field(&mut self, field: u32, value: WireValue<'_>) -> ProtoResult<()> {
        match field {
            1 => set_if(&mut self.battery_level, value.as_uint32()),
            2 => set_if(&mut self.voltage, value.as_float()),
            3 => set_if(&mut self.channel_utilization, value.as_float()),
            4 => set_if(&mut self.air_util_tx, value.as_float()),
            5 => set_if(&mut self.uptime_seconds, value.as_uint32()),
            _ => {}
        }
        Ok(())
    }

    fn encode_fields(&self, w: &mut WireWriter) {
        w.uint32(1, self.battery_level);
        w.float(2, self.voltage);
        w.float(3, self.channel_utilization);
        w.float(4, self.air_util_tx);
        w.uint32(5, self.uptime_seconds);
    }

    fn to_fields(&self) -> Fields {
        FieldsBuilder::new()
            .uint("battery_level", self.battery_level)
            .float("voltage", self.voltage)
            .float("channel_utilization", self.channel_utilization)
            .float("air_util_tx", self.air_util_tx)
            .uint("uptime_seconds", self.uptime_seconds)
            .build()
    }
}

// ============================================================================
// NodeInfo
// ============================================================================

/// A node database entry, as shared in node URLs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeInfo {
    /// Node number.
    pub num: Option<u32>,
    pub user: Option<User>,
    pub position: Option<Position>,
    pub snr: Option<f32>,
    pub last_heard: Option<u32>,
    pub device_metrics: Option<DeviceMetrics>,
    pub channel: Option<u32>,
    pub via_mqtt: Option<bool>,
    pub hops_away: Option<u32>,
    pub is_favorite: Option<bool>,
    pub is_ignored: Option<bool>,
}

impl Message for NodeInfo {
    const NAME: &'static str = "NodeInfo";

    fn merge_field(&mut self, field: u32, value: WireValue<'_>) -> ProtoResult<()> {
        match field {
            1 => set_if(&mut self.num, value.as_uint32()),
            2 => merge_nested(&mut self.user, value)?,
            3 => merge_nested(&mut self.position, value)?,
            4 => set_if(&mut self.snr, value.as_float()),
            5 => set_if(&mut self.last_heard, value.as_fixed32()),
            6 => merge_nested(&mut self.device_metrics, value)?,
            7 => set_if(&mut self.channel, value.as_uint32()),
            8 => set_if(&mut self.via_mqtt, value.as_bool()),
            9 => set_if(&mut self.hops_away, value.as_uint32()),
            10 => set_if(&mut self.is_favorite, value.as_bool()),
            11 => set_if(&mut self.is_ignored, value.as_bool()),
            _ => {}
        }
        Ok(())
    }

    fn encode_fields(&self, w: &mut WireWriter) {
        w.uint32(1, self.num);
        w.message(2, self.user.as_ref());
        w.message(3, self.position.as_ref());
        w.float(4, self.snr);
        w.fixed32(5, self.last_heard);
        w.message(6, self.device_metrics.as_ref());
        w.uint32(7, self.channel);
        w.boolean(8, self.via_mqtt);
        w.uint32(9, self.hops_away);
        w.boolean(10, self.is_favorite);
        w.boolean(11, self.is_ignored);
    }

    fn to_fields(&self) -> Fields {
        FieldsBuilder::new()
            .uint("num", self.num)
            .message("user", self.user.as_ref())
            .message("position", self.position.as_ref())
            .float("snr", self.snr)
            .uint("last_heard", self.last_heard)
            .message("device_metrics", self.device_metrics.as_ref())
            .uint("channel", self.channel)
            .boolean("via_mqtt", self.via_mqtt)
            .uint("hops_away", self.hops_away)
            .boolean("is_favorite", self.is_favorite)
            .boolean("is_ignored", self.is_ignored)
            .build()
    }
}

// ============================================================================
// MyNodeInfo
// ============================================================================

/// Information about the locally attached node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MyNodeInfo {
    pub my_node_num: Option<u32>,
    pub reboot_count: Option<u32>,
    pub min_app_version: Option<u32>,
    pub device_id: Option<Vec<u8>>,
    pub pio_env: Option<String>,
}

impl Message for MyNodeInfo {
    const NAME: &'static str = "MyNodeInfo";

    fn merge_field(&mut self, field: u32, value: WireValue<'_>) -> ProtoResult<()> {
        match field {
            1 => set_if(&mut self.my_node_num, value.as_uint32()),
            8 => set_if(&mut self.reboot_count, value.as_uint32()),
            11 => set_if(&mut self.min_app_version, value.as_uint32()),
            12 => merge_bytes(&mut self.device_id, value),
            13 => merge_string(&mut self.pio_env, value, "MyNodeInfo.pio_env")?,
            _ => {}
        }
        Ok(())
    }

    fn encode_fields(&self, w: &mut WireWriter) {
        w.uint32(1, self.my_node_num);
        w.uint32(8, self.reboot_count);
        w.uint32(11, self.min_app_version);
        w.bytes(12, self.device_id.as_deref());
        w.string(13, self.pio_env.as_deref());
    }

    fn to_fields(&self) -> Fields {
        FieldsBuilder::new()
            .uint("my_node_num", self.my_node_num)
            .uint("reboot_count", self.reboot_count)
            .uint("min_app_version", self.min_app_version)
            .bytes("device_id", self.device_id.as_deref())
            .string("pio_env", self.pio_env.as_deref())
            .build()
    }
}

// ============================================================================
// Data
// ============================================================================

/// Decrypted packet payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Data {
    /// Raw `PortNum` value.
    pub portnum: Option<i32>,
    pub payload: Option<Vec<u8>>,
    pub want_response: Option<bool>,
    pub dest: Option<u32>,
    pub source: Option<u32>,
    pub request_id: Option<u32>,
    pub reply_id: Option<u32>,
    pub emoji: Option<u32>,
    pub bitfield: Option<u32>,
}

impl Message for Data {
    const NAME: &'static str = "Data";

    fn merge_field(&mut self, field: u32, value: WireValue<'_>) -> ProtoResult<()> {
        match field {
            1 => set_if(&mut self.portnum, value.as_int32()),
            2 => merge_bytes(&mut self.payload, value),
            3 => set_if(&mut self.want_response, value.as_bool()),
            4 => set_if(&mut self.dest, value.as_fixed32()),
            5 => set_if(&mut self.source, value.as_fixed32()),
            6 => set_if(&mut self.request_id, value.as_fixed32()),
            7 => set_if(&mut self.reply_id, value.as_fixed32()),
            8 => set_if(&mut self.emoji, value.as_fixed32()),
            9 => set_if(&mut self.bitfield, value.as_uint32()),
            _ => {}
        }
        Ok(())
    }

    fn encode_fields(&self, w: &mut WireWriter) {
        w.enumeration(1, self.portnum);
        w.bytes(2, self.payload.as_deref());
        w.boolean(3, self.want_response);
        w.fixed32(4, self.dest);
        w.fixed32(5, self.source);
        w.fixed32(6, self.request_id);
        w.fixed32(7, self.reply_id);
        w.fixed32(8, self.emoji);
        w.uint32(9, self.bitfield);
    }

    fn to_fields(&self) -> Fields {
        FieldsBuilder::new()
            .enumeration("portnum", self.portnum, &PORT_NUM)
            .bytes("payload", self.payload.as_deref())
            .boolean("want_response", self.want_response)
            .uint("dest", self.dest)
            .uint("source", self.source)
            .uint("request_id", self.request_id)
            .uint("reply_id", self.reply_id)
            .uint("emoji", self.emoji)
            .uint("bitfield", self.bitfield)
            .build()
    }
}

// ============================================================================
// MeshPacket
// ============================================================================

/// The `payload_variant` oneof of a mesh packet.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadVariant {
    /// Cleartext payload.
    Decoded(Data),
    /// Encrypted payload bytes.
    Encrypted(Vec<u8>),
}

/// A packet as carried over the mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshPacket {
    pub from: Option<u32>,
    pub to: Option<u32>,
    pub channel: Option<u32>,
    pub payload_variant: Option<PayloadVariant>,
    pub id: Option<u32>,
    pub rx_time: Option<u32>,
    pub rx_snr: Option<f32>,
    pub hop_limit: Option<u32>,
    pub want_ack: Option<bool>,
    /// Raw `Priority` value.
    pub priority: Option<i32>,
    pub rx_rssi: Option<i32>,
    pub via_mqtt: Option<bool>,
    pub hop_start: Option<u32>,
    pub public_key: Option<Vec<u8>>,
    pub pki_encrypted: Option<bool>,
    pub next_hop: Option<u32>,
    pub relay_node: Option<u32>,
    pub tx_after: Option<u32>,
}

impl Message for MeshPacket {
    const NAME: &'static str = "MeshPacket";

    fn merge_field(&mut self, field: u32, value: WireValue<'_>) -> ProtoResult<()> {
        match field {
            1 => set_if(&mut self.from, value.as_fixed32()),
            2 => set_if(&mut self.to, value.as_fixed32()),
            3 => set_if(&mut self.channel, value.as_uint32()),
            4 => {
                if let Some(bytes) = value.as_bytes() {
                    match &mut self.payload_variant {
                        Some(PayloadVariant::Decoded(data)) => data.merge(bytes)?,
                        slot => *slot = Some(PayloadVariant::Decoded(Data::decode(bytes)?)),
                    }
                }
            }
            5 => {
                if let Some(bytes) = value.as_bytes() {
                    self.payload_variant = Some(PayloadVariant::Encrypted(bytes.to_vec()));
                }
            }
            6 => set_if(&mut self.id, value.as_fixed32()),
            7 => set_if(&mut self.rx_time, value.as_fixed32()),
            8 => set_if(&mut self.rx_snr, value.as_float()),
            9 => set_if(&mut self.hop_limit, value.as_uint32()),
            10 => set_if(&mut self.want_ack, value.as_bool()),
            11 => set_if(&mut self.priority, value.as_int32()),
            12 => set_if(&mut self.rx_rssi, value.as_int32()),
            14 => set_if(&mut self.via_mqtt, value.as_bool()),
            15 => set_if(&mut self.hop_start, value.as_uint32()),
            16 => merge_bytes(&mut self.public_key, value),
            17 => set_if(&mut self.pki_encrypted, value.as_bool()),
            18 => set_if(&mut self.next_hop, value.as_uint32()),
            19 => set_if(&mut self.relay_node, value.as_uint32()),
            20 => set_if(&mut self.tx_after, value.as_uint32()),
            _ => {}
        }
        Ok(())
    }

    fn encode_fields(&self, w: &mut WireWriter) {
        w.fixed32(1, self.from);
        w.fixed32(2, self.to);
        w.uint32(3, self.channel);
        match &self.payload_variant {
            Some(PayloadVariant::Decoded(data)) => w.message(4, Some(data)),
            Some(PayloadVariant::Encrypted(bytes)) => w.bytes(5, Some(bytes.as_slice())),
            None => {}
        }
        w.fixed32(6, self.id);
        w.fixed32(7, self.rx_time);
        w.float(8, self.rx_snr);
        w.uint32(9, self.hop_limit);
        w.boolean(10, self.want_ack);
        w.enumeration(11, self.priority);
        w.int32(12, self.rx_rssi);
        w.boolean(14, self.via_mqtt);
        w.uint32(15, self.hop_start);
        w.bytes(16, self.public_key.as_deref());
        w.boolean(17, self.pki_encrypted);
        w.uint32(18, self.next_hop);
        w.uint32(19, self.relay_node);
        w.uint32(20, self.tx_after);
    }

    fn to_fields(&self) -> Fields {
        let (decoded, encrypted) = match &self.payload_variant {
            Some(PayloadVariant::Decoded(data)) => (Some(data), None),
            Some(PayloadVariant::Encrypted(bytes)) => (None, Some(bytes.as_slice())),
            None => (None, None),
        };
        FieldsBuilder::new()
            .uint("from", self.from)
            .uint("to", self.to)
            .uint("channel", self.channel)
            .message("decoded", decoded)
            .bytes("encrypted", encrypted)
            .uint("id", self.id)
            .uint("rx_time", self.rx_time)
            .float("rx_snr", self.rx_snr)
            .uint("hop_limit", self.hop_limit)
            .boolean("want_ack", self.want_ack)
            .enumeration("priority", self.priority, &PRIORITY)
            .int("rx_rssi", self.rx_rssi)
            .boolean("via_mqtt", self.via_mqtt)
            .uint("hop_start", self.hop_start)
            .bytes("public_key", self.public_key.as_deref())
            .boolean("pki_encrypted", self.pki_encrypted)
            .uint("next_hop", self.next_hop)
            .uint("relay_node", self.relay_node)
            .uint("tx_after", self.tx_after)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_roundtrip() {
        let user = User {
            id: Some("!a1b2c3d4".to_string()),
            long_name: Some("Base Camp".to_string()),
            short_name: Some("BC".to_string()),
            hw_model: Some(9),
            role: Some(2),
            ..Default::default()
        };
        let decoded = User::decode(&user.encode()).unwrap();
        assert_eq!(decoded, user);

        let fields = decoded.to_fields();
        assert_eq!(fields["hw_model"], json!("RAK4631"));
        assert_eq!(fields["role"], json!("ROUTER"));
        assert!(!fields.contains_key("macaddr"));
    }

    #[test]
    fn test_position_negative_coordinates() {
        let position = Position {
            latitude_i: Some(-337_000_000),
            longitude_i: Some(1_512_000_000),
            altitude: Some(-5),
            altitude_hae: Some(-12),
            ..Default::default()
        };
        let decoded = Position::decode(&position.encode()).unwrap();
        assert_eq!(decoded, position);
        assert!((decoded.latitude().unwrap() - (-33.7)).abs() < 1e-9);
        assert!((decoded.longitude().unwrap() - 151.2).abs() < 1e-9);
    }

    #[test]
    fn test_node_info_with_nested_user() {
        let node = NodeInfo {
            num: Some(0xA1B2C3D4),
            user: Some(User {
                long_name: Some("Relay".to_string()),
                ..Default::default()
            }),
            snr: Some(6.25),
            ..Default::default()
        };
        let fields = NodeInfo::decode(&node.encode()).unwrap().to_fields();
        assert_eq!(
            serde_json::Value::Object(fields),
            json!({"num": 2712847316u32, "user": {"long_name": "Relay"}, "snr": 6.25})
        );
    }

    #[test]
    fn test_mesh_packet_oneof_last_wins() {
        let mut w = WireWriter::new();
        w.message(
            4,
            Some(&Data {
                portnum: Some(1),
                payload: Some(b"hi".to_vec()),
                ..Default::default()
            }),
        );
        w.bytes(5, Some(&[0xAA, 0xBB][..]));
        let packet = MeshPacket::decode(&w.finish()).unwrap();
        assert_eq!(
            packet.payload_variant,
            Some(PayloadVariant::Encrypted(vec![0xAA, 0xBB]))
        );

        let fields = packet.to_fields();
        assert_eq!(fields["encrypted"], json!("qrs="));
        assert!(!fields.contains_key("decoded"));
    }

    #[test]
    fn test_mesh_packet_decoded_payload_fields() {
        let packet = MeshPacket {
            from: Some(1),
            to: Some(0xFFFF_FFFF),
            payload_variant: Some(PayloadVariant::Decoded(Data {
                portnum: Some(1),
                payload: Some(b"hello".to_vec()),
                ..Default::default()
            })),
            priority: Some(70),
            ..Default::default()
        };
        let fields = MeshPacket::decode(&packet.encode()).unwrap().to_fields();
        assert_eq!(fields["decoded"]["portnum"], json!("TEXT_MESSAGE_APP"));
        assert_eq!(fields["decoded"]["payload"], json!("aGVsbG8="));
        assert_eq!(fields["priority"], json!("RELIABLE"));
        assert_eq!(fields["to"], json!(4294967295u32));
    }

    #[test]
    fn test_my_node_info_fields() {
        let info = MyNodeInfo {
            my_node_num: Some(42),
            pio_env: Some("rak4631".to_string()),
            ..Default::default()
        };
        let fields = MyNodeInfo::decode(&info.encode()).unwrap().to_fields();
        assert_eq!(
            serde_json::Value::Object(fields),
            json!({"my_node_num": 42, "pio_env": "rak4631"})
        );
    }
}
