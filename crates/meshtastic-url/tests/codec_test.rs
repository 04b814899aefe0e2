//! End-to-end tests for the share URL codec.
//!
//! These exercise the public API only: URL in, response mapping out, and
//! encoder output fed back through the decoder.

use meshtastic_url::{
    base64url, normalize_psk, ChannelSpec, DecodeOutcome, DecodeResponse, Decoder, Encoder,
    LoRaSpec, UrlClassification, UrlError, DEFAULT_CHANNEL_URL_PREFIX,
};
use meshtastic_proto::{Channel, ChannelRole, ChannelSettings, Message, NodeInfo, User};
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Helpers
// ============================================================================

fn channel_url(payload: &[u8]) -> String {
    format!("https://meshtastic.org/e/#{}", base64url::encode(payload))
}

fn node_url(payload: &[u8]) -> String {
    format!("https://meshtastic.org/v/#{}", base64url::encode(payload))
}

fn encoder() -> Encoder {
    Encoder::default().without_qr()
}

// ============================================================================
// Decoding
// ============================================================================

#[test]
fn test_fragment_takes_precedence_over_query() {
    let fragment = NodeInfo {
        num: Some(1),
        ..Default::default()
    }
    .encode();
    let query = NodeInfo {
        num: Some(2),
        ..Default::default()
    }
    .encode();
    let url = format!(
        "https://meshtastic.org/v/?c={}#{}",
        base64url::encode(&query),
        base64url::encode(&fragment)
    );

    let response = Decoder::new().decode_channel_url(&url).to_value();
    assert_eq!(response["Node"]["num"], 1);
}

#[test]
fn test_user_record_on_node_url() {
    let bytes = User {
        id: Some("!a1b2c3d4".into()),
        short_name: Some("AB".into()),
        ..Default::default()
    }
    .encode();
    let response = Decoder::new().decode_channel_url(&node_url(&bytes));
    let (section, fields) = response.section().unwrap();
    assert_eq!(section.key(), "User");
    assert_eq!(fields["short_name"], "AB");
}

#[test]
fn test_query_parameter_payload() {
    let url = "https://meshtastic.org/e/?c=CgcSAQE6AggNEgwIATgBQANIAVAeaAE";
    let response = Decoder::new().decode_channel_url(url);
    let (section, fields) = response.section().unwrap();
    assert_eq!(section.key(), "Config");
    assert_eq!(fields["lora_config"]["hop_limit"], 3);
}

#[test]
fn test_plausibility_gating_for_channel() {
    let decoder = Decoder::new();

    // All-default parse: nothing present, Channel must not match.
    match decoder.decode_payload(&[], UrlClassification::ChannelLike) {
        DecodeOutcome::Matched(record) => assert_eq!(record.schema, "MeshPacket"),
        other => panic!("unexpected {:?}", other),
    }

    // Explicit index 0 with a role is a real channel.
    let bytes = Channel {
        index: Some(0),
        settings: None,
        role: Some(ChannelRole::Primary.as_i32()),
    }
    .encode();
    let outcome = decoder.decode_payload(&bytes, UrlClassification::ChannelLike);
    let record = outcome.matched().unwrap();
    assert_eq!(record.schema, "Channel");
    assert_eq!(
        serde_json::Value::Object(record.fields.clone()),
        json!({"index": 0, "role": "PRIMARY"})
    );
}

#[test]
fn test_order_follows_classification() {
    let bytes = NodeInfo {
        num: Some(7),
        ..Default::default()
    }
    .encode();

    let node = Decoder::new().decode_channel_url(&node_url(&bytes));
    assert_eq!(node.section().unwrap().0.key(), "Node");

    let channel = Decoder::new().decode_channel_url(&channel_url(&bytes));
    let (section, fields) = channel.section().unwrap();
    assert_eq!(section.key(), "Config");
    assert_eq!(fields["index"], 7);
}

#[test]
fn test_missing_payload_is_hard_failure() {
    let response = Decoder::new().decode_channel_url("https://meshtastic.org/e/#");
    match &response {
        DecodeResponse::Failed { error, .. } => {
            assert!(error.contains("No encoded channel data"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(response.to_value().get("decode_attempts").is_none());
}

#[test]
fn test_exhaustion_reports_every_attempt() {
    let payload = [0x0F, 0xFF, 0x00, 0x42];
    let response = Decoder::new()
        .decode_channel_url(&node_url(&payload))
        .to_value();

    assert_eq!(response["success"], false);
    let attempts: Vec<&str> = response["decode_attempts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a.as_str().unwrap())
        .collect();
    let schemas: Vec<&str> = attempts
        .iter()
        .map(|a| a.split(" failed: ").next().unwrap())
        .collect();
    assert_eq!(
        schemas,
        vec!["NodeInfo", "User", "Position", "MyNodeInfo", "ChannelSet", "Channel", "MeshPacket"]
    );
    assert_eq!(response["raw_data"]["decoded_length"], 4);
    assert_eq!(response["raw_data"]["hex_data"], "0fff0042");
}

// ============================================================================
// Encoding
// ============================================================================

#[test]
fn test_single_channel_end_to_end() {
    let request = json!({"channel": {"name": "Primary", "role": "primary", "psk": "0xAABBCC"}});
    let response = encoder().encode_json(&request).unwrap();

    assert!(response.url.starts_with(DEFAULT_CHANNEL_URL_PREFIX));
    assert_eq!(response.config["settings"]["name"], "Primary");

    let value = response.to_value();
    assert_eq!(value["success"], true);
    assert!(value.get("channels_count").is_none());

    // A receiver sees the same thing.
    let decoded = Decoder::new().decode_channel_url(&response.url);
    assert_eq!(decoded.section().unwrap().1, &response.config);
}

#[test]
fn test_channel_set_with_lora() {
    let request = json!({
        "channels": [
            {"name": "Main", "role": "primary", "psk": "AQ==", "module_settings": {"position_precision": 13}},
            {"name": "Ops", "psk": "0x00112233445566778899aabbccddeeff", "downlink_enabled": true}
        ],
        "lora_config": {
            "use_preset": true,
            "modem_preset": "longfast",
            "region": "EU_868",
            "hop_limit": 3,
            "tx_enabled": true,
            "tx_power": 27,
            "frequency_offset": "0.5"
        }
    });
    let response = encoder().encode_json(&request).unwrap();
    assert_eq!(response.channels_count, Some(2));

    let config = serde_json::Value::Object(response.config.clone());
    assert_eq!(config["settings"][0]["module_settings"]["position_precision"], 13);
    assert_eq!(config["settings"][1]["psk"], "ABEiM0RVZneImaq7zN3u/w==");
    assert_eq!(config["settings"][1]["downlink_enabled"], true);
    assert_eq!(config["lora_config"]["modem_preset"], "LONG_FAST");
    assert_eq!(config["lora_config"]["region"], "EU_868");
    assert_eq!(config["lora_config"]["frequency_offset"], 0.5);
}

#[test]
fn test_custom_prefix_from_config() {
    let config = meshtastic_url::CodecConfig::from_yaml_str(
        "channel_url_prefix: https://example.org/e/\n",
    )
    .unwrap();
    let response = Encoder::new(config)
        .without_qr()
        .encode_channel_set(&[ChannelSpec::default()], None)
        .unwrap();
    assert!(response.url.starts_with("https://example.org/e/#"));
}

#[test]
fn test_qr_code_rendered_by_default() {
    let response = Encoder::default()
        .encode_channel_set(&[ChannelSpec::default()], None)
        .unwrap();
    assert!(response
        .qr_code
        .as_deref()
        .unwrap()
        .starts_with("data:image/svg+xml;base64,"));
}

#[test]
fn test_psk_resolution_order() {
    assert_eq!(normalize_psk("0xAABBCC").0, vec![0xAA, 0xBB, 0xCC]);
    assert_eq!(normalize_psk("Zm9v").0, b"foo".to_vec());
    let long = "correct horse battery staple, but much longer!";
    assert_eq!(normalize_psk(long).0, long.as_bytes()[..32].to_vec());
}

// ============================================================================
// Properties
// ============================================================================

fn role_strategy() -> impl Strategy<Value = ChannelRole> {
    prop_oneof![
        Just(ChannelRole::Primary),
        Just(ChannelRole::Secondary),
        Just(ChannelRole::Disabled),
    ]
}

fn psk_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        prop::collection::vec(any::<u8>(), 1..=32).prop_map(|b| Some(format!("0x{}", hex::encode(b)))),
        "[ -~]{1,40}".prop_map(Some),
    ]
}

prop_compose! {
    fn channel_spec()(
        role in role_strategy(),
        name in proptest::option::of("[A-Za-z0-9 _-]{0,11}"),
        psk in psk_strategy(),
        uplink_enabled in proptest::option::of(any::<bool>()),
        downlink_enabled in proptest::option::of(any::<bool>()),
        position_precision in proptest::option::of(0u32..=32),
        is_muted in proptest::option::of(any::<bool>()),
    ) -> ChannelSpec {
        ChannelSpec {
            index: None,
            role,
            name,
            psk,
            uplink_enabled,
            downlink_enabled,
            position_precision,
            is_muted,
        }
    }
}

prop_compose! {
    fn lora_spec()(
        hop_limit in proptest::option::of(0u32..8),
        region in proptest::option::of(0i32..27),
        tx_power in proptest::option::of(-10i32..31),
        use_preset in proptest::option::of(any::<bool>()),
    ) -> LoRaSpec {
        LoRaSpec { hop_limit, region, tx_power, use_preset, ..Default::default() }
    }
}

proptest! {
    #[test]
    fn prop_base64url_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let text = base64url::encode(&bytes);
        prop_assert!(!text.contains('='));
        prop_assert_eq!(base64url::decode(&text).unwrap(), bytes);
    }

    #[test]
    fn prop_encoder_self_consistent(
        channels in prop::collection::vec(channel_spec(), 1..=8),
        lora in proptest::option::of(lora_spec()),
    ) {
        let response = encoder().encode_channel_set(&channels, lora.as_ref()).unwrap();
        let decoded = Decoder::new().decode_channel_url(&response.url);
        prop_assert!(decoded.is_success());

        let (_, fields) = decoded.section().unwrap();
        let settings = fields["settings"].as_array().unwrap();
        prop_assert_eq!(settings.len(), channels.len());
    }

    #[test]
    fn prop_single_channel_decodes_as_encoded(spec in channel_spec()) {
        match encoder().encode_single_channel(&spec) {
            Ok(response) => {
                prop_assert!(spec.uplink_enabled.is_none());
                let decoded = Decoder::new().decode_url(&response.url).unwrap();
                let record = decoded.outcome.matched().unwrap();
                prop_assert_eq!(record.schema, "Channel");

                let expected = serde_json::Value::Object(spec.to_settings().to_fields());
                prop_assert_eq!(&record.fields["settings"], &expected);
                prop_assert_eq!(&record.fields, &response.config);
            }
            // A set uplink flag, and nothing else, makes the bytes read as a channel set.
            Err(UrlError::SelfCheckFailed(_)) => {
                prop_assert!(spec.uplink_enabled.is_some());
            }
            Err(other) => {
                prop_assert!(false, "unexpected error {}", other);
            }
        }
    }

    #[test]
    fn prop_decode_is_total_and_deterministic(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let decoder = Decoder::new();
        let first = decoder.decode_payload(&bytes, UrlClassification::NodeLike);
        let second = decoder.decode_payload(&bytes, UrlClassification::NodeLike);
        // Compare rendered fields: a parsed NaN float is never equal to itself.
        prop_assert_eq!(
            first.matched().map(|r| (r.schema, r.fields.clone())),
            second.matched().map(|r| (r.schema, r.fields.clone()))
        );
        if let DecodeOutcome::Unmatched { attempts, raw } = first {
            prop_assert_eq!(attempts.len(), 7);
            prop_assert_eq!(raw.as_bytes(), &bytes[..]);
        }
    }

    #[test]
    fn prop_settings_bytes_survive_encode(spec in channel_spec()) {
        let settings = spec.to_settings();
        prop_assert_eq!(ChannelSettings::decode(&settings.encode()).unwrap(), settings);
    }
}
