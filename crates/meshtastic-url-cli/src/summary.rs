//! Human-readable rendering of decode responses.

use std::fmt::Write;

use meshtastic_url::DecodeResponse;
use serde_json::{Map, Value};

type Fields = Map<String, Value>;

/// Nesting levels shown before output is cut off.
pub const MAX_DEPTH: usize = 3;

/// List items shown per list.
pub const MAX_LIST_ITEMS: usize = 3;

/// Strings longer than this are shortened.
pub const MAX_STRING_LEN: usize = 50;

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > MAX_STRING_LEN => {
            let head: String = s.chars().take(MAX_STRING_LEN - 3).collect();
            format!("{}...", head)
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_fields(out: &mut String, fields: &Fields, indent: &str, depth: usize) {
    if depth >= MAX_DEPTH {
        let _ = writeln!(out, "{}[...truncated...]", indent);
        return;
    }

    for (key, value) in fields {
        match value {
            Value::Object(nested) => {
                let _ = writeln!(out, "{}{}:", indent, key);
                write_fields(out, nested, &format!("{}  ", indent), depth + 1);
            }
            Value::Array(items) => {
                let _ = writeln!(out, "{}{}: [{} items]", indent, key, items.len());
                for (i, item) in items.iter().take(MAX_LIST_ITEMS).enumerate() {
                    match item {
                        Value::Object(nested) => {
                            let _ = writeln!(out, "{}  [{}]:", indent, i);
                            write_fields(out, nested, &format!("{}    ", indent), depth + 2);
                        }
                        other => {
                            let _ = writeln!(out, "{}  [{}]: {}", indent, i, scalar(other));
                        }
                    }
                }
                if items.len() > MAX_LIST_ITEMS {
                    let _ = writeln!(
                        out,
                        "{}  ...and {} more",
                        indent,
                        items.len() - MAX_LIST_ITEMS
                    );
                }
            }
            other => {
                let _ = writeln!(out, "{}{}: {}", indent, key, scalar(other));
            }
        }
    }
}

/// Render a response as an indented summary.
pub fn render_summary(response: &DecodeResponse) -> String {
    let mut out = String::new();
    match response {
        DecodeResponse::Success {
            url,
            section,
            fields,
        } => {
            let _ = writeln!(out, "Successfully decoded Meshtastic URL");
            let _ = writeln!(out, "URL: {}", url);
            let _ = writeln!(out);
            let _ = writeln!(out, "{}:", section.title());
            write_fields(&mut out, fields, "  ", 0);
        }
        DecodeResponse::Unmatched { error, raw_data, .. } => {
            let _ = writeln!(out, "Decoding failed: {}", error);
            let _ = writeln!(out);
            let _ = writeln!(out, "Debug info:");
            let _ = writeln!(out, "  URL: {}", raw_data.url);
            let _ = writeln!(out, "  Encoded length: {}", raw_data.encoded_length);
            let _ = writeln!(out, "  Decoded length: {}", raw_data.decoded_length);
            let _ = writeln!(out, "  Hex data: {}", raw_data.hex_data);
        }
        DecodeResponse::Failed { error, .. } => {
            let _ = writeln!(out, "Decoding failed: {}", error);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshtastic_url::Decoder;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_default_channel_summary() {
        let response = Decoder::new()
            .decode_channel_url("https://meshtastic.org/e/#CgcSAQE6AggNEgwIATgBQANIAVAeaAE");
        let text = render_summary(&response);
        let expected = "\
Successfully decoded Meshtastic URL
URL: https://meshtastic.org/e/#CgcSAQE6AggNEgwIATgBQANIAVAeaAE

Configuration Data:
  settings: [1 items]
    [0]:
      psk: AQ==
      module_settings:
        [...truncated...]
  lora_config:
    use_preset: true
    region: US
    hop_limit: 3
    tx_enabled: true
    tx_power: 30
    sx126x_rx_boosted_gain: true
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_depth_and_list_limits() {
        let data = fields(json!({
            "a": {"b": {"c": {"d": 1}}},
            "list": [1, 2, 3, 4, 5]
        }));
        let mut out = String::new();
        write_fields(&mut out, &data, "", 0);
        let expected = "\
a:
  b:
    c:
      [...truncated...]
list: [5 items]
  [0]: 1
  [1]: 2
  [2]: 3
  ...and 2 more
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_long_string_truncated() {
        let long = "x".repeat(60);
        let data = fields(json!({ "name": long }));
        let mut out = String::new();
        write_fields(&mut out, &data, "", 0);
        assert_eq!(out, format!("name: {}...\n", "x".repeat(47)));
    }

    #[test]
    fn test_unmatched_summary() {
        let response = Decoder::new().decode_channel_url("https://meshtastic.org/e/#DwE");
        let text = render_summary(&response);
        assert!(text.starts_with("Decoding failed: Unable to decode protobuf data"));
        assert!(text.contains("  Decoded length: 2\n"));
        assert!(text.contains("  Hex data: 0f01\n"));
    }
}
