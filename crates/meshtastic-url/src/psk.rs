//! Pre-shared key normalization.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use meshtastic_proto::MAX_PSK_SIZE;

/// Which textual form a PSK was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PskForm {
    /// `0x`-prefixed hex.
    Hex,
    /// Standard base64.
    Base64,
    /// Raw UTF-8, truncated to [`MAX_PSK_SIZE`] bytes.
    Raw,
}

/// Turn user-supplied key text into key bytes.
///
/// Forms are tried in order and the first that parses wins: `0x` hex,
/// then standard base64, then the raw UTF-8 bytes cut to 32.
pub fn normalize_psk(text: &str) -> (Vec<u8>, PskForm) {
    if let Some(digits) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        if let Ok(bytes) = hex::decode(digits) {
            return (bytes, PskForm::Hex);
        }
    }
    if let Ok(bytes) = STANDARD.decode(text) {
        return (bytes, PskForm::Base64);
    }
    let raw = text.as_bytes();
    (raw[..raw.len().min(MAX_PSK_SIZE)].to_vec(), PskForm::Raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_wins() {
        assert_eq!(
            normalize_psk("0xAABBCC"),
            (vec![0xAA, 0xBB, 0xCC], PskForm::Hex)
        );
        assert_eq!(normalize_psk("0X01").0, vec![0x01]);
    }

    #[test]
    fn test_base64() {
        assert_eq!(normalize_psk("Zm9v"), (b"foo".to_vec(), PskForm::Base64));
        assert_eq!(normalize_psk("AQ==").0, vec![0x01]);
    }

    #[test]
    fn test_bad_hex_falls_through() {
        // Odd digit count is not hex, and '0xABC' is not base64 either.
        assert_eq!(normalize_psk("0xABC"), (b"0xABC".to_vec(), PskForm::Raw));
    }

    #[test]
    fn test_raw_truncated() {
        let text = "this passphrase is definitely longer than thirty-two bytes!";
        let (bytes, form) = normalize_psk(text);
        assert_eq!(form, PskForm::Raw);
        assert_eq!(bytes, text.as_bytes()[..32].to_vec());

        assert_eq!(normalize_psk("short key!").0, b"short key!".to_vec());
    }
}
