//! URL-safe, unpadded base64 as used in share URLs.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::{UrlError, UrlResult};

// Links in the wild are hand-trimmed and often carry non-zero trailing bits.
const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_allow_trailing_bits(true)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

fn in_alphabet(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '-' | '_' | '=')
}

/// Decode URL-safe base64 text, with or without padding.
///
/// Characters outside both alphabets (whitespace, line breaks from pasted
/// links) are dropped. The rest is padded to a multiple of four, mapped onto
/// the standard alphabet and decoded; if that fails the padded text is
/// retried with the URL-safe alphabet before giving up.
pub fn decode(text: &str) -> UrlResult<Vec<u8>> {
    let mut padded: String = text.chars().filter(|c| in_alphabet(*c)).collect();
    let missing = padded.len() % 4;
    if missing != 0 {
        padded.extend(std::iter::repeat('=').take(4 - missing));
    }

    let standard = padded.replace('-', "+").replace('_', "/");
    match STANDARD_LENIENT.decode(&standard) {
        Ok(bytes) => Ok(bytes),
        Err(first) => URL_SAFE_LENIENT
            .decode(&padded)
            .map_err(|_| UrlError::MalformedEncoding(first.to_string())),
    }
}

/// Encode bytes as URL-safe base64 with all padding stripped.
pub fn encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}
