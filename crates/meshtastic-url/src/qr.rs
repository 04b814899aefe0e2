//! QR boundary.
//!
//! Rendering and scanning are capabilities supplied from outside the codec.
//! This module defines their interfaces, an SVG renderer backed by the
//! `qrcode` crate, and the predicate that decides which scanned texts are
//! worth decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use qrcode::render::svg;
use qrcode::QrCode;
use serde::Serialize;
use tracing::debug;

use crate::{CodecConfig, DecodeResponse, Decoder, UrlError, UrlResult};

// ============================================================================
// Rendering
// ============================================================================

/// Renders text as a QR image.
pub trait QrRenderer {
    /// MIME type of the rendered image.
    fn mime_type(&self) -> &'static str;

    /// Render `text` as encoded image bytes.
    fn render(&self, text: &str) -> UrlResult<Vec<u8>>;

    /// Render `text` as a `data:` URI.
    fn render_data_uri(&self, text: &str) -> UrlResult<String> {
        let image = self.render(text)?;
        Ok(format!(
            "data:{};base64,{}",
            self.mime_type(),
            STANDARD.encode(image)
        ))
    }
}

/// SVG QR renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgQrRenderer {
    /// Minimum edge length in pixels.
    pub min_size: u32,
    /// Surround the code with the standard quiet zone.
    pub quiet_zone: bool,
}

impl Default for SvgQrRenderer {
    fn default() -> Self {
        SvgQrRenderer {
            min_size: 200,
            quiet_zone: true,
        }
    }
}

impl QrRenderer for SvgQrRenderer {
    fn mime_type(&self) -> &'static str {
        "image/svg+xml"
    }

    fn render(&self, text: &str) -> UrlResult<Vec<u8>> {
        let code = QrCode::new(text.as_bytes()).map_err(|e| UrlError::Qr(e.to_string()))?;
        let image = code
            .render::<svg::Color>()
            .min_dimensions(self.min_size, self.min_size)
            .quiet_zone(self.quiet_zone)
            .build();
        Ok(image.into_bytes())
    }
}

// ============================================================================
// Scanning
// ============================================================================

/// Pixel rectangle of a located symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// One symbol found by a scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedSymbol {
    /// Decoded text.
    pub text: String,
    /// Where it was found.
    pub bounds: BoundingBox,
    /// Symbology tag, e.g. `QRCODE`.
    pub kind: String,
}

/// Locates and decodes symbols in an image.
///
/// Implementations own any image enhancement and retry passes.
pub trait QrScanner {
    /// Scan encoded image bytes; an empty list means nothing was found.
    fn scan(&self, image: &[u8]) -> UrlResult<Vec<ScannedSymbol>>;
}

/// Whether scanned text should be fed to the decoder.
///
/// True when the text mentions the canonical host, or when it carries an
/// `/e/#` or `/v/#` marker and is longer than the configured minimum.
pub fn looks_like_mesh_url(text: &str, config: &CodecConfig) -> bool {
    if text.contains(config.canonical_host.as_str()) {
        return true;
    }
    (text.contains("/e/#") || text.contains("/v/#")) && text.chars().count() > config.min_qr_payload_len
}

/// A scanned symbol and, when it qualified, its decode.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub symbol: ScannedSymbol,
    /// `None` when the text did not look like a share URL.
    pub decoded: Option<DecodeResponse>,
}

/// Scan an image and decode every symbol that looks like a share URL.
pub fn scan_and_decode(
    scanner: &dyn QrScanner,
    image: &[u8],
    decoder: &Decoder,
    config: &CodecConfig,
) -> UrlResult<Vec<ScanResult>> {
    let symbols = scanner.scan(image)?;
    debug!("QR: {} symbols found", symbols.len());
    Ok(symbols
        .into_iter()
        .map(|symbol| {
            let decoded = looks_like_mesh_url(&symbol.text, config)
                .then(|| decoder.decode_channel_url(&symbol.text));
            ScanResult { symbol, decoded }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedScanner(Vec<&'static str>);

    impl QrScanner for FixedScanner {
        fn scan(&self, _image: &[u8]) -> UrlResult<Vec<ScannedSymbol>> {
            Ok(self
                .0
                .iter()
                .map(|text| ScannedSymbol {
                    text: text.to_string(),
                    bounds: BoundingBox {
                        left: 0,
                        top: 0,
                        width: 10,
                        height: 10,
                    },
                    kind: "QRCODE".to_string(),
                })
                .collect())
        }
    }

    #[test]
    fn test_looks_like_mesh_url() {
        let config = CodecConfig::default();
        assert!(looks_like_mesh_url("https://meshtastic.org/e/#x", &config));
        assert!(looks_like_mesh_url(
            "https://example.net/e/#CgcSAQE6AggNEgwIATgBQANI",
            &config
        ));
        // Marker present but too short.
        assert!(!looks_like_mesh_url("https://a.b/e/#xyz", &config));
        assert!(!looks_like_mesh_url("WIFI:S:home;T:WPA;P:secret-password;;", &config));
    }

    #[test]
    fn test_scan_and_decode() {
        let scanner = FixedScanner(vec![
            "https://meshtastic.org/e/#CgcSAQE6AggNEgwIATgBQANIAVAeaAE",
            "hello",
        ]);
        let results =
            scan_and_decode(&scanner, &[], &Decoder::new(), &CodecConfig::default()).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].decoded.as_ref().unwrap().is_success());
        assert!(results[1].decoded.is_none());
    }

    #[test]
    fn test_svg_data_uri() {
        let uri = SvgQrRenderer::default()
            .render_data_uri("https://meshtastic.org/e/#AQ")
            .unwrap();
        assert!(uri.starts_with("data:image/svg+xml;base64,"));

        let svg = STANDARD
            .decode(uri.trim_start_matches("data:image/svg+xml;base64,"))
            .unwrap();
        assert!(String::from_utf8(svg).unwrap().contains("<svg"));
    }
}
