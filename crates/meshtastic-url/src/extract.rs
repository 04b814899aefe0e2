//! Payload extraction and URL classification.

use serde::Serialize;

use crate::{UrlError, UrlResult};

/// Query parameter that carries the payload when there is no fragment.
pub const PAYLOAD_QUERY_KEY: &str = "c";

/// What kind of record a URL's path suggests it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UrlClassification {
    /// Path contains `/v/`: node records are tried first.
    NodeLike,
    /// Path contains `/e/`: channel records are tried first.
    ChannelLike,
    /// Neither marker; ordered like [`UrlClassification::ChannelLike`].
    Unknown,
}

impl UrlClassification {
    /// Whether the node family should be tried before the channel family.
    pub fn prefers_node_family(self) -> bool {
        self == UrlClassification::NodeLike
    }
}

/// Classify a URL by the markers in its path.
///
/// Only the part before any `?` or `#` is inspected, so payload text can
/// never change the classification.
pub fn classify(url: &str) -> UrlClassification {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    if path.contains("/v/") {
        UrlClassification::NodeLike
    } else if path.contains("/e/") {
        UrlClassification::ChannelLike
    } else {
        UrlClassification::Unknown
    }
}

/// Pull the encoded payload text out of `url`.
///
/// A non-empty fragment wins; otherwise the first non-empty `c` query value
/// is used. The text is returned exactly as found in the fragment, and
/// form-decoded when it came from the query.
pub fn extract(url: &str) -> UrlResult<(String, UrlClassification)> {
    let classification = classify(url);

    let (before_fragment, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, fragment),
        None => (url, ""),
    };
    if !fragment.is_empty() {
        return Ok((fragment.to_string(), classification));
    }

    let query = before_fragment
        .split_once('?')
        .map(|(_, query)| query)
        .unwrap_or_default();
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, value)| key == PAYLOAD_QUERY_KEY && !value.is_empty())
        .map(|(_, value)| (value.into_owned(), classification))
        .ok_or(UrlError::NoEncodedData)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(
            classify("https://meshtastic.org/e/#abc"),
            UrlClassification::ChannelLike
        );
        assert_eq!(
            classify("https://meshtastic.org/v/#abc"),
            UrlClassification::NodeLike
        );
        assert_eq!(
            classify("https://example.com/?c=abc"),
            UrlClassification::Unknown
        );
        // Markers after the path do not count.
        assert_eq!(
            classify("https://example.com/?next=/v/#abc"),
            UrlClassification::Unknown
        );
    }

    #[test]
    fn test_fragment_wins_over_query() {
        let (text, class) = extract("https://meshtastic.org/e/?c=QUERY#FRAG").unwrap();
        assert_eq!(text, "FRAG");
        assert_eq!(class, UrlClassification::ChannelLike);
    }

    #[test]
    fn test_query_fallback() {
        let (text, _) = extract("https://meshtastic.org/e/?x=1&c=Q1VSTA&c=second").unwrap();
        assert_eq!(text, "Q1VSTA");

        let (text, _) = extract("https://meshtastic.org/e/?c=Q1VSTA#").unwrap();
        assert_eq!(text, "Q1VSTA");
    }

    #[test]
    fn test_no_payload() {
        assert_eq!(
            extract("https://meshtastic.org/e/#"),
            Err(UrlError::NoEncodedData)
        );
        assert_eq!(
            extract("https://meshtastic.org/e/?c="),
            Err(UrlError::NoEncodedData)
        );
        assert_eq!(extract("not a url"), Err(UrlError::NoEncodedData));
    }
}
