//! Envelope marshalling used by the page cache.

use crate::result::AppResult;
use crate::types::pagination::Page;

/// Marshals result envelopes to and from their cached string form.
pub trait EnvelopeCodec: Send + Sync + std::fmt::Debug + 'static {
    /// Encode an envelope.
    fn encode(&self, page: &Page) -> AppResult<String>;

    /// Decode an envelope produced by [`EnvelopeCodec::encode`].
    fn decode(&self, raw: &str) -> AppResult<Page>;
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl EnvelopeCodec for JsonCodec {
    fn encode(&self, page: &Page) -> AppResult<String> {
        Ok(serde_json::to_string(page)?)
    }

    fn decode(&self, raw: &str) -> AppResult<Page> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_codec_roundtrip() {
        let page = Page::assemble(vec![serde_json::json!({"id": 1})], 1, 10, 0, 1);
        let raw = JsonCodec.encode(&page).expect("encode");
        let back = JsonCodec.decode(&raw).expect("decode");
        assert_eq!(back, page);
    }

    #[test]
    fn test_json_codec_rejects_garbage() {
        assert!(JsonCodec.decode("not json").is_err());
    }
}
