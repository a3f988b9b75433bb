//! At-rest encoding of stored canvas payloads.
//!
//! The engine does not implement encryption itself. A [`Codec`] turns the
//! serialized document into whatever the store keeps and back again; real
//! deployments plug in a cipher, tests and local stores use the codecs below.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::document::CanvasData;

/// Reversible transform applied to stored payloads.
pub trait Codec: Send + Sync {
    fn encode(&self, plain: &str) -> String;

    /// `None` when `stored` was not produced by this codec.
    fn decode(&self, stored: &str) -> Option<String>;
}

/// Identity codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCodec;

impl Codec for PlainCodec {
    fn encode(&self, plain: &str) -> String {
        plain.to_string()
    }

    fn decode(&self, stored: &str) -> Option<String> {
        Some(stored.to_string())
    }
}

/// Base64 wrapping. Not a cipher; it keeps payloads opaque to casual
/// inspection and exercises the legacy fallback path.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Codec;

impl Codec for Base64Codec {
    fn encode(&self, plain: &str) -> String {
        STANDARD.encode(plain)
    }

    fn decode(&self, stored: &str) -> Option<String> {
        let bytes = STANDARD.decode(stored.trim()).ok()?;
        String::from_utf8(bytes).ok().filter(|s| !s.is_empty())
    }
}

/// Serialize and encode a payload for storage.
pub fn encode_payload(codec: &dyn Codec, data: &CanvasData) -> Result<String, serde_json::Error> {
    Ok(codec.encode(&data.to_json()?))
}

/// Decode a stored payload.
///
/// When the codec rejects the value, or its output is not a document, the
/// value is read as plain JSON instead (records written before encoding was
/// enabled).
pub fn decode_payload(codec: &dyn Codec, stored: &str) -> Result<CanvasData, serde_json::Error> {
    if let Some(plain) = codec.decode(stored) {
        match CanvasData::from_json(&plain) {
            Ok(data) => return Ok(data),
            Err(e) => log::debug!("decoded payload is not a document ({e}), trying plain JSON"),
        }
    }
    log::warn!("stored canvas is not encoded, reading it as plain JSON");
    CanvasData::from_json(stored)
}
