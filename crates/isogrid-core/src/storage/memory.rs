//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::codec::{Codec, PlainCodec, decode_payload, encode_payload};
use crate::document::CanvasData;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
///
/// Payloads are kept encoded, exactly as a remote store would hold them.
pub struct MemoryStorage {
    payloads: RwLock<HashMap<String, String>>,
    codec: Box<dyn Codec>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::with_codec(Box::new(PlainCodec))
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codec(codec: Box<dyn Codec>) -> Self {
        Self {
            payloads: RwLock::new(HashMap::new()),
            codec,
        }
    }

    /// Store a raw payload, bypassing the codec.
    pub fn insert_raw(&self, user_id: &str, payload: &str) -> StorageResult<()> {
        let mut payloads = self
            .payloads
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        payloads.insert(user_id.to_string(), payload.to_string());
        Ok(())
    }

    /// The raw stored payload of `user_id`.
    pub fn raw(&self, user_id: &str) -> StorageResult<String> {
        let payloads = self
            .payloads
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        payloads
            .get(user_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(user_id.to_string()))
    }
}

impl Storage for MemoryStorage {
    fn save(&self, user_id: &str, data: &CanvasData) -> BoxFuture<'_, StorageResult<()>> {
        let user_id = user_id.to_string();
        let encoded = encode_payload(self.codec.as_ref(), data);
        Box::pin(async move {
            let encoded = encoded.map_err(|e| StorageError::Serialization(e.to_string()))?;
            self.insert_raw(&user_id, &encoded)
        })
    }

    fn load(&self, user_id: &str) -> BoxFuture<'_, StorageResult<Option<CanvasData>>> {
        let user_id = user_id.to_string();
        Box::pin(async move {
            let payloads = self
                .payloads
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            match payloads.get(&user_id) {
                Some(stored) => decode_payload(self.codec.as_ref(), stored)
                    .map(Some)
                    .map_err(|e| StorageError::Serialization(e.to_string())),
                None => Ok(None),
            }
        })
    }

    fn delete(&self, user_id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let user_id = user_id.to_string();
        Box::pin(async move {
            let mut payloads = self
                .payloads
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            payloads
                .remove(&user_id)
                .map(|_| ())
                .ok_or(StorageError::NotFound(user_id))
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let payloads = self
                .payloads
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(payloads.keys().cloned().collect())
        })
    }
}
