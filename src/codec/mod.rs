//! Codec Module
//!
//! Reversible byte transforms applied to payloads on write and undone on read,
//! plus the size model used for capacity accounting.

mod aes;
mod gzip;
mod size;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use aes::AesGcmCodec;
pub use gzip::GzipCodec;
pub use size::{PayloadLen, SizeModel};

// == Codec Identifier ==
/// Identifies a codec recorded on an entry so reads can rebuild the decode order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecId {
    /// AES-256-GCM encryption
    Aes256Gcm,
    /// Gzip compression
    Gzip,
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecId::Aes256Gcm => write!(f, "aes-256-gcm"),
            CodecId::Gzip => write!(f, "gzip"),
        }
    }
}

// == Codec Error ==
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("compression failed: {0}")]
    Compression(String),

    #[error("decompression failed: {0}")]
    Decompression(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("payload was written with codec '{0}' which is not configured")]
    UnknownCodec(CodecId),
}

// == Codec Trait ==
/// A reversible transform over payload bytes.
///
/// Implementations must satisfy `decode(encode(x)) == x`.
pub trait Codec: Send + Sync {
    fn id(&self) -> CodecId;

    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;
}

// == Codec Pipeline ==
/// Ordered chain of codecs.
///
/// Codecs run in configured order on write and in the exact reverse of the
/// recorded order on read.
#[derive(Default)]
pub struct CodecPipeline {
    codecs: Vec<Box<dyn Codec>>,
}

impl CodecPipeline {
    /// Creates an empty pipeline (payloads stored as-is).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a codec to the end of the write order.
    pub fn with_codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codecs.push(Box::new(codec));
        self
    }

    /// Identifiers of configured codecs in write order.
    pub fn ids(&self) -> Vec<CodecId> {
        self.codecs.iter().map(|c| c.id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    // == Encode ==
    /// Runs every configured codec not listed in `skip`.
    ///
    /// Returns the encoded bytes together with the identifiers actually applied.
    pub fn encode(
        &self,
        data: &[u8],
        skip: &[CodecId],
    ) -> Result<(Vec<u8>, Vec<CodecId>), CodecError> {
        let mut applied = Vec::with_capacity(self.codecs.len());
        let mut current = data.to_vec();

        for codec in &self.codecs {
            if skip.contains(&codec.id()) {
                continue;
            }
            current = codec.encode(&current)?;
            applied.push(codec.id());
        }

        Ok((current, applied))
    }

    // == Decode ==
    /// Undoes `applied` in reverse order.
    pub fn decode(&self, data: &[u8], applied: &[CodecId]) -> Result<Vec<u8>, CodecError> {
        let mut current = data.to_vec();

        for id in applied.iter().rev() {
            let codec = self
                .codecs
                .iter()
                .find(|c| c.id() == *id)
                .ok_or(CodecError::UnknownCodec(*id))?;
            current = codec.decode(&current)?;
        }

        Ok(current)
    }
}

impl fmt::Debug for CodecPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecPipeline")
            .field("codecs", &self.ids())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn full_pipeline() -> CodecPipeline {
        CodecPipeline::new()
            .with_codec(AesGcmCodec::new(&[7u8; 32]).unwrap())
            .with_codec(GzipCodec::default())
    }

    #[test]
    fn test_empty_pipeline_passthrough() {
        let pipeline = CodecPipeline::new();
        let (encoded, applied) = pipeline.encode(b"plain", &[]).unwrap();

        assert_eq!(encoded, b"plain");
        assert!(applied.is_empty());
        assert_eq!(pipeline.decode(&encoded, &applied).unwrap(), b"plain");
    }

    #[test]
    fn test_encrypt_then_compress_order() {
        let pipeline = full_pipeline();
        let (_, applied) = pipeline.encode(b"payload", &[]).unwrap();

        assert_eq!(applied, vec![CodecId::Aes256Gcm, CodecId::Gzip]);
    }

    #[test]
    fn test_full_pipeline_roundtrip() {
        let pipeline = full_pipeline();
        let data = br#"{"user":"alice","items":[1,2,3]}"#;

        let (encoded, applied) = pipeline.encode(data, &[]).unwrap();
        assert_ne!(encoded.as_slice(), data.as_slice());

        let decoded = pipeline.decode(&encoded, &applied).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_skip_codec() {
        let pipeline = full_pipeline();
        let (encoded, applied) = pipeline.encode(b"payload", &[CodecId::Aes256Gcm]).unwrap();

        assert_eq!(applied, vec![CodecId::Gzip]);
        assert_eq!(pipeline.decode(&encoded, &applied).unwrap(), b"payload");
    }

    #[test]
    fn test_decode_with_unconfigured_codec() {
        let pipeline = CodecPipeline::new().with_codec(GzipCodec::default());

        let result = pipeline.decode(b"whatever", &[CodecId::Aes256Gcm]);
        assert!(matches!(
            result,
            Err(CodecError::UnknownCodec(CodecId::Aes256Gcm))
        ));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let pipeline = full_pipeline();

        let result = pipeline.decode(b"not gzip at all", &[CodecId::Aes256Gcm, CodecId::Gzip]);
        assert!(result.is_err());
    }
}
