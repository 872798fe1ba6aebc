//! AES-256-GCM encryption codec.
//!
//! Payload layout: `nonce (12 bytes) || ciphertext+tag`.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};

use super::{Codec, CodecError, CodecId};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Authenticated encryption codec.
///
/// Key material is supplied by the caller so encrypted entries are tied to an
/// explicit key rather than hidden process state.
#[derive(Clone)]
pub struct AesGcmCodec {
    cipher: Aes256Gcm,
}

impl AesGcmCodec {
    /// Creates a codec from 32 bytes of key material.
    pub fn new(key: &[u8]) -> Result<Self, CodecError> {
        if key.len() != KEY_LEN {
            return Err(CodecError::InvalidKey(format!(
                "expected {} bytes, got {}",
                KEY_LEN,
                key.len()
            )));
        }
        let key = Key::<Aes256Gcm>::from_slice(key);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Creates a codec from a 64 character hex string.
    pub fn from_hex(hex_key: &str) -> Result<Self, CodecError> {
        let bytes =
            hex::decode(hex_key.trim()).map_err(|e| CodecError::InvalidKey(e.to_string()))?;
        Self::new(&bytes)
    }

    /// Creates a codec with a freshly generated key.
    ///
    /// Entries written with it are unreadable once the codec is dropped.
    pub fn ephemeral() -> Self {
        let key: [u8; KEY_LEN] = rand::random();
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key)),
        }
    }
}

impl fmt::Debug for AesGcmCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcmCodec").finish_non_exhaustive()
    }
}

impl Codec for AesGcmCodec {
    fn id(&self) -> CodecId {
        CodecId::Aes256Gcm
    }

    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::random();
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), data)
            .map_err(|e| CodecError::Encryption(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        if data.len() < NONCE_LEN {
            return Err(CodecError::Decryption(format!(
                "payload of {} bytes is shorter than the nonce",
                data.len()
            )));
        }
        let (nonce, ciphertext) = data.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| CodecError::Decryption(e.to_string()))
    }
}
