//! Size model used for capacity accounting.

/// Converts a stored payload into the number of bytes it is charged against
/// the cache budget. Must be deterministic for a given payload.
pub trait SizeModel: Send + Sync {
    fn measure(&self, payload: &[u8]) -> u64;
}

/// Charges each entry its encoded payload length.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadLen;

impl SizeModel for PayloadLen {
    fn measure(&self, payload: &[u8]) -> u64 {
        payload.len() as u64
    }
}
