//! Cache Module
//!
//! Byte-budgeted caching with priority-weighted eviction, TTL expiration and
//! access prediction.

mod clock;
mod engine;
mod entry;
mod predictor;
pub mod priority;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use engine::{CacheEngine, PreloadExecutor, SetOptions};
pub use entry::{CacheEntry, MAX_ACCESS_HISTORY};
pub use predictor::{AccessPredictor, MAX_PREDICTIONS, WINDOW_SIZE};
pub use stats::{CacheStats, StatsSnapshot};
pub use store::EvictionStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
