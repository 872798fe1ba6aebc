//! Ultra Cache - An in-process byte-budgeted cache
//!
//! Priority-weighted eviction, TTL expiration, pluggable payload codecs and an
//! access predictor that hints at keys worth preloading.

pub mod api;
pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheEngine, SetOptions};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
