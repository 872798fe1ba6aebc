//! Cache Engine Module
//!
//! Orchestrates the codec pipeline, the eviction store, expiration checks,
//! priority computation and the access predictor.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::priority::resolve_priority;
use crate::cache::{
    AccessPredictor, CacheEntry, CacheStats, Clock, EvictionStore, StatsSnapshot, SystemClock,
};
use crate::codec::{AesGcmCodec, CodecId, CodecPipeline, GzipCodec, PayloadLen, SizeModel};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Preload Executor ==
/// Receives keys the predictor expects to be requested soon.
///
/// The engine only signals candidates; fetching and writing them back is the
/// executor's job.
pub trait PreloadExecutor: Send + Sync {
    fn preload(&self, key: &str);
}

impl<F> PreloadExecutor for F
where
    F: Fn(&str) + Send + Sync,
{
    fn preload(&self, key: &str) {
        self(key)
    }
}

// == Set Options ==
/// Per-write overrides.
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    /// TTL in seconds; `None` or `Some(0)` falls back to the engine default
    pub ttl_seconds: Option<u64>,
    /// Explicit priority in [0, 1]; the default formula applies when absent
    pub priority: Option<f64>,
    /// `Some(false)` skips compression for this entry
    pub compress: Option<bool>,
    /// `Some(false)` skips encryption for this entry
    pub encrypt: Option<bool>,
}

impl SetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl(mut self, seconds: u64) -> Self {
        self.ttl_seconds = Some(seconds);
        self
    }

    pub fn priority(mut self, priority: f64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn compress(mut self, enabled: bool) -> Self {
        self.compress = Some(enabled);
        self
    }

    pub fn encrypt(mut self, enabled: bool) -> Self {
        self.encrypt = Some(enabled);
        self
    }

    fn skipped_codecs(&self) -> Vec<CodecId> {
        let mut skip = Vec::new();
        if self.compress == Some(false) {
            skip.push(CodecId::Gzip);
        }
        if self.encrypt == Some(false) {
            skip.push(CodecId::Aes256Gcm);
        }
        skip
    }
}

enum Lookup {
    Missing,
    Expired,
    Found(std::result::Result<Vec<u8>, crate::codec::CodecError>),
}

// == Cache Engine ==
/// Byte-budgeted cache with priority eviction, lazy TTL expiry and access
/// prediction.
///
/// All operations take `&mut self` and run to completion; share an engine
/// across tasks behind a single lock.
pub struct CacheEngine {
    store: EvictionStore,
    /// None when prediction is disabled
    predictor: Option<AccessPredictor>,
    stats: CacheStats,
    codecs: CodecPipeline,
    size_model: Box<dyn SizeModel>,
    clock: Arc<dyn Clock>,
    preloader: Option<Arc<dyn PreloadExecutor>>,
    default_ttl: Option<u64>,
}

impl CacheEngine {
    // == Constructors ==
    /// Creates an engine with no codecs, no default TTL and prediction on.
    pub fn new(capacity_bytes: u64) -> Self {
        Self {
            store: EvictionStore::new(capacity_bytes),
            predictor: Some(AccessPredictor::new()),
            stats: CacheStats::new(),
            codecs: CodecPipeline::new(),
            size_model: Box::new(PayloadLen),
            clock: Arc::new(SystemClock),
            preloader: None,
            default_ttl: None,
        }
    }

    /// Builds an engine from configuration.
    ///
    /// Fails with `InvalidCapacityFormat` on a malformed capacity string and
    /// `InvalidConfig` on a malformed encryption key.
    /// Encryption runs before compression.
    pub fn from_config(config: &Config) -> Result<Self> {
        let capacity = config.capacity_bytes()?;

        let mut codecs = CodecPipeline::new();
        if config.encryption {
            let codec = match config.encryption_key.as_deref() {
                Some(hex_key) => AesGcmCodec::from_hex(hex_key)
                    .map_err(|e| CacheError::InvalidConfig(format!("ENCRYPTION_KEY: {}", e)))?,
                None => {
                    warn!("No encryption key configured; generated a per-process key, encrypted entries will not outlive this process");
                    AesGcmCodec::ephemeral()
                }
            };
            codecs = codecs.with_codec(codec);
        }
        if config.compression {
            codecs = codecs.with_codec(GzipCodec::default());
        }

        let predictor = config
            .prediction_enabled
            .then(|| AccessPredictor::new().with_max_tracked_keys(config.predictor_max_keys));

        Ok(Self {
            predictor,
            codecs,
            ..Self::new(capacity)
        }
        .with_default_ttl(config.default_ttl))
    }

    /// Default TTL in seconds, 0 = entries never expire by default.
    pub fn with_default_ttl(mut self, seconds: u64) -> Self {
        self.default_ttl = (seconds > 0).then_some(seconds);
        self
    }

    pub fn with_codecs(mut self, codecs: CodecPipeline) -> Self {
        self.codecs = codecs;
        self
    }

    pub fn with_size_model(mut self, size_model: impl SizeModel + 'static) -> Self {
        self.size_model = Box::new(size_model);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_preloader(mut self, preloader: impl PreloadExecutor + 'static) -> Self {
        self.preloader = Some(Arc::new(preloader));
        self
    }

    /// Replaces the predictor, e.g. with a bounded one.
    pub fn with_predictor(mut self, predictor: AccessPredictor) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn with_prediction(mut self, enabled: bool) -> Self {
        self.predictor = match (enabled, self.predictor.take()) {
            (true, Some(existing)) => Some(existing),
            (true, None) => Some(AccessPredictor::new()),
            (false, _) => None,
        };
        self
    }

    // == Set ==
    /// Serializes, encodes and stores `value` under `key`.
    ///
    /// On any failure the previous state is left untouched.
    pub fn set<V>(&mut self, key: &str, value: &V, opts: SetOptions) -> Result<()>
    where
        V: Serialize + ?Sized,
    {
        let serialized = serde_json::to_vec(value).map_err(|e| CacheError::write_failure(key, e))?;
        let priority = resolve_priority(opts.priority, serialized.len() as u64, self.stats.hit_rate());

        let (payload, applied) = self
            .codecs
            .encode(&serialized, &opts.skipped_codecs())
            .map_err(|e| CacheError::write_failure(key, e))?;
        let size = self.size_model.measure(&payload);

        let ttl = match opts.ttl_seconds {
            Some(0) | None => self.default_ttl,
            Some(ttl) => Some(ttl),
        };

        let entry = CacheEntry::new(key, payload, self.clock.now_ms())
            .with_size(size)
            .with_ttl(ttl)
            .with_priority(priority)
            .with_codecs(applied);

        let evicted = self.store.insert(key.to_string(), entry)?;
        if !evicted.is_empty() {
            debug!(key, evicted = ?evicted, "made room for entry");
            self.stats.record_evictions(evicted.len());
        }

        if let Some(predictor) = self.predictor.as_mut() {
            predictor.learn(key);
        }
        self.stats.record_set();

        debug!(key, size, priority, ttl = ?ttl, "stored entry");
        Ok(())
    }

    // == Get ==
    /// Returns the live value under `key`, or `None` when absent or expired.
    ///
    /// A payload that cannot be decoded yields `CacheReadFailure` and is
    /// dropped from the store; other entries are unaffected.
    pub fn get<V>(&mut self, key: &str) -> Result<Option<V>>
    where
        V: DeserializeOwned,
    {
        let now = self.clock.now_ms();

        let lookup = match self.store.lookup(key) {
            None => Lookup::Missing,
            Some(entry) if entry.is_expired(now) => Lookup::Expired,
            Some(entry) => Lookup::Found(self.codecs.decode(&entry.payload, &entry.codecs)),
        };

        match lookup {
            Lookup::Missing => {
                self.stats.record_miss();
                self.preload_predicted();
                Ok(None)
            }
            Lookup::Expired => {
                self.store.remove(key);
                self.stats.record_expirations(1);
                self.stats.record_miss();
                debug!(key, "entry expired");
                Ok(None)
            }
            Lookup::Found(Err(err)) => {
                self.store.remove(key);
                self.stats.record_miss();
                warn!(key, error = %err, "dropping unreadable entry");
                Err(CacheError::read_failure(key, err))
            }
            Lookup::Found(Ok(bytes)) => {
                let value = match serde_json::from_slice(&bytes) {
                    Ok(value) => value,
                    Err(err) => {
                        self.stats.record_miss();
                        return Err(CacheError::CacheReadFailure {
                            key: key.to_string(),
                            reason: err.to_string(),
                        });
                    }
                };

                if let Some(history) = self.store.record_access(key, now) {
                    if let Some(predictor) = self.predictor.as_mut() {
                        predictor.update_access_pattern(key, &history);
                    }
                }
                self.stats.record_hit();
                Ok(Some(value))
            }
        }
    }

    /// Same as [`get`](Self::get) for untyped JSON values.
    pub fn get_json(&mut self, key: &str) -> Result<Option<serde_json::Value>> {
        self.get(key)
    }

    // == Delete ==
    /// Removes `key` from the store. Predictor state is kept.
    pub fn delete(&mut self, key: &str) -> bool {
        self.store.remove(key)
    }

    // == Clear ==
    /// Empties the store and resets counters and predictor.
    pub fn clear(&mut self) {
        self.store.clear();
        self.stats.reset();
        if let Some(predictor) = self.predictor.as_mut() {
            predictor.reset();
        }
    }

    // == Stats ==
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot::new(
            &self.stats,
            self.store.len(),
            self.store.used_bytes(),
            self.store.capacity_bytes(),
        )
    }

    // == Purge Expired ==
    /// Actively removes expired entries. Returns how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let purged = self.store.purge_expired(self.clock.now_ms());
        self.stats.record_expirations(purged.len());
        purged.len()
    }

    /// Current ranked predictions, empty when prediction is disabled.
    pub fn predictions(&self) -> Vec<String> {
        self.predictor
            .as_ref()
            .map(AccessPredictor::predict)
            .unwrap_or_default()
    }

    /// Presence check without recency or expiry side effects.
    pub fn contains(&self, key: &str) -> bool {
        self.store.contains(key)
    }

    /// Stored metadata for `key`, without side effects.
    pub fn entry(&self, key: &str) -> Option<&CacheEntry> {
        self.store.peek(key)
    }

    pub fn predictor(&self) -> Option<&AccessPredictor> {
        self.predictor.as_ref()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn used_bytes(&self) -> u64 {
        self.store.used_bytes()
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.store.capacity_bytes()
    }

    // == Preload Hook ==
    /// Counts predicted keys that are not stored and hands them to the executor.
    fn preload_predicted(&mut self) {
        let predicted = match &self.predictor {
            Some(predictor) => predictor.predict(),
            None => return,
        };

        for key in predicted.iter().filter(|k| !self.store.contains(k)) {
            self.stats.record_prediction();
            if let Some(preloader) = &self.preloader {
                preloader.preload(key);
            }
        }
    }
}

impl fmt::Debug for CacheEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEngine")
            .field("store", &self.store)
            .field("predictor", &self.predictor)
            .field("stats", &self.stats)
            .field("codecs", &self.codecs)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}
