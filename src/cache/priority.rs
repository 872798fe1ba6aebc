//! Priority Module
//!
//! Default eviction priority for entries written without an explicit one.

use tracing::warn;

use crate::error::{CacheError, Result};

/// Payload size at which the size factor bottoms out
pub const SIZE_REFERENCE_BYTES: f64 = 1024.0 * 1024.0;

/// Floor for each factor and fallback priority
pub const MIN_PRIORITY: f64 = 0.1;

const SIZE_WEIGHT: f64 = 0.4;
const USAGE_WEIGHT: f64 = 0.6;

// == Compute Priority ==
/// `0.4 * max(0.1, 1 - size/1MiB) + 0.6 * max(0.1, hit_rate)`, rounded to two
/// decimals.
///
/// `hit_rate` is the engine-wide rate at call time, not the key's own.
pub fn compute_priority(size_bytes: u64, hit_rate: f64) -> Result<f64> {
    if !hit_rate.is_finite() {
        return Err(CacheError::PriorityComputation(format!(
            "hit rate {} is not finite",
            hit_rate
        )));
    }

    let size_factor = (1.0 - size_bytes as f64 / SIZE_REFERENCE_BYTES).max(MIN_PRIORITY);
    let usage_factor = hit_rate.max(MIN_PRIORITY);
    let priority = SIZE_WEIGHT * size_factor + USAGE_WEIGHT * usage_factor;

    if !priority.is_finite() {
        return Err(CacheError::PriorityComputation(format!(
            "priority {} for {} bytes is not finite",
            priority, size_bytes
        )));
    }

    Ok((priority * 100.0).round() / 100.0)
}

// == Resolve Priority ==
/// Picks the caller's priority when given, the default formula otherwise.
///
/// Caller values are clamped to [0, 1]; any failure degrades to
/// [`MIN_PRIORITY`] instead of failing the write.
pub fn resolve_priority(explicit: Option<f64>, size_bytes: u64, hit_rate: f64) -> f64 {
    match explicit {
        Some(p) if p.is_nan() => {
            warn!("Ignoring NaN priority, using minimum");
            MIN_PRIORITY
        }
        Some(p) => p.clamp(0.0, 1.0),
        None => compute_priority(size_bytes, hit_rate).unwrap_or_else(|e| {
            warn!("{}, using minimum priority", e);
            MIN_PRIORITY
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_entry_no_hits() {
        assert_eq!(compute_priority(0, 0.0).unwrap(), 0.46);
    }

    #[test]
    fn test_half_megabyte_half_hit_rate() {
        assert_eq!(compute_priority(512 * 1024, 0.5).unwrap(), 0.5);
    }

    #[test]
    fn test_size_factor_floor() {
        // 0.4 * 0.1 + 0.6 * 1.0
        assert_eq!(compute_priority(10 * 1024 * 1024, 1.0).unwrap(), 0.64);
    }

    #[test]
    fn test_smaller_scores_higher() {
        let small = compute_priority(100, 0.3).unwrap();
        let large = compute_priority(800_000, 0.3).unwrap();
        assert!(small > large);
    }

    #[test]
    fn test_rounded_to_two_decimals() {
        let p = compute_priority(12_345, 0.777).unwrap();
        assert_eq!(p, (p * 100.0).round() / 100.0);
    }

    #[test]
    fn test_non_finite_hit_rate_is_error() {
        assert!(matches!(
            compute_priority(10, f64::NAN),
            Err(CacheError::PriorityComputation(_))
        ));
        assert_eq!(resolve_priority(None, 10, f64::INFINITY), MIN_PRIORITY);
    }

    #[test]
    fn test_explicit_priority_clamped() {
        assert_eq!(resolve_priority(Some(0.75), 10, 0.0), 0.75);
        assert_eq!(resolve_priority(Some(3.0), 10, 0.0), 1.0);
        assert_eq!(resolve_priority(Some(-1.0), 10, 0.0), 0.0);
        assert_eq!(resolve_priority(Some(f64::NAN), 10, 0.0), MIN_PRIORITY);
    }
}
