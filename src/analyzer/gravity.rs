//! Fibonacci gravity levels.
//!
//! Levels are always produced in ascending ratio order. The signal scan relies
//! on that order for its first-match tie-break.

use crate::model::{GravityLevel, GravityTier};

pub const FIB_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

const STRONG_RATIOS: [f64; 4] = [0.236, 0.382, 0.618, 0.786];
const WEAK_RATIOS: [f64; 2] = [0.5, 1.0];

/// Tier is decided by ratio identity, never by the resulting price.
pub fn tier_for_ratio(ratio: f64) -> GravityTier {
    if STRONG_RATIOS.contains(&ratio) {
        GravityTier::Strong
    } else if WEAK_RATIOS.contains(&ratio) {
        GravityTier::Weak
    } else {
        GravityTier::Untagged
    }
}

/// Computes all seven levels between `low` and `high`.
pub fn compute_levels(high: f64, low: f64) -> [GravityLevel; 7] {
    let diff = high - low;
    FIB_RATIOS.map(|ratio| GravityLevel {
        ratio,
        price: low + diff * ratio,
        tier: tier_for_ratio(ratio),
    })
}

/// Drops untagged levels, keeping ascending ratio order.
pub fn tagged_levels(levels: &[GravityLevel]) -> Vec<GravityLevel> {
    levels
        .iter()
        .filter(|l| l.tier != GravityTier::Untagged)
        .copied()
        .collect()
}
