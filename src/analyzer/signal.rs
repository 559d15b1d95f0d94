use crate::model::{Classification, GravityLevel, GravityTier, Signal};

pub const DEFAULT_PROXIMITY_THRESHOLD: f64 = 50.0;

/// Outcome of comparing the prior bar's volume with the trailing average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeSpike {
    BullishTrend,
    BearishTrend,
    TrendContinues,
}

impl VolumeSpike {
    /// A detected spike replaces whatever the level scan decided.
    pub fn apply(self, signal: Signal) -> Signal {
        match self {
            VolumeSpike::BullishTrend => Signal::Buy,
            VolumeSpike::BearishTrend => Signal::Sell,
            VolumeSpike::TrendContinues => signal,
        }
    }
}

/// Scans `levels` in order and returns the first resolved signal.
///
/// A tagged level within `threshold` of the price resolves to buy below it and
/// sell at or above it, unless volume is above average. In that case the level
/// is skipped and the scan continues. Untagged levels are never considered.
pub fn decide(
    current_price: f64,
    levels: &[GravityLevel],
    current_volume: f64,
    avg_volume: f64,
    threshold: f64,
) -> Signal {
    let high_volume = current_volume > avg_volume;

    for level in levels {
        if (current_price - level.price).abs() >= threshold {
            continue;
        }
        match level.tier {
            GravityTier::Strong | GravityTier::Weak if !high_volume => {
                return if current_price < level.price {
                    Signal::Buy
                } else {
                    Signal::Sell
                };
            }
            _ => {}
        }
    }
    Signal::Hold
}

pub fn check_volume_spike(
    prior_volume: f64,
    avg_volume: f64,
    latest: Classification,
) -> VolumeSpike {
    if prior_volume > avg_volume {
        match latest {
            Classification::BullishVolume => return VolumeSpike::BullishTrend,
            Classification::BearishVolume => return VolumeSpike::BearishTrend,
            Classification::Neutral => {}
        }
    }
    VolumeSpike::TrendContinues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(ratio: f64, price: f64, tier: GravityTier) -> GravityLevel {
        GravityLevel { ratio, price, tier }
    }

    #[test]
    fn test_strong_level_on_low_volume() {
        // price sits above the level, so this is a sell
        let levels = [level(0.236, 995.0, GravityTier::Strong)];
        assert_eq!(decide(1000.0, &levels, 10.0, 20.0, 50.0), Signal::Sell);

        let levels = [level(0.236, 1005.0, GravityTier::Strong)];
        assert_eq!(decide(1000.0, &levels, 10.0, 20.0, 50.0), Signal::Buy);
    }

    #[test]
    fn test_weak_level_behaves_like_strong() {
        let levels = [level(0.5, 1030.0, GravityTier::Weak)];
        assert_eq!(decide(1000.0, &levels, 5.0, 20.0, 50.0), Signal::Buy);
        assert_eq!(decide(1060.0, &levels, 5.0, 20.0, 50.0), Signal::Sell);
    }

    #[test]
    fn test_price_equal_to_level_sells() {
        let levels = [level(0.618, 1000.0, GravityTier::Strong)];
        assert_eq!(decide(1000.0, &levels, 1.0, 2.0, 50.0), Signal::Sell);
    }

    #[test]
    fn test_high_volume_at_only_level_holds() {
        let levels = [level(0.382, 995.0, GravityTier::Strong)];
        assert_eq!(decide(1000.0, &levels, 30.0, 20.0, 50.0), Signal::Hold);
    }

    #[test]
    fn test_equal_volume_is_not_high() {
        let levels = [level(0.382, 1010.0, GravityTier::Strong)];
        assert_eq!(decide(1000.0, &levels, 20.0, 20.0, 50.0), Signal::Buy);
    }

    #[test]
    fn test_threshold_is_strict() {
        let levels = [level(0.236, 1050.0, GravityTier::Strong)];
        assert_eq!(decide(1000.0, &levels, 1.0, 2.0, 50.0), Signal::Hold);
        assert_eq!(decide(1000.1, &levels, 1.0, 2.0, 50.0), Signal::Buy);
    }

    #[test]
    fn test_first_level_in_range_wins() {
        let levels = [
            level(0.236, 980.0, GravityTier::Strong),
            level(0.382, 1020.0, GravityTier::Strong),
        ];
        assert_eq!(decide(1000.0, &levels, 1.0, 2.0, 50.0), Signal::Sell);
    }

    #[test]
    fn test_untagged_level_never_resolves() {
        let levels = [level(0.0, 1001.0, GravityTier::Untagged)];
        assert_eq!(decide(1000.0, &levels, 1.0, 2.0, 50.0), Signal::Hold);
    }

    #[test]
    fn test_no_level_in_range_holds() {
        let levels = [
            level(0.236, 500.0, GravityTier::Strong),
            level(1.0, 2000.0, GravityTier::Weak),
        ];
        assert_eq!(decide(1000.0, &levels, 1.0, 2.0, 50.0), Signal::Hold);
    }

    #[test]
    fn test_volume_spike_verdicts() {
        assert_eq!(
            check_volume_spike(30.0, 20.0, Classification::BullishVolume),
            VolumeSpike::BullishTrend
        );
        assert_eq!(
            check_volume_spike(30.0, 20.0, Classification::BearishVolume),
            VolumeSpike::BearishTrend
        );
        assert_eq!(
            check_volume_spike(30.0, 20.0, Classification::Neutral),
            VolumeSpike::TrendContinues
        );
        assert_eq!(
            check_volume_spike(20.0, 20.0, Classification::BullishVolume),
            VolumeSpike::TrendContinues
        );
    }

    #[test]
    fn test_spike_overrides_signal() {
        assert_eq!(VolumeSpike::BullishTrend.apply(Signal::Sell), Signal::Buy);
        assert_eq!(VolumeSpike::BearishTrend.apply(Signal::Hold), Signal::Sell);
        assert_eq!(VolumeSpike::TrendContinues.apply(Signal::Sell), Signal::Sell);
    }
}
