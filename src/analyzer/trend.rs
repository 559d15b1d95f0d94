use crate::model::{Bar, Classification, Trend};

/// A bar's volume attributed to exactly one side, or to neither.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSplit {
    pub bullish: f64,
    pub bearish: f64,
}

impl VolumeSplit {
    pub fn from_bar(bar: &Bar, classification: Classification) -> Self {
        match classification {
            Classification::BullishVolume => Self { bullish: bar.volume, bearish: 0.0 },
            Classification::BearishVolume => Self { bullish: 0.0, bearish: bar.volume },
            Classification::Neutral => Self { bullish: 0.0, bearish: 0.0 },
        }
    }
}

fn non_decreasing(values: impl Iterator<Item = f64> + Clone) -> bool {
    values.clone().zip(values.skip(1)).all(|(prev, next)| next >= prev)
}

/// Compares monotonicity of bullish and bearish volume across the window.
pub fn determine_trend(window: &[VolumeSplit]) -> Trend {
    let bullish_trend = non_decreasing(window.iter().map(|v| v.bullish));
    let bearish_trend = non_decreasing(window.iter().map(|v| v.bearish));

    match (bullish_trend, bearish_trend) {
        (true, false) => Trend::BullishStrength,
        (false, true) => Trend::BearishStrength,
        _ => Trend::Balanced,
    }
}
