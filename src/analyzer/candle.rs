use crate::model::{Bar, Classification};

/// A shadow longer than this multiple of the body disqualifies the candle.
const SHADOW_TO_BODY_LIMIT: f64 = 4.0;

/// Labels a bar by body direction and the shadow opposing it.
pub fn classify(bar: &Bar) -> Classification {
    if bar.close > bar.open {
        let upper_shadow = bar.high - bar.close;
        if upper_shadow <= SHADOW_TO_BODY_LIMIT * (bar.close - bar.open) {
            return Classification::BullishVolume;
        }
    } else if bar.close < bar.open {
        let lower_shadow = bar.close - bar.low;
        if lower_shadow <= SHADOW_TO_BODY_LIMIT * (bar.open - bar.close) {
            return Classification::BearishVolume;
        }
    }
    Classification::Neutral
}
