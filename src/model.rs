// Core types: Bar, Classification, GravityLevel, AnalysisResult and error enums
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// One OHLCV observation over a fixed interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// True when every field is finite and the high/low envelope holds.
    pub fn is_well_formed(&self) -> bool {
        let finite = [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite());
        finite
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    BullishVolume,
    BearishVolume,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GravityTier {
    Strong,
    Weak,
    Untagged,
}

impl GravityTier {
    pub fn label(&self) -> &'static str {
        match self {
            GravityTier::Strong => "Strong",
            GravityTier::Weak => "Weak",
            GravityTier::Untagged => "Untagged",
        }
    }
}

/// A Fibonacci-derived price level and the tier assigned to its ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityLevel {
    pub ratio: f64,
    pub price: f64,
    pub tier: GravityTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    BullishStrength,
    BearishStrength,
    Balanced,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::BullishStrength => "bullish_strength",
            Trend::BearishStrength => "bearish_strength",
            Trend::Balanced => "balanced",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Signal::Buy => "buy",
            Signal::Sell => "sell",
            Signal::Hold => "hold",
        };
        f.write_str(label)
    }
}

/// Outcome of a single `!analyze` request.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub symbol: String,
    pub current_price: f64,
    pub current_volume: f64,
    pub avg_volume: f64,
    pub trend: Trend,
    pub signal: Signal,
    /// Tagged levels only, ascending ratio order.
    pub gravity_levels: Vec<GravityLevel>,
    pub bars_analyzed: usize,
    pub last_bar_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub symbol: String,
    pub interval: String,
    pub since: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timed out")]
    Timeout,

    #[error("exchange rejected request ({code}): {message}")]
    Api { code: i64, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("unsupported interval: {0}")]
    UnsupportedInterval(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::InvalidResponse(e.to_string())
        } else {
            FetchError::Http(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("insufficient data for {symbol}: {bars} bars, need {required}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        required: usize,
    },

    #[error("data provider error: {0}")]
    Provider(#[from] FetchError),

    #[error("unexpected analysis failure: {0}")]
    Unexpected(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Discord API responded [{status}]: {body}")]
    Api { status: u16, body: String },

    #[error("rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: f64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp: Utc::now(),
            open,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn test_bar_envelope_validation() {
        assert!(bar(10.0, 12.0, 9.0, 11.0).is_well_formed());
        assert!(!bar(10.0, 10.5, 9.0, 11.0).is_well_formed());
        assert!(!bar(10.0, 12.0, f64::NAN, 11.0).is_well_formed());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Trend::BullishStrength.to_string(), "bullish_strength");
        assert_eq!(Signal::Hold.to_string(), "hold");
        assert_eq!(GravityTier::Weak.label(), "Weak");
    }
}
