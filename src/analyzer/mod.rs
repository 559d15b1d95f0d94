// Analyzer module: candle, gravity, trend and signal stages plus the pipeline that runs them.

pub mod candle;
pub mod gravity;
pub mod market_indicators;
pub mod price_analysis;
pub mod signal;
pub mod trend;

// Re-export the pipeline entry point for ease of use.
pub use price_analysis::SignalAnalyzer;
