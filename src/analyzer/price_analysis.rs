use crate::analyzer::candle::classify;
use crate::analyzer::gravity::{compute_levels, tagged_levels};
use crate::analyzer::market_indicators::MarketIndicators;
use crate::analyzer::signal::{check_volume_spike, decide};
use crate::analyzer::trend::{determine_trend, VolumeSplit};
use crate::config::AnalysisConfig;
use crate::fetcher::BarSource;
use crate::model::{AnalysisError, AnalysisResult, Bar, Classification, FetchRequest};
use crate::normalizer::normalize_symbol;
use crate::utils::lookback_start;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// Runs the gravity-level analysis for one symbol per call.
pub struct SignalAnalyzer {
    source: Arc<dyn BarSource>,
    config: AnalysisConfig,
}

impl SignalAnalyzer {
    pub fn new(source: Arc<dyn BarSource>, config: AnalysisConfig) -> Self {
        Self { source, config }
    }

    /// Fetches the lookback window ending now and analyzes it.
    pub async fn analyze(&self, symbol: &str) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_at(symbol, Utc::now()).await
    }

    pub async fn analyze_at(
        &self,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let symbol = normalize_symbol(symbol);
        let request = FetchRequest {
            symbol: symbol.clone(),
            interval: self.config.interval.clone(),
            since: lookback_start(now, self.config.lookback_days),
        };

        info!("🔍 [analyze] Fetching {} bars for {} since {}", request.interval, symbol, request.since);
        let bars = self.source.fetch_bars(&request).await?;
        self.analyze_series(&symbol, &bars)
    }

    /// Pure part of the pipeline over an already fetched, ascending series.
    pub fn analyze_series(
        &self,
        symbol: &str,
        bars: &[Bar],
    ) -> Result<AnalysisResult, AnalysisError> {
        let window = self.config.window;
        if bars.len() < window {
            return Err(AnalysisError::InsufficientData {
                symbol: symbol.to_string(),
                bars: bars.len(),
                required: window,
            });
        }
        if let Some((i, bad)) = bars.iter().enumerate().find(|(_, b)| !b.is_well_formed()) {
            return Err(AnalysisError::Unexpected(format!(
                "bar {} at {} is malformed",
                i, bad.timestamp
            )));
        }

        let classifications: Vec<Classification> = bars.iter().map(classify).collect();

        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        let avg_volume = MarketIndicators::moving_average(&volumes, window)
            .last()
            .copied()
            .ok_or_else(|| AnalysisError::Unexpected("empty average volume".into()))?;

        let splits: Vec<VolumeSplit> = bars
            .iter()
            .zip(&classifications)
            .map(|(bar, &c)| VolumeSplit::from_bar(bar, c))
            .collect();
        let trend = determine_trend(&splits[splits.len() - window..]);

        let (high, low) = MarketIndicators::extremes(
            bars.iter().map(|b| b.high),
            bars.iter().map(|b| b.low),
        )
        .ok_or_else(|| AnalysisError::Unexpected("empty series".into()))?;
        let gravity_levels = tagged_levels(&compute_levels(high, low));

        let (latest, prior) = match bars {
            [.., prior, latest] => (latest, prior),
            _ => return Err(AnalysisError::Unexpected("need at least two bars".into())),
        };
        let latest_class = classifications[classifications.len() - 1];

        let decided = decide(
            latest.close,
            &gravity_levels,
            latest.volume,
            avg_volume,
            self.config.proximity_threshold,
        );
        // The spike check compares the prior bar against the average ending at
        // the latest bar, not one ending at the prior bar.
        let spike = check_volume_spike(prior.volume, avg_volume, latest_class);
        let signal = spike.apply(decided);
        debug!(
            "{}: levels decided {}, spike {:?}, final {}",
            symbol, decided, spike, signal
        );

        info!(
            "📊 [analyze] {}: price {} trend {} signal {} ({} bars)",
            symbol,
            latest.close,
            trend,
            signal,
            bars.len()
        );

        Ok(AnalysisResult {
            symbol: symbol.to_string(),
            current_price: latest.close,
            current_volume: latest.volume,
            avg_volume,
            trend,
            signal,
            gravity_levels,
            bars_analyzed: bars.len(),
            last_bar_at: latest.timestamp,
        })
    }
}
