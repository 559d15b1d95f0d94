use crate::config::ExchangeConfig;
use crate::fetcher::traits::BarSource;
use crate::model::{Bar, FetchError, FetchRequest};
use crate::normalizer::exchange_symbol;
use crate::utils::parse_millis;

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Bybit caps a single kline page at 1000 rows.
pub const PAGE_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
struct KlineResponse {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    #[serde(default)]
    result: KlineResult,
}

#[derive(Debug, Default, Deserialize)]
struct KlineResult {
    #[serde(default)]
    list: Vec<Vec<String>>,
}

/// Public market-data client for Bybit's v5 kline endpoint.
pub struct BybitFetcher {
    client: Client,
    base_url: String,
    category: String,
}

impl BybitFetcher {
    pub fn new(cfg: &ExchangeConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("gravity-sniper/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            category: cfg.category.clone(),
        })
    }
}

/// Maps an interval spec such as `4h` to Bybit's interval code.
pub fn interval_code(spec: &str) -> Option<&'static str> {
    let code = match spec {
        "1m" => "1",
        "3m" => "3",
        "5m" => "5",
        "15m" => "15",
        "30m" => "30",
        "1h" => "60",
        "2h" => "120",
        "4h" => "240",
        "6h" => "360",
        "12h" => "720",
        "1d" => "D",
        "1w" => "W",
        _ => return None,
    };
    Some(code)
}

fn interval_minutes(spec: &str) -> Option<i64> {
    let minutes = match spec {
        "1m" => 1,
        "3m" => 3,
        "5m" => 5,
        "15m" => 15,
        "30m" => 30,
        "1h" => 60,
        "2h" => 120,
        "4h" => 240,
        "6h" => 360,
        "12h" => 720,
        "1d" => 1440,
        "1w" => 10_080,
        _ => return None,
    };
    Some(minutes)
}

/// Number of bars a lookback of `days` spans at the given interval.
pub fn rows_for_lookback(spec: &str, days: i64) -> Option<i64> {
    let minutes = interval_minutes(spec)?;
    Some((days.saturating_mul(1440) + minutes - 1) / minutes)
}

/// Parses a kline response body into bars sorted oldest first.
pub fn parse_klines(body: &str) -> Result<Vec<Bar>, FetchError> {
    let response: KlineResponse =
        serde_json::from_str(body).map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

    if response.ret_code != 0 {
        return Err(FetchError::Api {
            code: response.ret_code,
            message: response.ret_msg,
        });
    }

    let mut bars = response
        .result
        .list
        .iter()
        .map(|row| parse_row(row))
        .collect::<Result<Vec<_>, _>>()?;

    // Bybit returns newest first.
    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

fn parse_row(row: &[String]) -> Result<Bar, FetchError> {
    let invalid = || FetchError::InvalidResponse(format!("malformed kline row: {:?}", row));
    if row.len() < 6 {
        return Err(invalid());
    }
    let number = |i: usize| row[i].parse::<f64>().map_err(|_| invalid());

    Ok(Bar {
        timestamp: parse_millis(&row[0]).ok_or_else(invalid)?,
        open: number(1)?,
        high: number(2)?,
        low: number(3)?,
        close: number(4)?,
        volume: number(5)?,
    })
}

#[async_trait::async_trait]
impl BarSource for BybitFetcher {
    async fn fetch_bars(&self, req: &FetchRequest) -> Result<Vec<Bar>, FetchError> {
        let interval = interval_code(&req.interval)
            .ok_or_else(|| FetchError::UnsupportedInterval(req.interval.clone()))?;
        let symbol = exchange_symbol(&req.symbol);
        let url = format!("{}/v5/market/kline", self.base_url);
        let start = req.since.timestamp_millis().to_string();
        let limit = PAGE_LIMIT.to_string();

        debug!("GET {} symbol={} interval={} since={}", url, symbol, interval, req.since);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("category", self.category.as_str()),
                ("symbol", symbol.as_str()),
                ("interval", interval),
                ("start", start.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Http(format!("status {}: {}", status, body)));
        }

        let bars = parse_klines(&body)?;
        info!("✅ [bybit] Fetched {} bars for {}", bars.len(), req.symbol);
        Ok(bars)
    }
}
