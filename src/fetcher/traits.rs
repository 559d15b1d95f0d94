use crate::model::{Bar, FetchError, FetchRequest};

/// Source of fixed-interval OHLCV bars, oldest first.
#[async_trait::async_trait]
pub trait BarSource: Send + Sync {
    async fn fetch_bars(&self, req: &FetchRequest) -> Result<Vec<Bar>, FetchError>;
}
