pub mod bybit;
pub mod traits;

pub use bybit::BybitFetcher;
pub use traits::BarSource;
