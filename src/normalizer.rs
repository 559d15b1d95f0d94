/// Normalizes a user-supplied pair: uppercase, `-` becomes the `/` pair separator.
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase().replace('-', "/")
}

/// Converts a display pair (`BTC/USDT`) into the exchange's market id (`BTCUSDT`).
pub fn exchange_symbol(symbol: &str) -> String {
    symbol.replace('/', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("btc-usdt"), "BTC/USDT");
        assert_eq!(normalize_symbol(" Eth/Usdt "), "ETH/USDT");
        assert_eq!(normalize_symbol("SOLUSDT"), "SOLUSDT");
    }

    #[test]
    fn test_exchange_symbol() {
        assert_eq!(exchange_symbol("BTC/USDT"), "BTCUSDT");
        assert_eq!(exchange_symbol("SOLUSDT"), "SOLUSDT");
    }
}
