pub struct MarketIndicators;

impl MarketIndicators {
    /// Trailing mean of `window_size` values ending at each index from
    /// `window_size - 1` onwards. Empty when the data is shorter than the window.
    pub fn moving_average(data: &[f64], window_size: usize) -> Vec<f64> {
        if window_size == 0 || data.len() < window_size {
            return Vec::new();
        }
        data.windows(window_size)
            .map(|window| window.iter().sum::<f64>() / window_size as f64)
            .collect()
    }

    /// Highest high and lowest low across the series.
    pub fn extremes(highs: impl Iterator<Item = f64>, lows: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
        let high = highs.fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))?;
        let low = lows.fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))?;
        Some((high, low))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(MarketIndicators::moving_average(&data, 2), vec![1.5, 2.5, 3.5, 4.5]);
        assert!(MarketIndicators::moving_average(&data, 6).is_empty());
        assert!(MarketIndicators::moving_average(&data, 0).is_empty());
    }

    #[test]
    fn test_last_value_is_trailing_window_mean() {
        let data: Vec<f64> = (1..=50).map(|v| v as f64).collect();
        let rolling = MarketIndicators::moving_average(&data, 42);
        assert_eq!(rolling.len(), 9);
        assert_eq!(rolling.last().copied(), Some(29.5));
    }

    #[test]
    fn test_extremes() {
        let highs = [3.0, 9.0, 4.0];
        let lows = [1.0, 0.5, 2.0];
        assert_eq!(
            MarketIndicators::extremes(highs.iter().copied(), lows.iter().copied()),
            Some((9.0, 0.5))
        );
        assert_eq!(MarketIndicators::extremes(std::iter::empty(), std::iter::empty()), None);
    }
}
