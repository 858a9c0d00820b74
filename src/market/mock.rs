use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};

use crate::market::types::{DailyQuotes, DailySeries};

/// Deterministic synthetic data source for offline runs and tests.
///
/// Prices follow a multiplicative walk with sine-driven pseudo-noise, so
/// repeated runs see identical series without a RNG dependency. Zero drift
/// and zero volatility produce exactly constant series.
#[derive(Debug, Clone)]
pub struct MockMarketData {
    pub bars: usize,
    pub drift: f64,
    pub volatility: f64,
}

impl Default for MockMarketData {
    fn default() -> Self {
        // Roughly two years of trading days, matching the live fetch window.
        Self {
            bars: 520,
            drift: 5e-4,
            volatility: 0.01,
        }
    }
}

impl MockMarketData {
    pub fn with_profile(bars: usize, drift: f64, volatility: f64) -> Self {
        Self {
            bars,
            drift,
            volatility,
        }
    }

    /// Synthetic daily history. The window is fixed by `bars`; the period
    /// string of the live contract is ignored.
    pub fn fetch_daily(&self, symbol: &str, _period: &str) -> Result<DailyQuotes> {
        let dates = trading_dates(self.bars);
        let base = base_level(symbol);

        let mut closes = Vec::with_capacity(dates.len());
        let mut volumes = Vec::with_capacity(dates.len());
        let mut price = base;
        for (i, date) in dates.iter().enumerate() {
            if i > 0 {
                price *= 1.0 + self.drift + self.volatility * noise(i);
            }
            let volume = 1.0e7 * (1.0 + 25.0 * self.volatility * noise(i + 7));
            closes.push((*date, price));
            volumes.push((*date, volume));
        }

        Ok(DailyQuotes {
            symbol: symbol.to_string(),
            close: DailySeries::from_points(closes)?,
            volume: DailySeries::from_points(volumes)?,
        })
    }
}

fn base_level(symbol: &str) -> f64 {
    match symbol {
        "QQQ" => 380.0,
        "^VIX" => 20.0,
        _ => 100.0,
    }
}

/// Pseudo-noise in [-1, 1], fixed for a given index.
fn noise(i: usize) -> f64 {
    (i as f64 * 12.9898).sin()
}

/// The most recent `bars` weekdays, ascending.
fn trading_dates(bars: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(bars);
    let mut day = Utc::now().date_naive();
    while dates.len() < bars {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(day);
        }
        day = day - Duration::days(1);
    }
    dates.reverse();
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_are_deterministic() {
        let source = MockMarketData::default();
        let a = source.fetch_daily("QQQ", "2y").unwrap();
        let b = source.fetch_daily("QQQ", "2y").unwrap();
        assert_eq!(a.close.values(), b.close.values());
        assert_eq!(a.close.len(), 520);
    }

    #[test]
    fn zero_profile_yields_constant_series() {
        let source = MockMarketData::with_profile(300, 0.0, 0.0);
        let quotes = source.fetch_daily("QQQ", "2y").unwrap();
        assert!(quotes.close.values().iter().all(|v| *v == 380.0));
        assert!(quotes.volume.values().iter().all(|v| *v == 1.0e7));
    }

    #[test]
    fn symbols_get_distinct_base_levels() {
        let source = MockMarketData::with_profile(10, 0.0, 0.0);
        let vix = source.fetch_daily("^VIX", "2y").unwrap();
        assert_eq!(vix.close.last_value(), Some(20.0));
    }

    #[test]
    fn dates_skip_weekends_and_ascend() {
        let dates = trading_dates(30);
        assert_eq!(dates.len(), 30);
        for pair in dates.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!(dates
            .iter()
            .all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));
    }
}
