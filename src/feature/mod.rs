pub mod window;

use chrono::{Datelike, NaiveDate};

use crate::error::AgentError;
use crate::indicator::rsi::rolling_rsi;
use crate::indicator::{pct_change_at, rolling_std_at};
use crate::market::types::DailySeries;

/// Lookback ladder shared by the return and volatility features.
pub const LOOKBACK_WINDOWS: [usize; 6] = [5, 10, 20, 50, 100, 200];

/// The longest rolling window; rows before it are consumed as warm-up.
pub const MAX_LOOKBACK: usize = 200;

pub const RSI_PERIOD: usize = 14;

/// Columns the classifier and regime models were trained on, in training
/// order. Order is semantically significant for both the scaler and the
/// sequence window.
pub const FEATURE_COLUMNS: [&str; 10] = [
    "ret_5", "ret_10", "ret_20", "vol_20", "vix", "rsi", "volume", "month", "dow", "ret_1",
];

/// Dense feature table: one fully-populated row per surviving date,
/// ascending, no duplicate dates.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    columns: Vec<String>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Declared columns absent from this table.
    pub fn missing_columns(&self, wanted: &[&str]) -> Vec<String> {
        wanted
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(|name| name.to_string())
            .collect()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r[col])
    }

    /// Materialize one row in the given column order.
    pub fn row_in_order(&self, row: usize, order: &[&str]) -> Result<Vec<f64>, AgentError> {
        let missing = self.missing_columns(order);
        if !missing.is_empty() {
            return Err(AgentError::SchemaMismatch(missing));
        }
        let source = self.rows.get(row).ok_or(AgentError::InsufficientHistory {
            rows: self.rows.len(),
            min: row + 1,
        })?;
        Ok(order
            .iter()
            .map(|name| source[self.column_index(name).expect("column checked above")])
            .collect())
    }

    /// The most recent row in the given column order.
    pub fn latest_row_in_order(&self, order: &[&str]) -> Result<Vec<f64>, AgentError> {
        if self.rows.is_empty() {
            return Err(AgentError::InsufficientHistory { rows: 0, min: 1 });
        }
        self.row_in_order(self.rows.len() - 1, order)
    }
}

/// Derive the feature table from the raw daily series. The VIX and volume
/// series are aligned to the price calendar first; rows with any undefined
/// feature are dropped, which consumes the warm-up period (exactly
/// `MAX_LOOKBACK` rows when the auxiliary series are complete).
pub fn build_features(
    price: &DailySeries,
    vix: &DailySeries,
    volume: &DailySeries,
) -> FeatureTable {
    let dates = price.dates();
    let closes = price.values();
    let n = closes.len();

    let vix_aligned = vix.reindex(&dates);
    let volume_aligned = volume.reindex(&dates);

    let ret_1: Vec<Option<f64>> = (0..n).map(|i| pct_change_at(&closes, i, 1)).collect();

    let mut columns: Vec<String> = Vec::new();
    let mut series: Vec<Vec<Option<f64>>> = Vec::new();

    columns.push("ret_1".to_string());
    series.push(ret_1.clone());
    for p in LOOKBACK_WINDOWS {
        columns.push(format!("ret_{p}"));
        series.push((0..n).map(|i| pct_change_at(&closes, i, p)).collect());
    }
    for p in LOOKBACK_WINDOWS {
        columns.push(format!("vol_{p}"));
        series.push((0..n).map(|i| Some(rolling_std_at(&ret_1, i, p))).collect());
    }
    columns.push("vix".to_string());
    series.push(vix_aligned);
    columns.push("volume".to_string());
    series.push(volume_aligned);
    columns.push("rsi".to_string());
    series.push(rolling_rsi(&closes, RSI_PERIOD));
    columns.push("month".to_string());
    series.push(dates.iter().map(|d| Some(d.month() as f64)).collect());
    columns.push("dow".to_string());
    series.push(
        dates
            .iter()
            .map(|d| Some(d.weekday().num_days_from_monday() as f64))
            .collect(),
    );

    let mut kept_dates = Vec::new();
    let mut rows = Vec::new();
    for i in 0..n {
        let row: Option<Vec<f64>> = series.iter().map(|col| col[i]).collect();
        if let Some(row) = row {
            kept_dates.push(dates[i]);
            rows.push(row);
        }
    }

    FeatureTable {
        columns,
        dates: kept_dates,
        rows,
    }
}
