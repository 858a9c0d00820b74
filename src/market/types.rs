use anyhow::{bail, Result};
use chrono::NaiveDate;

/// One daily value series, strictly ascending by date, no duplicates.
/// Calendar gaps are tolerated and never filled.
#[derive(Debug, Clone, Default)]
pub struct DailySeries {
    points: Vec<(NaiveDate, f64)>,
}

impl DailySeries {
    pub fn from_points(points: Vec<(NaiveDate, f64)>) -> Result<Self> {
        for pair in points.windows(2) {
            if pair[1].0 <= pair[0].0 {
                bail!(
                    "daily series must be strictly ascending by date ({} then {})",
                    pair[0].0,
                    pair[1].0
                );
            }
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|(d, _)| *d).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }

    pub fn last_value(&self) -> Option<f64> {
        self.points.last().map(|(_, v)| *v)
    }

    /// Align this series to another calendar. Dates absent from this series
    /// come back as `None`.
    pub fn reindex(&self, dates: &[NaiveDate]) -> Vec<Option<f64>> {
        dates
            .iter()
            .map(|date| {
                self.points
                    .binary_search_by_key(date, |(d, _)| *d)
                    .ok()
                    .map(|idx| self.points[idx].1)
            })
            .collect()
    }
}

/// Fetch result for one symbol: adjusted closes plus share volume on the
/// same trading calendar.
#[derive(Debug, Clone)]
pub struct DailyQuotes {
    pub symbol: String,
    pub close: DailySeries,
    pub volume: DailySeries,
}
