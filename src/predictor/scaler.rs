use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::error::AgentError;

/// Standard-scaler parameters exported at training time: per-column mean and
/// scale, in the exact column order the classifier was fitted with.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureScaler {
    columns: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl FeatureScaler {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let scaler: FeatureScaler =
            serde_json::from_str(&raw).context("scaler artifact is not valid JSON")?;
        if scaler.columns.is_empty()
            || scaler.columns.len() != scaler.mean.len()
            || scaler.columns.len() != scaler.scale.len()
        {
            bail!(
                "scaler artifact is inconsistent: {} columns, {} means, {} scales",
                scaler.columns.len(),
                scaler.mean.len(),
                scaler.scale.len()
            );
        }
        Ok(scaler)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Center and scale one row, which must match the fitted column count.
    /// Zero (or non-finite) scale entries pass the value through centered,
    /// mirroring how the artifact producer treats zero-variance columns.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, AgentError> {
        if row.len() != self.columns.len() {
            return Err(AgentError::Scaling(format!(
                "row has {} values, scaler was fitted on {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(value, (mean, scale))| {
                let centered = value - mean;
                if scale.is_finite() && scale.abs() > f64::EPSILON {
                    centered / scale
                } else {
                    centered
                }
            })
            .collect())
    }
}
