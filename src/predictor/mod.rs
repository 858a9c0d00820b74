pub mod gbdt;
pub mod scaler;
pub mod sequence;

use anyhow::Result;
use std::path::Path;

use crate::config::ModelConfig;
use crate::error::AgentError;
use crate::feature::window::SequenceWindow;
use crate::feature::FEATURE_COLUMNS;
use crate::indicator::mean;
use crate::model::signal::Signal;
use gbdt::GbdtModel;
use scaler::FeatureScaler;
use sequence::SequenceModel;

/// Trailing window of the trend filter.
pub const TREND_LOOKBACK: usize = 200;

/// Probability emitted by the neutral classifier stand-in.
pub const NEUTRAL_CLASSIFIER_PROB: f64 = 0.5;

/// Bull probability emitted by the neutral regime stand-in (uniform over the
/// three classes).
pub const NEUTRAL_REGIME_PROB: f64 = 1.0 / 3.0;

/// Boosted-tree classifier, or the constant-probability stand-in used when
/// the artifact is missing or corrupt.
pub enum ClassifierModel {
    Gbdt(GbdtModel),
    Neutral,
}

impl ClassifierModel {
    pub fn predict_bull_prob(&self, scaled_row: &[f64]) -> Result<f64> {
        match self {
            Self::Gbdt(model) => model.predict_bull_prob(scaled_row),
            Self::Neutral => Ok(NEUTRAL_CLASSIFIER_PROB),
        }
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self, Self::Neutral)
    }
}

/// Fitted feature scaler, or the identity stand-in.
pub enum ScalerModel {
    Fitted(FeatureScaler),
    Identity,
}

impl ScalerModel {
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, AgentError> {
        match self {
            Self::Fitted(scaler) => scaler.transform(row),
            Self::Identity => Ok(row.to_vec()),
        }
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self, Self::Identity)
    }
}

/// Sequence regime classifier, or the uniform stand-in.
pub enum RegimeModel {
    Onnx(SequenceModel),
    Neutral,
}

impl RegimeModel {
    pub fn predict_bull_prob(&mut self, window: &SequenceWindow) -> Result<f64> {
        match self {
            Self::Onnx(model) => {
                let probs = model.predict_class_probs(window)?;
                Ok(probs[0])
            }
            Self::Neutral => Ok(NEUTRAL_REGIME_PROB),
        }
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self, Self::Neutral)
    }
}

/// The three model artifacts behind one loading step. Loading is best
/// effort and never fatal: each unavailable artifact degrades to its
/// neutral stand-in so the vote always sees three well-defined signals.
pub struct ModelSet {
    pub scaler: ScalerModel,
    pub classifier: ClassifierModel,
    pub regime: RegimeModel,
}

impl ModelSet {
    pub fn load(config: &ModelConfig) -> Self {
        let classifier = match load_artifact("classifier", &config.classifier_path(), |p| {
            GbdtModel::from_file(p)
        }) {
            Some(model) => ClassifierModel::Gbdt(model),
            None => ClassifierModel::Neutral,
        };

        let scaler = match load_artifact("scaler", &config.scaler_path(), |p| {
            FeatureScaler::from_file(p)
        }) {
            Some(scaler) if scaler.columns().iter().map(String::as_str).eq(FEATURE_COLUMNS) => {
                ScalerModel::Fitted(scaler)
            }
            Some(scaler) => {
                tracing::warn!(
                    artifact = "scaler",
                    fitted_columns = ?scaler.columns(),
                    "scaler column order does not match the feature columns; using identity stand-in"
                );
                ScalerModel::Identity
            }
            None => ScalerModel::Identity,
        };

        let regime = match load_artifact("regime", &config.regime_path(), |p| {
            SequenceModel::from_file(p)
        }) {
            Some(model) => RegimeModel::Onnx(model),
            None => RegimeModel::Neutral,
        };

        Self {
            scaler,
            classifier,
            regime,
        }
    }

    /// All three stand-ins; what `load` degrades to with no artifacts at all.
    pub fn neutral() -> Self {
        Self {
            scaler: ScalerModel::Identity,
            classifier: ClassifierModel::Neutral,
            regime: RegimeModel::Neutral,
        }
    }
}

fn load_artifact<T, F>(name: &str, path: &Path, load: F) -> Option<T>
where
    F: FnOnce(&Path) -> Result<T>,
{
    if !path.exists() {
        tracing::warn!(
            artifact = name,
            path = %path.display(),
            "artifact missing; using neutral stand-in"
        );
        return None;
    }
    match load(path) {
        Ok(model) => {
            tracing::info!(artifact = name, path = %path.display(), "artifact loaded");
            Some(model)
        }
        Err(error) => {
            tracing::warn!(
                artifact = name,
                path = %path.display(),
                error = %format!("{error:#}"),
                "artifact failed to load; using neutral stand-in"
            );
            None
        }
    }
}

/// Trend filter: Bullish iff the latest close is strictly above the mean of
/// the trailing `TREND_LOOKBACK` closes. No artifact involved.
pub fn predict_trend(closes: &[f64]) -> Result<Signal, AgentError> {
    if closes.len() < TREND_LOOKBACK {
        return Err(AgentError::InsufficientHistory {
            rows: closes.len(),
            min: TREND_LOOKBACK,
        });
    }
    let latest = closes[closes.len() - 1];
    let trailing_mean = mean(&closes[closes.len() - TREND_LOOKBACK..]);
    Ok(if latest > trailing_mean {
        Signal::Bullish
    } else {
        Signal::Bearish
    })
}
