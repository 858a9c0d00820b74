use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::error::AgentError;
use crate::feature::window::{make_window, SEQ_LEN};
use crate::feature::{build_features, FEATURE_COLUMNS};
use crate::market::DataSource;
use crate::model::signal::{Decision, Signal};
use crate::predictor::{predict_trend, ModelSet};
use crate::vote::{bullish_count, decide};

/// Minimum surviving feature rows: one full trading year. Anything shorter
/// would also starve the sequence window.
pub const MIN_HISTORY_ROWS: usize = 252;

/// Everything the run log summarizes, computed once per invocation.
#[derive(Debug, Clone)]
pub struct SignalReport {
    pub generated_at: DateTime<Utc>,
    pub trend: Signal,
    pub classifier: Signal,
    pub classifier_prob: f64,
    pub regime: Signal,
    pub regime_bull_prob: f64,
    pub bullish: u32,
    pub decision: Decision,
}

/// One full pipeline pass: fetch, build features, score the three
/// predictors, vote. Artifact degradation happened earlier in
/// `ModelSet::load`; everything that fails here fails the run.
pub fn run_once(
    config: &Config,
    source: &DataSource,
    models: &mut ModelSet,
) -> Result<SignalReport> {
    let quotes = source.fetch_daily(&config.data.symbol, &config.data.period)?;
    let vix = source.fetch_daily(&config.data.vix_symbol, &config.data.period)?;

    tracing::debug!(
        symbol = %quotes.symbol,
        bars = quotes.close.len(),
        vix_bars = vix.close.len(),
        "daily series ready"
    );

    let table = build_features(&quotes.close, &vix.close, &quotes.volume);
    if table.len() < MIN_HISTORY_ROWS {
        return Err(AgentError::InsufficientHistory {
            rows: table.len(),
            min: MIN_HISTORY_ROWS,
        }
        .into());
    }

    // A wrong feature row would silently corrupt all three signals, so the
    // schema is checked before any inference.
    let missing = table.missing_columns(&FEATURE_COLUMNS);
    if !missing.is_empty() {
        return Err(AgentError::SchemaMismatch(missing).into());
    }

    let closes = quotes.close.values();
    let trend = predict_trend(&closes)?;

    let latest_row = table.latest_row_in_order(&FEATURE_COLUMNS)?;
    let scaled_row = models.scaler.transform(&latest_row)?;
    let classifier_prob = models
        .classifier
        .predict_bull_prob(&scaled_row)
        .map_err(|e| AgentError::Inference(format!("classifier: {e:#}")))?;
    let classifier = if classifier_prob > config.thresholds.classifier {
        Signal::Bullish
    } else {
        Signal::Bearish
    };

    let window = make_window(&table, &FEATURE_COLUMNS, SEQ_LEN)?;
    let regime_bull_prob = models.regime.predict_bull_prob(&window)?;
    let regime = if regime_bull_prob >= config.thresholds.regime {
        Signal::Bullish
    } else {
        Signal::Bearish
    };

    let bullish = bullish_count(trend, classifier, regime);
    let decision = decide(trend, classifier, regime, config.thresholds.vote);

    Ok(SignalReport {
        generated_at: Utc::now(),
        trend,
        classifier,
        classifier_prob,
        regime,
        regime_bull_prob,
        bullish,
        decision,
    })
}
