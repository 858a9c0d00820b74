use std::collections::HashMap;

use tqqq_agent::agent::run_once;
use tqqq_agent::config::Config;
use tqqq_agent::error::AgentError;
use tqqq_agent::market::mock::MockMarketData;
use tqqq_agent::market::DataSource;
use tqqq_agent::model::signal::{Decision, Signal};
use tqqq_agent::predictor::ModelSet;

fn offline_config(model_dir: &std::path::Path) -> Config {
    let vars: HashMap<String, String> = [
        ("USE_MOCK_DATA", "true"),
        ("MODEL_DIR", model_dir.to_str().unwrap()),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

#[test]
fn constant_market_with_neutral_models_goes_flat() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(dir.path());

    // Zero drift and volatility: every series is exactly constant. 460
    // pre-drop bars leave 260 feature rows, enough for the 252-row floor.
    let source = DataSource::Mock(MockMarketData::with_profile(460, 0.0, 0.0));
    let mut models = ModelSet::neutral();

    let report = run_once(&config, &source, &mut models).unwrap();

    // Latest close equals the 200-day mean exactly; strict > votes Bearish.
    assert_eq!(report.trend, Signal::Bearish);
    assert_eq!(report.classifier, Signal::Bearish);
    assert!((report.classifier_prob - 0.5).abs() < 1e-12);
    assert_eq!(report.regime, Signal::Bearish);
    assert!((report.regime_bull_prob - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(report.bullish, 0);
    assert_eq!(report.decision, Decision::Flat);
}

#[test]
fn default_mock_profile_produces_a_full_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(dir.path());

    let source = DataSource::Mock(MockMarketData::default());
    let mut models = ModelSet::neutral();

    let report = run_once(&config, &source, &mut models).unwrap();
    assert!((0.0..=1.0).contains(&report.classifier_prob));
    assert!((0.0..=1.0).contains(&report.regime_bull_prob));
    // Neutral models vote Bearish at the default thresholds, so at most the
    // trend filter is bullish and the 2-of-3 vote stays flat.
    assert!(report.bullish <= 1);
    assert_eq!(report.decision, Decision::Flat);
}

#[test]
fn short_history_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(dir.path());

    // 300 pre-drop bars leave only 100 feature rows.
    let source = DataSource::Mock(MockMarketData::with_profile(300, 0.0, 0.0));
    let mut models = ModelSet::neutral();

    let err = run_once(&config, &source, &mut models).unwrap_err();
    match err.downcast_ref::<AgentError>() {
        Some(AgentError::InsufficientHistory { rows, min }) => {
            assert_eq!(*rows, 100);
            assert_eq!(*min, 252);
        }
        other => panic!("expected InsufficientHistory, got {other:?}"),
    }
}

#[test]
fn vote_threshold_of_one_lets_a_single_bull_signal_go_long() {
    let dir = tempfile::tempdir().unwrap();
    let vars: HashMap<String, String> = [
        ("USE_MOCK_DATA", "true"),
        ("MODEL_DIR", dir.path().to_str().unwrap()),
        ("THRESH_VOTE", "1"),
        // Below the neutral 1/3, so the degraded regime model votes Bullish
        // through the >= comparison.
        ("THRESH_LSTM", "0.25"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

    let source = DataSource::Mock(MockMarketData::with_profile(460, 0.0, 0.0));
    let mut models = ModelSet::neutral();

    let report = run_once(&config, &source, &mut models).unwrap();
    assert_eq!(report.regime, Signal::Bullish);
    assert_eq!(report.decision, Decision::Long);
}
