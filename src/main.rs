use anyhow::Result;

use tqqq_agent::agent::{run_once, SignalReport};
use tqqq_agent::config::Config;
use tqqq_agent::market::mock::MockMarketData;
use tqqq_agent::market::yahoo::YahooClient;
use tqqq_agent::market::DataSource;
use tqqq_agent::predictor::ModelSet;

fn main() {
    // Install rustls crypto provider (required by rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                config
                    .logging
                    .level
                    .parse()
                    .unwrap_or_else(|_| "info".parse().unwrap())
            }),
        )
        .init();

    if let Err(e) = run(&config) {
        tracing::error!(error = %format!("{e:#}"), "signal run aborted");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<()> {
    tracing::info!(
        symbol = %config.data.symbol,
        dry_run = config.dry_run,
        use_mock_data = config.data.use_mock_data,
        "Starting TQQQ signal agent"
    );

    let mut models = ModelSet::load(&config.models);

    let source = if config.data.use_mock_data {
        tracing::info!("using deterministic mock data for offline run");
        DataSource::Mock(MockMarketData::default())
    } else {
        DataSource::Yahoo(YahooClient::new())
    };

    let report = run_once(config, &source, &mut models)?;
    log_report(&report);

    if !config.dry_run {
        tracing::warn!("DRY_RUN is false but no execution module is wired in; signal is advisory only");
    }

    Ok(())
}

fn log_report(report: &SignalReport) {
    tracing::info!(
        date = %report.generated_at.format("%Y-%m-%d %H:%M UTC"),
        trend = %report.trend,
        classifier = %report.classifier,
        classifier_prob = format!("{:.2}", report.classifier_prob),
        regime = %report.regime,
        regime_bull_prob = format!("{:.2}", report.regime_bull_prob),
        bullish = format!("{}/3", report.bullish),
        "tomorrow's signal: {}",
        report.decision
    );
}
