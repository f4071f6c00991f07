use std::process::ExitCode;

use chesscast::accuracy::{Backtester, Pacing};
use chesscast::config::Config;
use chesscast::model::ForestScorer;

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chesscast=info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(username) = args.next() else {
        eprintln!("usage: backtest <username> [lookback_months]");
        return Ok(ExitCode::FAILURE);
    };

    let cfg = Config::from_env();
    let lookback = args
        .next()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(cfg.lookback_months);

    // Unlike the serving path, a missing model is fatal here: there is
    // nothing to evaluate without it.
    let scorer = ForestScorer::from_file(&cfg.model_path)?;
    let backtester = Backtester::new(
        &scorer,
        Pacing::from_config(&cfg),
        lookback,
        cfg.snapshot_path.clone(),
    );

    let report = backtester.evaluate(&username);
    if report.no_valid_matches() {
        println!("No valid matches found for '{}'.", report.username);
        return Ok(ExitCode::FAILURE);
    }

    let snapshot = report.snapshot.expect("scored games imply a snapshot");
    println!(
        "Evaluated {} games for '{}' ({} predicted correctly)",
        report.scored, report.username, report.correct
    );
    println!("Prediction accuracy: {:.2}%", snapshot.accuracy_percentage);
    Ok(ExitCode::SUCCESS)
}
