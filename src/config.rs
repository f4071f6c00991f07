use std::path::PathBuf;

/// Runtime knobs, read once from the environment (after `dotenvy` has had a
/// chance to populate it). Everything has a usable default so the binaries
/// run without any configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub model_path: PathBuf,
    pub log_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub lookback_months: usize,
    pub archive_delay_ms: u64,
    pub game_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            model_path: env_path("MODEL_PATH", "model.json"),
            log_path: env_path("PREDICTION_LOG", "predictions_log.csv"),
            snapshot_path: env_path("ACCURACY_FILE", "accuracy.json"),
            lookback_months: env_parse("BACKTEST_MONTHS", 3usize).max(1),
            archive_delay_ms: env_parse("ARCHIVE_DELAY_MS", 1000u64),
            game_delay_ms: env_parse("GAME_DELAY_MS", 500u64),
        }
    }
}

fn env_path(name: &str, default: &str) -> PathBuf {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|val| val.parse::<T>().ok())
        .unwrap_or(default)
}
