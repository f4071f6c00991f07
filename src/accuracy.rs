use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::archive::{ArchiveGame, Colour, decisive_winner, fetch_archive_games, fetch_archives};
use crate::config::Config;
use crate::model::Scorer;
use crate::predictor::{Winner, predict_matchup};
use crate::stats::{fetch_player_stats, round2};

/// The single most recent backtest result. Overwritten wholesale by each
/// run that scores at least one game; no history is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracySnapshot {
    pub accuracy_percentage: f64,
    pub computed_at: DateTime<Utc>,
    pub sample_size: usize,
}

pub fn load_snapshot(path: &Path) -> Option<AccuracySnapshot> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

pub fn save_snapshot(path: &Path, snapshot: &AccuracySnapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(snapshot).context("serialize accuracy snapshot")?;
    fs::write(&tmp, json).context("write accuracy snapshot")?;
    fs::rename(&tmp, path).context("swap accuracy snapshot")?;
    Ok(())
}

/// Spacing between external calls. Owned by the backtest run that does the
/// iterating; the rating service throttles aggressive clients, so archives
/// and games are paced individually.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    pub archive_delay: Duration,
    pub game_delay: Duration,
}

impl Pacing {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            archive_delay: Duration::from_millis(cfg.archive_delay_ms),
            game_delay: Duration::from_millis(cfg.game_delay_ms),
        }
    }

    fn before_archive(&self) {
        if !self.archive_delay.is_zero() {
            thread::sleep(self.archive_delay);
        }
    }

    fn after_game(&self) {
        if !self.game_delay.is_zero() {
            thread::sleep(self.game_delay);
        }
    }
}

/// Why a game was left out of the accuracy tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotParticipant,
    NotDecisive,
    StatsUnavailable,
    ScoringFailed,
}

/// Pre-network screening of one archived game: either it is decisive and
/// involves the target player, or there is a named reason to skip it.
#[derive(Debug, Clone, PartialEq)]
pub enum GameCheck {
    Decisive {
        white: String,
        black: String,
        winner: Colour,
    },
    Skip(SkipReason),
}

pub fn check_game(username: &str, game: &ArchiveGame) -> GameCheck {
    let white = game.white.username.to_lowercase();
    let black = game.black.username.to_lowercase();
    let target = username.to_lowercase();
    if white != target && black != target {
        return GameCheck::Skip(SkipReason::NotParticipant);
    }
    let Some(winner) = decisive_winner(game) else {
        return GameCheck::Skip(SkipReason::NotDecisive);
    };
    GameCheck::Decisive { white, black, winner }
}

/// Outcome of a full evaluation run. `snapshot` is `None` when no game
/// could be scored, in which case any previously persisted snapshot is
/// left untouched.
#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub username: String,
    pub scored: usize,
    pub correct: usize,
    pub snapshot: Option<AccuracySnapshot>,
}

impl BacktestReport {
    pub fn no_valid_matches(&self) -> bool {
        self.scored == 0
    }
}

/// Replays a player's recent decisive games through the live prediction
/// logic and measures how often the predicted winner matched reality.
///
/// Statistics are fetched as they are *now*, not as they were when each
/// game was played, so the metric answers "does the current rating line
/// predict past outcomes" rather than true point-in-time accuracy. The
/// rating service exposes no historical stats endpoint, so this mismatch
/// is documented rather than worked around.
pub struct Backtester<'a> {
    scorer: &'a dyn Scorer,
    pacing: Pacing,
    lookback_months: usize,
    snapshot_path: PathBuf,
}

impl<'a> Backtester<'a> {
    pub fn new(
        scorer: &'a dyn Scorer,
        pacing: Pacing,
        lookback_months: usize,
        snapshot_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            scorer,
            pacing,
            lookback_months: lookback_months.max(1),
            snapshot_path: snapshot_path.into(),
        }
    }

    /// Long-running: duration scales with archive size times lookback.
    /// Run out-of-band, never inline with a prediction request.
    pub fn evaluate(&self, username: &str) -> BacktestReport {
        let archives = fetch_archives(username);
        let recent: Vec<&String> = archives
            .iter()
            .rev()
            .take(self.lookback_months)
            .rev()
            .collect();

        let mut correct = 0usize;
        let mut scored = 0usize;

        for archive_url in recent {
            self.pacing.before_archive();
            let games = match fetch_archive_games(archive_url) {
                Ok(games) => games,
                Err(e) => {
                    warn!(archive = archive_url.as_str(), error = %e, "skipping unreadable archive");
                    continue;
                }
            };
            info!(archive = archive_url.as_str(), games = games.len(), "scoring archive");

            for game in &games {
                match self.evaluate_game(username, game) {
                    GameEval::Scored { correct: was_correct } => {
                        scored += 1;
                        if was_correct {
                            correct += 1;
                        }
                        self.pacing.after_game();
                    }
                    GameEval::Skipped(reason) => {
                        debug!(?reason, "skipping game");
                        if matches!(reason, SkipReason::StatsUnavailable | SkipReason::ScoringFailed) {
                            // Network was touched; keep the spacing honest.
                            self.pacing.after_game();
                        }
                    }
                }
            }
        }

        let snapshot = accuracy_percentage(correct, scored).map(|pct| AccuracySnapshot {
            accuracy_percentage: pct,
            computed_at: Utc::now(),
            sample_size: scored,
        });

        match snapshot.as_ref() {
            Some(snap) => {
                info!(
                    player = username,
                    scored,
                    correct,
                    accuracy = snap.accuracy_percentage,
                    "backtest complete"
                );
                if let Err(e) = save_snapshot(&self.snapshot_path, snap) {
                    warn!(error = %e, "failed to persist accuracy snapshot");
                }
            }
            None => warn!(player = username, "no valid matches found in lookback window"),
        }

        BacktestReport {
            username: username.to_string(),
            scored,
            correct,
            snapshot,
        }
    }

    fn evaluate_game(&self, username: &str, game: &ArchiveGame) -> GameEval {
        let (white, black, actual) = match check_game(username, game) {
            GameCheck::Decisive { white, black, winner } => (white, black, winner),
            GameCheck::Skip(reason) => return GameEval::Skipped(reason),
        };

        let white_stats = match fetch_player_stats(&white) {
            Ok(stats) => stats,
            Err(e) => {
                debug!(player = white.as_str(), error = %e, "stats unavailable");
                return GameEval::Skipped(SkipReason::StatsUnavailable);
            }
        };
        let black_stats = match fetch_player_stats(&black) {
            Ok(stats) => stats,
            Err(e) => {
                debug!(player = black.as_str(), error = %e, "stats unavailable");
                return GameEval::Skipped(SkipReason::StatsUnavailable);
            }
        };

        let prediction = match predict_matchup(self.scorer, &white_stats, &black_stats) {
            Ok(prediction) => prediction,
            Err(e) => {
                debug!(error = %e, "scoring failed");
                return GameEval::Skipped(SkipReason::ScoringFailed);
            }
        };

        let predicted = match prediction.winner {
            Winner::First => Colour::White,
            Winner::Second => Colour::Black,
        };
        GameEval::Scored {
            correct: predicted == actual,
        }
    }
}

enum GameEval {
    Scored { correct: bool },
    Skipped(SkipReason),
}

pub fn accuracy_percentage(correct: usize, total: usize) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(round2(100.0 * correct as f64 / total as f64))
}
