use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::accuracy::load_snapshot;
use crate::config::Config;
use crate::error::PredictError;
use crate::live_game::{LiveGame, resolve_shared_game};
use crate::model::{ForestScorer, Scorer};
use crate::predictor::{Winner, predict_matchup};
use crate::recorder::{PredictionRecorder, PredictionResult, Source};
use crate::stats::{PlayerStats, fetch_player_stats};
use crate::tournament::fetch_group_matches;

/// Per-player slice of a prediction response.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerOdds {
    pub username: String,
    pub prob: f64,
}

/// Response contract for a single-matchup prediction.
#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub player1: PlayerOdds,
    pub player2: PlayerOdds,
    pub winner: String,
    pub model_accuracy: String,
}

/// Response contract for a tournament-round batch.
#[derive(Debug, Clone, Serialize)]
pub struct TournamentRoundResponse {
    pub tournament: String,
    pub round: u32,
    pub group: u32,
    pub total_matches: usize,
    pub predictions: Vec<PredictionResult>,
}

/// Entry point the transport layer talks to. Holds the classifier loaded at
/// startup (read-only for the process lifetime), the prediction log, and the
/// location of the last backtest snapshot.
pub struct PredictionService {
    scorer: Option<Box<dyn Scorer>>,
    recorder: PredictionRecorder,
    snapshot_path: PathBuf,
}

impl PredictionService {
    pub fn new(
        scorer: Option<Box<dyn Scorer>>,
        recorder: PredictionRecorder,
        snapshot_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            scorer,
            recorder,
            snapshot_path: snapshot_path.into(),
        }
    }

    /// Build the service from environment configuration. A model that fails
    /// to load disables prediction serving (requests fail `ModelUnavailable`)
    /// but leaves the accuracy readout working.
    pub fn from_config(cfg: &Config) -> Self {
        let scorer: Option<Box<dyn Scorer>> = match ForestScorer::from_file(&cfg.model_path) {
            Ok(scorer) => Some(Box::new(scorer)),
            Err(e) => {
                warn!(error = %e, "classifier unavailable, predictions disabled");
                None
            }
        };
        Self::new(
            scorer,
            PredictionRecorder::new(cfg.log_path.clone()),
            cfg.snapshot_path.clone(),
        )
    }

    pub fn scorer(&self) -> Result<&dyn Scorer, PredictError> {
        self.scorer
            .as_deref()
            .ok_or(PredictError::ModelUnavailable)
    }

    /// Predict the winner of a two-player matchup.
    ///
    /// When the pair shares a live game, statistics are fetched for the
    /// game's own white/black participants (their canonical spellings), not
    /// the raw identifiers the caller supplied.
    pub fn predict(&self, player1: &str, player2: &str) -> Result<PredictResponse, PredictError> {
        let player1 = non_empty(player1).ok_or(PredictError::MissingInput("player1"))?;
        let player2 = non_empty(player2).ok_or(PredictError::MissingInput("player2"))?;
        let scorer = self.scorer()?;

        let (stats1, stats2) = match resolve_shared_game(player1, player2) {
            Some(game) => {
                info!(url = game.url.as_str(), "players share a live game");
                let white_stats = fetch_player_stats(&game.white)?;
                let black_stats = fetch_player_stats(&game.black)?;
                (
                    participant_stats(player1, &game, &white_stats, &black_stats)?,
                    participant_stats(player2, &game, &white_stats, &black_stats)?,
                )
            }
            None => (fetch_player_stats(player1)?, fetch_player_stats(player2)?),
        };

        let prediction = predict_matchup(scorer, &stats1, &stats2)?;
        let winner = match prediction.winner {
            Winner::First => player1,
            Winner::Second => player2,
        }
        .to_string();

        let result = PredictionResult {
            timestamp: Utc::now(),
            player1: player1.to_string(),
            player2: player2.to_string(),
            player1_prob: prediction.prob_first,
            player2_prob: prediction.prob_second,
            winner: winner.clone(),
            source: Source::Manual,
        };
        self.record(&result);

        Ok(PredictResponse {
            player1: PlayerOdds {
                username: player1.to_string(),
                prob: prediction.prob_first,
            },
            player2: PlayerOdds {
                username: player2.to_string(),
                prob: prediction.prob_second,
            },
            winner,
            model_accuracy: self.accuracy(),
        })
    }

    /// Predict every pairing of one tournament round group. A match whose
    /// stats cannot be resolved is dropped from the batch; the group fetch
    /// itself failing is a hard error.
    pub fn predict_tournament_round(
        &self,
        tournament: &str,
        round: u32,
        group: u32,
    ) -> Result<TournamentRoundResponse, PredictError> {
        let tournament =
            non_empty(tournament).ok_or(PredictError::MissingInput("tournament_id"))?;
        let scorer = self.scorer()?;

        let matches = fetch_group_matches(tournament, round, group)?;
        let mut predictions = Vec::new();

        for pairing in &matches {
            let stats = fetch_player_stats(&pairing.white)
                .and_then(|white| fetch_player_stats(&pairing.black).map(|black| (white, black)));
            let (white_stats, black_stats) = match stats {
                Ok(stats) => stats,
                Err(e) => {
                    warn!(
                        white = pairing.white.as_str(),
                        black = pairing.black.as_str(),
                        error = %e,
                        "skipping match with unresolvable stats"
                    );
                    continue;
                }
            };

            let prediction = match predict_matchup(scorer, &white_stats, &black_stats) {
                Ok(prediction) => prediction,
                Err(e) => {
                    warn!(
                        white = pairing.white.as_str(),
                        black = pairing.black.as_str(),
                        error = %e,
                        "skipping match that failed to score"
                    );
                    continue;
                }
            };
            let winner = match prediction.winner {
                Winner::First => pairing.white.clone(),
                Winner::Second => pairing.black.clone(),
            };
            let result = PredictionResult {
                timestamp: Utc::now(),
                player1: pairing.white.clone(),
                player2: pairing.black.clone(),
                player1_prob: prediction.prob_first,
                player2_prob: prediction.prob_second,
                winner,
                source: Source::Tournament,
            };
            self.record(&result);
            predictions.push(result);
        }

        Ok(TournamentRoundResponse {
            tournament: tournament.to_string(),
            round,
            group,
            total_matches: predictions.len(),
            predictions,
        })
    }

    /// Last backtested accuracy as a display string, "Unknown" before the
    /// first completed backtest.
    pub fn accuracy(&self) -> String {
        match load_snapshot(&self.snapshot_path) {
            Some(snapshot) => format!("{:.2}", snapshot.accuracy_percentage),
            None => "Unknown".to_string(),
        }
    }

    fn record(&self, result: &PredictionResult) {
        // Logging is best-effort: a failed append must not fail the request.
        if let Err(e) = self.recorder.append(result) {
            warn!(error = %e, "failed to append prediction record");
        }
    }
}

/// Map a requested identifier onto the stats of the live-game participant it
/// names, matching case-insensitively.
fn participant_stats(
    requested: &str,
    game: &LiveGame,
    white_stats: &PlayerStats,
    black_stats: &PlayerStats,
) -> Result<PlayerStats, PredictError> {
    if game.white.eq_ignore_ascii_case(requested) {
        Ok(white_stats.clone())
    } else if game.black.eq_ignore_ascii_case(requested) {
        Ok(black_stats.clone())
    } else {
        Err(PredictError::NotFound(requested.to_string()))
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}
