use serde::{Deserialize, Serialize};

use crate::error::{FetchError, PredictError};
use crate::fetch::{API_BASE, get_json_cached};
use crate::model::FeatureVector;

/// A player's aggregate rating line. Derived on every fetch, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub rating: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub win_rate: f64,
}

impl PlayerStats {
    /// Fallback persona for accounts with a profile but no rated games in
    /// any of the scanned modes.
    pub fn default_persona() -> Self {
        Self {
            rating: 1200,
            wins: 0,
            losses: 0,
            draws: 0,
            win_rate: 0.0,
        }
    }

    /// Field order here is a contract shared with the trained classifier.
    /// Changing it requires retraining the model.
    pub fn feature_vector(&self) -> FeatureVector {
        [
            self.rating as f64,
            self.wins as f64,
            self.losses as f64,
            self.draws as f64,
            self.win_rate,
        ]
    }
}

#[derive(Debug, Deserialize)]
pub struct StatsResponse {
    chess_bullet: Option<ModeStats>,
    chess_blitz: Option<ModeStats>,
    chess_rapid: Option<ModeStats>,
}

#[derive(Debug, Deserialize)]
struct ModeStats {
    last: Option<LastRating>,
    #[serde(default)]
    record: Option<GameRecord>,
}

#[derive(Debug, Deserialize)]
struct LastRating {
    rating: u32,
}

#[derive(Debug, Deserialize, Default)]
struct GameRecord {
    #[serde(default)]
    win: u32,
    #[serde(default)]
    loss: u32,
    #[serde(default)]
    draw: u32,
}

/// Fetch and normalize one player's rating statistics.
///
/// The profile lookup runs first so a nonexistent account fails `NotFound`
/// rather than surfacing as an empty stats document.
pub fn fetch_player_stats(username: &str) -> Result<PlayerStats, PredictError> {
    let profile_url = format!("{API_BASE}/player/{username}");
    get_json_cached(&profile_url).map_err(|e| not_found_or_fetch(e, username))?;

    let stats_url = format!("{API_BASE}/player/{username}/stats");
    let body = get_json_cached(&stats_url).map_err(|e| not_found_or_fetch(e, username))?;
    let resp = parse_stats_json(&body)?;
    Ok(stats_from_response(&resp))
}

fn not_found_or_fetch(err: FetchError, username: &str) -> PredictError {
    if err.status() == Some(404) {
        PredictError::NotFound(username.to_string())
    } else {
        PredictError::Fetch(err)
    }
}

pub fn parse_stats_json(raw: &str) -> Result<StatsResponse, PredictError> {
    serde_json::from_str(raw).map_err(|e| PredictError::Data(format!("invalid stats json: {e}")))
}

/// Scan modes in fixed priority order; the first mode carrying a last rating
/// wins outright. This is a priority pick, not a merge across modes.
pub fn stats_from_response(resp: &StatsResponse) -> PlayerStats {
    let modes = [&resp.chess_bullet, &resp.chess_blitz, &resp.chess_rapid];
    for mode in modes {
        let Some(mode) = mode else { continue };
        let Some(last) = mode.last.as_ref() else {
            continue;
        };
        let record = mode.record.as_ref();
        let wins = record.map(|r| r.win).unwrap_or(0);
        let losses = record.map(|r| r.loss).unwrap_or(0);
        let draws = record.map(|r| r.draw).unwrap_or(0);
        return PlayerStats {
            rating: last.rating,
            wins,
            losses,
            draws,
            win_rate: win_rate(wins, losses, draws),
        };
    }
    PlayerStats::default_persona()
}

pub fn win_rate(wins: u32, losses: u32, draws: u32) -> f64 {
    let total = wins + losses + draws;
    if total == 0 {
        return 0.0;
    }
    round2(100.0 * wins as f64 / total as f64)
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_rate_zero_games_is_zero() {
        assert_eq!(win_rate(0, 0, 0), 0.0);
    }

    #[test]
    fn win_rate_rounds_to_two_decimals() {
        // 4 / 14 = 28.571... -> 28.57
        assert_eq!(win_rate(4, 10, 0), 28.57);
        assert_eq!(win_rate(10, 5, 1), 62.5);
    }

    #[test]
    fn win_rate_stays_in_bounds() {
        for (w, l, d) in [(0u32, 9u32, 0u32), (7, 0, 0), (3, 3, 3), (1, 0, 999)] {
            let r = win_rate(w, l, d);
            assert!((0.0..=100.0).contains(&r), "win_rate {r} out of range");
        }
        assert_eq!(win_rate(7, 0, 0), 100.0);
    }

    #[test]
    fn bullet_beats_blitz_and_rapid() {
        let raw = r#"{
            "chess_bullet": {"last": {"rating": 1800}, "record": {"win": 2, "loss": 1, "draw": 1}},
            "chess_blitz": {"last": {"rating": 2400}, "record": {"win": 90, "loss": 5, "draw": 5}},
            "chess_rapid": {"last": {"rating": 900}}
        }"#;
        let stats = stats_from_response(&parse_stats_json(raw).unwrap());
        assert_eq!(stats.rating, 1800);
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.win_rate, 50.0);
    }

    #[test]
    fn later_mode_used_when_earlier_has_no_last_rating() {
        let raw = r#"{
            "chess_bullet": {"record": {"win": 5, "loss": 5, "draw": 0}},
            "chess_blitz": {"last": {"rating": 1510}, "record": {"win": 3, "loss": 1, "draw": 0}}
        }"#;
        let stats = stats_from_response(&parse_stats_json(raw).unwrap());
        assert_eq!(stats.rating, 1510);
        assert_eq!(stats.wins, 3);
    }

    #[test]
    fn no_mode_data_falls_back_to_default_persona() {
        let stats = stats_from_response(&parse_stats_json("{}").unwrap());
        assert_eq!(stats, PlayerStats::default_persona());
        assert_eq!(stats.rating, 1200);
        assert_eq!(stats.win_rate, 0.0);
    }

    #[test]
    fn mode_with_rating_but_no_record_counts_as_match() {
        let raw = r#"{"chess_rapid": {"last": {"rating": 1305}}}"#;
        let stats = stats_from_response(&parse_stats_json(raw).unwrap());
        assert_eq!(stats.rating, 1305);
        assert_eq!(stats.wins, 0);
        assert_eq!(stats.win_rate, 0.0);
    }

    #[test]
    fn feature_vector_order_is_fixed() {
        let stats = PlayerStats {
            rating: 1500,
            wins: 10,
            losses: 5,
            draws: 1,
            win_rate: 62.5,
        };
        assert_eq!(stats.feature_vector(), [1500.0, 10.0, 5.0, 1.0, 62.5]);
    }
}
