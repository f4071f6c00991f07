use serde::Deserialize;
use tracing::debug;

use crate::fetch::{API_BASE, get_json};

/// A game currently in progress. Transient: fetched fresh per request and
/// discarded after the prediction is served.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveGame {
    pub url: String,
    pub white: String,
    pub black: String,
    pub start_time: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CurrentGamesResponse {
    #[serde(default)]
    games: Vec<CurrentGame>,
}

#[derive(Debug, Deserialize)]
struct CurrentGame {
    url: Option<String>,
    // Profile-reference URLs ("https://api.chess.com/pub/player/<name>").
    white: Option<String>,
    black: Option<String>,
    #[serde(default)]
    start_time: Option<u64>,
}

/// Look for a game the two players currently share.
///
/// Fail-soft by contract: any fetch or parse problem on either side reports
/// "no live game" and never surfaces an error to the caller, since the
/// prediction path falls back to historical statistics anyway.
pub fn resolve_shared_game(player_a: &str, player_b: &str) -> Option<LiveGame> {
    let games_a = match fetch_current_games(player_a) {
        Ok(games) => games,
        Err(reason) => {
            debug!(player = player_a, %reason, "current-games fetch failed, assuming no live game");
            return None;
        }
    };
    let games_b = match fetch_current_games(player_b) {
        Ok(games) => games,
        Err(reason) => {
            debug!(player = player_b, %reason, "current-games fetch failed, assuming no live game");
            return None;
        }
    };
    pick_shared_game(games_a, &games_b)
}

fn fetch_current_games(username: &str) -> Result<Vec<LiveGame>, String> {
    let url = format!("{API_BASE}/player/{username}/games");
    let body = get_json(&url).map_err(|e| e.to_string())?;
    parse_current_games_json(&body).map_err(|e| e.to_string())
}

pub fn parse_current_games_json(raw: &str) -> Result<Vec<LiveGame>, serde_json::Error> {
    let resp: CurrentGamesResponse = serde_json::from_str(raw)?;
    let mut out = Vec::new();
    for game in resp.games {
        let Some(url) = game.url.filter(|u| !u.is_empty()) else {
            continue;
        };
        let Some(white) = game.white.as_deref().and_then(profile_username) else {
            continue;
        };
        let Some(black) = game.black.as_deref().and_then(profile_username) else {
            continue;
        };
        out.push(LiveGame {
            url,
            white,
            black,
            start_time: game.start_time,
        });
    }
    Ok(out)
}

/// Deterministic pick among shared games: earliest start time first, games
/// without a start time last, URL as the final tie-break. The selection must
/// be stable across calls so repeated predictions for the same pair agree.
pub fn pick_shared_game(games_a: Vec<LiveGame>, games_b: &[LiveGame]) -> Option<LiveGame> {
    let mut shared: Vec<LiveGame> = games_a
        .into_iter()
        .filter(|g| games_b.iter().any(|other| other.url == g.url))
        .collect();
    shared.sort_by(|a, b| {
        let ta = a.start_time.unwrap_or(u64::MAX);
        let tb = b.start_time.unwrap_or(u64::MAX);
        ta.cmp(&tb).then_with(|| a.url.cmp(&b.url))
    });
    shared.into_iter().next()
}

/// Last path segment of a profile-reference URL, lowercased.
pub fn profile_username(reference: &str) -> Option<String> {
    let name = reference.trim().trim_end_matches('/').rsplit('/').next()?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_lowercase())
}
