use serde::Deserialize;
use tracing::warn;

use crate::error::PredictError;
use crate::fetch::{API_BASE, get_json_cached};

/// One completed game out of a monthly archive.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveGame {
    pub white: ArchiveSide,
    pub black: ArchiveSide,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveSide {
    #[serde(default)]
    pub username: String,
    // Result code as recorded by chess.com: "win", a loss code such as
    // "checkmated"/"timeout"/"resigned", or a draw code.
    #[serde(default)]
    pub result: String,
}

/// The side that won a decisive game. Exactly one side carries "win";
/// everything else (draw codes, aborted games) is non-decisive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    White,
    Black,
}

pub fn decisive_winner(game: &ArchiveGame) -> Option<Colour> {
    match (game.white.result == "win", game.black.result == "win") {
        (true, false) => Some(Colour::White),
        (false, true) => Some(Colour::Black),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct ArchivesResponse {
    #[serde(default)]
    archives: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ArchiveGamesResponse {
    #[serde(default)]
    games: Vec<ArchiveGame>,
}

/// Chronological list of a player's monthly archive URLs.
///
/// An unavailable index degrades to an empty list: the backtest then reports
/// "no valid matches" instead of aborting.
pub fn fetch_archives(username: &str) -> Vec<String> {
    let url = format!("{API_BASE}/player/{username}/games/archives");
    match get_json_cached(&url) {
        Ok(body) => parse_archives_json(&body).unwrap_or_else(|e| {
            warn!(player = username, error = %e, "malformed archive index");
            Vec::new()
        }),
        Err(e) => {
            warn!(player = username, error = %e, "failed to fetch archive index");
            Vec::new()
        }
    }
}

pub fn fetch_archive_games(url: &str) -> Result<Vec<ArchiveGame>, PredictError> {
    let body = get_json_cached(url)?;
    parse_archive_games_json(&body)
        .map_err(|e| PredictError::Data(format!("malformed archive payload: {e}")))
}

pub fn parse_archives_json(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    let resp: ArchivesResponse = serde_json::from_str(raw)?;
    Ok(resp.archives)
}

pub fn parse_archive_games_json(raw: &str) -> Result<Vec<ArchiveGame>, serde_json::Error> {
    let resp: ArchiveGamesResponse = serde_json::from_str(raw)?;
    Ok(resp.games)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(white_result: &str, black_result: &str) -> ArchiveGame {
        ArchiveGame {
            white: ArchiveSide {
                username: "w".to_string(),
                result: white_result.to_string(),
            },
            black: ArchiveSide {
                username: "b".to_string(),
                result: black_result.to_string(),
            },
        }
    }

    #[test]
    fn win_codes_map_to_the_winning_colour() {
        assert_eq!(decisive_winner(&game("win", "checkmated")), Some(Colour::White));
        assert_eq!(decisive_winner(&game("timeout", "win")), Some(Colour::Black));
        assert_eq!(decisive_winner(&game("resigned", "win")), Some(Colour::Black));
    }

    #[test]
    fn draws_and_oddities_are_not_decisive() {
        assert_eq!(decisive_winner(&game("agreed", "agreed")), None);
        assert_eq!(decisive_winner(&game("stalemate", "stalemate")), None);
        assert_eq!(decisive_winner(&game("repetition", "repetition")), None);
        // Defensive: two "win" records would be corrupt data, never a winner.
        assert_eq!(decisive_winner(&game("win", "win")), None);
        assert_eq!(decisive_winner(&game("", "")), None);
    }

    #[test]
    fn archive_index_parses_in_order() {
        let raw = r#"{"archives": [
            "https://api.chess.com/pub/player/x/games/2025/04",
            "https://api.chess.com/pub/player/x/games/2025/05"
        ]}"#;
        let archives = parse_archives_json(raw).unwrap();
        assert_eq!(archives.len(), 2);
        assert!(archives[0].ends_with("2025/04"));
    }
}
