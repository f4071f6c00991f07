use serde::Deserialize;

use crate::error::PredictError;
use crate::fetch::{API_BASE, get_json_cached};
use crate::live_game::profile_username;

/// One pairing from a tournament group's game list. Discarded after scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct TournamentMatch {
    pub white: String,
    pub black: String,
}

#[derive(Debug, Deserialize)]
struct GroupResponse {
    #[serde(default)]
    games: Vec<GroupGame>,
}

#[derive(Debug, Deserialize)]
struct GroupGame {
    white: Option<String>,
    black: Option<String>,
}

/// Fetch the pairings of one tournament round group.
///
/// Unlike the live-game path this is a required lookup: a non-success
/// response is a hard error, since there is nothing to fall back to.
pub fn fetch_group_matches(
    tournament: &str,
    round: u32,
    group: u32,
) -> Result<Vec<TournamentMatch>, PredictError> {
    let url = format!("{API_BASE}/tournament/{tournament}/{round}/{group}");
    let body = get_json_cached(&url)?;
    parse_group_matches_json(&body)
}

/// Games missing either participant reference are dropped silently; partial
/// entries show up in real group payloads and are a data-quality issue, not
/// a failure. Source ordering is preserved.
pub fn parse_group_matches_json(raw: &str) -> Result<Vec<TournamentMatch>, PredictError> {
    let resp: GroupResponse = serde_json::from_str(raw)
        .map_err(|e| PredictError::Data(format!("invalid tournament group json: {e}")))?;

    let mut matches = Vec::new();
    for game in resp.games {
        let white = game.white.as_deref().and_then(profile_username);
        let black = game.black.as_deref().and_then(profile_username);
        let (Some(white), Some(black)) = (white, black) else {
            continue;
        };
        matches.push(TournamentMatch { white, black });
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairings_in_source_order() {
        let raw = r#"{"games": [
            {"white": "https://api.chess.com/pub/player/Anna", "black": "https://api.chess.com/pub/player/Boris"},
            {"white": "https://api.chess.com/pub/player/carl", "black": "https://api.chess.com/pub/player/dina"}
        ]}"#;
        let matches = parse_group_matches_json(raw).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].white, "anna");
        assert_eq!(matches[0].black, "boris");
        assert_eq!(matches[1].white, "carl");
    }

    #[test]
    fn entries_missing_a_side_are_skipped() {
        let raw = r#"{"games": [
            {"white": "https://api.chess.com/pub/player/a"},
            {"white": "https://api.chess.com/pub/player/a", "black": ""},
            {"white": "https://api.chess.com/pub/player/a", "black": "https://api.chess.com/pub/player/b"}
        ]}"#;
        let matches = parse_group_matches_json(raw).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].black, "b");
    }

    #[test]
    fn empty_game_list_is_empty_not_error() {
        assert!(parse_group_matches_json("{}").unwrap().is_empty());
    }

    #[test]
    fn malformed_payload_is_a_data_error() {
        assert!(matches!(
            parse_group_matches_json("not json"),
            Err(PredictError::Data(_))
        ));
    }
}
