use std::fs;
use std::path::PathBuf;

use chesscast::archive::{Colour, decisive_winner, parse_archive_games_json};
use chesscast::live_game::{parse_current_games_json, pick_shared_game};
use chesscast::stats::{parse_stats_json, stats_from_response};
use chesscast::tournament::parse_group_matches_json;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn stats_fixture_picks_bullet_over_blitz() {
    let raw = read_fixture("player_stats.json");
    let stats = stats_from_response(&parse_stats_json(&raw).expect("fixture should parse"));
    // Bullet is first in the priority order even though blitz has far more
    // games; unknown sections (daily, tactics, puzzles) are ignored.
    assert_eq!(stats.rating, 1532);
    assert_eq!(stats.wins, 10);
    assert_eq!(stats.losses, 5);
    assert_eq!(stats.draws, 1);
    assert_eq!(stats.win_rate, 62.5);
}

#[test]
fn current_games_fixture_parses_and_picks_deterministically() {
    let raw = read_fixture("current_games.json");
    let games = parse_current_games_json(&raw).expect("fixture should parse");
    // The entry without a black participant is dropped.
    assert_eq!(games.len(), 2);
    assert_eq!(games[1].white, "magnuscarlsen");
    assert_eq!(games[1].black, "hikaru");

    // Both lists intersect in both games; the earlier start_time wins.
    let picked = pick_shared_game(games.clone(), &games).expect("shared game expected");
    assert_eq!(picked.url, "https://www.chess.com/game/daily/g123");
}

#[test]
fn tournament_group_fixture_skips_incomplete_pairings() {
    let raw = read_fixture("tournament_group.json");
    let matches = parse_group_matches_json(&raw).expect("fixture should parse");
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].white, "anna");
    assert_eq!(matches[0].black, "boris");
    assert_eq!(matches[1].white, "dina");
    assert_eq!(matches[1].black, "emil");
}

#[test]
fn archive_fixture_classifies_results() {
    let raw = read_fixture("archive_games.json");
    let games = parse_archive_games_json(&raw).expect("fixture should parse");
    assert_eq!(games.len(), 3);
    assert_eq!(decisive_winner(&games[0]), Some(Colour::White));
    assert_eq!(decisive_winner(&games[1]), None);
    assert_eq!(decisive_winner(&games[2]), Some(Colour::Black));
}

#[test]
fn empty_stats_document_yields_default_persona() {
    let stats = stats_from_response(&parse_stats_json("{}").expect("empty object should parse"));
    assert_eq!(stats.rating, 1200);
    assert_eq!(stats.wins, 0);
    assert_eq!(stats.win_rate, 0.0);
}
