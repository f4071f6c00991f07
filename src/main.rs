use anyhow::{Result, bail};

use chesscast::config::Config;
use chesscast::service::PredictionService;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chesscast=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cfg = Config::from_env();
    let service = PredictionService::from_config(&cfg);

    match args.first().map(String::as_str) {
        Some("--accuracy") => {
            println!("Model accuracy: {}", service.accuracy());
            Ok(())
        }
        Some("--tournament") => run_tournament(&service, &args[1..]),
        Some(_) if args.len() == 2 => run_matchup(&service, &args[0], &args[1]),
        _ => {
            bail!(
                "usage: chesscast <player1> <player2>\n       chesscast --tournament <id> <round> <group>\n       chesscast --accuracy"
            );
        }
    }
}

fn run_matchup(service: &PredictionService, player1: &str, player2: &str) -> Result<()> {
    let response = service.predict(player1, player2)?;
    println!(
        "{}: {:.2}%",
        response.player1.username, response.player1.prob
    );
    println!(
        "{}: {:.2}%",
        response.player2.username, response.player2.prob
    );
    println!("Predicted winner: {}", response.winner);
    println!("Model accuracy: {}", response.model_accuracy);
    Ok(())
}

fn run_tournament(service: &PredictionService, args: &[String]) -> Result<()> {
    let [tournament, round, group] = args else {
        bail!("usage: chesscast --tournament <id> <round> <group>");
    };
    let round: u32 = round.parse()?;
    let group: u32 = group.parse()?;

    let response = service.predict_tournament_round(tournament, round, group)?;
    println!(
        "{} round {} group {}: {} matches",
        response.tournament, response.round, response.group, response.total_matches
    );
    for prediction in &response.predictions {
        println!(
            "{} ({:.2}%) vs {} ({:.2}%) -> {}",
            prediction.player1,
            prediction.player1_prob,
            prediction.player2,
            prediction.player2_prob,
            prediction.winner
        );
    }
    Ok(())
}
