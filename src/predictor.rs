use crate::error::PredictError;
use crate::model::Scorer;
use crate::stats::{PlayerStats, round2};

/// Which side of the matchup is predicted to win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    First,
    Second,
}

/// Output of one matchup scoring. Probabilities are percentages rounded to
/// two decimals, matching what gets logged and returned to callers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchupPrediction {
    pub prob_first: f64,
    pub prob_second: f64,
    pub winner: Winner,
}

/// Score both sides with the classifier and pick a winner.
///
/// The tie-break is asymmetric on purpose: equal probabilities resolve to
/// the second player. Historical prediction logs were produced under this
/// rule, so it must stay exactly as-is for reproducibility.
pub fn predict_matchup(
    scorer: &dyn Scorer,
    first: &PlayerStats,
    second: &PlayerStats,
) -> Result<MatchupPrediction, PredictError> {
    let prob_first = scorer.score(&first.feature_vector())?;
    let prob_second = scorer.score(&second.feature_vector())?;

    let winner = if prob_first > prob_second {
        Winner::First
    } else {
        Winner::Second
    };

    Ok(MatchupPrediction {
        prob_first: round2(prob_first * 100.0),
        prob_second: round2(prob_second * 100.0),
        winner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeatureVector;

    /// Deterministic stand-in for the trained forest: probability scales
    /// with rating alone.
    struct RatingScorer;

    impl Scorer for RatingScorer {
        fn score(&self, features: &FeatureVector) -> Result<f64, PredictError> {
            Ok((features[0] / 3000.0).clamp(0.0, 1.0))
        }
    }

    struct ConstantScorer(f64);

    impl Scorer for ConstantScorer {
        fn score(&self, _features: &FeatureVector) -> Result<f64, PredictError> {
            Ok(self.0)
        }
    }

    fn stats(rating: u32, wins: u32, losses: u32, draws: u32, win_rate: f64) -> PlayerStats {
        PlayerStats {
            rating,
            wins,
            losses,
            draws,
            win_rate,
        }
    }

    #[test]
    fn higher_rated_side_wins_under_rating_scorer() {
        let p1 = stats(1500, 10, 5, 1, 62.5);
        let p2 = stats(1400, 4, 10, 0, 28.57);
        let pred = predict_matchup(&RatingScorer, &p1, &p2).unwrap();
        assert_eq!(pred.winner, Winner::First);
        assert!(pred.prob_first > pred.prob_second);
        assert_eq!(pred.prob_first, 50.0);
        assert_eq!(pred.prob_second, 46.67);
    }

    #[test]
    fn prediction_is_deterministic() {
        let p1 = stats(2100, 40, 30, 10, 50.0);
        let p2 = stats(1900, 20, 20, 0, 50.0);
        let a = predict_matchup(&RatingScorer, &p1, &p2).unwrap();
        let b = predict_matchup(&RatingScorer, &p1, &p2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn exact_tie_always_resolves_to_second() {
        let p1 = stats(1500, 1, 1, 1, 33.33);
        let p2 = stats(1500, 9, 9, 9, 33.33);
        let pred = predict_matchup(&ConstantScorer(0.5), &p1, &p2).unwrap();
        assert_eq!(pred.winner, Winner::Second);
        assert_eq!(pred.prob_first, pred.prob_second);
    }

    #[test]
    fn probabilities_are_percentages_rounded_to_two_decimals() {
        let p1 = stats(1000, 0, 0, 0, 0.0);
        let p2 = stats(1000, 0, 0, 0, 0.0);
        let pred = predict_matchup(&ConstantScorer(0.123456), &p1, &p2).unwrap();
        assert_eq!(pred.prob_first, 12.35);
        assert_eq!(pred.prob_second, 12.35);
    }
}
