use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::info;

use crate::error::PredictError;

/// Fixed-order representation consumed by the classifier:
/// `[rating, wins, losses, draws, win_rate]`.
pub type FeatureVector = [f64; 5];

/// External scoring capability: maps one feature vector to the probability
/// of the favorable outcome class. Immutable for the process lifetime,
/// loaded before serving begins, swapped only via restart.
pub trait Scorer {
    fn score(&self, features: &FeatureVector) -> Result<f64, PredictError>;
}

/// Random-forest scorer deserialized from a JSON model file. The forest is
/// trained offline on 0/1 outcome labels, so its regression output is read
/// directly as a probability (clamped for trees that drift past the bounds).
pub struct ForestScorer {
    model: RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>,
}

impl ForestScorer {
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open model file {}", path.display()))?;
        let model = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to deserialize model {}", path.display()))?;
        info!(path = %path.display(), "classifier loaded");
        Ok(Self { model })
    }
}

impl Scorer for ForestScorer {
    fn score(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        let input = DenseMatrix::from_2d_vec(&vec![features.to_vec()])
            .map_err(|e| PredictError::Data(format!("feature matrix: {e}")))?;
        let predictions = self
            .model
            .predict(&input)
            .map_err(|e| PredictError::Data(format!("model scoring failed: {e}")))?;
        let raw = predictions
            .first()
            .copied()
            .ok_or_else(|| PredictError::Data("model returned no prediction".to_string()))?;
        Ok(raw.clamp(0.0, 1.0))
    }
}
