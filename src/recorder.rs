use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a prediction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Manual,
    Tournament,
}

/// One scored matchup, immutable once produced. Appended to the log and
/// returned to the caller; the column set must stay stable across runs so
/// old rows remain readable for later analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub timestamp: DateTime<Utc>,
    pub player1: String,
    pub player2: String,
    pub player1_prob: f64,
    pub player2_prob: f64,
    pub winner: String,
    pub source: Source,
}

/// Append-only CSV store of prediction results. The header row is written
/// once when the file is created; rows are never rewritten or truncated.
#[derive(Debug, Clone)]
pub struct PredictionRecorder {
    path: PathBuf,
}

impl PredictionRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, result: &PredictionResult) -> Result<()> {
        let need_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open prediction log {}", self.path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(need_header)
            .from_writer(file);
        writer.serialize(result).context("failed to append prediction record")?;
        writer.flush().context("failed to flush prediction log")?;
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<PredictionResult>> {
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("failed to open prediction log {}", self.path.display()))?;
        let mut out = Vec::new();
        for row in reader.deserialize() {
            out.push(row.context("failed to parse prediction record")?);
        }
        Ok(out)
    }
}
