//! Error taxonomy shared by every stage of the pairs backtest

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage that raised an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Ingestion,
    Spread,
    Cointegration,
    Backtest,
    Performance,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ingestion => "ingestion",
            Stage::Spread => "spread",
            Stage::Cointegration => "cointegration",
            Stage::Backtest => "backtest",
            Stage::Performance => "performance",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Precondition violations raised by the core computations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PairsError {
    /// Series lengths or indices do not line up
    #[error("[{stage}] alignment error: {detail}")]
    Alignment { stage: Stage, detail: String },

    /// A zero or non-finite price would be used as a divisor
    #[error("[{stage}] invalid price {price} for {instrument} at row {index}")]
    InvalidPrice {
        stage: Stage,
        instrument: String,
        index: usize,
        price: f64,
    },

    /// Zero variance (or too few points) makes a statistic undefined
    #[error("[{stage}] degenerate series: {detail}")]
    DegenerateSeries { stage: Stage, detail: String },

    #[error("[{stage}] insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        stage: Stage,
        required: usize,
        actual: usize,
    },

    #[error("data source error: {0}")]
    DataSource(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl PairsError {
    pub fn alignment(stage: Stage, detail: impl Into<String>) -> Self {
        PairsError::Alignment {
            stage,
            detail: detail.into(),
        }
    }

    pub fn degenerate(stage: Stage, detail: impl Into<String>) -> Self {
        PairsError::DegenerateSeries {
            stage,
            detail: detail.into(),
        }
    }

    /// Stage the error was raised in, if it came from the core
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PairsError::Alignment { stage, .. }
            | PairsError::InvalidPrice { stage, .. }
            | PairsError::DegenerateSeries { stage, .. }
            | PairsError::InsufficientData { stage, .. } => Some(*stage),
            PairsError::DataSource(_) | PairsError::Config(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PairsError>;
