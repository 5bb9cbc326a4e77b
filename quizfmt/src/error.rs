//! Error types surfaced by `quizfmt`.
//!
//! Only conditions that cannot be resolved locally become errors. Ambiguity inside a
//! single question block is absorbed into the data model (see `ParseWarning`).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuizError {
    /// The source document could not be opened or decoded. Fatal to the whole parse.
    #[error("failed to read document {}: {reason}", .path.display())]
    DocumentRead { path: PathBuf, reason: String },

    /// Parsing succeeded but the output artifact could not be saved.
    #[error("failed to write output {}: {reason}", .path.display())]
    OutputWrite { path: PathBuf, reason: String },

    /// The AI-assisted backend was requested but cannot run at all.
    #[error("LLM backend unavailable: {0}")]
    Llm(String),
}

impl QuizError {
    pub fn read(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> QuizError {
        QuizError::DocumentRead {
            path: path.into(),
            reason: format!("{:#}", err),
        }
    }

    pub fn write(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> QuizError {
        QuizError::OutputWrite {
            path: path.into(),
            reason: format!("{:#}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;
