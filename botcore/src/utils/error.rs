use strum::{EnumIs, EnumTryAs};
use thiserror::Error;

use crate::{construction::ObjectId, provers::ProofResult};

/// Errors of the proving pipeline.
///
/// None of them escapes [`crate::provers::Prover::prove`]: every variant maps
/// to a [`ProofResult`] through [`BotError::proof_result`].
#[derive(Debug, Error, EnumIs, EnumTryAs)]
pub enum BotError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse settings file '{file}': {source}")]
    SettingsParseError {
        source: toml::de::Error,
        file: String,
    },

    #[error("Construction step of {object} ({kind}) has no algebraic description")]
    UnsupportedConstruction { object: ObjectId, kind: String },

    #[error("Object {0} is not part of the construction")]
    MissingObject(ObjectId),

    #[error("Backend '{0}' is not ready")]
    BackendNotReady(String),

    #[error("Backend '{backend}' failed: {message}")]
    Backend { backend: String, message: String },

    #[error("Unparseable answer from '{backend}': {answer}")]
    Unparseable { backend: String, answer: String },

    #[error("Polynomial error: {0}")]
    Polynomial(#[from] botpoly::Error),

    #[error("An unknown error occurred: {0}")]
    Unknown(String),
}

impl BotError {
    /// Verdict reported when a proof attempt ends with this error.
    pub fn proof_result(&self) -> ProofResult {
        match self {
            BotError::BackendNotReady(_) => ProofResult::Processing,
            _ => ProofResult::Unknown,
        }
    }
}

pub type BotResult<T> = Result<T, BotError>;
