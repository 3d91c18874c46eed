//! Error taxonomy for the occurrence query core.
//!
//! Every rejected filter value surfaces as a typed error rather than an
//! empty result set. Validation-class errors are raised before any SQL
//! executes and carry the rejected value plus, where one exists, the live
//! valid-value set, so callers get an actionable message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OccurrenceError {
    #[error("unsupported region kind: {value}. Supported kinds: {valid:?}")]
    UnknownRegionKind { value: String, valid: Vec<String> },

    #[error("unknown salmon species: {value}. Known species: {valid:?}")]
    UnknownSpecies { value: String, valid: Vec<String> },

    #[error("unknown subgroup of species {species}: {value}. Known subgroups: {valid:?}")]
    UnknownSubgroup {
        species: String,
        value: String,
        valid: Vec<String>,
    },

    #[error("could not parse geometry {input:?}: {reason}")]
    MalformedGeometry { input: String, reason: String },

    #[error("persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl OccurrenceError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::UnknownRegionKind { .. } => 400,
            Self::UnknownSpecies { .. } => 400,
            Self::UnknownSubgroup { .. } => 400,
            Self::MalformedGeometry { .. } => 400,
            Self::Persistence(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, OccurrenceError>;
