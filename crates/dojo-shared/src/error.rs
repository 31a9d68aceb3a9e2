use serde::{Deserialize, Serialize};

/// The crate's error taxonomy. `Parse` never actually occurs at runtime
/// (the arena's response parser is a total function with documented
/// defaults) but is kept as a variant so callers can match exhaustively.
#[derive(Debug, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum DojoError {
    #[error("backend call failed: {0}")]
    Backend(String),

    #[error("malformed guardian response: {0}")]
    Parse(String),

    #[error("record store error: {0}")]
    Storage(String),

    #[error("lineage serialization error: {0}")]
    Serialization(String),

    #[error("mutator produced invalid output: {0}")]
    MutatorInvalidOutput(String),

    #[error("scenario loader error: {0}")]
    ScenarioLoader(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type DojoResult<T> = std::result::Result<T, DojoError>;

impl From<serde_json::Error> for DojoError {
    fn from(err: serde_json::Error) -> Self {
        DojoError::Serialization(err.to_string())
    }
}
