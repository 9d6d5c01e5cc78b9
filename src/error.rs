use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Reasons an ingestion batch is rejected. Any of these leaves the
/// previously published collections untouched.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Not valid JSON, or not an array of play records.
    #[error("failed to parse {source_name}: {source}")]
    Parse {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("an ingestion is already in progress")]
    Busy,
}

impl IngestError {
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
