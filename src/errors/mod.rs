//! Unified error type for the audit run.
//!
//! Most variants abandon a single branch of the pipeline (one occurrence,
//! one page); only configuration and report I/O errors end the run.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{context} returned status {status}")]
    Status { context: String, status: u16 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed login script for scan occurrence {scan_occurrence_id}: {source}")]
    MalformedScript {
        scan_occurrence_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Check if this error is a non-success HTTP status.
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the pipeline can drop the current occurrence and keep going.
    pub fn is_skippable(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Csv(_) | Self::Io(_))
    }
}
