use crate::clipboard::ClipboardError;
use crate::orchestrator::state::InvalidTransition;
use crate::store::StoreError;
use thiserror::Error;

/// Errors surfaced by the summarize flow.
///
/// The `Display` text of each variant is exactly what the user is shown.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("No active tab found")]
    NoActiveTab,

    #[error("Could not connect to page. Please refresh and try again.")]
    ExtractorUnreachable,

    #[error("Could not extract page content")]
    NoContentExtracted,

    /// Non-success response from the summarization API, carrying the server's message
    #[error("{0}")]
    ApiHttp(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Please enter an API key")]
    MissingApiKey,

    #[error("Failed to copy to clipboard")]
    ClipboardWriteFailed(#[source] ClipboardError),

    #[error("No summary to copy")]
    NothingToCopy,

    #[error("Browser host not available: {0}")]
    HostUnavailable(String),

    #[error("Could not access saved API key: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    State(#[from] InvalidTransition),
}

impl From<ClipboardError> for SummarizeError {
    fn from(err: ClipboardError) -> Self {
        SummarizeError::ClipboardWriteFailed(err)
    }
}

/// Fallback shown when the API fails without a message of its own
pub const GENERIC_API_ERROR: &str = "Failed to generate summary";

/// Summary shown when the API succeeds but returns no text
pub const NO_SUMMARY_PLACEHOLDER: &str = "No summary generated";
