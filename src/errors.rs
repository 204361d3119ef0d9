//! Typed error hierarchy for the board.
//!
//! Two enums cover the two layers that can fail:
//! - `ClientError`: a single REST call (transport, status, response shape)
//! - `SessionError`: a board-level action that failed because a call did
//!
//! The board builder and the drag reducer are infallible.

use thiserror::Error;

/// Errors from a single call to the CRM backend.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from {url}: {message}")]
    Malformed { url: String, message: String },
}

impl ClientError {
    /// HTTP status for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors surfaced by [`crate::session::BoardSession`] actions.
///
/// By the time one of these is returned the session has already applied its
/// recovery: the affected list was reset, or the optimistic move rolled back.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to load {what}: {source}")]
    Load {
        what: &'static str,
        #[source]
        source: ClientError,
    },

    #[error("Failed to move {card_id} to {target_stage_id}: {source}")]
    Update {
        card_id: String,
        target_stage_id: String,
        #[source]
        source: ClientError,
    },
}
