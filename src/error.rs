//! Fetch errors

use crate::schema::FailureKind;
use reqwest::StatusCode;
use thiserror::Error;

/// Failure to obtain the raw account page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("login rejected with status {0}")]
    Auth(StatusCode),

    #[error("account page returned status {0}")]
    Retrieval(StatusCode),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Auth(_) => FailureKind::Auth,
            FetchError::Retrieval(_) => FailureKind::Retrieval,
            FetchError::Transport(_) => FailureKind::Transport,
        }
    }
}
