use thiserror::Error;

use crate::booking::FormIssue;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Not logged in")]
    Unauthenticated,

    #[error("Booking form incomplete: {0:?}")]
    InvalidForm(Vec<FormIssue>),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Payment was not completed: {0}")]
    PaymentAborted(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
