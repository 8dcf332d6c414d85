//! # Error Types Module
//!
//! Structured errors for the probe. Every failure the remote service can
//! report is mapped onto one variant by HTTP status, so callers can match on
//! the failure class instead of parsing response bodies.

use thiserror::Error;

/// Main error type for probe operations
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The env file exists but could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing, empty or invalid credential
    #[error("Authentication failed: {message}")]
    Unauthorized { message: String },

    /// No index of that name in the caller's project
    #[error("Index '{name}' not found")]
    IndexNotFound { name: String },

    /// Request rejected by the data plane (dimension mismatch, bad metadata)
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Any other non-success response
    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },

    /// Connection, timeout or decoding failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProbeError {
    /// Map a non-success HTTP status and body to an error.
    ///
    /// `index` names the index being resolved; a 404 is only reported as
    /// `IndexNotFound` when it is set.
    pub fn from_status(status: u16, message: String, index: Option<&str>) -> Self {
        match status {
            401 | 403 => ProbeError::Unauthorized { message },
            404 => match index {
                Some(name) => ProbeError::IndexNotFound { name: name.to_string() },
                None => ProbeError::Service { status, message },
            },
            400 | 422 => ProbeError::Rejected { status, message },
            _ => ProbeError::Service { status, message },
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, ProbeError::Unauthorized { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProbeError::IndexNotFound { .. })
    }

    /// Check if the service rejected the payload itself
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, ProbeError::Rejected { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ProbeError::Transport(_))
    }
}

/// Result type for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;
