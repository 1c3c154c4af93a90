//! Error taxonomy for building and sending requests
//!
//! Build errors abort a send before anything reaches the network and are
//! returned to the caller. Transport failures never escape the executor;
//! they are folded into a status-0 [`ApiResponse`](crate::models::ApiResponse)
//! tagged with a [`TransportErrorKind`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every failure a send can end in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    InvalidUrl,
    InvalidBody,
    Timeout,
    CorsOrNetwork,
    UnknownClientError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "invalid-url",
            ErrorKind::InvalidBody => "invalid-body",
            ErrorKind::Timeout => "timeout",
            ErrorKind::CorsOrNetwork => "cors-or-network",
            ErrorKind::UnknownClientError => "unknown-client-error",
        }
    }
}

/// Rejection raised while assembling a request
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid body: {0}")]
    InvalidBody(String),
}

impl BuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            BuildError::InvalidBody(_) => ErrorKind::InvalidBody,
        }
    }
}

/// Failure observed by the transport executor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportErrorKind {
    Timeout,
    CorsOrNetwork,
    UnknownClientError,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportErrorKind::Timeout => ErrorKind::Timeout,
            TransportErrorKind::CorsOrNetwork => ErrorKind::CorsOrNetwork,
            TransportErrorKind::UnknownClientError => ErrorKind::UnknownClientError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_kinds() {
        assert_eq!(BuildError::InvalidUrl("x".into()).kind(), ErrorKind::InvalidUrl);
        assert_eq!(BuildError::InvalidBody("x".into()).kind().as_str(), "invalid-body");
    }

    #[test]
    fn test_transport_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&TransportErrorKind::CorsOrNetwork).unwrap();
        assert_eq!(json, "\"cors-or-network\"");
        assert_eq!(TransportErrorKind::UnknownClientError.as_str(), "unknown-client-error");
    }

    #[test]
    fn test_kind_names_outlive_the_kind() {
        let names: Vec<&'static str> = [
            TransportErrorKind::Timeout,
            TransportErrorKind::CorsOrNetwork,
        ]
        .iter()
        .map(|kind| kind.as_str())
        .collect();
        assert_eq!(names, vec!["timeout", "cors-or-network"]);
    }
}
