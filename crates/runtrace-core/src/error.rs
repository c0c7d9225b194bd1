//! Error types for runtrace.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Rejected before any span is built
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Unrecognized event kind: expected a workflow_job or workflow_run payload")]
    UnrecognizedEventKind,

    // Trace building
    #[error("Identifier derivation failed: {0}")]
    IdentifierDerivation(String),

    // Downstream
    #[error("Downstream consumer rejected trace: {0}")]
    DownstreamConsume(String),

    // Startup
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// How a failed conversion is reported back to the webhook sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    Unauthenticated,
    Malformed,
    Internal,
    Downstream,
}

impl Error {
    pub fn rejection(&self) -> RejectionKind {
        match self {
            Error::Authentication(_) => RejectionKind::Unauthenticated,
            Error::MalformedPayload(_) | Error::UnrecognizedEventKind => RejectionKind::Malformed,
            Error::IdentifierDerivation(_) | Error::Config(_) => RejectionKind::Internal,
            Error::DownstreamConsume(_) => RejectionKind::Downstream,
        }
    }
}
