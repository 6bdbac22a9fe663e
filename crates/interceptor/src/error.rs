//! The admission protocol's typed error vocabulary.
//!
//! These map directly onto `tonic::Code::{InvalidArgument, PermissionDenied,
//! Internal}` because the real admission channel this endpoint serves is
//! gRPC-based — even though this crate does not stand up a gRPC server
//! itself (that wiring is out of scope; see the adapter traits in
//! [`crate::adapters`]).

use thiserror::Error;

/// Everything the admission chain can fail with.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// The request was missing or malformed before a policy decision could
    /// even be reached (missing connection/context/IP-context/source IP).
    #[error("{0}")]
    InvalidArgument(String),
    /// The policy denied the source IP.
    #[error("{0}")]
    PermissionDenied(String),
    /// An unexpected failure inside the compiler or an installer adapter.
    #[error("{0}")]
    Internal(String),
    /// The next element in the chain failed; this wraps its error rather
    /// than discarding it.
    #[error("downstream failure: {0}")]
    DownstreamFailure(Box<AdmissionError>),
    /// The request's cancellation token was already cancelled when the
    /// chain reached it.
    #[error("request was cancelled")]
    Cancelled,
}

impl AdmissionError {
    /// The gRPC status code this error maps to.
    #[must_use]
    pub fn code(&self) -> tonic::Code {
        match self {
            Self::InvalidArgument(_) => tonic::Code::InvalidArgument,
            Self::PermissionDenied(_) => tonic::Code::PermissionDenied,
            Self::Internal(_) => tonic::Code::Internal,
            Self::DownstreamFailure(inner) => inner.code(),
            Self::Cancelled => tonic::Code::Cancelled,
        }
    }
}

impl From<AdmissionError> for tonic::Status {
    fn from(e: AdmissionError) -> Self {
        tonic::Status::new(e.code(), e.to_string())
    }
}
