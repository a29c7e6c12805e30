//! Error taxonomy for the client.

use std::fmt;

use thiserror::Error;
use tonic::metadata::KeyAndValueRef;
use tonic::metadata::errors::InvalidMetadataValue;

use crate::path::PathParseError;

/// Outcome of a failed RPC: status code, detail text and the trailing
/// metadata the target attached, in arrival order.
#[derive(Debug, Clone)]
pub struct RpcStatus {
    pub code: tonic::Code,
    pub details: String,
    pub metadata: Vec<(String, String)>,
}

impl From<&tonic::Status> for RpcStatus {
    fn from(status: &tonic::Status) -> Self {
        let metadata = status
            .metadata()
            .iter()
            .filter_map(|entry| match entry {
                KeyAndValueRef::Ascii(key, value) => value
                    .to_str()
                    .ok()
                    .map(|value| (key.as_str().to_string(), value.to_string())),
                KeyAndValueRef::Binary(..) => None,
            })
            .collect();

        Self {
            code: status.code(),
            details: status.message().to_string(),
            metadata,
        }
    }
}

impl fmt::Display for RpcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.details)
    }
}

/// Error type for every fallible client operation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Path parse error: {0}")]
    PathParse(#[from] PathParseError),

    #[error("RPC failed: {0}")]
    Rpc(RpcStatus),

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(RpcStatus),

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("Invalid target address: {0:?}")]
    InvalidTarget(String),

    #[error("Credential metadata error: {0}")]
    Metadata(#[from] InvalidMetadataValue),

    #[error("{0} is not implemented")]
    Unimplemented(&'static str),
}

impl From<tonic::Status> for Error {
    fn from(status: tonic::Status) -> Self {
        let rpc = RpcStatus::from(&status);
        match status.code() {
            tonic::Code::DeadlineExceeded => Error::DeadlineExceeded(rpc),
            _ => Error::Rpc(rpc),
        }
    }
}

/// Result type alias using the client's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_exceeded_classified() {
        let status = tonic::Status::deadline_exceeded("request timed out");
        match Error::from(status) {
            Error::DeadlineExceeded(rpc) => {
                assert_eq!(rpc.code, tonic::Code::DeadlineExceeded);
                assert_eq!(rpc.details, "request timed out");
            }
            other => panic!("expected DeadlineExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_other_codes_classified_as_rpc() {
        for status in [
            tonic::Status::unavailable("device unreachable"),
            tonic::Status::unauthenticated("bad credentials"),
            tonic::Status::internal("boom"),
        ] {
            let code = status.code();
            match Error::from(status) {
                Error::Rpc(rpc) => assert_eq!(rpc.code, code),
                other => panic!("expected Rpc, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_trailing_metadata_captured() {
        let mut status = tonic::Status::failed_precondition("not ready");
        status
            .metadata_mut()
            .insert("retry-info", "retry later".parse().unwrap());
        let rpc = RpcStatus::from(&status);
        assert_eq!(
            rpc.metadata,
            vec![("retry-info".to_string(), "retry later".to_string())]
        );
    }
}
