use thiserror::Error;

/// Errors surfaced by the xDS stream server. Translation
/// itself never fails: a `Dag` lacking a resource simply yields an empty
/// cache, and per-object errors are already captured as `ObjectStatus`
/// entries before the DAG reaches this crate.
#[derive(Debug, Error)]
pub enum XdsError {
    #[error("request referenced an unknown type URL: {0}")]
    UnknownTypeUrl(String),
    #[error("stream closed before a request was received")]
    EmptyStream,
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

impl From<XdsError> for tonic::Status {
    fn from(err: XdsError) -> Self {
        match err {
            XdsError::UnknownTypeUrl(_) => tonic::Status::invalid_argument(err.to_string()),
            XdsError::EmptyStream => tonic::Status::cancelled(err.to_string()),
            XdsError::Transport(_) => tonic::Status::internal(err.to_string()),
        }
    }
}
