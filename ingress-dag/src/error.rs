use thiserror::Error;

/// Errors the DAG builder can raise.
///
/// Per the error handling design, most validation problems never reach
/// this type — they are recorded as [`crate::dag::ObjectStatus`] entries on
/// the offending source object and the build continues. This enum is
/// reserved for kind 5 ("translator invariant violation") style failures
/// that abort the current build and leave the caller to keep serving the
/// last-good snapshot.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invariant violated while building {resource}: {message}")]
    Invariant { resource: String, message: String },
}
