use thiserror::Error;

/// Errors at the edges of the crate. Numeric code never fails.
#[derive(Debug, Error)]
pub enum PpError {
    #[error("unknown pp version `{0}`")]
    UnknownVersion(String),
    #[error("background calculation failed: {0}")]
    Worker(String),
}
