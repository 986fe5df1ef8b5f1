//! Errors raised at the edges of the scheduling engine.
//!
//! The transition functions themselves are total; these errors only come
//! from validating caller input and policy configuration.

/// SRS error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SrsError {
    /// A caller-supplied value is outside the scheduler's domain
    #[error("Invalid precondition: {field} must be non-negative, got {value}")]
    InvalidPrecondition {
        /// Offending field name
        field: &'static str,
        /// Value that was rejected
        value: i64,
    },
    /// A caller-supplied value does not fit the scheduler's integer width
    #[error("Out of range: {field} = {value}")]
    OutOfRange {
        /// Offending field name
        field: &'static str,
        /// Value that was rejected
        value: i64,
    },
    /// Policy or interval table failed validation
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),
    /// Policy file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Policy JSON could not be parsed
    #[error("Policy parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// SRS result type
pub type Result<T> = std::result::Result<T, SrsError>;
