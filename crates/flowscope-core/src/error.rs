//! Error types for flowscope-rs.

use thiserror::Error;

/// The main error type for flowscope-rs operations.
#[derive(Error, Debug)]
pub enum FlowscopeError {
    /// Geometry data is inconsistent (bad indices, non-finite positions).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// An input message did not satisfy the viewer input contract.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// A configuration value could not be understood.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A node id refers to a scene generation that has been cleared.
    #[error("node does not belong to the current scene")]
    StaleNode,

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for flowscope-rs operations.
pub type Result<T> = std::result::Result<T, FlowscopeError>;
