//! Error handling for RMDraw
//!
//! `Error` is the unified error type shared across crates. Domain crates
//! define their own `thiserror` enums and convert into it at the boundary.

use thiserror::Error;

/// Geometry error type
///
/// Raised when a coordinate conversion cannot be performed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A transform in the chain cannot be inverted
    #[error("Transform is not invertible (determinant {determinant})")]
    SingularTransform {
        /// The determinant of the offending transform.
        determinant: f64,
    },

    /// A value that must be finite was NaN or infinite
    #[error("Non-finite value for {field}")]
    NonFinite {
        /// The field name.
        field: String,
    },
}

/// Unified error type for RMDraw operations
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}

/// Result type alias using the unified error
pub type Result<T> = std::result::Result<T, Error>;
