//! Error types for the Galaxy3D geometry core
//!
//! Every fallible operation of the crate returns [`Result`]. Errors raised
//! inside the crate go through [`engine_err!`](crate::engine_err) or
//! [`engine_bail!`](crate::engine_bail), which log the message at ERROR
//! severity (with file:line) before handing the error back to the caller.
//!
//! Precondition violations (cursor out of bounds, writing into a buffer that
//! is too small) are not represented here: they panic.

use std::fmt;

/// Result type for Galaxy3D geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D geometry errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An attribute array has a length that does not fit the geometry
    /// (e.g. normals not equal to 3 × vertex count). Nothing was committed.
    ShapeMismatch(String),

    /// The CPU-side copy of an attribute is not available (discarded after
    /// upload, or never supplied). Recoverable with `validate_buffers`.
    NotAvailable(String),

    /// The graphics device refused an allocate/update/release call
    /// (out of device memory, driver failure)
    DeviceAllocationFailure(String),

    /// Unknown or already released device resource
    InvalidResource(String),

    /// Backend-specific error (poisoned device lock, driver error, ...)
    BackendError(String),

    /// Initialization failed (engine, device registry)
    InitializationFailed(String),
}

impl Error {
    /// True for errors caused by the caller's data rather than the device
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Error::ShapeMismatch(_) | Error::NotAvailable(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ShapeMismatch(msg) => write!(f, "Shape mismatch: {}", msg),
            Error::NotAvailable(msg) => write!(f, "Not available: {}", msg),
            Error::DeviceAllocationFailure(msg) => write!(f, "Device allocation failure: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an [`Error`] of the given kind, logging it at ERROR severity
///
/// # Example
///
/// ```no_run
/// # use galaxy_3d_geometry::engine_err;
/// let count = 4;
/// let err = engine_err!("galaxy3d::IndexedGeometry", ShapeMismatch,
///     "normals length {} is not 3 x {}", count, 2);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $kind:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::$kind(message)
    }};
}

/// Return early with an [`Error`] of the given kind, logging it first
///
/// # Example
///
/// ```no_run
/// # use galaxy_3d_geometry::{engine_bail, galaxy3d::Result};
/// fn check(len: usize) -> Result<()> {
///     if len % 3 != 0 {
///         engine_bail!("galaxy3d::IndexedGeometry", ShapeMismatch,
///             "vertex length {} is not a multiple of 3", len);
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $kind:ident, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $kind, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
