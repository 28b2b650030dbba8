//! Error taxonomy for kernel access

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while driving a native kernel
#[derive(Error, Debug)]
pub enum XmiError {
    /// Library or one of its dependencies could not be opened
    #[error("Failed to load library '{path}': {reason}")]
    Load { path: PathBuf, reason: String },

    /// Expected export absent from the library
    #[error("Symbol '{symbol}' not found in library '{library}'")]
    Symbol { library: String, symbol: String },

    /// Lifecycle violation, rejected before any native call
    #[error("{0}")]
    State(String),

    /// Nonzero status returned by an entry point
    #[error("{0}")]
    NativeCall(Box<NativeCallError>),

    /// Buffer is not row-major contiguous
    #[error("Array layout error: {0}")]
    Layout(String),

    /// Element type or shape mismatch between a host buffer and a variable
    #[error("Type mismatch for '{name}': expected {expected}, got {actual}")]
    Type {
        name: String,
        expected: String,
        actual: String,
    },

    /// Variable type outside {double, float, int, string}
    #[error("Unsupported value type '{0}'")]
    UnsupportedType(String),

    /// Capability the calling convention does not expose
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Timing query without timing enabled
    #[error("Timer error: {0}")]
    Timer(String),

    /// Name cannot be passed as a C string
    #[error("Invalid name {0:?}: contains an interior NUL byte")]
    InvalidName(String),

    /// Kernel handed back a null address for a non-empty variable
    #[error("Kernel returned a null pointer for '{0}'")]
    NullPointer(String),

    /// Working directory could not be switched or read
    #[error("Working directory error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not produce wrapper inputs
    #[error(transparent)]
    Config(#[from] xmi_config::ConfigError),
}

/// Result type for kernel operations
pub type XmiResult<T> = Result<T, XmiError>;

/// Message recovered from the kernel after a failed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Component name reported by the kernel
    pub component: String,
    /// Last error text reported by the kernel
    pub message: String,
}

/// A failed native call
#[derive(Debug, Clone, PartialEq)]
pub struct NativeCallError {
    /// Name of the entry point that failed
    pub entry_point: String,
    /// Rendered call, including every argument
    pub call: String,
    /// Status code returned by the kernel
    pub status: i32,
    /// Best-effort message recovered from the kernel
    pub diagnostic: Option<Diagnostic>,
    /// Extra context supplied by the caller
    pub detail: Option<String>,
}

impl fmt::Display for NativeCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BMI exception in {}", self.call)?;
        if let Some(diag) = &self.diagnostic {
            write!(f, ": Message from {} '{}'", diag.component, diag.message)?;
        }
        if let Some(detail) = &self.detail {
            write!(f, ", details : '{}'", detail)?;
        }
        Ok(())
    }
}

impl XmiError {
    /// The failed native call, if this is a `NativeCall` error
    pub fn native_call(&self) -> Option<&NativeCallError> {
        match self {
            XmiError::NativeCall(err) => Some(err),
            _ => None,
        }
    }

    pub(crate) fn type_mismatch(
        name: &str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        XmiError::Type {
            name: name.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
