//! XMI Runtime - Native simulation kernel access
//!
//! This library drives compiled BMI/XMI kernels loaded at runtime:
//! - Library loading and symbol resolution
//! - Status-checked invocation with diagnostic recovery
//! - Variable metadata and value marshaling (owned copies or live views)
//! - Grid geometry and topology queries
//! - Working-directory scoping and per-call timing

/// XMI runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod catalog;
pub mod error;
pub mod ffi;
pub mod grid;
pub mod invoker;
pub mod lifecycle;
pub mod timer;
pub mod value;
pub mod workdir;
pub mod wrapper;

// Re-export commonly used types
pub use catalog::VarType;
pub use error::{Diagnostic, NativeCallError, XmiError, XmiResult};
pub use ffi::{NativeLibrary, StaticSymbols, SymbolSource};
pub use grid::{Grid, GridType, Mesh, Topology};
pub use lifecycle::State;
pub use timer::TimerLedger;
pub use value::{AliasedView, Element, Value};
pub use wrapper::{WrapperOptions, XmiWrapper};
