//! Foreign Function Interface (FFI) boundary
//!
//! Every interaction with raw kernel memory lives in this module:
//! - Library loading and symbol resolution (`loader`)
//! - Arity-dispatched entry point calls and data symbol access (`caller`)
//! - Call arguments and their rendering (`types`)
//! - Fixed-width string codec (`marshal`)
//! - Typed views over kernel-owned memory (`view`)
//!
//! # Safety
//!
//! FFI operations involve `unsafe` code. Everything above this module sees
//! only typed, shaped values; the unsafe blocks here assume the kernel
//! honours the documented BMI/XMI signatures.

pub mod caller;
pub mod loader;
pub mod marshal;
pub mod types;
pub(crate) mod view;

pub use caller::RawSymbol;
pub use loader::{NativeLibrary, StaticSymbols, SymbolSource};
pub use types::Arg;

/// Exported integer constants sizing the string buffers
pub mod constants {
    pub const LEN_COMPONENT_NAME: &str = "BMI_LENCOMPONENTNAME";
    pub const LEN_VERSION: &str = "BMI_LENVERSION";
    pub const LEN_VAR_ADDRESS: &str = "BMI_LENVARADDRESS";
    pub const LEN_VAR_TYPE: &str = "BMI_LENVARTYPE";
    pub const LEN_GRID_TYPE: &str = "BMI_LENGRIDTYPE";
    pub const LEN_ERR_MESSAGE: &str = "BMI_LENERRMESSAGE";
}
