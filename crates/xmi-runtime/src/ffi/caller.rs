//! Entry point calls using direct function pointers
//!
//! Every BMI/XMI entry point returns a C `int` status and takes up to four
//! arguments, all of which are pointers (to scalars, buffers, C strings or
//! pointer slots). That lets one cast per arity cover the whole convention
//! without a dynamic FFI library.

use crate::error::{XmiError, XmiResult};
use std::ffi::c_void;
use std::os::raw::c_int;
use std::ptr::NonNull;

/// Status returned by a successful entry point
pub const STATUS_SUCCESS: c_int = 0;

/// Address of a resolved function or data symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSymbol(NonNull<c_void>);

impl RawSymbol {
    /// Wrap a symbol address, rejecting null
    pub fn new(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    /// Raw address
    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

type Ptr = *mut c_void;

/// Call an entry point with pointer arguments and return its status
///
/// # Safety
///
/// The caller must ensure:
/// - `symbol` is a function with signature `int f(void*, ...)` taking exactly
///   `args.len()` pointer arguments
/// - every pointer is valid for whatever the function reads or writes
pub unsafe fn call_raw(symbol: RawSymbol, args: &[Ptr]) -> XmiResult<c_int> {
    let fn_ptr = symbol.as_ptr();
    let status = match *args {
        [] => {
            let f: unsafe extern "C" fn() -> c_int = std::mem::transmute(fn_ptr);
            f()
        }
        [a] => {
            let f: unsafe extern "C" fn(Ptr) -> c_int = std::mem::transmute(fn_ptr);
            f(a)
        }
        [a, b] => {
            let f: unsafe extern "C" fn(Ptr, Ptr) -> c_int = std::mem::transmute(fn_ptr);
            f(a, b)
        }
        [a, b, c] => {
            let f: unsafe extern "C" fn(Ptr, Ptr, Ptr) -> c_int = std::mem::transmute(fn_ptr);
            f(a, b, c)
        }
        [a, b, c, d] => {
            let f: unsafe extern "C" fn(Ptr, Ptr, Ptr, Ptr) -> c_int =
                std::mem::transmute(fn_ptr);
            f(a, b, c, d)
        }
        _ => {
            return Err(XmiError::NotImplemented(format!(
                "entry points taking {} arguments",
                args.len()
            )))
        }
    };
    Ok(status)
}

/// Read an exported `int` data symbol
///
/// # Safety
///
/// `symbol` must be the address of a live, aligned C `int`.
pub unsafe fn read_int(symbol: RawSymbol) -> c_int {
    std::ptr::read(symbol.as_ptr() as *const c_int)
}

/// Overwrite an exported `int` data symbol
///
/// # Safety
///
/// `symbol` must be the address of a live, aligned, writable C `int`.
pub unsafe fn write_int(symbol: RawSymbol, value: c_int) {
    std::ptr::write(symbol.as_ptr() as *mut c_int, value)
}
