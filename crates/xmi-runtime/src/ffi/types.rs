//! Call arguments for the FFI boundary
//!
//! Each `Arg` borrows the host storage the kernel reads or writes and knows
//! how to render itself for logs and error messages. Rendering happens after
//! the call, so output arguments show what the kernel wrote.
//!
//! Mapping to C:
//! - `Arg::Name` → `const char*` (null-terminated)
//! - `Arg::Int` / `Arg::Double` → `int*` / `double*`
//! - `Arg::Chars` → `char*` buffer
//! - `Arg::Ints` / `Arg::Doubles` → `int*` / `double*` buffer
//! - `Arg::Slot` → `void**` (address of a data pointer)

use crate::ffi::marshal::c_buffer_to_string;
use std::ffi::{c_void, CStr};
use std::fmt;
use std::os::raw::{c_double, c_int};

/// One argument of a native call
pub enum Arg<'a> {
    /// Null-terminated name passed by pointer
    Name(&'a CStr),
    /// Scalar int passed by pointer
    Int(&'a mut c_int),
    /// Scalar double passed by pointer
    Double(&'a mut c_double),
    /// Character buffer
    Chars(&'a mut [u8]),
    /// Int buffer
    Ints(&'a mut [c_int]),
    /// Double buffer
    Doubles(&'a mut [c_double]),
    /// Pointer slot, passed as the address of a data pointer
    Slot {
        slot: &'a mut *mut c_void,
        /// Description of the memory behind the pointer
        label: String,
    },
}

impl Arg<'_> {
    /// Raw pointer handed to the kernel
    pub fn as_raw(&mut self) -> *mut c_void {
        match self {
            Arg::Name(s) => s.as_ptr() as *mut c_void,
            Arg::Int(v) => &mut **v as *mut c_int as *mut c_void,
            Arg::Double(v) => &mut **v as *mut c_double as *mut c_void,
            Arg::Chars(buf) => buf.as_mut_ptr().cast(),
            Arg::Ints(buf) => buf.as_mut_ptr().cast(),
            Arg::Doubles(buf) => buf.as_mut_ptr().cast(),
            Arg::Slot { slot, .. } => &mut **slot as *mut *mut c_void as *mut c_void,
        }
    }
}

impl fmt::Display for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Name(s) => write!(f, "c_char_p({:?})", s.to_string_lossy()),
            Arg::Int(v) => write!(f, "&c_int({})", v),
            Arg::Double(v) => write!(f, "&c_double({})", v),
            Arg::Chars(buf) => write!(
                f,
                "&c_char[{}]({:?})",
                buf.len(),
                c_buffer_to_string(buf)
            ),
            Arg::Ints(buf) => write!(f, "*c_int[{}]", buf.len()),
            Arg::Doubles(buf) => write!(f, "*c_double[{}]", buf.len()),
            Arg::Slot { label, .. } => write!(f, "&{}", label),
        }
    }
}

/// Render `entry(arg, arg, ...)`
pub fn render_call(entry: &str, args: &[Arg<'_>]) -> String {
    let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    format!("{}({})", entry, rendered.join(", "))
}

/// Describe a typed buffer as `*c_double[10x5]`
pub fn buffer_label(c_name: &str, shape: &[usize]) -> String {
    let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
    format!("*{}[{}]", c_name, dims.join("x"))
}
