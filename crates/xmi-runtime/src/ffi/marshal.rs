//! Fixed-width string marshaling
//!
//! Kernels exchange text through caller-allocated `char` buffers sized by
//! exported length constants. Fields are null-terminated or null/space
//! padded:
//! - `to_c_name()`: host name → null-terminated C string
//! - `c_buffer_to_string()`: C buffer → text up to the first NUL
//! - `decode_fixed()`: padded field → trimmed text
//! - `split_name_table()` / `decode_string_array()`: tables of fields

use crate::error::{XmiError, XmiResult};
use std::ffi::CString;

/// Convert a host name to a null-terminated C string
pub fn to_c_name(name: &str) -> XmiResult<CString> {
    CString::new(name).map_err(|_| XmiError::InvalidName(name.to_string()))
}

/// Zeroed buffer for a string exchange of `len` bytes
///
/// Never empty, so the kernel always receives a writable address.
pub fn string_buffer(len: usize) -> Vec<u8> {
    vec![0; len.max(1)]
}

/// Text up to the first NUL byte
pub fn c_buffer_to_string(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

/// Decode a padded field: cut at the first NUL, then trim whitespace
pub fn decode_fixed(buf: &[u8]) -> String {
    c_buffer_to_string(buf).trim().to_string()
}

/// Decode `count` rows of `width` bytes, each cut at its first NUL
pub fn split_name_table(buf: &[u8], width: usize, count: usize) -> Vec<String> {
    if width == 0 {
        return vec![String::new(); count];
    }
    buf.chunks(width)
        .take(count)
        .map(c_buffer_to_string)
        .collect()
}

/// Decode `count` padded fields laid out every `stride` bytes
pub fn decode_string_array(buf: &[u8], stride: usize, count: usize) -> Vec<String> {
    if stride == 0 {
        return vec![String::new(); count];
    }
    buf.chunks(stride).take(count).map(decode_fixed).collect()
}
