//! Typed, shaped views over kernel-owned memory

use crate::error::{XmiError, XmiResult};
use ndarray::{ArrayViewMutD, IxDyn};
use std::ffi::c_void;
use std::ptr::NonNull;

/// Wrap `ptr` as a row-major view of `shape`
///
/// Empty shapes are accepted with a null pointer; anything else needs a
/// non-null pointer aligned for `T`.
///
/// # Safety
///
/// `ptr` must address `shape.iter().product()` initialised elements of `T`
/// that stay valid and unaliased for `'a`.
pub(crate) unsafe fn view_mut<'a, T>(
    name: &str,
    ptr: *mut c_void,
    shape: &[usize],
) -> XmiResult<ArrayViewMutD<'a, T>> {
    let len: usize = shape.iter().product();
    let data = match NonNull::new(ptr as *mut T) {
        Some(p) => p,
        None if len == 0 => NonNull::dangling(),
        None => return Err(XmiError::NullPointer(name.to_string())),
    };

    if (data.as_ptr() as usize) % std::mem::align_of::<T>() != 0 {
        return Err(XmiError::Layout(format!(
            "kernel memory for '{}' is not aligned for {}",
            name,
            std::any::type_name::<T>()
        )));
    }

    Ok(ArrayViewMutD::from_shape_ptr(IxDyn(shape), data.as_ptr()))
}

/// Drop trailing zero extents from a kernel-reported shape
pub(crate) fn trim_trailing_zeros(shape: &[usize]) -> Vec<usize> {
    let end = shape
        .iter()
        .rposition(|&d| d != 0)
        .map(|i| i + 1)
        .unwrap_or(0);
    shape[..end].to_vec()
}
