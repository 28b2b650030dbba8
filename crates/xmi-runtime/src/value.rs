//! Value marshaling
//!
//! Converts between kernel memory and host arrays in two modes:
//! - owned copies (`get_value`, `get_value_into`, `set_value`), safe to keep
//! - aliased views (`get_value_ptr`, `get_value_ptr_as`) over the kernel's
//!   own memory
//!
//! An aliased view borrows the wrapper mutably, so it ends before the next
//! kernel call. Every call may reallocate kernel storage.

use crate::catalog::{to_usize, VarType};
use crate::error::{XmiError, XmiResult};
use crate::ffi::marshal::{decode_fixed, decode_string_array, string_buffer, to_c_name};
use crate::ffi::view::{trim_trailing_zeros, view_mut};
use crate::ffi::Arg;
use crate::wrapper::XmiWrapper;
use ndarray::{ArrayBase, ArrayD, ArrayViewMutD, Data, Dimension, IxDyn};
use std::ffi::c_void;

mod sealed {
    pub trait Sealed {}
    impl Sealed for f64 {}
    impl Sealed for f32 {}
    impl Sealed for i32 {}
}

/// Numeric element types a kernel variable can hold
pub trait Element: sealed::Sealed + Copy + Default + 'static {
    /// Matching C type name
    const C_NAME: &'static str;

    /// Variable type this element corresponds to
    fn var_type() -> VarType;
}

impl Element for f64 {
    const C_NAME: &'static str = "c_double";

    fn var_type() -> VarType {
        VarType::Double
    }
}

impl Element for f32 {
    const C_NAME: &'static str = "c_float";

    fn var_type() -> VarType {
        VarType::Float
    }
}

impl Element for i32 {
    const C_NAME: &'static str = "c_int";

    fn var_type() -> VarType {
        VarType::Int
    }
}

/// An owned copy of a variable's contents
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Double(ArrayD<f64>),
    Float(ArrayD<f32>),
    Int(ArrayD<i32>),
    /// Decoded and trimmed strings; one entry for scalar strings
    Text(Vec<String>),
}

impl Value {
    /// Element type of the copy
    pub fn var_type(&self) -> VarType {
        match self {
            Value::Double(_) => VarType::Double,
            Value::Float(_) => VarType::Float,
            Value::Int(_) => VarType::Int,
            Value::Text(_) => VarType::String,
        }
    }

    /// Shape of the copy
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Value::Double(a) => a.shape().to_vec(),
            Value::Float(a) => a.shape().to_vec(),
            Value::Int(a) => a.shape().to_vec(),
            Value::Text(t) => vec![t.len()],
        }
    }

    pub fn as_double(&self) -> Option<&ArrayD<f64>> {
        match self {
            Value::Double(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<&ArrayD<f32>> {
        match self {
            Value::Float(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&ArrayD<i32>> {
        match self {
            Value::Int(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            Value::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// A live view over kernel memory
///
/// Writes through the view change the kernel's state directly.
#[derive(Debug)]
pub enum AliasedView<'a> {
    Double(ArrayViewMutD<'a, f64>),
    Float(ArrayViewMutD<'a, f32>),
    Int(ArrayViewMutD<'a, i32>),
}

impl AliasedView<'_> {
    pub fn var_type(&self) -> VarType {
        match self {
            AliasedView::Double(_) => VarType::Double,
            AliasedView::Float(_) => VarType::Float,
            AliasedView::Int(_) => VarType::Int,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            AliasedView::Double(v) => v.shape(),
            AliasedView::Float(v) => v.shape(),
            AliasedView::Int(v) => v.shape(),
        }
    }

    /// Copy the viewed memory into an owned value
    pub fn to_value(&self) -> Value {
        match self {
            AliasedView::Double(v) => Value::Double(v.to_owned()),
            AliasedView::Float(v) => Value::Float(v.to_owned()),
            AliasedView::Int(v) => Value::Int(v.to_owned()),
        }
    }
}

fn require_c_layout(is_standard: bool) -> XmiResult<()> {
    if is_standard {
        Ok(())
    } else {
        Err(XmiError::Layout("Array should have C layout".to_string()))
    }
}

impl XmiWrapper {
    /// Copy a variable's current contents
    pub fn get_value(&mut self, name: &str) -> XmiResult<Value> {
        let rank = to_usize(self.get_var_rank(name)?);
        let var_type = self.var_type(name)?;

        if rank == 0 {
            return match var_type {
                VarType::Double => Ok(Value::Double(self.scalar_copy(name, &var_type)?)),
                VarType::Float => Ok(Value::Float(self.scalar_copy(name, &var_type)?)),
                VarType::Int => Ok(Value::Int(self.scalar_copy(name, &var_type)?)),
                VarType::String => Ok(Value::Text(vec![self.scalar_string(name)?])),
                VarType::Unsupported(native) => Err(XmiError::UnsupportedType(native)),
            };
        }

        let shape = self.host_shape(name)?;
        match var_type {
            VarType::Double => Ok(Value::Double(self.fetch_array(name, &var_type, &shape)?)),
            VarType::Float => Ok(Value::Float(self.fetch_array(name, &var_type, &shape)?)),
            VarType::Int => Ok(Value::Int(self.fetch_array(name, &var_type, &shape)?)),
            VarType::String => Ok(Value::Text(self.string_array(name, &shape)?)),
            VarType::Unsupported(native) => Err(XmiError::UnsupportedType(native)),
        }
    }

    /// Copy a numeric variable into a caller-provided buffer
    ///
    /// The buffer must be row-major contiguous, have the variable's element
    /// type and hold exactly its element count.
    pub fn get_value_into<T: Element>(
        &mut self,
        name: &str,
        mut dest: ArrayViewMutD<'_, T>,
    ) -> XmiResult<()> {
        require_c_layout(dest.is_standard_layout())?;

        let rank = to_usize(self.get_var_rank(name)?);
        let var_type = self.var_type(name)?;
        if let VarType::Unsupported(native) = var_type {
            return Err(XmiError::UnsupportedType(native));
        }
        if var_type != T::var_type() {
            return Err(XmiError::type_mismatch(
                name,
                var_type.c_name(),
                T::C_NAME,
            ));
        }

        let expected = if rank == 0 {
            1
        } else {
            self.host_shape(name)?.iter().product()
        };
        if dest.len() != expected {
            return Err(XmiError::type_mismatch(
                name,
                format!("{} elements", expected),
                format!("{} elements", dest.len()),
            ));
        }

        if rank == 0 {
            let src = self.alias::<T>(name, &var_type, &[1])?;
            dest.iter_mut().zip(src.iter()).for_each(|(d, s)| *d = *s);
            return Ok(());
        }
        self.fill(name, &var_type, dest)
    }

    /// Live view over a variable's memory
    ///
    /// Scalars are viewed with shape `[1]`; trailing zero extents are
    /// dropped from the kernel's shape.
    pub fn get_value_ptr(&mut self, name: &str) -> XmiResult<AliasedView<'_>> {
        let var_type = self.var_type(name)?;
        let shape = self.alias_shape(name)?;
        match var_type {
            VarType::Double => Ok(AliasedView::Double(self.alias(name, &var_type, &shape)?)),
            VarType::Float => Ok(AliasedView::Float(self.alias(name, &var_type, &shape)?)),
            VarType::Int => Ok(AliasedView::Int(self.alias(name, &var_type, &shape)?)),
            VarType::String => Err(XmiError::UnsupportedType(var_type.to_string())),
            VarType::Unsupported(native) => Err(XmiError::UnsupportedType(native)),
        }
    }

    /// Live view with a statically known element type
    pub fn get_value_ptr_as<T: Element>(
        &mut self,
        name: &str,
    ) -> XmiResult<ArrayViewMutD<'_, T>> {
        let var_type = self.var_type(name)?;
        if let VarType::Unsupported(native) = var_type {
            return Err(XmiError::UnsupportedType(native));
        }
        if var_type != T::var_type() {
            return Err(XmiError::type_mismatch(
                name,
                var_type.c_name(),
                T::C_NAME,
            ));
        }
        let shape = self.alias_shape(name)?;
        self.alias(name, &var_type, &shape)
    }

    /// Copy `values` into a Double or Int variable
    pub fn set_value<S, T, D>(&mut self, name: &str, values: &ArrayBase<S, D>) -> XmiResult<()>
    where
        S: Data<Elem = T>,
        T: Element,
        D: Dimension,
    {
        let source = values
            .as_slice()
            .ok_or_else(|| XmiError::Layout("Array should have C layout".to_string()))?;

        let var_type = self.var_type(name)?;
        match &var_type {
            VarType::Double | VarType::Int => {}
            other => return Err(XmiError::UnsupportedType(other.to_string())),
        }
        if var_type != T::var_type() {
            return Err(XmiError::type_mismatch(
                name,
                var_type.c_name(),
                T::C_NAME,
            ));
        }

        let nbytes = to_usize(self.get_var_nbytes(name)?);
        let given = std::mem::size_of_val(source);
        if given != nbytes {
            return Err(XmiError::type_mismatch(
                name,
                format!("{} bytes", nbytes),
                format!("{} bytes", given),
            ));
        }

        let c_name = to_c_name(name)?;
        // The kernel only reads through this pointer.
        let mut ptr = source.as_ptr() as *mut c_void;
        self.invoker.invoke(
            "set_value",
            &mut [
                Arg::Name(&c_name),
                Arg::Slot {
                    slot: &mut ptr,
                    label: Self::slot_label(&var_type, values.shape()),
                },
            ],
        )
    }

    /// Indexed reads are not part of the convention
    pub fn get_value_at_indices(&mut self, _name: &str, _indices: &[i32]) -> XmiResult<Value> {
        Err(XmiError::NotImplemented("get_value_at_indices".to_string()))
    }

    /// Indexed writes are not part of the convention
    pub fn set_value_at_indices(
        &mut self,
        _name: &str,
        _indices: &[i32],
        _values: &Value,
    ) -> XmiResult<()> {
        Err(XmiError::NotImplemented("set_value_at_indices".to_string()))
    }

    fn alias_shape(&mut self, name: &str) -> XmiResult<Vec<usize>> {
        if self.get_var_rank(name)? <= 0 {
            return Ok(vec![1]);
        }
        let shape = trim_trailing_zeros(&self.host_shape(name)?);
        Ok(if shape.is_empty() { vec![0] } else { shape })
    }

    fn alias<T: Element>(
        &mut self,
        name: &str,
        var_type: &VarType,
        shape: &[usize],
    ) -> XmiResult<ArrayViewMutD<'_, T>> {
        let c_name = to_c_name(name)?;
        let detail = format!("for variable {}", name);
        let mut ptr: *mut c_void = std::ptr::null_mut();
        self.invoker.invoke_with_detail(
            "get_value_ptr",
            &mut [
                Arg::Name(&c_name),
                Arg::Slot {
                    slot: &mut ptr,
                    label: Self::slot_label(var_type, shape),
                },
            ],
            Some(&detail),
        )?;
        // SAFETY: the kernel reported `ptr` as the storage of `name` with the
        // queried shape and type; the view borrows `self`, so it cannot
        // outlive the next call.
        unsafe { view_mut(name, ptr, shape) }
    }

    fn scalar_copy<T: Element>(&mut self, name: &str, var_type: &VarType) -> XmiResult<ArrayD<T>> {
        Ok(self.alias::<T>(name, var_type, &[1])?.to_owned())
    }

    fn fetch_array<T: Element>(
        &mut self,
        name: &str,
        var_type: &VarType,
        shape: &[usize],
    ) -> XmiResult<ArrayD<T>> {
        let mut dest = ArrayD::from_elem(IxDyn(shape), T::default());
        self.fill(name, var_type, dest.view_mut())?;
        Ok(dest)
    }

    /// One native `get_value` call into a contiguous destination
    fn fill<T: Element>(
        &mut self,
        name: &str,
        var_type: &VarType,
        mut dest: ArrayViewMutD<'_, T>,
    ) -> XmiResult<()> {
        let label = Self::slot_label(var_type, dest.shape());
        let data = dest
            .as_slice_mut()
            .ok_or_else(|| XmiError::Layout("Array should have C layout".to_string()))?;
        let c_name = to_c_name(name)?;
        let mut ptr = data.as_mut_ptr() as *mut c_void;
        self.invoker.invoke(
            "get_value",
            &mut [Arg::Name(&c_name), Arg::Slot { slot: &mut ptr, label }],
        )
    }

    fn scalar_string(&mut self, name: &str) -> XmiResult<String> {
        let len = to_usize(self.get_var_itemsize(name)?) + 1;
        let mut buf = string_buffer(len);
        self.read_chars(name, &mut buf, &[len])?;
        Ok(decode_fixed(&buf))
    }

    fn string_array(&mut self, name: &str, shape: &[usize]) -> XmiResult<Vec<String>> {
        let count = shape.first().copied().unwrap_or(0);
        if count == 0 {
            return Ok(Vec::new());
        }
        let stride = to_usize(self.get_var_nbytes(name)?) / count + 1;
        let mut buf = string_buffer(count * stride);
        self.read_chars(name, &mut buf, &[count, stride])?;
        Ok(decode_string_array(&buf, stride, count))
    }

    fn read_chars(&mut self, name: &str, buf: &mut [u8], shape: &[usize]) -> XmiResult<()> {
        let c_name = to_c_name(name)?;
        let mut ptr = buf.as_mut_ptr() as *mut c_void;
        self.invoker.invoke(
            "get_value",
            &mut [
                Arg::Name(&c_name),
                Arg::Slot {
                    slot: &mut ptr,
                    label: Self::slot_label(&VarType::String, shape),
                },
            ],
        )
    }
}
