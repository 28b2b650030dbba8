//! Variable metadata
//!
//! Rank, type, shape and size queries plus the input/output name tables.
//! Native type strings are parsed once into `VarType` so the marshaling
//! code dispatches on an enum.

use crate::error::{XmiError, XmiResult};
use crate::ffi::constants::{LEN_VAR_ADDRESS, LEN_VAR_TYPE};
use crate::ffi::marshal::{c_buffer_to_string, split_name_table, string_buffer, to_c_name};
use crate::ffi::types::buffer_label;
use crate::ffi::Arg;
use crate::wrapper::XmiWrapper;
use std::fmt;
use std::os::raw::c_int;

/// Element type of a kernel variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarType {
    Double,
    Float,
    Int,
    String,
    /// Any other native type string, kept verbatim
    Unsupported(std::string::String),
}

impl VarType {
    /// Parse a native type string such as `"DOUBLE (10, 5)"` or `"INTEGER"`
    ///
    /// Only the first whitespace-delimited token counts, compared
    /// case-insensitively by prefix.
    pub fn parse(native: &str) -> Self {
        let token = native
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        if token.starts_with("double") {
            VarType::Double
        } else if token.starts_with("float") {
            VarType::Float
        } else if token.starts_with("int") {
            VarType::Int
        } else if token.starts_with("string") {
            VarType::String
        } else {
            VarType::Unsupported(native.trim().to_string())
        }
    }

    /// Name of the matching C element type
    pub fn c_name(&self) -> &str {
        match self {
            VarType::Double => "c_double",
            VarType::Float => "c_float",
            VarType::Int => "c_int",
            VarType::String => "c_char",
            VarType::Unsupported(native) => native.as_str(),
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::Double => write!(f, "double"),
            VarType::Float => write!(f, "float"),
            VarType::Int => write!(f, "int"),
            VarType::String => write!(f, "string"),
            VarType::Unsupported(native) => write!(f, "{}", native),
        }
    }
}

/// Convert a kernel-reported count to `usize`; negatives become zero
pub(crate) fn to_usize(value: c_int) -> usize {
    usize::try_from(value).unwrap_or(0)
}

impl XmiWrapper {
    /// Number of input variables
    pub fn get_input_item_count(&mut self) -> XmiResult<i32> {
        self.get_int("get_input_item_count")
    }

    /// Number of output variables
    pub fn get_output_item_count(&mut self) -> XmiResult<i32> {
        self.get_int("get_output_item_count")
    }

    /// Addresses of all input variables
    pub fn get_input_var_names(&mut self) -> XmiResult<Vec<String>> {
        let count = to_usize(self.get_input_item_count()?);
        self.read_name_table("get_input_var_names", count)
    }

    /// Addresses of all output variables
    pub fn get_output_var_names(&mut self) -> XmiResult<Vec<String>> {
        let count = to_usize(self.get_output_item_count()?);
        self.read_name_table("get_output_var_names", count)
    }

    fn read_name_table(&mut self, entry: &str, count: usize) -> XmiResult<Vec<String>> {
        let width = self.len_constant(LEN_VAR_ADDRESS)?;
        let mut buf = string_buffer(count * width);
        self.invoker.invoke(entry, &mut [Arg::Chars(&mut buf)])?;
        Ok(split_name_table(&buf, width, count))
    }

    /// Grid id a variable lives on
    pub fn get_var_grid(&mut self, name: &str) -> XmiResult<i32> {
        self.named_int("get_var_grid", name)
    }

    /// Native type string of a variable
    pub fn get_var_type(&mut self, name: &str) -> XmiResult<String> {
        let c_name = to_c_name(name)?;
        let mut buf = string_buffer(self.len_constant(LEN_VAR_TYPE)?);
        self.invoker.invoke(
            "get_var_type",
            &mut [Arg::Name(&c_name), Arg::Chars(&mut buf)],
        )?;
        Ok(c_buffer_to_string(&buf))
    }

    /// Parsed element type of a variable
    pub fn var_type(&mut self, name: &str) -> XmiResult<VarType> {
        Ok(VarType::parse(&self.get_var_type(name)?))
    }

    /// Number of dimensions; zero for scalars
    pub fn get_var_rank(&mut self, name: &str) -> XmiResult<i32> {
        self.named_int("get_var_rank", name)
    }

    /// Dimensions of a variable, one entry per rank
    pub fn get_var_shape(&mut self, name: &str) -> XmiResult<Vec<i32>> {
        let rank = to_usize(self.get_var_rank(name)?);
        let c_name = to_c_name(name)?;
        let mut shape: Vec<c_int> = vec![0; rank];
        self.invoker.invoke(
            "get_var_shape",
            &mut [Arg::Name(&c_name), Arg::Ints(&mut shape)],
        )?;
        Ok(shape)
    }

    /// Size in bytes of one element
    pub fn get_var_itemsize(&mut self, name: &str) -> XmiResult<i32> {
        self.named_int("get_var_itemsize", name)
    }

    /// Total size in bytes
    pub fn get_var_nbytes(&mut self, name: &str) -> XmiResult<i32> {
        self.named_int("get_var_nbytes", name)
    }

    /// Not exposed by the convention
    pub fn get_var_units(&mut self, _name: &str) -> XmiResult<String> {
        Err(XmiError::NotImplemented("get_var_units".to_string()))
    }

    /// Not exposed by the convention
    pub fn get_var_location(&mut self, _name: &str) -> XmiResult<String> {
        Err(XmiError::NotImplemented("get_var_location".to_string()))
    }

    /// Compose the canonical address of a variable
    ///
    /// Names are upper-cased before the call; `subcomponent` may be empty.
    pub fn get_var_address(
        &mut self,
        var_name: &str,
        component: &str,
        subcomponent: &str,
    ) -> XmiResult<String> {
        let component = to_c_name(&component.to_uppercase())?;
        let subcomponent = to_c_name(&subcomponent.to_uppercase())?;
        let var = to_c_name(&var_name.to_uppercase())?;
        let mut buf = string_buffer(self.len_constant(LEN_VAR_ADDRESS)?);
        self.invoker.invoke(
            "get_var_address",
            &mut [
                Arg::Name(&component),
                Arg::Name(&subcomponent),
                Arg::Name(&var),
                Arg::Chars(&mut buf),
            ],
        )?;
        Ok(c_buffer_to_string(&buf))
    }

    /// Shape of a variable as host extents
    pub(crate) fn host_shape(&mut self, name: &str) -> XmiResult<Vec<usize>> {
        Ok(self
            .get_var_shape(name)?
            .into_iter()
            .map(to_usize)
            .collect())
    }

    /// Label a typed buffer for rendered calls
    pub(crate) fn slot_label(var_type: &VarType, shape: &[usize]) -> String {
        buffer_label(var_type.c_name(), shape)
    }

    fn named_int(&mut self, entry: &str, name: &str) -> XmiResult<i32> {
        let c_name = to_c_name(name)?;
        let mut value: c_int = 0;
        self.invoker
            .invoke(entry, &mut [Arg::Name(&c_name), Arg::Int(&mut value)])?;
        Ok(value)
    }
}
