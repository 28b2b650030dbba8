//! In-process stub kernel shared by the integration tests
//!
//! A small groundwater-flavoured component named "GW" built from
//! `extern "C"` functions and registered through `StaticSymbols`. All
//! state is thread-local, so every test thread drives its own kernel.

#![allow(dead_code)]

use std::cell::RefCell;
use std::ffi::{c_void, CStr};
use std::os::raw::{c_char, c_double, c_int};
use std::path::PathBuf;
use xmi_runtime::{NativeLibrary, StaticSymbols, WrapperOptions, XmiWrapper};

pub use pretty_assertions::{assert_eq, assert_ne};

pub const COMPONENT_NAME: &str = "GW";
pub const LIBRARY_NAME: &str = "libgw_stub";
pub const LEN_ERR_MESSAGE: c_int = 64;

/// Metadata of one stub variable
pub struct Var {
    pub name: &'static str,
    pub type_str: &'static str,
    pub shape: &'static [c_int],
    pub itemsize: c_int,
    pub grid: c_int,
}

impl Var {
    pub fn nbytes(&self) -> c_int {
        self.itemsize * self.shape.iter().product::<c_int>()
    }
}

pub const VARS: &[Var] = &[
    Var { name: "GWF/HEAD", type_str: "DOUBLE (10,5)", shape: &[10, 5], itemsize: 8, grid: 1 },
    Var { name: "SLN_1/MXITER", type_str: "INTEGER", shape: &[], itemsize: 4, grid: 0 },
    Var { name: "TDIS/DELT", type_str: "DOUBLE", shape: &[], itemsize: 8, grid: 0 },
    Var { name: "GWF/STO", type_str: "FLOAT (4)", shape: &[4], itemsize: 4, grid: 0 },
    Var { name: "GWF/IBOUND", type_str: "INTEGER (3,4)", shape: &[3, 4], itemsize: 4, grid: 0 },
    Var { name: "GWF/IDOMAIN", type_str: "INTEGER (6,0)", shape: &[6, 0], itemsize: 4, grid: 1 },
    Var { name: "GWF/ACTIVE", type_str: "LOGICAL (3)", shape: &[3], itemsize: 4, grid: 0 },
    Var { name: "GWF/NAME", type_str: "STRING LEN=16", shape: &[], itemsize: 16, grid: 0 },
    Var { name: "GWF/BOUNDNAMES", type_str: "STRING LEN=8 (3)", shape: &[3], itemsize: 8, grid: 0 },
    Var { name: "GWF/NONAMES", type_str: "STRING LEN=8 (0)", shape: &[0], itemsize: 8, grid: 0 },
    Var { name: "GWF/BROKEN", type_str: "DOUBLE (2)", shape: &[2], itemsize: 8, grid: 0 },
];

pub const INPUT_VARS: &[&str] = &["SLN_1/MXITER", "GWF/HEAD"];
pub const OUTPUT_VARS: &[&str] = &["GWF/HEAD"];

pub fn find_var(name: &str) -> Option<&'static Var> {
    VARS.iter().find(|v| v.name == name)
}

/// Mutable kernel state
pub struct Kernel {
    pub head: Vec<f64>,
    pub mxiter: Box<c_int>,
    pub delt: Box<f64>,
    pub storage: Vec<f32>,
    pub ibound: Vec<c_int>,
    pub idomain: Vec<c_int>,
    pub model_name: String,
    pub bound_names: Vec<String>,
    pub constants: Vec<(&'static str, Box<c_int>)>,
    pub current_time: f64,
    pub start_time: f64,
    pub end_time: f64,
    pub time_step: f64,
    pub last_error: String,
    pub get_value_calls: usize,
    pub initialize_calls: usize,
    pub finalize_calls: usize,
    pub init_config: Option<String>,
    pub mpi_comm: Option<c_int>,
    pub call_dirs: Vec<PathBuf>,
    pub fail_update: bool,
    pub fail_finalize: bool,
    pub prepared_dt: Option<f64>,
    pub solve_iterations: c_int,
    pub converge_after: c_int,
}

impl Default for Kernel {
    fn default() -> Self {
        Self {
            head: (0..50).map(|i| i as f64 * 0.5).collect(),
            mxiter: Box::new(25),
            delt: Box::new(1.0),
            storage: vec![0.1, 0.2, 0.3, 0.4],
            ibound: (0..12).map(|i| if i % 5 == 0 { -1 } else { 1 }).collect(),
            idomain: vec![1, 1, 0, 1, -1, 1],
            model_name: "MODEL-A".to_string(),
            bound_names: vec!["RIV".to_string(), "WEL-1".to_string(), "CHD".to_string()],
            constants: vec![
                ("BMI_LENCOMPONENTNAME", Box::new(2)),
                ("BMI_LENVERSION", Box::new(16)),
                ("BMI_LENVARADDRESS", Box::new(32)),
                ("BMI_LENVARTYPE", Box::new(24)),
                ("BMI_LENGRIDTYPE", Box::new(16)),
                ("BMI_LENERRMESSAGE", Box::new(LEN_ERR_MESSAGE)),
                ("ISTDOUTTOFILE", Box::new(1)),
            ],
            current_time: 0.0,
            start_time: 0.0,
            end_time: 3.0,
            time_step: 1.0,
            last_error: String::new(),
            get_value_calls: 0,
            initialize_calls: 0,
            finalize_calls: 0,
            init_config: None,
            mpi_comm: None,
            call_dirs: Vec::new(),
            fail_update: false,
            fail_finalize: false,
            prepared_dt: None,
            solve_iterations: 0,
            converge_after: 3,
        }
    }
}

impl Kernel {
    fn data_ptr(&mut self, name: &str) -> Option<*mut c_void> {
        let ptr = match name {
            "GWF/HEAD" => self.head.as_mut_ptr().cast(),
            "SLN_1/MXITER" => (&mut *self.mxiter as *mut c_int).cast(),
            "TDIS/DELT" => (&mut *self.delt as *mut f64).cast(),
            "GWF/STO" => self.storage.as_mut_ptr().cast(),
            "GWF/IBOUND" => self.ibound.as_mut_ptr().cast(),
            "GWF/IDOMAIN" => self.idomain.as_mut_ptr().cast(),
            _ => return None,
        };
        Some(ptr)
    }

    pub fn constant_ptr(&mut self, name: &str) -> Option<*mut c_int> {
        self.constants
            .iter_mut()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| &mut **v as *mut c_int)
    }

    pub fn constant(&self, name: &str) -> c_int {
        self.constants
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| **v)
            .unwrap_or(0)
    }
}

thread_local! {
    static KERNEL: RefCell<Kernel> = RefCell::new(Kernel::default());
}

/// Run `f` against this thread's kernel
pub fn with_kernel<R>(f: impl FnOnce(&mut Kernel) -> R) -> R {
    KERNEL.with(|k| f(&mut k.borrow_mut()))
}

fn fail(message: impl Into<String>) -> c_int {
    let message = message.into();
    with_kernel(|k| k.last_error = message);
    1
}

fn record_dir() {
    if let Ok(dir) = std::env::current_dir() {
        with_kernel(|k| k.call_dirs.push(dir));
    }
}

unsafe fn read_name(ptr: *const c_char) -> String {
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

/// Copy `text` into a `len`-byte buffer, zero-filling the rest
unsafe fn write_str(buf: *mut c_char, len: usize, text: &str) {
    let bytes = text.as_bytes();
    let n = bytes.len().min(len);
    std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf as *mut u8, n);
    std::ptr::write_bytes((buf as *mut u8).add(n), 0, len - n);
}

/// Space-pad `text` to `width`, then terminate with NUL
unsafe fn write_padded(buf: *mut u8, width: usize, text: &str) {
    let padded = format!("{:<width$}", text, width = width);
    std::ptr::copy_nonoverlapping(padded.as_ptr(), buf, width);
    *buf.add(width) = 0;
}

fn lookup(name: &str) -> Result<&'static Var, c_int> {
    find_var(name).ok_or_else(|| fail(format!("unknown variable {}", name)))
}

// === Lifecycle ===

extern "C" fn initialize(config: *const c_char) -> c_int {
    let config = unsafe { read_name(config) };
    record_dir();
    with_kernel(|k| {
        k.initialize_calls += 1;
        k.init_config = Some(config);
        k.current_time = k.start_time;
    });
    0
}

extern "C" fn initialize_mpi(comm: *mut c_int) -> c_int {
    let comm = unsafe { *comm };
    record_dir();
    with_kernel(|k| {
        k.initialize_calls += 1;
        k.mpi_comm = Some(comm);
    });
    0
}

extern "C" fn update() -> c_int {
    record_dir();
    if with_kernel(|k| k.fail_update) {
        return fail("solver diverged");
    }
    with_kernel(|k| k.current_time += k.time_step);
    0
}

extern "C" fn update_until(time: *mut c_double) -> c_int {
    let time = unsafe { *time };
    record_dir();
    with_kernel(|k| k.current_time = time);
    0
}

extern "C" fn finalize() -> c_int {
    record_dir();
    if with_kernel(|k| k.fail_finalize) {
        return fail("cannot close output files");
    }
    with_kernel(|k| k.finalize_calls += 1);
    0
}

// === Time ===

extern "C" fn get_current_time(out: *mut c_double) -> c_int {
    unsafe { *out = with_kernel(|k| k.current_time) };
    0
}

extern "C" fn get_start_time(out: *mut c_double) -> c_int {
    unsafe { *out = with_kernel(|k| k.start_time) };
    0
}

extern "C" fn get_end_time(out: *mut c_double) -> c_int {
    unsafe { *out = with_kernel(|k| k.end_time) };
    0
}

extern "C" fn get_time_step(out: *mut c_double) -> c_int {
    unsafe { *out = with_kernel(|k| k.time_step) };
    0
}

// === Component ===

extern "C" fn get_component_name(buf: *mut c_char) -> c_int {
    let len = with_kernel(|k| k.constant("BMI_LENCOMPONENTNAME")) as usize;
    unsafe { write_str(buf, len, COMPONENT_NAME) };
    0
}

extern "C" fn get_version(buf: *mut c_char) -> c_int {
    let len = with_kernel(|k| k.constant("BMI_LENVERSION")) as usize;
    unsafe { write_str(buf, len, "6.4.0") };
    0
}

extern "C" fn get_last_bmi_error(buf: *mut c_char) -> c_int {
    let (len, message) = with_kernel(|k| (k.constant("BMI_LENERRMESSAGE") as usize, k.last_error.clone()));
    let shown: String = message.chars().take(len.saturating_sub(1)).collect();
    unsafe { write_str(buf, len, &shown) };
    0
}

// === Catalog ===

extern "C" fn get_input_item_count(out: *mut c_int) -> c_int {
    unsafe { *out = INPUT_VARS.len() as c_int };
    0
}

extern "C" fn get_output_item_count(out: *mut c_int) -> c_int {
    unsafe { *out = OUTPUT_VARS.len() as c_int };
    0
}

unsafe fn write_name_table(buf: *mut c_char, names: &[&str]) {
    let width = with_kernel(|k| k.constant("BMI_LENVARADDRESS")) as usize;
    for (i, name) in names.iter().enumerate() {
        write_str(buf.add(i * width), width, name);
    }
}

extern "C" fn get_input_var_names(buf: *mut c_char) -> c_int {
    unsafe { write_name_table(buf, INPUT_VARS) };
    0
}

extern "C" fn get_output_var_names(buf: *mut c_char) -> c_int {
    unsafe { write_name_table(buf, OUTPUT_VARS) };
    0
}

extern "C" fn get_var_rank(name: *const c_char, out: *mut c_int) -> c_int {
    match lookup(&unsafe { read_name(name) }) {
        Ok(var) => {
            unsafe { *out = var.shape.len() as c_int };
            0
        }
        Err(status) => status,
    }
}

extern "C" fn get_var_type(name: *const c_char, buf: *mut c_char) -> c_int {
    match lookup(&unsafe { read_name(name) }) {
        Ok(var) => {
            let len = with_kernel(|k| k.constant("BMI_LENVARTYPE")) as usize;
            unsafe { write_str(buf, len, var.type_str) };
            0
        }
        Err(status) => status,
    }
}

extern "C" fn get_var_shape(name: *const c_char, out: *mut c_int) -> c_int {
    match lookup(&unsafe { read_name(name) }) {
        Ok(var) => {
            for (i, &d) in var.shape.iter().enumerate() {
                unsafe { *out.add(i) = d };
            }
            0
        }
        Err(status) => status,
    }
}

extern "C" fn get_var_itemsize(name: *const c_char, out: *mut c_int) -> c_int {
    match lookup(&unsafe { read_name(name) }) {
        Ok(var) => {
            unsafe { *out = var.itemsize };
            0
        }
        Err(status) => status,
    }
}

extern "C" fn get_var_nbytes(name: *const c_char, out: *mut c_int) -> c_int {
    match lookup(&unsafe { read_name(name) }) {
        Ok(var) => {
            unsafe { *out = var.nbytes() };
            0
        }
        Err(status) => status,
    }
}

extern "C" fn get_var_grid(name: *const c_char, out: *mut c_int) -> c_int {
    match lookup(&unsafe { read_name(name) }) {
        Ok(var) => {
            unsafe { *out = var.grid };
            0
        }
        Err(status) => status,
    }
}

extern "C" fn get_var_address(
    component: *const c_char,
    subcomponent: *const c_char,
    var: *const c_char,
    buf: *mut c_char,
) -> c_int {
    let parts = unsafe { [read_name(component), read_name(subcomponent), read_name(var)] };
    let address = parts
        .iter()
        .filter(|p| !p.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("/");
    let len = with_kernel(|k| k.constant("BMI_LENVARADDRESS")) as usize;
    unsafe { write_str(buf, len, &address) };
    0
}

// === Values ===

extern "C" fn get_value(name: *const c_char, slot: *mut *mut c_void) -> c_int {
    let name = unsafe { read_name(name) };
    let var = match lookup(&name) {
        Ok(var) => var,
        Err(status) => return status,
    };
    with_kernel(|k| k.get_value_calls += 1);
    let dest = unsafe { *slot } as *mut u8;

    match name.as_str() {
        "GWF/NAME" => {
            let text = with_kernel(|k| k.model_name.clone());
            unsafe { write_padded(dest, var.itemsize as usize, &text) };
            0
        }
        "GWF/BOUNDNAMES" | "GWF/NONAMES" => {
            let names = with_kernel(|k| k.bound_names.clone());
            let count = var.shape[0] as usize;
            let width = var.itemsize as usize;
            for (i, text) in names.iter().take(count).enumerate() {
                unsafe { write_padded(dest.add(i * (width + 1)), width, text) };
            }
            0
        }
        _ => match with_kernel(|k| k.data_ptr(&name)) {
            Some(src) => {
                unsafe {
                    std::ptr::copy_nonoverlapping(src as *const u8, dest, var.nbytes() as usize)
                };
                0
            }
            None => fail(format!("no storage for {}", name)),
        },
    }
}

extern "C" fn get_value_ptr(name: *const c_char, slot: *mut *mut c_void) -> c_int {
    let name = unsafe { read_name(name) };
    if let Err(status) = lookup(&name) {
        return status;
    }
    match with_kernel(|k| k.data_ptr(&name)) {
        Some(ptr) => {
            unsafe { *slot = ptr };
            0
        }
        None => fail(format!("no storage for {}", name)),
    }
}

extern "C" fn set_value(name: *const c_char, slot: *mut *mut c_void) -> c_int {
    let name = unsafe { read_name(name) };
    let var = match lookup(&name) {
        Ok(var) => var,
        Err(status) => return status,
    };
    let src = unsafe { *slot } as *const u8;
    match with_kernel(|k| k.data_ptr(&name)) {
        Some(dest) => {
            unsafe { std::ptr::copy_nonoverlapping(src, dest as *mut u8, var.nbytes() as usize) };
            0
        }
        None => fail(format!("variable {} is read-only", name)),
    }
}

// === Grids ===
//
// Grid 1: rectilinear 10x5. Grid 2: unstructured, five nodes, a triangle
// and a quadrilateral.

pub const MESH_X: [f64; 5] = [0.0, 1.0, 1.0, 2.0, 2.0];
pub const MESH_Y: [f64; 5] = [0.0, 0.0, 1.0, 0.0, 1.0];
pub const MESH_FACE_NODES: [c_int; 7] = [0, 1, 2, 1, 3, 4, 2];
pub const MESH_NODES_PER_FACE: [c_int; 2] = [3, 4];

fn grid_id(ptr: *mut c_int) -> Result<c_int, c_int> {
    match unsafe { *ptr } {
        id @ (1 | 2) => Ok(id),
        id => Err(fail(format!("unknown grid {}", id))),
    }
}

macro_rules! grid_scalar {
    ($fn_name:ident, $structured:expr, $mesh:expr) => {
        extern "C" fn $fn_name(grid: *mut c_int, out: *mut c_int) -> c_int {
            match grid_id(grid) {
                Ok(1) => unsafe { *out = $structured },
                Ok(_) => unsafe { *out = $mesh },
                Err(status) => return status,
            }
            0
        }
    };
}

grid_scalar!(get_grid_rank, 2, 2);
grid_scalar!(get_grid_size, 50, 2);
grid_scalar!(get_grid_node_count, 66, 5);
grid_scalar!(get_grid_face_count, 50, 2);

unsafe fn copy_out<T: Copy>(src: &[T], out: *mut T) {
    std::ptr::copy_nonoverlapping(src.as_ptr(), out, src.len());
}

extern "C" fn get_grid_type(grid: *mut c_int, buf: *mut c_char) -> c_int {
    let text = match grid_id(grid) {
        Ok(1) => "rectilinear",
        Ok(_) => "unstructured",
        Err(status) => return status,
    };
    let len = with_kernel(|k| k.constant("BMI_LENGRIDTYPE")) as usize;
    unsafe { write_str(buf, len, text) };
    0
}

extern "C" fn get_grid_shape(grid: *mut c_int, out: *mut c_int) -> c_int {
    match grid_id(grid) {
        Ok(1) => unsafe { copy_out(&[10, 5], out) },
        Ok(_) => return fail("grid 2 has no shape"),
        Err(status) => return status,
    }
    0
}

extern "C" fn get_grid_x(grid: *mut c_int, out: *mut c_double) -> c_int {
    match grid_id(grid) {
        Ok(2) => unsafe { copy_out(&MESH_X, out) },
        Ok(_) => return fail("coordinates are only defined for grid 2"),
        Err(status) => return status,
    }
    0
}

extern "C" fn get_grid_y(grid: *mut c_int, out: *mut c_double) -> c_int {
    match grid_id(grid) {
        Ok(2) => unsafe { copy_out(&MESH_Y, out) },
        Ok(_) => return fail("coordinates are only defined for grid 2"),
        Err(status) => return status,
    }
    0
}

extern "C" fn get_grid_z(grid: *mut c_int, out: *mut c_double) -> c_int {
    match grid_id(grid) {
        Ok(2) => unsafe { copy_out(&[0.0; 5], out) },
        Ok(_) => return fail("coordinates are only defined for grid 2"),
        Err(status) => return status,
    }
    0
}

extern "C" fn get_grid_face_nodes(grid: *mut c_int, out: *mut c_int) -> c_int {
    match grid_id(grid) {
        Ok(2) => unsafe { copy_out(&MESH_FACE_NODES, out) },
        Ok(_) => return fail("grid 1 is structured"),
        Err(status) => return status,
    }
    0
}

extern "C" fn get_grid_nodes_per_face(grid: *mut c_int, out: *mut c_int) -> c_int {
    match grid_id(grid) {
        Ok(2) => unsafe { copy_out(&MESH_NODES_PER_FACE, out) },
        Ok(_) => return fail("grid 1 is structured"),
        Err(status) => return status,
    }
    0
}

// === XMI ===

extern "C" fn prepare_time_step(dt: *mut c_double) -> c_int {
    let dt = unsafe { *dt };
    record_dir();
    with_kernel(|k| k.prepared_dt = Some(dt));
    0
}

extern "C" fn do_time_step() -> c_int {
    record_dir();
    with_kernel(|k| k.solve_iterations = 0);
    0
}

extern "C" fn finalize_time_step() -> c_int {
    record_dir();
    with_kernel(|k| {
        k.current_time += k.prepared_dt.take().unwrap_or(k.time_step);
    });
    0
}

extern "C" fn get_subcomponent_count(out: *mut c_int) -> c_int {
    unsafe { *out = 1 };
    0
}

fn check_component(cid: *mut c_int) -> Result<(), c_int> {
    match unsafe { *cid } {
        1 => Ok(()),
        id => Err(fail(format!("unknown subcomponent {}", id))),
    }
}

extern "C" fn prepare_solve(cid: *mut c_int) -> c_int {
    record_dir();
    match check_component(cid) {
        Ok(()) => 0,
        Err(status) => status,
    }
}

extern "C" fn solve(cid: *mut c_int, has_converged: *mut c_int) -> c_int {
    record_dir();
    if let Err(status) = check_component(cid) {
        return status;
    }
    let converged = with_kernel(|k| {
        k.solve_iterations += 1;
        k.solve_iterations >= k.converge_after
    });
    unsafe { *has_converged = c_int::from(converged) };
    0
}

extern "C" fn finalize_solve(cid: *mut c_int) -> c_int {
    record_dir();
    match check_component(cid) {
        Ok(()) => 0,
        Err(status) => status,
    }
}

/// Every entry point of the stub, by exported name
pub fn entry_points() -> Vec<(&'static str, *const ())> {
    vec![
        ("initialize", initialize as *const ()),
        ("initialize_mpi", initialize_mpi as *const ()),
        ("update", update as *const ()),
        ("update_until", update_until as *const ()),
        ("finalize", finalize as *const ()),
        ("get_current_time", get_current_time as *const ()),
        ("get_start_time", get_start_time as *const ()),
        ("get_end_time", get_end_time as *const ()),
        ("get_time_step", get_time_step as *const ()),
        ("get_component_name", get_component_name as *const ()),
        ("get_version", get_version as *const ()),
        ("get_last_bmi_error", get_last_bmi_error as *const ()),
        ("get_input_item_count", get_input_item_count as *const ()),
        ("get_output_item_count", get_output_item_count as *const ()),
        ("get_input_var_names", get_input_var_names as *const ()),
        ("get_output_var_names", get_output_var_names as *const ()),
        ("get_var_rank", get_var_rank as *const ()),
        ("get_var_type", get_var_type as *const ()),
        ("get_var_shape", get_var_shape as *const ()),
        ("get_var_itemsize", get_var_itemsize as *const ()),
        ("get_var_nbytes", get_var_nbytes as *const ()),
        ("get_var_grid", get_var_grid as *const ()),
        ("get_var_address", get_var_address as *const ()),
        ("get_value", get_value as *const ()),
        ("get_value_ptr", get_value_ptr as *const ()),
        ("set_value", set_value as *const ()),
        ("get_grid_rank", get_grid_rank as *const ()),
        ("get_grid_size", get_grid_size as *const ()),
        ("get_grid_type", get_grid_type as *const ()),
        ("get_grid_shape", get_grid_shape as *const ()),
        ("get_grid_x", get_grid_x as *const ()),
        ("get_grid_y", get_grid_y as *const ()),
        ("get_grid_z", get_grid_z as *const ()),
        ("get_grid_node_count", get_grid_node_count as *const ()),
        ("get_grid_face_count", get_grid_face_count as *const ()),
        ("get_grid_face_nodes", get_grid_face_nodes as *const ()),
        ("get_grid_nodes_per_face", get_grid_nodes_per_face as *const ()),
        ("prepare_time_step", prepare_time_step as *const ()),
        ("do_time_step", do_time_step as *const ()),
        ("finalize_time_step", finalize_time_step as *const ()),
        ("get_subcomponent_count", get_subcomponent_count as *const ()),
        ("prepare_solve", prepare_solve as *const ()),
        ("solve", solve as *const ()),
        ("finalize_solve", finalize_solve as *const ()),
    ]
}

/// Symbol table for this thread's kernel, minus the names in `skip`
pub fn symbols_without(skip: &[&str]) -> StaticSymbols {
    let mut symbols = StaticSymbols::new();
    for (name, function) in entry_points() {
        if !skip.contains(&name) {
            symbols = symbols.with_function(name, function);
        }
    }
    let constants: Vec<(&'static str, *mut c_int)> = with_kernel(|k| {
        let names: Vec<&'static str> = k.constants.iter().map(|(n, _)| *n).collect();
        names
            .into_iter()
            .filter_map(|n| k.constant_ptr(n).map(|p| (n, p)))
            .collect()
    });
    for (name, ptr) in constants {
        if !skip.contains(&name) {
            symbols = symbols.with_int(name, ptr);
        }
    }
    symbols
}

pub fn symbols() -> StaticSymbols {
    symbols_without(&[])
}

/// Wrapper over the stub running in `std::env::temp_dir()`
pub fn stub_wrapper() -> XmiWrapper {
    stub_wrapper_with(WrapperOptions::default().with_working_directory(std::env::temp_dir()))
}

pub fn stub_wrapper_with(options: WrapperOptions) -> XmiWrapper {
    let library = NativeLibrary::from_source(LIBRARY_NAME, symbols());
    XmiWrapper::with_library(library, options).expect("stub wrapper")
}

/// Initialized wrapper over the stub
pub fn initialized_wrapper() -> XmiWrapper {
    let mut wrapper = stub_wrapper();
    wrapper.initialize("").expect("initialize stub");
    wrapper
}
