//! The kernel wrapper
//!
//! `XmiWrapper` owns one loaded kernel and exposes the BMI/XMI surface as
//! typed methods. Lifecycle, time and stepping calls live here; variable
//! metadata, values and grids are in `catalog`, `value` and `grid`.
//!
//! # Example
//!
//! ```no_run
//! use xmi_runtime::{WrapperOptions, XmiWrapper};
//!
//! let options = WrapperOptions::default()
//!     .with_working_directory("/path/to/sim")
//!     .with_timing(true);
//! let mut mf6 = XmiWrapper::load("/path/to/libmf6.so", options)?;
//! mf6.initialize("")?;
//! while mf6.get_current_time()? < mf6.get_end_time()? {
//!     mf6.update()?;
//! }
//! mf6.finalize()?;
//! # Ok::<(), xmi_runtime::XmiError>(())
//! ```

use crate::error::{XmiError, XmiResult};
use crate::ffi::constants::{LEN_COMPONENT_NAME, LEN_VERSION};
use crate::ffi::marshal::{c_buffer_to_string, string_buffer, to_c_name};
use crate::ffi::{Arg, NativeLibrary};
use crate::invoker::{Invoker, GET_COMPONENT_NAME};
use crate::lifecycle::State;
use crate::timer::TimerLedger;
use crate::workdir::with_working_dir;
use std::os::raw::{c_double, c_int};
use std::path::{Path, PathBuf};

/// Construction options for a wrapper
#[derive(Debug, Clone, Default)]
pub struct WrapperOptions {
    /// Directories holding the library's own dependencies
    pub dependency_dirs: Vec<PathBuf>,
    /// Directory the kernel resolves its files against (default: current directory)
    pub working_directory: Option<PathBuf>,
    /// Record elapsed time per entry point
    pub timing: bool,
}

impl WrapperOptions {
    /// Add a dependency directory
    pub fn with_dependency_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dependency_dirs.push(dir.into());
        self
    }

    /// Set the simulation working directory
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Enable or disable timing
    pub fn with_timing(mut self, timing: bool) -> Self {
        self.timing = timing;
        self
    }
}

/// A loaded BMI/XMI kernel
///
/// Not `Send`: a kernel instance belongs to the thread that created it.
/// If still initialized when dropped, the kernel is finalized and any
/// error is logged.
#[derive(Debug)]
pub struct XmiWrapper {
    pub(crate) invoker: Invoker,
    state: State,
    working_directory: PathBuf,
}

impl XmiWrapper {
    /// Load the shared library at `lib_path`
    pub fn load(lib_path: impl AsRef<Path>, options: WrapperOptions) -> XmiResult<Self> {
        let library = NativeLibrary::load(lib_path.as_ref(), &options.dependency_dirs)?;
        Self::with_library(library, options)
    }

    /// Wrap an already resolved library
    ///
    /// `options.dependency_dirs` only matters when loading from disk and is
    /// ignored here.
    pub fn with_library(library: NativeLibrary, options: WrapperOptions) -> XmiResult<Self> {
        let working_directory = match options.working_directory {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        Ok(Self {
            invoker: Invoker::new(library, options.timing),
            state: State::Uninitialized,
            working_directory,
        })
    }

    /// Load the kernel described by a merged configuration
    pub fn from_config(config: &xmi_config::Config) -> XmiResult<Self> {
        let options = WrapperOptions {
            dependency_dirs: config.dependency_dirs(),
            working_directory: config.working_directory().map(Path::to_path_buf),
            timing: config.timing(),
        };
        Self::load(config.require_library_path()?, options)
    }

    /// Library file name
    pub fn library_name(&self) -> &str {
        self.invoker.library().name()
    }

    /// Current lifecycle state
    pub fn state(&self) -> State {
        self.state
    }

    /// Directory path-sensitive calls run in
    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// Timing ledger, when timing is enabled
    pub fn timer(&self) -> Option<&TimerLedger> {
        self.invoker.timer()
    }

    /// Log timing totals and return the overall total in seconds
    pub fn report_timing_totals(&self) -> XmiResult<f64> {
        let timer = self
            .invoker
            .timer()
            .ok_or_else(|| XmiError::Timer("Timing not activated".to_string()))?;
        let total = timer.report_totals().as_secs_f64();
        tracing::info!(
            "Total elapsed time for {}: {:0.4} seconds",
            self.library_name(),
            total
        );
        Ok(total)
    }

    /// Read an exported integer constant
    pub fn get_constant_int(&mut self, name: &str) -> XmiResult<i32> {
        self.invoker.library_mut().read_int(name)
    }

    /// Overwrite an exported integer variable
    pub fn set_int(&mut self, name: &str, value: i32) -> XmiResult<()> {
        self.invoker.library_mut().write_int(name, value)
    }

    // === Lifecycle ===

    /// Initialize the kernel from a configuration file (may be empty)
    pub fn initialize(&mut self, config_file: &str) -> XmiResult<()> {
        self.state.check_initialize()?;
        let config = to_c_name(config_file)?;
        self.in_working_dir(|inv| inv.invoke("initialize", &mut [Arg::Name(&config)]))?;
        self.state = State::Initialized;
        Ok(())
    }

    /// Initialize the kernel with an MPI communicator handle
    pub fn initialize_mpi(&mut self, comm: i32) -> XmiResult<()> {
        self.state.check_initialize()?;
        let mut comm: c_int = comm;
        self.in_working_dir(|inv| inv.invoke("initialize_mpi", &mut [Arg::Int(&mut comm)]))?;
        self.state = State::Initialized;
        Ok(())
    }

    /// Advance one time step
    pub fn update(&mut self) -> XmiResult<()> {
        self.in_working_dir(|inv| inv.invoke("update", &mut []))
    }

    /// Advance until `time`
    pub fn update_until(&mut self, time: f64) -> XmiResult<()> {
        let mut time: c_double = time;
        self.in_working_dir(|inv| inv.invoke("update_until", &mut [Arg::Double(&mut time)]))
    }

    /// Finalize the kernel
    pub fn finalize(&mut self) -> XmiResult<()> {
        self.state.check_finalize()?;
        self.in_working_dir(|inv| inv.invoke("finalize", &mut []))?;
        self.state = State::Uninitialized;
        Ok(())
    }

    // === Time ===

    /// Current model time
    pub fn get_current_time(&mut self) -> XmiResult<f64> {
        self.get_double("get_current_time")
    }

    /// Model start time
    pub fn get_start_time(&mut self) -> XmiResult<f64> {
        self.get_double("get_start_time")
    }

    /// Model end time
    pub fn get_end_time(&mut self) -> XmiResult<f64> {
        self.get_double("get_end_time")
    }

    /// Length of the current time step
    pub fn get_time_step(&mut self) -> XmiResult<f64> {
        self.get_double("get_time_step")
    }

    /// Not exposed by the convention
    pub fn get_time_units(&mut self) -> XmiResult<String> {
        Err(XmiError::NotImplemented("get_time_units".to_string()))
    }

    // === Component ===

    /// Component name
    pub fn get_component_name(&mut self) -> XmiResult<String> {
        self.read_string(LEN_COMPONENT_NAME, GET_COMPONENT_NAME)
    }

    /// Component version
    pub fn get_version(&mut self) -> XmiResult<String> {
        self.read_string(LEN_VERSION, "get_version")
    }

    // === XMI: stepping and solving ===

    /// Prepare a time step of length `dt`
    pub fn prepare_time_step(&mut self, dt: f64) -> XmiResult<()> {
        let mut dt: c_double = dt;
        self.in_working_dir(|inv| inv.invoke("prepare_time_step", &mut [Arg::Double(&mut dt)]))
    }

    /// Carry out the prepared time step
    pub fn do_time_step(&mut self) -> XmiResult<()> {
        self.in_working_dir(|inv| inv.invoke("do_time_step", &mut []))
    }

    /// Finish the current time step
    pub fn finalize_time_step(&mut self) -> XmiResult<()> {
        self.in_working_dir(|inv| inv.invoke("finalize_time_step", &mut []))
    }

    /// Number of subcomponents (solutions) the kernel exposes
    pub fn get_subcomponent_count(&mut self) -> XmiResult<i32> {
        self.get_int("get_subcomponent_count")
    }

    /// Prepare an outer solve iteration for subcomponent `component_id`
    pub fn prepare_solve(&mut self, component_id: i32) -> XmiResult<()> {
        let mut cid: c_int = component_id;
        self.in_working_dir(|inv| inv.invoke("prepare_solve", &mut [Arg::Int(&mut cid)]))
    }

    /// Run one solve iteration; returns whether it converged
    pub fn solve(&mut self, component_id: i32) -> XmiResult<bool> {
        let mut cid: c_int = component_id;
        let mut has_converged: c_int = 0;
        self.in_working_dir(|inv| {
            inv.invoke(
                "solve",
                &mut [Arg::Int(&mut cid), Arg::Int(&mut has_converged)],
            )
        })?;
        Ok(has_converged == 1)
    }

    /// Finish solving subcomponent `component_id`
    pub fn finalize_solve(&mut self, component_id: i32) -> XmiResult<()> {
        let mut cid: c_int = component_id;
        self.in_working_dir(|inv| inv.invoke("finalize_solve", &mut [Arg::Int(&mut cid)]))
    }

    // === Helpers shared by the other surfaces ===

    /// Run path-sensitive calls inside the simulation directory
    fn in_working_dir<T>(
        &mut self,
        f: impl FnOnce(&mut Invoker) -> XmiResult<T>,
    ) -> XmiResult<T> {
        let invoker = &mut self.invoker;
        with_working_dir(&self.working_directory, || f(invoker))
    }

    /// Value of an exported length constant as a buffer size
    pub(crate) fn len_constant(&mut self, symbol: &str) -> XmiResult<usize> {
        let len = self.get_constant_int(symbol)?;
        Ok(usize::try_from(len).unwrap_or(0))
    }

    /// Fill a string buffer sized by `len_symbol` through `entry`
    pub(crate) fn read_string(&mut self, len_symbol: &str, entry: &str) -> XmiResult<String> {
        let mut buf = string_buffer(self.len_constant(len_symbol)?);
        self.invoker.invoke(entry, &mut [Arg::Chars(&mut buf)])?;
        Ok(c_buffer_to_string(&buf))
    }

    pub(crate) fn get_int(&mut self, entry: &str) -> XmiResult<i32> {
        let mut value: c_int = 0;
        self.invoker.invoke(entry, &mut [Arg::Int(&mut value)])?;
        Ok(value)
    }

    fn get_double(&mut self, entry: &str) -> XmiResult<f64> {
        let mut value: c_double = 0.0;
        self.invoker.invoke(entry, &mut [Arg::Double(&mut value)])?;
        Ok(value)
    }
}

impl Drop for XmiWrapper {
    fn drop(&mut self) {
        if self.state.is_initialized() {
            if let Err(e) = self.finalize() {
                tracing::error!(
                    library = self.library_name(),
                    error = %e,
                    "finalize during teardown failed"
                );
            }
        }
    }
}
