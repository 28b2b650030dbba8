//! Status-checked invocation of kernel entry points
//!
//! The `Invoker` resolves an entry point, passes it the marshaled
//! arguments, records timing and debug output, and turns a nonzero status
//! into `XmiError::NativeCall`.
//!
//! On failure it tries to recover the kernel's own message through a
//! separate raw path (`fetch_diagnostic`) that never goes back through
//! `invoke`, so a missing diagnostic symbol cannot recurse into error
//! handling.

use crate::error::{Diagnostic, NativeCallError, XmiError, XmiResult};
use crate::ffi::caller::{self, STATUS_SUCCESS};
use crate::ffi::constants::{LEN_COMPONENT_NAME, LEN_ERR_MESSAGE};
use crate::ffi::marshal::{c_buffer_to_string, string_buffer};
use crate::ffi::types::{render_call, Arg};
use crate::ffi::NativeLibrary;
use crate::timer::TimerLedger;
use std::ffi::c_void;
use std::time::Instant;
use tracing::Level;

/// Entry point returning the kernel's last error text
pub const GET_LAST_ERROR: &str = "get_last_bmi_error";
/// Entry point returning the kernel's component name
pub const GET_COMPONENT_NAME: &str = "get_component_name";

/// Calls entry points of one library
#[derive(Debug)]
pub struct Invoker {
    library: NativeLibrary,
    timer: Option<TimerLedger>,
}

impl Invoker {
    /// Create an invoker, optionally recording timings
    pub fn new(library: NativeLibrary, timing: bool) -> Self {
        let timer = timing.then(|| TimerLedger::new(library.name()));
        Self { library, timer }
    }

    /// The library being driven
    pub fn library(&self) -> &NativeLibrary {
        &self.library
    }

    /// Mutable access to the library, for data symbols
    pub fn library_mut(&mut self) -> &mut NativeLibrary {
        &mut self.library
    }

    /// Timing ledger, when timing is enabled
    pub fn timer(&self) -> Option<&TimerLedger> {
        self.timer.as_ref()
    }

    /// Call `entry` and check its status
    pub fn invoke(&mut self, entry: &str, args: &mut [Arg<'_>]) -> XmiResult<()> {
        self.invoke_with_detail(entry, args, None)
    }

    /// Call `entry`, attaching `detail` to the error on failure when the
    /// kernel's own message could be recovered
    pub fn invoke_with_detail(
        &mut self,
        entry: &str,
        args: &mut [Arg<'_>],
        detail: Option<&str>,
    ) -> XmiResult<()> {
        let symbol = self.library.resolve(entry)?;

        let started = Instant::now();
        let outcome = self.execute(entry, symbol, args, detail);
        if let Some(timer) = self.timer.as_mut() {
            timer.record(entry, started.elapsed());
        }
        outcome
    }

    fn execute(
        &mut self,
        entry: &str,
        symbol: caller::RawSymbol,
        args: &mut [Arg<'_>],
        detail: Option<&str>,
    ) -> XmiResult<()> {
        let raw: Vec<*mut c_void> = args.iter_mut().map(|a| a.as_raw()).collect();
        let status = unsafe { caller::call_raw(symbol, &raw)? };

        if tracing::enabled!(Level::DEBUG) {
            tracing::debug!(
                library = self.library.name(),
                "execute function: {} returned {}",
                render_call(entry, args),
                status
            );
        }

        if status == STATUS_SUCCESS {
            return Ok(());
        }

        let diagnostic = self.fetch_diagnostic();
        Err(XmiError::NativeCall(Box::new(NativeCallError {
            entry_point: entry.to_string(),
            call: render_call(entry, args),
            status,
            // detail only accompanies a recovered kernel message
            detail: diagnostic.as_ref().and(detail).map(str::to_string),
            diagnostic,
        })))
    }

    /// Best-effort recovery of the kernel's error text and component name
    fn fetch_diagnostic(&mut self) -> Option<Diagnostic> {
        match self.try_fetch_diagnostic() {
            Ok(diagnostic) => Some(diagnostic),
            Err(e) => {
                tracing::error!(
                    library = self.library.name(),
                    error = %e,
                    "Couldn't extract error message"
                );
                None
            }
        }
    }

    fn try_fetch_diagnostic(&mut self) -> XmiResult<Diagnostic> {
        let message = self.raw_string(LEN_ERR_MESSAGE, GET_LAST_ERROR)?;
        let component = self.raw_string(LEN_COMPONENT_NAME, GET_COMPONENT_NAME)?;
        Ok(Diagnostic { component, message })
    }

    /// Fill a buffer sized by `len_symbol` through `entry`, ignoring status
    fn raw_string(&mut self, len_symbol: &str, entry: &str) -> XmiResult<String> {
        let len = self.library.read_int(len_symbol)?;
        let symbol = self.library.resolve(entry)?;
        let mut buf = string_buffer(usize::try_from(len).unwrap_or(0));
        unsafe { caller::call_raw(symbol, &[buf.as_mut_ptr().cast()])? };
        Ok(c_buffer_to_string(&buf))
    }
}
