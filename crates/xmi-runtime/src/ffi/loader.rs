//! Native library loading and symbol resolution
//!
//! Uses `libloading` for shared libraries on disk. A `StaticSymbols` table
//! provides the same interface for kernels linked into the host process.

use crate::error::{XmiError, XmiResult};
use crate::ffi::caller::{self, RawSymbol};
use libloading::Library;
use std::collections::HashMap;
use std::ffi::{c_void, OsString};
use std::os::raw::c_int;
use std::path::{Path, PathBuf};

/// Environment variable the platform loader consults for dependencies
#[cfg(target_os = "windows")]
pub const SEARCH_PATH_VAR: &str = "PATH";
#[cfg(target_os = "macos")]
pub const SEARCH_PATH_VAR: &str = "DYLD_LIBRARY_PATH";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const SEARCH_PATH_VAR: &str = "LD_LIBRARY_PATH";

/// Anything that can hand out symbol addresses by name
pub trait SymbolSource {
    /// Address of `symbol`, or `None` when it is not exported
    fn address(&self, symbol: &str) -> Option<RawSymbol>;
}

/// A shared library opened with `libloading`
pub struct DynamicLibrary {
    library: Library,
}

impl DynamicLibrary {
    /// Open the shared library at `path`
    ///
    /// # Safety
    ///
    /// Loading a dynamic library runs its initialisation code. The caller
    /// must trust the library.
    pub unsafe fn open(path: &Path) -> Result<Self, libloading::Error> {
        #[cfg(target_os = "windows")]
        let library: Library = libloading::os::windows::Library::load_with_flags(
            path,
            libloading::os::windows::LOAD_WITH_ALTERED_SEARCH_PATH,
        )?
        .into();
        #[cfg(not(target_os = "windows"))]
        let library = Library::new(path)?;

        Ok(Self { library })
    }
}

impl SymbolSource for DynamicLibrary {
    fn address(&self, symbol: &str) -> Option<RawSymbol> {
        // Requesting the symbol as a data pointer yields its address for
        // functions and variables alike.
        let sym = unsafe { self.library.get::<*mut c_void>(symbol.as_bytes()) }.ok()?;
        RawSymbol::new(*sym)
    }
}

/// In-process symbol table
///
/// Maps names to addresses of `extern "C"` functions and exported statics
/// that are already part of the host binary.
#[derive(Debug, Default, Clone)]
pub struct StaticSymbols {
    symbols: HashMap<String, RawSymbol>,
}

impl StaticSymbols {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry point
    ///
    /// Null pointers are ignored.
    pub fn with_function(mut self, name: &str, function: *const ()) -> Self {
        if let Some(sym) = RawSymbol::new(function as *mut c_void) {
            self.symbols.insert(name.to_string(), sym);
        }
        self
    }

    /// Register an integer data symbol
    pub fn with_int(mut self, name: &str, value: *mut c_int) -> Self {
        if let Some(sym) = RawSymbol::new(value as *mut c_void) {
            self.symbols.insert(name.to_string(), sym);
        }
        self
    }
}

impl SymbolSource for StaticSymbols {
    fn address(&self, symbol: &str) -> Option<RawSymbol> {
        self.symbols.get(symbol).copied()
    }
}

/// Handle on a kernel library with a resolved-symbol cache
///
/// Symbols resolve once; later lookups come from the cache.
pub struct NativeLibrary {
    /// Library file name, used in messages and logs
    name: String,
    source: Box<dyn SymbolSource>,
    cache: HashMap<String, RawSymbol>,
}

impl NativeLibrary {
    /// Load the shared library at `path`
    ///
    /// Each dependency directory is put in front of the platform's library
    /// search path first, keeping the given order, so the loader can find
    /// the library's own dependencies.
    pub fn load(path: &Path, dependency_dirs: &[PathBuf]) -> XmiResult<Self> {
        if !dependency_dirs.is_empty() {
            add_dependency_dirs(dependency_dirs)?;
        }

        let library = unsafe { DynamicLibrary::open(path) }.map_err(|e| XmiError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        tracing::debug!(library = %name, path = %path.display(), "loaded kernel library");

        Ok(Self::from_source(name, library))
    }

    /// Wrap any symbol source
    pub fn from_source(name: impl Into<String>, source: impl SymbolSource + 'static) -> Self {
        Self {
            name: name.into(),
            source: Box::new(source),
            cache: HashMap::new(),
        }
    }

    /// Library name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve a symbol, failing with `XmiError::Symbol` if it is absent
    pub fn resolve(&mut self, symbol: &str) -> XmiResult<RawSymbol> {
        if let Some(sym) = self.cache.get(symbol) {
            return Ok(*sym);
        }

        let sym = self
            .source
            .address(symbol)
            .ok_or_else(|| XmiError::Symbol {
                library: self.name.clone(),
                symbol: symbol.to_string(),
            })?;
        self.cache.insert(symbol.to_string(), sym);
        Ok(sym)
    }

    #[cfg(test)]
    fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Read an exported integer constant
    ///
    /// This is a plain memory read of a data symbol, not a call.
    pub fn read_int(&mut self, symbol: &str) -> XmiResult<c_int> {
        let sym = self.resolve(symbol)?;
        Ok(unsafe { caller::read_int(sym) })
    }

    /// Overwrite an exported integer variable
    pub fn write_int(&mut self, symbol: &str, value: c_int) -> XmiResult<()> {
        let sym = self.resolve(symbol)?;
        unsafe { caller::write_int(sym, value) };
        Ok(())
    }
}

impl std::fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("name", &self.name)
            .field("cached", &self.cache.len())
            .finish()
    }
}

/// Prepend `dirs` (in order) to the platform library search path
///
/// Existing entries are kept after the new ones. Relative directories are
/// made absolute against the current directory.
pub fn add_dependency_dirs(dirs: &[PathBuf]) -> XmiResult<()> {
    let cwd = std::env::current_dir()?;
    let mut entries: Vec<PathBuf> = dirs
        .iter()
        .map(|d| if d.is_absolute() { d.clone() } else { cwd.join(d) })
        .collect();

    if let Some(existing) = std::env::var_os(SEARCH_PATH_VAR) {
        entries.extend(std::env::split_paths(&existing));
    }

    let joined: OsString = std::env::join_paths(entries)
        .map_err(|e| XmiError::Load {
            path: dirs.first().cloned().unwrap_or_default(),
            reason: e.to_string(),
        })?;
    tracing::info!(
        var = SEARCH_PATH_VAR,
        value = %joined.to_string_lossy(),
        "augmented library search path"
    );
    std::env::set_var(SEARCH_PATH_VAR, joined);
    Ok(())
}
