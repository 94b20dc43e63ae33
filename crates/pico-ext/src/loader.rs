//! Extension discovery: scan a directory for shared objects, load each,
//! and invoke its `pico_lib_Init` hook (§4.5).
//!
//! Handles are retained on the [`Environment`] in load order and closed in
//! reverse order at shutdown — `Environment::shutdown` pops its handle
//! stack, so callers only need to make sure every library this module
//! opens is handed to `retain_library_handle` before the next one loads.

use std::ffi::c_void;
use std::path::Path;

use libloading::{Library, Symbol};
use pico_vm::Environment;

use crate::error::{ExtensionError, Result};

const INIT_SYMBOL: &[u8] = b"pico_lib_Init\0";

type InitFn = unsafe extern "C" fn(*mut c_void);

/// Scans `dir` for every file ending in the platform's shared-object
/// extension (`.so` on Linux, `.dylib` on macOS, `.dll` on Windows),
/// loads each and calls its `pico_lib_Init(env)`. Returns the number of
/// libraries loaded.
///
/// Fails fatally (§7 "link errors") if `dir` does not exist, a library
/// fails to load, or a library is missing `pico_lib_Init`.
pub fn load_libraries(dir: &Path, env: &mut Environment) -> Result<usize> {
    if !dir.is_dir() {
        return Err(ExtensionError::DirectoryNotFound(dir.to_path_buf()));
    }

    let ext = std::env::consts::DLL_EXTENSION;
    let mut loaded = 0usize;

    let entries = std::fs::read_dir(dir).map_err(|e| ExtensionError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(ext))
        .collect();
    // Deterministic load order, so registration conflicts are reproducible.
    paths.sort();

    for path in paths {
        load_one(&path, env)?;
        loaded += 1;
    }

    tracing::info!(dir = %dir.display(), loaded, "extension loader: scan complete");
    Ok(loaded)
}

fn load_one(path: &Path, env: &mut Environment) -> Result<()> {
    tracing::info!(path = %path.display(), "extension loader: loading library");

    // SAFETY: loading and running arbitrary native code is the whole point
    // of the extension mechanism (§4.5); the caller accepts that any
    // library found in `dir` is trusted the way the source's dlopen call
    // trusts its library directory.
    let lib = unsafe { Library::new(path) }.map_err(|e| ExtensionError::LibraryLoad {
        path: path.to_path_buf(),
        source: e,
    })?;

    // SAFETY: `INIT_SYMBOL` names the ABI's documented entry point
    // (§6.2); if present, its signature is `void pico_lib_Init(env*)`.
    let init: Symbol<InitFn> = unsafe { lib.get(INIT_SYMBOL) }
        .map_err(|_| ExtensionError::MissingInitSymbol { path: path.to_path_buf() })?;

    let env_ptr = env as *mut Environment as *mut c_void;
    // SAFETY: `env_ptr` is valid for the duration of this call; the
    // library's contract is to call back into `pico_register_native_*`
    // with it before returning, never to retain it.
    unsafe { init(env_ptr) };

    tracing::debug!(path = %path.display(), "extension loader: pico_lib_Init returned");
    env.retain_library_handle(Box::new(lib));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_is_an_error() {
        let mut env = Environment::new(pico_gc::GcConfig::default()).unwrap();
        let err = load_libraries(Path::new("/no/such/pico/lib/dir"), &mut env).unwrap_err();
        assert!(matches!(err, ExtensionError::DirectoryNotFound(_)));
    }

    #[test]
    fn empty_directory_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = Environment::new(pico_gc::GcConfig::default()).unwrap();
        let loaded = load_libraries(dir.path(), &mut env).unwrap();
        assert_eq!(loaded, 0);
    }

    #[test]
    fn non_library_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"not a library").unwrap();
        let mut env = Environment::new(pico_gc::GcConfig::default()).unwrap();
        let loaded = load_libraries(dir.path(), &mut env).unwrap();
        assert_eq!(loaded, 0);
    }
}
