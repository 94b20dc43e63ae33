//! Errors raised scanning a library directory and loading extension
//! libraries (§4.5, §6.2, §7 "link errors").

use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions raised while discovering or loading native extension
/// libraries.
#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("extension library directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("failed to read extension library directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load extension library {path}: {source}")]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("extension library {path} does not export pico_lib_Init")]
    MissingInitSymbol { path: PathBuf },

    #[error("native registration from {library}: {source}")]
    Native {
        library: PathBuf,
        #[source]
        source: pico_vm::NativeError,
    },
}

pub type Result<T> = std::result::Result<T, ExtensionError>;
