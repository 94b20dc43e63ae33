//! Error type for the `pico` binary.
//!
//! Wraps every engine-crate error so `run()` can return one `Result` type
//! regardless of which stage (extension loading, bytecode loading,
//! execution) a fatal condition came from (§7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Vm(#[from] pico_vm::VmError),

    #[error(transparent)]
    Extension(#[from] pico_ext::ExtensionError),
}

pub type Result<T> = std::result::Result<T, CliError>;
