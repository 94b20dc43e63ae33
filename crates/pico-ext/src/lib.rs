//! `pico-ext` — the native extension loader: directory scan, `dlopen`,
//! and the `pico_lib_Init` invocation contract (§4.5, §6.2).
//!
//! Kept out of `pico-vm` so the core interpreter carries no
//! platform-dynamic-loading dependency; `pico-cli` wires the two
//! together before starting the root frame.
//!
//! ```no_run
//! use pico_gc::GcConfig;
//! use pico_vm::Environment;
//! use std::path::Path;
//!
//! let mut env = Environment::new(GcConfig::default()).unwrap();
//! pico_ext::load_libraries(Path::new("./lib"), &mut env).unwrap();
//! ```

pub mod error;
pub mod loader;
pub mod registration;

pub use error::ExtensionError;
pub use loader::load_libraries;
