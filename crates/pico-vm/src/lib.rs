//! `pico-vm` — the bytecode loader, frame/stack interpreter, and native
//! function registry for the Pico virtual machine.
//!
//! # Running a unit
//!
//! ```no_run
//! use pico_gc::GcConfig;
//! use pico_vm::{env::Environment, interpreter::Vm, loader};
//! use std::path::Path;
//!
//! let unit = loader::load(Path::new("out.pbc")).unwrap();
//! loader::validate_extern_imports(&unit, &pico_vm::native::NativeRegistry::new()).ok();
//! let mut env = Environment::new(GcConfig::default()).unwrap();
//! let mut vm = Vm::new(unit);
//! vm.run(&mut env).unwrap();
//! env.shutdown();
//! ```

pub mod constant;
pub mod disasm;
pub mod env;
pub mod error;
pub mod frame;
pub mod function;
pub mod interpreter;
pub mod loader;
pub mod native;
pub mod opcode;

pub use env::Environment;
pub use error::{ExecError, LoaderError, NativeError, Result, VmError};
pub use interpreter::Vm;
pub use loader::{load, BytecodeUnit, ExternImport};
