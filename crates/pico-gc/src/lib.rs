//! `pico-gc` — the semi-space copying collector backing the Pico virtual
//! machine's heap.
//!
//! # Design
//!
//! Objects are addressed by [`ObjRef`], a typed index (byte offset) into
//! whichever semi-space currently owns them — never by Rust reference or
//! raw pointer, so a collection or heap growth can never leave a dangling
//! reference in caller hands. [`Value`] is the tagged union that flows
//! through the VM's stack, locals, and object fields; [`GarbageCollector`]
//! owns the two semi-spaces and implements the allocate/collect/grow
//! protocol.
//!
//! Root discovery is deliberately narrow: a collection only traces
//! whatever slice of `Value`s the caller passes to [`GarbageCollector::
//! allocate`] or [`GarbageCollector::collect`] as `roots`. In `pico-vm`
//! this is the live portion of the operand stack — frame locals are not
//! roots, matching the execution engine this collector was built for.
//!
//! ```
//! use pico_gc::{GarbageCollector, GcConfig, Value};
//!
//! let mut gc = GarbageCollector::new(GcConfig::default()).unwrap();
//! let mut roots = [Value::Int(0)];
//! let obj = gc.allocate(2, &mut roots).unwrap();
//! roots[0] = Value::Object(obj);
//! gc.set_field(obj, 0, Value::Int(7)).unwrap();
//! assert_eq!(gc.get_field(obj, 0).unwrap(), Value::Int(7));
//! ```

mod collector;
mod config;
mod error;
mod heap;
mod object;
mod stats;
mod value;

pub use collector::GarbageCollector;
pub use config::{ConfigError, GcConfig};
pub use error::{GcError, Result};
pub use object::ObjRef;
pub use stats::GcStats;
pub use value::{StrRef, Value};
