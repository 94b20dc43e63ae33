//! The environment: the one piece of state natives, the extension
//! loader, and the interpreter all share (§3.7).
//!
//! The source's `pico_env` bundles the VM, the GC, the native registry,
//! and the list of open library handles behind a single pointer natives
//! receive. We keep that shape, minus the VM's current-frame pointer —
//! natives here receive their arguments directly as a slice (§4.5) rather
//! than reaching back into frame state, so there is nothing frame-shaped
//! for them to borrow.

use pico_gc::{GarbageCollector, GcConfig, GcError};

use crate::native::NativeRegistry;

/// Shared state reachable from native function calls and the extension
/// loader: the GC instance and the native-name registry. Library handles
/// opened by the extension loader are retained here too, so they can be
/// closed in reverse order at shutdown (§4.5).
pub struct Environment {
    pub gc: GarbageCollector,
    pub registry: NativeRegistry,
    lib_handles: Vec<Box<dyn std::any::Any>>,
}

impl Environment {
    pub fn new(gc_config: GcConfig) -> Result<Self, GcError> {
        Ok(Environment {
            gc: GarbageCollector::new(gc_config)?,
            registry: NativeRegistry::new(),
            lib_handles: Vec::new(),
        })
    }

    /// Retains an opened extension library handle for the lifetime of
    /// this environment. The concrete type (a `libloading::Library`, in
    /// `pico-ext`) is erased here so `pico-vm` does not need to depend on
    /// `libloading` itself.
    pub fn retain_library_handle(&mut self, handle: Box<dyn std::any::Any>) {
        self.lib_handles.push(handle);
    }

    /// Closes retained library handles in reverse order of opening
    /// (§4.5), then drops the GC. Called once, from the VM's shutdown
    /// path (§4.6).
    pub fn shutdown(&mut self) {
        while let Some(handle) = self.lib_handles.pop() {
            tracing::debug!("closing extension library handle");
            drop(handle);
        }
    }
}
