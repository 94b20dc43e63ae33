//! The two semi-spaces and bump-pointer allocation within them.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::value::Value;

/// Object headers and fields are written through raw pointers cast to
/// `RawHeader`/`Value` (see `object.rs`), both of which require
/// `align_of::<Value>()` alignment at every offset. Offsets into a space
/// are always multiples of that alignment *relative to the space's own
/// base address* (`object_size` is a multiple of it), so the base address
/// itself must carry the same alignment — a `Box<[u8]>`/`Vec<u8>`, whose
/// allocator guarantee is only 1-byte alignment, is not sufficient.
const ALIGN: usize = std::mem::align_of::<Value>();

/// One half of the copying heap: a fixed-size, explicitly-aligned byte
/// region with a bump pointer. Allocation never does anything but
/// compare-and-advance; the collector is what reclaims space, by copying
/// survivors elsewhere and resetting the bump pointer to zero.
pub(crate) struct SemiSpace {
    ptr: NonNull<u8>,
    layout: Layout,
    bump: usize,
}

impl SemiSpace {
    pub(crate) fn new(size: usize) -> Self {
        let layout = Layout::from_size_align(size.max(1), ALIGN)
            .expect("heap size too large to satisfy alignment");
        // SAFETY: `layout` has nonzero size by construction above.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = match NonNull::new(raw) {
            Some(ptr) => ptr,
            None => alloc::handle_alloc_error(layout),
        };
        SemiSpace { ptr, layout, bump: 0 }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.layout.size()
    }

    pub(crate) fn used(&self) -> usize {
        self.bump
    }

    pub(crate) fn reset(&mut self) {
        self.bump = 0;
    }

    /// Bump-allocates `size` bytes, returning the offset at which they
    /// start, or `None` if the space is full.
    pub(crate) fn try_alloc(&mut self, size: usize) -> Option<usize> {
        let end = self.bump.checked_add(size)?;
        if end > self.layout.size() {
            return None;
        }
        let offset = self.bump;
        self.bump = end;
        Some(offset)
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `layout.size()` initialized bytes for
        // the lifetime of this `SemiSpace`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: same as `as_slice`, and `&mut self` guarantees
        // exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl Drop for SemiSpace {
    fn drop(&mut self) {
        // SAFETY: `self.ptr` was allocated by `alloc_zeroed` with this
        // exact `self.layout` and has not been freed before now.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
    }
}
