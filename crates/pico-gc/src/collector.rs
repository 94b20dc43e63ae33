//! The semi-space collector: a Cheney-style worklist copy over an explicit
//! from-space/to-space pair, plus the allocate/collect/grow/flip protocol
//! that backs `GarbageCollector::allocate`.
//!
//! Roots are whatever the caller passes in at allocation time — in
//! `pico-vm` this is the live slice of the operand stack, never frame
//! locals, matching the engine's narrower root set.

use std::collections::VecDeque;

use tracing::debug;

use crate::config::GcConfig;
use crate::error::{GcError, Result};
use crate::heap::SemiSpace;
use crate::object::{self, ObjRef};
use crate::stats::GcStats;
use crate::value::Value;

/// An item of collection work: either a root slot or a field slot already
/// copied into to-space and awaiting its own fields to be traced.
enum WorkItem {
    Root(usize),
    Field(ObjRef, u8),
}

/// A semi-space copying collector with two fixed-capacity spaces.
///
/// `from` is always the space live objects currently occupy; `to` is
/// always empty between collections, ready to receive survivors. The two
/// swap roles (`flip`) after every collection; when a collection still
/// cannot satisfy an allocation, both are replaced by larger spaces
/// (`grow`).
pub struct GarbageCollector {
    from: SemiSpace,
    to: SemiSpace,
    config: GcConfig,
    stats: GcStats,
}

impl GarbageCollector {
    pub fn new(config: GcConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| GcError::Configuration(e.to_string()))?;
        Ok(GarbageCollector {
            from: SemiSpace::new(config.initial_heap_size),
            to: SemiSpace::new(config.initial_heap_size),
            config,
            stats: GcStats::default(),
        })
    }

    pub fn config(&self) -> &GcConfig {
        &self.config
    }

    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    /// Current from-space capacity, in bytes.
    pub fn heap_size(&self) -> usize {
        self.from.capacity()
    }

    pub fn num_fields(&self, obj: ObjRef) -> u8 {
        // SAFETY: any `ObjRef` in caller hands was produced by `allocate`
        // and still lives in the current from-space.
        unsafe { object::read_num_fields(self.from.as_slice(), obj.offset()) }
    }

    pub fn get_field(&self, obj: ObjRef, index: u8) -> Result<Value> {
        let num_fields = self.num_fields(obj);
        if index >= num_fields {
            return Err(GcError::FieldOutOfBounds { index, num_fields });
        }
        // SAFETY: bounds just checked above.
        Ok(unsafe { object::read_field(self.from.as_slice(), obj.offset(), index) })
    }

    pub fn set_field(&mut self, obj: ObjRef, index: u8, value: Value) -> Result<()> {
        let num_fields = self.num_fields(obj);
        if index >= num_fields {
            return Err(GcError::FieldOutOfBounds { index, num_fields });
        }
        // SAFETY: bounds just checked above.
        unsafe { object::write_field(self.from.as_mut_slice(), obj.offset(), index, value) };
        Ok(())
    }

    /// Allocates an object with `num_fields` fields, freshly zeroed as
    /// `Value::Int(0)`.
    ///
    /// `roots` is the caller's full set of live `Value`s (the operand
    /// stack) — every slot holding `Value::Object` is rewritten in place
    /// if a collection runs, so the caller's references stay valid across
    /// the call.
    ///
    /// On first failure to bump-allocate, this runs the full protocol: (a)
    /// collect, (b) flip, (c) retry; if that also fails, (d) double both
    /// space sizes, collecting current survivors straight into the larger
    /// replacement, and retry once more; if that still fails, (e) return
    /// `GcError::HeapExhausted`.
    pub fn allocate(&mut self, num_fields: u8, roots: &mut [Value]) -> Result<ObjRef> {
        if num_fields as usize > 255 {
            return Err(GcError::TooManyFields {
                num_fields: num_fields as usize,
            });
        }

        if let Some(r) = self.try_alloc_now(num_fields) {
            return Ok(r);
        }

        self.collect(roots);
        if let Some(r) = self.try_alloc_now(num_fields) {
            return Ok(r);
        }

        self.grow(roots);
        if let Some(r) = self.try_alloc_now(num_fields) {
            return Ok(r);
        }

        Err(GcError::HeapExhausted {
            requested: object::object_size(num_fields),
            heap_size: self.from.capacity(),
        })
    }

    fn try_alloc_now(&mut self, num_fields: u8) -> Option<ObjRef> {
        let size = object::object_size(num_fields);
        let offset = self.from.try_alloc(size)?;
        // SAFETY: `try_alloc` just reserved `size` bytes at `offset`.
        unsafe { object::init_header(self.from.as_mut_slice(), offset, num_fields) };
        Some(ObjRef(offset as u32))
    }

    /// Runs one collection cycle: copies everything reachable from `roots`
    /// out of `from` into `to`, then flips the two spaces so `from` again
    /// names the space holding live data.
    pub fn collect(&mut self, roots: &mut [Value]) {
        let before = self.from.used();
        self.to.reset();
        copy_reachable(&mut self.from, &mut self.to, roots);
        let after = self.to.used();
        self.stats.record_collection(after);
        if self.config.verbose {
            tracing::info!(bytes_before = before, bytes_after = after, "gc: collection");
        } else {
            debug!(bytes_before = before, bytes_after = after, "gc: collection");
        }
        std::mem::swap(&mut self.from, &mut self.to);
    }

    /// Doubles (by `growth_factor`) both space sizes, copying current
    /// survivors straight into the larger replacement for `from`.
    fn grow(&mut self, roots: &mut [Value]) {
        let old_size = self.from.capacity();
        let new_size = ((old_size as f64) * self.config.growth_factor).ceil() as usize;
        let mut new_from = SemiSpace::new(new_size);
        copy_reachable(&mut self.from, &mut new_from, roots);
        self.from = new_from;
        self.to = SemiSpace::new(new_size);
        self.stats.record_growth();
        tracing::info!(old_size, new_size, "gc: heap grown");
    }
}

/// Copies everything reachable from `roots` out of `src` and into `dst`,
/// rewriting `roots` and every already-copied object's fields to point at
/// the new to-space locations as it goes.
///
/// This is the Cheney worklist: a FIFO of not-yet-traced slots. Each slot
/// names either a root index or `(owner, field index)` in `dst` whose
/// value is an `ObjRef` still expressed in `src` terms. Popping a slot
/// copies (or, if already forwarded, reuses) the referenced object and
/// rewrites the slot; only a *first* copy enqueues that object's own
/// fields, which is what keeps cycles and shared references from being
/// traced — or copied — more than once.
fn copy_reachable(src: &mut SemiSpace, dst: &mut SemiSpace, roots: &mut [Value]) {
    let mut worklist: VecDeque<WorkItem> = VecDeque::new();

    for i in 0..roots.len() {
        if roots[i].is_object() {
            worklist.push_back(WorkItem::Root(i));
        }
    }

    while let Some(item) = worklist.pop_front() {
        let obj = match item {
            WorkItem::Root(i) => roots[i]
                .as_object()
                .expect("worklist root slot was enqueued because it held an Object"),
            WorkItem::Field(owner, idx) => {
                // SAFETY: `owner` was already copied into `dst`, and `idx`
                // is within the field count it was copied with.
                let v = unsafe { object::read_field(dst.as_slice(), owner.offset(), idx) };
                v.as_object()
                    .expect("worklist field slot was enqueued because it held an Object")
            }
        };

        let (new_ref, first_copy) = copy_or_reuse(src, dst, obj);

        match item {
            WorkItem::Root(i) => roots[i] = Value::Object(new_ref),
            WorkItem::Field(owner, idx) => unsafe {
                object::write_field(dst.as_mut_slice(), owner.offset(), idx, Value::Object(new_ref));
            },
        }

        if first_copy {
            // SAFETY: `new_ref` was just written by `copy_or_reuse` with a
            // fully-initialized header and field array.
            let n = unsafe { object::read_num_fields(dst.as_slice(), new_ref.offset()) };
            for idx in 0..n {
                let v = unsafe { object::read_field(dst.as_slice(), new_ref.offset(), idx) };
                if v.is_object() {
                    worklist.push_back(WorkItem::Field(new_ref, idx));
                }
            }
        }
    }
}

/// Copies `obj` from `src` into `dst` unless it was already copied earlier
/// in this collection, in which case its forwarding pointer is reused.
/// Returns the object's new location and whether this call performed the
/// copy (as opposed to reusing a forwarding pointer).
fn copy_or_reuse(src: &mut SemiSpace, dst: &mut SemiSpace, obj: ObjRef) -> (ObjRef, bool) {
    let off = obj.offset();
    // SAFETY: `off` names a live, previously-initialized object in `src`.
    if let Some(target) = unsafe { object::read_forwarded(src.as_slice(), off) } {
        return (ObjRef(target), false);
    }

    // SAFETY: same as above.
    let num_fields = unsafe { object::read_num_fields(src.as_slice(), off) };
    let size = object::object_size(num_fields);
    let new_off = dst
        .try_alloc(size)
        .expect("to-space must be large enough to hold every from-space survivor");

    // SAFETY: `off` names `size` initialized bytes in `src`; `new_off`
    // names `size` freshly reserved bytes in `dst`.
    unsafe {
        object::copy_object(src.as_slice(), off, dst.as_mut_slice(), new_off, num_fields);
        object::set_forwarded(src.as_mut_slice(), off, new_off as u32);
    }

    (ObjRef(new_off as u32), true)
}
