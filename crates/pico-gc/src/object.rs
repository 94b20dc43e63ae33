//! Object layout within a semi-space: header plus an inline field array.
//!
//! Objects are addressed by byte offset into whichever semi-space currently
//! owns them, never by Rust reference or raw pointer that could be
//! invalidated by a `Vec` reallocation — this is the "arena + typed index"
//! shape the source's raw-pointer object graph is rewritten into.

use crate::value::Value;

/// A reference to a heap object: its byte offset into the space that
/// currently owns it.
///
/// `ObjRef` by itself does not say *which* space it lives in — that is
/// always determined by context (the active from-space, except while a
/// collection in progress is populating to-space). This mirrors the
/// source's convention of a bare pointer whose space is implied by which
/// half of the heap bracket it falls into, but without the pointer-range
/// test: forwarding is tracked explicitly in the header (see
/// [`crate::collector`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef(pub(crate) u32);

impl ObjRef {
    pub fn offset(&self) -> usize {
        self.0 as usize
    }

    /// Reconstructs an `ObjRef` from a raw offset, e.g. one that crossed
    /// an FFI boundary as a bare `u32`. The caller is responsible for the
    /// offset actually naming a live object in whichever space is current.
    pub fn from_offset(offset: u32) -> Self {
        ObjRef(offset)
    }
}

/// Fixed-size object header stored immediately before an object's fields.
///
/// | field        | purpose                                              |
/// |--------------|-------------------------------------------------------|
/// | `num_fields` | field count, `0..=255` (one byte wide)                |
/// | `forwarded`  | `None` until copied during a collection; then `Some`  |
///
/// Unlike the source's address-range "is this pointer already in to-space"
/// test, `forwarded` is an explicit field written at copy time — see the
/// open question in `SPEC_FULL.md` §4.2. This is the only collector-facing
/// metadata an object carries; there are no mark bits because a semi-space
/// collector does not need a separate mark phase.
#[repr(C)]
struct RawHeader {
    num_fields: u32,
    /// `u32::MAX` means "not forwarded"; otherwise the to-space offset.
    forwarded: u32,
}

const NOT_FORWARDED: u32 = u32::MAX;

pub(crate) const HEADER_SIZE: usize = std::mem::size_of::<RawHeader>();

/// Total size in bytes of an object with `num_fields` fields, header
/// included.
pub(crate) fn object_size(num_fields: u8) -> usize {
    HEADER_SIZE + num_fields as usize * std::mem::size_of::<Value>()
}

/// # Safety
/// `buf[offset..]` must hold at least `object_size(num_fields)` writable
/// bytes, correctly aligned for `RawHeader` and `Value`.
pub(crate) unsafe fn init_header(buf: &mut [u8], offset: usize, num_fields: u8) {
    let header = buf.as_mut_ptr().add(offset).cast::<RawHeader>();
    header.write(RawHeader {
        num_fields: u32::from(num_fields),
        forwarded: NOT_FORWARDED,
    });
    let fields = buf.as_mut_ptr().add(offset + HEADER_SIZE).cast::<Value>();
    for i in 0..num_fields as usize {
        fields.add(i).write(Value::Int(0));
    }
}

/// # Safety
/// `buf[offset..]` must contain a previously-initialized header.
pub(crate) unsafe fn read_num_fields(buf: &[u8], offset: usize) -> u8 {
    let header = buf.as_ptr().add(offset).cast::<RawHeader>();
    (*header).num_fields as u8
}

/// # Safety
/// `buf[offset..]` must contain a previously-initialized header.
pub(crate) unsafe fn read_forwarded(buf: &[u8], offset: usize) -> Option<u32> {
    let header = buf.as_ptr().add(offset).cast::<RawHeader>();
    let target = (*header).forwarded;
    if target == NOT_FORWARDED {
        None
    } else {
        Some(target)
    }
}

/// # Safety
/// `buf[offset..]` must contain a previously-initialized header.
pub(crate) unsafe fn set_forwarded(buf: &mut [u8], offset: usize, target: u32) {
    let header = buf.as_mut_ptr().add(offset).cast::<RawHeader>();
    (*header).forwarded = target;
}

/// # Safety
/// `buf[offset..]` must hold an initialized object with `index` in bounds.
pub(crate) unsafe fn read_field(buf: &[u8], offset: usize, index: u8) -> Value {
    let fields = buf
        .as_ptr()
        .add(offset + HEADER_SIZE)
        .cast::<Value>();
    fields.add(index as usize).read()
}

/// # Safety
/// `buf[offset..]` must hold an initialized object with `index` in bounds.
pub(crate) unsafe fn write_field(buf: &mut [u8], offset: usize, index: u8, value: Value) {
    let fields = buf
        .as_mut_ptr()
        .add(offset + HEADER_SIZE)
        .cast::<Value>();
    fields.add(index as usize).write(value);
}

/// Copies an entire object (header + fields) from one buffer to another.
///
/// # Safety
/// `src[src_off..]` must hold a fully-initialized object of `object_size
/// (num_fields)` bytes; `dst[dst_off..]` must have room for the same.
pub(crate) unsafe fn copy_object(
    src: &[u8],
    src_off: usize,
    dst: &mut [u8],
    dst_off: usize,
    num_fields: u8,
) {
    let size = object_size(num_fields);
    std::ptr::copy_nonoverlapping(
        src.as_ptr().add(src_off),
        dst.as_mut_ptr().add(dst_off),
        size,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip() {
        let mut buf = vec![0u8; 256];
        unsafe {
            init_header(&mut buf, 0, 3);
            assert_eq!(read_num_fields(&buf, 0), 3);
            assert_eq!(read_forwarded(&buf, 0), None);
            set_forwarded(&mut buf, 0, 128);
            assert_eq!(read_forwarded(&buf, 0), Some(128));
        }
    }

    #[test]
    fn field_roundtrip() {
        let mut buf = vec![0u8; 256];
        unsafe {
            init_header(&mut buf, 0, 2);
            write_field(&mut buf, 0, 0, Value::Int(7));
            write_field(&mut buf, 0, 1, Value::Bool(true));
            assert_eq!(read_field(&buf, 0, 0), Value::Int(7));
            assert_eq!(read_field(&buf, 0, 1), Value::Bool(true));
        }
    }
}
