//! Error Module - Pico GC Error Types
//!
//! Defines all error types used by the semi-space collector.

use thiserror::Error;

/// Main error type for all `pico-gc` operations.
#[derive(Debug, Error)]
pub enum GcError {
    #[error(
        "out of memory: could not satisfy a {requested}-byte allocation even after \
         collection and heap doubling (heap size {heap_size} bytes)"
    )]
    HeapExhausted { requested: usize, heap_size: usize },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("object field index {index} out of bounds for object with {num_fields} fields")]
    FieldOutOfBounds { index: u8, num_fields: u8 },

    #[error("object has {num_fields} fields, which exceeds the 255-field limit")]
    TooManyFields { num_fields: usize },
}

/// Result type alias for `pico-gc` operations.
pub type Result<T> = std::result::Result<T, GcError>;
