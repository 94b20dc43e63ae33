//! Error Module - Pico VM Error Types
//!
//! Every fatal condition the engine can hit, grouped the way §7 of the
//! design groups them: loader, link (native resolution), execution, and
//! memory errors. There is no recoverable path once one of these is
//! constructed — the caller (ultimately `pico-cli`) prints it and exits
//! non-zero.

use thiserror::Error;

/// Top-level error type for `pico-vm`.
#[derive(Debug, Error)]
pub enum VmError {
    #[error("loader error: {0}")]
    Loader(#[from] LoaderError),

    #[error("native registry error: {0}")]
    Native(#[from] NativeError),

    #[error(transparent)]
    Gc(#[from] pico_gc::GcError),

    #[error("execution error: {0}")]
    Execution(#[from] ExecError),
}

/// Errors raised while parsing a `.pbc` file (§6.1).
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("bytecode file not found: {0}")]
    NotFound(String),

    #[error("bytecode file must end in .pbc, got: {0}")]
    WrongExtension(String),

    #[error("truncated bytecode at byte offset {offset}: expected {needed} more byte(s)")]
    Truncated { offset: usize, needed: usize },

    #[error("bad magic number at offset 0: expected \"PEXB\", found {found:?}")]
    BadMagic { found: [u8; 4] },

    #[error("invalid constant tag {tag:#04x} at offset {offset}")]
    InvalidConstantTag { tag: u8, offset: usize },

    #[error("main function index {index} is out of range (table has {count} function(s))")]
    MainIndexOutOfRange { index: u16, count: usize },

    #[error("function table declares {declared} function(s) but slot {index} was never written")]
    UnfilledFunctionSlot { index: usize, declared: usize },

    #[error("function placement slot {index} is out of range (table declares {declared} function(s))")]
    FunctionSlotOutOfRange { index: usize, declared: usize },

    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised resolving or invoking a native function (§4.5, §7 "link
/// errors").
#[derive(Debug, Error)]
pub enum NativeError {
    #[error("call to unregistered native function \"{0}\"")]
    NotRegistered(String),

    #[error("native function \"{name}\" already registered")]
    AlreadyRegistered { name: String },

    #[error("native function \"{name}\" is {found}, but {expected} was called")]
    KindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Fatal execution errors raised by the interpreter's dispatch loop.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("unknown or reserved opcode {opcode:#04x} at ip {ip} in function {function}")]
    UnknownOpcode {
        opcode: u8,
        ip: usize,
        function: String,
    },

    #[error("operand stack overflow: attempted to exceed the {limit}-slot limit")]
    StackOverflow { limit: usize },

    #[error("operand stack underflow: attempted to pop below frame base")]
    StackUnderflow,

    #[error("frame stack overflow: attempted to exceed the {limit}-frame limit")]
    FrameOverflow { limit: usize },

    #[error("call to function index {index} which does not exist ({count} function(s) loaded)")]
    FunctionIndexOutOfRange { index: u16, count: usize },

    #[error(
        "call requires {arity} argument(s) but only {available} value(s) sit above the frame base"
    )]
    ArityMismatch { arity: usize, available: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("constant index {index} out of range ({count} constant(s) loaded)")]
    ConstantIndexOutOfRange { index: u16, count: usize },

    #[error("constant {index} is not a string")]
    ConstantNotString { index: u16 },

    #[error("local slot {index} out of range ({count} local(s) in this frame)")]
    LocalIndexOutOfRange { index: u16, count: usize },

    #[error("expected a value of kind {expected} on the operand stack, found {found}")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },
}

/// Result type alias for `pico-vm` operations.
pub type Result<T> = std::result::Result<T, VmError>;
