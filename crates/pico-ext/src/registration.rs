//! The two `extern "C"` entry points an extension library links against
//! to populate the native registry from inside its `pico_lib_Init` hook
//! (§4.5, §6.2).
//!
//! These are the Rust side of "the registry functions it calls accept:
//! environment, name (copied), arity, and a function pointer matching the
//! kind." A library never touches [`pico_vm::Environment`] directly — it
//! only ever holds the opaque `*mut c_void` `pico_lib_Init` receives and
//! passes straight back through one of these two calls.

use std::ffi::{c_char, c_void, CStr};

use pico_vm::native::{ValueReturningNative, VoidReturningNative};
use pico_vm::Environment;

/// Status codes returned across the FFI boundary; a library is not
/// expected to do anything with a nonzero result beyond logging it, since
/// the contract gives natives no recovery path either (§7).
pub const PICO_REGISTER_OK: i32 = 0;
pub const PICO_REGISTER_INVALID_NAME: i32 = -1;
pub const PICO_REGISTER_DUPLICATE: i32 = -2;

/// # Safety
/// `env` must be a live `*mut Environment` handed to this library's
/// `pico_lib_Init` by the extension loader. `name` must point to a
/// NUL-terminated, valid UTF-8 C string for the duration of this call; its
/// bytes are copied before this function returns.
#[no_mangle]
pub unsafe extern "C" fn pico_register_native_value(
    env: *mut c_void,
    name: *const c_char,
    arity: u16,
    func: ValueReturningNative,
) -> i32 {
    let env = &mut *env.cast::<Environment>();
    let name = match CStr::from_ptr(name).to_str() {
        Ok(s) => s,
        Err(_) => return PICO_REGISTER_INVALID_NAME,
    };
    match env.registry.register_value(name, arity, func) {
        Ok(()) => PICO_REGISTER_OK,
        Err(_) => PICO_REGISTER_DUPLICATE,
    }
}

/// # Safety
/// See [`pico_register_native_value`].
#[no_mangle]
pub unsafe extern "C" fn pico_register_native_void(
    env: *mut c_void,
    name: *const c_char,
    arity: u16,
    func: VoidReturningNative,
) -> i32 {
    let env = &mut *env.cast::<Environment>();
    let name = match CStr::from_ptr(name).to_str() {
        Ok(s) => s,
        Err(_) => return PICO_REGISTER_INVALID_NAME,
    };
    match env.registry.register_void(name, arity, func) {
        Ok(()) => PICO_REGISTER_OK,
        Err(_) => PICO_REGISTER_DUPLICATE,
    }
}
