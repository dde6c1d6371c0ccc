//! ABI layer for the error slots.
//!
//! Thread-scoped callers read `*trapcall_errno_location()`; callers configured
//! for the process-wide slot use `trapcall_process_errno()`.

use std::ffi::c_int;

use trapcall_core::errno;

#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn trapcall_errno_location() -> *mut c_int {
    errno::errno_location()
}

#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn trapcall_process_errno() -> c_int {
    errno::get_process_errno()
}
