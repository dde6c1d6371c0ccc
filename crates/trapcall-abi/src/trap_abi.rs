//! ABI layer for the request wrapper itself.

use std::ffi::c_int;

use trapcall_core::config;

/// Issue the configured request with `(arg1, arg2, arg3)`.
///
/// Returns the raw result, or `-1` with the configured slot set. A null
/// `arg2` is rejected with `EFAULT`, and an unresolvable configuration with
/// `EINVAL`, before anything reaches the kernel.
#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn trapcall_invoke(arg1: c_int, arg2: *mut c_int, arg3: c_int) -> c_int {
    // SAFETY: a non-null arg2 is a caller-owned int for the duration of the call.
    let Some(target) = (unsafe { arg2.as_mut() }) else {
        config::current_scope().record(libc::EFAULT);
        return -1;
    };
    // SAFETY: the integrator chose the configured request for this entrypoint.
    unsafe { trapcall_core::invoke(arg1, target, arg3) }
}

/// No legacy trap on this target: every call fails with `ENOSYS`.
#[cfg(not(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64"))))]
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn trapcall_invoke(_arg1: c_int, _arg2: *mut c_int, _arg3: c_int) -> c_int {
    config::current_scope().record(libc::ENOSYS);
    -1
}
