//! Error slots and error-code constants.
//!
//! A failing request records its positive error code in an [`ErrnoSlot`].
//! Slots are written only on failure and never cleared by this crate.
//!
//! Three slot flavours exist:
//! - [`ThreadErrno`]: one slot per thread (the default).
//! - [`ProcessErrno`]: one slot for the whole process. Concurrent failures
//!   race on it and the last writer wins.
//! - a plain `i32` owned by the caller, passed as an out-parameter.

use std::cell::Cell;
use std::sync::atomic::{AtomicI32, Ordering};

thread_local! {
    static ERRNO: Cell<i32> = const { Cell::new(0) };
}

static PROCESS_ERRNO: AtomicI32 = AtomicI32::new(0);

/// Well-known errno constants (Linux numbering).
pub const EPERM: i32 = 1;
pub const ENOENT: i32 = 2;
pub const ESRCH: i32 = 3;
pub const EINTR: i32 = 4;
pub const EIO: i32 = 5;
pub const ENXIO: i32 = 6;
pub const E2BIG: i32 = 7;
pub const ENOEXEC: i32 = 8;
pub const EBADF: i32 = 9;
pub const ECHILD: i32 = 10;
pub const EAGAIN: i32 = 11;
pub const ENOMEM: i32 = 12;
pub const EACCES: i32 = 13;
pub const EFAULT: i32 = 14;
pub const EBUSY: i32 = 16;
pub const EEXIST: i32 = 17;
pub const ENODEV: i32 = 19;
pub const EINVAL: i32 = 22;
pub const ENOSPC: i32 = 28;
pub const ERANGE: i32 = 34;
pub const ENOSYS: i32 = 38;
pub const EOVERFLOW: i32 = 75;
pub const ENOTRECOVERABLE: i32 = 131;

/// Somewhere to record the error code of a failed request.
pub trait ErrnoSlot {
    /// Current slot value.
    fn get(&self) -> i32;

    /// Overwrite the slot.
    fn set(&mut self, value: i32);
}

/// The calling thread's slot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ThreadErrno;

impl ErrnoSlot for ThreadErrno {
    fn get(&self) -> i32 {
        get_errno()
    }

    fn set(&mut self, value: i32) {
        set_errno(value);
    }
}

/// The single process-wide slot.
///
/// No synchronization beyond atomicity of the store: two threads failing at
/// once both write, and a later reader sees whichever store landed last.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessErrno;

impl ErrnoSlot for ProcessErrno {
    fn get(&self) -> i32 {
        PROCESS_ERRNO.load(Ordering::Relaxed)
    }

    fn set(&mut self, value: i32) {
        PROCESS_ERRNO.store(value, Ordering::Relaxed);
    }
}

impl ErrnoSlot for i32 {
    fn get(&self) -> i32 {
        *self
    }

    fn set(&mut self, value: i32) {
        *self = value;
    }
}

impl<S: ErrnoSlot + ?Sized> ErrnoSlot for &mut S {
    fn get(&self) -> i32 {
        (**self).get()
    }

    fn set(&mut self, value: i32) {
        (**self).set(value);
    }
}

/// Returns the current thread-local errno value.
pub fn get_errno() -> i32 {
    ERRNO.get()
}

/// Sets the current thread-local errno value.
pub fn set_errno(value: i32) {
    ERRNO.set(value);
}

/// Address of the calling thread's slot, valid for the life of the thread.
pub fn errno_location() -> *mut i32 {
    ERRNO.with(Cell::as_ptr)
}

/// Returns the process-wide errno value.
pub fn get_process_errno() -> i32 {
    PROCESS_ERRNO.load(Ordering::Relaxed)
}

/// Short description of an error code, for logs and reports.
#[must_use]
pub fn describe(code: i32) -> &'static str {
    match code {
        0 => "Success",
        EPERM => "Operation not permitted",
        ENOENT => "No such file or directory",
        ESRCH => "No such process",
        EINTR => "Interrupted system call",
        EIO => "Input/output error",
        ENXIO => "No such device or address",
        E2BIG => "Argument list too long",
        ENOEXEC => "Exec format error",
        EBADF => "Bad file descriptor",
        ECHILD => "No child processes",
        EAGAIN => "Resource temporarily unavailable",
        ENOMEM => "Cannot allocate memory",
        EACCES => "Permission denied",
        EFAULT => "Bad address",
        EBUSY => "Device or resource busy",
        EEXIST => "File exists",
        ENODEV => "No such device",
        EINVAL => "Invalid argument",
        ENOSPC => "No space left on device",
        ERANGE => "Numerical result out of range",
        ENOSYS => "Function not implemented",
        EOVERFLOW => "Value too large for defined data type",
        ENOTRECOVERABLE => "State not recoverable",
        _ => "Unknown error",
    }
}
