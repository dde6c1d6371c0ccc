//! # trapcall-core
//!
//! Issue a single operating-system request through the legacy x86 software
//! interrupt (`int 0x80`) and translate the raw result into the conventional
//! `-1` + errno contract.
//!
//! ```text
//! caller -> Syscaller::invoke -> Trap (kernel or scripted) -> raw i32
//!        <- translate(raw, band, slot) <-----------------------'
//! ```
//!
//! Only [`syscall::raw`] is architecture specific. Everything else (result
//! translation, error slots, configuration and the scripted mechanism) builds
//! on any target.

#![deny(unsafe_code)]

pub mod config;
pub mod errno;
pub mod syscall;
pub mod wrapper;

pub use config::{ConfigError, SlotScope, WrapperConfig};
pub use errno::{ErrnoSlot, ProcessErrno, ThreadErrno};
pub use syscall::{ErrnoBand, decode_raw, translate};
pub use wrapper::{ScriptedTrap, Syscaller, Trap};

#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
pub use wrapper::KernelTrap;

/// Issue the configured request through `trap` and record failures in the
/// configured slot.
///
/// The request id, errno band and slot scope come from [`config::current`].
/// Returns the raw result, or `-1` when it falls in the errno band. When the
/// configuration cannot be resolved, `EINVAL` is recorded and `-1` returned
/// without calling `trap`.
pub fn invoke_via<T: Trap>(trap: T, arg1: i32, arg2: &mut i32, arg3: i32) -> i32 {
    let cfg = match config::current() {
        Ok(cfg) => cfg,
        Err(_) => {
            config::current_scope().record(errno::EINVAL);
            return -1;
        }
    };
    let mut syscaller = Syscaller::new(trap, &cfg);
    match cfg.scope {
        SlotScope::Thread => syscaller.invoke_with(&mut ThreadErrno, arg1, arg2, arg3),
        SlotScope::Process => syscaller.invoke_with(&mut ProcessErrno, arg1, arg2, arg3),
    }
}

/// [`invoke_via`] the kernel trap.
///
/// # Safety
///
/// The configured request must be sound to execute with an arbitrary integer,
/// the address of `arg2`, and an arbitrary integer as its three arguments.
#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
#[allow(unsafe_code)]
pub unsafe fn invoke(arg1: i32, arg2: &mut i32, arg3: i32) -> i32 {
    // SAFETY: caller vouches for the configured request.
    let trap = unsafe { KernelTrap::new() };
    invoke_via(trap, arg1, arg2, arg3)
}
