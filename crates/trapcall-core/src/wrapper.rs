//! The three-argument request wrapper.
//!
//! [`Syscaller`] pairs a [`Trap`] (the mechanism that actually reaches the
//! operating system) with the request id and errno band of a
//! [`WrapperConfig`], and applies [`translate`] to whatever comes back.

use std::collections::VecDeque;

use crate::config::WrapperConfig;
use crate::errno::{ErrnoSlot, ThreadErrno};
use crate::syscall::{ErrnoBand, translate};

/// A mechanism that executes one request and returns its raw result.
pub trait Trap {
    /// Execute `request` with three arguments. `arg2` may be written by the
    /// request itself.
    fn trap(&mut self, request: u32, arg1: i32, arg2: &mut i32, arg3: i32) -> i32;
}

impl<T: Trap + ?Sized> Trap for &mut T {
    fn trap(&mut self, request: u32, arg1: i32, arg2: &mut i32, arg3: i32) -> i32 {
        (**self).trap(request, arg1, arg2, arg3)
    }
}

/// The real `int 0x80` trap.
#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
#[derive(Debug)]
pub struct KernelTrap {
    _private: (),
}

#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
impl KernelTrap {
    /// # Safety
    ///
    /// Every request issued through this trap must be sound to execute with
    /// an arbitrary integer, the address of a live `i32`, and an arbitrary
    /// integer as its arguments. Requests such as `exit`, or ones that remap
    /// memory, are not.
    #[allow(unsafe_code)]
    #[must_use]
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
impl Trap for KernelTrap {
    #[allow(unsafe_code)]
    fn trap(&mut self, request: u32, arg1: i32, arg2: &mut i32, arg3: i32) -> i32 {
        let a2 = arg2 as *mut i32 as usize;
        // SAFETY: the constructor's contract covers the request; a2 is the
        // address of a live, exclusively borrowed i32.
        unsafe {
            crate::syscall::raw::trap3(
                request,
                arg1 as u32 as usize,
                a2,
                arg3 as u32 as usize,
            )
        }
    }
}

/// One request observed by a [`ScriptedTrap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedCall {
    pub request: u32,
    pub arg1: i32,
    pub arg2_before: i32,
    pub arg3: i32,
}

/// One scripted reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub raw: i32,
    /// Value the request stores through `arg2`, if any.
    pub arg2_write: Option<i32>,
}

/// A controlled mechanism that replays queued raw results.
///
/// Once the queue runs dry every further request answers `-ENOSYS`.
#[derive(Debug, Default, Clone)]
pub struct ScriptedTrap {
    replies: VecDeque<Reply>,
    calls: Vec<RecordedCall>,
}

impl ScriptedTrap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply that only returns `raw`.
    #[must_use]
    pub fn returning(mut self, raw: i32) -> Self {
        self.push(Reply { raw, arg2_write: None });
        self
    }

    /// Queue a reply that stores `value` through `arg2` and returns `raw`.
    #[must_use]
    pub fn writing(mut self, raw: i32, value: i32) -> Self {
        self.push(Reply {
            raw,
            arg2_write: Some(value),
        });
        self
    }

    pub fn push(&mut self, reply: Reply) {
        self.replies.push_back(reply);
    }

    /// Requests seen so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.replies.len()
    }
}

impl Trap for ScriptedTrap {
    fn trap(&mut self, request: u32, arg1: i32, arg2: &mut i32, arg3: i32) -> i32 {
        self.calls.push(RecordedCall {
            request,
            arg1,
            arg2_before: *arg2,
            arg3,
        });
        match self.replies.pop_front() {
            Some(reply) => {
                if let Some(value) = reply.arg2_write {
                    *arg2 = value;
                }
                reply.raw
            }
            None => -crate::errno::ENOSYS,
        }
    }
}

/// A configured request wrapper.
#[derive(Debug)]
pub struct Syscaller<T: Trap> {
    trap: T,
    request: u32,
    band: ErrnoBand,
}

impl<T: Trap> Syscaller<T> {
    #[must_use]
    pub fn new(trap: T, config: &WrapperConfig) -> Self {
        Self {
            trap,
            request: config.request,
            band: config.band,
        }
    }

    #[must_use]
    pub fn request(&self) -> u32 {
        self.request
    }

    #[must_use]
    pub fn band(&self) -> ErrnoBand {
        self.band
    }

    #[must_use]
    pub fn trap_ref(&self) -> &T {
        &self.trap
    }

    pub fn into_trap(self) -> T {
        self.trap
    }

    /// Issue the request, recording failures in the calling thread's slot.
    pub fn invoke(&mut self, arg1: i32, arg2: &mut i32, arg3: i32) -> i32 {
        self.invoke_with(&mut ThreadErrno, arg1, arg2, arg3)
    }

    /// Issue the request, recording failures in `slot`.
    ///
    /// Returns the raw result, or `-1` when it falls in the errno band, in
    /// which case `slot` holds the positive error code. `slot` is not touched
    /// on success.
    pub fn invoke_with<S: ErrnoSlot + ?Sized>(
        &mut self,
        slot: &mut S,
        arg1: i32,
        arg2: &mut i32,
        arg3: i32,
    ) -> i32 {
        let raw = self.trap.trap(self.request, arg1, arg2, arg3);
        translate(raw, self.band, slot)
    }
}
