//! Raw legacy x86 Linux trap (`int 0x80`).
//!
//! # ABI
//!
//! ```text
//! request number → eax
//! arg1           → ebx
//! arg2           → ecx
//! arg3           → edx
//! return         → eax
//! ```
//!
//! The argument registers are in/out: the kernel may hand them back changed,
//! so they are declared as outputs and discarded. `ebx`/`rbx` is reserved by
//! the compiler and cannot be named as an operand; the first argument is
//! exchanged into it around the trap instead.
//!
//! No `nomem`, `readonly` or `preserves_flags` on these blocks: memory may be
//! read or written by the request, and the flags do not survive the trap.

use core::arch::asm;

/// Issue `int 0x80` with three arguments and return the low 32 bits of `eax`.
///
/// On x86_64 this goes through the IA-32 compat entry, which only sees the
/// low 32 bits of each argument register.
///
/// # Safety
///
/// The caller must supply a request number whose semantics are sound for the
/// given argument values (including any address passed in `a2`).
#[cfg(target_arch = "x86_64")]
#[inline]
pub unsafe fn trap3(nr: u32, a1: usize, a2: usize, a3: usize) -> i32 {
    let ret: usize;
    // SAFETY: Inline asm issues the legacy trap. Caller guarantees validity.
    unsafe {
        asm!(
            "xchg {a1}, rbx",
            "int 0x80",
            "xchg {a1}, rbx",
            a1 = inout(reg) a1 => _,
            inlateout("rax") nr as usize => ret,
            inout("rcx") a2 => _,
            inout("rdx") a3 => _,
            lateout("r8") _,
            lateout("r9") _,
            lateout("r10") _,
            lateout("r11") _,
            options(nostack),
        );
    }
    ret as u32 as i32
}

/// Issue `int 0x80` with three arguments and return `eax`.
///
/// # Safety
///
/// The caller must supply a request number whose semantics are sound for the
/// given argument values (including any address passed in `a2`).
#[cfg(target_arch = "x86")]
#[inline]
pub unsafe fn trap3(nr: u32, a1: usize, a2: usize, a3: usize) -> i32 {
    let ret: usize;
    // SAFETY: Inline asm issues the legacy trap. Caller guarantees validity.
    unsafe {
        asm!(
            "xchg {a1}, ebx",
            "int 0x80",
            "xchg {a1}, ebx",
            a1 = inout(reg) a1 => _,
            inlateout("eax") nr as usize => ret,
            inout("ecx") a2 => _,
            inout("edx") a3 => _,
            options(nostack),
        );
    }
    ret as i32
}
