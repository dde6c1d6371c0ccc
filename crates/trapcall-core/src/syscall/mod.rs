//! Legacy x86 request veneer and raw-result translation.
//!
//! The kernel reports failure in-band: a raw result inside a small negative
//! band is `-errno`. Wrappers turn that into `-1` and record `errno` in an
//! [`ErrnoSlot`]; anything else is handed back untouched.
//!
//! # Architecture
//!
//! i386 Linux legacy trap ABI (`int 0x80`):
//! - Request number: `eax`
//! - Arguments: `ebx`, `ecx`, `edx`, `esi`, `edi`, `ebp`
//! - Return: `eax`
//!
//! Only the three-argument form is provided. The raw trap lives in [`raw`]
//! and is compiled only for x86/x86_64 Linux.

#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
#[allow(unsafe_code)]
pub mod raw;

use crate::errno::ErrnoSlot;

// -------------------------------------------------------------------------
// Request number constants (i386 table, reachable through int 0x80)
// -------------------------------------------------------------------------

pub const SYS_EXIT: u32 = 1;
pub const SYS_READ: u32 = 3;
pub const SYS_WRITE: u32 = 4;
pub const SYS_CLOSE: u32 = 6;
pub const SYS_GETPID: u32 = 20;
pub const SYS_IOCTL: u32 = 54;
pub const SYS_INIT_MODULE: u32 = 128;

/// Request issued when nothing else is configured.
pub const DEFAULT_REQUEST: u32 = SYS_INIT_MODULE;

// -------------------------------------------------------------------------
// Error band
// -------------------------------------------------------------------------

/// Largest errno of the legacy wrapper convention.
pub const LEGACY_MAX_ERRNO: i32 = 125;

/// Largest errno the Linux kernel returns (`MAX_ERRNO`).
pub const LINUX_MAX_ERRNO: i32 = 4095;

/// The negative range of raw results that denote failure.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrnoBand {
    /// `-125..=-1`.
    #[default]
    Legacy,
    /// `-4095..=-1`.
    Linux,
}

impl ErrnoBand {
    /// Parse from string (case-insensitive). Unknown values map to `Legacy`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "linux" | "kernel" | "4095" | "max_errno" => Self::Linux,
            _ => Self::Legacy,
        }
    }

    /// Largest error code in the band.
    #[must_use]
    pub const fn max_errno(self) -> i32 {
        match self {
            Self::Legacy => LEGACY_MAX_ERRNO,
            Self::Linux => LINUX_MAX_ERRNO,
        }
    }

    /// True when `raw` encodes a failure.
    #[must_use]
    pub const fn contains(self, raw: i32) -> bool {
        -self.max_errno() <= raw && raw < 0
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Linux => "linux",
        }
    }
}

// -------------------------------------------------------------------------
// Translation
// -------------------------------------------------------------------------

/// Convert a raw request result to `Result<i32, i32>`.
///
/// `Err(code)` carries the positive error code when `raw` is in `band`;
/// every other value, including negatives below the band, is `Ok(raw)`.
#[inline]
pub fn decode_raw(raw: i32, band: ErrnoBand) -> Result<i32, i32> {
    if band.contains(raw) {
        Err(-raw)
    } else {
        Ok(raw)
    }
}

/// Apply the wrapper convention to a raw result.
///
/// Failures write `-raw` into `slot` and return `-1`. Successes return `raw`
/// and leave `slot` alone.
#[inline]
pub fn translate<S: ErrnoSlot + ?Sized>(raw: i32, band: ErrnoBand, slot: &mut S) -> i32 {
    match decode_raw(raw, band) {
        Ok(value) => value,
        Err(code) => {
            slot.set(code);
            -1
        }
    }
}

// -------------------------------------------------------------------------
// Unit tests
// -------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const UNTOUCHED: i32 = 0x5a5a;

    #[test]
    fn decode_success_values() {
        assert_eq!(decode_raw(0, ErrnoBand::Legacy), Ok(0));
        assert_eq!(decode_raw(5, ErrnoBand::Legacy), Ok(5));
        assert_eq!(decode_raw(i32::MAX, ErrnoBand::Legacy), Ok(i32::MAX));
    }

    #[test]
    fn decode_error_values() {
        assert_eq!(decode_raw(-1, ErrnoBand::Legacy), Err(1));
        assert_eq!(decode_raw(-2, ErrnoBand::Legacy), Err(2));
        assert_eq!(decode_raw(-125, ErrnoBand::Legacy), Err(125));
    }

    #[test]
    fn below_legacy_band_passes_through() {
        assert_eq!(decode_raw(-126, ErrnoBand::Legacy), Ok(-126));
        assert_eq!(decode_raw(i32::MIN, ErrnoBand::Legacy), Ok(i32::MIN));
    }

    #[test]
    fn linux_band_edges() {
        assert_eq!(decode_raw(-126, ErrnoBand::Linux), Err(126));
        assert_eq!(decode_raw(-4095, ErrnoBand::Linux), Err(4095));
        assert_eq!(decode_raw(-4096, ErrnoBand::Linux), Ok(-4096));
        assert_eq!(decode_raw(i32::MIN, ErrnoBand::Linux), Ok(i32::MIN));
    }

    #[test]
    fn translate_failure_writes_slot() {
        for raw in [-1, -2, -38, -125] {
            let mut slot = UNTOUCHED;
            assert_eq!(translate(raw, ErrnoBand::Legacy, &mut slot), -1);
            assert_eq!(slot, -raw, "raw {raw}");
        }
    }

    #[test]
    fn translate_success_leaves_slot() {
        for raw in [0, 1, 5, 4096, -126, -4096, i32::MIN] {
            let mut slot = UNTOUCHED;
            assert_eq!(translate(raw, ErrnoBand::Legacy, &mut slot), raw);
            assert_eq!(slot, UNTOUCHED, "raw {raw}");
        }
    }

    #[test]
    fn translate_is_idempotent() {
        let mut first = UNTOUCHED;
        let mut second = UNTOUCHED;
        let a = translate(-9, ErrnoBand::Legacy, &mut first);
        let b = translate(-9, ErrnoBand::Legacy, &mut second);
        assert_eq!((a, first), (b, second));

        let mut slot = UNTOUCHED;
        assert_eq!(translate(-9, ErrnoBand::Legacy, &mut slot), -1);
        assert_eq!(translate(-9, ErrnoBand::Legacy, &mut slot), -1);
        assert_eq!(slot, 9);
    }

    #[test]
    fn band_parsing() {
        assert_eq!(ErrnoBand::from_str_loose("linux"), ErrnoBand::Linux);
        assert_eq!(ErrnoBand::from_str_loose(" KERNEL "), ErrnoBand::Linux);
        assert_eq!(ErrnoBand::from_str_loose("4095"), ErrnoBand::Linux);
        assert_eq!(ErrnoBand::from_str_loose("legacy"), ErrnoBand::Legacy);
        assert_eq!(ErrnoBand::from_str_loose("bogus"), ErrnoBand::Legacy);
        assert_eq!(ErrnoBand::default(), ErrnoBand::Legacy);
    }

    #[test]
    fn request_number_constants() {
        assert_eq!(SYS_EXIT, 1);
        assert_eq!(SYS_WRITE, 4);
        assert_eq!(SYS_GETPID, 20);
        assert_eq!(DEFAULT_REQUEST, 128);
    }
}
