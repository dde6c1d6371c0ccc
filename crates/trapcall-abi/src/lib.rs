// Every export takes raw values from C callers; per-function safety docs
// would repeat the same contract.
#![allow(clippy::missing_safety_doc)]
//! # trapcall-abi
//!
//! `extern "C"` entrypoints for the trapcall wrapper, so C code can call it
//! with the classic signature:
//!
//! ```text
//! int trapcall_invoke(int arg1, int *arg2, int arg3);
//! int *trapcall_errno_location(void);
//! ```
//!
//! Configuration (request id, errno band, slot scope) is taken from
//! `trapcall_core::config::current()`.

pub mod errno_abi;
pub mod trap_abi;
