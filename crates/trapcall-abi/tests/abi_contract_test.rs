//! Integration test: C ABI contract
//!
//! Checks the errno accessors and the argument rejection path of
//! `trapcall_invoke`, none of which reach the kernel.
//!
//! Run: cargo test -p trapcall-abi --test abi_contract_test

#![allow(unsafe_code)]

use trapcall_abi::errno_abi::{trapcall_errno_location, trapcall_process_errno};
use trapcall_abi::trap_abi::trapcall_invoke;
use trapcall_core::config::{self, WrapperConfig};
use trapcall_core::{SlotScope, errno};

#[test]
fn errno_location_is_per_thread() {
    let here = unsafe { trapcall_errno_location() };
    unsafe { *here = 0 };

    let there = std::thread::spawn(|| {
        let p = unsafe { trapcall_errno_location() };
        unsafe { *p = libc::EINVAL };
        p as usize
    })
    .join()
    .unwrap();

    assert_ne!(here as usize, there);
    assert_eq!(unsafe { *here }, 0);
}

#[test]
fn errno_location_aliases_core_slot() {
    errno::set_errno(libc::EIO);
    let p = unsafe { trapcall_errno_location() };
    assert_eq!(unsafe { *p }, libc::EIO);
    unsafe { *p = libc::EAGAIN };
    assert_eq!(errno::get_errno(), libc::EAGAIN);
}

#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
#[test]
fn null_arg2_is_rejected_in_configured_slot() {
    // Thread scope (the default).
    config::configure(WrapperConfig::default());
    errno::set_errno(0);
    let ret = unsafe { trapcall_invoke(1, std::ptr::null_mut(), 3) };
    assert_eq!(ret, -1);
    assert_eq!(errno::get_errno(), libc::EFAULT);

    // Process scope.
    config::configure(WrapperConfig::default().with_scope(SlotScope::Process));
    errno::set_errno(0);
    let ret = unsafe { trapcall_invoke(1, std::ptr::null_mut(), 3) };
    assert_eq!(ret, -1);
    assert_eq!(unsafe { trapcall_process_errno() }, libc::EFAULT);
    assert_eq!(errno::get_errno(), 0, "thread slot untouched in process scope");

    config::reset();
}
