//! Raw Linux system calls for aarch64.
//!
//! Nothing here touches libc: startup code calls these before the C runtime
//! has finished initializing.

use core::arch::asm;

pub mod exit;
pub mod mmap;

#[inline(always)]
pub(crate) unsafe fn syscall3(number: usize, arg0: usize, arg1: usize, arg2: usize) -> isize {
    let rc: isize;
    unsafe {
        asm!(
            "svc 0",
            in("x8") number,
            inlateout("x0") arg0 => rc,
            in("x1") arg1,
            in("x2") arg2,
            options(nostack),
        );
    }
    rc
}

#[inline(always)]
pub(crate) unsafe fn syscall6(
    number: usize,
    arg0: usize,
    arg1: usize,
    arg2: usize,
    arg3: usize,
    arg4: usize,
    arg5: usize,
) -> isize {
    let rc: isize;
    unsafe {
        asm!(
            "svc 0",
            in("x8") number,
            inlateout("x0") arg0 => rc,
            in("x1") arg1,
            in("x2") arg2,
            in("x3") arg3,
            in("x4") arg4,
            in("x5") arg5,
            options(nostack),
        );
    }
    rc
}

#[inline(always)]
pub(crate) unsafe fn syscall1_noreturn(number: usize, arg0: usize) -> ! {
    unsafe {
        asm!(
            "svc 0",
            in("x8") number,
            in("x0") arg0,
            options(noreturn, nostack),
        );
    }
}
