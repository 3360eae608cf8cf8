//! Raw Linux system calls for x86_64.
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
            "syscall",
            inlateout("rax") number => rc,
            in("rdi") arg0,
            in("rsi") arg1,
            in("rdx") arg2,
            lateout("rcx") _,
            lateout("r11") _,
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
            "syscall",
            inlateout("rax") number => rc,
            in("rdi") arg0,
            in("rsi") arg1,
            in("rdx") arg2,
            in("r10") arg3,
            in("r8") arg4,
            in("r9") arg5,
            lateout("rcx") _,
            lateout("r11") _,
            options(nostack),
        );
    }
    rc
}

#[inline(always)]
pub(crate) unsafe fn syscall1_noreturn(number: usize, arg0: usize) -> ! {
    unsafe {
        asm!(
            "syscall",
            in("rax") number,
            in("rdi") arg0,
            options(noreturn, nostack),
        );
    }
}
