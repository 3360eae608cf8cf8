use super::{syscall3, syscall6};
use crate::libc::errno::Errno;

// Protection flags:
pub const PROT_READ: usize = 0x1;
pub const PROT_WRITE: usize = 0x2;

// MAP flags:
pub const MAP_PRIVATE: usize = 0x2;
pub const MAP_ANONYMOUS: usize = 0x20;

pub unsafe fn mmap(
    pointer: *mut u8,
    size: usize,
    protection_flags: usize,
    map_flags: usize,
    file_descriptor: isize,
    file_offset: usize,
) -> Result<*mut u8, Errno> {
    const MMAP: usize = 9;

    let result = unsafe {
        syscall6(
            MMAP,
            pointer as usize,
            size,
            protection_flags,
            map_flags,
            file_descriptor as usize,
            file_offset,
        )
    };
    Errno::from_syscall(result).map(|address| address as *mut u8)
}

#[inline(always)]
pub unsafe fn munmap(pointer: *mut u8, size: usize) -> Result<(), Errno> {
    const MUNMAP: usize = 11;

    let result = unsafe { syscall3(MUNMAP, pointer as usize, size, 0) };
    Errno::from_syscall(result).map(drop)
}

#[inline(always)]
pub unsafe fn mprotect(addr: *mut u8, len: usize, prot: usize) -> Result<(), Errno> {
    const MPROTECT: usize = 10;

    let result = unsafe { syscall3(MPROTECT, addr as usize, len, prot) };
    Errno::from_syscall(result).map(drop)
}
