//! C ABI entry for static executables linked against a C runtime.
//!
//! The link-time startup stub jumps here with the kernel's stack pointer and
//! the structor tables; the runtime pieces startup delegates to are bound as
//! plain C symbols.

use core::{
    ffi::{c_int, c_void},
    ptr::null_mut,
};

use crate::{
    runtime::{AtExitCallback, StartupRuntime},
    start::{libc_init, OnExit, ProgramEntry, Structors},
};

unsafe extern "C" {
    fn __libc_init_tls(elfdata: *mut c_void);
    fn __libc_init_common(elfdata: *mut usize);
    // <https://refspecs.linuxbase.org/LSB_3.1.0/LSB-generic/LSB-generic/baselib---cxa-atexit.html>
    fn __cxa_atexit(func: AtExitCallback, arg: *mut c_void, dso_handle: *mut c_void) -> c_int;
    fn exit(status: c_int) -> !;
}

/// [`StartupRuntime`] backed by the C runtime's own symbols.
pub struct CRuntime;

impl StartupRuntime for CRuntime {
    unsafe fn init_tls(&mut self) {
        unsafe { __libc_init_tls(null_mut()) }
    }

    unsafe fn init_common(&mut self, elf_data: *mut usize) {
        unsafe { __libc_init_common(elf_data) }
    }

    unsafe fn register_at_exit(&mut self, callback: AtExitCallback, context: *mut c_void) {
        let rc = unsafe { __cxa_atexit(callback, context, null_mut()) };
        if rc != 0 {
            log::warn!("__cxa_atexit failed with {rc}; finalizers will not run");
        }
    }

    fn exit(&mut self, status: c_int) -> ! {
        unsafe { exit(status) }
    }
}

/// Program startup for static executables.
///
/// # Safety
///
/// Only the startup stub may call this, once, with the kernel-built stack
/// image in `elfdata`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __libc_init(
    elfdata: *mut usize,
    onexit: Option<OnExit>,
    slingshot: ProgramEntry,
    structors: *const Structors,
) -> ! {
    unsafe { libc_init(&mut CRuntime, elfdata, onexit, slingshot, &*structors) }
}
