//! The collaborators startup hands work to.
//!
//! TLS slot allocation, libc subsystem setup, at-exit bookkeeping and process
//! exit are owned by the surrounding runtime. [`StartupRuntime`] is the seam:
//! `c_api::CRuntime` binds it to a C runtime, [`RawRuntime`] to raw
//! syscalls, and tests to recorders.

use core::ffi::{c_int, c_void};

use smallvec::SmallVec;

use crate::{
    libc::errno::Errno,
    page_size::PageRange,
    start::StartupPhase,
    syscall::{
        exit::exit_group,
        mmap::{mprotect, PROT_READ},
    },
};

/// Zero-argument exit callback with an opaque context, `__cxa_atexit` style.
pub type AtExitCallback = unsafe extern "C" fn(*mut c_void);

pub trait StartupRuntime {
    /// Observes startup progress. Called right before each phase runs.
    fn phase_started(&mut self, _phase: StartupPhase) {}

    /// Makes thread-local storage usable. Runs before any other startup code.
    ///
    /// # Safety
    ///
    /// Called exactly once, first.
    unsafe fn init_tls(&mut self);

    /// Generic runtime initialization: heap, signal defaults, stdio.
    ///
    /// # Safety
    ///
    /// `elf_data` is the raw initial stack image.
    unsafe fn init_common(&mut self, elf_data: *mut usize);

    /// Arranges for `callback(context)` to run on normal process exit.
    ///
    /// # Safety
    ///
    /// `context` must stay valid until the callback runs.
    unsafe fn register_at_exit(&mut self, callback: AtExitCallback, context: *mut c_void);

    /// Asks the OS to make `range` read-only, keeping read access.
    ///
    /// # Safety
    ///
    /// Nothing may write to `range` afterwards.
    unsafe fn protect_read_only(&mut self, range: PageRange) -> Result<(), Errno> {
        unsafe { mprotect(range.as_mut_ptr(), range.len(), PROT_READ) }
    }

    /// Ends the process with `status`, running registered exit callbacks.
    fn exit(&mut self, status: c_int) -> !;
}

/// At-exit registrations [`RawRuntime`] holds without allocating.
pub const AT_EXIT_INLINE: usize = 8;

/// A runtime for images that carry no C library.
///
/// TLS and common init are left to the program; exit callbacks are kept in
/// an inline list and run newest-first before `exit_group`.
///
/// The first [`AT_EXIT_INLINE`] registrations need no heap. Registering more
/// than that moves the list onto the global allocator, so an image without a
/// working allocator must stay within the inline capacity.
pub struct RawRuntime {
    at_exit: SmallVec<[(AtExitCallback, *mut c_void); AT_EXIT_INLINE]>,
}

impl RawRuntime {
    pub const fn new() -> Self {
        Self {
            at_exit: SmallVec::new_const(),
        }
    }

    pub fn pending_at_exit(&self) -> usize {
        self.at_exit.len()
    }

    /// Whether the at-exit list has outgrown its inline storage.
    pub fn at_exit_spilled(&self) -> bool {
        self.at_exit.spilled()
    }

    /// Runs and forgets every registered callback, newest first. Callbacks
    /// registered while this runs are picked up too.
    ///
    /// # Safety
    ///
    /// Runs arbitrary foreign code.
    pub unsafe fn run_at_exit(&mut self) {
        while let Some((callback, context)) = self.at_exit.pop() {
            log::trace!("Calling at-exit callback `{:#x}`", callback as usize);
            unsafe { callback(context) };
        }
    }
}

impl Default for RawRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl StartupRuntime for RawRuntime {
    unsafe fn init_tls(&mut self) {}

    unsafe fn init_common(&mut self, _elf_data: *mut usize) {}

    unsafe fn register_at_exit(&mut self, callback: AtExitCallback, context: *mut c_void) {
        self.at_exit.push((callback, context));
    }

    fn exit(&mut self, status: c_int) -> ! {
        unsafe { self.run_at_exit() };
        exit_group(status)
    }
}
