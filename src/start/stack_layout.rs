//! Typed view of the initial process stack image.
//!
//! The kernel leaves this at the entry stack pointer:
//!
//! ```text
//! [argc][argv[0]..argv[argc-1]][NULL][envp[0]..][NULL][auxv pairs..][AT_NULL, 0]
//! ```
//!
//! [`StackLayout::parse`] is the only place that walks the raw words. Every
//! other part of startup works with the fields it returns.

use core::ffi::{c_char, c_int, CStr};

use super::{
    auxiliary_vector::{AuxiliaryVector, AuxiliaryVectorItem, AuxiliaryVectorIter},
    environment_variables::EnvironmentIter,
};

/// Only [`StackLayout::parse`] builds one, so its safety contract covers
/// every later read through these pointers. Safe code cannot forge one:
///
/// ```compile_fail
/// use rustcrt::StackLayout;
///
/// let layout = StackLayout {
///     argc: 0,
///     argv: core::ptr::null_mut(),
///     envp: core::ptr::null_mut(),
///     auxv: core::ptr::null(),
/// };
/// ```
#[derive(Clone, Copy, Debug)]
pub struct StackLayout {
    argc: usize,
    argv: *mut *mut c_char,
    envp: *mut *mut c_char,
    auxv: *const AuxiliaryVectorItem,
}

impl StackLayout {
    /// Derives `argc`, `argv`, `envp` and the auxiliary vector base from the
    /// pointer handed to the process entry point. Nothing is copied.
    ///
    /// # Safety
    ///
    /// `elf_data` must point at a well-formed stack image. A missing argument
    /// or environment terminator is not detected.
    pub unsafe fn parse(elf_data: *mut usize) -> Self {
        unsafe {
            let argc = *elf_data;
            let argv = elf_data.add(1) as *mut *mut c_char;
            let envp = argv.add(argc + 1);

            // The auxiliary vector starts right after the null ending envp.
            let auxv = AuxiliaryVectorIter::from_env_pointer(envp as *const *const u8).into_inner();

            Self {
                argc,
                argv,
                envp,
                auxv,
            }
        }
    }

    pub fn argc(&self) -> usize {
        self.argc
    }

    pub fn argv(&self) -> *mut *mut c_char {
        self.argv
    }

    pub fn envp(&self) -> *mut *mut c_char {
        self.envp
    }

    pub fn auxv(&self) -> *const AuxiliaryVectorItem {
        self.auxv
    }

    /// `argc` narrowed to the C `int` handed to the program entry.
    pub fn arg_count(&self) -> c_int {
        self.argc as c_int
    }

    pub fn auxiliary_vector(&self) -> AuxiliaryVector {
        unsafe { AuxiliaryVector::new(self.auxv) }
    }

    pub fn arguments(&self) -> ArgumentIter {
        ArgumentIter {
            next: self.argv as *const *const c_char,
            remaining: self.argc,
        }
    }

    pub fn environment_variables(&self) -> EnvironmentIter {
        unsafe { EnvironmentIter::new(self.envp as *const *const c_char) }
    }

    /// Number of environment entries before the terminator.
    pub fn environment_len(&self) -> usize {
        self.environment_variables().count()
    }
}

/// Iterates the `argc` strings of `argv`.
#[derive(Clone, Copy)]
pub struct ArgumentIter {
    next: *const *const c_char,
    remaining: usize,
}

impl Iterator for ArgumentIter {
    type Item = &'static CStr;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let argument = unsafe { CStr::from_ptr(*self.next) };
        self.next = unsafe { self.next.add(1) };
        self.remaining -= 1;

        Some(argument)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ArgumentIter {}
