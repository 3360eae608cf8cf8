//! Static-executable startup: the first runtime code after the kernel's
//! `execve` hands over, and the last before the program's entry function.

use core::ffi::{c_char, c_int, c_void};

use crate::{elf::relro::apply_gnu_relro, runtime::StartupRuntime};
use init_array::{call_array, libc_fini, InitArray};
use stack_layout::StackLayout;

pub mod auxiliary_vector;
pub mod environment_variables;
pub mod init_array;
pub mod stack_layout;

/// The program's entry, `main`-shaped: `(argc, argv, envp) -> status`.
pub type ProgramEntry =
    unsafe extern "C" fn(argc: c_int, argv: *mut *mut c_char, envp: *mut *mut c_char) -> c_int;

/// Legacy exit hook some startup stubs pass along. Never called.
pub type OnExit = unsafe extern "C" fn();

/// The three structor tables collected at link time, in the raw
/// sentinel-prefixed form described in [`init_array`]. Null means absent.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct Structors {
    pub preinit_array: *const usize,
    pub init_array: *const usize,
    pub fini_array: *const usize,
}

impl Structors {
    pub const EMPTY: Self = Self {
        preinit_array: core::ptr::null(),
        init_array: core::ptr::null(),
        fini_array: core::ptr::null(),
    };
}

/// Startup steps, in the only order they may run.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StartupPhase {
    TlsBootstrap = 1,
    CommonInit = 2,
    PreInitArray = 3,
    InitArray = 4,
    ParseStack = 5,
    RegisterFini = 6,
    ApplyRelro = 7,
    CallEntry = 8,
}

impl StartupPhase {
    pub const ORDER: [Self; 8] = [
        Self::TlsBootstrap,
        Self::CommonInit,
        Self::PreInitArray,
        Self::InitArray,
        Self::ParseStack,
        Self::RegisterFini,
        Self::ApplyRelro,
        Self::CallEntry,
    ];
}

#[inline(always)]
fn enter_phase<R: StartupRuntime + ?Sized>(runtime: &mut R, phase: StartupPhase) {
    log::trace!("startup phase {}: {:?}", phase as u8, phase);
    runtime.phase_started(phase);
}

/// Brings the process from the kernel's initial state to the program entry,
/// then exits with the entry's return value. Never returns.
///
/// Constructors run before RELRO hardening because they may write to data
/// that hardening freezes; hardening happens before `entry` so the program
/// only ever sees it frozen. `_on_exit` is accepted for calling-convention
/// compatibility and ignored: several ABIs never pass it, the rest never use it.
///
/// # Safety
///
/// Must be called once per process, single-threaded, with `elf_data`
/// pointing at the kernel's initial stack image and `structors` holding
/// valid tables.
pub unsafe fn libc_init<R>(
    runtime: &mut R,
    elf_data: *mut usize,
    _on_exit: Option<OnExit>,
    entry: ProgramEntry,
    structors: &Structors,
) -> !
where
    R: StartupRuntime + ?Sized,
{
    unsafe {
        enter_phase(runtime, StartupPhase::TlsBootstrap);
        runtime.init_tls();

        // Initialize the C runtime environment.
        enter_phase(runtime, StartupPhase::CommonInit);
        runtime.init_common(elf_data);

        enter_phase(runtime, StartupPhase::PreInitArray);
        call_array(InitArray::from_raw(structors.preinit_array));

        // Static constructors.
        enter_phase(runtime, StartupPhase::InitArray);
        call_array(InitArray::from_raw(structors.init_array));

        enter_phase(runtime, StartupPhase::ParseStack);
        let layout = StackLayout::parse(elf_data);

        // The executable may list its own destructors in .fini_array; they
        // must run when the program exits normally.
        enter_phase(runtime, StartupPhase::RegisterFini);
        if !structors.fini_array.is_null() {
            runtime.register_at_exit(libc_fini, structors.fini_array as *mut c_void);
        }

        enter_phase(runtime, StartupPhase::ApplyRelro);
        let relro = apply_gnu_relro(runtime, layout.auxiliary_vector());
        log::trace!(
            "RELRO: {} protected, {} rejected",
            relro.protected,
            relro.rejected
        );

        enter_phase(runtime, StartupPhase::CallEntry);
        log::trace!(
            "Calling entry `{:#x}({}, {:?}, {:?})`",
            entry as usize,
            layout.argc(),
            layout.argv(),
            layout.envp()
        );
        let status = entry(layout.arg_count(), layout.argv(), layout.envp());
        log::trace!("entry returned `{status}`");

        runtime.exit(status)
    }
}
