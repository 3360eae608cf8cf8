//! Process startup for statically linked executables.
//!
//! [`libc_init`] runs once, between the kernel's `execve` and the program's
//! entry function: TLS bootstrap, common runtime init, pre-init and init
//! arrays, stack image parsing, finalizer registration, RELRO hardening, then
//! the entry call and `exit`.

#[cfg_attr(target_arch = "x86_64", path = "arch/x86_64/syscall/mod.rs")]
#[cfg_attr(target_arch = "aarch64", path = "arch/aarch64/syscall/mod.rs")]
pub mod syscall;

#[cfg(feature = "c_runtime")]
pub mod c_api;
pub mod elf;
pub mod libc;
pub mod page_size;
pub mod runtime;
pub mod start;

#[cfg(feature = "c_runtime")]
pub use c_api::CRuntime;
pub use elf::relro::{apply_gnu_relro, RelroOutcome};
pub use libc::errno::Errno;
pub use page_size::PageRange;
pub use runtime::{AtExitCallback, RawRuntime, StartupRuntime};
pub use start::{
    auxiliary_vector::{find_aux, AuxiliaryVector, AuxiliaryVectorItem, AuxiliaryVectorIter},
    init_array::{call_array, InitArray},
    libc_init,
    stack_layout::StackLayout,
    OnExit, ProgramEntry, StartupPhase, Structors,
};
