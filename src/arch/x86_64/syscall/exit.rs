use super::syscall1_noreturn;

/// Terminates every thread of the process with `code`.
///
/// Does not run at-exit callbacks; callers that want them go through
/// [`crate::runtime::StartupRuntime::exit`].
#[inline(always)]
pub fn exit_group(code: i32) -> ! {
    const EXIT_GROUP: usize = 231;

    unsafe { syscall1_noreturn(EXIT_GROUP, code as isize as usize) }
}
