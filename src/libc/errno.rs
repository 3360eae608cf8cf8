use core::fmt::{self, Display};

#[repr(transparent)]
#[doc(alias = "errno")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Errno(pub(crate) u32);

impl Errno {
    pub const PERM: Self = Self(1);
    pub const BADF: Self = Self(9);
    pub const NOMEM: Self = Self(12);
    pub const ACCES: Self = Self(13);
    pub const FAULT: Self = Self(14);
    pub const INVAL: Self = Self(22);

    /// Largest value the kernel encodes as `-errno` in a syscall return.
    const MAX_ERRNO: usize = 4095;

    /// Decodes a raw syscall return: `-4095..=-1` is an error, anything else
    /// is the successful result.
    pub fn from_syscall(result: isize) -> Result<usize, Self> {
        if (result as usize) > usize::MAX - Self::MAX_ERRNO {
            Err(Self(result.unsigned_abs() as u32))
        } else {
            Ok(result as usize)
        }
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Recognize errors documented in POSIX and use the documented strings.
        // <https://pubs.opengroup.org/onlinepubs/9699919799/basedefs/errno.h.html>
        let message = match *self {
            Errno::PERM => "Operation not permitted",
            Errno::BADF => "Bad file descriptor",
            Errno::NOMEM => "Not enough space",
            Errno::ACCES => "Permission denied",
            Errno::FAULT => "Bad address",
            Errno::INVAL => "Invalid argument",
            unknown_errno => return write!(f, "Unknown error: {}", unknown_errno.0),
        };
        f.write_str(message)
    }
}
