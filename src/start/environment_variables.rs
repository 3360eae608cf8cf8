use core::ffi::{c_char, CStr};

/// An iterator over a null-terminated list of pointers to null-terminated `NAME=VALUE` strings.
///
/// The inital pointer can be found one word after the end of the argument vector, which is passed to the process by the kernel via the stack pointer:
///
/// ```text
/// |---------------------|
/// | arg_count           |
/// |---------------------|
/// | arg_values...       |
/// |---------------------|
/// | null                |
/// |---------------------|
/// | env_pointers...     |
/// |---------------------|
/// | ...                 |
/// |---------------------|
/// ```
#[derive(Clone, Copy)]
pub struct EnvironmentIter(*const *const c_char);

impl EnvironmentIter {
    /// # Safety
    ///
    /// `environment_pointer` must be null or point at a null-terminated vector
    /// of C strings that live for the rest of the process.
    pub unsafe fn new(environment_pointer: *const *const c_char) -> Self {
        Self(environment_pointer)
    }

    /// Extracts the inner pointer to the next item consuming the `EnvironmentIter`.
    pub fn into_inner(self) -> *const *const c_char {
        self.0
    }
}

impl Iterator for EnvironmentIter {
    /// `(name, value)`; an entry without `=` is all name and an empty value.
    type Item = (&'static [u8], &'static [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.0.is_null() {
            return None;
        }

        let string_pointer = unsafe { *self.0 };

        // If we are at the end of the list, return `None` and don't progress.
        if string_pointer.is_null() {
            return None;
        }

        let entry = unsafe { CStr::from_ptr(string_pointer) }.to_bytes();
        let pair = match entry.iter().position(|&byte| byte == b'=') {
            Some(split_at) => (&entry[..split_at], &entry[split_at + 1..]),
            None => (entry, &entry[entry.len()..]),
        };

        self.0 = unsafe { self.0.add(1) };

        Some(pair)
    }
}
