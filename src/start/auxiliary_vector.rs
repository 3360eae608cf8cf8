pub const AT_NULL: usize = 0;
pub const AT_PHDR: usize = 3;
pub const AT_PHENT: usize = 4;
pub const AT_PHNUM: usize = 5;
pub const AT_PAGE_SIZE: usize = 6;
pub const AT_BASE: usize = 7;
pub const AT_ENTRY: usize = 9;
pub const AT_PLATFORM: usize = 15;
pub const AT_HWCAP: usize = 16;
pub const AT_SECURE: usize = 23;
pub const AT_RANDOM: usize = 25;
pub const AT_HWCAP2: usize = 26;
pub const AT_EXECFN: usize = 31;

/// A union resolved by the a_type field of the parent auxiliary vector item.
#[repr(C)]
#[derive(Clone, Copy)]
pub union AuxiliaryVectorUnion {
    pub a_val: usize,
    pub a_ptr: *mut (),
}

/// An item in the auxiliary vector.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct AuxiliaryVectorItem {
    pub a_type: usize,
    pub a_un: AuxiliaryVectorUnion,
}

impl AuxiliaryVectorItem {
    pub const fn new(a_type: usize, a_val: usize) -> Self {
        Self {
            a_type,
            a_un: AuxiliaryVectorUnion { a_val },
        }
    }

    /// The entry's value read as an integer; pointers come back as their address.
    pub fn value(&self) -> usize {
        // Both union fields are one machine word wide.
        unsafe { self.a_un.a_val }
    }
}

/// An iterator over a `AT_NULL` terminated list of auxiliary vector items.
///
/// The inital pointer can be found one word after the null that ends the
/// environment pointers:
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
/// | null                |
/// |---------------------|
/// | auxiliary_vector... |
/// |---------------------|
/// | AT_NULL, 0          |
/// |---------------------|
/// | ...                 |
/// |---------------------|
/// ```
#[derive(Clone, Copy)]
pub struct AuxiliaryVectorIter(*const AuxiliaryVectorItem);

impl AuxiliaryVectorIter {
    /// Initializes a new `AuxiliaryVectorIter` from a pre-offset `*const AuxiliaryVectorItem` pointer.
    ///
    /// # Safety
    ///
    /// `auxiliary_vector_pointer` must point at a readable sequence of items
    /// ending in an `AT_NULL` item.
    pub unsafe fn new(auxiliary_vector_pointer: *const AuxiliaryVectorItem) -> Self {
        Self(auxiliary_vector_pointer)
    }

    /// Calculates and initializes a new `AuxiliaryVectorIter` from the start of an environment vector.
    ///
    /// # Safety
    ///
    /// `env_pointer` must be the `envp` of an initial process stack image.
    pub unsafe fn from_env_pointer(env_pointer: impl Into<*const *const u8>) -> Self {
        let mut env_pointer = env_pointer.into();

        unsafe {
            while !(*env_pointer).is_null() {
                env_pointer = env_pointer.add(1);
            }

            Self::new(env_pointer.add(1) as *const AuxiliaryVectorItem)
        }
    }

    /// Extracts the inner pointer to the next item consuming the `AuxiliaryVectorIter`.
    pub fn into_inner(self) -> *const AuxiliaryVectorItem {
        self.0
    }
}

impl Iterator for AuxiliaryVectorIter {
    type Item = AuxiliaryVectorItem;

    fn next(&mut self) -> Option<Self::Item> {
        let item = unsafe { *self.0 };

        // If we are at the end of the list, return `None` and don't progress.
        if item.a_type == AT_NULL {
            return None;
        }

        // Advance to the next item
        self.0 = unsafe { self.0.add(1) };

        Some(item)
    }
}

/// A handle on the kernel-supplied auxiliary vector. Lookups always restart
/// from the base, so the handle can be queried any number of times.
#[derive(Clone, Copy)]
pub struct AuxiliaryVector(*const AuxiliaryVectorItem);

impl AuxiliaryVector {
    /// # Safety
    ///
    /// Same contract as [`AuxiliaryVectorIter::new`], for as long as the
    /// handle is used.
    pub unsafe fn new(base: *const AuxiliaryVectorItem) -> Self {
        Self(base)
    }

    pub fn as_ptr(&self) -> *const AuxiliaryVectorItem {
        self.0
    }

    pub fn iter(&self) -> AuxiliaryVectorIter {
        unsafe { AuxiliaryVectorIter::new(self.0) }
    }

    /// Returns the value of the first entry with type `a_type`, stopping at
    /// the `AT_NULL` terminator.
    pub fn get(&self, a_type: usize) -> Option<usize> {
        self.iter()
            .find(|item| item.a_type == a_type)
            .map(|item| item.value())
    }
}

/// Finds the value of the `AT_*` entry passed to us by the kernel, or `0`
/// when no entry of that type exists.
///
/// # Safety
///
/// See [`AuxiliaryVectorIter::new`].
pub unsafe fn find_aux(auxiliary_vector: *const AuxiliaryVectorItem, a_type: usize) -> usize {
    unsafe { AuxiliaryVector::new(auxiliary_vector) }
        .get(a_type)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> [AuxiliaryVectorItem; 4] {
        [
            AuxiliaryVectorItem::new(AT_PHDR, 0x40_0040),
            AuxiliaryVectorItem::new(AT_PHNUM, 9),
            AuxiliaryVectorItem::new(AT_PAGE_SIZE, 4096),
            AuxiliaryVectorItem::new(AT_NULL, 0),
        ]
    }

    #[test]
    fn present_types_return_their_value() {
        let items = sample();
        unsafe {
            assert_eq!(find_aux(items.as_ptr(), AT_PHDR), 0x40_0040);
            assert_eq!(find_aux(items.as_ptr(), AT_PHNUM), 9);
            assert_eq!(find_aux(items.as_ptr(), AT_PAGE_SIZE), 4096);
        }
    }

    #[test]
    fn absent_types_return_zero() {
        let items = sample();
        unsafe {
            assert_eq!(find_aux(items.as_ptr(), AT_RANDOM), 0);
            assert_eq!(AuxiliaryVector::new(items.as_ptr()).get(AT_RANDOM), None);
        }
    }

    #[test]
    fn scan_stops_at_terminator() {
        // An entry placed after AT_NULL must never be seen.
        let items = [
            AuxiliaryVectorItem::new(AT_PHNUM, 2),
            AuxiliaryVectorItem::new(AT_NULL, 0),
            AuxiliaryVectorItem::new(AT_ENTRY, 0xdead),
        ];
        let auxv = unsafe { AuxiliaryVector::new(items.as_ptr()) };

        assert_eq!(auxv.get(AT_ENTRY), None);
        assert_eq!(auxv.iter().count(), 1);
    }

    #[test]
    fn first_match_wins_and_lookups_repeat() {
        let items = [
            AuxiliaryVectorItem::new(AT_HWCAP, 1),
            AuxiliaryVectorItem::new(AT_HWCAP, 2),
            AuxiliaryVectorItem::new(AT_NULL, 0),
        ];
        let auxv = unsafe { AuxiliaryVector::new(items.as_ptr()) };

        assert_eq!(auxv.get(AT_HWCAP), Some(1));
        assert_eq!(auxv.get(AT_HWCAP), Some(1));
    }

    #[test]
    fn empty_vector_finds_nothing() {
        let items = [AuxiliaryVectorItem::new(AT_NULL, 0)];
        unsafe {
            assert_eq!(find_aux(items.as_ptr(), AT_PHDR), 0);
            assert_eq!(find_aux(items.as_ptr(), AT_NULL), 0);
        }
    }

    #[test]
    fn located_from_environment_pointer() {
        let words: [usize; 6] = [0x1000, 0x2000, 0, AT_PHNUM, 4, AT_NULL];
        let mut padded = [0usize; 8];
        padded[..6].copy_from_slice(&words);

        let iter = unsafe { AuxiliaryVectorIter::from_env_pointer(padded.as_ptr() as *const *const u8) };
        assert_eq!(iter.into_inner() as usize, &padded[3] as *const usize as usize);
    }
}
