use crate::start::auxiliary_vector::{AuxiliaryVector, AT_PAGE_SIZE};

/// Page size assumed when the kernel does not report `AT_PAGESZ`.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Returns the protection granularity reported by the kernel, or
/// [`DEFAULT_PAGE_SIZE`] when `AT_PAGESZ` is missing or not a power of two.
pub fn resolve_page_size(auxiliary_vector: AuxiliaryVector) -> usize {
    match auxiliary_vector.get(AT_PAGE_SIZE) {
        Some(page_size) if page_size.is_power_of_two() => page_size,
        _ => DEFAULT_PAGE_SIZE,
    }
}

/// Returns the address of the page containing `address`.
#[inline]
pub fn get_page_start(address: usize, page_size: usize) -> usize {
    address & !(page_size - 1)
}

/// Returns the address of the next page after `address`, unless `address`
/// is itself at the start of a page.
#[inline]
pub fn get_page_end(address: usize, page_size: usize) -> usize {
    get_page_start(address + page_size - 1, page_size)
}

/// A half-open, page-aligned address range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    /// Widens `[address, address + size)` outward to whole pages.
    pub fn covering(address: usize, size: usize, page_size: usize) -> Self {
        Self {
            start: get_page_start(address, page_size),
            end: get_page_end(address + size, page_size),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_mut_ptr(&self) -> *mut u8 {
        self.start as *mut u8
    }
}
