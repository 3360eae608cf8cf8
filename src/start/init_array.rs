//! Constructor and destructor tables handed over by the link-time startup stub.
//!
//! On the wire a table is a pointer to machine words: a reserved `-1` slot,
//! the function addresses, then a null word. [`InitArray::from_raw`] drops the
//! reserved slot and the terminator, so everything past the boundary sees a
//! plain ordered sequence.

use core::{ffi::c_void, mem, slice};

/// Value of the reserved first slot of every table.
pub const ARRAY_SENTINEL: usize = usize::MAX;

pub type StructorFunction = extern "C" fn();

#[derive(Clone, Copy, Debug)]
pub struct InitArray<'a> {
    entries: &'a [usize],
}

impl InitArray<'static> {
    /// Reads a sentinel-prefixed, null-terminated table. A null `list` means
    /// the table is absent.
    ///
    /// # Safety
    ///
    /// A non-null `list` must point at a table laid out as described above,
    /// whose entries are `extern "C" fn()` addresses valid for the rest of the
    /// process.
    pub unsafe fn from_raw(list: *const usize) -> Option<Self> {
        if list.is_null() {
            return None;
        }

        unsafe {
            // First element is -1, list is null-terminated
            let first = list.add(1);
            let mut len = 0;
            while *first.add(len) != 0 {
                len += 1;
            }

            Some(Self {
                entries: slice::from_raw_parts(first, len),
            })
        }
    }
}

impl<'a> InitArray<'a> {
    /// Wraps entries that already have the sentinel and terminator removed.
    ///
    /// # Safety
    ///
    /// Every entry must be the address of an `extern "C" fn()`.
    pub unsafe fn new(entries: &'a [usize]) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn addresses(&self) -> &'a [usize] {
        self.entries
    }

    pub fn functions(&self) -> impl Iterator<Item = StructorFunction> + 'a {
        self.entries
            .iter()
            .map(|&address| unsafe { mem::transmute::<usize, StructorFunction>(address) })
    }
}

/// Invokes every function of `array` in table order. An absent table is a
/// no-op.
///
/// # Safety
///
/// Runs arbitrary foreign code.
pub unsafe fn call_array(array: Option<InitArray<'_>>) {
    let Some(array) = array else {
        return;
    };

    for function in array.functions() {
        log::trace!("Calling structor `{:#x}`", function as usize);
        function();
    }
}

/// At-exit callback for the finalizer table. `array` is the raw table
/// pointer registered as the callback context.
///
/// # Safety
///
/// `array` must satisfy [`InitArray::from_raw`].
pub unsafe extern "C" fn libc_fini(array: *mut c_void) {
    unsafe { call_array(InitArray::from_raw(array as *const usize)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    thread_local! {
        static CALLS: RefCell<Vec<u32>> = const { RefCell::new(Vec::new()) };
    }

    fn record(id: u32) {
        CALLS.with(|calls| calls.borrow_mut().push(id));
    }

    fn take_calls() -> Vec<u32> {
        CALLS.with(|calls| calls.take())
    }

    extern "C" fn first() {
        record(1);
    }

    extern "C" fn second() {
        record(2);
    }

    extern "C" fn third() {
        record(3);
    }

    fn table(functions: &[StructorFunction]) -> Vec<usize> {
        let mut words = vec![ARRAY_SENTINEL];
        words.extend(functions.iter().map(|&function| function as usize));
        words.push(0);
        words
    }

    #[test]
    fn runs_entries_in_order_and_skips_sentinel() {
        let words = table(&[first, second, third]);
        take_calls();

        let array = unsafe { InitArray::from_raw(words.as_ptr()) };
        assert_eq!(array.map(|array| array.len()), Some(3));
        unsafe { call_array(array) };

        assert_eq!(take_calls(), vec![1, 2, 3]);
    }

    #[test]
    fn stops_at_first_null() {
        let mut words = table(&[first, second]);
        // Anything after the terminator is not part of the table.
        words.push(third as usize);
        words.push(0);
        take_calls();

        unsafe { call_array(InitArray::from_raw(words.as_ptr())) };

        assert_eq!(take_calls(), vec![1, 2]);
    }

    #[test]
    fn sentinel_only_table_is_empty() {
        let words = table(&[]);
        take_calls();

        let array = unsafe { InitArray::from_raw(words.as_ptr()) };
        assert!(array.is_some_and(|array| array.is_empty()));
        unsafe { call_array(array) };

        assert!(take_calls().is_empty());
    }

    #[test]
    fn absent_table_runs_nothing() {
        take_calls();

        let array = unsafe { InitArray::from_raw(core::ptr::null()) };
        assert!(array.is_none());
        unsafe { call_array(array) };
        unsafe { libc_fini(core::ptr::null_mut()) };

        assert!(take_calls().is_empty());
    }

    #[test]
    fn fini_callback_runs_the_registered_table() {
        let words = table(&[third, first]);
        take_calls();

        unsafe { libc_fini(words.as_ptr() as *mut c_void) };

        assert_eq!(take_calls(), vec![3, 1]);
    }
}
