//! GNU RELRO hardening for the running static executable.
//!
//! Once constructors have run, every `PT_GNU_RELRO` segment is remapped
//! read-only. A rejected request is counted and logged but never stops
//! startup: failing to harden memory must not keep the program from running.

use core::slice;

use super::program_header::ProgramHeader;
use crate::{
    page_size::{resolve_page_size, PageRange},
    runtime::StartupRuntime,
    start::auxiliary_vector::{AuxiliaryVector, AT_PHDR, AT_PHNUM},
};

/// What happened to the RELRO requests of one [`apply_gnu_relro`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelroOutcome {
    pub protected: usize,
    pub rejected: usize,
}

impl RelroOutcome {
    pub fn requested(&self) -> usize {
        self.protected + self.rejected
    }
}

/// The executable's own program header table, located through `AT_PHDR` and
/// `AT_PHNUM`.
///
/// # Safety
///
/// The auxiliary vector must describe the mapped program header table.
pub unsafe fn program_headers(auxiliary_vector: AuxiliaryVector) -> &'static [ProgramHeader] {
    let phdr = auxiliary_vector.get(AT_PHDR).unwrap_or(0) as *const ProgramHeader;
    let phnum = auxiliary_vector.get(AT_PHNUM).unwrap_or(0);

    if phnum == 0 {
        return &[];
    }
    unsafe { slice::from_raw_parts(phdr, phnum) }
}

/// Page ranges covering each `PT_GNU_RELRO` segment, in table order.
pub fn relro_ranges(
    headers: &[ProgramHeader],
    page_size: usize,
) -> impl Iterator<Item = PageRange> + '_ {
    headers
        .iter()
        .filter(|header| header.is_relro())
        .map(move |header| PageRange::covering(header.p_vaddr, header.p_memsz, page_size))
}

/// Makes every RELRO segment of the executable read-only.
///
/// # Safety
///
/// Must run after all writes to RELRO data are done; see [`program_headers`]
/// for the auxiliary vector contract.
pub unsafe fn apply_gnu_relro<R>(runtime: &mut R, auxiliary_vector: AuxiliaryVector) -> RelroOutcome
where
    R: StartupRuntime + ?Sized,
{
    let page_size = resolve_page_size(auxiliary_vector);
    let headers = unsafe { program_headers(auxiliary_vector) };
    let mut outcome = RelroOutcome::default();

    for range in relro_ranges(headers, page_size) {
        match unsafe { runtime.protect_read_only(range) } {
            Ok(()) => {
                log::debug!(
                    "RELRO {:#x}..{:#x} is now read-only",
                    range.start,
                    range.end
                );
                outcome.protected += 1;
            }
            Err(errno) => {
                log::warn!(
                    "RELRO {:#x}..{:#x} left writable: {}",
                    range.start,
                    range.end,
                    errno
                );
                outcome.rejected += 1;
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        elf::program_header::{PT_GNU_RELRO, PT_LOAD},
        libc::errno::Errno,
        start::auxiliary_vector::{AuxiliaryVectorItem, AT_NULL, AT_PAGE_SIZE},
    };
    use core::ffi::{c_int, c_void};

    #[derive(Default)]
    struct Protector {
        requests: Vec<PageRange>,
        reject: bool,
    }

    impl StartupRuntime for Protector {
        unsafe fn init_tls(&mut self) {}

        unsafe fn init_common(&mut self, _elf_data: *mut usize) {}

        unsafe fn register_at_exit(
            &mut self,
            _callback: unsafe extern "C" fn(*mut c_void),
            _context: *mut c_void,
        ) {
        }

        unsafe fn protect_read_only(&mut self, range: PageRange) -> Result<(), Errno> {
            self.requests.push(range);
            if self.reject {
                Err(Errno::ACCES)
            } else {
                Ok(())
            }
        }

        fn exit(&mut self, status: c_int) -> ! {
            panic!("unexpected exit({status})");
        }
    }

    fn segment(p_type: u32, p_vaddr: usize, p_memsz: usize) -> ProgramHeader {
        ProgramHeader {
            p_type,
            p_vaddr,
            p_memsz,
            ..ProgramHeader::default()
        }
    }

    fn auxv_for(headers: &[ProgramHeader], page_size: usize) -> [AuxiliaryVectorItem; 4] {
        [
            AuxiliaryVectorItem::new(AT_PHDR, headers.as_ptr() as usize),
            AuxiliaryVectorItem::new(AT_PHNUM, headers.len()),
            AuxiliaryVectorItem::new(AT_PAGE_SIZE, page_size),
            AuxiliaryVectorItem::new(AT_NULL, 0),
        ]
    }

    #[test]
    fn ranges_cover_only_relro_segments() {
        let headers = [
            segment(PT_LOAD, 0x40_0000, 0x5000),
            segment(PT_GNU_RELRO, 0x40_2e10, 0x11f0),
            segment(PT_GNU_RELRO, 0x50_0000, 0x1000),
        ];

        let ranges: Vec<_> = relro_ranges(&headers, 0x1000).collect();

        assert_eq!(
            ranges,
            [
                PageRange { start: 0x40_2000, end: 0x40_4000 },
                PageRange { start: 0x50_0000, end: 0x50_1000 },
            ]
        );
    }

    #[test]
    fn ranges_are_produced_lazily() {
        let headers = [
            segment(PT_GNU_RELRO, 0x1000, 0x10),
            segment(PT_GNU_RELRO, 0x3000, 0x10),
            segment(PT_GNU_RELRO, 0x5000, 0x10),
            segment(PT_GNU_RELRO, 0x7000, 0x10),
        ];
        let mut ranges = relro_ranges(&headers, 0x1000);

        assert_eq!(ranges.size_hint(), (0, Some(4)));
        assert_eq!(ranges.next(), Some(PageRange { start: 0x1000, end: 0x2000 }));
        assert_eq!(ranges.count(), 3);
    }

    #[test]
    fn protects_each_relro_segment_in_table_order() {
        let headers = [
            segment(PT_GNU_RELRO, 0x7000, 0x10),
            segment(PT_LOAD, 0x1000, 0x1000),
            segment(PT_GNU_RELRO, 0x3000, 0x2000),
        ];
        let auxv = auxv_for(&headers, 0x1000);
        let mut protector = Protector::default();

        let outcome = unsafe { apply_gnu_relro(&mut protector, AuxiliaryVector::new(auxv.as_ptr())) };

        assert_eq!(outcome, RelroOutcome { protected: 2, rejected: 0 });
        assert_eq!(
            protector.requests,
            vec![
                PageRange { start: 0x7000, end: 0x8000 },
                PageRange { start: 0x3000, end: 0x5000 },
            ]
        );
    }

    #[test]
    fn no_relro_segments_means_no_requests() {
        let headers = [segment(PT_LOAD, 0x1000, 0x1000)];
        let auxv = auxv_for(&headers, 0x1000);
        let mut protector = Protector::default();

        let outcome = unsafe { apply_gnu_relro(&mut protector, AuxiliaryVector::new(auxv.as_ptr())) };

        assert_eq!(outcome.requested(), 0);
        assert!(protector.requests.is_empty());
    }

    #[test]
    fn rejected_requests_are_counted_not_fatal() {
        let headers = [
            segment(PT_GNU_RELRO, 0x3000, 0x100),
            segment(PT_GNU_RELRO, 0x9000, 0x100),
        ];
        let auxv = auxv_for(&headers, 0x1000);
        let mut protector = Protector {
            reject: true,
            ..Protector::default()
        };

        let outcome = unsafe { apply_gnu_relro(&mut protector, AuxiliaryVector::new(auxv.as_ptr())) };

        assert_eq!(outcome, RelroOutcome { protected: 0, rejected: 2 });
        assert_eq!(protector.requests.len(), 2);
    }

    #[test]
    fn empty_header_table_is_tolerated() {
        let auxv = [
            AuxiliaryVectorItem::new(AT_PHNUM, 0),
            AuxiliaryVectorItem::new(AT_NULL, 0),
        ];

        let headers = unsafe { program_headers(AuxiliaryVector::new(auxv.as_ptr())) };

        assert!(headers.is_empty());
    }
}
