pub const PT_LOAD: u32 = 1;
/// Segment the linker asks to be made read-only once relocation is done.
pub const PT_GNU_RELRO: u32 = 0x6474_e552;

/// An ELF64 program header table entry, as mapped into memory with the image.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgramHeader {
    /// The segment kind, see the PT_.* constants.
    pub p_type: u32,
    /// Segment permissions.
    pub p_flags: u32,
    /// The offset of the segment in the file.
    pub p_offset: usize,
    /// The virtual address at which the segment lives in memory.
    pub p_vaddr: usize,
    pub p_paddr: usize,
    /// The size of the segment in the file.
    pub p_filesz: usize,
    /// The size of the segment in memory, at least `p_filesz`.
    pub p_memsz: usize,
    pub p_align: usize,
}

impl ProgramHeader {
    pub fn is_relro(&self) -> bool {
        self.p_type == PT_GNU_RELRO
    }
}
