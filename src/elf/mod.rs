pub mod program_header;
pub mod relro;
