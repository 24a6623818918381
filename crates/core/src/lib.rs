pub mod document;
pub mod file_io;
pub mod format;
pub mod rtf;

pub use document::{Document, DocumentError};
pub use file_io::{read_text, write_document, LoadedText};
pub use format::{FileFormat, SaveFilter};
pub use rtf::RtfError;
pub use textpad_printing::PageSetup;
