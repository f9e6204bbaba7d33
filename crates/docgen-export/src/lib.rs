pub mod docx_writer;
pub mod outline;

pub use docx_writer::*;
pub use outline::*;
