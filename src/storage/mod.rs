pub mod memory;
pub mod writer;

pub use memory::MemoryCollection;
pub use writer::RecordWriter;
