//! Output sinks for rendered log text

pub mod console;
pub mod file;
pub mod memory;

pub use console::ConsoleWriter;
pub use file::FileWriter;
pub use memory::MemoryWriter;
