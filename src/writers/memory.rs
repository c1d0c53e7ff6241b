//! In-memory writer for tests and capture
//!
//! Stores each rendered event in a shared vector. Clones share the same
//! buffer, so a test can keep a handle while the engine owns the sink.

use crate::core::error::Result;
use crate::core::writer::LogWriter;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct MemoryWriter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl LogWriter for MemoryWriter {
    fn write(&mut self, text: &str) -> Result<()> {
        self.lines.lock().push(text.to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
