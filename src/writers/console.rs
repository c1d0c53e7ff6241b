//! Console writer implementation

use crate::core::error::Result;
use crate::core::writer::LogWriter;
use std::io::Write;

/// Writes each rendered event as one line on stdout
pub struct ConsoleWriter {
    out: std::io::Stdout,
}

impl ConsoleWriter {
    pub fn new() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl Default for ConsoleWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl LogWriter for ConsoleWriter {
    fn write(&mut self, text: &str) -> Result<()> {
        let mut handle = self.out.lock();
        handle.write_all(text.as_bytes())?;
        handle.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
