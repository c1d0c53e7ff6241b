//! Writer trait for rendered-log destinations

use super::error::Result;

/// An output sink for rendered log text.
///
/// The consumer thread calls `write` once per event with the fully rendered
/// text (no trailing newline; line-oriented sinks add their own). `close` is
/// guaranteed on every shutdown path, including abnormal ones; implementations
/// must tolerate a second call.
pub trait LogWriter: Send {
    fn write(&mut self, text: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()> {
        self.flush()
    }
    fn name(&self) -> &str;
}
