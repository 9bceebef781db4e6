//! Console sink with a swappable destination.
//!
//! The instrumented program writes records to one process-wide console
//! stream, opened once and never closed by the runtime. Tests and
//! embedding harnesses swap in a capture buffer.
//!
//! Enum dispatch instead of a trait object keeps this frequently-hit path
//! free of vtable indirection.

use std::io::Write as _;
use std::sync::Arc;

use parking_lot::Mutex;

/// Console destination.
pub enum ConsoleOut {
    /// Writes through to the process stdout.
    Stdout,
    /// Captures into a buffer for later inspection.
    Capture(Mutex<String>),
}

impl ConsoleOut {
    /// Write text as-is. Records carry their own newlines.
    pub fn write(&self, text: &str) {
        match self {
            ConsoleOut::Stdout => {
                let mut out = std::io::stdout().lock();
                let _ = out.write_all(text.as_bytes());
            }
            ConsoleOut::Capture(buf) => buf.lock().push_str(text),
        }
    }

    /// Captured output. Empty for the stdout console, which does not
    /// capture.
    pub fn captured(&self) -> String {
        match self {
            ConsoleOut::Stdout => String::new(),
            ConsoleOut::Capture(buf) => buf.lock().clone(),
        }
    }

    /// Clear captured output. No-op for the stdout console.
    pub fn clear(&self) {
        if let ConsoleOut::Capture(buf) = self {
            buf.lock().clear();
        }
    }
}

/// Shared console handle passed into the machine.
pub type SharedConsole = Arc<ConsoleOut>;

pub fn stdout_console() -> SharedConsole {
    Arc::new(ConsoleOut::Stdout)
}

pub fn capture_console() -> SharedConsole {
    Arc::new(ConsoleOut::Capture(Mutex::new(String::new())))
}
