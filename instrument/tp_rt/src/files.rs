//! Scoped file-sink primitives.
//!
//! Models the `fopen`/`fprintf`/`fclose` cycle the generated code emits:
//! handles are dense integers, files open in append mode, and handle 0 is
//! the null handle a failed open returns. Writing through the null handle
//! skips the write and logs a warning; it is never undefined behavior, and
//! it never affects the instrumented function's control flow.

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

#[derive(Default)]
pub struct FileTable {
    handles: Mutex<FxHashMap<u64, File>>,
    issued: AtomicU64,
}

impl FileTable {
    /// Open `path` in append mode (creating it if absent) and return a
    /// fresh handle, or 0 when the open fails.
    pub fn open_append(&self, path: &str) -> u64 {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let handle = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
                self.handles.lock().insert(handle, file);
                handle
            }
            Err(err) => {
                tracing::warn!(path, %err, "fopen failed, emission will be skipped");
                0
            }
        }
    }

    /// Append `text` through `handle`. Returns `false` when the write was
    /// skipped (null or unknown handle) or failed.
    pub fn write(&self, handle: u64, text: &str) -> bool {
        if handle == 0 {
            tracing::warn!("fprintf on null handle, write skipped");
            return false;
        }
        let mut handles = self.handles.lock();
        let Some(file) = handles.get_mut(&handle) else {
            tracing::warn!(handle, "fprintf on unknown handle, write skipped");
            return false;
        };
        if let Err(err) = file.write_all(text.as_bytes()) {
            tracing::warn!(handle, %err, "fprintf failed");
            return false;
        }
        true
    }

    /// Release `handle`. Closing the null handle is a no-op.
    pub fn close(&self, handle: u64) -> bool {
        if handle == 0 {
            return false;
        }
        self.handles.lock().remove(&handle).is_some()
    }

    /// Handles currently open. The generated code closes everything it
    /// opens, so this returns to zero between emission groups.
    pub fn open_count(&self) -> usize {
        self.handles.lock().len()
    }
}
