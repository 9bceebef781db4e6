//! Runtime support layer for instrumented Tracepoint modules.
//!
//! The instrumentation passes generate calls to a small set of extern
//! symbols. This crate supplies those symbols' behavior and an interpreter
//! that executes instrumented modules against them:
//!
//! - `printf` - formatted write to the process-wide console stream
//! - `fopen` / `fprintf` / `fclose` - scoped append-mode file writes; a
//!   failed open yields the null handle and subsequent writes are skipped,
//!   never undefined behavior
//! - `__trace_call_count` - atomic per-function-name call counter, created
//!   lazily and persistent for the lifetime of the [`Machine`]
//!
//! Emissions execute inline on whichever thread calls the instrumented
//! function. The runtime introduces no threads, no scheduling, and no
//! retry: every emission is attempted exactly once.

mod console;
mod counters;
mod errors;
mod files;
mod fmt;
mod interp;
mod value;

pub use console::{capture_console, stdout_console, ConsoleOut, SharedConsole};
pub use counters::CallCounterState;
pub use errors::{FormatError, RtError};
pub use files::FileTable;
pub use interp::Machine;
pub use value::RtValue;
