//! Instrumentation passes over Tracepoint IR.
//!
//! The passes rewrite functions so that every invocation reports itself at
//! runtime, without touching the original control flow or values:
//!
//! - [`FunctionIoPass`] records the function name, every argument, and the
//!   return value at each return point, through a console or file sink.
//! - [`CallCounterPass`] counts invocations per function name and logs the
//!   running count.
//! - [`SignatureReportPass`] reports static signatures without mutating
//!   anything.
//!
//! All insertion happens through `tp_ir`'s cursor builder: instructions are
//! only ever added before an anchor point, so the instrumented function
//! computes exactly what it computed before.

mod classify;
mod counter;
mod entry;
mod exit;
mod function_io;
mod pass;
mod report;
mod sink;

pub use classify::TypeClass;
pub use counter::{CallCounterPass, CALL_COUNT_INTRINSIC};
pub use function_io::FunctionIoPass;
pub use pass::{FunctionPass, PassManager, PassOutcome};
pub use report::SignatureReportPass;
pub use sink::{EmissionPolicy, SinkSpec, TraceConfig, DEFAULT_RECORD_FILE};
