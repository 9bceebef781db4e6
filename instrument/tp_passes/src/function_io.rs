//! The function I/O pass: argument and return-value recording.

use tp_ir::{Decls, Function};

use crate::entry::instrument_entry;
use crate::exit::instrument_exits;
use crate::pass::{FunctionPass, PassOutcome};
use crate::sink::{EmissionPolicy, SinkBinding, TraceConfig};

/// Instruments a function so every invocation records its name, argument
/// values, and return value through the configured sink.
pub struct FunctionIoPass {
    config: TraceConfig,
}

impl FunctionIoPass {
    pub fn new(config: TraceConfig) -> FunctionIoPass {
        FunctionIoPass { config }
    }
}

impl FunctionPass for FunctionIoPass {
    fn name(&self) -> &'static str {
        "function-io"
    }

    fn is_required(&self) -> bool {
        true
    }

    fn run(&mut self, decls: &mut Decls, func: &mut Function) -> PassOutcome {
        if func.entry().is_none() {
            return PassOutcome::Unchanged;
        }
        let sink = SinkBinding::resolve(&self.config.sink, decls);
        let modified = match self.config.policy {
            EmissionPolicy::EntryOnce => {
                let entered = instrument_entry(decls, func, &sink);
                let exits = instrument_exits(decls, func, &sink, false);
                entered || exits > 0
            }
            EmissionPolicy::BundledPerExit => instrument_exits(decls, func, &sink, true) > 0,
        };
        if modified {
            PassOutcome::Modified
        } else {
            PassOutcome::Unchanged
        }
    }
}
