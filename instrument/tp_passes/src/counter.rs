//! Per-function call counting.

use tp_ir::{Callee, Decls, ExternDecl, Function, InstBuilder, Ty, Value};

use crate::pass::{FunctionPass, PassOutcome};
use crate::sink::declare_printf;

/// Runtime intrinsic backing the counters. Takes the function-name string,
/// atomically increments that name's counter (created zero-initialized on
/// first reference), and returns the post-increment value.
pub const CALL_COUNT_INTRINSIC: &str = "__trace_call_count";

/// Counts invocations per function name and logs the running count on the
/// console sink as `<name><count>`. Entry-side only; returns are untouched.
#[derive(Debug, Default)]
pub struct CallCounterPass;

impl CallCounterPass {
    pub fn new() -> CallCounterPass {
        CallCounterPass
    }
}

impl FunctionPass for CallCounterPass {
    fn name(&self) -> &'static str {
        "call-counter"
    }

    fn is_required(&self) -> bool {
        true
    }

    fn run(&mut self, decls: &mut Decls, func: &mut Function) -> PassOutcome {
        let Some(entry) = func.entry() else {
            return PassOutcome::Unchanged;
        };
        let count_fn = decls.get_or_insert_extern(ExternDecl {
            name: CALL_COUNT_INTRINSIC.into(),
            params: vec![Ty::Ptr],
            ret: Ty::I64,
            variadic: false,
        });
        let printf = declare_printf(decls);
        let name_str = decls.intern_str(&func.name);
        let fmt = decls.intern_str(&format!("{}%d\n", func.name));

        let mut b = InstBuilder::at_block_start(func, entry);
        let count = b.call_with_result(
            Callee::Extern(count_fn),
            vec![Value::Str(name_str)],
            "calls",
        );
        b.call(Callee::Extern(printf), vec![Value::Str(fmt), Value::Local(count)]);
        PassOutcome::Modified
    }
}
