//! Interpreter for instrumented modules.

use tp_ir::{
    BinOp, Callee, CmpOp, Const, Function, Inst, Module, Terminator, Ty, Value,
};

use crate::console::{stdout_console, SharedConsole};
use crate::counters::CallCounterState;
use crate::errors::RtError;
use crate::files::FileTable;
use crate::fmt::format_record;
use crate::value::RtValue;

/// Tag distinguishing pointers into the module string table from user
/// pointer values.
const STR_PTR_BASE: u64 = 0x5452_0000;

const MAX_CALL_DEPTH: usize = 256;

/// Symbol name of the call-counter intrinsic the counter pass emits calls
/// to. Backed here by [`CallCounterState`].
const CALL_COUNT_SYMBOL: &str = "__trace_call_count";

/// Executes functions of one module, dispatching extern calls to the sink
/// primitives and the call-counter intrinsic.
///
/// Emissions run inline on the calling thread; the machine introduces no
/// threads and no scheduling of its own. The counter table and file table
/// persist across calls on the same machine, mirroring a single running
/// instrumented process.
pub struct Machine<'m> {
    module: &'m Module,
    console: SharedConsole,
    files: FileTable,
    counters: CallCounterState,
}

impl<'m> Machine<'m> {
    /// Machine writing console emissions to the process stdout.
    pub fn new(module: &'m Module) -> Machine<'m> {
        Machine::with_console(module, stdout_console())
    }

    /// Machine writing console emissions to the given console.
    pub fn with_console(module: &'m Module, console: SharedConsole) -> Machine<'m> {
        Machine {
            module,
            console,
            files: FileTable::default(),
            counters: CallCounterState::new(),
        }
    }

    pub fn console(&self) -> &SharedConsole {
        &self.console
    }

    pub fn counters(&self) -> &CallCounterState {
        &self.counters
    }

    pub fn files(&self) -> &FileTable {
        &self.files
    }

    /// Call a module function by name.
    pub fn call(&self, name: &str, args: &[RtValue]) -> Result<RtValue, RtError> {
        self.call_at_depth(name, args, 0)
    }

    fn call_at_depth(
        &self,
        name: &str,
        args: &[RtValue],
        depth: usize,
    ) -> Result<RtValue, RtError> {
        if depth >= MAX_CALL_DEPTH {
            return Err(RtError::CallDepthExceeded(depth));
        }
        let func = self
            .module
            .function(name)
            .ok_or_else(|| RtError::UnknownFunction(name.to_owned()))?;
        if args.len() != func.params.len() {
            return Err(RtError::ArityMismatch {
                function: func.name.clone(),
                expected: func.params.len(),
                got: args.len(),
            });
        }
        self.exec(func, args, depth)
    }

    fn exec(
        &self,
        func: &Function,
        args: &[RtValue],
        depth: usize,
    ) -> Result<RtValue, RtError> {
        let mut locals: Vec<Option<RtValue>> = vec![None; func.num_locals()];
        for (i, arg) in args.iter().enumerate() {
            locals[func.param_local(i).index()] = Some(*arg);
        }

        let mut block = func
            .entry()
            .ok_or_else(|| RtError::EmptyFunction(func.name.clone()))?;
        loop {
            for inst in &func.block(block).insts {
                self.step(func, &mut locals, inst, depth)?;
            }
            match func.block(block).term {
                None => {
                    return Err(RtError::MissingTerminator {
                        function: func.name.clone(),
                        block: func.block(block).label.clone(),
                    })
                }
                Some(Terminator::Ret(None)) => return Ok(RtValue::Unit),
                Some(Terminator::Ret(Some(value))) => return self.eval(func, &locals, value),
                Some(Terminator::Br {
                    cond,
                    then_blk,
                    else_blk,
                }) => {
                    let cond = self.eval(func, &locals, cond)?;
                    block = if as_int(func, cond)? != 0 {
                        then_blk
                    } else {
                        else_blk
                    };
                }
                Some(Terminator::Jmp(target)) => block = target,
            }
        }
    }

    fn step(
        &self,
        func: &Function,
        locals: &mut [Option<RtValue>],
        inst: &Inst,
        depth: usize,
    ) -> Result<(), RtError> {
        match inst {
            Inst::Bin {
                op,
                ty,
                dst,
                lhs,
                rhs,
            } => {
                let lhs = self.eval(func, locals, *lhs)?;
                let rhs = self.eval(func, locals, *rhs)?;
                locals[dst.index()] = Some(apply_bin(func, *op, *ty, lhs, rhs)?);
            }
            Inst::Cmp {
                op,
                ty,
                dst,
                lhs,
                rhs,
            } => {
                let lhs = self.eval(func, locals, *lhs)?;
                let rhs = self.eval(func, locals, *rhs)?;
                locals[dst.index()] = Some(apply_cmp(func, *op, *ty, lhs, rhs)?);
            }
            Inst::Call { callee, args, dst } => {
                let mut vals = Vec::with_capacity(args.len());
                for arg in args {
                    vals.push(self.eval(func, locals, *arg)?);
                }
                let result = match callee {
                    Callee::Extern(id) => {
                        let decl = self
                            .module
                            .decls
                            .extern_decl(*id)
                            .ok_or_else(|| RtError::UnknownExtern(format!("#{}", id.index())))?;
                        self.call_native(&decl.name, &vals)?
                    }
                    Callee::Function(name) => self.call_at_depth(name, &vals, depth + 1)?,
                };
                if let Some(dst) = dst {
                    locals[dst.index()] = Some(result);
                }
            }
        }
        Ok(())
    }

    fn eval(
        &self,
        func: &Function,
        locals: &[Option<RtValue>],
        value: Value,
    ) -> Result<RtValue, RtError> {
        match value {
            Value::Local(id) => {
                locals[id.index()].ok_or_else(|| RtError::UninitializedLocal {
                    function: func.name.clone(),
                    local: func.local_name(id).to_owned(),
                })
            }
            Value::Const(Const::Int(v)) => Ok(RtValue::Int(v)),
            Value::Const(Const::Float(v)) => Ok(RtValue::F64(v)),
            Value::Const(Const::Null) => Ok(RtValue::NULL),
            Value::Str(id) => Ok(RtValue::Ptr(STR_PTR_BASE + id.index() as u64)),
        }
    }

    fn str_at(&self, ptr: u64) -> Result<&str, RtError> {
        let index = ptr
            .checked_sub(STR_PTR_BASE)
            .ok_or(RtError::DanglingString(ptr))? as usize;
        self.module
            .decls
            .string_at(index)
            .ok_or(RtError::DanglingString(ptr))
    }

    // Sink primitives and intrinsics, dispatched by extern symbol name.
    fn call_native(&self, name: &str, args: &[RtValue]) -> Result<RtValue, RtError> {
        match name {
            "printf" => {
                let (fmt, rest) = split_fmt(name, args, 0)?;
                let text = format_record(self.str_at(fmt)?, rest)?;
                self.console.write(&text);
                Ok(RtValue::Int(text.len() as i64))
            }
            "fprintf" => {
                let handle = as_native_ptr(name, args, 0)?;
                let (fmt, rest) = split_fmt(name, args, 1)?;
                let text = format_record(self.str_at(fmt)?, rest)?;
                if self.files.write(handle, &text) {
                    Ok(RtValue::Int(text.len() as i64))
                } else {
                    Ok(RtValue::Int(-1))
                }
            }
            "fopen" => {
                let path = self.str_at(as_native_ptr(name, args, 0)?)?;
                // The mode operand is validated for presence only; the
                // table always opens in append mode.
                as_native_ptr(name, args, 1)?;
                Ok(RtValue::Ptr(self.files.open_append(path)))
            }
            "fclose" => {
                let handle = as_native_ptr(name, args, 0)?;
                if self.files.close(handle) {
                    Ok(RtValue::Int(0))
                } else {
                    Ok(RtValue::Int(-1))
                }
            }
            CALL_COUNT_SYMBOL => {
                let fn_name = self.str_at(as_native_ptr(name, args, 0)?)?;
                Ok(RtValue::Int(self.counters.bump(fn_name) as i64))
            }
            other => Err(RtError::UnknownExtern(other.to_owned())),
        }
    }
}

fn native_arg(name: &str, args: &[RtValue], index: usize) -> Result<RtValue, RtError> {
    args.get(index).copied().ok_or_else(|| RtError::ArityMismatch {
        function: name.to_owned(),
        expected: index + 1,
        got: args.len(),
    })
}

fn as_native_ptr(name: &str, args: &[RtValue], index: usize) -> Result<u64, RtError> {
    match native_arg(name, args, index)? {
        RtValue::Ptr(p) => Ok(p),
        other => Err(RtError::TypeMismatch {
            function: name.to_owned(),
            expected: "pointer",
            got: other.kind(),
        }),
    }
}

fn split_fmt<'a>(name: &str, args: &'a [RtValue], index: usize) -> Result<(u64, &'a [RtValue]), RtError> {
    let fmt = as_native_ptr(name, args, index)?;
    Ok((fmt, &args[index + 1..]))
}

fn as_int(func: &Function, value: RtValue) -> Result<i64, RtError> {
    match value {
        RtValue::Int(v) => Ok(v),
        other => Err(RtError::TypeMismatch {
            function: func.name.clone(),
            expected: "integer",
            got: other.kind(),
        }),
    }
}

// Integer constants flow into float positions, matching how the parser
// types bare literals.
fn as_float(func: &Function, value: RtValue) -> Result<f64, RtError> {
    match value {
        RtValue::F32(v) => Ok(f64::from(v)),
        RtValue::F64(v) => Ok(v),
        RtValue::Int(v) => Ok(v as f64),
        other => Err(RtError::TypeMismatch {
            function: func.name.clone(),
            expected: "float",
            got: other.kind(),
        }),
    }
}

fn apply_bin(
    func: &Function,
    op: BinOp,
    ty: Ty,
    lhs: RtValue,
    rhs: RtValue,
) -> Result<RtValue, RtError> {
    match ty {
        Ty::I1 | Ty::I8 | Ty::I16 | Ty::I32 | Ty::I64 => {
            let lhs = as_int(func, lhs)?;
            let rhs = as_int(func, rhs)?;
            let v = match op {
                BinOp::Add => lhs.wrapping_add(rhs),
                BinOp::Sub => lhs.wrapping_sub(rhs),
                BinOp::Mul => lhs.wrapping_mul(rhs),
                BinOp::Div => {
                    if rhs == 0 {
                        return Err(RtError::DivisionByZero(func.name.clone()));
                    }
                    lhs.wrapping_div(rhs)
                }
            };
            Ok(RtValue::Int(v))
        }
        Ty::F32 | Ty::F64 => {
            let lhs = as_float(func, lhs)?;
            let rhs = as_float(func, rhs)?;
            let v = match op {
                BinOp::Add => lhs + rhs,
                BinOp::Sub => lhs - rhs,
                BinOp::Mul => lhs * rhs,
                BinOp::Div => lhs / rhs,
            };
            if ty == Ty::F32 {
                Ok(RtValue::F32(v as f32))
            } else {
                Ok(RtValue::F64(v))
            }
        }
        Ty::Ptr | Ty::Void | Ty::Vec { .. } => Err(RtError::TypeMismatch {
            function: func.name.clone(),
            expected: "numeric operand type",
            got: "non-numeric type",
        }),
    }
}

fn apply_cmp(
    func: &Function,
    op: CmpOp,
    ty: Ty,
    lhs: RtValue,
    rhs: RtValue,
) -> Result<RtValue, RtError> {
    let ordering = match ty {
        Ty::I1 | Ty::I8 | Ty::I16 | Ty::I32 | Ty::I64 => {
            as_int(func, lhs)?.cmp(&as_int(func, rhs)?)
        }
        Ty::F32 | Ty::F64 => {
            let lhs = as_float(func, lhs)?;
            let rhs = as_float(func, rhs)?;
            lhs.partial_cmp(&rhs).unwrap_or(std::cmp::Ordering::Greater)
        }
        Ty::Ptr => match (lhs, rhs) {
            (RtValue::Ptr(l), RtValue::Ptr(r)) => l.cmp(&r),
            (l, r) => {
                let other = if matches!(l, RtValue::Ptr(_)) { r } else { l };
                return Err(RtError::TypeMismatch {
                    function: func.name.clone(),
                    expected: "pointer",
                    got: other.kind(),
                });
            }
        },
        Ty::Void | Ty::Vec { .. } => {
            return Err(RtError::TypeMismatch {
                function: func.name.clone(),
                expected: "comparable operand type",
                got: "non-comparable type",
            })
        }
    };
    let holds = match op {
        CmpOp::Eq => ordering.is_eq(),
        CmpOp::Ne => ordering.is_ne(),
        CmpOp::Lt => ordering.is_lt(),
        CmpOp::Le => ordering.is_le(),
        CmpOp::Gt => ordering.is_gt(),
        CmpOp::Ge => ordering.is_ge(),
    };
    Ok(RtValue::Int(i64::from(holds)))
}
