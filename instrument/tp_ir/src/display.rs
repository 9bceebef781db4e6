//! Printing of the textual form.
//!
//! Output round-trips: `parse_module` over the printed text reproduces the
//! module, including instrumentation inserted by passes.

use std::fmt;

use crate::function::Function;
use crate::inst::{Callee, Inst, Terminator};
use crate::module::Module;
use crate::value::{Const, Value};

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ex in self.decls.externs() {
            write!(f, "extern @{}(", ex.name)?;
            for (i, ty) in ex.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{ty}")?;
            }
            if ex.variadic {
                if ex.params.is_empty() {
                    write!(f, "...")?;
                } else {
                    write!(f, ", ...")?;
                }
            }
            writeln!(f, ") -> {}", ex.ret)?;
        }
        if !self.decls.externs().is_empty() && !self.functions.is_empty() {
            writeln!(f)?;
        }
        for (i, func) in self.functions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write_function(f, self, func)?;
        }
        Ok(())
    }
}

fn write_function(f: &mut fmt::Formatter<'_>, m: &Module, func: &Function) -> fmt::Result {
    write!(f, "fn @{}(", func.name)?;
    for (i, param) in func.params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{} %{}", param.ty, func.local_name(func.param_local(i)))?;
    }
    write!(f, ") -> {}", func.ret_ty)?;
    for attr in &func.attrs {
        write!(f, " {}", attr.name())?;
    }
    writeln!(f, " {{")?;
    for block in func.blocks() {
        writeln!(f, "{}:", block.label)?;
        for inst in &block.insts {
            write_inst(f, m, func, inst)?;
        }
        if let Some(term) = &block.term {
            write_term(f, m, func, term)?;
        }
    }
    writeln!(f, "}}")
}

fn write_inst(f: &mut fmt::Formatter<'_>, m: &Module, func: &Function, inst: &Inst) -> fmt::Result {
    match inst {
        Inst::Bin {
            op,
            ty,
            dst,
            lhs,
            rhs,
        } => {
            write!(
                f,
                "  %{} = {}.{} ",
                func.local_name(*dst),
                op.mnemonic(),
                ty
            )?;
            write_value(f, m, func, *lhs)?;
            write!(f, ", ")?;
            write_value(f, m, func, *rhs)?;
            writeln!(f)
        }
        Inst::Cmp {
            op,
            ty,
            dst,
            lhs,
            rhs,
        } => {
            write!(
                f,
                "  %{} = cmp.{}.{} ",
                func.local_name(*dst),
                op.mnemonic(),
                ty
            )?;
            write_value(f, m, func, *lhs)?;
            write!(f, ", ")?;
            write_value(f, m, func, *rhs)?;
            writeln!(f)
        }
        Inst::Call { callee, args, dst } => {
            write!(f, "  ")?;
            if let Some(dst) = dst {
                write!(f, "%{} = ", func.local_name(*dst))?;
            }
            let name = match callee {
                Callee::Extern(id) => m
                    .decls
                    .extern_decl(*id)
                    .map_or("<unknown-extern>", |d| d.name.as_str()),
                Callee::Function(name) => name.as_str(),
            };
            write!(f, "call @{name}(")?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_value(f, m, func, *arg)?;
            }
            writeln!(f, ")")
        }
    }
}

fn write_term(
    f: &mut fmt::Formatter<'_>,
    m: &Module,
    func: &Function,
    term: &Terminator,
) -> fmt::Result {
    match term {
        Terminator::Ret(None) => writeln!(f, "  ret"),
        Terminator::Ret(Some(v)) => {
            write!(f, "  ret ")?;
            write_value(f, m, func, *v)?;
            writeln!(f)
        }
        Terminator::Br {
            cond,
            then_blk,
            else_blk,
        } => {
            write!(f, "  br ")?;
            write_value(f, m, func, *cond)?;
            writeln!(
                f,
                ", {}, {}",
                func.block(*then_blk).label,
                func.block(*else_blk).label
            )
        }
        Terminator::Jmp(target) => writeln!(f, "  jmp {}", func.block(*target).label),
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, m: &Module, func: &Function, v: Value) -> fmt::Result {
    match v {
        Value::Local(id) => write!(f, "%{}", func.local_name(id)),
        Value::Const(Const::Int(i)) => write!(f, "{i}"),
        Value::Const(Const::Float(x)) => write!(f, "{x:?}"),
        Value::Const(Const::Null) => write!(f, "null"),
        Value::Str(id) => {
            let text = m.decls.lookup_str(id).unwrap_or("<unknown-string>");
            write!(f, "\"{}\"", escape(text))
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out
}
