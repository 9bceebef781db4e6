//! Non-mutating signature report.

use std::fmt::Write as _;

use tp_ir::{Decls, Function};

use crate::pass::{FunctionPass, PassOutcome};

/// Collects one line per visited function describing its signature:
/// `<name>,args:[<ty>;<ty>;...],ret:<ty>`.
///
/// Analysis only; every function reports `Unchanged`.
#[derive(Debug, Default)]
pub struct SignatureReportPass {
    lines: Vec<String>,
}

impl SignatureReportPass {
    pub fn new() -> SignatureReportPass {
        SignatureReportPass::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Joined report text, one line per function.
    pub fn into_report(self) -> String {
        self.lines
            .into_iter()
            .map(|line| line + "\n")
            .collect()
    }
}

impl FunctionPass for SignatureReportPass {
    fn name(&self) -> &'static str {
        "signature-report"
    }

    fn is_required(&self) -> bool {
        true
    }

    fn run(&mut self, _decls: &mut Decls, func: &mut Function) -> PassOutcome {
        let mut line = format!("{},args:[", func.name);
        for param in &func.params {
            let _ = write!(line, "{};", param.ty);
        }
        let _ = write!(line, "],ret:{}", func.ret_ty);
        self.lines.push(line);
        PassOutcome::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tp_ir::parse_module;

    #[test]
    fn reports_signatures_without_mutating() {
        let src = "\
fn @add(i32 %a, i32 %b) -> i32 {
entry:
  %t0 = add.i32 %a, %b
  ret %t0
}

fn @log() -> void {
entry:
  ret
}
";
        let mut m = parse_module("t", src).expect("parse");
        let before = m.to_string();
        let mut pass = SignatureReportPass::new();
        let mut funcs = std::mem::take(&mut m.functions);
        for func in &mut funcs {
            assert_eq!(pass.run(&mut m.decls, func), PassOutcome::Unchanged);
        }
        m.functions = funcs;
        assert_eq!(m.to_string(), before);
        assert_eq!(
            pass.into_report(),
            "add,args:[i32;i32;],ret:i32\nlog,args:[],ret:void\n"
        );
    }
}
