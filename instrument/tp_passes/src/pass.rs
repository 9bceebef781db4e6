//! Pass trait and module-traversal driver.

use tp_ir::{Decls, FnAttr, Function, Module};

/// Whether a pass changed the function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Modified,
    Unchanged,
}

/// A transform invoked once per function during a module traversal.
pub trait FunctionPass {
    fn name(&self) -> &'static str;

    /// Required passes run even on functions marked `optnone`.
    fn is_required(&self) -> bool {
        false
    }

    fn run(&mut self, decls: &mut Decls, func: &mut Function) -> PassOutcome;
}

/// Runs a pipeline of function passes over every function of a module.
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn FunctionPass>>,
}

impl PassManager {
    pub fn new() -> PassManager {
        PassManager { passes: Vec::new() }
    }

    pub fn add(&mut self, pass: impl FunctionPass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run every pass on every function. Returns `true` when any pass
    /// modified any function.
    pub fn run(&mut self, module: &mut Module) -> bool {
        let mut modified = false;
        for func in &mut module.functions {
            for pass in &mut self.passes {
                if func.has_attr(FnAttr::OptNone) && !pass.is_required() {
                    tracing::debug!(
                        pass = pass.name(),
                        function = %func.name,
                        "skipping optnone function"
                    );
                    continue;
                }
                let outcome = pass.run(&mut module.decls, func);
                tracing::debug!(
                    pass = pass.name(),
                    function = %func.name,
                    ?outcome,
                    "pass finished"
                );
                modified |= outcome == PassOutcome::Modified;
            }
        }
        modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tp_ir::parse_module;

    /// Appends a visited-function log entry; optionally claims to modify.
    struct Probe {
        required: bool,
        visited: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
    }

    impl FunctionPass for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn is_required(&self) -> bool {
            self.required
        }

        fn run(&mut self, _decls: &mut Decls, func: &mut Function) -> PassOutcome {
            self.visited.borrow_mut().push(func.name.clone());
            PassOutcome::Unchanged
        }
    }

    const TWO_FNS: &str = "\
fn @plain() -> void {
entry:
  ret
}

fn @frozen() -> void optnone {
entry:
  ret
}
";

    #[test]
    fn optional_passes_skip_optnone_functions() {
        let mut m = parse_module("t", TWO_FNS).expect("parse");
        let visited = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut pm = PassManager::new();
        pm.add(Probe {
            required: false,
            visited: visited.clone(),
        });
        let modified = pm.run(&mut m);
        assert!(!modified);
        assert_eq!(*visited.borrow(), vec!["plain".to_owned()]);
    }

    #[test]
    fn required_passes_visit_optnone_functions() {
        let mut m = parse_module("t", TWO_FNS).expect("parse");
        let visited = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut pm = PassManager::new();
        pm.add(Probe {
            required: true,
            visited: visited.clone(),
        });
        pm.run(&mut m);
        assert_eq!(
            *visited.borrow(),
            vec!["plain".to_owned(), "frozen".to_owned()]
        );
    }
}
