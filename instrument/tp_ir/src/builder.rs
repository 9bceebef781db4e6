//! Insertion-cursor instruction builder.
//!
//! The builder is anchored at a program point inside one block and inserts
//! instructions in call order at that point. It never removes or reorders
//! what is already there, so the original instruction stream survives any
//! sequence of builder operations.

use crate::function::{BlockId, Function};
use crate::inst::{Callee, Inst};
use crate::value::{LocalId, Value};

pub struct InstBuilder<'f> {
    func: &'f mut Function,
    block: BlockId,
    at: usize,
}

impl<'f> InstBuilder<'f> {
    /// Anchor before the first instruction of `block`.
    pub fn at_block_start(func: &'f mut Function, block: BlockId) -> InstBuilder<'f> {
        InstBuilder { func, block, at: 0 }
    }

    /// Anchor after the last instruction of `block`, immediately before its
    /// terminator.
    pub fn before_terminator(func: &'f mut Function, block: BlockId) -> InstBuilder<'f> {
        let at = func.block(block).insts.len();
        InstBuilder { func, block, at }
    }

    /// Insert an instruction at the cursor and advance past it, so
    /// consecutive insertions keep their call order.
    pub fn insert(&mut self, inst: Inst) {
        self.func.block_mut(self.block).insts.insert(self.at, inst);
        self.at += 1;
    }

    /// Insert a call whose result is discarded.
    pub fn call(&mut self, callee: Callee, args: Vec<Value>) {
        self.insert(Inst::Call {
            callee,
            args,
            dst: None,
        });
    }

    /// Insert a call and bind its result to a fresh temporary.
    pub fn call_with_result(&mut self, callee: Callee, args: Vec<Value>, hint: &str) -> LocalId {
        let dst = self.func.fresh_local(hint);
        self.insert(Inst::Call {
            callee,
            args,
            dst: Some(dst),
        });
        dst
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Param;
    use crate::inst::Terminator;
    use crate::ty::Ty;
    use crate::value::Const;
    use pretty_assertions::assert_eq;

    fn ret_const_fn() -> Function {
        let mut f = Function::new("f", Vec::<Param>::new(), Ty::I32);
        let entry = f.add_block("entry");
        f.block_mut(entry).term = Some(Terminator::Ret(Some(Value::Const(Const::Int(7)))));
        f
    }

    #[test]
    fn inserts_keep_call_order_at_block_start() {
        let mut f = ret_const_fn();
        let entry = f.entry().unwrap();
        let mut b = InstBuilder::at_block_start(&mut f, entry);
        b.call(Callee::Function("first".into()), vec![]);
        b.call(Callee::Function("second".into()), vec![]);

        let names: Vec<_> = f
            .block(entry)
            .insts
            .iter()
            .map(|i| match i {
                Inst::Call {
                    callee: Callee::Function(n),
                    ..
                } => n.clone(),
                other => panic!("unexpected inst {other:?}"),
            })
            .collect();
        assert_eq!(names, vec!["first".to_owned(), "second".to_owned()]);
    }

    #[test]
    fn before_terminator_leaves_existing_insts_in_front() {
        let mut f = ret_const_fn();
        let entry = f.entry().unwrap();
        {
            let mut b = InstBuilder::at_block_start(&mut f, entry);
            b.call(Callee::Function("existing".into()), vec![]);
        }
        let mut b = InstBuilder::before_terminator(&mut f, entry);
        b.call(Callee::Function("emitted".into()), vec![]);

        let block = f.block(entry);
        assert_eq!(block.insts.len(), 2);
        assert!(matches!(
            &block.insts[1],
            Inst::Call { callee: Callee::Function(n), .. } if n == "emitted"
        ));
        // Terminator untouched.
        assert_eq!(
            block.term,
            Some(Terminator::Ret(Some(Value::Const(Const::Int(7)))))
        );
    }

    #[test]
    fn call_with_result_mints_fresh_temporaries() {
        let mut f = ret_const_fn();
        let entry = f.entry().unwrap();
        let mut b = InstBuilder::before_terminator(&mut f, entry);
        let fd0 = b.call_with_result(Callee::Function("open".into()), vec![], "fd");
        let fd1 = b.call_with_result(Callee::Function("open".into()), vec![], "fd");
        assert_ne!(fd0, fd1);
        assert_eq!(f.local_name(fd0), "fd");
        assert_eq!(f.local_name(fd1), "fd.1");
    }
}
