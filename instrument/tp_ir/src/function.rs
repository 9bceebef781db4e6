//! Functions, basic blocks, and function attributes.

use crate::inst::{Inst, Terminator};
use crate::ty::Ty;
use crate::value::LocalId;

/// Index of a basic block within a function. Block 0 is the entry block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub(crate) u32);

impl BlockId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Function attributes carried through from the front end.
///
/// `OptNone` marks a function the optimization pipeline must leave alone;
/// required passes run on it anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FnAttr {
    OptNone,
    NoInline,
    Cold,
}

impl FnAttr {
    pub(crate) const fn name(self) -> &'static str {
        match self {
            FnAttr::OptNone => "optnone",
            FnAttr::NoInline => "noinline",
            FnAttr::Cold => "cold",
        }
    }

    pub(crate) fn from_name(name: &str) -> Option<FnAttr> {
        Some(match name {
            "optnone" => FnAttr::OptNone,
            "noinline" => FnAttr::NoInline,
            "cold" => FnAttr::Cold,
            _ => return None,
        })
    }
}

/// A function parameter. The name may be absent when the front end did not
/// carry one; an `arg<N>` local name is minted so the slot stays addressable.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Option<String>,
    pub ty: Ty,
}

/// A straight-line instruction sequence ending in at most one terminator.
///
/// `term == None` models a block handed over mid-construction. Consumers
/// skip such blocks rather than rejecting the whole function.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub label: String,
    pub insts: Vec<Inst>,
    pub term: Option<Terminator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub ret_ty: Ty,
    pub attrs: Vec<FnAttr>,
    blocks: Vec<Block>,
    /// Names of all local slots; the first `params.len()` are the parameters.
    locals: Vec<String>,
}

impl Function {
    pub fn new(name: impl Into<String>, params: Vec<Param>, ret_ty: Ty) -> Function {
        let locals = params
            .iter()
            .enumerate()
            .map(|(i, p)| p.name.clone().unwrap_or_else(|| format!("arg{i}")))
            .collect();
        Function {
            name: name.into(),
            params,
            ret_ty,
            attrs: Vec::new(),
            blocks: Vec::new(),
            locals,
        }
    }

    pub fn has_attr(&self, attr: FnAttr) -> bool {
        self.attrs.contains(&attr)
    }

    /// Append an empty block and return its id.
    pub fn add_block(&mut self, label: impl Into<String>) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block {
            label: label.into(),
            insts: Vec::new(),
            term: None,
        });
        id
    }

    /// Entry block, if the function has a body.
    pub fn entry(&self) -> Option<BlockId> {
        if self.blocks.is_empty() {
            None
        } else {
            Some(BlockId(0))
        }
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        (0..self.blocks.len() as u32).map(BlockId)
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.index()]
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Local slot of the `index`-th parameter.
    pub fn param_local(&self, index: usize) -> LocalId {
        debug_assert!(index < self.params.len());
        LocalId(index as u32)
    }

    pub fn local_name(&self, id: LocalId) -> &str {
        &self.locals[id.index()]
    }

    pub fn num_locals(&self) -> usize {
        self.locals.len()
    }

    /// Mint a new temporary with a unique name derived from `hint`.
    pub fn fresh_local(&mut self, hint: &str) -> LocalId {
        let mut name = hint.to_owned();
        let mut n = 0u32;
        while self.locals.iter().any(|l| l == &name) {
            n += 1;
            name = format!("{hint}.{n}");
        }
        let id = LocalId(self.locals.len() as u32);
        self.locals.push(name);
        id
    }

    /// Register a local under an exact name. The parser owns uniqueness.
    pub(crate) fn define_local(&mut self, name: &str) -> LocalId {
        let id = LocalId(self.locals.len() as u32);
        self.locals.push(name.to_owned());
        id
    }
}
