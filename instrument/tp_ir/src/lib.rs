//! Tracepoint IR - the instruction stream the instrumentation passes rewrite.
//!
//! This crate contains the host-side data structures the passes operate on:
//! - Static types (`Ty`) and value operands (`Value`, `Const`)
//! - Instructions, basic blocks, and explicit terminators
//! - Functions with typed parameters and a per-function local table
//! - Modules owning functions, extern declarations, and interned string
//!   constants
//! - An insertion-cursor builder (`InstBuilder`) that only ever inserts -
//!   existing instructions are never removed or reordered
//! - A textual form (`.tir`) with a `logos` lexer, a recursive-descent
//!   parser, and `Display` printing that round-trips everything the parser
//!   accepts
//!
//! # Design Philosophy
//!
//! - **Index everything**: locals, blocks, externs, and strings are `u32`
//!   newtype indices into per-owner tables, not boxed graphs.
//! - **Explicit terminators**: a block carries `Option<Terminator>`; `None`
//!   models a block handed over mid-construction, which consumers must
//!   tolerate rather than reject.
//! - **Read-mostly**: passes query shape through accessors and mutate only
//!   through the builder.

mod builder;
mod display;
mod function;
mod inst;
mod lexer;
mod module;
mod parse;
mod ty;
mod value;

pub use builder::InstBuilder;
pub use function::{Block, BlockId, FnAttr, Function, Param};
pub use inst::{BinOp, Callee, CmpOp, Inst, Terminator};
pub use module::{Decls, ExternDecl, ExternId, Module};
pub use parse::{parse_module, ParseError};
pub use ty::{Scalar, Ty};
pub use value::{Const, LocalId, StrId, Value};
