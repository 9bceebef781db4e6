//! Recursive-descent parser for the textual form.

use logos::Logos;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::function::{BlockId, FnAttr, Function, Param};
use crate::inst::{BinOp, Callee, CmpOp, Inst, Terminator};
use crate::lexer::Token;
use crate::module::{ExternDecl, Module};
use crate::ty::Ty;
use crate::value::{Const, LocalId, Value};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("line {line}: unrecognized token")]
    Lex { line: usize },
    #[error("line {line}: unexpected {found}, expected {expected}")]
    Unexpected {
        line: usize,
        found: String,
        expected: &'static str,
    },
    #[error("unexpected end of input, expected {expected}")]
    Eof { expected: &'static str },
    #[error("line {line}: unknown type `{name}`")]
    UnknownType { line: usize, name: String },
    #[error("line {line}: unknown operation `{name}`")]
    UnknownOp { line: usize, name: String },
    #[error("line {line}: unknown function attribute `{name}`")]
    UnknownAttr { line: usize, name: String },
    #[error("line {line}: use of undefined value `%{name}`")]
    UndefinedLocal { line: usize, name: String },
    #[error("line {line}: instruction after block terminator")]
    AfterTerminator { line: usize },
    #[error("undefined label `{label}` in function `@{function}`")]
    UndefinedLabel { label: String, function: String },
    #[error("duplicate label `{label}` in function `@{function}`")]
    DuplicateLabel { label: String, function: String },
}

/// Parse the textual form of a whole module.
pub fn parse_module(name: &str, src: &str) -> Result<Module, ParseError> {
    let mut toks = Vec::new();
    for (res, span) in Token::lexer(src).spanned() {
        match res {
            Ok(tok) => toks.push((tok, span.start)),
            Err(()) => {
                return Err(ParseError::Lex {
                    line: line_of(src, span.start),
                })
            }
        }
    }
    Parser {
        src,
        toks,
        pos: 0,
        module: Module::new(name),
    }
    .run()
}

fn line_of(src: &str, offset: usize) -> usize {
    src.as_bytes()[..offset.min(src.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

// Branch targets may name blocks that appear later in the function, so
// terminators are recorded with label names and resolved once the whole
// body has been seen.
enum PendingTerm {
    Br {
        cond: Value,
        then_label: String,
        else_label: String,
    },
    Jmp(String),
}

struct Pending {
    block: BlockId,
    term: PendingTerm,
}

struct Parser<'s> {
    src: &'s str,
    toks: Vec<(Token, usize)>,
    pos: usize,
    module: Module,
}

impl Parser<'_> {
    fn run(mut self) -> Result<Module, ParseError> {
        loop {
            match self.peek() {
                None => break,
                Some(Token::Extern) => self.parse_extern()?,
                Some(Token::Fn) => self.parse_function()?,
                Some(_) => return Err(self.unexpected("`extern` or `fn`")),
            }
        }
        Ok(self.module)
    }

    // -- token plumbing --

    fn peek(&self) -> Option<&Token> {
        self.toks.get(self.pos).map(|(t, _)| t)
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.toks.get(self.pos) {
            Some((tok, off)) => ParseError::Unexpected {
                line: line_of(self.src, *off),
                found: tok.describe(),
                expected,
            },
            None => ParseError::Eof { expected },
        }
    }

    fn eat(&mut self, want: &Token) -> bool {
        if self.peek() == Some(want) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, want: &Token, desc: &'static str) -> Result<(), ParseError> {
        if self.eat(want) {
            Ok(())
        } else {
            Err(self.unexpected(desc))
        }
    }

    fn expect_global(&mut self) -> Result<String, ParseError> {
        match self.toks.get(self.pos) {
            Some((Token::Global(name), _)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected("`@name`")),
        }
    }

    fn expect_local(&mut self) -> Result<(String, usize), ParseError> {
        match self.toks.get(self.pos) {
            Some((Token::Local(name), off)) => {
                let out = (name.clone(), line_of(self.src, *off));
                self.pos += 1;
                Ok(out)
            }
            _ => Err(self.unexpected("`%name`")),
        }
    }

    fn expect_ident(&mut self) -> Result<(String, usize), ParseError> {
        match self.toks.get(self.pos) {
            Some((Token::Ident(name), off)) => {
                let out = (name.clone(), line_of(self.src, *off));
                self.pos += 1;
                Ok(out)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    // -- grammar --

    fn parse_ty(&mut self) -> Result<Ty, ParseError> {
        let (name, line) = self.expect_ident()?;
        Ty::from_name(&name).ok_or(ParseError::UnknownType { line, name })
    }

    fn parse_extern(&mut self) -> Result<(), ParseError> {
        self.pos += 1; // `extern`
        let name = self.expect_global()?;
        self.expect(&Token::LParen, "`(`")?;
        let mut params = Vec::new();
        let mut variadic = false;
        if !self.eat(&Token::RParen) {
            loop {
                if self.eat(&Token::Ellipsis) {
                    variadic = true;
                    self.expect(&Token::RParen, "`)`")?;
                    break;
                }
                params.push(self.parse_ty()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::RParen, "`,` or `)`")?;
                break;
            }
        }
        self.expect(&Token::Arrow, "`->`")?;
        let ret = self.parse_ty()?;
        self.module.decls.get_or_insert_extern(ExternDecl {
            name,
            params,
            ret,
            variadic,
        });
        Ok(())
    }

    fn parse_function(&mut self) -> Result<(), ParseError> {
        self.pos += 1; // `fn`
        let name = self.expect_global()?;
        self.expect(&Token::LParen, "`(`")?;
        let mut params = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                let ty = self.parse_ty()?;
                let pname = if matches!(self.peek(), Some(Token::Local(_))) {
                    Some(self.expect_local()?.0)
                } else {
                    None
                };
                params.push(Param { name: pname, ty });
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::RParen, "`,` or `)`")?;
                break;
            }
        }
        self.expect(&Token::Arrow, "`->`")?;
        let ret_ty = self.parse_ty()?;

        let mut func = Function::new(name, params, ret_ty);
        while matches!(self.peek(), Some(Token::Ident(_))) {
            let (attr, line) = self.expect_ident()?;
            let attr = FnAttr::from_name(&attr)
                .ok_or(ParseError::UnknownAttr { line, name: attr })?;
            func.attrs.push(attr);
        }
        self.expect(&Token::LBrace, "`{`")?;

        let mut locals: FxHashMap<String, LocalId> = FxHashMap::default();
        for i in 0..func.params.len() {
            let id = func.param_local(i);
            locals.insert(func.local_name(id).to_owned(), id);
        }
        let mut labels: FxHashMap<String, BlockId> = FxHashMap::default();
        let mut pending: Vec<Pending> = Vec::new();
        let mut current: Option<BlockId> = None;

        loop {
            match self.peek() {
                Some(Token::RBrace) => {
                    self.pos += 1;
                    break;
                }
                Some(Token::Ident(_)) => {
                    let (label, _) = self.expect_ident()?;
                    self.expect(&Token::Colon, "`:`")?;
                    if labels.contains_key(&label) {
                        return Err(ParseError::DuplicateLabel {
                            label,
                            function: func.name.clone(),
                        });
                    }
                    let id = func.add_block(label.clone());
                    labels.insert(label, id);
                    current = Some(id);
                }
                Some(
                    Token::Local(_) | Token::Call | Token::Ret | Token::Br | Token::Jmp,
                ) => {
                    let Some(block) = current else {
                        return Err(self.unexpected("block label"));
                    };
                    self.parse_stmt(&mut func, &mut locals, block, &mut pending)?;
                }
                _ => return Err(self.unexpected("label, instruction, or `}`")),
            }
        }

        for Pending { block, term } in pending {
            let term = match term {
                PendingTerm::Jmp(label) => {
                    Terminator::Jmp(Self::resolve_label(&labels, label, &func.name)?)
                }
                PendingTerm::Br {
                    cond,
                    then_label,
                    else_label,
                } => Terminator::Br {
                    cond,
                    then_blk: Self::resolve_label(&labels, then_label, &func.name)?,
                    else_blk: Self::resolve_label(&labels, else_label, &func.name)?,
                },
            };
            func.block_mut(block).term = Some(term);
        }

        self.module.functions.push(func);
        Ok(())
    }

    fn resolve_label(
        labels: &FxHashMap<String, BlockId>,
        label: String,
        function: &str,
    ) -> Result<BlockId, ParseError> {
        labels.get(&label).copied().ok_or(ParseError::UndefinedLabel {
            label,
            function: function.to_owned(),
        })
    }

    fn parse_stmt(
        &mut self,
        func: &mut Function,
        locals: &mut FxHashMap<String, LocalId>,
        block: BlockId,
        pending: &mut Vec<Pending>,
    ) -> Result<(), ParseError> {
        let terminated =
            func.block(block).term.is_some() || pending.iter().any(|p| p.block == block);
        if terminated {
            return Err(ParseError::AfterTerminator {
                line: self.cur_line(),
            });
        }
        match self.peek() {
            Some(Token::Local(_)) => {
                let (dst_name, _) = self.expect_local()?;
                self.expect(&Token::Assign, "`=`")?;
                let inst = self.parse_def_rhs(func, locals, &dst_name)?;
                func.block_mut(block).insts.push(inst);
                Ok(())
            }
            Some(Token::Call) => {
                self.pos += 1;
                let (callee, args) = self.parse_call_tail(locals)?;
                func.block_mut(block).insts.push(Inst::Call {
                    callee,
                    args,
                    dst: None,
                });
                Ok(())
            }
            Some(Token::Ret) => {
                self.pos += 1;
                let value = if self.at_value_start() {
                    Some(self.parse_value(locals)?)
                } else {
                    None
                };
                func.block_mut(block).term = Some(Terminator::Ret(value));
                Ok(())
            }
            Some(Token::Br) => {
                self.pos += 1;
                let cond = self.parse_value(locals)?;
                self.expect(&Token::Comma, "`,`")?;
                let (then_label, _) = self.expect_ident()?;
                self.expect(&Token::Comma, "`,`")?;
                let (else_label, _) = self.expect_ident()?;
                pending.push(Pending {
                    block,
                    term: PendingTerm::Br {
                        cond,
                        then_label,
                        else_label,
                    },
                });
                Ok(())
            }
            Some(Token::Jmp) => {
                self.pos += 1;
                let (label, _) = self.expect_ident()?;
                pending.push(Pending {
                    block,
                    term: PendingTerm::Jmp(label),
                });
                Ok(())
            }
            _ => Err(self.unexpected("instruction")),
        }
    }

    fn parse_def_rhs(
        &mut self,
        func: &mut Function,
        locals: &mut FxHashMap<String, LocalId>,
        dst_name: &str,
    ) -> Result<Inst, ParseError> {
        match self.peek() {
            Some(Token::Call) => {
                self.pos += 1;
                let (callee, args) = self.parse_call_tail(locals)?;
                let dst = Self::define_local(func, locals, dst_name);
                Ok(Inst::Call {
                    callee,
                    args,
                    dst: Some(dst),
                })
            }
            Some(Token::Cmp) => {
                self.pos += 1;
                self.expect(&Token::Dot, "`.`")?;
                let (op, line) = self.expect_ident()?;
                let op =
                    CmpOp::from_mnemonic(&op).ok_or(ParseError::UnknownOp { line, name: op })?;
                self.expect(&Token::Dot, "`.`")?;
                let ty = self.parse_ty()?;
                let lhs = self.parse_value(locals)?;
                self.expect(&Token::Comma, "`,`")?;
                let rhs = self.parse_value(locals)?;
                let dst = Self::define_local(func, locals, dst_name);
                Ok(Inst::Cmp {
                    op,
                    ty,
                    dst,
                    lhs,
                    rhs,
                })
            }
            Some(Token::Ident(_)) => {
                let (op, line) = self.expect_ident()?;
                let op =
                    BinOp::from_mnemonic(&op).ok_or(ParseError::UnknownOp { line, name: op })?;
                self.expect(&Token::Dot, "`.`")?;
                let ty = self.parse_ty()?;
                let lhs = self.parse_value(locals)?;
                self.expect(&Token::Comma, "`,`")?;
                let rhs = self.parse_value(locals)?;
                let dst = Self::define_local(func, locals, dst_name);
                Ok(Inst::Bin {
                    op,
                    ty,
                    dst,
                    lhs,
                    rhs,
                })
            }
            _ => Err(self.unexpected("instruction")),
        }
    }

    fn define_local(
        func: &mut Function,
        locals: &mut FxHashMap<String, LocalId>,
        name: &str,
    ) -> LocalId {
        if let Some(&id) = locals.get(name) {
            return id;
        }
        let id = func.define_local(name);
        locals.insert(name.to_owned(), id);
        id
    }

    fn parse_call_tail(
        &mut self,
        locals: &FxHashMap<String, LocalId>,
    ) -> Result<(Callee, Vec<Value>), ParseError> {
        let name = self.expect_global()?;
        self.expect(&Token::LParen, "`(`")?;
        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.parse_value(locals)?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::RParen, "`,` or `)`")?;
                break;
            }
        }
        let callee = match self.module.decls.extern_named(&name) {
            Some(id) => Callee::Extern(id),
            None => Callee::Function(name),
        };
        Ok((callee, args))
    }

    fn at_value_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Local(_) | Token::Int(_) | Token::Float(_) | Token::Null | Token::Str(_)
            )
        )
    }

    fn parse_value(
        &mut self,
        locals: &FxHashMap<String, LocalId>,
    ) -> Result<Value, ParseError> {
        match self.toks.get(self.pos) {
            Some((Token::Local(name), off)) => {
                let value = locals.get(name).copied().map(Value::Local).ok_or_else(|| {
                    ParseError::UndefinedLocal {
                        line: line_of(self.src, *off),
                        name: name.clone(),
                    }
                })?;
                self.pos += 1;
                Ok(value)
            }
            Some((Token::Int(v), _)) => {
                let value = Value::Const(Const::Int(*v));
                self.pos += 1;
                Ok(value)
            }
            Some((Token::Float(v), _)) => {
                let value = Value::Const(Const::Float(*v));
                self.pos += 1;
                Ok(value)
            }
            Some((Token::Null, _)) => {
                self.pos += 1;
                Ok(Value::Const(Const::Null))
            }
            Some((Token::Str(text), _)) => {
                let text = text.clone();
                self.pos += 1;
                Ok(Value::Str(self.module.decls.intern_str(&text)))
            }
            _ => Err(self.unexpected("value")),
        }
    }

    fn cur_line(&self) -> usize {
        self.toks
            .get(self.pos)
            .or_else(|| self.toks.last())
            .map_or(1, |(_, off)| line_of(self.src, *off))
    }
}
