//! Runtime errors raised while executing an instrumented module.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RtError {
    #[error("unknown function `@{0}`")]
    UnknownFunction(String),

    #[error("unknown extern `@{0}`")]
    UnknownExtern(String),

    #[error("`@{function}` expects {expected} argument(s), got {got}")]
    ArityMismatch {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error("type mismatch in `@{function}`: expected {expected}, got {got}")]
    TypeMismatch {
        function: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("read of uninitialized local `%{local}` in `@{function}`")]
    UninitializedLocal { function: String, local: String },

    #[error("block `{block}` in `@{function}` has no terminator")]
    MissingTerminator { function: String, block: String },

    #[error("function `@{0}` has no body")]
    EmptyFunction(String),

    #[error("division by zero in `@{0}`")]
    DivisionByZero(String),

    #[error("call depth exceeded ({0} frames)")]
    CallDepthExceeded(usize),

    #[error("dangling string pointer 0x{0:x}")]
    DanglingString(u64),

    #[error(transparent)]
    Format(#[from] FormatError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("unknown format directive `%{0}`")]
    UnknownDirective(char),

    #[error("missing argument for format directive `%{0}`")]
    MissingArgument(char),

    #[error("format directive `%{directive}` cannot render a {kind} value")]
    WrongArgumentKind {
        directive: char,
        kind: &'static str,
    },

    #[error("dangling `%` at end of format string")]
    TrailingPercent,
}
