//! Tokens of the textual form.

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r";[^\n]*")]
pub(crate) enum Token {
    #[token("fn")]
    Fn,
    #[token("extern")]
    Extern,
    #[token("call")]
    Call,
    #[token("cmp")]
    Cmp,
    #[token("ret")]
    Ret,
    #[token("br")]
    Br,
    #[token("jmp")]
    Jmp,
    #[token("null")]
    Null,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("=")]
    Assign,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("->")]
    Arrow,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_owned())]
    Ident(String),
    /// `@name` - function or extern symbol.
    #[regex(r"@[A-Za-z_][A-Za-z0-9_.]*", |lex| lex.slice()[1..].to_owned())]
    Global(String),
    /// `%name` - local slot.
    #[regex(r"%[A-Za-z_][A-Za-z0-9_.]*", |lex| lex.slice()[1..].to_owned())]
    Local(String),
    #[regex(r#""(?:[^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    Str(String),
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),
    #[regex(
        r"-?(?:[0-9]+\.[0-9]+(?:[eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+)",
        |lex| lex.slice().parse::<f64>().ok()
    )]
    Float(f64),
}

impl Token {
    /// Short description used in parse-error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Fn => "`fn`".into(),
            Token::Extern => "`extern`".into(),
            Token::Call => "`call`".into(),
            Token::Cmp => "`cmp`".into(),
            Token::Ret => "`ret`".into(),
            Token::Br => "`br`".into(),
            Token::Jmp => "`jmp`".into(),
            Token::Null => "`null`".into(),
            Token::LParen => "`(`".into(),
            Token::RParen => "`)`".into(),
            Token::LBrace => "`{`".into(),
            Token::RBrace => "`}`".into(),
            Token::Comma => "`,`".into(),
            Token::Colon => "`:`".into(),
            Token::Assign => "`=`".into(),
            Token::Dot => "`.`".into(),
            Token::Ellipsis => "`...`".into(),
            Token::Arrow => "`->`".into(),
            Token::Ident(name) => format!("`{name}`"),
            Token::Global(name) => format!("`@{name}`"),
            Token::Local(name) => format!("`%{name}`"),
            Token::Str(_) => "string literal".into(),
            Token::Int(v) => format!("`{v}`"),
            Token::Float(v) => format!("`{v}`"),
        }
    }
}

// Strips the surrounding quotes and resolves escape sequences. Unknown
// escapes keep the escaped character as-is.
fn unescape(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use logos::Logos;
    use pretty_assertions::assert_eq;

    fn lex(src: &str) -> Vec<Token> {
        Token::lexer(src).map(|t| t.expect("lex error")).collect()
    }

    #[test]
    fn lexes_mnemonics_as_ident_dot_ident() {
        assert_eq!(
            lex("add.i32"),
            vec![
                Token::Ident("add".into()),
                Token::Dot,
                Token::Ident("i32".into())
            ]
        );
    }

    #[test]
    fn lexes_string_escapes() {
        assert_eq!(
            lex(r#""output:void,\n""#),
            vec![Token::Str("output:void,\n".into())]
        );
    }

    #[test]
    fn lexes_numbers() {
        assert_eq!(
            lex("42 -7 1.5 -0.25"),
            vec![
                Token::Int(42),
                Token::Int(-7),
                Token::Float(1.5),
                Token::Float(-0.25)
            ]
        );
    }

    #[test]
    fn skips_line_comments() {
        assert_eq!(
            lex("ret ; trailing comment\njmp"),
            vec![Token::Ret, Token::Jmp]
        );
    }

    #[test]
    fn keywords_do_not_swallow_longer_idents() {
        assert_eq!(lex("retval"), vec![Token::Ident("retval".into())]);
    }
}
