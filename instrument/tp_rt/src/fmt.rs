//! C-style record formatting for the sink primitives.
//!
//! Supports exactly the directives the passes generate: `%d`, `%f`, `%lf`,
//! `%p`, and the `%%` escape. Surplus arguments are ignored, matching
//! varargs semantics; a missing or wrongly-typed argument is an error of
//! the interpreted program.

use crate::errors::FormatError;
use crate::value::RtValue;

pub(crate) fn format_record(fmt: &str, args: &[RtValue]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(fmt.len());
    let mut args = args.iter();
    let mut next_arg = |directive: char| {
        args.next()
            .copied()
            .ok_or(FormatError::MissingArgument(directive))
    };

    let mut chars = fmt.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => return Err(FormatError::TrailingPercent),
            Some('%') => out.push('%'),
            Some('d') => match next_arg('d')? {
                RtValue::Int(v) => out.push_str(&v.to_string()),
                other => {
                    return Err(FormatError::WrongArgumentKind {
                        directive: 'd',
                        kind: other.kind(),
                    })
                }
            },
            Some('f') => push_float(&mut out, next_arg('f')?, 'f')?,
            Some('l') => match chars.next() {
                Some('f') => push_float(&mut out, next_arg('f')?, 'f')?,
                _ => return Err(FormatError::UnknownDirective('l')),
            },
            Some('p') => match next_arg('p')? {
                RtValue::Ptr(p) => {
                    out.push_str(&format!("0x{p:x}"));
                }
                other => {
                    return Err(FormatError::WrongArgumentKind {
                        directive: 'p',
                        kind: other.kind(),
                    })
                }
            },
            Some(other) => return Err(FormatError::UnknownDirective(other)),
        }
    }
    Ok(out)
}

// Varargs promote single-precision floats to double, so `%f` and `%lf`
// both accept either width.
fn push_float(out: &mut String, value: RtValue, directive: char) -> Result<(), FormatError> {
    let v = match value {
        RtValue::F32(v) => f64::from(v),
        RtValue::F64(v) => v,
        other => {
            return Err(FormatError::WrongArgumentKind {
                directive,
                kind: other.kind(),
            })
        }
    };
    out.push_str(&format!("{v:.6}"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn substitutes_integer_directive() {
        let out = format_record("input:integer:%d,", &[RtValue::Int(42)]).expect("format");
        assert_eq!(out, "input:integer:42,");
    }

    #[test]
    fn substitutes_float_directives_with_six_decimals() {
        let out = format_record("%f|%lf", &[RtValue::F32(1.5), RtValue::F64(-0.25)])
            .expect("format");
        assert_eq!(out, "1.500000|-0.250000");
    }

    #[test]
    fn substitutes_pointer_directive() {
        let out = format_record("output:pointer:%p,\n", &[RtValue::Ptr(0xdead)])
            .expect("format");
        assert_eq!(out, "output:pointer:0xdead,\n");
    }

    #[test]
    fn percent_escape_consumes_no_argument() {
        let out = format_record("100%% of %d", &[RtValue::Int(3)]).expect("format");
        assert_eq!(out, "100% of 3");
    }

    #[test]
    fn surplus_arguments_are_ignored() {
        let out = format_record("plain", &[RtValue::Int(1)]).expect("format");
        assert_eq!(out, "plain");
    }

    #[test]
    fn missing_argument_is_an_error() {
        let err = format_record("%d", &[]).expect_err("should fail");
        assert_eq!(err, FormatError::MissingArgument('d'));
    }

    #[test]
    fn wrong_argument_kind_is_an_error() {
        let err = format_record("%d", &[RtValue::Ptr(1)]).expect_err("should fail");
        assert_eq!(
            err,
            FormatError::WrongArgumentKind {
                directive: 'd',
                kind: "pointer"
            }
        );
    }

    #[test]
    fn unknown_directive_is_an_error() {
        let err = format_record("%s", &[RtValue::Int(1)]).expect_err("should fail");
        assert_eq!(err, FormatError::UnknownDirective('s'));
    }

    #[test]
    fn trailing_percent_is_an_error() {
        let err = format_record("oops%", &[]).expect_err("should fail");
        assert_eq!(err, FormatError::TrailingPercent);
    }
}
