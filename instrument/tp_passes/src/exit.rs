//! Exit-point instrumentation: an output record before every return.

use tp_ir::{Decls, Function, InstBuilder, Terminator, Value};

use crate::classify::TypeClass;
use crate::entry::prefix_parts;
use crate::sink::{RecordPart, SinkBinding};

fn output_part(func: &Function, value: Option<Value>) -> RecordPart {
    let Some(value) = value else {
        return RecordPart::literal("output:void,\n");
    };
    let class = TypeClass::of(func.ret_ty);
    match class.directive() {
        Some(dir) => {
            RecordPart::with_value(format!("output:{}:{dir},\n", class.label()), value)
        }
        None => RecordPart::literal("output:unknown_type,\n"),
    }
}

/// Instrument every returning block of `func`: the emission is inserted
/// strictly before the `ret` terminator, so it runs on every path that
/// reaches that return. Returns are instrumented independently and never
/// deduplicated.
///
/// With `bundle_prefix`, each exit group also carries the name and
/// argument parts, making every emission self-contained.
///
/// Returns the number of returns instrumented. Blocks without a terminator
/// are skipped; partial instrumentation beats rejecting the function.
pub(crate) fn instrument_exits(
    decls: &mut Decls,
    func: &mut Function,
    sink: &SinkBinding,
    bundle_prefix: bool,
) -> usize {
    let mut count = 0;
    let ids: Vec<_> = func.block_ids().collect();
    for id in ids {
        let value = match func.block(id).term {
            Some(Terminator::Ret(value)) => value,
            Some(_) => continue,
            None => {
                tracing::warn!(
                    function = %func.name,
                    block = %func.block(id).label,
                    "block has no terminator, skipping exit instrumentation"
                );
                continue;
            }
        };
        let mut parts = if bundle_prefix {
            prefix_parts(func)
        } else {
            Vec::new()
        };
        parts.push(output_part(func, value));
        let mut b = InstBuilder::before_terminator(func, id);
        sink.emit_group(decls, &mut b, &parts);
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SinkSpec;
    use pretty_assertions::assert_eq;
    use tp_ir::parse_module;

    fn instrument(src: &str, bundle: bool) -> (usize, String) {
        let mut m = parse_module("t", src).expect("parse");
        let sink = SinkBinding::resolve(&SinkSpec::Console, &mut m.decls);
        let mut func = m.functions.remove(0);
        let n = instrument_exits(&mut m.decls, &mut func, &sink, bundle);
        m.functions.push(func);
        (n, m.to_string())
    }

    #[test]
    fn one_emission_per_return() {
        let src = "\
fn @maybe(i32 %n) -> i32 {
entry:
  %c = cmp.gt.i32 %n, 0
  br %c, pos, neg
pos:
  ret %n
neg:
  ret 0
}
";
        let (n, out) = instrument(src, false);
        assert_eq!(n, 2);
        assert_eq!(out.matches(r#""output:integer:%d,\n""#).count(), 2);
        // Entry block has a branch terminator, not a return: untouched.
        assert!(!out.contains("entry:\n  call"));
    }

    #[test]
    fn void_return_emits_marker() {
        let (n, out) = instrument("fn @f() -> void {\nentry:\n  ret\n}\n", false);
        assert_eq!(n, 1);
        assert!(out.contains(r#"call @printf("output:void,\n")"#));
    }

    #[test]
    fn unknown_return_category_emits_fixed_marker() {
        let src = "fn @v(v4f32 %x) -> v4f32 {\nentry:\n  ret %x\n}\n";
        let (n, out) = instrument(src, false);
        assert_eq!(n, 1);
        assert!(out.contains(r#"call @printf("output:unknown_type,\n")"#));
        // The unrepresentable value itself is not passed to the sink.
        assert!(!out.contains(r#""output:unknown_type,\n", %x"#));
        // The return itself is unchanged.
        assert!(out.contains("  ret %x\n"));
    }

    #[test]
    fn terminator_less_block_is_skipped() {
        let src = "fn @f() -> void {\nentry:\nend:\n  ret\n}\n";
        let (n, out) = instrument(src, false);
        assert_eq!(n, 1);
        assert!(out.contains("entry:\nend:"));
    }

    #[test]
    fn bundled_exits_repeat_name_and_arguments() {
        let src = "\
fn @maybe(i32 %n) -> i32 {
entry:
  %c = cmp.gt.i32 %n, 0
  br %c, pos, neg
pos:
  ret %n
neg:
  ret 0
}
";
        let (n, out) = instrument(src, true);
        assert_eq!(n, 2);
        assert_eq!(out.matches(r#""name:maybe,""#).count(), 2);
        assert_eq!(out.matches(r#""input:integer:%d,""#).count(), 2);
    }
}
