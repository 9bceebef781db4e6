//! Entry-point instrumentation: function name and argument records.

use tp_ir::{Decls, Function, InstBuilder, Value};

use crate::classify::TypeClass;
use crate::sink::{RecordPart, SinkBinding};

/// Build the `name:` and `input:` parts describing one function.
///
/// Shared between the entry emission and the bundled per-exit emission.
pub(crate) fn prefix_parts(func: &Function) -> Vec<RecordPart> {
    let mut parts = vec![RecordPart::literal(format!("name:{},", func.name))];
    if func.params.is_empty() {
        parts.push(RecordPart::literal("input:void,"));
        return parts;
    }
    for (i, param) in func.params.iter().enumerate() {
        let class = TypeClass::of(param.ty);
        match class.directive() {
            Some(dir) => parts.push(RecordPart::with_value(
                format!("input:{}:{dir},", class.label()),
                Value::Local(func.param_local(i)),
            )),
            // No directive: the value is unrepresentable, log the marker
            // alone.
            None => parts.push(RecordPart::literal("input:unknown_type,")),
        }
    }
    parts
}

/// Emit the entry record at the first program point of `func`.
///
/// Returns `false` when the function has no body to anchor to.
pub(crate) fn instrument_entry(
    decls: &mut Decls,
    func: &mut Function,
    sink: &SinkBinding,
) -> bool {
    let Some(entry) = func.entry() else {
        return false;
    };
    let parts = prefix_parts(func);
    let mut b = InstBuilder::at_block_start(func, entry);
    sink.emit_group(decls, &mut b, &parts);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tp_ir::parse_module;

    fn parts_of(src: &str) -> Vec<(String, bool)> {
        let m = parse_module("t", src).expect("parse");
        prefix_parts(&m.functions[0])
            .into_iter()
            .map(|p| (p.text, p.value.is_some()))
            .collect()
    }

    #[test]
    fn arguments_in_declaration_order() {
        let parts = parts_of(
            "fn @mix(i32 %a, f32 %b, f64 %c, ptr %d) -> void {\nentry:\n  ret\n}\n",
        );
        assert_eq!(
            parts,
            vec![
                ("name:mix,".to_owned(), false),
                ("input:integer:%d,".to_owned(), true),
                ("input:float:%f,".to_owned(), true),
                ("input:double:%lf,".to_owned(), true),
                ("input:pointer:%p,".to_owned(), true),
            ]
        );
    }

    #[test]
    fn zero_parameters_emit_void_marker() {
        let parts = parts_of("fn @log() -> void {\nentry:\n  ret\n}\n");
        assert_eq!(
            parts,
            vec![
                ("name:log,".to_owned(), false),
                ("input:void,".to_owned(), false),
            ]
        );
    }

    #[test]
    fn unclassifiable_argument_logs_marker_without_operand() {
        let parts = parts_of("fn @v(v4f32 %x, i32 %n) -> void {\nentry:\n  ret\n}\n");
        assert_eq!(
            parts,
            vec![
                ("name:v,".to_owned(), false),
                ("input:unknown_type,".to_owned(), false),
                ("input:integer:%d,".to_owned(), true),
            ]
        );
    }
}
