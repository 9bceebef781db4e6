//! Sink bindings: where emitted records go and how emissions are grouped.

use tp_ir::{Callee, Decls, ExternDecl, ExternId, InstBuilder, StrId, Ty, Value};

/// Default path for the file sink when no `record-output-file` is given.
pub const DEFAULT_RECORD_FILE: &str = "record_function_io_out.txt";

/// Destination for emitted records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkSpec {
    /// The process-wide standard output stream, shared across all
    /// emissions and never closed by the instrumentation.
    Console,
    /// A path-addressed file, opened in append mode and closed around each
    /// emission group. No handle survives past the emission that created
    /// it, so repeated or concurrent runs of the instrumented program
    /// never leak descriptors.
    File { path: String },
}

/// How record emissions are distributed over a function's program points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionPolicy {
    /// Name and arguments once at function entry; each return emits only
    /// the output record.
    EntryOnce,
    /// No entry emission; each return emits name, arguments, and output as
    /// one self-contained group. A function with several returns
    /// duplicates the name and arguments per exit reached.
    BundledPerExit,
}

/// Sink and emission policy driving [`crate::FunctionIoPass`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceConfig {
    pub sink: SinkSpec,
    pub policy: EmissionPolicy,
}

impl TraceConfig {
    /// Console sink with the entry-once policy.
    pub fn console() -> TraceConfig {
        TraceConfig {
            sink: SinkSpec::Console,
            policy: EmissionPolicy::EntryOnce,
        }
    }

    /// File sink with the bundled-per-exit policy, so every exit appends a
    /// complete record even though the file is reopened per emission.
    pub fn file(path: impl Into<String>) -> TraceConfig {
        TraceConfig {
            sink: SinkSpec::File { path: path.into() },
            policy: EmissionPolicy::BundledPerExit,
        }
    }

    pub fn with_policy(mut self, policy: EmissionPolicy) -> TraceConfig {
        self.policy = policy;
        self
    }
}

/// One segment of a record: literal format text plus at most one operand.
pub(crate) struct RecordPart {
    pub(crate) text: String,
    pub(crate) value: Option<Value>,
}

impl RecordPart {
    pub(crate) fn literal(text: impl Into<String>) -> RecordPart {
        RecordPart {
            text: text.into(),
            value: None,
        }
    }

    pub(crate) fn with_value(text: impl Into<String>, value: Value) -> RecordPart {
        RecordPart {
            text: text.into(),
            value: Some(value),
        }
    }
}

/// Declare the console write primitive.
pub(crate) fn declare_printf(decls: &mut Decls) -> ExternId {
    decls.get_or_insert_extern(ExternDecl {
        name: "printf".into(),
        params: vec![Ty::Ptr],
        ret: Ty::I32,
        variadic: true,
    })
}

/// A sink resolved against a module: extern declarations for the sink
/// primitives plus the string constants the generated calls reference.
pub(crate) enum SinkBinding {
    Console {
        printf: ExternId,
    },
    File {
        fopen: ExternId,
        fprintf: ExternId,
        fclose: ExternId,
        path: StrId,
        mode: StrId,
    },
}

impl SinkBinding {
    pub(crate) fn resolve(spec: &SinkSpec, decls: &mut Decls) -> SinkBinding {
        match spec {
            SinkSpec::Console => SinkBinding::Console {
                printf: declare_printf(decls),
            },
            SinkSpec::File { path } => SinkBinding::File {
                fopen: decls.get_or_insert_extern(ExternDecl {
                    name: "fopen".into(),
                    params: vec![Ty::Ptr, Ty::Ptr],
                    ret: Ty::Ptr,
                    variadic: false,
                }),
                fprintf: decls.get_or_insert_extern(ExternDecl {
                    name: "fprintf".into(),
                    params: vec![Ty::Ptr, Ty::Ptr],
                    ret: Ty::I32,
                    variadic: true,
                }),
                fclose: decls.get_or_insert_extern(ExternDecl {
                    name: "fclose".into(),
                    params: vec![Ty::Ptr],
                    ret: Ty::I32,
                    variadic: false,
                }),
                path: decls.intern_str(path),
                mode: decls.intern_str("a"),
            },
        }
    }

    /// Lower one emission group at the builder's cursor.
    ///
    /// The file variant brackets the whole group in a single
    /// open-append/close pair; the handle is scoped to the group on every
    /// path, including groups that consist only of marker parts.
    pub(crate) fn emit_group(
        &self,
        decls: &mut Decls,
        b: &mut InstBuilder<'_>,
        parts: &[RecordPart],
    ) {
        match self {
            SinkBinding::Console { printf } => {
                for part in parts {
                    let fmt = decls.intern_str(&part.text);
                    let mut args = vec![Value::Str(fmt)];
                    args.extend(part.value);
                    b.call(Callee::Extern(*printf), args);
                }
            }
            SinkBinding::File {
                fopen,
                fprintf,
                fclose,
                path,
                mode,
            } => {
                let fd = b.call_with_result(
                    Callee::Extern(*fopen),
                    vec![Value::Str(*path), Value::Str(*mode)],
                    "fd",
                );
                for part in parts {
                    let fmt = decls.intern_str(&part.text);
                    let mut args = vec![Value::Local(fd), Value::Str(fmt)];
                    args.extend(part.value);
                    b.call(Callee::Extern(*fprintf), args);
                }
                b.call(Callee::Extern(*fclose), vec![Value::Local(fd)]);
            }
        }
    }
}
