//! Static-type classification for record emission.

use tp_ir::Ty;

/// Logging category of a value's static type.
///
/// Classification is a total function: anything outside the four
/// representable buckets lands in `Unknown` and is logged as a fixed
/// marker with no operand, so instrumentation never blocks on an
/// unexpected type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Integer,
    Float,
    Double,
    Pointer,
    Unknown,
}

impl TypeClass {
    /// Classify a static type.
    pub const fn of(ty: Ty) -> TypeClass {
        match ty {
            Ty::I1 | Ty::I8 | Ty::I16 | Ty::I32 | Ty::I64 => TypeClass::Integer,
            Ty::F32 => TypeClass::Float,
            Ty::F64 => TypeClass::Double,
            Ty::Ptr => TypeClass::Pointer,
            Ty::Void | Ty::Vec { .. } => TypeClass::Unknown,
        }
    }

    /// Category name as it appears in emitted records.
    pub const fn label(self) -> &'static str {
        match self {
            TypeClass::Integer => "integer",
            TypeClass::Float => "float",
            TypeClass::Double => "double",
            TypeClass::Pointer => "pointer",
            TypeClass::Unknown => "unknown_type",
        }
    }

    /// Format directive rendering a value of this category, or `None` when
    /// the value cannot be rendered.
    pub const fn directive(self) -> Option<&'static str> {
        match self {
            TypeClass::Integer => Some("%d"),
            TypeClass::Float => Some("%f"),
            TypeClass::Double => Some("%lf"),
            TypeClass::Pointer => Some("%p"),
            TypeClass::Unknown => None,
        }
    }
}
