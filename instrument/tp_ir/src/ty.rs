//! Static types for IR values.

use std::fmt;

/// Scalar element type of a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl Scalar {
    pub(crate) const fn name(self) -> &'static str {
        match self {
            Scalar::I8 => "i8",
            Scalar::I16 => "i16",
            Scalar::I32 => "i32",
            Scalar::I64 => "i64",
            Scalar::F32 => "f32",
            Scalar::F64 => "f64",
        }
    }

    fn from_name(name: &str) -> Option<Scalar> {
        Some(match name {
            "i8" => Scalar::I8,
            "i16" => Scalar::I16,
            "i32" => Scalar::I32,
            "i64" => Scalar::I64,
            "f32" => Scalar::F32,
            "f64" => Scalar::F64,
            _ => return None,
        })
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static type of an IR value.
///
/// Written in the textual form as `i32`, `f64`, `ptr`, `void`, or `v4f32`
/// for a four-lane f32 vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ty {
    I1,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    /// Untyped pointer.
    Ptr,
    Void,
    /// SIMD vector of scalar lanes.
    Vec { elem: Scalar, lanes: u32 },
}

impl Ty {
    /// Decode a type from its textual name. Returns `None` for anything
    /// that is not a known type name.
    pub(crate) fn from_name(name: &str) -> Option<Ty> {
        Some(match name {
            "i1" => Ty::I1,
            "i8" => Ty::I8,
            "i16" => Ty::I16,
            "i32" => Ty::I32,
            "i64" => Ty::I64,
            "f32" => Ty::F32,
            "f64" => Ty::F64,
            "ptr" => Ty::Ptr,
            "void" => Ty::Void,
            _ => return Self::vec_from_name(name),
        })
    }

    // Vector names look like `v<lanes><scalar>`, e.g. `v4f32`.
    fn vec_from_name(name: &str) -> Option<Ty> {
        let rest = name.strip_prefix('v')?;
        let split = rest.find(|c: char| !c.is_ascii_digit())?;
        let (digits, elem) = rest.split_at(split);
        let lanes: u32 = digits.parse().ok()?;
        if lanes == 0 {
            return None;
        }
        Some(Ty::Vec {
            elem: Scalar::from_name(elem)?,
            lanes,
        })
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::I1 => f.write_str("i1"),
            Ty::I8 => f.write_str("i8"),
            Ty::I16 => f.write_str("i16"),
            Ty::I32 => f.write_str("i32"),
            Ty::I64 => f.write_str("i64"),
            Ty::F32 => f.write_str("f32"),
            Ty::F64 => f.write_str("f64"),
            Ty::Ptr => f.write_str("ptr"),
            Ty::Void => f.write_str("void"),
            Ty::Vec { elem, lanes } => write!(f, "v{lanes}{elem}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_primitives() {
        assert_eq!(Ty::I32.to_string(), "i32");
        assert_eq!(Ty::F64.to_string(), "f64");
        assert_eq!(Ty::Ptr.to_string(), "ptr");
        assert_eq!(Ty::Void.to_string(), "void");
    }

    #[test]
    fn display_vector() {
        let ty = Ty::Vec {
            elem: Scalar::F32,
            lanes: 4,
        };
        assert_eq!(ty.to_string(), "v4f32");
    }

    #[test]
    fn from_name_round_trips_every_primitive() {
        for name in ["i1", "i8", "i16", "i32", "i64", "f32", "f64", "ptr", "void"] {
            let ty = Ty::from_name(name);
            assert_eq!(ty.map(|t| t.to_string()).as_deref(), Some(name));
        }
    }

    #[test]
    fn from_name_decodes_vectors() {
        assert_eq!(
            Ty::from_name("v4f32"),
            Some(Ty::Vec {
                elem: Scalar::F32,
                lanes: 4
            })
        );
        assert_eq!(
            Ty::from_name("v16i8"),
            Some(Ty::Vec {
                elem: Scalar::I8,
                lanes: 16
            })
        );
    }

    #[test]
    fn from_name_rejects_junk() {
        assert_eq!(Ty::from_name("i128"), None);
        assert_eq!(Ty::from_name("v0i8"), None);
        assert_eq!(Ty::from_name("vf32"), None);
        assert_eq!(Ty::from_name("float"), None);
    }
}
