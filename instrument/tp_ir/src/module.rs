//! Module container: functions, extern declarations, string constants.

use rustc_hash::FxHashMap;

use crate::function::Function;
use crate::ty::Ty;
use crate::value::StrId;

/// Index into a module's extern-declaration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExternId(pub(crate) u32);

impl ExternId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Declaration of an externally provided function, e.g.
/// `extern @printf(ptr, ...) -> i32`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternDecl {
    pub name: String,
    pub params: Vec<Ty>,
    pub ret: Ty,
    pub variadic: bool,
}

/// Module-level declarations shared by every function: extern symbols and
/// interned string constants. Kept apart from the function list so a pass
/// can hold `&mut Decls` while rewriting one function.
#[derive(Debug, Clone, Default)]
pub struct Decls {
    externs: Vec<ExternDecl>,
    extern_index: FxHashMap<String, ExternId>,
    strings: Vec<String>,
    string_index: FxHashMap<String, StrId>,
}

impl Decls {
    /// Declare an extern, or return the existing declaration with the same
    /// name. The first declaration's signature wins.
    pub fn get_or_insert_extern(&mut self, decl: ExternDecl) -> ExternId {
        if let Some(&id) = self.extern_index.get(&decl.name) {
            return id;
        }
        let id = ExternId(self.externs.len() as u32);
        self.extern_index.insert(decl.name.clone(), id);
        self.externs.push(decl);
        id
    }

    pub fn extern_decl(&self, id: ExternId) -> Option<&ExternDecl> {
        self.externs.get(id.index())
    }

    pub fn extern_named(&self, name: &str) -> Option<ExternId> {
        self.extern_index.get(name).copied()
    }

    pub fn externs(&self) -> &[ExternDecl] {
        &self.externs
    }

    /// Intern a string constant, deduplicating equal contents.
    pub fn intern_str(&mut self, text: &str) -> StrId {
        if let Some(&id) = self.string_index.get(text) {
            return id;
        }
        let id = StrId(self.strings.len() as u32);
        self.string_index.insert(text.to_owned(), id);
        self.strings.push(text.to_owned());
        id
    }

    pub fn lookup_str(&self, id: StrId) -> Option<&str> {
        self.string_at(id.index())
    }

    pub fn string_at(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub decls: Decls,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Module {
        Module {
            name: name.into(),
            decls: Decls::default(),
            functions: Vec::new(),
        }
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn printf_decl() -> ExternDecl {
        ExternDecl {
            name: "printf".into(),
            params: vec![Ty::Ptr],
            ret: Ty::I32,
            variadic: true,
        }
    }

    #[test]
    fn extern_insertion_is_idempotent() {
        let mut decls = Decls::default();
        let a = decls.get_or_insert_extern(printf_decl());
        let b = decls.get_or_insert_extern(printf_decl());
        assert_eq!(a, b);
        assert_eq!(decls.externs().len(), 1);
        assert_eq!(decls.extern_named("printf"), Some(a));
        assert_eq!(decls.extern_named("fopen"), None);
    }

    #[test]
    fn string_interning_deduplicates() {
        let mut decls = Decls::default();
        let a = decls.intern_str("name:f,");
        let b = decls.intern_str("input:void,");
        let c = decls.intern_str("name:f,");
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(decls.lookup_str(b), Some("input:void,"));
    }
}
