//! AST node types for parsed IDL documents.
//!
//! The tree is owned top-down by [`Document`]: every node has exactly one
//! parent and sequences keep source declaration order, which is also the
//! order the visitor walks them in. Nodes are immutable once the parser
//! hands the document out.

pub use crate::idl::types::{PrimitiveType, TypeDecl};

// ============================================================================
// Annotations
// ============================================================================

/// A `key` or `key: value` annotation.
///
/// Top-level annotations are written `!@key: value`; declaration-level ones
/// `@key: value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
    pub key: String,
    pub value: Option<String>,
}

impl Annotation {
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// A flag annotation such as `@query`.
    pub fn flag(key: impl Into<String>) -> Self {
        Self::new(key, None)
    }
}

// ============================================================================
// Document
// ============================================================================

/// Root of a parsed IDL source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// `!@key: value` lines, in source order.
    pub globals: Vec<Annotation>,
    pub programs: Vec<ProgramUnit>,
    pub services: Vec<ServiceUnit>,
}

impl Document {
    /// Value of the first global annotation with `key`.
    pub fn global(&self, key: &str) -> Option<&str> {
        self.globals
            .iter()
            .find(|a| a.key == key)
            .and_then(|a| a.value.as_deref())
    }

    pub fn service(&self, name: &str) -> Option<&ServiceUnit> {
        self.services.iter().find(|s| s.name == name)
    }
}

// ============================================================================
// Program
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramUnit {
    pub name: String,
    pub ctors: Vec<CtorFunc>,
    /// Services the program offers, from its `services { ... }` block.
    pub services: Vec<ServiceExpo>,
    pub types: Vec<Type>,
    pub docs: Vec<String>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtorFunc {
    pub name: String,
    pub params: Vec<FuncParam>,
    pub docs: Vec<String>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncParam {
    pub name: String,
    pub type_decl: TypeDecl,
}

/// An exported name with an optional route, written `Name` or `Route: Name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceExpo {
    pub name: String,
    pub route: Option<String>,
    pub docs: Vec<String>,
    pub annotations: Vec<Annotation>,
}

// ============================================================================
// Service
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUnit {
    pub name: String,
    /// Base services, from `extends { ... }`.
    pub extends: Vec<String>,
    pub funcs: Vec<ServiceFunc>,
    pub events: Vec<ServiceEvent>,
    /// Functions and events the service exports, from `exports { ... }`.
    pub exports: Vec<ServiceExpo>,
    pub types: Vec<Type>,
    pub docs: Vec<String>,
    pub annotations: Vec<Annotation>,
}

/// Whether a service function mutates state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Command,
    /// Marked with `@query`.
    Query,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFunc {
    pub name: String,
    pub params: Vec<FuncParam>,
    /// `()` when the declaration has no `->` clause.
    pub output: TypeDecl,
    pub throws: Option<TypeDecl>,
    pub kind: FunctionKind,
    pub docs: Vec<String>,
    pub annotations: Vec<Annotation>,
}

impl ServiceFunc {
    #[inline]
    pub fn is_query(&self) -> bool {
        self.kind == FunctionKind::Query
    }
}

/// Events share the enum variant shape: a name plus a field payload.
pub type ServiceEvent = EnumVariant;

// ============================================================================
// Type Definitions
// ============================================================================

/// A named type declaration: `struct`, `enum` or `alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub name: String,
    pub type_params: Vec<TypeParameter>,
    pub def: TypeDef,
    pub docs: Vec<String>,
    pub annotations: Vec<Annotation>,
}

/// A generic parameter, optionally bound to a concrete type (`T = u32`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub ty: Option<TypeDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    Struct(StructDef),
    Enum(EnumDef),
    /// `alias Name = Type;`
    Alias(TypeDecl),
}

/// Ordered fields. Named (`{ a: u32 }`), tuple (`(u32)`) or unit (empty).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructDef {
    pub fields: Vec<StructField>,
}

impl StructDef {
    pub fn is_unit(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when every field is positional.
    pub fn is_tuple(&self) -> bool {
        !self.fields.is_empty() && self.fields.iter().all(|f| f.name.is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    /// `None` for positional fields.
    pub name: Option<String>,
    pub type_decl: TypeDecl,
    pub docs: Vec<String>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumDef {
    pub variants: Vec<EnumVariant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: String,
    pub def: StructDef,
    pub docs: Vec<String>,
    pub annotations: Vec<Annotation>,
}
