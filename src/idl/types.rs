//! Type expressions used throughout the IDL AST.
//!
//! A [`TypeDecl`] is the recursive sum type that appears wherever the IDL
//! mentions a type: parameters, outputs, fields, aliases and generic
//! arguments. [`PrimitiveType`] carries a fixed `u8` tag so it can cross the
//! C ABI by value.

use std::fmt;
use std::str::FromStr;

// ============================================================================
// Primitive Types
// ============================================================================

/// Built-in scalar types.
///
/// The discriminants are part of the C ABI: callbacks receive the tag as a
/// `uint8_t`, so existing values must never be renumbered.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// The unit type, written `()`.
    Void = 0,
    Bool = 1,
    Char = 2,
    String = 3,
    U8 = 4,
    U16 = 5,
    U32 = 6,
    U64 = 7,
    U128 = 8,
    I8 = 9,
    I16 = 10,
    I32 = 11,
    I64 = 12,
    I128 = 13,
    /// 32-byte actor address.
    ActorId = 14,
    /// 32-byte code hash.
    CodeId = 15,
    /// 32-byte message hash.
    MessageId = 16,
    H160 = 17,
    H256 = 18,
    U256 = 19,
}

impl PrimitiveType {
    /// Every primitive, in tag order.
    pub const ALL: [PrimitiveType; 20] = [
        PrimitiveType::Void,
        PrimitiveType::Bool,
        PrimitiveType::Char,
        PrimitiveType::String,
        PrimitiveType::U8,
        PrimitiveType::U16,
        PrimitiveType::U32,
        PrimitiveType::U64,
        PrimitiveType::U128,
        PrimitiveType::I8,
        PrimitiveType::I16,
        PrimitiveType::I32,
        PrimitiveType::I64,
        PrimitiveType::I128,
        PrimitiveType::ActorId,
        PrimitiveType::CodeId,
        PrimitiveType::MessageId,
        PrimitiveType::H160,
        PrimitiveType::H256,
        PrimitiveType::U256,
    ];

    /// The ABI tag.
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Look a primitive up by its ABI tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(usize::from(tag)).copied()
    }

    /// Canonical IDL spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::Void => "()",
            PrimitiveType::Bool => "bool",
            PrimitiveType::Char => "char",
            PrimitiveType::String => "String",
            PrimitiveType::U8 => "u8",
            PrimitiveType::U16 => "u16",
            PrimitiveType::U32 => "u32",
            PrimitiveType::U64 => "u64",
            PrimitiveType::U128 => "u128",
            PrimitiveType::I8 => "i8",
            PrimitiveType::I16 => "i16",
            PrimitiveType::I32 => "i32",
            PrimitiveType::I64 => "i64",
            PrimitiveType::I128 => "i128",
            PrimitiveType::ActorId => "ActorId",
            PrimitiveType::CodeId => "CodeId",
            PrimitiveType::MessageId => "MessageId",
            PrimitiveType::H160 => "H160",
            PrimitiveType::H256 => "H256",
            PrimitiveType::U256 => "U256",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a keyword is not a primitive type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown primitive type `{0}`")]
pub struct UnknownPrimitive(pub String);

impl FromStr for PrimitiveType {
    type Err = UnknownPrimitive;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "()" => PrimitiveType::Void,
            "bool" => PrimitiveType::Bool,
            "char" => PrimitiveType::Char,
            "String" | "str" => PrimitiveType::String,
            "u8" => PrimitiveType::U8,
            "u16" => PrimitiveType::U16,
            "u32" => PrimitiveType::U32,
            "u64" => PrimitiveType::U64,
            "u128" => PrimitiveType::U128,
            "i8" => PrimitiveType::I8,
            "i16" => PrimitiveType::I16,
            "i32" => PrimitiveType::I32,
            "i64" => PrimitiveType::I64,
            "i128" => PrimitiveType::I128,
            "ActorId" => PrimitiveType::ActorId,
            "CodeId" => PrimitiveType::CodeId,
            "MessageId" => PrimitiveType::MessageId,
            "H160" => PrimitiveType::H160,
            "H256" => PrimitiveType::H256,
            "U256" | "u256" => PrimitiveType::U256,
            other => return Err(UnknownPrimitive(other.to_string())),
        })
    }
}

// ============================================================================
// Type Expressions
// ============================================================================

/// A type expression.
///
/// Each variant owns its children; there is no sharing between subtrees.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDecl {
    /// `[T]`
    Slice { item: Box<TypeDecl> },
    /// `[T; N]`
    Array { item: Box<TypeDecl>, len: u32 },
    /// `(A, B, ...)`; the empty tuple is [`PrimitiveType::Void`].
    Tuple { types: Vec<TypeDecl> },
    Primitive(PrimitiveType),
    /// `path::Name<G, ...>`
    Named { name: String, generics: Vec<TypeDecl> },
}

impl TypeDecl {
    /// Shorthand for a named type without generics.
    pub fn named(name: impl Into<String>) -> Self {
        TypeDecl::Named {
            name: name.into(),
            generics: Vec::new(),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeDecl::Primitive(PrimitiveType::Void))
    }

    /// Direct children in traversal order.
    ///
    /// Slice and array yield their item; tuples their elements; named types
    /// their generic arguments; primitives nothing.
    pub fn children(&self) -> &[TypeDecl] {
        match self {
            TypeDecl::Slice { item } | TypeDecl::Array { item, .. } => {
                std::slice::from_ref(item.as_ref())
            }
            TypeDecl::Tuple { types } => types,
            TypeDecl::Named { generics, .. } => generics,
            TypeDecl::Primitive(_) => &[],
        }
    }
}

impl From<PrimitiveType> for TypeDecl {
    fn from(p: PrimitiveType) -> Self {
        TypeDecl::Primitive(p)
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDecl::Slice { item } => write!(f, "[{item}]"),
            TypeDecl::Array { item, len } => write!(f, "[{item}; {len}]"),
            TypeDecl::Tuple { types } => {
                f.write_str("(")?;
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{ty}")?;
                }
                if types.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            TypeDecl::Primitive(p) => write!(f, "{p}"),
            TypeDecl::Named { name, generics } => {
                f.write_str(name)?;
                if !generics.is_empty() {
                    f.write_str("<")?;
                    for (i, ty) in generics.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{ty}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
        }
    }
}
