// IDL front end: grammar, AST, builder and visitor

pub mod ast;
mod builder;
pub mod constants;
mod context;
pub mod parser;
pub mod preprocess;
pub mod types;
pub mod visitor;

pub use ast::{
    Annotation, CtorFunc, Document, EnumDef, EnumVariant, FuncParam, FunctionKind, ProgramUnit,
    ServiceEvent, ServiceExpo, ServiceFunc, ServiceUnit, StructDef, StructField, Type, TypeDef,
    TypeParameter,
};
pub use context::{Builder, IdlParser};
pub use parser::{ParseConfig, Rule};
pub use preprocess::{FsLoader, IncludeLoader, preprocess};
pub use types::{PrimitiveType, TypeDecl, UnknownPrimitive};
pub use visitor::Visitor;

/// Parse IDL source into a [`Document`] with the default limits
///
/// # Example
/// ```
/// let doc = idlvisit::idl::parse("service Ping { functions { Ping() -> String; } }")?;
/// assert_eq!(doc.services[0].funcs[0].name, "Ping");
/// # Ok::<(), idlvisit::Error>(())
/// ```
pub fn parse(input: &str) -> crate::Result<Document> {
    IdlParser::default().parse(input)
}
