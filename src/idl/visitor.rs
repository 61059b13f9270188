//! Visitor trait and the default walk over a [`Document`].
//!
//! Every node kind has one `visit_*` hook. The default body of each hook calls
//! the matching `accept_*` function, which walks the node's children in
//! declaration order and hands each of them back to the visitor. Overriding a
//! hook therefore replaces the walk for that node: an override that wants the
//! children must call `accept_*` itself, and one that doesn't prunes the
//! subtree.
//!
//! ```
//! use idlvisit::idl::visitor::Visitor;
//! use idlvisit::idl::{CtorFunc, parse};
//!
//! #[derive(Default)]
//! struct Ctors(Vec<String>);
//!
//! impl<'ast> Visitor<'ast> for Ctors {
//!     fn visit_ctor_func(&mut self, ctor: &'ast CtorFunc) {
//!         self.0.push(ctor.name.clone());
//!     }
//! }
//!
//! let doc = parse("program P { constructors { New(a: u32); Default(); } }")?;
//! let mut ctors = Ctors::default();
//! ctors.visit_document(&doc);
//! assert_eq!(ctors.0, ["New", "Default"]);
//! # Ok::<(), idlvisit::Error>(())
//! ```

use crate::idl::ast::{
    Annotation, CtorFunc, Document, EnumDef, EnumVariant, FuncParam, ProgramUnit, ServiceEvent,
    ServiceExpo, ServiceFunc, ServiceUnit, StructDef, StructField, Type, TypeDef, TypeParameter,
};
use crate::idl::types::{PrimitiveType, TypeDecl};

/// Per-node hooks over an IDL AST.
///
/// Every type expression first reaches [`Visitor::visit_type_decl`], whose
/// default routes it to the hook for its variant through [`accept_type_decl`].
pub trait Visitor<'ast> {
    fn visit_document(&mut self, doc: &'ast Document) {
        accept_document(doc, self);
    }

    /// Called once per document, before programs, even when there are no
    /// global annotations.
    fn visit_globals(&mut self, _globals: &'ast [Annotation]) {}

    fn visit_program_unit(&mut self, program: &'ast ProgramUnit) {
        accept_program_unit(program, self);
    }

    fn visit_service_unit(&mut self, service: &'ast ServiceUnit) {
        accept_service_unit(service, self);
    }

    fn visit_ctor_func(&mut self, ctor: &'ast CtorFunc) {
        accept_ctor_func(ctor, self);
    }

    fn visit_func_param(&mut self, param: &'ast FuncParam) {
        accept_func_param(param, self);
    }

    fn visit_type(&mut self, ty: &'ast Type) {
        accept_type(ty, self);
    }

    fn visit_type_decl(&mut self, ty: &'ast TypeDecl) {
        accept_type_decl(ty, self);
    }

    fn visit_slice_type_decl(&mut self, item: &'ast TypeDecl) {
        self.visit_type_decl(item);
    }

    fn visit_array_type_decl(&mut self, item: &'ast TypeDecl, _len: u32) {
        self.visit_type_decl(item);
    }

    fn visit_tuple_type_decl(&mut self, items: &'ast [TypeDecl]) {
        for item in items {
            self.visit_type_decl(item);
        }
    }

    fn visit_primitive_type(&mut self, _primitive: PrimitiveType) {}

    fn visit_named_type_decl(&mut self, _path: &'ast str, generics: &'ast [TypeDecl]) {
        for generic in generics {
            self.visit_type_decl(generic);
        }
    }

    fn visit_service_func(&mut self, func: &'ast ServiceFunc) {
        accept_service_func(func, self);
    }

    fn visit_service_event(&mut self, event: &'ast ServiceEvent) {
        accept_service_event(event, self);
    }

    fn visit_struct_def(&mut self, def: &'ast StructDef) {
        accept_struct_def(def, self);
    }

    fn visit_struct_field(&mut self, field: &'ast StructField) {
        accept_struct_field(field, self);
    }

    fn visit_enum_def(&mut self, def: &'ast EnumDef) {
        accept_enum_def(def, self);
    }

    fn visit_enum_variant(&mut self, variant: &'ast EnumVariant) {
        accept_enum_variant(variant, self);
    }

    fn visit_service_expo(&mut self, _expo: &'ast ServiceExpo) {}

    fn visit_type_parameter(&mut self, param: &'ast TypeParameter) {
        accept_type_parameter(param, self);
    }

    fn visit_type_def(&mut self, def: &'ast TypeDef) {
        accept_type_def(def, self);
    }
}

// ============================================================================
// Default Walk
// ============================================================================

/// Globals, then programs, then services.
pub fn accept_document<'ast, V: Visitor<'ast> + ?Sized>(doc: &'ast Document, visitor: &mut V) {
    visitor.visit_globals(&doc.globals);
    for program in &doc.programs {
        visitor.visit_program_unit(program);
    }
    for service in &doc.services {
        visitor.visit_service_unit(service);
    }
}

/// Constructors, then service exports, then types.
pub fn accept_program_unit<'ast, V: Visitor<'ast> + ?Sized>(
    program: &'ast ProgramUnit,
    visitor: &mut V,
) {
    for ctor in &program.ctors {
        visitor.visit_ctor_func(ctor);
    }
    for expo in &program.services {
        visitor.visit_service_expo(expo);
    }
    for ty in &program.types {
        visitor.visit_type(ty);
    }
}

/// Functions, then events, then exports, then types.
pub fn accept_service_unit<'ast, V: Visitor<'ast> + ?Sized>(
    service: &'ast ServiceUnit,
    visitor: &mut V,
) {
    for func in &service.funcs {
        visitor.visit_service_func(func);
    }
    for event in &service.events {
        visitor.visit_service_event(event);
    }
    for expo in &service.exports {
        visitor.visit_service_expo(expo);
    }
    for ty in &service.types {
        visitor.visit_type(ty);
    }
}

pub fn accept_ctor_func<'ast, V: Visitor<'ast> + ?Sized>(ctor: &'ast CtorFunc, visitor: &mut V) {
    for param in &ctor.params {
        visitor.visit_func_param(param);
    }
}

pub fn accept_func_param<'ast, V: Visitor<'ast> + ?Sized>(param: &'ast FuncParam, visitor: &mut V) {
    visitor.visit_type_decl(&param.type_decl);
}

/// Type parameters, then the definition.
pub fn accept_type<'ast, V: Visitor<'ast> + ?Sized>(ty: &'ast Type, visitor: &mut V) {
    for param in &ty.type_params {
        visitor.visit_type_parameter(param);
    }
    visitor.visit_type_def(&ty.def);
}

/// Route a type expression to the hook for its variant.
pub fn accept_type_decl<'ast, V: Visitor<'ast> + ?Sized>(ty: &'ast TypeDecl, visitor: &mut V) {
    match ty {
        TypeDecl::Slice { item } => visitor.visit_slice_type_decl(item),
        TypeDecl::Array { item, len } => visitor.visit_array_type_decl(item, *len),
        TypeDecl::Tuple { types } => visitor.visit_tuple_type_decl(types),
        TypeDecl::Primitive(primitive) => visitor.visit_primitive_type(*primitive),
        TypeDecl::Named { name, generics } => visitor.visit_named_type_decl(name, generics),
    }
}

/// Parameters, then the output type, then the error type if declared.
pub fn accept_service_func<'ast, V: Visitor<'ast> + ?Sized>(
    func: &'ast ServiceFunc,
    visitor: &mut V,
) {
    for param in &func.params {
        visitor.visit_func_param(param);
    }
    visitor.visit_type_decl(&func.output);
    if let Some(throws) = &func.throws {
        visitor.visit_type_decl(throws);
    }
}

/// Events are walked as enum variants.
pub fn accept_service_event<'ast, V: Visitor<'ast> + ?Sized>(
    event: &'ast ServiceEvent,
    visitor: &mut V,
) {
    visitor.visit_enum_variant(event);
}

pub fn accept_struct_def<'ast, V: Visitor<'ast> + ?Sized>(def: &'ast StructDef, visitor: &mut V) {
    for field in &def.fields {
        visitor.visit_struct_field(field);
    }
}

pub fn accept_struct_field<'ast, V: Visitor<'ast> + ?Sized>(
    field: &'ast StructField,
    visitor: &mut V,
) {
    visitor.visit_type_decl(&field.type_decl);
}

pub fn accept_enum_def<'ast, V: Visitor<'ast> + ?Sized>(def: &'ast EnumDef, visitor: &mut V) {
    for variant in &def.variants {
        visitor.visit_enum_variant(variant);
    }
}

/// The payload is walked as a struct definition.
pub fn accept_enum_variant<'ast, V: Visitor<'ast> + ?Sized>(
    variant: &'ast EnumVariant,
    visitor: &mut V,
) {
    visitor.visit_struct_def(&variant.def);
}

/// Exports have no children.
pub fn accept_service_expo<'ast, V: Visitor<'ast> + ?Sized>(
    _expo: &'ast ServiceExpo,
    _visitor: &mut V,
) {
}

pub fn accept_type_parameter<'ast, V: Visitor<'ast> + ?Sized>(
    param: &'ast TypeParameter,
    visitor: &mut V,
) {
    if let Some(ty) = &param.ty {
        visitor.visit_type_decl(ty);
    }
}

pub fn accept_type_def<'ast, V: Visitor<'ast> + ?Sized>(def: &'ast TypeDef, visitor: &mut V) {
    match def {
        TypeDef::Struct(def) => visitor.visit_struct_def(def),
        TypeDef::Enum(def) => visitor.visit_enum_def(def),
        TypeDef::Alias(ty) => visitor.visit_type_decl(ty),
    }
}
