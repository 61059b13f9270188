// C visitor table and traversal entry points
//
// The table is adapted onto the Rust `Visitor` trait, so C and Rust callers
// share one walk. A bound slot replaces the default traversal for its node
// kind; the callback resumes it by calling the matching `accept_*` entry
// point with the same context and table. Type expressions resume through
// `accept_type_decl_items`, since `accept_type_decl` dispatches the node it
// is given.

use crate::ffi::{ErrorCode, StrRef, count_u32};
use crate::idl::ast::{
    Annotation, CtorFunc, Document, EnumDef, EnumVariant, FuncParam, ProgramUnit, ServiceEvent,
    ServiceExpo, ServiceFunc, ServiceUnit, StructDef, StructField, Type, TypeDef, TypeParameter,
};
use crate::idl::types::TypeDecl;
use crate::idl::visitor::{self as walk, Visitor as AstVisitor};
use std::ffi::c_void;
use std::ptr;
use tracing::{trace, warn};

/// Callback for a node with no extras.
pub type NodeFn<T> = unsafe extern "C" fn(context: *const c_void, node: *const T);

/// Callback for a node that carries a name.
pub type NamedFn<T> = unsafe extern "C" fn(context: *const c_void, node: *const T, name: StrRef);

/// One optional callback per node kind.
///
/// Field order is part of the ABI. A zeroed table (all `NULL`) walks the whole
/// document without calling anything.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Visitor {
    /// Called once per document with the number of global annotations.
    /// Read them with `document_global`.
    pub globals: Option<unsafe extern "C" fn(context: *const c_void, doc: *const Document, count: u32)>,
    pub program_unit: Option<NamedFn<ProgramUnit>>,
    pub service_unit: Option<NamedFn<ServiceUnit>>,
    pub ctor_func: Option<NamedFn<CtorFunc>>,
    pub func_param: Option<NamedFn<FuncParam>>,
    pub r#type: Option<NamedFn<Type>>,
    /// Receives the item type; resume with `accept_type_decl(item)`.
    pub slice_type_decl: Option<NodeFn<TypeDecl>>,
    /// Receives the item type and the fixed length.
    pub array_type_decl:
        Option<unsafe extern "C" fn(context: *const c_void, item: *const TypeDecl, len: u32)>,
    /// Receives the tuple itself; resume with `accept_type_decl_items(node)`
    /// or reach single items with `type_decl_item`.
    pub tuple_type_decl:
        Option<unsafe extern "C" fn(context: *const c_void, node: *const TypeDecl, len: u32)>,
    /// Receives the primitive tag. Primitives have no children.
    pub primitive_type: Option<unsafe extern "C" fn(context: *const c_void, tag: u8)>,
    /// Receives the named type itself; resume with
    /// `accept_type_decl_items(node)` or reach single generics with
    /// `type_decl_item`.
    pub named_type_decl: Option<
        unsafe extern "C" fn(
            context: *const c_void,
            node: *const TypeDecl,
            path: StrRef,
            generics_len: u32,
        ),
    >,
    pub service_func: Option<
        unsafe extern "C" fn(
            context: *const c_void,
            node: *const ServiceFunc,
            name: StrRef,
            is_query: bool,
        ),
    >,
    pub service_event: Option<NamedFn<ServiceEvent>>,
    pub struct_def: Option<NodeFn<StructDef>>,
    /// `name` is `{ NULL, 0 }` for positional fields.
    pub struct_field: Option<NamedFn<StructField>>,
    pub enum_def: Option<NodeFn<EnumDef>>,
    pub enum_variant: Option<NamedFn<EnumVariant>>,
    /// `route` is `{ NULL, 0 }` when the export has none.
    pub service_expo: Option<
        unsafe extern "C" fn(
            context: *const c_void,
            node: *const ServiceExpo,
            name: StrRef,
            route: StrRef,
        ),
    >,
    pub type_parameter: Option<NamedFn<TypeParameter>>,
    pub type_def: Option<NodeFn<TypeDef>>,
}

// ============================================================================
// Table Adapter
// ============================================================================

/// Invoke a bound slot, or fall back to the default walk.
macro_rules! dispatch {
    ($this:ident . $slot:ident ( $($arg:expr),* $(,)? ) else $fallback:expr) => {{
        let slot = $this.table.$slot;
        match slot {
            Some(callback) => {
                trace!(slot = stringify!($slot), "invoking callback");
                // SAFETY: whoever built the table vouches for its callbacks,
                // and every node pointer borrows from the document being walked
                unsafe { callback($this.context, $($arg),*) }
            }
            None => $fallback,
        }
    }};
}

/// Drives the Rust walk through a C table.
pub(crate) struct FfiVisitor<'v> {
    context: *const c_void,
    table: &'v Visitor,
    /// Set when the walk started at a document; the globals slot needs it.
    document: *const Document,
}

impl<'v> FfiVisitor<'v> {
    pub(crate) fn new(context: *const c_void, table: &'v Visitor) -> Self {
        FfiVisitor {
            context,
            table,
            document: ptr::null(),
        }
    }
}

impl<'ast> AstVisitor<'ast> for FfiVisitor<'_> {
    fn visit_document(&mut self, doc: &'ast Document) {
        self.document = ptr::from_ref(doc);
        walk::accept_document(doc, self);
    }

    fn visit_globals(&mut self, globals: &'ast [Annotation]) {
        let document = self.document;
        dispatch!(self.globals(document, count_u32(globals.len())) else ())
    }

    fn visit_program_unit(&mut self, program: &'ast ProgramUnit) {
        dispatch!(self.program_unit(program, StrRef::new(&program.name))
            else walk::accept_program_unit(program, self))
    }

    fn visit_service_unit(&mut self, service: &'ast ServiceUnit) {
        dispatch!(self.service_unit(service, StrRef::new(&service.name))
            else walk::accept_service_unit(service, self))
    }

    fn visit_ctor_func(&mut self, ctor: &'ast CtorFunc) {
        dispatch!(self.ctor_func(ctor, StrRef::new(&ctor.name))
            else walk::accept_ctor_func(ctor, self))
    }

    fn visit_func_param(&mut self, param: &'ast FuncParam) {
        dispatch!(self.func_param(param, StrRef::new(&param.name))
            else walk::accept_func_param(param, self))
    }

    fn visit_type(&mut self, ty: &'ast Type) {
        dispatch!(self.r#type(ty, StrRef::new(&ty.name)) else walk::accept_type(ty, self))
    }

    // Every type expression arrives here, so the variant slots are checked
    // against the node itself rather than in the per-variant hooks.
    fn visit_type_decl(&mut self, ty: &'ast TypeDecl) {
        match ty {
            TypeDecl::Slice { item } => {
                dispatch!(self.slice_type_decl(&**item) else walk::accept_type_decl(ty, self))
            }
            TypeDecl::Array { item, len } => {
                dispatch!(self.array_type_decl(&**item, *len)
                    else walk::accept_type_decl(ty, self))
            }
            TypeDecl::Tuple { types } => {
                dispatch!(self.tuple_type_decl(ty, count_u32(types.len()))
                    else walk::accept_type_decl(ty, self))
            }
            TypeDecl::Primitive(primitive) => {
                dispatch!(self.primitive_type(primitive.tag()) else ())
            }
            TypeDecl::Named { name, generics } => {
                dispatch!(self.named_type_decl(ty, StrRef::new(name), count_u32(generics.len()))
                    else walk::accept_type_decl(ty, self))
            }
        }
    }

    fn visit_service_func(&mut self, func: &'ast ServiceFunc) {
        dispatch!(self.service_func(func, StrRef::new(&func.name), func.is_query())
            else walk::accept_service_func(func, self))
    }

    fn visit_service_event(&mut self, event: &'ast ServiceEvent) {
        dispatch!(self.service_event(event, StrRef::new(&event.name))
            else walk::accept_service_event(event, self))
    }

    fn visit_struct_def(&mut self, def: &'ast StructDef) {
        dispatch!(self.struct_def(def) else walk::accept_struct_def(def, self))
    }

    fn visit_struct_field(&mut self, field: &'ast StructField) {
        dispatch!(self.struct_field(field, StrRef::from_option(field.name.as_deref()))
            else walk::accept_struct_field(field, self))
    }

    fn visit_enum_def(&mut self, def: &'ast EnumDef) {
        dispatch!(self.enum_def(def) else walk::accept_enum_def(def, self))
    }

    fn visit_enum_variant(&mut self, variant: &'ast EnumVariant) {
        dispatch!(self.enum_variant(variant, StrRef::new(&variant.name))
            else walk::accept_enum_variant(variant, self))
    }

    fn visit_service_expo(&mut self, expo: &'ast ServiceExpo) {
        dispatch!(self.service_expo(
            expo,
            StrRef::new(&expo.name),
            StrRef::from_option(expo.route.as_deref()),
        ) else walk::accept_service_expo(expo, self))
    }

    fn visit_type_parameter(&mut self, param: &'ast TypeParameter) {
        dispatch!(self.type_parameter(param, StrRef::new(&param.name))
            else walk::accept_type_parameter(param, self))
    }

    fn visit_type_def(&mut self, def: &'ast TypeDef) {
        dispatch!(self.type_def(def) else walk::accept_type_def(def, self))
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Borrow the node and table, or log which entry point got a null.
///
/// # Safety
/// Both pointers must be null or valid for `'a`.
unsafe fn borrow<'a, T>(
    node: *const T,
    visitor: *const Visitor,
    entry: &'static str,
) -> Option<(&'a T, &'a Visitor)> {
    // SAFETY: null or valid per contract
    match unsafe { (node.as_ref(), visitor.as_ref()) } {
        (Some(node), Some(table)) => Some((node, table)),
        _ => {
            warn!(entry, "null node or visitor pointer");
            None
        }
    }
}

fn dispatch_document(doc: &Document, visitor: &mut FfiVisitor<'_>) {
    visitor.visit_document(doc);
}

fn dispatch_type_decl(ty: &TypeDecl, visitor: &mut FfiVisitor<'_>) {
    visitor.visit_type_decl(ty);
}

macro_rules! entry_points {
    ($($(#[$meta:meta])* fn $name:ident($node:ty) => $walk:path;)*) => {
        $(
            $(#[$meta])*
            ///
            /// Returns [`ErrorCode::NullPointer`] without invoking anything if
            /// `node` or `visitor` is null, [`ErrorCode::Ok`] otherwise.
            ///
            /// # Safety
            /// `node` must be null or borrowed from a live document, and
            /// `visitor` null or a valid table whose callbacks are safe to
            /// call with `context`.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn $name(
                node: *const $node,
                context: *const c_void,
                visitor: *const Visitor,
            ) -> ErrorCode {
                // SAFETY: forwarded from this function's contract
                let Some((node, table)) = (unsafe { borrow(node, visitor, stringify!($name)) }) else {
                    return ErrorCode::NullPointer;
                };
                $walk(node, &mut FfiVisitor::new(context, table));
                ErrorCode::Ok
            }
        )*
    };
}

entry_points! {
    /// Walk a whole document: globals, programs, services.
    fn accept_document(Document) => dispatch_document;
    /// Resume into a program: constructors, exports, types.
    fn accept_program_unit(ProgramUnit) => walk::accept_program_unit;
    /// Resume into a service: functions, events, exports, types.
    fn accept_service_unit(ServiceUnit) => walk::accept_service_unit;
    /// Resume into a constructor's parameters.
    fn accept_ctor_func(CtorFunc) => walk::accept_ctor_func;
    /// Resume into a parameter's type.
    fn accept_func_param(FuncParam) => walk::accept_func_param;
    /// Resume into a type declaration: type parameters, then definition.
    fn accept_type(Type) => walk::accept_type;
    /// Dispatch a type expression to the slot for its variant.
    fn accept_type_decl(TypeDecl) => dispatch_type_decl;
    /// Resume into a type expression's items or generics without firing its
    /// own slot again.
    fn accept_type_decl_items(TypeDecl) => walk::accept_type_decl;
    /// Resume into a function: parameters, output, throws.
    fn accept_service_func(ServiceFunc) => walk::accept_service_func;
    /// Resume into an event, dispatched as an enum variant.
    fn accept_service_event(ServiceEvent) => walk::accept_service_event;
    /// Resume into a struct's fields.
    fn accept_struct_def(StructDef) => walk::accept_struct_def;
    /// Resume into a field's type.
    fn accept_struct_field(StructField) => walk::accept_struct_field;
    /// Resume into an enum's variants.
    fn accept_enum_def(EnumDef) => walk::accept_enum_def;
    /// Resume into a variant's payload, dispatched as a struct definition.
    fn accept_enum_variant(EnumVariant) => walk::accept_enum_variant;
    /// Exports are leaves; provided for symmetry.
    fn accept_service_expo(ServiceExpo) => walk::accept_service_expo;
    /// Resume into a type parameter's bound.
    fn accept_type_parameter(TypeParameter) => walk::accept_type_parameter;
    /// Dispatch a definition as a struct, an enum or an aliased type.
    fn accept_type_def(TypeDef) => walk::accept_type_def;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl::parse;
    use std::cell::Cell;

    /// Counter reached through the context pointer.
    fn bump(context: *const c_void) {
        let counter = unsafe { &*(context as *const Cell<u32>) };
        counter.set(counter.get() + 1);
    }

    unsafe extern "C" fn count_primitive(context: *const c_void, _tag: u8) {
        bump(context);
    }

    unsafe extern "C" fn count_and_prune_service(
        context: *const c_void,
        _node: *const ServiceUnit,
        _name: StrRef,
    ) {
        bump(context);
    }

    fn context(counter: &Cell<u32>) -> *const c_void {
        (counter as *const Cell<u32>).cast()
    }

    #[test]
    fn empty_table_walks_without_callbacks() {
        let doc = parse("service S { functions { F(a: (u8, [u16; 2])) -> Vec<u32>; } }").unwrap();
        let table = Visitor::default();
        let code = unsafe { accept_document(&doc, ptr::null(), &table) };
        assert_eq!(code, ErrorCode::Ok);
    }

    #[test]
    fn primitive_slot_sees_nested_leaves() {
        let doc = parse("service S { functions { F(a: (u8, [u16; 2])) -> Vec<u32>; } }").unwrap();
        let counter = Cell::new(0);
        let table = Visitor {
            primitive_type: Some(count_primitive),
            ..Visitor::default()
        };
        unsafe { accept_document(&doc, context(&counter), &table) };
        assert_eq!(counter.get(), 3);
    }

    #[test]
    fn bound_service_slot_prunes() {
        let doc = parse("service S { functions { F(a: u8); } }").unwrap();
        let services = Cell::new(0);
        let table = Visitor {
            service_unit: Some(count_and_prune_service),
            primitive_type: Some(count_primitive),
            ..Visitor::default()
        };
        unsafe { accept_document(&doc, context(&services), &table) };
        // only the service callback fired; the u8 below it was never reached
        assert_eq!(services.get(), 1);
    }

    unsafe extern "C" fn count_and_resume_tuple(
        context: *const c_void,
        node: *const TypeDecl,
        _len: u32,
    ) {
        bump(context);
        // Stop runaway recursion instead of overflowing the stack.
        let counter = unsafe { &*(context as *const Cell<u32>) };
        if counter.get() > 8 {
            return;
        }
        let table = Visitor {
            tuple_type_decl: Some(count_and_resume_tuple),
            ..Visitor::default()
        };
        let code = unsafe { accept_type_decl_items(node, context, &table) };
        assert_eq!(code, ErrorCode::Ok);
    }

    #[test]
    fn tuple_resuming_on_itself_fires_once_per_tuple() {
        let doc = parse("service S { functions { F(a: (u8, (u16, u32))); } }").unwrap();
        let tuples = Cell::new(0);
        let table = Visitor {
            tuple_type_decl: Some(count_and_resume_tuple),
            ..Visitor::default()
        };
        unsafe { accept_document(&doc, context(&tuples), &table) };
        assert_eq!(tuples.get(), 2);
    }

    #[test]
    fn null_arguments_are_rejected() {
        let doc = parse("service S {}").unwrap();
        let table = Visitor::default();
        unsafe {
            assert_eq!(
                accept_document(ptr::null(), ptr::null(), &table),
                ErrorCode::NullPointer
            );
            assert_eq!(
                accept_document(&doc, ptr::null(), ptr::null()),
                ErrorCode::NullPointer
            );
            assert_eq!(
                accept_type_decl(ptr::null(), ptr::null(), &table),
                ErrorCode::NullPointer
            );
            assert_eq!(
                accept_type_decl_items(ptr::null(), ptr::null(), &table),
                ErrorCode::NullPointer
            );
        }
    }
}
