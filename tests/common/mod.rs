// Shared fixtures for the integration tests

#![allow(dead_code)]

use idlvisit::idl::visitor::{self, Visitor};
use idlvisit::idl::{
    Annotation, CtorFunc, Document, EnumDef, EnumVariant, FuncParam, PrimitiveType, ProgramUnit,
    ServiceEvent, ServiceExpo, ServiceFunc, ServiceUnit, StructDef, StructField, Type, TypeDecl,
    TypeDef, TypeParameter,
};
use indoc::indoc;

/// Touches every node kind at least once.
pub const SAMPLE_IDL: &str = indoc! {r#"
    !@sails: 0.1.0
    !@author: test

    /// Demo program
    program Demo {
        constructors {
            Default();
            New(counter: Option<u32>, position: Option<(i32, i32)>);
        }
        services {
            Counter,
            WalkerRoute: Walker,
        }
        types {
            struct Config<T = u8> {
                limit: T,
                tags: [String],
            }
        }
    }

    service Counter {
        events {
            Added(u32),
            Reset,
        }
        functions {
            Add(value: u32) -> u32;
            Sub(value: u32) -> u32 throws String;
            @query
            Value() -> u32;
        }
        exports { Add, Sub, Current: Value }
    }

    service Walker {
        extends { Counter }
        events {
            Walked { from: (i32, i32), to: (i32, i32) },
        }
        functions {
            Walk(dx: i32, dy: i32);
            @query
            Position() -> (i32, i32);
        }
        exports { Walk, Position, Walked }
        types {
            enum Direction { North, South, Custom([u8; 32]) }
            alias Route = [Direction];
        }
    }
"#};

/// Visits per node kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub globals: u32,
    pub program_unit: u32,
    pub service_unit: u32,
    pub ctor_func: u32,
    pub func_param: u32,
    pub ty: u32,
    pub slice_type_decl: u32,
    pub array_type_decl: u32,
    pub tuple_type_decl: u32,
    pub primitive_type: u32,
    pub named_type_decl: u32,
    pub service_func: u32,
    pub service_event: u32,
    pub struct_def: u32,
    pub struct_field: u32,
    pub enum_def: u32,
    pub enum_variant: u32,
    pub service_expo: u32,
    pub type_parameter: u32,
    pub type_def: u32,
}

/// Expected counts for [`SAMPLE_IDL`], tallied by hand from the source.
pub const SAMPLE_COUNTS: Counts = Counts {
    globals: 1,
    program_unit: 1,
    service_unit: 2,
    ctor_func: 2,
    func_param: 6,
    ty: 3,
    slice_type_decl: 2,
    array_type_decl: 1,
    tuple_type_decl: 4,
    primitive_type: 22,
    named_type_decl: 4,
    service_func: 5,
    service_event: 3,
    struct_def: 7,
    struct_field: 6,
    enum_def: 1,
    enum_variant: 6,
    service_expo: 8,
    type_parameter: 1,
    type_def: 3,
};

/// Counts every hook and always continues with the default walk.
#[derive(Debug, Default)]
pub struct KindCounter {
    pub counts: Counts,
    /// Global annotations seen by `visit_globals`.
    pub globals_seen: usize,
}

impl<'ast> Visitor<'ast> for KindCounter {
    fn visit_globals(&mut self, globals: &'ast [Annotation]) {
        self.counts.globals += 1;
        self.globals_seen += globals.len();
    }

    fn visit_program_unit(&mut self, node: &'ast ProgramUnit) {
        self.counts.program_unit += 1;
        visitor::accept_program_unit(node, self);
    }

    fn visit_service_unit(&mut self, node: &'ast ServiceUnit) {
        self.counts.service_unit += 1;
        visitor::accept_service_unit(node, self);
    }

    fn visit_ctor_func(&mut self, node: &'ast CtorFunc) {
        self.counts.ctor_func += 1;
        visitor::accept_ctor_func(node, self);
    }

    fn visit_func_param(&mut self, node: &'ast FuncParam) {
        self.counts.func_param += 1;
        visitor::accept_func_param(node, self);
    }

    fn visit_type(&mut self, node: &'ast Type) {
        self.counts.ty += 1;
        visitor::accept_type(node, self);
    }

    fn visit_slice_type_decl(&mut self, item: &'ast TypeDecl) {
        self.counts.slice_type_decl += 1;
        self.visit_type_decl(item);
    }

    fn visit_array_type_decl(&mut self, item: &'ast TypeDecl, _len: u32) {
        self.counts.array_type_decl += 1;
        self.visit_type_decl(item);
    }

    fn visit_tuple_type_decl(&mut self, items: &'ast [TypeDecl]) {
        self.counts.tuple_type_decl += 1;
        for item in items {
            self.visit_type_decl(item);
        }
    }

    fn visit_primitive_type(&mut self, _primitive: PrimitiveType) {
        self.counts.primitive_type += 1;
    }

    fn visit_named_type_decl(&mut self, _path: &'ast str, generics: &'ast [TypeDecl]) {
        self.counts.named_type_decl += 1;
        for generic in generics {
            self.visit_type_decl(generic);
        }
    }

    fn visit_service_func(&mut self, node: &'ast ServiceFunc) {
        self.counts.service_func += 1;
        visitor::accept_service_func(node, self);
    }

    fn visit_service_event(&mut self, node: &'ast ServiceEvent) {
        self.counts.service_event += 1;
        visitor::accept_service_event(node, self);
    }

    fn visit_struct_def(&mut self, node: &'ast StructDef) {
        self.counts.struct_def += 1;
        visitor::accept_struct_def(node, self);
    }

    fn visit_struct_field(&mut self, node: &'ast StructField) {
        self.counts.struct_field += 1;
        visitor::accept_struct_field(node, self);
    }

    fn visit_enum_def(&mut self, node: &'ast EnumDef) {
        self.counts.enum_def += 1;
        visitor::accept_enum_def(node, self);
    }

    fn visit_enum_variant(&mut self, node: &'ast EnumVariant) {
        self.counts.enum_variant += 1;
        visitor::accept_enum_variant(node, self);
    }

    fn visit_service_expo(&mut self, _node: &'ast ServiceExpo) {
        self.counts.service_expo += 1;
    }

    fn visit_type_parameter(&mut self, node: &'ast TypeParameter) {
        self.counts.type_parameter += 1;
        visitor::accept_type_parameter(node, self);
    }

    fn visit_type_def(&mut self, node: &'ast TypeDef) {
        self.counts.type_def += 1;
        visitor::accept_type_def(node, self);
    }
}

/// Counts from a full default walk of `doc`.
pub fn default_walk_counts(doc: &Document) -> Counts {
    let mut counter = KindCounter::default();
    counter.visit_document(doc);
    counter.counts
}
