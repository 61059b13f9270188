// Builder - converts the pest parse tree into the IDL AST
//
// Each `build_*` function consumes one pair of the matching rule. The grammar
// guarantees the shape of every pair, but the builder still reports a
// mismatch as a syntax error instead of panicking.
//
// Recursion happens only through `build_type_decl`, so that is where the AST
// depth budget is spent.

use crate::idl::ast::{
    Annotation, CtorFunc, Document, EnumDef, EnumVariant, FuncParam, FunctionKind, ProgramUnit,
    ServiceExpo, ServiceFunc, ServiceUnit, StructDef, StructField, Type, TypeDef, TypeParameter,
};
use crate::idl::constants::{DOC_ANNOTATION, QUERY_ANNOTATION};
use crate::idl::parser::Rule;
use crate::idl::types::{PrimitiveType, TypeDecl};
use crate::{Error, Result, Span};
use pest::iterators::{Pair, Pairs};
use std::iter::Peekable;

type PairIter<'i> = Peekable<Pairs<'i, Rule>>;

/// Check recursion depth remaining and return error if exhausted
///
/// Since depth_left is passed by value, it automatically "resets" on return.
#[inline(always)]
fn check_depth(depth_left: usize, span: Span) -> Result<usize> {
    if depth_left == 0 {
        Err(Error::nesting_depth(span, None))
    } else {
        Ok(depth_left - 1)
    }
}

fn span_from_pair(pair: &Pair<'_, Rule>) -> Span {
    pair.as_span().into()
}

fn unexpected(pair: &Pair<'_, Rule>, nonterminal: &str) -> Error {
    Error::syntax(
        span_from_pair(pair),
        nonterminal,
        format!("unexpected {:?}", pair.as_rule()),
    )
}

/// Take the next pair, requiring it to be `rule`.
fn expect<'i>(it: &mut PairIter<'i>, rule: Rule, parent: Span) -> Result<Pair<'i, Rule>> {
    match it.next() {
        Some(pair) if pair.as_rule() == rule => Ok(pair),
        Some(pair) => Err(unexpected(&pair, &format!("<{rule:?}>"))),
        None => Err(Error::syntax(
            Span::new(parent.end, parent.end),
            format!("<{rule:?}>"),
            format!("expected {rule:?}"),
        )),
    }
}

fn expect_ident(it: &mut PairIter<'_>, parent: Span) -> Result<String> {
    Ok(expect(it, Rule::Ident, parent)?.as_str().to_string())
}

// ============================================================================
// Document
// ============================================================================

/// Build a [`Document`] from the pairs produced by `Rule::Top`.
pub fn build_document(pairs: Pairs<'_, Rule>, max_ast_depth: usize) -> Result<Document> {
    let mut doc = Document::default();

    for top in pairs {
        for pair in top.into_inner() {
            match pair.as_rule() {
                Rule::GlobalAnn => doc.globals.push(build_annotation(pair)?),
                Rule::ProgramDecl => doc.programs.push(build_program(max_ast_depth, pair)?),
                Rule::ServiceDecl => doc.services.push(build_service(max_ast_depth, pair)?),
                // Stray doc lines and EOI
                _ => {}
            }
        }
    }

    Ok(doc)
}

// ============================================================================
// Docs and Annotations
// ============================================================================

/// Leading `///` lines and `@key` annotations of a declaration.
#[derive(Default)]
struct Prefix {
    docs: Vec<String>,
    annotations: Vec<Annotation>,
}

fn build_prefix(it: &mut PairIter<'_>) -> Result<Prefix> {
    let mut prefix = Prefix::default();

    while let Some(pair) = it.next_if(|p| matches!(p.as_rule(), Rule::DocLine | Rule::LocalAnn))
    {
        match pair.as_rule() {
            Rule::DocLine => {
                let text = pair
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::StrToEol)
                    .map(|p| p.as_str().trim().to_string())
                    .unwrap_or_default();
                prefix.docs.push(text);
            }
            _ => {
                let ann = build_annotation(pair)?;
                if ann.key == DOC_ANNOTATION {
                    prefix.docs.extend(ann.value);
                } else {
                    prefix.annotations.push(ann);
                }
            }
        }
    }

    Ok(prefix)
}

fn build_annotation(pair: Pair<'_, Rule>) -> Result<Annotation> {
    let span = span_from_pair(&pair);
    let mut key = None;
    let mut value = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::Ident => key = Some(part.as_str().to_string()),
            Rule::StrToEol => value = Some(part.as_str().trim().to_string()),
            _ => {}
        }
    }

    let key = key.ok_or_else(|| Error::syntax(span, "<Ident>", "annotation without a key"))?;
    Ok(Annotation { key, value })
}

// ============================================================================
// Type Expressions
// ============================================================================

/// Build a type expression, spending one level of the depth budget.
fn build_type_decl(depth_left: usize, pair: Pair<'_, Rule>) -> Result<TypeDecl> {
    let span = span_from_pair(&pair);
    let depth_left = check_depth(depth_left, span)?;

    let ty = match pair.as_rule() {
        Rule::Primitive => {
            let primitive = pair
                .as_str()
                .parse::<PrimitiveType>()
                .map_err(|e| Error::syntax(span, "<Primitive>", e.to_string()))?;
            TypeDecl::Primitive(primitive)
        }
        Rule::Tuple => {
            let types = pair
                .into_inner()
                .map(|p| build_type_decl(depth_left, p))
                .collect::<Result<Vec<_>>>()?;
            if types.is_empty() {
                TypeDecl::Primitive(PrimitiveType::Void)
            } else {
                TypeDecl::Tuple { types }
            }
        }
        Rule::Slice => {
            let item = build_inner_type_decl(depth_left, pair)?;
            TypeDecl::Slice {
                item: Box::new(item),
            }
        }
        Rule::Array => {
            let mut inner = pair.into_inner().peekable();
            let item_pair = inner
                .next()
                .ok_or_else(|| Error::syntax(span, "<TypeDecl>", "array without item type"))?;
            let item = build_type_decl(depth_left, item_pair)?;
            let len_pair = expect(&mut inner, Rule::Number, span)?;
            let len = len_pair.as_str().parse::<u32>().map_err(|e| {
                Error::syntax(
                    span_from_pair(&len_pair),
                    "<Number>",
                    format!("invalid array length `{}`: {e}", len_pair.as_str()),
                )
            })?;
            TypeDecl::Array {
                item: Box::new(item),
                len,
            }
        }
        Rule::Named => {
            let mut inner = pair.into_inner().peekable();
            let name = expect(&mut inner, Rule::Path, span)?.as_str().to_string();
            let mut generics = Vec::new();
            if let Some(list) = inner.next_if(|p| p.as_rule() == Rule::Generics) {
                for g in list.into_inner() {
                    generics.push(build_type_decl(depth_left, g)?);
                }
            }
            TypeDecl::Named { name, generics }
        }
        _ => return Err(unexpected(&pair, "<TypeDecl>")),
    };

    Ok(ty)
}

/// Build the single type expression wrapped by `pair` (`Slice`, `Ret`, `Throws`).
fn build_inner_type_decl(depth_left: usize, pair: Pair<'_, Rule>) -> Result<TypeDecl> {
    let span = span_from_pair(&pair);
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| Error::syntax(span, "<TypeDecl>", "expected a type"))?;
    build_type_decl(depth_left, inner)
}

// ============================================================================
// Type Declarations
// ============================================================================

fn build_type_params(depth: usize, pair: Pair<'_, Rule>) -> Result<Vec<TypeParameter>> {
    let mut params = Vec::new();

    for param in pair.into_inner().filter(|p| p.as_rule() == Rule::TypeParam) {
        let span = span_from_pair(&param);
        let mut it = param.into_inner().peekable();
        let name = expect_ident(&mut it, span)?;
        let ty = it.next().map(|p| build_type_decl(depth, p)).transpose()?;
        params.push(TypeParameter { name, ty });
    }

    Ok(params)
}

fn build_fields(depth: usize, pair: Pair<'_, Rule>) -> Result<StructDef> {
    let fields = pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::Field)
        .map(|p| build_field(depth, p))
        .collect::<Result<Vec<_>>>()?;
    Ok(StructDef { fields })
}

fn build_field(depth: usize, pair: Pair<'_, Rule>) -> Result<StructField> {
    let span = span_from_pair(&pair);
    let mut it = pair.into_inner().peekable();
    let Prefix { docs, annotations } = build_prefix(&mut it)?;

    let name = it
        .next_if(|p| p.as_rule() == Rule::Ident)
        .map(|p| p.as_str().to_string());
    let ty_pair = it
        .next()
        .ok_or_else(|| Error::syntax(span, "<TypeDecl>", "field without a type"))?;

    Ok(StructField {
        name,
        type_decl: build_type_decl(depth, ty_pair)?,
        docs,
        annotations,
    })
}

fn build_variant(depth: usize, pair: Pair<'_, Rule>) -> Result<EnumVariant> {
    let span = span_from_pair(&pair);
    let mut it = pair.into_inner().peekable();
    let Prefix { docs, annotations } = build_prefix(&mut it)?;
    let name = expect_ident(&mut it, span)?;

    let def = match it.next() {
        Some(fields) if fields.as_rule() == Rule::Fields => build_fields(depth, fields)?,
        Some(other) => return Err(unexpected(&other, "<Fields>")),
        None => StructDef::default(),
    };

    Ok(EnumVariant {
        name,
        def,
        docs,
        annotations,
    })
}

/// Build a `struct`, `enum` or `alias` declaration.
fn build_type(depth: usize, pair: Pair<'_, Rule>) -> Result<Type> {
    let rule = pair.as_rule();
    let span = span_from_pair(&pair);
    let mut it = pair.into_inner().peekable();
    let Prefix { docs, annotations } = build_prefix(&mut it)?;
    let name = expect_ident(&mut it, span)?;
    let type_params = match it.next_if(|p| p.as_rule() == Rule::TypeParams) {
        Some(params) => build_type_params(depth, params)?,
        None => Vec::new(),
    };

    let def = match rule {
        Rule::StructDecl => match it.next() {
            Some(fields) if fields.as_rule() == Rule::Fields => {
                TypeDef::Struct(build_fields(depth, fields)?)
            }
            _ => TypeDef::Struct(StructDef::default()),
        },
        Rule::EnumDecl => {
            let variants = it
                .filter(|p| p.as_rule() == Rule::Variant)
                .map(|p| build_variant(depth, p))
                .collect::<Result<Vec<_>>>()?;
            TypeDef::Enum(EnumDef { variants })
        }
        Rule::AliasDecl => {
            let target = it
                .next()
                .ok_or_else(|| Error::syntax(span, "<TypeDecl>", "alias without a target type"))?;
            TypeDef::Alias(build_type_decl(depth, target)?)
        }
        other => {
            return Err(Error::syntax(
                span,
                "<TypeItem>",
                format!("unexpected {other:?}"),
            ));
        }
    };

    Ok(Type {
        name,
        type_params,
        def,
        docs,
        annotations,
    })
}

fn build_types_block(depth: usize, pair: Pair<'_, Rule>) -> Result<Vec<Type>> {
    pair.into_inner().map(|p| build_type(depth, p)).collect()
}

// ============================================================================
// Functions
// ============================================================================

fn build_params(depth: usize, pair: Pair<'_, Rule>) -> Result<Vec<FuncParam>> {
    let mut params = Vec::new();

    for param in pair.into_inner().filter(|p| p.as_rule() == Rule::Param) {
        let span = span_from_pair(&param);
        let mut it = param.into_inner().peekable();
        let name = expect_ident(&mut it, span)?;
        let ty_pair = it
            .next()
            .ok_or_else(|| Error::syntax(span, "<TypeDecl>", "parameter without a type"))?;
        params.push(FuncParam {
            name,
            type_decl: build_type_decl(depth, ty_pair)?,
        });
    }

    Ok(params)
}

fn build_func(depth: usize, pair: Pair<'_, Rule>) -> Result<ServiceFunc> {
    let span = span_from_pair(&pair);
    let mut it = pair.into_inner().peekable();
    let Prefix { docs, annotations } = build_prefix(&mut it)?;
    let name = expect_ident(&mut it, span)?;

    let kind = if annotations.iter().any(|a| a.key == QUERY_ANNOTATION) {
        FunctionKind::Query
    } else {
        FunctionKind::Command
    };

    let mut params = Vec::new();
    let mut output = None;
    let mut throws = None;
    for part in it {
        match part.as_rule() {
            Rule::Params => params = build_params(depth, part)?,
            Rule::Ret => output = Some(build_inner_type_decl(depth, part)?),
            Rule::Throws => throws = Some(build_inner_type_decl(depth, part)?),
            _ => return Err(unexpected(&part, "<FuncDecl>")),
        }
    }

    Ok(ServiceFunc {
        name,
        params,
        output: output.unwrap_or(TypeDecl::Primitive(PrimitiveType::Void)),
        throws,
        kind,
        docs,
        annotations,
    })
}

fn build_ctor(depth: usize, pair: Pair<'_, Rule>) -> Result<CtorFunc> {
    let span = span_from_pair(&pair);
    let mut it = pair.into_inner().peekable();
    let Prefix { docs, annotations } = build_prefix(&mut it)?;
    let name = expect_ident(&mut it, span)?;
    let params = match it.next() {
        Some(params) => build_params(depth, params)?,
        None => Vec::new(),
    };

    Ok(CtorFunc {
        name,
        params,
        docs,
        annotations,
    })
}

// ============================================================================
// Services and Programs
// ============================================================================

/// `Name` or `Route: Name`
fn build_expo(pair: Pair<'_, Rule>) -> Result<ServiceExpo> {
    let span = span_from_pair(&pair);
    let mut it = pair.into_inner().peekable();
    let Prefix { docs, annotations } = build_prefix(&mut it)?;
    let first = expect_ident(&mut it, span)?;

    let (name, route) = match it.next_if(|p| p.as_rule() == Rule::Ident) {
        Some(second) => (second.as_str().to_string(), Some(first)),
        None => (first, None),
    };

    Ok(ServiceExpo {
        name,
        route,
        docs,
        annotations,
    })
}

fn build_expo_list(pair: Pair<'_, Rule>) -> Result<Vec<ServiceExpo>> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::ServiceExpo)
        .map(build_expo)
        .collect()
}

fn build_service(depth: usize, pair: Pair<'_, Rule>) -> Result<ServiceUnit> {
    let span = span_from_pair(&pair);
    let mut it = pair.into_inner().peekable();
    let Prefix { docs, annotations } = build_prefix(&mut it)?;
    let name = expect_ident(&mut it, span)?;

    let mut service = ServiceUnit {
        name,
        extends: Vec::new(),
        funcs: Vec::new(),
        events: Vec::new(),
        exports: Vec::new(),
        types: Vec::new(),
        docs,
        annotations,
    };

    // Blocks may repeat; their contents accumulate in source order.
    for block in it {
        match block.as_rule() {
            Rule::ExtendsBlock => service.extends.extend(
                block
                    .into_inner()
                    .filter(|p| p.as_rule() == Rule::Path)
                    .map(|p| p.as_str().to_string()),
            ),
            Rule::EventsBlock => {
                for event in block.into_inner().filter(|p| p.as_rule() == Rule::Variant) {
                    service.events.push(build_variant(depth, event)?);
                }
            }
            Rule::FunctionsBlock => {
                for func in block.into_inner().filter(|p| p.as_rule() == Rule::FuncDecl) {
                    service.funcs.push(build_func(depth, func)?);
                }
            }
            Rule::ExportsBlock => service.exports.extend(build_expo_list(block)?),
            Rule::TypesBlock => service.types.extend(build_types_block(depth, block)?),
            _ => return Err(unexpected(&block, "<ServiceItem>")),
        }
    }

    Ok(service)
}

fn build_program(depth: usize, pair: Pair<'_, Rule>) -> Result<ProgramUnit> {
    let span = span_from_pair(&pair);
    let mut it = pair.into_inner().peekable();
    let Prefix { docs, annotations } = build_prefix(&mut it)?;
    let name = expect_ident(&mut it, span)?;

    let mut program = ProgramUnit {
        name,
        ctors: Vec::new(),
        services: Vec::new(),
        types: Vec::new(),
        docs,
        annotations,
    };

    for block in it {
        match block.as_rule() {
            Rule::ConstructorsBlock => {
                for ctor in block.into_inner().filter(|p| p.as_rule() == Rule::CtorDecl) {
                    program.ctors.push(build_ctor(depth, ctor)?);
                }
            }
            Rule::ServicesBlock => program.services.extend(build_expo_list(block)?),
            Rule::TypesBlock => program.types.extend(build_types_block(depth, block)?),
            _ => return Err(unexpected(&block, "<ProgramItem>")),
        }
    }

    Ok(program)
}
