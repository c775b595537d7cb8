use super::{format_source, render_failed, write_comment_header, write_doc};
use crate::context::GenerationContext;
use crate::datatypes::{DataType, OneOfVariant, StructField, Tagging, TypeRef, TypeUnit};
use crate::enums::EnumEntry;
use crate::error::GenError;
use crate::naming::{constant_name, pluralize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Result, Write};

const INDENT: &str = "    "; // 4 * <space>

enum Declaration<'a> {
    Type(&'a TypeUnit),
    Enum(&'a EnumEntry),
}

/// `types.rs` of the generated SDK: every struct, union, alias and enum,
/// sorted by name
pub fn render_types(ctx: &GenerationContext) -> std::result::Result<String, GenError> {
    let mut out = String::new();
    write_types(&mut out, ctx).map_err(render_failed("types.rs"))?;
    format_source("types.rs", &out)
}

fn write_types(out: &mut String, ctx: &GenerationContext) -> Result {
    write_comment_header(out, "Data types")?;
    writeln!(out, "use serde::{{Deserialize, Serialize}};")?;
    writeln!(out)?;

    let mut declarations: BTreeMap<&str, Declaration> = BTreeMap::new();
    for unit in ctx.types.values() {
        declarations.insert(unit.datatype.type_name(), Declaration::Type(unit));
    }
    for entry in ctx.enums.iter() {
        declarations.insert(&entry.name, Declaration::Enum(entry));
    }

    let cycles = CycleCheck::new(&ctx.types);
    let struct_derives = ctx.config.struct_derive_line();
    let enum_derives = ctx.config.enum_derive_line();
    let mut constants = BTreeSet::new();

    for declaration in declarations.values() {
        match declaration {
            Declaration::Type(unit) => match &unit.datatype {
                DataType::Struct {
                    name,
                    description,
                    fields,
                } => {
                    write_type_doc(out, name, description)?;
                    writeln!(out, "#[derive({struct_derives})]")?;
                    writeln!(out, "pub struct {name} {{")?;
                    for field in fields {
                        write_field(out, field, cycles.needs_box(name, &field.type_))?;
                    }
                    writeln!(out, "}}\n")?;
                }
                DataType::OneOf {
                    name,
                    description,
                    tagging,
                    variants,
                } => {
                    write_type_doc(out, name, description)?;
                    writeln!(out, "#[derive({struct_derives})]")?;
                    match tagging {
                        Tagging::Internal { tag } => writeln!(out, "#[serde(tag = {tag:?})]")?,
                        Tagging::External => (),
                        Tagging::Untagged => writeln!(out, "#[serde(untagged)]")?,
                    }
                    writeln!(out, "pub enum {name} {{")?;
                    for variant in variants {
                        write_variant(out, variant, &cycles, name)?;
                    }
                    writeln!(out, "}}\n")?;
                }
                DataType::Alias {
                    alias,
                    description,
                    target,
                    newtype,
                } => {
                    write_type_doc(out, alias, description)?;
                    if *newtype {
                        let t = boxed(target.to_rust(""), cycles.needs_box(alias, target));
                        writeln!(out, "#[derive({struct_derives})]")?;
                        writeln!(out, "#[serde(transparent)]")?;
                        writeln!(out, "pub struct {alias}(pub {t});\n")?;
                    } else {
                        writeln!(out, "pub type {alias} = {};\n", target.to_rust(""))?;
                    }
                }
            },
            Declaration::Enum(entry) => {
                write_type_doc(out, &entry.name, &entry.description)?;
                writeln!(out, "#[derive({enum_derives})]")?;
                writeln!(out, "pub enum {} {{", entry.name)?;
                for value in &entry.values {
                    write_doc(out, INDENT, &value.descr)?;
                    // if the literal differs according to the naming rules of Rust
                    if value.variant != value.value {
                        writeln!(out, "{INDENT}#[serde(rename = {:?})]", value.value)?;
                    }
                    writeln!(out, "{INDENT}{},", value.variant)?;
                }
                writeln!(out, "}}\n")?;
                write_display_impl_for_enum(out, entry)?;
                write_all_values(out, entry, &mut constants)?;
            }
        }
    }
    Ok(())
}

fn write_type_doc(out: &mut String, name: &str, description: &str) -> Result {
    if description.trim().is_empty() {
        writeln!(out, "/// {name}")
    } else {
        write_doc(out, "", description)
    }
}

fn write_field(out: &mut String, field: &StructField, needs_box: bool) -> Result {
    let mut t = boxed(field.type_.to_rust(""), needs_box);
    if field.is_optional() {
        t = format!("Option<{t}>");
    }

    write_doc(out, INDENT, &field.descr)?;
    if field.is_deprecated {
        if !field.descr.is_empty() {
            writeln!(out, "{INDENT}///")?;
        }
        writeln!(out, "{INDENT}/// **Deprecated**")?;
    }
    // if the name of the property differs according to the naming rules of
    // Rust
    if field.name != field.rust_name {
        writeln!(out, "{INDENT}#[serde(rename = {:?})]", field.name)?;
    }
    if field.is_optional() {
        writeln!(
            out,
            "{INDENT}#[serde(default, skip_serializing_if = \"Option::is_none\")]"
        )?;
    }
    writeln!(out, "{INDENT}pub {}: {t},", field.rust_name)
}

fn write_variant(out: &mut String, variant: &OneOfVariant, cycles: &CycleCheck, owner: &str) -> Result {
    write_doc(out, INDENT, &variant.descr)?;
    if let Some(rename) = &variant.rename {
        writeln!(out, "{INDENT}#[serde(rename = {rename:?})]")?;
    }
    match &variant.payload {
        Some(payload) => {
            let t = boxed(payload.to_rust(""), cycles.needs_box(owner, payload));
            writeln!(out, "{INDENT}{}({t}),", variant.ident)
        }
        None => writeln!(out, "{INDENT}{},", variant.ident),
    }
}

/// Writes a [`Display`](std::fmt::Display) implementation for enum
fn write_display_impl_for_enum(out: &mut String, entry: &EnumEntry) -> Result {
    let indent1 = " ".repeat(4);
    let indent2 = " ".repeat(8);
    let indent3 = " ".repeat(12);
    let enum_name = &entry.name;
    writeln!(out, "impl std::fmt::Display for {enum_name} {{")?;
    writeln!(
        out,
        "{indent1}fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {{"
    )?;
    if entry.values.is_empty() {
        writeln!(out, "{indent2}match *self {{}}")?;
    } else {
        writeln!(out, "{indent2}match self {{")?;
        for value in &entry.values {
            // writes a non-distorted name
            writeln!(
                out,
                "{indent3}{enum_name}::{} => f.write_str({:?}),",
                value.variant, value.value
            )?;
        }
        writeln!(out, "{indent2}}}")?;
    }
    writeln!(out, "{indent1}}}")?;
    writeln!(out, "}}\n")
}

/// Writes the "all values" collection, variants sorted by literal
fn write_all_values(out: &mut String, entry: &EnumEntry, taken: &mut BTreeSet<String>) -> Result {
    let base = constant_name(&pluralize(&entry.name));
    let mut name = base.clone();
    let mut n = 2;
    while !taken.insert(name.clone()) {
        name = format!("{base}_{n}");
        n += 1;
    }
    let values: Vec<String> = entry
        .all_values()
        .iter()
        .map(|v| format!("{}::{}", entry.name, v.variant))
        .collect();
    writeln!(out, "/// Every value of [`{}`], sorted", entry.name)?;
    writeln!(
        out,
        "pub const {name}: &[{}] = &[{}];\n",
        entry.name,
        values.join(", ")
    )
}

fn boxed(t: String, needs_box: bool) -> String {
    if needs_box { format!("Box<{t}>") } else { t }
}

/// Finds by-value references that lead back to their owner; those have to
/// be boxed or the type would have infinite size
struct CycleCheck<'a> {
    edges: BTreeMap<&'a str, Vec<&'a str>>,
}

impl<'a> CycleCheck<'a> {
    fn new(types: &'a BTreeMap<String, TypeUnit>) -> Self {
        let edges = types
            .values()
            .map(|unit| (unit.datatype.type_name(), unit.datatype.by_value_names()))
            .collect();
        Self { edges }
    }

    fn needs_box(&self, owner: &str, field: &TypeRef) -> bool {
        match field.direct_name() {
            Some(target) => self.reaches(target, owner),
            None => false,
        }
    }

    /// Whether `to` can be reached from `from` over by-value edges
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut stack = vec![from];
        let mut visited = BTreeSet::new();
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(next) = self.edges.get(current) {
                stack.extend(next.iter().copied());
            }
        }
        false
    }
}
