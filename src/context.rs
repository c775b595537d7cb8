//! State of one generation run.
//!
//! Everything the resolver, the emitter and the method synthesizer share is
//! held here and passed explicitly; a fresh context means a fresh run.

use crate::config::GeneratorConfig;
use crate::datatypes::{TypeUnit, UnitSource};
use crate::enums::EnumRegistry;
use crate::error::GenError;
use crate::naming::{normalize_type_name, singularize};
use crate::openapi::{OpenApi, Schema, SchemaObject, preferred_content};
use crate::operations::Service;
use std::collections::{BTreeMap, BTreeSet};

pub const SCHEMA_PREFIX: &str = "#/components/schemas/";

/// A name taken before its unit exists, so that nested emission cannot grab
/// it in the meantime
#[derive(Debug, Clone)]
struct Reserved {
    is_enum: bool,
    source: UnitSource,
}

pub(crate) enum Claim {
    /// Emit the unit under this name
    New(String),
    /// The unit for this source was emitted already
    Existing(String),
}

pub struct GenerationContext<'a> {
    pub(crate) spec: &'a OpenApi,
    pub(crate) config: &'a GeneratorConfig,
    pub enums: EnumRegistry,
    /// Structs, unions and aliases by type name
    pub types: BTreeMap<String, TypeUnit>,
    /// Services by tag name
    pub services: BTreeMap<String, Service>,
    /// Component schema key -> type name
    schema_names: BTreeMap<String, String>,
    reserved: BTreeMap<String, Reserved>,
    /// Type names of the schemas currently being inlined
    resolving: Vec<String>,
    forward_declared: BTreeSet<String>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(spec: &'a OpenApi, config: &'a GeneratorConfig) -> Self {
        let mut ctx = Self {
            spec,
            config,
            enums: EnumRegistry::default(),
            types: BTreeMap::new(),
            services: BTreeMap::new(),
            schema_names: BTreeMap::new(),
            reserved: BTreeMap::new(),
            resolving: vec![],
            forward_declared: BTreeSet::new(),
        };

        for (key, schema) in &spec.components.schemas {
            let is_enum = ctx.is_enum_like(schema);
            let base = if is_enum {
                singularize(&normalize_type_name(key))
            } else {
                normalize_type_name(key)
            };
            let name = ctx.first_free(&base);
            ctx.reserve(&name, is_enum, UnitSource::Schema(schema_pointer(key)));
            ctx.schema_names.insert(key.clone(), name);
        }
        for (key, response) in &spec.components.responses {
            if let crate::openapi::RefOr::Item(response) = response
                && let Some((_, media)) = preferred_content(&response.content)
                && let Some(schema) = &media.schema
            {
                let is_enum = ctx.is_enum_like(schema);
                let name = ctx.first_free(&format!("Response{}", normalize_type_name(key)));
                ctx.reserve(&name, is_enum, UnitSource::Schema(response_pointer(key)));
            }
        }
        ctx
    }

    /// Type name assigned to a component schema
    pub fn schema_type_name(&self, key: &str) -> Option<&str> {
        self.schema_names.get(key).map(String::as_str)
    }

    /// Name the `components.responses` entry `key` is emitted under
    pub fn response_type_name(&self, key: &str) -> Option<&str> {
        let source = UnitSource::Schema(response_pointer(key));
        self.reserved
            .iter()
            .find(|(_, r)| r.source == source)
            .map(|(name, _)| name.as_str())
    }

    /// Looks up a `#/components/schemas/...` reference
    pub fn lookup_schema(&self, reference: &str) -> Result<(&'a str, &'a Schema), GenError> {
        let spec = self.spec;
        reference
            .strip_prefix(SCHEMA_PREFIX)
            .and_then(|key| spec.components.schemas.get_key_value(key))
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| GenError::UnresolvedReference {
                reference: reference.to_owned(),
            })
    }

    /// Follows references until an inline definition is reached. Returns
    /// `None` for dangling references and reference-only cycles.
    pub fn deref_object<'s>(&self, schema: &'s Schema) -> Option<&'s SchemaObject>
    where
        'a: 's,
    {
        let mut current = schema;
        let mut seen = BTreeSet::new();
        loop {
            match current {
                Schema::Typed(object) => return Some(object),
                Schema::Ref { ref_ } => {
                    if !seen.insert(ref_.as_str()) {
                        return None;
                    }
                    current = self.lookup_schema(ref_).ok()?.1;
                }
            }
        }
    }

    /// A string enum, or a oneOf that collapses into one
    pub fn is_enum_like(&self, schema: &Schema) -> bool {
        match self.deref_object(schema) {
            Some(object) => {
                if let Some([only @ Schema::Typed(_)]) = object.all_of.as_deref() {
                    return self.is_enum_like(only);
                }
                object.is_string_enum()
                    || object
                        .one_of
                        .as_deref()
                        .is_some_and(|branches| self.is_collapsible_enum(branches))
            }
            None => false,
        }
    }

    /// Every branch is a single string literal: the "enum with per-value
    /// docs" pattern
    pub fn is_collapsible_enum(&self, branches: &[Schema]) -> bool {
        !branches.is_empty()
            && branches.iter().all(|branch| {
                self.deref_object(branch)
                    .is_some_and(|o| o.single_string_literal().is_some())
            })
    }

    /// Schemas a reference can be pointed at by name instead of being inlined.
    /// A single inline `allOf` member counts as the schema itself.
    pub fn is_nominal(&self, schema: &Schema) -> bool {
        match schema {
            Schema::Ref { .. } => false,
            Schema::Typed(object) => {
                if let Some([only @ Schema::Typed(_)]) = object.all_of.as_deref() {
                    return self.is_nominal(only);
                }
                object.is_object()
                    || object.is_string_enum()
                    || object.one_of.is_some()
                    || object.any_of.is_some()
            }
        }
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains(name)
    }

    fn reserve(&mut self, name: &str, is_enum: bool, source: UnitSource) {
        self.reserved
            .insert(name.to_owned(), Reserved { is_enum, source });
    }

    fn is_taken(&self, name: &str) -> bool {
        self.types.contains_key(name) || self.enums.contains(name) || self.reserved.contains_key(name)
    }

    fn first_free(&self, base: &str) -> String {
        let mut name = base.to_owned();
        let mut n = 2;
        while self.is_taken(&name) {
            name = format!("{base}{n}");
            n += 1;
        }
        name
    }

    fn is_free_for(&self, name: &str, source: &UnitSource) -> bool {
        if self.types.contains_key(name) || self.enums.contains(name) {
            return false;
        }
        self.reserved.get(name).is_none_or(|r| &r.source == source)
    }

    /// Candidates for a colliding name: the parent-prefixed name first, then
    /// numbered ones
    fn disambiguate(&self, candidate: &str, parent: &str, source: &UnitSource) -> String {
        if !parent.is_empty() && !candidate.starts_with(&format!("{parent}{parent}")) {
            let prefixed = normalize_type_name(&format!("{parent} {candidate}"));
            if self.is_free_for(&prefixed, source) {
                return prefixed;
            }
        }
        let mut n = 2;
        loop {
            let numbered = format!("{candidate}{n}");
            if self.is_free_for(&numbered, source) {
                return numbered;
            }
            n += 1;
        }
    }

    /// Takes a name for a struct, union or alias.
    ///
    /// A name held by a different unit is never overwritten: the new unit is
    /// renamed with its parent's name as prefix.
    pub(crate) fn claim_type_name(&mut self, candidate: &str, parent: &str, source: &UnitSource) -> Claim {
        if let Some(unit) = self.types.get(candidate)
            && &unit.source == source
        {
            return Claim::Existing(candidate.to_owned());
        }
        let name = if self.is_free_for(candidate, source) {
            candidate.to_owned()
        } else {
            let renamed = self.disambiguate(candidate, parent, source);
            tracing::debug!("type name {candidate:?} is taken, using {renamed:?} for {source}");
            renamed
        };
        self.reserve(&name, false, source.clone());
        Claim::New(name)
    }

    /// Takes a name for an enum. Enums with the same name are merged rather
    /// than renamed.
    pub(crate) fn claim_enum_name(&mut self, candidate: &str, parent: &str, source: &UnitSource) -> String {
        if self.enums.contains(candidate) {
            return candidate.to_owned();
        }
        let reusable = match self.reserved.get(candidate) {
            Some(r) => r.is_enum || &r.source == source,
            None => !self.types.contains_key(candidate),
        };
        let name = if reusable {
            candidate.to_owned()
        } else {
            self.disambiguate(candidate, parent, source)
        };
        if !self.reserved.contains_key(&name) {
            self.reserve(&name, true, source.clone());
        }
        name
    }

    /// Marks `name` as being inlined. Returns `false` when it already is,
    /// i.e. the reference closes a cycle.
    pub(crate) fn enter(&mut self, name: &str) -> bool {
        if self.resolving.iter().any(|n| n == name) {
            self.forward_declared.insert(name.to_owned());
            return false;
        }
        self.resolving.push(name.to_owned());
        true
    }

    pub(crate) fn leave(&mut self) {
        self.resolving.pop();
    }

    pub fn is_forward_declared(&self, name: &str) -> bool {
        self.forward_declared.contains(name)
    }
}

pub fn schema_pointer(key: &str) -> String {
    format!("{SCHEMA_PREFIX}{}", escape_pointer(key))
}

pub fn response_pointer(key: &str) -> String {
    format!("#/components/responses/{}", escape_pointer(key))
}

/// Escapes one JSON pointer token (RFC 6901)
pub fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
