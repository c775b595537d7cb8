use crate::context::{Claim, GenerationContext, response_pointer, schema_pointer};
use crate::datatypes::{DataType, OneOfVariant, Origin, StructField, Tagging, TypeRef, TypeUnit, UnitSource};
use crate::error::{GenError, ResultExt};
use crate::naming::{normalize_field_name, normalize_type_name, singularize};
use crate::openapi::{RefOr, Schema, SchemaObject, preferred_content};
use crate::resolve::TypeHint;
use std::collections::BTreeSet;

impl GenerationContext<'_> {
    /// Performs schema parsing from the OpenAPI specification: every
    /// `components.schemas` entry, then every `components.responses` entry
    /// with a body
    pub fn process_components(&mut self) -> Result<(), GenError> {
        let spec = self.spec;

        for (key, definition) in &spec.components.schemas {
            let Some(name) = self.schema_type_name(key).map(str::to_owned) else {
                continue;
            };
            tracing::debug!("emitting schema {key:?} as {name}");
            let source = UnitSource::Schema(schema_pointer(key));
            self.emit_type(&name, definition, source)
                .context(|| format!("schema {key:?}"))?;
        }

        for (key, response) in &spec.components.responses {
            let response = match response {
                RefOr::Item(response) => response,
                RefOr::Ref { ref_ } => {
                    tracing::warn!("response {key:?} is a reference to {ref_:?}, skipping");
                    continue;
                }
            };
            let Some((_, media)) = preferred_content(&response.content) else {
                continue;
            };
            let (Some(schema), Some(name)) = (&media.schema, self.response_type_name(key)) else {
                continue;
            };
            let name = name.to_owned();
            tracing::debug!("emitting response {key:?} as {name}");
            let source = UnitSource::Schema(response_pointer(key));
            self.emit_type(&name, schema, source)
                .context(|| format!("response {key:?}"))?;
        }
        Ok(())
    }

    /// Emits the declaration for a named schema
    pub fn emit_type(&mut self, name: &str, schema: &Schema, source: UnitSource) -> Result<(), GenError> {
        let object = match schema {
            Schema::Ref { .. } => return self.emit_alias(name, "", schema, source),
            Schema::Typed(object) => object,
        };

        // a single-member allOf is a transparent wrapper
        if let Some(members) = &object.all_of {
            return match members.as_slice() {
                [only @ Schema::Typed(_)] => self.emit_type(name, only, source),
                [only] => self.emit_alias(name, &object.description, only, source),
                _ => Err(GenError::UnsupportedComposition {
                    location: source.to_string(),
                    count: members.len(),
                }),
            };
        }
        if let Some(branches) = &object.one_of {
            if self.is_collapsible_enum(branches) {
                let name = self.claim_enum_name(name, "", &source);
                return self.register_collapsed_enum(&name, object, branches, source);
            }
            if let [only] = branches.as_slice()
                && self.deref_object(only).is_some_and(SchemaObject::is_object)
            {
                return match only {
                    Schema::Typed(_) => self.emit_type(name, only, source),
                    Schema::Ref { .. } => self.emit_alias(name, &object.description, only, source),
                };
            }
            return self.emit_named_union(name, object, branches, false, source);
        }
        if let Some(branches) = &object.any_of {
            return self.emit_named_union(name, object, branches, true, source);
        }
        if object.is_string_enum() {
            let name = self.claim_enum_name(name, "", &source);
            return self.register_string_enum(&name, object, source);
        }
        if object.is_object() && object.map_values().is_none() && !object.properties.is_empty() {
            return match self.claim_type_name(name, "", &source) {
                Claim::Existing(_) => Ok(()),
                Claim::New(name) => self.emit_struct(&name, object, source),
            };
        }
        self.emit_alias(name, &object.description, schema, source)
    }

    fn emit_alias(&mut self, name: &str, description: &str, schema: &Schema, source: UnitSource) -> Result<(), GenError> {
        let name = match self.claim_type_name(name, "", &source) {
            Claim::Existing(_) => return Ok(()),
            Claim::New(name) => name,
        };
        let hint = TypeHint::new(&name, "", source.to_string());
        self.enter(&name);
        let target = self.resolve_type(&hint, schema);
        self.leave();
        let target = target?;

        let description = match description {
            "" => self.describe(schema),
            d => d.trim().to_owned(),
        };
        let newtype = self.is_forward_declared(&name);
        self.types.insert(
            name.clone(),
            TypeUnit {
                source,
                datatype: DataType::Alias {
                    alias: name,
                    description,
                    target,
                    newtype,
                },
            },
        );
        Ok(())
    }

    /// The object turns into a structure, properties in sorted order
    pub(crate) fn emit_struct(&mut self, name: &str, object: &SchemaObject, source: UnitSource) -> Result<(), GenError> {
        let pointer = source.to_string();
        let mut fields: Vec<StructField> = vec![];
        for (property, definition) in &object.properties {
            let hint = TypeHint::property_of(name, &pointer, property);
            let type_ = self
                .resolve_type(&hint, definition)
                .context(|| format!("property {name}.{property}"))?;

            // "fooBar" and "foo_bar" end up as the same field name
            let base = normalize_field_name(property)?;
            let mut rust_name = base.clone();
            let mut n = 2;
            while fields.iter().any(|f| f.rust_name == rust_name) {
                rust_name = format!("{base}_{n}");
                n += 1;
            }

            let typed = definition.object();
            fields.push(StructField {
                name: property.clone(),
                rust_name,
                type_,
                is_required: object.required.contains(property),
                is_nullable: typed.is_some_and(SchemaObject::is_nullable),
                is_deprecated: typed.is_some_and(|o| o.deprecated),
                descr: self.describe(definition),
            });
        }
        tracing::debug!("struct {name} with {} fields", fields.len());
        self.types.insert(
            name.to_owned(),
            TypeUnit {
                source,
                datatype: DataType::Struct {
                    name: name.to_owned(),
                    description: object.description.trim().to_owned(),
                    fields,
                },
            },
        );
        Ok(())
    }

    fn emit_named_union(
        &mut self,
        name: &str,
        object: &SchemaObject,
        branches: &[Schema],
        any_of: bool,
        source: UnitSource,
    ) -> Result<(), GenError> {
        match self.claim_type_name(name, "", &source) {
            Claim::Existing(_) => Ok(()),
            Claim::New(name) => self.emit_union(&name, object, branches, any_of, source),
        }
    }

    /// Picks the serde representation of a union and emits its payloads
    fn emit_union(
        &mut self,
        name: &str,
        object: &SchemaObject,
        branches: &[Schema],
        any_of: bool,
        source: UnitSource,
    ) -> Result<(), GenError> {
        let pointer = source.to_string();
        let keyword = if any_of { "anyOf" } else { "oneOf" };
        let branches: Vec<(String, &Schema)> = branches
            .iter()
            .enumerate()
            .filter(|(_, branch)| branch.object().is_none_or(|o| o.type_name() != "null"))
            .map(|(i, branch)| (format!("{pointer}/{keyword}/{i}"), branch))
            .collect();

        let (tagging, variants) = if any_of {
            (Tagging::Untagged, self.untagged_variants(name, &branches)?)
        } else if let Some(tag) = self.find_discriminator(&branches) {
            let variants = self.internal_variants(name, &branches, &tag)?;
            (Tagging::Internal { tag }, variants)
        } else if let Some(variants) = self.external_variants(name, &branches)? {
            (Tagging::External, variants)
        } else {
            (Tagging::Untagged, self.untagged_variants(name, &branches)?)
        };

        tracing::debug!("union {name}: {tagging:?} with {} variants", variants.len());
        self.types.insert(
            name.to_owned(),
            TypeUnit {
                source,
                datatype: DataType::OneOf {
                    name: name.to_owned(),
                    description: object.description.trim().to_owned(),
                    tagging,
                    variants,
                },
            },
        );
        Ok(())
    }

    /// A string property that holds a different single literal in every
    /// object branch
    fn find_discriminator(&self, branches: &[(String, &Schema)]) -> Option<String> {
        let objects = branches
            .iter()
            .map(|(_, branch)| self.deref_object(branch))
            .collect::<Option<Vec<_>>>()?;
        if objects.len() < 2 || !objects.iter().all(|o| o.is_object()) {
            return None;
        }
        objects[0]
            .properties
            .keys()
            .find(|property| {
                let mut seen = BTreeSet::new();
                objects.iter().all(|o| {
                    self.property_literal(o, property)
                        .is_some_and(|literal| seen.insert(variant_ident(literal)))
                })
            })
            .cloned()
    }

    fn property_literal<'s>(&self, object: &'s SchemaObject, property: &str) -> Option<&'s str>
    where
        Self: 's,
    {
        object
            .properties
            .get(property)
            .and_then(|schema| self.deref_object(schema))
            .and_then(SchemaObject::single_string_literal)
    }

    fn internal_variants(
        &mut self,
        name: &str,
        branches: &[(String, &Schema)],
        tag: &str,
    ) -> Result<Vec<OneOfVariant>, GenError> {
        let mut variants = vec![];
        for (pointer, branch) in branches {
            let object = self
                .deref_object(branch)
                .ok_or_else(|| GenError::UnsupportedSchema {
                    location: pointer.clone(),
                    reason: "union branch cannot be resolved".to_owned(),
                })?;
            let literal = self.property_literal(object, tag).unwrap_or_default().to_owned();
            let ident = variant_ident(&literal);

            let mut rest = object.clone();
            rest.properties.remove(tag);
            rest.required.retain(|r| r != tag);
            let payload = if rest.properties.is_empty() {
                None
            } else {
                let source = UnitSource::Schema(pointer.clone());
                let candidate = normalize_type_name(&format!("{name} {ident}"));
                let payload_name = match self.claim_type_name(&candidate, name, &source) {
                    Claim::Existing(existing) => existing,
                    Claim::New(new) => {
                        self.emit_struct(&new, &rest, source)?;
                        new
                    }
                };
                Some(TypeRef::named(payload_name, Origin::Local))
            };

            let descr = match object.description.trim() {
                "" => object
                    .properties
                    .get(tag)
                    .map(|s| self.describe(s))
                    .unwrap_or_default(),
                d => d.to_owned(),
            };
            variants.push(OneOfVariant {
                rename: (literal != ident).then_some(literal),
                ident,
                payload,
                descr,
            });
        }
        Ok(variants)
    }

    /// Serde's default representation: every branch is a bare string or an
    /// object with a single required property
    fn external_variants(
        &mut self,
        name: &str,
        branches: &[(String, &Schema)],
    ) -> Result<Option<Vec<OneOfVariant>>, GenError> {
        let mut shapes = vec![];
        let mut idents = BTreeSet::new();
        for (pointer, branch) in branches {
            let Some(object) = self.deref_object(branch) else {
                return Ok(None);
            };
            let key = if let Some(literal) = object.single_string_literal() {
                literal
            } else if object.is_object() && object.properties.len() == 1 {
                match object.properties.keys().next() {
                    Some(key) if object.required.contains(key) => key.as_str(),
                    _ => return Ok(None),
                }
            } else {
                return Ok(None);
            };
            if !idents.insert(variant_ident(key)) {
                return Ok(None);
            }
            shapes.push((pointer, key, object));
        }

        let mut variants = vec![];
        for (pointer, key, object) in shapes {
            let ident = variant_ident(key);
            let (payload, descr) = match object.properties.get(key) {
                Some(definition) if object.single_string_literal().is_none() => {
                    let hint = TypeHint::property_of(name, pointer, key);
                    let payload = self
                        .resolve_type(&hint, definition)
                        .context(|| format!("variant {ident} of {name}"))?;
                    let descr = match object.description.trim() {
                        "" => self.describe(definition),
                        d => d.to_owned(),
                    };
                    (Some(payload), descr)
                }
                _ => (None, object.description.trim().to_owned()),
            };
            variants.push(OneOfVariant {
                rename: (key != ident).then(|| key.to_owned()),
                ident,
                payload,
                descr,
            });
        }
        Ok(Some(variants))
    }

    /// One variant per branch, tried in order when deserializing
    fn untagged_variants(
        &mut self,
        name: &str,
        branches: &[(String, &Schema)],
    ) -> Result<Vec<OneOfVariant>, GenError> {
        let mut variants: Vec<OneOfVariant> = vec![];
        for (i, (pointer, branch)) in branches.iter().enumerate() {
            let label = match branch.object().map(|o| o.title.trim()) {
                Some(title) if !title.is_empty() => title.to_owned(),
                _ => format!("variant {}", i + 1),
            };
            let hint = TypeHint::new(name, &label, pointer.clone());
            let payload = self
                .resolve_type(&hint, branch)
                .context(|| format!("branch {} of {name}", i + 1))?;
            let base = match &payload {
                TypeRef::Named {
                    origin: Origin::Local,
                    ..
                } => normalize_type_name(&label),
                TypeRef::Named { name, .. } => name.clone(),
                TypeRef::Builtin(builtin) => builtin.variant_name().to_owned(),
                TypeRef::Vec(_) => "Array".to_owned(),
                TypeRef::Map(_) => "Map".to_owned(),
            };
            let mut ident = base.clone();
            let mut n = 2;
            while variants.iter().any(|v| v.ident == ident) {
                ident = format!("{base}{n}");
                n += 1;
            }
            variants.push(OneOfVariant {
                ident,
                rename: None,
                payload: Some(payload),
                descr: self.describe(branch),
            });
        }
        Ok(variants)
    }

    pub(crate) fn emit_local_struct(&mut self, hint: &TypeHint, object: &SchemaObject) -> Result<String, GenError> {
        let source = UnitSource::Schema(hint.pointer.clone());
        match self.claim_type_name(&hint.local_name(), &hint.parent, &source) {
            Claim::Existing(name) => Ok(name),
            Claim::New(name) => {
                self.emit_struct(&name, object, source)?;
                Ok(name)
            }
        }
    }

    pub(crate) fn emit_local_union(
        &mut self,
        hint: &TypeHint,
        object: &SchemaObject,
        branches: &[Schema],
        any_of: bool,
    ) -> Result<String, GenError> {
        let source = UnitSource::Schema(hint.pointer.clone());
        match self.claim_type_name(&hint.local_name(), &hint.parent, &source) {
            Claim::Existing(name) => Ok(name),
            Claim::New(name) => {
                self.emit_union(&name, object, branches, any_of, source)?;
                Ok(name)
            }
        }
    }

    pub(crate) fn emit_local_enum(&mut self, hint: &TypeHint, object: &SchemaObject) -> Result<String, GenError> {
        let source = UnitSource::Schema(hint.pointer.clone());
        let name = self.claim_enum_name(&singularize(&hint.local_name()), &hint.parent, &source);
        self.register_string_enum(&name, object, source)?;
        Ok(name)
    }

    pub(crate) fn emit_local_collapsed_enum(
        &mut self,
        hint: &TypeHint,
        object: &SchemaObject,
        branches: &[Schema],
    ) -> Result<String, GenError> {
        let source = UnitSource::Schema(hint.pointer.clone());
        let name = self.claim_enum_name(&singularize(&hint.local_name()), &hint.parent, &source);
        self.register_collapsed_enum(&name, object, branches, source)?;
        Ok(name)
    }

    fn register_string_enum(&mut self, name: &str, object: &SchemaObject, source: UnitSource) -> Result<(), GenError> {
        let location = source.to_string();
        let values = object
            .enum_values()
            .into_iter()
            .map(|value| match value.as_str() {
                Some(literal) => Ok((literal.to_owned(), String::new())),
                None => Err(GenError::NonStringEnumValue {
                    location: location.clone(),
                    value: value.clone(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if self.enums.register(name, object.description.trim(), values, source) {
            tracing::debug!("declared enum {name}");
        }
        Ok(())
    }

    /// The "enum with per-value docs" pattern: a oneOf whose branches are
    /// each a single documented string literal
    fn register_collapsed_enum(
        &mut self,
        name: &str,
        object: &SchemaObject,
        branches: &[Schema],
        source: UnitSource,
    ) -> Result<(), GenError> {
        let mut values = vec![];
        for branch in branches {
            let literal = self
                .deref_object(branch)
                .and_then(|o| o.single_string_literal().map(|l| (l, o.description.trim())))
                .ok_or_else(|| GenError::UnsupportedSchema {
                    location: source.to_string(),
                    reason: "oneOf branch is not a single string literal".to_owned(),
                })?;
            values.push((literal.0.to_owned(), literal.1.to_owned()));
        }
        if self.enums.register(name, object.description.trim(), values, source) {
            tracing::debug!("declared enum {name} from oneOf");
        }
        Ok(())
    }

    /// Own description, or the one of the schema behind a reference or a
    /// single-member `allOf`
    pub(crate) fn describe(&self, schema: &Schema) -> String {
        let own = schema.description().trim();
        if !own.is_empty() {
            return own.to_owned();
        }
        match schema {
            Schema::Ref { .. } => self
                .deref_object(schema)
                .map(|o| o.description.trim().to_owned())
                .unwrap_or_default(),
            Schema::Typed(object) => match object.all_of.as_deref() {
                Some([only]) => self.describe(only),
                _ => String::new(),
            },
        }
    }
}

/// Variant name for a wire literal
pub(crate) fn variant_ident(literal: &str) -> String {
    match normalize_type_name(literal) {
        ident if !ident.is_empty() => ident,
        _ if literal.trim().is_empty() => "Empty".to_owned(),
        _ => "Value".to_owned(),
    }
}
