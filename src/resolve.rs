//! Schema node -> Rust type.
//!
//! Resolution and emission are one pass: resolving an inline object or enum
//! emits it on the spot and hands back its name.

use crate::context::{GenerationContext, escape_pointer};
use crate::datatypes::{Builtin, IntFormat, Origin, TypeRef};
use crate::error::{GenError, ResultExt};
use crate::naming::{normalize_type_name, singularize};
use crate::openapi::{Schema, SchemaObject};

/// Where a schema sits, used to name whatever gets synthesized for it
#[derive(Debug, Clone)]
pub struct TypeHint {
    /// Name of the enclosing type (or method, for parameters)
    pub parent: String,
    /// Property the schema belongs to; empty at the root of a type
    pub property: String,
    /// JSON pointer of the schema
    pub pointer: String,
}

impl TypeHint {
    pub fn new(parent: impl Into<String>, property: impl Into<String>, pointer: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            property: property.into(),
            pointer: pointer.into(),
        }
    }

    /// `<Parent><Property>`
    pub fn local_name(&self) -> String {
        normalize_type_name(&format!("{} {}", self.parent, self.property))
    }

    /// Hint for the items of an array
    pub fn item(&self) -> TypeHint {
        let property = match singularize(&self.property) {
            p if p.is_empty() => "item".to_owned(),
            p => p,
        };
        TypeHint::new(&self.parent, property, format!("{}/items", self.pointer))
    }

    /// Hint for the values of a map
    pub fn value(&self) -> TypeHint {
        let property = match singularize(&self.property) {
            p if p.is_empty() => "value".to_owned(),
            p => p,
        };
        TypeHint::new(
            &self.parent,
            property,
            format!("{}/additionalProperties", self.pointer),
        )
    }

    /// Hint for a property of the object at this location, owned by `owner`
    pub fn property_of(owner: &str, pointer: &str, property: &str) -> TypeHint {
        TypeHint::new(
            owner,
            property,
            format!("{pointer}/properties/{}", escape_pointer(property)),
        )
    }
}

impl GenerationContext<'_> {
    /// Maps a schema onto a type, emitting whatever local types it needs
    pub fn resolve_type(&mut self, hint: &TypeHint, schema: &Schema) -> Result<TypeRef, GenError> {
        match schema {
            Schema::Ref { ref_ } => self.resolve_reference(ref_),
            Schema::Typed(object) => self.resolve_object(hint, object),
        }
    }

    /// A reference to a nominal schema is returned by name; anything else is
    /// inlined. A schema reached again while it is being inlined is returned
    /// as a forward reference, which ends the recursion.
    pub fn resolve_reference(&mut self, reference: &str) -> Result<TypeRef, GenError> {
        let (key, target) = self.lookup_schema(reference)?;
        let name = self
            .schema_type_name(key)
            .map(str::to_owned)
            .ok_or_else(|| GenError::UnresolvedReference {
                reference: reference.to_owned(),
            })?;

        if self.is_nominal(target) || self.is_enum_like(target) {
            return Ok(TypeRef::named(name, Origin::Schema));
        }
        if !self.enter(&name) {
            tracing::debug!("{name} refers to itself, using a forward declaration");
            return Ok(TypeRef::named(name, Origin::Forward));
        }
        let hint = TypeHint::new(&name, "", crate::context::schema_pointer(key));
        let resolved = self.resolve_type(&hint, target);
        self.leave();
        resolved
    }

    fn resolve_object(&mut self, hint: &TypeHint, object: &SchemaObject) -> Result<TypeRef, GenError> {
        if let Some(members) = &object.all_of {
            return match members.as_slice() {
                [only] => self.resolve_type(hint, only),
                _ => Err(GenError::UnsupportedComposition {
                    location: hint.pointer.clone(),
                    count: members.len(),
                }),
            };
        }
        if let Some(branches) = &object.one_of {
            return self.resolve_union(hint, object, branches, false);
        }
        if let Some(branches) = &object.any_of {
            return self.resolve_union(hint, object, branches, true);
        }
        if object.is_string_enum() {
            let name = self.emit_local_enum(hint, object)?;
            return Ok(TypeRef::named(name, Origin::Local));
        }

        let resolved = match object.type_name() {
            "string" => TypeRef::Builtin(Builtin::for_string_format(&object.format)),
            "integer" => TypeRef::Builtin(Builtin::Integer(IntFormat::from_format(&object.format))),
            "number" => TypeRef::Builtin(Builtin::Number),
            "boolean" => TypeRef::Builtin(Builtin::Boolean),
            "array" => {
                let item = match &object.items {
                    Some(items) => self
                        .resolve_type(&hint.item(), items)
                        .context(|| format!("items of {}", hint.pointer))?,
                    None => TypeRef::Builtin(Builtin::Any),
                };
                TypeRef::Vec(Box::new(item))
            }
            _ if object.is_object() => match object.map_values() {
                Some(Some(values)) => TypeRef::Map(Box::new(self.resolve_type(&hint.value(), values)?)),
                Some(None) => TypeRef::Map(Box::new(TypeRef::Builtin(Builtin::Any))),
                None if object.properties.is_empty() => TypeRef::Builtin(Builtin::Any),
                None => {
                    let name = self.emit_local_struct(hint, object)?;
                    TypeRef::named(name, Origin::Local)
                }
            },
            // no type at all, or only additionalProperties
            _ => match object.map_values() {
                Some(Some(values)) => TypeRef::Map(Box::new(self.resolve_type(&hint.value(), values)?)),
                _ => TypeRef::Builtin(Builtin::Any),
            },
        };
        Ok(resolved)
    }

    fn resolve_union(
        &mut self,
        hint: &TypeHint,
        object: &SchemaObject,
        branches: &[Schema],
        any_of: bool,
    ) -> Result<TypeRef, GenError> {
        if !any_of && self.is_collapsible_enum(branches) {
            let name = self.emit_local_collapsed_enum(hint, object, branches)?;
            return Ok(TypeRef::named(name, Origin::Local));
        }
        // a oneOf around a single object is just that object
        if let [only] = branches
            && self.deref_object(only).is_some_and(SchemaObject::is_object)
        {
            return self.resolve_type(hint, only);
        }
        let name = self.emit_local_union(hint, object, branches, any_of)?;
        Ok(TypeRef::named(name, Origin::Local))
    }
}
