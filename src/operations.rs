//! Operation -> client method.

use crate::context::{GenerationContext, escape_pointer};
use crate::datatypes::{Builtin, DataType, Origin, TypeRef, UnitSource};
use crate::error::{GenError, ResultExt};
use crate::method_names::{NameContext, apply_rules, fallback_operation_id};
use crate::naming::{normalize_field_name, normalize_type_name, pluralize, tag_name};
use crate::openapi::{
    HttpMethod, JSON_MEDIA_TYPE, Operation, Parameter, ParameterLocation, PathItem, RefOr, Response,
    preferred_content,
};
use crate::resolve::TypeHint;
use std::collections::BTreeMap;

const PARAMETER_PREFIX: &str = "#/components/parameters/";
const RESPONSE_PREFIX: &str = "#/components/responses/";

/// Local variable names of the generated method bodies
pub(crate) const RESERVED_LOCALS: &[&str] = &["url_path", "req", "query_pairs", "page"];

/// Methods generated for one tag
#[derive(Debug, Clone)]
pub struct Service {
    /// Type name of the service handle, `APICallService`
    pub name: String,
    /// Accessor on the client, `api_calls`
    pub accessor: String,
    pub description: String,
    pub methods: BTreeMap<String, MethodUnit>,
}

/// A generated method
#[derive(Debug, Clone)]
pub struct MethodUnit {
    pub name: String,
    pub source: UnitSource,
    pub http_method: HttpMethod,
    pub path: String,
    pub params: Vec<MethodParam>,
    pub body: Option<RequestBodyArg>,
    pub response: ResponseKind,
    /// Doc comment lines
    pub docs: Vec<String>,
    pub example: String,
    /// Set on the "all pages" wrapper
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone)]
pub struct MethodParam {
    /// Name on the wire
    pub name: String,
    pub rust_name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub type_: TypeRef,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyKind {
    Json(TypeRef),
    Raw { content_type: String },
}

#[derive(Debug, Clone)]
pub struct RequestBodyArg {
    pub arg: String,
    pub kind: BodyKind,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseKind {
    /// No body, the method returns `()`
    Empty,
    Json(TypeRef),
    /// Non-JSON body, returned as raw bytes
    Raw,
}

/// How the "all pages" wrapper drives its base method
#[derive(Debug, Clone)]
pub struct Pagination {
    pub base: String,
    pub item: TypeRef,
    pub items_field: String,
    pub items_optional: bool,
    pub next_page_field: String,
    pub next_page_optional: bool,
}

impl MethodUnit {
    /// Arguments of the generated signature, pagination arguments excluded on
    /// the wrapper
    pub fn arguments(&self) -> impl Iterator<Item = &MethodParam> {
        self.params
            .iter()
            .filter(|p| self.pagination.is_none() || !is_pagination_param(&p.name))
    }
}

fn is_pagination_param(name: &str) -> bool {
    matches!(name, "page_token" | "limit")
}

impl GenerationContext<'_> {
    /// Synthesizes methods for every operation, paths in sorted order
    pub fn process_paths(&mut self) -> Result<(), GenError> {
        let spec = self.spec;
        for (path, item) in &spec.paths {
            if let Some(reference) = &item.ref_ {
                tracing::warn!("path {path:?} is a reference to {reference:?}, skipping");
                continue;
            }
            if self.config.is_path_skipped(path) {
                tracing::debug!("path {path:?} is skipped by configuration");
                continue;
            }
            for (method, operation) in item.operations() {
                self.synthesize_method(path, method, item, operation)
                    .context(|| format!("operation {method} {path}"))?;
            }
        }
        Ok(())
    }

    /// Builds the method for one operation and files it under the
    /// operation's first tag. A paginated operation yields a second method,
    /// the "all pages" wrapper.
    pub fn synthesize_method(
        &mut self,
        path: &str,
        method: HttpMethod,
        item: &PathItem,
        operation: &Operation,
    ) -> Result<Vec<MethodUnit>, GenError> {
        let tag = operation.tags.first().ok_or_else(|| GenError::MissingTag {
            method: method.to_string(),
            path: path.to_owned(),
        })?;
        let operation_id = match operation.operation_id.trim() {
            "" => fallback_operation_id(method, path),
            id => id.to_owned(),
        };
        let type_prefix = normalize_type_name(&operation_id);
        let pointer = format!("#/paths/{}/{}", escape_pointer(path), method.key());

        let params = self.method_params(path, item, operation, &type_prefix, &pointer)?;
        let body = self.request_body(operation, &params, &type_prefix, &pointer)?;
        let response = self.response_kind(operation, &type_prefix, &pointer)?;

        let service_key = tag_name(tag);
        let name = self.method_name(&service_key, &operation_id, tag, method, path)?;
        let source = UnitSource::Operation {
            method: method.to_string(),
            path: path.to_owned(),
        };

        let mut base = MethodUnit {
            name: name.clone(),
            source: source.clone(),
            http_method: method,
            path: path.to_owned(),
            params,
            body,
            response,
            docs: vec![],
            example: String::new(),
            pagination: None,
        };
        let pagination = self.detect_pagination(&base);
        let wrapper_name = pagination
            .as_ref()
            .map(|_| self.free_method_name(&service_key, &format!("{name}_all_pages")));
        base.docs = method_docs(operation, &base, wrapper_name.as_deref());
        base.example = self.example(&service_key, &base);

        let mut units = vec![base];
        if let (Some(mut pagination), Some(wrapper_name)) = (pagination, wrapper_name) {
            pagination.base = name.clone();
            let mut wrapper = units[0].clone();
            wrapper.name = wrapper_name.clone();
            wrapper.response = ResponseKind::Json(TypeRef::Vec(Box::new(pagination.item.clone())));
            wrapper.pagination = Some(pagination);
            wrapper.docs = vec![
                format!("Fetches every page of [`Self::{name}`] and returns all items."),
                String::new(),
                "The first failing page aborts the whole fetch and its error is returned.".to_owned(),
            ];
            wrapper.example = self.example(&service_key, &wrapper);
            units[0].example = format!("{}\n\n// - OR -\n\n{}", units[0].example, wrapper.example);
            units.push(wrapper);
        }

        let service = self.service_mut(tag, &service_key);
        for unit in &units {
            tracing::debug!("method {}::{} for {}", service.name, unit.name, unit.source);
            service.methods.insert(unit.name.clone(), unit.clone());
        }
        Ok(units)
    }

    fn service_mut(&mut self, tag: &str, key: &str) -> &mut Service {
        let spec = self.spec;
        self.services.entry(key.to_owned()).or_insert_with(|| Service {
            name: format!("{key}Service"),
            accessor: normalize_field_name(&pluralize(key)).unwrap_or_else(|_| key.to_lowercase()),
            description: spec
                .tags
                .iter()
                .find(|t| t.name == tag)
                .map(|t| t.description.trim().to_owned())
                .unwrap_or_default(),
            methods: BTreeMap::new(),
        })
    }

    /// Renamed operation id; falls back to the full operation id and then to
    /// a numbered name when the service already has a method of that name
    fn method_name(
        &self,
        service_key: &str,
        operation_id: &str,
        tag: &str,
        method: HttpMethod,
        path: &str,
    ) -> Result<String, GenError> {
        let ctx = NameContext::new(tag, method, path);
        let renamed = normalize_field_name(&apply_rules(operation_id, &ctx).join("_"))?;
        if !self.has_method(service_key, &renamed) {
            return Ok(renamed);
        }
        let full = normalize_field_name(operation_id)?;
        tracing::debug!("method name {renamed:?} is taken in {service_key}, trying {full:?}");
        Ok(self.free_method_name(service_key, &full))
    }

    fn free_method_name(&self, service_key: &str, base: &str) -> String {
        let mut name = base.to_owned();
        let mut n = 2;
        while self.has_method(service_key, &name) {
            name = format!("{base}_{n}");
            n += 1;
        }
        name
    }

    fn has_method(&self, service_key: &str, name: &str) -> bool {
        self.services
            .get(service_key)
            .is_some_and(|s| s.methods.contains_key(name))
    }

    /// Path-level and operation-level parameters, the latter winning.
    /// Path parameters come first in template order, then query and header
    /// parameters sorted by name.
    fn method_params(
        &mut self,
        path: &str,
        item: &PathItem,
        operation: &Operation,
        type_prefix: &str,
        pointer: &str,
    ) -> Result<Vec<MethodParam>, GenError> {
        let mut merged: BTreeMap<(u8, String), Parameter> = BTreeMap::new();
        for parameter in item.parameters.iter().chain(&operation.parameters) {
            let parameter = self.lookup_parameter(parameter)?;
            let order = match parameter.location {
                ParameterLocation::Path => 0,
                ParameterLocation::Query => 1,
                ParameterLocation::Header => 2,
                ParameterLocation::Cookie => {
                    tracing::warn!("cookie parameter {:?} of {path:?} is not supported, skipping", parameter.name);
                    continue;
                }
            };
            merged.insert((order, parameter.name.clone()), parameter);
        }

        let placeholders = path_placeholders(path);
        for placeholder in &placeholders {
            if !merged.contains_key(&(0, placeholder.clone())) {
                return Err(GenError::UndeclaredPathParameter {
                    path: path.to_owned(),
                    name: placeholder.clone(),
                });
            }
        }

        let mut params: Vec<MethodParam> = vec![];
        let mut ordered: Vec<&Parameter> = placeholders
            .iter()
            .filter_map(|p| merged.get(&(0, p.clone())))
            .collect();
        for ((order, name), parameter) in &merged {
            if *order == 0 {
                if !placeholders.contains(name) {
                    tracing::warn!("path parameter {name:?} does not appear in {path:?}, skipping");
                }
                continue;
            }
            ordered.push(parameter);
        }

        for parameter in ordered {
            let hint = TypeHint::new(
                type_prefix,
                &parameter.name,
                format!("{pointer}/parameters/{}", escape_pointer(&parameter.name)),
            );
            let type_ = match &parameter.schema {
                Some(schema) => self
                    .resolve_type(&hint, schema)
                    .context(|| format!("parameter {:?}", parameter.name))?,
                None => TypeRef::Builtin(Builtin::String),
            };
            let base = normalize_field_name(&parameter.name)?;
            let mut rust_name = base.clone();
            let mut n = 2;
            while params.iter().any(|p| p.rust_name == rust_name) || RESERVED_LOCALS.contains(&rust_name.as_str()) {
                rust_name = format!("{base}_{n}");
                n += 1;
            }
            let description = match parameter.description.trim() {
                "" => parameter
                    .schema
                    .as_ref()
                    .map(|s| self.describe(s))
                    .unwrap_or_default(),
                d => d.to_owned(),
            };
            params.push(MethodParam {
                name: parameter.name.clone(),
                rust_name,
                location: parameter.location,
                // path parameters are always required
                required: parameter.required || parameter.location == ParameterLocation::Path,
                type_,
                description,
            });
        }
        Ok(params)
    }

    fn lookup_parameter(&self, parameter: &RefOr<Parameter>) -> Result<Parameter, GenError> {
        match parameter {
            RefOr::Item(parameter) => Ok(parameter.clone()),
            RefOr::Ref { ref_ } => ref_
                .strip_prefix(PARAMETER_PREFIX)
                .and_then(|key| self.spec.components.parameters.get(key))
                .and_then(|p| match p {
                    RefOr::Item(p) => Some(p.clone()),
                    RefOr::Ref { .. } => None,
                })
                .ok_or_else(|| GenError::UnresolvedReference {
                    reference: ref_.clone(),
                }),
        }
    }

    fn request_body(
        &mut self,
        operation: &Operation,
        params: &[MethodParam],
        type_prefix: &str,
        pointer: &str,
    ) -> Result<Option<RequestBodyArg>, GenError> {
        let body = match &operation.request_body {
            None => return Ok(None),
            Some(RefOr::Ref { ref_ }) => {
                return Err(GenError::UnsupportedSchema {
                    location: format!("{pointer}/requestBody"),
                    reason: format!("request body references ({ref_:?}) are not supported"),
                });
            }
            Some(RefOr::Item(body)) => body,
        };
        let Some((media_type, media)) = preferred_content(&body.content) else {
            return Ok(None);
        };

        let kind = if media_type == JSON_MEDIA_TYPE {
            let hint = TypeHint::new(
                type_prefix,
                "body",
                format!(
                    "{pointer}/requestBody/content/{}/schema",
                    escape_pointer(media_type)
                ),
            );
            match &media.schema {
                Some(schema) => BodyKind::Json(self.resolve_type(&hint, schema).context(|| "request body")?),
                None => BodyKind::Json(TypeRef::Builtin(Builtin::Any)),
            }
        } else {
            BodyKind::Raw {
                content_type: media_type.to_owned(),
            }
        };
        let arg = if params.iter().any(|p| p.rust_name == "body") {
            "request_body"
        } else {
            "body"
        };
        let description = match body.description.trim() {
            "" => media.schema.as_ref().map(|s| self.describe(s)).unwrap_or_default(),
            d => d.to_owned(),
        };
        Ok(Some(RequestBodyArg {
            arg: arg.to_owned(),
            kind,
            description,
        }))
    }

    /// The first 2xx response in code order, `default` when there is none
    fn response_kind(&mut self, operation: &Operation, type_prefix: &str, pointer: &str) -> Result<ResponseKind, GenError> {
        let success = operation
            .responses
            .iter()
            .find(|(code, _)| code.starts_with('2'))
            .or_else(|| operation.responses.get_key_value("default"));
        let Some((code, response)) = success else {
            return Ok(ResponseKind::Empty);
        };

        let response: &Response = match response {
            RefOr::Item(response) => response,
            RefOr::Ref { ref_ } => {
                let key = ref_.strip_prefix(RESPONSE_PREFIX).unwrap_or(ref_);
                let spec = self.spec;
                let response = match spec.components.responses.get(key) {
                    Some(RefOr::Item(response)) => response,
                    _ => {
                        return Err(GenError::UnresolvedReference {
                            reference: ref_.clone(),
                        });
                    }
                };
                return self.component_response_kind(key, response);
            }
        };

        let Some((media_type, media)) = preferred_content(&response.content) else {
            return Ok(ResponseKind::Empty);
        };
        if media_type != JSON_MEDIA_TYPE {
            return Ok(ResponseKind::Raw);
        }
        let Some(schema) = &media.schema else {
            return Ok(ResponseKind::Empty);
        };
        if self.deref_object(schema).is_some_and(|o| o.title == "Null") {
            return Ok(ResponseKind::Empty);
        }
        let hint = TypeHint::new(
            "Response",
            type_prefix,
            format!(
                "{pointer}/responses/{}/content/{}/schema",
                escape_pointer(code),
                escape_pointer(media_type)
            ),
        );
        let type_ = self.resolve_type(&hint, schema).context(|| format!("response {code}"))?;
        Ok(ResponseKind::Json(type_))
    }

    fn component_response_kind(&self, key: &str, response: &Response) -> Result<ResponseKind, GenError> {
        let Some((media_type, media)) = preferred_content(&response.content) else {
            return Ok(ResponseKind::Empty);
        };
        if media_type != JSON_MEDIA_TYPE {
            return Ok(ResponseKind::Raw);
        }
        match (&media.schema, self.response_type_name(key)) {
            (Some(schema), _) if self.deref_object(schema).is_some_and(|o| o.title == "Null") => {
                Ok(ResponseKind::Empty)
            }
            (Some(_), Some(name)) => Ok(ResponseKind::Json(TypeRef::named(name, Origin::Schema))),
            _ => Ok(ResponseKind::Empty),
        }
    }

    /// A GET with `page_token` and `limit` whose response has `items` and
    /// `next_page`
    fn detect_pagination(&self, method: &MethodUnit) -> Option<Pagination> {
        if method.http_method != HttpMethod::Get {
            return None;
        }
        let has = |name: &str| {
            method
                .params
                .iter()
                .any(|p| p.name == name && p.location == ParameterLocation::Query)
        };
        if !has("page_token") || !has("limit") {
            return None;
        }
        let ResponseKind::Json(response) = &method.response else {
            return None;
        };
        let fields = self.struct_fields(response)?;
        let items = fields.iter().find(|f| f.name == "items")?;
        let next_page = fields.iter().find(|f| f.name == "next_page")?;
        let TypeRef::Vec(item) = &items.type_ else {
            return None;
        };
        Some(Pagination {
            base: String::new(),
            item: (**item).clone(),
            items_field: items.rust_name.clone(),
            items_optional: items.is_optional(),
            next_page_field: next_page.rust_name.clone(),
            next_page_optional: next_page.is_optional(),
        })
    }

    /// Fields of the struct behind a type, following aliases
    fn struct_fields(&self, type_: &TypeRef) -> Option<&[crate::datatypes::StructField]> {
        let mut current = type_;
        for _ in 0..self.types.len() + 1 {
            let name = current.direct_name()?;
            match &self.types.get(name)?.datatype {
                DataType::Struct { fields, .. } => return Some(fields),
                DataType::Alias { target, .. } => current = target,
                DataType::OneOf { .. } => return None,
            }
        }
        None
    }

    fn example(&self, service_key: &str, method: &MethodUnit) -> String {
        let accessor = self
            .services
            .get(service_key)
            .map(|s| s.accessor.clone())
            .unwrap_or_else(|| {
                normalize_field_name(&pluralize(service_key)).unwrap_or_else(|_| service_key.to_lowercase())
            });
        let mut args: Vec<String> = method.arguments().map(|p| p.rust_name.clone()).collect();
        if let Some(body) = &method.body {
            args.push(match body.kind {
                BodyKind::Json(_) => format!("&{}", body.arg),
                BodyKind::Raw { .. } => body.arg.clone(),
            });
        }
        let call = format!(
            "client.{accessor}().{}({}).await?",
            method.name,
            args.join(", ")
        );
        let package = &self.config.package_name;
        match method.response {
            ResponseKind::Empty => format!("let client = {package}::Client::new_from_env()?;\n{call};"),
            _ => format!(
                "let client = {package}::Client::new_from_env()?;\nlet result = {call};\nprintln!(\"{{:?}}\", result);"
            ),
        }
    }

    /// Link to the method in the published docs of the generated crate
    pub fn docs_link(&self, service: &Service, method: &str) -> String {
        format!(
            "{}/client/struct.{}.html#method.{method}",
            self.config.docs_base_url.trim_end_matches('/'),
            service.name
        )
    }
}

/// `{name}` placeholders of a path template, in order
pub fn path_placeholders(path: &str) -> Vec<String> {
    let mut found = vec![];
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        found.push(rest[start + 1..start + len].to_owned());
        rest = &rest[start + len + 1..];
    }
    found
}

fn method_docs(operation: &Operation, method: &MethodUnit, all_pages: Option<&str>) -> Vec<String> {
    let mut docs = vec![];
    let paragraph = |docs: &mut Vec<String>, text: &str| {
        if text.trim().is_empty() {
            return;
        }
        if !docs.is_empty() {
            docs.push(String::new());
        }
        docs.extend(text.trim().lines().map(|l| l.trim_end().to_owned()));
    };
    paragraph(&mut docs, &operation.summary);
    if operation.description.trim() != operation.summary.trim() {
        paragraph(&mut docs, &operation.description);
    }
    if let Some(wrapper) = all_pages {
        paragraph(
            &mut docs,
            &format!("This endpoint is paginated; `{wrapper}` fetches every page."),
        );
    }

    let mut arguments: Vec<String> = method
        .params
        .iter()
        .map(|p| {
            let required = if p.required { " (required)" } else { "" };
            match p.description.as_str() {
                "" => format!("* `{}`{required}", p.rust_name),
                d => format!("* `{}`: {}{required}", p.rust_name, d.lines().next().unwrap_or_default()),
            }
        })
        .collect();
    arguments.sort();
    if let Some(body) = &method.body
        && !body.description.is_empty()
    {
        arguments.push(format!(
            "* `{}`: {}",
            body.arg,
            body.description.lines().next().unwrap_or_default()
        ));
    }
    if !arguments.is_empty() {
        paragraph(&mut docs, &format!("**Parameters:**\n\n{}", arguments.join("\n")));
    }
    if operation.deprecated {
        paragraph(&mut docs, "**Deprecated**");
    }
    docs
}
