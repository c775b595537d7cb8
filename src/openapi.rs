use crate::error::GenError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// OpenAPI root (only the parts the generator reads)
///
/// For a reference on the structure, see
/// <https://learn.openapis.org/specification/>
///
/// All maps are ordered so that every traversal visits keys in sorted order
/// and repeated runs produce identical output.
#[derive(Debug, Default, Deserialize)]
pub struct OpenApi {
    #[serde(default)]
    pub info: Info,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
}

#[derive(Debug, Default, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,
    #[serde(default)]
    pub responses: BTreeMap<String, RefOr<Response>>,
    #[serde(default)]
    pub parameters: BTreeMap<String, RefOr<Parameter>>,
}

/// Either a `$ref` or an inline definition
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    Ref {
        #[serde(rename = "$ref")]
        ref_: String,
    },
    Item(T),
}

/// Universal description of the scheme
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Schema {
    /// Link to another scheme
    Ref {
        #[serde(rename = "$ref")]
        ref_: String,
    },
    /// Inline scheme
    Typed(Box<SchemaObject>),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaObject {
    #[serde(rename = "type", default)]
    pub schema_type: SchemaType,

    #[serde(default)]
    pub format: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub nullable: bool,

    #[serde(default)]
    pub deprecated: bool,

    #[serde(default)]
    pub description: String,

    /// Object properties if `{"type": "object"}`
    #[serde(default)]
    pub properties: BTreeMap<String, Schema>,

    #[serde(default)]
    pub required: Vec<String>,

    /// Array items if `{"type": "array"}`
    pub items: Option<Schema>,

    /// Map values if `{"type": "object"}` without fixed properties
    #[serde(rename = "additionalProperties")]
    pub additional_properties: Option<AdditionalProperties>,

    /// Enumeration elements, kept raw so non-string values can be reported
    #[serde(rename = "enum")]
    pub enum_items: Option<Vec<serde_json::Value>>,

    /// Compositions
    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<Schema>>,
    #[serde(rename = "oneOf")]
    pub one_of: Option<Vec<Schema>>,
    #[serde(rename = "anyOf")]
    pub any_of: Option<Vec<Schema>>,
}

/// `type` is a single string in OpenAPI 3.0 and may be a list in 3.1
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

impl Default for SchemaType {
    fn default() -> Self {
        SchemaType::Single(String::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Schema),
}

impl SchemaObject {
    /// The primary type name, ignoring a `"null"` member of a type list
    pub fn type_name(&self) -> &str {
        match &self.schema_type {
            SchemaType::Single(t) => t,
            SchemaType::Multiple(types) => types
                .iter()
                .find(|t| t.as_str() != "null")
                .map(String::as_str)
                .unwrap_or(""),
        }
    }

    pub fn is_nullable(&self) -> bool {
        let null_in_type =
            matches!(&self.schema_type, SchemaType::Multiple(types) if types.iter().any(|t| t == "null"));
        let null_in_enum = self
            .enum_items
            .as_ref()
            .is_some_and(|items| items.iter().any(|v| v.is_null()));
        self.nullable || null_in_type || null_in_enum
    }

    /// Non-null enumeration values; an empty list means "not an enum"
    pub fn enum_values(&self) -> Vec<&serde_json::Value> {
        self.enum_items
            .iter()
            .flatten()
            .filter(|v| !v.is_null())
            .collect()
    }

    /// A string schema with exactly one allowed value
    pub fn single_string_literal(&self) -> Option<&str> {
        if !matches!(self.type_name(), "string" | "") {
            return None;
        }
        let values = self.enum_values();
        if values.len() != 1 {
            return None;
        }
        let only: &serde_json::Value = values[0];
        only.as_str()
    }

    pub fn is_object(&self) -> bool {
        self.type_name() == "object" || (self.type_name().is_empty() && !self.properties.is_empty())
    }

    pub fn is_string_enum(&self) -> bool {
        matches!(self.type_name(), "string" | "") && !self.enum_values().is_empty()
    }

    /// Schema for map values, if this object is a map
    pub fn map_values(&self) -> Option<Option<&Schema>> {
        if !self.properties.is_empty() {
            return None;
        }
        match &self.additional_properties {
            Some(AdditionalProperties::Schema(schema)) => Some(Some(schema)),
            Some(AdditionalProperties::Allowed(true)) => Some(None),
            _ => None,
        }
    }
}

impl Schema {
    /// The inline definition, if this is not a reference
    pub fn object(&self) -> Option<&SchemaObject> {
        match self {
            Schema::Ref { .. } => None,
            Schema::Typed(object) => Some(object),
        }
    }

    pub fn description(&self) -> &str {
        self.object().map(|o| o.description.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PathItem {
    #[serde(rename = "$ref")]
    pub ref_: Option<String>,
    pub get: Option<Operation>,
    pub post: Option<Operation>,
    pub put: Option<Operation>,
    pub delete: Option<Operation>,
    pub patch: Option<Operation>,
    pub head: Option<Operation>,
    /// Parameters shared by every operation of the path
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Key of the operation inside a path item
    pub fn key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Head => "head",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PathItem {
    /// Declared operations in a fixed verb order
    pub fn operations(&self) -> Vec<(HttpMethod, &Operation)> {
        [
            (HttpMethod::Get, &self.get),
            (HttpMethod::Post, &self.post),
            (HttpMethod::Put, &self.put),
            (HttpMethod::Delete, &self.delete),
            (HttpMethod::Patch, &self.patch),
            (HttpMethod::Head, &self.head),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
        .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId", default)]
    pub operation_id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
    #[serde(rename = "requestBody")]
    pub request_body: Option<RefOr<RequestBody>>,
    #[serde(default)]
    pub responses: BTreeMap<String, RefOr<Response>>,
    #[serde(default)]
    pub deprecated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Picks the JSON entry of a content map, falling back to the first media
/// type in sorted order
pub fn preferred_content(content: &BTreeMap<String, MediaType>) -> Option<(&str, &MediaType)> {
    content
        .get_key_value(JSON_MEDIA_TYPE)
        .or_else(|| content.iter().next())
        .map(|(k, v)| (k.as_str(), v))
}

impl OpenApi {
    /// Read specification from string, JSON or YAML
    pub fn from_str(data: &str) -> Result<Self, GenError> {
        Self::from_value(parse_document(data, Path::new("<memory>"))?)
    }

    /// Read specification from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GenError> {
        Self::from_value(load_document(path)?)
    }

    pub fn from_value(document: serde_json::Value) -> Result<Self, GenError> {
        serde_json::from_value(document).map_err(|e| GenError::ParseSpec {
            path: PathBuf::from("<document>"),
            reason: e.to_string(),
        })
    }
}

/// Reads the raw document; the generator annotates and diffs this form
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<serde_json::Value, GenError> {
    let path_ref = path.as_ref();
    let data = fs::read_to_string(path_ref).map_err(|source| GenError::ReadSpec {
        path: path_ref.to_path_buf(),
        source,
    })?;
    parse_document(&data, path_ref)
}

/// JSON when the text starts with `{`, YAML otherwise
pub fn parse_document(data: &str, origin: &Path) -> Result<serde_json::Value, GenError> {
    let parsed = if data.trim_start().starts_with('{') {
        serde_json::from_str(data).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(data).map_err(|e| e.to_string())
    };
    parsed.map_err(|reason| GenError::ParseSpec {
        path: origin.to_path_buf(),
        reason,
    })
}
