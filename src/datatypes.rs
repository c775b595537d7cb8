/// What a schema resolves to: the Rust spelling of a type plus where it comes
/// from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Builtin(Builtin),
    Named { name: String, origin: Origin },
    Vec(Box<TypeRef>),
    /// String-keyed map
    Map(Box<TypeRef>),
}

/// How a named type came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A `components.schemas` entry, referenced by its canonical name
    Schema,
    /// Synthesized while resolving an inline schema
    Local,
    /// A schema reached again while it was still being resolved
    Forward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    String,
    Integer(IntFormat),
    Number,
    Boolean,
    DateTime,
    Date,
    Uuid,
    Url,
    Ip,
    Base64,
    Bytes,
    /// Anything JSON
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntFormat {
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntFormat {
    pub fn from_format(format: &str) -> Self {
        match format {
            "int32" => IntFormat::I32,
            "uint8" => IntFormat::U8,
            "uint16" => IntFormat::U16,
            "uint32" => IntFormat::U32,
            "uint" | "uint64" => IntFormat::U64,
            _ => IntFormat::I64,
        }
    }
}

impl Builtin {
    /// Returns the corresponding type for Rust
    pub fn rust_type(&self) -> &'static str {
        match self {
            Builtin::String => "String",
            Builtin::Integer(IntFormat::I32) => "i32",
            Builtin::Integer(IntFormat::I64) => "i64",
            Builtin::Integer(IntFormat::U8) => "u8",
            Builtin::Integer(IntFormat::U16) => "u16",
            Builtin::Integer(IntFormat::U32) => "u32",
            Builtin::Integer(IntFormat::U64) => "u64",
            Builtin::Number => "f64",
            Builtin::Boolean => "bool",
            // the expected value is in RFC 3339, "2017-07-21T17:32:28Z"
            Builtin::DateTime => "chrono::DateTime<chrono::Utc>",
            // the expected value is in RFC 3339, "2017-07-21"
            Builtin::Date => "chrono::NaiveDate",
            Builtin::Uuid => "uuid::Uuid",
            Builtin::Url => "url::Url",
            Builtin::Ip => "std::net::IpAddr",
            Builtin::Base64 => "crate::base64::Base64Data",
            Builtin::Bytes => "Vec<u8>",
            Builtin::Any => "serde_json::Value",
        }
    }

    /// Short name used when a union variant has to be named after its type
    pub fn variant_name(&self) -> &'static str {
        match self {
            Builtin::String => "String",
            Builtin::Integer(_) => "Integer",
            Builtin::Number => "Number",
            Builtin::Boolean => "Boolean",
            Builtin::DateTime | Builtin::Date => "Time",
            Builtin::Uuid => "UUID",
            Builtin::Url => "URL",
            Builtin::Ip => "IP",
            Builtin::Base64 => "Base64",
            Builtin::Bytes => "Bytes",
            Builtin::Any => "Any",
        }
    }

    /// Maps a `type: string` schema onto a builtin by its `format`
    pub fn for_string_format(format: &str) -> Self {
        match format {
            "date-time" | "partial-date-time" | "time" => Builtin::DateTime,
            "date" => Builtin::Date,
            "uuid" => Builtin::Uuid,
            "uri" | "url" => Builtin::Url,
            "ip" | "ipv4" | "ipv6" => Builtin::Ip,
            "byte" => Builtin::Base64,
            "binary" => Builtin::Bytes,
            _ => Builtin::String,
        }
    }
}

impl TypeRef {
    pub fn named(name: impl Into<String>, origin: Origin) -> Self {
        TypeRef::Named {
            name: name.into(),
            origin,
        }
    }

    /// Name of the type this one holds by value, if it is a named type
    pub fn direct_name(&self) -> Option<&str> {
        match self {
            TypeRef::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Rust spelling; named types get `prefix` (e.g. `crate::types::`)
    pub fn to_rust(&self, prefix: &str) -> String {
        match self {
            TypeRef::Builtin(builtin) => builtin.rust_type().to_owned(),
            TypeRef::Named { name, .. } => format!("{prefix}{name}"),
            TypeRef::Vec(inner) => format!("Vec<{}>", inner.to_rust(prefix)),
            TypeRef::Map(inner) => format!(
                "std::collections::BTreeMap<String, {}>",
                inner.to_rust(prefix)
            ),
        }
    }
}

/// Where a generated unit came from, so re-resolving the same schema location
/// finds the type emitted for it instead of claiming a second name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum UnitSource {
    /// JSON pointer into the spec, e.g. `#/components/schemas/User/properties/role`
    Schema(String),
    Operation { method: String, path: String },
}

impl std::fmt::Display for UnitSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitSource::Schema(pointer) => f.write_str(pointer),
            UnitSource::Operation { method, path } => write!(f, "{method} {path}"),
        }
    }
}

/// Representation of a schema as a data type - a structure, a union, or a
/// type alias. Enumerations live in the
/// [`EnumRegistry`](crate::enums::EnumRegistry) because they keep growing
/// until the end of the run.
#[derive(Debug, Clone)]
pub enum DataType {
    Struct {
        name: String,
        description: String,
        fields: Vec<StructField>,
    },
    OneOf {
        name: String,
        description: String,
        tagging: Tagging,
        variants: Vec<OneOfVariant>,
    },
    Alias {
        alias: String,
        description: String,
        target: TypeRef,
        /// Emitted as a transparent newtype so that a reference cycle through
        /// aliases still has a nominal type to stop at
        newtype: bool,
    },
}

impl DataType {
    /// The name of the type in the generated code
    pub fn type_name(&self) -> &str {
        match self {
            DataType::Struct { name, .. } => name,
            DataType::OneOf { name, .. } => name,
            DataType::Alias { alias, .. } => alias,
        }
    }

    /// Named types this one holds by value (not behind a `Vec` or a map)
    pub fn by_value_names(&self) -> Vec<&str> {
        match self {
            DataType::Struct { fields, .. } => {
                fields.iter().filter_map(|f| f.type_.direct_name()).collect()
            }
            DataType::OneOf { variants, .. } => variants
                .iter()
                .filter_map(|v| v.payload.as_ref().and_then(TypeRef::direct_name))
                .collect(),
            DataType::Alias { target, .. } => target.direct_name().into_iter().collect(),
        }
    }
}

/// Representation of schema object properties as structure fields
#[derive(Debug, Clone)]
pub struct StructField {
    /// Property name as written in the spec
    pub name: String,
    pub rust_name: String,
    pub type_: TypeRef,
    pub is_required: bool,
    pub is_nullable: bool,
    pub is_deprecated: bool,
    pub descr: String,
}

impl StructField {
    pub fn is_optional(&self) -> bool {
        !self.is_required || self.is_nullable
    }
}

/// How a union is told apart on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tagging {
    /// A property shared by every branch holds the variant name
    Internal { tag: String },
    /// Serde's default enum representation
    External,
    /// Branches are tried in order
    Untagged,
}

#[derive(Debug, Clone)]
pub struct OneOfVariant {
    pub ident: String,
    /// Wire name when it differs from `ident`
    pub rename: Option<String>,
    pub payload: Option<TypeRef>,
    pub descr: String,
}

/// A generated type together with its origin
#[derive(Debug, Clone)]
pub struct TypeUnit {
    pub source: UnitSource,
    pub datatype: DataType,
}
