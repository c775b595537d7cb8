use crate::error::GenError;
use crate::openapi::parse_document;
use serde::Deserialize;
use std::path::Path;

/// Configuration for the generator
///
/// Every key is optional. Allows you to read values from a file in JSON
/// format:
/// <pre>
/// {
///  "package_name": "kittycad",
///  "page_size": 50,
///  "skip_path_prefixes": ["/oauth2/"],
///  "struct_derives": ["Debug", "Clone", "serde::Serialize", "serde::Deserialize"]
/// }
/// </pre>
/// Or in YAML format:
/// <pre>
/// package_name: kittycad
/// page_size: 50
/// skip_path_prefixes:
///    - /oauth2/
/// </pre>
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Crate name of the generated SDK, used in examples and docs links
    pub package_name: String,
    /// Server the generated client talks to by default
    pub base_url: String,
    /// Environment variable the generated client reads its token from
    pub token_env_variable: String,
    /// Root of the published API docs of the generated crate
    pub docs_base_url: String,
    /// Extension key under which examples are attached to the spec
    pub extension_key: String,
    /// File name of the additive JSON patch
    pub patch_file: String,
    /// Page size the "all pages" wrappers request
    pub page_size: u32,
    /// Request timeout of the generated client, in seconds
    pub request_timeout_secs: u64,
    /// Paths starting with one of these are not turned into methods
    pub skip_path_prefixes: Vec<String>,
    /// Defines a list of `#[derive(...)]` when generating a structure or a
    /// union. By default, `#[derive(Debug, Clone, PartialEq, Serialize,
    /// Deserialize)]`.
    pub struct_derives: Option<Vec<String>>,
    /// Defines a list of `#[derive(...)]` when generating the enumeration. By
    /// default, `#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd,
    /// Ord, Hash, Serialize, Deserialize)]`.
    pub enum_derives: Option<Vec<String>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package_name: "kittycad".to_owned(),
            base_url: "https://api.kittycad.io".to_owned(),
            token_env_variable: "KITTYCAD_API_TOKEN".to_owned(),
            docs_base_url: "https://docs.rs/kittycad/latest/kittycad".to_owned(),
            extension_key: "x-rust".to_owned(),
            patch_file: "kittycad.rs.patch.json".to_owned(),
            page_size: 100,
            request_timeout_secs: 600,
            skip_path_prefixes: vec![],
            struct_derives: None,
            enum_derives: None,
        }
    }
}

impl GeneratorConfig {
    /// Read configuration from string
    pub fn from_str(data: &str) -> Result<Self, GenError> {
        Self::from_value(parse_document(data, Path::new("<config>"))?, Path::new("<config>"))
    }

    /// Read configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GenError> {
        let path_ref = path.as_ref();
        let data = std::fs::read_to_string(path_ref).map_err(|source| GenError::ReadSpec {
            path: path_ref.to_path_buf(),
            source,
        })?;
        Self::from_value(parse_document(&data, path_ref)?, path_ref)
    }

    fn from_value(value: serde_json::Value, origin: &Path) -> Result<Self, GenError> {
        // an empty YAML file parses as null
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| GenError::ParseSpec {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn is_path_skipped(&self, path: &str) -> bool {
        self.skip_path_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn struct_derive_line(&self) -> String {
        match &self.struct_derives {
            Some(derives) => derives.join(", "),
            None => "Debug, Clone, PartialEq, Serialize, Deserialize".to_owned(),
        }
    }

    pub fn enum_derive_line(&self) -> String {
        match &self.enum_derives {
            Some(derives) => derives.join(", "),
            None => {
                "Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize"
                    .to_owned()
            }
        }
    }
}
