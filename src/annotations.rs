//! Usage examples written back into the spec document.

use crate::config::GeneratorConfig;
use crate::context::GenerationContext;
use serde::Serialize;
use serde_json::Value;

/// What gets attached to one operation under the extension key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationExtension {
    pub example: String,
    #[serde(rename = "libDocsLink")]
    pub lib_docs_link: String,
}

/// What gets attached to `info`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoExtension {
    pub install: String,
    pub client: String,
}

#[derive(Debug, Clone, Default)]
pub struct Annotations {
    /// `(path, method key, extension)`, in path order
    pub operations: Vec<(String, String, OperationExtension)>,
    pub info: Option<InfoExtension>,
}

impl GenerationContext<'_> {
    /// Examples and docs links of every synthesized operation
    pub fn annotations(&self) -> Annotations {
        let mut operations = vec![];
        for service in self.services.values() {
            // the "all pages" wrappers share the annotation of their base
            for method in service.methods.values().filter(|m| m.pagination.is_none()) {
                operations.push((
                    method.path.clone(),
                    method.http_method.key().to_owned(),
                    OperationExtension {
                        example: method.example.clone(),
                        lib_docs_link: self.docs_link(service, &method.name),
                    },
                ));
            }
        }
        operations.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));

        let package = &self.config.package_name;
        Annotations {
            operations,
            info: Some(InfoExtension {
                install: format!("cargo add {package}"),
                client: format!(
                    "// Reads the API token from the {} environment variable.\nlet client = {package}::Client::new_from_env()?;",
                    self.config.token_env_variable
                ),
            }),
        }
    }
}

/// Adds the annotations to the raw spec document. Operations the document
/// does not have are skipped.
pub fn annotate(document: &mut Value, annotations: &Annotations, config: &GeneratorConfig) {
    let key = config.extension_key.as_str();
    for (path, method, extension) in &annotations.operations {
        let Some(operation) = document
            .get_mut("paths")
            .and_then(|paths| paths.get_mut(path))
            .and_then(|item| item.get_mut(method))
            .and_then(Value::as_object_mut)
        else {
            tracing::debug!("no {method} {path:?} in the document, not annotating it");
            continue;
        };
        // serializing a struct of strings cannot fail
        if let Ok(value) = serde_json::to_value(extension) {
            operation.insert(key.to_owned(), value);
        }
    }

    if let Some(info) = &annotations.info
        && let Some(object) = document.as_object_mut()
    {
        let entry = object
            .entry("info")
            .or_insert_with(|| Value::Object(Default::default()));
        if let (Some(entry), Ok(value)) = (entry.as_object_mut(), serde_json::to_value(info)) {
            entry.insert(key.to_owned(), value);
        }
    }
}
