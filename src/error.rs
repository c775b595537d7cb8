//! Error types for the SDK generator.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a generation run.
///
/// The first group describes input the generator cannot map onto Rust
/// (malformed or unsupported spec shapes). The second group covers reading the
/// spec and writing the artifacts. Nothing here is recoverable inside a run:
/// fix the input and run again.
#[derive(Debug, Error)]
pub enum GenError {
    /// A `$ref` points at a schema that is not in `components`
    #[error("reference {reference:?} not found in components")]
    UnresolvedReference { reference: String },

    /// `allOf` with more than one member
    #[error("allOf for {location:?} has {count} members, only a single member is supported")]
    UnsupportedComposition { location: String, count: usize },

    #[error("enum value for {location:?} is not a string: {value}")]
    NonStringEnumValue {
        location: String,
        value: serde_json::Value,
    },

    #[error("operation {method} {path:?} has no tags")]
    MissingTag { method: String, path: String },

    #[error("unsupported schema at {location:?}: {reason}")]
    UnsupportedSchema { location: String, reason: String },

    #[error("path {path:?} uses parameter {name:?} which the operation does not declare")]
    UndeclaredPathParameter { path: String, name: String },

    #[error("{raw:?} cannot be turned into a Rust identifier")]
    InvalidIdentifier { raw: String },

    #[error("failed to read '{}': {source}", path.display())]
    ReadSpec {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {reason}", path.display())]
    ParseSpec { path: PathBuf, reason: String },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A template placeholder was left unfilled
    #[error("failed to render {template}: {reason}")]
    Render { template: String, reason: String },

    /// The generated source does not parse, which is always a generator bug
    #[error("generated {file} is not valid Rust: {source}")]
    Format {
        file: String,
        #[source]
        source: syn::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<GenError>,
    },
}

impl GenError {
    /// Strips every [`GenError::Context`] layer
    pub fn root_cause(&self) -> &GenError {
        let mut current = self;
        while let GenError::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// Whether the root cause is a problem with the input document rather
    /// than with the filesystem or the generator itself
    pub fn is_spec_structure(&self) -> bool {
        matches!(
            self.root_cause(),
            GenError::UnresolvedReference { .. }
                | GenError::UnsupportedComposition { .. }
                | GenError::NonStringEnumValue { .. }
                | GenError::MissingTag { .. }
                | GenError::UnsupportedSchema { .. }
                | GenError::UndeclaredPathParameter { .. }
                | GenError::InvalidIdentifier { .. }
        )
    }
}

/// Adds "where did this happen" to an error on its way up.
pub trait ResultExt<T> {
    fn context<C: Into<String>>(self, context: impl FnOnce() -> C) -> Result<T, GenError>;
}

impl<T> ResultExt<T> for Result<T, GenError> {
    fn context<C: Into<String>>(self, context: impl FnOnce() -> C) -> Result<T, GenError> {
        self.map_err(|source| GenError::Context {
            context: context().into(),
            source: Box::new(source),
        })
    }
}
