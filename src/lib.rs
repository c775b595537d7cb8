#![doc = include_str!("../README.md")]

pub mod annotations;
pub mod config;
pub mod context;
pub mod datatypes;
pub mod diff;
pub mod enums;
pub mod error;
pub mod method_names;
pub mod naming;
pub mod openapi;
pub mod operations;
pub mod pagination;
mod processing;
pub mod resolve;
pub mod writing;

#[cfg(test)]
mod tests;

// exported
pub use annotations::Annotations;
pub use config::GeneratorConfig;
pub use context::GenerationContext;
pub use diff::{PatchDocument, compute_diff};
pub use error::GenError;
pub use openapi::OpenApi;

use error::ResultExt;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const CLIENT_FILE: &str = "client.rs";
pub const TYPES_FILE: &str = "types.rs";
pub const PATHS_FILE: &str = "paths.rs";
pub const PAGINATION_FILE: &str = "pagination.rs";

/// Everything one run produces before it touches the filesystem
#[derive(Debug)]
pub struct GeneratedSdk {
    /// File name -> formatted source
    pub files: BTreeMap<String, String>,
    pub annotations: Annotations,
}

/// Generates the SDK sources for a parsed specification.
///
/// # Example
/// ```no_run
/// use sdkgen::{GeneratorConfig, OpenApi, generate_sdk_sources};
///
/// let spec = OpenApi::from_file("spec.json")?;
/// let sdk = generate_sdk_sources(&spec, &GeneratorConfig::default())?;
/// println!("{}", sdk.files["types.rs"]);
/// # Ok::<(), sdkgen::GenError>(())
/// ```
pub fn generate_sdk_sources(spec: &OpenApi, config: &GeneratorConfig) -> Result<GeneratedSdk, GenError> {
    let mut ctx = GenerationContext::new(spec, config);

    tracing::info!(
        "generating types for {} schemas and {} responses",
        spec.components.schemas.len(),
        spec.components.responses.len()
    );
    ctx.process_components().context(|| "generating types")?;

    tracing::info!("generating methods for {} paths", spec.paths.len());
    ctx.process_paths().context(|| "generating methods")?;
    tracing::info!(
        "{} types, {} enums, {} services",
        ctx.types.len(),
        ctx.enums.len(),
        ctx.services.len()
    );

    let mut files = BTreeMap::new();
    files.insert(CLIENT_FILE.to_owned(), writing::render_client(&ctx)?);
    files.insert(TYPES_FILE.to_owned(), writing::render_types(&ctx)?);
    files.insert(PATHS_FILE.to_owned(), writing::render_paths(&ctx)?);
    files.insert(PAGINATION_FILE.to_owned(), writing::render_pagination()?);

    Ok(GeneratedSdk {
        files,
        annotations: ctx.annotations(),
    })
}

/// Runs the whole pipeline: reads the spec, writes the SDK sources into
/// `out_dir`, annotates a copy of the spec with examples and writes the
/// additive patch between the two. Returns the patch.
///
/// A failure leaves the files of the phases that completed before it.
pub fn generate_sdk<P, Q>(spec_path: P, out_dir: Q, config: &GeneratorConfig) -> Result<PatchDocument, GenError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let spec_path = spec_path.as_ref();
    let out_dir = out_dir.as_ref();

    tracing::info!("reading {}", spec_path.display());
    let mut document = openapi::load_document(spec_path)?;
    let spec = OpenApi::from_value(document.clone()).context(|| format!("loading {}", spec_path.display()))?;
    let sdk = generate_sdk_sources(&spec, config)?;

    fs::create_dir_all(out_dir).map_err(|source| GenError::Write {
        path: out_dir.to_path_buf(),
        source,
    })?;
    for (name, source) in &sdk.files {
        write_file(&out_dir.join(name), source)?;
    }

    tracing::info!("annotating {} operations", sdk.annotations.operations.len());
    annotations::annotate(&mut document, &sdk.annotations, config);
    // diff against the file as it is on disk, not the copy we parsed
    let original = openapi::load_document(spec_path)?;
    let patch = compute_diff(&original, &document);
    write_file(&out_dir.join(&config.patch_file), &patch.to_json_pretty()?)?;
    Ok(patch)
}

fn write_file(path: &Path, contents: &str) -> Result<(), GenError> {
    fs::write(path, contents).map_err(|source| GenError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("wrote {}", path.display());
    Ok(())
}
