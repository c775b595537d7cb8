//! Renders the sources of the generated SDK.
//!
//! Everything is written into a `String` first and then parsed with `syn`
//! and printed with `prettyplease`, so only doc comments survive into the
//! output.

mod client;
mod paths;
mod types;

pub use client::render_client;
pub use paths::render_paths;
pub use types::render_types;

use crate::error::GenError;
use std::fmt::{self, Write};

/// Runtime helper the "all pages" wrappers call, shipped as is
pub const PAGINATION_SOURCE: &str = include_str!("../pagination.rs");

/// Writes a description of the generated module (file)
pub fn write_comment_header(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out, "//! # {title}")?;
    writeln!(out, "//! GENERATED AUTOMATICALLY, ALL THE CHANGES")?;
    writeln!(out, "//! YOU MAKE WILL BE REWRITTEN DURING")?;
    writeln!(out, "//! THE NEXT BUILD")?;
    writeln!(out, "//!")?;
    Ok(())
}

/// Writes `text` as `///` lines
pub(crate) fn write_doc(out: &mut String, indent: &str, text: &str) -> fmt::Result {
    for line in text.trim().lines() {
        let line = line.trim_end().replace('\r', "");
        if line.is_empty() {
            writeln!(out, "{indent}///")?;
        } else {
            writeln!(out, "{indent}/// {line}")?;
        }
    }
    Ok(())
}

/// Parses and pretty-prints one generated file
pub fn format_source(file: &str, source: &str) -> Result<String, GenError> {
    let parsed = syn::parse_file(source).map_err(|source| GenError::Format {
        file: file.to_owned(),
        source,
    })?;
    Ok(prettyplease::unparse(&parsed))
}

pub(crate) fn render_failed(file: &str) -> impl FnOnce(fmt::Error) -> GenError + '_ {
    move |_| GenError::Render {
        template: file.to_owned(),
        reason: "writing into the buffer failed".to_owned(),
    }
}

/// Replaces every `{{NAME}}` of `template` with its value. Values are
/// inserted as is and never scanned for placeholders themselves.
pub(crate) fn fill_template(name: &str, template: &str, values: &[(&str, String)]) -> Result<String, GenError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find("}}").ok_or_else(|| GenError::Render {
            template: name.to_owned(),
            reason: "unterminated placeholder".to_owned(),
        })?;
        let key = &after[..end];
        let (_, value) = values
            .iter()
            .find(|(k, _)| *k == key)
            .ok_or_else(|| GenError::Render {
                template: name.to_owned(),
                reason: format!("no value for placeholder {key:?}"),
            })?;
        out.push_str(value);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// `pagination.rs` of the generated SDK
pub fn render_pagination() -> Result<String, GenError> {
    let mut out = String::new();
    write_comment_header(&mut out, "Pagination").map_err(render_failed("pagination.rs"))?;
    out.push_str(PAGINATION_SOURCE);
    format_source("pagination.rs", &out)
}
