//! Turns spec names (snake, kebab, camel or whatever the spec author used)
//! into Rust identifiers.

use crate::error::GenError;
use convert_case::{Case, Casing};

/// Words that are always written in capitals inside type names
const ACRONYMS: &[&str] = &["id", "ip", "url", "uuid", "api", "json", "gpu"];

/// Words `singularize` leaves alone even though they end in `s`
const PROTECTED_SUFFIXES: &[&str] = &["status"];

/// Splits a raw name into lowercase words.
///
/// Anything that is not ASCII alphanumeric separates words, and so do the
/// case changes `convert_case` recognises ("UserID" -> "user", "id").
/// Capital runs are cut at table acronyms first, so "GPUID" is "gpu", "id".
pub fn words(raw: &str) -> Vec<String> {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    split_acronym_runs(&cleaned)
        .to_case(Case::Snake)
        .split('_')
        .filter(|w| !w.is_empty())
        .map(str::to_owned)
        .collect()
}

fn split_acronym_runs(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_uppercase() {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && chars[i].is_ascii_uppercase() {
            i += 1;
        }
        let run: String = chars[start..i].iter().collect();
        let before_lowercase = chars.get(i).is_some_and(char::is_ascii_lowercase);
        out.push(' ');
        out.push_str(&split_run(&run, before_lowercase));
    }
    out
}

/// Cuts leading acronyms off a capital run. An acronym that ends the run
/// right before lowercase letters keeps them ("GPUs" -> "gpus").
fn split_run(run: &str, before_lowercase: bool) -> String {
    let mut parts: Vec<String> = vec![];
    let mut rest = run;
    while let Some(acronym) = longest_acronym_prefix(rest) {
        parts.push(acronym.to_owned());
        rest = &rest[acronym.len()..];
    }
    if parts.is_empty() {
        return run.to_owned();
    }
    let mut out = parts.join(" ");
    match rest {
        "" if before_lowercase => {}
        "" => out.push(' '),
        rest => {
            out.push(' ');
            out.push_str(rest);
        }
    }
    out
}

fn longest_acronym_prefix(run: &str) -> Option<&'static str> {
    let lower = run.to_ascii_lowercase();
    ACRONYMS
        .iter()
        .filter(|acronym| lower.starts_with(*acronym))
        .max_by_key(|acronym| acronym.len())
        .copied()
}

fn capitalize(word: &str) -> String {
    if ACRONYMS.contains(&word) {
        return word.to_uppercase();
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Type name in PascalCase with acronyms in capitals:
/// `user_id` -> `UserID`, `ip_address` -> `IPAddress`, `gpu_count` -> `GPUCount`.
///
/// A leading `Gpu` is always `GPU` and a trailing `Id` always `ID`.
/// Applying it to its own output is a no-op.
pub fn normalize_type_name(raw: &str) -> String {
    let mut name: String = words(raw).iter().map(|w| capitalize(w)).collect();
    if let Some(rest) = name.strip_prefix("Gpu") {
        name = format!("GPU{rest}");
    }
    if let Some(rest) = name.strip_suffix("Id") {
        name = format!("{rest}ID");
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("V{name}");
    }
    fix_type_keyword(name)
}

/// Field, argument and method name in snake_case
pub fn normalize_field_name(raw: &str) -> Result<String, GenError> {
    let name = words(raw).join("_");
    if name.is_empty() {
        return Err(GenError::InvalidIdentifier {
            raw: raw.to_owned(),
        });
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(format!("_{name}"));
    }
    Ok(fix_rust_keyword(name))
}

/// Name of a module-level constant, `FileExportFormats` -> `FILE_EXPORT_FORMATS`
pub fn constant_name(raw: &str) -> String {
    words(raw).join("_").to_uppercase()
}

/// Strips one trailing `s` unless the word ends in a protected suffix.
///
/// This is deliberately naive: irregular plurals are not handled.
pub fn singularize(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    if PROTECTED_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix)) {
        return s.to_owned();
    }
    s.strip_suffix('s').unwrap_or(s).to_owned()
}

/// `singularize` followed by `s`, or `es` when the singular ends in `s`
pub fn pluralize(s: &str) -> String {
    let singular = singularize(s);
    if singular.ends_with('s') {
        format!("{singular}es")
    } else {
        format!("{singular}s")
    }
}

/// Name of the service a tag is bucketed into: `api-calls` -> `APICall`
pub fn tag_name(tag: &str) -> String {
    normalize_type_name(&singularize(&normalize_type_name(tag)))
}

fn fix_type_keyword(name: String) -> String {
    if matches!(name.as_str(), "Self" | "Option" | "Result" | "Box" | "Vec" | "String") {
        return name + "_";
    }
    name
}

/// If the `name` matches the Rust keyword, a lower dash will be added to the
/// end of the `name`
pub fn fix_rust_keyword(name: String) -> String {
    if matches!(
        name.as_str(),
        "as" | "break"
            | "const"
            | "continue"
            | "crate"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "self"
            | "static"
            | "struct"
            | "super"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "async"
            | "await"
            | "dyn"
            | "abstract"
            | "become"
            | "box"
            | "do"
            | "final"
            | "macro"
            | "override"
            | "priv"
            | "typeof"
            | "unsized"
            | "virtual"
            | "yield"
            | "try"
            | "gen"
    ) {
        return name + "_";
    }
    name
}
