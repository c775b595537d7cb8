//! Method names from operation ids.
//!
//! Names are worked on as lists of lowercase words. Each rule is a predicate
//! plus a rewrite; they run in table order, each on the output of the
//! previous one.

use crate::naming::{singularize, words};
use crate::openapi::HttpMethod;

/// Everything a rule may look at besides the words themselves
#[derive(Debug, Clone)]
pub struct NameContext {
    /// Singular words of the operation's tag, `api-calls` -> `["api", "call"]`
    pub tag_words: Vec<String>,
    pub method: HttpMethod,
    pub path: String,
}

impl NameContext {
    pub fn new(tag: &str, method: HttpMethod, path: &str) -> Self {
        let mut tag_words = words(tag);
        if let Some(last) = tag_words.last_mut() {
            *last = singularize(last);
        }
        Self {
            tag_words,
            method,
            path: path.to_owned(),
        }
    }

    /// A path that does not end in a `{param}` segment
    pub fn is_collection(&self) -> bool {
        !self.path.trim_end_matches('/').ends_with('}')
    }
}

pub struct RenameRule {
    pub name: &'static str,
    pub applies: fn(&[String], &NameContext) -> bool,
    pub rewrite: fn(Vec<String>, &NameContext) -> Vec<String>,
}

pub static RULES: [RenameRule; 3] = [
    RenameRule {
        name: "strip-tag",
        applies: |words, ctx| tag_run(words, ctx).is_some_and(|(_, len)| len < words.len()),
        rewrite: strip_tag,
    },
    RenameRule {
        name: "get-collection-to-list",
        applies: |words, ctx| ctx.method == HttpMethod::Get && ctx.is_collection() && has_verb(words, "get"),
        rewrite: |words, _| replace_verb(words, "get", "list"),
    },
    RenameRule {
        name: "post-to-create",
        applies: |words, ctx| ctx.method == HttpMethod::Post && has_verb(words, "post"),
        rewrite: |words, _| replace_verb(words, "post", "create"),
    },
];

/// Applies every rule to the words of `raw`
pub fn apply_rules(raw: &str, ctx: &NameContext) -> Vec<String> {
    let mut current = words(raw);
    for rule in &RULES {
        if (rule.applies)(&current, ctx) {
            let rewritten = (rule.rewrite)(current.clone(), ctx);
            tracing::trace!("{}: {current:?} -> {rewritten:?}", rule.name);
            current = rewritten;
        }
    }
    current
}

/// Stand-in operation id for operations that have none:
/// `get /users/{id}/sessions` -> `get_users_id_sessions`
pub fn fallback_operation_id(method: HttpMethod, path: &str) -> String {
    let mut parts = vec![method.key().to_owned()];
    parts.extend(words(path));
    parts.join("_")
}

/// Start and length of the first occurrence of the tag's words, the last one
/// singular or plural
fn tag_run(words: &[String], ctx: &NameContext) -> Option<(usize, usize)> {
    let tag = &ctx.tag_words;
    let (last, head) = tag.split_last()?;
    let n = tag.len();
    if words.len() < n {
        return None;
    }
    (0..=words.len() - n)
        .find(|&start| {
            let candidate = &words[start..start + n];
            candidate[..n - 1] == *head && singularize(&candidate[n - 1]) == *last
        })
        .map(|start| (start, n))
}

fn strip_tag(mut words: Vec<String>, ctx: &NameContext) -> Vec<String> {
    if let Some((start, len)) = tag_run(&words, ctx) {
        words.drain(start..start + len);
    }
    words
}

fn has_verb(words: &[String], verb: &str) -> bool {
    words.first().is_some_and(|w| w == verb) || words.last().is_some_and(|w| w == verb)
}

/// Moves the verb to the front under its new name
fn replace_verb(mut words: Vec<String>, from: &str, to: &str) -> Vec<String> {
    if words.last().is_some_and(|w| w == from) {
        words.pop();
    } else if words.first().is_some_and(|w| w == from) {
        words.remove(0);
    }
    words.insert(0, to.to_owned());
    words
}
