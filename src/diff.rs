//! JSON patch (RFC 6902) between the original spec and its annotated copy.

use crate::context::escape_pointer;
use crate::error::GenError;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
}

impl PatchOperation {
    pub fn path(&self) -> &str {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. } => path,
        }
    }

    pub fn is_remove(&self) -> bool {
        matches!(self, PatchOperation::Remove { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PatchDocument(pub Vec<PatchOperation>);

impl PatchDocument {
    pub fn operations(&self) -> &[PatchOperation] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String, GenError> {
        serde_json::to_string_pretty(self).map_err(|source| GenError::Serialize {
            what: "patch document".to_owned(),
            source,
        })
    }
}

/// Every difference, object keys visited in sorted order
pub fn full_diff(original: &Value, mutated: &Value) -> PatchDocument {
    let mut operations = vec![];
    diff_values("", original, mutated, &mut operations);
    PatchDocument(operations)
}

/// The additive part of the diff: `remove` operations are dropped
pub fn compute_diff(original: &Value, mutated: &Value) -> PatchDocument {
    let PatchDocument(operations) = full_diff(original, mutated);
    PatchDocument(operations.into_iter().filter(|op| !op.is_remove()).collect())
}

fn diff_values(path: &str, original: &Value, mutated: &Value, operations: &mut Vec<PatchOperation>) {
    match (original, mutated) {
        (Value::Object(a), Value::Object(b)) => {
            let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
            for key in keys {
                let child = format!("{path}/{}", escape_pointer(key));
                match (a.get(key), b.get(key)) {
                    (Some(x), Some(y)) => diff_values(&child, x, y, operations),
                    (Some(_), None) => operations.push(PatchOperation::Remove { path: child }),
                    (None, Some(y)) => operations.push(PatchOperation::Add {
                        path: child,
                        value: y.clone(),
                    }),
                    (None, None) => {}
                }
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            let common = a.len().min(b.len());
            for i in 0..common {
                diff_values(&format!("{path}/{i}"), &a[i], &b[i], operations);
            }
            for (i, value) in b.iter().enumerate().skip(common) {
                operations.push(PatchOperation::Add {
                    path: format!("{path}/{i}"),
                    value: value.clone(),
                });
            }
            // highest index first so the indices stay valid while applying
            for i in (common..a.len()).rev() {
                operations.push(PatchOperation::Remove {
                    path: format!("{path}/{i}"),
                });
            }
        }
        (a, b) if a == b => {}
        (_, b) => operations.push(PatchOperation::Replace {
            path: path.to_owned(),
            value: b.clone(),
        }),
    }
}
