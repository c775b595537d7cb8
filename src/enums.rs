use crate::datatypes::UnitSource;
use crate::naming::normalize_type_name;
use std::collections::BTreeMap;

/// Every string enum seen during one generation run.
///
/// The same enum name may show up at several places in a spec. The first
/// occurrence declares it, later ones only add values: a name, once declared,
/// is never redeclared and never loses values.
#[derive(Debug, Default)]
pub struct EnumRegistry {
    entries: BTreeMap<String, EnumEntry>,
}

#[derive(Debug, Clone)]
pub struct EnumEntry {
    pub name: String,
    pub description: String,
    /// In order of first appearance
    pub values: Vec<EnumValue>,
    pub source: UnitSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// The literal as it appears on the wire
    pub value: String,
    pub variant: String,
    pub descr: String,
}

impl EnumRegistry {
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&EnumEntry> {
        self.entries.get(name)
    }

    /// Entries sorted by name
    pub fn iter(&self) -> impl Iterator<Item = &EnumEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declares `name` or extends it with the given `(value, description)`
    /// pairs. Returns `true` when this call declared the enum.
    pub fn register<I>(&mut self, name: &str, description: &str, values: I, source: UnitSource) -> bool
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let declared = !self.entries.contains_key(name);
        let entry = self
            .entries
            .entry(name.to_owned())
            .or_insert_with(|| EnumEntry {
                name: name.to_owned(),
                description: description.to_owned(),
                values: vec![],
                source,
            });
        if entry.description.is_empty() && !description.is_empty() {
            entry.description = description.to_owned();
        }
        for (value, descr) in values {
            entry.push(value, descr);
        }
        declared
    }
}

impl EnumEntry {
    fn push(&mut self, value: String, descr: String) {
        let value = value.trim().to_owned();
        if let Some(existing) = self.values.iter_mut().find(|v| v.value == value) {
            if existing.descr.is_empty() {
                existing.descr = descr;
            }
            return;
        }
        let base = match normalize_type_name(&value) {
            n if !n.is_empty() => n,
            _ if value.is_empty() => "Empty".to_owned(),
            _ => "Value".to_owned(),
        };
        // "foo-bar" and "foo_bar" both normalize to FooBar
        let mut variant = base.clone();
        let mut n = 2;
        while self.values.iter().any(|v| v.variant == variant) {
            variant = format!("{base}{n}");
            n += 1;
        }
        self.values.push(EnumValue {
            value,
            variant,
            descr,
        });
    }

    /// Every value, sorted by literal, for the "all values" collection
    pub fn all_values(&self) -> Vec<&EnumValue> {
        let mut values: Vec<&EnumValue> = self.values.iter().collect();
        values.sort_by(|a, b| a.value.cmp(&b.value));
        values
    }
}
