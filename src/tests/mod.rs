mod config_test;
mod cycle_test;
mod naming_test;
mod operations_test;
mod pagination_test;
mod pipeline_test;
mod typealias_test;

use crate::datatypes::{DataType, StructField, TypeUnit};
use std::collections::BTreeMap;

/// Fields of the struct `name`, panics when there is none
pub(crate) fn struct_fields<'a>(types: &'a BTreeMap<String, TypeUnit>, name: &str) -> &'a [StructField] {
    match types.get(name).map(|unit| &unit.datatype) {
        Some(DataType::Struct { fields, .. }) => fields,
        other => panic!("{name} is not a struct: {other:?}"),
    }
}

/// The field with the spec name `name`
pub(crate) fn field<'a>(fields: &'a [StructField], name: &str) -> &'a StructField {
    fields
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("no field {name}"))
}
