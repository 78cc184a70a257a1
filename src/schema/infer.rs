//! Schema inference from sampled records

use super::classify::classify;
use super::types::{SchemaDescriptor, SchemaProperty, TypeSet, TypeTag};
use crate::types::{Record, EXTRACTED_AT_FIELD};
use std::collections::BTreeMap;

/// Accumulates per-field type observations across sampled records and
/// synthesizes a schema descriptor.
///
/// Every record is treated as a structurally independent observation; the
/// builder never fails on malformed or absent samples. Zero samples yield a
/// minimal schema containing only synthesized key/replication fields.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    /// Per-field merged type sets
    fields: BTreeMap<String, TypeSet>,
    /// Number of records observed
    samples: usize,
}

impl SchemaBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record's fields into the per-field type sets
    pub fn observe(&mut self, record: &Record) {
        self.samples += 1;
        for (field, value) in record {
            self.fields
                .entry(field.clone())
                .or_default()
                .merge(classify(value));
        }
    }

    /// Number of records observed so far
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Synthesize the schema descriptor.
    ///
    /// The replication key and every declared primary key are guaranteed a
    /// property even when absent from the sample. The synthetic extraction
    /// timestamp is never listed as required, even though the engine always
    /// populates it.
    pub fn build(&self, replication_key: Option<&str>, primary_keys: &[String]) -> SchemaDescriptor {
        let mut descriptor = SchemaDescriptor::new();

        for (field, set) in &self.fields {
            descriptor
                .properties
                .insert(field.clone(), property_for(set));
        }

        if let Some(key) = replication_key {
            if !descriptor.properties.contains_key(key) {
                let property = if key == EXTRACTED_AT_FIELD {
                    SchemaProperty::nullable(TypeTag::String).with_format("date-time")
                } else {
                    SchemaProperty::nullable(TypeTag::String)
                };
                descriptor.properties.insert(key.to_string(), property);
            }
        }

        for key in primary_keys {
            descriptor
                .properties
                .entry(key.clone())
                .or_insert_with(|| SchemaProperty::nullable(TypeTag::String));
        }

        descriptor.required = descriptor
            .properties
            .iter()
            .filter(|(field, property)| {
                field.as_str() != EXTRACTED_AT_FIELD && !property.is_nullable()
            })
            .map(|(field, _)| field.clone())
            .collect();

        descriptor
    }
}

/// Emit one field's property from its merged type set.
fn property_for(set: &TypeSet) -> SchemaProperty {
    // date-time refines string and wins over every co-observed type
    if set.contains(TypeTag::DateTime) {
        let property = if set.contains(TypeTag::Null) {
            SchemaProperty::nullable(TypeTag::String)
        } else {
            SchemaProperty::new(TypeTag::String)
        };
        return property.with_format("date-time");
    }

    // Never observed: same rule as observed-only-as-null
    if set.is_empty() {
        return SchemaProperty::nullable(TypeTag::String);
    }

    let tags: Vec<TypeTag> = set.iter().collect();

    if set.contains(TypeTag::Null) {
        let non_null: Vec<TypeTag> = tags
            .iter()
            .copied()
            .filter(|t| *t != TypeTag::Null)
            .collect();
        return match non_null.len() {
            0 => SchemaProperty::nullable(TypeTag::String),
            1 => SchemaProperty::nullable(non_null[0]),
            _ => SchemaProperty::from_tags(tags),
        };
    }

    if tags.len() == 1 {
        SchemaProperty::new(tags[0])
    } else {
        SchemaProperty::from_tags(tags)
    }
}
