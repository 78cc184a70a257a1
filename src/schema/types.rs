//! Schema types

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Primitive type tag assigned to an observed value.
///
/// Variants are declared in lexicographic order of their serialized names so
/// that sorted-set iteration matches the emitted sorted type lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Array,
    Boolean,
    #[serde(rename = "date-time")]
    DateTime,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeTag::Array => write!(f, "array"),
            TypeTag::Boolean => write!(f, "boolean"),
            TypeTag::DateTime => write!(f, "date-time"),
            TypeTag::Integer => write!(f, "integer"),
            TypeTag::Null => write!(f, "null"),
            TypeTag::Number => write!(f, "number"),
            TypeTag::Object => write!(f, "object"),
            TypeTag::String => write!(f, "string"),
        }
    }
}

/// Minimal covering set of type tags observed for one field.
///
/// Merging is idempotent and commutative except for the integer/number
/// absorption rule: once any sample shows a fractional value the whole field
/// is treated as floating-point, so `integer` and `number` never coexist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSet(BTreeSet<TypeTag>);

impl TypeSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observation into the set
    pub fn merge(&mut self, tag: TypeTag) {
        match tag {
            TypeTag::Number => {
                self.0.remove(&TypeTag::Integer);
                self.0.insert(TypeTag::Number);
            }
            TypeTag::Integer => {
                if !self.0.contains(&TypeTag::Number) {
                    self.0.insert(TypeTag::Integer);
                }
            }
            other => {
                self.0.insert(other);
            }
        }
    }

    /// Whether the set contains a tag
    pub fn contains(&self, tag: TypeTag) -> bool {
        self.0.contains(&tag)
    }

    /// Whether no observations have been folded in
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct tags
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Tags in lexicographic order
    pub fn iter(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<TypeTag> for TypeSet {
    fn from_iter<I: IntoIterator<Item = TypeTag>>(iter: I) -> Self {
        let mut set = TypeSet::new();
        for tag in iter {
            set.merge(tag);
        }
        set
    }
}

/// A property's type: a single tag or a list of tags (nullable unions)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeList {
    Single(TypeTag),
    Multiple(Vec<TypeTag>),
}

impl TypeList {
    /// A single scalar type
    pub fn single(tag: TypeTag) -> Self {
        TypeList::Single(tag)
    }

    /// A `[tag, "null"]` union
    pub fn nullable(tag: TypeTag) -> Self {
        if tag == TypeTag::Null {
            TypeList::Single(TypeTag::Null)
        } else {
            TypeList::Multiple(vec![tag, TypeTag::Null])
        }
    }

    /// Whether null is admitted
    pub fn is_nullable(&self) -> bool {
        match self {
            TypeList::Single(tag) => *tag == TypeTag::Null,
            TypeList::Multiple(tags) => tags.contains(&TypeTag::Null),
        }
    }

    /// The first non-null tag
    pub fn primary_type(&self) -> Option<TypeTag> {
        match self {
            TypeList::Single(tag) => Some(*tag),
            TypeList::Multiple(tags) => tags.iter().find(|t| **t != TypeTag::Null).copied(),
        }
    }
}

/// One property in a schema descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaProperty {
    /// Property type(s)
    #[serde(rename = "type")]
    pub type_list: TypeList,

    /// Format hint (e.g., "date-time")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl SchemaProperty {
    /// Create a property with a single scalar type
    pub fn new(tag: TypeTag) -> Self {
        Self {
            type_list: TypeList::single(tag),
            format: None,
        }
    }

    /// Create a nullable property
    pub fn nullable(tag: TypeTag) -> Self {
        Self {
            type_list: TypeList::nullable(tag),
            format: None,
        }
    }

    /// Create a property from a sorted list of tags
    pub fn from_tags(tags: Vec<TypeTag>) -> Self {
        Self {
            type_list: TypeList::Multiple(tags),
            format: None,
        }
    }

    /// Set the format hint
    #[must_use]
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Whether null is admitted
    pub fn is_nullable(&self) -> bool {
        self.type_list.is_nullable()
    }
}

/// Object-typed schema descriptor for one stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Schema type (always "object")
    #[serde(rename = "type")]
    pub json_type: TypeTag,

    /// Additional properties allowed
    #[serde(rename = "additionalProperties", default = "default_true")]
    pub additional_properties: bool,

    /// Field properties
    #[serde(default)]
    pub properties: BTreeMap<String, SchemaProperty>,

    /// Fields guaranteed present and non-null
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for SchemaDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaDescriptor {
    /// Create an empty object schema
    pub fn new() -> Self {
        Self {
            json_type: TypeTag::Object,
            additional_properties: true,
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    /// Get a property
    pub fn get_property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.get(name)
    }

    /// Check if a property is required
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|n| n == name)
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
