//! Schema types and inference
//!
//! Provides automatic JSON-Schema-shaped descriptor inference from sampled
//! records.
//!
//! # Features
//!
//! - **Type Classification**: Maps each observed value to a primitive type tag
//! - **Type Lattice Merging**: Folds per-field observations into a minimal
//!   covering type set (integer absorbs into number)
//! - **Date-Time Detection**: Heuristic ISO-8601 recognition on strings
//! - **Nullability and Required Fields**: Derived from null observations

mod classify;
mod infer;
mod types;

pub use classify::{classify, parse_iso_datetime};
pub use infer::SchemaBuilder;
pub use types::{SchemaDescriptor, SchemaProperty, TypeList, TypeSet, TypeTag};

#[cfg(test)]
mod tests;
