//! A schema-driven resolution engine over an in-memory people and hobbies dataset.
//!
//! - [`RecordStore`] owns every record.
//! - [`SchemaRegistry`] declares entities, fields and operations, built once at startup.
//! - [`ResolutionEngine`] validates arguments, dispatches operations and resolves
//!   relationship fields on demand.
//! - [`graphql::build_schema`] turns the registry into an executable GraphQL schema.

mod dataset;
mod engine;
mod error;
pub mod graphql;
mod people;
mod record;
pub mod registry;
mod selection;
mod store;

pub use self::{
    dataset::Dataset,
    engine::{FieldValue, ResolutionEngine, Resolved, ScalarValue},
    error::{Error, RegistryError, Result, ValidationError},
    people::registry as people_registry,
    record::{AttributeType, AttributeValue, EntityKind, Hobby, Person, Record, RecordId},
    registry::{SchemaRegistry, SchemaRegistryBuilder},
    selection::{SelectedField, Selection},
    store::{RecordStore, StoreError, StoreWriter, MAX_RECORD_ID},
};

use std::sync::Arc;

/// Wires a store seeded with `dataset` to the people and hobbies registry.
pub fn build_engine(dataset: Dataset) -> std::result::Result<ResolutionEngine, StartupError> {
    let registry = people_registry()?;
    let store = RecordStore::seeded(dataset)?;

    Ok(ResolutionEngine::new(Arc::new(registry), Arc::new(store)))
}

/// Failures while assembling the engine at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid schema declarations: {0}")]
    Registry(#[from] RegistryError),
    #[error("invalid dataset: {0}")]
    Dataset(#[from] StoreError),
}
