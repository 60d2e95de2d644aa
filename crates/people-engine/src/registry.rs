//! Declarations of entities, their fields and the operations served over them.
//!
//! Declarations are collected by a [`SchemaRegistryBuilder`] once at startup, checked, and
//! frozen into a [`SchemaRegistry`]. Nothing mutates the registry afterwards.

mod arguments;

use std::{collections::HashSet, fmt, sync::Arc};

use indexmap::IndexMap;

pub use self::arguments::{ArgumentShape, ArgumentSpec, ArgumentType, ArgumentValue, Arguments, WireGroup};
use crate::{
    engine::Resolved,
    error::{RegistryError, Result},
    record::{AttributeType, EntityKind, Record, RecordId},
    store::RecordStore,
};

/// Types a scalar field exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Id,
    Int,
    String,
}

impl ScalarType {
    /// Whether values stored as `stored` can be projected as this type.
    pub fn accepts(self, stored: AttributeType) -> bool {
        matches!(
            (self, stored),
            (ScalarType::Id | ScalarType::Int, AttributeType::Id) | (ScalarType::String, AttributeType::String)
        )
    }

    pub fn graphql_name(self) -> &'static str {
        match self {
            ScalarType::Id => "ID",
            ScalarType::Int => "Int",
            ScalarType::String => "String",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.graphql_name())
    }
}

/// Maps an owning record to the ids of its related records.
pub type RelationshipResolver = Arc<dyn Fn(&Record) -> Vec<RecordId> + Send + Sync>;

/// Runs an operation once its arguments are validated.
pub type OperationHandler = Arc<dyn Fn(&RecordStore, &Arguments) -> Result<Resolved> + Send + Sync>;

#[derive(Clone)]
pub enum FieldKind {
    /// Projects a stored attribute as is.
    Scalar { attribute: String, ty: ScalarType },
    /// Derived at query time by looking up the ids `resolve` returns in the `target` collection.
    Relationship {
        target: EntityKind,
        resolve: RelationshipResolver,
    },
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar { attribute, ty } => f
                .debug_struct("Scalar")
                .field("attribute", attribute)
                .field("ty", ty)
                .finish(),
            FieldKind::Relationship { target, .. } => {
                f.debug_struct("Relationship").field("target", target).finish_non_exhaustive()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub description: Option<String>,
}

impl FieldDescriptor {
    pub fn scalar(name: impl Into<String>, attribute: impl Into<String>, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Scalar {
                attribute: attribute.into(),
                ty,
            },
            description: None,
        }
    }

    pub fn relationship(
        name: impl Into<String>,
        target: EntityKind,
        resolve: impl Fn(&Record) -> Vec<RecordId> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Relationship {
                target,
                resolve: Arc::new(resolve),
            },
            description: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    pub kind: EntityKind,
    pub fields: IndexMap<String, FieldDescriptor>,
}

impl EntityDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// A record, or not-found.
    Optional,
    One,
    Many,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputShape {
    pub entity: EntityKind,
    pub cardinality: Cardinality,
}

impl OutputShape {
    pub fn optional(entity: EntityKind) -> Self {
        Self {
            entity,
            cardinality: Cardinality::Optional,
        }
    }

    pub fn one(entity: EntityKind) -> Self {
        Self {
            entity,
            cardinality: Cardinality::One,
        }
    }

    pub fn many(entity: EntityKind) -> Self {
        Self {
            entity,
            cardinality: Cardinality::Many,
        }
    }
}

#[derive(Clone)]
pub struct OperationDescriptor {
    pub name: String,
    pub kind: OperationKind,
    pub arguments: ArgumentShape,
    pub output: OutputShape,
    pub handler: OperationHandler,
}

impl OperationDescriptor {
    pub fn query(
        name: impl Into<String>,
        arguments: ArgumentShape,
        output: OutputShape,
        handler: impl Fn(&RecordStore, &Arguments) -> Result<Resolved> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind: OperationKind::Query,
            arguments,
            output,
            handler: Arc::new(handler),
        }
    }

    pub fn mutation(
        name: impl Into<String>,
        arguments: ArgumentShape,
        output: OutputShape,
        handler: impl Fn(&RecordStore, &Arguments) -> Result<Resolved> + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind: OperationKind::Mutation,
            ..Self::query(name, arguments, output, handler)
        }
    }
}

impl fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("arguments", &self.arguments)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

/// The frozen set of declarations the engine dispatches against.
#[derive(Debug)]
pub struct SchemaRegistry {
    entities: IndexMap<EntityKind, EntityDescriptor>,
    operations: IndexMap<String, OperationDescriptor>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    pub fn entity(&self, kind: EntityKind) -> Option<&EntityDescriptor> {
        self.entities.get(&kind)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.entities.values()
    }

    pub fn operation(&self, name: &str) -> Option<&OperationDescriptor> {
        self.operations.get(name)
    }

    pub fn operations(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.operations.values()
    }
}

#[derive(Default)]
pub struct SchemaRegistryBuilder {
    entities: Vec<(EntityKind, Vec<FieldDescriptor>)>,
    operations: Vec<OperationDescriptor>,
}

impl SchemaRegistryBuilder {
    pub fn register_entity(mut self, kind: EntityKind, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.entities.push((kind, fields.into_iter().collect()));
        self
    }

    pub fn register_operation(mut self, operation: OperationDescriptor) -> Self {
        self.operations.push(operation);
        self
    }

    /// Checks every declaration and freezes them. Stops at the first error.
    pub fn build(self) -> Result<SchemaRegistry, RegistryError> {
        let mut entities = IndexMap::with_capacity(self.entities.len());

        for (kind, fields) in self.entities {
            if entities.contains_key(&kind) {
                return Err(RegistryError::DuplicateEntity(kind));
            }

            let mut by_name = IndexMap::with_capacity(fields.len());

            for field in fields {
                check_field(kind, &field)?;

                if by_name.contains_key(&field.name) {
                    return Err(RegistryError::DuplicateField {
                        entity: kind,
                        field: field.name,
                    });
                }

                by_name.insert(field.name.clone(), field);
            }

            entities.insert(kind, EntityDescriptor { kind, fields: by_name });
        }

        for entity in entities.values() {
            for field in entity.fields.values() {
                if let FieldKind::Relationship { target, .. } = &field.kind {
                    if !entities.contains_key(target) {
                        return Err(RegistryError::UnregisteredEntity {
                            referenced_by: format!("{}.{}", entity.kind, field.name),
                            entity: *target,
                        });
                    }
                }
            }
        }

        let mut operations = IndexMap::with_capacity(self.operations.len());

        for operation in self.operations {
            if operations.contains_key(&operation.name) {
                return Err(RegistryError::DuplicateOperation(operation.name));
            }

            if !entities.contains_key(&operation.output.entity) {
                return Err(RegistryError::UnregisteredEntity {
                    referenced_by: operation.name,
                    entity: operation.output.entity,
                });
            }

            let duplicate = {
                let mut seen = HashSet::new();
                operation
                    .arguments
                    .arguments()
                    .iter()
                    .find(|spec| !seen.insert(spec.name.as_str()))
                    .map(|spec| spec.name.clone())
            };

            if let Some(argument) = duplicate {
                return Err(RegistryError::DuplicateArgument {
                    operation: operation.name,
                    argument,
                });
            }

            operations.insert(operation.name.clone(), operation);
        }

        tracing::debug!(
            entities = entities.len(),
            operations = operations.len(),
            "schema registry built"
        );

        Ok(SchemaRegistry { entities, operations })
    }
}

fn check_field(entity: EntityKind, field: &FieldDescriptor) -> Result<(), RegistryError> {
    let FieldKind::Scalar { attribute, ty } = &field.kind else {
        return Ok(());
    };

    let Some(stored) = entity.attribute_type(attribute) else {
        return Err(RegistryError::UnknownAttribute {
            entity,
            field: field.name.clone(),
            attribute: attribute.clone(),
        });
    };

    if !ty.accepts(stored) {
        return Err(RegistryError::AttributeTypeMismatch {
            entity,
            field: field.name.clone(),
            attribute: attribute.clone(),
            declared: *ty,
            stored,
        });
    }

    Ok(())
}
