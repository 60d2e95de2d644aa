use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{
    error::{Error, Result},
    record::{AttributeValue, EntityKind, Record, RecordId},
    registry::{Cardinality, EntityDescriptor, FieldKind, OutputShape, ScalarType, SchemaRegistry},
    selection::Selection,
    store::RecordStore,
};

/// What an operation handler produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A lookup miss. A legitimate result, not an error.
    NotFound,
    One(Record),
    Many(Vec<Record>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarValue {
    Id(RecordId),
    Int(i64),
    String(String),
}

impl ScalarValue {
    pub fn to_json(&self) -> Value {
        match self {
            ScalarValue::Id(id) => Value::from(*id),
            ScalarValue::Int(n) => Value::from(*n),
            ScalarValue::String(s) => Value::from(s.as_str()),
        }
    }
}

/// The value of one field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(ScalarValue),
    /// One slot per related id, `None` where no record has that id.
    Related(Vec<Option<Record>>),
}

/// Dispatches operations declared in a [`SchemaRegistry`] against a [`RecordStore`].
///
/// Cheap to clone; clones share the same registry and store.
#[derive(Clone)]
pub struct ResolutionEngine {
    registry: Arc<SchemaRegistry>,
    store: Arc<RecordStore>,
}

impl ResolutionEngine {
    pub fn new(registry: Arc<SchemaRegistry>, store: Arc<RecordStore>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Runs the named operation. Arguments are validated against the declared shape before the
    /// handler runs, and the handler output is checked against the declared output.
    pub fn execute(&self, operation: &str, raw_arguments: &Map<String, Value>) -> Result<Resolved> {
        let Some(descriptor) = self.registry.operation(operation) else {
            return Err(Error::UnknownOperation(operation.to_string()));
        };

        tracing::debug!(operation, kind = ?descriptor.kind, "resolving operation");

        let arguments = descriptor.arguments.validate(operation, raw_arguments)?;
        let resolved = (descriptor.handler)(&self.store, &arguments)?;

        check_output(operation, descriptor.output, &resolved)?;

        Ok(resolved)
    }

    /// Runs the named operation and projects its result through `selection`.
    pub fn execute_selection(
        &self,
        operation: &str,
        raw_arguments: &Map<String, Value>,
        selection: &Selection,
    ) -> Result<Value> {
        let resolved = self.execute(operation, raw_arguments)?;
        self.project(&resolved, selection)
    }

    /// Resolves one declared field of a record. Relationships are only looked up here.
    pub fn resolve_field(&self, record: &Record, field: &str) -> Result<FieldValue> {
        let entity = self.entity(record.kind())?;

        let Some(descriptor) = entity.field(field) else {
            return Err(Error::UnknownField {
                entity: record.kind(),
                field: field.to_string(),
            });
        };

        match &descriptor.kind {
            FieldKind::Scalar { attribute, ty } => {
                let value = record.attribute(attribute).ok_or_else(|| {
                    Error::ContractViolation(format!(
                        "{} {} has no attribute `{attribute}`",
                        record.kind(),
                        record.id()
                    ))
                })?;

                project_scalar(*ty, value).map(FieldValue::Scalar)
            }
            FieldKind::Relationship { target, resolve } => {
                let related = resolve(record)
                    .into_iter()
                    .map(|id| self.store.get(*target, id))
                    .collect();

                Ok(FieldValue::Related(related))
            }
        }
    }

    pub fn project(&self, resolved: &Resolved, selection: &Selection) -> Result<Value> {
        match resolved {
            Resolved::NotFound => Ok(Value::Null),
            Resolved::One(record) => self.project_record(record, selection),
            Resolved::Many(records) => records
                .iter()
                .map(|record| self.project_record(record, selection))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
        }
    }

    pub fn project_record(&self, record: &Record, selection: &Selection) -> Result<Value> {
        let mut object = Map::new();

        if selection.is_empty() {
            let entity = self.entity(record.kind())?;

            for field in entity.fields.values() {
                if let FieldKind::Scalar { .. } = field.kind {
                    let value = self.resolve_field(record, &field.name)?;
                    object.insert(field.name.clone(), self.field_to_json(value, &Selection::new())?);
                }
            }

            return Ok(Value::Object(object));
        }

        for selected in selection.iter() {
            let value = self.resolve_field(record, &selected.name)?;
            object.insert(
                selected.response_key().to_string(),
                self.field_to_json(value, &selected.selection)?,
            );
        }

        Ok(Value::Object(object))
    }

    fn field_to_json(&self, value: FieldValue, selection: &Selection) -> Result<Value> {
        match value {
            FieldValue::Scalar(scalar) => Ok(scalar.to_json()),
            FieldValue::Related(related) => related
                .iter()
                .map(|slot| match slot {
                    Some(record) => self.project_record(record, selection),
                    None => Ok(Value::Null),
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
        }
    }

    fn entity(&self, kind: EntityKind) -> Result<&EntityDescriptor> {
        self.registry
            .entity(kind)
            .ok_or_else(|| Error::ContractViolation(format!("entity `{kind}` is not registered")))
    }
}

fn project_scalar(ty: ScalarType, value: AttributeValue<'_>) -> Result<ScalarValue> {
    match (ty, value) {
        (ScalarType::Id, AttributeValue::Id(id)) => Ok(ScalarValue::Id(id)),
        (ScalarType::Int, AttributeValue::Id(id)) => Ok(ScalarValue::Int(id)),
        (ScalarType::String, AttributeValue::String(s)) => Ok(ScalarValue::String(s.to_string())),
        (ty, value) => Err(Error::ContractViolation(format!(
            "{ty} cannot represent a stored {}",
            value.ty()
        ))),
    }
}

fn check_output(operation: &str, output: OutputShape, resolved: &Resolved) -> Result<()> {
    let records = match (output.cardinality, resolved) {
        (Cardinality::Optional, Resolved::NotFound) => return Ok(()),
        (Cardinality::Optional | Cardinality::One, Resolved::One(record)) => std::slice::from_ref(record),
        (Cardinality::Many, Resolved::Many(records)) => records.as_slice(),
        (cardinality, _) => {
            return Err(Error::ContractViolation(format!(
                "`{operation}` is declared to return {cardinality:?} {}, got {}",
                output.entity,
                describe(resolved)
            )));
        }
    };

    if let Some(record) = records.iter().find(|record| record.kind() != output.entity) {
        return Err(Error::ContractViolation(format!(
            "`{operation}` is declared to return {}, got {} {}",
            output.entity,
            record.kind(),
            record.id()
        )));
    }

    Ok(())
}

fn describe(resolved: &Resolved) -> &'static str {
    match resolved {
        Resolved::NotFound => "not-found",
        Resolved::One(_) => "one record",
        Resolved::Many(_) => "a list",
    }
}
