use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{error::ValidationError, record::RecordId};

/// Primitive types an operation argument can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentType {
    Int,
    String,
    List(Box<ArgumentType>),
}

impl ArgumentType {
    pub fn list_of(inner: ArgumentType) -> Self {
        ArgumentType::List(Box::new(inner))
    }
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentType::Int => f.write_str("Int"),
            ArgumentType::String => f.write_str("String"),
            ArgumentType::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub name: String,
    pub ty: ArgumentType,
    pub required: bool,
}

impl ArgumentSpec {
    pub fn required(name: impl Into<String>, ty: ArgumentType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, ty: ArgumentType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
        }
    }
}

/// Presents the arguments of an operation as the fields of one input object on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireGroup {
    /// Name of the single wire argument, e.g. `person`.
    pub argument: String,
    /// Name of the input object type, e.g. `CreatePersonInput`.
    pub type_name: String,
}

/// The arguments an operation accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentShape {
    arguments: Vec<ArgumentSpec>,
    group: Option<WireGroup>,
}

impl ArgumentShape {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, spec: ArgumentSpec) -> Self {
        self.arguments.push(spec);
        self
    }

    pub fn grouped(mut self, argument: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.group = Some(WireGroup {
            argument: argument.into(),
            type_name: type_name.into(),
        });
        self
    }

    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    pub fn group(&self) -> Option<&WireGroup> {
        self.group.as_ref()
    }

    /// Checks raw arguments against the shape. A `null` counts as an absent argument.
    pub fn validate(&self, operation: &str, raw: &Map<String, Value>) -> Result<Arguments, ValidationError> {
        if let Some(unexpected) = raw
            .keys()
            .find(|name| !self.arguments.iter().any(|spec| &spec.name == *name))
        {
            return Err(ValidationError::UnexpectedArgument {
                operation: operation.to_string(),
                argument: unexpected.clone(),
            });
        }

        let mut values = IndexMap::with_capacity(self.arguments.len());

        for spec in &self.arguments {
            match raw.get(&spec.name) {
                None | Some(Value::Null) if spec.required => {
                    return Err(ValidationError::MissingArgument {
                        operation: operation.to_string(),
                        argument: spec.name.clone(),
                    });
                }
                None | Some(Value::Null) => {}
                Some(value) => {
                    let value = ArgumentValue::coerce(&spec.ty, value).ok_or_else(|| ValidationError::TypeMismatch {
                        operation: operation.to_string(),
                        argument: spec.name.clone(),
                        expected: spec.ty.clone(),
                        found: describe(value),
                    })?;

                    values.insert(spec.name.clone(), value);
                }
            }
        }

        Ok(Arguments {
            operation: operation.to_string(),
            values,
        })
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "a list".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentValue {
    Int(i64),
    String(String),
    List(Vec<ArgumentValue>),
}

impl ArgumentValue {
    fn coerce(ty: &ArgumentType, value: &Value) -> Option<Self> {
        match (ty, value) {
            (ArgumentType::Int, Value::Number(n)) => n.as_i64().map(ArgumentValue::Int),
            (ArgumentType::String, Value::String(s)) => Some(ArgumentValue::String(s.clone())),
            (ArgumentType::List(inner), Value::Array(items)) => items
                .iter()
                .map(|item| Self::coerce(inner, item))
                .collect::<Option<Vec<_>>>()
                .map(ArgumentValue::List),
            _ => None,
        }
    }
}

/// Arguments that passed validation, handed to an operation handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    operation: String,
    values: IndexMap<String, ArgumentValue>,
}

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&ArgumentValue> {
        self.values.get(name)
    }

    pub fn int(&self, name: &str) -> Result<i64, ValidationError> {
        match self.required(name)? {
            ArgumentValue::Int(value) => Ok(*value),
            other => Err(self.mismatch(name, ArgumentType::Int, other)),
        }
    }

    pub fn string(&self, name: &str) -> Result<&str, ValidationError> {
        match self.required(name)? {
            ArgumentValue::String(value) => Ok(value.as_str()),
            other => Err(self.mismatch(name, ArgumentType::String, other)),
        }
    }

    pub fn id_list(&self, name: &str) -> Result<Vec<RecordId>, ValidationError> {
        let expected = ArgumentType::list_of(ArgumentType::Int);

        match self.required(name)? {
            ArgumentValue::List(items) => items
                .iter()
                .map(|item| match item {
                    ArgumentValue::Int(id) => Ok(*id),
                    other => Err(self.mismatch(name, expected.clone(), other)),
                })
                .collect(),
            other => Err(self.mismatch(name, expected, other)),
        }
    }

    fn required(&self, name: &str) -> Result<&ArgumentValue, ValidationError> {
        self.values.get(name).ok_or_else(|| ValidationError::MissingArgument {
            operation: self.operation.clone(),
            argument: name.to_string(),
        })
    }

    fn mismatch(&self, name: &str, expected: ArgumentType, found: &ArgumentValue) -> ValidationError {
        let found = match found {
            ArgumentValue::Int(n) => format!("number {n}"),
            ArgumentValue::String(s) => format!("string {s:?}"),
            ArgumentValue::List(_) => "a list".to_string(),
        };

        ValidationError::TypeMismatch {
            operation: self.operation.clone(),
            argument: name.to_string(),
            expected,
            found,
        }
    }
}
