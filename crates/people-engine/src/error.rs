use crate::{
    record::{AttributeType, EntityKind},
    registry::{ArgumentType, ScalarType},
    store::StoreError,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Raised when the arguments of an operation do not match its declared shape.
/// Always detected before the operation handler runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required argument `{argument}` for `{operation}`")]
    MissingArgument { operation: String, argument: String },
    #[error("unexpected argument `{argument}` for `{operation}`")]
    UnexpectedArgument { operation: String, argument: String },
    #[error("argument `{argument}` of `{operation}` expects {expected}, got {found}")]
    TypeMismatch {
        operation: String,
        argument: String,
        expected: ArgumentType,
        found: String,
    },
}

/// The resolution engine error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),
    #[error("unknown field `{field}` on `{entity}`")]
    UnknownField { entity: EntityKind, field: String },
    /// Stored data does not match what the schema declares.
    #[error("contract violation: {0}")]
    ContractViolation(String),
}

impl Error {
    /// The error code exposed to clients in the GraphQL error extensions.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Store(StoreError::DuplicateId { .. }) => "DUPLICATE_ID",
            Error::Store(StoreError::IdOutOfRange { .. } | StoreError::IdsExhausted { .. })
            | Error::UnknownOperation(_)
            | Error::UnknownField { .. }
            | Error::ContractViolation(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

/// Errors in the declarations given to [`crate::SchemaRegistryBuilder`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("entity `{0}` is registered more than once")]
    DuplicateEntity(EntityKind),
    #[error("field `{field}` is declared more than once on `{entity}`")]
    DuplicateField { entity: EntityKind, field: String },
    #[error("operation `{0}` is registered more than once")]
    DuplicateOperation(String),
    #[error("argument `{argument}` is declared more than once on `{operation}`")]
    DuplicateArgument { operation: String, argument: String },
    #[error("field `{entity}.{field}` reads attribute `{attribute}`, which `{entity}` does not store")]
    UnknownAttribute {
        entity: EntityKind,
        field: String,
        attribute: String,
    },
    #[error("field `{entity}.{field}` is declared as {declared} but attribute `{attribute}` is stored as {stored}")]
    AttributeTypeMismatch {
        entity: EntityKind,
        field: String,
        attribute: String,
        declared: ScalarType,
        stored: AttributeType,
    },
    #[error("`{referenced_by}` refers to entity `{entity}`, which is not registered")]
    UnregisteredEntity { referenced_by: String, entity: EntityKind },
}
