//! Derives an executable GraphQL schema from a [`SchemaRegistry`].
//!
//! Every resolver goes back to the [`ResolutionEngine`] stored in the schema data, so the
//! GraphQL layer only translates between the wire and the engine.

use async_graphql::{
    dynamic::{
        Field, FieldFuture, FieldValue, InputObject, InputValue, Object, ResolverContext, Schema, SchemaError, TypeRef,
    },
    ErrorExtensions,
};
use serde_json::{Map, Value};

use crate::{
    engine::{FieldValue as ResolvedField, ResolutionEngine, Resolved, ScalarValue},
    error::Error,
    record::Record,
    registry::{
        ArgumentShape, ArgumentType, Cardinality, EntityDescriptor, FieldDescriptor, FieldKind, OperationDescriptor,
        OperationKind, OutputShape,
    },
};

const QUERY: &str = "Query";
const MUTATION: &str = "Mutation";

#[derive(Debug, Clone, Copy)]
pub struct SchemaOptions {
    pub introspection: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self { introspection: true }
    }
}

/// Builds the GraphQL schema for everything declared in the engine's registry.
pub fn build_schema(engine: ResolutionEngine, options: SchemaOptions) -> Result<Schema, SchemaError> {
    let registry = engine.registry();

    let mut query = Object::new(QUERY);
    let mut mutation = Object::new(MUTATION);
    let mut input_objects = Vec::new();
    let mut has_mutations = false;

    for operation in registry.operations() {
        let (field, input_object) = operation_field(operation);
        input_objects.extend(input_object);

        match operation.kind {
            OperationKind::Query => query = query.field(field),
            OperationKind::Mutation => {
                has_mutations = true;
                mutation = mutation.field(field);
            }
        }
    }

    let mut builder = Schema::build(QUERY, has_mutations.then_some(MUTATION), None).register(query);

    if has_mutations {
        builder = builder.register(mutation);
    }

    for entity in registry.entities() {
        builder = builder.register(entity_object(entity));
    }

    for input_object in input_objects {
        builder = builder.register(input_object);
    }

    if !options.introspection {
        builder = builder.disable_introspection();
    }

    builder.data(engine).finish()
}

fn entity_object(entity: &EntityDescriptor) -> Object {
    entity
        .fields
        .values()
        .fold(Object::new(entity.kind.name()), |object, field| {
            object.field(entity_field(field))
        })
}

fn entity_field(descriptor: &FieldDescriptor) -> Field {
    let ty = match &descriptor.kind {
        FieldKind::Scalar { ty, .. } => TypeRef::named_nn(ty.graphql_name()),
        // missing targets resolve to null, hence nullable items
        FieldKind::Relationship { target, .. } => TypeRef::named_list_nn(target.name()),
    };

    let name = descriptor.name.clone();

    let field = Field::new(descriptor.name.clone(), ty, move |ctx| {
        let name = name.clone();

        FieldFuture::new(async move {
            let engine = ctx.data::<ResolutionEngine>()?;
            let record = ctx.parent_value.try_downcast_ref::<Record>()?;

            let value = match engine.resolve_field(record, &name).map_err(into_graphql_error)? {
                ResolvedField::Scalar(scalar) => FieldValue::value(scalar_value(scalar)),
                ResolvedField::Related(related) => FieldValue::list(related.into_iter().map(|slot| match slot {
                    Some(record) => FieldValue::owned_any(record),
                    None => FieldValue::NULL,
                })),
            };

            Ok(Some(value))
        })
    });

    match &descriptor.description {
        Some(description) => field.description(description.clone()),
        None => field,
    }
}

fn operation_field(operation: &OperationDescriptor) -> (Field, Option<InputObject>) {
    let name = operation.name.clone();
    let group = operation.arguments.group().map(|group| group.argument.clone());

    let field = Field::new(operation.name.clone(), output_type(operation.output), move |ctx| {
        let name = name.clone();
        let group = group.clone();

        FieldFuture::new(async move {
            let engine = ctx.data::<ResolutionEngine>()?;
            let arguments = raw_arguments(&ctx, group.as_deref())?;

            let value = match engine.execute(&name, &arguments).map_err(into_graphql_error)? {
                Resolved::NotFound => None,
                Resolved::One(record) => Some(FieldValue::owned_any(record)),
                Resolved::Many(records) => Some(FieldValue::list(records.into_iter().map(FieldValue::owned_any))),
            };

            Ok(value)
        })
    });

    arguments(field, &operation.arguments)
}

/// Declares the operation arguments on the field, wrapped in an input object when grouped.
fn arguments(field: Field, shape: &ArgumentShape) -> (Field, Option<InputObject>) {
    let Some(group) = shape.group() else {
        let field = shape.arguments().iter().fold(field, |field, spec| {
            field.argument(InputValue::new(spec.name.clone(), argument_type(&spec.ty, spec.required)))
        });

        return (field, None);
    };

    let input_object = shape
        .arguments()
        .iter()
        .fold(InputObject::new(group.type_name.clone()), |object, spec| {
            object.field(InputValue::new(spec.name.clone(), argument_type(&spec.ty, spec.required)))
        });

    let field = field.argument(InputValue::new(
        group.argument.clone(),
        TypeRef::named_nn(group.type_name.clone()),
    ));

    (field, Some(input_object))
}

fn output_type(output: OutputShape) -> TypeRef {
    let entity = output.entity.name();

    match output.cardinality {
        Cardinality::Optional => TypeRef::named(entity),
        Cardinality::One => TypeRef::named_nn(entity),
        Cardinality::Many => TypeRef::named_nn_list_nn(entity),
    }
}

fn argument_type(ty: &ArgumentType, required: bool) -> TypeRef {
    let ty = match ty {
        ArgumentType::Int => TypeRef::named(TypeRef::INT),
        ArgumentType::String => TypeRef::named(TypeRef::STRING),
        // list items are never null
        ArgumentType::List(inner) => TypeRef::List(Box::new(argument_type(inner, true))),
    };

    if required {
        TypeRef::NonNull(Box::new(ty))
    } else {
        ty
    }
}

/// Collects the field arguments as JSON, unwrapping the input object of a grouped shape.
fn raw_arguments(ctx: &ResolverContext<'_>, group: Option<&str>) -> async_graphql::Result<Map<String, Value>> {
    let mut arguments = Map::new();

    for (name, value) in ctx.args.iter() {
        arguments.insert(name.to_string(), value.as_value().clone().into_json()?);
    }

    let Some(group) = group else {
        return Ok(arguments);
    };

    match arguments.remove(group) {
        Some(Value::Object(inner)) => Ok(inner),
        _ => Ok(Map::new()),
    }
}

fn scalar_value(scalar: ScalarValue) -> async_graphql::Value {
    match scalar {
        // GraphQL serializes IDs as strings
        ScalarValue::Id(id) => async_graphql::Value::String(id.to_string()),
        ScalarValue::Int(n) => async_graphql::Value::from(n),
        ScalarValue::String(s) => async_graphql::Value::String(s),
    }
}

fn into_graphql_error(err: Error) -> async_graphql::Error {
    let code = err.code();
    async_graphql::Error::new(err.to_string()).extend_with(|_, extensions| extensions.set("code", code))
}
