//! The people and hobbies API: entity declarations, the five operations and typed shortcuts
//! to run them.

use serde_json::{json, Map, Value};

use crate::{
    engine::{FieldValue, ResolutionEngine, Resolved},
    error::{Error, RegistryError, Result},
    record::{EntityKind, Hobby, Person, Record, RecordId},
    registry::{
        ArgumentShape, ArgumentSpec, ArgumentType, Arguments, FieldDescriptor, OperationDescriptor, OutputShape,
        ScalarType, SchemaRegistry,
    },
    store::RecordStore,
};

/// Declares the people and hobbies schema.
pub fn registry() -> Result<SchemaRegistry, RegistryError> {
    let by_id = || ArgumentShape::none().with(ArgumentSpec::required("id", ArgumentType::Int));

    SchemaRegistry::builder()
        .register_entity(
            EntityKind::Person,
            [
                FieldDescriptor::scalar("id", "id", ScalarType::Id),
                FieldDescriptor::scalar("name", "name", ScalarType::String),
                FieldDescriptor::relationship("hobbies", EntityKind::Hobby, |record| match record {
                    Record::Person(person) => person.hobbies.clone(),
                    Record::Hobby(_) => Vec::new(),
                })
                .description("The hobbies of this person, `null` where a hobby id is unknown."),
            ],
        )
        .register_entity(
            EntityKind::Hobby,
            [
                FieldDescriptor::scalar("id", "id", ScalarType::Id),
                FieldDescriptor::scalar("name", "name", ScalarType::String),
            ],
        )
        .register_operation(OperationDescriptor::query(
            "person",
            by_id(),
            OutputShape::optional(EntityKind::Person),
            |store, args| lookup(store, EntityKind::Person, args),
        ))
        .register_operation(OperationDescriptor::query(
            "people",
            ArgumentShape::none(),
            OutputShape::many(EntityKind::Person),
            |store, _| Ok(Resolved::Many(store.all(EntityKind::Person))),
        ))
        .register_operation(OperationDescriptor::query(
            "hobby",
            by_id(),
            OutputShape::optional(EntityKind::Hobby),
            |store, args| lookup(store, EntityKind::Hobby, args),
        ))
        .register_operation(OperationDescriptor::query(
            "hobbies",
            ArgumentShape::none(),
            OutputShape::many(EntityKind::Hobby),
            |store, _| Ok(Resolved::Many(store.all(EntityKind::Hobby))),
        ))
        .register_operation(OperationDescriptor::mutation(
            "addPerson",
            ArgumentShape::none()
                .with(ArgumentSpec::required("name", ArgumentType::String))
                .with(ArgumentSpec::required(
                    "hobbies",
                    ArgumentType::list_of(ArgumentType::Int),
                ))
                .grouped("person", "CreatePersonInput"),
            OutputShape::one(EntityKind::Person),
            add_person,
        ))
        .build()
}

fn lookup(store: &RecordStore, entity: EntityKind, args: &Arguments) -> Result<Resolved> {
    let id = args.int("id")?;

    Ok(match store.get(entity, id) {
        Some(record) => Resolved::One(record),
        None => Resolved::NotFound,
    })
}

fn add_person(store: &RecordStore, args: &Arguments) -> Result<Resolved> {
    let name = args.string("name")?.to_string();
    let hobbies = args.id_list("hobbies")?;

    let person = {
        let mut writer = store.write();

        let person = Person {
            id: writer.next_id(EntityKind::Person)?,
            name,
            hobbies,
        };

        writer.append(person.clone().into())?;
        person
    };

    tracing::info!(id = person.id, name = %person.name, "person added");

    Ok(Resolved::One(person.into()))
}

impl ResolutionEngine {
    pub fn person(&self, id: RecordId) -> Result<Option<Person>> {
        self.run_optional("person", json!({ "id": id }))
    }

    pub fn people(&self) -> Result<Vec<Person>> {
        self.run_many("people", json!({}))
    }

    pub fn hobby(&self, id: RecordId) -> Result<Option<Hobby>> {
        self.run_optional("hobby", json!({ "id": id }))
    }

    pub fn hobbies(&self) -> Result<Vec<Hobby>> {
        self.run_many("hobbies", json!({}))
    }

    pub fn add_person(&self, name: &str, hobbies: &[RecordId]) -> Result<Person> {
        match self.run("addPerson", json!({ "name": name, "hobbies": hobbies }))? {
            Resolved::One(record) => Person::try_from(record),
            other => Err(unexpected("addPerson", &other)),
        }
    }

    /// Resolves `Person.hobbies` for an already resolved person.
    pub fn person_hobbies(&self, person: &Person) -> Result<Vec<Option<Hobby>>> {
        match self.resolve_field(&Record::Person(person.clone()), "hobbies")? {
            FieldValue::Related(related) => related
                .into_iter()
                .map(|slot| slot.map(Hobby::try_from).transpose())
                .collect(),
            FieldValue::Scalar(_) => Err(Error::ContractViolation(
                "`Person.hobbies` is not a relationship".to_string(),
            )),
        }
    }

    fn run(&self, operation: &str, arguments: Value) -> Result<Resolved> {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        self.execute(operation, &arguments)
    }

    fn run_optional<T>(&self, operation: &str, arguments: Value) -> Result<Option<T>>
    where
        T: TryFrom<Record, Error = Error>,
    {
        match self.run(operation, arguments)? {
            Resolved::NotFound => Ok(None),
            Resolved::One(record) => T::try_from(record).map(Some),
            other => Err(unexpected(operation, &other)),
        }
    }

    fn run_many<T>(&self, operation: &str, arguments: Value) -> Result<Vec<T>>
    where
        T: TryFrom<Record, Error = Error>,
    {
        match self.run(operation, arguments)? {
            Resolved::Many(records) => records.into_iter().map(T::try_from).collect(),
            other => Err(unexpected(operation, &other)),
        }
    }
}

fn unexpected(operation: &str, resolved: &Resolved) -> Error {
    Error::ContractViolation(format!("`{operation}` returned an unexpected shape: {resolved:?}"))
}
