use std::fmt;

/// Identifier of a stored record, unique within its collection.
pub type RecordId = i64;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Person {
    pub id: RecordId,
    pub name: String,
    /// Hobby ids, in the order they were given. Not checked against the store.
    #[serde(default)]
    pub hobbies: Vec<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Hobby {
    pub id: RecordId,
    pub name: String,
}

/// The entity types the store holds a collection for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Person,
    Hobby,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Person, EntityKind::Hobby];

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Person => "Person",
            EntityKind::Hobby => "Hobby",
        }
    }

    /// The attributes physically stored on records of this kind.
    pub fn attributes(self) -> &'static [(&'static str, AttributeType)] {
        match self {
            EntityKind::Person => &[
                ("id", AttributeType::Id),
                ("name", AttributeType::String),
                ("hobbies", AttributeType::IdList),
            ],
            EntityKind::Hobby => &[("id", AttributeType::Id), ("name", AttributeType::String)],
        }
    }

    pub fn attribute_type(self, attribute: &str) -> Option<AttributeType> {
        self.attributes()
            .iter()
            .find_map(|(name, ty)| (*name == attribute).then_some(*ty))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Id,
    String,
    IdList,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttributeType::Id => "id",
            AttributeType::String => "string",
            AttributeType::IdList => "id list",
        })
    }
}

/// A borrowed view on one stored attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeValue<'a> {
    Id(RecordId),
    String(&'a str),
    IdList(&'a [RecordId]),
}

impl AttributeValue<'_> {
    pub fn ty(&self) -> AttributeType {
        match self {
            AttributeValue::Id(_) => AttributeType::Id,
            AttributeValue::String(_) => AttributeType::String,
            AttributeValue::IdList(_) => AttributeType::IdList,
        }
    }
}

/// A record of any entity kind, as held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Person(Person),
    Hobby(Hobby),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Person(_) => EntityKind::Person,
            Record::Hobby(_) => EntityKind::Hobby,
        }
    }

    pub fn id(&self) -> RecordId {
        match self {
            Record::Person(person) => person.id,
            Record::Hobby(hobby) => hobby.id,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<AttributeValue<'_>> {
        match (self, name) {
            (Record::Person(person), "id") => Some(AttributeValue::Id(person.id)),
            (Record::Person(person), "name") => Some(AttributeValue::String(&person.name)),
            (Record::Person(person), "hobbies") => Some(AttributeValue::IdList(&person.hobbies)),
            (Record::Hobby(hobby), "id") => Some(AttributeValue::Id(hobby.id)),
            (Record::Hobby(hobby), "name") => Some(AttributeValue::String(&hobby.name)),
            _ => None,
        }
    }
}

impl From<Person> for Record {
    fn from(person: Person) -> Self {
        Record::Person(person)
    }
}

impl From<Hobby> for Record {
    fn from(hobby: Hobby) -> Self {
        Record::Hobby(hobby)
    }
}

impl TryFrom<Record> for Person {
    type Error = crate::Error;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        match record {
            Record::Person(person) => Ok(person),
            other => Err(crate::Error::ContractViolation(format!(
                "expected a Person record, got {} {}",
                other.kind(),
                other.id()
            ))),
        }
    }
}

impl TryFrom<Record> for Hobby {
    type Error = crate::Error;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        match record {
            Record::Hobby(hobby) => Ok(hobby),
            other => Err(crate::Error::ContractViolation(format!(
                "expected a Hobby record, got {} {}",
                other.kind(),
                other.id()
            ))),
        }
    }
}
