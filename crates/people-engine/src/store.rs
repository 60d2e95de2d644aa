use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock, RwLockWriteGuard},
};

use crate::{
    dataset::Dataset,
    record::{EntityKind, Record, RecordId},
};

/// The largest id a record can carry. Ids travel as GraphQL `Int`, a signed 32-bit integer.
pub const MAX_RECORD_ID: RecordId = i32::MAX as RecordId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Appending a record whose id is already taken in its collection.
    #[error("{entity} with id {id} already exists")]
    DuplicateId { entity: EntityKind, id: RecordId },
    #[error("{entity} id {id} is out of range, ids run from 1 to {}", MAX_RECORD_ID)]
    IdOutOfRange { entity: EntityKind, id: RecordId },
    /// The collection already holds an id of [`MAX_RECORD_ID`].
    #[error("no {entity} ids left to allocate")]
    IdsExhausted { entity: EntityKind },
}

/// In-memory home of every record. Collections keep insertion order.
///
/// Reads share the lock; appends take it exclusively, so id allocation and insertion
/// done through [`RecordStore::write`] cannot interleave with other writers.
#[derive(Debug, Default)]
pub struct RecordStore {
    inner: RwLock<Collections>,
}

#[derive(Debug, Default)]
struct Collections {
    people: Collection,
    hobbies: Collection,
}

impl Collections {
    fn get(&self, entity: EntityKind) -> &Collection {
        match entity {
            EntityKind::Person => &self.people,
            EntityKind::Hobby => &self.hobbies,
        }
    }

    fn get_mut(&mut self, entity: EntityKind) -> &mut Collection {
        match entity {
            EntityKind::Person => &mut self.people,
            EntityKind::Hobby => &mut self.hobbies,
        }
    }
}

#[derive(Debug)]
struct Collection {
    records: Vec<Record>,
    positions: HashMap<RecordId, usize>,
    next_id: RecordId,
}

impl Default for Collection {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            positions: HashMap::new(),
            next_id: 1,
        }
    }
}

impl Collection {
    fn append(&mut self, record: Record) -> Result<(), StoreError> {
        let (entity, id) = (record.kind(), record.id());

        if !(1..=MAX_RECORD_ID).contains(&id) {
            return Err(StoreError::IdOutOfRange { entity, id });
        }

        if self.positions.contains_key(&id) {
            return Err(StoreError::DuplicateId { entity, id });
        }

        self.positions.insert(id, self.records.len());
        self.records.push(record);
        // may step past MAX_RECORD_ID, which `StoreWriter::next_id` reports as exhaustion
        self.next_id = self.next_id.max(id + 1);

        Ok(())
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store holding the given dataset, hobbies first, in file order.
    pub fn seeded(dataset: Dataset) -> Result<Self, StoreError> {
        let store = Self::new();

        {
            let mut writer = store.write();

            for hobby in dataset.hobbies {
                writer.append(hobby.into())?;
            }

            for person in dataset.people {
                writer.append(person.into())?;
            }
        }

        tracing::debug!(
            people = store.len(EntityKind::Person),
            hobbies = store.len(EntityKind::Hobby),
            "record store seeded"
        );

        Ok(store)
    }

    pub fn get(&self, entity: EntityKind, id: RecordId) -> Option<Record> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let collection = inner.get(entity);

        collection
            .positions
            .get(&id)
            .map(|position| collection.records[*position].clone())
    }

    pub fn all(&self, entity: EntityKind) -> Vec<Record> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.get(entity).records.clone()
    }

    pub fn len(&self, entity: EntityKind) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.get(entity).records.len()
    }

    pub fn is_empty(&self, entity: EntityKind) -> bool {
        self.len(entity) == 0
    }

    /// Appends a record to the collection of its kind.
    pub fn append(&self, record: Record) -> Result<(), StoreError> {
        self.write().append(record)
    }

    /// Exclusive access for a sequence of writes, e.g. allocating an id and appending.
    pub fn write(&self) -> StoreWriter<'_> {
        StoreWriter {
            guard: self.inner.write().unwrap_or_else(PoisonError::into_inner),
        }
    }
}

pub struct StoreWriter<'a> {
    guard: RwLockWriteGuard<'a, Collections>,
}

impl StoreWriter<'_> {
    /// An id greater than every id stored so far in the collection.
    pub fn next_id(&self, entity: EntityKind) -> Result<RecordId, StoreError> {
        let next_id = self.guard.get(entity).next_id;

        if next_id > MAX_RECORD_ID {
            return Err(StoreError::IdsExhausted { entity });
        }

        Ok(next_id)
    }

    pub fn append(&mut self, record: Record) -> Result<(), StoreError> {
        self.guard.get_mut(record.kind()).append(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Hobby, Person};

    fn hobby(id: RecordId, name: &str) -> Record {
        Hobby {
            id,
            name: name.to_string(),
        }
        .into()
    }

    fn person(id: RecordId, name: &str, hobbies: &[RecordId]) -> Record {
        Person {
            id,
            name: name.to_string(),
            hobbies: hobbies.to_vec(),
        }
        .into()
    }

    #[test]
    fn get_and_all() {
        let store = RecordStore::new();
        store.append(hobby(2, "running")).unwrap();
        store.append(hobby(1, "chess")).unwrap();
        store.append(person(1, "Ada", &[1, 2])).unwrap();

        assert_eq!(Some(hobby(1, "chess")), store.get(EntityKind::Hobby, 1));
        assert_eq!(Some(person(1, "Ada", &[1, 2])), store.get(EntityKind::Person, 1));
        assert_eq!(None, store.get(EntityKind::Person, 2));

        // insertion order, not id order
        assert_eq!(
            vec![hobby(2, "running"), hobby(1, "chess")],
            store.all(EntityKind::Hobby)
        );
    }

    #[test]
    fn duplicate_ids_are_rejected_per_collection() {
        let store = RecordStore::new();
        store.append(hobby(1, "chess")).unwrap();

        let err = store.append(hobby(1, "go")).unwrap_err();
        assert_eq!(
            StoreError::DuplicateId {
                entity: EntityKind::Hobby,
                id: 1
            },
            err
        );
        assert_eq!("Hobby with id 1 already exists", err.to_string());

        // the same id in another collection is fine
        store.append(person(1, "Ada", &[])).unwrap();
        assert_eq!(1, store.len(EntityKind::Hobby));
    }

    #[test]
    fn next_id_is_above_every_stored_id() {
        let store = RecordStore::new();
        assert_eq!(1, store.write().next_id(EntityKind::Person).unwrap());

        store.append(person(41, "Ada", &[])).unwrap();
        store.append(person(3, "Linus", &[])).unwrap();

        let mut writer = store.write();
        let id = writer.next_id(EntityKind::Person).unwrap();
        assert_eq!(42, id);

        writer.append(person(id, "Grace", &[])).unwrap();
        assert_eq!(43, writer.next_id(EntityKind::Person).unwrap());
        assert_eq!(1, writer.next_id(EntityKind::Hobby).unwrap());
    }

    #[test]
    fn seeding_rejects_duplicates() {
        let dataset = Dataset {
            people: vec![],
            hobbies: vec![
                Hobby {
                    id: 1,
                    name: "chess".to_string(),
                },
                Hobby {
                    id: 1,
                    name: "go".to_string(),
                },
            ],
        };

        let err = RecordStore::seeded(dataset).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId { entity: EntityKind::Hobby, id: 1 }));
    }

    #[test]
    fn ids_must_be_positive() {
        let store = RecordStore::new();

        for id in [0, -5, RecordId::MIN] {
            let err = store.append(person(id, "Ada", &[])).unwrap_err();
            assert_eq!(
                StoreError::IdOutOfRange {
                    entity: EntityKind::Person,
                    id
                },
                err
            );
        }

        assert!(store.is_empty(EntityKind::Person));
        assert_eq!(1, store.write().next_id(EntityKind::Person).unwrap());
    }

    #[test]
    fn ids_above_the_wire_range_are_rejected() {
        let store = RecordStore::new();

        for id in [MAX_RECORD_ID + 1, RecordId::MAX] {
            let err = store.append(hobby(id, "chess")).unwrap_err();
            assert!(matches!(err, StoreError::IdOutOfRange { .. }), "{err}");
        }

        let err = store.append(hobby(0, "chess")).unwrap_err();
        assert_eq!(
            "Hobby id 0 is out of range, ids run from 1 to 2147483647",
            err.to_string()
        );
    }

    #[test]
    fn seeding_rejects_out_of_range_ids() {
        let dataset = Dataset::from_json(r#"{ "people": [{ "id": -5, "name": "Ada" }] }"#).unwrap();

        let err = RecordStore::seeded(dataset).unwrap_err();
        assert_eq!(
            StoreError::IdOutOfRange {
                entity: EntityKind::Person,
                id: -5
            },
            err
        );
    }

    #[test]
    fn allocation_past_the_last_id_is_reported() {
        let store = RecordStore::new();
        store.append(person(MAX_RECORD_ID - 1, "Ada", &[])).unwrap();

        let mut writer = store.write();
        let id = writer.next_id(EntityKind::Person).unwrap();
        assert_eq!(MAX_RECORD_ID, id);
        writer.append(person(id, "Grace", &[])).unwrap();

        assert_eq!(
            StoreError::IdsExhausted {
                entity: EntityKind::Person
            },
            writer.next_id(EntityKind::Person).unwrap_err()
        );
        // other collections are unaffected
        assert_eq!(1, writer.next_id(EntityKind::Hobby).unwrap());
    }
}
