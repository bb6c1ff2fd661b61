//! An in-memory storage backend.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::models::{Amenity, City, EntityKind, Place, State, User};
use crate::{Storage, StoreError};

/// One map per entity kind.
///
/// This is also the snapshot format of the file backend, which serializes
/// the whole struct to JSON.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Tables {
    /// States by id.
    pub(crate) states: HashMap<String, State>,
    /// Cities by id.
    pub(crate) cities: HashMap<String, City>,
    /// Users by id.
    pub(crate) users: HashMap<String, User>,
    /// Amenities by id.
    pub(crate) amenities: HashMap<String, Amenity>,
    /// Places by id.
    pub(crate) places: HashMap<String, Place>,
}

/// A storage backend that keeps every record in process memory.
///
/// Cheap to create and dropped wholesale, which makes it the backend of
/// choice for tests. It is also the working set of [`FileStorage`].
///
/// [`FileStorage`]: crate::FileStorage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    /// The guarded tables.
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated from a snapshot.
    pub(crate) fn from_tables(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Clone the current tables, for the file backend to persist.
    pub(crate) fn snapshot(&self) -> Tables {
        self.read().clone()
    }

    /// Take the read lock. A poisoned lock is recovered, since the tables
    /// are only ever mutated through complete record replacement.
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the write lock, recovering from poisoning like [`Self::read`].
    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn get_state(&self, id: &str) -> Option<State> {
        self.read().states.get(id).cloned()
    }

    fn get_city(&self, id: &str) -> Option<City> {
        self.read().cities.get(id).cloned()
    }

    fn get_user(&self, id: &str) -> Option<User> {
        self.read().users.get(id).cloned()
    }

    fn get_amenity(&self, id: &str) -> Option<Amenity> {
        self.read().amenities.get(id).cloned()
    }

    fn get_place(&self, id: &str) -> Option<Place> {
        self.read().places.get(id).cloned()
    }

    fn all_cities(&self) -> Vec<City> {
        self.read().cities.values().cloned().collect()
    }

    fn all_places(&self) -> Vec<Place> {
        self.read().places.values().cloned().collect()
    }

    fn save_state(&self, state: State) -> Result<(), StoreError> {
        self.write().states.insert(state.id.clone(), state);
        Ok(())
    }

    fn save_city(&self, city: City) -> Result<(), StoreError> {
        self.write().cities.insert(city.id.clone(), city);
        Ok(())
    }

    fn save_user(&self, user: User) -> Result<(), StoreError> {
        self.write().users.insert(user.id.clone(), user);
        Ok(())
    }

    fn save_amenity(&self, amenity: Amenity) -> Result<(), StoreError> {
        self.write().amenities.insert(amenity.id.clone(), amenity);
        Ok(())
    }

    fn save_place(&self, place: Place) -> Result<(), StoreError> {
        self.write().places.insert(place.id.clone(), place);
        Ok(())
    }

    fn delete_place(&self, id: &str) -> Result<(), StoreError> {
        match self.write().places.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                kind: EntityKind::Place,
                id: id.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn save_then_get_round_trips() {
        let storage = MemoryStorage::new();
        let place = Place::new("city-1", "user-1", "Cozy loft");

        storage.save_place(place.clone()).expect("save should work");

        assert_eq!(storage.get_place(&place.id), Some(place));
    }

    #[test]
    fn save_replaces_by_id() {
        let storage = MemoryStorage::new();
        let mut place = Place::new("city-1", "user-1", "Cozy loft");
        storage.save_place(place.clone()).expect("save should work");

        place.name = "Renamed loft".to_string();
        storage.save_place(place.clone()).expect("save should work");

        assert_eq!(storage.all_places().len(), 1);
        assert_eq!(
            storage.get_place(&place.id).map(|p| p.name),
            Some("Renamed loft".to_string())
        );
    }

    #[test]
    fn delete_removes_the_record() {
        let storage = MemoryStorage::new();
        let place = Place::new("city-1", "user-1", "Cozy loft");
        storage.save_place(place.clone()).expect("save should work");

        storage.delete_place(&place.id).expect("delete should work");

        assert_eq!(storage.get_place(&place.id), None);
        assert!(storage.all_places().is_empty());
    }

    #[test]
    fn delete_missing_place_is_not_found() {
        let storage = MemoryStorage::new();

        let error = storage
            .delete_place("no-such-id")
            .expect_err("delete of a missing place should fail");

        assert!(matches!(
            error,
            StoreError::NotFound {
                kind: EntityKind::Place,
                ..
            }
        ));
    }

    #[test]
    fn get_does_not_cross_kinds() {
        let storage = MemoryStorage::new();
        let city = City::new("state-1", "Adelaide");
        storage.save_city(city.clone()).expect("save should work");

        assert_eq!(storage.get_place(&city.id), None);
        assert_eq!(storage.get_state(&city.id), None);
        assert_eq!(storage.get_city(&city.id), Some(city));
    }

    #[test]
    fn read_only_kinds_round_trip() {
        let storage = MemoryStorage::new();
        let state = State::new("South Australia");
        let user = User::new("host@example.com");
        let amenity = Amenity::new("wifi");

        storage.save_state(state.clone()).expect("save should work");
        storage.save_user(user.clone()).expect("save should work");
        storage.save_amenity(amenity.clone()).expect("save should work");

        assert_eq!(storage.get_state(&state.id), Some(state));
        assert_eq!(storage.get_user(&user.id), Some(user));
        assert_eq!(storage.get_amenity(&amenity.id), Some(amenity));
    }
}
