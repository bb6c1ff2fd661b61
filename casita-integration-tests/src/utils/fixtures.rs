//! Seeded record sets shared between tests.

use std::collections::HashSet;

use casita_store::{City, MemoryStorage, Place, State, Storage, User};
use serde_json::Value;

/// A minimal world: one state with one city, and a user to own places.
pub struct Geography {
    /// The seeded state.
    pub state: State,
    /// The seeded city, belonging to `state`.
    pub city: City,
    /// The seeded user.
    pub user: User,
}

/// Seed one state, one city, and one user.
pub fn seed_geography(storage: &MemoryStorage) -> Geography {
    let state = State::new("South Australia");
    let city = City::new(&state.id, "Adelaide");
    let user = User::new("host@example.com");

    storage.save_state(state.clone()).expect("seeding state");
    storage.save_city(city.clone()).expect("seeding city");
    storage.save_user(user.clone()).expect("seeding user");

    Geography { state, city, user }
}

/// Seed a place owned by `user` in `city`.
pub fn seed_place(storage: &MemoryStorage, city: &City, user: &User, name: &str) -> Place {
    let place = Place::new(&city.id, &user.id, name);
    storage.save_place(place.clone()).expect("seeding place");
    place
}

/// Collect the `id` fields of an array of serialized records.
///
/// Panics if any entry has no string `id`, since that means the response is
/// not shaped like a record list at all.
pub fn id_set(records: &[Value]) -> HashSet<String> {
    records
        .iter()
        .map(|record| {
            record["id"]
                .as_str()
                .expect("record should have a string id")
                .to_string()
        })
        .collect()
}
