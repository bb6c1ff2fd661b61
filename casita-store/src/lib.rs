#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Data model and storage backends for Casita.
//!
//! The [`Storage`] trait is the seam between the web handlers and
//! persistence. Two backends are provided: [`MemoryStorage`], which keeps
//! everything in process memory and is used by tests, and [`FileStorage`],
//! which persists the same tables to a JSON file after every mutation.
//!
//! All storage calls are synchronous and atomic at the granularity of a
//! single record. Nothing here provides transactions; read-your-writes
//! behavior within one backend instance is all callers may rely on.

mod file;
mod memory;
mod models;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use models::{Amenity, City, EntityKind, Place, PlacePatch, State, User};

use thiserror::Error;

/// An error from a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// The kind of record that was requested.
        kind: EntityKind,
        /// The id that was requested.
        id: String,
    },

    /// The backing file could not be read or written.
    #[error("storage file I/O error")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not contain a valid snapshot.
    #[error("storage file is corrupt")]
    Corrupt(#[from] serde_json::Error),
}

/// Persistence and retrieval of typed records by id.
///
/// Readers get owned clones of records. Mutating a clone has no effect until
/// it is passed back through a `save_*` method, which upserts by id.
pub trait Storage: Send + Sync {
    /// Fetch a state by id.
    fn get_state(&self, id: &str) -> Option<State>;

    /// Fetch a city by id.
    fn get_city(&self, id: &str) -> Option<City>;

    /// Fetch a user by id.
    fn get_user(&self, id: &str) -> Option<User>;

    /// Fetch an amenity by id.
    fn get_amenity(&self, id: &str) -> Option<Amenity>;

    /// Fetch a place by id.
    fn get_place(&self, id: &str) -> Option<Place>;

    /// Every city in the store, in unspecified order.
    fn all_cities(&self) -> Vec<City>;

    /// Every place in the store, in unspecified order.
    fn all_places(&self) -> Vec<Place>;

    /// Insert or replace a state.
    fn save_state(&self, state: State) -> Result<(), StoreError>;

    /// Insert or replace a city.
    fn save_city(&self, city: City) -> Result<(), StoreError>;

    /// Insert or replace a user.
    fn save_user(&self, user: User) -> Result<(), StoreError>;

    /// Insert or replace an amenity.
    fn save_amenity(&self, amenity: Amenity) -> Result<(), StoreError>;

    /// Insert or replace a place.
    fn save_place(&self, place: Place) -> Result<(), StoreError>;

    /// Remove a place. Fails with [`StoreError::NotFound`] if it is absent.
    fn delete_place(&self, id: &str) -> Result<(), StoreError>;
}
