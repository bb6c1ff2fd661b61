//! A storage backend persisted to a single JSON file.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::memory::MemoryStorage;
use crate::models::{Amenity, City, Place, State, User};
use crate::{Storage, StoreError};

/// A storage backend that mirrors a [`MemoryStorage`] to a JSON file.
///
/// The file is read once when the store is opened; a missing file is an
/// empty store. After every successful mutation the full table set is
/// rewritten, going through a temporary sibling file that is renamed into
/// place so that a crash mid-write leaves the previous snapshot intact.
///
/// The snapshot is one JSON object with a map per entity kind, keyed by id.
#[derive(Debug)]
pub struct FileStorage {
    /// Where the snapshot lives on disk.
    path: PathBuf,
    /// The working set, kept in sync with the file.
    memory: MemoryStorage,
    /// Serializes mutations. Held from the in-memory insert through the
    /// rename, so concurrent writes cannot interleave their snapshots or
    /// fight over the temp file.
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Open the store at `path`, loading the snapshot if one exists.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read, or if its contents are
    /// not a valid snapshot.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let memory = match fs::read(&path) {
            Ok(bytes) => {
                let tables = serde_json::from_slice(&bytes)?;
                MemoryStorage::from_tables(tables)
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No snapshot file, starting empty");
                MemoryStorage::new()
            }
            Err(error) => return Err(error.into()),
        };
        Ok(Self {
            path,
            memory,
            write_lock: Mutex::new(()),
        })
    }

    /// Take the mutation lock, recovering from poisoning since the guarded
    /// state is rebuilt from scratch on every persist.
    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rewrite the snapshot file from the current tables.
    ///
    /// Callers must hold the mutation lock.
    fn persist(&self) -> Result<(), StoreError> {
        let snapshot = self.memory.snapshot();
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_state(&self, id: &str) -> Option<State> {
        self.memory.get_state(id)
    }

    fn get_city(&self, id: &str) -> Option<City> {
        self.memory.get_city(id)
    }

    fn get_user(&self, id: &str) -> Option<User> {
        self.memory.get_user(id)
    }

    fn get_amenity(&self, id: &str) -> Option<Amenity> {
        self.memory.get_amenity(id)
    }

    fn get_place(&self, id: &str) -> Option<Place> {
        self.memory.get_place(id)
    }

    fn all_cities(&self) -> Vec<City> {
        self.memory.all_cities()
    }

    fn all_places(&self) -> Vec<Place> {
        self.memory.all_places()
    }

    fn save_state(&self, state: State) -> Result<(), StoreError> {
        let _guard = self.lock_writes();
        self.memory.save_state(state)?;
        self.persist()
    }

    fn save_city(&self, city: City) -> Result<(), StoreError> {
        let _guard = self.lock_writes();
        self.memory.save_city(city)?;
        self.persist()
    }

    fn save_user(&self, user: User) -> Result<(), StoreError> {
        let _guard = self.lock_writes();
        self.memory.save_user(user)?;
        self.persist()
    }

    fn save_amenity(&self, amenity: Amenity) -> Result<(), StoreError> {
        let _guard = self.lock_writes();
        self.memory.save_amenity(amenity)?;
        self.persist()
    }

    fn save_place(&self, place: Place) -> Result<(), StoreError> {
        let _guard = self.lock_writes();
        self.memory.save_place(place)?;
        self.persist()
    }

    fn delete_place(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.lock_writes();
        self.memory.delete_place(id)?;
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    /// A scratch file path that is removed when the guard drops.
    struct ScratchFile(PathBuf);

    impl ScratchFile {
        fn new() -> Self {
            let path = std::env::temp_dir().join(format!(
                "casita-store-test-{}.json",
                uuid::Uuid::new_v4()
            ));
            Self(path)
        }
    }

    impl Drop for ScratchFile {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.0);
        }
    }

    #[test]
    fn missing_file_opens_empty() {
        let scratch = ScratchFile::new();
        let storage = FileStorage::open(&scratch.0).expect("open should work");
        assert!(storage.all_places().is_empty());
        // Opening alone must not create the file.
        assert!(!scratch.0.exists());
    }

    #[test]
    fn records_survive_reopen() {
        let scratch = ScratchFile::new();
        let state = State::new("South Australia");
        let city = City::new(&state.id, "Adelaide");
        let place = Place::new(&city.id, "user-1", "Cozy loft");

        {
            let storage = FileStorage::open(&scratch.0).expect("open should work");
            storage.save_state(state.clone()).expect("save should work");
            storage.save_city(city.clone()).expect("save should work");
            storage.save_place(place.clone()).expect("save should work");
        }

        let reopened = FileStorage::open(&scratch.0).expect("reopen should work");
        assert_eq!(reopened.get_state(&state.id), Some(state));
        assert_eq!(reopened.get_city(&city.id), Some(city));
        assert_eq!(reopened.get_place(&place.id), Some(place));
    }

    #[test]
    fn concurrent_saves_neither_fail_nor_lose_writes() {
        let scratch = ScratchFile::new();
        let storage = Arc::new(FileStorage::open(&scratch.0).expect("open should work"));

        let workers: Vec<_> = (0..4)
            .map(|worker| {
                let storage = Arc::clone(&storage);
                thread::spawn(move || {
                    for n in 0..25 {
                        let place =
                            Place::new("city-1", "user-1", format!("Listing {}-{}", worker, n));
                        storage.save_place(place).expect("save should work");
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("worker should finish");
        }

        assert_eq!(storage.all_places().len(), 100);

        // Every acknowledged write is in the snapshot on disk.
        let reopened = FileStorage::open(&scratch.0).expect("reopen should work");
        assert_eq!(reopened.all_places().len(), 100);
    }

    #[test]
    fn delete_is_persisted() {
        let scratch = ScratchFile::new();
        let place = Place::new("city-1", "user-1", "Cozy loft");

        {
            let storage = FileStorage::open(&scratch.0).expect("open should work");
            storage.save_place(place.clone()).expect("save should work");
            storage.delete_place(&place.id).expect("delete should work");
        }

        let reopened = FileStorage::open(&scratch.0).expect("reopen should work");
        assert_eq!(reopened.get_place(&place.id), None);
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let scratch = ScratchFile::new();
        fs::write(&scratch.0, b"not json at all").expect("write should work");

        let error = FileStorage::open(&scratch.0).expect_err("open should fail");
        assert!(matches!(error, StoreError::Corrupt(_)));
    }
}
