//! Booking persistence over a key/value storage collaborator.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::{Booking, StorageError};

/// Key/value storage in the shape of browser local storage.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Stores each key as `<key>.json` inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens the storage directory, creating it when missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        fs::write(self.path(key), value)?;
        Ok(())
    }
}

/// Append-only list of bookings, persisted as one JSON array under a
/// single storage key.
pub struct BookingStore<S> {
    storage: S,
    key: String,
}

impl<S: Storage> BookingStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        BookingStore {
            storage,
            key: key.into(),
        }
    }

    /// All bookings in insertion order.
    ///
    /// Absent, empty or unreadable content loads as an empty list.
    pub fn list(&self) -> Vec<Booking> {
        match self.storage.get(&self.key) {
            Ok(content) => self.parse(content),
            Err(error) => {
                tracing::warn!("Could not read bookings from '{}': {}", self.key, error);
                Vec::new()
            }
        }
    }

    pub fn last(&self) -> Option<Booking> {
        self.list().pop()
    }

    /// Appends `booking` to the stored list.
    ///
    /// A failed read is returned as an error and leaves the stored list
    /// untouched; corrupt content is replaced.
    pub fn append(&mut self, booking: Booking) -> Result<(), StorageError> {
        tracing::info!("Storing booking {} for {}", booking.id, booking.station_name);
        let mut bookings = self.parse(self.storage.get(&self.key)?);
        bookings.push(booking);
        self.storage.set(&self.key, serde_json::to_string(&bookings)?)
    }

    fn parse(&self, content: Option<String>) -> Vec<Booking> {
        let Some(content) = content.filter(|content| !content.trim().is_empty()) else {
            return Vec::new();
        };

        serde_json::from_str(&content).unwrap_or_else(|error| {
            tracing::warn!("Ignoring corrupt bookings under '{}': {}", self.key, error);
            Vec::new()
        })
    }
}
