use crate::core::DemandEvent;
use crate::error::{Error, Result};
use crate::parsing::TimestampParser;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::info;

pub type UserId = String;

/// Event as submitted by a client. Coordinates stay decimal strings so no
/// precision is lost between upload and listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventUpload {
    pub timestamp: String,
    pub latitude: String,
    pub longitude: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: u64,
    pub user_id: UserId,
    pub timestamp: u64, // milliseconds since epoch
    pub latitude: String,
    pub longitude: String,
}

impl StoredEvent {
    /// Parses the stored coordinates. `None` if either is not a finite number.
    pub fn to_demand_event(&self) -> Option<DemandEvent> {
        let latitude = self.latitude.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
        let longitude = self.longitude.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
        Some(DemandEvent::new(self.timestamp, latitude, longitude))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreContents {
    events: HashMap<UserId, Vec<StoredEvent>>,
    next_id: u64,
}

/// Per-user event storage, optionally snapshotted to a bincode file.
pub struct EventStore {
    contents: RwLock<StoreContents>,
    snapshot_path: Option<PathBuf>,
    timestamps: TimestampParser,
}

impl EventStore {
    /// In-memory store with no snapshot file.
    pub fn new() -> Result<Self> {
        Ok(EventStore {
            contents: RwLock::new(StoreContents::default()),
            snapshot_path: None,
            timestamps: TimestampParser::new()?,
        })
    }

    /// Store backed by `path`: loads it if it exists, otherwise starts empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = if path.exists() {
            let contents = load_contents(path)?;
            info!(
                "Loaded {} users from event store snapshot {}",
                contents.events.len(),
                path.display()
            );
            contents
        } else {
            StoreContents::default()
        };

        Ok(EventStore {
            contents: RwLock::new(contents),
            snapshot_path: Some(path.to_path_buf()),
            timestamps: TimestampParser::new()?,
        })
    }

    /// Appends events for `user`. Every timestamp must parse, otherwise nothing
    /// is stored. Returns the number of events stored.
    pub fn upload(&self, user: &str, events: Vec<EventUpload>) -> Result<usize> {
        let mut parsed = Vec::with_capacity(events.len());
        for event in events {
            let timestamp = self.timestamps.parse_text(&event.timestamp).ok_or_else(|| {
                Error::Ingest(format!("Invalid timestamp: {}", event.timestamp))
            })?;
            parsed.push((timestamp, event));
        }

        let mut contents = self.write()?;
        let mut next_id = contents.next_id;
        let stored: Vec<StoredEvent> = parsed
            .into_iter()
            .map(|(timestamp, event)| {
                next_id += 1;
                StoredEvent {
                    id: next_id,
                    user_id: user.to_string(),
                    timestamp,
                    latitude: event.latitude,
                    longitude: event.longitude,
                }
            })
            .collect();
        contents.next_id = next_id;

        let count = stored.len();
        contents.events.entry(user.to_string()).or_default().extend(stored);
        Ok(count)
    }

    /// Events of `user` in upload order.
    pub fn list(&self, user: &str) -> Result<Vec<StoredEvent>> {
        let contents = self.read()?;
        Ok(contents.events.get(user).cloned().unwrap_or_default())
    }

    /// Removes every event of `user`, returning how many were removed.
    pub fn clear(&self, user: &str) -> Result<usize> {
        let mut contents = self.write()?;
        Ok(contents.events.remove(user).map_or(0, |events| events.len()))
    }

    /// Writes the snapshot file, if this store has one.
    pub fn persist(&self) -> Result<()> {
        match &self.snapshot_path {
            Some(path) => self.save_to_file(path),
            None => Ok(()),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = self.read()?;
        let encoded = bincode::serialize(&*contents)?;
        let mut file = File::create(path)?;
        file.write_all(&encoded)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        Ok(EventStore {
            contents: RwLock::new(load_contents(path)?),
            snapshot_path: None,
            timestamps: TimestampParser::new()?,
        })
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, StoreContents>> {
        self.contents.read().map_err(|_| Error::Store("event store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, StoreContents>> {
        self.contents.write().map_err(|_| Error::Store("event store lock poisoned".to_string()))
    }
}

fn load_contents(path: &Path) -> Result<StoreContents> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    Ok(bincode::deserialize(&buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(timestamp: &str, latitude: &str, longitude: &str) -> EventUpload {
        EventUpload {
            timestamp: timestamp.to_string(),
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
        }
    }

    #[test]
    fn test_upload_keeps_decimal_strings() {
        let store = EventStore::new().unwrap();
        let count = store
            .upload("alice", vec![upload("2024-01-01T10:00:00Z", "40.7128", "-74.0060")])
            .unwrap();
        assert_eq!(count, 1);

        let events = store.list("alice").unwrap();
        assert_eq!(events[0].latitude, "40.7128");
        assert_eq!(events[0].longitude, "-74.0060");
        assert_eq!(events[0].timestamp, 1_704_103_200_000);
    }

    #[test]
    fn test_bad_timestamp_rejects_whole_upload() {
        let store = EventStore::new().unwrap();
        let result = store.upload(
            "alice",
            vec![upload("2024-01-01T10:00:00Z", "1", "2"), upload("soon", "1", "2")],
        );

        assert!(matches!(result, Err(Error::Ingest(_))));
        assert!(store.list("alice").unwrap().is_empty());
    }

    #[test]
    fn test_ids_are_unique_across_users() {
        let store = EventStore::new().unwrap();
        store.upload("alice", vec![upload("2024-01-01T10:00:00Z", "1", "2")]).unwrap();
        store.upload("bob", vec![upload("2024-01-01T11:00:00Z", "3", "4")]).unwrap();

        let alice = store.list("alice").unwrap();
        let bob = store.list("bob").unwrap();
        assert_ne!(alice[0].id, bob[0].id);
    }

    #[test]
    fn test_to_demand_event() {
        let event = StoredEvent {
            id: 1,
            user_id: "alice".to_string(),
            timestamp: 5,
            latitude: "40.5".to_string(),
            longitude: "oops".to_string(),
        };
        assert!(event.to_demand_event().is_none());

        let event = StoredEvent { longitude: "-74.25".to_string(), ..event };
        assert_eq!(event.to_demand_event(), Some(DemandEvent::new(5, 40.5, -74.25)));
    }
}
