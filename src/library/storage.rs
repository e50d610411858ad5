//! Recording storage and retrieval using SQLite.
//!
//! One table keyed by an auto-incrementing integer id. Rows are write-once:
//! there is no update path, only insert and delete.

use crate::error::{MurmurError, Result};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "recordings.db";

/// A persisted voice memo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    /// Assigned by the store on insert, never reused
    pub id: i64,
    /// Label generated at capture time
    pub name: String,
    /// Encoded audio in the capture backend's container
    pub audio: Vec<u8>,
    /// Media type of `audio`, e.g. `audio/wav`
    pub mime_type: String,
    /// When the capture was finalized
    pub created_at: DateTime<Local>,
}

/// A finished capture that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecording {
    pub name: String,
    pub audio: Vec<u8>,
    pub mime_type: String,
    pub created_at: DateTime<Local>,
}

impl NewRecording {
    /// Attaches the id the store assigned.
    pub fn with_id(self, id: i64) -> Recording {
        Recording {
            id,
            name: self.name,
            audio: self.audio,
            mime_type: self.mime_type,
            created_at: self.created_at,
        }
    }
}

/// Where the store keeps its data.
enum Location {
    File(PathBuf),
    Memory,
}

/// Manages the recordings database.
pub struct RecordingStore {
    location: Location,
    /// Connection to the database (lazy-loaded)
    connection: Option<Connection>,
}

impl RecordingStore {
    /// Creates a store backed by `recordings.db` in the given data directory.
    ///
    /// Nothing is opened until the first operation.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            location: Location::File(data_dir.join(DATABASE_FILE)),
            connection: None,
        }
    }

    /// Creates a store that lives only as long as this value.
    pub fn open_in_memory() -> Self {
        Self {
            location: Location::Memory,
            connection: None,
        }
    }

    /// Opens the database on first use and makes sure the schema exists.
    ///
    /// # Errors
    /// - If the database file cannot be opened
    /// - If table creation fails
    fn get_connection(&mut self) -> Result<&Connection> {
        let connection = match self.connection.take() {
            Some(connection) => connection,
            None => self.open()?,
        };
        let connection: &Connection = self.connection.insert(connection);
        Ok(connection)
    }

    fn open(&self) -> Result<Connection> {
        let connection = match &self.location {
            Location::File(path) => {
                tracing::debug!("Opening recording store at {}", path.display());
                Connection::open(path)?
            }
            Location::Memory => Connection::open_in_memory()?,
        };

        connection.execute(
            "CREATE TABLE IF NOT EXISTS recordings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                audio BLOB NOT NULL,
                mime_type TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(connection)
    }

    /// Persists a recording and returns the id assigned to it.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If insertion fails (disk full, read-only file)
    pub fn insert(&mut self, recording: &NewRecording) -> Result<i64> {
        let connection = self.get_connection()?;

        connection.execute(
            "INSERT INTO recordings (name, audio, mime_type, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                recording.name,
                recording.audio,
                recording.mime_type,
                recording.created_at.to_rfc3339()
            ],
        )?;
        let id = connection.last_insert_rowid();

        tracing::debug!("Recording #{} saved ({} bytes)", id, recording.audio.len());
        Ok(id)
    }

    /// Retrieves every stored recording.
    ///
    /// No particular order is promised; callers sort as they need.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If query execution fails
    /// - If a stored timestamp cannot be parsed
    pub fn get_all(&mut self) -> Result<Vec<Recording>> {
        let connection = self.get_connection()?;

        let mut statement =
            connection.prepare("SELECT id, name, audio, mime_type, created_at FROM recordings")?;
        let rows = statement
            .query_map([], RawRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawRow::decode).collect()
    }

    /// Removes a recording. Returns whether a row was actually deleted.
    ///
    /// Deleting an id that does not exist is not an error.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If the delete statement fails
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let connection = self.get_connection()?;
        let removed = connection.execute("DELETE FROM recordings WHERE id = ?1", params![id])?;

        if removed == 0 {
            tracing::debug!("Delete of recording #{} was a no-op", id);
        } else {
            tracing::info!("Recording #{} deleted", id);
        }
        Ok(removed > 0)
    }
}

/// Row as it comes out of SQLite, before the timestamp is parsed.
struct RawRow {
    id: i64,
    name: String,
    audio: Vec<u8>,
    mime_type: String,
    created_at: String,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            audio: row.get(2)?,
            mime_type: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn decode(self) -> Result<Recording> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Local))
            .map_err(|e| MurmurError::CorruptRecord {
                id: self.id,
                reason: format!("invalid timestamp '{}': {e}", self.created_at),
            })?;

        Ok(Recording {
            id: self.id,
            name: self.name,
            audio: self.audio,
            mime_type: self.mime_type,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sample(name: &str) -> NewRecording {
        NewRecording {
            name: name.to_string(),
            audio: name.as_bytes().to_vec(),
            mime_type: "audio/wav".to_string(),
            created_at: Local.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_insert_then_get_all_round_trips_fields() {
        let mut store = RecordingStore::open_in_memory();
        let recording = sample("Recording A");

        let id = store.insert(&recording).unwrap();
        let all = store.get_all().unwrap();

        assert_eq!(all, vec![recording.with_id(id)]);
    }

    #[test]
    fn test_delete_twice_is_idempotent() {
        let mut store = RecordingStore::open_in_memory();
        let id = store.insert(&sample("Recording A")).unwrap();

        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
        assert!(store.get_all().unwrap().iter().all(|r| r.id != id));
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let mut store = RecordingStore::open_in_memory();
        assert!(!store.delete(42).unwrap());
    }

    #[test]
    fn test_delete_middle_of_three() {
        let mut store = RecordingStore::open_in_memory();
        let a = sample("Recording A");
        let b = sample("Recording B");
        let c = sample("Recording C");
        let id_a = store.insert(&a).unwrap();
        let id_b = store.insert(&b).unwrap();
        let id_c = store.insert(&c).unwrap();

        store.delete(id_b).unwrap();

        let mut remaining = store.get_all().unwrap();
        remaining.sort_by_key(|r| r.id);
        assert_eq!(remaining, vec![a.with_id(id_a), c.with_id(id_c)]);
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut store = RecordingStore::open_in_memory();
        let first = store.insert(&sample("one")).unwrap();
        let second = store.insert(&sample("two")).unwrap();
        store.delete(second).unwrap();

        let third = store.insert(&sample("three")).unwrap();
        assert!(third > second);
        assert!(second > first);
    }

    #[test]
    fn test_reopen_keeps_schema_and_rows() {
        let dir = TempDir::new().unwrap();
        let id = {
            let mut store = RecordingStore::new(dir.path());
            store.insert(&sample("durable")).unwrap()
        };

        let mut reopened = RecordingStore::new(dir.path());
        let found = reopened.get_all().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].id, found[0].name.as_str()), (id, "durable"));

        let next = reopened.insert(&sample("after reopen")).unwrap();
        assert!(next > id);
        assert_eq!(reopened.get_all().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_directory_is_persistence_failure() {
        let dir = TempDir::new().unwrap();
        let mut store = RecordingStore::new(&dir.path().join("does/not/exist"));

        let err = store.insert(&sample("lost")).unwrap_err();
        assert!(matches!(err, MurmurError::Persistence(_)));
    }

    #[test]
    fn test_corrupt_timestamp_is_reported() {
        let mut store = RecordingStore::open_in_memory();
        let id = store.insert(&sample("bad")).unwrap();
        store
            .get_connection()
            .unwrap()
            .execute(
                "UPDATE recordings SET created_at = 'yesterday' WHERE id = ?1",
                params![id],
            )
            .unwrap();

        let err = store.get_all().unwrap_err();
        assert!(matches!(err, MurmurError::CorruptRecord { id: bad, .. } if bad == id));
    }
}
