//! The user's collection of voice memos.
//!
//! [`Library`] is the in-memory list the UI renders, kept consistent with the
//! [`RecordingStore`] underneath: a recording appears in the list only after it
//! has been durably inserted, and leaves it only after it has been deleted.
//! Deleting a recording also removes any playback copy of it.

pub mod playback;
pub mod storage;

pub use playback::play;
pub use storage::{NewRecording, Recording, RecordingStore};

use crate::error::Result;
use anyhow::anyhow;
use std::path::PathBuf;

/// Ordered, store-backed list of recordings.
pub struct Library {
    store: RecordingStore,
    /// Oldest first, newest at the bottom
    recordings: Vec<Recording>,
    /// Private directory for clips handed to a player
    playback_dir: Option<PathBuf>,
}

impl Library {
    /// Loads every stored recording, oldest first.
    ///
    /// # Errors
    /// - If the store cannot be read
    pub fn load(mut store: RecordingStore) -> Result<Self> {
        let mut recordings = store.get_all()?;
        recordings.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        tracing::info!("Loaded {} recordings", recordings.len());
        Ok(Self {
            store,
            recordings,
            playback_dir: None,
        })
    }

    /// Sets where playback copies are written and cleaned up.
    pub fn with_playback_dir(mut self, dir: PathBuf) -> Self {
        self.playback_dir = Some(dir);
        self
    }

    pub fn recordings(&self) -> &[Recording] {
        &self.recordings
    }

    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Recording> {
        self.recordings.iter().find(|r| r.id == id)
    }

    /// Most recently captured recording.
    pub fn latest(&self) -> Option<&Recording> {
        self.recordings.last()
    }

    /// Persists a finished capture, then appends it to the list.
    ///
    /// # Errors
    /// - If the insert fails; the list is left unchanged
    pub fn save(&mut self, recording: NewRecording) -> Result<&Recording> {
        let id = self.store.insert(&recording).map_err(|e| {
            tracing::error!("Failed to save recording '{}': {}", recording.name, e);
            e
        })?;

        tracing::info!("Saved '{}' as #{}", recording.name, id);
        self.recordings.push(recording.with_id(id));
        Ok(&self.recordings[self.recordings.len() - 1])
    }

    /// Deletes a recording from the store, then from the list.
    ///
    /// Returns the removed entry, or `None` if the id was not in the list.
    ///
    /// # Errors
    /// - If the delete fails; the list is left unchanged
    pub fn remove(&mut self, id: i64) -> Result<Option<Recording>> {
        self.store.delete(id)?;

        let removed = self
            .recordings
            .iter()
            .position(|r| r.id == id)
            .map(|index| self.recordings.remove(index));

        if let Some(dir) = &self.playback_dir {
            if let Err(e) = playback::remove_clips(dir, id) {
                tracing::warn!("Failed to remove playback copy of #{}: {}", id, e);
            }
        }
        Ok(removed)
    }

    /// Plays `recording` through the private playback directory.
    ///
    /// # Errors
    /// - If no playback directory was set
    /// - If the clip cannot be written or the player fails
    pub fn play(&self, recording: &Recording, player: Option<&str>) -> anyhow::Result<()> {
        let dir = self
            .playback_dir
            .as_deref()
            .ok_or_else(|| anyhow!("No playback directory configured"))?;
        play(recording, player, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, TimeZone};
    use tempfile::TempDir;

    fn memo(name: &str, minutes: i64) -> NewRecording {
        NewRecording {
            name: name.to_string(),
            audio: vec![1, 2, 3],
            mime_type: "audio/wav".to_string(),
            created_at: Local.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    #[test]
    fn test_load_sorts_oldest_first() {
        let mut store = RecordingStore::open_in_memory();
        store.insert(&memo("late", 30)).unwrap();
        store.insert(&memo("early", 0)).unwrap();
        store.insert(&memo("middle", 10)).unwrap();

        let library = Library::load(store).unwrap();
        let names: Vec<&str> = library.recordings().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["early", "middle", "late"]);
        assert_eq!(library.latest().map(|r| r.name.as_str()), Some("late"));
    }

    #[test]
    fn test_save_appears_after_insert() {
        let mut library = Library::load(RecordingStore::open_in_memory()).unwrap();

        let id = library.save(memo("Recording A", 0)).unwrap().id;
        assert_eq!(library.len(), 1);
        assert_eq!(library.get(id).map(|r| r.name.as_str()), Some("Recording A"));
    }

    #[test]
    fn test_failed_save_leaves_list_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = RecordingStore::new(&dir.path().join("missing"));
        let mut library = Library {
            store,
            recordings: Vec::new(),
            playback_dir: None,
        };

        assert!(library.save(memo("phantom", 0)).is_err());
        assert!(library.is_empty());
    }

    #[test]
    fn test_remove_middle_of_three() {
        let dir = TempDir::new().unwrap();
        let mut library = Library::load(RecordingStore::new(dir.path())).unwrap();
        let a = library.save(memo("Recording A", 0)).unwrap().clone();
        let b = library.save(memo("Recording B", 1)).unwrap().clone();
        let c = library.save(memo("Recording C", 2)).unwrap().clone();

        let removed = library.remove(b.id).unwrap();
        assert_eq!(removed.as_ref(), Some(&b));
        assert_eq!(library.recordings(), [a.clone(), c.clone()]);

        let reloaded = Library::load(RecordingStore::new(dir.path())).unwrap();
        assert_eq!(reloaded.recordings(), [a, c]);
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let mut library = Library::load(RecordingStore::open_in_memory()).unwrap();
        let id = library.save(memo("once", 0)).unwrap().id;

        assert!(library.remove(id).unwrap().is_some());
        assert!(library.remove(id).unwrap().is_none());
        assert!(library.get(id).is_none());
    }

    #[test]
    fn test_remove_deletes_playback_copy() {
        let dir = TempDir::new().unwrap();
        let playback = playback::playback_dir(dir.path()).unwrap();
        let mut library = Library::load(RecordingStore::new(dir.path()))
            .unwrap()
            .with_playback_dir(playback.clone());

        let kept = library.save(memo("kept", 0)).unwrap().clone();
        let gone = library.save(memo("gone", 1)).unwrap().clone();
        let kept_path = playback::write_handoff_clip(&kept, &playback).unwrap();
        let gone_path = playback::write_handoff_clip(&gone, &playback).unwrap();

        library.remove(gone.id).unwrap();

        assert!(!gone_path.exists());
        assert!(kept_path.exists());
    }

    #[test]
    fn test_play_without_playback_dir_is_rejected() {
        let mut library = Library::load(RecordingStore::open_in_memory()).unwrap();
        let recording = library.save(memo("quiet", 0)).unwrap().clone();

        let err = library.play(&recording, Some("true")).unwrap_err();
        assert!(err.to_string().contains("playback directory"));
    }
}
