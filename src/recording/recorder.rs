//! Ties a recording session to the library.
//!
//! Every way a session ends goes through here: a manual stop and the
//! countdown's automatic stop both persist the clip before it shows up in the
//! list. The terminal never sees a clip that is not in the store.

use super::capture::AudioInput;
use super::session::{SessionController, SessionEvent, SessionStatus};
use crate::error::Result;
use crate::library::{Library, NewRecording, Recording};

/// Outcome of one [`Recorder::next_event`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// A chunk arrived or a countdown second passed.
    Progress,
    /// The capture backend stopped delivering chunks; the session is still open.
    InputClosed,
    /// The countdown ran out and the clip was stored under `id`.
    AutoSaved { id: i64 },
}

/// A [`SessionController`] together with the [`Library`] it saves into.
pub struct Recorder<I: AudioInput> {
    controller: SessionController<I>,
    library: Library,
}

impl<I: AudioInput> Recorder<I> {
    pub fn new(input: I, library: Library) -> Self {
        Self {
            controller: SessionController::new(input),
            library,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut Library {
        &mut self.library
    }

    pub fn is_recording(&self) -> bool {
        self.controller.is_recording()
    }

    pub fn status(&self) -> SessionStatus {
        self.controller.status()
    }

    /// Starts a new session.
    ///
    /// # Errors
    /// - `AlreadyRecording` or `CaptureUnavailable`, see [`SessionController::start`]
    pub fn start(&mut self) -> Result<()> {
        self.controller.start()
    }

    /// Stops the active session and stores the clip.
    ///
    /// Returns `Ok(None)` when idle.
    ///
    /// # Errors
    /// - If the clip cannot be assembled
    /// - `Persistence` if the insert fails; the session is idle either way
    pub fn stop_and_save(&mut self) -> Result<Option<&Recording>> {
        match self.controller.stop()? {
            Some(clip) => self.save(clip).map(Some),
            None => Ok(None),
        }
    }

    /// Waits for the next session event, storing the clip on automatic stop.
    ///
    /// Returns `Ok(None)` immediately when idle. Cancel-safe.
    ///
    /// # Errors
    /// - If the automatic stop fails to assemble or store the clip
    pub async fn next_event(&mut self) -> Result<Option<RecorderEvent>> {
        let event = match self.controller.next_event().await? {
            None => return Ok(None),
            Some(SessionEvent::Chunk { bytes }) => {
                tracing::trace!("Captured {} bytes", bytes);
                RecorderEvent::Progress
            }
            Some(SessionEvent::Tick { remaining_seconds }) => {
                tracing::trace!("{}s left", remaining_seconds);
                RecorderEvent::Progress
            }
            Some(SessionEvent::InputClosed) => RecorderEvent::InputClosed,
            Some(SessionEvent::AutoStopped(clip)) => {
                tracing::info!("Time limit reached");
                let id = self.save(clip)?.id;
                RecorderEvent::AutoSaved { id }
            }
        };
        Ok(Some(event))
    }

    fn save(&mut self, clip: NewRecording) -> Result<&Recording> {
        self.library.save(clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MurmurError;
    use crate::library::RecordingStore;
    use crate::recording::fake::FakeInput;
    use crate::recording::MAX_RECORDING_SECS;
    use tempfile::TempDir;

    fn recorder(input: &FakeInput) -> Recorder<FakeInput> {
        let library = Library::load(RecordingStore::open_in_memory()).unwrap();
        Recorder::new(input.clone(), library)
    }

    fn stored(dir: &TempDir) -> Vec<Recording> {
        RecordingStore::new(dir.path()).get_all().unwrap()
    }

    #[tokio::test]
    async fn test_manual_stop_persists_exactly_one_recording() {
        let dir = TempDir::new().unwrap();
        let input = FakeInput::default();
        let library = Library::load(RecordingStore::new(dir.path())).unwrap();
        let mut recorder = Recorder::new(input.clone(), library);

        recorder.start().unwrap();
        input.push(b"hello");
        let id = recorder.stop_and_save().unwrap().expect("saved").id;

        let rows = stored(&dir);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].audio, b"FAKEhello");
        assert_eq!(recorder.library().len(), 1);
        assert!(!recorder.is_recording());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_stop_persists_exactly_one_recording() {
        let dir = TempDir::new().unwrap();
        let input = FakeInput::default();
        let library = Library::load(RecordingStore::new(dir.path())).unwrap();
        let mut recorder = Recorder::new(input.clone(), library);

        recorder.start().unwrap();
        input.push(b"pcm");

        let began = tokio::time::Instant::now();
        let id = loop {
            match recorder.next_event().await.unwrap() {
                Some(RecorderEvent::AutoSaved { id }) => break id,
                Some(_) => {}
                None => panic!("session ended without saving"),
            }
        };
        assert_eq!(began.elapsed().as_secs(), MAX_RECORDING_SECS as u64);

        let rows = stored(&dir);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(input.stopped(), 1);

        assert!(recorder.stop_and_save().unwrap().is_none());
        assert!(recorder.next_event().await.unwrap().is_none());
        assert_eq!(stored(&dir).len(), 1);
    }

    #[tokio::test]
    async fn test_stop_while_idle_stores_nothing() {
        let dir = TempDir::new().unwrap();
        let input = FakeInput::default();
        let library = Library::load(RecordingStore::new(dir.path())).unwrap();
        let mut recorder = Recorder::new(input.clone(), library);

        assert!(recorder.stop_and_save().unwrap().is_none());
        assert!(recorder.stop_and_save().unwrap().is_none());
        assert!(stored(&dir).is_empty());
        assert_eq!(input.opened(), 0);
    }

    #[tokio::test]
    async fn test_failed_insert_releases_input_and_keeps_list() {
        let dir = TempDir::new().unwrap();
        let input = FakeInput::default();
        let library = Library::load(RecordingStore::new(dir.path())).unwrap();
        let mut recorder = Recorder::new(input.clone(), library);
        rusqlite::Connection::open(dir.path().join("recordings.db"))
            .unwrap()
            .execute("DROP TABLE recordings", [])
            .unwrap();

        recorder.start().unwrap();
        let err = recorder.stop_and_save().unwrap_err();

        assert!(matches!(err, MurmurError::Persistence(_)));
        assert!(!recorder.is_recording());
        assert_eq!(input.stopped(), 1);
        assert!(recorder.library().is_empty());
    }

    #[tokio::test]
    async fn test_remove_through_recorder_library() {
        let input = FakeInput::default();
        let mut recorder = recorder(&input);

        recorder.start().unwrap();
        let id = recorder.stop_and_save().unwrap().expect("saved").id;
        assert!(recorder.library_mut().remove(id).unwrap().is_some());
        assert!(recorder.library().is_empty());
    }
}
