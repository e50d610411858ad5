//! In-process capture backend for tests.
//!
//! Chunks are pushed by hand with [`FakeInput::push`]; the stream records how
//! often it was opened and stopped.

use super::capture::{AudioInput, Chunk, InputStream};
use crate::error::{MurmurError, Result};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Default)]
struct FakeState {
    sender: Option<UnboundedSender<Chunk>>,
    opened: usize,
    stopped: usize,
    deny: bool,
}

#[derive(Clone, Default)]
pub(crate) struct FakeInput(Arc<Mutex<FakeState>>);

impl FakeInput {
    pub(crate) fn denied() -> Self {
        let input = Self::default();
        input.0.lock().unwrap().deny = true;
        input
    }

    pub(crate) fn push(&self, bytes: &[u8]) -> bool {
        let state = self.0.lock().unwrap();
        state
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(bytes.to_vec()).is_ok())
    }

    pub(crate) fn close_input(&self) {
        self.0.lock().unwrap().sender = None;
    }

    pub(crate) fn opened(&self) -> usize {
        self.0.lock().unwrap().opened
    }

    pub(crate) fn stopped(&self) -> usize {
        self.0.lock().unwrap().stopped
    }
}

impl AudioInput for FakeInput {
    fn open(&mut self, chunks: UnboundedSender<Chunk>) -> Result<Box<dyn InputStream>> {
        let mut state = self.0.lock().unwrap();
        if state.deny {
            return Err(MurmurError::CaptureUnavailable("permission denied".to_string()));
        }
        state.opened += 1;
        state.sender = Some(chunks);
        Ok(Box::new(FakeStream {
            state: Arc::clone(&self.0),
            live: true,
        }))
    }
}

struct FakeStream {
    state: Arc<Mutex<FakeState>>,
    live: bool,
}

impl InputStream for FakeStream {
    fn stop(&mut self) {
        if self.live {
            self.live = false;
            let mut state = self.state.lock().unwrap();
            state.stopped += 1;
            state.sender = None;
        }
    }

    fn assemble(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let mut payload = b"FAKE".to_vec();
        payload.extend_from_slice(raw);
        Ok(payload)
    }

    fn mime_type(&self) -> &'static str {
        "audio/x-fake"
    }
}
