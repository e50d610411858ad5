//! Recording session lifecycle.
//!
//! A [`SessionController`] owns at most one active capture. `start` and `stop`
//! are the only operations that change its state; [`SessionController::next_event`]
//! pumps chunk delivery and the countdown, and performs the automatic stop when
//! the countdown reaches zero.

use super::capture::{AudioInput, Chunk, InputStream};
use crate::error::{MurmurError, Result};
use crate::library::NewRecording;
use chrono::{DateTime, Local};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::{interval_at, Instant, Interval};

/// Hard ceiling on a single recording, in seconds.
pub const MAX_RECORDING_SECS: u32 = 180;

const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// Something that happened while a session was recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A chunk of `bytes` length was appended to the session.
    Chunk { bytes: usize },
    /// One countdown second elapsed.
    Tick { remaining_seconds: u32 },
    /// The capture backend stopped delivering chunks; the session is still open.
    InputClosed,
    /// The countdown reached zero and the session was finalized.
    AutoStopped(NewRecording),
}

/// Read-only view of the controller for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub recording: bool,
    pub remaining_seconds: u32,
    pub captured_bytes: usize,
}

enum SessionState {
    Idle,
    Recording(ActiveSession),
}

struct ActiveSession {
    remaining_seconds: u32,
    chunks: Vec<Chunk>,
    receiver: UnboundedReceiver<Chunk>,
    input_open: bool,
    stream: Box<dyn InputStream>,
    countdown: Interval,
}

impl ActiveSession {
    fn captured_bytes(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Releases the input, unsubscribes from chunks, cancels the countdown,
    /// and assembles the finished clip.
    fn finish(mut self) -> Result<NewRecording> {
        self.stream.stop();

        while let Ok(chunk) = self.receiver.try_recv() {
            self.chunks.push(chunk);
        }

        let ActiveSession {
            chunks,
            receiver,
            stream,
            countdown,
            ..
        } = self;
        drop(receiver);
        drop(countdown);

        let raw = chunks.concat();
        let created_at = Local::now();
        let audio = stream.assemble(&raw)?;

        tracing::info!(
            "Recording finalized: {} raw bytes, {} byte {} payload",
            raw.len(),
            audio.len(),
            stream.mime_type()
        );

        Ok(NewRecording {
            name: recording_name(&created_at),
            audio,
            mime_type: stream.mime_type().to_string(),
            created_at,
        })
    }
}

/// Drives a single capture session at a time against an [`AudioInput`].
pub struct SessionController<I: AudioInput> {
    input: I,
    state: SessionState,
}

impl<I: AudioInput> SessionController<I> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            state: SessionState::Idle,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, SessionState::Recording(_))
    }

    pub fn status(&self) -> SessionStatus {
        match &self.state {
            SessionState::Idle => SessionStatus {
                recording: false,
                remaining_seconds: MAX_RECORDING_SECS,
                captured_bytes: 0,
            },
            SessionState::Recording(session) => SessionStatus {
                recording: true,
                remaining_seconds: session.remaining_seconds,
                captured_bytes: session.captured_bytes(),
            },
        }
    }

    /// Opens the input and begins a new session.
    ///
    /// Must be called from within a tokio runtime; the countdown lives on its timer.
    ///
    /// # Errors
    /// - `AlreadyRecording` if a session is active (the active session is untouched)
    /// - `CaptureUnavailable` if the microphone cannot be opened (state stays idle)
    pub fn start(&mut self) -> Result<()> {
        if self.is_recording() {
            tracing::warn!("Ignoring start: a session is already recording");
            return Err(MurmurError::AlreadyRecording);
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        let stream = self.input.open(sender).map_err(|e| {
            tracing::error!("Failed to open audio input: {}", e);
            match e {
                MurmurError::CaptureUnavailable(_) => e,
                other => MurmurError::CaptureUnavailable(other.to_string()),
            }
        })?;

        let countdown = interval_at(Instant::now() + COUNTDOWN_PERIOD, COUNTDOWN_PERIOD);

        self.state = SessionState::Recording(ActiveSession {
            remaining_seconds: MAX_RECORDING_SECS,
            chunks: Vec::new(),
            receiver,
            input_open: true,
            stream,
            countdown,
        });

        tracing::info!("Recording started ({}s limit)", MAX_RECORDING_SECS);
        Ok(())
    }

    /// Finalizes the active session, if any.
    ///
    /// Calling this while idle is a no-op that returns `Ok(None)`. On every
    /// path out of a session the state is idle again and the input is released,
    /// even when assembling the clip fails.
    pub fn stop(&mut self) -> Result<Option<NewRecording>> {
        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Idle => {
                tracing::debug!("Stop requested while idle");
                Ok(None)
            }
            SessionState::Recording(session) => session.finish().map(Some),
        }
    }

    /// Waits for the next chunk or countdown tick of the active session.
    ///
    /// Returns `Ok(None)` immediately when idle. Cancel-safe, so it can sit in a
    /// `tokio::select!` next to input polling. When the countdown reaches zero
    /// this calls [`SessionController::stop`] itself and yields
    /// [`SessionEvent::AutoStopped`].
    pub async fn next_event(&mut self) -> Result<Option<SessionEvent>> {
        let SessionState::Recording(session) = &mut self.state else {
            return Ok(None);
        };

        let remaining_seconds = tokio::select! {
            chunk = session.receiver.recv(), if session.input_open => {
                return Ok(Some(match chunk {
                    Some(chunk) => {
                        let bytes = chunk.len();
                        session.chunks.push(chunk);
                        SessionEvent::Chunk { bytes }
                    }
                    None => {
                        session.input_open = false;
                        tracing::warn!("Capture input closed before the session stopped");
                        SessionEvent::InputClosed
                    }
                }));
            }
            _ = session.countdown.tick() => {
                session.remaining_seconds = session.remaining_seconds.saturating_sub(1);
                session.remaining_seconds
            }
        };

        if remaining_seconds > 0 {
            return Ok(Some(SessionEvent::Tick { remaining_seconds }));
        }

        tracing::info!("Countdown reached zero, stopping automatically");
        Ok(self.stop()?.map(SessionEvent::AutoStopped))
    }
}

impl<I: AudioInput> Drop for SessionController<I> {
    fn drop(&mut self) {
        if let SessionState::Recording(session) = &mut self.state {
            tracing::warn!("Controller dropped mid-session; releasing input without saving");
            session.stream.stop();
        }
    }
}

/// Label given to a clip at capture time, e.g. `Recording 10/18/2026, 3:04:05 PM`.
pub fn recording_name(created_at: &DateTime<Local>) -> String {
    format!("Recording {}", created_at.format("%-m/%-d/%Y, %-I:%M:%S %p"))
}
