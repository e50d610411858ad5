//! Audio capture and the recording session lifecycle.
//!
//! `capture` defines the boundary a backend implements, `audio` is the cpal
//! microphone backend, `session` drives one capture at a time, and `recorder`
//! stores what a session produces.

pub mod audio;
pub mod capture;
#[cfg(test)]
pub(crate) mod fake;
pub mod recorder;
pub mod session;

pub use audio::CpalInput;
pub use capture::AudioInput;
pub use recorder::{Recorder, RecorderEvent};
pub use session::{SessionStatus, MAX_RECORDING_SECS};
