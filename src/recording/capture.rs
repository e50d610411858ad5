//! Boundary between the session controller and whatever produces audio.
//!
//! The controller never picks an encoding. A backend opens a live input, pushes
//! raw chunks into the channel it is handed, and on request wraps the
//! concatenated chunks in its own container format.

use crate::error::Result;
use tokio::sync::mpsc::UnboundedSender;

/// A binary chunk delivered by the capture backend while a session is active.
pub type Chunk = Vec<u8>;

/// Source of live audio input handles.
pub trait AudioInput {
    /// Acquires the input device and starts pushing chunks into `chunks`.
    ///
    /// Chunk delivery is a push from the backend's own thread; the returned
    /// stream must keep delivering until [`InputStream::stop`] is called.
    ///
    /// # Errors
    /// - `CaptureUnavailable` if access is denied or no device exists
    fn open(&mut self, chunks: UnboundedSender<Chunk>) -> Result<Box<dyn InputStream>>;
}

/// A live input handle exclusively owned by one recording session.
pub trait InputStream {
    /// Stops capture and releases the underlying hardware handle.
    ///
    /// Must be synchronous and safe to call more than once.
    fn stop(&mut self);

    /// Wraps the concatenated raw chunks in the backend's container.
    fn assemble(&self, raw: &[u8]) -> Result<Vec<u8>>;

    /// Media type of the payload produced by [`InputStream::assemble`].
    fn mime_type(&self) -> &'static str;
}
