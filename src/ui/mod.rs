//! Terminal user interface.

pub mod error;
pub mod memos;

pub use error::show_fatal;
pub use memos::{MemoScreen, ScreenCommand};
