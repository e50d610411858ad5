//! murmur: a terminal voice memo recorder.

mod app;
mod commands;
mod config;
mod error;
mod library;
mod logging;
mod recording;
mod setup;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        tracing::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
