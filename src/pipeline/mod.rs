pub mod config;
pub mod events;
pub mod processor;
pub mod progress;
pub mod snapshot;
