//! livechannel: TV input channel store and synchroniser.
//!
//! Keeps the channel rows of each TV input source in a SQLite store in step
//! with the list of channels the source currently offers, and fetches channel
//! logos in the background.

use std::sync::Arc;

pub mod config;
pub mod database;
pub mod inputs;
pub mod logging;
pub mod logo_fetcher;
pub mod reconcile;
pub mod sync;

pub use livechannel_types as types;

/// Shared, lockable database connection.
pub type DatabaseHandle = Arc<tokio::sync::Mutex<database::Database>>;
