//! Config Entries
//!
//! A config entry represents one configured instance of an integration:
//! the connection data the user entered, the options they tuned, and the
//! lifecycle state of its setup.
//!
//! # Key Types
//!
//! - [`ConfigEntry`] - A single integration configuration
//! - [`ConfigEntryState`] - Lifecycle state of an entry

pub mod entry;

pub use entry::{ConfigEntry, ConfigEntrySource, ConfigEntryState};
