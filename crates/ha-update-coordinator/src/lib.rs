//! Data update coordinator
//!
//! Integrations that poll a remote API share one coordinator per config
//! entry. The coordinator owns the fetch schedule, keeps the latest
//! snapshot as an immutable `Arc<T>` that is replaced wholesale on every
//! successful refresh, and notifies subscribers after each attempt.
//! Entities read the snapshot on demand instead of caching it.

mod coordinator;
mod debounce;
mod error;

pub use coordinator::{DataUpdateCoordinator, UpdateMethod, REQUEST_REFRESH_DEFAULT_COOLDOWN};
pub use error::{ConfigEntryNotReady, UpdateFailed};
