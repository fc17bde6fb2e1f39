//! UI layer: application shell and the backend bridge worker.

pub mod app;

pub use app::{PersistedSettings, StegoDropApp, SETTINGS_STORAGE_KEY};
