//! Service configuration

pub mod loader;

pub use loader::{Settings, SettingsLoader, DEFAULT_CONFIG_FILE};
