//! Configuration loaded from `.meldseal.toml`.

pub mod settings;

pub use settings::Settings;
