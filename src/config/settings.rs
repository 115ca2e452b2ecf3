use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::{PayloadCodec, TextualEncoding};
use crate::crypto::FormatVersion;
use crate::engine::EngineConfig;
use crate::errors::{MeldSealError, Result};
use crate::session::{RememberLevel, SessionPasswordCache};

/// User configuration, loaded from `.meldseal.toml`.
///
/// Every field has a sensible default so MeldSeal works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Embedding used for new secrets: fenced, marker, secret, backtick, json.
    #[serde(default = "default_format")]
    pub default_format: String,

    /// Format version used for new secrets.
    #[serde(default = "default_format_version")]
    pub format_version: u32,

    /// Ask for the password twice when encrypting.
    #[serde(default = "default_true")]
    pub confirm_password: bool,

    /// Remember passwords for the rest of the session.
    #[serde(default = "default_true")]
    pub remember_password: bool,

    /// Minutes a remembered password stays valid (0 = until exit).
    #[serde(default = "default_remember_password_timeout")]
    pub remember_password_timeout: u64,

    /// How widely a remembered password is shared: vault, file, secret.
    #[serde(default = "default_remember_password_level")]
    pub remember_password_level: String,

    /// Minimum length of a new password.
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_format() -> String {
    TextualEncoding::CANONICAL.name().to_string()
}

fn default_format_version() -> u32 {
    FormatVersion::CURRENT.as_u32()
}

fn default_true() -> bool {
    true
}

fn default_remember_password_timeout() -> u64 {
    30
}

fn default_remember_password_level() -> String {
    "file".to_string()
}

fn default_min_password_len() -> usize {
    1
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            format_version: default_format_version(),
            confirm_password: default_true(),
            remember_password: default_true(),
            remember_password_timeout: default_remember_password_timeout(),
            remember_password_level: default_remember_password_level(),
            min_password_len: default_min_password_len(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for.
    pub const FILE_NAME: &'static str = ".meldseal.toml";

    /// Load settings from `<dir>/.meldseal.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed or holds invalid values,
    /// an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            MeldSealError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        tracing::debug!(path = %config_path.display(), "loaded settings");
        Ok(settings)
    }

    /// Check that every string/number field maps to a known value.
    pub fn validate(&self) -> Result<()> {
        self.format()?;
        self.version()?;
        self.remember_level()?;
        Ok(())
    }

    pub fn format(&self) -> Result<TextualEncoding> {
        self.default_format
            .parse::<TextualEncoding>()
            .map_err(|e| MeldSealError::ConfigError(e.to_string()))
    }

    pub fn version(&self) -> Result<FormatVersion> {
        FormatVersion::from_u32(self.format_version).ok_or_else(|| {
            MeldSealError::ConfigError(format!(
                "format_version {} is not supported",
                self.format_version
            ))
        })
    }

    pub fn remember_level(&self) -> Result<RememberLevel> {
        self.remember_password_level.parse()
    }

    /// Convert into the engine's explicit configuration.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        Ok(EngineConfig {
            version: self.version()?,
            ..EngineConfig::default()
        })
    }

    pub fn codec(&self) -> Result<PayloadCodec> {
        Ok(PayloadCodec::new(self.format()?))
    }

    /// The session cache these settings describe.
    pub fn password_cache(&self) -> SessionPasswordCache {
        if !self.remember_password {
            return SessionPasswordCache::disabled();
        }
        let timeout = match self.remember_password_timeout {
            0 => None,
            minutes => Some(Duration::from_secs(minutes.saturating_mul(60))),
        };
        SessionPasswordCache::new(timeout)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.default_format, "marker");
        assert_eq!(s.format_version, 2);
        assert!(s.confirm_password);
        assert!(s.remember_password);
        assert_eq!(s.remember_password_timeout, 30);
        assert_eq!(s.remember_level().unwrap(), RememberLevel::File);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.default_format, "marker");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
default_format = "fenced"
format_version = 1
confirm_password = false
remember_password = true
remember_password_timeout = 5
remember_password_level = "vault"
min_password_len = 12
"#;
        fs::write(tmp.path().join(".meldseal.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.format().unwrap(), TextualEncoding::FencedBlock);
        assert_eq!(settings.version().unwrap(), FormatVersion::V1);
        assert!(!settings.confirm_password);
        assert_eq!(settings.remember_password_timeout, 5);
        assert_eq!(settings.remember_level().unwrap(), RememberLevel::Vault);
        assert_eq!(settings.min_password_len, 12);
        assert_eq!(settings.engine_config().unwrap().version, FormatVersion::V1);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".meldseal.toml"), "confirm_password = false\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert!(!settings.confirm_password);
        assert_eq!(settings.default_format, "marker");
        assert_eq!(settings.remember_password_level, "file");
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".meldseal.toml"), "not valid {{toml").unwrap();
        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn load_errors_on_unknown_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".meldseal.toml"), "format_version = 7\n").unwrap();
        assert!(matches!(
            Settings::load(tmp.path()),
            Err(MeldSealError::ConfigError(_))
        ));

        fs::write(tmp.path().join(".meldseal.toml"), "default_format = \"yaml\"\n").unwrap();
        assert!(matches!(
            Settings::load(tmp.path()),
            Err(MeldSealError::ConfigError(_))
        ));
    }
}
