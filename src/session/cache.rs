//! Remembered passwords, scoped and time-limited.
//!
//! A password is remembered under a [`PasswordScope`].  The configured
//! [`RememberLevel`] decides how wide that scope is: one password for
//! everything, one per file, or one per secret.  A scope never sees a
//! password stored under a different scope.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use zeroize::Zeroizing;

use crate::errors::{MeldSealError, Result};

/// How widely a remembered password is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RememberLevel {
    /// One password for every secret in every file.
    Vault,
    /// One password per file.
    File,
    /// One password per secret.
    Secret,
}

impl fmt::Display for RememberLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vault => "vault",
            Self::File => "file",
            Self::Secret => "secret",
        })
    }
}

impl FromStr for RememberLevel {
    type Err = MeldSealError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "vault" => Ok(Self::Vault),
            "file" => Ok(Self::File),
            "secret" => Ok(Self::Secret),
            other => Err(MeldSealError::ConfigError(format!(
                "unknown remember level '{other}'; supported: vault, file, secret"
            ))),
        }
    }
}

/// Key under which a password is remembered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PasswordScope {
    Vault,
    File(PathBuf),
    Secret { file: PathBuf, id: String },
}

impl PasswordScope {
    /// The scope a secret falls into under `level`.
    ///
    /// `secret_id` must identify the secret within its file; the encoded
    /// ciphertext works since it is unique per encryption.
    pub fn for_secret(level: RememberLevel, file: &Path, secret_id: &str) -> Self {
        match level {
            RememberLevel::Vault => Self::Vault,
            RememberLevel::File => Self::File(file.to_path_buf()),
            RememberLevel::Secret => Self::Secret {
                file: file.to_path_buf(),
                id: secret_id.to_string(),
            },
        }
    }
}

/// Storage contract for remembered passwords.
///
/// Implementations keep at most one password per scope and must not hand
/// out a password after it expired.
pub trait PasswordCache {
    fn get(&self, scope: &PasswordScope) -> Option<Zeroizing<String>>;
    fn put(&self, scope: PasswordScope, password: &str);
    fn forget(&self, scope: &PasswordScope);
    fn clear(&self);
}

struct Entry {
    password: Zeroizing<String>,
    stored_at: Instant,
}

/// In-memory password cache that lives as long as the process.
///
/// `timeout == None` keeps passwords until the process exits.
pub struct SessionPasswordCache {
    enabled: bool,
    timeout: Option<Duration>,
    entries: Mutex<HashMap<PasswordScope, Entry>>,
}

impl SessionPasswordCache {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            enabled: true,
            timeout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A cache that never remembers anything.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            timeout: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        self.timeout
            .is_some_and(|timeout| entry.stored_at.elapsed() >= timeout)
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<PasswordScope, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PasswordCache for SessionPasswordCache {
    fn get(&self, scope: &PasswordScope) -> Option<Zeroizing<String>> {
        let mut entries = self.entries();
        match entries.get(scope) {
            Some(entry) if self.is_expired(entry) => {
                entries.remove(scope);
                tracing::debug!(?scope, "remembered password expired");
                None
            }
            Some(entry) => Some(entry.password.clone()),
            None => None,
        }
    }

    fn put(&self, scope: PasswordScope, password: &str) {
        if !self.enabled {
            return;
        }
        let mut entries = self.entries();
        entries.retain(|_, entry| !self.is_expired(entry));
        entries.insert(
            scope,
            Entry {
                password: Zeroizing::new(password.to_string()),
                stored_at: Instant::now(),
            },
        );
    }

    fn forget(&self, scope: &PasswordScope) {
        self.entries().remove(scope);
    }

    fn clear(&self) {
        self.entries().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_scope(name: &str) -> PasswordScope {
        PasswordScope::for_secret(RememberLevel::File, Path::new(name), "id")
    }

    #[test]
    fn remembers_per_scope() {
        let cache = SessionPasswordCache::new(None);
        cache.put(file_scope("a.md"), "alpha");

        assert_eq!(cache.get(&file_scope("a.md")).unwrap().as_str(), "alpha");
        assert!(cache.get(&file_scope("b.md")).is_none());
    }

    #[test]
    fn secret_level_does_not_leak_between_secrets() {
        let one = PasswordScope::for_secret(RememberLevel::Secret, Path::new("a.md"), "one");
        let two = PasswordScope::for_secret(RememberLevel::Secret, Path::new("a.md"), "two");
        let cache = SessionPasswordCache::new(None);
        cache.put(one.clone(), "pw");

        assert!(cache.get(&one).is_some());
        assert!(cache.get(&two).is_none());
    }

    #[test]
    fn vault_level_is_shared_across_files() {
        let a = PasswordScope::for_secret(RememberLevel::Vault, Path::new("a.md"), "1");
        let b = PasswordScope::for_secret(RememberLevel::Vault, Path::new("b.md"), "2");
        assert_eq!(a, b);
    }

    #[test]
    fn one_value_per_scope() {
        let cache = SessionPasswordCache::new(None);
        cache.put(PasswordScope::Vault, "first");
        cache.put(PasswordScope::Vault, "second");
        assert_eq!(cache.get(&PasswordScope::Vault).unwrap().as_str(), "second");
    }

    #[test]
    fn entries_expire() {
        let cache = SessionPasswordCache::new(Some(Duration::from_millis(20)));
        cache.put(PasswordScope::Vault, "short-lived");
        assert!(cache.get(&PasswordScope::Vault).is_some());

        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get(&PasswordScope::Vault).is_none());
    }

    #[test]
    fn put_drops_expired_entries_of_other_scopes() {
        let cache = SessionPasswordCache::new(Some(Duration::from_millis(20)));
        cache.put(file_scope("a.md"), "old");
        cache.put(file_scope("b.md"), "old");

        std::thread::sleep(Duration::from_millis(40));
        cache.put(file_scope("c.md"), "new");

        let entries = cache.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key(&file_scope("c.md")));
    }

    #[test]
    fn disabled_cache_remembers_nothing() {
        let cache = SessionPasswordCache::disabled();
        cache.put(PasswordScope::Vault, "pw");
        assert!(cache.get(&PasswordScope::Vault).is_none());
    }

    #[test]
    fn forget_and_clear() {
        let cache = SessionPasswordCache::new(None);
        cache.put(PasswordScope::Vault, "pw");
        cache.put(file_scope("a.md"), "pw2");

        cache.forget(&PasswordScope::Vault);
        assert!(cache.get(&PasswordScope::Vault).is_none());
        assert!(cache.get(&file_scope("a.md")).is_some());

        cache.clear();
        assert!(cache.get(&file_scope("a.md")).is_none());
    }

    #[test]
    fn level_names_parse() {
        assert_eq!("Vault".parse::<RememberLevel>().unwrap(), RememberLevel::Vault);
        assert_eq!("file".parse::<RememberLevel>().unwrap(), RememberLevel::File);
        assert!("folder".parse::<RememberLevel>().is_err());
    }
}
