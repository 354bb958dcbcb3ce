//! VAPID configuration loading.
//!
//! Reads the sender identity from a JSON file or from `VAPID_*` environment
//! variables. The file is written by `vapid-push keygen`; it holds the
//! private key, so [`VapidConfig::save`] restricts it to the owner on Unix.

use serde::{Deserialize, Serialize};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::{fs, path::Path};

use crate::keys::{VapidIdentity, VapidKeys};
use crate::{Result, WebPushError};

/// Environment variable holding the contact subject.
pub const ENV_SUBJECT: &str = "VAPID_SUBJECT";
/// Environment variable holding the base64url public key.
pub const ENV_PUBLIC_KEY: &str = "VAPID_PUBLIC_KEY";
/// Environment variable holding the base64url private key.
pub const ENV_PRIVATE_KEY: &str = "VAPID_PRIVATE_KEY";

/// Serialized VAPID identity.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VapidConfig {
    /// Contact URI, e.g. `mailto:ops@example.com`.
    pub subject: String,
    /// Uncompressed P-256 public key (base64url).
    pub public_key: String,
    /// Raw P-256 private scalar (base64url).
    pub private_key: String,
}

impl std::fmt::Debug for VapidConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapidConfig")
            .field("subject", &self.subject)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl VapidConfig {
    /// Generate a new key pair for `subject`.
    pub fn generate(subject: &str) -> Self {
        let keys = VapidKeys::generate();
        Self {
            subject: subject.to_string(),
            public_key: keys.public_key_base64url(),
            private_key: keys.private_key_base64url().to_string(),
        }
    }

    /// Read from `VAPID_SUBJECT`, `VAPID_PUBLIC_KEY` and `VAPID_PRIVATE_KEY`.
    ///
    /// Returns `Ok(None)` when none are set, and an error when only some are.
    pub fn from_env() -> Result<Option<Self>> {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        match (read(ENV_SUBJECT), read(ENV_PUBLIC_KEY), read(ENV_PRIVATE_KEY)) {
            (Some(subject), Some(public_key), Some(private_key)) => Ok(Some(Self {
                subject,
                public_key,
                private_key,
            })),
            (None, None, None) => Ok(None),
            _ => Err(WebPushError::Config(format!(
                "{ENV_SUBJECT}, {ENV_PUBLIC_KEY} and {ENV_PRIVATE_KEY} must all be set"
            ))),
        }
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save as pretty JSON with owner-only permissions.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;

        #[cfg(unix)]
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

        Ok(())
    }

    /// Validate the key pair and build a signing identity.
    pub fn into_identity(self) -> Result<VapidIdentity> {
        VapidIdentity::new(&self.subject, &self.public_key, &self.private_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn clear_env() {
        for name in [ENV_SUBJECT, ENV_PUBLIC_KEY, ENV_PRIVATE_KEY] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_generate_produces_valid_identity() {
        let config = VapidConfig::generate("mailto:a@b.com");
        let identity = config.clone().into_identity().unwrap();
        assert_eq!(identity.subject(), "mailto:a@b.com");
        assert_eq!(identity.public_key(), config.public_key);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vapid.json");

        let config = VapidConfig::generate("mailto:a@b.com");
        config.save(&path).unwrap();
        let loaded = VapidConfig::load(&path).unwrap();
        assert_eq!(config, loaded);

        #[cfg(unix)]
        {
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            VapidConfig::load(&dir.path().join("absent.json")),
            Err(WebPushError::Io(_))
        ));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vapid.json");
        fs::write(&path, "{\"subject\":").unwrap();
        assert!(matches!(VapidConfig::load(&path), Err(WebPushError::Json(_))));
    }

    #[test]
    fn test_into_identity_rejects_tampered_key() {
        let mut config = VapidConfig::generate("mailto:a@b.com");
        config.public_key = VapidConfig::generate("mailto:a@b.com").public_key;
        assert!(matches!(
            config.into_identity(),
            Err(WebPushError::KeyMismatch)
        ));
    }

    #[test]
    fn test_debug_hides_private_key() {
        let config = VapidConfig::generate("mailto:a@b.com");
        assert!(!format!("{config:?}").contains(&config.private_key));
    }

    #[test]
    fn test_from_env() {
        clear_env();
        assert!(VapidConfig::from_env().unwrap().is_none());

        let config = VapidConfig::generate("mailto:a@b.com");
        std::env::set_var(ENV_SUBJECT, format!("  {}\n", config.subject));
        std::env::set_var(ENV_PUBLIC_KEY, &config.public_key);
        std::env::set_var(ENV_PRIVATE_KEY, &config.private_key);
        let loaded = VapidConfig::from_env().unwrap().unwrap();
        assert_eq!(loaded, config);

        std::env::set_var(ENV_PRIVATE_KEY, "");
        assert!(matches!(VapidConfig::from_env(), Err(WebPushError::Config(_))));
        clear_env();
    }
}
