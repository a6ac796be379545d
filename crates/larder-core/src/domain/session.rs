//! Authenticated session state
//!
//! A session is obtained through the email-code login flow and carries
//! the bearer token plus the family the device operates on. It is
//! persisted next to the configuration file so the CLI stays logged in
//! across invocations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::newtypes::FamilyId;

/// Credentials and scope of a logged-in device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token sent on every authenticated request
    pub auth_token: String,
    /// The family whose inventory this device synchronizes
    pub family_id: FamilyId,
    /// Email the session was issued to
    pub email: String,
}

impl Session {
    pub fn new(auth_token: impl Into<String>, family_id: FamilyId, email: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            family_id,
            email: email.into(),
        }
    }

    /// Load a persisted session from `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let session: Session = serde_yaml::from_str(&content)?;
        Ok(session)
    }

    /// Persist the session to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Remove the persisted session, if any. Logging out twice is fine.
    pub fn remove(path: &Path) -> anyhow::Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Platform-appropriate default path for the session file.
    ///
    /// Typically `$XDG_CONFIG_HOME/larder/session.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("larder")
            .join("session.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Session {
        Session::new(
            "tok-abc123",
            FamilyId::new("fam-1").unwrap(),
            "pat@example.com",
        )
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.yaml");

        let session = sample();
        session.save(&path).unwrap();

        let loaded = Session::load(&path).unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(Session::load(Path::new("/nonexistent/session.yaml")).is_err());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.yaml");

        sample().save(&path).unwrap();
        Session::remove(&path).unwrap();
        Session::remove(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_default_path_ends_with_session_yaml() {
        let p = Session::default_path();
        assert!(p.ends_with("larder/session.yaml"));
    }
}
