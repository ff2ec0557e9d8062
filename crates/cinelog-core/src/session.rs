//! Login session persisted in the data directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cinelog_api::store::{LocalUserStore, NewUser, User};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AuthError;
use crate::reviews::DEFAULT_AUTHOR;

/// Session file name inside the data directory.
const SESSION_FILE_NAME: &str = "session.json";

/// The logged-in user, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Current user. `None` when logged out.
    #[serde(default)]
    pub user: Option<User>,
}

impl Session {
    /// Creates a session for `user`.
    #[must_use]
    pub const fn logged_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    /// Returns the name reviews are signed with.
    #[must_use]
    pub fn author_name(&self) -> &str {
        self.user.as_ref().map_or(DEFAULT_AUTHOR, |u| u.name.as_str())
    }
}

/// JSON file holding the [`Session`].
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    /// Locates `session.json` in `data_dir`.
    #[must_use]
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE_NAME),
        }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the session. A missing file is a logged-out session.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Session> {
        if !self.path.exists() {
            return Ok(Session::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    /// Writes the session, creating the data directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content =
            serde_json::to_string_pretty(session).context("failed to serialize session")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Removes the session file. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to remove {}", self.path.display())),
        }
    }
}

/// Looks up the user matching `email` and `password`.
///
/// # Errors
///
/// Returns [`AuthError::InvalidCredentials`] when nothing matches, or
/// [`AuthError::StoreOperationFailed`] if the store request fails.
#[instrument(skip_all)]
pub async fn login(
    users: &(impl LocalUserStore + Sync),
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    let user = users
        .find_by_credentials(email, password)
        .await
        .map_err(AuthError::StoreOperationFailed)?
        .ok_or(AuthError::InvalidCredentials)?;
    tracing::info!(user_id = %user.id, "logged in");
    Ok(user)
}

/// Registers a new user. Does not log in.
///
/// # Errors
///
/// Returns [`AuthError::EmailTaken`] if the email is registered, or
/// [`AuthError::StoreOperationFailed`] if a store request fails.
#[instrument(skip_all)]
pub async fn register(
    users: &(impl LocalUserStore + Sync),
    name: &str,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    let taken = users
        .email_exists(email)
        .await
        .map_err(AuthError::StoreOperationFailed)?;
    if taken {
        return Err(AuthError::EmailTaken(String::from(email)));
    }

    let user = users
        .create_user(&NewUser {
            name: String::from(name),
            email: String::from(email),
            password: String::from(password),
        })
        .await
        .map_err(AuthError::StoreOperationFailed)?;
    tracing::info!(user_id = %user.id, "user registered");
    Ok(user)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Mutex;

    use cinelog_api::store::RecordId;

    use super::*;

    /// In-memory user table keyed by email.
    #[derive(Default)]
    struct MemoryUsers {
        users: Mutex<Vec<(User, String)>>,
    }

    impl LocalUserStore for MemoryUsers {
        async fn find_by_credentials(
            &self,
            email: &str,
            password: &str,
        ) -> anyhow::Result<Option<User>> {
            let users = self.users.lock().unwrap();
            Ok(users
                .iter()
                .find(|(u, p)| u.email == email && p == password)
                .map(|(u, _)| u.clone()))
        }

        async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
            Ok(self.users.lock().unwrap().iter().any(|(u, _)| u.email == email))
        }

        async fn create_user(&self, user: &NewUser) -> anyhow::Result<User> {
            let mut users = self.users.lock().unwrap();
            let stored = User {
                id: RecordId::new((users.len() + 1).to_string()),
                name: user.name.clone(),
                email: user.email.clone(),
            };
            users.push((stored.clone(), user.password.clone()));
            Ok(stored)
        }
    }

    fn make_user() -> User {
        User {
            id: RecordId::new("1"),
            name: String::from("Tyler"),
            email: String::from("tyler@example.com"),
        }
    }

    #[test]
    fn test_missing_file_is_logged_out() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::in_dir(dir.path());

        // Act
        let session = file.load().unwrap();

        // Assert
        assert_eq!(session, Session::default());
        assert_eq!(session.author_name(), DEFAULT_AUTHOR);
    }

    #[test]
    fn test_save_load_clear_lifecycle() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::in_dir(&dir.path().join("nested"));
        let session = Session::logged_in(make_user());

        // Act
        file.save(&session).unwrap();
        let loaded = file.load().unwrap();
        file.clear().unwrap();
        file.clear().unwrap();

        // Assert
        assert_eq!(loaded, session);
        assert_eq!(loaded.author_name(), "Tyler");
        assert!(!file.path().exists());
    }

    #[test]
    fn test_session_file_has_no_password() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::in_dir(dir.path());

        // Act
        file.save(&Session::logged_in(make_user())).unwrap();
        let content = std::fs::read_to_string(file.path()).unwrap();

        // Assert
        assert!(content.contains("tyler@example.com"));
        assert!(!content.contains("password"));
    }

    #[test]
    fn test_corrupt_file_is_error() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::in_dir(dir.path());
        std::fs::write(file.path(), "{not json").unwrap();

        // Act
        let result = file.load();

        // Assert
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        // Arrange
        let users = MemoryUsers::default();

        // Act
        let registered = register(&users, "Tyler", "tyler@example.com", "soap")
            .await
            .unwrap();
        let logged_in = login(&users, "tyler@example.com", "soap").await.unwrap();

        // Assert
        assert_eq!(registered, logged_in);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        // Arrange
        let users = MemoryUsers::default();
        register(&users, "Tyler", "tyler@example.com", "soap")
            .await
            .unwrap();

        // Act
        let result = login(&users, "tyler@example.com", "wrong").await;

        // Assert
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        // Arrange
        let users = MemoryUsers::default();
        register(&users, "Tyler", "tyler@example.com", "soap")
            .await
            .unwrap();

        // Act
        let result = register(&users, "Jack", "tyler@example.com", "other").await;

        // Assert
        assert!(matches!(result, Err(AuthError::EmailTaken(ref e)) if e == "tyler@example.com"));
        assert_eq!(users.users.lock().unwrap().len(), 1);
    }
}
