use chrono::{DateTime, Utc};
use tracing::debug;

use super::validation;
use crate::error::DirectoryError;

/// A member of a server, as reported by the gateway.
#[derive(Debug)]
pub struct User {
    id: String,
    name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the display name (nickname changes). The id never changes.
    /// An invalid name leaves the old one in place.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), DirectoryError> {
        let name = name.into();
        validation::validate_user_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// Tear down the user. Consumes it, so it cannot be destroyed twice.
    pub fn destroy(self) {
        debug!(
            user_id = %self.id,
            name = %self.name,
            known_since = %self.created_at,
            "user destroyed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user() {
        let user = User::new("u1", "alice");
        assert_eq!(user.id(), "u1");
        assert_eq!(user.name(), "alice");
        assert!(user.created_at <= Utc::now());
    }

    #[test]
    fn test_rename_keeps_id() {
        let mut user = User::new("u1", "alice");
        user.rename("alice_away").unwrap();
        assert_eq!(user.name(), "alice_away");
        assert_eq!(user.id(), "u1");
    }

    #[test]
    fn test_rename_rejects_overlong_name() {
        let mut user = User::new("u1", "alice");
        let err = user.rename("a".repeat(101)).unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidName { .. }));
        assert_eq!(user.name(), "alice");

        // Clearing the display name is allowed.
        user.rename("").unwrap();
        assert_eq!(user.name(), "");
    }
}
