use crate::error::DirectoryError;

/// Maximum entity id length (bytes).
pub const MAX_ID_LENGTH: usize = 64;

/// Maximum server, channel and user name length.
pub const MAX_NAME_LENGTH: usize = 100;

/// Validate an entity id. Must be 1-64 bytes with no whitespace.
pub fn validate_id(id: &str) -> Result<(), DirectoryError> {
    let invalid = |reason| DirectoryError::InvalidId {
        id: id.to_string(),
        reason,
    };

    if id.is_empty() {
        return Err(invalid("id cannot be empty"));
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(invalid("id too long"));
    }
    if id.chars().any(char::is_whitespace) {
        return Err(invalid("id cannot contain whitespace"));
    }
    Ok(())
}

/// Validate a server or channel name. Must be non-blank and under the length limit.
pub fn validate_name(name: &str) -> Result<(), DirectoryError> {
    if name.trim().is_empty() {
        return Err(DirectoryError::InvalidName {
            name: name.to_string(),
            reason: "name cannot be empty",
        });
    }
    validate_user_name(name)
}

/// Validate a user display name. Can be empty but has a length limit.
pub fn validate_user_name(name: &str) -> Result<(), DirectoryError> {
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(DirectoryError::InvalidName {
            name: name.to_string(),
            reason: "name too long",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert!(validate_id("81384788765712384").is_ok());
        assert!(validate_id("s1").is_ok());
        assert!(validate_id(&"9".repeat(64)).is_ok());
    }

    #[test]
    fn test_invalid_ids() {
        assert!(validate_id("").is_err());
        assert!(validate_id("has space").is_err());
        assert!(validate_id("tab\there").is_err());
        assert!(validate_id(&"9".repeat(65)).is_err());
    }

    #[test]
    fn test_invalid_id_reports_reason() {
        let err = validate_id("").unwrap_err();
        assert_eq!(
            err,
            DirectoryError::InvalidId {
                id: String::new(),
                reason: "id cannot be empty",
            }
        );
    }

    #[test]
    fn test_name_validation() {
        assert!(validate_name("general").is_ok());
        assert!(validate_name("voice lounge").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_user_name_validation() {
        assert!(validate_user_name("").is_ok()); // not yet known
        assert!(validate_user_name("alice").is_ok());
        assert!(validate_user_name(&"é".repeat(100)).is_ok());
        assert!(validate_user_name(&"é".repeat(101)).is_err());
    }
}
