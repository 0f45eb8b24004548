//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a text field carries at least one non-whitespace character.
///
/// # Examples
///
/// ```ignore
/// validate_not_blank("Paris")  // Ok
/// validate_not_blank("   ")    // Err - only whitespace
/// validate_not_blank("")       // Err - empty
/// ```
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("value must not be empty or whitespace only".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank_valid() {
        assert!(validate_not_blank("Paris").is_ok());
        assert!(validate_not_blank("  Rome ").is_ok());
    }

    #[test]
    fn test_validate_not_blank_invalid() {
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("\t\n").is_err());
    }
}
