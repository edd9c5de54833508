//! Input validation utilities for the backend service layer.
//!
//! Every function returns a field-scoped `Error::Validation` so handlers can
//! surface a 400 with the offending field name.

use crate::error::{Error, Result};

/// Validates email format using comprehensive checks
///
/// # Arguments
/// * `email` - The email address to validate
///
/// # Returns
/// * `Ok(())` if the email is valid
/// * `Err(Error)` with descriptive message if invalid
///
/// # Examples
/// ```
/// use clubhub::validation::validate_email;
///
/// validate_email("user@example.com").unwrap(); // Valid
/// assert!(validate_email("invalid-email").is_err()); // Returns Error
/// ```
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let invalid = |message: &str| Err(Error::validation("email", message));

    // Basic format validation
    if email.is_empty() {
        return invalid("Email is required");
    }

    // Length validation
    if email.len() > 254 {
        return invalid("Email address is too long (max 254 characters)");
    }

    // Check for basic structure
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return invalid("Invalid email format: must contain @ symbol not at start or end");
    }

    // Split into local and domain parts
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return invalid("Invalid email format: must contain exactly one @ symbol");
    }

    let (local_part, domain) = (parts[0], parts[1]);

    if local_part.len() > 64 {
        return invalid("Invalid email format: local part is too long (max 64 characters)");
    }

    // Check domain has at least one dot
    if !domain.contains('.') {
        return invalid("Invalid email format: domain must contain at least one dot");
    }

    // Check for consecutive dots
    if email.contains("..") {
        return invalid("Invalid email format: cannot contain consecutive dots");
    }

    // Check for invalid characters including spaces
    let invalid_chars = ['<', '>', '(', ')', '[', ']', '\\', ',', ';', ':', '"', ' '];
    if let Some(c) = invalid_chars.iter().find(|c| email.contains(**c)) {
        return Err(Error::validation(
            "email",
            format!("Invalid email format: cannot contain '{}'", c),
        ));
    }

    Ok(())
}

/// Validates password strength and format
///
/// # Arguments
/// * `password` - The password to validate
///
/// # Returns
/// * `Ok(())` if the password meets requirements
/// * `Err(Error)` with descriptive message if invalid
pub fn validate_password(password: &str) -> Result<()> {
    // Length validation
    if password.len() < 8 {
        return Err(Error::validation("password", "Password must be at least 8 characters long"));
    }

    if password.len() > 128 {
        return Err(Error::validation("password", "Password is too long (max 128 characters)"));
    }

    // Check for common weak patterns
    let lowered = password.to_lowercase();
    if ["password", "12345678", "qwerty123", "admin123"].contains(&lowered.as_str()) {
        return Err(Error::validation("password", "Password is too common and weak"));
    }

    // Entirely numeric passwords are rejected
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::validation("password", "Password cannot be entirely numeric"));
    }

    // Check for whitespace
    if password.contains(' ') {
        return Err(Error::validation("password", "Password cannot contain spaces"));
    }

    Ok(())
}

/// Validates a username: 1-150 characters of letters, digits and `@.+-_`.
pub fn validate_username(username: &str) -> Result<String> {
    let username = validate_required_string(username, "username")?;

    if username.len() > 150 {
        return Err(Error::validation("username", "Username must be at most 150 characters"));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(Error::validation(
            "username",
            "Username can only contain letters, numbers, and @/./+/-/_ characters",
        ));
    }

    Ok(username)
}

/// Validates club name format and constraints
///
/// # Arguments
/// * `name` - The club name to validate
///
/// # Returns
/// * `Ok(String)` with the trimmed name
/// * `Err(Error)` with descriptive message if invalid
pub fn validate_club_name(name: &str) -> Result<String> {
    let name = validate_required_string(name, "name")?;

    if name.len() > 255 {
        return Err(Error::validation("name", "Club name must be at most 255 characters"));
    }

    // Club names appear in URL paths
    if name.contains('/') {
        return Err(Error::validation("name", "Club name cannot contain '/'"));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(Error::validation("name", "Club name cannot contain control characters"));
    }

    Ok(name)
}

/// Validates an optional year/month pair used by event listings.
pub fn validate_year_month(year: Option<i32>, month: Option<u32>) -> Result<()> {
    if let Some(month) = month {
        if !(1..=12).contains(&month) {
            return Err(Error::validation("month", "Month must be between 1 and 12"));
        }
    }
    if let Some(year) = year {
        if !(1900..=9999).contains(&year) {
            return Err(Error::validation("year", "Year must be between 1900 and 9999"));
        }
    }
    Ok(())
}

/// Sanitizes string input by trimming whitespace
pub fn sanitize_string(input: &str) -> String {
    input.trim().to_string()
}

/// Validates that a string is not empty after sanitization
///
/// # Arguments
/// * `input` - The input string to validate
/// * `field_name` - Name of the field for error messages
///
/// # Returns
/// * `Ok(String)` with sanitized string
/// * `Err(Error)` if empty after sanitization
pub fn validate_required_string(input: &str, field_name: &str) -> Result<String> {
    let sanitized = sanitize_string(input);

    if sanitized.is_empty() {
        return Err(Error::validation(field_name, format!("{} is required", field_name)));
    }

    Ok(sanitized)
}

/// Column width of the short text columns (names, plan targets, profile values).
pub const MAX_FIELD_CHARS: usize = 255;

/// Fails when `value` is longer than `max` characters.
pub fn validate_max_chars(value: &str, field_name: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(Error::validation(
            field_name,
            format!("{} must be at most {} characters", field_name, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_max_chars_counts_characters() {
        assert!(validate_max_chars("ééé", "name", 3).is_ok());
        assert!(validate_max_chars("éééé", "name", 3).is_err());
        assert!(validate_max_chars(&"x".repeat(MAX_FIELD_CHARS), "name", MAX_FIELD_CHARS).is_ok());
    }

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("test.email+tag@domain.co.uk").is_ok());
        assert!(validate_email("user_name@sub.domain.com").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("").is_err());
        assert!(validate_email("invalid-email").is_err());
        assert!(validate_email("@domain.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@@domain.com").is_err());
        assert!(validate_email("user@domain").is_err());
        assert!(validate_email("user name@domain.com").is_err());
        assert!(validate_email("user@domain..com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("validpassword123").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("password").is_err());
        assert!(validate_password("1234567890").is_err());
        assert!(validate_password("space in password").is_err());
        assert!(validate_password("a".repeat(130).as_str()).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username("  jane.doe ").unwrap(), "jane.doe");
        assert!(validate_username("").is_err());
        assert!(validate_username("jane doe").is_err());
        assert!(validate_username("a".repeat(151).as_str()).is_err());
    }

    #[test]
    fn test_validate_club_name() {
        assert_eq!(validate_club_name(" Chess Club ").unwrap(), "Chess Club");
        assert!(validate_club_name("   ").is_err());
        assert!(validate_club_name("Chess/Go").is_err());
    }

    #[test]
    fn test_validate_year_month() {
        assert!(validate_year_month(Some(2025), Some(2)).is_ok());
        assert!(validate_year_month(None, None).is_ok());
        assert!(validate_year_month(Some(2025), Some(13)).is_err());
        assert!(validate_year_month(Some(12), None).is_err());
    }

    #[test]
    fn test_validate_required_string() {
        assert!(validate_required_string("hello", "field").is_ok());
        assert!(validate_required_string("   ", "field").is_err());
    }
}
