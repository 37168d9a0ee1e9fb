//! Shared input validation for the auth and user routes.

/// Password strength: 8-256 chars, at least one upper, one lower, one digit.
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    if password.len() > 256 {
        return Err("Password must be at most 256 characters");
    }
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_upper || !has_lower || !has_digit {
        return Err("Password must contain an uppercase letter, a lowercase letter and a digit");
    }
    Ok(())
}

/// Basic user@domain.tld shape check.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 {
        return false;
    }
    let parts: Vec<&str> = email.splitn(2, '@').collect();
    if parts.len() != 2 {
        return false;
    }
    let (local, domain) = (parts[0], parts[1]);
    if local.is_empty() || local.len() > 64 {
        return false;
    }
    if !local
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'+' || b == b'-')
    {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    if domain.is_empty() || !domain.contains('.') {
        return false;
    }
    if !domain
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
    {
        return false;
    }
    domain
        .split('.')
        .all(|part| !part.is_empty() && !part.starts_with('-') && !part.ends_with('-'))
}

/// Username: 2-50 chars; letters, digits, underscore, hyphen and space.
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    let char_count = username.chars().count();
    if char_count < 2 || char_count > 50 {
        return Err("Username must be between 2 and 50 characters");
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == ' ')
    {
        return Err("Username may only contain letters, digits, underscores, hyphens and spaces");
    }
    Ok(())
}
