//! Field rules for account registration.
//!
//! Each field is checked on its own and reports at most one message: the
//! first rule it breaks, in the order listed below.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use catroweb_types::api::{RegisterRequest, ValidationErrors};

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 180;
pub const PASSWORD_MIN_LENGTH: usize = 6;
pub const PASSWORD_MAX_LENGTH: usize = 4096;

/// Accounts imported from Scratch use this prefix; nobody may register one.
pub const SCRATCH_USERNAME_PREFIX: &str = "Scratch:";

pub const EMAIL_MISSING: &str = "Email missing";
pub const EMAIL_INVALID: &str = "Email invalid";
pub const EMAIL_TAKEN: &str = "Email already in use";
pub const USERNAME_MISSING: &str = "Username missing";
pub const USERNAME_TOO_SHORT: &str = "Username too short";
pub const USERNAME_TOO_LONG: &str = "Username too long";
pub const USERNAME_IS_EMAIL: &str = "Username shouldn't contain an email address";
pub const USERNAME_TAKEN: &str = "Username already in use";
pub const USERNAME_INVALID: &str = "Username invalid";
pub const PASSWORD_MISSING: &str = "Password missing";
pub const PASSWORD_TOO_SHORT: &str = "Password too short";
pub const PASSWORD_TOO_LONG: &str = "Password too long";
pub const PASSWORD_INVALID_CHARS: &str = "Password contains invalid chars";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email regex compiles")
});

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Validate a registration request.
///
/// `is_taken` reports whether a value is already used as somebody's
/// username or email.
pub fn validate_registration<F>(req: &RegisterRequest, mut is_taken: F) -> Result<ValidationErrors>
where
    F: FnMut(&str) -> Result<bool>,
{
    let mut errors = ValidationErrors::new();

    if let Some(msg) = email_error(req.email.as_deref(), &mut is_taken)? {
        errors.insert("email", msg);
    }
    if let Some(msg) = username_error(req.username.as_deref(), &mut is_taken)? {
        errors.insert("username", msg);
    }
    if let Some(msg) = password_error(req.password.as_deref()) {
        errors.insert("password", msg);
    }

    Ok(errors)
}

fn email_error<F>(email: Option<&str>, is_taken: &mut F) -> Result<Option<&'static str>>
where
    F: FnMut(&str) -> Result<bool>,
{
    let Some(email) = email.filter(|e| !e.is_empty()) else {
        return Ok(Some(EMAIL_MISSING));
    };
    if !is_valid_email(email) {
        return Ok(Some(EMAIL_INVALID));
    }
    if is_taken(email)? {
        return Ok(Some(EMAIL_TAKEN));
    }
    Ok(None)
}

fn username_error<F>(username: Option<&str>, is_taken: &mut F) -> Result<Option<&'static str>>
where
    F: FnMut(&str) -> Result<bool>,
{
    let Some(username) = username.filter(|u| !u.is_empty()) else {
        return Ok(Some(USERNAME_MISSING));
    };

    let length = username.chars().count();
    if length < USERNAME_MIN_LENGTH {
        return Ok(Some(USERNAME_TOO_SHORT));
    }
    if length > USERNAME_MAX_LENGTH {
        return Ok(Some(USERNAME_TOO_LONG));
    }
    if is_valid_email(username) {
        return Ok(Some(USERNAME_IS_EMAIL));
    }
    if is_taken(username)? {
        return Ok(Some(USERNAME_TAKEN));
    }
    if username.starts_with(SCRATCH_USERNAME_PREFIX) {
        return Ok(Some(USERNAME_INVALID));
    }
    Ok(None)
}

fn password_error(password: Option<&str>) -> Option<&'static str> {
    let Some(password) = password.filter(|p| !p.is_empty()) else {
        return Some(PASSWORD_MISSING);
    };

    let length = password.chars().count();
    if length < PASSWORD_MIN_LENGTH {
        return Some(PASSWORD_TOO_SHORT);
    }
    if length > PASSWORD_MAX_LENGTH {
        return Some(PASSWORD_TOO_LONG);
    }
    if !password.is_ascii() {
        return Some(PASSWORD_INVALID_CHARS);
    }
    None
}
