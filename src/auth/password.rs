//! Password hashing and the username/password shape rules applied at signup.

use bcrypt::BcryptError;

/// Canonical minimum password length.
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_USERNAME_LEN: usize = 3;

const RESERVED_USERNAMES: [&str; 5] = ["admin", "root", "me", "system", "search"];

pub fn hash_password(password: &str, cost: u32) -> Result<String, BcryptError> {
    bcrypt::hash(password.as_bytes(), cost)
}

/// Checks `password` against a stored bcrypt hash. A malformed hash verifies as false.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password.as_bytes(), hash).unwrap_or(false)
}

pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_reserved_username(username: &str) -> bool {
    RESERVED_USERNAMES.contains(&username)
}

pub fn is_valid_username(username: &str) -> bool {
    if username.is_empty() {
        return false;
    }
    if !username.chars().all(char::is_alphanumeric) {
        return false;
    }
    if is_reserved_username(username) {
        return false;
    }
    username.chars().count() >= MIN_USERNAME_LEN
}

pub fn is_valid_password(password: &str) -> bool {
    let has_min_len = password.chars().count() >= MIN_PASSWORD_LEN;
    let mut has_upper = false;
    let mut has_lower = false;
    let mut has_number = false;
    let mut has_special = false;

    for ch in password.chars() {
        if ch.is_uppercase() {
            has_upper = true;
        } else if ch.is_lowercase() {
            has_lower = true;
        } else if ch.is_numeric() {
            has_number = true;
        } else if is_punctuation_or_symbol(ch) {
            has_special = true;
        }
    }

    has_min_len && has_upper && has_lower && has_number && has_special
}

fn is_punctuation_or_symbol(ch: char) -> bool {
    ch.is_ascii_punctuation() || !(ch.is_alphanumeric() || ch.is_whitespace() || ch.is_control())
}
