//! Field-format checks used by purchase validation.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static EMAIL_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+",
        r"@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
        r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    ))
    .expect("email pattern compiles")
});

static UUN_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[sS][0-9]{7}$").expect("uun pattern compiles"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_FORMAT.is_match(email)
}

/// A UUN rejected by a [`UunValidator`]; the message is shown to the purchaser.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct UunRejected(pub String);

pub trait UunValidator: Send + Sync {
    fn check(&self, uun: &str) -> Result<(), UunRejected>;
}

/// Accepts university user identifiers of the form `s1234567`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternUunValidator;

impl PatternUunValidator {
    pub fn new() -> Self {
        Self
    }
}

impl UunValidator for PatternUunValidator {
    fn check(&self, uun: &str) -> Result<(), UunRejected> {
        let trimmed = uun.trim();
        if trimmed.is_empty() {
            return Err(UunRejected("UUN missing.".to_string()));
        }
        if !UUN_FORMAT.is_match(trimmed) {
            return Err(UunRejected("Invalid UUN provided.".to_string()));
        }
        Ok(())
    }
}
