use serde::{Deserialize, Deserializer};
use validator::ValidationError;

/// Emails are compared case-insensitively; everything is stored lowercased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalizes an email field while deserializing, so format validation sees
/// the same value the services store and look up.
pub fn deserialize_email<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_email(&raw))
}

pub fn password_not_blank(password: &str) -> Result<(), ValidationError> {
    if password.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Password may not be blank.".into());
        return Err(err);
    }
    Ok(())
}
