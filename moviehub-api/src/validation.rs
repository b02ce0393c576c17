/// Custom field validators for request DTOs
///
/// Used through `#[validate(custom(function = "..."))]`.

use moviehub_shared::auth::password::validate_password_policy;
use std::borrow::Cow;
use validator::ValidationError;

fn error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Rejects empty and whitespace-only strings
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("blank", "Must not be empty"));
    }
    Ok(())
}

/// Applies the registration password policy
pub fn password_policy(value: &str) -> Result<(), ValidationError> {
    validate_password_policy(value).map_err(|msg| error("password_policy", msg))
}
