// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request payload validation and email normalisation.

use chrono::NaiveDate;
use identity_common::{LoginRequest, SignupRequest, UpdateIdentityRequest};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::auth::password::{validate_password_strength, PasswordRequirements};
use crate::error::AppError;

const MAX_NAME_LENGTH: usize = 100;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit

/// Domain whose mailboxes ignore punctuation in the local part
const GMAIL_DOMAIN: &str = "gmail.com";

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").unwrap());
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^<>/\\{}()\[\];]*$").unwrap());

/// Possible validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    #[error("invalid {field}: {reason}")]
    InvalidName { field: &'static str, reason: String },

    #[error("invalid password: {0}")]
    InvalidPassword(String),

    #[error("invalid date of birth: {0}")]
    InvalidDob(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Lowercase and validate an email. For gmail addresses every
/// non-alphanumeric character of the local part is dropped, so
/// `h.an.solo@gmail.com` and `hansolo@gmail.com` are the same identity.
pub fn normalize_email(raw: &str) -> ValidationResult<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::InvalidEmail("email cannot be empty".to_string()));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "email cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }
    if !EMAIL_REGEX.is_match(&email) {
        return Err(ValidationError::InvalidEmail(format!("'{email}' is not a valid email")));
    }

    let Some((local, domain)) = email.rsplit_once('@') else {
        return Err(ValidationError::InvalidEmail(format!("'{email}' is not a valid email")));
    };
    if domain != GMAIL_DOMAIN {
        return Ok(email);
    }

    let local: String = local.chars().filter(char::is_ascii_alphanumeric).collect();
    if local.is_empty() {
        return Err(ValidationError::InvalidEmail(format!("'{email}' has no usable mailbox")));
    }
    Ok(format!("{local}@{domain}"))
}

/// Trim and check a first/last name
pub fn validate_name(field: &'static str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::InvalidName {
            field,
            reason: "cannot be empty".to_string(),
        });
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidName {
            field,
            reason: format!("cannot exceed {MAX_NAME_LENGTH} characters"),
        });
    }
    if !NAME_REGEX.is_match(value) {
        return Err(ValidationError::InvalidName {
            field,
            reason: "contains invalid characters".to_string(),
        });
    }
    Ok(value.to_string())
}

pub fn validate_password(password: &str, requirements: &PasswordRequirements) -> ValidationResult<String> {
    let password = password.trim();
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "password cannot exceed {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    if !validate_password_strength(password, requirements) {
        return Err(ValidationError::InvalidPassword(format!(
            "password must be at least {} characters",
            requirements.min_length
        )));
    }
    Ok(password.to_string())
}

pub fn validate_dob(dob: NaiveDate, today: NaiveDate) -> ValidationResult<NaiveDate> {
    if dob > today {
        return Err(ValidationError::InvalidDob("date of birth is in the future".to_string()));
    }
    Ok(dob)
}

/// Validate and normalise a signup payload
pub fn validate_signup(
    request: SignupRequest,
    requirements: &PasswordRequirements,
    today: NaiveDate,
) -> ValidationResult<SignupRequest> {
    Ok(SignupRequest {
        first_name: validate_name("first_name", &request.first_name)?,
        last_name: validate_name("last_name", &request.last_name)?,
        email: normalize_email(&request.email)?,
        password: validate_password(&request.password, requirements)?,
        dob: validate_dob(request.dob, today)?,
        role: request.role,
    })
}

/// Normalise a login payload. Password rules are not re-checked here;
/// a wrong password must count as a failed attempt, not a bad request.
pub fn validate_login(request: LoginRequest) -> ValidationResult<LoginRequest> {
    if request.password.is_empty() {
        return Err(ValidationError::InvalidPassword("password cannot be empty".to_string()));
    }
    Ok(LoginRequest {
        email: normalize_email(&request.email)?,
        password: request.password.trim().to_string(),
    })
}

/// Validate and normalise the fields present in an update payload
pub fn validate_update(
    request: UpdateIdentityRequest,
    today: NaiveDate,
) -> ValidationResult<UpdateIdentityRequest> {
    Ok(UpdateIdentityRequest {
        first_name: request
            .first_name
            .map(|v| validate_name("first_name", &v))
            .transpose()?,
        last_name: request
            .last_name
            .map(|v| validate_name("last_name", &v))
            .transpose()?,
        email: request.email.map(|v| normalize_email(&v)).transpose()?,
        dob: request.dob.map(|v| validate_dob(v, today)).transpose()?,
    })
}
