//! Input validation for the login and registration forms.
//!
//! Every field is checked and all failures are reported together. Nothing
//! is sent to the API while a form is invalid.

use std::fmt;
use std::path::{Path, PathBuf};

use shopfront_core::{Credentials, RegistrationRequest};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Email and password as entered.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, Vec<FieldError>> {
        let mut errors = Vec::new();
        check_email(&self.email, &mut errors);
        check_password(&self.password, &mut errors);

        if errors.is_empty() {
            Ok(Credentials::new(self.email.trim(), self.password.as_str()))
        } else {
            Err(errors)
        }
    }
}

/// Registration fields as entered. The avatar is a local file path.
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar: Option<PathBuf>,
}

/// A registration form that passed validation.
///
/// The avatar still has to be uploaded; its location completes the request.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar: PathBuf,
}

impl ValidRegistration {
    pub fn into_request(self, avatar_url: impl Into<String>) -> RegistrationRequest {
        RegistrationRequest::new(self.email, self.password, self.name, avatar_url)
    }
}

impl RegisterForm {
    pub fn validate(&self) -> Result<ValidRegistration, Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        check_email(&self.email, &mut errors);
        check_password(&self.password, &mut errors);
        let avatar = check_avatar(self.avatar.as_deref(), &mut errors);

        match avatar {
            Some(avatar) if errors.is_empty() => Ok(ValidRegistration {
                name: self.name.trim().to_string(),
                email: self.email.trim().to_string(),
                password: self.password.clone(),
                avatar,
            }),
            _ => Err(errors),
        }
    }
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    let email = email.trim();
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !is_valid_email(email) {
        errors.push(FieldError::new("email", "Please enter a valid email address"));
    }
}

fn check_password(password: &str, errors: &mut Vec<FieldError>) {
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
}

fn check_avatar(avatar: Option<&Path>, errors: &mut Vec<FieldError>) -> Option<PathBuf> {
    let Some(path) = avatar.filter(|p| !p.as_os_str().is_empty()) else {
        errors.push(FieldError::new("avatar", "Avatar is required"));
        return None;
    };

    if !path.is_file() {
        errors.push(FieldError::new(
            "avatar",
            format!("Avatar file not found: {}", path.display()),
        ));
        return None;
    }

    Some(path.to_path_buf())
}

/// Loose `local@domain.tld` shape check. The API has the final say.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}
