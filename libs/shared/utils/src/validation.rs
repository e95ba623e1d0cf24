// =====================================================================================
// FIELD VALIDATION - client-side checks that run before any backend call
// =====================================================================================

use std::sync::OnceLock;

use regex::Regex;

use shared_models::error::{AppError, FieldError};

pub const MIN_PASSWORD_LENGTH: usize = 6;

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{10}$").expect("phone pattern compiles"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
    })
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone_pattern().is_match(phone)
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// Collects field errors so a form reports every problem at once.
#[derive(Debug, Default)]
pub struct FieldValidator {
    errors: Vec<FieldError>,
}

impl FieldValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &str, value: &str, label: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError::new(field, &format!("{} is required", label)));
        }
        self
    }

    pub fn phone(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError::new(field, "Phone number is required"));
        } else if !is_valid_phone(value) {
            self.errors.push(FieldError::new(field, "Phone number must be exactly 10 digits"));
        }
        self
    }

    /// Email is optional; only a non-empty value is checked.
    pub fn optional_email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(email) = value.map(str::trim).filter(|e| !e.is_empty()) {
            if !is_valid_email(email) {
                self.errors.push(FieldError::new(field, "Please enter a valid email address"));
            }
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError::new(field, "Email is required"));
        } else {
            self.optional_email(field, Some(value));
        }
        self
    }

    pub fn password(&mut self, field: &str, value: &str) -> &mut Self {
        if value.chars().count() < MIN_PASSWORD_LENGTH {
            self.errors.push(FieldError::new(
                field,
                &format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
            ));
        }
        self
    }

    pub fn matches(&mut self, field: &str, value: &str, other: &str, message: &str) -> &mut Self {
        if value != other {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn range(&mut self, field: &str, value: Option<u32>, min: u32, max: u32, label: &str) -> &mut Self {
        match value {
            Some(v) if v >= min && v <= max => {}
            _ => self.errors.push(FieldError::new(
                field,
                &format!("{} must be between {} and {}", label, min, max),
            )),
        }
        self
    }

    pub fn check(&mut self, condition: bool, field: &str, message: &str) -> &mut Self {
        if !condition {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn finish(&mut self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::FieldValidation(std::mem::take(&mut self.errors)))
        }
    }
}
