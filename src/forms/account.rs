//! Sign-up and login forms

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::OnceLock;

use super::error::{FieldErrors, ValidationError, ValidationResult};

pub const MIN_PASSWORD_LEN: usize = 6;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"))
}

/// Loose email shape check matching what the portal accepts
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// Age arrives as text from a form input or as a JSON number
fn age_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Missing(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
        Raw::Missing(()) => String::new(),
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default, deserialize_with = "age_as_text")]
    pub age: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Profile fields stored alongside a new account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSignUp {
    pub full_name: String,
    pub age: u32,
    pub email: String,
}

impl SignUpForm {
    /// Validate every field and return the normalized profile
    pub fn validate(&self) -> ValidationResult<ValidSignUp> {
        let mut errors = FieldErrors::new();

        errors.require("fullName", "Full name", &self.full_name);

        let age = if errors.require("age", "Age", &self.age) {
            match self.age.trim().parse::<u32>() {
                Ok(age) if age > 0 => Some(age),
                _ => {
                    errors.add("age", "Please enter a valid age");
                    None
                }
            }
        } else {
            None
        };

        check_email(&mut errors, &self.email);

        if errors.require("password", "Password", &self.password)
            && self.password.chars().count() < MIN_PASSWORD_LEN
        {
            errors.add(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            );
        }

        match age {
            Some(age) if errors.is_empty() => Ok(ValidSignUp {
                full_name: self.full_name.trim().to_string(),
                age,
                email: normalize_email(&self.email),
            }),
            _ => Err(first_error(errors)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        errors.require("password", "Password", &self.password);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(first_error(errors))
        }
    }
}

/// Emails are compared case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if errors.require("email", "Email", email) && !is_valid_email(email.trim()) {
        errors.add("email", "Please enter a valid email");
    }
}

fn first_error(errors: FieldErrors) -> ValidationError {
    let message = errors
        .iter()
        .next()
        .map(|(_, m)| m.to_string())
        .unwrap_or_default();
    ValidationError::new(message, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignUpForm {
        SignUpForm {
            full_name: "Abebe Kebede".to_string(),
            age: "34".to_string(),
            email: "Abebe@Example.com".to_string(),
            password: "secret1".to_string(),
        }
    }

    #[test]
    fn test_signup_valid() {
        let valid = signup().validate().unwrap();
        assert_eq!(valid.age, 34);
        assert_eq!(valid.email, "abebe@example.com");
    }

    #[test]
    fn test_signup_messages() {
        let form = SignUpForm {
            full_name: String::new(),
            age: "zero".to_string(),
            email: "abebe".to_string(),
            password: "abc".to_string(),
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.fields.get("fullName"), Some("Full name is required"));
        assert_eq!(err.fields.get("age"), Some("Please enter a valid age"));
        assert_eq!(err.fields.get("email"), Some("Please enter a valid email"));
        assert_eq!(
            err.fields.get("password"),
            Some("Password must be at least 6 characters")
        );
    }

    #[test]
    fn test_signup_age_rules() {
        let mut form = signup();
        form.age = "0".to_string();
        assert!(form.validate().is_err());

        form.age = "  ".to_string();
        let err = form.validate().unwrap_err();
        assert_eq!(err.fields.get("age"), Some("Age is required"));
    }

    #[test]
    fn test_age_accepts_number_or_text() {
        let form: SignUpForm = serde_json::from_str(
            r#"{"fullName":"A","age":27,"email":"a@b.co","password":"secret1"}"#,
        )
        .unwrap();
        assert_eq!(form.age, "27");

        let form: SignUpForm = serde_json::from_str(r#"{"age":"41"}"#).unwrap();
        assert_eq!(form.age, "41");
    }

    #[test]
    fn test_login_requires_both() {
        let err = LoginForm::default().validate().unwrap_err();
        assert_eq!(err.fields.get("email"), Some("Email is required"));
        assert_eq!(err.fields.get("password"), Some("Password is required"));

        let form = LoginForm {
            email: "a@b.co".to_string(),
            password: "x".to_string(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("guest@kuriftu.com"));
        assert!(!is_valid_email("guest@kuriftu"));
        assert!(!is_valid_email("guest kuriftu.com"));
    }
}
