//! Account settings
//!
//! Defaults mirror what a new member sees on the settings page.

use serde::{Deserialize, Serialize};

use super::error::{LoyaltyError, LoyaltyResult};

const LANGUAGES: &[&str] = &["en", "am", "fr", "ar", "zh"];
const CURRENCIES: &[&str] = &["usd", "eur", "gbp", "etb"];
const THEMES: &[&str] = &["light", "dark", "system"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub notifications: NotificationPreferences,
    #[serde(default)]
    pub privacy: PrivacyPreferences,
    #[serde(default)]
    pub two_factor: bool,
    #[serde(default)]
    pub accessibility: AccessibilityPreferences,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_theme() -> String {
    "light".to_string()
}

fn default_currency() -> String {
    "usd".to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: default_language(),
            theme: default_theme(),
            currency: default_currency(),
            notifications: NotificationPreferences::default(),
            privacy: PrivacyPreferences::default(),
            two_factor: false,
            accessibility: AccessibilityPreferences::default(),
        }
    }
}

impl Preferences {
    /// Reject languages, currencies, and themes the portal does not offer
    pub fn validate(&self) -> LoyaltyResult<()> {
        check_choice("language", &self.language, LANGUAGES)?;
        check_choice("currency", &self.currency, CURRENCIES)?;
        check_choice("theme", &self.theme, THEMES)?;
        Ok(())
    }
}

fn check_choice(field: &'static str, value: &str, allowed: &[&str]) -> LoyaltyResult<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(LoyaltyError::UnknownValue {
            field,
            value: value.to_string(),
        })
    }
}

/// Notification channels and topics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationPreferences {
    pub email: bool,
    pub push: bool,
    pub sms: bool,
    pub promotions: bool,
    pub updates: bool,
    pub reminders: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            sms: false,
            promotions: true,
            updates: true,
            reminders: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyPreferences {
    pub analytics: bool,
    pub marketing: bool,
    pub third_party: bool,
}

impl Default for PrivacyPreferences {
    fn default() -> Self {
        Self {
            analytics: true,
            marketing: true,
            third_party: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityPreferences {
    pub reduced_motion: bool,
    pub high_contrast: bool,
    pub large_text: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert_eq!(prefs.language, "en");
        assert_eq!(prefs.currency, "usd");
        assert!(prefs.notifications.email);
        assert!(!prefs.notifications.sms);
        assert!(!prefs.privacy.third_party);
        assert!(prefs.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"language": "am"}"#).unwrap();
        assert_eq!(prefs.language, "am");
        assert_eq!(prefs.theme, "light");
        assert!(prefs.notifications.reminders);
    }

    #[test]
    fn test_rejects_unknown_choices() {
        let prefs = Preferences {
            currency: "jpy".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            prefs.validate(),
            Err(LoyaltyError::UnknownValue { field: "currency", .. })
        ));
    }
}
