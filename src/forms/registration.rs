//! Bed, spa, and dining registration forms
//!
//! Each form checks that its required fields are present before the
//! submission is written to its collection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{FieldErrors, ValidationError, ValidationResult, REQUIRED_FIELDS_MESSAGE};

pub const ROOM_TYPES: &[&str] = &["standard", "deluxe", "suite", "presidential"];
pub const SPA_TREATMENTS: &[&str] = &["massage", "facial", "body-wrap", "manicure", "package"];
pub const SPA_TIMES: &[&str] = &[
    "9:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00",
];
pub const DINING_TIMES: &[&str] = &[
    "18:00", "18:30", "19:00", "19:30", "20:00", "20:30", "21:00", "21:30",
];

/// Largest bed party; the form's top option reads "5+"
pub const MAX_BED_GUESTS: u8 = 5;
/// Largest dining party; the form's top option reads "9+"
pub const MAX_DINING_GUESTS: u8 = 9;

/// Which registration form was submitted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationKind {
    Bed,
    Spa,
    Dining,
}

impl RegistrationKind {
    /// Collection the submission is written to
    pub fn collection(&self) -> &'static str {
        match self {
            RegistrationKind::Bed => "bed-registrations",
            RegistrationKind::Spa => "spa-registrations",
            RegistrationKind::Dining => "dining-registrations",
        }
    }

    /// Human label used in toasts
    pub fn label(&self) -> &'static str {
        match self {
            RegistrationKind::Bed => "bed registration",
            RegistrationKind::Spa => "spa registration",
            RegistrationKind::Dining => "dining reservation",
        }
    }

    pub fn success_message(&self) -> String {
        format!("Your {} has been submitted", self.label())
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            RegistrationKind::Dining => "Failed to submit reservation. Please try again.",
            _ => "Failed to submit registration. Please try again.",
        }
    }
}

impl fmt::Display for RegistrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationKind::Bed => write!(f, "bed"),
            RegistrationKind::Spa => write!(f, "spa"),
            RegistrationKind::Dining => write!(f, "dining"),
        }
    }
}

impl FromStr for RegistrationKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bed" => Ok(RegistrationKind::Bed),
            "spa" => Ok(RegistrationKind::Spa),
            "dining" => Ok(RegistrationKind::Dining),
            other => Err(ValidationError::field(
                "kind",
                format!("Unknown registration type: {}", other),
            )),
        }
    }
}

fn default_guests() -> u8 {
    1
}

fn default_dining_guests() -> u8 {
    2
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

/// Room booking request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BedRegistration {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default)]
    pub room_type: String,
    #[serde(default = "default_guests")]
    pub number_of_guests: u8,
    #[serde(default)]
    pub special_requests: String,
}

impl BedRegistration {
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = FieldErrors::new();
        let mut complete = errors.require("fullName", "Full name", &self.full_name);
        if self.date_range.from.is_none() {
            errors.add("dateRange", "Check-in date is required");
            complete = false;
        }
        if self.date_range.to.is_none() {
            errors.add("dateRange", "Check-out date is required");
            complete = false;
        }
        complete &= errors.require("roomType", "Room type", &self.room_type);

        if !complete {
            return Err(ValidationError::new(REQUIRED_FIELDS_MESSAGE, errors));
        }

        if let (Some(from), Some(to)) = (self.date_range.from, self.date_range.to) {
            if to <= from {
                errors.add("dateRange", "Check-out must be after check-in");
            }
        }
        check_choice(&mut errors, "roomType", "room type", &self.room_type, ROOM_TYPES);
        check_guests(&mut errors, self.number_of_guests, MAX_BED_GUESTS);

        finish(errors)
    }
}

/// Spa treatment request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SpaRegistration {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub treatment: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub special_requests: String,
}

impl SpaRegistration {
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = FieldErrors::new();
        let mut complete = errors.require("fullName", "Full name", &self.full_name);
        if self.date.is_none() {
            errors.add("date", "Date is required");
            complete = false;
        }
        complete &= errors.require("treatment", "Treatment", &self.treatment);
        complete &= errors.require("time", "Time", &self.time);

        if !complete {
            return Err(ValidationError::new(REQUIRED_FIELDS_MESSAGE, errors));
        }

        check_choice(&mut errors, "treatment", "treatment", &self.treatment, SPA_TREATMENTS);
        check_choice(&mut errors, "time", "time slot", &self.time, SPA_TIMES);

        finish(errors)
    }
}

/// Restaurant table request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiningRegistration {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: String,
    #[serde(default = "default_dining_guests")]
    pub number_of_guests: u8,
    #[serde(default)]
    pub special_requests: String,
}

impl DiningRegistration {
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = FieldErrors::new();
        let mut complete = errors.require("fullName", "Full name", &self.full_name);
        if self.date.is_none() {
            errors.add("date", "Date is required");
            complete = false;
        }
        complete &= errors.require("time", "Time", &self.time);

        if !complete {
            return Err(ValidationError::new(REQUIRED_FIELDS_MESSAGE, errors));
        }

        check_choice(&mut errors, "time", "time slot", &self.time, DINING_TIMES);
        check_guests(&mut errors, self.number_of_guests, MAX_DINING_GUESTS);

        finish(errors)
    }
}

/// A submission from any of the three forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Bed(BedRegistration),
    Spa(SpaRegistration),
    Dining(DiningRegistration),
}

impl Registration {
    /// Decode a JSON body for the given form kind
    pub fn from_json(kind: RegistrationKind, body: serde_json::Value) -> ValidationResult<Self> {
        let decoded = match kind {
            RegistrationKind::Bed => serde_json::from_value(body).map(Registration::Bed),
            RegistrationKind::Spa => serde_json::from_value(body).map(Registration::Spa),
            RegistrationKind::Dining => serde_json::from_value(body).map(Registration::Dining),
        };
        decoded.map_err(|e| ValidationError::field("body", format!("Malformed {}: {}", kind.label(), e)))
    }

    pub fn kind(&self) -> RegistrationKind {
        match self {
            Registration::Bed(_) => RegistrationKind::Bed,
            Registration::Spa(_) => RegistrationKind::Spa,
            Registration::Dining(_) => RegistrationKind::Dining,
        }
    }

    pub fn full_name(&self) -> &str {
        match self {
            Registration::Bed(r) => &r.full_name,
            Registration::Spa(r) => &r.full_name,
            Registration::Dining(r) => &r.full_name,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        match self {
            Registration::Bed(r) => r.validate(),
            Registration::Spa(r) => r.validate(),
            Registration::Dining(r) => r.validate(),
        }
    }

    /// Document body as written to the collection (without the timestamp)
    pub fn to_document(&self) -> serde_json::Value {
        let value = match self {
            Registration::Bed(r) => serde_json::to_value(r),
            Registration::Spa(r) => serde_json::to_value(r),
            Registration::Dining(r) => serde_json::to_value(r),
        };
        value.unwrap_or(serde_json::Value::Null)
    }
}

fn check_choice(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: &str,
    allowed: &[&str],
) {
    if !allowed.contains(&value) {
        errors.add(field, format!("Unknown {}: {}", label, value));
    }
}

fn check_guests(errors: &mut FieldErrors, guests: u8, max: u8) {
    if guests == 0 || guests > max {
        errors.add(
            "numberOfGuests",
            format!("Number of guests must be between 1 and {}", max),
        );
    }
}

fn finish(errors: FieldErrors) -> ValidationResult<()> {
    if errors.is_empty() {
        return Ok(());
    }
    let message = errors
        .iter()
        .next()
        .map(|(_, m)| m.to_string())
        .unwrap_or_default();
    Err(ValidationError::new(message, errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bed() -> BedRegistration {
        BedRegistration {
            full_name: "Abebe Kebede".to_string(),
            date_range: DateRange {
                from: NaiveDate::from_ymd_opt(2024, 5, 1),
                to: NaiveDate::from_ymd_opt(2024, 5, 4),
            },
            room_type: "deluxe".to_string(),
            number_of_guests: 2,
            special_requests: String::new(),
        }
    }

    #[test]
    fn test_bed_valid() {
        assert!(bed().validate().is_ok());
    }

    #[test]
    fn test_bed_rejects_empty_required_fields() {
        let mut form = bed();
        form.full_name = "  ".to_string();
        form.date_range.to = None;

        let err = form.validate().unwrap_err();
        assert_eq!(err.message, REQUIRED_FIELDS_MESSAGE);
        assert!(err.fields.contains("fullName"));
        assert!(err.fields.contains("dateRange"));
        assert!(!err.fields.contains("roomType"));
    }

    #[test]
    fn test_bed_date_order_and_guests() {
        let mut form = bed();
        form.date_range.to = form.date_range.from;
        let err = form.validate().unwrap_err();
        assert_eq!(err.message, "Check-out must be after check-in");

        let mut form = bed();
        form.number_of_guests = 6;
        assert!(form.validate().unwrap_err().fields.contains("numberOfGuests"));
    }

    #[test]
    fn test_spa_required_fields() {
        let form: SpaRegistration = serde_json::from_value(json!({
            "fullName": "Abebe Kebede",
            "date": "2024-05-01",
        }))
        .unwrap();
        let err = form.validate().unwrap_err();
        assert_eq!(err.message, REQUIRED_FIELDS_MESSAGE);
        assert!(err.fields.contains("treatment"));
        assert!(err.fields.contains("time"));
    }

    #[test]
    fn test_spa_unknown_treatment() {
        let form = SpaRegistration {
            full_name: "Abebe Kebede".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1),
            treatment: "mud-bath".to_string(),
            time: "10:00".to_string(),
            special_requests: String::new(),
        };
        assert!(form.validate().unwrap_err().fields.contains("treatment"));
    }

    #[test]
    fn test_dining_from_json() {
        let reg = Registration::from_json(
            RegistrationKind::Dining,
            json!({
                "fullName": "Abebe Kebede",
                "date": "2024-05-01",
                "time": "19:30",
                "numberOfGuests": 4
            }),
        )
        .unwrap();
        assert_eq!(reg.kind(), RegistrationKind::Dining);
        assert!(reg.validate().is_ok());
        assert_eq!(reg.to_document()["numberOfGuests"], 4);
    }

    #[test]
    fn test_guest_defaults() {
        let dining = Registration::from_json(
            RegistrationKind::Dining,
            json!({"fullName": "Abebe Kebede", "date": "2024-05-01", "time": "19:30"}),
        )
        .unwrap();
        assert_eq!(dining.to_document()["numberOfGuests"], 2);

        let bed = Registration::from_json(RegistrationKind::Bed, json!({"fullName": "Abebe"})).unwrap();
        assert_eq!(bed.to_document()["numberOfGuests"], 1);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("SPA".parse::<RegistrationKind>().unwrap(), RegistrationKind::Spa);
        assert!("laundry".parse::<RegistrationKind>().is_err());
        assert_eq!(RegistrationKind::Bed.collection(), "bed-registrations");
    }
}
