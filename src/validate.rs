use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::booking::ServiceType;

/// Field name to message map produced by the validators. BTreeMap keeps
/// the serialized order stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors::default()
    }

    /// Records the first message per field; later checks on the same field
    /// do not overwrite it.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn into_result<T>(self, valid: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(valid)
        } else {
            Err(self)
        }
    }
}

// ── Form inputs ──
// Missing fields deserialize as empty and fail validation with the field's
// "required" message instead of rejecting the whole body.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRegistrationForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerRegistrationForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub profession: String,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub cities: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequestForm {
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
}

// ── Validated outputs ──

#[derive(Debug, Clone, PartialEq)]
pub struct ValidLogin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidCustomerRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidPartnerRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub service_type: String,
    pub hourly_rate: f64,
    pub description: Option<String>,
    pub country: String,
    pub cities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidBookingRequest {
    pub start_time: String,
    pub end_time: String,
    pub country: Option<String>,
    pub service_type: Option<String>,
}

// ── Validators ──

pub fn validate_login(form: &LoginForm) -> Result<ValidLogin, FieldErrors> {
    let mut errors = FieldErrors::new();

    if form.email.is_empty() {
        errors.push("email", "Email is required");
    } else if !is_valid_email(&form.email) {
        errors.push("email", "Please enter a valid email address");
    }

    if form.password.is_empty() {
        errors.push("password", "Password is required");
    } else if form.password.chars().count() < 6 {
        errors.push("password", "Password must be at least 6 characters");
    }

    errors.into_result(ValidLogin {
        email: form.email.clone(),
        password: form.password.clone(),
    })
}

pub fn validate_customer_registration(
    form: &CustomerRegistrationForm,
) -> Result<ValidCustomerRegistration, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name_len = form.name.chars().count();
    if form.name.is_empty() {
        errors.push("name", "Full name is required");
    } else if name_len < 2 {
        errors.push("name", "Full name must be at least 2 characters");
    } else if name_len > 100 {
        errors.push("name", "Full name must be less than 100 characters");
    }

    check_email(&mut errors, &form.email);
    check_password(&mut errors, &form.password);
    check_confirmation(&mut errors, &form.password, &form.confirm_password);

    if let Some(phone) = form.phone.as_deref() {
        if !phone.is_empty() && !is_valid_phone(phone) {
            errors.push("phone", "Please enter a valid phone number");
        }
    }

    if let Some(address) = form.address.as_deref() {
        if address.chars().count() > 200 {
            errors.push("address", "Address must be less than 200 characters");
        }
    }

    // First word is the first name, the rest is the last name.
    let mut parts = form.name.split(' ');
    let first_name = parts.next().unwrap_or("").to_string();
    let last_name = parts.collect::<Vec<_>>().join(" ");

    errors.into_result(ValidCustomerRegistration {
        first_name,
        last_name,
        email: form.email.clone(),
        password: form.password.clone(),
        phone: form.phone.clone().filter(|p| !p.is_empty()),
        address: form.address.clone().filter(|a| !a.is_empty()),
        country: form.country.clone().filter(|c| !c.is_empty()),
        city: form.city.clone().filter(|c| !c.is_empty()),
    })
}

pub fn validate_partner_registration(
    form: &PartnerRegistrationForm,
) -> Result<ValidPartnerRegistration, FieldErrors> {
    let mut errors = FieldErrors::new();

    check_name(&mut errors, "firstName", "First name", &form.first_name);
    check_name(&mut errors, "lastName", "Last name", &form.last_name);
    check_email(&mut errors, &form.email);

    if form.phone.is_empty() {
        errors.push("phone", "Phone number is required");
    } else if !is_valid_phone(&form.phone) {
        errors.push("phone", "Please enter a valid phone number");
    }

    check_password(&mut errors, &form.password);
    check_confirmation(&mut errors, &form.password, &form.confirm_password);

    if form.profession.is_empty() {
        errors.push("profession", "Please select a profession");
    } else if !ServiceType::parse(&form.profession).is_known() {
        errors.push("profession", "Please select a profession from the list");
    }

    let hourly_rate = form.hourly_rate.unwrap_or(0.0);
    if hourly_rate < 1.0 {
        errors.push("hourlyRate", "Hourly rate must be at least $1");
    } else if hourly_rate > 1000.0 {
        errors.push("hourlyRate", "Hourly rate must be less than $1000");
    }

    if let Some(description) = form.description.as_deref() {
        if description.chars().count() > 500 {
            errors.push("description", "Description must be less than 500 characters");
        }
    }

    if form.country.is_empty() {
        errors.push("country", "Please select a country");
    }

    if form.cities.is_empty() {
        errors.push("cities", "Please select at least one city");
    }

    errors.into_result(ValidPartnerRegistration {
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
        password: form.password.clone(),
        service_type: form.profession.clone(),
        hourly_rate,
        description: form.description.clone().filter(|d| !d.is_empty()),
        country: form.country.clone(),
        cities: form.cities.clone(),
    })
}

pub fn validate_booking_request(
    form: &BookingRequestForm,
) -> Result<ValidBookingRequest, FieldErrors> {
    let mut errors = FieldErrors::new();

    check_datetime(&mut errors, "startTime", &form.start_time);
    check_datetime(&mut errors, "endTime", &form.end_time);
    // ISO-8601 strings order lexically, so a plain comparison is enough.
    if errors.is_empty() && form.end_time <= form.start_time {
        errors.push("endTime", "End time must be after start time");
    }

    if let Some(service_type) = form.service_type.as_deref() {
        if !service_type.is_empty() && !ServiceType::parse(service_type).is_known() {
            errors.push("serviceType", "Unknown service type");
        }
    }

    errors.into_result(ValidBookingRequest {
        start_time: form.start_time.clone(),
        end_time: form.end_time.clone(),
        country: form.country.clone().filter(|c| !c.is_empty()),
        service_type: form.service_type.clone().filter(|s| !s.is_empty()),
    })
}

// ── Field checks ──

fn check_datetime(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.is_empty() {
        errors.push(field, "This field is required");
    } else if NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_err() {
        errors.push(field, "Enter a date and time like 2025-06-10T14:00:00");
    }
}

fn check_name(errors: &mut FieldErrors, field: &str, label: &str, value: &str) {
    let len = value.chars().count();
    if value.is_empty() {
        errors.push(field, format!("{label} is required"));
    } else if len < 2 {
        errors.push(field, format!("{label} must be at least 2 characters"));
    } else if len > 50 {
        errors.push(field, format!("{label} must be less than 50 characters"));
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.is_empty() {
        errors.push("email", "Email is required");
    } else if !is_valid_email(email) {
        errors.push("email", "Please enter a valid email address");
    }
}

fn check_password(errors: &mut FieldErrors, password: &str) {
    let len = password.chars().count();
    if password.is_empty() {
        errors.push("password", "Password is required");
    } else if len < 6 {
        errors.push("password", "Password must be at least 6 characters");
    } else if len > 100 {
        errors.push("password", "Password must be less than 100 characters");
    }
}

fn check_confirmation(errors: &mut FieldErrors, password: &str, confirmation: &str) {
    if confirmation.is_empty() {
        errors.push("confirmPassword", "Please confirm your password");
    } else if password != confirmation {
        errors.push("confirmPassword", "Passwords don't match");
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

/// Optional leading `+`, then a non-zero digit and up to 15 more digits.
fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let mut chars = digits.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !('1'..='9').contains(&first) {
        return false;
    }
    let rest: Vec<char> = chars.collect();
    rest.len() <= 15 && rest.iter().all(char::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer_form() -> CustomerRegistrationForm {
        CustomerRegistrationForm {
            name: "Ana Maria Silva".to_string(),
            email: "ana@example.com".to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret123".to_string(),
            phone: Some("+4915112345678".to_string()),
            address: None,
            country: Some("Germany".to_string()),
            city: Some("Berlin".to_string()),
        }
    }

    fn partner_form() -> PartnerRegistrationForm {
        PartnerRegistrationForm {
            first_name: "Jo".to_string(),
            last_name: "Keller".to_string(),
            email: "jo@example.com".to_string(),
            phone: "4915112345678".to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret123".to_string(),
            profession: "plumber".to_string(),
            hourly_rate: Some(45.0),
            description: None,
            country: "de".to_string(),
            cities: vec!["berlin".to_string()],
        }
    }

    #[test]
    fn test_login_valid() {
        let form = LoginForm {
            email: "a@b.com".to_string(),
            password: "hunter2x".to_string(),
        };
        assert!(validate_login(&form).is_ok());
    }

    #[test]
    fn test_login_empty_fields_report_required() {
        let form = LoginForm {
            email: String::new(),
            password: String::new(),
        };
        let errors = validate_login(&form).unwrap_err();
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
    }

    #[test]
    fn test_login_short_password() {
        let form = LoginForm {
            email: "a@b.com".to_string(),
            password: "12345".to_string(),
        };
        let errors = validate_login(&form).unwrap_err();
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 6 characters")
        );
    }

    #[test]
    fn test_login_malformed_email() {
        for email in ["nope", "a@", "@b.com", "a b@c.com", "a@nodot"] {
            let form = LoginForm {
                email: email.to_string(),
                password: "secret123".to_string(),
            };
            let errors = validate_login(&form).unwrap_err();
            assert_eq!(
                errors.get("email"),
                Some("Please enter a valid email address"),
                "email {email:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_customer_registration_splits_full_name() {
        let valid = validate_customer_registration(&customer_form()).unwrap();
        assert_eq!(valid.first_name, "Ana");
        assert_eq!(valid.last_name, "Maria Silva");
    }

    #[test]
    fn test_customer_registration_password_mismatch() {
        let mut form = customer_form();
        form.confirm_password = "different".to_string();
        let errors = validate_customer_registration(&form).unwrap_err();
        assert_eq!(errors.get("confirmPassword"), Some("Passwords don't match"));
    }

    #[test]
    fn test_customer_registration_optional_phone_still_checked() {
        let mut form = customer_form();
        form.phone = Some("0123".to_string());
        let errors = validate_customer_registration(&form).unwrap_err();
        assert_eq!(
            errors.get("phone"),
            Some("Please enter a valid phone number")
        );

        form.phone = None;
        assert!(validate_customer_registration(&form).is_ok());
    }

    #[test]
    fn test_partner_registration_valid() {
        let valid = validate_partner_registration(&partner_form()).unwrap();
        assert_eq!(valid.service_type, "plumber");
        assert_eq!(valid.hourly_rate, 45.0);
    }

    #[test]
    fn test_partner_registration_name_bounds() {
        let mut form = partner_form();
        form.first_name = "J".to_string();
        let errors = validate_partner_registration(&form).unwrap_err();
        assert_eq!(
            errors.get("firstName"),
            Some("First name must be at least 2 characters")
        );

        let mut form = partner_form();
        form.last_name = "x".repeat(51);
        let errors = validate_partner_registration(&form).unwrap_err();
        assert_eq!(
            errors.get("lastName"),
            Some("Last name must be less than 50 characters")
        );
    }

    #[test]
    fn test_partner_registration_hourly_rate_bounds() {
        let mut form = partner_form();
        form.hourly_rate = Some(0.5);
        let errors = validate_partner_registration(&form).unwrap_err();
        assert_eq!(
            errors.get("hourlyRate"),
            Some("Hourly rate must be at least $1")
        );

        form.hourly_rate = Some(1200.0);
        let errors = validate_partner_registration(&form).unwrap_err();
        assert_eq!(
            errors.get("hourlyRate"),
            Some("Hourly rate must be less than $1000")
        );

        form.hourly_rate = None;
        let errors = validate_partner_registration(&form).unwrap_err();
        assert_eq!(
            errors.get("hourlyRate"),
            Some("Hourly rate must be at least $1")
        );
    }

    #[test]
    fn test_partner_registration_requires_phone_and_cities() {
        let mut form = partner_form();
        form.phone = String::new();
        form.cities = vec![];
        let errors = validate_partner_registration(&form).unwrap_err();
        assert_eq!(errors.get("phone"), Some("Phone number is required"));
        assert_eq!(errors.get("cities"), Some("Please select at least one city"));
    }

    #[test]
    fn test_phone_rules() {
        assert!(is_valid_phone("+4915112345678"));
        assert!(is_valid_phone("15551234567"));
        assert!(!is_valid_phone("0123456"));
        assert!(!is_valid_phone("+0123456"));
        assert!(!is_valid_phone("123-456"));
        assert!(!is_valid_phone("+99999999999999999"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_partner_registration_rejects_unlisted_profession() {
        let mut form = partner_form();
        form.profession = "astronaut".to_string();
        let errors = validate_partner_registration(&form).unwrap_err();
        assert_eq!(
            errors.get("profession"),
            Some("Please select a profession from the list")
        );
    }

    #[test]
    fn test_booking_request_valid() {
        let form = BookingRequestForm {
            start_time: "2025-06-10T14:00:00".to_string(),
            end_time: "2025-06-10T15:00:00".to_string(),
            country: Some("de".to_string()),
            service_type: Some("plumber".to_string()),
        };
        let valid = validate_booking_request(&form).unwrap();
        assert_eq!(valid.service_type.as_deref(), Some("plumber"));
    }

    #[test]
    fn test_booking_request_rejects_malformed_times() {
        let form = BookingRequestForm {
            start_time: "tomorrow".to_string(),
            end_time: String::new(),
            country: None,
            service_type: None,
        };
        let errors = validate_booking_request(&form).unwrap_err();
        assert_eq!(
            errors.get("startTime"),
            Some("Enter a date and time like 2025-06-10T14:00:00")
        );
        assert_eq!(errors.get("endTime"), Some("This field is required"));
    }

    #[test]
    fn test_booking_request_rejects_inverted_range() {
        let form = BookingRequestForm {
            start_time: "2025-06-10T15:00:00".to_string(),
            end_time: "2025-06-10T14:00:00".to_string(),
            country: None,
            service_type: None,
        };
        let errors = validate_booking_request(&form).unwrap_err();
        assert_eq!(
            errors.get("endTime"),
            Some("End time must be after start time")
        );
    }

    #[test]
    fn test_first_message_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.push("email", "first");
        errors.push("email", "second");
        assert_eq!(errors.get("email"), Some("first"));
    }
}
