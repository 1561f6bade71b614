//! Field validators for the customer intake form.
//!
//! Every validator takes the raw input and returns `Ok(())` or the
//! [`ValidationError`] whose `Display` text is shown to the user verbatim.
//! Validators never trim, never panic, and perform no I/O, so the form can
//! call them on every keystroke and the service can call them again before a
//! write.
//!
//! ## Rules
//!
//! | Field       | Required | Rule                                   |
//! |-------------|----------|----------------------------------------|
//! | Name        | yes      | 2 to 100 characters                    |
//! | Email       | yes      | `local@domain.tld`, no spaces          |
//! | Phone       | yes      | 10 or 11 digits once punctuation drops |
//! | Postal code | no       | `00000-000` or `00000000`              |

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::format::strip_digits;
use crate::types::{CustomerUpdate, NewCustomer};

/// Minimum length of a customer name, in characters.
pub const NAME_MIN_LENGTH: usize = 2;

/// Maximum length of a customer name, in characters.
pub const NAME_MAX_LENGTH: usize = 100;

// Deliberately permissive: anything@anything.anything without spaces.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

static CEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}-?[0-9]{3}$").expect("Invalid regex"));

/// A validated form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Email,
    Phone,
    PostalCode,
}

impl Field {
    /// Human-readable label used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::PostalCode => "Postal code",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What went wrong with a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// The field is mandatory and was empty.
    Required,
    /// Shorter than the minimum length.
    TooShort { min: usize },
    /// Longer than the maximum length.
    TooLong { max: usize },
    /// Does not match the expected pattern.
    InvalidFormat,
    /// A phone number without 10 or 11 digits.
    WrongDigitCount,
}

/// A field that failed validation.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("{}", describe(.field, .kind))]
pub struct ValidationError {
    pub field: Field,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    #[must_use]
    pub const fn new(field: Field, kind: ValidationErrorKind) -> Self {
        Self { field, kind }
    }
}

fn describe(field: &Field, kind: &ValidationErrorKind) -> String {
    match (field, kind) {
        (_, ValidationErrorKind::Required) => format!("{field} is required"),
        (_, ValidationErrorKind::TooShort { min }) => {
            format!("{field} must be at least {min} characters")
        }
        (_, ValidationErrorKind::TooLong { max }) => {
            format!("{field} must be at most {max} characters")
        }
        (Field::PostalCode, ValidationErrorKind::InvalidFormat) => {
            "Postal code must match 00000-000".to_string()
        }
        (_, ValidationErrorKind::InvalidFormat) => {
            format!("Invalid {} format", field.label().to_lowercase())
        }
        (_, ValidationErrorKind::WrongDigitCount) => {
            format!("{field} must have 10 or 11 digits")
        }
    }
}

/// Result of a single inline check, as rendered by the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Result<(), ValidationError>> for FieldCheck {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Self {
                valid: true,
                message: None,
            },
            Err(e) => Self {
                valid: false,
                message: Some(e.to_string()),
            },
        }
    }
}

/// Validate a customer's full name.
///
/// # Errors
///
/// `Required` when empty, `TooShort` under 2 characters, `TooLong` over 100.
pub fn validate_name(s: &str) -> Result<(), ValidationError> {
    if s.is_empty() {
        return Err(ValidationError::new(
            Field::Name,
            ValidationErrorKind::Required,
        ));
    }

    let len = s.chars().count();
    if len < NAME_MIN_LENGTH {
        return Err(ValidationError::new(
            Field::Name,
            ValidationErrorKind::TooShort {
                min: NAME_MIN_LENGTH,
            },
        ));
    }
    if len > NAME_MAX_LENGTH {
        return Err(ValidationError::new(
            Field::Name,
            ValidationErrorKind::TooLong {
                max: NAME_MAX_LENGTH,
            },
        ));
    }

    Ok(())
}

/// Validate an email address.
///
/// # Errors
///
/// `Required` when empty, `InvalidFormat` unless it looks like `a@b.c`.
pub fn validate_email(s: &str) -> Result<(), ValidationError> {
    if s.is_empty() {
        return Err(ValidationError::new(
            Field::Email,
            ValidationErrorKind::Required,
        ));
    }
    if !EMAIL_RE.is_match(s) {
        return Err(ValidationError::new(
            Field::Email,
            ValidationErrorKind::InvalidFormat,
        ));
    }
    Ok(())
}

/// Validate a phone number; punctuation and spaces are ignored.
///
/// # Errors
///
/// `Required` when empty, `WrongDigitCount` unless it has 10 or 11 digits.
pub fn validate_phone(s: &str) -> Result<(), ValidationError> {
    if s.is_empty() {
        return Err(ValidationError::new(
            Field::Phone,
            ValidationErrorKind::Required,
        ));
    }
    match strip_digits(s).len() {
        10 | 11 => Ok(()),
        _ => Err(ValidationError::new(
            Field::Phone,
            ValidationErrorKind::WrongDigitCount,
        )),
    }
}

/// Validate a CEP (postal code). The field is optional, so empty passes.
///
/// # Errors
///
/// `InvalidFormat` unless it is 5 digits, an optional hyphen, then 3 digits.
pub fn validate_cep(s: &str) -> Result<(), ValidationError> {
    if s.is_empty() || CEP_RE.is_match(s) {
        Ok(())
    } else {
        Err(ValidationError::new(
            Field::PostalCode,
            ValidationErrorKind::InvalidFormat,
        ))
    }
}

/// Validate a registration form, returning the first failing field.
///
/// Fields are checked in form order: name, email, phone, postal code.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate_new_customer(customer: &NewCustomer) -> Result<(), ValidationError> {
    validate_name(&customer.name)?;
    validate_email(&customer.email)?;
    validate_phone(&customer.phone)?;
    if let Some(cep) = customer.postal_code.as_deref() {
        validate_cep(cep)?;
    }
    Ok(())
}

/// Validate the fields present in a partial update.
///
/// # Errors
///
/// Returns the first [`ValidationError`] among the present fields.
pub fn validate_update(update: &CustomerUpdate) -> Result<(), ValidationError> {
    if let Some(name) = update.name.as_deref() {
        validate_name(name)?;
    }
    if let Some(email) = update.email.as_deref() {
        validate_email(email)?;
    }
    if let Some(phone) = update.phone.as_deref() {
        validate_phone(phone)?;
    }
    if let Some(cep) = update.postal_code.as_deref() {
        validate_cep(cep)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn kind(result: Result<(), ValidationError>) -> Option<ValidationErrorKind> {
        result.err().map(|e| e.kind)
    }

    #[rstest]
    #[case("", Some(ValidationErrorKind::Required))]
    #[case("A", Some(ValidationErrorKind::TooShort { min: 2 }))]
    #[case("Al", None)]
    #[case("Ana Silva", None)]
    #[case("Zoë", None)]
    fn test_validate_name(#[case] input: &str, #[case] expected: Option<ValidationErrorKind>) {
        assert_eq!(kind(validate_name(input)), expected);
    }

    #[test]
    fn test_validate_name_length_bounds() {
        assert!(validate_name(&"a".repeat(100)).is_ok());
        assert_eq!(
            kind(validate_name(&"a".repeat(101))),
            Some(ValidationErrorKind::TooLong { max: 100 })
        );
        // Whitespace is not trimmed.
        assert_eq!(
            kind(validate_name(&" ".repeat(101))),
            Some(ValidationErrorKind::TooLong { max: 100 })
        );
        assert!(validate_name("  ").is_ok());
    }

    #[test]
    fn test_validate_name_counts_characters_not_bytes() {
        // 100 two-byte characters is still 100 characters.
        assert!(validate_name(&"é".repeat(100)).is_ok());
    }

    #[rstest]
    #[case("ana@x.com", true)]
    #[case("user.name+tag@mail.example.com.br", true)]
    #[case("a@b.c", true)]
    #[case("not-an-email", false)]
    #[case("ana@x", false)]
    #[case("@x.com", false)]
    #[case("ana@.com", false)]
    #[case("ana@x.", false)]
    #[case("ana silva@x.com", false)]
    #[case("ana@@x.com", false)]
    fn test_validate_email(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(validate_email(input).is_ok(), valid, "{input}");
    }

    #[test]
    fn test_validate_email_messages() {
        assert_eq!(
            validate_email("").unwrap_err().to_string(),
            "Email is required"
        );
        assert_eq!(
            validate_email("not-an-email").unwrap_err().to_string(),
            "Invalid email format"
        );
    }

    #[rstest]
    #[case("", Some(ValidationErrorKind::Required))]
    #[case("11999998888", None)]
    #[case("(11) 4444-5555", None)]
    #[case("999998888", Some(ValidationErrorKind::WrongDigitCount))]
    #[case("551199999888", Some(ValidationErrorKind::WrongDigitCount))]
    #[case("phone", Some(ValidationErrorKind::WrongDigitCount))]
    fn test_validate_phone(#[case] input: &str, #[case] expected: Option<ValidationErrorKind>) {
        assert_eq!(kind(validate_phone(input)), expected);
    }

    #[rstest]
    #[case("", true)]
    #[case("01310-100", true)]
    #[case("01310100", true)]
    #[case("0131-0100", false)]
    #[case("01310 100", false)]
    #[case("01310-10", false)]
    #[case("01310-1000", false)]
    fn test_validate_cep(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(validate_cep(input).is_ok(), valid, "{input}");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            validate_name("").unwrap_err().to_string(),
            "Name is required"
        );
        assert_eq!(
            validate_name("A").unwrap_err().to_string(),
            "Name must be at least 2 characters"
        );
        assert_eq!(
            validate_name(&"a".repeat(101)).unwrap_err().to_string(),
            "Name must be at most 100 characters"
        );
        assert_eq!(
            validate_phone("123").unwrap_err().to_string(),
            "Phone must have 10 or 11 digits"
        );
        assert_eq!(
            validate_cep("123").unwrap_err().to_string(),
            "Postal code must match 00000-000"
        );
    }

    #[test]
    fn test_field_check_from_result() {
        let ok = FieldCheck::from(validate_email("ana@x.com"));
        assert!(ok.valid);
        assert!(ok.message.is_none());

        let err = FieldCheck::from(validate_email("nope"));
        assert!(!err.valid);
        assert_eq!(err.message.as_deref(), Some("Invalid email format"));
    }

    #[test]
    fn test_validate_new_customer_reports_first_failure() {
        let form = NewCustomer {
            name: "A".to_string(),
            email: "bad".to_string(),
            phone: String::new(),
            ..Default::default()
        };
        assert_eq!(validate_new_customer(&form).unwrap_err().field, Field::Name);

        let form = NewCustomer {
            name: "Ana Silva".to_string(),
            email: "ana@x.com".to_string(),
            phone: "11999998888".to_string(),
            postal_code: Some("123".to_string()),
            ..Default::default()
        };
        assert_eq!(
            validate_new_customer(&form).unwrap_err().field,
            Field::PostalCode
        );
    }

    #[test]
    fn test_validate_update_checks_only_present_fields() {
        assert!(validate_update(&CustomerUpdate::default()).is_ok());

        let update = CustomerUpdate {
            phone: Some("1144445555".to_string()),
            ..Default::default()
        };
        assert!(validate_update(&update).is_ok());

        let update = CustomerUpdate {
            email: Some("nope".to_string()),
            ..Default::default()
        };
        assert_eq!(validate_update(&update).unwrap_err().field, Field::Email);
    }

    proptest! {
        #[test]
        fn prop_phone_valid_iff_ten_or_eleven_digits(
            digits in "[0-9]{0,14}",
            noise in "[ ()+.a-z-]{0,4}",
        ) {
            let input = format!("{noise}{digits}");
            let expected = matches!(digits.len(), 10 | 11);
            prop_assert_eq!(validate_phone(&input).is_ok(), expected);
        }

        #[test]
        fn prop_cep_valid_iff_pattern(s in "[0-9-]{0,10}") {
            let digits_only = s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit());
            let hyphenated = s.len() == 9
                && s.as_bytes().get(5) == Some(&b'-')
                && s.bytes().enumerate().all(|(i, b)| i == 5 || b.is_ascii_digit());
            let expected = s.is_empty() || digits_only || hyphenated;
            prop_assert_eq!(validate_cep(&s).is_ok(), expected);
        }

        #[test]
        fn prop_validators_never_panic(s in "\\PC{0,120}") {
            let _ = validate_name(&s);
            let _ = validate_email(&s);
            let _ = validate_phone(&s);
            let _ = validate_cep(&s);
        }
    }
}
