//! Customer record types.
//!
//! [`CustomerRecord`] is the single stored entity. [`NewCustomer`] is what the
//! intake form submits and [`CustomerUpdate`] is an explicit partial update:
//! every mutable attribute is optional and absent fields are left untouched.

use serde::{Deserialize, Serialize};

use super::id::CustomerId;

/// A customer as stored in the backing sheet.
///
/// Text attributes that were absent in storage are empty strings, never
/// `None`, so the presentation layer can render them directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub id: CustomerId,
    /// Client-facing code; not guaranteed unique.
    pub customer_code: String,
    pub name: String,
    pub email: String,
    /// Stored formatted, e.g. `(11) 99999-8888`.
    pub phone: String,
    pub address: String,
    pub city: String,
    /// Two-letter state code.
    pub state: String,
    pub postal_code: String,
    /// How the customer found us (free text, e.g. "Instagram").
    pub acquisition_source: String,
    pub service_type: String,
    pub completed: bool,
    pub observations: String,
    /// `DD/MM/YYYY`, set once at registration.
    pub registered_at: String,
}

/// Registration form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    #[serde(default)]
    pub customer_code: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub acquisition_source: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub observations: Option<String>,
}

/// Partial update of a stored customer.
///
/// The identifier and registration date are immutable and therefore absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdate {
    #[serde(default)]
    pub customer_code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub acquisition_source: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub observations: Option<String>,
}

impl CustomerUpdate {
    /// Returns `true` if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.customer_code.is_none()
            && self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.postal_code.is_none()
            && self.acquisition_source.is_none()
            && self.service_type.is_none()
            && self.completed.is_none()
            && self.observations.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_customer_optional_fields_default() {
        let json = r#"{"name":"Ana Silva","email":"ana@x.com","phone":"11999998888"}"#;
        let form: NewCustomer = serde_json::from_str(json).unwrap();
        assert_eq!(form.name, "Ana Silva");
        assert!(form.postal_code.is_none());
        assert!(form.customer_code.is_none());
    }

    #[test]
    fn test_update_is_empty() {
        assert!(CustomerUpdate::default().is_empty());

        let update = CustomerUpdate {
            completed: Some(false),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_update_deserializes_camel_case() {
        let json = r#"{"postalCode":"01310-100","completed":true}"#;
        let update: CustomerUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.postal_code.as_deref(), Some("01310-100"));
        assert_eq!(update.completed, Some(true));
        assert!(update.name.is_none());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = CustomerRecord {
            id: CustomerId::new(1),
            customer_code: "CLI-AB12CD".to_string(),
            name: "Ana Silva".to_string(),
            email: "ana@x.com".to_string(),
            phone: "(11) 99999-8888".to_string(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            acquisition_source: String::new(),
            service_type: String::new(),
            completed: false,
            observations: String::new(),
            registered_at: "01/02/2026".to_string(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["customerCode"], "CLI-AB12CD");
        assert_eq!(value["registeredAt"], "01/02/2026");
        assert_eq!(value["id"], 1);
    }
}
