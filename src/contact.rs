//! Contact record and patch types.

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::ContactId;

/// One person's contact details.
///
/// Every text field is trimmed of leading and trailing whitespace whenever it
/// is assigned, including during deserialization. The id is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Contact {
    id: ContactId,
    #[serde(deserialize_with = "trimmed")]
    first_name: String,
    #[serde(deserialize_with = "trimmed")]
    last_name: String,
    #[serde(deserialize_with = "trimmed")]
    phone: String,
    #[serde(deserialize_with = "trimmed")]
    email: String,
}

impl Contact {
    /// Creates a contact with a fresh id.
    pub fn new(first_name: &str, last_name: &str, phone: &str, email: &str) -> Self {
        Self::with_id(ContactId::new(), first_name, last_name, phone, email)
    }

    /// Creates a contact with a caller-supplied id.
    pub fn with_id(id: ContactId, first_name: &str, last_name: &str, phone: &str, email: &str) -> Self {
        Self {
            id,
            first_name: trim(first_name),
            last_name: trim(last_name),
            phone: trim(phone),
            email: trim(email),
        }
    }

    /// Creates a contact with all text fields empty and a fresh id.
    pub fn blank() -> Self {
        Self::new("", "", "", "")
    }

    /// Stable identifier.
    pub fn id(&self) -> ContactId {
        self.id
    }

    /// First name.
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Last name.
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Phone number, free-form.
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Email address, free-form.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Replaces the first name (trimmed).
    pub fn set_first_name(&mut self, value: &str) {
        assign_trimmed(&mut self.first_name, value);
    }

    /// Replaces the last name (trimmed).
    pub fn set_last_name(&mut self, value: &str) {
        assign_trimmed(&mut self.last_name, value);
    }

    /// Replaces the phone number (trimmed).
    pub fn set_phone(&mut self, value: &str) {
        assign_trimmed(&mut self.phone, value);
    }

    /// Replaces the email address (trimmed).
    pub fn set_email(&mut self, value: &str) {
        assign_trimmed(&mut self.email, value);
    }

    /// First and last name joined by a space, without a stray separator when
    /// either is missing.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// True when every text field is empty. The id is ignored.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_empty()
            && self.last_name.is_empty()
            && self.phone.is_empty()
            && self.email.is_empty()
    }

    /// Orders by last name, then first name. Byte-wise and case-sensitive.
    ///
    /// Two contacts with the same names compare `Equal` even when their ids
    /// differ, which is why this is not an [`Ord`] impl.
    pub fn compare(a: &Contact, b: &Contact) -> Ordering {
        a.last_name
            .cmp(&b.last_name)
            .then_with(|| a.first_name.cmp(&b.first_name))
    }
}

/// Sparse patch where each `Some` field overwrites the contact value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactPatch {
    /// Optional replacement for the first name.
    pub first_name: Option<String>,
    /// Optional replacement for the last name.
    pub last_name: Option<String>,
    /// Optional replacement for the phone number.
    pub phone: Option<String>,
    /// Optional replacement for the email address.
    pub email: Option<String>,
}

impl ContactPatch {
    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// True when applying this patch may move the contact in sorted order.
    pub fn touches_name(&self) -> bool {
        self.first_name.is_some() || self.last_name.is_some()
    }

    /// Applies this patch in place through the trimming setters.
    pub fn apply_to(&self, contact: &mut Contact) {
        if let Some(v) = &self.first_name {
            contact.set_first_name(v);
        }
        if let Some(v) = &self.last_name {
            contact.set_last_name(v);
        }
        if let Some(v) = &self.phone {
            contact.set_phone(v);
        }
        if let Some(v) = &self.email {
            contact.set_email(v);
        }
    }
}

fn trim(value: &str) -> String {
    value.trim().to_string()
}

fn assign_trimmed(field: &mut String, value: &str) {
    let value = value.trim();
    if field != value {
        field.clear();
        field.push_str(value);
    }
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(trim(&raw))
}
