//! Emergency contact data model and in-memory registry.
//!
//! Contacts live for the duration of a session only; the registry is
//! mutated by explicit user actions on a single thread, so no locking is
//! involved.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::ContactsConfig;
use crate::error::{Error, Result};

/// Strip every non-digit character from a phone number.
///
/// All delivery channels address contacts by bare digits, so
/// `"+1 (555) 123-4567"` becomes `"15551234567"`.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// A person (or helpline) to alert in an emergency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    /// Unique id within the contact book.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Phone number as entered by the user.
    pub phone: String,

    /// Relationship label ("Family", "Police", ...).
    pub relationship: String,
}

impl EmergencyContact {
    /// Create a contact with an explicit id.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        phone: impl Into<String>,
        relationship: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: phone.into(),
            relationship: relationship.into(),
        }
    }

    /// The phone number reduced to bare digits.
    #[must_use]
    pub fn normalized_phone(&self) -> String {
        normalize_phone(&self.phone)
    }

    /// Whether any channel can address this contact at all.
    #[must_use]
    pub fn is_dispatchable(&self) -> bool {
        !self.normalized_phone().is_empty()
    }
}

/// User input for a new contact, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    /// Display name (required).
    pub name: String,
    /// Phone number (required).
    pub phone: String,
    /// Relationship label (optional, defaults to "Contact").
    pub relationship: Option<String>,
}

/// In-memory registry of emergency contacts.
///
/// Exists for the lifetime of the session; nothing is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactBook {
    contacts: Vec<EmergencyContact>,
}

impl ContactBook {
    /// Create an empty contact book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a contact book seeded from configuration.
    ///
    /// Seed contacts receive sequential ids starting at 1.
    #[must_use]
    pub fn from_config(config: &ContactsConfig) -> Self {
        let contacts = config
            .seed
            .iter()
            .enumerate()
            .map(|(i, seed)| {
                EmergencyContact::new(
                    (i + 1).to_string(),
                    seed.name.clone(),
                    seed.phone.clone(),
                    seed.relationship.clone(),
                )
            })
            .collect();
        Self { contacts }
    }

    /// Validate and add a contact from user input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] when the name or phone number is
    /// empty; no partial contact is created in that case.
    pub fn add(&mut self, draft: ContactDraft) -> Result<EmergencyContact> {
        if draft.name.trim().is_empty() {
            return Err(Error::MissingField { field: "name" });
        }
        if draft.phone.trim().is_empty() {
            return Err(Error::MissingField { field: "phone" });
        }

        let id = self.next_id();
        let contact = EmergencyContact::new(
            id,
            draft.name,
            draft.phone,
            draft.relationship.unwrap_or_else(|| "Contact".to_string()),
        );
        self.contacts.push(contact.clone());
        Ok(contact)
    }

    /// Remove the contact with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContactNotFound`] if no contact has that id.
    pub fn remove(&mut self, id: &str) -> Result<EmergencyContact> {
        match self.contacts.iter().position(|c| c.id == id) {
            Some(index) => Ok(self.contacts.remove(index)),
            None => Err(Error::ContactNotFound { id: id.to_string() }),
        }
    }

    /// Look up a contact by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&EmergencyContact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    /// All contacts, in registration order.
    #[must_use]
    pub fn contacts(&self) -> &[EmergencyContact] {
        &self.contacts
    }

    /// Number of registered contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Whether the book holds no contacts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Generate a unique millisecond-timestamp id, bumped on collision.
    fn next_id(&self) -> String {
        let mut candidate = Utc::now().timestamp_millis();
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, phone: &str) -> ContactDraft {
        ContactDraft {
            name: name.to_string(),
            phone: phone.to_string(),
            relationship: None,
        }
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+1 (555) 123-4567"), "15551234567");
        assert_eq!(normalize_phone("100"), "100");
        assert_eq!(normalize_phone("no digits"), "");
        assert_eq!(normalize_phone(""), "");
    }

    #[test]
    fn test_contact_normalized_phone() {
        let contact = EmergencyContact::new("1", "Helpline", "+1 (555) 123-4567", "Support");
        assert_eq!(contact.normalized_phone(), "15551234567");
    }

    #[test]
    fn test_contact_is_dispatchable() {
        let contact = EmergencyContact::new("1", "Helpline", "100", "Police");
        assert!(contact.is_dispatchable());

        let bad = EmergencyContact::new("2", "Nobody", "---", "Contact");
        assert!(!bad.is_dispatchable());
    }

    #[test]
    fn test_book_add() {
        let mut book = ContactBook::new();
        let added = book.add(draft("Aunt May", "555-0101")).unwrap();
        assert_eq!(added.name, "Aunt May");
        assert_eq!(added.relationship, "Contact");
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_book_add_with_relationship() {
        let mut book = ContactBook::new();
        let added = book
            .add(ContactDraft {
                name: "Dad".to_string(),
                phone: "555-0102".to_string(),
                relationship: Some("Family".to_string()),
            })
            .unwrap();
        assert_eq!(added.relationship, "Family");
    }

    #[test]
    fn test_book_add_missing_name() {
        let mut book = ContactBook::new();
        let result = book.add(draft("  ", "555-0101"));
        assert!(matches!(result, Err(Error::MissingField { field: "name" })));
        assert!(book.is_empty());
    }

    #[test]
    fn test_book_add_missing_phone() {
        let mut book = ContactBook::new();
        let result = book.add(draft("Aunt May", ""));
        assert!(matches!(
            result,
            Err(Error::MissingField { field: "phone" })
        ));
        assert!(book.is_empty());
    }

    #[test]
    fn test_book_ids_unique() {
        let mut book = ContactBook::new();
        let a = book.add(draft("A", "1")).unwrap().id.clone();
        let b = book.add(draft("B", "2")).unwrap().id.clone();
        let c = book.add(draft("C", "3")).unwrap().id.clone();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_book_remove() {
        let mut book = ContactBook::new();
        let id = book.add(draft("A", "1")).unwrap().id.clone();
        let removed = book.remove(&id).unwrap();
        assert_eq!(removed.name, "A");
        assert!(book.is_empty());
    }

    #[test]
    fn test_book_remove_unknown() {
        let mut book = ContactBook::new();
        let result = book.remove("missing");
        assert!(matches!(result, Err(Error::ContactNotFound { .. })));
    }

    #[test]
    fn test_book_order_preserved() {
        let mut book = ContactBook::new();
        book.add(draft("First", "1")).unwrap();
        book.add(draft("Second", "2")).unwrap();
        let names: Vec<_> = book.contacts().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["First", "Second"]);
    }

    #[test]
    fn test_book_from_config() {
        let book = ContactBook::from_config(&ContactsConfig::default());
        assert_eq!(book.len(), 2);
        assert_eq!(book.contacts()[0].id, "1");
        assert_eq!(book.contacts()[0].phone, "100");
        assert_eq!(book.contacts()[1].id, "2");
        assert_eq!(book.contacts()[1].relationship, "Support");
    }

    #[test]
    fn test_contact_serialization() {
        let contact = EmergencyContact::new("1", "Helpline", "100", "Police");
        let json = serde_json::to_string(&contact).unwrap();
        let parsed: EmergencyContact = serde_json::from_str(&json).unwrap();
        assert_eq!(contact, parsed);
    }
}
