//! Person record and its identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Person identifier (database primary key).
///
/// The store assigns identifiers on insert. `0` means "not yet persisted" and
/// is never a valid key for a stored record.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PersonId(i64);

impl PersonId {
    /// Sentinel for a record the store has not assigned a key to.
    pub const UNASSIGNED: PersonId = PersonId(0);

    pub const fn new(value: i64) -> Self {
        PersonId(value)
    }

    pub const fn value(&self) -> i64 {
        self.0
    }

    pub const fn is_unassigned(&self) -> bool {
        self.0 == 0
    }
}

impl From<i64> for PersonId {
    fn from(value: i64) -> Self {
        PersonId(value)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A person record as stored in the `Person` table.
///
/// JSON field names follow the wire format: `id`, `email`, `phone`,
/// `firstname`, `lastname`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub id: PersonId,
    pub email: String,
    pub phone: String,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
}

impl Person {
    /// Creates an unsaved person (id is [`PersonId::UNASSIGNED`]).
    pub fn new(
        email: impl Into<String>,
        phone: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: PersonId::UNASSIGNED,
            email: email.into(),
            phone: phone.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn with_id(mut self, id: PersonId) -> Self {
        self.id = id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_person_is_unassigned() {
        let person = Person::new("a@b.com", "555", "A", "B");
        assert!(person.id.is_unassigned());
        assert_eq!(person.with_id(PersonId::new(7)).id.value(), 7);
    }

    #[test]
    fn test_person_json_field_names() {
        let person = Person::new("a@b.com", "555", "A", "B").with_id(PersonId::new(3));
        let value = serde_json::to_value(&person).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 3,
                "email": "a@b.com",
                "phone": "555",
                "firstname": "A",
                "lastname": "B"
            })
        );
    }

    #[test]
    fn test_missing_id_deserializes_as_unassigned() {
        let person: Person = serde_json::from_str(
            r#"{"email":"a@b.com","phone":"555","firstname":"A","lastname":"B"}"#,
        )
        .unwrap();
        assert_eq!(person.id, PersonId::UNASSIGNED);
    }
}
