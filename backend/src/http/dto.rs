//! Data Transfer Objects for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::models::{Person, PersonId};

/// Request body for creating or updating a person.
///
/// Missing string fields decode as empty and are caught by [`validate`],
/// so a structurally valid body with absent fields is a validation failure
/// rather than a decode failure.
///
/// [`validate`]: PersonPayload::validate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonPayload {
    #[serde(default)]
    pub id: PersonId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
}

impl PersonPayload {
    /// Check that every required field is present and non-empty.
    ///
    /// Returns the names of the offending fields on failure.
    pub fn validate(self) -> Result<Person, Vec<&'static str>> {
        let missing: Vec<&'static str> = [
            ("email", &self.email),
            ("phone", &self.phone),
            ("firstname", &self.firstname),
            ("lastname", &self.lastname),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(Person {
            id: self.id,
            email: self.email,
            phone: self.phone,
            first_name: self.firstname,
            last_name: self.lastname,
        })
    }
}

/// Query string carrying the `id` parameter.
///
/// Kept as raw text so a malformed id can be reported distinctly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    pub fn parse(&self) -> Result<PersonId, String> {
        let raw = self
            .id
            .as_deref()
            .ok_or_else(|| "missing id query parameter".to_string())?;
        raw.trim()
            .parse::<i64>()
            .map(PersonId::new)
            .map_err(|e| format!("invalid id '{}': {}", raw, e))
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
