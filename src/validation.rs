//! Per-field validation errors for the JSON endpoints.

use std::{collections::BTreeMap, fmt::Display};

use serde::Serialize;

use crate::Error;

/// A map of request field name to a message describing why the field was
/// rejected.
///
/// Keys are the camelCase field names from the request body so the client
/// can attach each message to the offending input. Validation collects every
/// failing field before responding, rather than stopping at the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    /// Create an empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`, replacing any earlier message for the
    /// same field.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Whether any field has been rejected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The message recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Convert the accumulated errors into a result: `Ok` when every field
    /// passed, otherwise [Error::Validation] carrying the map.
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().copied().collect();

        write!(f, "{}", fields.join(", "))
    }
}
