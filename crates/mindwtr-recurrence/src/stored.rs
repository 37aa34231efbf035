//! Persisted shape of a task's `recurrence` field.
//!
//! Older records store a bare rule name (`"weekly"`); newer ones store an
//! object that may carry any mix of rule name, strategy, weekday list and
//! rule string. Both shapes are accepted on read. Writes always use the
//! object form with every field filled in.

use serde::{Deserialize, Serialize};

/// A recurrence as it appears in stored task data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredRecurrence {
    /// Bare string: a rule name, or in some exports a full rule string.
    Legacy(String),
    Object(StoredRecurrenceObject),
}

/// Object form of a stored recurrence. Every field is optional on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecurrenceObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_day: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rrule: Option<String>,
}

impl StoredRecurrence {
    /// Views either shape as an object.
    ///
    /// A legacy string holding a rule name becomes `{ rule }`; anything else
    /// (such as `"FREQ=DAILY"`) is treated as a rule string.
    #[must_use]
    pub fn to_object(&self) -> StoredRecurrenceObject {
        match self {
            Self::Object(object) => object.clone(),
            Self::Legacy(value) => {
                let trimmed = value.trim();
                if mindwtr_rrule::Frequency::parse(trimmed).is_some() {
                    StoredRecurrenceObject {
                        rule: Some(trimmed.to_string()),
                        ..StoredRecurrenceObject::default()
                    }
                } else {
                    StoredRecurrenceObject {
                        rrule: Some(trimmed.to_string()),
                        ..StoredRecurrenceObject::default()
                    }
                }
            }
        }
    }
}

impl From<StoredRecurrenceObject> for StoredRecurrence {
    fn from(object: StoredRecurrenceObject) -> Self {
        Self::Object(object)
    }
}
