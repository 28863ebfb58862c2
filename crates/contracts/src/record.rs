//! UpdateRecord - the unit of change handed to the scheduler.
//!
//! Records serialize in the producer's wire shape: a flat object carrying
//! the identity key plus arbitrary attribute fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Field name of the identity key at the third-party service
pub const IDENTITY_KEY: &str = "email";

/// A single pending attribute update, keyed by email.
///
/// Immutable once created. The attribute map never contains the identity
/// key itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    /// Identity key at the third-party service
    pub email: String,

    /// Changed attribute name -> new value
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

impl UpdateRecord {
    /// Create a record with no attribute changes yet
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add one changed attribute.
    ///
    /// The identity key itself is never stored as an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if name != IDENTITY_KEY {
            self.attributes.insert(name, value.into());
        }
        self
    }

    /// Check structural validity of the record
    ///
    /// # Errors
    /// Returns `InvalidRecord` for an empty identity key or an empty
    /// attribute set (nothing to submit).
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.email.is_empty() {
            return Err(ContractError::invalid_record(
                "<empty>",
                "identity key is empty",
            ));
        }
        if self.attributes.is_empty() {
            return Err(ContractError::invalid_record(
                &self.email,
                "no changed attributes",
            ));
        }
        Ok(())
    }

    /// Format the changed attributes as `attr1: 'val1', attr2: 'val2'`
    ///
    /// The identity key is excluded; values are single-quoted.
    pub fn attribute_summary(&self) -> String {
        self.attributes
            .iter()
            .map(|(name, value)| format!("{name}: '{value}'"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Producer-side input document: `{"batches": [{"subscribers": [...]}]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBatchFile {
    /// Batches as produced upstream; flattened before scheduling
    pub batches: Vec<UpdateBatch>,
}

/// One batch entry of the input document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBatch {
    /// Pending subscriber updates
    pub subscribers: Vec<UpdateRecord>,
}

impl UpdateBatchFile {
    /// Total record count across all batches
    pub fn record_count(&self) -> usize {
        self.batches.iter().map(|b| b.subscribers.len()).sum()
    }

    /// Flatten the document into a record sequence, preserving order
    pub fn into_records(self) -> Vec<UpdateRecord> {
        self.batches
            .into_iter()
            .flat_map(|batch| batch.subscribers)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_round_trip() {
        let json = r#"{"email":"hellen@acme.com","name":"Hellen","time_zone":"America/Los_Angeles"}"#;
        let record: UpdateRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.email, "hellen@acme.com");
        assert_eq!(record.attributes.len(), 2);
        assert_eq!(record.attributes["name"], "Hellen");

        let back = serde_json::to_string(&record).unwrap();
        let again: UpdateRecord = serde_json::from_str(&back).unwrap();
        assert_eq!(record, again);
    }

    #[test]
    fn test_identity_key_never_an_attribute() {
        let record = UpdateRecord::new("alex@acme.com")
            .with_attribute("email", "other@acme.com")
            .with_attribute("time_zone", "Europe/Amsterdam");

        assert_eq!(record.email, "alex@acme.com");
        assert!(!record.attributes.contains_key(IDENTITY_KEY));
    }

    #[test]
    fn test_attribute_summary_format() {
        let record = UpdateRecord::new("hellen@acme.com")
            .with_attribute("name", "Hellen")
            .with_attribute("time_zone", "America/Los_Angeles");

        assert_eq!(
            record.attribute_summary(),
            "name: 'Hellen', time_zone: 'America/Los_Angeles'"
        );
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(UpdateRecord::new("").validate().is_err());
        assert!(UpdateRecord::new("a@b.com").validate().is_err());
        assert!(UpdateRecord::new("a@b.com")
            .with_attribute("name", "A")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_batch_file_parse() {
        let json = r#"{
            "batches": [{
                "subscribers": [
                    { "email": "alex@acme.com", "time_zone": "Europe/Amsterdam" },
                    { "email": "hellen@acme.com", "name": "Hellen", "time_zone": "America/Los_Angeles" }
                ]
            }]
        }"#;

        let file: UpdateBatchFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.record_count(), 2);

        let records = file.into_records();
        assert_eq!(records[0].email, "alex@acme.com");
        assert_eq!(records[1].attributes["name"], "Hellen");
    }
}
