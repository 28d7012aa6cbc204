use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel stored when the client address could not be determined.
pub const UNKNOWN_IP: &str = "unknown";

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRegistration {
    pub parent_name: String,
    pub email: String,
    pub phone: String,
    pub child_name: String,
    pub academic_path: String,
    pub message: String,
}

/// What the store is asked to append. The timestamp is left to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    #[serde(flatten)]
    pub registration: NewRegistration,
    pub ip_address: String,
}

impl NewRecord {
    pub fn new(registration: NewRegistration, client_ip: Option<String>) -> Self {
        Self {
            registration,
            ip_address: client_ip.unwrap_or_else(|| UNKNOWN_IP.to_string()),
        }
    }
}

/// A record as it exists in the store, including the store-assigned timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    #[serde(flatten)]
    pub registration: NewRegistration,
    pub ip_address: String,
    pub timestamp: DateTime<Utc>,
}

impl RegistrationRecord {
    pub fn new(record: NewRecord, timestamp: DateTime<Utc>) -> Self {
        Self {
            registration: record.registration,
            ip_address: record.ip_address,
            timestamp,
        }
    }
}

/// Opaque store-assigned identifier. Always safe as a URL path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Acknowledgement of a successful write.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub document_id: DocumentId,
    pub timestamp: DateTime<Utc>,
}
