use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{RegistrationStore, StoreError};
use crate::registration::{DocumentId, NewRecord, Receipt, RegistrationRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRegistration {
    pub id: DocumentId,
    pub record: RegistrationRecord,
}

/// In-process store for tests and local runs.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<StoredRegistration>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far, in write order.
    pub fn records(&self) -> Vec<StoredRegistration> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn add(&self, record: &NewRecord) -> Result<Receipt, StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Transport("memory store lock poisoned".to_string()))?;

        // Stamped under the lock so write order and timestamp order agree
        let receipt = Receipt {
            document_id: DocumentId::new(Uuid::new_v4().simple().to_string()),
            timestamp: Utc::now(),
        };

        records.push(StoredRegistration {
            id: receipt.document_id.clone(),
            record: RegistrationRecord::new(record.clone(), receipt.timestamp),
        });

        Ok(receipt)
    }
}
