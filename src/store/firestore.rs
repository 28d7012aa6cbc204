use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Deserialize;
use serde_json::{Value, json};

use super::google_auth::ServiceAccountAuth;
use super::{RegistrationStore, StoreError, excerpt};
use crate::config::FirestoreConfig;
use crate::registration::{DocumentId, NewRecord, Receipt};

const FIRESTORE_API: &str = "https://firestore.googleapis.com/v1";
const AUTO_ID_LEN: usize = 20;

/// Firestore collection accessed through the REST API.
///
/// Each add is a single `commit` that creates the document and sets its
/// `timestamp` field to the server's request time, so ordering follows the
/// store's clock rather than ours.
pub struct FirestoreStore {
    client: reqwest::Client,
    auth: ServiceAccountAuth,
    api_base: String,
    database_path: String,
    collection: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    #[serde(default)]
    write_results: Vec<WriteResult>,
    commit_time: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WriteResult {
    #[serde(default)]
    transform_results: Vec<Value>,
}

impl FirestoreStore {
    pub fn new(config: &FirestoreConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;

        let auth = ServiceAccountAuth::new(client.clone(), &config.client_email, &config.private_key)?;

        Ok(Self {
            client,
            auth,
            api_base: FIRESTORE_API.to_string(),
            database_path: format!(
                "projects/{}/databases/{}",
                config.project_id, config.database_id
            ),
            collection: config.collection.clone(),
        })
    }

    /// Point the store at other API and token endpoints (emulators, test servers).
    pub fn with_endpoints(mut self, api_base: impl Into<String>, token_uri: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.auth = self.auth.with_token_uri(token_uri);
        self
    }

    fn document_name(&self, id: &DocumentId) -> String {
        format!("{}/documents/{}/{}", self.database_path, self.collection, id)
    }

    fn commit_url(&self) -> String {
        format!("{}/{}/documents:commit", self.api_base, self.database_path)
    }
}

#[async_trait]
impl RegistrationStore for FirestoreStore {
    fn name(&self) -> &str {
        "firestore"
    }

    async fn add(&self, record: &NewRecord) -> Result<Receipt, StoreError> {
        let id = auto_id();
        let body = json!({
            "writes": [{
                "update": {
                    "name": self.document_name(&id),
                    "fields": encode_fields(record),
                },
                "currentDocument": { "exists": false },
                "updateTransforms": [{
                    "fieldPath": "timestamp",
                    "setToServerValue": "REQUEST_TIME",
                }],
            }]
        });

        let token = self.auth.access_token().await?;

        let resp = self
            .client
            .post(self.commit_url())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        let commit: CommitResponse = resp
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        let timestamp = server_timestamp(&commit)?;

        Ok(Receipt {
            document_id: id,
            timestamp,
        })
    }
}

/// Random 20-character alphanumeric id, the same shape Firestore assigns itself.
pub fn auto_id() -> DocumentId {
    let id: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LEN)
        .map(char::from)
        .collect();
    DocumentId::new(id)
}

fn encode_fields(record: &NewRecord) -> Value {
    let reg = &record.registration;
    let string = |s: &str| json!({ "stringValue": s });
    json!({
        "parentName": string(&reg.parent_name),
        "email": string(&reg.email),
        "phone": string(&reg.phone),
        "childName": string(&reg.child_name),
        "academicPath": string(&reg.academic_path),
        "message": string(&reg.message),
        "ipAddress": string(&record.ip_address),
    })
}

// The transform result holds the value written to `timestamp`; the commit
// time is the same instant and serves as a fallback.
fn server_timestamp(commit: &CommitResponse) -> Result<DateTime<Utc>, StoreError> {
    let raw = commit
        .write_results
        .first()
        .and_then(|w| w.transform_results.first())
        .and_then(|t| t.get("timestampValue"))
        .and_then(|t| t.as_str())
        .or(commit.commit_time.as_deref())
        .ok_or_else(|| StoreError::Malformed("commit response has no timestamp".to_string()))?;

    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Malformed(format!("bad timestamp {raw:?}: {e}")))
}
