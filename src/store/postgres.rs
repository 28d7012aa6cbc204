use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::{RegistrationStore, StoreError};
use crate::registration::{DocumentId, NewRecord, Receipt};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and apply pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, String> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| format!("Failed to connect to database: {e}"))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| format!("Failed to run migrations: {e}"))?;

        tracing::info!("Migrations applied");

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationStore for PgStore {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn add(&self, record: &NewRecord) -> Result<Receipt, StoreError> {
        let reg = &record.registration;
        let (id, created_at) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            "INSERT INTO registrations
                (parent_name, email, phone, child_name, academic_path, message, ip_address)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, created_at",
        )
        .bind(&reg.parent_name)
        .bind(&reg.email)
        .bind(&reg.phone)
        .bind(&reg.child_name)
        .bind(&reg.academic_path)
        .bind(&reg.message)
        .bind(&record.ip_address)
        .fetch_one(&self.pool)
        .await?;

        Ok(Receipt {
            document_id: DocumentId::new(id.to_string()),
            timestamp: created_at,
        })
    }
}
