//! Persistence of published locations.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Location;

/// Storage for location records; handlers only ever insert.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Persist a record and return its generated id.
    async fn insert(&self, location: &Location) -> Result<Uuid, ApiError>;
}

/// Postgres-backed location storage
#[derive(Clone)]
pub struct PgLocationRepository {
    pool: PgPool,
}

impl PgLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationStore for PgLocationRepository {
    async fn insert(&self, location: &Location) -> Result<Uuid, ApiError> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO locations (
                id, "user", device, latitude, longitude, address,
                reported_at, accuracy, battery, trigger_type, connection, tracker_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(id)
        .bind(&location.user)
        .bind(&location.device)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(&location.address)
        .bind(location.timestamp)
        .bind(location.accuracy)
        .bind(location.battery)
        .bind(&location.trigger)
        .bind(&location.connection)
        .bind(&location.tracker_id)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }
}
