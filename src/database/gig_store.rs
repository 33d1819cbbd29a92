//! Read-only access to the listing collaborator.
//!
//! Gigs are managed elsewhere; the order lifecycle only needs to look one
//! up to snapshot its fields at purchase time.

use crate::database::error::DatabaseError;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gig {
    pub gig_id: String,
    pub seller_id: String,
    pub title: String,
    pub cover_url: Option<String>,
    pub price_minor: i64,
    pub currency: String,
}

#[async_trait]
pub trait GigStore: Send + Sync {
    async fn find_by_id(&self, gig_id: &str) -> Result<Option<Gig>, DatabaseError>;
}

pub struct PgGigStore {
    pool: PgPool,
}

impl PgGigStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GigStore for PgGigStore {
    async fn find_by_id(&self, gig_id: &str) -> Result<Option<Gig>, DatabaseError> {
        sqlx::query_as::<_, Gig>(
            "SELECT gig_id, seller_id, title, cover_url, price_minor, currency \
             FROM gigs WHERE gig_id = $1",
        )
        .bind(gig_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }
}
