use crate::error::ApiError;
use crate::model::{Ad, AdUpdate, AnalyticsEvent, EventKind};
use crate::repository::{AdRepository, EventRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

const AD_COLUMNS: &str =
    "id, title, description, image_url, link_url, location, active, created_at, impressions, clicks";

pub struct PostgresRepository {
    pool: Pool<Postgres>,
}

impl PostgresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AdRow {
    id: Uuid,
    title: String,
    description: String,
    image_url: String,
    link_url: String,
    location: Option<Value>,
    active: bool,
    created_at: DateTime<Utc>,
    impressions: i64,
    clicks: i64,
}

impl From<AdRow> for Ad {
    fn from(row: AdRow) -> Self {
        Ad {
            id: row.id,
            ad_id: row.id,
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            link_url: row.link_url,
            location: row.location,
            active: row.active,
            created_at: row.created_at,
            impressions: row.impressions,
            clicks: row.clicks,
        }
    }
}

#[async_trait]
impl AdRepository for PostgresRepository {
    async fn list_active(&self) -> Result<Vec<Ad>, ApiError> {
        let rows: Vec<AdRow> =
            sqlx::query_as(&format!("select {} from ads where active = true", AD_COLUMNS))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Ad::from).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Ad>, ApiError> {
        let row: Option<AdRow> =
            sqlx::query_as(&format!("select {} from ads where id = $1", AD_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Ad::from))
    }

    async fn insert(&self, ad: Ad) -> Result<Ad, ApiError> {
        sqlx::query(
            r#"
              insert into ads(id, title, description, image_url, link_url, location, active, created_at, impressions, clicks)
              values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(ad.id)
        .bind(&ad.title)
        .bind(&ad.description)
        .bind(&ad.image_url)
        .bind(&ad.link_url)
        .bind(&ad.location)
        .bind(ad.active)
        .bind(ad.created_at)
        .bind(ad.impressions)
        .bind(ad.clicks)
        .execute(&self.pool)
        .await?;
        Ok(ad)
    }

    async fn update(&self, id: Uuid, changes: AdUpdate) -> Result<Option<Ad>, ApiError> {
        let row: Option<AdRow> = sqlx::query_as(&format!(
            r#"
              update ads set
                  title = coalesce($2, title),
                  description = coalesce($3, description),
                  image_url = coalesce($4, image_url),
                  link_url = coalesce($5, link_url),
                  location = coalesce($6, location),
                  active = coalesce($7, active)
              where id = $1
              returning {}
            "#,
            AD_COLUMNS
        ))
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(&changes.image_url)
        .bind(&changes.link_url)
        .bind(&changes.location)
        .bind(changes.active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Ad::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("delete from ads where id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn increment_counter(&self, id: Uuid, kind: EventKind) -> Result<(), ApiError> {
        // Single-row atomic increment; matching nothing is fine.
        let query = match kind {
            EventKind::Impression => "update ads set impressions = impressions + 1 where id = $1",
            EventKind::Click => "update ads set clicks = clicks + 1 where id = $1",
        };
        sqlx::query(query).bind(id).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl EventRepository for PostgresRepository {
    async fn append(&self, event: AnalyticsEvent) -> Result<(), ApiError> {
        sqlx::query(
            r#"
              insert into analytics_events(kind, ad_id, created_at, user_location) values ($1, $2, $3, $4)
            "#,
        )
        .bind(event.kind.as_str())
        .bind(&event.ad_id)
        .bind(event.timestamp)
        .bind(&event.user_location)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_by_kind(&self, kind: EventKind) -> Result<i64, ApiError> {
        let count: i64 = sqlx::query_scalar("select count(*) from analytics_events where kind = $1")
            .bind(kind.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
