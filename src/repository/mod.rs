mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

use crate::error::ApiError;
use crate::model::{Ad, AdUpdate, AnalyticsEvent, EventKind};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Storage interface for the ads collection. Identifier parsing happens
/// before this boundary; implementations only see well-formed ids.
#[async_trait]
pub trait AdRepository: Send + Sync {
    async fn list_active(&self) -> Result<Vec<Ad>, ApiError>;

    async fn find(&self, id: Uuid) -> Result<Option<Ad>, ApiError>;

    async fn insert(&self, ad: Ad) -> Result<Ad, ApiError>;

    /// Applies the fields present in `changes` and returns the post-update
    /// record, or `None` when no record matches.
    async fn update(&self, id: Uuid, changes: AdUpdate) -> Result<Option<Ad>, ApiError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;

    /// Single-record counter increment; a no-op when the id matches nothing.
    async fn increment_counter(&self, id: Uuid, kind: EventKind) -> Result<(), ApiError>;
}

/// Storage interface for the append-only analytics events collection.
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn append(&self, event: AnalyticsEvent) -> Result<(), ApiError>;

    async fn count_by_kind(&self, kind: EventKind) -> Result<i64, ApiError>;
}

pub type DynAdRepository = Arc<dyn AdRepository>;
pub type DynEventRepository = Arc<dyn EventRepository>;
