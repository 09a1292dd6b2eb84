use crate::error::ApiError;
use crate::model::{Ad, AdUpdate, AnalyticsEvent, EventKind};
use crate::repository::{AdRepository, EventRepository};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Mutex-guarded lists, used in tests and when no database is configured.
#[derive(Default)]
pub struct InMemoryRepository {
    ads: Mutex<Vec<Ad>>,
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl AdRepository for InMemoryRepository {
    async fn list_active(&self) -> Result<Vec<Ad>, ApiError> {
        let ads = lock(&self.ads);
        Ok(ads.iter().filter(|ad| ad.active).cloned().collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Ad>, ApiError> {
        let ads = lock(&self.ads);
        Ok(ads.iter().find(|ad| ad.id == id).cloned())
    }

    async fn insert(&self, ad: Ad) -> Result<Ad, ApiError> {
        let mut ads = lock(&self.ads);
        ads.push(ad.clone());
        Ok(ad)
    }

    async fn update(&self, id: Uuid, changes: AdUpdate) -> Result<Option<Ad>, ApiError> {
        let mut ads = lock(&self.ads);
        let Some(ad) = ads.iter_mut().find(|ad| ad.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            ad.title = title;
        }
        if let Some(description) = changes.description {
            ad.description = description;
        }
        if let Some(image_url) = changes.image_url {
            ad.image_url = image_url;
        }
        if let Some(link_url) = changes.link_url {
            ad.link_url = link_url;
        }
        if let Some(location) = changes.location {
            ad.location = Some(location);
        }
        if let Some(active) = changes.active {
            ad.active = active;
        }
        Ok(Some(ad.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut ads = lock(&self.ads);
        let before = ads.len();
        ads.retain(|ad| ad.id != id);
        Ok(ads.len() < before)
    }

    async fn increment_counter(&self, id: Uuid, kind: EventKind) -> Result<(), ApiError> {
        let mut ads = lock(&self.ads);
        if let Some(ad) = ads.iter_mut().find(|ad| ad.id == id) {
            match kind {
                EventKind::Impression => ad.impressions += 1,
                EventKind::Click => ad.clicks += 1,
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EventRepository for InMemoryRepository {
    async fn append(&self, event: AnalyticsEvent) -> Result<(), ApiError> {
        let mut events = lock(&self.events);
        events.push(event);
        Ok(())
    }

    async fn count_by_kind(&self, kind: EventKind) -> Result<i64, ApiError> {
        let events = lock(&self.events);
        Ok(events.iter().filter(|event| event.kind == kind).count() as i64)
    }
}
