use crate::error::ApiError;
use crate::model::{
    Ad, AdSpecification, AdUpdate, AnalyticsEvent, AnalyticsStats, EventKind, TrackingRequest,
};
use crate::repository::{DynAdRepository, DynEventRepository};
use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

/// Owns the ads collection: validation, defaults, random pick and the
/// counter increments driven by the analytics recorder.
#[derive(Clone)]
pub struct AdStore {
    repository: DynAdRepository,
}

impl AdStore {
    pub fn new(repository: DynAdRepository) -> Self {
        Self { repository }
    }

    pub async fn list_active(&self) -> Result<Vec<Ad>, ApiError> {
        self.repository.list_active().await
    }

    pub async fn random_active(&self) -> Result<Ad, ApiError> {
        let mut ads = self.repository.list_active().await?;
        if ads.is_empty() {
            return Err(ApiError::NotFound("No ads available"));
        }
        let index = rand::thread_rng().gen_range(0..ads.len());
        Ok(ads.swap_remove(index))
    }

    pub async fn get(&self, id: &str) -> Result<Ad, ApiError> {
        let id = parse_ad_id(id)?;
        self.repository
            .find(id)
            .await?
            .ok_or(ApiError::NotFound("Ad not found"))
    }

    pub async fn create(&self, specification: AdSpecification) -> Result<Ad, ApiError> {
        let title = specification
            .title
            .ok_or(ApiError::MissingField("title"))?;
        let description = specification
            .description
            .ok_or(ApiError::MissingField("description"))?;
        let image_url = specification
            .image_url
            .ok_or(ApiError::MissingField("image_url"))?;
        let link_url = specification
            .link_url
            .ok_or(ApiError::MissingField("link_url"))?;

        let id = Uuid::new_v4();
        let ad = Ad {
            id,
            ad_id: id,
            title,
            description,
            image_url,
            link_url,
            location: specification.location,
            active: specification.active.unwrap_or(true),
            created_at: Utc::now(),
            impressions: 0,
            clicks: 0,
        };
        self.repository.insert(ad).await
    }

    pub async fn update(&self, id: &str, changes: AdUpdate) -> Result<Ad, ApiError> {
        if changes.is_empty() {
            return Err(ApiError::Validation("No fields to update"));
        }
        let id = parse_ad_id(id)?;
        self.repository
            .update(id, changes)
            .await?
            .ok_or(ApiError::NotFound("Ad not found"))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let id = parse_ad_id(id)?;
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound("Ad not found"))
        }
    }

    pub async fn increment_counter(&self, id: &str, kind: EventKind) -> Result<(), ApiError> {
        let id = parse_ad_id(id)?;
        self.repository.increment_counter(id, kind).await
    }
}

fn parse_ad_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::InvalidId)
}

/// Owns the append-only events collection; holds an `AdStore` handle for
/// the best-effort counter increments.
#[derive(Clone)]
pub struct AnalyticsRecorder {
    events: DynEventRepository,
    ads: AdStore,
}

impl AnalyticsRecorder {
    pub fn new(events: DynEventRepository, ads: AdStore) -> Self {
        Self { events, ads }
    }

    /// Persists the event, then attempts the counter increment on the
    /// referenced ad. The increment is fire-and-forget: a malformed or
    /// unknown `ad_id` still leaves the event recorded.
    pub async fn record_event(
        &self,
        kind: EventKind,
        request: TrackingRequest,
    ) -> Result<(), ApiError> {
        let ad_id = request.ad_id.ok_or(ApiError::Validation("Missing ad_id"))?;
        let event = AnalyticsEvent {
            kind,
            ad_id: ad_id.clone(),
            timestamp: Utc::now(),
            user_location: request.location,
        };
        self.events.append(event).await?;

        match self.ads.increment_counter(&ad_id, kind).await {
            Ok(()) => tracing::debug!("{} counter updated for ad {}", kind, ad_id),
            Err(err) => {
                tracing::debug!("Skipped {} counter update for ad {}: {}", kind, ad_id, err)
            }
        }
        Ok(())
    }

    pub async fn stats(&self) -> Result<AnalyticsStats, ApiError> {
        let total_impressions = self.events.count_by_kind(EventKind::Impression).await?;
        let total_clicks = self.events.count_by_kind(EventKind::Click).await?;
        Ok(AnalyticsStats {
            total_impressions,
            total_clicks,
            ctr: click_through_rate(total_impressions, total_clicks),
        })
    }
}

/// Percentage of clicks over impressions, rounded to two decimals; 0 when
/// there are no impressions.
fn click_through_rate(impressions: i64, clicks: i64) -> f64 {
    if impressions <= 0 {
        return 0.0;
    }
    (clicks as f64 / impressions as f64 * 10000.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use std::sync::Arc;

    fn stores() -> (AdStore, AnalyticsRecorder) {
        let repository = Arc::new(InMemoryRepository::new());
        let ads = AdStore::new(repository.clone());
        let analytics = AnalyticsRecorder::new(repository, ads.clone());
        (ads, analytics)
    }

    fn specification() -> AdSpecification {
        AdSpecification {
            title: Some("Coffee near campus".into()),
            description: Some("Half price before 9am".into()),
            image_url: Some("https://cdn.example.com/coffee.png".into()),
            link_url: Some("https://example.com/coffee".into()),
            location: None,
            active: None,
        }
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let (ads, _) = stores();
        let ad = ads.create(specification()).await.unwrap();
        assert!(ad.active);
        assert_eq!(ad.impressions, 0);
        assert_eq!(ad.clicks, 0);
        assert!(ad.location.is_none());
        assert_eq!(ad.id, ad.ad_id);
    }

    #[tokio::test]
    async fn create_reports_first_missing_field() {
        let (ads, _) = stores();
        let result = ads
            .create(AdSpecification {
                title: None,
                description: None,
                ..specification()
            })
            .await;
        assert!(
            matches!(result, Err(ApiError::MissingField("title"))),
            "title should be reported before description"
        );
    }

    #[tokio::test]
    async fn update_without_fields_is_rejected() {
        let (ads, _) = stores();
        let ad = ads.create(specification()).await.unwrap();
        let result = ads.update(&ad.id.to_string(), AdUpdate::default()).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn malformed_id_is_rejected_before_the_store() {
        let (ads, _) = stores();
        assert!(matches!(ads.get("not-a-uuid").await, Err(ApiError::InvalidId)));
        assert!(matches!(
            ads.delete("not-a-uuid").await,
            Err(ApiError::InvalidId)
        ));
    }

    #[tokio::test]
    async fn recording_increments_counter_and_totals() {
        let (ads, analytics) = stores();
        let ad = ads.create(specification()).await.unwrap();
        analytics
            .record_event(
                EventKind::Impression,
                TrackingRequest {
                    ad_id: Some(ad.id.to_string()),
                    location: None,
                },
            )
            .await
            .unwrap();

        let stats = analytics.stats().await.unwrap();
        assert_eq!(stats.total_impressions, 1);
        let refreshed = ads.get(&ad.id.to_string()).await.unwrap();
        assert_eq!(refreshed.impressions, 1);
    }

    #[tokio::test]
    async fn recording_for_unknown_ad_still_persists_the_event() {
        let (_, analytics) = stores();
        analytics
            .record_event(
                EventKind::Click,
                TrackingRequest {
                    ad_id: Some("no-such-ad".into()),
                    location: None,
                },
            )
            .await
            .unwrap();
        let stats = analytics.stats().await.unwrap();
        assert_eq!(stats.total_clicks, 1);
    }

    #[test]
    fn ctr_is_zero_without_impressions() {
        assert_eq!(click_through_rate(0, 5), 0.0);
    }

    #[test]
    fn ctr_is_a_rounded_percentage() {
        assert_eq!(click_through_rate(50, 10), 20.0);
        assert_eq!(click_through_rate(3, 1), 33.33);
    }
}
