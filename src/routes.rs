use crate::error::ApiError;
use crate::model::{AdSpecification, AdUpdate, EventKind, TrackingRequest};
use crate::service::{AdStore, AnalyticsRecorder};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub ads: AdStore,
    pub analytics: AnalyticsRecorder,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api", get(health))
        .route("/api/ads", get(get_all_ads).post(create_ad))
        .route("/api/ads/random", get(get_random_ad))
        .route(
            "/api/ads/:id",
            get(get_ad_by_id).put(update_ad).delete(delete_ad),
        )
        .route("/api/analytics/impression", post(track_impression))
        .route("/api/analytics/click", post(track_click))
        .route("/api/analytics/stats", get(get_stats))
        .layer(TraceLayer::new_for_http())
        // The admin portal and the mobile app are served from other origins.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "success",
        "message": "Ads API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn get_all_ads(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let ads = state.ads.list_active().await?;
    Ok(Json(json!({
        "status": "success",
        "count": ads.len(),
        "data": ads,
    })))
}

async fn get_random_ad(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let ad = state.ads.random_active().await?;
    Ok(Json(json!({"status": "success", "data": ad})))
}

async fn get_ad_by_id(
    State(state): State<AppState>,
    Path(ad_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ad = state.ads.get(&ad_id).await?;
    Ok(Json(json!({"status": "success", "data": ad})))
}

async fn create_ad(
    State(state): State<AppState>,
    Json(specification): Json<AdSpecification>,
) -> Result<impl IntoResponse, ApiError> {
    let ad = state.ads.create(specification).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Ad created successfully",
            "data": ad,
        })),
    ))
}

async fn update_ad(
    State(state): State<AppState>,
    Path(ad_id): Path<String>,
    Json(changes): Json<AdUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let ad = state.ads.update(&ad_id, changes).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Ad updated successfully",
        "data": ad,
    })))
}

async fn delete_ad(
    State(state): State<AppState>,
    Path(ad_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.ads.delete(&ad_id).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Ad deleted successfully",
    })))
}

async fn track_impression(
    State(state): State<AppState>,
    Json(request): Json<TrackingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .analytics
        .record_event(EventKind::Impression, request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"status": "success", "message": "Impression tracked"})),
    ))
}

async fn track_click(
    State(state): State<AppState>,
    Json(request): Json<TrackingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .analytics
        .record_event(EventKind::Click, request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"status": "success", "message": "Click tracked"})),
    ))
}

async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.analytics.stats().await?;
    Ok(Json(json!({"status": "success", "data": stats})))
}
