// =============================================================================
// REST API Endpoints: Axum 0.7
// =============================================================================
//
// Public, unauthenticated, read-only:
//
//   GET /                   service descriptor
//   GET /health             liveness
//   GET /api/sctr-top300    ranking preview (no price work)
//   GET /api/dashboard      full snapshot
//
// A ranking failure is the only error either API route returns:
//   500 {"detail": {"error": "...", "stage": "scrape"}}
//
// CORS allows the configured origins with credentials; methods and headers
// are mirrored from the preflight request.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::dashboard::{Dashboard, DashboardError};
use crate::types::{DashboardSnapshot, RankedSymbol};

// =============================================================================
// Router construction
// =============================================================================

/// Build the REST router with CORS middleware and the shared dashboard.
pub fn router(dashboard: Arc<Dashboard>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/sctr-top300", get(sctr_top300))
        .route("/api/dashboard", get(dashboard_snapshot))
        .layer(cors_layer(allowed_origins))
        .with_state(dashboard)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

// =============================================================================
// Errors
// =============================================================================

/// Error body mirroring the shape the web client already parses.
pub struct ApiError(DashboardError);

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "detail": {
                "error": self.0.to_string(),
                "stage": self.0.stage(),
            }
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

// =============================================================================
// Service info
// =============================================================================

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "sctr-picks-api-300",
        "health": "/health",
        "endpoints": ["/api/sctr-top300", "/api/dashboard"],
    }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Ranking preview
// =============================================================================

#[derive(Serialize)]
struct RankingResponse {
    data: Vec<RankedSymbol>,
    stage: &'static str,
}

async fn sctr_top300(
    State(dashboard): State<Arc<Dashboard>>,
) -> Result<Json<RankingResponse>, ApiError> {
    let data = dashboard.ranking_preview().await?;
    info!(count = data.len(), "ranking preview served");
    Ok(Json(RankingResponse {
        data,
        stage: "scrape",
    }))
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Serialize)]
struct DashboardResponse {
    data: DashboardSnapshot,
}

async fn dashboard_snapshot(
    State(dashboard): State<Arc<Dashboard>>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let data = dashboard.build_snapshot().await?;
    Ok(Json(DashboardResponse { data }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{PriceSource, RankingSource};
    use crate::types::{LastPricePair, PriceHistory};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    struct StaticRanking(Option<Vec<RankedSymbol>>);

    #[async_trait]
    impl RankingSource for StaticRanking {
        async fn fetch_ranking(&self) -> Result<Vec<RankedSymbol>> {
            self.0.clone().ok_or_else(|| anyhow!("navigation timeout"))
        }
    }

    struct RampPrices;

    #[async_trait]
    impl PriceSource for RampPrices {
        async fn fetch_price_history(&self, symbol: &str) -> Result<PriceHistory> {
            if symbol == "DEAD" {
                return Err(anyhow!("delisted"));
            }
            Ok(PriceHistory::from_closes((1..=80).map(|x| x as f64).collect()))
        }

        async fn fetch_last_price_pair(&self, _symbol: &str) -> Result<LastPricePair> {
            Err(anyhow!("unused"))
        }
    }

    fn app(ranking: Option<Vec<RankedSymbol>>) -> Router {
        let dashboard = Dashboard::new(Arc::new(StaticRanking(ranking)), Arc::new(RampPrices));
        router(Arc::new(dashboard), &["http://localhost:5173".to_string()])
    }

    fn two_symbols() -> Option<Vec<RankedSymbol>> {
        Some(vec![
            RankedSymbol::new(1, "NVDA", "NVIDIA"),
            RankedSymbol::new(2, "DEAD", "Gone Corp"),
        ])
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = get_json(app(None), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn root_describes_service() {
        let (status, body) = get_json(app(None), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["health"], "/health");
    }

    #[tokio::test]
    async fn ranking_preview_lists_symbols() {
        let (status, body) = get_json(app(two_symbols()), "/api/sctr-top300").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stage"], "scrape");
        assert_eq!(body["data"][1]["symbol"], "DEAD");
        assert_eq!(body["data"][1]["rank"], 2);
    }

    #[tokio::test]
    async fn dashboard_returns_both_tables_and_benchmark() {
        let (status, body) = get_json(app(two_symbols()), "/api/dashboard").await;
        assert_eq!(status, StatusCode::OK);

        let perf = body["data"]["perf"].as_array().unwrap();
        let rebound = body["data"]["rebound"].as_array().unwrap();
        assert_eq!(perf.len(), 2);
        assert_eq!(rebound.len(), 2);
        assert_eq!(perf[0]["symbol"], "NVDA");
        assert_eq!(perf[0]["rsi_14"], 100.0);
        assert_eq!(rebound[0]["curve_shape"], "way_up");
        assert!(perf[1]["perf5d"].is_null());
        assert!(rebound[1]["curve_shape"].is_null());
        assert!(body["data"]["qqq"]["perf1d"].is_number());
        assert!(body["data"]["qqq"].get("rsi_14").is_none());
    }

    #[tokio::test]
    async fn scrape_failure_is_500_with_stage() {
        for uri in ["/api/dashboard", "/api/sctr-top300"] {
            let (status, body) = get_json(app(None), uri).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["detail"]["stage"], "scrape");
            assert!(body["detail"]["error"]
                .as_str()
                .unwrap()
                .contains("navigation timeout"));
        }
    }

    #[tokio::test]
    async fn cors_allows_configured_origin_only() {
        let request = |origin: &'static str| {
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, origin)
                .body(Body::empty())
                .unwrap()
        };

        let allowed = app(None).oneshot(request("http://localhost:5173")).await.unwrap();
        assert_eq!(
            allowed.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            allowed.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );

        let denied = app(None).oneshot(request("https://evil.example")).await.unwrap();
        assert!(denied.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
