use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tracing::error;

use product_catalog_storage::Database;

use crate::service::{Clock, ProductService};
use crate::{products, telemetry};

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    storage: Database,
    clock: Clock,
    products: ProductService,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, storage: Database) -> Self {
        let clock: Clock = Arc::new(Utc::now);
        let products = ProductService::new(storage.clone(), clock.clone());
        Self {
            metrics,
            storage,
            clock,
            products,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock.clone();
        self.products = ProductService::new(self.storage.clone(), clock);
        self
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    pub fn storage(&self) -> &Database {
        &self.storage
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn products(&self) -> &ProductService {
        &self.products
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/products", get(products::list).post(products::create))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthBody>) {
    let timestamp = state.now().to_rfc3339_opts(SecondsFormat::Millis, true);
    match state.storage().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthBody {
                status: "healthy",
                timestamp,
                error: None,
            }),
        ),
        Err(err) => {
            error!(stage = "storage", error = %err, "health check could not reach database");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthBody {
                    status: "unhealthy",
                    timestamp,
                    error: Some("database unavailable"),
                }),
            )
        }
    }
}

async fn metrics(State(state): State<AppState>) -> Response {
    let body = telemetry::render_metrics(state.metrics());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        Body::from(body),
    )
        .into_response()
}
