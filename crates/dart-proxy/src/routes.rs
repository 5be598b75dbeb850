//! HTTP routes: `/healthz` and `/v1/dart`.

use std::fmt;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use dart::{Clock, DartError, DartService, SystemClock};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::auth::check_bearer;
use crate::error::ApiError;
use crate::query::{DartParams, DartRequest};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    service: Arc<DartService>,
    bearer_token: Option<Arc<str>>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("service", &self.service)
            .field("auth", &self.auth_enabled())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// State serving `service`, requiring `bearer_token` when set.
    #[must_use]
    pub fn new(service: Arc<DartService>, bearer_token: Option<&str>) -> Self {
        Self {
            service,
            bearer_token: bearer_token.map(Arc::from),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for health timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Whether inbound bearer auth is enforced.
    #[must_use]
    pub const fn auth_enabled(&self) -> bool {
        self.bearer_token.is_some()
    }
}

/// Builds the proxy's router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/dart", get(dart_endpoint))
        .with_state(state)
}

async fn healthz(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "ok": true, "ts": state.clock.now().to_rfc3339() }))
}

#[instrument(skip_all, fields(op, stock_code))]
async fn dart_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<DartParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    check_bearer(state.bearer_token.as_deref(), &headers)?;

    let Query(params) = query.map_err(|e| DartError::InvalidInput(e.body_text()))?;
    let span = tracing::Span::current();
    span.record("op", params.op.as_deref().unwrap_or_default());
    span.record("stock_code", params.stock_code.as_deref().unwrap_or_default());

    let service = &state.service;
    let response = match params.validate(service.policy())? {
        DartRequest::Resolve(ticker) => Json(service.resolve(&ticker).await?).into_response(),
        DartRequest::List {
            ticker,
            lookback_years,
        } => Json(service.list_filings(&ticker, lookback_years).await?).into_response(),
        DartRequest::Statements(request) => {
            Json(service.fetch_statements(&request).await?).into_response()
        }
    };
    debug!("Request served");
    Ok(response)
}
