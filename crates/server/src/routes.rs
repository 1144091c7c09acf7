//! HTTP routes of the connector.
//!
//! Every handler hands its work to the blocking pool, since table loads read
//! files synchronously.

use crate::service::ConnectorService;
use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequestParts, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tabulon_common::wire::{ErrorBody, PageRequest, PageResult, Splits, SplitsRequest};
use tabulon_common::{Error, SchemaTableName, TableMetadata};
use thiserror::Error as ThisError;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

type SharedService = Arc<ConnectorService>;

pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/schemas", get(list_schemas))
        .route("/schemas/{schema}/tables", get(list_tables))
        .route("/schemas/{schema}/tables/{table}", get(table_metadata))
        .route("/schemas/{schema}/tables/{table}/splits", post(plan_splits))
        .route("/schemas/{schema}/tables/{table}/splits/{split}/rows", post(read_page))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// `axum::extract::Path` whose rejections answer with an [`ErrorBody`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
struct Path<T>(T);

#[derive(ThisError, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Connector(#[from] Error),

    #[error("Malformed request: {0}")]
    BadRequest(String),

    #[error("Request task failed: {0}")]
    Internal(String),
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Connector(Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Connector(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Connector(e) => e.code(),
            ApiError::BadRequest(_) => "MALFORMED_REQUEST",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        if status.is_client_error() {
            warn!(status = status.as_u16(), code, error = %self, "request rejected");
        } else {
            error!(status = status.as_u16(), code, error = %self, "request failed");
        }
        let body = ErrorBody { code: code.to_string(), message: self.to_string() };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

async fn blocking<T, F>(service: SharedService, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&ConnectorService) -> tabulon_common::Result<T> + Send + 'static,
{
    let value = tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(value))
}

// An empty body is the same as `{}`.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_schemas(State(service): State<SharedService>) -> ApiResult<Vec<String>> {
    blocking(service, |s| s.list_schemas()).await
}

async fn list_tables(
    State(service): State<SharedService>,
    Path(schema): Path<String>,
) -> ApiResult<Vec<SchemaTableName>> {
    blocking(service, move |s| s.list_tables(&schema)).await
}

async fn table_metadata(
    State(service): State<SharedService>,
    Path((schema, table)): Path<(String, String)>,
) -> ApiResult<TableMetadata> {
    blocking(service, move |s| s.table_metadata(&schema, &table)).await
}

async fn plan_splits(
    State(service): State<SharedService>,
    Path((schema, table)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Splits> {
    let request: SplitsRequest = parse_body(&body)?;
    blocking(service, move |s| s.plan_splits(&schema, &table, &request)).await
}

async fn read_page(
    State(service): State<SharedService>,
    Path((schema, table, split)): Path<(String, String, String)>,
    body: Bytes,
) -> ApiResult<PageResult> {
    let request: PageRequest = parse_body(&body)?;
    blocking(service, move |s| s.read_page(&schema, &table, &split, &request)).await
}
