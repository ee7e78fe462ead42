//! HTTP surface: one set of CRUD routes per table.

use std::sync::Arc;

use amock_core::{CoreError, Database};
use amock_types::RecordId;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tower_http::trace::TraceLayer;

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

pub fn app(db: Arc<Database>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/:table", get(list).post(insert).put(insert))
        .route("/:table/:id", get(get_one).delete(remove))
        .with_state(db)
        .layer(TraceLayer::new_for_http())
}

/// Human-readable route list printed at startup.
pub fn route_listing(db: &Database, base_url: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for table in db.table_names() {
        lines.push(format!("GET    {base_url}/{table}"));
        lines.push(format!("GET    {base_url}/{table}/:id"));
        lines.push(format!("POST   {base_url}/{table}"));
        lines.push(format!("PUT    {base_url}/{table}"));
        lines.push(format!("DELETE {base_url}/{table}/:id"));
    }
    lines
}

pub fn status_for(err: &CoreError) -> StatusCode {
    match err.root() {
        CoreError::Validation { .. } | CoreError::MissingRequired(_) | CoreError::MalformedItem(_) => {
            StatusCode::BAD_REQUEST
        }
        CoreError::UnknownField(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::UnknownTable(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: CoreError) -> (StatusCode, String) {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    (status, err.to_string())
}

fn not_found(table: &str, id: &RecordId) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("{table} {id} not found"))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list(State(db): State<Arc<Database>>, Path(table): Path<String>) -> ApiResult<Value> {
    let records = db.list(&table).await.map_err(reject)?;
    Ok(Json(Value::Array(records.into_iter().map(Value::Object).collect())))
}

async fn get_one(
    State(db): State<Arc<Database>>,
    Path((table, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let id = RecordId::new(id);
    match db.get(&table, &id).await.map_err(reject)? {
        Some(record) => Ok(Json(Value::Object(record))),
        None => Err(not_found(&table, &id)),
    }
}

async fn insert(State(db): State<Arc<Database>>, Path(table): Path<String>, body: Bytes) -> ApiResult<Value> {
    let body: Value = serde_json::from_slice(&body)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid JSON body: {e}")))?;
    let inserted = db.insert_value(&table, &body).await.map_err(reject)?;
    Ok(Json(inserted))
}

async fn remove(
    State(db): State<Arc<Database>>,
    Path((table, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let id = RecordId::new(id);
    match db.remove(&table, &id).await.map_err(reject)? {
        Some(record) => Ok(Json(Value::Object(record))),
        None => Err(not_found(&table, &id)),
    }
}
