// src/routes/stats.rs

use axum::{extract::{Path, Query, State}, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::{normalize, query::StatsQuery, AppState};
use super::{internal_error, store_error};

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    /// Absent reads as empty: `summary` still resolves, other views answer `null`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Client polling interval; taken as-is and only logged.
    #[serde(rename = "refreshTime")]
    pub refresh_time: Option<String>,
}

/// GET /api/:req?type=..&refreshTime=..
///
/// Unknown `(req, type)` pairs answer `200` with a JSON `null` body.
pub async fn get_stats(
    State(state): State<AppState>,
    Path(req): Path<String>,
    Query(q): Query<StatsParams>,
) -> Result<Json<Value>, (axum::http::StatusCode, String)> {
    let Some(query) = StatsQuery::resolve(&req, &q.kind) else {
        tracing::debug!(%req, kind = %q.kind, "no stats view for request");
        return Ok(Json(Value::Null));
    };
    tracing::debug!(?query, refresh_time = ?q.refresh_time, "serving stats view");

    // The session (and its pooled connection) is released when it drops,
    // including on the early returns below.
    let mut session = state.source.open().await.map_err(store_error)?;
    let payload = query.run(session.as_mut()).await.map_err(store_error)?;
    drop(session);

    let body = normalize::to_json(&payload).map_err(internal_error)?;
    Ok(Json(body))
}
