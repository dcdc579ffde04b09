// src/routes/tables.rs

use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{db::{SortOrder, Table, Window}, normalize, AppState};
use super::{internal_error, store_error};

#[derive(Debug, Deserialize)]
pub struct BrowseQ {
    #[serde(default)]
    pub sort: SortOrder,
    pub rows: Option<i64>,
    #[serde(default, deserialize_with = "timestamp")]
    pub from_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub to_date: Option<DateTime<Utc>>,
}

/// RFC 3339, or a naive date/datetime read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

fn timestamp<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(d)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'"))),
    }
}

/// GET /api/tables/:table
pub async fn browse_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(q): Query<BrowseQ>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let table = Table::from_name(&name)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown table '{name}'")))?;
    let window = Window::new(q.sort, q.rows, q.from_date, q.to_date, Utc::now());

    let mut session = state.source.open().await.map_err(store_error)?;
    let rows = session.browse(table, window).await.map_err(store_error)?;
    drop(session);

    if rows.is_empty() {
        tracing::debug!(?table, ?window, "no rows in window");
    } else {
        tracing::debug!(?table, ?window, rows = rows.len(), "browsed table");
    }
    let body = normalize::to_json(&rows).map_err(internal_error)?;
    Ok(Json(body))
}
