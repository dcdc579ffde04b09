// src/db/mod.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{Pool, Postgres};

use crate::config::Config;
use crate::models::{
    AnnualCo2Emissions, Co2EmissionsBy, EnergyProductionBy, Population, PopulationBy, TableRows,
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub async fn connect(config: &Config) -> anyhow::Result<Pool<Postgres>> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.database_url)
        .await?;

    tracing::info!(max_connections = config.max_connections, "connected to PostgreSQL");
    Ok(pool)
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not acquire a database connection: {0}")]
    Unavailable(#[source] sqlx::Error),
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Hands out request-scoped sessions. Each session owns one connection,
/// which goes back to the pool when the session is dropped.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn open(&self) -> StoreResult<Box<dyn StatsSession>>;
}

/// Read queries the dashboard needs. Sample queries order by `time`
/// descending; projection lookups return the newest row for a target year.
#[async_trait]
pub trait StatsSession: Send {
    async fn latest_population(&mut self, take: i64) -> StoreResult<Vec<Population>>;
    async fn latest_annual_co2(&mut self, take: i64) -> StoreResult<Vec<AnnualCo2Emissions>>;
    async fn population_by(&mut self, year: i32) -> StoreResult<Option<PopulationBy>>;
    async fn co2_emissions_by(&mut self, year: i32) -> StoreResult<Option<Co2EmissionsBy>>;
    async fn energy_production_by(&mut self, year: i32) -> StoreResult<Option<EnergyProductionBy>>;
    async fn browse(&mut self, table: Table, window: Window) -> StoreResult<TableRows>;
}

// ───────────────────────────────────────
// Table browser inputs
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    AnnualCo2Emissions,
    TotalCo2Emissions,
    Population,
    PopulationBy,
    Co2EmissionsBy,
    EnergyProductionBy,
}

impl Table {
    /// Resolves the public (camelCase) table name used in URLs.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "annualCo2Emissions" => Self::AnnualCo2Emissions,
            "totalCo2Emissions" => Self::TotalCo2Emissions,
            "population" => Self::Population,
            "populationBy" => Self::PopulationBy,
            "co2EmissionsBy" => Self::Co2EmissionsBy,
            "energyProductionBy" => Self::EnergyProductionBy,
            _ => return None,
        })
    }

    pub fn relation(self) -> &'static str {
        match self {
            Self::AnnualCo2Emissions => "public.annual_co2_emissions",
            Self::TotalCo2Emissions => "public.total_co2_emissions",
            Self::Population => "public.population",
            Self::PopulationBy => "public.population_by",
            Self::Co2EmissionsBy => "public.co2_emissions_by",
            Self::EnergyProductionBy => "public.energy_production_by",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Which slice of a table to read, always ordered by `time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Latest { order: SortOrder, rows: i64 },
    Range { order: SortOrder, from: DateTime<Utc>, to: DateTime<Utc> },
}

impl Window {
    pub const DEFAULT_ROWS: i64 = 50;
    pub const MAX_ROWS: i64 = 1000;

    /// `rows` wins over a date range; with neither, the first
    /// [`Window::DEFAULT_ROWS`] rows are read.
    pub fn new(
        order: SortOrder,
        rows: Option<i64>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        match (rows, from) {
            (Some(rows), _) => Window::Latest { order, rows: rows.clamp(1, Self::MAX_ROWS) },
            (None, Some(from)) => Window::Range { order, from, to: to.unwrap_or(now) },
            (None, None) => Window::Latest { order, rows: Self::DEFAULT_ROWS },
        }
    }
}
