// src/db/postgres.rs

use async_trait::async_trait;
use sqlx::{pool::PoolConnection, postgres::PgRow, query_as, FromRow, PgConnection, PgPool, Postgres};

use super::{StatsSession, StatsSource, StoreError, StoreResult, Table, Window};
use crate::models::{
    AnnualCo2Emissions, Co2EmissionsBy, EnergyProductionBy, Population, PopulationBy,
    TableRows, TotalCo2Emissions,
};

const POPULATION_COLUMNS: &str = "time, population, population_growth_this_year, population_predicted, \
     population_growth_this_year_predicted, end_of_year_population_predicted, \
     end_of_year_population_growth_predicted";
const ANNUAL_CO2_COLUMNS: &str =
    "time, current_co2_emissions, current_co2_emissions_predicted, annual_co2_emissions_predicted";
const TOTAL_CO2_COLUMNS: &str =
    "time, total_co2_emissions_predicted, end_of_year_total_co2_emissions_predicted";
const POPULATION_BY_COLUMNS: &str = "time, year, population_predicted, population_growth_predicted, \
     population_growth_calculated, population_growth_predicted_from_now, \
     population_growth_calculated_from_now, population_growth_percent, \
     calculated_population_growth_percent";
const CO2_EMISSIONS_BY_COLUMNS: &str = "time, year, total_co2_emissions_predicted, \
     annual_co2_emissions_predicted, temp_anomaly_predicted";
const ENERGY_PRODUCTION_BY_COLUMNS: &str = "time, year, total_fossil_fuel_production, \
     total_renewable_production, hydropower_production, wind_power_production, \
     solar_power_production, other_renewable_power_production";

fn columns(table: Table) -> &'static str {
    match table {
        Table::AnnualCo2Emissions => ANNUAL_CO2_COLUMNS,
        Table::TotalCo2Emissions => TOTAL_CO2_COLUMNS,
        Table::Population => POPULATION_COLUMNS,
        Table::PopulationBy => POPULATION_BY_COLUMNS,
        Table::Co2EmissionsBy => CO2_EMISSIONS_BY_COLUMNS,
        Table::EnergyProductionBy => ENERGY_PRODUCTION_BY_COLUMNS,
    }
}

#[derive(Clone)]
pub struct PgSource {
    pool: PgPool,
}

impl PgSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsSource for PgSource {
    async fn open(&self) -> StoreResult<Box<dyn StatsSession>> {
        let conn = self.pool.acquire().await.map_err(StoreError::Unavailable)?;
        Ok(Box::new(PgSession { conn }))
    }
}

/// One pooled connection for the lifetime of a request.
pub struct PgSession {
    conn: PoolConnection<Postgres>,
}

async fn latest<T>(conn: &mut PgConnection, table: Table, take: i64) -> StoreResult<Vec<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!(
        "SELECT {} FROM {} ORDER BY time DESC LIMIT $1",
        columns(table),
        table.relation()
    );
    Ok(query_as::<_, T>(&sql).bind(take).fetch_all(conn).await?)
}

async fn current_for_year<T>(conn: &mut PgConnection, table: Table, year: i32) -> StoreResult<Option<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!(
        "SELECT {} FROM {} WHERE year = $1 ORDER BY time DESC LIMIT 1",
        columns(table),
        table.relation()
    );
    Ok(query_as::<_, T>(&sql).bind(year).fetch_optional(conn).await?)
}

async fn window<T>(conn: &mut PgConnection, table: Table, window: Window) -> StoreResult<Vec<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let rows = match window {
        Window::Latest { order, rows } => {
            let sql = format!(
                "SELECT {} FROM {} ORDER BY time {} LIMIT $1",
                columns(table),
                table.relation(),
                order.as_sql()
            );
            query_as::<_, T>(&sql).bind(rows).fetch_all(conn).await?
        }
        Window::Range { order, from, to } => {
            let sql = format!(
                "SELECT {} FROM {} WHERE time >= $1 AND time <= $2 ORDER BY time {}",
                columns(table),
                table.relation(),
                order.as_sql()
            );
            query_as::<_, T>(&sql).bind(from).bind(to).fetch_all(conn).await?
        }
    };
    Ok(rows)
}

#[async_trait]
impl StatsSession for PgSession {
    async fn latest_population(&mut self, take: i64) -> StoreResult<Vec<Population>> {
        latest(&mut *self.conn, Table::Population, take).await
    }

    async fn latest_annual_co2(&mut self, take: i64) -> StoreResult<Vec<AnnualCo2Emissions>> {
        latest(&mut *self.conn, Table::AnnualCo2Emissions, take).await
    }

    async fn population_by(&mut self, year: i32) -> StoreResult<Option<PopulationBy>> {
        current_for_year(&mut *self.conn, Table::PopulationBy, year).await
    }

    async fn co2_emissions_by(&mut self, year: i32) -> StoreResult<Option<Co2EmissionsBy>> {
        current_for_year(&mut *self.conn, Table::Co2EmissionsBy, year).await
    }

    async fn energy_production_by(&mut self, year: i32) -> StoreResult<Option<EnergyProductionBy>> {
        current_for_year(&mut *self.conn, Table::EnergyProductionBy, year).await
    }

    async fn browse(&mut self, table: Table, slice: Window) -> StoreResult<TableRows> {
        let conn = &mut *self.conn;
        Ok(match table {
            Table::AnnualCo2Emissions => TableRows::AnnualCo2Emissions(window(conn, table, slice).await?),
            Table::TotalCo2Emissions => TableRows::TotalCo2Emissions(window::<TotalCo2Emissions>(conn, table, slice).await?),
            Table::Population => TableRows::Population(window(conn, table, slice).await?),
            Table::PopulationBy => TableRows::PopulationBy(window(conn, table, slice).await?),
            Table::Co2EmissionsBy => TableRows::Co2EmissionsBy(window(conn, table, slice).await?),
            Table::EnergyProductionBy => TableRows::EnergyProductionBy(window(conn, table, slice).await?),
        })
    }
}
