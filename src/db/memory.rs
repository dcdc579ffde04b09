// src/db/memory.rs

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{SortOrder, StatsSession, StatsSource, StoreError, StoreResult, Table, Window};
use crate::models::{
    AnnualCo2Emissions, Co2EmissionsBy, EnergyProductionBy, Population, PopulationBy,
    TableRows, TotalCo2Emissions,
};

/// Rows held by an in-memory store.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    pub population: Vec<Population>,
    pub annual_co2: Vec<AnnualCo2Emissions>,
    pub total_co2: Vec<TotalCo2Emissions>,
    pub population_by: Vec<PopulationBy>,
    pub co2_emissions_by: Vec<Co2EmissionsBy>,
    pub energy_production_by: Vec<EnergyProductionBy>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Failure {
    #[default]
    None,
    /// `open` fails as if the pool timed out.
    Unavailable,
    /// Every query fails after the session is opened.
    Query,
}

/// In-memory [`StatsSource`] that counts live sessions so tests can check
/// that every request gives its session back.
#[derive(Clone, Default)]
pub struct MemorySource {
    fixture: Arc<Fixture>,
    failure: Failure,
    live: Arc<AtomicUsize>,
    opened: Arc<AtomicUsize>,
}

impl MemorySource {
    pub fn new(fixture: Fixture) -> Self {
        Self { fixture: Arc::new(fixture), ..Self::default() }
    }

    pub fn failing(failure: Failure) -> Self {
        Self { failure, ..Self::default() }
    }

    pub fn live_sessions(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn opened_sessions(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatsSource for MemorySource {
    async fn open(&self) -> StoreResult<Box<dyn StatsSession>> {
        if self.failure == Failure::Unavailable {
            return Err(StoreError::Unavailable(sqlx::Error::PoolTimedOut));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            fixture: Arc::clone(&self.fixture),
            failing: self.failure == Failure::Query,
            live: Arc::clone(&self.live),
        }))
    }
}

pub struct MemorySession {
    fixture: Arc<Fixture>,
    failing: bool,
    live: Arc<AtomicUsize>,
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MemorySession {
    fn check(&self) -> StoreResult<()> {
        if self.failing {
            Err(StoreError::Query(sqlx::Error::Protocol("simulated query failure".into())))
        } else {
            Ok(())
        }
    }
}

trait Timed {
    fn time(&self) -> DateTime<Utc>;
}

trait Yearly: Timed {
    fn year(&self) -> i32;
}

macro_rules! timed {
    ($($ty:ty),*) => {$(
        impl Timed for $ty {
            fn time(&self) -> DateTime<Utc> { self.time }
        }
    )*};
}
macro_rules! yearly {
    ($($ty:ty),*) => {$(
        impl Yearly for $ty {
            fn year(&self) -> i32 { self.year }
        }
    )*};
}

timed!(Population, AnnualCo2Emissions, TotalCo2Emissions, PopulationBy, Co2EmissionsBy, EnergyProductionBy);
yearly!(PopulationBy, Co2EmissionsBy, EnergyProductionBy);

fn sorted<T: Timed + Clone>(rows: &[T], order: SortOrder) -> Vec<T> {
    let mut rows = rows.to_vec();
    match order {
        SortOrder::Asc => rows.sort_by_key(|r| r.time()),
        SortOrder::Desc => rows.sort_by_key(|r| std::cmp::Reverse(r.time())),
    }
    rows
}

fn latest<T: Timed + Clone>(rows: &[T], take: i64) -> Vec<T> {
    let take = usize::try_from(take).unwrap_or(0);
    sorted(rows, SortOrder::Desc).into_iter().take(take).collect()
}

fn current_for_year<T: Yearly + Clone>(rows: &[T], year: i32) -> Option<T> {
    rows.iter()
        .filter(|r| r.year() == year)
        .max_by_key(|r| r.time())
        .cloned()
}

fn slice<T: Timed + Clone>(rows: &[T], window: Window) -> Vec<T> {
    match window {
        Window::Latest { order, rows: take } => {
            let take = usize::try_from(take).unwrap_or(0);
            sorted(rows, order).into_iter().take(take).collect()
        }
        Window::Range { order, from, to } => sorted(rows, order)
            .into_iter()
            .filter(|r| r.time() >= from && r.time() <= to)
            .collect(),
    }
}

#[async_trait]
impl StatsSession for MemorySession {
    async fn latest_population(&mut self, take: i64) -> StoreResult<Vec<Population>> {
        self.check()?;
        Ok(latest(&self.fixture.population, take))
    }

    async fn latest_annual_co2(&mut self, take: i64) -> StoreResult<Vec<AnnualCo2Emissions>> {
        self.check()?;
        Ok(latest(&self.fixture.annual_co2, take))
    }

    async fn population_by(&mut self, year: i32) -> StoreResult<Option<PopulationBy>> {
        self.check()?;
        Ok(current_for_year(&self.fixture.population_by, year))
    }

    async fn co2_emissions_by(&mut self, year: i32) -> StoreResult<Option<Co2EmissionsBy>> {
        self.check()?;
        Ok(current_for_year(&self.fixture.co2_emissions_by, year))
    }

    async fn energy_production_by(&mut self, year: i32) -> StoreResult<Option<EnergyProductionBy>> {
        self.check()?;
        Ok(current_for_year(&self.fixture.energy_production_by, year))
    }

    async fn browse(&mut self, table: Table, window: Window) -> StoreResult<TableRows> {
        self.check()?;
        let f = &self.fixture;
        Ok(match table {
            Table::AnnualCo2Emissions => TableRows::AnnualCo2Emissions(slice(&f.annual_co2, window)),
            Table::TotalCo2Emissions => TableRows::TotalCo2Emissions(slice(&f.total_co2, window)),
            Table::Population => TableRows::Population(slice(&f.population, window)),
            Table::PopulationBy => TableRows::PopulationBy(slice(&f.population_by, window)),
            Table::Co2EmissionsBy => TableRows::Co2EmissionsBy(slice(&f.co2_emissions_by, window)),
            Table::EnergyProductionBy => {
                TableRows::EnergyProductionBy(slice(&f.energy_production_by, window))
            }
        })
    }
}

// ───────────────────────────────────────
// Row builders for tests
// ───────────────────────────────────────
pub fn at(day: u32) -> DateTime<Utc> {
    use chrono::TimeZone;
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
}

pub fn population(day: u32, population: i64) -> Population {
    Population {
        time: at(day),
        population,
        population_growth_this_year: 70_000_000,
        population_predicted: population as f64,
        population_growth_this_year_predicted: 70_000_000.0,
        end_of_year_population_predicted: population as f64 + 1.0,
        end_of_year_population_growth_predicted: 71_000_000.0,
    }
}

pub fn annual_co2(day: u32, current: i64) -> AnnualCo2Emissions {
    AnnualCo2Emissions {
        time: at(day),
        current_co2_emissions: current,
        current_co2_emissions_predicted: current as f64,
        annual_co2_emissions_predicted: 37_000_000_000.0,
    }
}

pub fn total_co2(day: u32, total: f64) -> TotalCo2Emissions {
    TotalCo2Emissions {
        time: at(day),
        total_co2_emissions_predicted: total,
        end_of_year_total_co2_emissions_predicted: total + 1.0,
    }
}

pub fn population_by(day: u32, year: i32, calculated: f64, predicted: f64) -> PopulationBy {
    PopulationBy {
        time: at(day),
        year,
        population_predicted: predicted,
        population_growth_predicted: calculated,
        population_growth_calculated: calculated,
        population_growth_predicted_from_now: 0.0,
        population_growth_calculated_from_now: 0.0,
        population_growth_percent: 0.0,
        calculated_population_growth_percent: 0.0,
    }
}

pub fn co2_emissions_by(day: u32, year: i32, total: f64, temp: f64) -> Co2EmissionsBy {
    Co2EmissionsBy {
        time: at(day),
        year,
        total_co2_emissions_predicted: total,
        annual_co2_emissions_predicted: 0.0,
        temp_anomaly_predicted: temp,
    }
}

pub fn energy_production_by(day: u32, year: i32, fossil: f64) -> EnergyProductionBy {
    EnergyProductionBy {
        time: at(day),
        year,
        total_fossil_fuel_production: fossil,
        total_renewable_production: 9_000.0,
        hydropower_production: 4_000.0,
        wind_power_production: 2_500.0,
        solar_power_production: 1_800.0,
        other_renewable_power_production: 700.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn projection_lookup_takes_newest_row_for_year() {
        let source = MemorySource::new(Fixture {
            co2_emissions_by: vec![
                co2_emissions_by(1, 2030, 1.0, 1.1),
                co2_emissions_by(3, 2030, 3.0, 1.3),
                co2_emissions_by(9, 2050, 9.0, 2.0),
                co2_emissions_by(2, 2030, 2.0, 1.2),
            ],
            ..Fixture::default()
        });
        let mut session = source.open().await.unwrap();
        let row = session.co2_emissions_by(2030).await.unwrap().unwrap();
        assert_eq!(row.total_co2_emissions_predicted, 3.0);
        assert!(session.co2_emissions_by(2040).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sessions_are_counted_until_dropped() {
        let source = MemorySource::default();
        let a = source.open().await.unwrap();
        let b = source.open().await.unwrap();
        assert_eq!(source.live_sessions(), 2);
        drop(a);
        drop(b);
        assert_eq!(source.live_sessions(), 0);
        assert_eq!(source.opened_sessions(), 2);
    }
}
