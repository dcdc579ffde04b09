// src/models/mod.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

// ───────────────────────────────────────
// Observed samples (append-only series)
// ───────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Population {
    pub time: DateTime<Utc>,
    pub population: i64,                        // bigint
    pub population_growth_this_year: i64,       // bigint
    pub population_predicted: f64,
    pub population_growth_this_year_predicted: f64,
    pub end_of_year_population_predicted: f64,
    pub end_of_year_population_growth_predicted: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AnnualCo2Emissions {
    pub time: DateTime<Utc>,
    pub current_co2_emissions: i64,             // bigint
    pub current_co2_emissions_predicted: f64,
    pub annual_co2_emissions_predicted: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TotalCo2Emissions {
    pub time: DateTime<Utc>,
    pub total_co2_emissions_predicted: f64,
    pub end_of_year_total_co2_emissions_predicted: f64,
}

// ───────────────────────────────────────
// Projections, versioned by `time` per target `year`
// ───────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PopulationBy {
    pub time: DateTime<Utc>,
    pub year: i32,
    pub population_predicted: f64,
    pub population_growth_predicted: f64,
    pub population_growth_calculated: f64,
    pub population_growth_predicted_from_now: f64,
    pub population_growth_calculated_from_now: f64,
    pub population_growth_percent: f64,
    pub calculated_population_growth_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Co2EmissionsBy {
    pub time: DateTime<Utc>,
    pub year: i32,
    pub total_co2_emissions_predicted: f64,
    pub annual_co2_emissions_predicted: f64,
    pub temp_anomaly_predicted: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EnergyProductionBy {
    pub time: DateTime<Utc>,
    pub year: i32,
    pub total_fossil_fuel_production: f64,
    pub total_renewable_production: f64,
    pub hydropower_production: f64,
    pub wind_power_production: f64,
    pub solar_power_production: f64,
    pub other_renewable_power_production: f64,
}

// ───────────────────────────────────────
// Dashboard payloads
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TempOutlook {
    pub population: f64,
    pub temp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmissionsOutlook {
    pub population: f64,
    pub co2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub temp_2030: f64,
    pub temp_2050: f64,
    pub percent_2030: f64,
    pub percent_2050: f64,
    pub emissions_2030: f64,
    pub emissions_2050: f64,
}

/// Keyed by target year; serializes as `{"2030": ..., "2050": ...}`.
pub type ByYear<T> = BTreeMap<i32, T>;

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StatsPayload {
    Population(Vec<Population>),
    AnnualCo2(Vec<AnnualCo2Emissions>),
    Temperature(ByYear<TempOutlook>),
    Emissions(ByYear<EmissionsOutlook>),
    Energy(ByYear<Option<EnergyProductionBy>>),
    Summary(Summary),
}

/// Rows returned by the table browser.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TableRows {
    AnnualCo2Emissions(Vec<AnnualCo2Emissions>),
    TotalCo2Emissions(Vec<TotalCo2Emissions>),
    Population(Vec<Population>),
    PopulationBy(Vec<PopulationBy>),
    Co2EmissionsBy(Vec<Co2EmissionsBy>),
    EnergyProductionBy(Vec<EnergyProductionBy>),
}

impl TableRows {
    pub fn len(&self) -> usize {
        match self {
            Self::AnnualCo2Emissions(rows) => rows.len(),
            Self::TotalCo2Emissions(rows) => rows.len(),
            Self::Population(rows) => rows.len(),
            Self::PopulationBy(rows) => rows.len(),
            Self::Co2EmissionsBy(rows) => rows.len(),
            Self::EnergyProductionBy(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
