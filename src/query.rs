// src/query.rs

use crate::db::{StatsSession, StoreResult};
use crate::models::{ByYear, EmissionsOutlook, StatsPayload, Summary, TempOutlook};

/// Rows returned by the realtime views.
pub const REALTIME_ROWS: i64 = 2;

/// Target years every projection view reports on.
pub const OUTLOOK_YEARS: [i32; 2] = [2030, 2050];

/// Total CO2 emissions in 2010, the reference for the summary percentages.
pub const BASELINE_EMISSIONS_2010: f64 = 1_342_308_036_222.0;

/// Every dashboard view the `/api/{req}?type=` endpoint can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsQuery {
    RealtimePopulation,
    RealtimeCo2,
    PredictedTemperature,
    PredictedEmissions,
    PredictedEnergy,
    Summary,
}

impl StatsQuery {
    /// Maps the route segment and `type` parameter to a view. `summary`
    /// ignores `type`. Unknown combinations resolve to `None`.
    pub fn resolve(req: &str, kind: &str) -> Option<Self> {
        match (req, kind) {
            ("realtime", "popGrowth") => Some(Self::RealtimePopulation),
            ("realtime", "co2") => Some(Self::RealtimeCo2),
            ("predicted", "temp") => Some(Self::PredictedTemperature),
            ("predicted", "co2") => Some(Self::PredictedEmissions),
            ("predicted", "energy") => Some(Self::PredictedEnergy),
            ("summary", _) => Some(Self::Summary),
            _ => None,
        }
    }

    pub async fn run(self, session: &mut dyn StatsSession) -> StoreResult<StatsPayload> {
        match self {
            Self::RealtimePopulation => {
                Ok(StatsPayload::Population(session.latest_population(REALTIME_ROWS).await?))
            }
            Self::RealtimeCo2 => Ok(StatsPayload::AnnualCo2(session.latest_annual_co2(REALTIME_ROWS).await?)),
            Self::PredictedTemperature => predicted_temperature(session).await.map(StatsPayload::Temperature),
            Self::PredictedEmissions => predicted_emissions(session).await.map(StatsPayload::Emissions),
            Self::PredictedEnergy => {
                let mut by_year = ByYear::new();
                for year in OUTLOOK_YEARS {
                    by_year.insert(year, session.energy_production_by(year).await?);
                }
                Ok(StatsPayload::Energy(by_year))
            }
            Self::Summary => summary(session).await.map(StatsPayload::Summary),
        }
    }
}

/// Missing rows read as NaN rather than failing the request.
fn or_nan<T>(row: Option<&T>, field: impl Fn(&T) -> f64) -> f64 {
    row.map(field).unwrap_or(f64::NAN)
}

pub fn percent_of_baseline(emissions: f64) -> f64 {
    (emissions / BASELINE_EMISSIONS_2010 * 100.0) - 100.0
}

async fn predicted_temperature(session: &mut dyn StatsSession) -> StoreResult<ByYear<TempOutlook>> {
    let mut by_year = ByYear::new();
    for year in OUTLOOK_YEARS {
        let population = session.population_by(year).await?;
        let co2 = session.co2_emissions_by(year).await?;
        by_year.insert(
            year,
            TempOutlook {
                population: or_nan(population.as_ref(), |p| p.population_growth_calculated),
                temp: or_nan(co2.as_ref(), |c| c.temp_anomaly_predicted),
            },
        );
    }
    Ok(by_year)
}

async fn predicted_emissions(session: &mut dyn StatsSession) -> StoreResult<ByYear<EmissionsOutlook>> {
    let mut by_year = ByYear::new();
    for year in OUTLOOK_YEARS {
        let population = session.population_by(year).await?;
        let co2 = session.co2_emissions_by(year).await?;
        by_year.insert(
            year,
            EmissionsOutlook {
                population: or_nan(population.as_ref(), |p| p.population_predicted),
                co2: or_nan(co2.as_ref(), |c| c.total_co2_emissions_predicted),
            },
        );
    }
    Ok(by_year)
}

async fn summary(session: &mut dyn StatsSession) -> StoreResult<Summary> {
    let co2_2030 = session.co2_emissions_by(2030).await?;
    let co2_2050 = session.co2_emissions_by(2050).await?;

    let emissions_2030 = or_nan(co2_2030.as_ref(), |c| c.total_co2_emissions_predicted);
    let emissions_2050 = or_nan(co2_2050.as_ref(), |c| c.total_co2_emissions_predicted);

    Ok(Summary {
        temp_2030: or_nan(co2_2030.as_ref(), |c| c.temp_anomaly_predicted),
        temp_2050: or_nan(co2_2050.as_ref(), |c| c.temp_anomaly_predicted),
        percent_2030: percent_of_baseline(emissions_2030),
        percent_2050: percent_of_baseline(emissions_2050),
        emissions_2030,
        emissions_2050,
    })
}
