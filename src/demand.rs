//! Code for working with electricity demand projections. Several named demand scenarios
//! (e.g. low/base/high growth) coexist in the same table; exactly one is selected per run.
use crate::horizon::TimeHorizon;
use crate::id::define_id_type;
use crate::input::{deserialise_non_negative, read_csv};
use crate::units::Energy;
use anyhow::{ensure, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

const DEMAND_FILE_NAME: &str = "demand.csv";

define_id_type! {DemandScenarioID}

/// A row of the demand CSV file (long format, one row per year and demand scenario)
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct DemandRaw {
    year: u32,
    demand_scenario: String,
    /// Annual electricity demand in GWh
    #[serde(deserialize_with = "deserialise_non_negative")]
    demand: f64,
}

/// Annual demand for one selected demand scenario, covering every horizon year
#[derive(Debug, Clone, PartialEq)]
pub struct DemandSeries {
    /// Which demand scenario this series was selected from
    pub scenario: DemandScenarioID,
    demand: IndexMap<u32, Energy>,
}

impl DemandSeries {
    /// Build a series from (year, demand) pairs.
    ///
    /// Callers must supply one entry per horizon year; the CSV loader enforces this for
    /// file-based models.
    pub fn from_annual<I>(scenario: DemandScenarioID, demand: I) -> Self
    where
        I: IntoIterator<Item = (u32, Energy)>,
    {
        let mut demand: IndexMap<_, _> = demand.into_iter().collect();
        demand.sort_unstable_keys();
        Self { scenario, demand }
    }

    /// Demand for a study year.
    ///
    /// Coverage of the whole horizon is validated at load time, so lookups for horizon years
    /// cannot fail.
    pub fn get(&self, year: u32) -> Energy {
        *self
            .demand
            .get(&year)
            .expect("Demand covers all horizon years by construction")
    }

    /// Iterate over (year, demand) pairs in year order
    pub fn iter(&self) -> impl Iterator<Item = (u32, Energy)> + '_ {
        self.demand.iter().map(|(year, demand)| (*year, *demand))
    }
}

fn read_demand_from_iter<I>(
    iter: I,
    demand_scenario: &str,
    horizon: &TimeHorizon,
) -> Result<DemandSeries>
where
    I: Iterator<Item = DemandRaw>,
{
    let mut demand = IndexMap::new();
    let mut scenarios_seen = Vec::new();
    for row in iter {
        if row.demand_scenario != demand_scenario {
            if !scenarios_seen.contains(&row.demand_scenario) {
                scenarios_seen.push(row.demand_scenario);
            }
            continue;
        }

        ensure!(
            horizon.contains(row.year),
            "Demand year {} is outside the study horizon",
            row.year
        );
        ensure!(
            demand
                .insert(row.year, Energy::new(row.demand))
                .is_none(),
            "Multiple demand entries for year {} in scenario {demand_scenario}",
            row.year
        );
    }

    ensure!(
        !demand.is_empty(),
        "No demand rows found for demand scenario {demand_scenario} (available: {scenarios_seen:?})"
    );

    // Every study year must be covered, with no gaps
    for year in horizon.iter() {
        ensure!(
            demand.contains_key(&year),
            "Demand scenario {demand_scenario} has no entry for year {year}"
        );
    }

    demand.sort_unstable_keys();

    Ok(DemandSeries {
        scenario: demand_scenario.into(),
        demand,
    })
}

/// Read the demand table from the model directory, selecting one demand scenario.
pub fn read_demand(
    model_dir: &Path,
    demand_scenario: &str,
    horizon: &TimeHorizon,
) -> Result<DemandSeries> {
    let file_path = model_dir.join(DEMAND_FILE_NAME);
    let demand_csv = read_csv(&file_path)?;
    read_demand_from_iter(demand_csv.into_iter(), demand_scenario, horizon)
        .with_context(|| format!("Error reading {}", file_path.to_string_lossy()))
}
