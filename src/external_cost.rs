//! External (societal) costs of emissions.
//!
//! Each pollutant has a base cost per unit mass which is scaled by a jurisdiction-specific
//! multiplier before use; the adjusted cost is what enters the objective.
use crate::input::{deserialise_non_negative, read_csv};
use crate::units::MoneyPerMass;
use anyhow::{ensure, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::path::Path;

const EXTERNAL_COSTS_FILE_NAME: &str = "external_costs.csv";

/// The pollutants for which technologies carry emission factors
#[derive(
    PartialEq, Eq, Hash, Copy, Clone, Debug, DeserializeLabeledStringEnum, SerializeLabeledStringEnum,
)]
pub enum Pollutant {
    /// Carbon dioxide
    #[string = "CO2"]
    CO2,
    /// Nitrogen oxides
    #[string = "NOx"]
    NOx,
    /// Sulphur dioxide
    #[string = "SO2"]
    SO2,
}

/// All pollutants, in the order they appear in input tables
pub const POLLUTANTS: [Pollutant; 3] = [Pollutant::CO2, Pollutant::NOx, Pollutant::SO2];

/// A row of the external costs CSV file. Costs are in USD/kg.
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct ExternalCostRaw {
    pollutant: Pollutant,
    #[serde(deserialize_with = "deserialise_non_negative")]
    base_cost: f64,
    #[serde(deserialize_with = "deserialise_non_negative")]
    scaling_factor: f64,
}

/// Adjusted external cost factors per pollutant
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExternalCosts(IndexMap<Pollutant, MoneyPerMass>);

impl ExternalCosts {
    /// The adjusted cost (base × jurisdiction scaling) for a pollutant.
    ///
    /// Every pollutant must have a row in the input table, so a missing entry is a model
    /// construction error.
    pub fn get(&self, pollutant: Pollutant) -> Result<MoneyPerMass> {
        self.0
            .get(&pollutant)
            .copied()
            .with_context(|| format!("Missing external cost for pollutant {pollutant:?}"))
    }
}

impl FromIterator<(Pollutant, MoneyPerMass)> for ExternalCosts {
    fn from_iter<I: IntoIterator<Item = (Pollutant, MoneyPerMass)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn read_external_costs_from_iter<I>(iter: I) -> Result<ExternalCosts>
where
    I: Iterator<Item = ExternalCostRaw>,
{
    let mut costs = IndexMap::new();
    for row in iter {
        let adjusted = MoneyPerMass::new(row.base_cost * row.scaling_factor);
        ensure!(
            costs.insert(row.pollutant, adjusted).is_none(),
            "Duplicate external cost entry for pollutant {:?}",
            row.pollutant
        );
    }

    for pollutant in POLLUTANTS {
        ensure!(
            costs.contains_key(&pollutant),
            "Missing external cost row for pollutant {pollutant:?}"
        );
    }

    Ok(ExternalCosts(costs))
}

/// Read the external costs table from the model directory.
pub fn read_external_costs(model_dir: &Path) -> Result<ExternalCosts> {
    let file_path = model_dir.join(EXTERNAL_COSTS_FILE_NAME);
    let costs_csv = read_csv(&file_path)?;
    read_external_costs_from_iter(costs_csv.into_iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn row(pollutant: Pollutant, base_cost: f64, scaling_factor: f64) -> ExternalCostRaw {
        ExternalCostRaw {
            pollutant,
            base_cost,
            scaling_factor,
        }
    }

    #[test]
    fn test_adjusted_cost() {
        let rows = [
            row(Pollutant::CO2, 0.019, 19.0),
            row(Pollutant::NOx, 0.9, 19.0),
            row(Pollutant::SO2, 1.3, 19.0),
        ];
        let costs = read_external_costs_from_iter(rows.into_iter()).unwrap();
        assert_approx_eq!(f64, costs.get(Pollutant::CO2).unwrap().value(), 0.361);
    }

    #[test]
    fn test_missing_pollutant() {
        let rows = [row(Pollutant::CO2, 0.019, 19.0)];
        assert!(read_external_costs_from_iter(rows.into_iter()).is_err());
    }

    #[test]
    fn test_duplicate_pollutant() {
        let rows = [
            row(Pollutant::CO2, 0.019, 19.0),
            row(Pollutant::CO2, 0.02, 19.0),
            row(Pollutant::NOx, 0.9, 19.0),
            row(Pollutant::SO2, 1.3, 19.0),
        ];
        assert!(read_external_costs_from_iter(rows.into_iter()).is_err());
    }
}
