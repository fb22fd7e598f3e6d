//! Generation technologies are the options the optimiser can build and dispatch. The data in
//! this module is immutable reference data for a run; all per-run adjustments (learning
//! curves, indigenous-preference bias) happen during dataset preparation, before the linear
//! program is constructed.
use crate::external_cost::Pollutant;
use crate::id::define_id_type;
use crate::input::{deserialise_non_negative, deserialise_proportion, read_csv};
use crate::units::{
    Capacity, Dimensionless, EnergyPerCapacity, MassPerEnergy, MoneyPerCapacity, MoneyPerEnergy,
    HOURS_PER_YEAR, MWH_PER_GWH,
};
use anyhow::{ensure, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

const TECHNOLOGIES_FILE_NAME: &str = "technologies.csv";

define_id_type! {TechnologyID}

/// A map of [`Technology`], keyed by technology ID. Iteration order follows the input file.
pub type TechnologyMap = IndexMap<TechnologyID, Technology>;

/// A row of the technologies CSV file, in the units the table is published in
/// (USD/MW, USD/MWh, kg/MWh).
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct TechnologyRaw {
    id: String,
    description: String,
    #[serde(deserialize_with = "deserialise_non_negative")]
    capital_cost: f64,
    #[serde(deserialize_with = "deserialise_non_negative")]
    fixed_operating_cost: f64,
    #[serde(deserialize_with = "deserialise_non_negative")]
    variable_operating_cost: f64,
    #[serde(deserialize_with = "deserialise_proportion")]
    efficiency: f64,
    #[serde(deserialize_with = "deserialise_proportion")]
    capacity_factor: f64,
    #[serde(deserialize_with = "deserialise_non_negative")]
    co2_emission_factor: f64,
    #[serde(deserialize_with = "deserialise_non_negative")]
    nox_emission_factor: f64,
    #[serde(deserialize_with = "deserialise_non_negative")]
    so2_emission_factor: f64,
    lead_time: u32,
    lifetime: u32,
    #[serde(deserialize_with = "deserialise_non_negative")]
    base_capacity: f64,
    renewable: bool,
    fossil: bool,
    indigenous: bool,
    intermittent: bool,
    learning_rate: Option<f64>,
}

/// Cost and performance data for one generation technology
#[derive(Debug, Clone, PartialEq)]
pub struct Technology {
    /// A unique identifier for the technology (e.g. NGCC)
    pub id: TechnologyID,
    /// A human-readable description (e.g. natural gas combined cycle)
    pub description: String,
    /// Overnight capital cost per unit of new capacity (USD/MW)
    pub capital_cost: MoneyPerCapacity,
    /// Annual fixed O&M cost per unit of installed capacity (USD/MW/yr)
    pub fixed_operating_cost: MoneyPerCapacity,
    /// Variable operating cost per unit of generation (USD/GWh)
    pub variable_operating_cost: MoneyPerEnergy,
    /// Thermal efficiency as a fraction; zero for technologies with no fuel flow
    pub efficiency: Dimensionless,
    /// Annual average capacity factor as a fraction
    pub capacity_factor: Dimensionless,
    /// Emission factors per pollutant (kg/GWh)
    pub emission_factors: IndexMap<Pollutant, MassPerEnergy>,
    /// Construction lead time in years
    pub lead_time: u32,
    /// Technical lifetime in years
    pub lifetime: u32,
    /// Installed capacity in the base year (MW)
    pub base_capacity: Capacity,
    /// Whether the technology counts towards renewable targets
    pub renewable: bool,
    /// Whether the technology is fossil-fuelled (subject to fossil ceilings and the health
    /// externality add-on)
    pub fossil: bool,
    /// Whether the technology uses an indigenous resource
    pub indigenous: bool,
    /// Whether output is weather-dependent and therefore curtailable
    pub intermittent: bool,
    /// Learning rate (fractional cost reduction per doubling of deployment), if any
    pub learning_rate: Option<Dimensionless>,
}

impl Technology {
    /// Maximum annual energy output per unit of installed capacity (GWh/MW).
    pub fn max_energy_per_capacity(&self) -> EnergyPerCapacity {
        EnergyPerCapacity::new(self.capacity_factor.value() * HOURS_PER_YEAR / MWH_PER_GWH)
    }

    /// The emission factor for a pollutant (kg/GWh)
    pub fn emission_factor(&self, pollutant: Pollutant) -> MassPerEnergy {
        *self
            .emission_factors
            .get(&pollutant)
            .expect("Emission factors cover all pollutants by construction")
    }
}

impl TryFrom<TechnologyRaw> for Technology {
    type Error = anyhow::Error;

    fn try_from(raw: TechnologyRaw) -> Result<Self> {
        ensure!(
            !(raw.renewable && raw.fossil),
            "Technology {} cannot be both renewable and fossil",
            raw.id
        );
        ensure!(
            raw.lifetime > 0,
            "Technology {} must have a non-zero lifetime",
            raw.id
        );
        if let Some(rate) = raw.learning_rate {
            ensure!(
                (0.0..1.0).contains(&rate),
                "Technology {} learning rate must be in [0, 1)",
                raw.id
            );
        }

        // Cost tables are per MWh / kg per MWh; energy is carried in GWh internally
        let emission_factors = [
            (Pollutant::CO2, raw.co2_emission_factor),
            (Pollutant::NOx, raw.nox_emission_factor),
            (Pollutant::SO2, raw.so2_emission_factor),
        ]
        .into_iter()
        .map(|(pollutant, per_mwh)| (pollutant, MassPerEnergy::new(per_mwh * MWH_PER_GWH)))
        .collect();

        Ok(Technology {
            id: raw.id.into(),
            description: raw.description,
            capital_cost: MoneyPerCapacity::new(raw.capital_cost),
            fixed_operating_cost: MoneyPerCapacity::new(raw.fixed_operating_cost),
            variable_operating_cost: MoneyPerEnergy::new(raw.variable_operating_cost * MWH_PER_GWH),
            efficiency: Dimensionless(raw.efficiency),
            capacity_factor: Dimensionless(raw.capacity_factor),
            emission_factors,
            lead_time: raw.lead_time,
            lifetime: raw.lifetime,
            base_capacity: Capacity::new(raw.base_capacity),
            renewable: raw.renewable,
            fossil: raw.fossil,
            indigenous: raw.indigenous,
            intermittent: raw.intermittent,
            learning_rate: raw.learning_rate.map(Dimensionless),
        })
    }
}

fn read_technologies_from_iter<I>(iter: I) -> Result<TechnologyMap>
where
    I: Iterator<Item = TechnologyRaw>,
{
    let mut technologies = TechnologyMap::new();
    for raw in iter {
        let technology = Technology::try_from(raw)?;
        let id = technology.id.clone();
        ensure!(
            technologies.insert(id.clone(), technology).is_none(),
            "Duplicate technology row for {id}"
        );
    }

    Ok(technologies)
}

/// Read the technologies table from the model directory.
pub fn read_technologies(model_dir: &Path) -> Result<TechnologyMap> {
    let file_path = model_dir.join(TECHNOLOGIES_FILE_NAME);
    let technologies_csv = read_csv(&file_path)?;
    read_technologies_from_iter(technologies_csv.into_iter())
        .with_context(|| format!("Error reading {}", file_path.to_string_lossy()))
}
