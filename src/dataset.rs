//! The normalized input dataset for a run.
//!
//! A dataset is loaded once from a model directory (`model.toml` plus the CSV tables) and is
//! read-only thereafter. Scenario-specific coefficient adjustments (learning curves, the
//! indigenous-preference bias) produce a prepared copy; the loaded tables are never mutated,
//! so several scenarios can be run from one dataset.
use crate::demand::{read_demand, DemandSeries};
use crate::external_cost::{read_external_costs, ExternalCosts};
use crate::horizon::{HorizonSection, TimeHorizon};
use crate::input::read_toml;
use crate::resource::{read_resource_limits, ResourceLimitMap};
use crate::scenario::{Policy, ScenarioSpec};
use crate::technology::{read_technologies, TechnologyMap};
use crate::time_slice::{read_time_slices, TimeSliceInfo};
use crate::units::{Capacity, Dimensionless, MoneyPerCapacity, MoneyPerEnergy, MWH_PER_GWH};
use crate::zone::{read_zones, Zones};
use anyhow::{ensure, Result};
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;

const MODEL_FILE_NAME: &str = "model.toml";

/// Reference deployment (MW) against which learning-curve cost reductions are measured
const LEARNING_REFERENCE_CAPACITY: f64 = 1000.0;

/// The contents of the model file
#[derive(Debug, Deserialize, PartialEq)]
struct ModelFile {
    horizon: HorizonSection,
    #[serde(default)]
    economics: EconomicsSection,
    #[serde(default)]
    demand: DemandSection,
    #[serde(default)]
    storage: StorageSection,
    #[serde(default)]
    transmission: TransmissionSection,
}

/// The `[economics]` section of the model file. Costs are in USD/MWh.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
struct EconomicsSection {
    discount_rate: f64,
    peak_demand_factor: f64,
    health_externality_cost: f64,
    curtailment_penalty: f64,
}

impl Default for EconomicsSection {
    fn default() -> Self {
        Self {
            discount_rate: 0.10,
            peak_demand_factor: 1.4,
            health_externality_cost: 5.0,
            curtailment_penalty: 15.0,
        }
    }
}

/// The `[demand]` section of the model file
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
struct DemandSection {
    scenario: String,
}

impl Default for DemandSection {
    fn default() -> Self {
        Self {
            scenario: "BAU".to_string(),
        }
    }
}

/// The `[storage]` section of the model file. Costs are in USD/MWh.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
struct StorageSection {
    enabled: bool,
    carrying_cost: f64,
    operating_cost: f64,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            enabled: false,
            carrying_cost: 300_000.0,
            operating_cost: 20.0,
        }
    }
}

/// The `[transmission]` section of the model file
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
struct TransmissionSection {
    /// Inter-zonal transfer capacity (MW)
    capacity: f64,
    /// Cost per unit of transmitted energy (USD/MWh)
    cost: f64,
    /// Fraction of the inter-zonal demand difference assumed to flow
    flow_fraction: f64,
}

impl Default for TransmissionSection {
    fn default() -> Self {
        Self {
            capacity: 1000.0,
            cost: 5.0,
            flow_fraction: 0.1,
        }
    }
}

/// Run-level parameters, converted to internal units
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    /// Annual discount rate applied to all costs
    pub discount_rate: Dimensionless,
    /// Ratio of peak demand to average demand
    pub peak_demand_factor: Dimensionless,
    /// Health externality add-on for fossil generation (USD/GWh)
    pub health_externality_cost: MoneyPerEnergy,
    /// Penalty for curtailed renewable generation (USD/GWh)
    pub curtailment_penalty: MoneyPerEnergy,
    /// Whether the extended formulation with storage variables is active
    pub storage_enabled: bool,
    /// Annualised carrying cost of held storage energy (USD/GWh of level)
    pub storage_carrying_cost: MoneyPerEnergy,
    /// Storage O&M cost per unit of discharged energy (USD/GWh)
    pub storage_operating_cost: MoneyPerEnergy,
    /// Inter-zonal transfer capacity (MW)
    pub transmission_capacity: Capacity,
    /// Transmission cost per unit of transmitted energy (USD/GWh)
    pub transmission_cost: MoneyPerEnergy,
    /// Fraction of the inter-zonal demand difference assumed to flow
    pub transmission_flow_fraction: Dimensionless,
}

/// The complete, validated input dataset for a run
#[derive(Debug, Clone, PartialEq)]
pub struct InputDataset {
    /// The study horizon
    pub horizon: TimeHorizon,
    /// Run-level parameters
    pub parameters: Parameters,
    /// Technology reference data
    pub technologies: TechnologyMap,
    /// Demand for the selected demand scenario
    pub demand: DemandSeries,
    /// Resource and build-rate ceilings
    pub resource_limits: ResourceLimitMap,
    /// Adjusted external cost factors
    pub external_costs: ExternalCosts,
    /// Time slices for dispatch
    pub time_slices: TimeSliceInfo,
    /// Zones and demand shares
    pub zones: Zones,
}

impl InputDataset {
    /// Load and cross-validate a dataset from the specified model directory.
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<InputDataset> {
        let model_dir = model_dir.as_ref();
        let model_file: ModelFile = read_toml(&model_dir.join(MODEL_FILE_NAME))?;
        let horizon = TimeHorizon::try_from(&model_file.horizon)?;

        let economics = &model_file.economics;
        ensure!(
            economics.discount_rate >= 0.0,
            "Discount rate cannot be negative"
        );
        ensure!(
            economics.peak_demand_factor >= 1.0,
            "Peak demand factor cannot be below 1"
        );

        let parameters = Parameters {
            discount_rate: Dimensionless(economics.discount_rate),
            peak_demand_factor: Dimensionless(economics.peak_demand_factor),
            health_externality_cost: MoneyPerEnergy::new(
                economics.health_externality_cost * MWH_PER_GWH,
            ),
            curtailment_penalty: MoneyPerEnergy::new(economics.curtailment_penalty * MWH_PER_GWH),
            storage_enabled: model_file.storage.enabled,
            storage_carrying_cost: MoneyPerEnergy::new(
                model_file.storage.carrying_cost * MWH_PER_GWH,
            ),
            storage_operating_cost: MoneyPerEnergy::new(
                model_file.storage.operating_cost * MWH_PER_GWH,
            ),
            transmission_capacity: Capacity::new(model_file.transmission.capacity),
            transmission_cost: MoneyPerEnergy::new(model_file.transmission.cost * MWH_PER_GWH),
            transmission_flow_fraction: Dimensionless(model_file.transmission.flow_fraction),
        };

        let technologies = read_technologies(model_dir)?;
        let demand = read_demand(model_dir, &model_file.demand.scenario, &horizon)?;
        let resource_limits = read_resource_limits(model_dir, &technologies)?;
        let external_costs = read_external_costs(model_dir)?;
        let time_slices = read_time_slices(model_dir)?;
        let zones = read_zones(model_dir)?;

        info!(
            "Loaded dataset: {} technologies, {} study years, {} time slices, {} zones",
            technologies.len(),
            horizon.len(),
            time_slices.len(),
            zones.len()
        );

        Ok(InputDataset {
            horizon,
            parameters,
            technologies,
            demand,
            resource_limits,
            external_costs,
            time_slices,
            zones,
        })
    }

    /// Produce a copy of this dataset with input cost coefficients adjusted for a scenario.
    ///
    /// Learning-curve reductions and the indigenous-preference bias change input
    /// coefficients only; they never enter the linear program as variable products, which
    /// would break linearity.
    pub fn prepare_for(&self, spec: &ScenarioSpec) -> InputDataset {
        let mut prepared = self.clone();
        prepared.apply_learning_curves();

        if let Policy::IndigenousPreference {
            ceiling_factor,
            cost_factor,
        } = spec.policy
        {
            prepared.apply_indigenous_preference(ceiling_factor, cost_factor);
        }

        prepared
    }

    /// Scale capital costs down for technologies with a learning rate.
    ///
    /// The reduction follows the usual one-factor learning curve,
    /// `cost × (deployment / reference)^log2(1 − rate)`, evaluated at base-year deployment.
    /// Technologies below the reference deployment keep their full cost.
    fn apply_learning_curves(&mut self) {
        for technology in self.technologies.values_mut() {
            let Some(rate) = technology.learning_rate else {
                continue;
            };

            let deployment = technology.base_capacity.value();
            if deployment <= LEARNING_REFERENCE_CAPACITY {
                continue;
            }

            let exponent = (1.0 - rate.value()).log2();
            let factor = (deployment / LEARNING_REFERENCE_CAPACITY).powf(exponent);
            debug!(
                "Learning curve for {}: capital cost factor {factor:.3}",
                technology.id
            );
            technology.capital_cost =
                MoneyPerCapacity::new(technology.capital_cost.value() * factor);
        }
    }

    /// Raise resource ceilings and discount variable costs for indigenous technologies.
    fn apply_indigenous_preference(
        &mut self,
        ceiling_factor: Dimensionless,
        cost_factor: Dimensionless,
    ) {
        for technology in self.technologies.values_mut() {
            if !technology.indigenous {
                continue;
            }

            technology.variable_operating_cost =
                technology.variable_operating_cost * cost_factor;

            if let Some(limit) = self.resource_limits.get_mut(&technology.id) {
                limit.total_ceiling = limit.total_ceiling * ceiling_factor;
                debug!(
                    "Indigenous preference for {}: ceiling raised to {} MW",
                    technology.id,
                    limit.total_ceiling.value()
                );
            }
        }
    }
}
