//! Fixtures for tests

use crate::dataset::{InputDataset, Parameters};
use crate::demand::DemandSeries;
use crate::external_cost::{ExternalCosts, Pollutant};
use crate::horizon::TimeHorizon;
use crate::resource::{ResourceLimit, ResourceLimitMap};
use crate::technology::{Technology, TechnologyMap};
use crate::time_slice::TimeSliceInfo;
use crate::units::{
    Capacity, Dimensionless, Energy, MassPerEnergy, MoneyPerCapacity, MoneyPerEnergy,
    MoneyPerMass, MWH_PER_GWH,
};
use crate::zone::Zones;
use indexmap::IndexMap;
use rstest::fixture;

/// Emission factors from per-MWh table values
fn emission_factors(co2: f64, nox: f64, so2: f64) -> IndexMap<Pollutant, MassPerEnergy> {
    [
        (Pollutant::CO2, co2),
        (Pollutant::NOx, nox),
        (Pollutant::SO2, so2),
    ]
    .into_iter()
    .map(|(pollutant, per_mwh)| (pollutant, MassPerEnergy::new(per_mwh * MWH_PER_GWH)))
    .collect()
}

/// A four-technology system: gas and indigenous coal, wind with a learning rate, and hydro
#[fixture]
pub fn technologies() -> TechnologyMap {
    let entries = [
        Technology {
            id: "NGCC".into(),
            description: "Natural gas combined cycle".into(),
            capital_cost: MoneyPerCapacity::new(800_000.0),
            fixed_operating_cost: MoneyPerCapacity::new(20_000.0),
            variable_operating_cost: MoneyPerEnergy::new(45.0 * MWH_PER_GWH),
            efficiency: Dimensionless(0.55),
            capacity_factor: Dimensionless(0.85),
            emission_factors: emission_factors(400.0, 0.5, 0.1),
            lead_time: 2,
            lifetime: 30,
            base_capacity: Capacity::new(6000.0),
            renewable: false,
            fossil: true,
            indigenous: false,
            intermittent: false,
            learning_rate: None,
        },
        Technology {
            id: "COAL".into(),
            description: "Indigenous coal steam plant".into(),
            capital_cost: MoneyPerCapacity::new(1_500_000.0),
            fixed_operating_cost: MoneyPerCapacity::new(40_000.0),
            variable_operating_cost: MoneyPerEnergy::new(35.0 * MWH_PER_GWH),
            efficiency: Dimensionless(0.38),
            capacity_factor: Dimensionless(0.80),
            emission_factors: emission_factors(900.0, 3.0, 6.0),
            lead_time: 4,
            lifetime: 40,
            base_capacity: Capacity::new(3000.0),
            renewable: false,
            fossil: true,
            indigenous: true,
            intermittent: false,
            learning_rate: None,
        },
        Technology {
            id: "WIND".into(),
            description: "Onshore wind".into(),
            capital_cost: MoneyPerCapacity::new(1_200_000.0),
            fixed_operating_cost: MoneyPerCapacity::new(30_000.0),
            variable_operating_cost: MoneyPerEnergy::new(0.0),
            efficiency: Dimensionless(0.0),
            capacity_factor: Dimensionless(0.35),
            emission_factors: emission_factors(0.0, 0.0, 0.0),
            lead_time: 1,
            lifetime: 25,
            base_capacity: Capacity::new(4000.0),
            renewable: true,
            fossil: false,
            indigenous: false,
            intermittent: true,
            learning_rate: Some(Dimensionless(0.10)),
        },
        Technology {
            id: "HYDRO".into(),
            description: "Large hydro".into(),
            capital_cost: MoneyPerCapacity::new(2_000_000.0),
            fixed_operating_cost: MoneyPerCapacity::new(25_000.0),
            variable_operating_cost: MoneyPerEnergy::new(5.0 * MWH_PER_GWH),
            efficiency: Dimensionless(0.0),
            capacity_factor: Dimensionless(0.45),
            emission_factors: emission_factors(0.0, 0.0, 0.0),
            lead_time: 5,
            lifetime: 50,
            base_capacity: Capacity::new(12_000.0),
            renewable: true,
            fossil: false,
            indigenous: true,
            intermittent: false,
            learning_rate: None,
        },
    ];

    entries
        .into_iter()
        .map(|technology| (technology.id.clone(), technology))
        .collect()
}

#[fixture]
pub fn resource_limits() -> ResourceLimitMap {
    [
        ("NGCC", 20_000.0, None),
        ("COAL", 10_000.0, Some(1000.0)),
        ("WIND", 10_000.0, Some(1500.0)),
        ("HYDRO", 15_000.0, Some(500.0)),
    ]
    .into_iter()
    .map(|(id, ceiling, max_build)| {
        (
            id.into(),
            ResourceLimit {
                total_ceiling: Capacity::new(ceiling),
                max_annual_build: max_build.map(Capacity::new),
            },
        )
    })
    .collect()
}

#[fixture]
pub fn horizon() -> TimeHorizon {
    TimeHorizon::new(2014, 2020).unwrap()
}

/// Demand growing by 5 TWh per year from 100 TWh in the base year
#[fixture]
pub fn demand(horizon: TimeHorizon) -> DemandSeries {
    DemandSeries::from_annual(
        "BAU".into(),
        horizon.iter().enumerate().map(|(offset, year)| {
            (year, Energy::new(100_000.0 + 5000.0 * offset as f64))
        }),
    )
}

#[fixture]
pub fn external_costs() -> ExternalCosts {
    [
        (Pollutant::CO2, 0.02),
        (Pollutant::NOx, 0.9),
        (Pollutant::SO2, 1.3),
    ]
    .into_iter()
    .map(|(pollutant, per_kg)| (pollutant, MoneyPerMass::new(per_kg)))
    .collect()
}

#[fixture]
pub fn parameters() -> Parameters {
    Parameters {
        discount_rate: Dimensionless(0.10),
        peak_demand_factor: Dimensionless(1.4),
        health_externality_cost: MoneyPerEnergy::new(5.0 * MWH_PER_GWH),
        curtailment_penalty: MoneyPerEnergy::new(15.0 * MWH_PER_GWH),
        storage_enabled: false,
        storage_carrying_cost: MoneyPerEnergy::new(300_000.0 * MWH_PER_GWH),
        storage_operating_cost: MoneyPerEnergy::new(20.0 * MWH_PER_GWH),
        transmission_capacity: Capacity::new(1000.0),
        transmission_cost: MoneyPerEnergy::new(5.0 * MWH_PER_GWH),
        transmission_flow_fraction: Dimensionless(0.1),
    }
}

/// A complete dataset with a single national zone and a single annual time slice
#[fixture]
pub fn dataset(
    horizon: TimeHorizon,
    parameters: Parameters,
    technologies: TechnologyMap,
    demand: DemandSeries,
    resource_limits: ResourceLimitMap,
    external_costs: ExternalCosts,
) -> InputDataset {
    InputDataset {
        horizon,
        parameters,
        technologies,
        demand,
        resource_limits,
        external_costs,
        time_slices: TimeSliceInfo::default(),
        zones: Zones::default(),
    }
}

/// The [`dataset`] fixture with two time slices and storage enabled
#[fixture]
pub fn sliced_dataset(mut dataset: InputDataset) -> InputDataset {
    dataset.time_slices =
        TimeSliceInfo::from_hours([("day".into(), 4380.0), ("night".into(), 4380.0)]).unwrap();
    dataset.parameters.storage_enabled = true;
    dataset
}
