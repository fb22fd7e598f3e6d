//! Constraint rows for the capacity-expansion problem.
//!
//! Rows are added in a fixed order: demand balance, capacity adequacy, generation-capacity
//! linkage, fuel balance, resource ceilings, storage balance, then the scenario-conditional
//! policy rows. Iteration everywhere follows the ordered input maps, so repeated builds of
//! the same problem are identical row for row.
use crate::dataset::InputDataset;
use crate::external_cost::Pollutant;
use crate::horizon::TimeHorizon;
use crate::optimisation::variables::VariableMap;
use crate::scenario::{Policy, ScenarioSpec};
use crate::time_slice::TimeSliceID;
use crate::units::{Capacity, Dimensionless, Energy, Mass, HOURS_PER_YEAR, MWH_PER_GWH};
use anyhow::Result;
use highs::RowProblem as Problem;

/// Average capacity factor assumed when checking that enough renewable capacity exists to
/// meet a renewable generation target
const RENEWABLE_FLOOR_CAPACITY_FACTOR: f64 = 0.35;

/// Transmission and distribution losses as a fraction of demand.
///
/// The grid is assumed to improve over the study period, so the allowance steps down in
/// five-year bands from the base year.
pub fn staged_losses(horizon: &TimeHorizon, year: u32) -> Dimensionless {
    // Years before the base year get the base-year band
    let offset = year.saturating_sub(horizon.base_year());
    let losses = match offset {
        0..=4 => 0.08,
        5..=9 => 0.06,
        10..=14 => 0.05,
        _ => 0.04,
    };
    Dimensionless(losses)
}

/// Storage/balancing energy requirement as a fraction of demand.
///
/// Steps up over the horizon as the system is assumed to absorb more variable renewables.
pub fn storage_requirement(horizon: &TimeHorizon, year: u32) -> Dimensionless {
    let offset = year.saturating_sub(horizon.base_year());
    let requirement = match offset {
        0..=4 => 0.02,
        5..=9 => 0.04,
        _ => 0.06,
    };
    Dimensionless(requirement)
}

/// Planning reserve margin over peak demand, stepping down as the system matures
pub fn reserve_margin(horizon: &TimeHorizon, year: u32) -> Dimensionless {
    let offset = year.saturating_sub(horizon.base_year());
    let margin = match offset {
        0..=4 => 0.20,
        5..=9 => 0.18,
        10..=14 => 0.15,
        _ => 0.12,
    };
    Dimensionless(margin)
}

/// Demand grossed up for losses and the storage requirement (GWh)
pub fn gross_demand(dataset: &InputDataset, year: u32) -> Energy {
    let factor = Dimensionless(1.0)
        + staged_losses(&dataset.horizon, year)
        + storage_requirement(&dataset.horizon, year);
    factor * dataset.demand.get(year)
}

/// Capacity required to cover peak demand plus the reserve margin (MW)
pub fn capacity_requirement(dataset: &InputDataset, year: u32) -> Capacity {
    let average_load =
        Capacity::new(gross_demand(dataset, year).value() * MWH_PER_GWH / HOURS_PER_YEAR);
    average_load
        * dataset.parameters.peak_demand_factor
        * (Dimensionless(1.0) + reserve_margin(&dataset.horizon, year))
}

/// CO2 emitted by the base-year fleet running at its capacity factors (kg).
///
/// This is the baseline that emission-cap scenarios are measured against.
pub fn base_year_emissions(dataset: &InputDataset) -> Mass {
    dataset
        .technologies
        .values()
        .map(|technology| {
            let output = technology.max_energy_per_capacity() * technology.base_capacity;
            technology.emission_factor(Pollutant::CO2) * output
        })
        .sum()
}

/// Add every constraint row to the problem.
pub fn add_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    dataset: &InputDataset,
    spec: &ScenarioSpec,
) -> Result<()> {
    add_demand_balance_constraints(problem, variables, dataset)?;
    add_capacity_adequacy_constraints(problem, variables, dataset);
    add_generation_capacity_constraints(problem, variables, dataset)?;
    add_fuel_balance_constraints(problem, variables, dataset)?;
    add_resource_ceiling_constraints(problem, variables, dataset);

    if dataset.parameters.storage_enabled {
        add_storage_balance_constraints(problem, variables, dataset)?;
    }

    match spec.policy {
        // The indigenous preference is applied to input coefficients during dataset
        // preparation, so neither of these adds rows
        Policy::Base | Policy::IndigenousPreference { .. } => {}
        Policy::EmissionCap { reduction } => {
            add_emission_cap_constraints(problem, variables, dataset, reduction)?;
        }
        Policy::RenewableTarget { share } => {
            add_renewable_target_constraints(problem, variables, dataset, share)?;
        }
    }

    Ok(())
}

/// Generation plus net storage output must equal grossed-up demand in every time slice.
///
/// The row is an equality: delivered energy has nowhere else to go, and intermittent surplus
/// is absorbed by the curtailment variables rather than by over-supplying the balance.
fn add_demand_balance_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    dataset: &InputDataset,
) -> Result<()> {
    let mut terms = Vec::new();
    for year in dataset.horizon.iter() {
        for (time_slice, fraction) in dataset.time_slices.iter() {
            for id in dataset.technologies.keys() {
                terms.push((variables.generation(id, year, time_slice)?, 1.0));
            }

            if dataset.parameters.storage_enabled {
                terms.push((variables.storage_discharge(year, time_slice)?, 1.0));
                terms.push((variables.storage_charge(year, time_slice)?, -1.0));
            }

            let rhs = (gross_demand(dataset, year) * fraction).value();
            problem.add_row(rhs..=rhs, terms.drain(0..));
        }
    }

    Ok(())
}

/// Available capacity must cover peak demand plus the reserve margin in every year
fn add_capacity_adequacy_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    dataset: &InputDataset,
) {
    let mut terms = Vec::new();
    for year in dataset.horizon.iter() {
        let mut base_capacity = Capacity::new(0.0);
        for (id, technology) in &dataset.technologies {
            base_capacity = base_capacity + technology.base_capacity;
            terms.extend(
                variables
                    .available_capacity_columns(id, technology.lead_time, year)
                    .map(|variable| (variable, 1.0)),
            );
        }

        let rhs = (capacity_requirement(dataset, year) - base_capacity).value();
        problem.add_row(rhs.., terms.drain(0..));
    }
}

/// Generation (plus curtailment for intermittent technologies) is limited by available
/// capacity, the capacity factor and the length of the time slice.
///
/// For intermittent technologies the row is an equality: output at the resource's capacity
/// factor is produced whether the system wants it or not, and the surplus shows up as
/// curtailment.
fn add_generation_capacity_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    dataset: &InputDataset,
) -> Result<()> {
    let mut terms = Vec::new();
    for (id, technology) in &dataset.technologies {
        let energy_per_capacity = technology.max_energy_per_capacity();
        for year in dataset.horizon.iter() {
            for (time_slice, fraction) in dataset.time_slices.iter() {
                terms.push((variables.generation(id, year, time_slice)?, 1.0));
                if technology.intermittent {
                    terms.push((variables.curtailment(id, year, time_slice)?, 1.0));
                }

                let slice_energy_per_capacity = (energy_per_capacity * fraction).value();
                terms.extend(
                    variables
                        .available_capacity_columns(id, technology.lead_time, year)
                        .map(|variable| (variable, -slice_energy_per_capacity)),
                );

                let rhs =
                    (energy_per_capacity * technology.base_capacity * fraction).value();
                if technology.intermittent {
                    problem.add_row(rhs..=rhs, terms.drain(0..));
                } else {
                    problem.add_row(..=rhs, terms.drain(0..));
                }
            }
        }
    }

    Ok(())
}

/// Fuel consumed equals generation divided by conversion efficiency
fn add_fuel_balance_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    dataset: &InputDataset,
) -> Result<()> {
    let mut terms = Vec::new();
    for (id, technology) in &dataset.technologies {
        if technology.efficiency.value() <= 0.0 {
            continue;
        }

        for year in dataset.horizon.iter() {
            terms.push((variables.fuel_flow(id, year)?, technology.efficiency.value()));
            for time_slice in dataset.time_slices.iter_ids() {
                terms.push((variables.generation(id, year, time_slice)?, -1.0));
            }

            problem.add_row(0.0..=0.0, terms.drain(0..));
        }
    }

    Ok(())
}

/// Cumulative builds plus base-year capacity may not exceed the resource ceiling
fn add_resource_ceiling_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    dataset: &InputDataset,
) {
    for (id, limit) in &dataset.resource_limits {
        let base_capacity = dataset
            .technologies
            .get(id)
            .expect("Resource limits are validated against the technology table")
            .base_capacity;

        let terms: Vec<_> = variables
            .capacity_columns(id)
            .iter()
            .map(|&(_, variable)| (variable, 1.0))
            .collect();
        let rhs = (limit.total_ceiling - base_capacity).value();
        problem.add_row(..=rhs, terms);
    }
}

/// Chain the storage level across ordered time slices within each year.
///
/// Storage starts each year empty; the level after each slice is the previous level plus
/// charge minus discharge. There is no inter-year coupling.
fn add_storage_balance_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    dataset: &InputDataset,
) -> Result<()> {
    for year in dataset.horizon.iter() {
        let mut previous: Option<&TimeSliceID> = None;
        for time_slice in dataset.time_slices.iter_ids() {
            let mut terms = vec![
                (variables.storage_level(year, time_slice)?, 1.0),
                (variables.storage_charge(year, time_slice)?, -1.0),
                (variables.storage_discharge(year, time_slice)?, 1.0),
            ];
            if let Some(previous) = previous {
                terms.push((variables.storage_level(year, previous)?, -1.0));
            }

            problem.add_row(0.0..=0.0, terms);
            previous = Some(time_slice);
        }
    }

    Ok(())
}

/// Cap annual CO2 emissions below the base-year baseline for every post-base year
fn add_emission_cap_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    dataset: &InputDataset,
    reduction: Dimensionless,
) -> Result<()> {
    let cap = ((Dimensionless(1.0) - reduction) * base_year_emissions(dataset)).value();

    let mut terms = Vec::new();
    for year in dataset.horizon.iter().skip(1) {
        for (id, technology) in &dataset.technologies {
            let factor = technology.emission_factor(Pollutant::CO2).value();
            if factor <= 0.0 {
                continue;
            }

            for time_slice in dataset.time_slices.iter_ids() {
                terms.push((variables.generation(id, year, time_slice)?, factor));
            }
        }

        problem.add_row(..=cap, terms.drain(0..));
    }

    Ok(())
}

/// Enforce a minimum renewable share of generation for every post-base year.
///
/// Three rows per year: the share itself, a ceiling on fossil generation against grossed-up
/// demand, and a floor on renewable capacity at an assumed average capacity factor. The
/// latter two keep degenerate solutions (e.g. meeting the share by under-generating) out of
/// the feasible region.
fn add_renewable_target_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    dataset: &InputDataset,
    share: Dimensionless,
) -> Result<()> {
    let floor_energy_per_capacity =
        RENEWABLE_FLOOR_CAPACITY_FACTOR * HOURS_PER_YEAR / MWH_PER_GWH;

    let mut share_terms = Vec::new();
    let mut fossil_terms = Vec::new();
    let mut floor_terms = Vec::new();
    for year in dataset.horizon.iter().skip(1) {
        let mut renewable_base_capacity = Capacity::new(0.0);
        for (id, technology) in &dataset.technologies {
            let share_coeff = if technology.renewable {
                1.0 - share.value()
            } else {
                -share.value()
            };
            for time_slice in dataset.time_slices.iter_ids() {
                let generation = variables.generation(id, year, time_slice)?;
                share_terms.push((generation, share_coeff));
                if technology.fossil {
                    fossil_terms.push((generation, 1.0));
                }
            }

            if technology.renewable {
                renewable_base_capacity = renewable_base_capacity + technology.base_capacity;
                floor_terms.extend(
                    variables
                        .available_capacity_columns(id, technology.lead_time, year)
                        .map(|variable| (variable, floor_energy_per_capacity)),
                );
            }
        }

        let demand = gross_demand(dataset, year);

        // sum(renewable) >= share * sum(all), rearranged to keep the RHS constant
        problem.add_row(0.0.., share_terms.drain(0..));

        let fossil_ceiling = ((Dimensionless(1.0) - share) * demand).value();
        problem.add_row(..=fossil_ceiling, fossil_terms.drain(0..));

        let floor_rhs =
            (share * demand).value() - renewable_base_capacity.value() * floor_energy_per_capacity;
        problem.add_row(floor_rhs.., floor_terms.drain(0..));
    }

    Ok(())
}
