//! Discounted cost coefficients for the objective function.
//!
//! `highs` fixes a column's objective coefficient when the column is created, so every cost
//! attached to a variable must be expressed per unit of that variable at build time. Two
//! consequences shape this module:
//!
//! 1. Fixed O&M accrues on *cumulative* capacity, for which there is no column. It is folded
//!    onto the new-capacity columns instead: capacity built in year `y` pays discounted fixed
//!    O&M in every later horizon year it is available.
//! 2. Costs independent of any variable (fixed O&M on pre-existing capacity, the transmission
//!    flow estimate) cannot enter the solver's objective at all. They are returned as a
//!    constant offset and added back when the objective value is reported.
use crate::dataset::InputDataset;
use crate::external_cost::POLLUTANTS;
use crate::scenario::ScenarioSpec;
use crate::technology::Technology;
use crate::units::{
    Dimensionless, Energy, Money, MoneyPerCapacity, MoneyPerEnergy, HOURS_PER_YEAR, MWH_PER_GWH,
};
use anyhow::Result;

/// The discount factor for a study year
fn discount(dataset: &InputDataset, year: u32) -> Dimensionless {
    dataset
        .horizon
        .discount_factor(dataset.parameters.discount_rate, year)
}

/// The objective coefficient for a new-capacity column (USD per MW built).
///
/// Capital is paid in the build year; fixed O&M is paid in every later horizon year in which
/// the capacity is available (from the end of the lead time onwards).
pub fn new_capacity_coefficient(
    dataset: &InputDataset,
    technology: &Technology,
    build_year: u32,
) -> MoneyPerCapacity {
    let capital = technology.capital_cost * discount(dataset, build_year);

    let first_available = build_year + technology.lead_time;
    let fixed_om: MoneyPerCapacity = dataset
        .horizon
        .iter()
        .filter(|&year| year >= first_available)
        .map(|year| technology.fixed_operating_cost * discount(dataset, year))
        .sum();

    capital + fixed_om
}

/// The objective coefficient for a generation column (USD per GWh).
///
/// Variable O&M always applies; for scenarios that price externalities, the per-pollutant
/// external costs and the health add-on for fossil technologies are included too.
pub fn generation_coefficient(
    dataset: &InputDataset,
    spec: &ScenarioSpec,
    technology: &Technology,
    year: u32,
) -> Result<MoneyPerEnergy> {
    let mut cost = technology.variable_operating_cost;

    if spec.external_costs {
        for pollutant in POLLUTANTS {
            cost = cost
                + technology.emission_factor(pollutant) * dataset.external_costs.get(pollutant)?;
        }

        if technology.fossil {
            cost = cost + dataset.parameters.health_externality_cost;
        }
    }

    Ok(cost * discount(dataset, year))
}

/// The objective coefficient for a curtailment column (USD per GWh spilled)
pub fn curtailment_coefficient(dataset: &InputDataset, year: u32) -> MoneyPerEnergy {
    dataset.parameters.curtailment_penalty * discount(dataset, year)
}

/// The objective coefficient for a storage-discharge column (USD per GWh)
pub fn storage_discharge_coefficient(dataset: &InputDataset, year: u32) -> MoneyPerEnergy {
    dataset.parameters.storage_operating_cost * discount(dataset, year)
}

/// The objective coefficient for a storage-level column (USD per GWh held).
///
/// The carrying cost is annual, so a level held through one slice pays the slice's share of
/// the year.
pub fn storage_level_coefficient(
    dataset: &InputDataset,
    year: u32,
    fraction: Dimensionless,
) -> MoneyPerEnergy {
    dataset.parameters.storage_carrying_cost * fraction * discount(dataset, year)
}

/// The constant part of the objective: discounted costs that no decision variable carries.
///
/// This covers fixed O&M on base-year capacity and the inter-zonal transmission cost
/// estimate. It is added to the reported objective value after solving.
pub fn constant_offset(dataset: &InputDataset) -> Money {
    let base_fixed_om_per_year: Money = dataset
        .technologies
        .values()
        .map(|technology| technology.fixed_operating_cost * technology.base_capacity)
        .sum();

    dataset
        .horizon
        .iter()
        .map(|year| {
            let transmitted: Energy = dataset
                .zones
                .estimate_flows(
                    dataset.demand.get(year),
                    dataset.parameters.transmission_flow_fraction,
                )
                .into_iter()
                .map(|flow| Energy::new(flow.flow.value() * HOURS_PER_YEAR / MWH_PER_GWH))
                .sum();

            (base_fixed_om_per_year + dataset.parameters.transmission_cost * transmitted)
                * discount(dataset, year)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::dataset;
    use crate::scenario::get_scenario;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_new_capacity_coefficient(dataset: InputDataset) {
        let technology = dataset.technologies.get("NGCC").unwrap();
        let base_year = dataset.horizon.base_year();

        // Capital in the base year is undiscounted; fixed O&M starts after the 2-year lead
        // time and runs to the end of the 2014-2020 horizon
        let expected = technology.capital_cost.value()
            + (2..=6)
                .map(|offset| technology.fixed_operating_cost.value() / 1.1f64.powi(offset))
                .sum::<f64>();
        let coeff = new_capacity_coefficient(&dataset, technology, base_year);
        assert_approx_eq!(f64, coeff.value(), expected, epsilon = 1e-3);

        // A build in the final year pays capital but has no time to accrue fixed O&M
        let coeff = new_capacity_coefficient(&dataset, technology, dataset.horizon.end_year());
        assert_approx_eq!(
            f64,
            coeff.value(),
            technology.capital_cost.value() / 1.1f64.powi(6),
            epsilon = 1e-3
        );
    }

    #[rstest]
    fn test_generation_coefficient_external_costs(dataset: InputDataset) {
        let technology = dataset.technologies.get("NGCC").unwrap();
        let base_year = dataset.horizon.base_year();

        let base_spec = get_scenario("BASE").unwrap();
        let without = generation_coefficient(&dataset, &base_spec, technology, base_year).unwrap();
        assert_approx_eq!(
            f64,
            without.value(),
            technology.variable_operating_cost.value()
        );

        // CEC scenarios price emissions and the fossil health add-on
        let cec_spec = get_scenario("CEC10").unwrap();
        let with = generation_coefficient(&dataset, &cec_spec, technology, base_year).unwrap();
        let externalities: f64 = POLLUTANTS
            .into_iter()
            .map(|pollutant| {
                technology.emission_factor(pollutant).value()
                    * dataset.external_costs.get(pollutant).unwrap().value()
            })
            .sum();
        assert_approx_eq!(
            f64,
            with.value(),
            technology.variable_operating_cost.value()
                + externalities
                + dataset.parameters.health_externality_cost.value(),
            epsilon = 1e-3
        );
    }

    #[rstest]
    fn test_constant_offset_single_zone(dataset: InputDataset) {
        // With a single national zone there are no transmission flows, so the offset is the
        // discounted fixed O&M on base-year capacity
        let per_year: f64 = dataset
            .technologies
            .values()
            .map(|technology| {
                technology.fixed_operating_cost.value() * technology.base_capacity.value()
            })
            .sum();
        let expected: f64 = (0..=6).map(|offset| per_year / 1.1f64.powi(offset)).sum();
        assert_approx_eq!(
            f64,
            constant_offset(&dataset).value(),
            expected,
            epsilon = 1.0
        );
    }
}
