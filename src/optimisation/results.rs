//! Reading the solved problem back into domain terms.
//!
//! Column values are only meaningful against the key each column was registered under, so
//! extraction is a zip of the ordered variable map with the primal solution. Nothing here is
//! called unless the solver reported an optimal solution.
use crate::optimisation::variables::{VariableKey, VariableMap};
use crate::scenario::ScenarioID;
use crate::technology::TechnologyID;
use crate::time_slice::TimeSliceID;
use crate::units::{Capacity, Energy, Money};
use indexmap::IndexMap;

/// The solved variable values and objective for one scenario run
#[derive(Debug)]
pub struct ScenarioResults {
    /// The scenario that was solved
    pub scenario: ScenarioID,
    /// Total discounted system cost, including the constant objective offset (USD)
    pub objective_value: Money,
    /// New capacity per technology and build year (MW)
    pub new_capacity: IndexMap<(TechnologyID, u32), Capacity>,
    /// Generation per technology, year and time slice (GWh)
    pub generation: IndexMap<(TechnologyID, u32, TimeSliceID), Energy>,
    /// Fuel consumed per fuel-burning technology and year (GWh)
    pub fuel_flow: IndexMap<(TechnologyID, u32), Energy>,
    /// Curtailed output per intermittent technology, year and time slice (GWh)
    pub curtailment: IndexMap<(TechnologyID, u32, TimeSliceID), Energy>,
    /// Storage charge per year and time slice (GWh)
    pub storage_charge: IndexMap<(u32, TimeSliceID), Energy>,
    /// Storage discharge per year and time slice (GWh)
    pub storage_discharge: IndexMap<(u32, TimeSliceID), Energy>,
    /// End-of-slice storage level per year and time slice (GWh)
    pub storage_level: IndexMap<(u32, TimeSliceID), Energy>,
}

impl ScenarioResults {
    /// Read every column of the primal solution back against its key.
    ///
    /// The objective value is recomputed from the stored column coefficients so that the
    /// constant offset (costs no variable carries) can be included.
    pub fn from_solution(
        scenario: ScenarioID,
        variables: &VariableMap,
        solution: &highs::Solution,
        offset: Money,
    ) -> Self {
        let columns = solution.columns();
        let objective_value = variables
            .coefficients()
            .zip(columns.iter())
            .map(|(coefficient, value)| Money::new(coefficient * value))
            .sum::<Money>()
            + offset;

        let mut results = ScenarioResults {
            scenario,
            objective_value,
            new_capacity: IndexMap::new(),
            generation: IndexMap::new(),
            fuel_flow: IndexMap::new(),
            curtailment: IndexMap::new(),
            storage_charge: IndexMap::new(),
            storage_discharge: IndexMap::new(),
            storage_level: IndexMap::new(),
        };

        for ((key, _), value) in variables.iter().zip(columns.iter().copied()) {
            match key.clone() {
                VariableKey::NewCapacity { technology, year } => {
                    results
                        .new_capacity
                        .insert((technology, year), Capacity::new(value));
                }
                VariableKey::Generation {
                    technology,
                    year,
                    time_slice,
                } => {
                    results
                        .generation
                        .insert((technology, year, time_slice), Energy::new(value));
                }
                VariableKey::FuelFlow { technology, year } => {
                    results
                        .fuel_flow
                        .insert((technology, year), Energy::new(value));
                }
                VariableKey::Curtailment {
                    technology,
                    year,
                    time_slice,
                } => {
                    results
                        .curtailment
                        .insert((technology, year, time_slice), Energy::new(value));
                }
                VariableKey::StorageCharge { year, time_slice } => {
                    results
                        .storage_charge
                        .insert((year, time_slice), Energy::new(value));
                }
                VariableKey::StorageDischarge { year, time_slice } => {
                    results
                        .storage_discharge
                        .insert((year, time_slice), Energy::new(value));
                }
                VariableKey::StorageLevel { year, time_slice } => {
                    results
                        .storage_level
                        .insert((year, time_slice), Energy::new(value));
                }
            }
        }

        results
    }

    /// Capacity added for a technology up to and including `year` (MW)
    pub fn cumulative_capacity(&self, technology: &TechnologyID, year: u32) -> Capacity {
        self.new_capacity
            .iter()
            .filter(|((id, build_year), _)| id == technology && *build_year <= year)
            .map(|(_, capacity)| *capacity)
            .sum()
    }

    /// Total generation across all technologies and time slices in a year (GWh)
    pub fn annual_generation(&self, year: u32) -> Energy {
        self.generation
            .iter()
            .filter(|((_, generation_year, _), _)| *generation_year == year)
            .map(|(_, energy)| *energy)
            .sum()
    }

    /// Generation in a year summed over technologies selected by `predicate` (GWh)
    pub fn annual_generation_where<F>(&self, year: u32, predicate: F) -> Energy
    where
        F: Fn(&TechnologyID) -> bool,
    {
        self.generation
            .iter()
            .filter(|((id, generation_year, _), _)| *generation_year == year && predicate(id))
            .map(|(_, energy)| *energy)
            .sum()
    }
}
