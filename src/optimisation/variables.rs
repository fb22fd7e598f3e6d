//! Decision variables for the capacity-expansion problem.
//!
//! Each variable is one `highs` column, registered under a typed key so that constraints can
//! look columns up and results can be read back against the original index tuples. The map is
//! ordered, so two builds of the same problem enumerate columns identically.
use crate::dataset::InputDataset;
use crate::optimisation::objective;
use crate::scenario::ScenarioSpec;
use crate::technology::TechnologyID;
use crate::time_slice::TimeSliceID;
use anyhow::{Context, Result};
use highs::RowProblem as Problem;
use indexmap::IndexMap;

/// A decision variable in the optimisation
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
pub type Variable = highs::Col;

/// A key identifying one decision variable
#[derive(Eq, PartialEq, Hash, Clone, Debug)]
pub enum VariableKey {
    /// New capacity (MW) committed for a technology in a build year
    NewCapacity {
        /// The technology being built
        technology: TechnologyID,
        /// The year the build is committed
        year: u32,
    },
    /// Electricity generated (GWh) by a technology in one time slice of a year
    Generation {
        /// The generating technology
        technology: TechnologyID,
        /// The study year
        year: u32,
        /// The time slice
        time_slice: TimeSliceID,
    },
    /// Fuel consumed (GWh) by a fuel-burning technology over a year
    FuelFlow {
        /// The fuel-burning technology
        technology: TechnologyID,
        /// The study year
        year: u32,
    },
    /// Renewable output spilled (GWh) by an intermittent technology in one time slice
    Curtailment {
        /// The intermittent technology
        technology: TechnologyID,
        /// The study year
        year: u32,
        /// The time slice
        time_slice: TimeSliceID,
    },
    /// Energy charged into storage (GWh) in one time slice
    StorageCharge {
        /// The study year
        year: u32,
        /// The time slice
        time_slice: TimeSliceID,
    },
    /// Energy discharged from storage (GWh) in one time slice
    StorageDischarge {
        /// The study year
        year: u32,
        /// The time slice
        time_slice: TimeSliceID,
    },
    /// Energy held in storage (GWh) at the end of one time slice
    StorageLevel {
        /// The study year
        year: u32,
        /// The time slice
        time_slice: TimeSliceID,
    },
}

/// A column of the problem together with its objective coefficient.
///
/// `highs` fixes a column's objective coefficient when the column is added, so the value is
/// recorded here for computing the objective from the primal solution and for checking that
/// repeated builds are identical.
#[derive(Clone, Copy, Debug)]
struct ColumnEntry {
    variable: Variable,
    coefficient: f64,
}

/// A map for easy lookup of variables in the problem.
///
/// The entries are ordered (see [`IndexMap`]).
///
/// We use this data structure for two things:
///
/// 1. To define constraints over subsets of the variables
/// 2. To keep track of the index tuple each column corresponds to, for when we are reading the
///    results of the optimisation.
#[derive(Default)]
pub struct VariableMap {
    entries: IndexMap<VariableKey, ColumnEntry>,
    /// New-capacity columns per technology in build-year order, kept separately so that
    /// cumulative-capacity terms are a prefix slice rather than a per-year map walk
    capacity_columns: IndexMap<TechnologyID, Vec<(u32, Variable)>>,
}

impl VariableMap {
    fn insert(&mut self, key: VariableKey, variable: Variable, coefficient: f64) {
        if let VariableKey::NewCapacity {
            ref technology,
            year,
        } = key
        {
            self.capacity_columns
                .entry(technology.clone())
                .or_default()
                .push((year, variable));
        }

        let existing = self
            .entries
            .insert(key, ColumnEntry {
                variable,
                coefficient,
            })
            .is_some();
        assert!(!existing, "Duplicate entry for variable");
    }

    /// Get the [`Variable`] for a key. A missing key is a model-construction bug.
    pub fn get(&self, key: &VariableKey) -> Result<Variable> {
        self.entries
            .get(key)
            .map(|entry| entry.variable)
            .with_context(|| format!("No variable for {key:?}"))
    }

    /// The generation variable for a technology, year and time slice
    pub fn generation(
        &self,
        technology: &TechnologyID,
        year: u32,
        time_slice: &TimeSliceID,
    ) -> Result<Variable> {
        self.get(&VariableKey::Generation {
            technology: technology.clone(),
            year,
            time_slice: time_slice.clone(),
        })
    }

    /// The fuel-flow variable for a technology and year
    pub fn fuel_flow(&self, technology: &TechnologyID, year: u32) -> Result<Variable> {
        self.get(&VariableKey::FuelFlow {
            technology: technology.clone(),
            year,
        })
    }

    /// The curtailment variable for an intermittent technology, year and time slice
    pub fn curtailment(
        &self,
        technology: &TechnologyID,
        year: u32,
        time_slice: &TimeSliceID,
    ) -> Result<Variable> {
        self.get(&VariableKey::Curtailment {
            technology: technology.clone(),
            year,
            time_slice: time_slice.clone(),
        })
    }

    /// The storage-charge variable for a year and time slice
    pub fn storage_charge(&self, year: u32, time_slice: &TimeSliceID) -> Result<Variable> {
        self.get(&VariableKey::StorageCharge {
            year,
            time_slice: time_slice.clone(),
        })
    }

    /// The storage-discharge variable for a year and time slice
    pub fn storage_discharge(&self, year: u32, time_slice: &TimeSliceID) -> Result<Variable> {
        self.get(&VariableKey::StorageDischarge {
            year,
            time_slice: time_slice.clone(),
        })
    }

    /// The storage-level variable for a year and time slice
    pub fn storage_level(&self, year: u32, time_slice: &TimeSliceID) -> Result<Variable> {
        self.get(&VariableKey::StorageLevel {
            year,
            time_slice: time_slice.clone(),
        })
    }

    /// New-capacity columns for a technology as (build year, variable) pairs, in year order
    pub fn capacity_columns(&self, technology: &TechnologyID) -> &[(u32, Variable)] {
        self.capacity_columns
            .get(technology)
            .map_or(&[], Vec::as_slice)
    }

    /// Columns contributing to available capacity in `year`, honouring the build lead time
    pub fn available_capacity_columns(
        &self,
        technology: &TechnologyID,
        lead_time: u32,
        year: u32,
    ) -> impl Iterator<Item = Variable> + '_ {
        self.capacity_columns(technology)
            .iter()
            .take_while(move |(build_year, _)| build_year + lead_time <= year)
            .map(|(_, variable)| *variable)
    }

    /// Iterate over (key, variable) pairs in the order columns were added
    pub fn iter(&self) -> impl Iterator<Item = (&VariableKey, Variable)> {
        self.entries
            .iter()
            .map(|(key, entry)| (key, entry.variable))
    }

    /// The objective coefficients in column order
    pub fn coefficients(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.values().map(|entry| entry.coefficient)
    }

    /// The number of columns in the problem
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the problem has no columns
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Add one column per decision variable to the problem.
///
/// All variables are non-negative; new-capacity columns additionally carry the annual
/// build-rate ceiling as an upper bound where one is configured.
pub fn add_variables(
    problem: &mut Problem,
    dataset: &InputDataset,
    spec: &ScenarioSpec,
) -> Result<VariableMap> {
    let mut variables = VariableMap::default();

    for (id, technology) in &dataset.technologies {
        for year in dataset.horizon.iter() {
            let coeff = objective::new_capacity_coefficient(dataset, technology, year).value();
            let max_build = dataset
                .resource_limits
                .get(id)
                .and_then(|limit| limit.max_annual_build);
            let variable = match max_build {
                Some(ceiling) => problem.add_column(coeff, 0.0..=ceiling.value()),
                None => problem.add_column(coeff, 0.0..),
            };
            variables.insert(
                VariableKey::NewCapacity {
                    technology: id.clone(),
                    year,
                },
                variable,
                coeff,
            );

            let coeff = objective::generation_coefficient(dataset, spec, technology, year)?.value();
            for time_slice in dataset.time_slices.iter_ids() {
                let variable = problem.add_column(coeff, 0.0..);
                variables.insert(
                    VariableKey::Generation {
                        technology: id.clone(),
                        year,
                        time_slice: time_slice.clone(),
                    },
                    variable,
                    coeff,
                );
            }

            if technology.efficiency.value() > 0.0 {
                let variable = problem.add_column(0.0, 0.0..);
                variables.insert(
                    VariableKey::FuelFlow {
                        technology: id.clone(),
                        year,
                    },
                    variable,
                    0.0,
                );
            }

            if technology.intermittent {
                let coeff = objective::curtailment_coefficient(dataset, year).value();
                for time_slice in dataset.time_slices.iter_ids() {
                    let variable = problem.add_column(coeff, 0.0..);
                    variables.insert(
                        VariableKey::Curtailment {
                            technology: id.clone(),
                            year,
                            time_slice: time_slice.clone(),
                        },
                        variable,
                        coeff,
                    );
                }
            }
        }
    }

    if dataset.parameters.storage_enabled {
        for year in dataset.horizon.iter() {
            for (time_slice, fraction) in dataset.time_slices.iter() {
                let variable = problem.add_column(0.0, 0.0..);
                variables.insert(
                    VariableKey::StorageCharge {
                        year,
                        time_slice: time_slice.clone(),
                    },
                    variable,
                    0.0,
                );

                let coeff = objective::storage_discharge_coefficient(dataset, year).value();
                let variable = problem.add_column(coeff, 0.0..);
                variables.insert(
                    VariableKey::StorageDischarge {
                        year,
                        time_slice: time_slice.clone(),
                    },
                    variable,
                    coeff,
                );

                let coeff =
                    objective::storage_level_coefficient(dataset, year, fraction).value();
                let variable = problem.add_column(coeff, 0.0..);
                variables.insert(
                    VariableKey::StorageLevel {
                        year,
                        time_slice: time_slice.clone(),
                    },
                    variable,
                    coeff,
                );
            }
        }
    }

    Ok(variables)
}
