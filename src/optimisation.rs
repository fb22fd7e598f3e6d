//! Code for building and solving the capacity-expansion linear program.
//!
//! A [`Program`] is a fully-built `highs` problem for one (dataset, scenario) pair. Building
//! is deterministic: variables and rows are added in the order of the input tables, so the
//! same inputs always produce the same problem. Solving consumes the program and either
//! yields [`ScenarioResults`] or a typed [`SolveError`]; there are no partial results and no
//! automatic constraint relaxation.
use crate::dataset::InputDataset;
use crate::scenario::{ScenarioID, ScenarioSpec};
use crate::units::Money;
use anyhow::{ensure, Result};
use highs::{HighsModelStatus, RowProblem as Problem, Sense};
use log::info;
use std::fmt;

pub mod constraints;
pub mod objective;
pub mod results;
pub mod variables;

use results::ScenarioResults;
use variables::VariableMap;

/// A failure reported by the LP solver, tagged with the scenario being solved
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// The constraints admit no feasible solution (e.g. resource ceilings below the
    /// reserve-margin capacity requirement)
    Infeasible {
        /// The scenario that was being solved
        scenario: String,
    },
    /// The objective can be decreased without bound, which indicates a malformed model
    Unbounded {
        /// The scenario that was being solved
        scenario: String,
    },
    /// The solver stopped for any other reason
    Solver {
        /// The scenario that was being solved
        scenario: String,
        /// The status the solver reported
        status: String,
    },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Infeasible { scenario } => {
                write!(f, "Scenario {scenario} is infeasible")
            }
            SolveError::Unbounded { scenario } => {
                write!(f, "Scenario {scenario} is unbounded")
            }
            SolveError::Solver { scenario, status } => {
                write!(f, "Solver failed for scenario {scenario}: {status}")
            }
        }
    }
}

impl std::error::Error for SolveError {}

/// A built linear program, ready to solve
pub struct Program {
    problem: Problem,
    variables: VariableMap,
    offset: Money,
    scenario: ScenarioID,
}

/// Build the linear program for a prepared dataset and scenario.
///
/// The dataset must already have been prepared for the scenario (see
/// [`InputDataset::prepare_for`]); this function only assembles columns and rows.
pub fn build_program(dataset: &InputDataset, spec: &ScenarioSpec) -> Result<Program> {
    check_transmission_capacity(dataset)?;

    let mut problem = Problem::default();
    let variables = variables::add_variables(&mut problem, dataset, spec)?;
    constraints::add_constraints(&mut problem, &variables, dataset, spec)?;
    let offset = objective::constant_offset(dataset);

    info!(
        "Built program for scenario {}: {} columns, {} rows",
        spec.id,
        variables.len(),
        problem.num_rows()
    );

    Ok(Program {
        problem,
        variables,
        offset,
        scenario: spec.id.clone(),
    })
}

/// Check that the estimated inter-zonal flows fit within the configured transfer capacity.
///
/// The flows are constants derived from demand shares, so a violation cannot be fixed by the
/// optimiser and is reported as a construction error instead of an infeasible LP.
fn check_transmission_capacity(dataset: &InputDataset) -> Result<()> {
    let capacity = dataset.parameters.transmission_capacity;
    for year in dataset.horizon.iter() {
        for flow in dataset.zones.estimate_flows(
            dataset.demand.get(year),
            dataset.parameters.transmission_flow_fraction,
        ) {
            ensure!(
                flow.flow.value() <= capacity.value(),
                "Estimated transmission flow {} -> {} in {year} ({:.0} MW) exceeds the \
                 configured transfer capacity ({:.0} MW)",
                flow.from,
                flow.to,
                flow.flow.value(),
                capacity.value()
            );
        }
    }

    Ok(())
}

impl Program {
    /// The variable map for the built problem
    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    /// The number of constraint rows in the built problem
    pub fn num_rows(&self) -> usize {
        self.problem.num_rows()
    }

    /// Hand the program to the solver and interpret its verdict.
    pub fn solve(self) -> Result<ScenarioResults, SolveError> {
        info!("Solving scenario {}", self.scenario);

        let mut model = self.problem.optimise(Sense::Minimise);
        model.set_option("output_flag", false);

        let solved = model.solve();
        match solved.status() {
            HighsModelStatus::Optimal => {
                let results = ScenarioResults::from_solution(
                    self.scenario,
                    &self.variables,
                    &solved.get_solution(),
                    self.offset,
                );
                info!(
                    "Scenario {} solved; objective value {:.0} USD",
                    results.scenario,
                    results.objective_value.value()
                );
                Ok(results)
            }
            HighsModelStatus::Infeasible => Err(SolveError::Infeasible {
                scenario: self.scenario.to_string(),
            }),
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                Err(SolveError::Unbounded {
                    scenario: self.scenario.to_string(),
                })
            }
            status => Err(SolveError::Solver {
                scenario: self.scenario.to_string(),
                status: format!("{status:?}"),
            }),
        }
    }
}

/// Prepare, build and solve one scenario against a loaded dataset.
pub fn run_scenario(dataset: &InputDataset, spec: &ScenarioSpec) -> Result<ScenarioResults> {
    let prepared = dataset.prepare_for(spec);
    let program = build_program(&prepared, spec)?;
    Ok(program.solve()?)
}
