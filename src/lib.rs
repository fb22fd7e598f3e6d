//! A least-cost electricity capacity-expansion planner.
//!
//! Technology cost and performance data, demand projections, resource limits and a policy
//! scenario go in; a multi-year linear program is built, handed to the HiGHS solver and the
//! solution read back as capacity, generation and emissions results.
#![warn(missing_docs)]

pub mod cli;
pub mod dataset;
pub mod demand;
pub mod external_cost;
pub mod horizon;
pub mod id;
pub mod input;
pub mod log;
pub mod optimisation;
pub mod output;
pub mod resource;
pub mod scenario;
pub mod technology;
pub mod time_slice;
pub mod units;
pub mod zone;

#[cfg(test)]
mod fixture;
