//! Policy scenarios.
//!
//! Each scenario is a named policy configuration selecting which conditional constraints are
//! injected into the program and whether external costs enter the objective. Scenarios are
//! tagged variants carrying their own typed parameters, so the constraint contract of each
//! policy is explicit rather than being inferred from the scenario name.
use crate::id::define_id_type;
use crate::units::Dimensionless;
use anyhow::{Context, Result};
use indexmap::IndexMap;

define_id_type! {ScenarioID}

/// The policy attached to a scenario
#[derive(PartialEq, Clone, Debug)]
pub enum Policy {
    /// No additional constraints beyond system physics
    Base,
    /// Cap annual CO2 emissions relative to the base-year baseline
    EmissionCap {
        /// Fractional reduction below base-year emissions (e.g. 0.2 for a 20% cap)
        reduction: Dimensionless,
    },
    /// Require a minimum renewable share of generation
    RenewableTarget {
        /// Minimum renewable fraction of total generation (e.g. 0.5)
        share: Dimensionless,
    },
    /// Bias the model towards indigenous resources by adjusting their input coefficients.
    ///
    /// This is a preference, not a hard constraint: resource ceilings for indigenous
    /// technologies are raised and their variable costs discounted before construction.
    IndigenousPreference {
        /// Multiplier applied to indigenous resource ceilings (> 1)
        ceiling_factor: Dimensionless,
        /// Multiplier applied to indigenous variable costs (< 1)
        cost_factor: Dimensionless,
    },
}

/// A named policy scenario
#[derive(PartialEq, Clone, Debug)]
pub struct ScenarioSpec {
    /// Unique scenario identifier (e.g. CEC20)
    pub id: ScenarioID,
    /// A human-readable description
    pub description: String,
    /// Whether external (emission + health) costs enter the objective
    pub external_costs: bool,
    /// The policy constraints for this scenario
    pub policy: Policy,
}

/// The fixed scenario registry.
///
/// BASE is business-as-usual; CEC10/CEC20 cap emissions 10%/20% below the base year;
/// COALMAX prefers indigenous coal; REN50/REN60 set 50%/60% renewable generation targets.
pub fn scenario_registry() -> IndexMap<ScenarioID, ScenarioSpec> {
    let scenarios = [
        ScenarioSpec {
            id: "BASE".into(),
            description: "Business as usual".into(),
            external_costs: false,
            policy: Policy::Base,
        },
        ScenarioSpec {
            id: "CEC10".into(),
            description: "Carbon emission cap 10%".into(),
            external_costs: true,
            policy: Policy::EmissionCap {
                reduction: Dimensionless(0.10),
            },
        },
        ScenarioSpec {
            id: "CEC20".into(),
            description: "Carbon emission cap 20%".into(),
            external_costs: true,
            policy: Policy::EmissionCap {
                reduction: Dimensionless(0.20),
            },
        },
        ScenarioSpec {
            id: "COALMAX".into(),
            description: "Maximum indigenous coal".into(),
            external_costs: true,
            policy: Policy::IndigenousPreference {
                ceiling_factor: Dimensionless(1.5),
                cost_factor: Dimensionless(0.9),
            },
        },
        ScenarioSpec {
            id: "REN50".into(),
            description: "Renewable energy 50%".into(),
            external_costs: true,
            policy: Policy::RenewableTarget {
                share: Dimensionless(0.50),
            },
        },
        ScenarioSpec {
            id: "REN60".into(),
            description: "Renewable energy 60%".into(),
            external_costs: true,
            policy: Policy::RenewableTarget {
                share: Dimensionless(0.60),
            },
        },
    ];

    scenarios
        .into_iter()
        .map(|spec| (spec.id.clone(), spec))
        .collect()
}

/// Look up a scenario by its string identifier. Unknown identifiers are a hard error.
pub fn get_scenario(id: &str) -> Result<ScenarioSpec> {
    scenario_registry()
        .get(id)
        .cloned()
        .with_context(|| format!("Unknown scenario {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let spec = get_scenario("REN50").unwrap();
        assert_eq!(
            spec.policy,
            Policy::RenewableTarget {
                share: Dimensionless(0.50)
            }
        );
        assert!(spec.external_costs);
    }

    #[test]
    fn test_base_scenario() {
        let spec = get_scenario("BASE").unwrap();
        assert_eq!(spec.policy, Policy::Base);
        assert!(!spec.external_costs);
    }

    #[test]
    fn test_unknown_scenario() {
        assert!(get_scenario("REN99").is_err());
    }
}
