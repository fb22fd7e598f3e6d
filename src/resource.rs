//! Resource availability limits per technology: a cumulative ceiling on total deployable
//! capacity (technical resource potential) and an optional annual build-rate ceiling
//! (construction throughput).
use crate::input::{deserialise_non_negative, read_csv};
use crate::technology::{TechnologyID, TechnologyMap};
use crate::units::Capacity;
use anyhow::{ensure, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

const RESOURCES_FILE_NAME: &str = "resources.csv";

/// A map of [`ResourceLimit`], keyed by technology ID
pub type ResourceLimitMap = IndexMap<TechnologyID, ResourceLimit>;

/// A row of the resources CSV file. Capacities are in MW.
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct ResourceLimitRaw {
    technology: String,
    #[serde(deserialize_with = "deserialise_non_negative")]
    total_ceiling: f64,
    max_annual_build: Option<f64>,
}

/// Deployment limits for one technology
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceLimit {
    /// Ceiling on cumulative installed capacity across the whole horizon (MW)
    pub total_ceiling: Capacity,
    /// Ceiling on new capacity added in any single year (MW/yr), if limited
    pub max_annual_build: Option<Capacity>,
}

fn read_resource_limits_from_iter<I>(
    iter: I,
    technologies: &TechnologyMap,
) -> Result<ResourceLimitMap>
where
    I: Iterator<Item = ResourceLimitRaw>,
{
    let mut limits = ResourceLimitMap::new();
    for row in iter {
        // A resource row for an unknown technology is a data contract error, not a row to skip
        let id: TechnologyID = row.technology.as_str().into();
        ensure!(
            technologies.contains_key(&id),
            "Resource limit references unknown technology {id}"
        );

        if let Some(max_build) = row.max_annual_build {
            ensure!(
                max_build >= 0.0,
                "Negative annual build limit for technology {id}"
            );
        }

        let limit = ResourceLimit {
            total_ceiling: Capacity::new(row.total_ceiling),
            max_annual_build: row.max_annual_build.map(Capacity::new),
        };
        ensure!(
            limits.insert(id.clone(), limit).is_none(),
            "Duplicate resource limit row for technology {id}"
        );
    }

    Ok(limits)
}

/// Read the resource limits table from the model directory.
pub fn read_resource_limits(
    model_dir: &Path,
    technologies: &TechnologyMap,
) -> Result<ResourceLimitMap> {
    let file_path = model_dir.join(RESOURCES_FILE_NAME);
    let resources_csv = read_csv(&file_path)?;
    read_resource_limits_from_iter(resources_csv.into_iter(), technologies)
        .with_context(|| format!("Error reading {}", file_path.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::technologies;
    use rstest::rstest;

    fn row(technology: &str, total_ceiling: f64, max_annual_build: Option<f64>) -> ResourceLimitRaw {
        ResourceLimitRaw {
            technology: technology.to_string(),
            total_ceiling,
            max_annual_build,
        }
    }

    #[rstest]
    fn test_read_limits(technologies: TechnologyMap) {
        let rows = [row("WIND", 3000.0, Some(500.0)), row("NGCC", 20_000.0, None)];
        let limits = read_resource_limits_from_iter(rows.into_iter(), &technologies).unwrap();
        assert_eq!(limits.len(), 2);
        assert_eq!(
            limits.get("WIND").unwrap().max_annual_build,
            Some(Capacity::new(500.0))
        );
    }

    #[rstest]
    fn test_unknown_technology(technologies: TechnologyMap) {
        let rows = [row("FUSION", 1000.0, None)];
        assert!(read_resource_limits_from_iter(rows.into_iter(), &technologies).is_err());
    }
}
