//! Zones split national demand geographically. Decision variables are national; zones
//! contribute their demand shares to the inter-zonal transmission flow estimate, which is
//! costed in the objective and checked against the configured transmission capacity.
use crate::id::define_id_type;
use crate::input::{deserialise_proportion, read_csv};
use crate::units::{Capacity, Dimensionless, Energy, HOURS_PER_YEAR, MWH_PER_GWH};
use anyhow::{ensure, Context, Result};
use float_cmp::approx_eq;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Deserialize;
use std::path::Path;

const ZONES_FILE_NAME: &str = "zones.csv";

define_id_type! {ZoneID}

/// A row of the zones CSV file
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct ZoneRaw {
    id: String,
    #[serde(deserialize_with = "deserialise_proportion")]
    demand_share: f64,
}

/// The zones for a run, with their shares of national demand
#[derive(PartialEq, Clone, Debug)]
pub struct Zones {
    shares: IndexMap<ZoneID, Dimensionless>,
}

impl Default for Zones {
    /// The default is a single national zone
    fn default() -> Self {
        Self {
            shares: std::iter::once(("national".into(), Dimensionless(1.0))).collect(),
        }
    }
}

/// An estimated power flow between a pair of zones
#[derive(PartialEq, Clone, Debug)]
pub struct FlowEstimate {
    /// The exporting zone
    pub from: ZoneID,
    /// The importing zone
    pub to: ZoneID,
    /// Estimated average flow (MW)
    pub flow: Capacity,
}

impl Zones {
    /// Build a zone set from (ID, demand share) pairs, validating the shares.
    pub fn from_shares<I>(shares: I) -> Result<Self>
    where
        I: IntoIterator<Item = (ZoneID, Dimensionless)>,
    {
        let mut map = IndexMap::new();
        for (id, share) in shares {
            ensure!(map.insert(id.clone(), share).is_none(), "Duplicate zone {id}");
        }

        let total: f64 = map.values().map(|share| share.value()).sum();
        ensure!(
            approx_eq!(f64, total, 1.0, epsilon = 1e-6),
            "Zone demand shares must sum to 1 (got {total})"
        );

        Ok(Self { shares: map })
    }

    /// The number of zones
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    /// Whether there are no zones (never true for a validated set)
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Estimate average inter-zonal flows for a year with the given national demand.
    ///
    /// The estimate assumes a fraction of the demand difference between each ordered pair of
    /// zones flows from the less- to the more-loaded zone. Flows are average MW over the year.
    pub fn estimate_flows(
        &self,
        annual_demand: Energy,
        flow_fraction: Dimensionless,
    ) -> Vec<FlowEstimate> {
        let to_average_mw =
            |demand: Energy| Capacity::new(demand.value() * MWH_PER_GWH / HOURS_PER_YEAR);

        self.shares
            .iter()
            .tuple_combinations()
            .map(|((zone_a, share_a), (zone_b, share_b))| {
                let demand_a = *share_a * annual_demand;
                let demand_b = *share_b * annual_demand;
                let (from, to, surplus) = if demand_a.value() >= demand_b.value() {
                    (zone_b.clone(), zone_a.clone(), demand_a - demand_b)
                } else {
                    (zone_a.clone(), zone_b.clone(), demand_b - demand_a)
                };

                FlowEstimate {
                    from,
                    to,
                    flow: to_average_mw(flow_fraction * surplus),
                }
            })
            .collect()
    }
}

fn read_zones_from_iter<I>(iter: I) -> Result<Zones>
where
    I: Iterator<Item = ZoneRaw>,
{
    Zones::from_shares(iter.map(|row| (row.id.into(), Dimensionless(row.demand_share))))
}

/// Read the zones table from the model directory.
///
/// If the file is not present, a single national zone is used.
pub fn read_zones(model_dir: &Path) -> Result<Zones> {
    let file_path = model_dir.join(ZONES_FILE_NAME);
    if !file_path.is_file() {
        return Ok(Zones::default());
    }

    let zones_csv = read_csv(&file_path)?;
    read_zones_from_iter(zones_csv.into_iter())
        .with_context(|| format!("Error reading {}", file_path.to_string_lossy()))
}
