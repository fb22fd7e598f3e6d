//! Code for working with time slices.
//!
//! Time slices are representative sub-annual dispatch periods (e.g. morning peak, off-peak)
//! used to approximate within-year variation without modelling every hour. Each slice covers
//! a number of hours per year; together they must cover the full 8760.
use crate::id::define_id_type;
use crate::input::read_csv;
use crate::units::{Dimensionless, HOURS_PER_YEAR};
use anyhow::{ensure, Context, Result};
use float_cmp::approx_eq;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

const TIME_SLICES_FILE_NAME: &str = "time_slices.csv";

define_id_type! {TimeSliceID}

/// A row of the time slices CSV file
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct TimeSliceRaw {
    id: String,
    /// Hours per year covered by this slice
    hours: f64,
}

/// The time slices for a run, in dispatch order
#[derive(PartialEq, Clone, Debug)]
pub struct TimeSliceInfo {
    slices: IndexMap<TimeSliceID, f64>,
}

impl Default for TimeSliceInfo {
    /// The default is a single slice covering the whole year
    fn default() -> Self {
        Self {
            slices: std::iter::once(("annual".into(), HOURS_PER_YEAR)).collect(),
        }
    }
}

impl TimeSliceInfo {
    /// Build a slice set from (ID, hours per year) pairs, validating coverage of the year.
    pub fn from_hours<I>(hours: I) -> Result<Self>
    where
        I: IntoIterator<Item = (TimeSliceID, f64)>,
    {
        let mut slices = IndexMap::new();
        for (id, slice_hours) in hours {
            ensure!(
                slice_hours > 0.0,
                "Time slice {id} must cover a positive number of hours"
            );
            ensure!(
                slices.insert(id.clone(), slice_hours).is_none(),
                "Duplicate time slice {id}"
            );
        }

        let total: f64 = slices.values().sum();
        ensure!(
            approx_eq!(f64, total, HOURS_PER_YEAR, epsilon = 1e-6),
            "Time slices must cover {HOURS_PER_YEAR} hours per year (got {total})"
        );

        Ok(Self { slices })
    }

    /// Iterate over all time slice IDs in dispatch order
    pub fn iter_ids(&self) -> impl Iterator<Item = &TimeSliceID> {
        self.slices.keys()
    }

    /// Iterate over (slice, fraction of year) pairs in dispatch order
    pub fn iter(&self) -> impl Iterator<Item = (&TimeSliceID, Dimensionless)> {
        self.slices
            .iter()
            .map(|(id, hours)| (id, Dimensionless(hours / HOURS_PER_YEAR)))
    }

    /// The fraction of the year covered by a slice
    pub fn fraction(&self, time_slice: &TimeSliceID) -> Dimensionless {
        let hours = self
            .slices
            .get(time_slice)
            .expect("Time slice IDs come from this map");
        Dimensionless(hours / HOURS_PER_YEAR)
    }

    /// The number of time slices
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Whether there are no time slices (never true for a validated set)
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

fn read_time_slices_from_iter<I>(iter: I) -> Result<TimeSliceInfo>
where
    I: Iterator<Item = TimeSliceRaw>,
{
    TimeSliceInfo::from_hours(iter.map(|row| (row.id.into(), row.hours)))
}

/// Read the time slices table from the model directory.
///
/// If the file is not present, a single slice covering the whole year is used.
pub fn read_time_slices(model_dir: &Path) -> Result<TimeSliceInfo> {
    let file_path = model_dir.join(TIME_SLICES_FILE_NAME);
    if !file_path.is_file() {
        log::warn!("No time slices CSV file provided; using a single annual time slice");
        return Ok(TimeSliceInfo::default());
    }

    let slices_csv = read_csv(&file_path)?;
    read_time_slices_from_iter(slices_csv.into_iter())
        .with_context(|| format!("Error reading {}", file_path.to_string_lossy()))
}
