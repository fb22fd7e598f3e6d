//! Code for working with the study horizon.
//!
//! The horizon is an ordered sequence of contiguous annual study years with a designated
//! base year, from which all discounting is measured.
use crate::units::Dimensionless;
use anyhow::{ensure, Result};
use serde::Deserialize;

/// The ordered study years for a model run
#[derive(PartialEq, Clone, Debug)]
pub struct TimeHorizon {
    years: Vec<u32>,
}

/// The `[horizon]` section of the model file
#[derive(Debug, Deserialize, PartialEq)]
pub struct HorizonSection {
    /// First (base) year of the study period
    pub start_year: u32,
    /// Final year of the study period (inclusive)
    pub end_year: u32,
}

impl TimeHorizon {
    /// Create a horizon covering `start_year..=end_year` in annual steps.
    pub fn new(start_year: u32, end_year: u32) -> Result<Self> {
        ensure!(
            start_year < end_year,
            "Study period must cover at least two years (got {start_year}..={end_year})"
        );

        Ok(Self {
            years: (start_year..=end_year).collect(),
        })
    }

    /// The base year, from which discount factors and policy baselines are measured
    pub fn base_year(&self) -> u32 {
        self.years[0]
    }

    /// The final study year
    pub fn end_year(&self) -> u32 {
        *self.years.last().expect("Horizon cannot be empty")
    }

    /// The number of study years
    pub fn len(&self) -> usize {
        self.years.len()
    }

    /// Whether the horizon is empty (never true for a validated horizon)
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Iterate over the study years in order
    pub fn iter(&self) -> impl Iterator<Item = u32> + Clone + '_ {
        self.years.iter().copied()
    }

    /// The position of `year` within the horizon
    pub fn index_of(&self, year: u32) -> Option<usize> {
        year.checked_sub(self.base_year())
            .map(|offset| offset as usize)
            .filter(|&offset| offset < self.years.len())
    }

    /// Whether `year` falls within the horizon
    pub fn contains(&self, year: u32) -> bool {
        self.index_of(year).is_some()
    }

    /// The standard discount factor `1/(1+r)^(year - base_year)` for a study year
    pub fn discount_factor(&self, discount_rate: Dimensionless, year: u32) -> Dimensionless {
        let exponent = (year - self.base_year()) as i32;
        Dimensionless(1.0) * (Dimensionless(1.0) + discount_rate).powi(-exponent)
    }
}

impl TryFrom<&HorizonSection> for TimeHorizon {
    type Error = anyhow::Error;

    fn try_from(section: &HorizonSection) -> Result<Self> {
        TimeHorizon::new(section.start_year, section.end_year)
    }
}
