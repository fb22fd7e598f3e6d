//! The module responsible for writing result data to disk.
use crate::dataset::InputDataset;
use crate::external_cost::{Pollutant, POLLUTANTS};
use crate::optimisation::results::ScenarioResults;
use crate::technology::TechnologyID;
use crate::time_slice::TimeSliceID;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "gridplan_results";

/// The output file name for new and cumulative capacity
const CAPACITY_FILE_NAME: &str = "capacity.csv";

/// The output file name for generation and curtailment
const GENERATION_FILE_NAME: &str = "generation.csv";

/// The output file name for annual emissions
const EMISSIONS_FILE_NAME: &str = "emissions.csv";

/// Get the default output directory for a model and scenario
pub fn get_output_dir(model_dir: &Path, scenario: &str) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, model_name, scenario].iter().collect())
}

/// Create the output directory (and any missing parents)
pub fn create_output_directory(output_dir: &Path) -> Result<()> {
    if output_dir.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(output_dir)?;

    Ok(())
}

/// Represents a row in the capacity CSV file
#[derive(Serialize, Debug, PartialEq)]
struct CapacityRow {
    technology: TechnologyID,
    year: u32,
    new_capacity_mw: f64,
    cumulative_capacity_mw: f64,
}

/// Represents a row in the generation CSV file
#[derive(Serialize, Debug, PartialEq)]
struct GenerationRow {
    technology: TechnologyID,
    year: u32,
    time_slice: TimeSliceID,
    generation_gwh: f64,
    curtailment_gwh: f64,
}

/// Represents a row in the emissions CSV file
#[derive(Serialize, Debug, PartialEq)]
struct EmissionsRow {
    year: u32,
    pollutant: Pollutant,
    emissions_kg: f64,
}

/// Write the results of one scenario run as CSV files in `output_dir`.
pub fn write_results(
    output_dir: &Path,
    results: &ScenarioResults,
    dataset: &InputDataset,
) -> Result<()> {
    write_capacity(&output_dir.join(CAPACITY_FILE_NAME), results)?;
    write_generation(&output_dir.join(GENERATION_FILE_NAME), results)?;
    write_emissions(&output_dir.join(EMISSIONS_FILE_NAME), results, dataset)?;

    Ok(())
}

fn write_capacity(file_path: &Path, results: &ScenarioResults) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)?;
    for ((technology, year), capacity) in &results.new_capacity {
        writer.serialize(CapacityRow {
            technology: technology.clone(),
            year: *year,
            new_capacity_mw: capacity.value(),
            cumulative_capacity_mw: results.cumulative_capacity(technology, *year).value(),
        })?;
    }
    writer.flush()?;

    Ok(())
}

fn write_generation(file_path: &Path, results: &ScenarioResults) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)?;
    for ((technology, year, time_slice), generation) in &results.generation {
        let curtailment = results
            .curtailment
            .get(&(technology.clone(), *year, time_slice.clone()))
            .map_or(0.0, |energy| energy.value());
        writer.serialize(GenerationRow {
            technology: technology.clone(),
            year: *year,
            time_slice: time_slice.clone(),
            generation_gwh: generation.value(),
            curtailment_gwh: curtailment,
        })?;
    }
    writer.flush()?;

    Ok(())
}

fn write_emissions(
    file_path: &Path,
    results: &ScenarioResults,
    dataset: &InputDataset,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)?;
    for year in dataset.horizon.iter() {
        for pollutant in POLLUTANTS {
            let emissions: f64 = dataset
                .technologies
                .iter()
                .map(|(id, technology)| {
                    let generation = results.annual_generation_where(year, |other| other == id);
                    (technology.emission_factor(pollutant) * generation).value()
                })
                .sum();
            writer.serialize(EmissionsRow {
                year,
                pollutant,
                emissions_kg: emissions,
            })?;
        }
    }
    writer.flush()?;

    Ok(())
}
