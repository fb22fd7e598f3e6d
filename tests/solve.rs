//! Integration tests that load a model directory from disk, build the linear program and
//! solve it with HiGHS.
use gridplan::dataset::InputDataset;
use gridplan::optimisation::constraints::{base_year_emissions, gross_demand};
use gridplan::optimisation::{build_program, run_scenario, SolveError};
use gridplan::scenario::get_scenario;
use std::fs;
use std::path::Path;

const EXTERNAL_COSTS_CSV: &str = "\
pollutant,base_cost,scaling_factor
CO2,0.02,1.0
NOx,0.9,1.0
SO2,1.3,1.0
";

/// Write a four-technology national model covering 2014-2020
fn write_model(dir: &Path) {
    fs::write(
        dir.join("model.toml"),
        "[horizon]\nstart_year = 2014\nend_year = 2020\n\n[demand]\nscenario = \"BAU\"\n",
    )
    .unwrap();

    fs::write(
        dir.join("technologies.csv"),
        "\
id,description,capital_cost,fixed_operating_cost,variable_operating_cost,efficiency,capacity_factor,co2_emission_factor,nox_emission_factor,so2_emission_factor,lead_time,lifetime,base_capacity,renewable,fossil,indigenous,intermittent,learning_rate
NGCC,Natural gas combined cycle,800000,20000,45,0.55,0.85,400,0.5,0.1,2,30,6000,false,true,false,false,
COAL,Indigenous coal steam plant,1500000,40000,35,0.38,0.80,900,3.0,6.0,4,40,3000,false,true,true,false,
WIND,Onshore wind,1200000,30000,0,0,0.35,0,0,0,1,25,4000,true,false,false,true,0.10
HYDRO,Large hydro,2000000,25000,5,0,0.45,0,0,0,5,50,12000,true,false,true,false,
",
    )
    .unwrap();

    let mut demand = String::from("year,demand_scenario,demand\n");
    for (offset, year) in (2014..=2020).enumerate() {
        demand.push_str(&format!("{year},BAU,{}\n", 100_000.0 + 5000.0 * offset as f64));
    }
    fs::write(dir.join("demand.csv"), demand).unwrap();

    fs::write(
        dir.join("resources.csv"),
        "\
technology,total_ceiling,max_annual_build
NGCC,20000,
COAL,10000,1000
WIND,10000,1500
HYDRO,15000,500
",
    )
    .unwrap();

    fs::write(dir.join("external_costs.csv"), EXTERNAL_COSTS_CSV).unwrap();
}

#[test]
fn base_scenario_meets_demand_in_every_year() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());
    let dataset = InputDataset::from_path(dir.path()).unwrap();
    let spec = get_scenario("BASE").unwrap();

    let results = run_scenario(&dataset, &spec).unwrap();
    assert!(results.objective_value.value() > 0.0);

    for year in dataset.horizon.iter() {
        let generated = results.annual_generation(year).value();
        let required = gross_demand(&dataset, year).value();
        // Generation is costly, so the balance binds at the optimum
        assert!(generated >= required - 1e-3, "{year}: {generated} < {required}");
        assert!(
            generated <= required * 1.001,
            "{year}: overgeneration ({generated} vs {required})"
        );
    }

    // New-capacity columns are bounded below by zero
    for capacity in results.new_capacity.values() {
        assert!(capacity.value() >= -1e-9);
    }
}

#[test]
fn renewable_target_scenario_meets_the_share() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());
    let dataset = InputDataset::from_path(dir.path()).unwrap();
    let spec = get_scenario("REN50").unwrap();

    let results = run_scenario(&dataset, &spec).unwrap();

    for year in dataset.horizon.iter().skip(1) {
        let renewable = results
            .annual_generation_where(year, |id| {
                dataset.technologies.get(id).unwrap().renewable
            })
            .value();
        let total = results.annual_generation(year).value();
        assert!(
            renewable >= 0.4999 * total,
            "{year}: renewable share {:.3} below target",
            renewable / total
        );
    }
}

#[test]
fn emission_cap_scenario_stays_below_the_cap() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());
    let dataset = InputDataset::from_path(dir.path()).unwrap();
    let spec = get_scenario("CEC20").unwrap();

    let results = run_scenario(&dataset, &spec).unwrap();

    let cap = 0.8 * base_year_emissions(&dataset).value();
    for year in dataset.horizon.iter().skip(1) {
        let emissions: f64 = dataset
            .technologies
            .iter()
            .map(|(id, technology)| {
                let generation = results.annual_generation_where(year, |other| other == id);
                technology
                    .emission_factor(gridplan::external_cost::Pollutant::CO2)
                    .value()
                    * generation.value()
            })
            .sum();
        assert!(emissions <= cap * 1.0001, "{year}: {emissions} > {cap}");
    }
}

#[test]
fn infeasible_when_ceilings_cannot_cover_the_reserve_margin() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("model.toml"),
        "[horizon]\nstart_year = 2014\nend_year = 2015\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("technologies.csv"),
        "\
id,description,capital_cost,fixed_operating_cost,variable_operating_cost,efficiency,capacity_factor,co2_emission_factor,nox_emission_factor,so2_emission_factor,lead_time,lifetime,base_capacity,renewable,fossil,indigenous,intermittent,learning_rate
GT,Open cycle gas turbine,500000,10000,60,0.35,0.90,600,1.0,0.2,1,25,100,false,true,false,false,
",
    )
    .unwrap();
    // Peak demand plus the reserve margin needs ~253 MW of capacity but only 200 MW can
    // ever be built
    fs::write(
        dir.path().join("demand.csv"),
        "year,demand_scenario,demand\n2014,BAU,1200\n2015,BAU,1200\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("resources.csv"),
        "technology,total_ceiling,max_annual_build\nGT,200,\n",
    )
    .unwrap();
    fs::write(dir.path().join("external_costs.csv"), EXTERNAL_COSTS_CSV).unwrap();

    let dataset = InputDataset::from_path(dir.path()).unwrap();
    let spec = get_scenario("BASE").unwrap();

    let program = build_program(&dataset.prepare_for(&spec), &spec).unwrap();
    let err = program.solve().unwrap_err();
    assert_eq!(
        err,
        SolveError::Infeasible {
            scenario: "BASE".to_string()
        }
    );
}

#[test]
fn intermittent_surplus_is_curtailed() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("model.toml"),
        "[horizon]\nstart_year = 2014\nend_year = 2015\n",
    )
    .unwrap();
    // Base-year wind output (1000 MW at 35% capacity factor, ~3066 GWh) far exceeds demand,
    // so the surplus must show up as curtailment
    fs::write(
        dir.path().join("technologies.csv"),
        "\
id,description,capital_cost,fixed_operating_cost,variable_operating_cost,efficiency,capacity_factor,co2_emission_factor,nox_emission_factor,so2_emission_factor,lead_time,lifetime,base_capacity,renewable,fossil,indigenous,intermittent,learning_rate
WIND,Onshore wind,1200000,30000,0,0,0.35,0,0,0,1,25,1000,true,false,false,true,
",
    )
    .unwrap();
    fs::write(
        dir.path().join("demand.csv"),
        "year,demand_scenario,demand\n2014,BAU,500\n2015,BAU,500\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("resources.csv"),
        "technology,total_ceiling,max_annual_build\nWIND,5000,\n",
    )
    .unwrap();
    fs::write(dir.path().join("external_costs.csv"), EXTERNAL_COSTS_CSV).unwrap();

    let dataset = InputDataset::from_path(dir.path()).unwrap();
    let spec = get_scenario("BASE").unwrap();
    let results = run_scenario(&dataset, &spec).unwrap();

    let base_year = dataset.horizon.base_year();
    let curtailed: f64 = results
        .curtailment
        .iter()
        .filter(|((_, year, _), _)| *year == base_year)
        .map(|(_, energy)| energy.value())
        .sum();
    let generated = results.annual_generation(base_year).value();
    let available = 1000.0 * 0.35 * 8760.0 / 1000.0;
    assert!(curtailed > 0.0);
    assert!((generated + curtailed - available).abs() < 1e-3);
}

#[test]
fn storage_shifts_energy_between_time_slices() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());
    // Enable storage and split the year into two slices
    fs::write(
        dir.path().join("model.toml"),
        "[horizon]\nstart_year = 2014\nend_year = 2020\n\n[storage]\nenabled = true\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("time_slices.csv"),
        "id,hours\nday,4380\nnight,4380\n",
    )
    .unwrap();

    let dataset = InputDataset::from_path(dir.path()).unwrap();
    assert_eq!(dataset.time_slices.len(), 2);
    let spec = get_scenario("BASE").unwrap();

    let results = run_scenario(&dataset, &spec).unwrap();

    // Storage cannot create energy: within each year, discharge never exceeds charge
    for year in dataset.horizon.iter() {
        let charged: f64 = results
            .storage_charge
            .iter()
            .filter(|((charge_year, _), _)| *charge_year == year)
            .map(|(_, energy)| energy.value())
            .sum();
        let discharged: f64 = results
            .storage_discharge
            .iter()
            .filter(|((discharge_year, _), _)| *discharge_year == year)
            .map(|(_, energy)| energy.value())
            .sum();
        assert!(discharged <= charged + 1e-6, "{year}: {discharged} > {charged}");
    }
}
