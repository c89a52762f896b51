pub mod core;
pub mod errors;
pub mod input;
pub mod output;
pub mod presets;

use crate::core::luminaire::LuminaireResult;
use crate::core::matrix::{calculate_all_scenarios, MatrixCell, ScenarioMatrix};
use crate::core::metrics::{calculate_timeline_data, ComparisonSummary, TimelineDataPoint};
use crate::core::sensitivity::{
    default_perturbations, run_sensitivity_analysis, SensitivityParameter,
};
use crate::errors::{LcaError, OutputError};
use crate::input::{ingest_for_processing, CalculationInputs};
use crate::output::Output;
use crate::presets::{EquipmentPreset, RegionalPreset};
use bitflags::bitflags;
use csv::WriterBuilder;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use serde::Serialize;
use std::any::Any;
use std::io::{Read, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, instrument, warn};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct ProjectFlags: u32 {
        const SENSITIVITY = 0b1;
        const SKIP_TIMELINE = 0b10;
    }
}

/// Caller choices for a run that sit outside the calculation inputs themselves.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    pub flags: ProjectFlags,
    pub region: Option<RegionalPreset>,
    pub baseline_preset: Option<EquipmentPreset>,
    pub proposed_preset: Option<EquipmentPreset>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResults {
    /// The inputs as calculated, i.e. after any presets were applied
    pub inputs: CalculationInputs,
    pub matrix: ScenarioMatrix,
    pub summary: ComparisonSummary,
    pub timeline: Vec<TimelineDataPoint>,
    pub sensitivity: Option<Vec<SensitivityParameter>>,
    pub degraded_cells: Vec<MatrixCell>,
}

#[instrument(skip_all)]
pub fn run_project(
    input: impl Read,
    output: impl Output,
    options: &RunOptions,
) -> Result<CalculationResults, LcaError> {
    let inputs = apply_presets(ingest_for_processing(input)?, options);
    debug!(
        project_life = inputs.project_life,
        operational_hours = inputs.operational_hours,
        "Ingested calculation inputs"
    );

    let results = catch_unwind(AssertUnwindSafe(|| calculate(inputs, options.flags)))
        .map_err(|panic| LcaError::PanicInCalculation(panic_message(panic)))?;

    if !results.degraded_cells.is_empty() {
        warn!(
            "{} of 12 luminaire calculations fell back to zeroed results",
            results.degraded_cells.len()
        );
    }

    if !output.is_noop() {
        write_outputs(&output, &results)
            .map_err(|err| LcaError::ErrorInOutput(OutputError::new(err)))?;
    }

    Ok(results)
}

fn apply_presets(inputs: CalculationInputs, options: &RunOptions) -> CalculationInputs {
    let mut inputs = match options.region {
        Some(region) => region.apply_to(inputs),
        None => inputs,
    };
    if let Some(preset) = options.baseline_preset {
        inputs.baseline = preset.apply_to(inputs.baseline);
    }
    if let Some(preset) = options.proposed_preset {
        inputs.proposed = preset.apply_to(inputs.proposed);
    }

    inputs
}

fn calculate(inputs: CalculationInputs, flags: ProjectFlags) -> CalculationResults {
    let matrix = calculate_all_scenarios(&inputs);
    let summary = ComparisonSummary::headline(&matrix, inputs.project_life);
    let timeline = if flags.contains(ProjectFlags::SKIP_TIMELINE) {
        vec![]
    } else {
        calculate_timeline_data(&inputs)
    };
    let sensitivity = flags
        .contains(ProjectFlags::SENSITIVITY)
        .then(|| run_sensitivity_analysis(&inputs, &default_perturbations()));
    let degraded_cells = matrix.degraded_cells();

    CalculationResults {
        inputs,
        matrix,
        summary,
        timeline,
        sensitivity,
        degraded_cells,
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

lazy_static! {
    pub static ref UNITS_MAP: IndexMap<&'static str, &'static str> = IndexMap::from([
        ("annualEnergy", "[kWh/year]"),
        ("totalEnergy", "[kWh]"),
        ("operationalGWP", "[kgCO2e]"),
        ("embodiedGWP", "[kgCO2e]"),
        ("eolGWP", "[kgCO2e]"),
        ("totalGWP", "[kgCO2e]"),
        ("initialCost", "[currency]"),
        ("replacementCost", "[currency]"),
        ("annualOperatingCost", "[currency/year]"),
        ("totalOperatingCost", "[currency]"),
        ("totalCost", "[currency]"),
        ("lifetimeYears", "[years]"),
        ("replacements", "[count]"),
    ]);
}

fn write_outputs(output: &impl Output, results: &CalculationResults) -> anyhow::Result<()> {
    write_results_file(output, &results.matrix)?;
    if !results.timeline.is_empty() {
        write_timeline_file(output, &results.timeline)?;
    }
    write_summary_file(output, results)?;

    Ok(())
}

fn write_results_file(output: &impl Output, matrix: &ScenarioMatrix) -> anyhow::Result<()> {
    let writer = output.writer_for_location_key("results", "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    let mut headings = vec!["Lifetime definition", "Scenario", "Luminaire", "Status"];
    let mut units_row = vec!["", "", "", ""];
    for (field, unit) in UNITS_MAP.iter() {
        headings.push(field);
        units_row.push(unit);
    }
    writer.write_record(&headings)?;
    writer.write_record(&units_row)?;

    for (cell, evaluation) in matrix.cells() {
        let status = if evaluation.is_degraded() {
            "degraded"
        } else {
            "ok"
        };
        let mut row = vec![
            cell.lifetime_definition.to_string(),
            cell.scenario.to_string(),
            cell.luminaire.to_string(),
            status.to_string(),
        ];
        row.extend(result_values(evaluation.result()));
        writer.write_record(&row)?;
    }

    debug!("flushing out results CSV");
    writer.flush()?;

    Ok(())
}

fn result_values(result: &LuminaireResult) -> Vec<String> {
    let mut values = result
        .numeric_fields()
        .into_iter()
        .map(|(_, value)| value.to_string())
        .collect::<Vec<_>>();
    values.push(result.replacements.to_string());

    values
}

fn write_timeline_file(output: &impl Output, timeline: &[TimelineDataPoint]) -> anyhow::Result<()> {
    let writer = output.writer_for_location_key("timeline", "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record([
        "Year",
        "Baseline emissions",
        "Proposed emissions",
        "Grid factor",
        "Savings",
    ])?;
    writer.write_record(["[count]", "[kgCO2e]", "[kgCO2e]", "[kgCO2e/kWh]", "[kgCO2e]"])?;
    for point in timeline {
        writer.write_record([
            point.year.to_string(),
            point.baseline_emissions.to_string(),
            point.proposed_emissions.to_string(),
            point.grid_factor.to_string(),
            point.savings.to_string(),
        ])?;
    }

    debug!("flushing out timeline CSV");
    writer.flush()?;

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryFile<'a> {
    summary: &'a ComparisonSummary,
    adjusted_quantities: &'a crate::core::matrix::AdjustedQuantities,
    degraded_cells: &'a [MatrixCell],
    #[serde(skip_serializing_if = "Option::is_none")]
    sensitivity: Option<&'a [SensitivityParameter]>,
}

fn write_summary_file(output: &impl Output, results: &CalculationResults) -> anyhow::Result<()> {
    let mut writer = output.writer_for_location_key("summary", "json")?;
    serde_json::to_writer_pretty(
        &mut writer,
        &SummaryFile {
            summary: &results.summary,
            adjusted_quantities: &results.matrix.adjusted_quantities,
            degraded_cells: &results.degraded_cells,
            sensitivity: results.sensitivity.as_deref(),
        },
    )?;
    writer.flush()?;

    Ok(())
}
