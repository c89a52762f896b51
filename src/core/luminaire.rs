use crate::core::scenario::{LifetimeDefinition, Scenario, ScenarioMultipliers};
use crate::core::units::watt_hours_to_kilowatt_hours;
use crate::input::{LuminaireSpec, ProjectParameters};
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::error;

/// Grid decarbonisation applied by the evaluator when the project leaves the rate unset.
pub(crate) const DEFAULT_DECARBONIZATION_RATE: f64 = 0.;

/// Lifecycle energy, emissions and cost for one luminaire specification under one scenario and
/// lifetime definition.
///
/// Energy is in kWh, emissions in kgCO2e, costs in the currency units of the inputs and
/// `lifetime_years` in years.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LuminaireResult {
    pub annual_energy: f64,
    pub total_energy: f64,
    #[serde(rename = "operationalGWP")]
    pub operational_gwp: f64,
    #[serde(rename = "embodiedGWP")]
    pub embodied_gwp: f64,
    #[serde(rename = "eolGWP")]
    pub eol_gwp: f64,
    #[serde(rename = "totalGWP")]
    pub total_gwp: f64,
    pub initial_cost: f64,
    pub replacement_cost: f64,
    pub annual_operating_cost: f64,
    pub total_operating_cost: f64,
    pub total_cost: f64,
    pub lifetime_years: f64,
    pub replacements: u32,
}

impl LuminaireResult {
    pub fn zeroed() -> Self {
        Self::default()
    }

    pub(crate) fn numeric_fields(&self) -> [(&'static str, f64); 12] {
        [
            ("annualEnergy", self.annual_energy),
            ("totalEnergy", self.total_energy),
            ("operationalGWP", self.operational_gwp),
            ("embodiedGWP", self.embodied_gwp),
            ("eolGWP", self.eol_gwp),
            ("totalGWP", self.total_gwp),
            ("initialCost", self.initial_cost),
            ("replacementCost", self.replacement_cost),
            ("annualOperatingCost", self.annual_operating_cost),
            ("totalOperatingCost", self.total_operating_cost),
            ("totalCost", self.total_cost),
            ("lifetimeYears", self.lifetime_years),
        ]
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CalculationError {
    #[error("Input `{field}` was not a finite number (got {value})")]
    NonFiniteInput { field: &'static str, value: f64 },
    #[error("Calculated `{field}` was not a finite number (got {value})")]
    NonFiniteResult { field: &'static str, value: f64 },
}

/// Outcome of evaluating one luminaire. A failed calculation is not propagated; the caller gets
/// a zeroed result along with the cause, and can choose whether to surface it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Evaluation {
    Ok(LuminaireResult),
    Degraded {
        result: LuminaireResult,
        #[serde(serialize_with = "serialize_cause")]
        cause: CalculationError,
    },
}

impl Evaluation {
    pub fn result(&self) -> &LuminaireResult {
        match self {
            Evaluation::Ok(result) => result,
            Evaluation::Degraded { result, .. } => result,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Evaluation::Degraded { .. })
    }

    pub fn cause(&self) -> Option<&CalculationError> {
        match self {
            Evaluation::Ok(_) => None,
            Evaluation::Degraded { cause, .. } => Some(cause),
        }
    }
}

fn serialize_cause<S: Serializer>(
    cause: &CalculationError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(cause)
}

/// Evaluates one luminaire, masking any calculation failure with a zeroed result that is
/// reported to the tracing subscriber.
pub fn calculate_luminaire(
    project: &ProjectParameters,
    luminaire: &LuminaireSpec,
    scenario: Scenario,
    lifetime_definition: LifetimeDefinition,
) -> Evaluation {
    match try_calculate_luminaire(project, luminaire, scenario, lifetime_definition) {
        Ok(result) => Evaluation::Ok(result),
        Err(cause) => {
            error!(
                %scenario,
                %lifetime_definition,
                "Luminaire calculation failed, using zeroed result: {cause}"
            );
            Evaluation::Degraded {
                result: LuminaireResult::zeroed(),
                cause,
            }
        }
    }
}

pub fn try_calculate_luminaire(
    project: &ProjectParameters,
    luminaire: &LuminaireSpec,
    scenario: Scenario,
    lifetime_definition: LifetimeDefinition,
) -> Result<LuminaireResult, CalculationError> {
    check_inputs_are_finite(project, luminaire)?;

    let multipliers = ScenarioMultipliers::resolve(scenario, lifetime_definition, project);
    let project_life = project.project_life;

    let lifetime = match lifetime_definition {
        LifetimeDefinition::L90 => luminaire.l90_lifetime,
        LifetimeDefinition::L70 => luminaire.l70_lifetime,
    };
    let lifetime_years = if project.operational_hours > 0. {
        lifetime / project.operational_hours
    } else {
        0.
    };
    let replacements = replacements_within(project_life, lifetime_years)?;

    let annual_energy = watt_hours_to_kilowatt_hours(
        luminaire.wattage * luminaire.qty,
        project.operational_hours,
    ) * multipliers.energy
        * multipliers.maintenance;
    let total_energy = annual_energy * project_life as f64;

    let decarbonization_rate = project
        .decarbonization_rate
        .unwrap_or(DEFAULT_DECARBONIZATION_RATE);
    let operational_gwp = (0..project_life)
        .map(|year| {
            annual_energy * grid_factor_for_year(project.grid_factor, decarbonization_rate, year)
        })
        .sum::<f64>();

    let installations = (1 + replacements) as f64;
    let embodied_gwp = luminaire.gwp * luminaire.qty * installations;
    let eol_gwp = luminaire.eol * luminaire.qty * installations;
    let total_gwp = operational_gwp + embodied_gwp + eol_gwp;

    let installation_cost = luminaire.cost * luminaire.qty * multipliers.cost;
    let initial_cost = installation_cost;
    // each replacement is priced at the inflation level of the calendar year it falls in, so
    // two replacements can land in the same year and are charged separately
    let replacement_cost = (1..=replacements)
        .map(|rep| {
            let replacement_year = (rep as f64 * lifetime_years).floor();
            installation_cost * (1. + project.inflation_rate).powf(replacement_year)
        })
        .sum::<f64>();

    let annual_operating_cost = annual_energy * project.electricity_rate;
    let total_operating_cost = (0..project_life)
        .map(|year| annual_operating_cost * (1. + project.inflation_rate).powf(year as f64))
        .sum::<f64>();
    let total_cost = initial_cost + replacement_cost + total_operating_cost;

    let result = LuminaireResult {
        annual_energy,
        total_energy,
        operational_gwp,
        embodied_gwp,
        eol_gwp,
        total_gwp,
        initial_cost,
        replacement_cost,
        annual_operating_cost,
        total_operating_cost,
        total_cost,
        lifetime_years,
        replacements,
    };
    check_result_is_finite(&result)?;

    Ok(result)
}

/// Grid carbon intensity in kgCO2e/kWh for a zero-based project year, decaying geometrically
/// from `grid_factor`.
pub(crate) fn grid_factor_for_year(grid_factor: f64, decarbonization_rate: f64, year: u32) -> f64 {
    grid_factor * (1. - decarbonization_rate).powf(year as f64)
}

/// Number of mid-life replacements needed before the project horizon elapses.
fn replacements_within(project_life: u32, lifetime_years: f64) -> Result<u32, CalculationError> {
    if lifetime_years <= 0. {
        return Ok(0);
    }

    let installations_needed = (project_life as f64 / lifetime_years).ceil();
    if !installations_needed.is_finite() || installations_needed > u32::MAX as f64 {
        return Err(CalculationError::NonFiniteResult {
            field: "replacements",
            value: installations_needed,
        });
    }

    Ok((installations_needed - 1.).max(0.) as u32)
}

fn check_inputs_are_finite(
    project: &ProjectParameters,
    luminaire: &LuminaireSpec,
) -> Result<(), CalculationError> {
    let fields = [
        ("gridFactor", project.grid_factor),
        ("electricityRate", project.electricity_rate),
        ("inflationRate", project.inflation_rate),
        (
            "decarbonizationRate",
            project
                .decarbonization_rate
                .unwrap_or(DEFAULT_DECARBONIZATION_RATE),
        ),
        ("controlCoeff", project.control_coeff),
        ("controlCostCoeff", project.control_cost_coeff),
        ("operationalHours", project.operational_hours),
        ("l90Factor", project.l90_factor),
        ("l70Factor", project.l70_factor),
        ("wattage", luminaire.wattage),
        ("flux", luminaire.flux),
        ("qty", luminaire.qty),
        ("l90Lifetime", luminaire.l90_lifetime),
        ("l70Lifetime", luminaire.l70_lifetime),
        ("gwp", luminaire.gwp),
        ("eol", luminaire.eol),
        ("cost", luminaire.cost),
    ];

    match fields.into_iter().find(|(_, value)| !value.is_finite()) {
        Some((field, value)) => Err(CalculationError::NonFiniteInput { field, value }),
        None => Ok(()),
    }
}

fn check_result_is_finite(result: &LuminaireResult) -> Result<(), CalculationError> {
    match result
        .numeric_fields()
        .into_iter()
        .find(|(_, value)| !value.is_finite())
    {
        Some((field, value)) => Err(CalculationError::NonFiniteResult { field, value }),
        None => Ok(()),
    }
}
