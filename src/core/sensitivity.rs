use crate::core::matrix::{calculate_all_scenarios, ScenarioMatrix};
use crate::core::units::percentage_change;
use crate::input::CalculationInputs;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Relative change applied to each input by [`default_perturbations`].
pub const DEFAULT_SENSITIVITY_CHANGE: f64 = 0.1;

/// A project-level input that can be perturbed in a sensitivity analysis.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SensitivityFactor {
    GridFactor,
    ElectricityRate,
    InflationRate,
    DecarbonizationRate,
    ControlCoeff,
    ControlCostCoeff,
    OperationalHours,
    ProjectLife,
    L90Factor,
    L70Factor,
}

impl SensitivityFactor {
    pub fn label(&self) -> &'static str {
        match self {
            SensitivityFactor::GridFactor => "Grid carbon intensity",
            SensitivityFactor::ElectricityRate => "Electricity rate",
            SensitivityFactor::InflationRate => "Inflation rate",
            SensitivityFactor::DecarbonizationRate => "Grid decarbonization rate",
            SensitivityFactor::ControlCoeff => "Control energy coefficient",
            SensitivityFactor::ControlCostCoeff => "Control cost coefficient",
            SensitivityFactor::OperationalHours => "Operational hours",
            SensitivityFactor::ProjectLife => "Project life",
            SensitivityFactor::L90Factor => "L90 maintenance factor",
            SensitivityFactor::L70Factor => "L70 maintenance factor",
        }
    }

    /// Returns a copy of `inputs` with this factor scaled by `1 + change`. Project life is
    /// rounded to whole years, and an unset decarbonization rate stays unset.
    pub fn perturb(&self, inputs: &CalculationInputs, change: f64) -> CalculationInputs {
        let scale = 1. + change;
        let mut perturbed = inputs.clone();
        match self {
            SensitivityFactor::GridFactor => perturbed.grid_factor *= scale,
            SensitivityFactor::ElectricityRate => perturbed.electricity_rate *= scale,
            SensitivityFactor::InflationRate => perturbed.inflation_rate *= scale,
            SensitivityFactor::DecarbonizationRate => {
                perturbed.decarbonization_rate =
                    inputs.decarbonization_rate.map(|rate| rate * scale)
            }
            SensitivityFactor::ControlCoeff => perturbed.control_coeff *= scale,
            SensitivityFactor::ControlCostCoeff => perturbed.control_cost_coeff *= scale,
            SensitivityFactor::OperationalHours => perturbed.operational_hours *= scale,
            SensitivityFactor::ProjectLife => {
                perturbed.project_life =
                    (inputs.project_life as f64 * scale).round().max(0.) as u32
            }
            SensitivityFactor::L90Factor => perturbed.l90_factor *= scale,
            SensitivityFactor::L70Factor => perturbed.l70_factor *= scale,
        }
        perturbed
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityParameter {
    pub name: String,
    pub factor: SensitivityFactor,
    /// Relative change applied to the input
    pub change: f64,
    /// Resulting percentage change in the proposed luminaire's lifetime GWP
    pub impact: f64,
}

/// Every factor raised by [`DEFAULT_SENSITIVITY_CHANGE`].
pub fn default_perturbations() -> Vec<(SensitivityFactor, f64)> {
    SensitivityFactor::iter()
        .map(|factor| (factor, DEFAULT_SENSITIVITY_CHANGE))
        .collect()
}

/// Measures how far the proposed luminaire's lifetime GWP (L90, without controls) moves when
/// each input is perturbed on its own. Each perturbation is an independent recalculation.
pub fn run_sensitivity_analysis(
    inputs: &CalculationInputs,
    perturbations: &[(SensitivityFactor, f64)],
) -> Vec<SensitivityParameter> {
    let reference = headline_proposed_gwp(&calculate_all_scenarios(inputs));

    perturbations
        .par_iter()
        .map(|&(factor, change)| {
            let perturbed = calculate_all_scenarios(&factor.perturb(inputs, change));

            SensitivityParameter {
                name: factor.label().to_string(),
                factor,
                change,
                impact: percentage_change(reference, headline_proposed_gwp(&perturbed)),
            }
        })
        .collect()
}

fn headline_proposed_gwp(matrix: &ScenarioMatrix) -> f64 {
    matrix.l90.without.proposed.result().total_gwp
}
