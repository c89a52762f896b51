use crate::core::units::LUMENS_PER_KILOLUMEN;
use anyhow::ensure;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Read};

/// Longest project horizon accepted, in years. The yearly emission and cost series are
/// evaluated year by year for every cell, so the horizon bounds the work of a run.
pub const MAX_PROJECT_LIFE: u32 = 100;

pub fn ingest_for_processing(json: impl Read) -> Result<CalculationInputs, anyhow::Error> {
    let reader = BufReader::new(json);
    let inputs: CalculationInputs = serde_json::from_reader(reader)?;
    inputs.validate()?;

    Ok(inputs)
}

/// A complete calculation request: the project-level parameters together with the two luminaire
/// specifications being compared.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CalculationInputs {
    /// Grid carbon intensity, in kgCO2e/kWh
    pub grid_factor: f64,
    /// Electricity price, in currency units/kWh
    pub electricity_rate: f64,
    /// Annual cost inflation, as a fraction
    pub inflation_rate: f64,
    /// Annual reduction in grid carbon intensity, as a fraction. Absent means each calculation
    /// path applies its own default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decarbonization_rate: Option<f64>,
    /// Fraction of energy still used when lighting controls are active
    pub control_coeff: f64,
    /// Multiplier applied to luminaire cost when lighting controls are fitted
    pub control_cost_coeff: f64,
    /// Annual operating hours
    pub operational_hours: f64,
    /// Project horizon, in whole years
    pub project_life: u32,
    /// Maintenance factor at 90% lumen maintenance
    pub l90_factor: f64,
    /// Maintenance factor at 70% lumen maintenance
    pub l70_factor: f64,
    pub baseline: LuminaireSpec,
    pub proposed: LuminaireSpec,
}

impl CalculationInputs {
    /// Checks constraints that the JSON shape alone cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.project_life <= MAX_PROJECT_LIFE,
            "projectLife of {} years exceeds the maximum of {MAX_PROJECT_LIFE}",
            self.project_life
        );

        Ok(())
    }

    pub fn project(&self) -> ProjectParameters {
        ProjectParameters {
            grid_factor: self.grid_factor,
            electricity_rate: self.electricity_rate,
            inflation_rate: self.inflation_rate,
            decarbonization_rate: self.decarbonization_rate,
            control_coeff: self.control_coeff,
            control_cost_coeff: self.control_cost_coeff,
            operational_hours: self.operational_hours,
            project_life: self.project_life,
            l90_factor: self.l90_factor,
            l70_factor: self.l70_factor,
        }
    }

    pub fn luminaire(&self, luminaire: Luminaire) -> &LuminaireSpec {
        match luminaire {
            Luminaire::Baseline => &self.baseline,
            Luminaire::Proposed => &self.proposed,
        }
    }
}

/// The project-level parameters shared by every evaluation within one calculation run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectParameters {
    pub grid_factor: f64,
    pub electricity_rate: f64,
    pub inflation_rate: f64,
    pub decarbonization_rate: Option<f64>,
    pub control_coeff: f64,
    pub control_cost_coeff: f64,
    pub operational_hours: f64,
    pub project_life: u32,
    pub l90_factor: f64,
    pub l70_factor: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LuminaireSpec {
    /// Power draw per luminaire, in W
    pub wattage: f64,
    /// Light output per luminaire, in lumens
    pub flux: f64,
    /// Number of luminaires (may be fractional once up-sized for maintenance)
    pub qty: f64,
    /// Operating hours until light output falls to 90%
    pub l90_lifetime: f64,
    /// Operating hours until light output falls to 70%
    pub l70_lifetime: f64,
    /// Embodied emissions per luminaire, in kgCO2e
    pub gwp: f64,
    /// End-of-life emissions per luminaire, in kgCO2e
    pub eol: f64,
    /// Purchase cost per luminaire
    pub cost: f64,
}

impl LuminaireSpec {
    /// Returns a copy of this spec with a different fixture count.
    pub fn with_quantity(&self, qty: f64) -> Self {
        Self { qty, ..*self }
    }

    /// Luminous efficacy in lm/W.
    pub fn efficacy(&self) -> f64 {
        if self.wattage > 0. {
            self.flux / self.wattage
        } else {
            0.
        }
    }

    /// Total installed light output in klm.
    pub fn total_flux_klm(&self) -> f64 {
        self.flux * self.qty / LUMENS_PER_KILOLUMEN as f64
    }
}

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
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Luminaire {
    Baseline,
    Proposed,
}
