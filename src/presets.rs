//! Caller-side constant tables: typical project inputs, regional grid and tariff defaults, and
//! common luminaire types. The calculation engine itself never reads these.

use crate::input::{CalculationInputs, LuminaireSpec};
use serde::{Deserialize, Serialize};

/// A typical US office retrofit: 500 12W troffers replaced by 9W LED panels.
pub fn default_inputs() -> CalculationInputs {
    CalculationInputs {
        grid_factor: 0.39,
        electricity_rate: 0.26,
        inflation_rate: 0.03,
        decarbonization_rate: Some(0.03),
        control_coeff: 0.75,
        control_cost_coeff: 1.15,
        operational_hours: 4990.,
        project_life: 15,
        l90_factor: 0.9,
        l70_factor: 0.7,
        baseline: LuminaireSpec {
            wattage: 12.,
            flux: 1000.,
            qty: 500.,
            l90_lifetime: 50_000.,
            l70_lifetime: 120_000.,
            gwp: 10.,
            eol: 0.5,
            cost: 260.,
        },
        proposed: LuminaireSpec {
            wattage: 9.,
            flux: 1059.,
            qty: 473.48,
            l90_lifetime: 45_000.,
            l70_lifetime: 100_000.,
            gwp: 20.,
            eol: 1.5,
            cost: 220.,
        },
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RegionalPreset {
    UsAverage,
    EuAverage,
    LowCarbonGrid,
}

impl RegionalPreset {
    /// Grid carbon intensity (kgCO2e/kWh), electricity rate (per kWh) and annual grid
    /// decarbonization rate for the region.
    fn values(&self) -> (f64, f64, f64) {
        match self {
            RegionalPreset::UsAverage => (0.39, 0.26, 0.03),
            RegionalPreset::EuAverage => (0.28, 0.22, 0.05),
            RegionalPreset::LowCarbonGrid => (0.15, 0.18, 0.06),
        }
    }

    pub fn apply_to(&self, inputs: CalculationInputs) -> CalculationInputs {
        let (grid_factor, electricity_rate, decarbonization_rate) = self.values();

        CalculationInputs {
            grid_factor,
            electricity_rate,
            decarbonization_rate: Some(decarbonization_rate),
            ..inputs
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EquipmentPreset {
    #[serde(rename = "t8-fluorescent")]
    #[strum(to_string = "t8-fluorescent")]
    T8Fluorescent,
    MetalHalide,
    StandardLed,
    HighEfficiencyLed,
    HighBayLed,
}

impl EquipmentPreset {
    /// Overrides the luminaire characteristics with those of the preset type. The fixture
    /// count and end-of-life emissions are left as they were.
    pub fn apply_to(&self, spec: LuminaireSpec) -> LuminaireSpec {
        let (wattage, flux, l90_lifetime, l70_lifetime, gwp, cost) = match self {
            EquipmentPreset::T8Fluorescent => (32., 2800., 24_000., 36_000., 8., 180.),
            EquipmentPreset::MetalHalide => (150., 15_000., 15_000., 20_000., 25., 320.),
            EquipmentPreset::StandardLed => (25., 3000., 54_000., 100_000., 18., 240.),
            EquipmentPreset::HighEfficiencyLed => (20., 3200., 60_000., 120_000., 22., 320.),
            EquipmentPreset::HighBayLed => (80., 12_000., 50_000., 100_000., 45., 580.),
        };

        LuminaireSpec {
            wattage,
            flux,
            l90_lifetime,
            l70_lifetime,
            gwp,
            cost,
            ..spec
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matrix::calculate_all_scenarios;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[rstest]
    fn should_apply_regional_preset_without_touching_luminaires() {
        let inputs = RegionalPreset::EuAverage.apply_to(default_inputs());

        assert_eq!(inputs.grid_factor, 0.28);
        assert_eq!(inputs.electricity_rate, 0.22);
        assert_eq!(inputs.decarbonization_rate, Some(0.05));
        assert_eq!(inputs.inflation_rate, 0.03);
        assert_eq!(inputs.baseline, default_inputs().baseline);
    }

    #[rstest]
    fn should_match_default_inputs_for_us_average() {
        assert_eq!(
            RegionalPreset::UsAverage.apply_to(default_inputs()),
            default_inputs()
        );
    }

    #[rstest]
    fn should_keep_quantity_and_eol_when_applying_equipment_preset() {
        let spec = EquipmentPreset::T8Fluorescent.apply_to(default_inputs().baseline);

        assert_eq!(spec.wattage, 32.);
        assert_eq!(spec.flux, 2800.);
        assert_eq!(spec.qty, 500.);
        assert_eq!(spec.eol, 0.5);
    }

    #[rstest]
    fn should_parse_preset_names() {
        assert_eq!(
            RegionalPreset::from_str("low-carbon-grid").unwrap(),
            RegionalPreset::LowCarbonGrid
        );
        assert_eq!(
            EquipmentPreset::from_str("high-efficiency-led").unwrap(),
            EquipmentPreset::HighEfficiencyLed
        );
        assert_eq!(EquipmentPreset::T8Fluorescent.to_string(), "t8-fluorescent");
        assert!(RegionalPreset::from_str("mars").is_err());
    }

    #[rstest]
    fn should_calculate_cleanly_for_every_preset_combination() {
        for region in RegionalPreset::iter() {
            for equipment in EquipmentPreset::iter() {
                let mut inputs = region.apply_to(default_inputs());
                inputs.proposed = equipment.apply_to(inputs.proposed);

                let matrix = calculate_all_scenarios(&inputs);

                assert!(
                    matrix.degraded_cells().is_empty(),
                    "{region} with {equipment} degraded"
                );
            }
        }
    }
}
