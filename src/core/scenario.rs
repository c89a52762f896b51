use crate::input::ProjectParameters;
use serde::{Deserialize, Serialize};

/// Operating scenario for a luminaire installation.
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
pub enum Scenario {
    /// No lighting controls
    Without,
    /// Lighting controls active
    With,
    /// Lighting controls active, plus dimming to compensate for lumen maintenance
    WithMaintenance,
}

/// Which lumen depreciation threshold counts as end of life.
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
pub enum LifetimeDefinition {
    L90,
    L70,
}

impl LifetimeDefinition {
    pub(crate) fn maintenance_factor(&self, project: &ProjectParameters) -> f64 {
        match self {
            LifetimeDefinition::L90 => project.l90_factor,
            LifetimeDefinition::L70 => project.l70_factor,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenarioMultipliers {
    pub energy: f64,
    pub cost: f64,
    pub maintenance: f64,
}

impl ScenarioMultipliers {
    pub fn resolve(
        scenario: Scenario,
        lifetime_definition: LifetimeDefinition,
        project: &ProjectParameters,
    ) -> Self {
        match scenario {
            Scenario::Without => Self {
                energy: 1.,
                cost: 1.,
                maintenance: 1.,
            },
            Scenario::With => Self {
                energy: project.control_coeff,
                cost: project.control_cost_coeff,
                maintenance: 1.,
            },
            Scenario::WithMaintenance => Self {
                energy: project.control_coeff,
                cost: project.control_cost_coeff,
                maintenance: maintenance_dimming_multiplier(
                    lifetime_definition.maintenance_factor(project),
                ),
            },
        }
    }
}

/// Dimming only recovers half the over-provisioned light output as an energy saving, as output
/// is held at the design target rather than cut to the maintained level.
fn maintenance_dimming_multiplier(maintenance_factor: f64) -> f64 {
    1. - (1. - maintenance_factor) / 2.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::default_inputs;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn project() -> ProjectParameters {
        default_inputs().project()
    }

    #[rstest]
    #[case(LifetimeDefinition::L90)]
    #[case(LifetimeDefinition::L70)]
    fn should_not_adjust_anything_without_controls(
        project: ProjectParameters,
        #[case] lifetime_definition: LifetimeDefinition,
    ) {
        assert_eq!(
            ScenarioMultipliers::resolve(Scenario::Without, lifetime_definition, &project),
            ScenarioMultipliers {
                energy: 1.,
                cost: 1.,
                maintenance: 1.
            }
        );
    }

    #[rstest]
    fn should_apply_control_coefficients_with_controls(project: ProjectParameters) {
        assert_eq!(
            ScenarioMultipliers::resolve(Scenario::With, LifetimeDefinition::L70, &project),
            ScenarioMultipliers {
                energy: 0.75,
                cost: 1.15,
                maintenance: 1.
            }
        );
    }

    #[rstest]
    #[case(LifetimeDefinition::L90, 0.95)]
    #[case(LifetimeDefinition::L70, 0.85)]
    fn should_halve_maintenance_correction(
        project: ProjectParameters,
        #[case] lifetime_definition: LifetimeDefinition,
        #[case] expected_maintenance: f64,
    ) {
        let multipliers =
            ScenarioMultipliers::resolve(Scenario::WithMaintenance, lifetime_definition, &project);

        assert_eq!(multipliers.energy, 0.75);
        assert_eq!(multipliers.cost, 1.15);
        approx::assert_relative_eq!(multipliers.maintenance, expected_maintenance);
    }

    #[rstest]
    fn should_not_dim_when_maintenance_factor_is_one() {
        assert_eq!(maintenance_dimming_multiplier(1.), 1.);
    }

    #[rstest]
    fn should_display_names_as_used_in_outputs() {
        assert_eq!(Scenario::WithMaintenance.to_string(), "withMaintenance");
        assert_eq!(Scenario::Without.to_string(), "without");
        assert_eq!(LifetimeDefinition::L90.to_string(), "L90");
    }
}
