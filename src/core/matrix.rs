use crate::core::luminaire::{calculate_luminaire, Evaluation};
use crate::core::scenario::{LifetimeDefinition, Scenario};
use crate::input::{CalculationInputs, Luminaire, LuminaireSpec, ProjectParameters};
use itertools::iproduct;
use serde::Serialize;
use strum::IntoEnumIterator;

/// Evaluations of both luminaires under one scenario and lifetime definition.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioResults {
    pub baseline: Evaluation,
    pub proposed: Evaluation,
}

impl ScenarioResults {
    fn evaluate(
        project: &ProjectParameters,
        baseline: &LuminaireSpec,
        proposed: &LuminaireSpec,
        scenario: Scenario,
        lifetime_definition: LifetimeDefinition,
    ) -> Self {
        let (baseline, proposed) = rayon::join(
            || calculate_luminaire(project, baseline, scenario, lifetime_definition),
            || calculate_luminaire(project, proposed, scenario, lifetime_definition),
        );

        Self { baseline, proposed }
    }

    pub fn get(&self, luminaire: Luminaire) -> &Evaluation {
        match luminaire {
            Luminaire::Baseline => &self.baseline,
            Luminaire::Proposed => &self.proposed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifetimeResults {
    pub without: ScenarioResults,
    pub with: ScenarioResults,
    pub with_maintenance: ScenarioResults,
}

impl LifetimeResults {
    fn evaluate(
        project: &ProjectParameters,
        baseline: &LuminaireSpec,
        proposed: &LuminaireSpec,
        lifetime_definition: LifetimeDefinition,
    ) -> Self {
        let scenario_results = |scenario| {
            ScenarioResults::evaluate(project, baseline, proposed, scenario, lifetime_definition)
        };
        let (without, (with, with_maintenance)) = rayon::join(
            || scenario_results(Scenario::Without),
            || {
                rayon::join(
                    || scenario_results(Scenario::With),
                    || scenario_results(Scenario::WithMaintenance),
                )
            },
        );

        Self {
            without,
            with,
            with_maintenance,
        }
    }

    pub fn get(&self, scenario: Scenario) -> &ScenarioResults {
        match scenario {
            Scenario::Without => &self.without,
            Scenario::With => &self.with,
            Scenario::WithMaintenance => &self.with_maintenance,
        }
    }
}

/// Fixture counts after up-sizing each luminaire for 90% lumen maintenance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedQuantities {
    pub baseline_l90: f64,
    pub proposed_l90: f64,
}

/// Identifies one evaluation within a [`ScenarioMatrix`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixCell {
    pub lifetime_definition: LifetimeDefinition,
    pub scenario: Scenario,
    pub luminaire: Luminaire,
}

impl MatrixCell {
    /// Every cell of the matrix, ordered by lifetime definition, then scenario, then luminaire.
    pub fn all() -> impl Iterator<Item = MatrixCell> {
        iproduct!(
            LifetimeDefinition::iter(),
            Scenario::iter(),
            Luminaire::iter()
        )
        .map(|(lifetime_definition, scenario, luminaire)| MatrixCell {
            lifetime_definition,
            scenario,
            luminaire,
        })
    }
}

/// Results for every combination of lifetime definition, scenario and luminaire.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioMatrix {
    #[serde(rename = "L90")]
    pub l90: LifetimeResults,
    #[serde(rename = "L70")]
    pub l70: LifetimeResults,
    #[serde(rename = "adjustedQuantities")]
    pub adjusted_quantities: AdjustedQuantities,
}

impl ScenarioMatrix {
    pub fn get(&self, lifetime_definition: LifetimeDefinition) -> &LifetimeResults {
        match lifetime_definition {
            LifetimeDefinition::L90 => &self.l90,
            LifetimeDefinition::L70 => &self.l70,
        }
    }

    pub fn evaluation(&self, cell: MatrixCell) -> &Evaluation {
        self.get(cell.lifetime_definition)
            .get(cell.scenario)
            .get(cell.luminaire)
    }

    pub fn cells(&self) -> impl Iterator<Item = (MatrixCell, &Evaluation)> {
        MatrixCell::all().map(|cell| (cell, self.evaluation(cell)))
    }

    /// Cells whose calculation failed and were replaced with zeroed results.
    pub fn degraded_cells(&self) -> Vec<MatrixCell> {
        self.cells()
            .filter(|(_, evaluation)| evaluation.is_degraded())
            .map(|(cell, _)| cell)
            .collect()
    }
}

/// Evaluates baseline and proposed luminaires under every scenario for both lifetime
/// definitions.
///
/// For L90 the fixture counts are up-sized by the L90 maintenance factor, so that light output
/// at end of life still meets the design target; L70 uses the counts as given. Each of the
/// twelve evaluations is independent, so a failure in one leaves the others untouched and the
/// matrix is always fully populated.
pub fn calculate_all_scenarios(inputs: &CalculationInputs) -> ScenarioMatrix {
    let project = inputs.project();

    let adjusted_quantities = AdjustedQuantities {
        baseline_l90: inputs.baseline.qty / project.l90_factor,
        proposed_l90: inputs.proposed.qty / project.l90_factor,
    };
    let baseline_l90 = inputs
        .baseline
        .with_quantity(adjusted_quantities.baseline_l90);
    let proposed_l90 = inputs
        .proposed
        .with_quantity(adjusted_quantities.proposed_l90);

    let (l90, l70) = rayon::join(
        || {
            LifetimeResults::evaluate(
                &project,
                &baseline_l90,
                &proposed_l90,
                LifetimeDefinition::L90,
            )
        },
        || {
            LifetimeResults::evaluate(
                &project,
                &inputs.baseline,
                &inputs.proposed,
                LifetimeDefinition::L70,
            )
        },
    );

    ScenarioMatrix {
        l90,
        l70,
        adjusted_quantities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::luminaire::{try_calculate_luminaire, LuminaireResult};
    use crate::presets::default_inputs;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn inputs() -> CalculationInputs {
        default_inputs()
    }

    #[rstest]
    fn should_populate_all_twelve_cells(inputs: CalculationInputs) {
        let matrix = calculate_all_scenarios(&inputs);

        assert_eq!(matrix.cells().count(), 12);
        assert!(matrix.degraded_cells().is_empty());
        for (_, evaluation) in matrix.cells() {
            assert!(evaluation.result().total_gwp > 0.);
        }
    }

    #[rstest]
    fn should_adjust_quantities_for_l90(inputs: CalculationInputs) {
        let matrix = calculate_all_scenarios(&inputs);

        assert_eq!(
            matrix.adjusted_quantities,
            AdjustedQuantities {
                baseline_l90: 500. / 0.9,
                proposed_l90: 473.48 / 0.9,
            }
        );
    }

    #[rstest]
    fn should_evaluate_l90_with_adjusted_and_l70_with_original_quantities(
        inputs: CalculationInputs,
    ) {
        let matrix = calculate_all_scenarios(&inputs);
        let project = inputs.project();

        let expected_l90 = try_calculate_luminaire(
            &project,
            &inputs.baseline.with_quantity(500. / 0.9),
            Scenario::With,
            LifetimeDefinition::L90,
        )
        .unwrap();
        let expected_l70 = try_calculate_luminaire(
            &project,
            &inputs.proposed,
            Scenario::WithMaintenance,
            LifetimeDefinition::L70,
        )
        .unwrap();

        assert_eq!(matrix.l90.with.baseline, Evaluation::Ok(expected_l90));
        assert_eq!(
            matrix.l70.with_maintenance.proposed,
            Evaluation::Ok(expected_l70)
        );
    }

    #[rstest]
    fn should_produce_different_results_for_l70_and_l90(inputs: CalculationInputs) {
        let matrix = calculate_all_scenarios(&inputs);

        let l90 = matrix.l90.without.baseline.result();
        let l70 = matrix.l70.without.baseline.result();

        assert_ne!(l90.total_gwp, l70.total_gwp);
        assert_ne!(l90.total_cost, l70.total_cost);
    }

    #[rstest]
    fn should_match_default_dashboard_expectations(inputs: CalculationInputs) {
        let matrix = calculate_all_scenarios(&inputs);

        let baseline = matrix.l90.without.baseline.result();
        let proposed = matrix.l90.without.proposed.result();

        assert!(baseline.annual_energy > 25_000.);
        assert!(proposed.annual_energy > 20_000.);
        assert!(baseline.total_gwp > 150_000.);
        assert!(proposed.total_gwp > 100_000.);
        assert!(proposed.total_gwp < baseline.total_gwp);
        assert!(baseline.total_cost > 200_000.);
        assert!(proposed.total_cost > 150_000.);
    }

    #[rstest]
    fn should_isolate_failures_to_individual_cells(mut inputs: CalculationInputs) {
        inputs.proposed.cost = f64::NAN;

        let matrix = calculate_all_scenarios(&inputs);

        assert_eq!(matrix.cells().count(), 12);
        let degraded = matrix.degraded_cells();
        assert_eq!(degraded.len(), 6);
        assert!(degraded
            .iter()
            .all(|cell| cell.luminaire == Luminaire::Proposed));
        assert_eq!(
            matrix.l70.with.proposed.result(),
            &LuminaireResult::zeroed()
        );
        assert!(!matrix.l70.with.baseline.is_degraded());
    }

    #[rstest]
    fn should_degrade_only_l90_cells_for_zero_l90_factor(mut inputs: CalculationInputs) {
        inputs.l90_factor = 0.;

        let matrix = calculate_all_scenarios(&inputs);

        assert_eq!(matrix.adjusted_quantities.baseline_l90, f64::INFINITY);
        for (cell, evaluation) in matrix.cells() {
            assert_eq!(
                evaluation.is_degraded(),
                cell.lifetime_definition == LifetimeDefinition::L90,
                "unexpected outcome for {cell:?}"
            );
        }
    }

    #[rstest]
    fn should_list_cells_in_stable_order() {
        let cells = MatrixCell::all().collect::<Vec<_>>();

        assert_eq!(cells.len(), 12);
        assert_eq!(
            cells[0],
            MatrixCell {
                lifetime_definition: LifetimeDefinition::L90,
                scenario: Scenario::Without,
                luminaire: Luminaire::Baseline,
            }
        );
        assert_eq!(
            cells[11],
            MatrixCell {
                lifetime_definition: LifetimeDefinition::L70,
                scenario: Scenario::WithMaintenance,
                luminaire: Luminaire::Proposed,
            }
        );
    }

    #[rstest]
    fn should_serialize_with_dashboard_keys(inputs: CalculationInputs) {
        let json = serde_json::to_value(calculate_all_scenarios(&inputs)).unwrap();

        assert_eq!(json["L90"]["withMaintenance"]["proposed"]["status"], "ok");
        assert!(json["L70"]["with"]["baseline"]["totalCost"].is_f64());
        assert_eq!(json["adjustedQuantities"]["baselineL90"], 500. / 0.9);
    }
}
