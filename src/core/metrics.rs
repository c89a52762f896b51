use crate::core::luminaire::grid_factor_for_year;
use crate::core::matrix::ScenarioMatrix;
use crate::core::scenario::{LifetimeDefinition, Scenario};
use crate::core::units::{percentage_change, watt_hours_to_kilowatt_hours, PERCENT};
use crate::input::{CalculationInputs, LuminaireSpec};
use serde::Serialize;

/// Grid decarbonisation assumed by the emissions timeline when the project leaves the rate
/// unset or at zero. This differs from the evaluator's default of zero.
pub(crate) const TIMELINE_DEFAULT_DECARBONIZATION_RATE: f64 = 0.03;

/// Percentage reduction in GWP from baseline to proposed; negative when the proposed option
/// emits more. Gives 0 when the baseline has no emissions.
pub fn calculate_gwp_reduction(baseline_gwp: f64, proposed_gwp: f64) -> f64 {
    if baseline_gwp > 0. {
        (baseline_gwp - proposed_gwp) / baseline_gwp * PERCENT
    } else {
        0.
    }
}

/// Percentage change in cost from baseline to proposed; positive when the proposed option costs
/// more.
pub fn calculate_cost_change(baseline_cost: f64, proposed_cost: f64) -> f64 {
    percentage_change(baseline_cost, proposed_cost)
}

/// Years for the annual savings to pay back any extra outlay on the proposed option.
pub fn calculate_payback_period(
    baseline_cost: f64,
    proposed_cost: f64,
    annual_savings: f64,
) -> f64 {
    if annual_savings > 0. {
        ((proposed_cost - baseline_cost) / annual_savings).max(0.)
    } else {
        0.
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDataPoint {
    /// One-based project year
    pub year: u32,
    pub baseline_emissions: f64,
    pub proposed_emissions: f64,
    pub grid_factor: f64,
    pub savings: f64,
}

/// Operational emissions of each luminaire for every project year, as installed and without
/// controls or maintenance dimming.
pub fn calculate_timeline_data(inputs: &CalculationInputs) -> Vec<TimelineDataPoint> {
    let uncontrolled_annual_energy = |luminaire: &LuminaireSpec| {
        watt_hours_to_kilowatt_hours(luminaire.wattage * luminaire.qty, inputs.operational_hours)
    };
    let baseline_annual_energy = uncontrolled_annual_energy(&inputs.baseline);
    let proposed_annual_energy = uncontrolled_annual_energy(&inputs.proposed);
    // a zero rate counts as unset here, unlike in the evaluator
    let decarbonization_rate = inputs
        .decarbonization_rate
        .filter(|rate| rate.is_finite() && *rate != 0.)
        .unwrap_or(TIMELINE_DEFAULT_DECARBONIZATION_RATE);

    (0..inputs.project_life)
        .map(|year| {
            let grid_factor = grid_factor_for_year(inputs.grid_factor, decarbonization_rate, year);
            let baseline_emissions = baseline_annual_energy * grid_factor;
            let proposed_emissions = proposed_annual_energy * grid_factor;

            TimelineDataPoint {
                year: year + 1,
                baseline_emissions,
                proposed_emissions,
                grid_factor,
                savings: baseline_emissions - proposed_emissions,
            }
        })
        .collect()
}

/// Whether a metric went up or down relative to the baseline.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, strum::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl Trend {
    pub fn of_change(percentage: f64) -> Self {
        if percentage > 0. {
            Trend::Up
        } else if percentage < 0. {
            Trend::Down
        } else {
            Trend::Neutral
        }
    }
}

/// Headline comparison of the proposed luminaire against the baseline for one cell of the
/// scenario matrix.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub lifetime_definition: LifetimeDefinition,
    pub scenario: Scenario,
    /// Proposed lifetime emissions, in kgCO2e
    pub total_emissions: f64,
    pub gwp_reduction: f64,
    pub gwp_trend: Trend,
    /// Proposed total cost of ownership
    pub total_cost: f64,
    pub cost_change: f64,
    pub cost_trend: Trend,
    pub annual_savings: f64,
    pub payback_period: f64,
}

impl ComparisonSummary {
    pub fn from_matrix(
        matrix: &ScenarioMatrix,
        project_life: u32,
        lifetime_definition: LifetimeDefinition,
        scenario: Scenario,
    ) -> Self {
        let results = matrix.get(lifetime_definition).get(scenario);
        let baseline = results.baseline.result();
        let proposed = results.proposed.result();

        let gwp_reduction = calculate_gwp_reduction(baseline.total_gwp, proposed.total_gwp);
        let cost_change = calculate_cost_change(baseline.total_cost, proposed.total_cost);
        let annual_savings = if project_life > 0 {
            (baseline.total_cost - proposed.total_cost) / project_life as f64
        } else {
            0.
        };

        Self {
            lifetime_definition,
            scenario,
            total_emissions: proposed.total_gwp,
            gwp_reduction,
            // a reduction in GWP is a downward trend in emissions
            gwp_trend: Trend::of_change(-gwp_reduction),
            total_cost: proposed.total_cost,
            cost_change,
            cost_trend: Trend::of_change(cost_change),
            annual_savings,
            payback_period: calculate_payback_period(
                baseline.total_cost,
                proposed.total_cost,
                annual_savings,
            ),
        }
    }

    /// The comparison shown as the dashboard headline: L90 without controls.
    pub fn headline(matrix: &ScenarioMatrix, project_life: u32) -> Self {
        Self::from_matrix(
            matrix,
            project_life,
            LifetimeDefinition::L90,
            Scenario::Without,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matrix::calculate_all_scenarios;
    use crate::presets::default_inputs;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(1000., 800., 20.)]
    #[case(800., 1000., -25.)]
    #[case(0., 800., 0.)]
    #[case(1000., 1000., 0.)]
    fn test_calculate_gwp_reduction(
        #[case] baseline: f64,
        #[case] proposed: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(calculate_gwp_reduction(baseline, proposed), expected);
    }

    #[rstest]
    #[case(1000., 1200., 20.)]
    #[case(0., 1200., 0.)]
    fn test_calculate_cost_change(
        #[case] baseline: f64,
        #[case] proposed: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(calculate_cost_change(baseline, proposed), expected);
    }

    #[rstest]
    #[case(100_000., 130_000., 10_000., 3.)]
    #[case(130_000., 100_000., 10_000., 0.)]
    #[case(100_000., 130_000., 0., 0.)]
    #[case(100_000., 130_000., -500., 0.)]
    fn test_calculate_payback_period(
        #[case] baseline_cost: f64,
        #[case] proposed_cost: f64,
        #[case] annual_savings: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(
            calculate_payback_period(baseline_cost, proposed_cost, annual_savings),
            expected
        );
    }

    #[rstest]
    fn test_timeline_has_one_point_per_project_year() {
        let inputs = default_inputs();
        let timeline = calculate_timeline_data(&inputs);

        assert_eq!(timeline.len(), 15);
        assert_eq!(timeline[0].year, 1);
        assert_eq!(timeline[14].year, 15);
        assert_eq!(timeline[0].grid_factor, 0.39);
        assert_relative_eq!(timeline[0].baseline_emissions, 29_940. * 0.39);
        assert_relative_eq!(
            timeline[0].proposed_emissions,
            9. * 473.48 * 4990. / 1000. * 0.39
        );
        for point in &timeline {
            assert_relative_eq!(
                point.savings,
                point.baseline_emissions - point.proposed_emissions
            );
        }
    }

    #[rstest]
    fn test_timeline_ignores_scenario_multipliers() {
        let mut inputs = default_inputs();
        inputs.control_coeff = 0.1;

        assert_eq!(
            calculate_timeline_data(&inputs),
            calculate_timeline_data(&default_inputs())
        );
    }

    #[rstest]
    fn test_timeline_defaults_to_three_percent_decarbonization() {
        let mut inputs = default_inputs();
        inputs.decarbonization_rate = None;
        let timeline = calculate_timeline_data(&inputs);

        assert_relative_eq!(timeline[1].grid_factor, 0.39 * 0.97, max_relative = 1e-12);
        assert_relative_eq!(
            timeline[2].grid_factor,
            0.39 * 0.97 * 0.97,
            max_relative = 1e-12
        );
    }

    #[rstest]
    #[case(Some(0.))]
    #[case(Some(f64::NAN))]
    #[case(Some(f64::INFINITY))]
    fn test_timeline_treats_zero_or_non_finite_decarbonization_as_unset(
        #[case] decarbonization_rate: Option<f64>,
    ) {
        let mut inputs = default_inputs();
        inputs.decarbonization_rate = decarbonization_rate;
        let timeline = calculate_timeline_data(&inputs);

        assert_eq!(timeline[0].grid_factor, 0.39);
        assert_relative_eq!(timeline[1].grid_factor, 0.3783, max_relative = 1e-12);
        assert!(timeline.iter().all(|point| point.grid_factor.is_finite()));
    }

    #[rstest]
    fn test_timeline_keeps_zero_decarbonization_distinct_from_evaluator() {
        let mut inputs = default_inputs();
        inputs.decarbonization_rate = Some(0.);
        let matrix = calculate_all_scenarios(&inputs);
        let timeline = calculate_timeline_data(&inputs);

        // the evaluator applies the zero rate as given: a flat grid factor
        let baseline = matrix.l70.without.baseline.result();
        assert_relative_eq!(
            baseline.operational_gwp,
            baseline.annual_energy * 0.39 * 15.,
            max_relative = 1e-12
        );
        assert!(timeline[14].grid_factor < 0.39);
    }

    #[rstest]
    fn test_timeline_is_empty_for_zero_project_life() {
        let mut inputs = default_inputs();
        inputs.project_life = 0;

        assert!(calculate_timeline_data(&inputs).is_empty());
    }

    #[rstest]
    #[case(3.5, Trend::Up)]
    #[case(-0.2, Trend::Down)]
    #[case(0., Trend::Neutral)]
    fn test_trend_of_change(#[case] percentage: f64, #[case] expected: Trend) {
        assert_eq!(Trend::of_change(percentage), expected);
    }

    #[rstest]
    fn test_headline_summary_for_default_inputs() {
        let inputs = default_inputs();
        let matrix = calculate_all_scenarios(&inputs);
        let summary = ComparisonSummary::headline(&matrix, inputs.project_life);

        let baseline = matrix.l90.without.baseline.result();
        let proposed = matrix.l90.without.proposed.result();

        assert_eq!(summary.total_emissions, proposed.total_gwp);
        assert_eq!(summary.total_cost, proposed.total_cost);
        assert!(summary.gwp_reduction > 0.);
        assert_eq!(summary.gwp_trend, Trend::Down);
        assert_relative_eq!(
            summary.annual_savings,
            (baseline.total_cost - proposed.total_cost) / 15.
        );
        assert_eq!(summary.cost_trend, Trend::of_change(summary.cost_change));
        assert!(summary.payback_period >= 0.);
    }

    #[rstest]
    fn test_summary_guards_zero_project_life() {
        let mut inputs = default_inputs();
        inputs.project_life = 0;
        let matrix = calculate_all_scenarios(&inputs);

        let summary = ComparisonSummary::from_matrix(
            &matrix,
            inputs.project_life,
            LifetimeDefinition::L70,
            Scenario::WithMaintenance,
        );

        assert_eq!(summary.annual_savings, 0.);
        assert_eq!(summary.payback_period, 0.);
    }
}
