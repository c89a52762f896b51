#![no_main]

use libfuzzer_sys::fuzz_target;
use luminaire_lca::core::matrix::calculate_all_scenarios;
use luminaire_lca::input::CalculationInputs;

fuzz_target!(|input: CalculationInputs| {
    if input.validate().is_err() {
        return;
    }
    let matrix = calculate_all_scenarios(&input);
    assert_eq!(matrix.cells().count(), 12);
});
