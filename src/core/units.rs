pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const LUMENS_PER_KILOLUMEN: u32 = 1_000;
pub(crate) const PERCENT: f64 = 100.;

/// Energy in kWh drawn by a load of `watts` running for `hours`.
pub(crate) fn watt_hours_to_kilowatt_hours(watts: f64, hours: f64) -> f64 {
    watts * hours / WATTS_PER_KILOWATT as f64
}

/// Percentage change from `reference` to `value`, where a `reference` at or below zero gives 0
/// rather than a division error.
pub(crate) fn percentage_change(reference: f64, value: f64) -> f64 {
    if reference > 0. {
        (value - reference) / reference * PERCENT
    } else {
        0.
    }
}
