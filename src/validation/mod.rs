//! Comparison of simulated air temperatures against reference traces.
//!
//! The helpers here turn a per-step series into hourly means, convert units and
//! measure the worst deviation. [`vdi6007`] wires them into the VDI 6007 test
//! room benchmark and [`report`] renders the outcome.

pub mod reference;
pub mod report;
pub mod vdi6007;

use crate::error::ReferenceError;

pub use reference::ReferenceTable;
pub use report::{DayComparison, ValidationReport, ValidationStatus};

/// Offset between the Kelvin and Celsius scales.
pub const KELVIN_OFFSET: f64 = 273.15;

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Mean of every full block of `steps_per_hour` values.
///
/// A trailing partial hour is dropped.
pub fn hourly_means(series: &[f64], steps_per_hour: usize) -> Vec<f64> {
    if steps_per_hour == 0 {
        return Vec::new();
    }
    series
        .chunks_exact(steps_per_hour)
        .map(|hour| hour.iter().sum::<f64>() / steps_per_hour as f64)
        .collect()
}

/// Largest absolute difference between two equally long series.
///
/// # Errors
///
/// [`ReferenceError::LengthMismatch`] if the lengths differ and
/// [`ReferenceError::Empty`] if both are empty.
pub fn max_abs_deviation(simulated: &[f64], reference: &[f64]) -> Result<f64, ReferenceError> {
    if simulated.len() != reference.len() {
        return Err(ReferenceError::LengthMismatch {
            simulated: simulated.len(),
            reference: reference.len(),
        });
    }
    if simulated.is_empty() {
        return Err(ReferenceError::Empty);
    }
    Ok(simulated
        .iter()
        .zip(reference)
        .map(|(s, r)| (s - r).abs())
        .fold(0.0, f64::max))
}
