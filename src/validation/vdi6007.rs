//! VDI 6007 part 1 test room benchmark.
//!
//! Test case 1 drives the light-weight test room S with a constant 22 °C
//! equivalent outdoor temperature, no sun and 1000 W of radiative internal gains
//! from 06:00 to 18:00 every day. The HVAC is switched off. The room runs for 60
//! days at one-minute resolution and the hourly mean air temperatures of days 1,
//! 10 and 60 are compared with the reference results of the guideline.
//!
//! Reference tables hold the three days as consecutive 24-row blocks.

use crate::error::{ConfigError, ReferenceError, SimResult, ValidationError};
use crate::sim::boundary::{BoundaryConditions, UNLIMITED_POWER};
use crate::sim::engine::{SimulationConfig, Simulator};
use crate::sim::schedule::{DailyProfile, SetpointProfile, HOURS_PER_DAY};
use crate::sim::zone::{ZoneParameters, DEFAULT_DENSITY_AIR, DEFAULT_HEAT_CAPAC_AIR};
use crate::validation::reference::ReferenceTable;
use crate::validation::report::{DayComparison, ValidationReport};
use crate::validation::{hourly_means, kelvin_to_celsius, max_abs_deviation};

pub const CASE01_ID: &str = "VDI 6007 Test Case 1";
/// Simulation steps per hour.
pub const TIMES_PER_HOUR: usize = 60;
/// Simulated days.
pub const DAYS: usize = 60;
/// Days whose hourly means are compared, starting at 1.
pub const COMPARED_DAYS: [usize; 3] = [1, 10, 60];
/// Accepted hourly deviation from the reference (K).
pub const DEFAULT_TOLERANCE: f64 = 0.1;
/// Equivalent outdoor and initial temperature (K).
pub const CASE01_TEMPERATURE: f64 = 295.15;
/// Internal gains while occupied (W).
pub const CASE01_GAINS: f64 = 1000.0;

/// Outdoor surface conductance in front of the exterior wall (W/K).
pub const OUTER_CONDUCTANCE_WALL: f64 = 28.0;
/// Outdoor surface conductance in front of the window (W/K).
pub const OUTER_CONDUCTANCE_WIN: f64 = 28.0;

/// Conduction resistance of the exterior wall behind its capacity (K/W).
const R_REST_OW: f64 = 0.1265217391;
/// Conduction resistance of the window (K/W).
const R_WIN: f64 = 0.01642857143;

/// Test room S of VDI 6007 part 1 as a two-element zone.
///
/// The wall and window resistances are conduction only. Both facade branches
/// get their outdoor surface conductance in series, since the equivalent
/// outdoor temperature is applied in front of the outer surfaces.
pub fn room_s() -> ZoneParameters {
    ZoneParameters {
        volume: 52.5,
        density_air: DEFAULT_DENSITY_AIR,
        heat_capac_air: DEFAULT_HEAT_CAPAC_AIR,
        area_ow: 10.5,
        r1_ow: 0.00331421908725,
        c1_ow: 5_259_932.23,
        r_rest_ow: R_REST_OW + 1.0 / OUTER_CONDUCTANCE_WALL,
        alpha_conv_inner_ow: 2.7,
        area_iw: 60.5,
        r1_iw: 0.000668895639141,
        c1_iw: 12_391_363.86,
        alpha_conv_inner_iw: 2.12,
        window_areas: vec![7.0],
        solar_transmittance: vec![1.0],
        r1_win: R_WIN + 1.0 / OUTER_CONDUCTANCE_WIN,
        alpha_conv_inner_win: 2.7,
        ratio_conv_rad_inner_win: 0.09,
        alpha_rad_inner_mean: 5.0,
        ratio_conv_internal_gains: 0.0,
    }
}

/// One-minute steps starting from the outdoor temperature.
pub fn case01_config() -> SimulationConfig {
    SimulationConfig::default()
        .with_timestep(3600.0 / TIMES_PER_HOUR as f64)
        .with_initial_temperature(CASE01_TEMPERATURE)
}

/// Boundary conditions of test case 1 over the full 60 days.
pub fn case01_boundary() -> BoundaryConditions {
    let timesteps = TIMES_PER_HOUR * HOURS_PER_DAY * DAYS;
    let gains = DailyProfile::new("internal gains").with_range(6, 18, CASE01_GAINS);
    let (heating, cooling) = SetpointProfile::free_floating().expand(TIMES_PER_HOUR, DAYS);

    BoundaryConditions::free_floating(timesteps, 1, CASE01_TEMPERATURE)
        .with_internal_gains(gains.expand(TIMES_PER_HOUR, DAYS))
        .with_setpoints(heating, cooling)
        .with_uniform_limits(UNLIMITED_POWER, -UNLIMITED_POWER)
}

/// Runs test case 1 and returns the hourly mean air temperatures (°C).
pub fn run_case01() -> SimResult<Vec<f64>> {
    let config = case01_config();
    let steps_per_hour = config
        .steps_per_hour()
        .ok_or_else(|| ConfigError::InvalidParameter {
            name: "timestep_s",
            reason: "must divide one hour".to_string(),
        })?;
    let output = Simulator::new(room_s(), config)?.simulate(&case01_boundary())?;
    let celsius: Vec<f64> = output
        .air_temperature
        .iter()
        .copied()
        .map(kelvin_to_celsius)
        .collect();
    Ok(hourly_means(&celsius, steps_per_hour))
}

/// The 24 hourly means of `day` (starting at 1), if the series covers it.
pub fn day_means(hourly: &[f64], day: usize) -> Option<&[f64]> {
    let start = day.checked_sub(1)? * HOURS_PER_DAY;
    hourly.get(start..start + HOURS_PER_DAY)
}

/// Builds the report of the compared days.
///
/// Without a reference table only the simulated means are reported. With one,
/// day block `i` of column 0 is compared with `COMPARED_DAYS[i]`.
pub fn compare(
    hourly: &[f64],
    reference: Option<&ReferenceTable>,
    tolerance: f64,
) -> Result<ValidationReport, ReferenceError> {
    let mut report = ValidationReport::new(CASE01_ID, tolerance);
    for (block, day) in COMPARED_DAYS.into_iter().enumerate() {
        let simulated = day_means(hourly, day)
            .ok_or(ReferenceError::LengthMismatch {
                simulated: hourly.len(),
                reference: day * HOURS_PER_DAY,
            })?
            .to_vec();

        let comparison = match reference {
            Some(table) => {
                let expected = table.day_block(block, 0)?;
                let deviation = max_abs_deviation(&simulated, &expected)?;
                log::debug!("Day {}: max deviation {:.4} K", day, deviation);
                DayComparison::compared(day, simulated, expected, deviation, tolerance)
            }
            None => DayComparison::simulated_only(day, simulated),
        };
        report.add_day(comparison);
    }
    Ok(report)
}

/// Runs test case 1 and compares it with an optional reference table.
pub fn validate_case01(
    reference: Option<&ReferenceTable>,
    tolerance: f64,
) -> Result<ValidationReport, ValidationError> {
    let hourly = run_case01()?;
    Ok(compare(&hourly, reference, tolerance)?)
}
