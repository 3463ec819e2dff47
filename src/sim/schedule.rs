//! Hourly daily profiles for gains, setpoints and limits.
//!
//! A [`DailyProfile`] holds 24 hourly values and repeats every day. It is expanded
//! into a per-timestep series with [`DailyProfile::expand`], which is how the
//! boundary series of the benchmark scenarios are built.

use serde::{Deserialize, Serialize};

use crate::sim::boundary::{DISABLED_COOLING_SETPOINT, DISABLED_HEATING_SETPOINT};

/// Hours in one profile day.
pub const HOURS_PER_DAY: usize = 24;

/// A repeating 24-hour profile with hourly resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProfile {
    pub name: String,
    pub values: [f64; HOURS_PER_DAY],
}

impl DailyProfile {
    /// Creates a profile with every hour at zero.
    pub fn new(name: impl Into<String>) -> Self {
        DailyProfile {
            name: name.into(),
            values: [0.0; HOURS_PER_DAY],
        }
    }

    /// Creates a profile with the same value for every hour.
    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        DailyProfile {
            name: name.into(),
            values: [value; HOURS_PER_DAY],
        }
    }

    /// Sets the value for a specific hour. Hours past 23 are ignored.
    pub fn set_hour(&mut self, hour: usize, value: f64) {
        if hour < HOURS_PER_DAY {
            self.values[hour] = value;
        }
    }

    /// Fills the hours `[start_hour, end_hour)` with `value`.
    ///
    /// Wraps around midnight if `start_hour > end_hour`. Nothing is filled when
    /// both are equal.
    pub fn fill_range(&mut self, start_hour: usize, end_hour: usize, value: f64) {
        if start_hour == end_hour {
            return;
        }
        if start_hour < end_hour {
            for hour in start_hour..end_hour {
                self.set_hour(hour, value);
            }
        } else {
            for hour in (start_hour..HOURS_PER_DAY).chain(0..end_hour) {
                self.set_hour(hour, value);
            }
        }
    }

    /// Builder form of [`Self::fill_range`].
    pub fn with_range(mut self, start_hour: usize, end_hour: usize, value: f64) -> Self {
        self.fill_range(start_hour, end_hour, value);
        self
    }

    /// Value at a given hour of the day, wrapping past midnight.
    pub fn value(&self, hour: usize) -> f64 {
        self.values[hour % HOURS_PER_DAY]
    }

    /// Per-timestep series covering `days` days at `times_per_hour` steps per hour.
    ///
    /// Every step inside an hour takes that hour's value.
    pub fn expand(&self, times_per_hour: usize, days: usize) -> Vec<f64> {
        let steps_per_day = times_per_hour * HOURS_PER_DAY;
        (0..steps_per_day * days)
            .map(|step| self.value((step % steps_per_day) / times_per_hour))
            .collect()
    }
}

/// Heating and cooling setpoint profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetpointProfile {
    pub heating: DailyProfile,
    pub cooling: DailyProfile,
}

impl SetpointProfile {
    /// Setpoints that never engage the HVAC.
    pub fn free_floating() -> Self {
        Self::constant(DISABLED_HEATING_SETPOINT, DISABLED_COOLING_SETPOINT)
    }

    pub fn constant(heating: f64, cooling: f64) -> Self {
        SetpointProfile {
            heating: DailyProfile::constant("heating", heating),
            cooling: DailyProfile::constant("cooling", cooling),
        }
    }

    /// Constant setpoints with a lowered heating setpoint at night.
    pub fn setback(
        day_heating: f64,
        night_heating: f64,
        cooling: f64,
        night_start: usize,
        night_end: usize,
    ) -> Self {
        SetpointProfile {
            heating: DailyProfile::constant("heating", day_heating).with_range(
                night_start,
                night_end,
                night_heating,
            ),
            cooling: DailyProfile::constant("cooling", cooling),
        }
    }

    /// Expands both profiles; returns `(heating, cooling)`.
    pub fn expand(&self, times_per_hour: usize, days: usize) -> (Vec<f64>, Vec<f64>) {
        (
            self.heating.expand(times_per_hour, days),
            self.cooling.expand(times_per_hour, days),
        )
    }
}
