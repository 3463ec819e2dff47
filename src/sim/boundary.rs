//! Boundary condition series driving a zone simulation.
//!
//! All series are indexed by timestep and must cover the same horizon. Series
//! with several values per timestep (solar radiation per orientation, HVAC
//! limits per heat-transfer path) are stored as `timesteps × columns` arrays.
//!
//! # Example
//!
//! ```rust
//! use fluxion_rc::sim::boundary::BoundaryConditions;
//!
//! // One day at hourly resolution, one facade orientation, 22 °C outside.
//! let bc = BoundaryConditions::free_floating(24, 1, 295.15)
//!     .with_internal_gains(vec![500.0; 24]);
//! assert_eq!(bc.horizon(), 24);
//! assert!(bc.validate(1).is_ok());
//! ```

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::hvac::{HvacRequest, NUM_PATHS};

/// Heating setpoint that never triggers heating (K).
pub const DISABLED_HEATING_SETPOINT: f64 = 0.0;
/// Cooling setpoint that never triggers cooling (K).
pub const DISABLED_COOLING_SETPOINT: f64 = 600.0;
/// Power limit treated as unlimited (W).
pub const UNLIMITED_POWER: f64 = 1e10;

/// Aligned boundary condition series for one simulation horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConditions {
    /// Equivalent outdoor air temperature (K)
    pub equal_air_temp: Vec<f64>,
    /// Solar radiation per facade orientation (W/m²), `timesteps × orientations`
    pub solar_rad_in: Array2<f64>,
    /// Internal heat gains (W)
    pub internal_gains: Vec<f64>,
    /// Heating setpoint (K)
    pub t_set_heating: Vec<f64>,
    /// Cooling setpoint (K)
    pub t_set_cooling: Vec<f64>,
    /// Heater power limit per path (W, non-negative), `timesteps × 3`
    pub heater_limit: Array2<f64>,
    /// Cooler power limit per path (W, non-positive), `timesteps × 3`
    pub cooler_limit: Array2<f64>,
}

/// Values of every series at one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryStep {
    pub equal_air_temp: f64,
    pub internal_gains: f64,
    pub hvac: HvacRequest,
}

impl BoundaryConditions {
    /// Constant outdoor temperature, no sun, no gains and HVAC switched off.
    pub fn free_floating(timesteps: usize, num_orientations: usize, equal_air_temp: f64) -> Self {
        BoundaryConditions {
            equal_air_temp: vec![equal_air_temp; timesteps],
            solar_rad_in: Array2::zeros((timesteps, num_orientations)),
            internal_gains: vec![0.0; timesteps],
            t_set_heating: vec![DISABLED_HEATING_SETPOINT; timesteps],
            t_set_cooling: vec![DISABLED_COOLING_SETPOINT; timesteps],
            heater_limit: Array2::zeros((timesteps, NUM_PATHS)),
            cooler_limit: Array2::zeros((timesteps, NUM_PATHS)),
        }
    }

    pub fn with_equal_air_temp(mut self, equal_air_temp: Vec<f64>) -> Self {
        self.equal_air_temp = equal_air_temp;
        self
    }

    pub fn with_solar_radiation(mut self, solar_rad_in: Array2<f64>) -> Self {
        self.solar_rad_in = solar_rad_in;
        self
    }

    pub fn with_internal_gains(mut self, internal_gains: Vec<f64>) -> Self {
        self.internal_gains = internal_gains;
        self
    }

    /// Sets both setpoint series.
    pub fn with_setpoints(mut self, heating: Vec<f64>, cooling: Vec<f64>) -> Self {
        self.t_set_heating = heating;
        self.t_set_cooling = cooling;
        self
    }

    /// Same heater and cooler limit on every path and timestep.
    ///
    /// `heater` is expected non-negative and `cooler` non-positive.
    pub fn with_uniform_limits(mut self, heater: f64, cooler: f64) -> Self {
        let timesteps = self.horizon();
        self.heater_limit = Array2::from_elem((timesteps, NUM_PATHS), heater);
        self.cooler_limit = Array2::from_elem((timesteps, NUM_PATHS), cooler);
        self
    }

    pub fn with_limits(mut self, heater_limit: Array2<f64>, cooler_limit: Array2<f64>) -> Self {
        self.heater_limit = heater_limit;
        self.cooler_limit = cooler_limit;
        self
    }

    /// Number of timesteps, taken from the equivalent outdoor temperature series.
    pub fn horizon(&self) -> usize {
        self.equal_air_temp.len()
    }

    /// Checks lengths, finiteness, physical bounds and setpoint/limit consistency.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, naming the series and timestep.
    pub fn validate(&self, num_orientations: usize) -> Result<(), ConfigError> {
        let horizon = self.horizon();
        if horizon == 0 {
            return Err(ConfigError::EmptyHorizon);
        }

        let scalar_series: [(&'static str, &[f64]); 4] = [
            ("equal_air_temp", &self.equal_air_temp),
            ("internal_gains", &self.internal_gains),
            ("t_set_heating", &self.t_set_heating),
            ("t_set_cooling", &self.t_set_cooling),
        ];
        for (series, values) in scalar_series {
            check_length(series, horizon, values.len())?;
        }

        let table_series = [
            ("solar_rad_in", &self.solar_rad_in, num_orientations),
            ("heater_limit", &self.heater_limit, NUM_PATHS),
            ("cooler_limit", &self.cooler_limit, NUM_PATHS),
        ];
        for (series, table, columns) in table_series {
            check_length(series, horizon, table.nrows())?;
            if table.ncols() != columns {
                return Err(ConfigError::ColumnMismatch {
                    series,
                    expected: columns,
                    actual: table.ncols(),
                });
            }
        }

        for (series, values) in scalar_series {
            check_finite(series, values.iter().copied().enumerate())?;
        }
        for (series, table, _) in table_series {
            check_finite(
                series,
                table.indexed_iter().map(|((index, _), v)| (index, *v)),
            )?;
        }

        for (series, values) in [
            ("equal_air_temp", &self.equal_air_temp),
            ("t_set_heating", &self.t_set_heating),
            ("t_set_cooling", &self.t_set_cooling),
        ] {
            if let Some((index, value)) = values.iter().copied().enumerate().find(|(_, v)| *v < 0.0) {
                return Err(ConfigError::NegativeTemperature {
                    series,
                    index,
                    value,
                });
            }
        }

        for ((index, orientation), value) in self.solar_rad_in.indexed_iter() {
            if *value < 0.0 {
                return Err(ConfigError::NegativeRadiation {
                    index,
                    orientation,
                    value: *value,
                });
            }
        }

        for (index, (heating, cooling)) in self
            .t_set_heating
            .iter()
            .zip(&self.t_set_cooling)
            .enumerate()
        {
            if cooling < heating {
                return Err(ConfigError::CrossedSetpoints {
                    index,
                    heating: *heating,
                    cooling: *cooling,
                });
            }
        }

        for ((index, path), value) in self.heater_limit.indexed_iter() {
            if *value < 0.0 {
                return Err(ConfigError::NegativeHeaterLimit {
                    index,
                    path,
                    value: *value,
                });
            }
        }
        for ((index, path), value) in self.cooler_limit.indexed_iter() {
            if *value > 0.0 {
                return Err(ConfigError::PositiveCoolerLimit {
                    index,
                    path,
                    value: *value,
                });
            }
        }

        Ok(())
    }

    /// Scalar inputs and HVAC request of timestep `t`.
    ///
    /// Panics if `t` is outside the horizon; call [`Self::validate`] first.
    pub fn step(&self, t: usize) -> BoundaryStep {
        let limits = |table: &Array2<f64>| {
            let mut out = [0.0; NUM_PATHS];
            for (dst, src) in out.iter_mut().zip(table.row(t)) {
                *dst = *src;
            }
            out
        };
        BoundaryStep {
            equal_air_temp: self.equal_air_temp[t],
            internal_gains: self.internal_gains[t],
            hvac: HvacRequest {
                heating_setpoint: self.t_set_heating[t],
                cooling_setpoint: self.t_set_cooling[t],
                heater_limit: limits(&self.heater_limit),
                cooler_limit: limits(&self.cooler_limit),
            },
        }
    }
}

fn check_length(series: &'static str, expected: usize, actual: usize) -> Result<(), ConfigError> {
    if expected != actual {
        return Err(ConfigError::LengthMismatch {
            series,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_finite<I>(series: &'static str, values: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (usize, f64)>,
{
    for (index, value) in values {
        if !value.is_finite() {
            return Err(ConfigError::NonFinite {
                series,
                index,
                value,
            });
        }
    }
    Ok(())
}
