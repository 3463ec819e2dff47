//! Ideal HVAC with per-path power limits.
//!
//! Each timestep the resolver compares the free-floating air temperature with
//! the heating and cooling setpoints. Outside the dead band it computes the
//! power that brings the air exactly back to the setpoint, spreading it over the
//! heat-transfer paths in priority order. A path that cannot deliver the
//! remaining requirement runs at its limit and the next path takes over; once
//! every path is at its limit the zone is saturated and its temperature is
//! allowed to leave the setpoint.
//!
//! The resolver holds no memory between steps: the mode of every step depends
//! only on that step's free-floating temperature, setpoints and limits.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;
use crate::sim::network::{INPUT_Q_HC_AIR, INPUT_Q_HC_IW, INPUT_Q_HC_OW};

/// Number of heat-transfer paths HVAC power can be injected into.
pub const NUM_PATHS: usize = 3;

/// Where HVAC power enters the zone.
///
/// The discriminant order matches the columns of the heater and cooler limit
/// series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatPath {
    /// Convective supply into the zone air.
    Air,
    /// Surface of the interior walls (e.g. floor or wall heating).
    InteriorWall,
    /// Inner surface of the exterior walls.
    ExteriorWall,
}

impl HeatPath {
    /// All paths in column order.
    pub const ALL: [HeatPath; NUM_PATHS] =
        [HeatPath::Air, HeatPath::InteriorWall, HeatPath::ExteriorWall];

    /// Column of this path in the limit series.
    pub fn column(self) -> usize {
        match self {
            HeatPath::Air => 0,
            HeatPath::InteriorWall => 1,
            HeatPath::ExteriorWall => 2,
        }
    }

    /// Index of this path in the network input vector.
    pub fn input_index(self) -> usize {
        match self {
            HeatPath::Air => INPUT_Q_HC_AIR,
            HeatPath::InteriorWall => INPUT_Q_HC_IW,
            HeatPath::ExteriorWall => INPUT_Q_HC_OW,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HeatPath::Air => "air",
            HeatPath::InteriorWall => "interior_wall",
            HeatPath::ExteriorWall => "exterior_wall",
        }
    }
}

impl fmt::Display for HeatPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Operating regime of the HVAC during one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    /// Air temperature within the dead band, no power applied.
    #[default]
    FreeFloating,
    /// Heating holds the heating setpoint.
    HeatingUnsaturated,
    /// Every heating path at its limit, air below the heating setpoint.
    HeatingSaturated,
    /// Cooling holds the cooling setpoint.
    CoolingUnsaturated,
    /// Every cooling path at its limit, air above the cooling setpoint.
    CoolingSaturated,
}

impl HvacMode {
    pub fn is_heating(self) -> bool {
        matches!(self, HvacMode::HeatingUnsaturated | HvacMode::HeatingSaturated)
    }

    pub fn is_cooling(self) -> bool {
        matches!(self, HvacMode::CoolingUnsaturated | HvacMode::CoolingSaturated)
    }

    pub fn is_saturated(self) -> bool {
        matches!(self, HvacMode::HeatingSaturated | HvacMode::CoolingSaturated)
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HvacMode::FreeFloating => "free-floating",
            HvacMode::HeatingUnsaturated => "heating",
            HvacMode::HeatingSaturated => "heating (saturated)",
            HvacMode::CoolingUnsaturated => "cooling",
            HvacMode::CoolingSaturated => "cooling (saturated)",
        };
        write!(f, "{}", label)
    }
}

/// Setpoints and limits that apply to one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HvacRequest {
    /// Heating setpoint (K)
    pub heating_setpoint: f64,
    /// Cooling setpoint (K)
    pub cooling_setpoint: f64,
    /// Maximum heating power per path (W, non-negative)
    pub heater_limit: [f64; NUM_PATHS],
    /// Maximum cooling power per path (W, non-positive)
    pub cooler_limit: [f64; NUM_PATHS],
}

/// Power applied during one timestep and the resulting regime.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HvacDecision {
    pub mode: HvacMode,
    /// Power per path in column order (W, positive heats)
    pub powers: [f64; NUM_PATHS],
    /// Air temperature the applied powers lead to (K)
    pub air_temperature: f64,
}

impl HvacDecision {
    fn free_floating(t_free: f64) -> Self {
        HvacDecision {
            mode: HvacMode::FreeFloating,
            powers: [0.0; NUM_PATHS],
            air_temperature: t_free,
        }
    }

    pub fn power(&self, path: HeatPath) -> f64 {
        self.powers[path.column()]
    }

    /// Total heating power (W, non-negative).
    pub fn heating(&self) -> f64 {
        self.powers.iter().filter(|p| **p > 0.0).sum()
    }

    /// Total cooling power (W, non-positive).
    pub fn cooling(&self) -> f64 {
        self.powers.iter().filter(|p| **p < 0.0).sum()
    }

    /// Net power over all paths (W).
    pub fn net(&self) -> f64 {
        self.powers.iter().sum()
    }
}

/// Priority order in which paths are engaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitResolver {
    heater_order: [HeatPath; NUM_PATHS],
    cooler_order: [HeatPath; NUM_PATHS],
}

impl Default for LimitResolver {
    fn default() -> Self {
        LimitResolver {
            heater_order: HeatPath::ALL,
            cooler_order: HeatPath::ALL,
        }
    }
}

impl LimitResolver {
    /// Creates a resolver with explicit heating and cooling priorities.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPathOrder`] unless each order lists every
    /// path exactly once.
    pub fn new(heater_order: &[HeatPath], cooler_order: &[HeatPath]) -> Result<Self, ConfigError> {
        Ok(LimitResolver {
            heater_order: permutation(heater_order)?,
            cooler_order: permutation(cooler_order)?,
        })
    }

    pub fn heater_order(&self) -> &[HeatPath; NUM_PATHS] {
        &self.heater_order
    }

    pub fn cooler_order(&self) -> &[HeatPath; NUM_PATHS] {
        &self.cooler_order
    }

    /// Decides the HVAC powers for one timestep.
    ///
    /// # Arguments
    /// * `t_free` - Air temperature at the end of the step without HVAC (K)
    /// * `sensitivity` - Change of end-of-step air temperature per watt on each
    ///   path (K/W), in column order
    /// * `request` - Setpoints and limits of the step
    pub fn resolve(
        &self,
        t_free: f64,
        sensitivity: &[f64; NUM_PATHS],
        request: &HvacRequest,
    ) -> HvacDecision {
        if t_free < request.heating_setpoint {
            self.drive_to(
                t_free,
                request.heating_setpoint,
                sensitivity,
                &self.heater_order,
                &request.heater_limit,
                (HvacMode::HeatingUnsaturated, HvacMode::HeatingSaturated),
            )
        } else if t_free > request.cooling_setpoint {
            self.drive_to(
                t_free,
                request.cooling_setpoint,
                sensitivity,
                &self.cooler_order,
                &request.cooler_limit,
                (HvacMode::CoolingUnsaturated, HvacMode::CoolingSaturated),
            )
        } else {
            HvacDecision::free_floating(t_free)
        }
    }

    fn drive_to(
        &self,
        t_free: f64,
        setpoint: f64,
        sensitivity: &[f64; NUM_PATHS],
        order: &[HeatPath; NUM_PATHS],
        limits: &[f64; NUM_PATHS],
        (unsaturated, saturated): (HvacMode, HvacMode),
    ) -> HvacDecision {
        let mut powers = [0.0; NUM_PATHS];
        let mut t_air = t_free;

        for path in order {
            let col = path.column();
            let s = sensitivity[col];
            let limit = limits[col];
            if s <= 0.0 || limit == 0.0 {
                continue;
            }

            // Same sign as the limit: positive when heating, negative when cooling.
            let required = (setpoint - t_air) / s;
            if required.abs() <= limit.abs() {
                powers[col] = required;
                return HvacDecision {
                    mode: unsaturated,
                    powers,
                    air_temperature: setpoint,
                };
            }

            powers[col] = limit;
            t_air += s * limit;
        }

        HvacDecision {
            mode: saturated,
            powers,
            air_temperature: t_air,
        }
    }
}

fn permutation(order: &[HeatPath]) -> Result<[HeatPath; NUM_PATHS], ConfigError> {
    let names = || order.iter().map(|p| p.name().to_string()).collect::<Vec<_>>();
    if order.len() != NUM_PATHS {
        return Err(ConfigError::InvalidPathOrder(names()));
    }
    let mut seen = [false; NUM_PATHS];
    for path in order {
        if std::mem::replace(&mut seen[path.column()], true) {
            return Err(ConfigError::InvalidPathOrder(names()));
        }
    }
    Ok([order[0], order[1], order[2]])
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENS: [f64; NUM_PATHS] = [1e-3, 5e-4, 2.5e-4];

    fn request(limit: f64) -> HvacRequest {
        HvacRequest {
            heating_setpoint: 293.15,
            cooling_setpoint: 299.15,
            heater_limit: [limit; NUM_PATHS],
            cooler_limit: [-limit; NUM_PATHS],
        }
    }

    #[test]
    fn test_dead_band_is_free_floating() {
        let resolver = LimitResolver::default();
        let decision = resolver.resolve(295.0, &SENS, &request(1e4));
        assert_eq!(decision.mode, HvacMode::FreeFloating);
        assert_eq!(decision.net(), 0.0);
        assert_eq!(decision.air_temperature, 295.0);
    }

    #[test]
    fn test_setpoint_boundary_is_free_floating() {
        let resolver = LimitResolver::default();
        let decision = resolver.resolve(293.15, &SENS, &request(1e4));
        assert_eq!(decision.mode, HvacMode::FreeFloating);
    }

    #[test]
    fn test_heating_unsaturated_uses_first_path() {
        let resolver = LimitResolver::default();
        let decision = resolver.resolve(292.15, &SENS, &request(1e4));

        assert_eq!(decision.mode, HvacMode::HeatingUnsaturated);
        assert!((decision.power(HeatPath::Air) - 1000.0).abs() < 1e-9);
        assert_eq!(decision.power(HeatPath::InteriorWall), 0.0);
        assert_eq!(decision.air_temperature, 293.15);
        assert_eq!(decision.cooling(), 0.0);
    }

    #[test]
    fn test_heating_spills_to_next_path() {
        let resolver = LimitResolver::default();
        let mut req = request(1e4);
        // 1 K deficit needs 1000 W on air; air can deliver 400 W.
        req.heater_limit[HeatPath::Air.column()] = 400.0;
        let decision = resolver.resolve(292.15, &SENS, &req);

        assert_eq!(decision.mode, HvacMode::HeatingUnsaturated);
        assert_eq!(decision.power(HeatPath::Air), 400.0);
        // Remaining 0.6 K at 5e-4 K/W.
        assert!((decision.power(HeatPath::InteriorWall) - 1200.0).abs() < 1e-6);
        assert_eq!(decision.power(HeatPath::ExteriorWall), 0.0);
        assert_eq!(decision.air_temperature, 293.15);
    }

    #[test]
    fn test_heating_saturated_applies_every_limit() {
        let resolver = LimitResolver::default();
        let decision = resolver.resolve(280.0, &SENS, &request(500.0));

        assert_eq!(decision.mode, HvacMode::HeatingSaturated);
        assert_eq!(decision.powers, [500.0; NUM_PATHS]);
        assert_eq!(decision.heating(), 1500.0);
        let expected = 280.0 + 500.0 * SENS.iter().sum::<f64>();
        assert!((decision.air_temperature - expected).abs() < 1e-9);
        assert!(decision.air_temperature < 293.15);
    }

    #[test]
    fn test_cooling_unsaturated() {
        let resolver = LimitResolver::default();
        let decision = resolver.resolve(300.15, &SENS, &request(1e4));

        assert_eq!(decision.mode, HvacMode::CoolingUnsaturated);
        assert!((decision.power(HeatPath::Air) + 1000.0).abs() < 1e-9);
        assert_eq!(decision.heating(), 0.0);
        assert!((decision.cooling() + 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_cooling_saturated() {
        let resolver = LimitResolver::default();
        let decision = resolver.resolve(310.0, &SENS, &request(100.0));

        assert_eq!(decision.mode, HvacMode::CoolingSaturated);
        assert_eq!(decision.powers, [-100.0; NUM_PATHS]);
        assert!(decision.air_temperature > 299.15);
    }

    #[test]
    fn test_zero_limits_saturate_without_power() {
        let resolver = LimitResolver::default();
        let decision = resolver.resolve(280.0, &SENS, &request(0.0));
        assert_eq!(decision.mode, HvacMode::HeatingSaturated);
        assert_eq!(decision.net(), 0.0);
        assert_eq!(decision.air_temperature, 280.0);
    }

    #[test]
    fn test_custom_heater_order() {
        let order = [HeatPath::InteriorWall, HeatPath::Air, HeatPath::ExteriorWall];
        let resolver = LimitResolver::new(&order, &HeatPath::ALL).unwrap();
        let decision = resolver.resolve(292.15, &SENS, &request(1e4));

        assert_eq!(decision.mode, HvacMode::HeatingUnsaturated);
        assert_eq!(decision.power(HeatPath::Air), 0.0);
        assert!((decision.power(HeatPath::InteriorWall) - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_duplicate_path() {
        let order = [HeatPath::Air, HeatPath::Air, HeatPath::ExteriorWall];
        assert!(matches!(
            LimitResolver::new(&order, &HeatPath::ALL),
            Err(ConfigError::InvalidPathOrder(_))
        ));
    }

    #[test]
    fn test_rejects_short_order() {
        assert!(LimitResolver::new(&HeatPath::ALL, &[HeatPath::Air]).is_err());
    }

    #[test]
    fn test_mode_flags() {
        assert!(HvacMode::HeatingSaturated.is_heating());
        assert!(HvacMode::HeatingSaturated.is_saturated());
        assert!(HvacMode::CoolingUnsaturated.is_cooling());
        assert!(!HvacMode::CoolingUnsaturated.is_saturated());
        assert!(!HvacMode::FreeFloating.is_heating());
    }
}
