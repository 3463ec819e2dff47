//! Lumped RC parameters of a single thermal zone.
//!
//! The zone follows the two-element network of VDI 6007 part 1: exterior walls
//! (including the window frame conductance lumped into the rest resistance),
//! interior walls acting as internal mass, windows without thermal storage, and a
//! well-mixed air node. The archetype layer that derives these numbers from wall
//! layers and year-band lookups lives outside this crate; it hands over a plain
//! [`ZoneParameters`] record, usually as JSON.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default air density (kg/m³).
pub const DEFAULT_DENSITY_AIR: f64 = 1.25;
/// Default specific heat capacity of air (J/kgK).
pub const DEFAULT_HEAT_CAPAC_AIR: f64 = 1002.0;

fn default_density_air() -> f64 {
    DEFAULT_DENSITY_AIR
}

fn default_heat_capac_air() -> f64 {
    DEFAULT_HEAT_CAPAC_AIR
}

/// Resistances (K/W), capacities (J/K), areas (m²) and heat transfer
/// coefficients (W/m²K) of one zone.
///
/// Immutable once handed to a simulator; every run borrows it read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneParameters {
    /// Air volume of the zone (m³)
    pub volume: f64,
    #[serde(default = "default_density_air")]
    pub density_air: f64,
    #[serde(default = "default_heat_capac_air")]
    pub heat_capac_air: f64,

    /// Inner surface area of exterior walls (m²)
    pub area_ow: f64,
    /// Resistance between exterior wall mass and its inner surface (K/W)
    pub r1_ow: f64,
    /// Heat capacity of the exterior wall mass (J/K)
    pub c1_ow: f64,
    /// Resistance between exterior wall mass and the equivalent outdoor node (K/W)
    pub r_rest_ow: f64,
    /// Inner convective coefficient of exterior walls (W/m²K)
    pub alpha_conv_inner_ow: f64,

    /// Surface area of interior walls (m²)
    pub area_iw: f64,
    /// Resistance between interior wall mass and its surface (K/W)
    pub r1_iw: f64,
    /// Heat capacity of the interior wall mass (J/K)
    pub c1_iw: f64,
    /// Inner convective coefficient of interior walls (W/m²K)
    pub alpha_conv_inner_iw: f64,

    /// Window area per facade orientation (m²)
    pub window_areas: Vec<f64>,
    /// Total solar energy transmittance (g-value) per facade orientation
    pub solar_transmittance: Vec<f64>,
    /// Resistance between the equivalent outdoor node and the window surface (K/W)
    pub r1_win: f64,
    /// Inner convective coefficient of windows (W/m²K)
    pub alpha_conv_inner_win: f64,
    /// Share of transmitted solar radiation released convectively to the air
    pub ratio_conv_rad_inner_win: f64,

    /// Radiative exchange coefficient between inner surfaces (W/m²K)
    pub alpha_rad_inner_mean: f64,

    /// Share of internal gains released convectively to the air
    pub ratio_conv_internal_gains: f64,
}

impl ZoneParameters {
    /// Number of facade orientations that receive solar radiation.
    pub fn num_orientations(&self) -> usize {
        self.window_areas.len()
    }

    /// Total window area over all orientations (m²).
    pub fn total_window_area(&self) -> f64 {
        self.window_areas.iter().sum()
    }

    /// Heat capacity of the zone air (J/K).
    pub fn air_capacity(&self) -> f64 {
        self.volume * self.density_air * self.heat_capac_air
    }

    /// Checks every parameter for finiteness and sign.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("volume", self.volume),
            ("density_air", self.density_air),
            ("heat_capac_air", self.heat_capac_air),
            ("area_ow", self.area_ow),
            ("r1_ow", self.r1_ow),
            ("c1_ow", self.c1_ow),
            ("r_rest_ow", self.r_rest_ow),
            ("r1_iw", self.r1_iw),
            ("c1_iw", self.c1_iw),
            ("r1_win", self.r1_win),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(name, format!("must be finite and positive, got {value}")));
            }
        }

        let non_negative = [
            ("area_iw", self.area_iw),
            ("alpha_conv_inner_ow", self.alpha_conv_inner_ow),
            ("alpha_conv_inner_iw", self.alpha_conv_inner_iw),
            ("alpha_conv_inner_win", self.alpha_conv_inner_win),
            ("alpha_rad_inner_mean", self.alpha_rad_inner_mean),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(name, format!("must be finite and non-negative, got {value}")));
            }
        }

        let shares = [
            ("ratio_conv_rad_inner_win", self.ratio_conv_rad_inner_win),
            ("ratio_conv_internal_gains", self.ratio_conv_internal_gains),
        ];
        for (name, value) in shares {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(name, format!("must lie in [0, 1], got {value}")));
            }
        }

        if self.window_areas.len() != self.solar_transmittance.len() {
            return Err(invalid(
                "solar_transmittance",
                format!(
                    "has {} orientations but window_areas has {}",
                    self.solar_transmittance.len(),
                    self.window_areas.len()
                ),
            ));
        }
        if let Some(area) = self
            .window_areas
            .iter()
            .find(|a| !a.is_finite() || **a < 0.0)
        {
            return Err(invalid(
                "window_areas",
                format!("must be finite and non-negative, got {area}"),
            ));
        }
        if let Some(g) = self
            .solar_transmittance
            .iter()
            .find(|g| !(0.0..=1.0).contains(*g))
        {
            return Err(invalid("solar_transmittance", format!("must lie in [0, 1], got {g}")));
        }

        // The exterior wall surface needs at least one path other than its own mass.
        if self.alpha_conv_inner_ow == 0.0 && self.alpha_rad_inner_mean == 0.0 {
            return Err(invalid(
                "alpha_conv_inner_ow",
                "exterior wall surface is decoupled from the zone".to_string(),
            ));
        }

        Ok(())
    }
}

fn invalid(name: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidParameter { name, reason }
}

/// Conductances (W/K) of every branch of the zone network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conductances {
    pub rest_ow: f64,
    pub ow: f64,
    pub conv_ow: f64,
    pub iw: f64,
    pub conv_iw: f64,
    pub win: f64,
    pub conv_win: f64,
    pub rad_ow_iw: f64,
    pub rad_win_ow: f64,
    pub rad_win_iw: f64,
}

impl Conductances {
    /// Derives branch conductances from zone parameters.
    ///
    /// Radiative exchange between two surfaces uses the smaller of the two areas.
    /// A zone without windows gets zero window conductances.
    pub fn from_zone(zone: &ZoneParameters) -> Self {
        let a_win = zone.total_window_area();
        let has_windows = a_win > 0.0;
        let h_rad = zone.alpha_rad_inner_mean;

        Conductances {
            rest_ow: 1.0 / zone.r_rest_ow,
            ow: 1.0 / zone.r1_ow,
            conv_ow: zone.alpha_conv_inner_ow * zone.area_ow,
            iw: 1.0 / zone.r1_iw,
            conv_iw: zone.alpha_conv_inner_iw * zone.area_iw,
            win: if has_windows { 1.0 / zone.r1_win } else { 0.0 },
            conv_win: zone.alpha_conv_inner_win * a_win,
            rad_ow_iw: h_rad * zone.area_ow.min(zone.area_iw),
            rad_win_ow: h_rad * a_win.min(zone.area_ow),
            rad_win_iw: h_rad * a_win.min(zone.area_iw),
        }
    }

    /// Steady-state conductance between the equivalent outdoor node and the air (W/K).
    ///
    /// Useful as a sanity check: a constant gain `Q` raises the steady air
    /// temperature by roughly `Q / ua_total()` when released convectively.
    pub fn ua_total(&self) -> f64 {
        let wall = series(&[self.rest_ow, self.ow, self.conv_ow]);
        let window = series(&[self.win, self.conv_win]);
        wall + window
    }
}

fn series(conductances: &[f64]) -> f64 {
    if conductances.iter().any(|g| *g <= 0.0) {
        return 0.0;
    }
    1.0 / conductances.iter().map(|g| 1.0 / g).sum::<f64>()
}
