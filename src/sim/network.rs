//! RC network of one zone and its reduction to a state-space model.
//!
//! Dynamic nodes carry heat capacity: exterior wall mass, interior wall mass and
//! zone air. The inner surfaces of exterior walls, interior walls and windows
//! are massless, so their temperatures follow algebraically from the dynamic
//! nodes and the inputs (`s = M·x + N·u`). Substituting them into the energy
//! balances of the dynamic nodes yields `dx/dt = A·x + B·u`.
//!
//! Heat flows in the network:
//!
//! ```text
//!  T_eq ──R_rest── T_ow ──R1_ow── T_owi ─┐
//!                                         ├─ conv ── T_air
//!         T_iw ──R1_iw── T_iwi ───────────┤
//!                                         │
//!  T_eq ──R1_win── T_wini ────────────────┘
//! ```
//!
//! plus pairwise radiative exchange between the three surface nodes.

use nalgebra::{DMatrix, DVector};

use crate::error::SimulationError;
use crate::physics::StateSpace;
use crate::sim::zone::{Conductances, ZoneParameters};

/// Number of dynamic nodes.
pub const NUM_STATES: usize = 3;
/// Number of network inputs.
pub const NUM_INPUTS: usize = 6;
/// Number of massless surface nodes.
pub const NUM_SURFACES: usize = 3;

/// State index: exterior wall mass.
pub const STATE_OW: usize = 0;
/// State index: interior wall mass.
pub const STATE_IW: usize = 1;
/// State index: zone air.
pub const STATE_AIR: usize = 2;

/// Input index: equivalent outdoor temperature (K).
pub const INPUT_T_EQ: usize = 0;
/// Input index: internal gains (W).
pub const INPUT_Q_IG: usize = 1;
/// Input index: solar radiation transmitted through windows (W).
pub const INPUT_Q_SOL: usize = 2;
/// Input index: HVAC power into the air (W).
pub const INPUT_Q_HC_AIR: usize = 3;
/// Input index: HVAC power into the interior wall surface (W).
pub const INPUT_Q_HC_IW: usize = 4;
/// Input index: HVAC power into the exterior wall surface (W).
pub const INPUT_Q_HC_OW: usize = 5;

const SURF_OW: usize = 0;
const SURF_IW: usize = 1;
const SURF_WIN: usize = 2;

/// Names of the dynamic nodes, indexed like the state vector.
pub const STATE_NAMES: [&str; NUM_STATES] = ["exterior_wall", "interior_wall", "air"];

/// Zone network reduced to state-space form.
#[derive(Debug, Clone)]
pub struct ZoneNetwork {
    conductances: Conductances,
    surface_from_state: DMatrix<f64>,
    surface_from_input: DMatrix<f64>,
    state_space: StateSpace,
    solar_apertures: Vec<f64>,
}

impl ZoneNetwork {
    /// Builds the network of a validated zone.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] for invalid parameters and
    /// [`SimulationError::SingularNetwork`] if the surface balances cannot be solved.
    pub fn build(zone: &ZoneParameters) -> Result<Self, SimulationError> {
        zone.validate()?;

        let g = Conductances::from_zone(zone);

        let a_win = zone.total_window_area();
        let a_rad_ig = zone.area_ow + zone.area_iw + a_win;
        let a_rad_sol = zone.area_ow + zone.area_iw;

        // Radiative internal gains go to every inner surface by area, transmitted
        // solar radiation only to the opaque ones.
        let rad_ig = 1.0 - zone.ratio_conv_internal_gains;
        let rad_sol = 1.0 - zone.ratio_conv_rad_inner_win;
        let ig_share = |area: f64| rad_ig * area / a_rad_ig;
        let sol_share = |area: f64| rad_sol * area / a_rad_sol;

        // Surface balances: G_s·s = G_x·x + G_u·u
        let mut g_s = DMatrix::<f64>::zeros(NUM_SURFACES, NUM_SURFACES);
        let mut g_x = DMatrix::<f64>::zeros(NUM_SURFACES, NUM_STATES);
        let mut g_u = DMatrix::<f64>::zeros(NUM_SURFACES, NUM_INPUTS);

        g_s[(SURF_OW, SURF_OW)] = g.ow + g.conv_ow + g.rad_ow_iw + g.rad_win_ow;
        g_s[(SURF_OW, SURF_IW)] = -g.rad_ow_iw;
        g_s[(SURF_OW, SURF_WIN)] = -g.rad_win_ow;
        g_x[(SURF_OW, STATE_OW)] = g.ow;
        g_x[(SURF_OW, STATE_AIR)] = g.conv_ow;
        g_u[(SURF_OW, INPUT_Q_IG)] = ig_share(zone.area_ow);
        g_u[(SURF_OW, INPUT_Q_SOL)] = sol_share(zone.area_ow);
        g_u[(SURF_OW, INPUT_Q_HC_OW)] = 1.0;

        g_s[(SURF_IW, SURF_IW)] = g.iw + g.conv_iw + g.rad_ow_iw + g.rad_win_iw;
        g_s[(SURF_IW, SURF_OW)] = -g.rad_ow_iw;
        g_s[(SURF_IW, SURF_WIN)] = -g.rad_win_iw;
        g_x[(SURF_IW, STATE_IW)] = g.iw;
        g_x[(SURF_IW, STATE_AIR)] = g.conv_iw;
        g_u[(SURF_IW, INPUT_Q_IG)] = ig_share(zone.area_iw);
        g_u[(SURF_IW, INPUT_Q_SOL)] = sol_share(zone.area_iw);
        g_u[(SURF_IW, INPUT_Q_HC_IW)] = 1.0;

        let win_total = g.win + g.conv_win + g.rad_win_ow + g.rad_win_iw;
        if win_total > 0.0 {
            g_s[(SURF_WIN, SURF_WIN)] = win_total;
            g_s[(SURF_WIN, SURF_OW)] = -g.rad_win_ow;
            g_s[(SURF_WIN, SURF_IW)] = -g.rad_win_iw;
            g_x[(SURF_WIN, STATE_AIR)] = g.conv_win;
            g_u[(SURF_WIN, INPUT_T_EQ)] = g.win;
            g_u[(SURF_WIN, INPUT_Q_IG)] = ig_share(a_win);
        } else {
            // No glazing: report the window node at air temperature.
            g_s[(SURF_WIN, SURF_WIN)] = 1.0;
            g_x[(SURF_WIN, STATE_AIR)] = 1.0;
        }

        let lu = g_s.lu();
        let surface_from_state = lu.solve(&g_x).ok_or_else(|| {
            SimulationError::SingularNetwork("surface node balances are singular".to_string())
        })?;
        let surface_from_input = lu.solve(&g_u).ok_or_else(|| {
            SimulationError::SingularNetwork("surface node balances are singular".to_string())
        })?;

        // Dynamic balances: C·dx/dt = K_x·x + K_s·s + K_u·u
        let mut k_x = DMatrix::<f64>::zeros(NUM_STATES, NUM_STATES);
        let mut k_s = DMatrix::<f64>::zeros(NUM_STATES, NUM_SURFACES);
        let mut k_u = DMatrix::<f64>::zeros(NUM_STATES, NUM_INPUTS);

        k_x[(STATE_OW, STATE_OW)] = -(g.rest_ow + g.ow);
        k_s[(STATE_OW, SURF_OW)] = g.ow;
        k_u[(STATE_OW, INPUT_T_EQ)] = g.rest_ow;

        k_x[(STATE_IW, STATE_IW)] = -g.iw;
        k_s[(STATE_IW, SURF_IW)] = g.iw;

        k_x[(STATE_AIR, STATE_AIR)] = -(g.conv_ow + g.conv_iw + g.conv_win);
        k_s[(STATE_AIR, SURF_OW)] = g.conv_ow;
        k_s[(STATE_AIR, SURF_IW)] = g.conv_iw;
        k_s[(STATE_AIR, SURF_WIN)] = g.conv_win;
        k_u[(STATE_AIR, INPUT_Q_IG)] = zone.ratio_conv_internal_gains;
        k_u[(STATE_AIR, INPUT_Q_SOL)] = zone.ratio_conv_rad_inner_win;
        k_u[(STATE_AIR, INPUT_Q_HC_AIR)] = 1.0;

        let capacities = [zone.c1_ow, zone.c1_iw, zone.air_capacity()];
        let mut a = k_x + &k_s * &surface_from_state;
        let mut b = k_u + &k_s * &surface_from_input;
        for (row, capacity) in capacities.iter().enumerate() {
            for col in 0..NUM_STATES {
                a[(row, col)] /= capacity;
            }
            for col in 0..NUM_INPUTS {
                b[(row, col)] /= capacity;
            }
        }

        let solar_apertures = zone
            .window_areas
            .iter()
            .zip(&zone.solar_transmittance)
            .map(|(area, g_value)| area * g_value)
            .collect();

        Ok(ZoneNetwork {
            conductances: g,
            surface_from_state,
            surface_from_input,
            state_space: StateSpace::new(a, b)?,
            solar_apertures,
        })
    }

    pub fn conductances(&self) -> &Conductances {
        &self.conductances
    }

    pub fn state_space(&self) -> &StateSpace {
        &self.state_space
    }

    /// Effective solar aperture (window area times g-value) per orientation (m²).
    pub fn solar_apertures(&self) -> &[f64] {
        &self.solar_apertures
    }

    /// Solar power transmitted into the zone for one timestep (W).
    ///
    /// `radiation` holds the incident radiation per orientation (W/m²).
    pub fn transmitted_solar<'a, I>(&self, radiation: I) -> f64
    where
        I: IntoIterator<Item = &'a f64>,
    {
        self.solar_apertures
            .iter()
            .zip(radiation)
            .map(|(aperture, rad)| aperture * rad)
            .sum()
    }

    /// Temperatures of the exterior wall, interior wall and window surfaces.
    pub fn surface_temperatures(&self, x: &DVector<f64>, u: &DVector<f64>) -> [f64; NUM_SURFACES] {
        let s = &self.surface_from_state * x + &self.surface_from_input * u;
        [s[SURF_OW], s[SURF_IW], s[SURF_WIN]]
    }
}
