//! Discrete-time integration of the zone network.
//!
//! [`Integrator::step`] is a pure function from the current [`State`] and the
//! inputs of one timestep to the next state. Nothing is mutated in place, so a
//! run can be replayed or forked from any intermediate state.

use nalgebra::{DVector, SMatrix, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::physics::{DiscreteStateSpace, Discretization};
use crate::sim::hvac::{HeatPath, NUM_PATHS};
use crate::sim::network::{
    ZoneNetwork, INPUT_Q_IG, INPUT_Q_SOL, INPUT_T_EQ, NUM_INPUTS, NUM_STATES, STATE_AIR,
    STATE_IW, STATE_NAMES, STATE_OW,
};
use crate::sim::zone::ZoneParameters;

/// Temperatures of the dynamic nodes (K).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Exterior wall mass
    pub t_ow: f64,
    /// Interior wall mass
    pub t_iw: f64,
    /// Zone air
    pub t_air: f64,
}

impl State {
    /// All nodes at the same temperature.
    pub fn uniform(temperature: f64) -> Self {
        State {
            t_ow: temperature,
            t_iw: temperature,
            t_air: temperature,
        }
    }

    fn to_vector(self) -> Vector3<f64> {
        let mut x = Vector3::zeros();
        x[STATE_OW] = self.t_ow;
        x[STATE_IW] = self.t_iw;
        x[STATE_AIR] = self.t_air;
        x
    }

    fn from_vector(x: &Vector3<f64>) -> Self {
        State {
            t_ow: x[STATE_OW],
            t_iw: x[STATE_IW],
            t_air: x[STATE_AIR],
        }
    }

    fn values(&self) -> [f64; NUM_STATES] {
        let mut values = [0.0; NUM_STATES];
        values[STATE_OW] = self.t_ow;
        values[STATE_IW] = self.t_iw;
        values[STATE_AIR] = self.t_air;
        values
    }

    /// Returns the first non-finite node, if any.
    pub fn first_non_finite(&self) -> Option<(&'static str, f64)> {
        self.values()
            .into_iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
            .map(|(i, v)| (STATE_NAMES[i], v))
    }

    /// Returns the first node below absolute zero, if any.
    pub fn first_negative(&self) -> Option<(&'static str, f64)> {
        self.values()
            .into_iter()
            .enumerate()
            .find(|(_, v)| *v < 0.0)
            .map(|(i, v)| (STATE_NAMES[i], v))
    }
}

/// Inputs held constant over one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepInputs {
    /// Equivalent outdoor temperature (K)
    pub equal_air_temp: f64,
    /// Internal gains (W)
    pub internal_gains: f64,
    /// Solar radiation transmitted through the windows (W)
    pub solar_gains: f64,
    /// HVAC power per path in column order (W)
    pub hvac: [f64; NUM_PATHS],
}

impl StepInputs {
    /// Same inputs with HVAC switched off.
    pub fn without_hvac(&self) -> Self {
        StepInputs {
            hvac: [0.0; NUM_PATHS],
            ..*self
        }
    }

    fn to_vector(self) -> SMatrix<f64, NUM_INPUTS, 1> {
        let mut u = SMatrix::<f64, NUM_INPUTS, 1>::zeros();
        u[INPUT_T_EQ] = self.equal_air_temp;
        u[INPUT_Q_IG] = self.internal_gains;
        u[INPUT_Q_SOL] = self.solar_gains;
        for path in HeatPath::ALL {
            u[path.input_index()] = self.hvac[path.column()];
        }
        u
    }
}

/// Temperatures of every node of the network (K).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeTemperatures {
    pub t_ow: f64,
    pub t_iw: f64,
    pub t_air: f64,
    /// Inner surface of the exterior walls
    pub t_owi: f64,
    /// Surface of the interior walls
    pub t_iwi: f64,
    /// Inner surface of the windows
    pub t_wini: f64,
}

/// Fixed-step integrator of one zone.
#[derive(Debug, Clone)]
pub struct Integrator {
    network: ZoneNetwork,
    discrete: DiscreteStateSpace,
    phi: SMatrix<f64, NUM_STATES, NUM_STATES>,
    gamma: SMatrix<f64, NUM_STATES, NUM_INPUTS>,
}

impl Integrator {
    /// Builds the zone network and discretises it for `dt` seconds.
    pub fn new(
        zone: &ZoneParameters,
        dt: f64,
        method: Discretization,
    ) -> Result<Self, SimulationError> {
        let network = ZoneNetwork::build(zone)?;
        let discrete = network.state_space().discretize(dt, method)?;
        let phi = SMatrix::<f64, NUM_STATES, NUM_STATES>::from_iterator(
            discrete.phi().iter().copied(),
        );
        let gamma = SMatrix::<f64, NUM_STATES, NUM_INPUTS>::from_iterator(
            discrete.gamma().iter().copied(),
        );
        Ok(Integrator {
            network,
            discrete,
            phi,
            gamma,
        })
    }

    pub fn network(&self) -> &ZoneNetwork {
        &self.network
    }

    pub fn discrete(&self) -> &DiscreteStateSpace {
        &self.discrete
    }

    /// Timestep in seconds.
    pub fn dt(&self) -> f64 {
        self.discrete.dt()
    }

    /// Advances `state` by one timestep.
    pub fn step(&self, state: &State, inputs: &StepInputs) -> State {
        let x = self.phi * state.to_vector() + self.gamma * inputs.to_vector();
        State::from_vector(&x)
    }

    /// End-of-step air temperature per watt injected on each path (K/W).
    pub fn air_sensitivity(&self) -> [f64; NUM_PATHS] {
        HeatPath::ALL.map(|path| self.discrete.input_sensitivity(STATE_AIR, path.input_index()))
    }

    /// Full set of node temperatures for a state and the inputs acting on it.
    pub fn node_temperatures(&self, state: &State, inputs: &StepInputs) -> NodeTemperatures {
        let x = DVector::from_column_slice(state.to_vector().as_slice());
        let u = DVector::from_column_slice(inputs.to_vector().as_slice());
        let [t_owi, t_iwi, t_wini] = self.network.surface_temperatures(&x, &u);
        NodeTemperatures {
            t_ow: state.t_ow,
            t_iw: state.t_iw,
            t_air: state.t_air,
            t_owi,
            t_iwi,
            t_wini,
        }
    }
}
