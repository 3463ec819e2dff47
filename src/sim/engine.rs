//! Simulation driver.
//!
//! [`Simulator`] owns the discretised zone and the HVAC limit resolver and runs
//! them over a horizon of boundary conditions. Each timestep:
//!
//! 1. Transmitted solar radiation is summed over all orientations.
//! 2. The zone is stepped without HVAC to get the free-floating air temperature.
//! 3. The limit resolver decides the power per path.
//! 4. If any power is applied the step is recomputed with it.
//!
//! The state is threaded explicitly from one step to the next; the simulator
//! itself never changes, so a single instance can serve any number of runs.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SimResult, SimulationError};
use crate::physics::Discretization;
use crate::sim::boundary::BoundaryConditions;
use crate::sim::hvac::{HeatPath, HvacDecision, HvacMode, LimitResolver, NUM_PATHS};
use crate::sim::integrator::{Integrator, NodeTemperatures, State, StepInputs};
use crate::sim::zone::ZoneParameters;

/// Joules per kilowatt-hour.
const J_PER_KWH: f64 = 3.6e6;

fn default_timestep() -> f64 {
    3600.0
}

fn default_initial_temperature() -> f64 {
    295.15
}

fn default_order() -> Vec<HeatPath> {
    HeatPath::ALL.to_vec()
}

/// Run settings independent of the zone and its boundary conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Timestep length (s)
    #[serde(default = "default_timestep")]
    pub timestep_s: f64,
    /// Temperature of every dynamic node at the start of the horizon (K)
    #[serde(default = "default_initial_temperature")]
    pub initial_temperature: f64,
    #[serde(default)]
    pub discretization: Discretization,
    /// Order in which heating paths are engaged
    #[serde(default = "default_order")]
    pub heater_order: Vec<HeatPath>,
    /// Order in which cooling paths are engaged
    #[serde(default = "default_order")]
    pub cooler_order: Vec<HeatPath>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            timestep_s: default_timestep(),
            initial_temperature: default_initial_temperature(),
            discretization: Discretization::default(),
            heater_order: default_order(),
            cooler_order: default_order(),
        }
    }
}

impl SimulationConfig {
    pub fn with_timestep(mut self, timestep_s: f64) -> Self {
        self.timestep_s = timestep_s;
        self
    }

    pub fn with_initial_temperature(mut self, temperature: f64) -> Self {
        self.initial_temperature = temperature;
        self
    }

    pub fn with_discretization(mut self, discretization: Discretization) -> Self {
        self.discretization = discretization;
        self
    }

    pub fn with_heater_order(mut self, order: Vec<HeatPath>) -> Self {
        self.heater_order = order;
        self
    }

    pub fn with_cooler_order(mut self, order: Vec<HeatPath>) -> Self {
        self.cooler_order = order;
        self
    }

    /// Number of timesteps per hour, if the timestep divides an hour evenly.
    pub fn steps_per_hour(&self) -> Option<usize> {
        let steps = 3600.0 / self.timestep_s;
        let rounded = steps.round();
        if rounded >= 1.0 && (steps - rounded).abs() < 1e-9 {
            Some(rounded as usize)
        } else {
            None
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.timestep_s.is_finite() || self.timestep_s <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "timestep_s",
                reason: format!("must be positive and finite, got {}", self.timestep_s),
            });
        }
        if !self.initial_temperature.is_finite() || self.initial_temperature < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "initial_temperature",
                reason: format!(
                    "must be a finite absolute temperature, got {}",
                    self.initial_temperature
                ),
            });
        }
        Ok(())
    }
}

/// Per-step results of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub timestep_s: f64,
    /// Air temperature at the end of each step (K)
    pub air_temperature: Vec<f64>,
    /// HVAC decision of each step
    pub hvac: Vec<HvacDecision>,
    /// All node temperatures at the end of each step (K)
    pub nodes: Vec<NodeTemperatures>,
    /// State after the last step, usable to continue the run
    pub final_state: State,
}

impl SimulationOutput {
    pub fn len(&self) -> usize {
        self.air_temperature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.air_temperature.is_empty()
    }

    /// Heating power per step (W, non-negative).
    pub fn heating_power(&self) -> Vec<f64> {
        self.hvac.iter().map(HvacDecision::heating).collect()
    }

    /// Cooling power per step (W, non-positive).
    pub fn cooling_power(&self) -> Vec<f64> {
        self.hvac.iter().map(HvacDecision::cooling).collect()
    }

    /// Net HVAC power per step (W).
    pub fn net_power(&self) -> Vec<f64> {
        self.hvac.iter().map(HvacDecision::net).collect()
    }

    pub fn modes(&self) -> Vec<HvacMode> {
        self.hvac.iter().map(|d| d.mode).collect()
    }

    /// Heating energy over the horizon (kWh).
    pub fn heating_energy_kwh(&self) -> f64 {
        self.hvac.iter().map(HvacDecision::heating).sum::<f64>() * self.timestep_s / J_PER_KWH
    }

    /// Cooling energy over the horizon (kWh, non-positive).
    pub fn cooling_energy_kwh(&self) -> f64 {
        self.hvac.iter().map(HvacDecision::cooling).sum::<f64>() * self.timestep_s / J_PER_KWH
    }

    pub fn saturated_steps(&self) -> usize {
        self.hvac.iter().filter(|d| d.mode.is_saturated()).count()
    }

    /// Renders one row per step: time, air temperature, powers and mode.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(
            "step,time_s,t_air_k,heating_w,cooling_w,net_w,q_air_w,q_interior_wall_w,q_exterior_wall_w,mode\n",
        );
        for (step, (t_air, decision)) in self.air_temperature.iter().zip(&self.hvac).enumerate() {
            csv.push_str(&format!(
                "{},{},{:.6},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{}\n",
                step,
                (step + 1) as f64 * self.timestep_s,
                t_air,
                decision.heating(),
                decision.cooling(),
                decision.net(),
                decision.power(HeatPath::Air),
                decision.power(HeatPath::InteriorWall),
                decision.power(HeatPath::ExteriorWall),
                decision.mode,
            ));
        }
        csv
    }
}

/// Discretised zone plus HVAC resolver, ready to run.
#[derive(Debug, Clone)]
pub struct Simulator {
    zone: ZoneParameters,
    config: SimulationConfig,
    integrator: Integrator,
    resolver: LimitResolver,
    sensitivity: [f64; NUM_PATHS],
}

impl Simulator {
    /// Builds the zone network and discretises it for the configured timestep.
    ///
    /// # Errors
    ///
    /// Fails if the zone or the configuration is invalid or the network is
    /// singular.
    pub fn new(zone: ZoneParameters, config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        let resolver = LimitResolver::new(&config.heater_order, &config.cooler_order)?;
        let integrator = Integrator::new(&zone, config.timestep_s, config.discretization)?;
        let sensitivity = integrator.air_sensitivity();
        log::debug!(
            "Zone network built: UA {:.2} W/K, air sensitivity {:?} K/W",
            integrator.network().conductances().ua_total(),
            sensitivity
        );
        Ok(Simulator {
            zone,
            config,
            integrator,
            resolver,
            sensitivity,
        })
    }

    pub fn zone(&self) -> &ZoneParameters {
        &self.zone
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    /// Runs the horizon starting from the configured uniform initial temperature.
    pub fn simulate(&self, bc: &BoundaryConditions) -> SimResult<SimulationOutput> {
        self.simulate_from(State::uniform(self.config.initial_temperature), bc)
    }

    /// Runs the horizon starting from an arbitrary state.
    ///
    /// # Errors
    ///
    /// * [`SimulationError::Config`] if any boundary series is malformed or the
    ///   initial state holds a non-finite or negative node; nothing is simulated
    ///   in that case.
    /// * [`SimulationError::NumericalInstability`] if a node becomes non-finite.
    pub fn simulate_from(
        &self,
        initial: State,
        bc: &BoundaryConditions,
    ) -> SimResult<SimulationOutput> {
        bc.validate(self.zone.num_orientations())?;
        if let Some((node, value)) = initial.first_non_finite() {
            return Err(ConfigError::NonFinite {
                series: node,
                index: 0,
                value,
            }
            .into());
        }
        if let Some((node, value)) = initial.first_negative() {
            return Err(ConfigError::NegativeTemperature {
                series: node,
                index: 0,
                value,
            }
            .into());
        }

        let horizon = bc.horizon();
        log::debug!(
            "Simulating {} steps of {} s ({:?})",
            horizon,
            self.config.timestep_s,
            self.config.discretization
        );

        let network = self.integrator.network();
        let mut air_temperature = Vec::with_capacity(horizon);
        let mut hvac = Vec::with_capacity(horizon);
        let mut nodes = Vec::with_capacity(horizon);
        let mut warned_saturation = false;
        let mut state = initial;

        for t in 0..horizon {
            let step = bc.step(t);
            let inputs = StepInputs {
                equal_air_temp: step.equal_air_temp,
                internal_gains: step.internal_gains,
                solar_gains: network.transmitted_solar(bc.solar_rad_in.row(t)),
                hvac: [0.0; NUM_PATHS],
            };

            let free = self.integrator.step(&state, &inputs);
            let decision = self.resolver.resolve(free.t_air, &self.sensitivity, &step.hvac);

            let applied = StepInputs {
                hvac: decision.powers,
                ..inputs
            };
            let next = if decision.mode == HvacMode::FreeFloating {
                free
            } else {
                self.integrator.step(&state, &applied)
            };

            check_state(t, &next)?;

            if decision.mode.is_saturated() && !warned_saturation {
                log::warn!(
                    "HVAC saturated at step {} ({}), air at {:.2} K",
                    t,
                    decision.mode,
                    next.t_air
                );
                warned_saturation = true;
            }

            air_temperature.push(next.t_air);
            hvac.push(decision);
            nodes.push(self.integrator.node_temperatures(&next, &applied));
            state = next;
        }

        let output = SimulationOutput {
            timestep_s: self.config.timestep_s,
            air_temperature,
            hvac,
            nodes,
            final_state: state,
        };
        log::info!(
            "Simulated {} steps: heating {:.3} kWh, cooling {:.3} kWh, {} saturated steps",
            output.len(),
            output.heating_energy_kwh(),
            output.cooling_energy_kwh(),
            output.saturated_steps()
        );
        Ok(output)
    }
}

/// Fails with [`SimulationError::NumericalInstability`] if `state` holds a
/// non-finite node after `step`.
fn check_state(step: usize, state: &State) -> SimResult<()> {
    match state.first_non_finite() {
        Some((node, value)) => {
            log::error!("Node '{}' became {} at step {}", node, value, step);
            Err(SimulationError::NumericalInstability { step, node, value })
        }
        None => Ok(()),
    }
}

/// Runs independent zones in parallel; results keep the order of `jobs`.
pub fn simulate_batch(
    jobs: &[(ZoneParameters, BoundaryConditions)],
    config: &SimulationConfig,
) -> Vec<SimResult<SimulationOutput>> {
    jobs.par_iter()
        .map(|(zone, bc)| Simulator::new(zone.clone(), config.clone())?.simulate(bc))
        .collect()
}

/// A complete run description, as read from JSON by the command line tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub zone: ZoneParameters,
    #[serde(default)]
    pub config: SimulationConfig,
    pub boundary: BoundaryConditions,
}

impl Scenario {
    pub fn run(&self) -> SimResult<SimulationOutput> {
        Simulator::new(self.zone.clone(), self.config.clone())?.simulate(&self.boundary)
    }
}
