//! Reduced-order RC thermal zone simulation after VDI 6007.
//!
//! A zone is described by a [`ZoneParameters`] record, reduced to a linear
//! state-space model, discretised once and then stepped over a horizon of
//! [`BoundaryConditions`]. An ideal HVAC with per-path power limits holds the
//! air between the heating and cooling setpoints.
//!
//! ```rust,no_run
//! use fluxion_rc::{BoundaryConditions, SimulationConfig, Simulator};
//! use fluxion_rc::validation::vdi6007;
//!
//! let simulator = Simulator::new(vdi6007::room_s(), SimulationConfig::default())?;
//! let bc = BoundaryConditions::free_floating(24, 1, 283.15)
//!     .with_internal_gains(vec![800.0; 24]);
//! let output = simulator.simulate(&bc)?;
//! println!("air at midnight: {:.2} K", output.air_temperature[23]);
//! # Ok::<(), fluxion_rc::SimulationError>(())
//! ```

pub mod error;
pub mod physics;
pub mod sim;
pub mod validation;

pub use error::{ConfigError, ReferenceError, SimResult, SimulationError, ValidationError};
pub use physics::Discretization;
pub use sim::boundary::BoundaryConditions;
pub use sim::engine::{simulate_batch, Scenario, SimulationConfig, SimulationOutput, Simulator};
pub use sim::hvac::{HeatPath, HvacDecision, HvacMode};
pub use sim::integrator::{NodeTemperatures, State};
pub use sim::zone::ZoneParameters;
