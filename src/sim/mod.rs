//! Zone model, HVAC and the simulation loop.

pub mod boundary;
pub mod engine;
pub mod hvac;
pub mod integrator;
pub mod network;
pub mod schedule;
pub mod zone;
