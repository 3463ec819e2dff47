//! Numerical building blocks shared by the thermal models.

pub mod state_space;

pub use state_space::{DiscreteStateSpace, Discretization, StateSpace};
