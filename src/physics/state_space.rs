//! Linear time-invariant state-space models and their discretisation.
//!
//! A lumped RC network is a continuous system `dx/dt = A·x + B·u`. Advancing it
//! with a fixed timestep needs a discrete transition `x[k+1] = Φ·x[k] + Γ·u[k]`.
//! Two discretisations are offered:
//!
//! - [`Discretization::ZeroOrderHold`]: exact for inputs held constant over the
//!   step, computed from the exponential of the augmented matrix
//!   `[[A, B], [0, 0]]·dt`.
//! - [`Discretization::BackwardEuler`]: implicit first-order update
//!   `Φ = (I - A·dt)⁻¹`, `Γ = Φ·B·dt`.
//!
//! Both are unconditionally stable for a passive network (all eigenvalues of `A`
//! with negative real part), whatever the timestep.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Method used to turn a continuous model into a discrete one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discretization {
    /// Exact transition for piecewise-constant inputs.
    #[default]
    ZeroOrderHold,
    /// Implicit (backward) Euler.
    BackwardEuler,
}

/// Continuous-time model `dx/dt = A·x + B·u`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpace {
    a: DMatrix<f64>,
    b: DMatrix<f64>,
}

impl StateSpace {
    /// Creates a model from its system and input matrices.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::SingularNetwork`] if `A` is not square, if `B`
    /// does not have one row per state, or if any entry is non-finite.
    pub fn new(a: DMatrix<f64>, b: DMatrix<f64>) -> Result<Self, SimulationError> {
        if !a.is_square() {
            return Err(SimulationError::SingularNetwork(format!(
                "system matrix is {}x{}",
                a.nrows(),
                a.ncols()
            )));
        }
        if b.nrows() != a.nrows() {
            return Err(SimulationError::SingularNetwork(format!(
                "input matrix has {} rows for {} states",
                b.nrows(),
                a.nrows()
            )));
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(SimulationError::SingularNetwork(
                "non-finite coefficient in state-space model".to_string(),
            ));
        }
        Ok(StateSpace { a, b })
    }

    pub fn num_states(&self) -> usize {
        self.a.nrows()
    }

    pub fn num_inputs(&self) -> usize {
        self.b.ncols()
    }

    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    pub fn b(&self) -> &DMatrix<f64> {
        &self.b
    }

    /// Time derivative of the state for the given input.
    pub fn derivative(&self, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64> {
        &self.a * x + &self.b * u
    }

    /// Discretises the model for a fixed timestep `dt` in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::SingularNetwork`] for a non-positive timestep,
    /// a singular implicit system, or a transition with non-finite entries.
    pub fn discretize(
        &self,
        dt: f64,
        method: Discretization,
    ) -> Result<DiscreteStateSpace, SimulationError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimulationError::SingularNetwork(format!(
                "timestep must be positive, got {dt}"
            )));
        }

        let n = self.num_states();
        let m = self.num_inputs();

        let (phi, gamma) = match method {
            Discretization::ZeroOrderHold => {
                let mut augmented = DMatrix::<f64>::zeros(n + m, n + m);
                augmented
                    .view_mut((0, 0), (n, n))
                    .copy_from(&(&self.a * dt));
                augmented
                    .view_mut((0, n), (n, m))
                    .copy_from(&(&self.b * dt));
                let transition = augmented.exp();
                (
                    transition.view((0, 0), (n, n)).into_owned(),
                    transition.view((0, n), (n, m)).into_owned(),
                )
            }
            Discretization::BackwardEuler => {
                let implicit = DMatrix::<f64>::identity(n, n) - &self.a * dt;
                let phi = implicit.lu().try_inverse().ok_or_else(|| {
                    SimulationError::SingularNetwork(
                        "implicit Euler system (I - A·dt) is singular".to_string(),
                    )
                })?;
                let gamma = &phi * &self.b * dt;
                (phi, gamma)
            }
        };

        if phi.iter().chain(gamma.iter()).any(|v| !v.is_finite()) {
            return Err(SimulationError::SingularNetwork(format!(
                "non-finite transition matrix for dt = {dt} s"
            )));
        }

        Ok(DiscreteStateSpace {
            phi,
            gamma,
            dt,
            method,
        })
    }
}

/// Discrete-time model `x[k+1] = Φ·x[k] + Γ·u[k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteStateSpace {
    phi: DMatrix<f64>,
    gamma: DMatrix<f64>,
    dt: f64,
    method: Discretization,
}

impl DiscreteStateSpace {
    pub fn phi(&self) -> &DMatrix<f64> {
        &self.phi
    }

    pub fn gamma(&self) -> &DMatrix<f64> {
        &self.gamma
    }

    /// Timestep in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn method(&self) -> Discretization {
        self.method
    }

    /// Advances the state by one timestep.
    pub fn propagate(&self, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64> {
        &self.phi * x + &self.gamma * u
    }

    /// Change of `state` at the end of a step per unit of `input`.
    pub fn input_sensitivity(&self, state: usize, input: usize) -> f64 {
        self.gamma[(state, input)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_order(tau: f64) -> StateSpace {
        // dx/dt = (u - x) / tau
        StateSpace::new(
            DMatrix::from_element(1, 1, -1.0 / tau),
            DMatrix::from_element(1, 1, 1.0 / tau),
        )
        .expect("valid model")
    }

    #[test]
    fn test_zoh_matches_analytical_first_order() {
        let tau = 3600.0;
        let dt = 600.0;
        let model = first_order(tau).discretize(dt, Discretization::ZeroOrderHold).unwrap();

        let decay = (-dt / tau).exp();
        assert!((model.phi()[(0, 0)] - decay).abs() < 1e-12);
        assert!((model.gamma()[(0, 0)] - (1.0 - decay)).abs() < 1e-12);
    }

    #[test]
    fn test_input_sensitivity_reads_gamma() {
        let model = first_order(3600.0).discretize(600.0, Discretization::ZeroOrderHold).unwrap();
        assert_eq!(model.input_sensitivity(0, 0), model.gamma()[(0, 0)]);

        // One unit of input held over a step moves the state by the sensitivity.
        let x = DVector::from_element(1, 0.0);
        let next = model.propagate(&x, &DVector::from_element(1, 1.0));
        assert!((next[0] - model.input_sensitivity(0, 0)).abs() < 1e-15);
    }

    #[test]
    fn test_backward_euler_first_order() {
        let tau = 3600.0;
        let dt = 600.0;
        let model = first_order(tau).discretize(dt, Discretization::BackwardEuler).unwrap();

        let phi = 1.0 / (1.0 + dt / tau);
        assert!((model.phi()[(0, 0)] - phi).abs() < 1e-12);
        assert!((model.gamma()[(0, 0)] - phi * dt / tau).abs() < 1e-12);
    }

    #[test]
    fn test_stable_for_timestep_far_above_time_constant() {
        let model = first_order(10.0);
        for method in [Discretization::ZeroOrderHold, Discretization::BackwardEuler] {
            let discrete = model.discretize(86_400.0, method).unwrap();
            let mut x = DVector::from_element(1, 100.0);
            let u = DVector::from_element(1, 20.0);
            for _ in 0..100 {
                x = discrete.propagate(&x, &u);
                assert!(x[0].is_finite());
            }
            assert!((x[0] - 20.0).abs() < 1e-6, "{:?} did not settle: {}", method, x[0]);
        }
    }

    #[test]
    fn test_rejects_non_positive_timestep() {
        let model = first_order(100.0);
        assert!(model.discretize(0.0, Discretization::ZeroOrderHold).is_err());
        assert!(model.discretize(-1.0, Discretization::BackwardEuler).is_err());
    }

    #[test]
    fn test_rejects_mismatched_input_matrix() {
        let result = StateSpace::new(DMatrix::zeros(2, 2), DMatrix::zeros(3, 1));
        assert!(matches!(result, Err(SimulationError::SingularNetwork(_))));
    }

    #[test]
    fn test_derivative() {
        let model = first_order(10.0);
        let x = DVector::from_element(1, 30.0);
        let u = DVector::from_element(1, 20.0);
        assert!((model.derivative(&x, &u)[0] + 1.0).abs() < 1e-12);
    }
}
