//! Integration tests for setpoint control with per-path power limits.
//!
//! All cases use VDI 6007 test room S at hourly resolution.

use fluxion_rc::validation::vdi6007::room_s;
use fluxion_rc::{
    BoundaryConditions, HeatPath, HvacMode, SimulationConfig, SimulationOutput, Simulator,
};
use ndarray::Array2;

const HORIZON: usize = 72;
const SETPOINT_HEATING: f64 = 293.15;
const SETPOINT_COOLING: f64 = 297.15;

fn cold_winter() -> BoundaryConditions {
    BoundaryConditions::free_floating(HORIZON, 1, 263.15).with_setpoints(
        vec![SETPOINT_HEATING; HORIZON],
        vec![SETPOINT_COOLING; HORIZON],
    )
}

/// Limits that differ per path but are constant over time.
fn path_limits(heater: [f64; 3], cooler: [f64; 3]) -> (Array2<f64>, Array2<f64>) {
    let mut heater_limit = Array2::zeros((HORIZON, 3));
    let mut cooler_limit = Array2::zeros((HORIZON, 3));
    for t in 0..HORIZON {
        for col in 0..3 {
            heater_limit[[t, col]] = heater[col];
            cooler_limit[[t, col]] = cooler[col];
        }
    }
    (heater_limit, cooler_limit)
}

fn run(config: SimulationConfig, bc: &BoundaryConditions) -> SimulationOutput {
    Simulator::new(room_s(), config)
        .expect("room S builds")
        .simulate(bc)
        .expect("simulation succeeds")
}

fn config() -> SimulationConfig {
    SimulationConfig::default().with_initial_temperature(SETPOINT_HEATING)
}

#[test]
fn test_unsaturated_heating_holds_setpoint() {
    let bc = cold_winter().with_uniform_limits(1e5, -1e5);
    let output = run(config(), &bc);

    for (step, (t_air, decision)) in output.air_temperature.iter().zip(&output.hvac).enumerate() {
        assert_eq!(decision.mode, HvacMode::HeatingUnsaturated, "step {}", step);
        assert!((t_air - SETPOINT_HEATING).abs() < 1e-6, "step {}: {} K", step, t_air);
        assert!(decision.heating() > 0.0);
        assert_eq!(decision.cooling(), 0.0);
    }
}

#[test]
fn test_saturated_heating_runs_at_limit() {
    let (heater, cooler) = path_limits([100.0, 0.0, 0.0], [0.0; 3]);
    let bc = cold_winter().with_limits(heater, cooler);
    let output = run(config(), &bc);

    for (step, (t_air, decision)) in output.air_temperature.iter().zip(&output.hvac).enumerate() {
        assert_eq!(decision.mode, HvacMode::HeatingSaturated, "step {}", step);
        assert_eq!(decision.heating(), 100.0);
        assert_eq!(decision.power(HeatPath::InteriorWall), 0.0);
        assert!(*t_air < SETPOINT_HEATING, "step {}: {} K", step, t_air);
    }
    assert_eq!(output.saturated_steps(), HORIZON);
}

#[test]
fn test_saturated_air_path_spills_to_interior_wall() {
    let (heater, cooler) = path_limits([50.0, 1e5, 1e5], [0.0; 3]);
    let bc = cold_winter().with_limits(heater, cooler);
    let output = run(config(), &bc);

    for (t_air, decision) in output.air_temperature.iter().zip(&output.hvac) {
        assert_eq!(decision.mode, HvacMode::HeatingUnsaturated);
        assert_eq!(decision.power(HeatPath::Air), 50.0);
        assert!(decision.power(HeatPath::InteriorWall) > 0.0);
        assert_eq!(decision.power(HeatPath::ExteriorWall), 0.0);
        assert!((t_air - SETPOINT_HEATING).abs() < 1e-6);
    }
}

#[test]
fn test_heater_order_selects_first_path() {
    let bc = cold_winter().with_uniform_limits(1e5, -1e5);
    let config = config().with_heater_order(vec![
        HeatPath::InteriorWall,
        HeatPath::Air,
        HeatPath::ExteriorWall,
    ]);
    let output = run(config, &bc);

    for (t_air, decision) in output.air_temperature.iter().zip(&output.hvac) {
        assert_eq!(decision.power(HeatPath::Air), 0.0);
        assert!(decision.power(HeatPath::InteriorWall) > 0.0);
        assert!((t_air - SETPOINT_HEATING).abs() < 1e-6);
    }
}

#[test]
fn test_surface_heating_needs_more_power_than_air_heating() {
    let bc = cold_winter().with_uniform_limits(1e5, -1e5);
    let air = run(config(), &bc);
    let wall = run(
        config().with_heater_order(vec![
            HeatPath::InteriorWall,
            HeatPath::Air,
            HeatPath::ExteriorWall,
        ]),
        &bc,
    );
    // Power put into the wall surface must first warm it before reaching the air.
    assert!(wall.hvac[0].heating() > air.hvac[0].heating());
}

#[test]
fn test_saturated_cooling() {
    let (heater, cooler) = path_limits([0.0; 3], [-200.0, 0.0, 0.0]);
    let bc = BoundaryConditions::free_floating(HORIZON, 1, 295.15)
        .with_internal_gains(vec![5000.0; HORIZON])
        .with_setpoints(vec![SETPOINT_HEATING; HORIZON], vec![SETPOINT_COOLING; HORIZON])
        .with_limits(heater, cooler);
    let output = run(SimulationConfig::default(), &bc);

    for (t_air, decision) in output.air_temperature.iter().zip(&output.hvac) {
        match decision.mode {
            HvacMode::CoolingSaturated => {
                assert_eq!(decision.cooling(), -200.0);
                assert!(*t_air > SETPOINT_COOLING);
            }
            HvacMode::CoolingUnsaturated => {
                assert!(decision.cooling() >= -200.0);
                assert!((t_air - SETPOINT_COOLING).abs() < 1e-6);
            }
            HvacMode::FreeFloating => assert!(*t_air <= SETPOINT_COOLING),
            mode => panic!("Unexpected mode {}", mode),
        }
    }
    assert!(output.saturated_steps() > 0);
    assert!(output.cooling_energy_kwh() < 0.0);
    assert_eq!(output.heating_energy_kwh(), 0.0);
}

#[test]
fn test_dead_band_is_free_floating() {
    let bc = BoundaryConditions::free_floating(HORIZON, 1, 295.15)
        .with_setpoints(vec![SETPOINT_HEATING; HORIZON], vec![SETPOINT_COOLING; HORIZON])
        .with_uniform_limits(1e5, -1e5);
    let output = run(SimulationConfig::default(), &bc);

    assert!(output.modes().iter().all(|m| *m == HvacMode::FreeFloating));
    assert!(output.net_power().iter().all(|p| *p == 0.0));
}

#[test]
fn test_zero_limits_leave_zone_uncontrolled() {
    let controlled = run(config(), &cold_winter());
    let free = run(
        config(),
        &BoundaryConditions::free_floating(HORIZON, 1, 263.15),
    );
    assert_eq!(controlled.air_temperature, free.air_temperature);
    assert!(controlled.heating_power().iter().all(|p| *p == 0.0));
}
