//! Properties every simulation run must satisfy regardless of the scenario.

use fluxion_rc::validation::vdi6007::room_s;
use fluxion_rc::{
    simulate_batch, BoundaryConditions, ConfigError, Discretization, Scenario,
    SimulationConfig, SimulationError, Simulator, State,
};
use ndarray::Array2;

/// Two days of a sunny, occupied office at hourly resolution.
fn office_day() -> BoundaryConditions {
    let horizon = 48;
    let outdoor: Vec<f64> = (0..horizon)
        .map(|t| 278.15 + 6.0 * ((t % 24) as f64 / 24.0 * std::f64::consts::TAU).sin())
        .collect();
    let gains: Vec<f64> = (0..horizon)
        .map(|t| if (8..18).contains(&(t % 24)) { 800.0 } else { 0.0 })
        .collect();
    let mut solar = Array2::zeros((horizon, 1));
    for t in 0..horizon {
        let hour = (t % 24) as f64;
        if (7.0..19.0).contains(&hour) {
            solar[[t, 0]] = 400.0 * ((hour - 7.0) / 12.0 * std::f64::consts::PI).sin();
        }
    }

    BoundaryConditions::free_floating(horizon, 1, 0.0)
        .with_equal_air_temp(outdoor)
        .with_internal_gains(gains)
        .with_solar_radiation(solar)
        .with_setpoints(vec![293.15; horizon], vec![299.15; horizon])
        .with_uniform_limits(3000.0, -3000.0)
}

fn simulator() -> Simulator {
    Simulator::new(room_s(), SimulationConfig::default()).expect("room S builds")
}

#[test]
fn test_output_length_equals_horizon() {
    for horizon in [1, 24, 500] {
        let bc = BoundaryConditions::free_floating(horizon, 1, 290.0);
        let output = simulator().simulate(&bc).unwrap();
        assert_eq!(output.len(), horizon);
        assert_eq!(output.hvac.len(), horizon);
        assert_eq!(output.nodes.len(), horizon);
    }
}

#[test]
fn test_runs_are_bit_identical() {
    let bc = office_day();
    let a = simulator().simulate(&bc).unwrap();
    let b = simulator().simulate(&bc).unwrap();

    let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&a.air_temperature), bits(&b.air_temperature));
    assert_eq!(bits(&a.net_power()), bits(&b.net_power()));
    assert_eq!(a.modes(), b.modes());
}

#[test]
fn test_steady_state_without_excitation() {
    let config = SimulationConfig::default()
        .with_timestep(600.0)
        .with_initial_temperature(288.15);
    let sim = Simulator::new(room_s(), config).unwrap();
    let output = sim
        .simulate(&BoundaryConditions::free_floating(6 * 24 * 30, 1, 288.15))
        .unwrap();

    for t in &output.air_temperature {
        assert!((t - 288.15).abs() < 1e-6, "drifted to {} K", t);
    }
    let last = output.nodes.last().unwrap();
    assert!((last.t_owi - 288.15).abs() < 1e-6);
    assert!((last.t_wini - 288.15).abs() < 1e-6);
}

#[test]
fn test_office_day_exercises_every_regime() {
    let output = simulator().simulate(&office_day()).unwrap();
    println!("Heating: {:.2} kWh", output.heating_energy_kwh());
    println!("Cooling: {:.2} kWh", output.cooling_energy_kwh());

    assert!(output.air_temperature.iter().all(|t| t.is_finite()));
    assert!(output.heating_energy_kwh() >= 0.0);
    assert!(output.cooling_energy_kwh() <= 0.0);
    for (t_air, decision) in output.air_temperature.iter().zip(&output.hvac) {
        if decision.mode.is_heating() && !decision.mode.is_saturated() {
            assert!((t_air - 293.15).abs() < 1e-6);
        }
        if decision.mode.is_cooling() && !decision.mode.is_saturated() {
            assert!((t_air - 299.15).abs() < 1e-6);
        }
    }
}

#[test]
fn test_discretizations_agree_at_short_timestep() {
    let bc_minutes = {
        let hourly = office_day();
        let expand = |v: &[f64]| -> Vec<f64> {
            v.iter().flat_map(|x| std::iter::repeat(*x).take(60)).collect()
        };
        let mut solar = Array2::<f64>::zeros((hourly.horizon() * 60, 1));
        for (t, value) in solar.iter_mut().enumerate() {
            *value = hourly.solar_rad_in[[t / 60, 0]];
        }
        BoundaryConditions::free_floating(hourly.horizon() * 60, 1, 0.0)
            .with_equal_air_temp(expand(&hourly.equal_air_temp))
            .with_internal_gains(expand(&hourly.internal_gains))
            .with_solar_radiation(solar)
    };

    let run = |method| {
        let config = SimulationConfig::default()
            .with_timestep(60.0)
            .with_discretization(method);
        Simulator::new(room_s(), config).unwrap().simulate(&bc_minutes).unwrap()
    };
    let zoh = run(Discretization::ZeroOrderHold);
    let euler = run(Discretization::BackwardEuler);

    let max_diff = zoh
        .air_temperature
        .iter()
        .zip(&euler.air_temperature)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    assert!(max_diff < 0.05, "methods differ by {} K", max_diff);
}

#[test]
fn test_long_timestep_stays_bounded() {
    let config = SimulationConfig::default()
        .with_timestep(6.0 * 3600.0)
        .with_discretization(Discretization::BackwardEuler);
    let bc = BoundaryConditions::free_floating(40, 1, 273.15);
    let output = Simulator::new(room_s(), config).unwrap().simulate(&bc).unwrap();

    for t in &output.air_temperature {
        assert!(*t >= 273.15 - 1e-6 && *t <= 295.15 + 1e-6, "{} K", t);
    }
}

#[test]
fn test_invalid_series_fails_before_running() {
    let mut bc = office_day();
    bc.t_set_cooling[30] = 280.0;
    match simulator().simulate(&bc) {
        Err(SimulationError::Config(ConfigError::CrossedSetpoints { index, .. })) => {
            assert_eq!(index, 30)
        }
        other => panic!("Expected CrossedSetpoints, got {:?}", other),
    }

    let mut bc = office_day();
    bc.internal_gains[12] = f64::NAN;
    assert!(matches!(
        simulator().simulate(&bc),
        Err(SimulationError::Config(ConfigError::NonFinite { series: "internal_gains", index: 12, .. }))
    ));
}

#[test]
fn test_invalid_zone_is_rejected() {
    let mut zone = room_s();
    zone.c1_ow = -1.0;
    assert!(matches!(
        Simulator::new(zone, SimulationConfig::default()),
        Err(SimulationError::Config(ConfigError::InvalidParameter { name: "c1_ow", .. }))
    ));
}

#[test]
fn test_continuing_from_final_state() {
    let sim = simulator();
    let first = sim.simulate(&office_day()).unwrap();
    let second = sim.simulate_from(first.final_state, &office_day()).unwrap();
    let fresh = sim
        .simulate_from(State::uniform(295.15), &office_day())
        .unwrap();

    assert_eq!(fresh.air_temperature, first.air_temperature);
    assert_ne!(second.air_temperature, first.air_temperature);
}

#[test]
fn test_batch_runs_each_zone_independently() {
    let mut heavy = room_s();
    heavy.c1_iw *= 4.0;
    let jobs = vec![
        (room_s(), office_day()),
        (heavy.clone(), office_day()),
        (heavy, BoundaryConditions::free_floating(0, 1, 290.0)),
    ];
    let results = simulate_batch(&jobs, &SimulationConfig::default());

    let light = results[0].as_ref().unwrap();
    let heavy = results[1].as_ref().unwrap();
    assert_eq!(light, &simulator().simulate(&office_day()).unwrap());
    assert_ne!(light.air_temperature, heavy.air_temperature);
    assert!(matches!(
        results[2],
        Err(SimulationError::Config(ConfigError::EmptyHorizon))
    ));
}

#[test]
fn test_scenario_json_roundtrip() {
    let scenario = Scenario {
        zone: room_s(),
        config: SimulationConfig::default().with_timestep(900.0),
        boundary: BoundaryConditions::free_floating(96, 1, 280.15)
            .with_internal_gains(vec![400.0; 96]),
    };
    let json = serde_json::to_string(&scenario).unwrap();
    let parsed: Scenario = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, scenario);
    assert_eq!(parsed.run().unwrap(), scenario.run().unwrap());
}
