//! Error types for zone simulation and reference validation.
//!
//! Configuration problems are detected before the timestep loop starts and carry
//! enough context (series name, timestep index) to fix the input. Numerical
//! failures abort a run immediately; a run never returns partial output.

use thiserror::Error;

/// Invalid input detected before any computation proceeds.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Series '{series}' has {actual} timesteps, expected {expected}")]
    LengthMismatch {
        series: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Series '{series}' has {actual} columns, expected {expected}")]
    ColumnMismatch {
        series: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Non-finite value {value} in series '{series}' at timestep {index}")]
    NonFinite {
        series: &'static str,
        index: usize,
        value: f64,
    },

    #[error("Non-physical absolute temperature {value} K in series '{series}' at timestep {index}")]
    NegativeTemperature {
        series: &'static str,
        index: usize,
        value: f64,
    },

    #[error("Negative solar radiation {value} W/m² on orientation {orientation} at timestep {index}")]
    NegativeRadiation {
        index: usize,
        orientation: usize,
        value: f64,
    },

    #[error("Crossed setpoints at timestep {index}: cooling {cooling} K is below heating {heating} K")]
    CrossedSetpoints {
        index: usize,
        heating: f64,
        cooling: f64,
    },

    #[error("Heater limit must be non-negative: {value} W on path {path} at timestep {index}")]
    NegativeHeaterLimit {
        index: usize,
        path: usize,
        value: f64,
    },

    #[error("Cooler limit must be non-positive: {value} W on path {path} at timestep {index}")]
    PositiveCoolerLimit {
        index: usize,
        path: usize,
        value: f64,
    },

    #[error("Invalid zone parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Heat path order must list every path exactly once, got {0:?}")]
    InvalidPathOrder(Vec<String>),

    #[error("Empty horizon: at least one timestep is required")]
    EmptyHorizon,
}

/// Failure of a simulation run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Thermal network is singular: {0}")]
    SingularNetwork(String),

    #[error("Numerical instability at timestep {step}: node '{node}' became {value}")]
    NumericalInstability {
        step: usize,
        node: &'static str,
        value: f64,
    },
}

/// Failure while loading or comparing against a reference trace.
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Reference table is missing a header row")]
    MissingHeader,

    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Reference column {column} does not exist ({available} data columns)")]
    MissingColumn { column: usize, available: usize },

    #[error("Day block {block} is out of range ({rows} rows, {rows_per_block} rows per block)")]
    MissingBlock {
        block: usize,
        rows: usize,
        rows_per_block: usize,
    },

    #[error("Cannot compare series of different length: simulated {simulated}, reference {reference}")]
    LengthMismatch { simulated: usize, reference: usize },

    #[error("Cannot compare empty series")]
    Empty,
}

pub type SimResult<T> = Result<T, SimulationError>;

/// Failure of a benchmark validation run.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Simulation failed: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Reference comparison failed: {0}")]
    Reference(#[from] ReferenceError),
}
