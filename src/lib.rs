//! robot-runner library
//!
//! Exposes the runner pieces for the `robot` binary and integration tests

pub mod cli;
pub mod config;
pub mod errors;
pub mod params;
pub mod runner;
pub mod scenario;

pub use config::{load_config, Config};
pub use errors::RunnerError;
pub use runner::{prepare_flow, run_on, run_simulated, run_webdriver};
pub use scenario::{quiz_flow, simulated_quiz_page};
