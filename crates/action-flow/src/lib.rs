//! Flow Orchestration Layer
//!
//! Runs an ordered list of steps against one browser session. Each step is
//! either critical (a failure aborts the flow) or best-effort (a failure is
//! logged and the flow moves on). [`run_scoped`] owns the session and quits
//! it exactly once, whatever happened.

pub mod errors;
pub mod executor;
pub mod strategies;
pub mod types;

pub use errors::FlowError;
pub use executor::{run_scoped, DefaultFlowExecutor, FlowExecutor};
pub use strategies::{DefaultFailureHandler, FailureHandler, FailureHandlerResult};
pub use types::{ActionType, FailureStrategy, Flow, FlowResult, FlowStep, StepResult};
