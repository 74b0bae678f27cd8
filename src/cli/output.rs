//! Result printing for `--output human|json|yaml`

use std::fmt::Write as _;

use action_flow::{FlowResult, StepResult};
use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Yaml,
}

/// Print a serializable value in the structured formats, or the given
/// human rendering otherwise.
pub fn emit<T: Serialize>(value: &T, format: OutputFormat, human: impl FnOnce() -> String) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(value)?);
        }
        OutputFormat::Human => {
            print!("{}", human());
        }
    }
    Ok(())
}

fn step_marker(step: &StepResult) -> &'static str {
    match (step.success, step.tolerated) {
        (true, _) => "ok",
        (false, true) => "warn",
        (false, false) => "FAIL",
    }
}

pub fn render_human(result: &FlowResult) -> String {
    let mut out = String::new();
    let status = if result.success { "PASSED" } else { "FAILED" };
    let tolerated = result.tolerated_failures().count();

    let _ = writeln!(
        out,
        "Flow {}: {} ({} steps run, {} tolerated failure(s), {} ms)",
        result.flow_id,
        status,
        result.step_results.len(),
        tolerated,
        result.latency_ms
    );

    for step in &result.step_results {
        let _ = write!(
            out,
            "  [{:<4}] {:<16} {} ({} ms)",
            step_marker(step),
            step.step_id,
            step.description,
            step.latency_ms
        );
        if let Some(error) = &step.error {
            let _ = write!(out, ": {}", error);
        }
        out.push('\n');
    }

    if let Some(step) = &result.aborted_at {
        let _ = writeln!(
            out,
            "  aborted at '{}', {} step(s) not run",
            step, result.skipped_steps
        );
    }

    match (&result.teardown_error, result.torn_down) {
        (Some(error), _) => {
            let _ = writeln!(out, "  session teardown failed: {}", error);
        }
        (None, true) => out.push_str("  session closed\n"),
        (None, false) => {}
    }

    out
}
