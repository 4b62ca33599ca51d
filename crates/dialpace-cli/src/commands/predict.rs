//! One-shot pacing decision from command-line metrics.

use std::path::Path;

use serde_json::json;
use thiserror::Error;

use dialpace_controller::{PiController, Solver};
use dialpace_core::{Environment, Field, PacingConfig};

/// Malformed or incomplete `name=value` input.
///
/// Rendered as a usage hint; surfacing it through `main` terminates the
/// process with a non-zero exit instead of proceeding with partial data.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("missing required field '{}'\n\n{}", .0, usage())]
    MissingField(Field),

    #[error("unknown field '{}'\n\n{}", .0, usage())]
    UnknownField(String),

    #[error("expected name=value, got '{}'\n\n{}", .0, usage())]
    MalformedToken(String),

    #[error("value for '{}' must be a number, got '{}'\n\n{}", .name, .value, usage())]
    InvalidValue { name: String, value: String },

    #[error("observed metric '{}' must not be negative, got {}\n\n{}", .name, .value, usage())]
    NegativeMetric { name: String, value: f64 },
}

/// The usage hint: every required metric with its human-readable meaning.
fn usage() -> String {
    let mut text = String::from(
        "usage: dialpace predict <name=value>...\nrequired fields:\n",
    );
    for field in Field::OBSERVED {
        text.push_str(&format!("  {:<16} {}\n", field.name(), field.hint()));
    }
    text.push_str("tunable constants may be overridden the same way (see --help)");
    text
}

/// Parse `name=value` tokens into `env`, then verify every required
/// metric was supplied.
pub fn parse_fields(tokens: &[String], env: &mut Environment) -> Result<(), UsageError> {
    for token in tokens {
        let (name, value) = token
            .split_once('=')
            .ok_or_else(|| UsageError::MalformedToken(token.clone()))?;
        let name = name.trim();
        let field =
            Field::parse(name).ok_or_else(|| UsageError::UnknownField(name.to_string()))?;
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| UsageError::InvalidValue {
                name: name.to_string(),
                value: value.trim().to_string(),
            })?;
        if field.is_observed() && value < 0.0 {
            return Err(UsageError::NegativeMetric {
                name: name.to_string(),
                value,
            });
        }
        env.set(field, value);
    }

    for field in Field::OBSERVED {
        if env.get(field).is_none() {
            return Err(UsageError::MissingField(field));
        }
    }
    Ok(())
}

pub fn run(config: Option<&str>, format: &str, fields: &[String]) -> anyhow::Result<()> {
    let mut env = Environment::with_defaults();

    let mut integrator_limit = None;
    if let Some(path) = config {
        let tuning = PacingConfig::from_file(Path::new(path))?;
        tuning.apply(&mut env);
        integrator_limit = tuning.integrator_limit();
    }

    parse_fields(fields, &mut env)?;

    let mut controller = match integrator_limit {
        Some(limit) => PiController::with_integrator_limit(limit),
        None => PiController::new(),
    };
    controller.observe(env)?;
    let raw = controller.predict_outgoing_calls()?;
    // The controller does not floor its recommendation; acting on it, we do.
    let outgoing_calls = raw.max(0);

    match format {
        "json" => {
            let report = json!({
                "outgoing_calls": outgoing_calls,
                "raw_prediction": raw,
                "reason": controller.last_reason(),
                "environment": controller.environment().map(Environment::dump),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!("{outgoing_calls}");
        }
    }

    Ok(())
}
