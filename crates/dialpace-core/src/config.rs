//! dialpace.toml tuning-file parser.
//!
//! A tuning file can override any policy constant and switch on the
//! optional integrator clamp:
//!
//! ```toml
//! [tuning]
//! target_abandon_calls = 0.02
//! predict_adjust = 120.0
//!
//! [controller]
//! integrator_limit = 500.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::env::Environment;
use crate::field::Field;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PacingConfig {
    pub tuning: Option<TuningConfig>,
    pub controller: Option<ControllerConfig>,
}

/// Overrides for the tunable environment constants. Absent entries keep
/// whatever the environment already carries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TuningConfig {
    pub ctr_integral_gain: Option<f64>,
    pub ctr_proportional_gain: Option<f64>,
    pub predict_adjust: Option<f64>,
    pub uptime_threshold: Option<f64>,
    pub calls_threshold: Option<f64>,
    pub min_idle_agents: Option<f64>,
    pub target_abandon_calls: Option<f64>,
    pub max_abandon_calls: Option<f64>,
}

/// Controller-side options that are not environment fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Clamp the PI integrator to `±integrator_limit`. Off when absent;
    /// the reference behavior accumulates without bound.
    pub integrator_limit: Option<f64>,
}

impl PacingConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PacingConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Layer the tuning overrides onto `env`, last writer wins.
    pub fn apply(&self, env: &mut Environment) {
        let Some(tuning) = &self.tuning else {
            return;
        };
        let overrides = [
            (Field::CtrIntegralGain, tuning.ctr_integral_gain),
            (Field::CtrProportionalGain, tuning.ctr_proportional_gain),
            (Field::PredictAdjust, tuning.predict_adjust),
            (Field::UptimeThreshold, tuning.uptime_threshold),
            (Field::CallsThreshold, tuning.calls_threshold),
            (Field::MinIdleAgents, tuning.min_idle_agents),
            (Field::TargetAbandonCalls, tuning.target_abandon_calls),
            (Field::MaxAbandonCalls, tuning.max_abandon_calls),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                env.set(field, value);
            }
        }
    }

    /// The configured integrator clamp, if any.
    pub fn integrator_limit(&self) -> Option<f64> {
        self.controller.as_ref().and_then(|c| c.integrator_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal() {
        let config: PacingConfig = toml::from_str("").unwrap();
        assert!(config.tuning.is_none());
        assert_eq!(config.integrator_limit(), None);
    }

    #[test]
    fn apply_overrides_defaults() {
        let toml_str = r#"
[tuning]
target_abandon_calls = 0.02
predict_adjust = 120.0

[controller]
integrator_limit = 500.0
"#;
        let config: PacingConfig = toml::from_str(toml_str).unwrap();
        let mut env = Environment::with_defaults();
        config.apply(&mut env);

        assert_eq!(env.get(Field::TargetAbandonCalls), Some(0.02));
        assert_eq!(env.get(Field::PredictAdjust), Some(120.0));
        // Untouched constants keep their defaults.
        assert_eq!(env.get(Field::MaxAbandonCalls), Some(0.03));
        assert_eq!(config.integrator_limit(), Some(500.0));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = PacingConfig {
            tuning: Some(TuningConfig {
                min_idle_agents: Some(5.0),
                ..Default::default()
            }),
            controller: None,
        };
        let rendered = config.to_toml_string().unwrap();
        let parsed: PacingConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(
            parsed.tuning.and_then(|t| t.min_idle_agents),
            Some(5.0)
        );
    }
}
