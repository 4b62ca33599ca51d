//! Environment snapshot — one observation instant of the call center.
//!
//! An [`Environment`] carries the live metrics a driver observed plus the
//! tunable constants of the pacing policy, one optional slot per
//! [`Field`]. Snapshots compose: `extend` copies every present field from
//! another snapshot, last writer wins, so defaults can be layered under
//! live CLI- or simulation-supplied values.
//!
//! The snapshot is owned by exactly one driver per tick. The controller
//! only writes `predict_adjust` back into it; carrying that field forward
//! across ticks is what gives the integral term memory.

use serde::{Deserialize, Serialize};

use crate::error::EnvironmentError;
use crate::field::Field;

/// Reference defaults for the tunable constants.
pub mod defaults {
    pub const CTR_INTEGRAL_GAIN: f64 = 0.05;
    pub const CTR_PROPORTIONAL_GAIN: f64 = 2.0;
    pub const PREDICT_ADJUST: f64 = 150.0;
    /// Five minutes, in seconds.
    pub const UPTIME_THRESHOLD: f64 = 300.0;
    pub const CALLS_THRESHOLD: f64 = 10.0;
    pub const MIN_IDLE_AGENTS: f64 = 3.0;
    pub const TARGET_ABANDON_CALLS: f64 = 0.025;
    pub const MAX_ABANDON_CALLS: f64 = 0.03;
}

/// One observation instant: live metrics plus tunable constants.
///
/// Fields are absent until supplied; a solver declares which fields it
/// requires and validates presence through [`Environment::observe_fields`]
/// before any prediction logic runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Environment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_agents: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calls_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calls_answered: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calls_served: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctr_integral_gain: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctr_proportional_gain: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predict_adjust: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calls_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_idle_agents: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_abandon_calls: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_abandon_calls: Option<f64>,
}

impl Environment {
    /// An empty snapshot with every field absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot with the tunable constants populated from
    /// [`defaults`] and every observed metric still absent.
    pub fn with_defaults() -> Self {
        let mut env = Self::new();
        env.ctr_integral_gain = Some(defaults::CTR_INTEGRAL_GAIN);
        env.ctr_proportional_gain = Some(defaults::CTR_PROPORTIONAL_GAIN);
        env.predict_adjust = Some(defaults::PREDICT_ADJUST);
        env.uptime_threshold = Some(defaults::UPTIME_THRESHOLD);
        env.calls_threshold = Some(defaults::CALLS_THRESHOLD);
        env.min_idle_agents = Some(defaults::MIN_IDLE_AGENTS);
        env.target_abandon_calls = Some(defaults::TARGET_ABANDON_CALLS);
        env.max_abandon_calls = Some(defaults::MAX_ABANDON_CALLS);
        env
    }

    /// Read one field, `None` if it has not been supplied.
    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::IdleAgents => self.idle_agents,
            Field::CallsTotal => self.calls_total,
            Field::CallsAnswered => self.calls_answered,
            Field::CallsServed => self.calls_served,
            Field::Uptime => self.uptime,
            Field::Interval => self.interval,
            Field::CtrIntegralGain => self.ctr_integral_gain,
            Field::CtrProportionalGain => self.ctr_proportional_gain,
            Field::PredictAdjust => self.predict_adjust,
            Field::UptimeThreshold => self.uptime_threshold,
            Field::CallsThreshold => self.calls_threshold,
            Field::MinIdleAgents => self.min_idle_agents,
            Field::TargetAbandonCalls => self.target_abandon_calls,
            Field::MaxAbandonCalls => self.max_abandon_calls,
        }
    }

    /// Write one field.
    pub fn set(&mut self, field: Field, value: f64) -> &mut Self {
        let slot = match field {
            Field::IdleAgents => &mut self.idle_agents,
            Field::CallsTotal => &mut self.calls_total,
            Field::CallsAnswered => &mut self.calls_answered,
            Field::CallsServed => &mut self.calls_served,
            Field::Uptime => &mut self.uptime,
            Field::Interval => &mut self.interval,
            Field::CtrIntegralGain => &mut self.ctr_integral_gain,
            Field::CtrProportionalGain => &mut self.ctr_proportional_gain,
            Field::PredictAdjust => &mut self.predict_adjust,
            Field::UptimeThreshold => &mut self.uptime_threshold,
            Field::CallsThreshold => &mut self.calls_threshold,
            Field::MinIdleAgents => &mut self.min_idle_agents,
            Field::TargetAbandonCalls => &mut self.target_abandon_calls,
            Field::MaxAbandonCalls => &mut self.max_abandon_calls,
        };
        *slot = Some(value);
        self
    }

    /// Read one field, failing with [`EnvironmentError::MissingField`] if
    /// it has not been supplied.
    pub fn require(&self, field: Field) -> Result<f64, EnvironmentError> {
        self.get(field).ok_or(EnvironmentError::MissingField(field))
    }

    /// Copy every present field from `source` into `self`, overwriting
    /// same-named fields (shallow, last writer wins). Fields absent in
    /// `source` are left untouched.
    pub fn extend(&mut self, source: &Environment) -> &mut Self {
        for field in Field::ALL {
            if let Some(value) = source.get(field) {
                self.set(field, value);
            }
        }
        self
    }

    /// Check that every field in `required` is present, before any
    /// prediction logic runs.
    pub fn observe_fields(&self, required: &[Field]) -> Result<(), EnvironmentError> {
        for field in required {
            if self.get(*field).is_none() {
                return Err(EnvironmentError::MissingField(*field));
            }
        }
        Ok(())
    }

    /// Render every present field as a `"name:value"` string, sorted
    /// lexicographically by name. Deterministic; used for diagnostics and
    /// test comparisons.
    pub fn dump(&self) -> Vec<String> {
        let mut entries: Vec<(&'static str, f64)> = Field::ALL
            .iter()
            .filter_map(|f| self.get(*f).map(|v| (f.name(), v)))
            .collect();
        entries.sort_by_key(|(name, _)| *name);
        entries
            .into_iter()
            .map(|(name, value)| format!("{name}:{value}"))
            .collect()
    }
}
