//! Statically declared field set for the pacing environment.
//!
//! Every publicly-named environment field is a variant of [`Field`], so
//! merging, dumping, and required-field checks enumerate a closed set
//! instead of inspecting types at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One named environment field: either a metric observed each tick or a
/// tunable constant of the pacing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Agents currently idle and able to take a call.
    IdleAgents,
    /// All outbound calls dialed so far.
    CallsTotal,
    /// Calls answered by a customer (served + abandoned).
    CallsAnswered,
    /// Answered calls actually handled by an agent.
    CallsServed,
    /// Seconds elapsed since the center started.
    Uptime,
    /// Seconds since the previous observation.
    Interval,
    /// Integral gain of the PI update.
    CtrIntegralGain,
    /// Proportional gain of the PI update.
    CtrProportionalGain,
    /// Multiplicative dial-rate bias, tuned by the controller each tick.
    PredictAdjust,
    /// Uptime below this stays in progressive mode.
    UptimeThreshold,
    /// Answered-call count below this stays in progressive mode.
    CallsThreshold,
    /// Do not dial at all while fewer agents than this are idle.
    MinIdleAgents,
    /// Abandonment fraction the PI update steers toward.
    TargetAbandonCalls,
    /// Abandonment fraction above which predictive pacing backs off.
    MaxAbandonCalls,
}

impl Field {
    /// Every field, duplicate-free. Enumeration order is not significant.
    pub const ALL: [Field; 14] = [
        Field::IdleAgents,
        Field::CallsTotal,
        Field::CallsAnswered,
        Field::CallsServed,
        Field::Uptime,
        Field::Interval,
        Field::CtrIntegralGain,
        Field::CtrProportionalGain,
        Field::PredictAdjust,
        Field::UptimeThreshold,
        Field::CallsThreshold,
        Field::MinIdleAgents,
        Field::TargetAbandonCalls,
        Field::MaxAbandonCalls,
    ];

    /// The six live metrics an external driver must supply every tick.
    pub const OBSERVED: [Field; 6] = [
        Field::IdleAgents,
        Field::CallsTotal,
        Field::CallsAnswered,
        Field::CallsServed,
        Field::Uptime,
        Field::Interval,
    ];

    /// Snake_case wire name, as accepted on the command line and emitted
    /// by [`Environment::dump`](crate::Environment::dump).
    pub fn name(&self) -> &'static str {
        match self {
            Field::IdleAgents => "idle_agents",
            Field::CallsTotal => "calls_total",
            Field::CallsAnswered => "calls_answered",
            Field::CallsServed => "calls_served",
            Field::Uptime => "uptime",
            Field::Interval => "interval",
            Field::CtrIntegralGain => "ctr_integral_gain",
            Field::CtrProportionalGain => "ctr_proportional_gain",
            Field::PredictAdjust => "predict_adjust",
            Field::UptimeThreshold => "uptime_threshold",
            Field::CallsThreshold => "calls_threshold",
            Field::MinIdleAgents => "min_idle_agents",
            Field::TargetAbandonCalls => "target_abandon_calls",
            Field::MaxAbandonCalls => "max_abandon_calls",
        }
    }

    /// One-line human hint, used in CLI usage output.
    pub fn hint(&self) -> &'static str {
        match self {
            Field::IdleAgents => "number of agents currently idle (integer >= 0)",
            Field::CallsTotal => "all outbound calls dialed so far (integer >= 0)",
            Field::CallsAnswered => "calls answered by a customer (integer <= calls_total)",
            Field::CallsServed => "answered calls handled by an agent (integer <= calls_answered)",
            Field::Uptime => "seconds since the call center started (>= 0)",
            Field::Interval => "seconds since the last observation (>= 0)",
            Field::CtrIntegralGain => "integral gain of the PI update",
            Field::CtrProportionalGain => "proportional gain of the PI update",
            Field::PredictAdjust => "multiplicative dial-rate bias (0 disables predictive mode)",
            Field::UptimeThreshold => "uptime below this stays in progressive mode",
            Field::CallsThreshold => "answered calls below this stays in progressive mode",
            Field::MinIdleAgents => "hold dialing while fewer agents than this are idle",
            Field::TargetAbandonCalls => "abandonment fraction to steer toward (e.g. 0.025)",
            Field::MaxAbandonCalls => "abandonment fraction that forces progressive mode (e.g. 0.03)",
        }
    }

    /// Resolve a wire name back to a field.
    pub fn parse(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Whether the field is an observed count/duration rather than a
    /// tunable constant. Observed metrics must be non-negative.
    pub fn is_observed(&self) -> bool {
        Field::OBSERVED.contains(self)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        for (i, a) in Field::ALL.iter().enumerate() {
            for b in &Field::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }

    #[test]
    fn parse_round_trips_every_field() {
        for field in Field::ALL {
            assert_eq!(Field::parse(field.name()), Some(field));
        }
        assert_eq!(Field::parse("total_agents"), None);
    }

    #[test]
    fn observed_fields_are_flagged() {
        assert!(Field::IdleAgents.is_observed());
        assert!(Field::Interval.is_observed());
        assert!(!Field::PredictAdjust.is_observed());
    }
}
