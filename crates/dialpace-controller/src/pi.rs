//! PI-feedback predictive pacing.

use dialpace_core::{Environment, Field};
use serde::Serialize;
use tracing::debug;

use crate::error::{SolverError, SolverResult};
use crate::solver::Solver;

/// Which branch the most recent prediction took.
///
/// Purely diagnostic: reading it never alters the returned call count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingReason {
    /// No prediction has run yet.
    #[default]
    Unevaluated,
    /// Fewer idle agents than `min_idle_agents`; holding all dials.
    IdleBufferLow,
    /// Uptime below `uptime_threshold`; progressive fallback.
    WarmingUpUptime,
    /// Answered calls below `calls_threshold`; progressive fallback.
    WarmingUpVolume,
    /// `predict_adjust` is zero; adjustment disabled, progressive fallback.
    AdjustDisabled,
    /// Abandonment above `max_abandon_calls`; progressive fallback.
    AbandonExcessive,
    /// No calls dialed yet; connection rate undefined, progressive fallback.
    NoCallSignal,
    /// Connection rate is zero; over-dial undefined, progressive fallback.
    NoConnectionSignal,
    /// All guards passed; the PI update ran.
    Nominal,
}

impl PacingReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PacingReason::Unevaluated => "unevaluated",
            PacingReason::IdleBufferLow => "idle_buffer_low",
            PacingReason::WarmingUpUptime => "warming_up_uptime",
            PacingReason::WarmingUpVolume => "warming_up_volume",
            PacingReason::AdjustDisabled => "adjust_disabled",
            PacingReason::AbandonExcessive => "abandon_excessive",
            PacingReason::NoCallSignal => "no_call_signal",
            PacingReason::NoConnectionSignal => "no_connection_signal",
            PacingReason::Nominal => "nominal",
        }
    }
}

impl std::fmt::Display for PacingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Predictive pacing controller.
///
/// Wraps the progressive policy with a PI feedback loop on the abandonment
/// rate. The `integrator` is the only cross-tick memory the controller
/// itself holds; `predict_adjust` lives in the environment so the driver
/// can persist and inspect it between ticks. The integrator accumulates
/// without bound unless an explicit limit is configured.
#[derive(Debug, Default)]
pub struct PiController {
    env: Option<Environment>,
    integrator: f64,
    integrator_limit: Option<f64>,
    last_reason: PacingReason,
}

impl PiController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Like [`PiController::new`], but clamps the integrator to
    /// `±limit` after each update (anti-windup experiment).
    pub fn with_integrator_limit(limit: f64) -> Self {
        Self {
            integrator_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Accumulated deviation across all nominal ticks so far.
    pub fn integrator(&self) -> f64 {
        self.integrator
    }

    /// The branch taken by the most recent prediction.
    pub fn last_reason(&self) -> PacingReason {
        self.last_reason
    }

    fn fallback(&mut self, reason: PacingReason, idle_agents: f64) -> i64 {
        self.last_reason = reason;
        idle_agents as i64
    }
}

impl Solver for PiController {
    fn required(&self) -> &'static [Field] {
        &Field::ALL
    }

    fn observe(&mut self, env: Environment) -> SolverResult<()> {
        env.observe_fields(self.required())?;
        self.env = Some(env);
        Ok(())
    }

    fn predict_outgoing_calls(&mut self) -> SolverResult<i64> {
        let env = self.env.as_mut().ok_or(SolverError::NotObserved)?;

        let idle_agents = env.require(Field::IdleAgents)?;
        let calls_total = env.require(Field::CallsTotal)?;
        let calls_answered = env.require(Field::CallsAnswered)?;
        let calls_served = env.require(Field::CallsServed)?;
        let uptime = env.require(Field::Uptime)?;
        let min_idle_agents = env.require(Field::MinIdleAgents)?;
        let uptime_threshold = env.require(Field::UptimeThreshold)?;
        let calls_threshold = env.require(Field::CallsThreshold)?;
        let predict_adjust = env.require(Field::PredictAdjust)?;
        let target_abandon = env.require(Field::TargetAbandonCalls)?;
        let max_abandon = env.require(Field::MaxAbandonCalls)?;
        let kp = env.require(Field::CtrProportionalGain)?;
        let ki = env.require(Field::CtrIntegralGain)?;

        if calls_total < calls_answered {
            return Err(SolverError::InvalidObservation {
                calls_total,
                calls_answered,
            });
        }

        if idle_agents < min_idle_agents {
            self.last_reason = PacingReason::IdleBufferLow;
            debug!(idle_agents, min_idle_agents, "holding dials: idle-agent buffer too low");
            return Ok(0);
        }

        if uptime < uptime_threshold {
            debug!(uptime, uptime_threshold, "progressive: uptime below threshold");
            return Ok(self.fallback(PacingReason::WarmingUpUptime, idle_agents));
        }

        if calls_answered < calls_threshold {
            debug!(calls_answered, calls_threshold, "progressive: answered volume below threshold");
            return Ok(self.fallback(PacingReason::WarmingUpVolume, idle_agents));
        }

        if predict_adjust == 0.0 {
            debug!("progressive: predict_adjust is zero, adjustment disabled");
            return Ok(self.fallback(PacingReason::AdjustDisabled, idle_agents));
        }

        let abandon_rate = if calls_answered > 0.0 {
            (calls_answered - calls_served) / calls_answered
        } else {
            0.0
        };
        if abandon_rate > max_abandon {
            debug!(abandon_rate, max_abandon, "progressive: abandonment above ceiling");
            return Ok(self.fallback(PacingReason::AbandonExcessive, idle_agents));
        }

        if calls_total == 0.0 {
            debug!("progressive: no calls dialed yet");
            return Ok(self.fallback(PacingReason::NoCallSignal, idle_agents));
        }

        let connection_rate = calls_answered / calls_total;
        if connection_rate == 0.0 {
            debug!("progressive: connection rate is zero");
            return Ok(self.fallback(PacingReason::NoConnectionSignal, idle_agents));
        }

        let over_dial = idle_agents / connection_rate - idle_agents;

        let deviation = target_abandon - abandon_rate;
        let p_value = kp * deviation;

        self.integrator += deviation;
        if let Some(limit) = self.integrator_limit {
            self.integrator = self.integrator.clamp(-limit, limit);
        }
        let i_value = self.integrator * ki;

        let adjusted = predict_adjust + p_value + i_value;
        env.set(Field::PredictAdjust, adjusted);

        let calls = (idle_agents + over_dial * adjusted * 0.01).trunc() as i64;

        self.last_reason = PacingReason::Nominal;
        debug!(
            abandon_rate,
            connection_rate,
            over_dial,
            deviation,
            integrator = self.integrator,
            predict_adjust = adjusted,
            calls,
            "pi update applied"
        );

        Ok(calls)
    }

    fn environment(&self) -> Option<&Environment> {
        self.env.as_ref()
    }

    fn release(&mut self) -> Option<Environment> {
        self.env.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A warm, in-range snapshot: every guard passes and the PI update runs.
    fn nominal_env() -> Environment {
        let mut env = Environment::with_defaults();
        env.set(Field::IdleAgents, 10.0);
        env.set(Field::CallsTotal, 1000.0);
        env.set(Field::CallsAnswered, 300.0);
        env.set(Field::CallsServed, 299.0);
        env.set(Field::Uptime, 1000.0);
        env.set(Field::Interval, 300.0);
        env
    }

    fn observed(env: Environment) -> PiController {
        let mut controller = PiController::new();
        controller.observe(env).unwrap();
        controller
    }

    #[test]
    fn observe_rejects_partial_environment() {
        let mut env = Environment::with_defaults();
        env.set(Field::IdleAgents, 10.0);
        // calls_total and friends never supplied.
        let mut controller = PiController::new();
        let err = controller.observe(env).unwrap_err();
        assert!(matches!(err, SolverError::EnvironmentMismatch(_)));
    }

    #[test]
    fn observe_revalidates_every_call() {
        let mut controller = observed(nominal_env());
        // A later, incomplete snapshot must be rejected even though a
        // complete one was accepted before.
        let err = controller.observe(Environment::with_defaults()).unwrap_err();
        assert_eq!(
            err,
            SolverError::EnvironmentMismatch(Field::IdleAgents)
        );
    }

    #[test]
    fn invalid_observation_when_answered_exceeds_total() {
        let mut env = nominal_env();
        env.set(Field::CallsTotal, 5.0);
        env.set(Field::CallsAnswered, 10.0);
        let mut controller = observed(env);
        assert_eq!(
            controller.predict_outgoing_calls().unwrap_err(),
            SolverError::InvalidObservation {
                calls_total: 5.0,
                calls_answered: 10.0,
            }
        );
    }

    #[test]
    fn invalid_observation_wins_over_other_guards() {
        // Even a snapshot that would trip the idle-agent guard first must
        // fail structurally.
        let mut env = nominal_env();
        env.set(Field::IdleAgents, 0.0);
        env.set(Field::CallsTotal, 5.0);
        env.set(Field::CallsAnswered, 10.0);
        let mut controller = observed(env);
        assert!(matches!(
            controller.predict_outgoing_calls(),
            Err(SolverError::InvalidObservation { .. })
        ));
    }

    #[test]
    fn holds_dials_below_idle_buffer() {
        let mut env = nominal_env();
        env.set(Field::IdleAgents, 2.0); // min_idle_agents defaults to 3
        let mut controller = observed(env);
        assert_eq!(controller.predict_outgoing_calls().unwrap(), 0);
        assert_eq!(controller.last_reason(), PacingReason::IdleBufferLow);
    }

    #[test]
    fn progressive_while_uptime_below_threshold() {
        let mut env = nominal_env();
        env.set(Field::Uptime, 300.0);
        env.set(Field::UptimeThreshold, 600.0);
        env.set(Field::IdleAgents, 100.0);
        let mut controller = observed(env);
        assert_eq!(controller.predict_outgoing_calls().unwrap(), 100);
        assert_eq!(controller.last_reason(), PacingReason::WarmingUpUptime);
    }

    #[test]
    fn progressive_while_volume_below_threshold() {
        let mut env = nominal_env();
        env.set(Field::CallsAnswered, 300.0);
        env.set(Field::CallsThreshold, 600.0);
        env.set(Field::IdleAgents, 100.0);
        let mut controller = observed(env);
        assert_eq!(controller.predict_outgoing_calls().unwrap(), 100);
        assert_eq!(controller.last_reason(), PacingReason::WarmingUpVolume);
    }

    #[test]
    fn progressive_when_adjust_disabled() {
        let mut env = nominal_env();
        env.set(Field::PredictAdjust, 0.0);
        env.set(Field::IdleAgents, 100.0);
        let mut controller = observed(env);
        assert_eq!(controller.predict_outgoing_calls().unwrap(), 100);
        assert_eq!(controller.last_reason(), PacingReason::AdjustDisabled);
        // The integrator must not move on a fallback tick.
        assert_eq!(controller.integrator(), 0.0);
    }

    #[test]
    fn progressive_when_abandonment_excessive() {
        let mut env = nominal_env();
        env.set(Field::CallsAnswered, 1000.0);
        env.set(Field::CallsServed, 1.0); // abandon rate ~0.999
        env.set(Field::IdleAgents, 100.0);
        let mut controller = observed(env);
        assert_eq!(controller.predict_outgoing_calls().unwrap(), 100);
        assert_eq!(controller.last_reason(), PacingReason::AbandonExcessive);
    }

    #[test]
    fn progressive_when_no_calls_dialed() {
        let mut env = nominal_env();
        env.set(Field::CallsTotal, 0.0);
        env.set(Field::CallsAnswered, 0.0);
        env.set(Field::CallsServed, 0.0);
        env.set(Field::CallsThreshold, 0.0);
        let mut controller = observed(env);
        assert_eq!(controller.predict_outgoing_calls().unwrap(), 10);
        assert_eq!(controller.last_reason(), PacingReason::NoCallSignal);
    }

    #[test]
    fn progressive_when_nothing_answered() {
        let mut env = nominal_env();
        env.set(Field::CallsAnswered, 0.0);
        env.set(Field::CallsServed, 0.0);
        env.set(Field::CallsThreshold, 0.0);
        let mut controller = observed(env);
        assert_eq!(controller.predict_outgoing_calls().unwrap(), 10);
        assert_eq!(controller.last_reason(), PacingReason::NoConnectionSignal);
    }

    #[test]
    fn nominal_scenario_matches_algorithm() {
        // idle=10, total=1000, answered=300, served=299, defaults.
        //   abandon_rate    = 1/300
        //   deviation       = 0.025 - 1/300  ≈ 0.0216667
        //   predict_adjust  → 150 + 2.0*dev + 0.05*dev ≈ 150.0444
        //   connection_rate = 0.3, over_dial = 10/0.3 - 10 ≈ 23.3333
        //   calls           = trunc(10 + 23.3333 * 1.500444) = 45
        let mut controller = observed(nominal_env());
        assert_eq!(controller.predict_outgoing_calls().unwrap(), 45);
        assert_eq!(controller.last_reason(), PacingReason::Nominal);

        let deviation = 0.025 - 1.0 / 300.0;
        assert!((controller.integrator() - deviation).abs() < 1e-12);

        let adjust = controller
            .environment()
            .and_then(|e| e.get(Field::PredictAdjust))
            .unwrap();
        let expected = 150.0 + 2.0 * deviation + 0.05 * deviation;
        assert!((adjust - expected).abs() < 1e-9);
    }

    #[test]
    fn repeated_nominal_calls_accumulate_the_same_deviation() {
        // With an unmodified snapshot, each call adds the same deviation
        // to the integrator and keeps moving predict_adjust, so a bare
        // second call generally returns a different count.
        let mut controller = observed(nominal_env());
        let deviation = 0.025 - 1.0 / 300.0;

        let first = controller.predict_outgoing_calls().unwrap();
        assert!((controller.integrator() - deviation).abs() < 1e-12);

        let second = controller.predict_outgoing_calls().unwrap();
        assert!((controller.integrator() - 2.0 * deviation).abs() < 1e-12);

        // predict_adjust grew between calls, so the recommendation grew.
        assert!(second >= first);
        let adjust = controller
            .environment()
            .and_then(|e| e.get(Field::PredictAdjust))
            .unwrap();
        assert!(adjust > 150.0);
    }

    #[test]
    fn negative_adjust_trend_is_not_clamped() {
        // Steer predict_adjust negative: a large sustained abandonment
        // deviation with a big proportional gain drives the bias below
        // zero, and the controller reports the raw negative count.
        let mut env = nominal_env();
        env.set(Field::CallsTotal, 2000.0); // connection rate 0.5 → over_dial 10
        env.set(Field::CallsAnswered, 1000.0);
        env.set(Field::CallsServed, 971.0); // abandon 0.029, under the 0.03 cap
        env.set(Field::CtrProportionalGain, 40000.0);
        env.set(Field::PredictAdjust, 1.0);
        let mut controller = observed(env);
        // deviation = 0.025 - 0.029 = -0.004 → P = -160 → adjust ≈ -159
        let calls = controller.predict_outgoing_calls().unwrap();
        assert!(calls < 0, "expected a raw negative recommendation, got {calls}");
    }

    #[test]
    fn integrator_limit_clamps_when_configured() {
        let mut controller = PiController::with_integrator_limit(0.01);
        controller.observe(nominal_env()).unwrap();
        controller.predict_outgoing_calls().unwrap();
        controller.predict_outgoing_calls().unwrap();
        // Two deviations of ~0.0217 would reach ~0.043 unbounded.
        assert!(controller.integrator() <= 0.01);
    }

    #[test]
    fn release_carries_predict_adjust_forward() {
        let mut controller = observed(nominal_env());
        controller.predict_outgoing_calls().unwrap();
        let env = controller.release().unwrap();
        assert!(env.get(Field::PredictAdjust).unwrap() > 150.0);

        // Next tick: the driver re-observes the same snapshot and the
        // integral memory persists in the controller.
        let before = controller.integrator();
        controller.observe(env).unwrap();
        controller.predict_outgoing_calls().unwrap();
        assert!(controller.integrator() > before);
    }
}
