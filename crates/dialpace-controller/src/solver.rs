//! The solver contract and the progressive baseline policy.

use dialpace_core::{Environment, Field};

use crate::error::SolverResult;

/// Observe an environment snapshot and predict an outbound call count.
///
/// A solver instance is constructed once and reused across many ticks.
/// `observe` re-validates the required field set on every call, then takes
/// ownership of the snapshot; the driver reclaims it with [`Solver::release`]
/// to read back `predict_adjust` and refresh the counters for the next
/// tick. Ticks must be applied strictly sequentially per instance, and no
/// instance is safe to share between concurrent trials.
pub trait Solver {
    /// Fields this solver needs present before it will predict.
    fn required(&self) -> &'static [Field];

    /// Bind `env` as the active snapshot, failing with
    /// [`SolverError::EnvironmentMismatch`](crate::SolverError::EnvironmentMismatch)
    /// if any required field is absent.
    fn observe(&mut self, env: Environment) -> SolverResult<()>;

    /// Recommend the number of outbound calls for the next interval.
    ///
    /// The value is not floored at zero; callers treat a negative
    /// recommendation as "dial nothing".
    fn predict_outgoing_calls(&mut self) -> SolverResult<i64>;

    /// The currently bound snapshot, if any.
    fn environment(&self) -> Option<&Environment>;

    /// Take back the bound snapshot (with any `predict_adjust` update the
    /// prediction wrote into it).
    fn release(&mut self) -> Option<Environment>;
}

/// Baseline pacing policy: one call per idle agent.
///
/// Stateless apart from the bound snapshot. Also serves as the fallback
/// behavior the predictive controller degrades to.
#[derive(Debug, Default)]
pub struct ProgressiveSolver {
    env: Option<Environment>,
}

impl ProgressiveSolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Solver for ProgressiveSolver {
    fn required(&self) -> &'static [Field] {
        &[Field::IdleAgents]
    }

    fn observe(&mut self, env: Environment) -> SolverResult<()> {
        env.observe_fields(self.required())?;
        self.env = Some(env);
        Ok(())
    }

    fn predict_outgoing_calls(&mut self) -> SolverResult<i64> {
        let env = self.env.as_ref().ok_or(crate::SolverError::NotObserved)?;
        let idle_agents = env.require(Field::IdleAgents)?;
        Ok(idle_agents as i64)
    }

    fn environment(&self) -> Option<&Environment> {
        self.env.as_ref()
    }

    fn release(&mut self) -> Option<Environment> {
        self.env.take()
    }
}
