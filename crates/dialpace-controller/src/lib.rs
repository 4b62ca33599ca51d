//! dialpace-controller — pacing decision engines.
//!
//! A [`Solver`] observes an [`Environment`](dialpace_core::Environment)
//! snapshot and recommends how many outbound calls to launch in the next
//! control tick. Two policies:
//!
//! - [`ProgressiveSolver`] dials exactly one call per idle agent. Safe,
//!   conservative, and the universal fallback.
//! - [`PiController`] over-dials relative to idle agents to compensate
//!   for calls that never connect, steered by a PI feedback loop that
//!   holds abandonment near a target fraction.
//!
//! # Predictive algorithm
//!
//! ```text
//! abandon_rate    = (calls_answered - calls_served) / calls_answered
//! connection_rate = calls_answered / calls_total
//! over_dial       = idle_agents / connection_rate - idle_agents
//!
//! deviation       = target_abandon_calls - abandon_rate
//! integrator     += deviation
//! predict_adjust += Kp * deviation + Ki * integrator
//!
//! calls = trunc(idle_agents + over_dial * predict_adjust * 0.01)
//! ```
//!
//! Guard branches run before the update, in strict order: idle-agent
//! buffer, uptime and volume warm-up, disabled adjustment, excessive
//! abandonment, and the two zero-signal divisions all degrade to the
//! progressive policy (or to zero for the buffer check) instead of
//! failing. The result is deliberately not floored at zero; callers
//! treat a negative recommendation as "dial nothing".

pub mod error;
pub mod pi;
pub mod solver;

pub use error::{SolverError, SolverResult};
pub use pi::{PacingReason, PiController};
pub use solver::{ProgressiveSolver, Solver};
