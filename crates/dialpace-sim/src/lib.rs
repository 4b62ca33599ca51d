//! dialpace-sim — synthetic call-center harness.
//!
//! Drives a [`PiController`](dialpace_controller::PiController) with
//! manufactured traffic: one simulated second per tick, stochastic
//! answer/serve outcomes, and a refreshed environment snapshot on every
//! control interval. Runs are fully deterministic for a given seed, so a
//! Monte-Carlo sweep is just many independent [`CallCenterSim`] instances
//! with different seeds — no state is shared between them.

pub mod sim;

pub use sim::{CallCenterSim, SimConfig, SimReport};
