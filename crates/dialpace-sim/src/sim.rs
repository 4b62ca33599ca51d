//! Tick-driven call-center simulation.
//!
//! The loop advances one simulated second at a time. Each second,
//! finished conversations free their agents; on every control interval
//! the harness refreshes the controller's environment snapshot, asks for
//! a recommendation, and launches that many dial attempts. A dial either
//! goes unanswered, is served by an idle agent for a uniformly
//! distributed talk time, or — when nobody is idle — counts as abandoned.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use anyhow::ensure;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use dialpace_controller::{PiController, Solver};
use dialpace_core::{Environment, Field, PacingConfig};

/// Knobs for one simulated run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Size of the agent pool.
    pub agents: u32,
    /// Simulated seconds to run.
    pub duration_secs: u64,
    /// Seconds between controller ticks.
    pub control_interval_secs: u64,
    /// Probability a dialed call is answered by a live customer.
    pub p_answer: f64,
    /// Shortest conversation, seconds.
    pub talk_time_min: u64,
    /// Longest conversation, seconds.
    pub talk_time_max: u64,
    /// RNG seed; identical seeds reproduce identical runs.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            agents: 50,
            duration_secs: 3600,
            control_interval_secs: 10,
            p_answer: 0.2,
            talk_time_min: 60,
            talk_time_max: 240,
            seed: 0,
        }
    }
}

/// Summary of one finished run.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub calls_total: u64,
    pub calls_answered: u64,
    pub calls_served: u64,
    pub calls_abandoned: u64,
    /// Abandoned fraction of answered calls at the end of the run.
    pub abandon_rate: f64,
    pub final_predict_adjust: f64,
    pub final_integrator: f64,
    /// Most agents simultaneously on a call.
    pub peak_busy_agents: u32,
    /// How often each controller branch fired, by reason name.
    pub reasons: BTreeMap<String, u64>,
}

/// One independent simulated call center.
///
/// Owns its environment, controller, and RNG; nothing is shared with
/// other instances, so concurrent Monte-Carlo trials are safe as long as
/// each trial constructs its own sim.
pub struct CallCenterSim {
    config: SimConfig,
    env: Environment,
    controller: PiController,
    rng: StdRng,
    /// Completion times of conversations in progress.
    talks: BinaryHeap<Reverse<u64>>,
    idle_agents: u32,
    calls_total: u64,
    calls_answered: u64,
    calls_served: u64,
    peak_busy_agents: u32,
    reasons: BTreeMap<String, u64>,
}

impl CallCenterSim {
    pub fn new(config: SimConfig) -> Self {
        let idle_agents = config.agents;
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            env: Environment::with_defaults(),
            controller: PiController::new(),
            rng,
            talks: BinaryHeap::new(),
            idle_agents,
            calls_total: 0,
            calls_answered: 0,
            calls_served: 0,
            peak_busy_agents: 0,
            reasons: BTreeMap::new(),
        }
    }

    /// Layer a tuning file over the default constants and honor its
    /// controller options.
    pub fn apply_tuning(&mut self, tuning: &PacingConfig) {
        tuning.apply(&mut self.env);
        if let Some(limit) = tuning.integrator_limit() {
            self.controller = PiController::with_integrator_limit(limit);
        }
    }

    /// Run the whole scenario and summarize it.
    pub fn run(&mut self) -> anyhow::Result<SimReport> {
        let cfg = self.config.clone();
        ensure!(cfg.agents > 0, "simulation needs at least one agent");
        ensure!(
            cfg.control_interval_secs > 0,
            "control interval must be at least one second"
        );
        ensure!(
            (0.0..=1.0).contains(&cfg.p_answer),
            "p_answer must be a probability, got {}",
            cfg.p_answer
        );
        ensure!(
            cfg.talk_time_min <= cfg.talk_time_max,
            "talk_time_min exceeds talk_time_max"
        );

        info!(
            agents = cfg.agents,
            duration_secs = cfg.duration_secs,
            control_interval_secs = cfg.control_interval_secs,
            seed = cfg.seed,
            "simulation started"
        );

        for now in 0..cfg.duration_secs {
            self.finish_talks(now);

            if now % cfg.control_interval_secs == 0 {
                let to_dial = self.tick(now)?;
                for _ in 0..to_dial {
                    self.dial(now);
                }
            }
        }

        let calls_abandoned = self.calls_answered - self.calls_served_or_in_progress();
        let abandon_rate = if self.calls_answered > 0 {
            calls_abandoned as f64 / self.calls_answered as f64
        } else {
            0.0
        };

        let report = SimReport {
            calls_total: self.calls_total,
            calls_answered: self.calls_answered,
            calls_served: self.calls_served,
            calls_abandoned,
            abandon_rate,
            final_predict_adjust: self
                .env
                .get(Field::PredictAdjust)
                .unwrap_or_default(),
            final_integrator: self.controller.integrator(),
            peak_busy_agents: self.peak_busy_agents,
            reasons: self.reasons.clone(),
        };

        info!(
            calls_total = report.calls_total,
            calls_answered = report.calls_answered,
            calls_abandoned = report.calls_abandoned,
            abandon_rate = report.abandon_rate,
            final_predict_adjust = report.final_predict_adjust,
            "simulation finished"
        );

        Ok(report)
    }

    /// One controller tick: refresh the snapshot, predict, and account
    /// for the branch taken. A negative recommendation dials nothing.
    fn tick(&mut self, now: u64) -> anyhow::Result<u64> {
        self.env
            .set(Field::IdleAgents, self.idle_agents as f64)
            .set(Field::CallsTotal, self.calls_total as f64)
            .set(Field::CallsAnswered, self.calls_answered as f64)
            .set(Field::CallsServed, self.calls_served as f64)
            .set(Field::Uptime, now as f64)
            .set(Field::Interval, self.config.control_interval_secs as f64);

        self.controller.observe(self.env.clone())?;
        let raw = self.controller.predict_outgoing_calls()?;
        if let Some(env) = self.controller.release() {
            // Carry predict_adjust forward; the integral term needs it.
            self.env = env;
        }

        let reason = self.controller.last_reason();
        *self.reasons.entry(reason.to_string()).or_insert(0) += 1;

        let to_dial = raw.max(0) as u64;
        debug!(now, raw, to_dial, %reason, idle = self.idle_agents, "controller tick");
        Ok(to_dial)
    }

    /// Launch one outbound dial attempt at second `now`.
    fn dial(&mut self, now: u64) {
        self.calls_total += 1;
        if self.rng.gen_range(0.0..1.0) >= self.config.p_answer {
            return; // never answered
        }
        self.calls_answered += 1;
        if self.idle_agents == 0 {
            // Customer picked up with nobody to talk to: abandoned.
            return;
        }
        self.idle_agents -= 1;
        let busy = self.config.agents - self.idle_agents;
        self.peak_busy_agents = self.peak_busy_agents.max(busy);
        let talk = self
            .rng
            .gen_range(self.config.talk_time_min..=self.config.talk_time_max);
        self.talks.push(Reverse(now + talk));
    }

    /// Release agents whose conversations have ended by second `now`.
    fn finish_talks(&mut self, now: u64) {
        while let Some(Reverse(done)) = self.talks.peek().copied() {
            if done > now {
                break;
            }
            self.talks.pop();
            self.idle_agents += 1;
            self.calls_served += 1;
        }
    }

    /// Served count plus conversations still in progress, so calls being
    /// handled at the end of the run do not show up as abandoned.
    fn calls_served_or_in_progress(&self) -> u64 {
        self.calls_served + self.talks.len() as u64
    }
}
