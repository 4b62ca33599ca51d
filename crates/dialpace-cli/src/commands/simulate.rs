//! Run the synthetic call-center harness and print its report.

use std::path::Path;

use dialpace_core::PacingConfig;
use dialpace_sim::{CallCenterSim, SimConfig, SimReport};

pub struct Args {
    pub agents: u32,
    pub duration: u64,
    pub interval: u64,
    pub p_answer: f64,
    pub seed: u64,
    pub config: Option<String>,
    pub format: String,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let config = SimConfig {
        agents: args.agents,
        duration_secs: args.duration,
        control_interval_secs: args.interval,
        p_answer: args.p_answer,
        seed: args.seed,
        ..SimConfig::default()
    };

    let mut sim = CallCenterSim::new(config);
    if let Some(path) = &args.config {
        let tuning = PacingConfig::from_file(Path::new(path))?;
        sim.apply_tuning(&tuning);
    }

    let report = sim.run()?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_text(&report),
    }

    Ok(())
}

fn print_text(report: &SimReport) {
    println!("calls dialed      {}", report.calls_total);
    println!("calls answered    {}", report.calls_answered);
    println!("calls served      {}", report.calls_served);
    println!("calls abandoned   {}", report.calls_abandoned);
    println!("abandon rate      {:.4}", report.abandon_rate);
    println!("peak busy agents  {}", report.peak_busy_agents);
    println!("predict_adjust    {:.4}", report.final_predict_adjust);
    println!("integrator        {:.6}", report.final_integrator);
    println!("controller branches:");
    for (reason, count) in &report.reasons {
        println!("  {reason:<22} {count}");
    }
}
