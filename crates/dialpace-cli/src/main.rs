use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "dialpace",
    about = "dialpace — adaptive outbound call-pacing controller",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute one pacing decision from live metrics.
    ///
    /// Metrics are given as name=value tokens, e.g.
    /// `dialpace predict idle_agents=10 calls_total=1000 calls_answered=300
    /// calls_served=299 uptime=1000 interval=300`. All six live metrics are
    /// required; tunable constants may be overridden the same way
    /// (e.g. target_abandon_calls=0.02).
    Predict {
        /// Optional dialpace.toml tuning file layered over the defaults
        #[arg(short, long)]
        config: Option<String>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Metric and tunable assignments, name=value
        fields: Vec<String>,
    },
    /// Run the synthetic call-center simulation harness.
    Simulate {
        /// Size of the agent pool
        #[arg(long, default_value_t = 50)]
        agents: u32,
        /// Simulated seconds to run
        #[arg(long, default_value_t = 3600)]
        duration: u64,
        /// Seconds between controller ticks
        #[arg(long, default_value_t = 10)]
        interval: u64,
        /// Probability a dialed call is answered
        #[arg(long, default_value_t = 0.2)]
        p_answer: f64,
        /// RNG seed (identical seeds reproduce identical runs)
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Optional dialpace.toml tuning file
        #[arg(short, long)]
        config: Option<String>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dialpace=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Predict {
            config,
            format,
            fields,
        } => commands::predict::run(config.as_deref(), &format, &fields),
        Commands::Simulate {
            agents,
            duration,
            interval,
            p_answer,
            seed,
            config,
            format,
        } => commands::simulate::run(commands::simulate::Args {
            agents,
            duration,
            interval,
            p_answer,
            seed,
            config,
            format,
        }),
    }
}
