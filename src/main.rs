use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use dual_arm_sampling::experiment::ExperimentConfig;
use dual_arm_sampling::utils::dump_configuration;

/// Samples collision-free grasp configurations of the active arm over the paper and scores
/// them by the clearance to the companion arm.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Experiment description (YAML). Built-in defaults are used if not given.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of configurations to generate, overrides the file.
    #[arg(short = 'n', long)]
    samples: Option<usize>,

    /// Random seed, overrides the file.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Skip the clearance evaluation.
    #[arg(long)]
    no_evaluate: bool,

    /// Debug output (RUST_LOG takes precedence).
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = match &args.config {
        Some(path) => ExperimentConfig::from_yaml_file(path)
            .with_context(|| format!("Reading {}", path.display()))?,
        None => ExperimentConfig::default(),
    };
    if let Some(samples) = args.samples {
        config.samples = samples;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
        config.planner.seed = Some(seed);
    }
    if args.no_evaluate {
        config.evaluate = false;
    }

    let result = config.run().context("Experiment failed")?;

    println!("Accepted {} configurations after {} attempts (degrees):",
             result.configurations.len(), result.stats.attempts);
    for (i, configuration) in result.configurations.iter().enumerate() {
        print!("{:>3}: ", i);
        dump_configuration(configuration);
    }
    if let Some(scores) = &result.scores {
        println!("Clearance scores:");
        for (i, score) in scores.iter().enumerate() {
            println!("{:>3}: {:.4}", i, score);
        }
    }
    Ok(())
}
