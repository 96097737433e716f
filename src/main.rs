use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rust_mhets::{
    evaluator_for, read_run_config, validate, BetaSweep, CostFunction, JsonStore, LmgModel,
};

#[derive(Parser, Debug)]
#[command(version, about = "Variational Gibbs-state search over a beta sweep", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config.yml")]
    config: String,

    /// Override the configured betas (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    betas: Option<Vec<f64>>,

    /// Override the number of multi-start points
    #[arg(short, long)]
    n_starts: Option<usize>,

    /// Re-optimize betas that are already stored
    #[arg(long)]
    force: bool,

    /// Compare the stored optima with the exact thermal states
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let mut config = read_run_config(&args.config)?;
    if let Some(n) = args.n_starts {
        config.options.n_starts = n;
    }
    config.options.force |= args.force;
    config.options.validate()?;
    let betas = args.betas.unwrap_or_else(|| config.betas.values());

    info!("Model: {}, backend: {}", config.model, config.backend);
    let model = Arc::new(LmgModel::from_params(config.model)?);
    let cost_fn = CostFunction::from_configs(
        Arc::clone(&model),
        &config.options.ancilla_ansatz,
        &config.options.system_ansatz,
        evaluator_for(config.backend),
    )?;
    info!("{} variational parameters", cost_fn.parameter_count());

    let store = JsonStore::for_model(
        &config.storage_dir,
        &config.model,
        config.backend,
        config.options.budget(),
    );
    let mut sweep = BetaSweep::new(cost_fn.clone(), config.options.clone(), store)?;
    let outcome = sweep.run(&betas)?;
    info!("Results written to {}", sweep.store().path().display());

    println!("MHETS sweep for {}", config.model);
    println!("----------------------------------------");
    for record in outcome.result.records() {
        println!(
            "beta = {:8.4}  F = {:14.10}  evaluations = {:6}  converged = {}",
            record.beta, record.cost, record.n_evaluations, record.converged
        );
    }
    for multi in &outcome.multi_start {
        let (mean, std) = multi.cost_spread();
        println!(
            "beta = {:8.4}  {} starts: best #{}  mean F = {:.8} ± {:.2e}",
            multi.beta,
            multi.records.len(),
            multi.best_index,
            mean,
            std
        );
    }

    if args.validate {
        println!("----------------------------------------");
        for row in validate(&model, &cost_fn, &outcome.result)? {
            println!("{}", row);
        }
    }
    Ok(())
}
