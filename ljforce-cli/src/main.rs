mod config;

use clap::{Args, Parser, Subcommand, ValueEnum};
use config::RunConfig;
use ljforce_core::summary::{max_force, max_relative_diff, net_force};
use ljforce_core::{random_lattice_seeded, Accumulation, ForceKernel, KernelConfig, Validation};
use log::info;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "ljforce")]
#[command(about = "ljforce - parallel Lennard-Jones force evaluation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the forces on a random lattice configuration once
    Eval {
        #[command(flatten)]
        opts: SystemArgs,
    },
    /// Compare a single-worker evaluation against the configured workers
    Compare {
        #[command(flatten)]
        opts: SystemArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    Reduce,
    Atomic,
}

impl From<Strategy> for Accumulation {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Reduce => Accumulation::Reduce,
            Strategy::Atomic => Accumulation::Atomic,
        }
    }
}

/// Command-line overrides, applied on top of the config file
#[derive(Args)]
struct SystemArgs {
    /// Path to a TOML run configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of particles
    #[arg(short, long)]
    n: Option<usize>,
    /// Cube edge length
    #[arg(long = "box")]
    boxsize: Option<f64>,
    /// Lattice spacing for particle placement
    #[arg(long)]
    spacing: Option<f64>,
    /// Element symbol for the built-in parameter table
    #[arg(long, conflicts_with_all = ["sigma", "eps"])]
    element: Option<String>,
    #[arg(long, requires = "eps")]
    sigma: Option<f64>,
    #[arg(long, requires = "sigma")]
    eps: Option<f64>,
    /// Disable periodic boundaries
    #[arg(long)]
    open: bool,
    /// Worker threads (0 = one per logical CPU)
    #[arg(short, long)]
    workers: Option<usize>,
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,
    /// Skip pairs farther apart than this
    #[arg(long)]
    cutoff: Option<f64>,
    /// Skip input validation; degenerate input yields inf/NaN forces
    #[arg(long)]
    permissive: bool,
    #[arg(long)]
    seed: Option<u64>,
}

impl SystemArgs {
    fn resolve(&self) -> Result<RunConfig, Box<dyn std::error::Error>> {
        let mut run = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };

        let system = &mut run.system;
        if let Some(n) = self.n {
            system.n = n;
        }
        if let Some(boxsize) = self.boxsize {
            system.boxsize = boxsize;
        }
        if let Some(spacing) = self.spacing {
            system.spacing = spacing;
        }
        if let Some(element) = &self.element {
            system.element = element.clone();
            system.sigma = None;
            system.eps = None;
        }
        if self.sigma.is_some() {
            system.sigma = self.sigma;
            system.eps = self.eps;
        }
        if self.open {
            system.periodic = false;
        }
        if let Some(seed) = self.seed {
            system.seed = seed;
        }

        let kernel = &mut run.kernel;
        if let Some(workers) = self.workers {
            kernel.workers = workers;
        }
        if let Some(strategy) = self.strategy {
            kernel.accumulation = strategy.into();
        }
        if self.cutoff.is_some() {
            kernel.cutoff = self.cutoff;
        }
        if self.permissive {
            kernel.validation = Validation::Permissive;
        }

        Ok(run)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Eval { opts } => eval(&opts),
        Commands::Compare { opts } => compare(&opts),
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn setup(opts: &SystemArgs) -> Result<(RunConfig, Vec<f64>), Box<dyn std::error::Error>> {
    let run = opts.resolve()?;
    let system = &run.system;
    let positions = random_lattice_seeded(system.n, system.boxsize, system.spacing, system.seed)?;
    info!(
        "placed {} particles in a box of {} (seed {})",
        system.n, system.boxsize, system.seed
    );
    Ok((run, positions))
}

fn build_kernel(
    run: &RunConfig,
    kernel: KernelConfig,
) -> Result<ForceKernel, Box<dyn std::error::Error>> {
    let params = run.system.lj_params()?;
    Ok(ForceKernel::new(params, run.system.boundary(), kernel)?)
}

fn eval(opts: &SystemArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (run, positions) = setup(opts)?;
    let kernel = build_kernel(&run, run.kernel.clone())?;

    let start = Instant::now();
    let forces = kernel.evaluate(&positions)?;
    let elapsed = start.elapsed();

    let net = net_force(&forces);
    println!("particles = {}", run.system.n);
    println!("workers = {}", kernel.workers());
    println!("net_force = ({:e}, {:e}, {:e})", net[0], net[1], net[2]);
    println!("max_force = {:e}", max_force(&forces));
    println!("elapsed_ms = {:.3}", elapsed.as_secs_f64() * 1e3);

    Ok(())
}

fn compare(opts: &SystemArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (run, positions) = setup(opts)?;
    let serial = build_kernel(&run, run.kernel.clone().with_workers(1))?;
    let parallel = build_kernel(&run, run.kernel.clone())?;

    let start = Instant::now();
    let reference = serial.evaluate(&positions)?;
    let serial_time = start.elapsed();

    let start = Instant::now();
    let forces = parallel.evaluate(&positions)?;
    let parallel_time = start.elapsed();

    let floor = 1e-9 * max_force(&reference).max(f64::MIN_POSITIVE);
    println!("particles = {}", run.system.n);
    println!("workers = {}", parallel.workers());
    println!(
        "max_relative_diff = {:e}",
        max_relative_diff(&reference, &forces, floor)
    );
    println!("serial_ms = {:.3}", serial_time.as_secs_f64() * 1e3);
    println!("parallel_ms = {:.3}", parallel_time.as_secs_f64() * 1e3);

    Ok(())
}
