//! Ant System TSP Solver - Command Line Interface
//!
//! Solves Euclidean TSP instances with the Ant System metaheuristic.

use ant_system_tsp::benchmark::{load_instances_from_dir, Benchmark, BenchmarkConfig};
use ant_system_tsp::heuristics::ant_system::{AntSystem, AntSystemConfig};
use ant_system_tsp::instance::TspInstance;
use ant_system_tsp::visualization::Visualizer;
use ant_system_tsp::Result;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ant-system-tsp")]
#[command(version = "1.0")]
#[command(about = "Ant System metaheuristic for the Euclidean TSP")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one instance
    Solve {
        #[command(flatten)]
        source: InstanceSource,

        #[command(flatten)]
        params: SolverParams,

        /// Write the result record as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the convergence trace as CSV
        #[arg(long)]
        trace: Option<PathBuf>,

        /// Write `<prefix>.tour.svg` and `<prefix>.convergence.svg`
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run several seeds on one instance or a directory of instances
    Benchmark {
        /// Directory containing `.tsp` files
        #[arg(short, long, conflicts_with_all = ["instance", "random"])]
        dir: Option<PathBuf>,

        #[command(flatten)]
        source: InstanceSource,

        #[command(flatten)]
        params: SolverParams,

        /// Number of runs per instance
        #[arg(short, long, default_value = "10")]
        runs: usize,

        /// Output directory for results
        #[arg(long, default_value = "results")]
        output: PathBuf,

        /// Maximum instance size
        #[arg(long)]
        max_size: Option<usize>,
    },

    /// Analyze an instance
    Analyze {
        #[command(flatten)]
        source: InstanceSource,
    },
}

#[derive(Args, Debug)]
struct InstanceSource {
    /// Path to a TSPLIB instance file
    #[arg(short, long)]
    instance: Option<PathBuf>,

    /// Generate this many uniform random cities instead of loading a file
    #[arg(long)]
    random: Option<usize>,

    /// Lower coordinate bound for random instances
    #[arg(long, default_value = "0")]
    min_coord: f64,

    /// Upper coordinate bound for random instances
    #[arg(long, default_value = "100")]
    max_coord: f64,

    /// Seed for random instances
    #[arg(long, default_value = "0")]
    instance_seed: u64,
}

impl InstanceSource {
    fn load(&self) -> Result<TspInstance> {
        match (&self.instance, self.random) {
            (Some(path), _) => TspInstance::from_file(path),
            (None, Some(n)) => TspInstance::random(n, self.min_coord, self.max_coord, self.instance_seed),
            (None, None) => Err(ant_system_tsp::AntSystemError::InvalidInput(
                "either --instance or --random is required".to_string(),
            )),
        }
    }
}

#[derive(Args, Debug)]
struct SolverParams {
    /// JSON configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ants
    #[arg(long)]
    ants: Option<usize>,

    /// Number of iterations
    #[arg(long)]
    iterations: Option<usize>,

    /// Pheromone importance
    #[arg(long)]
    alpha: Option<f64>,

    /// Heuristic importance
    #[arg(long)]
    beta: Option<f64>,

    /// Evaporation rate, in (0, 1)
    #[arg(long)]
    rho: Option<f64>,

    /// Deposit constant
    #[arg(long)]
    q: Option<f64>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Build ants in parallel
    #[arg(long)]
    parallel: bool,
}

impl SolverParams {
    fn to_config(&self) -> Result<AntSystemConfig> {
        let mut config = match &self.config {
            Some(path) => AntSystemConfig::from_json_file(path)?,
            None => AntSystemConfig::default(),
        };

        if let Some(v) = self.ants {
            config.num_ants = v;
        }
        if let Some(v) = self.iterations {
            config.max_iterations = v;
        }
        if let Some(v) = self.alpha {
            config.alpha = v;
        }
        if let Some(v) = self.beta {
            config.beta = v;
        }
        if let Some(v) = self.rho {
            config.evaporation_rate = v;
        }
        if let Some(v) = self.q {
            config.q = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if self.parallel {
            config.parallel = true;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Solve { source, params, output, trace, svg, verbose } => {
            solve_instance(&source, &params, output, trace, svg, verbose)
        }

        Commands::Benchmark { dir, source, params, runs, output, max_size } => {
            run_benchmark(dir, &source, &params, runs, &output, max_size)
        }

        Commands::Analyze { source } => analyze_instance(&source),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn solve_instance(
    source: &InstanceSource,
    params: &SolverParams,
    output: Option<PathBuf>,
    trace: Option<PathBuf>,
    svg: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let instance = source.load()?;
    let config = params.to_config()?;

    if verbose {
        println!("{}", instance.statistics());
        println!("Parameters: {:?}", config);
    }

    println!("Solving {} (n={}) with Ant System...", instance.name, instance.dimension());

    let mut solver = AntSystem::new(instance.clone(), config)?;
    let result = solver.run()?;

    println!("\n========== Results ==========");
    println!("Length: {:.4}", result.length);
    println!("Iterations: {}", result.iterations);
    if let Some(it) = result.iteration_of_best() {
        println!("Best found at iteration: {}", it);
    }
    println!("Time: {:.4}s", result.computation_time);

    if verbose {
        println!("\nTour: {:?}", result.tour);
    }

    if let Some(path) = output {
        result.save_json(&path)?;
        println!("Result saved to {:?}", path);
    }

    if let Some(path) = trace {
        result.export_trace_csv(&path)?;
        println!("Convergence trace saved to {:?}", path);
    }

    if let Some(prefix) = svg {
        let viz = Visualizer::new();

        let tour_path = with_suffix(&prefix, "tour.svg");
        viz.save_svg(&viz.generate_tour_svg(&instance, &result), &tour_path)?;
        println!("Tour saved to {:?}", tour_path);

        let curve_path = with_suffix(&prefix, "convergence.svg");
        viz.save_svg(&viz.generate_convergence_svg(&result), &curve_path)?;
        println!("Convergence curve saved to {:?}", curve_path);
    }

    Ok(())
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

fn run_benchmark(
    dir: Option<PathBuf>,
    source: &InstanceSource,
    params: &SolverParams,
    runs: usize,
    output: &Path,
    max_size: Option<usize>,
) -> Result<()> {
    let mut instances = match dir {
        Some(dir) => {
            println!("Loading instances from {:?}...", dir);
            load_instances_from_dir(&dir)
        }
        None => vec![source.load()?],
    };

    if let Some(max) = max_size {
        instances.retain(|i| i.dimension() <= max);
    }

    println!("Found {} instances", instances.len());

    if instances.is_empty() {
        eprintln!("No instances found!");
        return Ok(());
    }

    std::fs::create_dir_all(output)?;

    let config = BenchmarkConfig {
        num_runs: runs,
        base_seed: params.seed.unwrap_or(0),
        solver: params.to_config()?,
    };
    let mut benchmark = Benchmark::new(config);

    let progress = ProgressBar::new((instances.len() * runs) as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for instance in &instances {
        progress.set_message(format!("{} (n={})", instance.name, instance.dimension()));
        for run in 0..runs {
            benchmark.run_single(instance, run)?;
            progress.inc(1);
        }
    }
    progress.finish_and_clear();

    let results_path = output.join("results.csv");
    benchmark.export_to_csv(&results_path)?;
    println!("Results exported to {:?}", results_path);

    let stats_path = output.join("statistics.csv");
    benchmark.export_statistics_csv(&stats_path)?;
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = output.join("report.txt");
    std::fs::write(&report_path, &report)?;
    println!("Report saved to {:?}", report_path);

    Ok(())
}

fn analyze_instance(source: &InstanceSource) -> Result<()> {
    let instance = source.load()?;

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    let quick = AntSystemConfig {
        num_ants: 10,
        max_iterations: 20,
        ..Default::default()
    };
    let result = AntSystem::new(instance, quick)?.run()?;

    println!("Quick Solution Estimate:");
    println!("  Ant System (10 ants, 20 iterations): {:.2}", result.length);

    Ok(())
}
