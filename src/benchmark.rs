//! Benchmarking and experimentation module.
//!
//! Runs the Ant System several times per instance with consecutive seeds,
//! collects per-run results and summarizes them per instance.

use crate::error::Result;
use crate::heuristics::ant_system::{AntSystem, AntSystemConfig};
use crate::instance::TspInstance;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::Path;

/// Result of a single run on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Instance name
    pub instance: String,
    /// Number of cities
    pub dimension: usize,
    /// Run number
    pub run: usize,
    /// Seed used for this run
    pub seed: u64,
    /// Best tour length
    pub length: f64,
    /// Iteration at which the best length was first reached
    pub iteration_of_best: Option<usize>,
    /// Computation time in seconds
    pub time: f64,
    /// Gap to best known in percent (if available)
    pub gap_to_best: Option<f64>,
}

/// Aggregated statistics over all runs on one instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatistics {
    pub instance: String,
    pub dimension: usize,
    pub num_runs: usize,
    pub best_length: f64,
    pub mean_length: f64,
    pub worst_length: f64,
    /// Sample standard deviation of the lengths (0 for a single run)
    pub std_length: f64,
    pub avg_time: f64,
    pub avg_gap: Option<f64>,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of runs per instance
    pub num_runs: usize,
    /// Seed of the first run; run `k` uses `base_seed + k`
    pub base_seed: u64,
    /// Solver parameters shared by every run (its seed is overridden)
    pub solver: AntSystemConfig,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            base_seed: 0,
            solver: AntSystemConfig::default(),
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<RunResult>,
    best_known: HashMap<String, f64>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
            best_known: HashMap::new(),
        }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Set best known tour length for an instance
    pub fn set_best_known(&mut self, instance_name: &str, length: f64) {
        self.best_known.insert(instance_name.to_string(), length);
    }

    /// Run the solver once with seed `base_seed + run` and record the result
    pub fn run_single(&mut self, instance: &TspInstance, run: usize) -> Result<&RunResult> {
        let seed = self.config.base_seed.wrapping_add(run as u64);
        let solver_config = AntSystemConfig {
            seed,
            ..self.config.solver.clone()
        };

        let mut solver = AntSystem::new(instance.clone(), solver_config)?;
        let solution = solver.run()?;

        let gap_to_best = self
            .best_known
            .get(&instance.name)
            .map(|&best| (solution.length - best) / best * 100.0);

        self.results.push(RunResult {
            instance: instance.name.clone(),
            dimension: instance.dimension(),
            run,
            seed,
            length: solution.length,
            iteration_of_best: solution.iteration_of_best(),
            time: solution.computation_time,
            gap_to_best,
        });

        log::debug!("{} run {}: length {:.4}", instance.name, run, solution.length);

        Ok(&self.results[self.results.len() - 1])
    }

    /// Run all configured runs on one instance
    pub fn run_instance(&mut self, instance: &TspInstance) -> Result<()> {
        log::info!("Running benchmark on instance: {}", instance.name);

        for run in 0..self.config.num_runs {
            self.run_single(instance, run)?;
        }
        Ok(())
    }

    /// Run benchmark on multiple instances
    pub fn run_on_instances(&mut self, instances: &[TspInstance]) -> Result<()> {
        for instance in instances {
            self.run_instance(instance)?;
        }
        Ok(())
    }

    /// Compute statistics for each instance, ordered by instance name
    pub fn compute_statistics(&self) -> Vec<RunStatistics> {
        let mut by_instance: BTreeMap<&str, Vec<&RunResult>> = BTreeMap::new();
        for result in &self.results {
            by_instance.entry(result.instance.as_str()).or_default().push(result);
        }

        by_instance
            .into_iter()
            .map(|(name, runs)| {
                let lengths: Vec<f64> = runs.iter().map(|r| r.length).collect();
                let times: Vec<f64> = runs.iter().map(|r| r.time).collect();
                let gaps: Vec<f64> = runs.iter().filter_map(|r| r.gap_to_best).collect();

                let std_length = if lengths.len() > 1 {
                    Statistics::std_dev(lengths.iter())
                } else {
                    0.0
                };

                RunStatistics {
                    instance: name.to_string(),
                    dimension: runs[0].dimension,
                    num_runs: runs.len(),
                    best_length: Statistics::min(lengths.iter()),
                    mean_length: Statistics::mean(lengths.iter()),
                    worst_length: Statistics::max(lengths.iter()),
                    std_length,
                    avg_time: Statistics::mean(times.iter()),
                    avg_gap: if gaps.is_empty() {
                        None
                    } else {
                        Some(Statistics::mean(gaps.iter()))
                    },
                }
            })
            .collect()
    }

    /// Export per-run results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("       Ant System Benchmark Report\n");
        report.push_str("========================================\n\n");

        let solver = &self.config.solver;
        report.push_str(&format!(
            "ants={} iterations={} alpha={} beta={} rho={} Q={}\n\n",
            solver.num_ants,
            solver.max_iterations,
            solver.alpha,
            solver.beta,
            solver.evaporation_rate,
            solver.q
        ));

        report.push_str(&format!(
            "{:<20} {:>6} {:>6} {:>12} {:>12} {:>12} {:>10} {:>10} {:>10}\n",
            "Instance", "n", "Runs", "Best", "Mean", "Worst", "Std", "Avg Gap%", "Avg Time"
        ));
        report.push_str("-".repeat(106).as_str());
        report.push('\n');

        for stat in self.compute_statistics() {
            let gap_str = stat
                .avg_gap
                .map(|g| format!("{:.2}%", g))
                .unwrap_or_else(|| "-".to_string());

            report.push_str(&format!(
                "{:<20} {:>6} {:>6} {:>12.2} {:>12.2} {:>12.2} {:>10.2} {:>10} {:>10.4}\n",
                stat.instance,
                stat.dimension,
                stat.num_runs,
                stat.best_length,
                stat.mean_length,
                stat.worst_length,
                stat.std_length,
                gap_str,
                stat.avg_time
            ));
        }

        report
    }

    /// Get all results
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }

    /// Get best known values
    pub fn best_known(&self) -> &HashMap<String, f64> {
        &self.best_known
    }
}

/// Helper function to load every `.tsp` instance from a directory
pub fn load_instances_from_dir<P: AsRef<Path>>(dir: P) -> Vec<TspInstance> {
    let mut instances = Vec::new();

    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "tsp").unwrap_or(false) {
                match TspInstance::from_file(&path) {
                    Ok(instance) => instances.push(instance),
                    Err(e) => log::warn!("skipping {:?}: {}", path, e),
                }
            }
        }
    }

    // Sort by dimension
    instances.sort_by_key(|i| i.dimension());

    instances
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(num_runs: usize) -> BenchmarkConfig {
        BenchmarkConfig {
            num_runs,
            base_seed: 10,
            solver: AntSystemConfig {
                num_ants: 5,
                max_iterations: 20,
                ..Default::default()
            },
        }
    }

    fn square() -> TspInstance {
        TspInstance::from_coordinates("square", &[0.0, 0.0, 1.0, 1.0], &[0.0, 1.0, 1.0, 0.0])
            .unwrap()
    }

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_runs, 5);
    }

    #[test]
    fn test_runs_use_consecutive_seeds() {
        let mut benchmark = Benchmark::new(small_config(3));
        benchmark.run_instance(&square()).unwrap();

        let seeds: Vec<u64> = benchmark.results().iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![10, 11, 12]);
    }

    #[test]
    fn test_statistics_and_gap() {
        let mut benchmark = Benchmark::new(small_config(4));
        benchmark.set_best_known("square", 4.0);
        benchmark.run_instance(&square()).unwrap();

        let stats = benchmark.compute_statistics();
        assert_eq!(stats.len(), 1);
        let s = &stats[0];
        assert_eq!(s.num_runs, 4);
        assert!(s.best_length <= s.mean_length && s.mean_length <= s.worst_length);
        assert!((s.best_length - 4.0).abs() < 1e-9);
        assert!(s.std_length >= 0.0);
        assert!(s.avg_gap.unwrap() >= -1e-9);
    }

    #[test]
    fn test_single_run_has_zero_std() {
        let mut benchmark = Benchmark::new(small_config(1));
        benchmark.run_instance(&square()).unwrap();
        assert_eq!(benchmark.compute_statistics()[0].std_length, 0.0);
    }

    #[test]
    fn test_report_lists_instances() {
        let mut benchmark = Benchmark::new(small_config(2));
        benchmark.run_instance(&square()).unwrap();
        let report = benchmark.generate_report();
        assert!(report.contains("square"));
        assert!(report.contains("Ant System Benchmark Report"));
    }
}
