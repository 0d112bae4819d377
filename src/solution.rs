//! Tour validation and the result record produced by the solver.
//!
//! A tour is a `Vec<usize>` of `n + 1` city indices that starts and ends at
//! city 0 and visits every other city exactly once in between.

use crate::error::{AntSystemError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Check that `tour` is a closed permutation of `0..n` anchored at city 0.
pub fn validate_tour(tour: &[usize], n: usize) -> Result<()> {
    if tour.len() != n + 1 {
        return Err(AntSystemError::InvariantViolation(format!(
            "tour has {} entries, expected {}",
            tour.len(),
            n + 1
        )));
    }
    if tour[0] != 0 || tour[n] != 0 {
        return Err(AntSystemError::InvariantViolation(format!(
            "tour must start and end at city 0, got {} .. {}",
            tour[0], tour[n]
        )));
    }

    let mut seen = vec![false; n];
    for &city in &tour[..n] {
        if city >= n {
            return Err(AntSystemError::InvariantViolation(format!(
                "city {} out of range for {} cities",
                city, n
            )));
        }
        if seen[city] {
            return Err(AntSystemError::InvariantViolation(format!(
                "city {} visited twice",
                city
            )));
        }
        seen[city] = true;
    }

    Ok(())
}

/// Result of an Ant System run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntSystemResult {
    /// Best tour found, closed at city 0
    pub tour: Vec<usize>,
    /// Length of the best tour
    pub length: f64,
    /// Best length so far after each iteration
    pub convergence: Vec<f64>,
    /// Number of iterations executed
    pub iterations: usize,
    /// Seed of the master random source
    pub seed: u64,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Algorithm that generated this result
    pub algorithm: String,
}

#[derive(Serialize)]
struct TraceRow {
    iteration: usize,
    best_length: f64,
}

impl AntSystemResult {
    /// Iteration (0-based) at which the final best length was first reached
    pub fn iteration_of_best(&self) -> Option<usize> {
        self.convergence.iter().position(|&l| l == self.length)
    }

    /// Write the result record as pretty JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    /// Export the convergence trace as `iteration,best_length` CSV
    pub fn export_trace_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for (iteration, &best_length) in self.convergence.iter().enumerate() {
            writer.serialize(TraceRow { iteration, best_length })?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl std::fmt::Display for AntSystemResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Length: {:.4}", self.length)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        if let Some(it) = self.iteration_of_best() {
            writeln!(f, "  Best found at iteration: {}", it)?;
        }
        writeln!(f, "  Seed: {}", self.seed)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        writeln!(f, "  Tour: {:?}", self.tour)
    }
}
