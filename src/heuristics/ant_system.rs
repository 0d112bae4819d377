//! Ant System for the Euclidean TSP.
//!
//! Each iteration runs three phases in a fixed order:
//! 1. every ant builds a tour by roulette-wheel selection over
//!    `tau(i,j)^alpha * (1/d(i,j))^beta`;
//! 2. the shortest tour of the iteration replaces the global best when it is
//!    strictly shorter, and the best length so far is appended to the trace;
//! 3. all trails evaporate by `rho`, then every ant deposits `Q / length`
//!    along its own tour.

use crate::error::{AntSystemError, Result};
use crate::heuristics::construction::initial_pheromone;
use crate::heuristics::pheromone::PheromoneMatrix;
use crate::instance::{DistanceMatrix, TspInstance};
use crate::solution::{validate_tour, AntSystemResult};
use ordered_float::OrderedFloat;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Ant System configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntSystemConfig {
    /// Number of ants per iteration
    pub num_ants: usize,
    /// Number of iterations
    pub max_iterations: usize,
    /// Pheromone importance (alpha)
    pub alpha: f64,
    /// Heuristic importance (beta)
    pub beta: f64,
    /// Evaporation rate (rho), strictly between 0 and 1
    pub evaporation_rate: f64,
    /// Pheromone deposit factor (Q)
    pub q: f64,
    /// Random seed
    pub seed: u64,
    /// Build the ants of an iteration on the rayon pool
    pub parallel: bool,
    /// Check every constructed tour before selection
    pub validate_tours: bool,
}

impl Default for AntSystemConfig {
    fn default() -> Self {
        AntSystemConfig {
            num_ants: 20,
            max_iterations: 200,
            alpha: 1.0,
            beta: 5.0,
            evaporation_rate: 0.1,
            q: 10.0,
            seed: 42,
            parallel: false,
            validate_tours: true,
        }
    }
}

impl AntSystemConfig {
    /// Reject parameters outside their valid range. Nothing is clamped.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha >= 0.0 && self.alpha.is_finite()) {
            return Err(AntSystemError::invalid(format!(
                "alpha must be finite and >= 0, got {}",
                self.alpha
            )));
        }
        if !(self.beta >= 0.0 && self.beta.is_finite()) {
            return Err(AntSystemError::invalid(format!(
                "beta must be finite and >= 0, got {}",
                self.beta
            )));
        }
        if !(self.evaporation_rate > 0.0 && self.evaporation_rate < 1.0) {
            return Err(AntSystemError::invalid(format!(
                "rho must lie in (0, 1), got {}",
                self.evaporation_rate
            )));
        }
        if self.num_ants < 1 {
            return Err(AntSystemError::invalid("at least one ant is required"));
        }
        if self.max_iterations < 1 {
            return Err(AntSystemError::invalid("at least one iteration is required"));
        }
        if !(self.q > 0.0 && self.q.is_finite()) {
            return Err(AntSystemError::invalid(format!(
                "Q must be finite and > 0, got {}",
                self.q
            )));
        }
        Ok(())
    }

    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: AntSystemConfig = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }
}

/// Pick an index from `weights` with a uniform `draw` in `[0, 1)`.
///
/// Normalized weights are accumulated in order and the first index whose
/// cumulative mass reaches `draw` wins. The last index is returned when
/// rounding keeps the sum below `draw`. An infinite weight wins outright;
/// an all-zero weight vector degrades to a uniform pick. Weights are scaled
/// by the largest one first, so huge finite weights cannot overflow the sum.
pub fn roulette_select(weights: &[f64], draw: f64) -> usize {
    assert!(!weights.is_empty(), "roulette over an empty candidate list");
    let last = weights.len() - 1;

    if let Some(i) = weights.iter().position(|w| w.is_infinite()) {
        return i;
    }

    let largest = weights.iter().cloned().fold(0.0, f64::max);
    if !(largest > 0.0) {
        return ((draw * weights.len() as f64) as usize).min(last);
    }

    let total: f64 = weights.iter().map(|w| w / largest).sum();
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w / largest / total;
        if cumulative >= draw {
            return i;
        }
    }

    last
}

/// Desirability of moving along an edge with pheromone `tau` and length `dist`.
///
/// A zero-length edge has infinite heuristic appeal when `beta > 0`.
#[inline]
pub fn selection_weight(tau: f64, dist: f64, alpha: f64, beta: f64) -> f64 {
    let eta = if beta == 0.0 {
        1.0
    } else if dist == 0.0 {
        return f64::INFINITY;
    } else {
        (1.0 / dist).powf(beta)
    };
    tau.powf(alpha) * eta
}

/// Builds single-ant tours from a read-only view of distances and trails.
pub struct TourConstructor<'a> {
    distances: &'a DistanceMatrix,
    pheromone: &'a PheromoneMatrix,
    alpha: f64,
    beta: f64,
}

impl<'a> TourConstructor<'a> {
    pub fn new(
        distances: &'a DistanceMatrix,
        pheromone: &'a PheromoneMatrix,
        alpha: f64,
        beta: f64,
    ) -> Self {
        assert_eq!(
            distances.len(),
            pheromone.len(),
            "distance and pheromone matrices disagree on the city count"
        );
        TourConstructor {
            distances,
            pheromone,
            alpha,
            beta,
        }
    }

    /// Construct a closed tour starting and ending at city 0
    pub fn construct<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let n = self.distances.len();
        let mut tour = Vec::with_capacity(n + 1);
        tour.push(0);

        let mut unvisited: Vec<usize> = (1..n).collect();
        let mut weights: Vec<f64> = Vec::with_capacity(n);
        let mut current = 0;

        while !unvisited.is_empty() {
            weights.clear();
            weights.extend(unvisited.iter().map(|&city| {
                selection_weight(
                    self.pheromone.get(current, city),
                    self.distances.distance(current, city),
                    self.alpha,
                    self.beta,
                )
            }));

            let draw: f64 = rng.gen();
            let index = roulette_select(&weights, draw);
            current = unvisited.remove(index);
            tour.push(current);
        }

        tour.push(0);
        tour
    }
}

/// Ant System solver
pub struct AntSystem {
    config: AntSystemConfig,
    instance: TspInstance,
    pheromone: PheromoneMatrix,
    best_tour: Vec<usize>,
    best_length: f64,
    convergence: Vec<f64>,
    rng: ChaCha8Rng,
}

impl AntSystem {
    /// Validate the configuration, seed the random source and initialize
    /// every trail to `tau0`.
    pub fn new(instance: TspInstance, config: AntSystemConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let n = instance.dimension();
        let tau0 = initial_pheromone(&instance.distances, &mut rng);
        log::debug!("{}: n={}, tau0={:.6e}", instance.name, n, tau0);

        Ok(AntSystem {
            config,
            instance,
            pheromone: PheromoneMatrix::new(n, tau0),
            best_tour: Vec::new(),
            best_length: f64::INFINITY,
            convergence: Vec::new(),
            rng,
        })
    }

    pub fn config(&self) -> &AntSystemConfig {
        &self.config
    }

    pub fn instance(&self) -> &TspInstance {
        &self.instance
    }

    pub fn pheromone(&self) -> &PheromoneMatrix {
        &self.pheromone
    }

    pub fn best_tour(&self) -> &[usize] {
        &self.best_tour
    }

    pub fn best_length(&self) -> f64 {
        self.best_length
    }

    pub fn convergence(&self) -> &[f64] {
        &self.convergence
    }

    /// Construction phase: one `(tour, length)` per ant, in ant order.
    ///
    /// Each ant gets its own generator seeded from the master source, so the
    /// sequential and parallel paths produce the same tours.
    fn construct_ants(&mut self) -> Vec<(Vec<usize>, f64)> {
        let seeds: Vec<u64> = (0..self.config.num_ants).map(|_| self.rng.gen()).collect();

        let distances = &self.instance.distances;
        let constructor = TourConstructor::new(
            distances,
            &self.pheromone,
            self.config.alpha,
            self.config.beta,
        );
        let build = |seed: u64| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let tour = constructor.construct(&mut rng);
            let length = distances.tour_length(&tour);
            (tour, length)
        };

        if self.config.parallel {
            seeds.into_par_iter().map(build).collect()
        } else {
            seeds.into_iter().map(build).collect()
        }
    }

    /// Update phase: evaporate, then every ant deposits `Q / length`.
    fn update_pheromone(&mut self, ants: &[(Vec<usize>, f64)]) {
        self.pheromone.evaporate(self.config.evaporation_rate);

        for (tour, length) in ants {
            // zero-length tours only arise when every city coincides
            let delta = if *length > 0.0 {
                self.config.q / length
            } else {
                self.config.q
            };
            self.pheromone.deposit(tour, delta);
        }
    }

    /// Runs after every update, whatever `validate_tours` says.
    fn check_pheromone(&self) -> Result<()> {
        if !self.pheromone.is_symmetric() {
            return Err(AntSystemError::InvariantViolation(
                "pheromone matrix is not symmetric".to_string(),
            ));
        }
        if !self.pheromone.is_positive_finite() {
            return Err(AntSystemError::InvariantViolation(format!(
                "pheromone left the positive finite range (min {}, max {})",
                self.pheromone.min_value(),
                self.pheromone.max_value()
            )));
        }
        Ok(())
    }

    /// Run one iteration and return the shortest length among its ants.
    pub fn iterate(&mut self) -> Result<f64> {
        let n = self.instance.dimension();
        let ants = self.construct_ants();

        if self.config.validate_tours {
            for (tour, _) in &ants {
                validate_tour(tour, n)?;
            }
        }

        let (tour, length) = ants
            .iter()
            .min_by_key(|(_, length)| OrderedFloat(*length))
            .ok_or_else(|| AntSystemError::InvariantViolation("iteration produced no ants".to_string()))?;
        let iteration_best = *length;

        if iteration_best < self.best_length {
            log::info!(
                "iteration {}: new best {:.4} (was {:.4})",
                self.convergence.len(),
                iteration_best,
                self.best_length
            );
            self.best_length = iteration_best;
            self.best_tour = tour.clone();
        }
        if self.best_tour.is_empty() {
            return Err(AntSystemError::InvariantViolation(format!(
                "no tour with a finite length (iteration best {})",
                iteration_best
            )));
        }
        self.convergence.push(self.best_length);

        self.update_pheromone(&ants);
        self.check_pheromone()?;

        log::debug!(
            "iteration {}: iteration best {:.4}, global best {:.4}",
            self.convergence.len() - 1,
            iteration_best,
            self.best_length
        );

        Ok(iteration_best)
    }

    /// Run `max_iterations` iterations.
    ///
    /// A second call continues from the current trails and best tour.
    pub fn run(&mut self) -> Result<AntSystemResult> {
        let start = std::time::Instant::now();

        for _ in 0..self.config.max_iterations {
            self.iterate()?;
        }

        log::info!(
            "{}: best length {:.4} after {} iterations ({:.3}s)",
            self.instance.name,
            self.best_length,
            self.convergence.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(AntSystemResult {
            tour: self.best_tour.clone(),
            length: self.best_length,
            convergence: self.convergence.clone(),
            iterations: self.convergence.len(),
            seed: self.config.seed,
            computation_time: start.elapsed().as_secs_f64(),
            algorithm: "AntSystem".to_string(),
        })
    }
}

/// Solve the instance given by coordinate sequences in one call.
pub fn solve(xs: &[f64], ys: &[f64], config: AntSystemConfig) -> Result<AntSystemResult> {
    let instance = TspInstance::from_coordinates("coordinates", xs, ys)?;
    AntSystem::new(instance, config)?.run()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn coordinates(max_n: usize) -> impl Strategy<Value = Vec<(f64, f64)>> {
        prop::collection::vec((0.0f64..100.0, 0.0f64..100.0), 2..max_n)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Every constructed tour is a closed permutation.
        #[test]
        fn prop_tours_are_closed_permutations(points in coordinates(20), seed in any::<u64>()) {
            let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
            let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
            let instance = TspInstance::from_coordinates("prop", &xs, &ys).unwrap();
            let n = instance.dimension();
            let pheromone = PheromoneMatrix::new(n, 0.1);
            let constructor = TourConstructor::new(&instance.distances, &pheromone, 1.0, 3.0);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            let tour = constructor.construct(&mut rng);
            prop_assert_eq!(tour.len(), n + 1);
            prop_assert!(validate_tour(&tour, n).is_ok());
        }

        /// Trace is non-increasing and pheromone stays symmetric and positive.
        #[test]
        fn prop_run_invariants(points in coordinates(12), seed in any::<u64>()) {
            let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
            let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
            let instance = TspInstance::from_coordinates("prop", &xs, &ys).unwrap();
            let config = AntSystemConfig {
                num_ants: 4,
                max_iterations: 8,
                seed,
                ..Default::default()
            };
            let mut aco = AntSystem::new(instance, config).unwrap();
            let result = aco.run().unwrap();

            prop_assert_eq!(result.convergence.len(), 8);
            for w in result.convergence.windows(2) {
                prop_assert!(w[1] <= w[0]);
            }
            prop_assert!(aco.pheromone().is_symmetric());
            prop_assert!(aco.pheromone().min_value() > 0.0);
        }

        /// Roulette always returns an in-range index.
        #[test]
        fn prop_roulette_in_range(
            weights in prop::collection::vec(0.0f64..10.0, 1..30),
            draw in 0.0f64..1.0,
        ) {
            let i = roulette_select(&weights, draw);
            prop_assert!(i < weights.len());
        }
    }
}
