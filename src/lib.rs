//! Ant System TSP Solver Library
//!
//! Approximate solutions to the Euclidean Traveling Salesman Problem with the
//! Ant System metaheuristic.
//!
//! # Features
//!
//! - Precomputed Euclidean distance matrix with input validation
//! - Randomized seed tour for the initial pheromone scale
//! - Roulette-wheel tour construction weighted by pheromone and distance
//! - Evaporate-then-deposit pheromone update, convergence trace
//! - Optional rayon construction phase with results identical to the sequential one
//! - TSPLIB loading, JSON/CSV persistence, SVG reports and multi-seed benchmarks
//!
//! # Example
//!
//! ```no_run
//! use ant_system_tsp::instance::TspInstance;
//! use ant_system_tsp::heuristics::ant_system::{AntSystem, AntSystemConfig};
//!
//! // Load instance
//! let instance = TspInstance::from_file("berlin52.tsp").unwrap();
//!
//! let config = AntSystemConfig {
//!     num_ants: 20,
//!     max_iterations: 200,
//!     ..Default::default()
//! };
//! let mut solver = AntSystem::new(instance, config).unwrap();
//! let result = solver.run().unwrap();
//!
//! println!("Tour length: {:.2}", result.length);
//! ```

pub mod error;
pub mod instance;
pub mod solution;
pub mod heuristics;
pub mod benchmark;
pub mod visualization;

pub use error::{AntSystemError, Result};
pub use instance::{City, DistanceMatrix, TspInstance};
pub use solution::AntSystemResult;
pub use heuristics::ant_system::{solve, AntSystem, AntSystemConfig};
