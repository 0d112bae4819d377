//! Heuristics module for the Euclidean TSP.
//!
//! This module exports the Ant System solver and its building blocks.

pub mod construction;
pub mod pheromone;
pub mod ant_system;

pub use construction::*;
pub use pheromone::*;
pub use ant_system::*;
