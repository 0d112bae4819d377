//! Module for loading and representing Euclidean TSP instances.
//!
//! Cities come from explicit coordinate vectors, from TSPLIB files with a
//! `NODE_COORD_SECTION`, or from a seeded uniform generator. Every instance
//! owns a precomputed [`DistanceMatrix`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{AntSystemError, Result};

/// A city with 2D coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// City index (1-indexed in files, 0-indexed internally)
    pub id: usize,
    pub x: f64,
    pub y: f64,
}

impl City {
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        City { id, x, y }
    }

    #[inline]
    pub fn distance_to(&self, other: &City) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Symmetric matrix of pairwise Euclidean distances, zero on the diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Build the matrix from city coordinates.
    ///
    /// Fails when fewer than two cities are given, or when the cities are
    /// spread so far apart that a distance or a tour length leaves `f64` range.
    pub fn from_cities(cities: &[City]) -> Result<Self> {
        let n = cities.len();
        if n < 2 {
            return Err(AntSystemError::invalid(format!(
                "at least 2 cities are required, got {}",
                n
            )));
        }

        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in i + 1..n {
                let d = cities[i].distance_to(&cities[j]);
                data[i * n + j] = d;
                data[j * n + i] = d;
            }
        }

        // every tour traverses each ordered pair at most once
        let total: f64 = data.iter().sum();
        if !total.is_finite() {
            return Err(AntSystemError::invalid(
                "city coordinates too far apart: distances overflow f64",
            ));
        }

        Ok(DistanceMatrix { n, data })
    }

    /// Number of cities
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Get the distance between two cities
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Sum of consecutive-city distances along a tour.
    ///
    /// Tours produced by the solver are closed (last entry equals the first),
    /// so no implicit return edge is added.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        tour.windows(2).map(|w| self.distance(w[0], w[1])).sum()
    }
}

/// A Euclidean TSP instance
#[derive(Debug, Clone)]
pub struct TspInstance {
    /// Name of the instance
    pub name: String,
    /// Comment/description
    pub comment: String,
    /// Cities, indexed `0..dimension`
    pub cities: Vec<City>,
    /// Precomputed distance matrix
    pub distances: DistanceMatrix,
}

impl TspInstance {
    /// Build an instance from two equal-length coordinate sequences.
    pub fn from_coordinates(name: &str, xs: &[f64], ys: &[f64]) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(AntSystemError::invalid(format!(
                "coordinate sequences differ in length: {} x values, {} y values",
                xs.len(),
                ys.len()
            )));
        }

        let cities: Vec<City> = xs
            .iter()
            .zip(ys)
            .enumerate()
            .map(|(id, (&x, &y))| City::new(id, x, y))
            .collect();

        Self::from_cities(name, cities)
    }

    /// Build an instance from cities. Ids are reassigned to `0..n`.
    pub fn from_cities(name: &str, mut cities: Vec<City>) -> Result<Self> {
        if let Some(bad) = cities.iter().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(AntSystemError::invalid(format!(
                "city {} has non-finite coordinates ({}, {})",
                bad.id, bad.x, bad.y
            )));
        }

        for (i, city) in cities.iter_mut().enumerate() {
            city.id = i;
        }

        let distances = DistanceMatrix::from_cities(&cities)?;

        Ok(TspInstance {
            name: name.to_string(),
            comment: String::new(),
            cities,
            distances,
        })
    }

    /// Generate `n` cities uniformly in `[min_coord, max_coord]^2`.
    pub fn random(n: usize, min_coord: f64, max_coord: f64, seed: u64) -> Result<Self> {
        if !(min_coord < max_coord) {
            return Err(AntSystemError::invalid(format!(
                "empty coordinate range [{}, {}]",
                min_coord, max_coord
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let cities = (0..n)
            .map(|id| {
                let x = rng.gen_range(min_coord..=max_coord);
                let y = rng.gen_range(min_coord..=max_coord);
                City::new(id, x, y)
            })
            .collect();

        let mut instance = Self::from_cities(&format!("random{}", n), cities)?;
        instance.comment = format!("{} uniform cities, seed {}", n, seed);
        Ok(instance)
    }

    /// Parse an instance from a TSPLIB file with a `NODE_COORD_SECTION`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse TSPLIB text from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut name = String::new();
        let mut comment = String::new();
        let mut dimension: Option<usize> = None;
        let mut coords: Vec<City> = Vec::new();
        let mut in_coords = false;

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }
            if line == "EOF" {
                break;
            }

            if line.starts_with("NODE_COORD_SECTION") {
                in_coords = true;
                continue;
            }

            if let Some((key, value)) = line.split_once(':') {
                in_coords = false;
                let value = value.trim();
                match key.trim() {
                    "NAME" => name = value.to_string(),
                    "COMMENT" => comment = value.to_string(),
                    "DIMENSION" => {
                        dimension = Some(value.parse().map_err(|_| {
                            AntSystemError::parse(line_no, "Invalid dimension")
                        })?)
                    }
                    "EDGE_WEIGHT_TYPE" => {
                        if value != "EUC_2D" && value != "GEO" && value != "ATT" && value != "CEIL_2D" {
                            return Err(AntSystemError::parse(
                                line_no,
                                format!("unsupported EDGE_WEIGHT_TYPE {}", value),
                            ));
                        }
                        if value != "EUC_2D" {
                            log::warn!("EDGE_WEIGHT_TYPE {} treated as plain Euclidean", value);
                        }
                    }
                    _ => {}
                }
                continue;
            }

            if line.ends_with("_SECTION") {
                in_coords = false;
                continue;
            }

            if in_coords {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() < 3 {
                    return Err(AntSystemError::parse(line_no, "expected `id x y`"));
                }
                let id: usize = parts[0]
                    .parse()
                    .map_err(|_| AntSystemError::parse(line_no, "Invalid node id"))?;
                let x: f64 = parts[1]
                    .parse()
                    .map_err(|_| AntSystemError::parse(line_no, "Invalid x coordinate"))?;
                let y: f64 = parts[2]
                    .parse()
                    .map_err(|_| AntSystemError::parse(line_no, "Invalid y coordinate"))?;
                coords.push(City::new(id, x, y));
            }
        }

        if let Some(expected) = dimension {
            if expected != coords.len() {
                log::warn!(
                    "DIMENSION is {} but {} coordinates were read",
                    expected,
                    coords.len()
                );
            }
        }

        coords.sort_by_key(|c| c.id);

        let mut instance = Self::from_cities(&name, coords)?;
        instance.comment = comment;
        Ok(instance)
    }

    /// Number of cities
    #[inline]
    pub fn dimension(&self) -> usize {
        self.cities.len()
    }

    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances.distance(i, j)
    }

    pub fn xs(&self) -> Vec<f64> {
        self.cities.iter().map(|c| c.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.cities.iter().map(|c| c.y).collect()
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let n = self.dimension();
        let mut distances: Vec<f64> = Vec::with_capacity(n * (n - 1) / 2);
        for i in 0..n {
            for j in i + 1..n {
                distances.push(self.distance(i, j));
            }
        }

        let avg_distance = distances.iter().sum::<f64>() / distances.len() as f64;
        let min_distance = distances.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_distance = distances.iter().cloned().fold(0.0, f64::max);
        let coincident_pairs = distances.iter().filter(|&&d| d == 0.0).count();

        InstanceStatistics {
            name: self.name.clone(),
            dimension: n,
            avg_distance,
            min_distance,
            max_distance,
            coincident_pairs,
        }
    }
}

/// Statistics about a TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub avg_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    /// Pairs of distinct cities sharing identical coordinates
    pub coincident_pairs: usize,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Cities: {}", self.dimension)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Min distance: {:.2}", self.min_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)?;
        writeln!(f, "  Coincident pairs: {}", self.coincident_pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_calculation() {
        let cities = vec![
            City::new(0, 0.0, 0.0),
            City::new(1, 3.0, 4.0),
        ];
        let matrix = DistanceMatrix::from_cities(&cities).unwrap();

        assert!((matrix.distance(0, 1) - 5.0).abs() < 1e-10);
        assert!((matrix.distance(1, 0) - 5.0).abs() < 1e-10);
        assert_eq!(matrix.distance(0, 0), 0.0);
    }

    #[test]
    fn test_matrix_symmetric() {
        let instance = TspInstance::random(12, 0.0, 100.0, 7).unwrap();
        for i in 0..12 {
            assert_eq!(instance.distance(i, i), 0.0);
            for j in 0..12 {
                assert_eq!(instance.distance(i, j), instance.distance(j, i));
                assert!(instance.distance(i, j) >= 0.0);
            }
        }
    }

    #[test]
    fn test_too_few_cities() {
        let err = TspInstance::from_coordinates("one", &[1.0], &[2.0]).unwrap_err();
        assert!(matches!(err, AntSystemError::InvalidInput(_)));

        let err = TspInstance::from_coordinates("none", &[], &[]).unwrap_err();
        assert!(matches!(err, AntSystemError::InvalidInput(_)));
    }

    #[test]
    fn test_mismatched_coordinates() {
        let err = TspInstance::from_coordinates("bad", &[0.0, 1.0, 2.0], &[0.0, 1.0]).unwrap_err();
        assert!(matches!(err, AntSystemError::InvalidInput(_)));
    }

    #[test]
    fn test_non_finite_coordinates() {
        let err = TspInstance::from_coordinates("nan", &[0.0, f64::NAN], &[0.0, 1.0]).unwrap_err();
        assert!(matches!(err, AntSystemError::InvalidInput(_)));
    }

    #[test]
    fn test_large_coordinates_stay_finite() {
        let instance =
            TspInstance::from_coordinates("far", &[0.0, 1e200, 2e200], &[0.0; 3]).unwrap();
        assert_eq!(instance.distance(0, 1), 1e200);
        assert_eq!(instance.distance(0, 2), 2e200);
        assert!(instance.distances.tour_length(&[0, 1, 2, 0]).is_finite());
    }

    #[test]
    fn test_overflowing_distances_rejected() {
        // single distance beyond f64::MAX
        let err = TspInstance::from_coordinates("huge", &[1.7e308, -1.7e308], &[0.0, 0.0])
            .unwrap_err();
        assert!(matches!(err, AntSystemError::InvalidInput(_)));

        // each distance fits but their sum does not
        let err = TspInstance::from_coordinates("wide", &[0.0, 8e307, -8e307], &[0.0; 3])
            .unwrap_err();
        assert!(matches!(err, AntSystemError::InvalidInput(_)));
    }

    #[test]
    fn test_tour_length_unit_square() {
        let instance =
            TspInstance::from_coordinates("square", &[0.0, 0.0, 1.0, 1.0], &[0.0, 1.0, 1.0, 0.0])
                .unwrap();
        let length = instance.distances.tour_length(&[0, 1, 2, 3, 0]);
        assert!((length - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_random_is_reproducible() {
        let a = TspInstance::random(20, 0.0, 100.0, 3).unwrap();
        let b = TspInstance::random(20, 0.0, 100.0, 3).unwrap();
        assert_eq!(a.cities, b.cities);
        assert!(a.cities.iter().all(|c| (0.0..=100.0).contains(&c.x) && (0.0..=100.0).contains(&c.y)));
    }

    #[test]
    fn test_parse_tsplib() {
        let text = "\
NAME : tiny4
COMMENT : unit square
TYPE : TSP
DIMENSION : 4
EDGE_WEIGHT_TYPE : EUC_2D
NODE_COORD_SECTION
1 0.0 0.0
2 0.0 1.0
3 1.0 1.0
4 1.0 0.0
EOF
";
        let instance = TspInstance::from_reader(text.as_bytes()).unwrap();
        assert_eq!(instance.name, "tiny4");
        assert_eq!(instance.comment, "unit square");
        assert_eq!(instance.dimension(), 4);
        assert_eq!(instance.cities[2], City::new(2, 1.0, 1.0));
        assert!((instance.distance(0, 2) - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_parse_rejects_bad_coordinate() {
        let text = "NAME: bad\nNODE_COORD_SECTION\n1 0.0 zero\n2 1.0 1.0\nEOF\n";
        let err = TspInstance::from_reader(text.as_bytes()).unwrap_err();
        assert!(matches!(err, AntSystemError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_parse_rejects_explicit_weights() {
        let text = "NAME: m\nEDGE_WEIGHT_TYPE: EXPLICIT\nEOF\n";
        let err = TspInstance::from_reader(text.as_bytes()).unwrap_err();
        assert!(matches!(err, AntSystemError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_statistics() {
        let instance =
            TspInstance::from_coordinates("dup", &[0.0, 0.0, 3.0], &[0.0, 0.0, 4.0]).unwrap();
        let stats = instance.statistics();
        assert_eq!(stats.dimension, 3);
        assert_eq!(stats.coincident_pairs, 1);
        assert_eq!(stats.max_distance, 5.0);
        assert_eq!(stats.min_distance, 0.0);
    }
}
