//! Pheromone trail matrix for Ant System.
//!
//! The matrix is symmetric by construction: evaporation touches every cell
//! uniformly and every deposit writes both `[a][b]` and `[b][a]`.
//! Evaporation never takes an entry below [`PHEROMONE_FLOOR`], so trails
//! stay strictly positive however long the run.

/// Smallest intensity evaporation can leave on an edge (`f64::MIN_POSITIVE`).
pub const PHEROMONE_FLOOR: f64 = f64::MIN_POSITIVE;

/// Symmetric N×N matrix of pheromone intensities
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneMatrix {
    n: usize,
    data: Vec<f64>,
}

impl PheromoneMatrix {
    /// Uniform matrix filled with `tau0`
    pub fn new(n: usize, tau0: f64) -> Self {
        PheromoneMatrix {
            n,
            data: vec![tau0; n * n],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Current intensity on edge `(i, j)`
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Multiply every entry by `1 - rho`, clamped below at [`PHEROMONE_FLOOR`]
    pub fn evaporate(&mut self, rho: f64) {
        let keep = 1.0 - rho;
        for i in 0..self.n {
            for j in i..self.n {
                let v = (self.data[i * self.n + j] * keep).max(PHEROMONE_FLOOR);
                self.data[i * self.n + j] = v;
                self.data[j * self.n + i] = v;
            }
        }
    }

    /// Add `amount` to both directions of every consecutive edge of `tour`.
    pub fn deposit(&mut self, tour: &[usize], amount: f64) {
        for w in tour.windows(2) {
            let (a, b) = (w[0], w[1]);
            self.data[a * self.n + b] += amount;
            if a != b {
                self.data[b * self.n + a] += amount;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.n + j] = value;
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| (i + 1..self.n).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// Smallest off-diagonal entry. The diagonal is never traversed.
    pub fn min_value(&self) -> f64 {
        let n = self.n;
        self.data
            .iter()
            .enumerate()
            .filter(|(k, _)| k / n != k % n)
            .map(|(_, &v)| v)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn max_value(&self) -> f64 {
        self.data.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Every off-diagonal entry is finite and strictly positive (NaN fails).
    pub fn is_positive_finite(&self) -> bool {
        let n = self.n;
        self.data
            .iter()
            .enumerate()
            .filter(|(k, _)| k / n != k % n)
            .all(|(_, &v)| v > 0.0 && v.is_finite())
    }
}
