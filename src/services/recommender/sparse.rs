use std::collections::BTreeMap;

/// Sparse non-negative vector over the fitted vocabulary.
///
/// Indices are strictly increasing; `values[i]` is the weight of term `indices[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    indices: Vec<u32>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Builds a vector from a term → weight map, dropping zero entries
    pub fn from_map(terms: BTreeMap<u32, f64>) -> Self {
        let (indices, values): (Vec<u32>, Vec<f64>) = terms.into_iter().filter(|(_, v)| *v != 0.0).unzip();
        Self { indices, values }
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Scales the vector to unit length in place. Zero vectors are left untouched.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }

    /// Dot product by merge-joining the two sorted index lists
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;

        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }

        sum
    }

    fn max_abs(&self) -> f64 {
        self.values.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    fn shrunk(&self, divisor: f64) -> SparseVector {
        SparseVector {
            indices: self.indices.clone(),
            values: self.values.iter().map(|v| v / divisor).collect(),
        }
    }

    /// Cosine similarity; 0 whenever either side is the zero vector
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return 0.0;
        }
        if !denom.is_finite() {
            // Huge weights overflow the norms; cosine is scale-free, so retry at unit scale
            let (a, b) = (self.max_abs(), other.max_abs());
            if !a.is_finite() || !b.is_finite() {
                return 0.0;
            }
            return self.shrunk(a).cosine(&other.shrunk(b));
        }
        self.dot(other) / denom
    }
}
