use crate::Map;

/// A quadratic pseudo-boolean polynomial over `x_0..x_{n-1}`:
/// `constant + sum_i linear[i]*x_i + sum_{i<j} quadratic[(i,j)]*x_i*x_j`.
///
/// `x_i * x_i` is folded into the linear part since `x_i` is binary.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadPoly {
    pub linear: Vec<f64>,
    pub quadratic: Map<(usize, usize), f64>,
    pub constant: f64,
}

impl QuadPoly {
    pub fn zero(n: usize) -> Self {
        QuadPoly { linear: vec![0.0; n], quadratic: Map::default(), constant: 0.0 }
    }

    pub fn num_variables(&self) -> usize { self.linear.len() }

    pub fn add_constant(&mut self, c: f64) {
        self.constant += c;
    }

    pub fn add_linear(&mut self, i: usize, c: f64) {
        self.linear[i] += c;
    }

    pub fn add_quadratic(&mut self, i: usize, j: usize, c: f64) {
        if i == j {
            self.add_linear(i, c);
        } else {
            let key = if i < j { (i, j) } else { (j, i) };
            *self.quadratic.entry(key).or_insert(0.0) += c;
        }
    }

    /// Add `c * (1 - x_i) * (1 - x_j)`.
    pub fn add_both_unselected(&mut self, i: usize, j: usize, c: f64) {
        self.add_constant(c);
        self.add_linear(i, -c);
        self.add_linear(j, -c);
        self.add_quadratic(i, j, c);
    }

    /// `self += k * other`
    pub fn add_scaled(&mut self, other: &QuadPoly, k: f64) {
        debug_assert_eq!(self.num_variables(), other.num_variables());
        self.constant += k * other.constant;
        for (a, b) in self.linear.iter_mut().zip(&other.linear) {
            *a += k * b;
        }
        for (&(i, j), &c) in &other.quadratic {
            self.add_quadratic(i, j, k * c);
        }
    }

    pub fn evaluate(&self, x: &[u8]) -> f64 {
        debug_assert_eq!(x.len(), self.num_variables());
        let mut e = self.constant;
        for (i, &c) in self.linear.iter().enumerate() {
            if x[i] != 0 { e += c; }
        }
        for (&(i, j), &c) in &self.quadratic {
            if x[i] != 0 && x[j] != 0 { e += c; }
        }
        return e
    }
}
