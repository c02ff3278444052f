use ndarray::{Array1, Array2};

use super::QuadPoly;

/// Dense binary quadratic model:
/// `energy(x) = offset + sum_i linear[i]*x_i + sum_{i<j} coupling[[i,j]]*x_i*x_j`.
///
/// `coupling` is symmetric with a zero diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryQuadraticModel {
    pub linear: Array1<f64>,
    pub coupling: Array2<f64>,
    pub offset: f64,
}

impl BinaryQuadraticModel {
    pub fn from_poly(p: &QuadPoly) -> Self {
        let n = p.num_variables();
        let mut coupling = Array2::zeros((n, n));
        for (&(i, j), &c) in &p.quadratic {
            coupling[[i, j]] += c;
            coupling[[j, i]] += c;
        }
        BinaryQuadraticModel {
            linear: Array1::from(p.linear.clone()),
            coupling,
            offset: p.constant,
        }
    }

    pub fn num_variables(&self) -> usize { self.linear.len() }

    /// `linear[i] + sum_j coupling[[i,j]]*x_j`: the energy change of setting `x_i` from 0 to 1.
    pub fn local_field(&self, i: usize, x: &[u8]) -> f64 {
        let row = self.coupling.row(i);
        self.linear[i] + row.iter().zip(x).filter(|(_, &xj)| xj != 0).map(|(c, _)| c).sum::<f64>()
    }

    pub fn energy(&self, x: &[u8]) -> f64 {
        debug_assert_eq!(x.len(), self.num_variables());
        let n = x.len();
        let mut e = self.offset;
        for i in 0..n {
            if x[i] == 0 { continue; }
            e += self.linear[i];
            for j in (i + 1)..n {
                if x[j] != 0 {
                    e += self.coupling[[i, j]];
                }
            }
        }
        return e
    }

    /// Largest possible energy change of a single flip, and the smallest non-zero bias magnitude.
    pub fn delta_bounds(&self) -> (f64, f64) {
        let n = self.num_variables();
        let mut max_delta = 0.0f64;
        let mut min_bias = f64::INFINITY;
        for i in 0..n {
            let row = self.coupling.row(i);
            let d = self.linear[i].abs() + row.iter().map(|c| c.abs()).sum::<f64>();
            max_delta = max_delta.max(d);
            for &c in std::iter::once(&self.linear[i]).chain(row.iter()) {
                if c != 0.0 {
                    min_bias = min_bias.min(c.abs());
                }
            }
        }
        return (max_delta, min_bias)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> BinaryQuadraticModel {
        let mut p = QuadPoly::zero(3);
        p.add_linear(0, 1.0);
        p.add_linear(2, -2.0);
        p.add_quadratic(0, 2, 4.0);
        p.add_constant(0.5);
        BinaryQuadraticModel::from_poly(&p)
    }

    #[test]
    fn energy_matches_poly() {
        let m = model();
        assert_eq!(m.energy(&[0, 0, 0]), 0.5);
        assert_eq!(m.energy(&[1, 0, 1]), 3.5);
        assert_eq!(m.energy(&[0, 1, 1]), -1.5);
        assert_eq!(m.coupling[[2, 0]], 4.0);
    }

    #[test]
    fn local_field_is_flip_delta() {
        let m = model();
        let x = [0u8, 0, 1];
        let mut y = x;
        y[0] = 1;
        assert_eq!(m.local_field(0, &x), m.energy(&y) - m.energy(&x));
    }

    #[test]
    fn bounds() {
        let (max_delta, min_bias) = model().delta_bounds();
        assert_eq!(max_delta, 6.0);
        assert_eq!(min_bias, 1.0);
    }
}
