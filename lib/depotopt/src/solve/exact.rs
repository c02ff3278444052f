use rayon::prelude::*;
use tracing::*;

use crate::Error;
use crate::qubo::BinaryQuadraticModel;
use crate::utils::unpack_assignment;
use super::{Sample, Sampler};

/// Exhaustive search over all `2^n` assignments.  Returns the single lowest-energy assignment;
/// among equal energies the one with the smallest binary encoding (`x_0` least significant).
#[derive(Debug, Clone, PartialEq)]
pub struct ExactSolver {
    pub max_variables: usize,
}

impl Default for ExactSolver {
    fn default() -> Self {
        ExactSolver { max_variables: 24 }
    }
}

fn better(a: (f64, u64), b: (f64, u64)) -> (f64, u64) {
    if a.0 < b.0 || (a.0 == b.0 && a.1 < b.1) { a } else { b }
}

impl Sampler for ExactSolver {
    #[instrument(level = "info", name = "exact", skip(self, model), fields(n = model.num_variables()))]
    fn sample(&self, model: &BinaryQuadraticModel) -> anyhow::Result<Vec<Sample>> {
        let n = model.num_variables();
        if n > self.max_variables.min(63) {
            return Err(Error::TooManyVariables { variables: n, max: self.max_variables }.into());
        }
        let (energy, mask) = (0..(1u64 << n)).into_par_iter()
            .map(|mask| (model.energy(&unpack_assignment(mask, n)), mask))
            .reduce(|| (f64::INFINITY, u64::MAX), better);
        debug!(energy, "exhaustive minimum");
        return Ok(vec![Sample { assignment: unpack_assignment(mask, n), energy }])
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::qubo::QuadPoly;

    #[test]
    fn exact_minimum() -> anyhow::Result<()> {
        let mut p = QuadPoly::zero(3);
        p.add_linear(0, -1.0);
        p.add_linear(1, -1.0);
        p.add_linear(2, 1.0);
        p.add_quadratic(0, 1, 3.0);
        let s = ExactSolver::default().sample(&BinaryQuadraticModel::from_poly(&p))?;
        assert_eq!(s.len(), 1);
        // x0 alone and x1 alone tie at -1; x0 has the smaller encoding
        assert_eq!(s[0].assignment, vec![1, 0, 0]);
        assert_eq!(s[0].energy, -1.0);
        Ok(())
    }

    #[test]
    fn too_many_variables() {
        let m = BinaryQuadraticModel::from_poly(&QuadPoly::zero(5));
        assert!(ExactSolver { max_variables: 4 }.sample(&m).is_err());
    }

    #[test]
    fn no_variables() -> anyhow::Result<()> {
        let mut p = QuadPoly::zero(0);
        p.add_constant(2.0);
        let s = ExactSolver::default().sample(&BinaryQuadraticModel::from_poly(&p))?;
        assert_eq!(s[0], Sample { assignment: vec![], energy: 2.0 });
        Ok(())
    }
}
