use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::*;

use crate::qubo::BinaryQuadraticModel;
use super::{Sample, Sampler};

/// Single-flip Metropolis annealing over a geometric inverse-temperature ladder.
///
/// Each read starts from a uniformly random assignment and runs `num_sweeps` sweeps; read `r`
/// draws from stream `r` of a ChaCha generator seeded with `seed`, so results do not depend on
/// the number of threads.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedAnnealing {
    pub num_reads: usize,
    pub num_sweeps: usize,
    /// `(hot, cold)` inverse temperatures.  Derived from the model when `None`.
    pub beta_range: Option<(f64, f64)>,
    pub seed: u64,
}

impl Default for SimulatedAnnealing {
    fn default() -> Self {
        SimulatedAnnealing { num_reads: 10, num_sweeps: 1000, beta_range: None, seed: 42 }
    }
}

/// Hot end accepts the largest single-flip increase with probability 1/2, cold end accepts the
/// smallest one with probability 1/100.
pub fn default_beta_range(model: &BinaryQuadraticModel) -> (f64, f64) {
    let (max_delta, min_bias) = model.delta_bounds();
    if max_delta <= 0.0 || !min_bias.is_finite() {
        return (1.0, 1.0);
    }
    let hot = 2f64.ln() / max_delta;
    let cold = 100f64.ln() / min_bias;
    return (hot, cold.max(hot))
}

fn beta_schedule(range: (f64, f64), sweeps: usize) -> Vec<f64> {
    let (hot, cold) = range;
    if sweeps <= 1 {
        return vec![cold; sweeps];
    }
    let ratio = cold / hot;
    (0..sweeps)
        .map(|k| hot * ratio.powf(k as f64 / (sweeps - 1) as f64))
        .collect()
}

fn anneal_once(model: &BinaryQuadraticModel, betas: &[f64], rng: &mut impl Rng) -> Sample {
    let n = model.num_variables();
    let mut x: Vec<u8> = (0..n).map(|_| rng.gen_range(0u8, 2u8)).collect();
    let mut field: Vec<f64> = (0..n).map(|i| model.local_field(i, &x)).collect();

    for &beta in betas {
        for i in 0..n {
            let delta = if x[i] == 0 { field[i] } else { -field[i] };
            if delta <= 0.0 || rng.gen::<f64>() < (-beta * delta).exp() {
                let step = if x[i] == 0 { 1.0 } else { -1.0 };
                x[i] ^= 1;
                for (f, c) in field.iter_mut().zip(model.coupling.row(i).iter()) {
                    *f += step * c;
                }
            }
        }
    }

    let energy = model.energy(&x);
    Sample { assignment: x, energy }
}

impl Sampler for SimulatedAnnealing {
    #[instrument(level = "info", name = "anneal", skip(self, model), fields(reads = self.num_reads, sweeps = self.num_sweeps))]
    fn sample(&self, model: &BinaryQuadraticModel) -> anyhow::Result<Vec<Sample>> {
        let range = self.beta_range.unwrap_or_else(|| default_beta_range(model));
        let betas = beta_schedule(range, self.num_sweeps);
        debug!(hot = range.0, cold = range.1, "beta range");

        let samples: Vec<Sample> = (0..self.num_reads).into_par_iter()
            .map(|read| {
                let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
                rng.set_stream(read as u64);
                let s = anneal_once(model, &betas, &mut rng);
                trace!(read, energy = s.energy, "read finished");
                s
            })
            .collect();
        return Ok(samples)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::qubo::QuadPoly;

    fn frustrated() -> BinaryQuadraticModel {
        // ground state x = [1, 0, 1, 0, 1], energy -3
        let mut p = QuadPoly::zero(5);
        for i in 0..5 {
            p.add_linear(i, if i % 2 == 0 { -1.0 } else { -0.5 });
        }
        for i in 0..4 {
            p.add_quadratic(i, i + 1, 2.0);
        }
        BinaryQuadraticModel::from_poly(&p)
    }

    #[test]
    fn schedule_is_monotone() {
        let b = beta_schedule((0.1, 10.0), 50);
        assert_eq!(b.len(), 50);
        assert!((b[0] - 0.1).abs() < 1e-12);
        assert!((b[49] - 10.0).abs() < 1e-9);
        assert!(b.windows(2).all(|w| w[0] <= w[1]));
        assert!(beta_schedule((0.1, 10.0), 0).is_empty());
    }

    #[test]
    fn finds_ground_state() -> anyhow::Result<()> {
        let sa = SimulatedAnnealing { num_reads: 8, num_sweeps: 200, beta_range: None, seed: 7 };
        let samples = sa.sample(&frustrated())?;
        assert_eq!(samples.len(), 8);
        let best = samples.iter().map(|s| s.energy).fold(f64::INFINITY, f64::min);
        assert_eq!(best, -3.0);
        Ok(())
    }

    #[test]
    fn seeded_reads_reproduce() -> anyhow::Result<()> {
        let sa = SimulatedAnnealing { num_reads: 4, num_sweeps: 5, beta_range: Some((0.01, 0.1)), seed: 3 };
        let m = frustrated();
        assert_eq!(sa.sample(&m)?, sa.sample(&m)?);
        Ok(())
    }

    #[test]
    fn sample_energy_is_model_energy() -> anyhow::Result<()> {
        let m = frustrated();
        let sa = SimulatedAnnealing { num_reads: 3, num_sweeps: 10, beta_range: None, seed: 11 };
        for s in sa.sample(&m)? {
            assert_eq!(s.energy, m.energy(&s.assignment));
        }
        Ok(())
    }

    #[test]
    fn empty_model() -> anyhow::Result<()> {
        let m = BinaryQuadraticModel::from_poly(&QuadPoly::zero(0));
        let s = SimulatedAnnealing::default().sample(&m)?;
        assert_eq!(s.len(), 10);
        assert!(s[0].assignment.is_empty());
        Ok(())
    }
}
