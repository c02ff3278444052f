use std::str::FromStr;
use tracing::*;

use crate::qubo::{BinaryQuadraticModel, Hamiltonian, TermEnergies};

mod anneal;
mod exact;
pub use anneal::SimulatedAnnealing;
pub use exact::ExactSolver;

/// One full assignment with its energy under the compiled model.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub assignment: Vec<u8>,
    pub energy: f64,
}

/// A sample re-evaluated against the term structure of the objective.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSample {
    pub assignment: Vec<u8>,
    pub energy: f64,
    pub terms: TermEnergies,
    pub selected: usize,
    /// The number of selected stations differs from the target.
    pub broken: bool,
}

pub trait Sampler {
    fn sample(&self, model: &BinaryQuadraticModel) -> anyhow::Result<Vec<Sample>>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Backend {
    Anneal,
    Exact,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s {
            "anneal" => Ok(Self::Anneal),
            "exact" => Ok(Self::Exact),
            _ => Err(format!("invalid string: {}", s))
        };
    }
}

pub fn decode(samples: &[Sample], hamiltonian: &Hamiltonian) -> Vec<DecodedSample> {
    samples.iter()
        .map(|s| {
            let terms = hamiltonian.terms(&s.assignment);
            let energy = terms.total(&hamiltonian.coefficients);
            let selected = s.assignment.iter().filter(|&&x| x != 0).count();
            if (energy - s.energy).abs() > 1e-6 * energy.abs().max(1.0) {
                warn!(sampled = s.energy, decoded = energy, "sample energy disagrees with objective");
            }
            DecodedSample {
                assignment: s.assignment.clone(),
                energy,
                terms,
                selected,
                broken: selected != hamiltonian.depots,
            }
        })
        .collect()
}

/// Lowest-energy sample; the first one wins a tie.
pub fn best_sample(decoded: &[DecodedSample]) -> Option<&DecodedSample> {
    let mut best: Option<&DecodedSample> = None;
    for s in decoded {
        match best {
            Some(b) if b.energy <= s.energy => {},
            _ => best = Some(s),
        }
    }
    return best
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::qubo::{Coefficients, StructuralAggregation};

    fn decoded(energy: f64, tag: u8) -> DecodedSample {
        DecodedSample {
            assignment: vec![tag],
            energy,
            terms: TermEnergies::default(),
            selected: 0,
            broken: false,
        }
    }

    #[test]
    fn best_is_first_minimum() {
        let d = vec![decoded(3.0, 0), decoded(1.0, 1), decoded(2.0, 2), decoded(1.0, 3)];
        assert_eq!(best_sample(&d).unwrap().assignment, vec![1]);
        assert!(best_sample(&[]).is_none());
    }

    #[test]
    fn decode_recomputes_terms() -> anyhow::Result<()> {
        let h = Hamiltonian::new(&Graph::new(3, vec![]), &[1.0, 2.0, 3.0], 2, Coefficients::default(), StructuralAggregation::AllEdges)?;
        let s = Sample { assignment: vec![1, 0, 1], energy: 0.0 };
        let d = decode(&[s], &h);
        assert_eq!(d[0].selected, 2);
        assert!(!d[0].broken);
        assert_eq!(d[0].terms.cost, 4.0);
        assert_eq!(d[0].energy, 400.0);

        let d = decode(&[Sample { assignment: vec![0, 0, 0], energy: 400.0 }], &h);
        assert!(d[0].broken);
        assert_eq!(d[0].terms.cardinality, 4.0);
        Ok(())
    }

    #[test]
    fn backend_from_str() {
        assert_eq!("exact".parse::<Backend>(), Ok(Backend::Exact));
        assert_eq!("anneal".parse::<Backend>(), Ok(Backend::Anneal));
        assert!("qaoa".parse::<Backend>().is_err());
    }
}
