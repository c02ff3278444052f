use crate::graph::CostWeights;
use crate::qubo::{Coefficients, StructuralAggregation};
use crate::registry::DegeneratePolicy;
use crate::solve::{Backend, Sampler, SimulatedAnnealing, ExactSolver};

/// Everything one optimization run needs besides the data.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub weights: CostWeights,
    /// Largest distance at which two stations are connected.
    pub threshold: f64,
    /// Target number of depots, `K`.
    pub depots: usize,
    pub coefficients: Coefficients,
    pub aggregation: StructuralAggregation,
    pub backend: Backend,
    pub num_reads: usize,
    pub num_sweeps: usize,
    pub seed: u64,
    pub degenerate: DegeneratePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            weights: CostWeights::default(),
            threshold: 25.0,
            depots: 4,
            coefficients: Coefficients::default(),
            aggregation: StructuralAggregation::AllEdges,
            backend: Backend::Anneal,
            num_reads: 10,
            num_sweeps: 1000,
            seed: 42,
            degenerate: DegeneratePolicy::Fail,
        }
    }
}

impl Config {
    pub fn sampler(&self) -> Box<dyn Sampler + Send + Sync> {
        match self.backend {
            Backend::Anneal => Box::new(SimulatedAnnealing {
                num_reads: self.num_reads,
                num_sweeps: self.num_sweeps,
                beta_range: None,
                seed: self.seed,
            }),
            Backend::Exact => Box::new(ExactSolver::default()),
        }
    }
}
