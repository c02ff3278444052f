use tracing::*;

use crate::*;
use crate::extract::Solution;
use crate::graph::{build_edges, build_nodes, Graph, NodeSet, Topology};
use crate::qubo::{CompiledModel, Hamiltonian};
use crate::registry::StationRegistry;
use crate::solve::{best_sample, decode, DecodedSample};

/// Everything produced by one optimization run.
#[derive(Debug, Clone)]
pub struct Placement {
    pub nodes: NodeSet,
    pub graph: Graph,
    pub hamiltonian: Hamiltonian,
    pub model: CompiledModel,
    pub samples: Vec<DecodedSample>,
    pub best: DecodedSample,
}

impl Placement {
    pub fn best_sample(&self) -> &DecodedSample {
        &self.best
    }

    pub fn solution(&self) -> Solution {
        Solution::from_sample(&self.nodes.index, self.best_sample())
    }

    pub fn summary_json(&self, num_stations: usize) -> json::JsonValue {
        let best = self.best_sample();
        let selected: json::JsonValue = self.solution().selected()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .into();
        json::object! {
            stations: num_stations,
            nodes: self.nodes.len(),
            edges: self.graph.edges().len(),
            selected: selected,
            energy: best.energy,
            structural: best.terms.structural,
            cost: best.terms.cost,
            cardinality: best.terms.cardinality,
            broken: best.broken,
        }
    }
}

/// Normalize, build the station graph, assemble and compile the objective, then sample it.
#[instrument(level = "info", skip(registry, distances, config), fields(registry = %registry.id))]
pub fn place_depots(registry: &StationRegistry, distances: &DistanceRecords, config: &Config) -> anyhow::Result<Placement> {
    let metrics = registry.normalized(config.degenerate)?;
    let nodes = build_nodes(registry.station_ids(), &metrics, &config.weights);
    let edges = build_edges(&nodes, distances, config.threshold)?;
    let graph = Graph::new(nodes.len(), edges);
    info!(stations = registry.len(), nodes = nodes.len(), edges = graph.edges().len(), "graph built");

    if config.depots > nodes.len() {
        warn!(depots = config.depots, nodes = nodes.len(), "more depots requested than there are nodes");
    } else if config.depots == 0 {
        warn!("zero depots requested");
    }

    let hamiltonian = Hamiltonian::new(&graph, &nodes.costs(), config.depots, config.coefficients, config.aggregation)?;
    let model = hamiltonian.compile();
    let samples = config.sampler().sample(&model.bqm)?;
    let samples = decode(&samples, &hamiltonian);
    let best = best_sample(&samples).ok_or(Error::NoSamples)?.clone();

    if best.broken {
        warn!(selected = best.selected, depots = config.depots, "best sample does not select the requested number of depots");
    }
    info!(energy = best.energy, selected = best.selected, "best sample");

    Ok(Placement { nodes, graph, hamiltonian, model, samples, best })
}
