use std::collections::VecDeque;
use itertools::Itertools;
use petgraph::graph::{NodeIndex as PetIndex, UnGraph};
use tracing::*;

use crate::*;
use crate::registry::NormalizedMetrics;

/// Node cost weights: `cost = c*f + d*g + e*h`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CostWeights {
    pub c: f64,
    pub d: f64,
    pub e: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        CostWeights { c: 5.0, d: 3.0, e: 0.3 }
    }
}

impl CostWeights {
    #[inline]
    pub fn cost(&self, f: f64, g: f64, h: f64) -> f64 {
        self.c * f + self.d * g + self.e * h
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: StationId,
    pub f: f64,
    pub g: f64,
    pub h: f64,
    pub cost: f64,
}

/// Dense `0..N` numbering of nodes, assigned in insertion order.
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    names: Vec<StationId>,
    index: Map<StationId, usize>,
}

impl NodeIndex {
    fn push(&mut self, name: StationId) -> usize {
        let i = self.names.len();
        self.index.insert(name.clone(), i);
        self.names.push(name);
        return i
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn name(&self, i: usize) -> &StationId {
        &self.names[i]
    }

    pub fn len(&self) -> usize { self.names.len() }

    pub fn is_empty(&self) -> bool { self.names.is_empty() }

    pub fn names(&self) -> &[StationId] { &self.names }
}

#[derive(Debug, Clone, Default)]
pub struct NodeSet {
    pub nodes: Vec<Node>,
    pub index: NodeIndex,
}

impl NodeSet {
    pub fn len(&self) -> usize { self.nodes.len() }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    pub fn costs(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.cost).collect()
    }
}

/// One node per station that has all three normalized metrics, in the order `stations` yields
/// them.  Stations missing any metric are left out entirely.
#[instrument(level = "debug", skip(stations, metrics))]
pub fn build_nodes<'a>(stations: impl IntoIterator<Item=&'a StationId>, metrics: &NormalizedMetrics, weights: &CostWeights) -> NodeSet {
    let mut set = NodeSet::default();
    let mut dropped = 0usize;
    for name in stations {
        if set.index.get(name).is_some() {
            continue;
        }
        match metrics.triple(name) {
            Some((f, g, h)) => {
                set.index.push(name.clone());
                set.nodes.push(Node { name: name.clone(), f, g, h, cost: weights.cost(f, g, h) });
            }
            None => {
                trace!(station = %name, "missing metric, excluded");
                dropped += 1;
            }
        }
    }
    debug!(nodes = set.len(), dropped, "nodes built");
    return set
}


#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Edge {
    pub u: usize,
    pub v: usize,
    pub distance: f64,
}

/// Admit every distance entry whose endpoints are both nodes and whose distance is at most
/// `threshold`.  Entries are taken as given: `a -> b` and `b -> a` are two edges, and a missing
/// direction is never filled in.  Self-loops are skipped.
#[instrument(level = "debug", skip(nodes, distances))]
pub fn build_edges(nodes: &NodeSet, distances: &DistanceRecords, threshold: f64) -> anyhow::Result<Vec<Edge>> {
    let mut edges = Vec::new();
    for r in &distances.0 {
        let (u, v) = match (nodes.index.get(&r.from), nodes.index.get(&r.to)) {
            (Some(u), Some(v)) => (u, v),
            _ => continue,
        };
        if !(r.distance.is_finite() && r.distance >= 0.0) {
            return Err(Error::NegativeDistance { from: r.from.clone(), to: r.to.clone(), distance: r.distance }.into());
        }
        if r.distance > threshold {
            continue;
        }
        if u == v {
            warn!(station = %r.from, "self-loop distance entry skipped");
            continue;
        }
        trace!(from = %r.from, to = %r.to, distance = r.distance, "edge admitted");
        edges.push(Edge { u, v, distance: r.distance });
    }
    debug!(edges = edges.len(), "edges built");
    return Ok(edges)
}


/// The view of a graph the objective needs: edges as index pairs and one centrality value per
/// node.
pub trait Topology {
    fn num_nodes(&self) -> usize;

    fn edges(&self) -> &[Edge];

    fn centrality(&self) -> &[f64];
}

/// Undirected graph over `0..n`.  The edge set is fixed at construction, and centrality is
/// computed once then.  Parallel entries between the same pair share one petgraph edge carrying
/// the shortest distance.
#[derive(Debug, Clone)]
pub struct Graph {
    edges: Vec<Edge>,
    inner: UnGraph<(), f64>,
    centrality: Vec<f64>,
}

impl Graph {
    pub fn new(n: usize, edges: Vec<Edge>) -> Graph {
        let mut inner: UnGraph<(), f64> = UnGraph::with_capacity(n, edges.len());
        for _ in 0..n {
            inner.add_node(());
        }
        for e in &edges {
            debug_assert!(e.u < n && e.v < n);
            if e.u == e.v {
                continue;
            }
            let (a, b) = (PetIndex::new(e.u), PetIndex::new(e.v));
            match inner.find_edge(a, b) {
                Some(k) => {
                    let d = inner[k].min(e.distance);
                    inner[k] = d;
                }
                None => { inner.add_edge(a, b, e.distance); }
            }
        }
        let centrality = betweenness_centrality(&inner);
        Graph { edges, inner, centrality }
    }

    /// Distinct neighbours of `i`, ascending.
    pub fn neighbours(&self, i: usize) -> Vec<usize> {
        self.inner.neighbors(PetIndex::new(i))
            .map(|k| k.index())
            .sorted()
            .collect()
    }

    pub fn petgraph(&self) -> &UnGraph<(), f64> {
        &self.inner
    }
}

impl Topology for Graph {
    fn num_nodes(&self) -> usize { self.inner.node_count() }

    fn edges(&self) -> &[Edge] { &self.edges }

    fn centrality(&self) -> &[f64] { &self.centrality }
}


/// Unweighted betweenness centrality (Brandes), normalized by `1/((n-1)(n-2))` for `n > 2`.
/// Every unordered pair is counted from both ends, so the middle of a 3-node path scores 1.
/// `graph` must not contain parallel edges.
pub fn betweenness_centrality<E>(graph: &UnGraph<(), E>) -> Vec<f64> {
    let n = graph.node_count();
    let mut cb = vec![0.0f64; n];

    for s in graph.node_indices() {
        let mut stack = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut dist: Vec<Option<usize>> = vec![None; n];
        sigma[s.index()] = 1.0;
        dist[s.index()] = Some(0);

        let mut queue = VecDeque::new();
        queue.push_back(s);
        while let Some(v) = queue.pop_front() {
            let vi = v.index();
            stack.push(vi);
            let dv = dist[vi].unwrap_or(0);
            for w in graph.neighbors(v) {
                let wi = w.index();
                if dist[wi].is_none() {
                    dist[wi] = Some(dv + 1);
                    queue.push_back(w);
                }
                if dist[wi] == Some(dv + 1) {
                    sigma[wi] += sigma[vi];
                    preds[wi].push(vi);
                }
            }
        }

        let mut delta = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s.index() {
                cb[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        cb.iter_mut().for_each(|c| *c *= scale);
    }
    return cb
}
