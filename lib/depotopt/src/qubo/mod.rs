//! The depot-selection objective.
//!
//! With `x_i = 1` meaning "station `i` is a depot":
//!
//! - `H1 = sum_{(i,j) in E} w_ij (1 - x_i)(1 - x_j) / max w`, where `w_ij = bc(i) + bc(j)`,
//!   penalises leaving both ends of a structurally important edge uncovered;
//! - `H2 = sum_i cost_i x_i` penalises expensive stations;
//! - `H3 = (sum_i x_i - K)^2` is zero exactly when `K` depots are chosen.
//!
//! `H = A*H1 + B*H2 + C*H3`.  `H3` is a penalty, not a hard constraint: if `K` cannot be met the
//! minimum of `H` simply has `H3 > 0`.
use std::str::FromStr;
use tracing::*;

use crate::*;
use crate::graph::Topology;

mod bqm;
mod poly;
pub use bqm::BinaryQuadraticModel;
pub use poly::QuadPoly;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Coefficients {
    pub a: f64,
    pub b: f64,
    pub c_pen: f64,
}

impl Default for Coefficients {
    fn default() -> Self {
        Coefficients { a: 100.0, b: 100.0, c_pen: 100.0 }
    }
}

/// Which edges contribute to `H1`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StructuralAggregation {
    /// Sum over every edge, divided by the largest edge weight.
    AllEdges,
    /// Only the last edge in edge order, divided by the largest edge weight.
    LastEdgeOnly,
}

impl Default for StructuralAggregation {
    fn default() -> Self { StructuralAggregation::AllEdges }
}

impl FromStr for StructuralAggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s {
            "all" => Ok(Self::AllEdges),
            "last" => Ok(Self::LastEdgeOnly),
            _ => Err(format!("invalid string: {}", s))
        };
    }
}

/// `(i, j, w)` with `w` already divided by the largest edge weight.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EdgeTerm {
    pub i: usize,
    pub j: usize,
    pub weight: f64,
}

/// Structural edge terms.  Empty when there are no edges or when every edge weight is zero
/// (no node lies on a shortest path between two others).
pub fn structural_terms<G: Topology>(graph: &G, aggregation: StructuralAggregation) -> Vec<EdgeTerm> {
    let bc = graph.centrality();
    let weighted: Vec<EdgeTerm> = graph.edges().iter()
        .map(|e| EdgeTerm { i: e.u, j: e.v, weight: bc[e.u] + bc[e.v] })
        .collect();
    let w_max = weighted.iter().map(|t| t.weight).fold(0.0f64, f64::max);
    if w_max <= 0.0 {
        return Vec::new();
    }

    let selected: Vec<EdgeTerm> = match aggregation {
        StructuralAggregation::AllEdges => weighted,
        StructuralAggregation::LastEdgeOnly => weighted.last().copied().into_iter().collect(),
    };
    return selected.into_iter()
        .map(|t| EdgeTerm { weight: t.weight / w_max, ..t })
        .collect()
}

pub fn structural_poly(n: usize, terms: &[EdgeTerm]) -> QuadPoly {
    let mut p = QuadPoly::zero(n);
    for t in terms {
        p.add_both_unselected(t.i, t.j, t.weight);
    }
    return p
}

pub fn cost_poly(costs: &[f64]) -> QuadPoly {
    let mut p = QuadPoly::zero(costs.len());
    for (i, &c) in costs.iter().enumerate() {
        p.add_linear(i, c);
    }
    return p
}

/// `(sum_i x_i - k)^2` expanded with `x_i^2 = x_i`.
pub fn cardinality_poly(n: usize, k: usize) -> QuadPoly {
    let k = k as f64;
    let mut p = QuadPoly::zero(n);
    p.add_constant(k * k);
    for i in 0..n {
        p.add_linear(i, 1.0 - 2.0 * k);
        for j in (i + 1)..n {
            p.add_quadratic(i, j, 2.0);
        }
    }
    return p
}


/// Unweighted value of each term at one assignment.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct TermEnergies {
    pub structural: f64,
    pub cost: f64,
    pub cardinality: f64,
}

impl TermEnergies {
    pub fn total(&self, k: &Coefficients) -> f64 {
        k.a * self.structural + k.b * self.cost + k.c_pen * self.cardinality
    }
}


#[derive(Debug, Clone)]
pub struct Hamiltonian {
    pub num_variables: usize,
    pub depots: usize,
    pub coefficients: Coefficients,
    pub edge_terms: Vec<EdgeTerm>,
    pub costs: Vec<f64>,
}

impl Hamiltonian {
    /// `costs[i]` is the cost of node `i`; `graph` must have the same number of nodes.
    #[instrument(level = "debug", skip(graph, costs))]
    pub fn new<G: Topology>(graph: &G, costs: &[f64], depots: usize, coefficients: Coefficients, aggregation: StructuralAggregation) -> anyhow::Result<Self> {
        if graph.num_nodes() != costs.len() {
            return Err(Error::CostCountMismatch { nodes: graph.num_nodes(), costs: costs.len() }.into());
        }
        let edge_terms = structural_terms(graph, aggregation);
        debug!(edge_terms = edge_terms.len(), "structural term assembled");
        Ok(Hamiltonian {
            num_variables: costs.len(),
            depots,
            coefficients,
            edge_terms,
            costs: costs.to_vec(),
        })
    }

    pub fn structural(&self) -> QuadPoly { structural_poly(self.num_variables, &self.edge_terms) }

    pub fn cost(&self) -> QuadPoly { cost_poly(&self.costs) }

    pub fn cardinality(&self) -> QuadPoly { cardinality_poly(self.num_variables, self.depots) }

    /// Evaluate every term straight from its definition, without going through the expanded
    /// polynomial.  Any nonzero entry of `x` counts as selected.
    pub fn terms(&self, x: &[u8]) -> TermEnergies {
        debug_assert_eq!(x.len(), self.num_variables);
        let off = |i: usize| if x[i] == 0 { 1.0 } else { 0.0 };
        let structural: f64 = self.edge_terms.iter()
            .map(|t| t.weight * off(t.i) * off(t.j))
            .sum();
        let cost: f64 = self.costs.iter().zip(x)
            .filter(|(_, &xi)| xi != 0)
            .map(|(c, _)| c)
            .sum();
        let selected = x.iter().filter(|&&xi| xi != 0).count() as f64;
        let cardinality = (selected - self.depots as f64).powi(2);
        TermEnergies { structural, cost, cardinality }
    }

    pub fn energy(&self, x: &[u8]) -> f64 {
        self.terms(x).total(&self.coefficients)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn compile(&self) -> CompiledModel {
        let k = &self.coefficients;
        let mut h = QuadPoly::zero(self.num_variables);
        h.add_scaled(&self.structural(), k.a);
        h.add_scaled(&self.cost(), k.b);
        h.add_scaled(&self.cardinality(), k.c_pen);

        let mut qubo = Map::default();
        for (i, &c) in h.linear.iter().enumerate() {
            if c != 0.0 {
                qubo.insert((i, i), c);
            }
        }
        for (&key, &c) in &h.quadratic {
            if c != 0.0 {
                qubo.insert(key, c);
            }
        }
        debug!(terms = qubo.len(), offset = h.constant, "compiled");
        CompiledModel {
            offset: h.constant,
            qubo,
            bqm: BinaryQuadraticModel::from_poly(&h),
        }
    }
}


/// `H` in the forms a sampler consumes.
#[derive(Debug, Clone)]
pub struct CompiledModel {
    /// Keyed by `(i, j)` with `i <= j`; `(i, i)` holds the linear coefficient of `x_i`.
    pub qubo: Map<(usize, usize), f64>,
    pub offset: f64,
    pub bqm: BinaryQuadraticModel,
}

impl CompiledModel {
    pub fn num_variables(&self) -> usize { self.bqm.num_variables() }

    /// Energy from the `qubo` map plus `offset`.
    pub fn energy(&self, x: &[u8]) -> f64 {
        let mut e = self.offset;
        for (&(i, j), &c) in &self.qubo {
            if x[i] != 0 && x[j] != 0 {
                e += c;
            }
        }
        return e
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Graph};
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

    /// Path 0-1-2-3: centrality [0, 2/3, 2/3, 0], edge weights [2/3, 4/3, 2/3], max 4/3.
    fn path4() -> Graph {
        Graph::new(4, vec![
            Edge { u: 0, v: 1, distance: 5.0 },
            Edge { u: 1, v: 2, distance: 5.0 },
            Edge { u: 2, v: 3, distance: 5.0 },
        ])
    }

    const COSTS: [f64; 4] = [1.0, 2.0, 0.5, 0.0];

    #[test]
    fn fixture_all_edges() -> anyhow::Result<()> {
        let unit = Coefficients { a: 1.0, b: 1.0, c_pen: 1.0 };
        let h = Hamiltonian::new(&path4(), &COSTS, 2, unit, StructuralAggregation::AllEdges)?;
        let weights: Vec<f64> = h.edge_terms.iter().map(|t| t.weight).collect();
        assert!(approx(weights[0], 0.5) && approx(weights[1], 1.0) && approx(weights[2], 0.5));

        let t = h.terms(&[1, 0, 0, 1]);
        assert!(approx(t.structural, 1.0));
        assert!(approx(t.cost, 1.0));
        assert!(approx(t.cardinality, 0.0));
        assert!(approx(h.energy(&[1, 0, 0, 1]), 2.0));
        assert!(approx(h.energy(&[0, 0, 0, 0]), 6.0));

        let m = h.compile();
        assert!(approx(m.energy(&[1, 0, 0, 1]), 2.0));
        assert!(approx(m.bqm.energy(&[1, 0, 0, 1]), 2.0));
        assert!(approx(m.bqm.energy(&[0, 0, 0, 0]), 6.0));
        assert!(approx(m.offset, 2.0 + 4.0));
        Ok(())
    }

    #[test]
    fn fixture_default_coefficients() -> anyhow::Result<()> {
        let h = Hamiltonian::new(&path4(), &COSTS, 2, Coefficients::default(), StructuralAggregation::AllEdges)?;
        let m = h.compile();
        assert!(approx(m.bqm.energy(&[1, 0, 0, 1]), 200.0));
        assert!(approx(m.bqm.energy(&[0, 1, 1, 0]), 100.0 * (0.0 + 2.5 + 0.0)));
        Ok(())
    }

    #[test]
    fn nonzero_entries_count_as_selected() -> anyhow::Result<()> {
        let h = Hamiltonian::new(&path4(), &COSTS, 2, Coefficients::default(), StructuralAggregation::AllEdges)?;
        assert_eq!(h.terms(&[2, 0, 0, 7]), h.terms(&[1, 0, 0, 1]));
        Ok(())
    }

    #[test]
    fn cost_count_must_match_nodes() {
        let h = Hamiltonian::new(&path4(), &[1.0, 2.0], 1, Coefficients::default(), StructuralAggregation::AllEdges);
        assert!(h.is_err());
    }

    #[test]
    fn fixture_last_edge_only() -> anyhow::Result<()> {
        let unit = Coefficients { a: 1.0, b: 1.0, c_pen: 1.0 };
        let h = Hamiltonian::new(&path4(), &COSTS, 2, unit, StructuralAggregation::LastEdgeOnly)?;
        assert_eq!(h.edge_terms.len(), 1);
        assert_eq!((h.edge_terms[0].i, h.edge_terms[0].j), (2, 3));
        assert!(approx(h.edge_terms[0].weight, 0.5));
        assert!(approx(h.energy(&[1, 0, 0, 1]), 1.0));
        assert!(approx(h.compile().bqm.energy(&[0, 0, 0, 0]), 4.5));
        Ok(())
    }

    #[test]
    fn no_structure_without_centrality() {
        // a triangle: no node lies between two others
        let g = Graph::new(3, vec![
            Edge { u: 0, v: 1, distance: 1.0 },
            Edge { u: 1, v: 2, distance: 1.0 },
            Edge { u: 0, v: 2, distance: 1.0 },
        ]);
        assert!(structural_terms(&g, StructuralAggregation::AllEdges).is_empty());
        assert!(structural_terms(&Graph::new(3, vec![]), StructuralAggregation::LastEdgeOnly).is_empty());
    }

    #[test]
    fn compiled_map_has_ordered_keys() {
        let h = Hamiltonian::new(&path4(), &COSTS, 2, Coefficients::default(), StructuralAggregation::AllEdges).unwrap();
        let m = h.compile();
        assert!(m.qubo.keys().all(|&(i, j)| i <= j));
        // every pair is coupled through the cardinality term
        assert!(m.qubo.contains_key(&(0, 3)));
    }

    #[test]
    fn aggregation_from_str() {
        assert_eq!("all".parse::<StructuralAggregation>(), Ok(StructuralAggregation::AllEdges));
        assert_eq!("last".parse::<StructuralAggregation>(), Ok(StructuralAggregation::LastEdgeOnly));
        assert!("first".parse::<StructuralAggregation>().is_err());
    }

    proptest! {
        #[test]
        fn cardinality_zero_iff_k_selected(x in proptest::collection::vec(0..2u8, 0..12), k in 0..14usize) {
            let p = cardinality_poly(x.len(), k);
            let selected = x.iter().filter(|&&v| v == 1).count();
            let e = p.evaluate(&x);
            if selected == k {
                prop_assert_eq!(e, 0.0);
            } else {
                prop_assert!(e > 0.0);
            }
        }

        #[test]
        fn compiled_energy_matches_terms(x in proptest::collection::vec(0..2u8, 4), k in 0..5usize) {
            let h = Hamiltonian::new(&path4(), &COSTS, k, Coefficients::default(), StructuralAggregation::AllEdges).unwrap();
            let m = h.compile();
            prop_assert!(approx(h.energy(&x), m.bqm.energy(&x)));
            prop_assert!(approx(h.energy(&x), m.energy(&x)));
        }
    }
}
