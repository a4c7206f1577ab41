//! Flow networks of the transport problems.
//!
//! Nodes and arcs are kept in a `petgraph` arena. A network has one source, one sink,
//! and the amount of flow that must go from the source to the sink.
use crate::error::TransportError;
use min_flow::flow::{ConstCost, FlowEdge, FlowEdgeBase, FlowGraph};
use min_flow::{Cost, Flow, FlowRate};
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::Direction;
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct FlowNetwork {
    graph: FlowGraph,
    source: NodeIndex,
    sink: NodeIndex,
    required: FlowRate,
}

/// Solution of a [FlowNetwork]. Only produced for a feasible network.
#[derive(Debug, Clone)]
pub struct FlowResult {
    pub flow: Flow,
    pub total_cost: Cost,
}

impl FlowResult {
    pub fn flow_on(&self, arc: EdgeIndex) -> FlowRate {
        self.flow[arc]
    }
}

impl FlowNetwork {
    /// Network with only the source and the sink.
    pub fn new(required: FlowRate) -> Self {
        let mut graph = FlowGraph::new();
        let source = graph.add_node(());
        let sink = graph.add_node(());
        Self {
            graph,
            source,
            sink,
            required,
        }
    }
    pub fn add_node(&mut self) -> NodeIndex {
        self.graph.add_node(())
    }
    pub fn add_arc(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        capacity: FlowRate,
        cost: Cost,
    ) -> EdgeIndex {
        self.graph
            .add_edge(from, to, FlowEdgeBase::with_capacity(capacity, cost))
    }
    /// Add `left[i] -> right[j]` for each `(i, j)` in `pairs`, with the cost `cost(i, j)`.
    /// The costs are computed in parallel.
    pub fn add_transport_arcs<F>(
        &mut self,
        left: &[NodeIndex],
        right: &[NodeIndex],
        pairs: &[(usize, usize)],
        capacity: FlowRate,
        cost: F,
    ) -> Vec<EdgeIndex>
    where
        F: Fn(usize, usize) -> Cost + Sync,
    {
        let costs: Vec<Cost> = pairs.par_iter().map(|&(i, j)| cost(i, j)).collect();
        pairs
            .iter()
            .zip(costs)
            .map(|(&(i, j), c)| self.add_arc(left[i], right[j], capacity, c))
            .collect()
    }
    pub fn source(&self) -> NodeIndex {
        self.source
    }
    pub fn sink(&self) -> NodeIndex {
        self.sink
    }
    pub fn required(&self) -> FlowRate {
        self.required
    }
    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
    pub fn arc_count(&self) -> usize {
        self.graph.edge_count()
    }
    pub fn capacity(&self, arc: EdgeIndex) -> FlowRate {
        self.graph[arc].capacity()
    }
    pub fn cost(&self, arc: EdgeIndex) -> Cost {
        ConstCost::cost(&self.graph[arc])
    }
    /// Every node other than the terminals has both an incoming and an outgoing arc.
    pub fn is_connected(&self) -> bool {
        let terminals = [self.source, self.sink];
        self.graph
            .node_indices()
            .filter(|v| !terminals.contains(v))
            .all(|v| {
                let has_in = self.graph.edges_directed(v, Direction::Incoming).next();
                let has_out = self.graph.edges_directed(v, Direction::Outgoing).next();
                has_in.is_some() && has_out.is_some()
            })
    }
    /// The arcs out of the source can carry the required flow.
    pub fn can_emit_required(&self) -> bool {
        let emittable = self
            .graph
            .edges_directed(self.source, Direction::Outgoing)
            .try_fold(0usize, |acc, er| acc.checked_add(er.weight().capacity()));
        emittable.map_or(true, |emittable| self.required <= emittable)
    }
    pub fn is_well_formed(&self) -> bool {
        self.is_connected() && self.can_emit_required()
    }
    /// Solve the min-cost flow. An infeasible network is an error.
    pub fn solve(&self) -> Result<FlowResult, TransportError> {
        debug_assert!(self.is_connected(), "a node without in- or out-arcs");
        if !self.can_emit_required() {
            warn!("MinCostFlow\tShortSupply\tRequired:{}", self.required);
            return Err(TransportError::Infeasible {
                required: self.required,
            });
        }
        debug!(
            "MinCostFlow\tNodes:{}\tArcs:{}\tRequired:{}",
            self.node_count(),
            self.arc_count(),
            self.required
        );
        match min_flow::min_cost_st_flow(&self.graph, self.source, self.sink, self.required) {
            Some((flow, total_cost)) => {
                debug!("MinCostFlow\tTotalCost:{}", total_cost);
                Ok(FlowResult { flow, total_cost })
            }
            None => {
                warn!("MinCostFlow\tInfeasible\tRequired:{}", self.required);
                Err(TransportError::Infeasible {
                    required: self.required,
                })
            }
        }
    }
}

/// `a * b`, or an error on overflow.
pub fn checked_mul(a: usize, b: usize) -> Result<usize, TransportError> {
    a.checked_mul(b).ok_or(TransportError::CapacityOverflow)
}

/// All the `n x m` pairs.
pub fn dense_pairs(n: usize, m: usize) -> Vec<(usize, usize)> {
    (0..n).flat_map(|i| (0..m).map(move |j| (i, j))).collect()
}

/// Pairs used by one feasible transport plan from `supplies` to `demands`,
/// by the north-west corner rule. If the total supply is short,
/// the plan stops when the supply runs out.
pub fn feasible_plan(supplies: &[FlowRate], demands: &[FlowRate]) -> Vec<(usize, usize)> {
    let mut pairs = vec![];
    let (mut i, mut j) = (0, 0);
    let (mut supply, mut demand) = (
        supplies.first().copied().unwrap_or(0),
        demands.first().copied().unwrap_or(0),
    );
    while i < supplies.len() && j < demands.len() {
        if supply == 0 {
            i += 1;
            supply = supplies.get(i).copied().unwrap_or(0);
            continue;
        }
        if demand == 0 {
            j += 1;
            demand = demands.get(j).copied().unwrap_or(0);
            continue;
        }
        pairs.push((i, j));
        let amount = supply.min(demand);
        supply -= amount;
        demand -= amount;
    }
    pairs
}

/// Sort and remove the duplicated pairs.
pub fn dedup_pairs(mut pairs: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    pairs.sort_unstable();
    pairs.dedup();
    pairs
}
