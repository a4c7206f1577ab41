//!
//! Zero demand flow graphs
//! for finding init valid flow
//!
use super::flow::{Flow, FlowEdge, FlowEdgeRaw};
use super::min_cost_flow_from_zero;
use super::{Cost, FlowRate};
use petgraph::graph::{DiGraph, EdgeIndex};
use petgraph::visit::EdgeRef;

// basic definitions

#[derive(Debug, Copy, Clone)]
pub struct ZeroDemandEdgeInfo {
    /// edge id in original graph
    origin: EdgeIndex,
    /// identifier of type-A or type-B
    kind: ZeroDemandEdgeKind,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ZeroDemandEdgeKind {
    /// represents type-A edge
    /// e = ([0,l],-1)
    BelowDemand,
    /// represents type-B edge
    /// e = ([0,u-l],0)
    AboveDemand,
}

pub type ZeroDemandFlowEdge = FlowEdgeRaw<ZeroDemandEdgeInfo>;

impl ZeroDemandFlowEdge {
    pub fn new(
        demand: FlowRate,
        capacity: FlowRate,
        cost: Cost,
        origin: EdgeIndex,
        kind: ZeroDemandEdgeKind,
    ) -> ZeroDemandFlowEdge {
        ZeroDemandFlowEdge {
            demand,
            capacity,
            cost,
            info: ZeroDemandEdgeInfo { origin, kind },
        }
    }
}
pub type ZeroDemandFlowGraph = DiGraph<(), ZeroDemandFlowEdge>;

// conversion functions

/// Convert normal FlowGraph to ZeroDemandGraph
/// (min-cost-flow on ZeroDemandGraph) == (one of the valid flow on FlowGraph)
fn to_zero_demand_graph<N, E: FlowEdge>(graph: &DiGraph<N, E>) -> ZeroDemandFlowGraph {
    let mut zdg: ZeroDemandFlowGraph =
        ZeroDemandFlowGraph::with_capacity(graph.node_count(), 2 * graph.edge_count());
    for _ in 0..graph.node_count() {
        zdg.add_node(());
    }
    // create two edges (type-A and type-B) for each edge
    for er in graph.edge_references() {
        let e = er.id();
        let ew = er.weight();
        let (v, w) = (er.source(), er.target());
        let below = ZeroDemandFlowEdge::new(0, ew.demand(), -1., e, ZeroDemandEdgeKind::BelowDemand);
        let above = ZeroDemandFlowEdge::new(
            0,
            ew.capacity() - ew.demand(),
            0.,
            e,
            ZeroDemandEdgeKind::AboveDemand,
        );
        zdg.add_edge(v, w, below);
        zdg.add_edge(v, w, above);
    }
    zdg
}

/// Convert-back to the original flow
/// Given the converted zero-demand graph and a flow on it (zd_graph, zd_flow),
/// this calculates the original flow on the original graph.
/// For each edge $e$ in the original graph,
/// there is
/// - type-A edge $ea$
/// - type-B edge $eb$
/// and the sum of the flows of the two is the flow of original edge $e$.
fn zero_demand_flow_to_original_flow<N, E: FlowEdge>(
    graph: &DiGraph<N, E>,
    zd_flow: &Flow,
    zd_graph: &ZeroDemandFlowGraph,
) -> Flow {
    let mut flow = Flow::new(graph.edge_count(), 0);
    for er in zd_graph.edge_references() {
        let original_edge = er.weight().info.origin;
        flow[original_edge] += zd_flow[er.id()];
    }
    flow
}

///
/// All the type-A edges are saturated iff
/// the demands of the original graph are satisfied.
///
fn is_demand_satisfied(zd_graph: &ZeroDemandFlowGraph, zd_flow: &Flow) -> bool {
    zd_graph
        .edge_references()
        .filter(|er| er.weight().info.kind == ZeroDemandEdgeKind::BelowDemand)
        .all(|er| zd_flow[er.id()] == er.weight().capacity)
}

// public function

///
/// Find initial flow of the FlowGraph, by
/// 1. convert to ZeroDemandFlowGraph
/// 2. find the min-cost-flow on the zero demand graph
/// 3. convert it back to the valid flow on the original graph
///
/// Return `None` if there is no valid flow.
///
pub fn find_initial_flow<N, E: FlowEdge>(graph: &DiGraph<N, E>) -> Option<Flow> {
    let zdg = to_zero_demand_graph(graph);
    let zd_flow = min_cost_flow_from_zero(&zdg);
    if is_demand_satisfied(&zdg, &zd_flow) {
        Some(zero_demand_flow_to_original_flow(graph, &zd_flow, &zdg))
    } else {
        debug!(
            "No valid flow. Demand:{}",
            sum_of_demand(graph)
        );
        None
    }
}

// utils

///
/// To determine all-zero flow is valid or not
/// we should know whether the given graph is demand-less
/// that is all demands of the edges are 0.
///
pub fn is_zero_demand_flow_graph<N, E: FlowEdge>(graph: &DiGraph<N, E>) -> bool {
    graph.edge_references().all(|er| er.weight().demand() == 0)
}

///
/// sum of edge demand
///
fn sum_of_demand<N, E: FlowEdge>(graph: &DiGraph<N, E>) -> FlowRate {
    graph.edge_references().map(|er| er.weight().demand()).sum()
}
