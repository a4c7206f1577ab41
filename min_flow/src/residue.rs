//! Residue graph related definitions
//! - ResidueEdge
//! - ResidueGraph
//! - ResidueDirection
//!
use super::flow::{ConstCost, Flow, FlowEdge};
use super::{Cost, FlowRate};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

/// Improvements smaller than this are regarded as rounding noise
/// of the floating point costs.
pub const TOLERANCE: Cost = 0.000_000_001;

// basic definitions

/// Edge attributes used in ResidueGraph
#[derive(Debug, Copy, Clone)]
pub struct ResidueEdge {
    /// The movable amount of the flow
    pub count: FlowRate,
    /// Cost of the unit change of this flow
    pub weight: Cost,
    /// Original edge index of the source graph
    pub target: EdgeIndex,
    /// +1 or -1
    pub direction: ResidueDirection,
}

impl ResidueEdge {
    pub fn new(
        count: FlowRate,
        weight: Cost,
        target: EdgeIndex,
        direction: ResidueDirection,
    ) -> ResidueEdge {
        ResidueEdge {
            count,
            weight,
            target,
            direction,
        }
    }
}

/// Residue direction enum
/// residue edge has two types
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResidueDirection {
    /// Up edge: it can increase(+1) flow
    Up,
    /// Down edge: it can decrease(-1) flow
    Down,
}

/// ResidueGraph definition
pub type ResidueGraph = DiGraph<(), ResidueEdge>;

//
// conversion functions
//

/// Convert FlowGraph with Flow into ResidueGraph.
///
/// FlowGraph and Flow
/// v -> w
///  e = ([l,u],c), f
///
/// into
///
/// ResidueGraph
/// v -> w
///  e1 = (u-f, +c) if u-f>0
/// w -> v
///  e2 = (f-l, -c) if f-l>0
///
/// The node indices of the two graphs are identical.
pub fn flow_to_residue<N, E: FlowEdge + ConstCost>(
    graph: &DiGraph<N, E>,
    flow: &Flow,
) -> ResidueGraph {
    let mut rg: ResidueGraph =
        ResidueGraph::with_capacity(graph.node_count(), 2 * graph.edge_count());
    for _ in 0..graph.node_count() {
        rg.add_node(());
    }
    // create two edges (Up and Down) for each edge
    for er in graph.edge_references() {
        let e = er.id();
        let f = flow[e];
        let ew = er.weight();
        let (v, w) = (er.source(), er.target());
        if f < ew.capacity() {
            // up movable
            let edge = ResidueEdge::new(ew.capacity() - f, ew.cost(), e, ResidueDirection::Up);
            rg.add_edge(v, w, edge);
        }
        if f > ew.demand() {
            // down movable
            let edge = ResidueEdge::new(f - ew.demand(), -ew.cost(), e, ResidueDirection::Down);
            rg.add_edge(w, v, edge);
        }
    }
    rg
}

//
// internal functions to find a update of the flow
// (i.e. the negative cycle in ResidueGraph)
//

fn cycle_weight(graph: &ResidueGraph, edges: &[EdgeIndex]) -> Cost {
    edges.iter().map(|&e| graph[e].weight).sum()
}

fn is_negative_cycle(graph: &ResidueGraph, edges: &[EdgeIndex]) -> bool {
    !edges.is_empty() && cycle_weight(graph, edges) < -TOLERANCE
}

///
/// Update the flow by a negative cycle on a residue graph.
///
fn apply_residual_edges_to_flow(flow: &Flow, rg: &ResidueGraph, edges: &[EdgeIndex]) -> Flow {
    let mut new_flow = flow.clone();

    // (1) determine flow_change_amount
    // that is the minimum of ResidueEdge.count
    let flow_change_amount = edges.iter().map(|&e| rg[e].count).min().unwrap_or(0);

    // (2) apply these changes to the flow along the cycle
    for &edge in edges {
        let ew = rg[edge];
        // convert back to the original edgeindex
        let original_edge = ew.target;
        new_flow[original_edge] = match ew.direction {
            ResidueDirection::Up => flow[original_edge] + flow_change_amount,
            ResidueDirection::Down => flow[original_edge] - flow_change_amount,
        };
    }

    new_flow
}

/// Look for a cycle in the predecessor edges of Bellman-Ford.
/// Each node has at most one predecessor, so the walk from any node
/// either stops at a root or enters a cycle.
fn find_cycle_in_predecessors(
    graph: &ResidueGraph,
    prede: &[Option<EdgeIndex>],
) -> Option<Vec<EdgeIndex>> {
    const UNVISITED: usize = usize::MAX;
    let mut stamp = vec![UNVISITED; prede.len()];
    for start in 0..prede.len() {
        let mut node = start;
        while stamp[node] == UNVISITED {
            stamp[node] = start;
            match prede[node] {
                Some(e) => node = graph.edge_endpoints(e)?.0.index(),
                None => break,
            }
        }
        if stamp[node] != start || prede[node].is_none() {
            continue;
        }
        // `node` is on a cycle. Trace it back.
        let mut edges = vec![];
        let mut current = node;
        loop {
            let e = prede[current]?;
            edges.push(e);
            current = graph.edge_endpoints(e)?.0.index();
            if current == node {
                break;
            }
        }
        edges.reverse();
        if is_negative_cycle(graph, &edges) {
            return Some(edges);
        }
    }
    None
}

/// Bellman-Ford from a virtual root connected to every node by zero-weight edges.
/// Return the edges of a negative cycle if there is.
fn find_negative_cycle_in_whole_graph(graph: &ResidueGraph) -> Option<Vec<EdgeIndex>> {
    let n = graph.node_count();
    let mut dists: Vec<Cost> = vec![0.; n];
    let mut prede: Vec<Option<EdgeIndex>> = vec![None; n];
    for _ in 0..n {
        let mut is_updated = false;
        for er in graph.edge_references() {
            let (from, to) = (er.source().index(), er.target().index());
            let relaxed = dists[from] + er.weight().weight;
            if relaxed < dists[to] - TOLERANCE {
                dists[to] = relaxed;
                prede[to] = Some(er.id());
                is_updated = true;
            }
        }
        if !is_updated {
            return None;
        }
        if let Some(cycle) = find_cycle_in_predecessors(graph, &prede) {
            return Some(cycle);
        }
    }
    None
}

/// create a new improved flow from current flow
/// by upgrading along the negative weight cycle in the residual graph
fn update_flow_in_residue_graph(flow: &Flow, rg: &ResidueGraph) -> Option<Flow> {
    let edges = find_negative_cycle_in_whole_graph(rg)?;
    debug_assert!(is_negative_cycle(rg, &edges));
    trace!(
        "Cycle\t{:.3}\t{:?}",
        cycle_weight(rg, &edges),
        cycle_nodes(rg, &edges)
    );
    Some(apply_residual_edges_to_flow(flow, rg, &edges))
}

//
// public functions
//

/// create a new improved flow from current flow
/// by upgrading along the negative weight cycle in the residual graph
pub fn improve_flow<N, E: FlowEdge + ConstCost>(
    graph: &DiGraph<N, E>,
    flow: &Flow,
) -> Option<Flow> {
    let rg = flow_to_residue(graph, flow);
    update_flow_in_residue_graph(flow, &rg)
}

/// Nodes visited by the negative cycle, for debugging.
pub fn cycle_nodes(graph: &ResidueGraph, edges: &[EdgeIndex]) -> Vec<NodeIndex> {
    edges
        .iter()
        .filter_map(|&e| graph.edge_endpoints(e).map(|(from, _)| from))
        .collect()
}
