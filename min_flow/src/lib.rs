// Originally written by Ryo Nakabayashi, 2022.
// Modified by Bansho Masutani, 2022.

pub mod flow;
pub mod mocks;
pub mod residue;
pub mod vector;
pub mod zero_demand;
pub use flow::total_cost;
use flow::{is_valid_flow, ConstCost, FlowEdge, FlowEdgeBase, FlowGraph};
pub use flow::Flow;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use residue::improve_flow;
use zero_demand::{find_initial_flow, is_zero_demand_flow_graph};
#[macro_use]
extern crate log;

/// type of a flow (on edges) in min-flow.
pub type FlowRate = usize;

/// type of a cost (of edges per unit flow) in min-flow.
pub type Cost = f64;

//
// public functions
//

///
/// Find minimum cost flow on the FlowGraph
///
pub fn min_cost_flow<N, E>(graph: &DiGraph<N, E>) -> Option<Flow>
where
    E: FlowEdge + ConstCost,
{
    let init_flow = find_initial_flow(graph)?;
    Some(min_cost_flow_from(graph, &init_flow))
}

///
/// Find the minimum cost flow sending exactly `required` units from `source` to `sink`.
///
/// Internally, an edge `sink -> source` with `[required, required], 0` closes the circulation.
/// Return the flow on the edges of `graph` and its total cost,
/// or `None` if `required` units can not be sent.
///
pub fn min_cost_st_flow<N, E>(
    graph: &DiGraph<N, E>,
    source: NodeIndex,
    sink: NodeIndex,
    required: FlowRate,
) -> Option<(Flow, Cost)>
where
    E: FlowEdge + ConstCost,
{
    let mut circulation: FlowGraph = graph.map(
        |_, _| (),
        |_, ew| FlowEdgeBase::new(ew.demand(), ew.capacity(), ew.cost()),
    );
    circulation.add_edge(sink, source, FlowEdgeBase::new(required, required, 0.));
    let mut flow = min_cost_flow(&circulation)?;
    flow.truncate(graph.edge_count());
    let cost = graph
        .edge_references()
        .map(|er| er.weight().cost() * flow[er.id()] as Cost)
        .sum();
    Some((flow, cost))
}

//
// internal functions
//

///
/// Find minimum cost flow of the special FlowGraph, whose demand is always zero.
///
fn min_cost_flow_from_zero<N, E: FlowEdge + ConstCost>(graph: &DiGraph<N, E>) -> Flow {
    assert!(is_zero_demand_flow_graph(graph));
    let flow = Flow::new(graph.edge_count(), 0);
    min_cost_flow_from(graph, &flow)
}

///
/// Find minimum cost by starting from the specified flow values.
///
fn min_cost_flow_from<N, E: FlowEdge + ConstCost>(graph: &DiGraph<N, E>, init_flow: &Flow) -> Flow {
    let mut flow = init_flow.clone();
    let mut num_cycles = 0;
    while let Some(new_flow) = improve_flow(graph, &flow) {
        debug_assert!(is_valid_flow(&new_flow, graph));
        flow = new_flow;
        num_cycles += 1;
    }
    trace!("Canceled {} negative cycles", num_cycles);
    flow
}
