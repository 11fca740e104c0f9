use super::AggregateGraph;
use crate::algorithms::labels;
use crate::core::models::network::ContactNetwork;
use tracing::debug;

const CODELENGTH_EPSILON: f64 = 1e-10;
const MAX_PASSES: usize = 100;

#[inline]
fn plogp(p: f64) -> f64 {
    if p > 0.0 { p * p.log2() } else { 0.0 }
}

/// Module-level terms of the two-level map equation.
///
/// Node-visit entropy is constant for a given network and is left out, so only
/// differences of [`MapEquation::codelength`] are meaningful.
struct MapEquation {
    exit: Vec<f64>,
    flow: Vec<f64>,
    exit_total: f64,
}

impl MapEquation {
    fn module_terms(exit: f64, flow: f64) -> f64 {
        -2.0 * plogp(exit) + plogp(exit + flow)
    }

    fn codelength(&self) -> f64 {
        plogp(self.exit_total)
            + self
                .exit
                .iter()
                .zip(&self.flow)
                .map(|(&e, &f)| Self::module_terms(e, f))
                .sum::<f64>()
    }
}

/// Local moving under the map equation. Returns whether any node moved.
fn optimize(graph: &AggregateGraph, partition: &mut [usize]) -> bool {
    let n = graph.len();
    let total = graph.total_strength;
    let node_flow: Vec<f64> = graph.strength.iter().map(|s| s / total).collect();
    let node_exit: Vec<f64> = graph
        .neighbors
        .iter()
        .map(|nbrs| nbrs.iter().map(|&(_, w)| w).sum::<f64>() / total)
        .collect();

    let mut state = MapEquation {
        exit: vec![0.0; n],
        flow: vec![0.0; n],
        exit_total: 0.0,
    };
    for v in 0..n {
        let c = partition[v];
        state.flow[c] += node_flow[v];
        for &(u, w) in &graph.neighbors[v] {
            if partition[u] != c {
                state.exit[c] += w / total;
            }
        }
    }
    state.exit_total = state.exit.iter().sum();

    let mut any_moved = false;
    for _ in 0..MAX_PASSES {
        let mut moved = false;
        for v in 0..n {
            let from = partition[v];
            let links = graph.community_links(v, partition);
            let link_from = links
                .iter()
                .find(|(c, _)| *c == from)
                .map_or(0.0, |&(_, w)| w / total);

            let exit_from = state.exit[from] - node_exit[v] + 2.0 * link_from;
            let flow_from = state.flow[from] - node_flow[v];

            let mut best: Option<(usize, f64, f64, f64)> = None;
            let mut best_delta = -CODELENGTH_EPSILON;
            for &(to, w) in &links {
                if to == from {
                    continue;
                }
                let link_to = w / total;
                let exit_to = state.exit[to] + node_exit[v] - 2.0 * link_to;
                let flow_to = state.flow[to] + node_flow[v];
                let exit_total =
                    state.exit_total - state.exit[from] - state.exit[to] + exit_from + exit_to;
                let delta = plogp(exit_total) - plogp(state.exit_total)
                    + MapEquation::module_terms(exit_from, flow_from)
                    + MapEquation::module_terms(exit_to, flow_to)
                    - MapEquation::module_terms(state.exit[from], state.flow[from])
                    - MapEquation::module_terms(state.exit[to], state.flow[to]);
                if delta < best_delta {
                    best_delta = delta;
                    best = Some((to, exit_to, flow_to, exit_total));
                }
            }

            if let Some((to, exit_to, flow_to, exit_total)) = best {
                state.exit[from] = exit_from;
                state.flow[from] = flow_from;
                state.exit[to] = exit_to;
                state.flow[to] = flow_to;
                state.exit_total = exit_total;
                partition[v] = to;
                moved = true;
            }
        }
        if !moved {
            break;
        }
        any_moved = true;
    }
    debug!(codelength = state.codelength(), "Map equation pass finished.");
    any_moved
}

/// Two-level Infomap: greedy map-equation minimization with repeated aggregation.
pub fn infomap(network: &ContactNetwork) -> Vec<usize> {
    let mut graph = AggregateGraph::from_network(network);
    let mut membership: Vec<usize> = (0..network.len()).collect();
    if graph.total_strength == 0.0 {
        return membership;
    }

    loop {
        let mut partition: Vec<usize> = (0..graph.len()).collect();
        if !optimize(&graph, &mut partition) {
            break;
        }
        let partition = labels::compact(&partition);
        for m in membership.iter_mut() {
            *m = partition[*m];
        }
        graph = graph.aggregate(&partition);
    }
    labels::compact(&membership)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    #[test]
    fn finds_disconnected_components() {
        assert_eq!(infomap(&two_cliques(4)), halves(4));
    }

    #[test]
    fn splits_a_barbell_at_the_bridge() {
        assert_eq!(infomap(&barbell(5)), halves(5));
    }

    #[test]
    fn plogp_is_zero_at_zero() {
        assert_eq!(plogp(0.0), 0.0);
        assert!((plogp(0.5) + 0.5).abs() < 1e-12);
    }
}
