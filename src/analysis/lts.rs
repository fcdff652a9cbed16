//! 覆盖图到带标签迁移系统的投影.
use crate::analysis::coverability::CoverabilityGraph;
use crate::graph::ts::{TransitionSystem, TsError};
use crate::net::ids::StateId;

/// 每个节点对应一个状态 (命名为 `s<节点序号>`, 附带其标识), 每条边对应一条
/// 以迁移标签命名的弧; 初始节点成为初始状态. 每次调用都返回独立的新系统.
pub fn to_lts(graph: &CoverabilityGraph) -> Result<TransitionSystem, TsError> {
    let mut lts = TransitionSystem::new(format!("{}-{}", graph.net_name(), graph.mode()));
    let mut states: Vec<StateId> = Vec::with_capacity(graph.node_count());
    for (_, node) in graph.nodes() {
        let state = lts.create_fresh_state();
        lts.attach_marking(state, node.marking().clone())?;
        states.push(state);
    }

    for (source, edge, target) in graph.edges() {
        lts.create_arc(states[source.index()], edge.label.clone(), states[target.index()])?;
    }
    lts.set_initial_state(states[graph.initial_node().index()])?;
    Ok(lts)
}

impl CoverabilityGraph {
    pub fn to_lts(&self) -> Result<TransitionSystem, TsError> {
        to_lts(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::coverability::ExplorationMode;
    use crate::net::Net;
    use crate::net::token::Token;

    fn twin_transitions() -> Net {
        let mut net = Net::new("twins");
        net.create_place_with_tokens("p", 1).unwrap();
        net.create_place("q").unwrap();
        net.create_labeled_transition("t1", "a").unwrap();
        net.create_labeled_transition("t2", "a").unwrap();
        for t in ["t1", "t2"] {
            net.create_flow("p", t, 1).unwrap();
            net.create_flow(t, "q", 1).unwrap();
        }
        net
    }

    #[test]
    fn parallel_edges_survive_projection() {
        let net = twin_transitions();
        let graph = CoverabilityGraph::build(&net, ExplorationMode::Reachability).unwrap();
        let lts = graph.to_lts().unwrap();

        assert_eq!(lts.num_states(), 2);
        assert_eq!(lts.num_arcs(), 2);
        let initial = lts.initial_state().unwrap();
        let labels: Vec<_> = lts
            .postset_arcs(initial)
            .map(|arc| arc.label.as_str())
            .collect();
        assert_eq!(labels, vec!["a", "a"]);
        assert_eq!(lts.name(), "twins-reachability");
    }

    #[test]
    fn states_carry_their_markings() {
        let net = twin_transitions();
        let graph = CoverabilityGraph::build(&net, ExplorationMode::Coverability).unwrap();
        let lts = to_lts(&graph).unwrap();

        let initial = lts.initial_state().unwrap();
        let marking = lts.state(initial).unwrap().marking.as_ref().unwrap();
        assert_eq!(net.token(marking, "p").unwrap(), Token::Finite(1));
        assert_eq!(lts.state(initial).unwrap().name, "s0");
    }

    #[test]
    fn repeated_projection_yields_independent_systems() {
        let net = twin_transitions();
        let graph = CoverabilityGraph::build(&net, ExplorationMode::Coverability).unwrap();
        let mut first = graph.to_lts().unwrap();
        let second = graph.to_lts().unwrap();

        let s = first.create_fresh_state();
        first.create_arc(s, "extra", s).unwrap();
        assert_eq!(first.num_arcs(), 3);
        assert_eq!(second.num_arcs(), 2);
        assert_eq!(second.num_states(), 2);
    }
}
