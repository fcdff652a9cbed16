//! 覆盖图 / 可达图构造 (Karp-Miller, 节点共享版本).
//!
//! 从初始标识出发按广度优先探索. 覆盖图模式下, 新标识若严格覆盖其祖先链上
//! 某个标识, 则将严格增长的库所加宽为 ω, 保证探索终止; 可达图模式不做加宽,
//! 调用方需事先确认网是有界的, 否则探索不会停止.
//!
//! 标识相同的状态共享同一节点, 同标签的平行边全部保留.
//! 迁移按编号顺序发生, 因此同一个网总是得到同一张图. 加宽沿节点的创建路径进行,
//! 改变迁移的创建顺序可能得到不同的覆盖图 (可达图不受影响).
//! 构造结果以扩展的形式缓存在网上, 第一次结构变化时失效.
use std::collections::VecDeque;
use std::fmt::{self, Write as FmtWrite};
use std::rc::Rc;

use indexmap::IndexMap;
use log::{debug, info, trace, warn};
use petgraph::Direction;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ExplorationConfig;
use crate::graph::extension::{Extensible, StructuralExtensionRemover};
use crate::net::core::{escape_label, FireError, NetId};
use crate::net::ids::TransitionId;
use crate::net::marking::Marking;
use crate::net::Net;
use crate::util::cancel::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplorationMode {
    /// 带 ω 加宽的 Karp-Miller 构造, 总会终止.
    Coverability,
    /// 不加宽的直接探索, 仅对有界网终止.
    Reachability,
}

impl ExplorationMode {
    /// 该模式的图在网上缓存时使用的扩展键.
    pub fn extension_key(self) -> &'static str {
        match self {
            ExplorationMode::Coverability => "coverability",
            ExplorationMode::Reachability => "reachability",
        }
    }
}

impl fmt::Display for ExplorationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension_key())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("state space exploration was cancelled")]
    Cancelled,
    #[error(transparent)]
    Fire(#[from] FireError),
}

/// 一个已探索的标识.
///
/// `parent` 是首次到达本节点时的来源节点, 沿 `parent` 上溯即得覆盖判定所用的祖先链.
#[derive(Debug, Clone)]
pub struct CoverabilityGraphNode {
    marking: Marking,
    parent: Option<NodeIndex>,
    via: Option<TransitionId>,
}

impl CoverabilityGraphNode {
    pub fn marking(&self) -> &Marking {
        &self.marking
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// 从父节点创建本节点时发生的迁移.
    pub fn via(&self) -> Option<TransitionId> {
        self.via
    }
}

impl PartialEq for CoverabilityGraphNode {
    fn eq(&self, other: &Self) -> bool {
        self.marking == other.marking
    }
}

impl Eq for CoverabilityGraphNode {}

impl fmt::Display for CoverabilityGraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.marking, f)
    }
}

/// 一次已探索的迁移发生.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverabilityGraphEdge {
    pub transition: TransitionId,
    pub label: String,
}

#[derive(Debug)]
pub struct CoverabilityGraph {
    graph: Graph<CoverabilityGraphNode, CoverabilityGraphEdge>,
    initial: NodeIndex,
    markings: IndexMap<Marking, NodeIndex>,
    mode: ExplorationMode,
    net: NetId,
    net_name: String,
}

impl CoverabilityGraph {
    /// 重新构造, 不读写缓存.
    pub fn build(net: &Net, mode: ExplorationMode) -> Result<Self, BuildError> {
        CoverabilityGraphBuilder::new(mode).build(net)
    }

    /// 取网上缓存的图, 没有则构造并缓存.
    pub fn get_cached(net: &mut Net, mode: ExplorationMode) -> Result<Rc<Self>, BuildError> {
        CoverabilityGraphBuilder::new(mode).get_cached(net)
    }

    pub fn mode(&self) -> ExplorationMode {
        self.mode
    }

    pub fn is_reachability_graph(&self) -> bool {
        self.mode == ExplorationMode::Reachability
    }

    pub fn net_id(&self) -> NetId {
        self.net
    }

    pub fn net_name(&self) -> &str {
        &self.net_name
    }

    /// 底层的 petgraph 图, 供图算法直接使用.
    pub fn graph(&self) -> &Graph<CoverabilityGraphNode, CoverabilityGraphEdge> {
        &self.graph
    }

    pub fn initial_node(&self) -> NodeIndex {
        self.initial
    }

    pub fn node(&self, node: NodeIndex) -> &CoverabilityGraphNode {
        &self.graph[node]
    }

    /// 按创建顺序列出节点.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &CoverabilityGraphNode)> {
        self.graph
            .node_indices()
            .map(move |index| (index, &self.graph[index]))
    }

    /// 按创建顺序列出边, 形如 `(source, edge, target)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, &CoverabilityGraphEdge, NodeIndex)> {
        self.graph
            .edge_references()
            .map(|edge| (edge.source(), edge.weight(), edge.target()))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_for(&self, marking: &Marking) -> Option<NodeIndex> {
        self.markings.get(marking).copied()
    }

    pub fn has_omega(&self) -> bool {
        self.graph
            .node_weights()
            .any(|node| node.marking.has_omega())
    }

    /// `node` 的出边, 按创建顺序.
    pub fn postset_edges(&self, node: NodeIndex) -> Vec<(&CoverabilityGraphEdge, NodeIndex)> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.weight(), edge.target()))
            .collect();
        edges.sort_by_key(|(id, _, _)| *id);
        edges
            .into_iter()
            .map(|(_, weight, target)| (weight, target))
            .collect()
    }

    /// `node` 的入边, 按创建顺序.
    pub fn preset_edges(&self, node: NodeIndex) -> Vec<(NodeIndex, &CoverabilityGraphEdge)> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|edge| (edge.id(), edge.source(), edge.weight()))
            .collect();
        edges.sort_by_key(|(id, _, _)| *id);
        edges
            .into_iter()
            .map(|(_, source, weight)| (source, weight))
            .collect()
    }

    /// 首次到达 `node` 的路径上依次发生的迁移.
    pub fn firing_sequence(&self, node: NodeIndex) -> Vec<TransitionId> {
        let mut sequence = Vec::new();
        let mut current = &self.graph[node];
        while let (Some(parent), Some(via)) = (current.parent, current.via) {
            sequence.push(via);
            current = &self.graph[parent];
        }
        sequence.reverse();
        sequence
    }

    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        let _ = writeln!(
            &mut dot,
            "digraph \"{}-{}\" {{",
            escape_label(&self.net_name),
            self.mode
        );
        for (index, node) in self.nodes() {
            let shape = if index == self.initial {
                "doublecircle"
            } else {
                "circle"
            };
            let _ = writeln!(
                &mut dot,
                "    s{} [label=\"{}\", shape={}];",
                index.index(),
                node.marking,
                shape
            );
        }
        for (source, edge, target) in self.edges() {
            let _ = writeln!(
                &mut dot,
                "    s{} -> s{} [label=\"{}\"];",
                source.index(),
                target.index(),
                escape_label(&edge.label)
            );
        }
        let _ = writeln!(&mut dot, "}}");
        dot
    }
}

/// 配置并执行一次探索.
#[derive(Debug, Clone)]
pub struct CoverabilityGraphBuilder {
    mode: ExplorationMode,
    config: ExplorationConfig,
    cancel: CancellationToken,
}

impl CoverabilityGraphBuilder {
    pub fn new(mode: ExplorationMode) -> Self {
        Self {
            mode,
            config: ExplorationConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// 使用配置中的默认模式.
    pub fn from_config(config: ExplorationConfig) -> Self {
        Self::new(config.default_mode).with_config(config)
    }

    pub fn with_config(mut self, config: ExplorationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn mode(&self) -> ExplorationMode {
        self.mode
    }

    /// 返回网上缓存的图; 没有则构造、缓存, 并为该键注册一个
    /// [`StructuralExtensionRemover`] (已注册时不重复注册).
    ///
    /// 被取消的构造不缓存任何内容.
    pub fn get_cached(&self, net: &mut Net) -> Result<Rc<CoverabilityGraph>, BuildError> {
        let key = self.mode.extension_key();
        if let Some(graph) = net.get_extension::<CoverabilityGraph>(key) {
            debug!("reusing cached {} graph of net `{}`", self.mode, net.name());
            return Ok(graph);
        }

        debug!("no cached {} graph for net `{}`, building", self.mode, net.name());
        let graph = Rc::new(self.build(net)?);
        net.put_extension(key, Rc::clone(&graph));
        if !net.extensions().has_remover_for(key) {
            net.add_listener(Rc::new(StructuralExtensionRemover::new(key)));
        }
        Ok(graph)
    }

    pub fn build(&self, net: &Net) -> Result<CoverabilityGraph, BuildError> {
        let initial_marking = net.initial_marking();
        let mut graph = Graph::new();
        let mut markings = IndexMap::new();
        let mut worklist = VecDeque::new();

        let initial = graph.add_node(CoverabilityGraphNode {
            marking: initial_marking.clone(),
            parent: None,
            via: None,
        });
        markings.insert(initial_marking, initial);
        worklist.push_back(initial);

        let mut explored = 0usize;
        while let Some(current) = worklist.pop_front() {
            explored += 1;
            if self.config.progress_interval > 0 && explored % self.config.progress_interval == 0 {
                info!(
                    "{} graph of `{}`: {} nodes explored, {} pending",
                    self.mode,
                    net.name(),
                    explored,
                    worklist.len()
                );
            }

            let marking = graph[current].marking.clone();
            for transition in net.enabled_transitions(&marking)? {
                if self.cancel.is_cancelled() {
                    warn!(
                        "{} graph construction of `{}` cancelled after {} nodes",
                        self.mode,
                        net.name(),
                        graph.node_count()
                    );
                    return Err(BuildError::Cancelled);
                }

                let mut next = net.fire(&marking, transition)?;
                if self.mode == ExplorationMode::Coverability {
                    if let Some(widened) = widen(&graph, current, &next) {
                        next = widened;
                    }
                }

                let target = match markings.get(&next) {
                    Some(&existing) => existing,
                    None => {
                        let created = graph.add_node(CoverabilityGraphNode {
                            marking: next.clone(),
                            parent: Some(current),
                            via: Some(transition),
                        });
                        markings.insert(next, created);
                        worklist.push_back(created);
                        created
                    }
                };

                let label = net
                    .transition(transition)
                    .ok_or(FireError::NoSuchTransition(transition))?
                    .label
                    .clone();
                graph.add_edge(current, target, CoverabilityGraphEdge { transition, label });
            }
        }

        info!(
            "built {} graph of `{}`: {} nodes, {} edges",
            self.mode,
            net.name(),
            graph.node_count(),
            graph.edge_count()
        );

        Ok(CoverabilityGraph {
            graph,
            initial,
            markings,
            mode: self.mode,
            net: net.id(),
            net_name: net.name().to_string(),
        })
    }
}

/// 沿 `from` 的祖先链 (含 `from` 本身) 找到第一个被 `fired` 严格覆盖的标识并加宽.
fn widen(
    graph: &Graph<CoverabilityGraphNode, CoverabilityGraphEdge>,
    from: NodeIndex,
    fired: &Marking,
) -> Option<Marking> {
    let mut ancestor = Some(from);
    while let Some(index) = ancestor {
        let node = &graph[index];
        if node.marking != *fired {
            if let Some(widened) = fired.cover(&node.marking) {
                trace!("widened {} against ancestor {} to {}", fired, node.marking, widened);
                return Some(widened);
            }
        }
        ancestor = node.parent;
    }
    None
}

/// 网上缓存的覆盖图.
pub fn get_cached_coverability_graph(net: &mut Net) -> Result<Rc<CoverabilityGraph>, BuildError> {
    CoverabilityGraph::get_cached(net, ExplorationMode::Coverability)
}

/// 网上缓存的可达图; 调用方需保证网有界.
pub fn get_cached_reachability_graph(net: &mut Net) -> Result<Rc<CoverabilityGraph>, BuildError> {
    CoverabilityGraph::get_cached(net, ExplorationMode::Reachability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::token::Token;

    fn generator() -> Net {
        let mut net = Net::new("generator");
        net.create_place_with_tokens("p0", 1).unwrap();
        net.create_place("p1").unwrap();
        net.create_transition("t").unwrap();
        net.create_flow("p0", "t", 1).unwrap();
        net.create_flow("t", "p0", 1).unwrap();
        net.create_flow("t", "p1", 1).unwrap();
        net
    }

    #[test]
    fn generator_is_widened_to_omega() {
        let net = generator();
        let graph = CoverabilityGraph::build(&net, ExplorationMode::Coverability).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.has_omega());

        let widened = net
            .marking([("p0", Token::Finite(1)), ("p1", Token::Omega)])
            .unwrap();
        let omega_node = graph.node_for(&widened).expect("widened node");
        let initial = graph.initial_node();
        let successors: Vec<_> = graph
            .postset_edges(initial)
            .into_iter()
            .map(|(_, target)| target)
            .collect();
        assert_eq!(successors, vec![omega_node]);
        let loops: Vec<_> = graph
            .postset_edges(omega_node)
            .into_iter()
            .map(|(edge, target)| (edge.label.as_str(), target))
            .collect();
        assert_eq!(loops, vec![("t", omega_node)]);
        assert_eq!(graph.firing_sequence(omega_node), vec![net.transition_id("t").unwrap()]);
        assert_eq!(graph.node(omega_node).parent(), Some(initial));
    }

    #[test]
    fn widening_only_looks_at_ancestors() {
        // The t1 successor strictly covers its t0 sibling, which is not an ancestor.
        let mut net = Net::new("branches");
        net.create_place_with_tokens("p0", 1).unwrap();
        net.create_place("a").unwrap();
        net.create_place("b").unwrap();
        net.create_transition("t0").unwrap();
        net.create_transition("t1").unwrap();
        net.create_flow("p0", "t0", 1).unwrap();
        net.create_flow("t0", "a", 1).unwrap();
        net.create_flow("p0", "t1", 1).unwrap();
        net.create_flow("t1", "a", 1).unwrap();
        net.create_flow("t1", "b", 1).unwrap();

        let graph = CoverabilityGraph::build(&net, ExplorationMode::Coverability).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(!graph.has_omega());
    }

    #[test]
    fn reachability_mode_never_widens() {
        let mut net = Net::new("counter");
        net.create_place_with_tokens("p", 3).unwrap();
        net.create_transition("t").unwrap();
        net.create_flow("p", "t", 1).unwrap();

        let graph = CoverabilityGraph::build(&net, ExplorationMode::Reachability).unwrap();
        assert!(graph.is_reachability_graph());
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert!(!graph.has_omega());
    }

    #[test]
    fn cancelled_builds_fail_and_cache_nothing() {
        let mut net = generator();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let builder = CoverabilityGraphBuilder::new(ExplorationMode::Coverability)
            .with_cancellation(cancel);

        assert_eq!(builder.get_cached(&mut net).unwrap_err(), BuildError::Cancelled);
        assert!(!net.has_extension("coverability"));
        assert_eq!(net.extensions().listener_count(), 0);
    }

    #[test]
    fn cache_is_keyed_by_mode() {
        let mut net = Net::new("bounded");
        net.create_place_with_tokens("p", 1).unwrap();
        net.create_transition("t").unwrap();
        net.create_flow("p", "t", 1).unwrap();
        net.create_flow("t", "p", 1).unwrap();

        let coverability = get_cached_coverability_graph(&mut net).unwrap();
        let reachability = get_cached_reachability_graph(&mut net).unwrap();
        assert!(!Rc::ptr_eq(&coverability, &reachability));
        assert!(net.has_extension("coverability"));
        assert!(net.has_extension("reachability"));
        assert_eq!(net.extensions().listener_count(), 2);

        net.create_place("q").unwrap();
        assert!(!net.has_extension("coverability"));
        assert!(!net.has_extension("reachability"));
        assert_eq!(net.extensions().listener_count(), 0);
    }

    #[test]
    fn rebuilding_after_manual_removal_keeps_one_remover() {
        let mut net = generator();
        let first = get_cached_coverability_graph(&mut net).unwrap();
        assert!(net.remove_extension("coverability"));
        assert_eq!(net.extensions().listener_count(), 1);

        let second = get_cached_coverability_graph(&mut net).unwrap();
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(net.extensions().listener_count(), 1);
        assert!(net.extensions().has_remover_for("coverability"));

        // 同一键下类型不符的扩展视为未缓存
        net.put_extension("coverability", Rc::new(7u32));
        get_cached_coverability_graph(&mut net).unwrap();
        assert_eq!(net.extensions().listener_count(), 1);

        net.create_place("q").unwrap();
        assert!(!net.has_extension("coverability"));
        assert_eq!(net.extensions().listener_count(), 0);
    }

    #[test]
    fn dot_marks_the_initial_node() {
        let graph = CoverabilityGraph::build(&generator(), ExplorationMode::Coverability).unwrap();
        let dot = graph.to_dot();

        assert!(dot.starts_with("digraph \"generator-coverability\""));
        assert!(dot.contains("s0 [label=\"[1, 0]\", shape=doublecircle];"));
        assert!(dot.contains("s1 [label=\"[1, ω]\", shape=circle];"));
        assert!(dot.contains("s1 -> s1 [label=\"t\"];"));
    }

    #[test]
    fn mode_keys() {
        assert_eq!(ExplorationMode::Coverability.extension_key(), "coverability");
        assert_eq!(ExplorationMode::Reachability.to_string(), "reachability");
    }
}
