pub mod boundness;
pub mod coverability;
pub mod lts;

pub use boundness::{BoundnessAnalyzer, BoundnessResult, check_boundness, check_place_boundness};
pub use coverability::{
    BuildError, CoverabilityGraph, CoverabilityGraphBuilder, CoverabilityGraphEdge,
    CoverabilityGraphNode, ExplorationMode, get_cached_coverability_graph,
    get_cached_reachability_graph,
};
pub use lts::to_lts;
