//! Coverability and reachability graphs of place/transition Petri nets.
//!
//! A [`Net`] is explored with the Karp-Miller construction; the resulting
//! [`CoverabilityGraph`] is cached on the net as an extension and dropped on
//! the first structural change. Graphs project into labeled transition
//! systems via [`CoverabilityGraph::to_lts`].

pub mod analysis;
pub mod config;
pub mod graph;
pub mod net;
pub mod util;

pub use analysis::{
    BuildError, CoverabilityGraph, CoverabilityGraphBuilder, ExplorationMode,
    get_cached_coverability_graph, get_cached_reachability_graph,
};
pub use config::ExplorationConfig;
pub use graph::{Extensible, TransitionSystem};
pub use net::{Marking, Net, Token};
pub use util::CancellationToken;
