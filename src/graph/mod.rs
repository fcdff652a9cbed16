//! 可扩展图框架与带标签迁移系统.
pub mod extension;
pub mod ts;

pub use extension::{Extensible, GraphExtensions, Listener, StructuralExtensionRemover, StructureListener};
pub use ts::{LtsArc, State, TransitionSystem, TsError};
