//! # Petri 网核心定义（Place/Transition Net）
//!
//! 设库所集合 `P` 与迁移集合 `T`。输入/输出映射 `Pre, Post ∈ ℕ^{|P|×|T|}`
//! 以稀疏矩阵 [`Incidence`] 存储。标识 `M ∈ (ℕ ∪ {ω})^{|P|}`：
//!
//! * 迁移 `t` **可激发** 当且仅当 `∀p ∈ P: M[p] ≥ Pre[p, t]`，其中 `ω` 大于任意自然数；
//! * 迁移 **发射** 后 `M' = M - Pre[:, t] + Post[:, t]`，且 `ω ± k = ω`。
//!
//! 结构修改（增删库所、迁移、弧）会通知网上注册的监听器，
//! 从而丢弃缓存在网上的派生数据（例如覆盖图）。
//!
//! ## 示例
//!
//! ```rust
//! use petri_cover::net::*;
//!
//! let mut net = Net::new("example");
//! net.create_place_with_tokens("p0", 1).unwrap();
//! net.create_place("p1").unwrap();
//! let t0 = net.create_transition("t0").unwrap();
//! net.create_flow("p0", "t0", 1).unwrap();
//! net.create_flow("t0", "p1", 1).unwrap();
//!
//! let marking = net.initial_marking();
//! assert_eq!(net.enabled_transitions(&marking).unwrap(), vec![t0]);
//! let next = net.fire(&marking, t0).unwrap();
//! assert_eq!(net.token(&next, "p0").unwrap(), Token::Finite(0));
//! assert_eq!(net.token(&next, "p1").unwrap(), Token::Finite(1));
//! ```

pub mod core;
pub mod ids;
pub mod incidence;
pub mod index_vec;
pub mod io;
pub mod marking;
pub mod structure;
pub mod token;

pub use core::{FireError, Net, NetError, NetId};
pub use ids::{PlaceId, StateId, TransitionId};
pub use incidence::Incidence;
pub use index_vec::{Idx, IndexVec};
pub use io::{IoError, NetDescription};
pub use marking::Marking;
pub use structure::{Flow, FlowDirection, NodeRef, Place, Transition, Weight};
pub use token::Token;
