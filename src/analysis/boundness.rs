//! Petri网有界性分析
//!
//! 基于缓存在网上的覆盖图判定有界性: 覆盖图中出现 ω 当且仅当网无界.
//! 有界时给出所有可达标识中的最大托肯数; 无界时给出无界库所以及到达
//! 第一个含 ω 节点的见证序列.

use std::fmt;

use crate::analysis::coverability::{BuildError, CoverabilityGraphBuilder, ExplorationMode};
use crate::net::Net;
use crate::net::ids::{PlaceId, TransitionId};
use crate::net::token::Token;
use crate::util::cancel::CancellationToken;

/// 有界性检查结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundnessResult {
    /// 网是有界的, `bound` 为任一库所可达的最大托肯数
    Bounded { bound: u64 },
    /// 网是无界的
    Unbounded {
        /// 无界库所的ID列表
        unbounded_places: Vec<PlaceId>,
        /// 到达第一个含ω节点的变迁序列
        witness_sequence: Vec<TransitionId>,
    },
}

impl BoundnessResult {
    pub fn is_bounded(&self) -> bool {
        matches!(self, BoundnessResult::Bounded { .. })
    }
}

impl fmt::Display for BoundnessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundnessResult::Bounded { bound } => write!(f, "Petri网是{}-有界的", bound),
            BoundnessResult::Unbounded {
                unbounded_places,
                witness_sequence,
            } => write!(
                f,
                "Petri网是无界的，无界库所: {:?}，见证序列: {:?}",
                unbounded_places, witness_sequence
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoundnessAnalyzer {
    cancel: CancellationToken,
}

impl BoundnessAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 检查整个网的有界性
    pub fn check(&self, net: &mut Net) -> Result<BoundnessResult, BuildError> {
        self.check_places(net, None)
    }

    /// 只检查单个库所的有界性
    pub fn check_place(&self, net: &mut Net, place: PlaceId) -> Result<BoundnessResult, BuildError> {
        self.check_places(net, Some(place))
    }

    fn check_places(
        &self,
        net: &mut Net,
        only: Option<PlaceId>,
    ) -> Result<BoundnessResult, BuildError> {
        let graph = CoverabilityGraphBuilder::new(ExplorationMode::Coverability)
            .with_cancellation(self.cancel.clone())
            .get_cached(net)?;
        let relevant = |place: PlaceId| only.is_none_or(|wanted| wanted == place);

        let mut unbounded_places = Vec::new();
        let mut witness = None;
        let mut bound = 0u64;
        for (index, node) in graph.nodes() {
            for (place, token) in node.marking().iter() {
                if !relevant(place) || net.place(place).is_none() {
                    continue;
                }
                match token {
                    Token::Omega => {
                        if !unbounded_places.contains(&place) {
                            unbounded_places.push(place);
                        }
                        witness.get_or_insert(index);
                    }
                    Token::Finite(value) => bound = bound.max(value),
                }
            }
        }

        match witness {
            Some(node) => {
                unbounded_places.sort();
                let witness_sequence = graph.firing_sequence(node);
                log::debug!(
                    "net `{}` is unbounded in {:?}, witness {:?}",
                    net.name(),
                    unbounded_places,
                    witness_sequence
                );
                Ok(BoundnessResult::Unbounded {
                    unbounded_places,
                    witness_sequence,
                })
            }
            None => Ok(BoundnessResult::Bounded { bound }),
        }
    }
}

/// 检查Petri网是否有界的便捷函数
pub fn check_boundness(net: &mut Net) -> Result<BoundnessResult, BuildError> {
    BoundnessAnalyzer::new().check(net)
}

/// 检查特定库所是否有界
pub fn check_place_boundness(net: &mut Net, place: PlaceId) -> Result<BoundnessResult, BuildError> {
    BoundnessAnalyzer::new().check_place(net, place)
}
