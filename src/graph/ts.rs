//! 带标签迁移系统 (LTS): 状态、带标签弧与初始状态.
use std::collections::BTreeSet;

use indexmap::IndexMap;
use thiserror::Error;

use crate::graph::extension::{Extensible, GraphExtensions};
use crate::net::ids::StateId;
use crate::net::index_vec::IndexVec;
use crate::net::marking::Marking;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TsError {
    #[error("state `{0}` already exists")]
    DuplicateState(String),
    #[error("no state named `{0}`")]
    NoSuchName(String),
    #[error("{0:?} is not a state of this system")]
    NoSuchState(StateId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub name: String,
    /// 仅作描述, 不参与状态的同一性.
    pub marking: Option<Marking>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LtsArc {
    pub source: StateId,
    pub label: String,
    pub target: StateId,
}

/// 带标签迁移系统, 同标签的平行弧分别保留.
///
/// 状态编号直接索引本系统; 不属于本系统的编号返回 [`TsError::NoSuchState`].
#[derive(Debug, Clone)]
pub struct TransitionSystem {
    name: String,
    states: IndexVec<StateId, State>,
    names: IndexMap<String, StateId>,
    arcs: Vec<LtsArc>,
    initial: Option<StateId>,
    extensions: GraphExtensions,
}

impl TransitionSystem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: IndexVec::new(),
            names: IndexMap::new(),
            arcs: Vec::new(),
            initial: None,
            extensions: GraphExtensions::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn create_state(&mut self, name: impl Into<String>) -> Result<StateId, TsError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(TsError::DuplicateState(name));
        }
        Ok(self.push_state(name))
    }

    /// 以 `s<n>` 命名新状态, `n` 从当前状态数起取第一个未占用的值.
    pub fn create_fresh_state(&mut self) -> StateId {
        let mut counter = self.states.len();
        let name = loop {
            let candidate = format!("s{counter}");
            if !self.names.contains_key(&candidate) {
                break candidate;
            }
            counter += 1;
        };
        self.push_state(name)
    }

    fn push_state(&mut self, name: String) -> StateId {
        let id = self.states.push(State {
            name: name.clone(),
            marking: None,
        });
        self.names.insert(name, id);
        self.extensions.invoke_listeners();
        id
    }

    fn check_state(&self, state: StateId) -> Result<(), TsError> {
        match self.states.get(state) {
            Some(_) => Ok(()),
            None => Err(TsError::NoSuchState(state)),
        }
    }

    /// 附加描述性的标识数据, 不算结构变化.
    pub fn attach_marking(&mut self, state: StateId, marking: Marking) -> Result<(), TsError> {
        let slot = self
            .states
            .get_mut(state)
            .ok_or(TsError::NoSuchState(state))?;
        slot.marking = Some(marking);
        Ok(())
    }

    /// 添加一条弧, 返回它在 [`arcs`](Self::arcs) 中的位置.
    pub fn create_arc(
        &mut self,
        source: StateId,
        label: impl Into<String>,
        target: StateId,
    ) -> Result<usize, TsError> {
        self.check_state(source)?;
        self.check_state(target)?;
        self.arcs.push(LtsArc {
            source,
            label: label.into(),
            target,
        });
        self.extensions.invoke_listeners();
        Ok(self.arcs.len() - 1)
    }

    pub fn remove_arc(&mut self, index: usize) -> Option<LtsArc> {
        if index >= self.arcs.len() {
            return None;
        }
        let arc = self.arcs.remove(index);
        self.extensions.invoke_listeners();
        Some(arc)
    }

    pub fn set_initial_state(&mut self, state: StateId) -> Result<(), TsError> {
        self.check_state(state)?;
        self.initial = Some(state);
        Ok(())
    }

    pub fn initial_state(&self) -> Option<StateId> {
        self.initial
    }

    pub fn state(&self, state: StateId) -> Result<&State, TsError> {
        self.states.get(state).ok_or(TsError::NoSuchState(state))
    }

    pub fn state_id(&self, name: &str) -> Result<StateId, TsError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| TsError::NoSuchName(name.to_string()))
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> {
        self.states.iter_enumerated()
    }

    pub fn arcs(&self) -> &[LtsArc] {
        &self.arcs
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }

    pub fn alphabet(&self) -> BTreeSet<&str> {
        self.arcs.iter().map(|arc| arc.label.as_str()).collect()
    }

    pub fn postset_arcs(&self, state: StateId) -> impl Iterator<Item = &LtsArc> {
        self.arcs.iter().filter(move |arc| arc.source == state)
    }

    pub fn preset_arcs(&self, state: StateId) -> impl Iterator<Item = &LtsArc> {
        self.arcs.iter().filter(move |arc| arc.target == state)
    }
}

impl Extensible for TransitionSystem {
    fn extensions(&self) -> &GraphExtensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut GraphExtensions {
        &mut self.extensions
    }
}
