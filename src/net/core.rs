//! 运行时: 网结构的增删、可发生判定与发生语义.
use std::fmt::{self, Write as FmtWrite};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::extension::{Extensible, GraphExtensions};
use crate::net::ids::{PlaceId, TransitionId};
use crate::net::incidence::Incidence;
use crate::net::index_vec::IndexVec;
use crate::net::marking::Marking;
use crate::net::structure::{Flow, FlowDirection, NodeRef, Place, Transition, Weight};
use crate::net::token::Token;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetError {
    #[error("node `{0}` already exists")]
    DuplicateNode(String),
    #[error("no such node `{0}`")]
    NoSuchNode(String),
    #[error("no flow from `{from}` to `{to}`")]
    NoSuchFlow { from: String, to: String },
    #[error("flow from `{from}` to `{to}` already exists")]
    DuplicateFlow { from: String, to: String },
    #[error("flow from `{from}` to `{to}` must connect a place and a transition")]
    SameKindEndpoints { from: String, to: String },
    #[error("flow from `{from}` to `{to}` must have a positive weight")]
    ZeroWeight { from: String, to: String },
    #[error("marking belongs to a different net")]
    ForeignMarking,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FireError {
    #[error("transition {0:?} does not exist")]
    NoSuchTransition(TransitionId),
    #[error("transition {0:?} is not enabled under the supplied marking")]
    NotEnabled(TransitionId),
    #[error("firing {transition:?} overflows the token count of {place:?}")]
    Overflow {
        place: PlaceId,
        transition: TransitionId,
    },
    #[error("marking belongs to a different net")]
    ForeignMarking,
}

/// 网实例的身份标识, 结构副本会得到新的标识.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct NetId(u64);

impl NetId {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// 带权 P/T 网.
///
/// 删除的库所和迁移留下空槽, 已分配的编号不会被复用. 每次结构修改都会通知
/// 网上的结构监听器; 修改初始标识不会.
pub struct Net {
    name: String,
    id: NetId,
    places: IndexVec<PlaceId, Option<Place>>,
    transitions: IndexVec<TransitionId, Option<Transition>>,
    nodes: IndexMap<String, NodeRef>,
    pre: Incidence,
    post: Incidence,
    initial: Marking,
    extensions: GraphExtensions,
}

impl Net {
    pub fn new(name: impl Into<String>) -> Self {
        let id = NetId::fresh();
        Self {
            name: name.into(),
            id,
            places: IndexVec::new(),
            transitions: IndexVec::new(),
            nodes: IndexMap::new(),
            pre: Incidence::new(),
            post: Incidence::new(),
            initial: Marking::new(id, IndexVec::new()),
            extensions: GraphExtensions::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> NetId {
        self.id
    }

    pub fn create_place(&mut self, id: impl Into<String>) -> Result<PlaceId, NetError> {
        self.create_place_with_tokens(id, 0)
    }

    pub fn create_place_with_tokens(
        &mut self,
        id: impl Into<String>,
        tokens: u64,
    ) -> Result<PlaceId, NetError> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(NetError::DuplicateNode(id));
        }
        let place = self.places.push(Some(Place::new(id.clone())));
        self.pre.push_place();
        self.post.push_place();
        self.initial = self
            .initial
            .padded(self.places.len())
            .with_token(place, Token::Finite(tokens));
        self.nodes.insert(id, NodeRef::Place(place));
        self.extensions.invoke_listeners();
        Ok(place)
    }

    pub fn create_transition(&mut self, id: impl Into<String>) -> Result<TransitionId, NetError> {
        self.add_transition(Transition::new(id))
    }

    pub fn create_labeled_transition(
        &mut self,
        id: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<TransitionId, NetError> {
        self.add_transition(Transition::with_label(id, label))
    }

    fn add_transition(&mut self, transition: Transition) -> Result<TransitionId, NetError> {
        if self.nodes.contains_key(&transition.id) {
            return Err(NetError::DuplicateNode(transition.id));
        }
        let key = transition.id.clone();
        let id = self.transitions.push(Some(transition));
        self.pre.push_transition();
        self.post.push_transition();
        self.nodes.insert(key, NodeRef::Transition(id));
        self.extensions.invoke_listeners();
        Ok(id)
    }

    /// 在库所与迁移之间添加一条带权弧, 方向任意.
    pub fn create_flow(&mut self, source: &str, target: &str, weight: Weight) -> Result<Flow, NetError> {
        let flow = match (self.node(source)?, self.node(target)?) {
            (NodeRef::Place(place), NodeRef::Transition(transition)) => {
                Flow::new(place, transition, weight, FlowDirection::PlaceToTransition)
            }
            (NodeRef::Transition(transition), NodeRef::Place(place)) => {
                Flow::new(place, transition, weight, FlowDirection::TransitionToPlace)
            }
            _ => {
                return Err(NetError::SameKindEndpoints {
                    from: source.to_string(),
                    to: target.to_string(),
                });
            }
        };
        if weight == 0 {
            return Err(NetError::ZeroWeight {
                from: source.to_string(),
                to: target.to_string(),
            });
        }
        let matrix = self.matrix_mut(flow.direction);
        if matrix.get(flow.place, flow.transition) > 0 {
            return Err(NetError::DuplicateFlow {
                from: source.to_string(),
                to: target.to_string(),
            });
        }
        matrix.set(flow.place, flow.transition, weight);
        self.extensions.invoke_listeners();
        Ok(flow)
    }

    /// 删除库所及其所有弧.
    pub fn remove_place(&mut self, id: &str) -> Result<(), NetError> {
        let place = self.place_id(id)?;
        self.pre.clear_place(place);
        self.post.clear_place(place);
        self.places[place] = None;
        self.initial = self.initial.with_token(place, Token::ZERO);
        self.nodes.shift_remove(id);
        log::debug!("removed place `{}` from net `{}`", id, self.name);
        self.extensions.invoke_listeners();
        Ok(())
    }

    /// 删除迁移及其所有弧.
    pub fn remove_transition(&mut self, id: &str) -> Result<(), NetError> {
        let transition = self.transition_id(id)?;
        self.pre.clear_transition(transition);
        self.post.clear_transition(transition);
        self.transitions[transition] = None;
        self.nodes.shift_remove(id);
        log::debug!("removed transition `{}` from net `{}`", id, self.name);
        self.extensions.invoke_listeners();
        Ok(())
    }

    pub fn remove_flow(&mut self, source: &str, target: &str) -> Result<(), NetError> {
        let flow = self.flow(source, target)?;
        self.matrix_mut(flow.direction)
            .set(flow.place, flow.transition, 0);
        self.extensions.invoke_listeners();
        Ok(())
    }

    fn matrix_mut(&mut self, direction: FlowDirection) -> &mut Incidence {
        match direction {
            FlowDirection::PlaceToTransition => &mut self.pre,
            FlowDirection::TransitionToPlace => &mut self.post,
        }
    }

    pub fn node(&self, id: &str) -> Result<NodeRef, NetError> {
        self.nodes
            .get(id)
            .copied()
            .ok_or_else(|| NetError::NoSuchNode(id.to_string()))
    }

    pub fn place_id(&self, id: &str) -> Result<PlaceId, NetError> {
        match self.node(id)? {
            NodeRef::Place(place) => Ok(place),
            NodeRef::Transition(_) => Err(NetError::NoSuchNode(id.to_string())),
        }
    }

    pub fn transition_id(&self, id: &str) -> Result<TransitionId, NetError> {
        match self.node(id)? {
            NodeRef::Transition(transition) => Ok(transition),
            NodeRef::Place(_) => Err(NetError::NoSuchNode(id.to_string())),
        }
    }

    pub fn place(&self, place: PlaceId) -> Option<&Place> {
        self.places.get(place).and_then(Option::as_ref)
    }

    pub fn transition(&self, transition: TransitionId) -> Option<&Transition> {
        self.transitions.get(transition).and_then(Option::as_ref)
    }

    pub fn places(&self) -> impl Iterator<Item = (PlaceId, &Place)> {
        self.places
            .iter_enumerated()
            .filter_map(|(id, place)| place.as_ref().map(|place| (id, place)))
    }

    pub fn transitions(&self) -> impl Iterator<Item = (TransitionId, &Transition)> {
        self.transitions
            .iter_enumerated()
            .filter_map(|(id, transition)| transition.as_ref().map(|transition| (id, transition)))
    }

    pub fn places_len(&self) -> usize {
        self.places().count()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions().count()
    }

    pub fn flow(&self, source: &str, target: &str) -> Result<Flow, NetError> {
        let missing = || NetError::NoSuchFlow {
            from: source.to_string(),
            to: target.to_string(),
        };
        let (place, transition, direction) = match (self.node(source)?, self.node(target)?) {
            (NodeRef::Place(p), NodeRef::Transition(t)) => (p, t, FlowDirection::PlaceToTransition),
            (NodeRef::Transition(t), NodeRef::Place(p)) => (p, t, FlowDirection::TransitionToPlace),
            _ => return Err(missing()),
        };
        let weight = match direction {
            FlowDirection::PlaceToTransition => self.pre.get(place, transition),
            FlowDirection::TransitionToPlace => self.post.get(place, transition),
        };
        if weight == 0 {
            return Err(missing());
        }
        Ok(Flow::new(place, transition, weight, direction))
    }

    pub fn flows(&self) -> Vec<Flow> {
        let mut flows = Vec::new();
        for (transition, _) in self.transitions() {
            flows.extend(self.preset_of_transition(transition));
            flows.extend(self.postset_of_transition(transition));
        }
        flows
    }

    /// `transition` 的输入弧.
    pub fn preset_of_transition(&self, transition: TransitionId) -> Vec<Flow> {
        self.pre
            .column(transition)
            .map(|(place, weight)| {
                Flow::new(place, transition, weight, FlowDirection::PlaceToTransition)
            })
            .collect()
    }

    /// `transition` 的输出弧.
    pub fn postset_of_transition(&self, transition: TransitionId) -> Vec<Flow> {
        self.post
            .column(transition)
            .map(|(place, weight)| {
                Flow::new(place, transition, weight, FlowDirection::TransitionToPlace)
            })
            .collect()
    }

    /// 向 `place` 放入托肯的弧.
    pub fn preset_of_place(&self, place: PlaceId) -> Vec<Flow> {
        if self.place(place).is_none() {
            return Vec::new();
        }
        self.post
            .row(place)
            .map(|(transition, weight)| {
                Flow::new(place, transition, weight, FlowDirection::TransitionToPlace)
            })
            .collect()
    }

    /// 从 `place` 取走托肯的弧.
    pub fn postset_of_place(&self, place: PlaceId) -> Vec<Flow> {
        if self.place(place).is_none() {
            return Vec::new();
        }
        self.pre
            .row(place)
            .map(|(transition, weight)| {
                Flow::new(place, transition, weight, FlowDirection::PlaceToTransition)
            })
            .collect()
    }

    pub fn initial_marking(&self) -> Marking {
        self.initial.padded(self.places.len())
    }

    /// 不算结构变化, 缓存的图保持有效.
    pub fn set_initial_marking(&mut self, marking: Marking) -> Result<(), NetError> {
        if marking.net_id() != self.id {
            return Err(NetError::ForeignMarking);
        }
        self.initial = marking.padded(self.places.len());
        Ok(())
    }

    pub fn set_initial_tokens(&mut self, place: &str, token: Token) -> Result<(), NetError> {
        let place = self.place_id(place)?;
        self.initial = self.initial.with_token(place, token);
        Ok(())
    }

    /// 构造本网的标识, 未列出的库所为零.
    pub fn marking<I, S>(&self, tokens: I) -> Result<Marking, NetError>
    where
        I: IntoIterator<Item = (S, Token)>,
        S: AsRef<str>,
    {
        let mut marking = Marking::new(self.id, IndexVec::new()).padded(self.places.len());
        for (place, token) in tokens {
            let place = self.place_id(place.as_ref())?;
            *marking.tokens_mut(place) = token;
        }
        Ok(marking)
    }

    /// 带检查的托肯读取: 已删除或未知的库所返回 `NoSuchNode`, 不会默认为零.
    pub fn token(&self, marking: &Marking, place: &str) -> Result<Token, NetError> {
        if marking.net_id() != self.id {
            return Err(NetError::ForeignMarking);
        }
        let place = self.place_id(place)?;
        Ok(marking.get(place))
    }

    /// 按编号读取, 语义同 [`token`](Self::token).
    pub fn token_at(&self, marking: &Marking, place: PlaceId) -> Result<Token, NetError> {
        if marking.net_id() != self.id {
            return Err(NetError::ForeignMarking);
        }
        if self.place(place).is_none() {
            return Err(NetError::NoSuchNode(format!("{place:?}")));
        }
        Ok(marking.get(place))
    }

    /// 当前网中仍存在的库所及其托肯, 按编号排列.
    pub fn tokens(&self, marking: &Marking) -> Result<Vec<(PlaceId, Token)>, NetError> {
        if marking.net_id() != self.id {
            return Err(NetError::ForeignMarking);
        }
        Ok(self
            .places()
            .map(|(place, _)| (place, marking.get(place)))
            .collect())
    }

    pub fn is_enabled(&self, marking: &Marking, transition: TransitionId) -> Result<bool, FireError> {
        self.check_firing(marking, transition)?;
        Ok(self.is_transition_enabled(marking, transition))
    }

    pub fn enabled_transitions(&self, marking: &Marking) -> Result<Vec<TransitionId>, FireError> {
        if marking.net_id() != self.id {
            return Err(FireError::ForeignMarking);
        }
        Ok(self
            .transitions()
            .map(|(transition, _)| transition)
            .filter(|&transition| self.is_transition_enabled(marking, transition))
            .collect())
    }

    /// Fires `transition`: ω entries stay ω, finite sums are overflow-checked.
    pub fn fire(&self, marking: &Marking, transition: TransitionId) -> Result<Marking, FireError> {
        self.check_firing(marking, transition)?;
        if !self.is_transition_enabled(marking, transition) {
            return Err(FireError::NotEnabled(transition));
        }

        let mut next = marking.padded(self.places.len());
        for (place, weight) in self.pre.column(transition) {
            let tokens = next.tokens_mut(place);
            *tokens = tokens
                .checked_sub(weight)
                .ok_or(FireError::NotEnabled(transition))?;
        }
        for (place, weight) in self.post.column(transition) {
            let tokens = next.tokens_mut(place);
            *tokens = tokens
                .checked_add(weight)
                .ok_or(FireError::Overflow { place, transition })?;
        }
        Ok(next)
    }

    fn check_firing(&self, marking: &Marking, transition: TransitionId) -> Result<(), FireError> {
        if marking.net_id() != self.id {
            return Err(FireError::ForeignMarking);
        }
        if self.transition(transition).is_none() {
            return Err(FireError::NoSuchTransition(transition));
        }
        Ok(())
    }

    fn is_transition_enabled(&self, marking: &Marking, transition: TransitionId) -> bool {
        self.pre
            .column(transition)
            .all(|(place, weight)| marking.get(place).covers_weight(weight))
    }

    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        let _ = writeln!(&mut dot, "digraph \"{}\" {{", escape_label(&self.name));
        let _ = writeln!(&mut dot, "    rankdir=LR;");

        for (place_id, place) in self.places() {
            let _ = writeln!(
                &mut dot,
                "    p{} [label=\"{}\\n{}\", shape=circle];",
                place_id.raw(),
                escape_label(&place.id),
                self.initial.get(place_id)
            );
        }
        for (transition_id, transition) in self.transitions() {
            let _ = writeln!(
                &mut dot,
                "    t{} [label=\"{}\", shape=box];",
                transition_id.raw(),
                escape_label(&transition.label)
            );
        }
        for flow in self.flows() {
            let (from, to) = match flow.direction {
                FlowDirection::PlaceToTransition => (
                    format!("p{}", flow.place.raw()),
                    format!("t{}", flow.transition.raw()),
                ),
                FlowDirection::TransitionToPlace => (
                    format!("t{}", flow.transition.raw()),
                    format!("p{}", flow.place.raw()),
                ),
            };
            if flow.weight == 1 {
                let _ = writeln!(&mut dot, "    {from} -> {to};");
            } else {
                let _ = writeln!(&mut dot, "    {from} -> {to} [label=\"{}\"];", flow.weight);
            }
        }

        let _ = writeln!(&mut dot, "}}");
        dot
    }
}

/// 结构副本: 新的身份标识, 不带扩展和监听器.
impl Clone for Net {
    fn clone(&self) -> Self {
        let id = NetId::fresh();
        let mut initial = self.initial.clone();
        initial.retag(id);
        Self {
            name: self.name.clone(),
            id,
            places: self.places.clone(),
            transitions: self.transitions.clone(),
            nodes: self.nodes.clone(),
            pre: self.pre.clone(),
            post: self.post.clone(),
            initial,
            extensions: GraphExtensions::new(),
        }
    }
}

impl Extensible for Net {
    fn extensions(&self) -> &GraphExtensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut GraphExtensions {
        &mut self.extensions
    }
}

impl fmt::Debug for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Net")
            .field("name", &self.name)
            .field("places", &self.places)
            .field("transitions", &self.transitions)
            .field("pre", &self.pre)
            .field("post", &self.post)
            .field("initial", &self.initial)
            .finish()
    }
}

pub(crate) fn escape_label(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn producer_consumer() -> Net {
        let mut net = Net::new("pc");
        net.create_place_with_tokens("p0", 1).unwrap();
        net.create_place("p1").unwrap();
        net.create_transition("t0").unwrap();
        net.create_flow("p0", "t0", 1).unwrap();
        net.create_flow("t0", "p1", 2).unwrap();
        net
    }

    #[test]
    fn fire_moves_tokens() {
        let net = producer_consumer();
        let t0 = net.transition_id("t0").unwrap();
        let initial = net.initial_marking();

        assert_eq!(net.enabled_transitions(&initial).unwrap(), vec![t0]);
        let next = net.fire(&initial, t0).unwrap();
        assert_eq!(net.token(&next, "p0").unwrap(), Token::Finite(0));
        assert_eq!(net.token(&next, "p1").unwrap(), Token::Finite(2));
        assert_eq!(net.fire(&next, t0), Err(FireError::NotEnabled(t0)));
    }

    #[test]
    fn omega_places_enable_and_stay_omega() {
        let mut net = producer_consumer();
        net.set_initial_tokens("p0", Token::Omega).unwrap();
        let t0 = net.transition_id("t0").unwrap();

        let next = net.fire(&net.initial_marking(), t0).unwrap();
        assert_eq!(net.token(&next, "p0").unwrap(), Token::Omega);
        assert!(net.is_enabled(&next, t0).unwrap());
    }

    #[test]
    fn arcs_between_nodes_of_the_same_kind_are_rejected() {
        let mut net = producer_consumer();
        net.create_transition("t1").unwrap();

        assert!(matches!(
            net.create_flow("p0", "p1", 1),
            Err(NetError::SameKindEndpoints { .. })
        ));
        assert!(matches!(
            net.create_flow("t0", "t1", 1),
            Err(NetError::SameKindEndpoints { .. })
        ));
        assert!(matches!(
            net.create_flow("p0", "t0", 1),
            Err(NetError::DuplicateFlow { .. })
        ));
        assert!(matches!(
            net.create_flow("p1", "t1", 0),
            Err(NetError::ZeroWeight { .. })
        ));
        assert_eq!(
            net.create_place("t1"),
            Err(NetError::DuplicateNode("t1".to_string()))
        );
    }

    #[test]
    fn removed_place_is_a_stale_reference() {
        let mut net = producer_consumer();
        let marking = net.initial_marking();
        net.remove_place("p1").unwrap();

        assert_eq!(
            net.token(&marking, "p1"),
            Err(NetError::NoSuchNode("p1".to_string()))
        );
        assert_eq!(net.token(&marking, "p0").unwrap(), Token::Finite(1));
        let t0 = net.transition_id("t0").unwrap();
        assert!(net.postset_of_transition(t0).is_empty());
        assert!(net.place_id("p1").is_err());
    }

    #[test]
    fn stale_lookups_never_yield_a_value() {
        let mut net = producer_consumer();
        let p = net.create_place_with_tokens("p", 5).unwrap();
        let marking = net.initial_marking();
        assert_eq!(net.token_at(&marking, p).unwrap(), Token::Finite(5));

        net.remove_place("p").unwrap();
        assert_eq!(net.token(&marking, "p"), Err(NetError::NoSuchNode("p".to_string())));
        assert_eq!(
            net.token_at(&marking, p),
            Err(NetError::NoSuchNode("PlaceId(2)".to_string()))
        );
        assert!(net.token_at(&marking, PlaceId::new(40)).is_err());
        let live: Vec<_> = net
            .tokens(&marking)
            .unwrap()
            .into_iter()
            .map(|(place, _)| place)
            .collect();
        assert_eq!(live, vec![net.place_id("p0").unwrap(), net.place_id("p1").unwrap()]);
        assert_eq!(net.tokens(&net.clone().initial_marking()), Err(NetError::ForeignMarking));
    }

    #[test]
    fn flow_errors_name_both_endpoints() {
        let mut net = producer_consumer();
        assert_eq!(
            net.create_flow("p0", "p1", 1).unwrap_err().to_string(),
            "flow from `p0` to `p1` must connect a place and a transition"
        );
        assert_eq!(
            net.flow("p1", "t0").unwrap_err(),
            NetError::NoSuchFlow {
                from: "p1".to_string(),
                to: "t0".to_string(),
            }
        );
        assert_eq!(
            net.create_flow("p0", "t0", 0).unwrap_err().to_string(),
            "flow from `p0` to `t0` must have a positive weight"
        );
    }

    #[test]
    fn places_created_later_read_as_zero() {
        let mut net = producer_consumer();
        let marking = net.initial_marking();
        net.create_place_with_tokens("late", 4).unwrap();

        assert_eq!(net.token(&marking, "late").unwrap(), Token::ZERO);
        assert_eq!(net.token(&net.initial_marking(), "late").unwrap(), Token::Finite(4));
    }

    #[test]
    fn presets_and_postsets() {
        let net = producer_consumer();
        let p0 = net.place_id("p0").unwrap();
        let p1 = net.place_id("p1").unwrap();
        let t0 = net.transition_id("t0").unwrap();

        let pre = net.preset_of_transition(t0);
        assert_eq!(pre.len(), 1);
        assert_eq!(pre[0].place, p0);
        assert!(pre[0].is_input());
        assert_eq!(net.postset_of_transition(t0)[0].weight, 2);
        assert_eq!(net.preset_of_place(p1)[0].transition, t0);
        assert_eq!(net.postset_of_place(p0)[0].transition, t0);
        assert!(net.preset_of_place(p0).is_empty());
        assert_eq!(net.flows().len(), 2);
        assert_eq!(net.flow("t0", "p1").unwrap().weight, 2);
        assert!(net.flow("p1", "t0").is_err());
    }

    #[test]
    fn structural_changes_notify_listeners_but_markings_do_not() {
        let mut net = producer_consumer();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        net.add_listener(Rc::new(move |_: &mut GraphExtensions| {
            counter.set(counter.get() + 1);
            true
        }));

        net.set_initial_tokens("p1", Token::Finite(3)).unwrap();
        assert_eq!(calls.get(), 0);

        net.create_place("p2").unwrap();
        net.create_transition("t1").unwrap();
        net.create_flow("p2", "t1", 1).unwrap();
        net.remove_flow("p2", "t1").unwrap();
        net.remove_transition("t1").unwrap();
        net.remove_place("p2").unwrap();
        assert_eq!(calls.get(), 6);
    }

    #[test]
    fn clones_are_independent_instances() {
        let net = producer_consumer();
        let copy = net.clone();
        let t0 = copy.transition_id("t0").unwrap();

        assert_ne!(net.id(), copy.id());
        assert_eq!(copy.fire(&net.initial_marking(), t0), Err(FireError::ForeignMarking));
        assert!(copy.fire(&copy.initial_marking(), t0).is_ok());
        assert_eq!(copy.places_len(), 2);
    }

    #[test]
    fn weight_products_do_not_wrap() {
        let mut net = Net::new("gen");
        net.create_place("p").unwrap();
        let t = net.create_transition("t").unwrap();
        net.create_flow("t", "p", 1 << 30).unwrap();

        let mut marking = net.initial_marking();
        for _ in 0..8 {
            marking = net.fire(&marking, t).unwrap();
        }
        assert_eq!(net.token(&marking, "p").unwrap(), Token::Finite(8 << 30));

        let full = marking.with_token(net.place_id("p").unwrap(), Token::Finite(u64::MAX));
        assert!(matches!(net.fire(&full, t), Err(FireError::Overflow { .. })));
    }

    #[test]
    fn dot_lists_nodes_and_weighted_flows() {
        let dot = producer_consumer().to_dot();
        assert!(dot.starts_with("digraph \"pc\""));
        assert!(dot.contains("p0 -> t0;"));
        assert!(dot.contains("t0 -> p1 [label=\"2\"];"));
    }
}
