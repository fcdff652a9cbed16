//! 标识: 一个网实例上全部库所托肯值的不可变快照, 以及覆盖与 ω 加宽运算.
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::net::core::NetId;
use crate::net::ids::PlaceId;
use crate::net::index_vec::{Idx, IndexVec};
use crate::net::token::Token;

/// 某个 [`Net`](crate::net::Net) 实例的不可变托肯向量.
///
/// 快照之后新建的库所读作零. 库所是否仍然存在由网判断, 读取托肯请使用
/// [`Net::token`](crate::net::Net::token) 或 [`Net::token_at`](crate::net::Net::token_at).
#[derive(Clone, Serialize, Deserialize)]
pub struct Marking {
    net: NetId,
    tokens: IndexVec<PlaceId, Token>,
}

impl Marking {
    pub(crate) fn new(net: NetId, tokens: IndexVec<PlaceId, Token>) -> Self {
        Self { net, tokens }
    }

    pub fn net_id(&self) -> NetId {
        self.net
    }

    /// 存储的槽位数 (已删除的库所保留槽位).
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// 原始槽位读取, 不知道库所是否已被删除; 对外请走 [`Net::token`](crate::net::Net::token).
    pub(crate) fn get(&self, place: PlaceId) -> Token {
        self.tokens.get(place).copied().unwrap_or(Token::ZERO)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (PlaceId, Token)> + '_ {
        self.tokens
            .iter_enumerated()
            .map(|(place, token)| (place, *token))
    }

    pub fn with_token(&self, place: PlaceId, token: Token) -> Marking {
        let mut next = self.clone();
        next.tokens.grow_to(place.index() + 1, Token::ZERO);
        next.tokens[place] = token;
        next
    }

    pub(crate) fn padded(&self, len: usize) -> Marking {
        let mut next = self.clone();
        next.tokens.grow_to(len, Token::ZERO);
        next
    }

    pub(crate) fn tokens_mut(&mut self, place: PlaceId) -> &mut Token {
        &mut self.tokens[place]
    }

    pub(crate) fn retag(&mut self, net: NetId) {
        self.net = net;
    }

    pub fn has_omega(&self) -> bool {
        self.tokens.iter().any(|token| token.is_omega())
    }

    pub fn omega_places(&self) -> Vec<PlaceId> {
        self.iter()
            .filter(|(_, token)| token.is_omega())
            .map(|(place, _)| place)
            .collect()
    }

    /// `self` 逐库所 `>=` `other`. 不同网的标识互不覆盖.
    pub fn covers(&self, other: &Marking) -> bool {
        if self.net != other.net {
            return false;
        }
        let len = self.len().max(other.len());
        (0..len)
            .map(PlaceId::from_usize)
            .all(|place| self.get(place) >= other.get(place))
    }

    /// `self` 相对较小的 `other` 做 ω 加宽: `self` 严格更大的库所变为 ω, 其余保持不变.
    ///
    /// `self` 不覆盖 `other` 时返回 `None`.
    pub fn cover(&self, other: &Marking) -> Option<Marking> {
        if !self.covers(other) {
            return None;
        }
        let len = self.len().max(other.len());
        let tokens = (0..len)
            .map(PlaceId::from_usize)
            .map(|place| {
                let mine = self.get(place);
                if mine > other.get(place) {
                    Token::Omega
                } else {
                    mine
                }
            })
            .collect();
        Some(Marking::new(self.net, tokens))
    }

    fn significant(&self) -> &[Token] {
        let slice = self.tokens.as_slice();
        let end = slice
            .iter()
            .rposition(|token| *token != Token::ZERO)
            .map_or(0, |idx| idx + 1);
        &slice[..end]
    }
}

// 末尾的零不参与比较: 新增库所之前取得的快照与之后的快照应当相等.
impl PartialEq for Marking {
    fn eq(&self, other: &Self) -> bool {
        self.net == other.net && self.significant() == other.significant()
    }
}

impl Eq for Marking {}

impl Hash for Marking {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.net.hash(state);
        self.significant().hash(state);
    }
}

/// 由 [`Marking::covers`] 导出的偏序.
impl PartialOrd for Marking {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.covers(other), other.covers(self)) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Greater),
            (false, true) => Some(Ordering::Less),
            (false, false) => None,
        }
    }
}

impl fmt::Debug for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (place, token) in self.iter() {
            map.entry(&place, &token);
        }
        map.finish()
    }
}

impl fmt::Display for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, token) in self.tokens.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{token}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marking(net: NetId, tokens: &[Token]) -> Marking {
        Marking::new(net, tokens.iter().copied().collect())
    }

    #[test]
    fn covers_is_reflexive_and_antisymmetric() {
        let net = NetId::fresh();
        let a = marking(net, &[Token::Finite(1), Token::Omega]);
        let b = marking(net, &[Token::Finite(1), Token::Finite(4)]);

        assert!(a.covers(&a));
        assert!(a.covers(&b));
        assert!(!b.covers(&a));
        assert!(a.covers(&a.clone()) && a.clone().covers(&a));
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Greater));
    }

    #[test]
    fn incomparable_markings_have_no_cover() {
        let net = NetId::fresh();
        let a = marking(net, &[Token::Finite(2), Token::Finite(0)]);
        let b = marking(net, &[Token::Finite(1), Token::Finite(1)]);

        assert!(!a.covers(&b) && !b.covers(&a));
        assert_eq!(a.cover(&b), None);
        assert_eq!(a.partial_cmp(&b), None);
    }

    #[test]
    fn cover_widens_strictly_larger_places() {
        let net = NetId::fresh();
        let a = marking(net, &[Token::Finite(1), Token::Finite(3), Token::Omega]);
        let b = marking(net, &[Token::Finite(1), Token::Finite(2), Token::Finite(0)]);

        let widened = a.cover(&b).expect("a covers b");
        assert_eq!(
            widened,
            marking(net, &[Token::Finite(1), Token::Omega, Token::Omega])
        );
        assert!(widened.covers(&a));
        assert_eq!(widened.omega_places(), vec![PlaceId::new(1), PlaceId::new(2)]);
    }

    #[test]
    fn markings_of_different_nets_are_unrelated() {
        let a = marking(NetId::fresh(), &[Token::Finite(1)]);
        let b = marking(NetId::fresh(), &[Token::Finite(1)]);

        assert_ne!(a, b);
        assert!(!a.covers(&b));
    }

    #[test]
    fn trailing_zero_slots_do_not_affect_equality() {
        let net = NetId::fresh();
        let short = marking(net, &[Token::Finite(1)]);
        let long = short.padded(3);

        assert_eq!(short, long);
        assert_eq!(long.get(PlaceId::new(2)), Token::ZERO);
        assert_eq!(short.get(PlaceId::new(5)), Token::ZERO);
    }

    #[test]
    fn with_token_leaves_the_original_untouched() {
        let net = NetId::fresh();
        let base = marking(net, &[Token::Finite(1)]);
        let next = base.with_token(PlaceId::new(0), Token::Omega);

        assert_eq!(base.get(PlaceId::new(0)), Token::Finite(1));
        assert!(next.has_omega());
        assert_eq!(next.to_string(), "[ω]");
    }
}
