//! 单个库所的托肯值: 有限计数或 ω (无界).
use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::net::structure::Weight;

/// 单个库所的托肯数.
///
/// `Omega` 表示任意多, 加减有限值后不变; 它严格大于任何有限值, 只与自身相等.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    Finite(u64),
    Omega,
}

impl Token {
    pub const ZERO: Token = Token::Finite(0);

    pub fn is_omega(self) -> bool {
        matches!(self, Token::Omega)
    }

    /// The finite count, `None` for ω.
    pub fn finite(self) -> Option<u64> {
        match self {
            Token::Finite(value) => Some(value),
            Token::Omega => None,
        }
    }

    /// 有限值之和超出 `u64` 时返回 `None`.
    pub fn checked_add(self, weight: Weight) -> Option<Token> {
        match self {
            Token::Finite(value) => value.checked_add(weight).map(Token::Finite),
            Token::Omega => Some(Token::Omega),
        }
    }

    /// 有限托肯数少于 `weight` 时返回 `None`.
    pub fn checked_sub(self, weight: Weight) -> Option<Token> {
        match self {
            Token::Finite(value) => value.checked_sub(weight).map(Token::Finite),
            Token::Omega => Some(Token::Omega),
        }
    }

    /// 是否至少有 `weight` 个托肯.
    pub fn covers_weight(self, weight: Weight) -> bool {
        match self {
            Token::Finite(value) => value >= weight,
            Token::Omega => true,
        }
    }
}

impl Default for Token {
    fn default() -> Self {
        Token::ZERO
    }
}

impl From<u64> for Token {
    fn from(value: u64) -> Self {
        Token::Finite(value)
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Token::Finite(left), Token::Finite(right)) => left.cmp(right),
            (Token::Finite(_), Token::Omega) => Ordering::Less,
            (Token::Omega, Token::Finite(_)) => Ordering::Greater,
            (Token::Omega, Token::Omega) => Ordering::Equal,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Finite(value) => write!(f, "{value}"),
            Token::Omega => f.write_str("ω"),
        }
    }
}
