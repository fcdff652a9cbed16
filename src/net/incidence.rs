//! 输入/输出弧权重的邻接矩阵封装, 行对应库所, 列对应迁移.
use std::fmt;

use smallvec::SmallVec;

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::index_vec::{Idx, IndexVec};
use crate::net::structure::Weight;

type SmallRow<T> = SmallVec<[T; 4]>;

/// 权重矩阵, `0` 表示没有弧.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Incidence {
    rows: IndexVec<PlaceId, SmallRow<Weight>>,
    cols: usize,
}

impl Incidence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn places(&self) -> usize {
        self.rows.len()
    }

    pub fn transitions(&self) -> usize {
        self.cols
    }

    pub fn push_place(&mut self) -> PlaceId {
        self.rows.push(SmallRow::from_elem(0, self.cols))
    }

    pub fn push_transition(&mut self) -> TransitionId {
        let next = self.cols;
        for row in self.rows.iter_mut() {
            row.push(0);
        }
        self.cols += 1;
        TransitionId::from_usize(next)
    }

    pub fn get(&self, place: PlaceId, transition: TransitionId) -> Weight {
        self.rows
            .get(place)
            .and_then(|row| row.get(transition.index()))
            .copied()
            .unwrap_or(0)
    }

    pub fn set(&mut self, place: PlaceId, transition: TransitionId, weight: Weight) {
        self.rows[place][transition.index()] = weight;
    }

    /// 清零 `place` 所在行, 返回原先有非零权重的迁移.
    pub fn clear_place(&mut self, place: PlaceId) -> Vec<TransitionId> {
        let row = &mut self.rows[place];
        let mut cleared = Vec::new();
        for (idx, weight) in row.iter_mut().enumerate() {
            if *weight > 0 {
                cleared.push(TransitionId::from_usize(idx));
                *weight = 0;
            }
        }
        cleared
    }

    /// 清零 `transition` 所在列, 返回原先有非零权重的库所.
    pub fn clear_transition(&mut self, transition: TransitionId) -> Vec<PlaceId> {
        let mut cleared = Vec::new();
        for (place, row) in self.rows.iter_enumerated() {
            if row[transition.index()] > 0 {
                cleared.push(place);
            }
        }
        for &place in &cleared {
            self.rows[place][transition.index()] = 0;
        }
        cleared
    }

    /// 某迁移列中的非零项.
    pub fn column(&self, transition: TransitionId) -> impl Iterator<Item = (PlaceId, Weight)> + '_ {
        self.rows.iter_enumerated().filter_map(move |(place, row)| {
            let weight = row[transition.index()];
            (weight > 0).then_some((place, weight))
        })
    }

    /// 某库所行中的非零项.
    pub fn row(&self, place: PlaceId) -> impl Iterator<Item = (TransitionId, Weight)> + '_ {
        self.rows[place]
            .iter()
            .enumerate()
            .filter(|(_, weight)| **weight > 0)
            .map(|(idx, weight)| (TransitionId::from_usize(idx), *weight))
    }
}

impl fmt::Debug for Incidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Incidence")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish()
    }
}
