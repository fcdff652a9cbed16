//! P/T 网静态结构元素: 库所、迁移与带权弧.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::net::ids::{PlaceId, TransitionId};

pub type Weight = u64;

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Debug)]
pub struct Place {
    pub id: String,
}

impl Place {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Transition {
    pub id: String,
    /// 图中边使用的动作标签, 多个迁移可以共用.
    pub label: String,
}

impl Transition {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
        }
    }

    pub fn with_label(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transition")
            .field(&self.id)
            .field(&self.label)
            .finish()
    }
}

/// 弧的方向.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FlowDirection {
    PlaceToTransition,
    TransitionToPlace,
}

/// 库所与迁移之间的带权弧.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Flow {
    pub place: PlaceId,
    pub transition: TransitionId,
    pub weight: Weight,
    pub direction: FlowDirection,
}

impl Flow {
    pub fn new(
        place: PlaceId,
        transition: TransitionId,
        weight: Weight,
        direction: FlowDirection,
    ) -> Self {
        Self {
            place,
            transition,
            weight,
            direction,
        }
    }

    pub fn is_input(&self) -> bool {
        self.direction == FlowDirection::PlaceToTransition
    }
}

impl fmt::Debug for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            FlowDirection::PlaceToTransition => {
                write!(f, "Flow({:?} -{}-> {:?})", self.place, self.weight, self.transition)
            }
            FlowDirection::TransitionToPlace => {
                write!(f, "Flow({:?} -{}-> {:?})", self.transition, self.weight, self.place)
            }
        }
    }
}

/// 解析后的节点: 库所与迁移共用同一命名空间.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Place(PlaceId),
    Transition(TransitionId),
}
