//! I/O 支持: 网的 JSON / RON 序列化.
//!
//! 序列化的是 [`NetDescription`], 读入时通过网的构造接口逐一重建,
//! 因此非法的弧 (例如库所到库所) 在读入阶段即被拒绝.
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::net::core::{Net, NetError};
use crate::net::structure::{FlowDirection, Weight};
use crate::net::token::Token;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
    #[error("ron parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed net: {0}")]
    Net(#[from] NetError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceDescription {
    pub id: String,
    #[serde(default)]
    pub tokens: Token,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDescription {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDescription {
    pub source: String,
    pub target: String,
    #[serde(default = "default_weight")]
    pub weight: Weight,
}

fn default_weight() -> Weight {
    1
}

/// [`Net`] 的可序列化形式, 包含初始标识.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetDescription {
    pub name: String,
    #[serde(default)]
    pub places: Vec<PlaceDescription>,
    #[serde(default)]
    pub transitions: Vec<TransitionDescription>,
    #[serde(default)]
    pub flows: Vec<FlowDescription>,
}

impl Net {
    pub fn from_description(description: &NetDescription) -> Result<Net, NetError> {
        let mut net = Net::new(description.name.clone());
        for place in &description.places {
            net.create_place(place.id.clone())?;
            net.set_initial_tokens(&place.id, place.tokens)?;
        }
        for transition in &description.transitions {
            match &transition.label {
                Some(label) => net.create_labeled_transition(transition.id.clone(), label.clone())?,
                None => net.create_transition(transition.id.clone())?,
            };
        }
        for flow in &description.flows {
            net.create_flow(&flow.source, &flow.target, flow.weight)?;
        }
        Ok(net)
    }

    pub fn to_description(&self) -> NetDescription {
        let initial = self.initial_marking();
        let places = self
            .places()
            .map(|(id, place)| PlaceDescription {
                id: place.id.clone(),
                tokens: initial.get(id),
            })
            .collect();
        let transitions = self
            .transitions()
            .map(|(_, transition)| TransitionDescription {
                id: transition.id.clone(),
                label: (transition.label != transition.id).then(|| transition.label.clone()),
            })
            .collect();
        let flows = self
            .flows()
            .into_iter()
            .filter_map(|flow| {
                let place = self.place(flow.place)?.id.clone();
                let transition = self.transition(flow.transition)?.id.clone();
                let (source, target) = match flow.direction {
                    FlowDirection::PlaceToTransition => (place, transition),
                    FlowDirection::TransitionToPlace => (transition, place),
                };
                Some(FlowDescription {
                    source,
                    target,
                    weight: flow.weight,
                })
            })
            .collect();
        NetDescription {
            name: self.name().to_string(),
            places,
            transitions,
            flows,
        }
    }
}

pub fn to_json_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_str(s)?)
}

pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), IoError> {
    let mut file = File::create(path)?;
    let content = to_json_string(value)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn read_json<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T, IoError> {
    let mut file = File::open(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    from_json_str(&content)
}

pub fn to_ron_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    let pretty = PrettyConfig::default().new_line("\n".to_string());
    Ok(ron::ser::to_string_pretty(value, pretty)?)
}

pub fn from_ron_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(ron::from_str(s)?)
}

pub fn write_ron<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), IoError> {
    let mut file = File::create(path)?;
    let content = to_ron_string(value)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn read_ron<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T, IoError> {
    let mut file = File::open(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    from_ron_str(&content)
}

/// 读取 JSON 描述并构造网.
pub fn read_net_json<P: AsRef<Path>>(path: P) -> Result<Net, IoError> {
    let description: NetDescription = read_json(path)?;
    Ok(Net::from_description(&description)?)
}

/// 读取 RON 描述并构造网.
pub fn read_net_ron<P: AsRef<Path>>(path: P) -> Result<Net, IoError> {
    let description: NetDescription = read_ron(path)?;
    Ok(Net::from_description(&description)?)
}
