use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod error;
pub mod measure;
pub mod source;

pub use error::{DataWarning, GraphDataError, SessionError, SourceError};
pub use measure::{measure, Dimensions};
pub use source::{
    ExpansionData, InMemoryTopicSource, NeighborhoodData, TopicGraphData, TopicSource,
};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TopicId(pub String);

impl TopicId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TopicId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
#[repr(i32)]
pub enum TopicKind {
    THEORY,
    PRACTICE,
    PROJECT,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
#[repr(i32)]
pub enum LearningStatus {
    NOT_LEARNED,
    WANT_TO_LEARN,
    LEARNING,
    LEARNED,
    LEARNED_AND_VALIDATED,
}

/// Error type for enum conversion failures
#[derive(Error, Debug, Clone)]
pub enum EnumConversionError {
    #[error("Invalid TopicKind value: {0}")]
    InvalidTopicKind(i32),
    #[error("Invalid LearningStatus value: {0}")]
    InvalidLearningStatus(i32),
}

impl TryFrom<i32> for TopicKind {
    type Error = EnumConversionError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TopicKind::THEORY),
            1 => Ok(TopicKind::PRACTICE),
            2 => Ok(TopicKind::PROJECT),
            _ => Err(EnumConversionError::InvalidTopicKind(value)),
        }
    }
}

impl TryFrom<i32> for LearningStatus {
    type Error = EnumConversionError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LearningStatus::NOT_LEARNED),
            1 => Ok(LearningStatus::WANT_TO_LEARN),
            2 => Ok(LearningStatus::LEARNING),
            3 => Ok(LearningStatus::LEARNED),
            4 => Ok(LearningStatus::LEARNED_AND_VALIDATED),
            _ => Err(EnumConversionError::InvalidLearningStatus(value)),
        }
    }
}

/// Direction of a neighborhood expansion relative to a topic: towards the
/// topics it requires, or towards the topics it unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpandDirection {
    Prerequisites,
    Effects,
}

impl ExpandDirection {
    pub fn opposite(self) -> Self {
        match self {
            ExpandDirection::Prerequisites => ExpandDirection::Effects,
            ExpandDirection::Effects => ExpandDirection::Prerequisites,
        }
    }
}

/// One expandable branch of the local view: a topic plus the direction in
/// which its neighborhood can be shown or hidden.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpansionKey {
    pub topic: TopicId,
    pub direction: ExpandDirection,
}

impl ExpansionKey {
    pub fn new(topic: TopicId, direction: ExpandDirection) -> Self {
        Self { topic, direction }
    }
}

/// A learning topic as the layout engine sees it. The display name has
/// already been resolved to a single string by the localization layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
    pub kind: TopicKind,
    /// Per-viewer learning progress; absent for anonymous viewers.
    pub status: Option<LearningStatus>,
}

impl Topic {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: TopicKind) -> Self {
        Self {
            id: TopicId::new(id),
            name: name.into(),
            kind,
            status: None,
        }
    }

    pub fn with_status(mut self, status: LearningStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Directed relation: `prerequisite` must be learned before `dependent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PrerequisiteEdge {
    pub prerequisite: TopicId,
    pub dependent: TopicId,
}

impl PrerequisiteEdge {
    pub fn new(prerequisite: impl Into<String>, dependent: impl Into<String>) -> Self {
        Self {
            prerequisite: TopicId::new(prerequisite),
            dependent: TopicId::new(dependent),
        }
    }
}
