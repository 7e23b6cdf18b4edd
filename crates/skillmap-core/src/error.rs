use crate::TopicId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Construction error for graph building. Indicates a collaborator contract
/// violation (malformed input), not a runtime data anomaly; fails fast.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphDataError {
    #[error("Topic with empty id (name: {name:?})")]
    EmptyTopicId { name: String },
    #[error("Duplicate topic id: {0}")]
    DuplicateTopicId(TopicId),
}

/// Failure reported by a [`crate::TopicSource`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Unknown topic: {0}")]
    UnknownTopic(TopicId),
    #[error("Fetch failed: {0}")]
    Fetch(String),
}

/// Failure from a viewing session (local state machine or global view
/// construction). Session state is left untouched whenever one of these is
/// returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("A fetch for generation {0} is still in flight")]
    FetchInFlight(u64),
    #[error("Topic {0} is not part of the current subgraph")]
    TopicNotPresent(TopicId),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Data(#[from] GraphDataError),
}

/// Data-integrity anomaly detected while building or leveling a graph.
///
/// Warnings are never fatal: the anomaly is neutralized (edge dropped, cycle
/// broken) and processing continues. They are returned to the caller so tests
/// and dashboards can assert on them, and logged at the point of detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataWarning {
    /// An edge referenced a topic id missing from the node set; the edge was
    /// dropped.
    DanglingEdge {
        prerequisite: TopicId,
        dependent: TopicId,
        missing: TopicId,
    },
    /// Level assignment re-entered a topic already on the recursion stack;
    /// the back edge's contribution was taken as level 0.
    CycleDetected { via: TopicId, back_to: TopicId },
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataWarning::DanglingEdge {
                prerequisite,
                dependent,
                missing,
            } => write!(
                f,
                "dropped edge {prerequisite} -> {dependent}: topic {missing} is missing"
            ),
            DataWarning::CycleDetected { via, back_to } => {
                write!(f, "prerequisite cycle broken at {via} -> {back_to}")
            }
        }
    }
}
