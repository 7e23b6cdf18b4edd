//! Data-source boundary.
//!
//! The engine is a pure computation library; topic and prerequisite data
//! arrive through the [`TopicSource`] contract. Implementations live with the
//! transport (REST client, database, fixture), not here. The trait is
//! synchronous: async transports perform their I/O around the session's
//! two-phase fetch API and hand the finished payload in.

use crate::error::SourceError;
use crate::{ExpandDirection, PrerequisiteEdge, Topic, TopicId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Full dataset for the global view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicGraphData {
    pub topics: Vec<Topic>,
    pub edges: Vec<PrerequisiteEdge>,
}

/// Immediate neighborhood of a center topic, used to (re)initialize a
/// local-view session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodData {
    pub center: Topic,
    pub prerequisites: Vec<Topic>,
    pub effects: Vec<Topic>,
    pub edges: Vec<PrerequisiteEdge>,
}

/// Payload of one expansion step: the immediate neighbors of a topic in one
/// direction plus the edges connecting them to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionData {
    pub new_topics: Vec<Topic>,
    pub new_edges: Vec<PrerequisiteEdge>,
}

pub trait TopicSource {
    /// All topics and prerequisite edges, names resolved for `language`.
    fn full_topic_graph(&self, language: &str) -> Result<TopicGraphData, SourceError>;

    /// The center topic with its direct prerequisites and effects.
    fn local_neighborhood(
        &self,
        center: &TopicId,
        language: &str,
    ) -> Result<NeighborhoodData, SourceError>;

    /// Direct neighbors of `topic` in `direction`.
    fn expansion(
        &self,
        topic: &TopicId,
        direction: ExpandDirection,
    ) -> Result<ExpansionData, SourceError>;
}

/// Whole-dataset source backed by plain collections. Used by tests and by
/// embeddings that already hold the full graph in memory; names are assumed
/// to be pre-resolved, so the language tag is ignored.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTopicSource {
    topics: HashMap<TopicId, Topic>,
    edges: Vec<PrerequisiteEdge>,
}

impl InMemoryTopicSource {
    pub fn new(topics: Vec<Topic>, edges: Vec<PrerequisiteEdge>) -> Self {
        let topics = topics
            .into_iter()
            .map(|topic| (topic.id.clone(), topic))
            .collect();
        Self { topics, edges }
    }

    fn lookup(&self, id: &TopicId) -> Result<&Topic, SourceError> {
        self.topics
            .get(id)
            .ok_or_else(|| SourceError::UnknownTopic(id.clone()))
    }

    /// Spoke edges around `topic` in `direction`, endpoints resolved.
    /// Edges naming a topic this source does not know are skipped.
    fn neighbors(&self, topic: &TopicId, direction: ExpandDirection) -> ExpansionData {
        let mut new_topics = Vec::new();
        let mut new_edges = Vec::new();
        let mut seen: Vec<&TopicId> = Vec::new();

        for edge in &self.edges {
            let neighbor = match direction {
                ExpandDirection::Prerequisites if edge.dependent == *topic => &edge.prerequisite,
                ExpandDirection::Effects if edge.prerequisite == *topic => &edge.dependent,
                _ => continue,
            };
            let Some(found) = self.topics.get(neighbor) else {
                continue;
            };
            if !seen.contains(&neighbor) {
                seen.push(neighbor);
                new_topics.push(found.clone());
            }
            new_edges.push(edge.clone());
        }

        ExpansionData {
            new_topics,
            new_edges,
        }
    }
}

impl TopicSource for InMemoryTopicSource {
    fn full_topic_graph(&self, _language: &str) -> Result<TopicGraphData, SourceError> {
        let mut topics: Vec<Topic> = self.topics.values().cloned().collect();
        topics.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(TopicGraphData {
            topics,
            edges: self.edges.clone(),
        })
    }

    fn local_neighborhood(
        &self,
        center: &TopicId,
        _language: &str,
    ) -> Result<NeighborhoodData, SourceError> {
        let center_topic = self.lookup(center)?.clone();
        let upward = self.neighbors(center, ExpandDirection::Prerequisites);
        let downward = self.neighbors(center, ExpandDirection::Effects);

        let mut edges = upward.new_edges;
        edges.extend(downward.new_edges);

        Ok(NeighborhoodData {
            center: center_topic,
            prerequisites: upward.new_topics,
            effects: downward.new_topics,
            edges,
        })
    }

    fn expansion(
        &self,
        topic: &TopicId,
        direction: ExpandDirection,
    ) -> Result<ExpansionData, SourceError> {
        self.lookup(topic)?;
        Ok(self.neighbors(topic, direction))
    }
}
