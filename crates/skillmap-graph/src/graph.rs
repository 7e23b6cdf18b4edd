use serde::{Deserialize, Serialize};
use skillmap_core::{
    measure, DataWarning, Dimensions, GraphDataError, LearningStatus, PrerequisiteEdge, Topic,
    TopicId, TopicKind,
};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TopicIndex(pub usize);

impl fmt::Display for TopicIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeIndex(pub usize);

impl fmt::Display for EdgeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A topic as stored in the arena: the domain record plus its derived card
/// dimensions. Dimensions are always the result of [`measure`] on the current
/// name; `TopicGraph::rename` is the only way to change either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicNode {
    pub id: TopicId,
    pub name: String,
    pub kind: TopicKind,
    pub status: Option<LearningStatus>,
    pub dimensions: Dimensions,
}

impl TopicNode {
    fn from_topic(topic: Topic) -> Self {
        let dimensions = measure(&topic.name);
        Self {
            id: topic.id,
            name: topic.name,
            kind: topic.kind,
            status: topic.status,
            dimensions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEdge {
    pub prerequisite: TopicIndex,
    pub dependent: TopicIndex,
}

/// In-memory prerequisite graph: a vector arena of topics with adjacency
/// precomputed in both directions.
///
/// Edges referencing unknown topic ids are dropped with a [`DataWarning`]
/// rather than failing the build; partially imported datasets stay usable.
/// The arena is append-only; removal happens by rebuilding through
/// [`TopicGraph::retain`].
#[derive(Debug, Clone, Default)]
pub struct TopicGraph {
    nodes: Vec<TopicNode>,
    edges: Vec<TopicEdge>,
    index: HashMap<TopicId, TopicIndex>,
    edge_set: HashSet<(TopicIndex, TopicIndex)>,
    prerequisites: Vec<Vec<TopicIndex>>,
    dependents: Vec<Vec<TopicIndex>>,
}

impl TopicGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a complete dataset.
    ///
    /// Fails fast on malformed topics (empty or duplicate ids): those are
    /// collaborator contract violations. Dangling edges are a data anomaly,
    /// not a contract violation; they are dropped and reported.
    pub fn build(
        topics: Vec<Topic>,
        edges: Vec<PrerequisiteEdge>,
    ) -> Result<(Self, Vec<DataWarning>), GraphDataError> {
        let mut graph = Self::default();
        let mut warnings = Vec::new();

        for topic in topics {
            if topic.id.as_str().is_empty() {
                return Err(GraphDataError::EmptyTopicId { name: topic.name });
            }
            if graph.index.contains_key(&topic.id) {
                return Err(GraphDataError::DuplicateTopicId(topic.id));
            }
            graph.push_topic(topic);
        }

        for edge in &edges {
            graph.try_add_edge(edge, &mut warnings);
        }

        Ok((graph, warnings))
    }

    /// Merges an incremental payload into the graph.
    ///
    /// Topics already present are skipped, as are edges already present;
    /// expansion payloads routinely repeat data the session has already seen.
    /// Empty topic ids still fail fast.
    pub fn merge(
        &mut self,
        topics: Vec<Topic>,
        edges: Vec<PrerequisiteEdge>,
    ) -> Result<Vec<DataWarning>, GraphDataError> {
        let mut warnings = Vec::new();

        for topic in topics {
            if topic.id.as_str().is_empty() {
                return Err(GraphDataError::EmptyTopicId { name: topic.name });
            }
            if !self.index.contains_key(&topic.id) {
                self.push_topic(topic);
            }
        }

        for edge in &edges {
            self.try_add_edge(edge, &mut warnings);
        }

        Ok(warnings)
    }

    /// Rebuilds the arena keeping only the topics in `keep` and the edges
    /// whose endpoints both survive. Survivors keep their relative order, so
    /// scene ordering stays stable across collapses.
    pub fn retain(&self, keep: &HashSet<TopicId>) -> TopicGraph {
        let mut out = Self::default();
        for node in &self.nodes {
            if keep.contains(&node.id) {
                let idx = TopicIndex(out.nodes.len());
                out.index.insert(node.id.clone(), idx);
                out.nodes.push(node.clone());
                out.prerequisites.push(Vec::new());
                out.dependents.push(Vec::new());
            }
        }
        for edge in &self.edges {
            let prereq_id = &self.nodes[edge.prerequisite.0].id;
            let dependent_id = &self.nodes[edge.dependent.0].id;
            if let (Some(&p), Some(&d)) = (out.index.get(prereq_id), out.index.get(dependent_id)) {
                out.push_edge(p, d);
            }
        }
        out
    }

    fn push_topic(&mut self, topic: Topic) -> TopicIndex {
        let idx = TopicIndex(self.nodes.len());
        self.index.insert(topic.id.clone(), idx);
        self.nodes.push(TopicNode::from_topic(topic));
        self.prerequisites.push(Vec::new());
        self.dependents.push(Vec::new());
        idx
    }

    fn push_edge(&mut self, prerequisite: TopicIndex, dependent: TopicIndex) {
        if !self.edge_set.insert((prerequisite, dependent)) {
            return;
        }
        self.edges.push(TopicEdge {
            prerequisite,
            dependent,
        });
        self.prerequisites[dependent.0].push(prerequisite);
        self.dependents[prerequisite.0].push(dependent);
    }

    fn try_add_edge(&mut self, edge: &PrerequisiteEdge, warnings: &mut Vec<DataWarning>) {
        let prereq = self.index.get(&edge.prerequisite).copied();
        let dependent = self.index.get(&edge.dependent).copied();
        match (prereq, dependent) {
            (Some(p), Some(d)) => self.push_edge(p, d),
            _ => {
                let missing = if prereq.is_none() {
                    &edge.prerequisite
                } else {
                    &edge.dependent
                };
                tracing::warn!(
                    "Dropping edge {} -> {} because topic {} is missing from the graph",
                    edge.prerequisite,
                    edge.dependent,
                    missing
                );
                warnings.push(DataWarning::DanglingEdge {
                    prerequisite: edge.prerequisite.clone(),
                    dependent: edge.dependent.clone(),
                    missing: missing.clone(),
                });
            }
        }
    }

    /// Updates a topic's display name and rederives its card dimensions.
    /// Returns false if the topic is unknown.
    pub fn rename(&mut self, id: &TopicId, name: impl Into<String>) -> bool {
        let Some(&idx) = self.index.get(id) else {
            return false;
        };
        let node = &mut self.nodes[idx.0];
        node.name = name.into();
        node.dimensions = measure(&node.name);
        true
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &TopicId) -> bool {
        self.index.contains_key(id)
    }

    pub fn index_of(&self, id: &TopicId) -> Option<TopicIndex> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &TopicId) -> Option<&TopicNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx.0])
    }

    pub fn node_indices(&self) -> impl Iterator<Item = TopicIndex> {
        (0..self.nodes.len()).map(TopicIndex)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TopicNode> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &TopicEdge> {
        self.edges.iter()
    }

    pub fn topic_ids(&self) -> impl Iterator<Item = &TopicId> {
        self.nodes.iter().map(|node| &node.id)
    }

    /// Direct prerequisites of a topic, in edge insertion order.
    pub fn prerequisites_of(&self, idx: TopicIndex) -> &[TopicIndex] {
        &self.prerequisites[idx.0]
    }

    /// Direct dependents of a topic, in edge insertion order.
    pub fn dependents_of(&self, idx: TopicIndex) -> &[TopicIndex] {
        &self.dependents[idx.0]
    }
}

impl Index<TopicIndex> for TopicGraph {
    type Output = TopicNode;
    fn index(&self, index: TopicIndex) -> &Self::Output {
        &self.nodes[index.0]
    }
}

impl IndexMut<TopicIndex> for TopicGraph {
    fn index_mut(&mut self, index: TopicIndex) -> &mut Self::Output {
        &mut self.nodes[index.0]
    }
}
