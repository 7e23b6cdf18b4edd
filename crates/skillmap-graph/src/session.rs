//! One local-view exploration session: the live subgraph around a center
//! topic, its expansion flags, and the persistent zone/position stores.
//!
//! The session itself never performs I/O. Operations that need external data
//! are split in two: `begin_*` validates the request and hands back a
//! [`FetchTicket`], the caller resolves it against its data source, and the
//! matching `complete_*` applies the payload. Tickets are single-use and
//! carry the session generation; a ticket superseded by a recenter is
//! silently discarded on completion, so late responses can never corrupt
//! the stores.

use crate::graph::TopicGraph;
use crate::level::{LevelAssignment, assign_local_levels};
use crate::zone::{LocalLayouter, PositionStore, ZoneTable};
use skillmap_core::{
    DataWarning, ExpandDirection, ExpansionData, ExpansionKey, NeighborhoodData, SessionError,
    SourceError, Topic, TopicId,
};
use std::collections::{HashMap, HashSet};

/// What a [`FetchTicket`] asks the data collaborator for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Neighborhood {
        center: TopicId,
    },
    Expansion {
        topic: TopicId,
        direction: ExpandDirection,
    },
}

/// Receipt for one in-flight fetch. Deliberately not `Clone`: completing a
/// ticket consumes it, so a response can only ever be applied once.
#[derive(Debug)]
pub struct FetchTicket {
    generation: u64,
    request: FetchRequest,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &FetchRequest {
        &self.request
    }
}

/// State machine for incremental local-graph exploration.
pub struct LocalSession {
    center: TopicId,
    language: String,
    graph: TopicGraph,
    expanded: HashSet<ExpansionKey>,
    /// Which already-present topic caused each topic to appear; drives the
    /// structural-parent lookup during placement.
    induced_by: HashMap<TopicId, TopicId>,
    levels: LevelAssignment,
    zones: ZoneTable,
    positions: PositionStore,
    layouter: LocalLayouter,
    generation: u64,
    pending: Option<u64>,
    warnings: Vec<DataWarning>,
}

impl LocalSession {
    /// Opens a session on `center` and returns the ticket for its initial
    /// neighborhood fetch. The session stays empty until the ticket is
    /// completed.
    pub fn new(center: TopicId, language: impl Into<String>) -> (Self, FetchTicket) {
        let generation = 1;
        let session = Self {
            center: center.clone(),
            language: language.into(),
            graph: TopicGraph::default(),
            expanded: HashSet::new(),
            induced_by: HashMap::new(),
            levels: LevelAssignment::default(),
            zones: ZoneTable::new(),
            positions: PositionStore::new(),
            layouter: LocalLayouter::default(),
            generation,
            pending: Some(generation),
            warnings: Vec::new(),
        };
        let ticket = FetchTicket {
            generation,
            request: FetchRequest::Neighborhood { center },
        };
        (session, ticket)
    }

    pub fn center(&self) -> &TopicId {
        &self.center
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn graph(&self) -> &TopicGraph {
        &self.graph
    }

    pub fn levels(&self) -> &LevelAssignment {
        &self.levels
    }

    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    pub fn expanded(&self) -> &HashSet<ExpansionKey> {
        &self.expanded
    }

    pub fn is_expanded(&self, topic: &TopicId, direction: ExpandDirection) -> bool {
        self.expanded
            .contains(&ExpansionKey::new(topic.clone(), direction))
    }

    pub fn is_fetch_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Accumulated data-integrity warnings from every merge and leveling
    /// pass so far.
    pub fn warnings(&self) -> &[DataWarning] {
        &self.warnings
    }

    /// Requests expansion of one direction of `topic`. Returns `Ok(None)`
    /// when that direction is already expanded, which needs no fetch.
    pub fn begin_expand(
        &mut self,
        topic: &TopicId,
        direction: ExpandDirection,
    ) -> Result<Option<FetchTicket>, SessionError> {
        if let Some(generation) = self.pending {
            return Err(SessionError::FetchInFlight(generation));
        }
        if !self.graph.contains(topic) {
            return Err(SessionError::TopicNotPresent(topic.clone()));
        }
        if self.is_expanded(topic, direction) {
            return Ok(None);
        }

        self.pending = Some(self.generation);
        Ok(Some(FetchTicket {
            generation: self.generation,
            request: FetchRequest::Expansion {
                topic: topic.clone(),
                direction,
            },
        }))
    }

    /// Applies an expansion payload. `Ok(false)` means the ticket was stale
    /// and the payload was dropped without touching any state.
    pub fn complete_expansion(
        &mut self,
        ticket: FetchTicket,
        result: Result<ExpansionData, SourceError>,
    ) -> Result<bool, SessionError> {
        if !self.ticket_is_current(&ticket) {
            return Ok(false);
        }
        self.pending = None;
        let FetchRequest::Expansion { topic, direction } = ticket.request else {
            tracing::debug!(generation = ticket.generation, "ticket kind mismatch, dropped");
            return Ok(false);
        };
        let data = result?;
        self.apply_expansion(&topic, direction, data)?;
        Ok(true)
    }

    /// Applies a neighborhood payload, either the initial load or a
    /// recenter. On success every store is rebuilt from scratch for the new
    /// center. `Ok(false)` means the ticket was stale.
    pub fn complete_neighborhood(
        &mut self,
        ticket: FetchTicket,
        result: Result<NeighborhoodData, SourceError>,
    ) -> Result<bool, SessionError> {
        if !self.ticket_is_current(&ticket) {
            return Ok(false);
        }
        self.pending = None;
        let FetchRequest::Neighborhood { .. } = ticket.request else {
            tracing::debug!(generation = ticket.generation, "ticket kind mismatch, dropped");
            return Ok(false);
        };
        let data = result?;
        self.initialize(data)?;
        Ok(true)
    }

    /// Collapses one direction of `topic`, removing every topic whose
    /// presence depended on that expansion. Returns the removed topic ids.
    /// Topics still reachable through other expanded branches stay.
    pub fn collapse(
        &mut self,
        topic: &TopicId,
        direction: ExpandDirection,
    ) -> Result<Vec<TopicId>, SessionError> {
        if let Some(generation) = self.pending {
            return Err(SessionError::FetchInFlight(generation));
        }
        if !self.graph.contains(topic) {
            return Err(SessionError::TopicNotPresent(topic.clone()));
        }
        let key = ExpansionKey::new(topic.clone(), direction);
        if !self.expanded.remove(&key) {
            return Ok(Vec::new());
        }

        let retained = self.retained_set();
        let mut removed: Vec<TopicId> = self
            .graph
            .topic_ids()
            .filter(|id| !retained.contains(*id))
            .cloned()
            .collect();
        removed.sort();

        self.graph = self.graph.retain(&retained);
        for id in &removed {
            self.zones.remove_topic(id);
            self.positions.remove(id);
        }
        self.expanded.retain(|k| retained.contains(&k.topic));
        self.induced_by
            .retain(|child, parent| retained.contains(child) && retained.contains(parent));
        self.relayout();
        Ok(removed)
    }

    /// Starts moving the session to a new center. Always accepted, even
    /// while a fetch is in flight: the generation bump makes any
    /// outstanding ticket stale. Prior state survives until the returned
    /// ticket completes successfully.
    pub fn begin_recenter(&mut self, new_center: TopicId) -> FetchTicket {
        self.generation += 1;
        self.pending = Some(self.generation);
        FetchTicket {
            generation: self.generation,
            request: FetchRequest::Neighborhood { center: new_center },
        }
    }

    fn ticket_is_current(&self, ticket: &FetchTicket) -> bool {
        let current =
            self.pending == Some(ticket.generation) && ticket.generation == self.generation;
        if !current {
            tracing::debug!(
                ticket_generation = ticket.generation,
                session_generation = self.generation,
                "stale fetch response discarded"
            );
        }
        current
    }

    /// Rebuilds the whole session from a neighborhood payload. Staged into
    /// a scratch graph first so a malformed payload leaves the session
    /// untouched.
    fn initialize(&mut self, data: NeighborhoodData) -> Result<(), SessionError> {
        let mut graph = TopicGraph::default();
        let mut topics: Vec<Topic> = Vec::with_capacity(
            1 + data.prerequisites.len() + data.effects.len(),
        );
        topics.push(data.center.clone());
        topics.extend(data.prerequisites);
        topics.extend(data.effects);
        let mut warnings = graph.merge(topics, data.edges)?;

        self.center = data.center.id;
        self.graph = graph;
        self.expanded.clear();
        self.induced_by.clear();
        self.zones.clear();
        self.positions.clear();
        self.warnings.clear();
        self.warnings.append(&mut warnings);

        if let Some(center_idx) = self.graph.index_of(&self.center) {
            let prereqs: Vec<TopicId> = self
                .graph
                .prerequisites_of(center_idx)
                .iter()
                .map(|&idx| self.graph[idx].id.clone())
                .collect();
            let effects: Vec<TopicId> = self
                .graph
                .dependents_of(center_idx)
                .iter()
                .map(|&idx| self.graph[idx].id.clone())
                .collect();

            if !prereqs.is_empty() {
                self.expanded.insert(ExpansionKey::new(
                    self.center.clone(),
                    ExpandDirection::Prerequisites,
                ));
            }
            if !effects.is_empty() {
                self.expanded
                    .insert(ExpansionKey::new(self.center.clone(), ExpandDirection::Effects));
            }
            for id in prereqs.into_iter().chain(effects) {
                if id != self.center {
                    self.induced_by.entry(id).or_insert_with(|| self.center.clone());
                }
            }
        }

        self.relayout();
        Ok(())
    }

    fn apply_expansion(
        &mut self,
        topic: &TopicId,
        direction: ExpandDirection,
        data: ExpansionData,
    ) -> Result<(), SessionError> {
        let fresh: Vec<TopicId> = data
            .new_topics
            .iter()
            .map(|t| t.id.clone())
            .filter(|id| !self.graph.contains(id))
            .collect();

        // Staged merge: a malformed payload must not leave a half-applied
        // subgraph behind.
        let mut graph = self.graph.clone();
        let mut warnings = graph.merge(data.new_topics, data.new_edges)?;

        self.graph = graph;
        self.warnings.append(&mut warnings);
        for id in fresh {
            self.induced_by.entry(id).or_insert_with(|| topic.clone());
        }
        self.expanded
            .insert(ExpansionKey::new(topic.clone(), direction));
        self.relayout();
        Ok(())
    }

    /// Topics that must stay after a collapse: everything reachable from the
    /// center by walking only directions that are still flagged expanded.
    fn retained_set(&self) -> HashSet<TopicId> {
        let mut retained: HashSet<TopicId> = HashSet::new();
        let Some(center_idx) = self.graph.index_of(&self.center) else {
            return retained;
        };
        retained.insert(self.center.clone());
        let mut stack = vec![center_idx];
        while let Some(idx) = stack.pop() {
            let id = &self.graph[idx].id;
            if self.is_expanded(id, ExpandDirection::Prerequisites) {
                for &prereq in self.graph.prerequisites_of(idx) {
                    if retained.insert(self.graph[prereq].id.clone()) {
                        stack.push(prereq);
                    }
                }
            }
            if self.is_expanded(id, ExpandDirection::Effects) {
                for &dependent in self.graph.dependents_of(idx) {
                    if retained.insert(self.graph[dependent].id.clone()) {
                        stack.push(dependent);
                    }
                }
            }
        }
        retained
    }

    fn relayout(&mut self) {
        let Some(center_idx) = self.graph.index_of(&self.center) else {
            self.levels = LevelAssignment::default();
            return;
        };
        let mut levels = assign_local_levels(&self.graph, center_idx);
        self.warnings.append(&mut levels.warnings);
        self.layouter.place(
            &self.graph,
            center_idx,
            &levels,
            &self.induced_by,
            &mut self.zones,
            &mut self.positions,
        );
        self.levels = levels;
    }
}
