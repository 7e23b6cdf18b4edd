//! Level assignment.
//!
//! Global mode layers the whole dataset top-down: roots at level 0, every
//! other topic one past its deepest prerequisite. Local mode radiates out
//! from a center topic, prerequisites upward into negative levels and
//! dependents downward into positive ones. Both tolerate cyclic input: the
//! recursion never re-enters a topic on its own stack, a back edge counts as
//! level 0 and is reported, never fatal.

use crate::graph::{TopicGraph, TopicIndex};
use skillmap_core::DataWarning;
use std::collections::{BTreeMap, HashSet, VecDeque};

/// Result of one leveling pass, index-aligned with the graph's arena.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelAssignment {
    pub levels: Vec<i32>,
    pub warnings: Vec<DataWarning>,
}

impl LevelAssignment {
    pub fn level(&self, idx: TopicIndex) -> i32 {
        self.levels[idx.0]
    }

    /// Topics bucketed by level, keys ascending, arena order within a bucket.
    pub fn by_level(&self) -> BTreeMap<i32, Vec<TopicIndex>> {
        let mut buckets: BTreeMap<i32, Vec<TopicIndex>> = BTreeMap::new();
        for (i, &level) in self.levels.iter().enumerate() {
            buckets.entry(level).or_default().push(TopicIndex(i));
        }
        buckets
    }
}

/// Layers the full graph: level 0 for topics without prerequisites, else
/// 1 + max over prerequisite levels, memoized depth-first.
pub fn assign_global_levels(graph: &TopicGraph) -> LevelAssignment {
    let mut memo: Vec<Option<i32>> = vec![None; graph.node_count()];
    let mut warnings = Vec::new();

    for idx in graph.node_indices() {
        let mut visiting = HashSet::new();
        visit(graph, idx, &mut memo, &mut visiting, &mut warnings);
    }

    LevelAssignment {
        levels: memo.into_iter().map(|level| level.unwrap_or(0)).collect(),
        warnings,
    }
}

fn visit(
    graph: &TopicGraph,
    idx: TopicIndex,
    memo: &mut [Option<i32>],
    visiting: &mut HashSet<TopicIndex>,
    warnings: &mut Vec<DataWarning>,
) -> i32 {
    if let Some(level) = memo[idx.0] {
        return level;
    }

    visiting.insert(idx);
    let mut level = 0;
    for &prereq in graph.prerequisites_of(idx) {
        let contribution = if visiting.contains(&prereq) {
            // Back edge: break the cycle here, contributing level 0.
            tracing::warn!(
                "Prerequisite cycle detected at {} -> {}; breaking at level 0",
                graph[idx].id,
                graph[prereq].id
            );
            warnings.push(DataWarning::CycleDetected {
                via: graph[idx].id.clone(),
                back_to: graph[prereq].id.clone(),
            });
            0
        } else {
            visit(graph, prereq, memo, visiting, warnings) + 1
        };
        level = level.max(contribution);
    }
    visiting.remove(&idx);

    memo[idx.0] = Some(level);
    level
}

/// Radiates levels outward from `center` breadth-first: prerequisites one
/// level up (negative), dependents one level down. The first visit to a topic
/// fixes its level for the pass; nodes unreachable from the center are left
/// on the center row and get placed as disconnected fragments.
pub fn assign_local_levels(graph: &TopicGraph, center: TopicIndex) -> LevelAssignment {
    let mut levels: Vec<Option<i32>> = vec![None; graph.node_count()];
    let mut queue = VecDeque::new();

    levels[center.0] = Some(0);
    queue.push_back(center);

    while let Some(idx) = queue.pop_front() {
        let Some(level) = levels[idx.0] else { continue };
        for &prereq in graph.prerequisites_of(idx) {
            if levels[prereq.0].is_none() {
                levels[prereq.0] = Some(level - 1);
                queue.push_back(prereq);
            }
        }
        for &dependent in graph.dependents_of(idx) {
            if levels[dependent.0].is_none() {
                levels[dependent.0] = Some(level + 1);
                queue.push_back(dependent);
            }
        }
    }

    LevelAssignment {
        levels: levels.into_iter().map(|level| level.unwrap_or(0)).collect(),
        warnings: Vec::new(),
    }
}
