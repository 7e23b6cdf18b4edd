//! Whole-graph placement for the overview: fixed row/column lattice with a
//! two-pass greedy slot assignment that pulls each topic toward the mean x
//! of its prerequisites.
//!
//! Positions come entirely from this deterministic pass. Nothing here runs a
//! force simulation or any other iterative motion model.

use crate::geometry::Vec2;
use crate::graph::{TopicGraph, TopicIndex};
use crate::level::LevelAssignment;
use crate::zone::PositionStore;

/// Grid layouter for the global view.
///
/// Rows are levels, top to bottom. Column pitch is derived from the widest
/// card in the dataset so that distinct slots can never collide. The root
/// row is laid left to right and centered as a group; every later row runs
/// the slot lottery: sort by preferred x, claim the nearest slot first come
/// first served, then patch losers into the nearest slot still open.
pub struct GlobalLayouter {
    pub canvas_width: f32,
    pub column_gap: f32,
    pub row_gap: f32,
    pub top_margin: f32,
}

impl Default for GlobalLayouter {
    fn default() -> Self {
        Self {
            canvas_width: Self::DEFAULT_CANVAS_WIDTH,
            column_gap: Self::DEFAULT_COLUMN_GAP,
            row_gap: Self::DEFAULT_ROW_GAP,
            top_margin: Self::DEFAULT_TOP_MARGIN,
        }
    }
}

impl GlobalLayouter {
    pub const DEFAULT_CANVAS_WIDTH: f32 = 1600.0;
    pub const DEFAULT_COLUMN_GAP: f32 = 48.0;
    pub const DEFAULT_ROW_GAP: f32 = 56.0;
    pub const DEFAULT_TOP_MARGIN: f32 = 60.0;

    pub fn execute(&self, graph: &TopicGraph, levels: &LevelAssignment) -> PositionStore {
        let mut positions = PositionStore::new();
        if graph.is_empty() {
            return positions;
        }

        let max_width = graph
            .nodes()
            .map(|node| node.dimensions.width)
            .fold(0.0_f32, f32::max);
        let max_height = graph
            .nodes()
            .map(|node| node.dimensions.height)
            .fold(0.0_f32, f32::max);
        let column_pitch = max_width + self.column_gap;
        let row_pitch = max_height + self.row_gap;

        let buckets = levels.by_level();
        let mut first_row = true;
        for (&level, bucket) in &buckets {
            let y = self.top_margin + level as f32 * row_pitch;
            if first_row {
                self.place_root_row(graph, bucket, y, column_pitch, &mut positions);
                first_row = false;
            } else {
                self.place_row(graph, bucket, y, column_pitch, &mut positions);
            }
        }

        positions
    }

    /// The lowest row has no positioned prerequisites to aim at, so it is
    /// simply laid out in bucket order, centered as a group.
    fn place_root_row(
        &self,
        graph: &TopicGraph,
        bucket: &[TopicIndex],
        y: f32,
        column_pitch: f32,
        positions: &mut PositionStore,
    ) {
        let first_slot_x =
            self.canvas_width / 2.0 - (bucket.len() - 1) as f32 / 2.0 * column_pitch;
        for (slot, &idx) in bucket.iter().enumerate() {
            let x = first_slot_x + slot as f32 * column_pitch;
            positions.pin(graph[idx].id.clone(), Vec2::new(x, y));
        }
    }

    fn place_row(
        &self,
        graph: &TopicGraph,
        bucket: &[TopicIndex],
        y: f32,
        column_pitch: f32,
        positions: &mut PositionStore,
    ) {
        let capacity = (self.canvas_width / column_pitch).floor() as usize;
        let slot_count = bucket.len().max(capacity).max(1);
        let first_slot_x =
            self.canvas_width / 2.0 - (slot_count - 1) as f32 / 2.0 * column_pitch;

        let mut candidates: Vec<(TopicIndex, f32)> = bucket
            .iter()
            .map(|&idx| (idx, self.preferred_x(graph, idx, positions)))
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0 .0.cmp(&b.0 .0)));

        // Pass 1: each candidate, in ascending preferred order, claims the
        // slot nearest its preferred x if still open.
        let mut slots: Vec<Option<TopicIndex>> = vec![None; slot_count];
        let mut pending: Vec<(TopicIndex, usize)> = Vec::new();
        for (idx, preferred) in candidates {
            let want = (((preferred - first_slot_x) / column_pitch).round() as i64)
                .clamp(0, slot_count as i64 - 1) as usize;
            if slots[want].is_none() {
                slots[want] = Some(idx);
            } else {
                pending.push((idx, want));
            }
        }

        // Pass 2: losers take the nearest slot still open.
        for (idx, want) in pending {
            let slot = Self::nearest_open_slot(&slots, want);
            slots[slot] = Some(idx);
        }

        for (slot, entry) in slots.iter().enumerate() {
            if let Some(idx) = entry {
                let x = first_slot_x + slot as f32 * column_pitch;
                positions.pin(graph[*idx].id.clone(), Vec2::new(x, y));
            }
        }
    }

    /// Mean x of the already-positioned prerequisites; canvas center when
    /// none of them has a position.
    fn preferred_x(&self, graph: &TopicGraph, idx: TopicIndex, positions: &PositionStore) -> f32 {
        let xs: Vec<f32> = graph
            .prerequisites_of(idx)
            .iter()
            .filter_map(|&prereq| positions.get(&graph[prereq].id).map(|pos| pos.x))
            .collect();
        if xs.is_empty() {
            self.canvas_width / 2.0
        } else {
            xs.iter().sum::<f32>() / xs.len() as f32
        }
    }

    /// Scans outward from `want`; ties prefer the lower index. Callers keep
    /// slot_count >= bucket len, so an open slot always exists.
    fn nearest_open_slot(slots: &[Option<TopicIndex>], want: usize) -> usize {
        for delta in 0..slots.len() {
            if want >= delta && slots[want - delta].is_none() {
                return want - delta;
            }
            let above = want + delta;
            if above < slots.len() && slots[above].is_none() {
                return above;
            }
        }
        want
    }
}
