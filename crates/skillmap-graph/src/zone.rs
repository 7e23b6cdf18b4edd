//! Local-view placement: persistent zones, pinned positions, and the
//! symmetric sibling distribution that keeps expanded branches inside their
//! parent's horizontal band.
//!
//! Two stores outlive any single layout pass. The [`PositionStore`] pins
//! every coordinate ever assigned: re-layouts only place topics that have no
//! stored position, which is what makes expanding one branch leave every
//! other branch untouched. The [`ZoneTable`] records the horizontal band
//! reserved for each topic's subtree; widths only grow within a session, so
//! a branch that once made room keeps that room until it is collapsed away.

use crate::geometry::Vec2;
use crate::graph::{TopicGraph, TopicIndex};
use crate::level::LevelAssignment;
use skillmap_core::TopicId;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_CANVAS_WIDTH: f32 = 1600.0;
pub const DEFAULT_CANVAS_HEIGHT: f32 = 900.0;
pub const DEFAULT_ROW_PITCH: f32 = 150.0;
pub const DEFAULT_SIBLING_GAP: f32 = 24.0;
pub const DEFAULT_MIN_ZONE_WIDTH: f32 = 170.0;
pub const DEFAULT_CENTER_MAX_FRACTION: f32 = 0.8;

/// Horizontal band reserved for a topic and its expanded descendants at a
/// given level.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub owner: TopicId,
    pub level: i32,
    pub center_x: f32,
    pub width: f32,
    pub order: usize,
}

/// Side table of zones keyed by (owner, level), persisted across layout
/// passes of one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneTable {
    zones: HashMap<(TopicId, i32), Zone>,
}

impl ZoneTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, owner: &TopicId, level: i32) -> Option<&Zone> {
        self.zones.get(&(owner.clone(), level))
    }

    pub fn get_mut(&mut self, owner: &TopicId, level: i32) -> Option<&mut Zone> {
        self.zones.get_mut(&(owner.clone(), level))
    }

    pub fn insert(&mut self, zone: Zone) {
        self.zones.insert((zone.owner.clone(), zone.level), zone);
    }

    /// Drops every zone owned by `owner`, across all levels.
    pub fn remove_topic(&mut self, owner: &TopicId) {
        self.zones.retain(|(id, _), _| id != owner);
    }

    pub fn clear(&mut self) {
        self.zones.clear();
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    /// Zone keys in sorted order; handy for comparing sessions.
    pub fn sorted_keys(&self) -> Vec<(TopicId, i32)> {
        let mut keys: Vec<(TopicId, i32)> = self.zones.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Pinned coordinates keyed by topic id.
///
/// Once pinned, a position is never recomputed by a layout pass; entries
/// leave the store only through an explicit removal (collapse) or a full
/// clear (recenter). No simulation or integrator ever moves them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionStore {
    positions: HashMap<TopicId, Vec2>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pin(&mut self, id: TopicId, position: Vec2) {
        self.positions.insert(id, position);
    }

    pub fn get(&self, id: &TopicId) -> Option<Vec2> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &TopicId) -> bool {
        self.positions.contains_key(id)
    }

    pub fn remove(&mut self, id: &TopicId) -> Option<Vec2> {
        self.positions.remove(id)
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TopicId, &Vec2)> {
        self.positions.iter()
    }
}

/// Zone/tree placement for the local view.
///
/// Levels are processed outward from the center so that parent zones exist
/// before their children need an anchor. Sibling groups are distributed
/// symmetrically under the parent zone's center, each child sized by the
/// width its own subtree requires. The inter-sibling gap is a fixed minimum:
/// when subtrees are wider than the room available, groups overflow and may
/// overlap visually rather than shrink the gap below the minimum.
#[derive(Debug, Clone)]
pub struct LocalLayouter {
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Fixed vertical distance between adjacent levels. Constant rather than
    /// derived from node heights: a derived pitch would shift existing rows
    /// whenever a taller topic merges in, breaking position stability.
    pub row_pitch: f32,
    pub sibling_gap: f32,
    pub min_zone_width: f32,
    pub center_max_fraction: f32,
}

impl Default for LocalLayouter {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            row_pitch: DEFAULT_ROW_PITCH,
            sibling_gap: DEFAULT_SIBLING_GAP,
            min_zone_width: DEFAULT_MIN_ZONE_WIDTH,
            center_max_fraction: DEFAULT_CENTER_MAX_FRACTION,
        }
    }
}

/// Provenance forest for one pass: children bucketed under the topic that
/// induced them, split by which side of the center they grow on.
struct ChildrenMaps {
    up: HashMap<TopicIndex, Vec<TopicIndex>>,
    down: HashMap<TopicIndex, Vec<TopicIndex>>,
}

impl LocalLayouter {
    /// Runs one placement pass. Only topics without a pinned position are
    /// placed; everything else keeps its stored coordinates.
    pub fn place(
        &self,
        graph: &TopicGraph,
        center: TopicIndex,
        levels: &LevelAssignment,
        induced_by: &HashMap<TopicId, TopicId>,
        zones: &mut ZoneTable,
        positions: &mut PositionStore,
    ) {
        if graph.is_empty() {
            return;
        }

        let maps = self.build_children_maps(graph, levels, induced_by);
        let mut up_memo: HashMap<TopicIndex, f32> = HashMap::new();
        let mut down_memo: HashMap<TopicIndex, f32> = HashMap::new();

        let center_id = graph[center].id.clone();
        let center_y = self.canvas_height / 2.0;
        let center_pos = match positions.get(&center_id) {
            Some(pos) => pos,
            None => {
                let pos = Vec2::new(self.canvas_width / 2.0, center_y);
                positions.pin(center_id.clone(), pos);
                pos
            }
        };
        let up_req = self.required_width(graph, center, &maps.up, &mut up_memo, &mut HashSet::new());
        let down_req =
            self.required_width(graph, center, &maps.down, &mut down_memo, &mut HashSet::new());
        let center_width = up_req
            .max(down_req)
            .min(self.center_max_fraction * self.canvas_width);
        self.upsert_zone(zones, &center_id, 0, center_pos.x, center_width, 0);

        let buckets = levels.by_level();
        let mut outward: Vec<i32> = buckets.keys().copied().collect();
        outward.sort_by_key(|level| (level.abs(), *level));

        for level in outward {
            let Some(bucket) = buckets.get(&level) else {
                continue;
            };
            let y = center_y + level as f32 * self.row_pitch;

            if level == 0 {
                let fragments: Vec<TopicIndex> =
                    bucket.iter().copied().filter(|&idx| idx != center).collect();
                self.place_fragments(
                    graph, &fragments, level, y, &maps, &mut up_memo, &mut down_memo, zones,
                    positions,
                );
                continue;
            }

            let parent_level = if level < 0 { level + 1 } else { level - 1 };
            let (children_map, memo) = if level < 0 {
                (&maps.up, &mut up_memo)
            } else {
                (&maps.down, &mut down_memo)
            };

            let mut grouped: HashSet<TopicIndex> = HashSet::new();
            if let Some(parents) = buckets.get(&parent_level) {
                for &parent in parents {
                    let Some(children) = children_map.get(&parent) else {
                        continue;
                    };
                    grouped.extend(children.iter().copied());
                    self.place_sibling_group(
                        graph,
                        parent,
                        parent_level,
                        children,
                        level,
                        y,
                        children_map,
                        memo,
                        zones,
                        positions,
                    );
                }
            }

            let fragments: Vec<TopicIndex> = bucket
                .iter()
                .copied()
                .filter(|idx| !grouped.contains(idx))
                .collect();
            self.place_fragments(
                graph, &fragments, level, y, &maps, &mut up_memo, &mut down_memo, zones, positions,
            );
        }
    }

    fn build_children_maps(
        &self,
        graph: &TopicGraph,
        levels: &LevelAssignment,
        induced_by: &HashMap<TopicId, TopicId>,
    ) -> ChildrenMaps {
        let mut maps = ChildrenMaps {
            up: HashMap::new(),
            down: HashMap::new(),
        };

        for idx in graph.node_indices() {
            let Some(parent_id) = induced_by.get(&graph[idx].id) else {
                continue;
            };
            let Some(parent) = graph.index_of(parent_id) else {
                continue;
            };
            let level = levels.level(idx);
            let parent_level = levels.level(parent);
            // The structural parent must sit one level closer to the center;
            // anything else (center-row arrivals, re-leveled leftovers) is
            // placed as a fragment instead.
            if level < 0 && parent_level == level + 1 {
                maps.up.entry(parent).or_default().push(idx);
            } else if level > 0 && parent_level == level - 1 {
                maps.down.entry(parent).or_default().push(idx);
            }
        }

        for children in maps.up.values_mut().chain(maps.down.values_mut()) {
            children.sort_by(|a, b| {
                graph[*a]
                    .name
                    .cmp(&graph[*b].name)
                    .then_with(|| graph[*a].id.cmp(&graph[*b].id))
            });
        }

        maps
    }

    /// Horizontal room a topic's subtree needs: its own band, or the sum of
    /// its children's requirements plus gaps, whichever is larger. Memoized
    /// per pass; the visiting set guards against provenance loops from
    /// corrupted state.
    fn required_width(
        &self,
        graph: &TopicGraph,
        idx: TopicIndex,
        children: &HashMap<TopicIndex, Vec<TopicIndex>>,
        memo: &mut HashMap<TopicIndex, f32>,
        visiting: &mut HashSet<TopicIndex>,
    ) -> f32 {
        if let Some(&width) = memo.get(&idx) {
            return width;
        }
        let base = graph[idx].dimensions.width.max(self.min_zone_width);
        if !visiting.insert(idx) {
            return base;
        }

        let width = match children.get(&idx) {
            Some(kids) if !kids.is_empty() => {
                let sum: f32 = kids
                    .iter()
                    .map(|&kid| self.required_width(graph, kid, children, memo, visiting))
                    .sum();
                base.max(sum + self.sibling_gap * (kids.len() - 1) as f32)
            }
            _ => base,
        };

        visiting.remove(&idx);
        memo.insert(idx, width);
        width
    }

    #[allow(clippy::too_many_arguments)]
    fn place_sibling_group(
        &self,
        graph: &TopicGraph,
        parent: TopicIndex,
        parent_level: i32,
        children: &[TopicIndex],
        level: i32,
        y: f32,
        children_map: &HashMap<TopicIndex, Vec<TopicIndex>>,
        memo: &mut HashMap<TopicIndex, f32>,
        zones: &mut ZoneTable,
        positions: &mut PositionStore,
    ) {
        let parent_id = &graph[parent].id;
        let anchor_x = zones
            .get(parent_id, parent_level)
            .map(|zone| zone.center_x)
            .or_else(|| positions.get(parent_id).map(|pos| pos.x))
            .unwrap_or(self.canvas_width / 2.0);

        let widths: Vec<f32> = children
            .iter()
            .map(|&child| self.required_width(graph, child, children_map, memo, &mut HashSet::new()))
            .collect();
        let total: f32 =
            widths.iter().sum::<f32>() + self.sibling_gap * children.len().saturating_sub(1) as f32;

        let mut cursor = anchor_x - total / 2.0;
        for (order, (&child, &width)) in children.iter().zip(&widths).enumerate() {
            let slot_center = cursor + width / 2.0;
            cursor += width + self.sibling_gap;

            let child_id = graph[child].id.clone();
            let x = match positions.get(&child_id) {
                Some(pinned) => pinned.x,
                None => {
                    positions.pin(child_id.clone(), Vec2::new(slot_center, y));
                    slot_center
                }
            };
            self.upsert_zone(zones, &child_id, level, x, width, order);
        }
    }

    /// Topics with no structural parent at this level get spread evenly
    /// across the canvas width, independent of any zone.
    #[allow(clippy::too_many_arguments)]
    fn place_fragments(
        &self,
        graph: &TopicGraph,
        fragments: &[TopicIndex],
        level: i32,
        y: f32,
        maps: &ChildrenMaps,
        up_memo: &mut HashMap<TopicIndex, f32>,
        down_memo: &mut HashMap<TopicIndex, f32>,
        zones: &mut ZoneTable,
        positions: &mut PositionStore,
    ) {
        if fragments.is_empty() {
            return;
        }

        let mut ordered: Vec<TopicIndex> = fragments.to_vec();
        ordered.sort_by(|a, b| graph[*a].id.cmp(&graph[*b].id));
        let count = ordered.len() as f32;

        for (order, &idx) in ordered.iter().enumerate() {
            let width = match level.cmp(&0) {
                std::cmp::Ordering::Less => {
                    self.required_width(graph, idx, &maps.up, up_memo, &mut HashSet::new())
                }
                std::cmp::Ordering::Greater => {
                    self.required_width(graph, idx, &maps.down, down_memo, &mut HashSet::new())
                }
                std::cmp::Ordering::Equal => {
                    let up =
                        self.required_width(graph, idx, &maps.up, up_memo, &mut HashSet::new());
                    let down = self.required_width(
                        graph,
                        idx,
                        &maps.down,
                        down_memo,
                        &mut HashSet::new(),
                    );
                    up.max(down)
                }
            };

            let slot_x = self.canvas_width * (order as f32 + 1.0) / (count + 1.0);
            let id = graph[idx].id.clone();
            let x = match positions.get(&id) {
                Some(pinned) => pinned.x,
                None => {
                    positions.pin(id.clone(), Vec2::new(slot_x, y));
                    slot_x
                }
            };
            self.upsert_zone(zones, &id, level, x, width, order);
        }
    }

    /// Zone widths only grow within a session; the recorded center never
    /// moves once set, mirroring pinned positions.
    fn upsert_zone(
        &self,
        zones: &mut ZoneTable,
        owner: &TopicId,
        level: i32,
        center_x: f32,
        width: f32,
        order: usize,
    ) {
        match zones.get_mut(owner, level) {
            Some(zone) => {
                zone.width = zone.width.max(width);
                zone.order = order;
            }
            None => zones.insert(Zone {
                owner: owner.clone(),
                level,
                center_x,
                width,
                order,
            }),
        }
    }
}
