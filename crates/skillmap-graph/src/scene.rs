//! Render-ready output: positioned cards and routed connectors, decoupled
//! from the arena so the drawing layer never touches graph internals.

use crate::edge_router::{CubicBezier, EdgeRouter};
use crate::geometry::{Rect, Vec2};
use crate::graph::TopicGraph;
use crate::level::LevelAssignment;
use crate::zone::PositionStore;
use serde::{Deserialize, Serialize};
use skillmap_core::{LearningStatus, TopicId, TopicKind};

/// One topic card with everything the renderer needs to draw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: TopicId,
    /// Card center.
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
    pub kind: TopicKind,
    pub status: Option<LearningStatus>,
    /// Pre-wrapped name, one entry per rendered line.
    pub display_lines: Vec<String>,
    pub level: i32,
}

impl SceneNode {
    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.position, Vec2::new(self.width, self.height))
    }
}

/// One routed prerequisite connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEdge {
    pub prerequisite: TopicId,
    pub dependent: TopicId,
    pub path: CubicBezier,
}

/// Draw list for one layout pass, nodes in draw order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub edges: Vec<SceneEdge>,
}

impl Scene {
    pub fn node(&self, id: &TopicId) -> Option<&SceneNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }
}

/// Assembles the draw list from a placed graph. Topics without a stored
/// position are left out, as are degenerate zero-length connectors; both
/// only occur with corrupted input and must not take the renderer down.
pub fn build_scene(
    graph: &TopicGraph,
    levels: &LevelAssignment,
    positions: &PositionStore,
) -> Scene {
    let mut scene = Scene::default();

    for idx in graph.node_indices() {
        let node = &graph[idx];
        let Some(position) = positions.get(&node.id) else {
            continue;
        };
        scene.nodes.push(SceneNode {
            id: node.id.clone(),
            position,
            width: node.dimensions.width,
            height: node.dimensions.height,
            kind: node.kind,
            status: node.status,
            display_lines: node.dimensions.lines.clone(),
            level: levels.level(idx),
        });
    }

    for edge in graph.edges() {
        let source = &graph[edge.prerequisite];
        let target = &graph[edge.dependent];
        let (Some(source_pos), Some(target_pos)) =
            (positions.get(&source.id), positions.get(&target.id))
        else {
            continue;
        };
        let source_rect = Rect::from_center_size(
            source_pos,
            Vec2::new(source.dimensions.width, source.dimensions.height),
        );
        let target_rect = Rect::from_center_size(
            target_pos,
            Vec2::new(target.dimensions.width, target.dimensions.height),
        );
        if let Some(path) = EdgeRouter::route(&source_rect, &target_rect) {
            scene.edges.push(SceneEdge {
                prerequisite: source.id.clone(),
                dependent: target.id.clone(),
                path,
            });
        }
    }

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::global::GlobalLayouter;
    use crate::level::assign_global_levels;
    use skillmap_core::{PrerequisiteEdge, Topic};

    fn diamond_scene() -> Scene {
        let topics = vec![
            Topic::new("a", "Arithmetic", TopicKind::THEORY),
            Topic::new("b", "Basic Algebra and Equation Solving", TopicKind::THEORY),
            Topic::new("c", "Coordinate Geometry", TopicKind::PRACTICE),
            Topic::new("d", "Differential Calculus", TopicKind::THEORY),
        ];
        let edges = vec![
            PrerequisiteEdge::new("a", "b"),
            PrerequisiteEdge::new("a", "c"),
            PrerequisiteEdge::new("b", "d"),
            PrerequisiteEdge::new("c", "d"),
        ];
        let (graph, _) = TopicGraph::build(topics, edges).expect("build graph");
        let levels = assign_global_levels(&graph);
        let positions = GlobalLayouter::default().execute(&graph, &levels);
        build_scene(&graph, &levels, &positions)
    }

    #[test]
    fn scene_carries_one_card_per_topic_with_wrapped_lines() {
        let scene = diamond_scene();
        assert_eq!(scene.nodes.len(), 4);
        assert_eq!(scene.edges.len(), 4);

        let b = scene.node(&TopicId::new("b")).expect("card for b");
        assert!(b.display_lines.len() > 1);
        assert_eq!(b.level, 1);
        assert_eq!(b.kind, TopicKind::THEORY);
    }

    #[test]
    fn connectors_anchor_on_the_card_edge_midpoints() {
        let scene = diamond_scene();
        for edge in &scene.edges {
            let source = scene.node(&edge.prerequisite).expect("source card");
            let target = scene.node(&edge.dependent).expect("target card");
            assert_eq!(edge.path.start, source.rect().bottom_mid());
            assert_eq!(edge.path.end, target.rect().top_mid());
        }
    }

    #[test]
    fn unplaced_topics_are_left_out() {
        let topics = vec![
            Topic::new("a", "Arithmetic", TopicKind::THEORY),
            Topic::new("b", "Algebra", TopicKind::THEORY),
        ];
        let edges = vec![PrerequisiteEdge::new("a", "b")];
        let (graph, _) = TopicGraph::build(topics, edges).expect("build graph");
        let levels = assign_global_levels(&graph);
        let empty = PositionStore::new();

        let scene = build_scene(&graph, &levels, &empty);
        assert!(scene.nodes.is_empty());
        assert!(scene.edges.is_empty());
    }

    #[test]
    fn scene_serde_roundtrip() {
        let scene = diamond_scene();
        let json = serde_json::to_string(&scene).expect("serialize scene");
        let back: Scene = serde_json::from_str(&json).expect("deserialize scene");
        assert_eq!(back, scene);
    }
}
