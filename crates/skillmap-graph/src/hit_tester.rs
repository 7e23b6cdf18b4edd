//! Pointer hit testing over a built scene.
//!
//! Priority order: Node > Edge > None. Cards are tested in reverse draw
//! order so the card painted on top wins when two overlap; connectors are
//! matched by sampled distance to their curve within a pixel tolerance.

use crate::edge_router::CubicBezier;
use crate::geometry::{Rect, Vec2};
use crate::scene::Scene;
use skillmap_core::TopicId;

/// Result of a hit test at a given position.
#[derive(Debug, Clone, PartialEq)]
pub enum HitResult {
    /// Nothing was hit at the tested position.
    None,
    /// A topic card was hit.
    Node(TopicId),
    /// A prerequisite connector was hit.
    Edge {
        prerequisite: TopicId,
        dependent: TopicId,
    },
}

/// Spatial index over the current scene, refreshed after every layout pass.
#[derive(Debug, Clone)]
pub struct HitTester {
    /// Card rectangles in draw order.
    node_rects: Vec<(TopicId, Rect)>,
    /// Routed curves with their edge endpoints.
    edge_curves: Vec<(TopicId, TopicId, CubicBezier)>,
    /// Maximum distance (in pixels) from a curve to count as a hit.
    edge_tolerance: f32,
    /// Number of samples along bezier curves for distance computation.
    bezier_samples: usize,
}

impl Default for HitTester {
    fn default() -> Self {
        Self::new()
    }
}

impl HitTester {
    pub fn new() -> Self {
        Self {
            node_rects: Vec::new(),
            edge_curves: Vec::new(),
            edge_tolerance: 8.0,
            bezier_samples: 48,
        }
    }

    pub fn with_tolerance(tolerance: f32) -> Self {
        Self {
            edge_tolerance: tolerance,
            ..Self::new()
        }
    }

    pub fn edge_tolerance(&self) -> f32 {
        self.edge_tolerance
    }

    pub fn set_edge_tolerance(&mut self, tolerance: f32) {
        self.edge_tolerance = tolerance;
    }

    pub fn bezier_samples(&self) -> usize {
        self.bezier_samples
    }

    /// Refreshes the spatial data from a scene. Call after any layout pass.
    pub fn update(&mut self, scene: &Scene) {
        self.node_rects.clear();
        self.edge_curves.clear();

        for node in &scene.nodes {
            self.node_rects.push((node.id.clone(), node.rect()));
        }
        for edge in &scene.edges {
            self.edge_curves
                .push((edge.prerequisite.clone(), edge.dependent.clone(), edge.path));
        }
    }

    /// Hit test with priority Node > Edge > None.
    pub fn hit_test(&self, pos: Vec2) -> HitResult {
        if let Some(id) = self.hit_test_node(pos) {
            return HitResult::Node(id);
        }
        if let Some((prerequisite, dependent)) = self.hit_test_edge(pos, self.edge_tolerance) {
            return HitResult::Edge {
                prerequisite,
                dependent,
            };
        }
        HitResult::None
    }

    /// The card under `pos`, preferring the one drawn last when several
    /// overlap.
    pub fn hit_test_node(&self, pos: Vec2) -> Option<TopicId> {
        self.node_rects
            .iter()
            .rev()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(id, _)| id.clone())
    }

    /// The connector closest to `pos` within `tolerance`, if any.
    pub fn hit_test_edge(&self, pos: Vec2, tolerance: f32) -> Option<(TopicId, TopicId)> {
        let mut best: Option<(TopicId, TopicId)> = None;
        let mut best_dist = tolerance;

        for (prerequisite, dependent, curve) in &self.edge_curves {
            let dist = curve.point_distance(pos, self.bezier_samples);
            if dist < best_dist {
                best_dist = dist;
                best = Some((prerequisite.clone(), dependent.clone()));
            }
        }

        best
    }

    pub fn node_rects(&self) -> &[(TopicId, Rect)] {
        &self.node_rects
    }

    pub fn edge_curves(&self) -> &[(TopicId, TopicId, CubicBezier)] {
        &self.edge_curves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge_router::EdgeRouter;
    use crate::scene::{SceneEdge, SceneNode};
    use skillmap_core::TopicKind;

    fn card(id: &str, x: f32, y: f32) -> SceneNode {
        SceneNode {
            id: TopicId::new(id),
            position: Vec2::new(x, y),
            width: 60.0,
            height: 34.0,
            kind: TopicKind::THEORY,
            status: None,
            display_lines: vec![id.to_uppercase()],
            level: 0,
        }
    }

    fn connected_scene() -> Scene {
        let source = card("a", 100.0, 100.0);
        let target = card("b", 100.0, 300.0);
        let path =
            EdgeRouter::route(&source.rect(), &target.rect()).expect("routable");
        Scene {
            nodes: vec![source, target],
            edges: vec![SceneEdge {
                prerequisite: TopicId::new("a"),
                dependent: TopicId::new("b"),
                path,
            }],
        }
    }

    #[test]
    fn card_interior_hits_its_topic() {
        let mut tester = HitTester::new();
        tester.update(&connected_scene());

        assert_eq!(
            tester.hit_test(Vec2::new(110.0, 95.0)),
            HitResult::Node(TopicId::new("a"))
        );
        assert_eq!(tester.hit_test(Vec2::new(500.0, 500.0)), HitResult::None);
    }

    #[test]
    fn connector_hits_within_tolerance_only() {
        let mut tester = HitTester::new();
        tester.update(&connected_scene());

        // The routed curve runs vertically at x = 100 between the cards.
        assert_eq!(
            tester.hit_test(Vec2::new(103.0, 200.0)),
            HitResult::Edge {
                prerequisite: TopicId::new("a"),
                dependent: TopicId::new("b"),
            }
        );
        assert_eq!(tester.hit_test(Vec2::new(130.0, 200.0)), HitResult::None);
    }

    #[test]
    fn cards_take_priority_over_connectors() {
        let mut tester = HitTester::new();
        tester.update(&connected_scene());

        // Just inside the source card's bottom edge, where the curve starts.
        assert_eq!(
            tester.hit_test(Vec2::new(100.0, 116.0)),
            HitResult::Node(TopicId::new("a"))
        );
    }

    #[test]
    fn topmost_card_wins_on_overlap() {
        let scene = Scene {
            nodes: vec![card("under", 100.0, 100.0), card("over", 110.0, 105.0)],
            edges: Vec::new(),
        };
        let mut tester = HitTester::new();
        tester.update(&scene);

        assert_eq!(
            tester.hit_test(Vec2::new(100.0, 100.0)),
            HitResult::Node(TopicId::new("over"))
        );
    }

    #[test]
    fn update_replaces_previous_scene() {
        let mut tester = HitTester::new();
        tester.update(&connected_scene());
        assert_eq!(tester.node_rects().len(), 2);

        tester.update(&Scene::default());
        assert!(tester.node_rects().is_empty());
        assert_eq!(tester.hit_test(Vec2::new(110.0, 95.0)), HitResult::None);
    }

    #[test]
    fn widened_tolerance_extends_the_reach() {
        let mut tester = HitTester::with_tolerance(2.0);
        tester.update(&connected_scene());
        assert_eq!(tester.hit_test(Vec2::new(105.0, 200.0)), HitResult::None);

        tester.set_edge_tolerance(8.0);
        assert!(matches!(
            tester.hit_test(Vec2::new(105.0, 200.0)),
            HitResult::Edge { .. }
        ));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::scene::SceneNode;
    use proptest::prelude::*;
    use skillmap_core::TopicKind;

    fn lone_card(x: f32, y: f32, w: f32, h: f32) -> Scene {
        Scene {
            nodes: vec![SceneNode {
                id: TopicId::new("t"),
                position: Vec2::new(x, y),
                width: w,
                height: h,
                kind: TopicKind::THEORY,
                status: None,
                display_lines: vec!["T".to_string()],
                level: 0,
            }],
            edges: Vec::new(),
        }
    }

    proptest! {
        #[test]
        fn prop_card_center_always_hits(
            x in -1000.0f32..1000.0,
            y in -1000.0f32..1000.0,
            w in 20.0f32..300.0,
            h in 20.0f32..120.0,
        ) {
            let mut tester = HitTester::new();
            tester.update(&lone_card(x, y, w, h));
            prop_assert_eq!(
                tester.hit_test(Vec2::new(x, y)),
                HitResult::Node(TopicId::new("t"))
            );
        }

        #[test]
        fn prop_points_beyond_the_card_never_hit_it(
            x in -1000.0f32..1000.0,
            y in -1000.0f32..1000.0,
            w in 20.0f32..300.0,
            h in 20.0f32..120.0,
            offset in 1.0f32..500.0,
            quadrant in 0u8..4,
        ) {
            let mut tester = HitTester::new();
            tester.update(&lone_card(x, y, w, h));

            let outside = match quadrant {
                0 => Vec2::new(x - w / 2.0 - offset, y),
                1 => Vec2::new(x + w / 2.0 + offset, y),
                2 => Vec2::new(x, y - h / 2.0 - offset),
                _ => Vec2::new(x, y + h / 2.0 + offset),
            };
            prop_assert_eq!(tester.hit_test(outside), HitResult::None);
        }
    }
}
