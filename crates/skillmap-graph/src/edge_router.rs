//! Prerequisite connector geometry.
//!
//! Every edge leaves the source card at its bottom-edge midpoint and arrives
//! at the target card's top-edge midpoint, as a cubic whose control points
//! extend vertically from each anchor. The curve departs and arrives
//! perpendicular to the card edges, which keeps parallel edges apart
//! visually even when many share a row.

use crate::geometry::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Fraction of the vertical distance each control point extends from its
/// anchor, and the cap that keeps very tall edges from ballooning.
pub const CONTROL_OFFSET_FACTOR: f32 = 0.4;
pub const CONTROL_OFFSET_CAP: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub start: Vec2,
    pub control1: Vec2,
    pub control2: Vec2,
    pub end: Vec2,
}

impl CubicBezier {
    /// Point on the curve at parameter `t` in [0, 1].
    pub fn sample(&self, t: f32) -> Vec2 {
        let u = 1.0 - t;
        let w0 = u * u * u;
        let w1 = 3.0 * u * u * t;
        let w2 = 3.0 * u * t * t;
        let w3 = t * t * t;
        Vec2::new(
            w0 * self.start.x + w1 * self.control1.x + w2 * self.control2.x + w3 * self.end.x,
            w0 * self.start.y + w1 * self.control1.y + w2 * self.control2.y + w3 * self.end.y,
        )
    }

    /// Smallest distance from `point` to the curve, approximated by uniform
    /// sampling. Good enough for pointer hit tolerance; not for analytic
    /// nearest-point queries.
    pub fn point_distance(&self, point: Vec2, num_samples: usize) -> f32 {
        let num_samples = num_samples.max(1);
        (0..=num_samples)
            .map(|i| self.sample(i as f32 / num_samples as f32).distance(point))
            .fold(f32::INFINITY, f32::min)
    }
}

pub struct EdgeRouter;

impl EdgeRouter {
    /// Routes one connector between two placed cards. Returns `None` when
    /// both anchors resolve to the same point, which only happens with
    /// degenerate input data and would otherwise render as a dot artifact.
    pub fn route(source: &Rect, target: &Rect) -> Option<CubicBezier> {
        let start = source.bottom_mid();
        let end = target.top_mid();
        if start == end {
            return None;
        }

        let offset = (CONTROL_OFFSET_FACTOR * (end.y - start.y).abs()).min(CONTROL_OFFSET_CAP);
        Some(CubicBezier {
            start,
            control1: Vec2::new(start.x, start.y + offset),
            control2: Vec2::new(end.x, end.y - offset),
            end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn card(center_x: f32, center_y: f32) -> Rect {
        Rect::from_center_size(Vec2::new(center_x, center_y), Vec2::new(60.0, 34.0))
    }

    #[test]
    fn connector_anchors_at_bottom_and_top_midpoints() {
        let source = card(100.0, 100.0);
        let target = card(220.0, 300.0);
        let curve = EdgeRouter::route(&source, &target).expect("routable");

        assert_eq!(curve.start, Vec2::new(100.0, 117.0));
        assert_eq!(curve.end, Vec2::new(220.0, 283.0));
        assert_eq!(curve.sample(0.0), curve.start);
        assert_eq!(curve.sample(1.0), curve.end);
    }

    #[test]
    fn control_points_extend_perpendicular_to_the_cards() {
        let source = card(100.0, 100.0);
        let target = card(100.0, 300.0);
        let curve = EdgeRouter::route(&source, &target).expect("routable");

        // Vertical span 283 - 117 = 166, offset 0.4 * 166 = 66.4 < cap.
        assert!((curve.control1.y - (117.0 + 66.4)).abs() < 1e-3);
        assert!((curve.control2.y - (283.0 - 66.4)).abs() < 1e-3);
        assert_eq!(curve.control1.x, curve.start.x);
        assert_eq!(curve.control2.x, curve.end.x);
    }

    #[test]
    fn control_offset_is_capped_for_tall_edges() {
        let source = card(100.0, 100.0);
        let target = card(100.0, 700.0);
        let curve = EdgeRouter::route(&source, &target).expect("routable");

        assert_eq!(curve.control1.y, curve.start.y + CONTROL_OFFSET_CAP);
        assert_eq!(curve.control2.y, curve.end.y - CONTROL_OFFSET_CAP);
    }

    #[test]
    fn coincident_anchors_produce_no_path() {
        let point = Rect::from_center_size(Vec2::new(50.0, 50.0), Vec2::new(0.0, 0.0));
        assert!(EdgeRouter::route(&point, &point).is_none());
    }

    #[test]
    fn midpoint_sample_lies_between_the_anchors() {
        let source = card(100.0, 100.0);
        let target = card(300.0, 400.0);
        let curve = EdgeRouter::route(&source, &target).expect("routable");
        let mid = curve.sample(0.5);

        assert!(mid.x > curve.start.x && mid.x < curve.end.x);
        assert!(mid.y > curve.start.y && mid.y < curve.end.y);
    }

    proptest! {
        /// Routing is pure: same cards, same curve, with anchors exactly on
        /// the card edge midpoints and the control offset within the cap.
        #[test]
        fn prop_routing_is_deterministic_and_anchored(
            sx in -2000.0f32..2000.0,
            sy in -2000.0f32..2000.0,
            tx in -2000.0f32..2000.0,
            ty in -2000.0f32..2000.0,
        ) {
            let source = card(sx, sy);
            let target = card(tx, ty);
            let first = EdgeRouter::route(&source, &target);
            let second = EdgeRouter::route(&source, &target);
            prop_assert_eq!(first, second);

            if let Some(curve) = first {
                prop_assert_eq!(curve.start, source.bottom_mid());
                prop_assert_eq!(curve.end, target.top_mid());
                let offset = curve.control1.y - curve.start.y;
                prop_assert!(offset >= 0.0);
                prop_assert!(offset <= CONTROL_OFFSET_CAP);
            }
        }
    }
}
