pub mod edge_router;
pub mod geometry;
pub mod global;
pub mod graph;
pub mod hit_tester;
pub mod level;
pub mod scene;
pub mod session;
pub mod view;
pub mod zone;

pub use edge_router::{CubicBezier, EdgeRouter};
pub use geometry::{Rect, Vec2};
pub use global::GlobalLayouter;
pub use graph::{EdgeIndex, TopicEdge, TopicGraph, TopicIndex, TopicNode};
pub use hit_tester::{HitResult, HitTester};
pub use level::{LevelAssignment, assign_global_levels, assign_local_levels};
pub use scene::{Scene, SceneEdge, SceneNode, build_scene};
pub use session::{FetchRequest, FetchTicket, LocalSession};
pub use view::{GlobalView, LocalView};
pub use zone::{LocalLayouter, PositionStore, Zone, ZoneTable};
