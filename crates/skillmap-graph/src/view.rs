//! View facades over the layout engine.
//!
//! [`GlobalView`] is the whole-map overview: built once from a full fetch,
//! never mutated. [`LocalView`] wraps a [`LocalSession`] and drives its
//! two-phase fetches against a [`TopicSource`] synchronously, publishing
//! interaction and lifecycle events on the bus as it goes. Embedders that
//! fetch asynchronously can skip `LocalView` and drive the session's
//! ticket API themselves.

use crate::geometry::Vec2;
use crate::global::GlobalLayouter;
use crate::graph::TopicGraph;
use crate::hit_tester::{HitResult, HitTester};
use crate::level::{LevelAssignment, assign_global_levels};
use crate::scene::{Scene, build_scene};
use crate::session::LocalSession;
use crate::zone::PositionStore;
use skillmap_core::{
    DataWarning, ExpandDirection, SessionError, TopicId, TopicSource,
};
use skillmap_events::{Event, EventBus};

/// Immutable overview of the entire topic graph.
pub struct GlobalView {
    graph: TopicGraph,
    levels: LevelAssignment,
    positions: PositionStore,
    scene: Scene,
    hit_tester: HitTester,
    warnings: Vec<DataWarning>,
}

impl GlobalView {
    /// Fetches the full graph and lays it out. Fails without side effects
    /// when the fetch or the graph construction fails.
    pub fn load(source: &dyn TopicSource, language: &str) -> Result<Self, SessionError> {
        let data = source.full_topic_graph(language)?;
        let (graph, mut warnings) = TopicGraph::build(data.topics, data.edges)?;
        let mut levels = assign_global_levels(&graph);
        warnings.append(&mut levels.warnings);
        let positions = GlobalLayouter::default().execute(&graph, &levels);
        let scene = build_scene(&graph, &levels, &positions);
        let mut hit_tester = HitTester::new();
        hit_tester.update(&scene);
        Ok(Self {
            graph,
            levels,
            positions,
            scene,
            hit_tester,
            warnings,
        })
    }

    pub fn graph(&self) -> &TopicGraph {
        &self.graph
    }

    pub fn levels(&self) -> &LevelAssignment {
        &self.levels
    }

    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn warnings(&self) -> &[DataWarning] {
        &self.warnings
    }

    pub fn hit_test(&self, pos: Vec2) -> HitResult {
        self.hit_tester.hit_test(pos)
    }

    /// Single click: publishes `NodeSelected` when a card is under the
    /// pointer.
    pub fn click(&self, bus: &EventBus, pos: Vec2) -> HitResult {
        let hit = self.hit_tester.hit_test(pos);
        if let HitResult::Node(id) = &hit {
            bus.publish(Event::NodeSelected { id: id.clone() });
        }
        hit
    }

    /// Double click: publishes `NodeActivated`, the embedder's cue to open
    /// a local view on that topic.
    pub fn activate(&self, bus: &EventBus, pos: Vec2) -> HitResult {
        let hit = self.hit_tester.hit_test(pos);
        if let HitResult::Node(id) = &hit {
            bus.publish(Event::NodeActivated { id: id.clone() });
        }
        hit
    }
}

/// Interactive local view around one center topic.
pub struct LocalView {
    session: LocalSession,
    scene: Scene,
    hit_tester: HitTester,
    published_warnings: usize,
}

impl LocalView {
    /// Opens a local view on `center`, fetching its immediate neighborhood.
    pub fn open(
        source: &dyn TopicSource,
        bus: &EventBus,
        center: TopicId,
        language: &str,
    ) -> Result<Self, SessionError> {
        let (mut session, ticket) = LocalSession::new(center.clone(), language);
        let result = source.local_neighborhood(&center, language);
        let payload = result.as_ref().ok().cloned();
        if let Err(err) = session.complete_neighborhood(ticket, result) {
            bus.publish(Event::FetchFailed {
                error: err.to_string(),
            });
            return Err(err);
        }

        let mut view = Self {
            session,
            scene: Scene::default(),
            hit_tester: HitTester::new(),
            published_warnings: 0,
        };
        if let Some(data) = payload {
            let mut topics = vec![data.center.clone()];
            topics.extend(data.prerequisites);
            topics.extend(data.effects);
            bus.publish(Event::NeighborhoodLoaded {
                center: data.center.id,
                topics,
                edges: data.edges,
            });
        }
        view.publish_new_warnings(bus);
        view.refresh();
        Ok(view)
    }

    pub fn session(&self) -> &LocalSession {
        &self.session
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn hit_test(&self, pos: Vec2) -> HitResult {
        self.hit_tester.hit_test(pos)
    }

    /// Expands one direction of a topic, fetching its neighbors. Returns
    /// `Ok(false)` when the branch was already expanded.
    pub fn expand(
        &mut self,
        source: &dyn TopicSource,
        bus: &EventBus,
        topic: &TopicId,
        direction: ExpandDirection,
    ) -> Result<bool, SessionError> {
        bus.publish(Event::ExpandRequested {
            id: topic.clone(),
            direction,
        });
        let Some(ticket) = self.session.begin_expand(topic, direction)? else {
            return Ok(false);
        };

        let result = source.expansion(topic, direction);
        let payload = result.as_ref().ok().cloned();
        match self.session.complete_expansion(ticket, result) {
            Ok(applied) => {
                if applied {
                    if let Some(data) = payload {
                        bus.publish(Event::ExpansionLoaded {
                            topic: topic.clone(),
                            direction,
                            new_topics: data.new_topics,
                            new_edges: data.new_edges,
                        });
                    }
                    self.publish_new_warnings(bus);
                    self.refresh();
                }
                Ok(applied)
            }
            Err(err) => {
                bus.publish(Event::FetchFailed {
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Collapses one direction of a topic. Returns the removed topic ids.
    pub fn collapse(
        &mut self,
        bus: &EventBus,
        topic: &TopicId,
        direction: ExpandDirection,
    ) -> Result<Vec<TopicId>, SessionError> {
        bus.publish(Event::CollapseRequested {
            id: topic.clone(),
            direction,
        });
        let removed = self.session.collapse(topic, direction)?;
        self.refresh();
        Ok(removed)
    }

    /// Hard reset onto a new center topic.
    pub fn recenter(
        &mut self,
        source: &dyn TopicSource,
        bus: &EventBus,
        new_center: TopicId,
    ) -> Result<(), SessionError> {
        let ticket = self.session.begin_recenter(new_center.clone());
        let result = source.local_neighborhood(&new_center, self.session.language());
        let payload = result.as_ref().ok().cloned();
        match self.session.complete_neighborhood(ticket, result) {
            Ok(_) => {
                if let Some(data) = payload {
                    let mut topics = vec![data.center.clone()];
                    topics.extend(data.prerequisites);
                    topics.extend(data.effects);
                    bus.publish(Event::NeighborhoodLoaded {
                        center: data.center.id,
                        topics,
                        edges: data.edges,
                    });
                }
                self.published_warnings = 0;
                self.publish_new_warnings(bus);
                self.refresh();
                Ok(())
            }
            Err(err) => {
                bus.publish(Event::FetchFailed {
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Single click: publishes `NodeSelected` for the card under the
    /// pointer.
    pub fn click(&self, bus: &EventBus, pos: Vec2) -> HitResult {
        let hit = self.hit_tester.hit_test(pos);
        if let HitResult::Node(id) = &hit {
            bus.publish(Event::NodeSelected { id: id.clone() });
        }
        hit
    }

    /// Double click on a card recenters the view on it.
    pub fn activate(
        &mut self,
        source: &dyn TopicSource,
        bus: &EventBus,
        pos: Vec2,
    ) -> Result<HitResult, SessionError> {
        let hit = self.hit_tester.hit_test(pos);
        if let HitResult::Node(id) = &hit {
            bus.publish(Event::NodeActivated { id: id.clone() });
            self.recenter(source, bus, id.clone())?;
        }
        Ok(hit)
    }

    fn refresh(&mut self) {
        self.scene = build_scene(
            self.session.graph(),
            self.session.levels(),
            self.session.positions(),
        );
        self.hit_tester.update(&self.scene);
    }

    fn publish_new_warnings(&mut self, bus: &EventBus) {
        let warnings = self.session.warnings();
        let start = self.published_warnings.min(warnings.len());
        for warning in &warnings[start..] {
            bus.publish(Event::ShowWarning {
                message: warning.to_string(),
            });
        }
        self.published_warnings = warnings.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillmap_core::{
        ExpansionData, InMemoryTopicSource, NeighborhoodData, PrerequisiteEdge, SourceError,
        Topic, TopicGraphData, TopicKind,
    };

    fn topic(id: &str) -> Topic {
        Topic::new(id, id.to_uppercase(), TopicKind::THEORY)
    }

    fn diamond_source() -> InMemoryTopicSource {
        InMemoryTopicSource::new(
            vec![topic("a"), topic("b"), topic("c"), topic("d")],
            vec![
                PrerequisiteEdge::new("a", "b"),
                PrerequisiteEdge::new("a", "c"),
                PrerequisiteEdge::new("b", "d"),
                PrerequisiteEdge::new("c", "d"),
            ],
        )
    }

    fn drain(bus: &EventBus) -> Vec<Event> {
        let rx = bus.receiver();
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    /// Source whose every fetch fails, for error-path coverage.
    struct OfflineSource;

    impl TopicSource for OfflineSource {
        fn full_topic_graph(&self, _language: &str) -> Result<TopicGraphData, SourceError> {
            Err(SourceError::Fetch("offline".into()))
        }

        fn local_neighborhood(
            &self,
            _center: &TopicId,
            _language: &str,
        ) -> Result<NeighborhoodData, SourceError> {
            Err(SourceError::Fetch("offline".into()))
        }

        fn expansion(
            &self,
            _topic: &TopicId,
            _direction: ExpandDirection,
        ) -> Result<ExpansionData, SourceError> {
            Err(SourceError::Fetch("offline".into()))
        }
    }

    #[test]
    fn global_view_lays_out_the_whole_graph() {
        let source = diamond_source();
        let view = GlobalView::load(&source, "en").expect("load global view");

        assert_eq!(view.scene().nodes.len(), 4);
        assert_eq!(view.scene().edges.len(), 4);
        assert!(view.warnings().is_empty());

        let a_pos = view.positions().get(&TopicId::new("a")).expect("a placed");
        let bus = EventBus::new();
        let hit = view.click(&bus, a_pos);
        assert_eq!(hit, HitResult::Node(TopicId::new("a")));
        assert!(matches!(
            drain(&bus).as_slice(),
            [Event::NodeSelected { id }] if id == &TopicId::new("a")
        ));
    }

    #[test]
    fn local_view_expand_publishes_the_lifecycle() {
        let source = diamond_source();
        let bus = EventBus::new();
        let mut view =
            LocalView::open(&source, &bus, TopicId::new("d"), "en").expect("open local view");
        assert!(matches!(
            drain(&bus).as_slice(),
            [Event::NeighborhoodLoaded { center, topics, .. }]
                if center == &TopicId::new("d") && topics.len() == 3
        ));
        assert_eq!(view.scene().nodes.len(), 3);

        let applied = view
            .expand(&source, &bus, &TopicId::new("b"), ExpandDirection::Prerequisites)
            .expect("expand");
        assert!(applied);
        assert_eq!(view.scene().nodes.len(), 4);

        let events = drain(&bus);
        assert!(matches!(
            events.as_slice(),
            [
                Event::ExpandRequested { id, .. },
                Event::ExpansionLoaded { new_topics, .. },
            ] if id == &TopicId::new("b") && new_topics.len() == 1
        ));
    }

    #[test]
    fn collapse_shrinks_the_scene() {
        let source = diamond_source();
        let bus = EventBus::new();
        let mut view =
            LocalView::open(&source, &bus, TopicId::new("d"), "en").expect("open local view");
        view.expand(&source, &bus, &TopicId::new("b"), ExpandDirection::Prerequisites)
            .expect("expand");
        drain(&bus);

        let removed = view
            .collapse(&bus, &TopicId::new("b"), ExpandDirection::Prerequisites)
            .expect("collapse");
        assert_eq!(removed, vec![TopicId::new("a")]);
        assert_eq!(view.scene().nodes.len(), 3);
        assert!(matches!(
            drain(&bus).as_slice(),
            [Event::CollapseRequested { .. }]
        ));
    }

    #[test]
    fn double_click_recenters_on_the_card() {
        let source = diamond_source();
        let bus = EventBus::new();
        let mut view =
            LocalView::open(&source, &bus, TopicId::new("d"), "en").expect("open local view");
        drain(&bus);

        let b_pos = view
            .session()
            .positions()
            .get(&TopicId::new("b"))
            .expect("b placed");
        let hit = view.activate(&source, &bus, b_pos).expect("activate");
        assert_eq!(hit, HitResult::Node(TopicId::new("b")));
        assert_eq!(view.session().center(), &TopicId::new("b"));
        // b's own neighborhood brings a into view.
        assert!(view.session().graph().contains(&TopicId::new("a")));

        let events = drain(&bus);
        assert!(matches!(
            events.as_slice(),
            [Event::NodeActivated { .. }, Event::NeighborhoodLoaded { .. }]
        ));
    }

    #[test]
    fn failed_fetch_surfaces_an_event_and_an_error() {
        let source = diamond_source();
        let bus = EventBus::new();
        let mut view =
            LocalView::open(&source, &bus, TopicId::new("d"), "en").expect("open local view");
        drain(&bus);

        let outcome = view.expand(
            &OfflineSource,
            &bus,
            &TopicId::new("b"),
            ExpandDirection::Prerequisites,
        );
        assert!(matches!(outcome, Err(SessionError::Source(_))));
        assert_eq!(view.scene().nodes.len(), 3);

        let events = drain(&bus);
        assert!(matches!(
            events.as_slice(),
            [Event::ExpandRequested { .. }, Event::FetchFailed { .. }]
        ));
    }

    #[test]
    fn opening_against_a_dead_source_fails_cleanly() {
        let bus = EventBus::new();
        let result = LocalView::open(&OfflineSource, &bus, TopicId::new("d"), "en");
        assert!(matches!(result, Err(SessionError::Source(_))));
        assert!(matches!(drain(&bus).as_slice(), [Event::FetchFailed { .. }]));
        assert!(GlobalView::load(&OfflineSource, "en").is_err());
    }
}
