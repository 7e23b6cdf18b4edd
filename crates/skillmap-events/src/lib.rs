use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use skillmap_core::{ExpandDirection, PrerequisiteEdge, Topic, TopicId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Interaction
    NodeSelected {
        id: TopicId,
    },
    /// Double-click; in the local view this is the recenter trigger.
    NodeActivated {
        id: TopicId,
    },
    ExpandRequested {
        id: TopicId,
        direction: ExpandDirection,
    },
    CollapseRequested {
        id: TopicId,
        direction: ExpandDirection,
    },

    // Fetch lifecycle
    NeighborhoodLoaded {
        center: TopicId,
        topics: Vec<Topic>,
        edges: Vec<PrerequisiteEdge>,
    },
    ExpansionLoaded {
        topic: TopicId,
        direction: ExpandDirection,
        new_topics: Vec<Topic>,
        new_edges: Vec<PrerequisiteEdge>,
    },
    FetchFailed {
        error: String,
    },

    // Notifications
    ShowWarning {
        message: String,
    },
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Dispatch all pending events to a listener.
    /// This is useful for processing events in the UI loop.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// Trait for components that respond to events.
/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillmap_core::TopicKind;

    #[test]
    fn test_event_bus_publish_receive() {
        let bus = EventBus::new();
        let sender = bus.sender();
        let receiver = bus.receiver();

        let event = Event::NodeSelected {
            id: TopicId::new("linear-algebra"),
        };

        sender.send(event.clone()).unwrap();

        let received = receiver.recv().unwrap();
        match received {
            Event::NodeSelected { id } => {
                assert_eq!(id.as_str(), "linear-algebra");
            }
            _ => panic!("Expected NodeSelected event"),
        }
    }

    #[test]
    fn test_expand_lifecycle_events() {
        let bus = EventBus::new();
        bus.publish(Event::ExpandRequested {
            id: TopicId::new("calculus"),
            direction: ExpandDirection::Prerequisites,
        });
        bus.publish(Event::ExpansionLoaded {
            topic: TopicId::new("calculus"),
            direction: ExpandDirection::Prerequisites,
            new_topics: vec![Topic::new("limits", "Limits", TopicKind::THEORY)],
            new_edges: vec![PrerequisiteEdge::new("limits", "calculus")],
        });

        let rx = bus.receiver();
        if let Event::ExpandRequested { id, direction } = rx.recv().unwrap() {
            assert_eq!(id.as_str(), "calculus");
            assert_eq!(direction, ExpandDirection::Prerequisites);
        } else {
            panic!("Expected ExpandRequested");
        }

        if let Event::ExpansionLoaded {
            topic, new_topics, ..
        } = rx.recv().unwrap()
        {
            assert_eq!(topic.as_str(), "calculus");
            assert_eq!(new_topics.len(), 1);
        } else {
            panic!("Expected ExpansionLoaded");
        }
    }

    #[test]
    fn test_dispatch_to_drains_queue() {
        struct Collector {
            selections: Vec<TopicId>,
        }

        impl EventListener for Collector {
            fn handle_event(&mut self, event: &Event) {
                if let Event::NodeSelected { id } = event {
                    self.selections.push(id.clone());
                }
            }
        }

        let bus = EventBus::new();
        bus.publish(Event::NodeSelected {
            id: TopicId::new("a"),
        });
        bus.publish(Event::ShowWarning {
            message: "dropped edge".to_string(),
        });
        bus.publish(Event::NodeSelected {
            id: TopicId::new("b"),
        });

        let mut collector = Collector {
            selections: Vec::new(),
        };
        bus.dispatch_to(&mut collector);

        assert_eq!(
            collector.selections,
            vec![TopicId::new("a"), TopicId::new("b")]
        );
        assert!(bus.receiver().try_recv().is_err());
    }

    #[test]
    fn test_event_serde_roundtrip() {
        let event = Event::CollapseRequested {
            id: TopicId::new("calculus"),
            direction: ExpandDirection::Effects,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        match back {
            Event::CollapseRequested { id, direction } => {
                assert_eq!(id.as_str(), "calculus");
                assert_eq!(direction, ExpandDirection::Effects);
            }
            _ => panic!("Expected CollapseRequested event"),
        }
    }
}
