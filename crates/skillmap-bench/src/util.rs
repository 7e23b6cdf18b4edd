use skillmap_core::{PrerequisiteEdge, Topic, TopicKind};

/// Deterministic layered curriculum: `levels` rows of `per_level` topics,
/// every topic below the first row depending on one or two topics from the
/// row above it.
pub fn layered_topics(levels: usize, per_level: usize) -> (Vec<Topic>, Vec<PrerequisiteEdge>) {
    let mut topics = Vec::with_capacity(levels * per_level);
    let mut edges = Vec::new();

    for level in 0..levels {
        for i in 0..per_level {
            let id = topic_id(level, i);
            let name = if i % 4 == 0 {
                format!("Advanced Concepts of Subject {level}-{i}")
            } else {
                format!("Subject {level}-{i}")
            };
            let kind = match i % 3 {
                0 => TopicKind::THEORY,
                1 => TopicKind::PRACTICE,
                _ => TopicKind::PROJECT,
            };
            topics.push(Topic::new(id.clone(), name, kind));

            if level > 0 {
                edges.push(PrerequisiteEdge::new(
                    topic_id(level - 1, (i * 7 + 3) % per_level),
                    id.clone(),
                ));
                if i % 2 == 0 {
                    edges.push(PrerequisiteEdge::new(
                        topic_id(level - 1, (i * 13 + 5) % per_level),
                        id,
                    ));
                }
            }
        }
    }

    (topics, edges)
}

pub fn topic_id(level: usize, i: usize) -> String {
    format!("t{level}x{i}")
}

/// Hub topic unlocking `spokes` direct dependents, each of which unlocks
/// `leaves_per_spoke` further topics. Exercises expansion and collapse
/// around a single branch.
pub fn star_topics(
    spokes: usize,
    leaves_per_spoke: usize,
) -> (Vec<Topic>, Vec<PrerequisiteEdge>) {
    let mut topics = vec![Topic::new("hub", "Hub Topic", TopicKind::THEORY)];
    let mut edges = Vec::new();

    for s in 0..spokes {
        let spoke = format!("s{s:02}");
        topics.push(Topic::new(
            spoke.clone(),
            format!("Spoke Subject {s}"),
            TopicKind::PRACTICE,
        ));
        edges.push(PrerequisiteEdge::new("hub", spoke.clone()));

        for l in 0..leaves_per_spoke {
            let leaf = format!("{spoke}l{l}");
            topics.push(Topic::new(
                leaf.clone(),
                format!("Leaf Exercise {s}-{l}"),
                TopicKind::PROJECT,
            ));
            edges.push(PrerequisiteEdge::new(spoke.clone(), leaf));
        }
    }

    (topics, edges)
}
