//! Node/link export of a movie's neighborhood.
//!
//! [`GraphExporter`] turns an [`ExportSource`] into an [`ExportGraph`]: the movie
//! node first, then people in the order their relationships were returned
//! (directors before actors). A person keeps the role of the first relationship
//! seen for them and gets one link per relationship record.
//!
//! Ids are `movie_<title>` / `person_<name>` with spaces replaced by underscores.
//! The same label always maps to the same id. Two different labels that derive the
//! same id (`"Tom Hanks"` and `"Tom_Hanks"`) are kept apart: the later one gets a
//! `#2`, `#3`, ... suffix.
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::graph::{ExportSource, MovieProps, RelationKind, Role};

pub mod dot;
pub mod json;

pub use dot::{DotGenerator, DotOptions, DotTheme, RankDir};
pub use json::DEFAULT_EXPORT_PATH;

pub const MOVIE_ID_PREFIX: &str = "movie_";
pub const PERSON_ID_PREFIX: &str = "person_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    Movie { released: Option<i64>, tagline: Option<String> },
    Person { role: Role },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl GraphNode {
    #[must_use]
    pub fn movie(id: String, movie: &MovieProps) -> Self {
        Self {
            id,
            label: movie.title.clone(),
            kind: NodeKind::Movie { released: movie.released, tagline: movie.tagline.clone() },
        }
    }

    #[must_use]
    pub fn person(id: String, name: &str, role: Role) -> Self {
        Self { id, label: name.to_string(), kind: NodeKind::Person { role } }
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        match self.kind {
            NodeKind::Person { role } => Some(role),
            NodeKind::Movie { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl ExportGraph {
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Links whose source or target is not a node of this graph.
    #[must_use]
    pub fn dangling_links(&self) -> Vec<&GraphLink> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.links
            .iter()
            .filter(|l| !ids.contains(l.source.as_str()) || !ids.contains(l.target.as_str()))
            .collect()
    }
}

/// Space-to-underscore id for `label`, without disambiguation.
#[must_use]
pub fn base_id(prefix: &str, label: &str) -> String {
    format!("{prefix}{}", label.replace(' ', "_"))
}

#[derive(Debug, Default)]
struct IdAllocator {
    assigned: HashMap<(&'static str, String), String>,
    taken: HashSet<String>,
}

impl IdAllocator {
    /// Returns the id for `label` and whether it was assigned just now.
    fn assign(&mut self, prefix: &'static str, label: &str) -> (String, bool) {
        if let Some(id) = self.assigned.get(&(prefix, label.to_string())) {
            return (id.clone(), false);
        }
        let base = base_id(prefix, label);
        let mut id = base.clone();
        let mut n = 2;
        while self.taken.contains(&id) {
            id = format!("{base}#{n}");
            n += 1;
        }
        if id != base {
            tracing::warn!(label, base = %base, id = %id, "node id collision, using suffixed id");
        }
        self.taken.insert(id.clone());
        self.assigned.insert((prefix, label.to_string()), id.clone());
        (id, true)
    }
}

#[derive(Debug, Default)]
pub struct GraphExporter;

impl GraphExporter {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    #[must_use]
    pub fn build(&self, source: &ExportSource) -> ExportGraph {
        let mut ids = IdAllocator::default();
        let mut graph = ExportGraph::default();

        let (movie_id, _) = ids.assign(MOVIE_ID_PREFIX, &source.movie.title);
        graph.nodes.push(GraphNode::movie(movie_id.clone(), &source.movie));

        for rel in source.relations() {
            let Some(person) = rel.person.as_ref() else {
                continue;
            };
            let (person_id, is_new) = ids.assign(PERSON_ID_PREFIX, &person.name);
            if is_new {
                graph.nodes.push(GraphNode::person(person_id.clone(), &person.name, rel.kind.role()));
            }
            graph.links.push(GraphLink {
                source: person_id,
                target: movie_id.clone(),
                kind: rel.kind,
            });
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RelatedPerson;

    fn source(directors: &[&str], actors: &[&str]) -> ExportSource {
        ExportSource {
            movie: MovieProps { title: "The Matrix".into(), released: Some(1999), tagline: None },
            directors: directors.iter().map(|n| RelatedPerson::new(n, RelationKind::Directed)).collect(),
            actors: actors.iter().map(|n| RelatedPerson::new(n, RelationKind::ActedIn)).collect(),
        }
    }

    #[test]
    fn ids_replace_spaces_only() {
        assert_eq!(base_id(MOVIE_ID_PREFIX, "The Matrix"), "movie_The_Matrix");
        assert_eq!(base_id(PERSON_ID_PREFIX, "Carrie-Anne  Moss"), "person_Carrie-Anne__Moss");
        assert_eq!(base_id(PERSON_ID_PREFIX, "Zoë"), "person_Zoë");
    }

    #[test]
    fn allocator_reuses_ids_per_label_and_suffixes_collisions() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.assign(PERSON_ID_PREFIX, "Tom Hanks"), ("person_Tom_Hanks".to_string(), true));
        assert_eq!(ids.assign(PERSON_ID_PREFIX, "Tom Hanks"), ("person_Tom_Hanks".to_string(), false));
        assert_eq!(ids.assign(PERSON_ID_PREFIX, "Tom_Hanks"), ("person_Tom_Hanks#2".to_string(), true));
        assert_eq!(ids.assign(PERSON_ID_PREFIX, "Tom  Hanks").0, "person_Tom__Hanks");
    }

    #[test]
    fn movie_node_comes_first() {
        let g = GraphExporter::new().build(&source(&["Lana Wachowski"], &["Keanu Reeves"]));
        assert_eq!(g.nodes[0].id, "movie_The_Matrix");
        assert_eq!(
            g.nodes[0].kind,
            NodeKind::Movie { released: Some(1999), tagline: None }
        );
        assert_eq!(g.nodes[1].role(), Some(Role::Director));
        assert_eq!(g.nodes[2].role(), Some(Role::Actor));
        assert!(g.dangling_links().is_empty());
    }

    #[test]
    fn placeholders_produce_no_nodes_or_links() {
        let mut src = source(&[], &[]);
        src.directors.push(RelatedPerson::placeholder(RelationKind::Directed));
        src.actors.push(RelatedPerson::placeholder(RelationKind::ActedIn));
        let g = GraphExporter::new().build(&src);
        assert_eq!(g.nodes.len(), 1);
        assert!(g.links.is_empty());
    }
}
