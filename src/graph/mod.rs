//! Typed view of the movie graph.
//!
//! These structures are what the rest of the crate works with once raw store
//! records have been shaped by [`mapper`]. Nothing here is persisted: every value
//! is rebuilt for a single search, detail lookup, or export.
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod mapper;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub title: String,
    #[serde(rename = "released")]
    pub released_year: Option<i64>,
    pub tagline: Option<String>,
}

/// A movie with its directors and actors, names in store order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub title: String,
    #[serde(rename = "released")]
    pub released_year: Option<i64>,
    pub tagline: Option<String>,
    pub directors: Vec<String>,
    pub actors: Vec<String>,
}

/// Property map of a `:Movie` node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieProps {
    pub title: String,
    #[serde(default)]
    pub released: Option<i64>,
    #[serde(default)]
    pub tagline: Option<String>,
}

/// Property map of a `:Person` node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonProps {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub born: Option<i64>,
}

/// Relationship types connecting a person to a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    Directed,
    ActedIn,
}

impl RelationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Directed => "DIRECTED",
            RelationKind::ActedIn => "ACTED_IN",
        }
    }

    /// Role a person gets when this relationship is the first one seen for them.
    #[must_use]
    pub fn role(self) -> Role {
        match self {
            RelationKind::Directed => Role::Director,
            RelationKind::ActedIn => Role::Actor,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Director,
    Actor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Director => f.write_str("Director"),
            Role::Actor => f.write_str("Actor"),
        }
    }
}

/// One entry of an outer-joined relationship collection.
///
/// `person` is `None` for the placeholder row an `OPTIONAL MATCH` yields when the
/// movie has no relationship of this kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedPerson {
    pub person: Option<PersonProps>,
    #[serde(rename = "rel")]
    pub kind: RelationKind,
}

impl RelatedPerson {
    #[must_use]
    pub fn new(name: &str, kind: RelationKind) -> Self {
        Self { person: Some(PersonProps { name: name.to_string(), born: None }), kind }
    }

    #[must_use]
    pub fn placeholder(kind: RelationKind) -> Self {
        Self { person: None, kind }
    }
}

/// Everything the exporter needs to build a movie's neighborhood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSource {
    pub movie: MovieProps,
    pub directors: Vec<RelatedPerson>,
    pub actors: Vec<RelatedPerson>,
}

impl ExportSource {
    /// Directors first, then actors, each in store order.
    pub fn relations(&self) -> impl Iterator<Item = &RelatedPerson> {
        self.directors.iter().chain(self.actors.iter())
    }
}
