//! In-process movie graph.
//!
//! Answers the same statements as the Neo4j backend with the same row shapes,
//! including the outer-join placeholders, from a dataset kept in memory. Used for
//! offline runs (`--dataset movies.json`) and by the test suite.
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cell::Cell;
use std::collections::HashSet;
use std::path::Path;

use super::{GraphConnection, Record, Statement, StatementKind};
use crate::errors::{ExplorerError, Result};
use crate::graph::mapper::compare_release_desc;
use crate::graph::{MovieProps, PersonProps, RelationKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRelationship {
    pub person: String,
    pub movie: String,
    #[serde(rename = "type")]
    pub kind: RelationKind,
}

/// On-disk layout of `--dataset` files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub movies: Vec<MovieProps>,
    #[serde(default)]
    pub people: Vec<PersonProps>,
    #[serde(default)]
    pub relationships: Vec<DatasetRelationship>,
}

impl Dataset {
    /// Every relationship must point at a known person and movie.
    fn dangling_reference(&self) -> Option<String> {
        let movies: HashSet<&str> = self.movies.iter().map(|m| m.title.as_str()).collect();
        let people: HashSet<&str> = self.people.iter().map(|p| p.name.as_str()).collect();
        self.relationships.iter().find_map(|r| {
            if !people.contains(r.person.as_str()) {
                Some(format!("relationship references unknown person '{}'", r.person))
            } else if !movies.contains(r.movie.as_str()) {
                Some(format!("relationship references unknown movie '{}'", r.movie))
            } else {
                None
            }
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryGraph {
    dataset: Dataset,
    opened: Cell<usize>,
    closed: Cell<usize>,
}

impl MemoryGraph {
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset, ..Default::default() }
    }

    /// Load a dataset file.
    ///
    /// # Errors
    /// `ExplorerError::Io` if the file cannot be read, `ExplorerError::Dataset` if it is
    /// not a valid dataset or contains relationships to unknown nodes.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let dataset: Dataset = serde_json::from_str(&data).map_err(|e| ExplorerError::Dataset {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if let Some(message) = dataset.dangling_reference() {
            return Err(ExplorerError::Dataset { path: path.to_path_buf(), message });
        }
        tracing::info!(
            path = %path.display(),
            movies = dataset.movies.len(),
            people = dataset.people.len(),
            relationships = dataset.relationships.len(),
            "dataset loaded"
        );
        Ok(Self::new(dataset))
    }

    #[must_use]
    pub fn with_movie(mut self, title: &str, released: Option<i64>, tagline: Option<&str>) -> Self {
        self.dataset.movies.push(MovieProps {
            title: title.to_string(),
            released,
            tagline: tagline.map(str::to_string),
        });
        self
    }

    /// Add a relationship, creating the person on first mention.
    #[must_use]
    pub fn with_relation(mut self, person: &str, kind: RelationKind, movie: &str) -> Self {
        if !self.dataset.people.iter().any(|p| p.name == person) {
            self.dataset.people.push(PersonProps { name: person.to_string(), born: None });
        }
        self.dataset.relationships.push(DatasetRelationship {
            person: person.to_string(),
            movie: movie.to_string(),
            kind,
        });
        self
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// `(opened, closed)` session counts since construction.
    #[must_use]
    pub fn session_counts(&self) -> (usize, usize) {
        (self.opened.get(), self.closed.get())
    }

    fn movie(&self, title: &str) -> Option<&MovieProps> {
        self.dataset.movies.iter().find(|m| m.title == title)
    }

    fn person(&self, name: &str) -> Option<&PersonProps> {
        self.dataset.people.iter().find(|p| p.name == name)
    }

    /// Distinct people related to `title` by `kind`, in relationship order.
    fn related(&self, title: &str, kind: RelationKind) -> Vec<&PersonProps> {
        let mut seen = HashSet::new();
        self.dataset
            .relationships
            .iter()
            .filter(|r| r.movie == title && r.kind == kind)
            .filter_map(|r| self.person(&r.person))
            .filter(|p| seen.insert(p.name.clone()))
            .collect()
    }

    fn search(&self, term: &str) -> Vec<Record> {
        let mut hits: Vec<&MovieProps> =
            self.dataset.movies.iter().filter(|m| m.title.contains(term)).collect();
        hits.sort_by(|a, b| compare_release_desc(a.released, b.released));
        hits.into_iter()
            .map(|m| {
                to_record(json!({
                    "title": m.title,
                    "released": m.released,
                    "tagline": m.tagline,
                }))
            })
            .collect()
    }

    fn detail(&self, title: &str) -> Vec<Record> {
        let Some(movie) = self.movie(title) else {
            return Vec::new();
        };
        let names = |kind: RelationKind| {
            self.related(title, kind).into_iter().map(|p| p.name.as_str()).collect::<Vec<_>>()
        };
        vec![to_record(json!({
            "title": movie.title,
            "released": movie.released,
            "tagline": movie.tagline,
            "directors": names(RelationKind::Directed),
            "actors": names(RelationKind::ActedIn),
        }))]
    }

    fn export_source(&self, title: &str) -> Vec<Record> {
        let Some(movie) = self.movie(title) else {
            return Vec::new();
        };
        let rels = |kind: RelationKind| -> Vec<Value> {
            let people = self.related(title, kind);
            if people.is_empty() {
                // collect(DISTINCT {person: properties(d), rel: ...}) over an unmatched OPTIONAL MATCH
                return vec![json!({ "person": null, "rel": kind.as_str() })];
            }
            people.into_iter().map(|p| json!({ "person": p, "rel": kind.as_str() })).collect()
        };
        vec![to_record(json!({
            "m": movie,
            "director_rels": rels(RelationKind::Directed),
            "actor_rels": rels(RelationKind::ActedIn),
        }))]
    }
}

fn to_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

fn required_param<'s>(statement: &'s Statement, key: &str) -> Result<&'s str> {
    statement.str_param(key).ok_or_else(|| ExplorerError::Query {
        code: "Memory.MissingParameter".into(),
        message: format!("expected string parameter ${key}"),
    })
}

impl GraphConnection for MemoryGraph {
    fn open_session(&self) -> Result<()> {
        self.opened.set(self.opened.get() + 1);
        Ok(())
    }

    fn run(&self, statement: &Statement) -> Result<Vec<Record>> {
        Ok(match statement.kind {
            StatementKind::Ping => vec![to_record(json!({ "1": 1 }))],
            StatementKind::SearchMovies => self.search(required_param(statement, "search_term")?),
            StatementKind::MovieDetail => self.detail(required_param(statement, "title")?),
            StatementKind::ExportSource => self.export_source(required_param(statement, "title")?),
        })
    }

    fn close_session(&self) {
        self.closed.set(self.closed.get() + 1);
    }

    fn describe(&self) -> String {
        format!("memory ({} movies)", self.dataset.movies.len())
    }
}
