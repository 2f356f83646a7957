//! The three operations offered to drivers: search, details, export.
//!
//! `Explorer` only borrows the connection and keeps no state between calls; the
//! interactive driver owns whatever it needs to remember (see `menu::ExplorerState`).
use std::path::{Path, PathBuf};

use crate::db::GraphConnection;
use crate::errors::Result;
use crate::graph::{MovieDetail, MovieSummary};
use crate::query::{self, ExportSourceQuery, MovieDetailQuery, Query, SearchMoviesQuery};
use crate::visualization::{DotGenerator, DotOptions, ExportGraph, GraphExporter, DEFAULT_EXPORT_PATH};

/// Result of an export request that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { path: PathBuf, graph: ExportGraph },
    /// No movie with that title; nothing was written.
    NotFound,
}

impl ExportOutcome {
    #[must_use]
    pub fn is_written(&self) -> bool {
        matches!(self, ExportOutcome::Written { .. })
    }
}

/// Where an export is written.
#[derive(Debug, Clone)]
pub struct ExportTargets {
    pub json: PathBuf,
    /// Optional Graphviz rendering of the same graph.
    pub dot: Option<PathBuf>,
    pub dot_options: DotOptions,
}

impl Default for ExportTargets {
    fn default() -> Self {
        Self { json: PathBuf::from(DEFAULT_EXPORT_PATH), dot: None, dot_options: DotOptions::default() }
    }
}

pub struct Explorer<'c> {
    conn: &'c dyn GraphConnection,
}

impl<'c> Explorer<'c> {
    #[must_use]
    pub fn new(conn: &'c dyn GraphConnection) -> Self {
        Self { conn }
    }

    /// Round trip to the store; `false` means the session should not start.
    #[must_use]
    pub fn probe(&self) -> bool {
        query::probe(self.conn)
    }

    /// # Errors
    /// Infrastructure failures only. A blank term or no match is `Ok(vec![])`.
    pub fn search_movies(&self, term: &str) -> Result<Vec<MovieSummary>> {
        SearchMoviesQuery::new(term).run(self.conn)
    }

    /// # Errors
    /// Infrastructure failures only. An unknown title is `Ok(None)`.
    pub fn movie_details(&self, title: &str) -> Result<Option<MovieDetail>> {
        MovieDetailQuery::new(title).run(self.conn)
    }

    /// Build the node/link graph for `title` without writing it.
    ///
    /// # Errors
    /// Infrastructure failures only. An unknown title is `Ok(None)`.
    pub fn export_graph(&self, title: &str) -> Result<Option<ExportGraph>> {
        let source = ExportSourceQuery::new(title).run(self.conn)?;
        Ok(source.map(|s| GraphExporter::new().build(&s)))
    }

    /// Build the graph for `title` and write it to `path`. Nothing is created or
    /// overwritten when the title is unknown.
    ///
    /// # Errors
    /// Store failures, and file system or serialization failures while writing.
    pub fn export_graph_to(&self, title: &str, path: &Path) -> Result<ExportOutcome> {
        let Some(graph) = self.export_graph(title)? else {
            tracing::info!(title, "export skipped, movie not found");
            return Ok(ExportOutcome::NotFound);
        };
        Self::write_json(title, graph, path)
    }

    /// Export to every target in `targets`. The DOT file is written first, so a
    /// failed DOT write leaves any previous JSON export untouched.
    ///
    /// # Errors
    /// As [`Explorer::export_graph_to`], plus failures writing the DOT file.
    pub fn export(&self, title: &str, targets: &ExportTargets) -> Result<ExportOutcome> {
        let Some(dot_path) = &targets.dot else {
            return self.export_graph_to(title, &targets.json);
        };
        let Some(graph) = self.export_graph(title)? else {
            tracing::info!(title, "export skipped, movie not found");
            return Ok(ExportOutcome::NotFound);
        };
        let dot = DotGenerator::new().generate_dot_with_options(&graph, targets.dot_options);
        if let Some(parent) = dot_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dot_path, dot)?;
        tracing::info!(path = %dot_path.display(), "dot rendering written");
        Self::write_json(title, graph, &targets.json)
    }

    fn write_json(title: &str, graph: ExportGraph, path: &Path) -> Result<ExportOutcome> {
        graph.save_json(path)?;
        tracing::info!(
            title,
            path = %path.display(),
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            "graph exported"
        );
        Ok(ExportOutcome::Written { path: path.to_path_buf(), graph })
    }
}
