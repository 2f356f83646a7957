//! Read queries against the movie graph.
//!
//! Each query type owns its Cypher statement and the shaping of the returned rows.
//! [`Query::run`] opens one [`Session`] per call and releases it before shaping.
use crate::db::{GraphConnection, Record, Session, Statement, StatementKind};
use crate::errors::Result;
use crate::graph::mapper;
use crate::graph::{ExportSource, MovieDetail, MovieSummary};

pub const PING_CYPHER: &str = "RETURN 1";

pub const SEARCH_CYPHER: &str = "\
MATCH (m:Movie)
WHERE m.title CONTAINS $search_term
RETURN m.title AS title, m.released AS released, m.tagline AS tagline
ORDER BY m.released IS NULL, m.released DESC";

pub const DETAIL_CYPHER: &str = "\
MATCH (m:Movie {title: $title})
OPTIONAL MATCH (d:Person)-[:DIRECTED]->(m)
OPTIONAL MATCH (a:Person)-[:ACTED_IN]->(m)
RETURN m.title AS title,
       m.released AS released,
       m.tagline AS tagline,
       collect(DISTINCT d.name) AS directors,
       collect(DISTINCT a.name) AS actors";

pub const EXPORT_CYPHER: &str = "\
MATCH (m:Movie {title: $title})
OPTIONAL MATCH (d:Person)-[:DIRECTED]->(m)
OPTIONAL MATCH (a:Person)-[:ACTED_IN]->(m)
WITH m,
     collect(DISTINCT {person: properties(d), rel: 'DIRECTED'}) AS director_rels,
     collect(DISTINCT {person: properties(a), rel: 'ACTED_IN'}) AS actor_rels
RETURN properties(m) AS m, director_rels, actor_rels";

/// A read against the graph producing `Output`.
pub trait Query {
    type Output;

    /// Statement to run, or `None` when the answer is known without asking the store.
    fn statement(&self) -> Option<Statement>;

    /// # Errors
    /// `ExplorerError::Decode` when rows do not have the expected shape.
    fn shape(&self, records: &[Record]) -> Result<Self::Output>;

    /// # Errors
    /// Infrastructure failures from the connection or malformed rows. "Not found" is
    /// never an error; see each query's `Output`.
    fn run(&self, conn: &dyn GraphConnection) -> Result<Self::Output> {
        let Some(statement) = self.statement() else {
            return self.shape(&[]);
        };
        let records = {
            let session = Session::open(conn)?;
            session.run(&statement)?
        };
        self.shape(&records)
    }
}

/// Connectivity probe: a trivial round trip.
#[derive(Debug, Default, Clone, Copy)]
pub struct PingQuery;

impl Query for PingQuery {
    type Output = ();

    fn statement(&self) -> Option<Statement> {
        Some(Statement::new(StatementKind::Ping, PING_CYPHER))
    }

    fn shape(&self, _records: &[Record]) -> Result<()> {
        Ok(())
    }
}

/// Probe the connection, logging the failure reason.
#[must_use]
pub fn probe(conn: &dyn GraphConnection) -> bool {
    match PingQuery.run(conn) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(backend = %conn.describe(), error = %e, "connectivity probe failed");
            false
        }
    }
}

/// Case-sensitive title substring search, newest first, undated last.
#[derive(Debug, Clone)]
pub struct SearchMoviesQuery {
    pub term: String,
}

impl SearchMoviesQuery {
    /// The term is trimmed; a blank term matches nothing.
    #[must_use]
    pub fn new(term: &str) -> Self {
        Self { term: term.trim().to_string() }
    }
}

impl Query for SearchMoviesQuery {
    type Output = Vec<MovieSummary>;

    fn statement(&self) -> Option<Statement> {
        if self.term.is_empty() {
            return None;
        }
        Some(
            Statement::new(StatementKind::SearchMovies, SEARCH_CYPHER)
                .param("search_term", self.term.as_str()),
        )
    }

    fn shape(&self, records: &[Record]) -> Result<Vec<MovieSummary>> {
        mapper::summaries_from_records(records)
    }
}

/// Directors and actors of one movie, by exact title. `None` if there is no such movie.
#[derive(Debug, Clone)]
pub struct MovieDetailQuery {
    pub title: String,
}

impl MovieDetailQuery {
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self { title: title.to_string() }
    }
}

impl Query for MovieDetailQuery {
    type Output = Option<MovieDetail>;

    fn statement(&self) -> Option<Statement> {
        Some(
            Statement::new(StatementKind::MovieDetail, DETAIL_CYPHER)
                .param("title", self.title.as_str()),
        )
    }

    fn shape(&self, records: &[Record]) -> Result<Option<MovieDetail>> {
        records.first().map(mapper::detail_from_record).transpose()
    }
}

/// Movie properties plus raw relationship collections for the exporter.
#[derive(Debug, Clone)]
pub struct ExportSourceQuery {
    pub title: String,
}

impl ExportSourceQuery {
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self { title: title.to_string() }
    }
}

impl Query for ExportSourceQuery {
    type Output = Option<ExportSource>;

    fn statement(&self) -> Option<Statement> {
        Some(
            Statement::new(StatementKind::ExportSource, EXPORT_CYPHER)
                .param("title", self.title.as_str()),
        )
    }

    fn shape(&self, records: &[Record]) -> Result<Option<ExportSource>> {
        records.first().map(mapper::export_source_from_record).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_has_no_statement() {
        assert!(SearchMoviesQuery::new("   \t").statement().is_none());
        assert!(SearchMoviesQuery::new("").statement().is_none());
    }

    #[test]
    fn search_term_is_trimmed_into_parameter() {
        let st = SearchMoviesQuery::new("  Matrix ").statement().unwrap();
        assert_eq!(st.kind, StatementKind::SearchMovies);
        assert_eq!(st.str_param("search_term"), Some("Matrix"));
        assert!(st.text.contains("CONTAINS $search_term"));
    }

    #[test]
    fn title_queries_pass_exact_title() {
        let st = MovieDetailQuery::new(" Heat ").statement().unwrap();
        assert_eq!(st.str_param("title"), Some(" Heat "));
        let st = ExportSourceQuery::new("Heat").statement().unwrap();
        assert_eq!(st.kind, StatementKind::ExportSource);
        assert!(st.text.contains("director_rels"));
    }

    #[test]
    fn empty_rows_mean_not_found() {
        assert_eq!(MovieDetailQuery::new("x").shape(&[]).unwrap(), None);
        assert_eq!(ExportSourceQuery::new("x").shape(&[]).unwrap(), None);
        assert!(SearchMoviesQuery::new("x").shape(&[]).unwrap().is_empty());
    }
}
