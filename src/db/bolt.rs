//! Neo4j over Bolt, through `neo4rs`.
//!
//! `neo4rs` is async; the connection owns a current-thread tokio runtime and blocks
//! on it, so callers keep the synchronous [`GraphConnection`] contract. The driver
//! is created on the first session. Each session is one explicit read transaction,
//! started in `open_session` and rolled back in `close_session`.
use neo4rs::{ConfigBuilder, Graph, Query as BoltQuery, Row, Txn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;

use super::{ConnectionSettings, GraphConnection, Record, Statement, StatementKind};
use crate::errors::{ExplorerError, Result};
use crate::graph::{MovieProps, PersonProps};

const UNAUTHORIZED: &str = "Neo.ClientError.Security.Unauthorized";

#[derive(Debug, Deserialize, Serialize)]
struct SearchRow {
    title: String,
    released: Option<i64>,
    tagline: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct DetailRow {
    title: String,
    released: Option<i64>,
    tagline: Option<String>,
    directors: Vec<Option<String>>,
    actors: Vec<Option<String>>,
}

#[derive(Debug, Deserialize, Serialize)]
struct RelRow {
    person: Option<PersonProps>,
    rel: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct ExportRow {
    m: MovieProps,
    director_rels: Vec<RelRow>,
    actor_rels: Vec<RelRow>,
}

fn to_record<T: Serialize>(row: &T) -> Result<Record> {
    match serde_json::to_value(row)? {
        Value::Object(map) => Ok(map),
        other => Err(ExplorerError::Decode(format!("row is not a map: {other}"))),
    }
}

/// Typed decode per statement, re-encoded as the JSON row shape the mapper reads.
fn decode_row(kind: StatementKind, row: &Row) -> Result<Record> {
    let decode_err = |e: neo4rs::DeError| ExplorerError::Decode(format!("{kind:?} row: {e}"));
    match kind {
        StatementKind::Ping => Ok(Record::new()),
        StatementKind::SearchMovies => to_record(&row.to::<SearchRow>().map_err(decode_err)?),
        StatementKind::MovieDetail => to_record(&row.to::<DetailRow>().map_err(decode_err)?),
        StatementKind::ExportSource => to_record(&row.to::<ExportRow>().map_err(decode_err)?),
    }
}

fn bolt_query(statement: &Statement) -> Result<BoltQuery> {
    let mut q = neo4rs::query(statement.text);
    for (key, value) in &statement.params {
        q = match value {
            Value::String(s) => q.param(key, s.clone()),
            Value::Number(n) if n.is_i64() => q.param(key, n.as_i64().unwrap_or_default()),
            Value::Bool(b) => q.param(key, *b),
            other => {
                return Err(ExplorerError::Query {
                    code: "Client.UnsupportedParameter".into(),
                    message: format!("parameter ${key} has unsupported value {other}"),
                })
            }
        };
    }
    Ok(q)
}

fn map_error(err: neo4rs::Error, user: &str) -> ExplorerError {
    match err {
        neo4rs::Error::AuthenticationError(_) => ExplorerError::Authentication { user: user.to_string() },
        neo4rs::Error::Neo4j(e) if e.code() == UNAUTHORIZED => {
            ExplorerError::Authentication { user: user.to_string() }
        }
        neo4rs::Error::Neo4j(e) => {
            ExplorerError::Query { code: e.code().to_string(), message: e.message().to_string() }
        }
        other => ExplorerError::Connection(other.to_string()),
    }
}

// Fields drop in order: the transaction and driver go before the runtime.
pub struct BoltConnection {
    txn: RefCell<Option<Txn>>,
    graph: RefCell<Option<Graph>>,
    uri: String,
    user: String,
    password: String,
    database: String,
    runtime: tokio::runtime::Runtime,
}

impl BoltConnection {
    /// Validate the settings and prepare the runtime. The server is not contacted yet.
    ///
    /// # Errors
    /// `ExplorerError::Config` for a non-Bolt URI or an empty password,
    /// `ExplorerError::Io` if the runtime cannot start.
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        if super::Transport::from_uri(&settings.uri)? != super::Transport::Bolt {
            return Err(ExplorerError::Config(format!(
                "'{}' is not a Bolt URI, e.g. {}",
                settings.uri,
                super::DEFAULT_URI
            )));
        }
        settings.require_password()?;
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            txn: RefCell::new(None),
            graph: RefCell::new(None),
            uri: settings.uri.trim().to_string(),
            user: settings.user.clone(),
            password: settings.password.clone(),
            database: settings.database_or_default().to_string(),
            runtime,
        })
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Whether a transaction is currently open.
    #[must_use]
    pub fn in_session(&self) -> bool {
        self.txn.borrow().is_some()
    }

    fn driver(&self) -> Result<Graph> {
        if let Some(graph) = self.graph.borrow().as_ref() {
            return Ok(graph.clone());
        }
        let config = ConfigBuilder::default()
            .uri(self.uri.as_str())
            .user(self.user.as_str())
            .password(self.password.as_str())
            .db(self.database.as_str())
            .build()
            .map_err(|e| ExplorerError::Config(e.to_string()))?;
        let graph = self
            .runtime
            .block_on(Graph::connect(config))
            .map_err(|e| map_error(e, &self.user))?;
        tracing::debug!(uri = %self.uri, db = %self.database, "bolt driver created");
        *self.graph.borrow_mut() = Some(graph.clone());
        Ok(graph)
    }
}

impl GraphConnection for BoltConnection {
    fn open_session(&self) -> Result<()> {
        let graph = self.driver()?;
        let txn = self.runtime.block_on(graph.start_txn()).map_err(|e| map_error(e, &self.user))?;
        *self.txn.borrow_mut() = Some(txn);
        Ok(())
    }

    fn run(&self, statement: &Statement) -> Result<Vec<Record>> {
        let query = bolt_query(statement)?;
        let mut slot = self.txn.borrow_mut();
        let txn = slot
            .as_mut()
            .ok_or_else(|| ExplorerError::Connection("statement run outside a session".into()))?;
        let rows = self
            .runtime
            .block_on(async {
                let mut stream = txn.execute(query).await?;
                let mut rows = Vec::new();
                while let Some(row) = stream.next(txn.handle()).await? {
                    rows.push(row);
                }
                Ok::<_, neo4rs::Error>(rows)
            })
            .map_err(|e| map_error(e, &self.user))?;
        rows.iter().map(|row| decode_row(statement.kind, row)).collect()
    }

    fn close_session(&self) {
        let Some(txn) = self.txn.borrow_mut().take() else {
            return;
        };
        // Read-only work; nothing to commit.
        if let Err(e) = self.runtime.block_on(txn.rollback()) {
            tracing::warn!(error = %e, "closing bolt transaction failed");
        }
    }

    fn describe(&self) -> String {
        format!("neo4j-bolt {} (db {})", self.uri, self.database)
    }
}
