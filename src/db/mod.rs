//! Connection collaborator.
//!
//! A [`GraphConnection`] runs parameterized Cypher statements and hands back rows
//! as JSON maps. Connections are owned by the caller; the query layer only borrows
//! them and wraps every statement in a [`Session`], which is released on every exit
//! path when it goes out of scope.
use serde_json::{Map, Value};

pub mod bolt;
pub mod http;
pub mod memory;

pub use bolt::BoltConnection;
pub use http::HttpConnection;
pub use memory::MemoryGraph;

use crate::errors::{ExplorerError, Result};

pub const DEFAULT_URI: &str = "bolt://localhost:7687";
pub const DEFAULT_USER: &str = "neo4j";
pub const DEFAULT_DATABASE: &str = "neo4j";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Endpoint and credentials, supplied once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub timeout_secs: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            user: DEFAULT_USER.to_string(),
            password: String::new(),
            database: DEFAULT_DATABASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ConnectionSettings {
    /// Database name, falling back to the default when blank.
    #[must_use]
    pub fn database_or_default(&self) -> &str {
        match self.database.trim() {
            "" => DEFAULT_DATABASE,
            db => db,
        }
    }

    /// # Errors
    /// `ExplorerError::Config` when the password is empty.
    pub fn require_password(&self) -> Result<()> {
        if self.password.is_empty() {
            return Err(ExplorerError::Config("password must not be empty".into()));
        }
        Ok(())
    }
}

/// Wire protocol selected by the URI scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// `bolt://`, `neo4j://` and their `+s` / `+ssc` variants.
    Bolt,
    /// `http://` and `https://`, the transactional HTTP endpoint.
    Http,
}

impl Transport {
    /// # Errors
    /// `ExplorerError::Config` for any other scheme.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let scheme = uri.trim().split("://").next().unwrap_or_default().to_ascii_lowercase();
        match scheme.as_str() {
            "bolt" | "bolt+s" | "bolt+ssc" | "neo4j" | "neo4j+s" | "neo4j+ssc" => Ok(Transport::Bolt),
            "http" | "https" => Ok(Transport::Http),
            _ => Err(ExplorerError::Config(format!(
                "unsupported URI '{uri}'; expected bolt://, neo4j:// or http(s)://"
            ))),
        }
    }
}

/// Open the backend matching the URI scheme. No network traffic happens here.
///
/// # Errors
/// `ExplorerError::Config` for an unsupported scheme or an empty password.
pub fn connect(settings: &ConnectionSettings) -> Result<Box<dyn GraphConnection>> {
    Ok(match Transport::from_uri(&settings.uri)? {
        Transport::Bolt => Box::new(BoltConnection::new(settings)?),
        Transport::Http => Box::new(HttpConnection::new(settings)?),
    })
}

/// One result row, keyed by the `RETURN` aliases.
pub type Record = Map<String, Value>;

/// Which read the statement performs. Backends that do not speak Cypher dispatch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Ping,
    SearchMovies,
    MovieDetail,
    ExportSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub text: &'static str,
    pub params: Map<String, Value>,
}

impl Statement {
    #[must_use]
    pub fn new(kind: StatementKind, text: &'static str) -> Self {
        Self { kind, text, params: Map::new() }
    }

    #[must_use]
    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// String parameter, if present.
    #[must_use]
    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

/// Backend able to run read-only statements.
///
/// `open_session` and `close_session` are always called in pairs through
/// [`Session`]; `run` is only called between them.
pub trait GraphConnection {
    /// # Errors
    /// Fails when the backend cannot hand out a session.
    fn open_session(&self) -> Result<()>;

    /// # Errors
    /// Connectivity, authentication and statement failures. An empty result is `Ok(vec![])`.
    fn run(&self, statement: &Statement) -> Result<Vec<Record>>;

    fn close_session(&self);

    /// Short human readable description used in logs.
    fn describe(&self) -> String;
}

/// Scoped session: opened by [`Session::open`], closed on drop.
pub struct Session<'c> {
    conn: &'c dyn GraphConnection,
}

impl<'c> Session<'c> {
    /// # Errors
    /// Propagates the backend's `open_session` failure; nothing is left open in that case.
    pub fn open(conn: &'c dyn GraphConnection) -> Result<Self> {
        conn.open_session()?;
        tracing::debug!(backend = %conn.describe(), "session opened");
        Ok(Self { conn })
    }

    /// # Errors
    /// Whatever the backend reports for this statement.
    pub fn run(&self, statement: &Statement) -> Result<Vec<Record>> {
        tracing::debug!(kind = ?statement.kind, params = ?statement.params, "running statement");
        let rows = self.conn.run(statement)?;
        tracing::debug!(kind = ?statement.kind, rows = rows.len(), "statement finished");
        Ok(rows)
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.conn.close_session();
        tracing::debug!(backend = %self.conn.describe(), "session closed");
    }
}
