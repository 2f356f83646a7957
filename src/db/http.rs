//! Neo4j over the transactional HTTP endpoint.
//!
//! Every statement is sent as a single auto-commit transaction to
//! `POST {uri}/db/{database}/tx/commit`. Sessions are tracked locally only; a
//! statement outside an open session is refused.
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use std::cell::Cell;
use std::time::Duration;

use super::{ConnectionSettings, GraphConnection, Record, Statement};
use crate::errors::{ExplorerError, Result};

/// Example endpoint used in error messages.
pub const HTTP_URI_EXAMPLE: &str = "http://localhost:7474";

#[derive(Debug, Deserialize)]
pub(crate) struct TxResponse {
    #[serde(default)]
    results: Vec<TxResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct TxResult {
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<TxRow>,
}

#[derive(Debug, Deserialize)]
struct TxRow {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    code: String,
    message: String,
}

const UNAUTHORIZED: &str = "Neo.ClientError.Security.Unauthorized";

/// Turn a transaction response into rows keyed by column name.
pub(crate) fn decode_response(response: TxResponse, user: &str) -> Result<Vec<Record>> {
    if let Some(err) = response.errors.into_iter().next() {
        if err.code == UNAUTHORIZED {
            return Err(ExplorerError::Authentication { user: user.to_string() });
        }
        return Err(ExplorerError::Query { code: err.code, message: err.message });
    }
    let Some(result) = response.results.into_iter().next() else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(result.data.len());
    for TxRow { row } in result.data {
        if row.len() != result.columns.len() {
            return Err(ExplorerError::Decode(format!(
                "row has {} values for {} columns",
                row.len(),
                result.columns.len()
            )));
        }
        out.push(result.columns.iter().cloned().zip(row).collect::<Record>());
    }
    Ok(out)
}

pub struct HttpConnection {
    agent: ureq::Agent,
    endpoint: String,
    authorization: String,
    user: String,
    open_sessions: Cell<usize>,
}

impl HttpConnection {
    /// # Errors
    /// `ExplorerError::Config` when the URI is not an http(s) URL or the password is empty.
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        let uri = settings.uri.trim().trim_end_matches('/');
        if !(uri.starts_with("http://") || uri.starts_with("https://")) {
            return Err(ExplorerError::Config(format!(
                "'{}' is not an HTTP endpoint; use the Neo4j HTTP port, e.g. {HTTP_URI_EXAMPLE}",
                settings.uri
            )));
        }
        settings.require_password()?;
        let database = settings.database_or_default();
        let token = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", settings.user, settings.password));
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build();
        Ok(Self {
            agent,
            endpoint: format!("{uri}/db/{database}/tx/commit"),
            authorization: format!("Basic {token}"),
            user: settings.user.clone(),
            open_sessions: Cell::new(0),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sessions opened and not yet closed.
    #[must_use]
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.get()
    }
}

impl GraphConnection for HttpConnection {
    fn open_session(&self) -> Result<()> {
        self.open_sessions.set(self.open_sessions.get() + 1);
        Ok(())
    }

    fn run(&self, statement: &Statement) -> Result<Vec<Record>> {
        if self.open_sessions.get() == 0 {
            return Err(ExplorerError::Connection("statement run outside a session".into()));
        }
        let body = json!({
            "statements": [{
                "statement": statement.text,
                "parameters": statement.params,
                "resultDataContents": ["row"],
            }]
        });
        let resp = match self
            .agent
            .post(&self.endpoint)
            .set("Authorization", &self.authorization)
            .set("Accept", "application/json;charset=UTF-8")
            .send_json(body)
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(401, _)) => {
                return Err(ExplorerError::Authentication { user: self.user.clone() })
            }
            Err(ureq::Error::Status(status, resp)) => {
                return Err(ExplorerError::Query {
                    code: format!("HTTP {status}"),
                    message: resp.into_string().unwrap_or_default(),
                })
            }
            Err(ureq::Error::Transport(t)) => return Err(ExplorerError::Connection(t.to_string())),
        };
        let parsed: TxResponse = resp
            .into_json()
            .map_err(|e| ExplorerError::Decode(format!("invalid transaction response: {e}")))?;
        decode_response(parsed, &self.user)
    }

    fn close_session(&self) {
        self.open_sessions.set(self.open_sessions.get().saturating_sub(1));
    }

    fn describe(&self) -> String {
        format!("neo4j-http {}", self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StatementKind;
    use crate::explorer::Explorer;

    fn parse(v: Value) -> TxResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn rows_are_keyed_by_column() {
        let resp = parse(json!({
            "results": [{
                "columns": ["title", "released", "tagline"],
                "data": [
                    { "row": ["The Matrix Reloaded", 2003, null], "meta": [null, null, null] },
                    { "row": ["The Matrix", 1999, "Welcome to the Real World"] }
                ]
            }],
            "errors": []
        }));
        let rows = decode_response(resp, "neo4j").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["title"], "The Matrix Reloaded");
        assert!(rows[0]["tagline"].is_null());
        assert_eq!(rows[1]["released"], 1999);
    }

    #[test]
    fn unauthorized_maps_to_authentication_error() {
        let resp = parse(json!({
            "results": [],
            "errors": [{ "code": UNAUTHORIZED, "message": "bad credentials" }]
        }));
        assert!(matches!(
            decode_response(resp, "neo4j"),
            Err(ExplorerError::Authentication { user }) if user == "neo4j"
        ));
    }

    #[test]
    fn cypher_errors_are_query_errors() {
        let resp = parse(json!({
            "errors": [{ "code": "Neo.ClientError.Statement.SyntaxError", "message": "oops" }]
        }));
        match decode_response(resp, "neo4j") {
            Err(ExplorerError::Query { code, message }) => {
                assert_eq!(code, "Neo.ClientError.Statement.SyntaxError");
                assert_eq!(message, "oops");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn no_result_block_means_no_rows() {
        let rows = decode_response(parse(json!({ "results": [], "errors": [] })), "u").unwrap();
        assert!(rows.is_empty());
    }

    fn settings(uri: &str) -> ConnectionSettings {
        ConnectionSettings {
            uri: uri.into(),
            password: "secret".into(),
            timeout_secs: 2,
            ..Default::default()
        }
    }

    #[test]
    fn settings_validation() {
        let mut s = settings(HTTP_URI_EXAMPLE);
        let conn = HttpConnection::new(&s).unwrap();
        assert_eq!(conn.endpoint(), "http://localhost:7474/db/neo4j/tx/commit");

        s.uri = "bolt://localhost:7687".into();
        assert!(matches!(HttpConnection::new(&s), Err(ExplorerError::Config(_))));

        s.uri = HTTP_URI_EXAMPLE.into();
        s.password.clear();
        assert!(matches!(HttpConnection::new(&s), Err(ExplorerError::Config(_))));
    }

    #[test]
    fn statements_need_an_open_session() {
        let conn = HttpConnection::new(&settings("http://127.0.0.1:1")).unwrap();
        let st = Statement::new(StatementKind::Ping, "RETURN 1");
        assert!(matches!(conn.run(&st), Err(ExplorerError::Connection(_))));
        conn.open_session().unwrap();
        assert_eq!(conn.open_sessions(), 1);
        conn.close_session();
        assert_eq!(conn.open_sessions(), 0);
    }

    #[test]
    fn closed_port_is_a_connection_error() {
        let conn = HttpConnection::new(&settings("http://127.0.0.1:1")).unwrap();
        let explorer = Explorer::new(&conn);
        assert!(!explorer.probe());
        assert!(matches!(explorer.search_movies("Matrix"), Err(ExplorerError::Connection(_))));
        assert!(matches!(explorer.movie_details("The Matrix"), Err(ExplorerError::Connection(_))));
        assert_eq!(conn.open_sessions(), 0);
    }
}
