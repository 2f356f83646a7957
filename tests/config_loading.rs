use movie_graph_explorer::errors::ExplorerError;
use movie_graph_explorer::utils::config::{self};
use std::fs;
use std::path::Path;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    fs::write(path, content).unwrap();
}

#[test]
fn parses_full_config_file() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg_path = tmp.path().join("movie-graph-explorer.toml");
    let data = r#"
[connection]
uri = "https://neo4j.example.com:7473"
user = "reader"
password = "s3cret"
database = "movies"
timeout_secs = 10

[export]
output = "out/graph.json"
dot = "out/graph.dot"

[dot]
theme = "dark"
rankdir = "TB"

[query]
default_format = "json"
"#;
    write(&cfg_path, data);

    let cfg = config::load_config_at(&cfg_path).expect("config parsed");
    let conn = cfg.connection.as_ref().expect("connection section");
    assert_eq!(conn.uri.as_deref(), Some("https://neo4j.example.com:7473"));
    assert_eq!(conn.user.as_deref(), Some("reader"));
    assert_eq!(conn.password.as_deref(), Some("s3cret"));
    assert_eq!(conn.database.as_deref(), Some("movies"));
    assert_eq!(conn.timeout_secs, Some(10));
    assert_eq!(cfg.export.as_ref().and_then(|e| e.output.as_deref()), Some("out/graph.json"));
    assert_eq!(cfg.export.as_ref().and_then(|e| e.dot.as_deref()), Some("out/graph.dot"));
    assert_eq!(cfg.dot.as_ref().and_then(|d| d.theme.as_deref()), Some("dark"));
    assert_eq!(cfg.dot.as_ref().and_then(|d| d.rankdir.as_deref()), Some("TB"));
    assert_eq!(
        cfg.query.as_ref().and_then(|q| q.default_format.as_deref()),
        Some("json")
    );
}

#[test]
fn missing_sections_are_none() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg_path = tmp.path().join("partial.toml");
    write(&cfg_path, "[export]\noutput = 'graph.json'\n");

    let cfg = config::load_config_at(&cfg_path).expect("config parsed");
    assert!(cfg.connection.is_none());
    assert!(cfg.dot.is_none());
    assert_eq!(cfg.export.and_then(|e| e.dot), None);
}

#[test]
fn load_config_near_looks_for_default_name() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(config::load_config_near(tmp.path()).unwrap().is_none());

    let default_path = tmp.path().join("movie-graph-explorer.toml");
    write(&default_path, "[query]\ndefault_format = 'text'\n");

    let cfg = config::load_config_near(tmp.path()).unwrap().expect("found default config");
    assert_eq!(cfg.query.and_then(|q| q.default_format), Some("text".to_string()));
}

#[test]
fn invalid_toml_is_a_config_error() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg_path = tmp.path().join("bad.toml");
    write(&cfg_path, "[connection]\ntimeout_secs = \"soon\"\n");
    assert!(matches!(config::load_config_at(&cfg_path), Err(ExplorerError::Config(_))));
    assert!(matches!(
        config::load_config_at(&tmp.path().join("absent.toml")),
        Err(ExplorerError::Io(_))
    ));
}
