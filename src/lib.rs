//! movie-graph-explorer: explore a Neo4j movie graph
//!
//! Search movies by title substring, aggregate a movie's directors and actors, and
//! export its neighborhood as a node/link JSON document for force-directed viewers.
//!
//! # Features
//! - Neo4j over Bolt or the HTTP transactional endpoint, or an in-memory JSON dataset
//!   for offline use
//! - Search ordered by release year (newest first, undated last)
//! - Node/link export with stable `movie_*` / `person_*` ids, plus optional DOT rendering
//! - Numbered interactive menu and scriptable subcommands
//!
//! # Quickstart (Library)
//! ```no_run
//! use movie_graph_explorer::db::MemoryGraph;
//! use movie_graph_explorer::explorer::Explorer;
//!
//! let conn = MemoryGraph::from_json_file(std::path::Path::new("movies.json"))
//!     .expect("load dataset");
//! let explorer = Explorer::new(&conn);
//! for movie in explorer.search_movies("Matrix").expect("search") {
//!     println!("{} {:?}", movie.title, movie.released_year);
//! }
//! ```
//!
//! # Quickstart (CLI)
//! ```text
//! movie-graph-explorer --password secret search Matrix
//! movie-graph-explorer --dataset movies.json export "The Matrix" --output exports/graph.json
//! ```
pub mod app;
pub mod cli;
pub mod db;
pub mod errors;
pub mod explorer;
pub mod graph;
pub mod menu;
pub mod query;
pub mod utils;
pub mod visualization;
