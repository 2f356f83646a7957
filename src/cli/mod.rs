use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "movie-graph-explorer",
    version,
    about = "Explore a Neo4j movie graph",
    long_about = "Search movies by title, show directors and actors, and export a movie's neighborhood as node/link JSON. Connects to Neo4j over Bolt (bolt://, neo4j://) or its HTTP endpoint (http://, https://), or works offline from a JSON dataset with --dataset. Without a subcommand an interactive menu starts."
)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    /// Path to a TOML configuration file (default: ./movie-graph-explorer.toml if present)
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Suppress informational output
    #[arg(short, long, global = true, default_value_t = false)]
    pub quiet: bool,
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// Neo4j URI; the scheme picks Bolt or HTTP [default: bolt://localhost:7687]
    #[arg(long, global = true, env = "NEO4J_URI")]
    pub uri: Option<String>,
    /// Neo4j user name
    #[arg(long, global = true, env = "NEO4J_USER")]
    pub user: Option<String>,
    /// Neo4j password
    #[arg(long, global = true, env = "NEO4J_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Neo4j database name
    #[arg(long, global = true, env = "NEO4J_DATABASE")]
    pub database: Option<String>,
    /// Serve queries from a JSON dataset instead of a Neo4j server
    #[arg(long, global = true, value_name = "FILE")]
    pub dataset: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Numbered menu: search, details, export, exit (the default)
    Interactive,
    /// Search movies whose title contains TERM (case-sensitive)
    Search {
        /// Title substring
        term: String,
        /// Output format: text or json
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Show directors and actors of the movie with exactly this TITLE
    Details {
        /// Exact movie title
        title: String,
        /// Output format: text or json
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Export the movie's neighborhood as node/link JSON
    Export {
        /// Exact movie title
        title: String,
        /// Output JSON path (default: exports/graph.json)
        #[arg(long)]
        output: Option<String>,
        /// Also write a Graphviz DOT rendering to this path
        #[arg(long)]
        dot: Option<String>,
    },
    /// Check that the store answers a trivial query
    Ping,
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
