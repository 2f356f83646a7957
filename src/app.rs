use crate::cli::{Cli, Commands, ConnectionArgs, OutputFormat};
use crate::db::{self, ConnectionSettings, GraphConnection, MemoryGraph};
use crate::errors::Result;
use crate::explorer::{ExportOutcome, ExportTargets, Explorer};
use crate::menu::{self, EditorPrompt, ExplorerState};
use crate::utils::config::{self, Config};
use crate::visualization::{DotOptions, DotTheme, RankDir, DEFAULT_EXPORT_PATH};
use clap::CommandFactory;
use clap_complete::generate;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub const EXIT_OK: i32 = 0;
/// The store or the file system failed mid-operation.
pub const EXIT_FAILURE: i32 = 1;
/// Bad configuration, or the startup probe did not get an answer.
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_NOT_FOUND: i32 = 3;

/// Install the stderr log subscriber. `RUST_LOG` wins over the flags.
pub fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A second call (tests running several CLIs in one process) keeps the first subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

/// `--config` if given, otherwise `movie-graph-explorer.toml` in the working directory.
///
/// # Errors
/// The explicit file is missing or invalid, or the implicit one is invalid.
pub fn load_config(explicit: Option<&str>) -> Result<Config> {
    if let Some(path) = explicit {
        return config::load_config_at(Path::new(path));
    }
    let cwd = std::env::current_dir()?;
    Ok(config::load_config_near(&cwd)?.unwrap_or_default())
}

/// Flag or environment first, then the config file, then built-in defaults.
#[must_use]
pub fn resolve_settings(args: &ConnectionArgs, cfg: &Config) -> ConnectionSettings {
    let file = cfg.connection.clone().unwrap_or_default();
    let defaults = ConnectionSettings::default();
    ConnectionSettings {
        uri: args.uri.clone().or(file.uri).unwrap_or(defaults.uri),
        user: args.user.clone().or(file.user).unwrap_or(defaults.user),
        password: args.password.clone().or(file.password).unwrap_or(defaults.password),
        database: args.database.clone().or(file.database).unwrap_or(defaults.database),
        timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
    }
}

/// Export destinations from `--output`/`--dot`, falling back to the config file.
#[must_use]
pub fn resolve_targets(output: Option<String>, dot: Option<String>, cfg: &Config) -> ExportTargets {
    let export = cfg.export.clone().unwrap_or_default();
    let json = output.or(export.output).unwrap_or_else(|| DEFAULT_EXPORT_PATH.to_string());
    let mut dot_options = DotOptions::default();
    if let Some(dot_cfg) = &cfg.dot {
        if let Some(v) = &dot_cfg.theme {
            dot_options.theme = if v == "dark" { DotTheme::Dark } else { DotTheme::Light };
        }
        if let Some(v) = &dot_cfg.rankdir {
            dot_options.rankdir = if v == "TB" { RankDir::TB } else { RankDir::LR };
        }
    }
    ExportTargets {
        json: PathBuf::from(json),
        dot: dot.or(export.dot).map(PathBuf::from),
        dot_options,
    }
}

fn open_connection(args: &ConnectionArgs, cfg: &Config) -> Result<Box<dyn GraphConnection>> {
    if let Some(dataset) = &args.dataset {
        return Ok(Box::new(MemoryGraph::from_json_file(Path::new(dataset))?));
    }
    let settings = resolve_settings(args, cfg);
    db::connect(&settings)
}

fn output_format(flag: Option<OutputFormat>, cfg: &Config) -> OutputFormat {
    flag.or_else(|| {
        cfg.query.as_ref().and_then(|q| q.default_format.as_deref()).map(|f| {
            if f == "json" {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            }
        })
    })
    .unwrap_or(OutputFormat::Text)
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{s}");
            EXIT_OK
        }
        Err(e) => {
            eprintln!("JSON encode error: {e}");
            EXIT_FAILURE
        }
    }
}

/// Run the CLI logic in-process.
///
/// Returns an exit code: 0 success, 1 infrastructure failure, 2 configuration error
/// or unreachable store, 3 movie not found.
#[must_use]
pub fn run_cli(cli: Cli) -> i32 {
    let command = cli.command.unwrap_or(Commands::Interactive);
    if let Commands::Completions { shell } = command {
        let mut cmd = Cli::command();
        let bin_name = env!("CARGO_PKG_NAME");
        let mut out = io::stdout();
        generate(shell, &mut cmd, bin_name, &mut out);
        return EXIT_OK;
    }

    let cfg = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            return EXIT_CONFIG;
        }
    };
    let conn = match open_connection(&cli.connection, &cfg) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Connection setup failed: {e}");
            return EXIT_CONFIG;
        }
    };
    let explorer = Explorer::new(&*conn);
    if !explorer.probe() {
        eprintln!(
            "Could not reach the movie graph at {}. Check the connection settings.",
            conn.describe()
        );
        return EXIT_CONFIG;
    }

    match command {
        Commands::Ping => {
            if !cli.quiet {
                println!("ok: {}", conn.describe());
            }
            EXIT_OK
        }
        Commands::Search { term, format } => match explorer.search_movies(&term) {
            Ok(movies) => match output_format(format, &cfg) {
                OutputFormat::Json => print_json(&movies),
                OutputFormat::Text => {
                    println!("{}", menu::render_movie_list(&movies));
                    EXIT_OK
                }
            },
            Err(e) => {
                eprintln!("Search failed: {e}");
                EXIT_FAILURE
            }
        },
        Commands::Details { title, format } => match explorer.movie_details(&title) {
            Ok(Some(detail)) => match output_format(format, &cfg) {
                OutputFormat::Json => print_json(&detail),
                OutputFormat::Text => {
                    println!("{}", menu::render_details(&detail));
                    EXIT_OK
                }
            },
            Ok(None) => {
                eprintln!("No movie titled '{title}'");
                EXIT_NOT_FOUND
            }
            Err(e) => {
                eprintln!("Details failed: {e}");
                EXIT_FAILURE
            }
        },
        Commands::Export { title, output, dot } => {
            let targets = resolve_targets(output, dot, &cfg);
            match explorer.export(&title, &targets) {
                Ok(ExportOutcome::Written { path, graph }) => {
                    if !cli.quiet {
                        println!(
                            "Exported {} nodes and {} links to {}",
                            graph.nodes.len(),
                            graph.links.len(),
                            path.display()
                        );
                    }
                    EXIT_OK
                }
                Ok(ExportOutcome::NotFound) => {
                    eprintln!("No movie titled '{title}'; nothing written");
                    EXIT_NOT_FOUND
                }
                Err(e) => {
                    eprintln!("Export failed: {e}");
                    EXIT_FAILURE
                }
            }
        }
        Commands::Interactive => {
            let targets = resolve_targets(None, None, &cfg);
            let mut prompt = match EditorPrompt::new() {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Terminal setup failed: {e}");
                    return EXIT_FAILURE;
                }
            };
            if !cli.quiet {
                println!("Connected to {}", conn.describe());
            }
            let mut state = ExplorerState::default();
            let mut out = io::stdout();
            match menu::run_menu(&explorer, &mut prompt, &mut out, &mut state, &targets) {
                Ok(()) => EXIT_OK,
                Err(e) => {
                    eprintln!("Output error: {e}");
                    EXIT_FAILURE
                }
            }
        }
        Commands::Completions { .. } => EXIT_OK,
    }
}
