pub mod table {
    fn width(s: &str) -> usize {
        s.chars().count()
    }

    // Helper to render a separator line
    fn sep(widths: &[usize]) -> String {
        let mut s = String::from("+");
        for w in widths {
            s.push_str(&"-".repeat(w + 2));
            s.push('+');
        }
        s
    }

    // Helper to render a row line
    fn line(cells: &[String], widths: &[usize]) -> String {
        let mut s = String::from("|");
        for (i, cell) in cells.iter().enumerate() {
            let w = widths[i];
            s.push(' ');
            s.push_str(cell);
            let len = width(cell);
            if len < w {
                s.push_str(&" ".repeat(w - len));
            }
            s.push(' ');
            s.push('|');
        }
        s
    }

    /// Render a simple ASCII table. Column widths count characters, so accented
    /// titles stay aligned.
    #[must_use]
    pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
        let cols = headers.len();
        let mut widths: Vec<usize> = headers.iter().map(|h| width(h)).collect();
        for row in rows {
            for (c, w) in widths.iter_mut().enumerate().take(cols) {
                *w = (*w).max(row.get(c).map_or(0, |cell| width(cell)));
            }
        }

        let mut out = String::new();
        out.push_str(&sep(&widths));
        out.push('\n');
        let header_cells: Vec<String> = headers.iter().map(|s| (*s).to_string()).collect();
        out.push_str(&line(&header_cells, &widths));
        out.push('\n');
        out.push_str(&sep(&widths));
        out.push('\n');
        for row in rows {
            let mut cells = Vec::with_capacity(cols);
            for i in 0..cols {
                cells.push(row.get(i).cloned().unwrap_or_default());
            }
            out.push_str(&line(&cells, &widths));
            out.push('\n');
        }
        out.push_str(&sep(&widths));
        out
    }
}

pub mod config {
    use serde::Deserialize;
    use std::fs;
    use std::path::{Path, PathBuf};

    use crate::errors::{ExplorerError, Result};

    pub const CONFIG_FILE_NAME: &str = "movie-graph-explorer.toml";

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct ConnectionConfig {
        pub uri: Option<String>,
        pub user: Option<String>,
        pub password: Option<String>,
        pub database: Option<String>,
        pub timeout_secs: Option<u64>,
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct ExportConfig {
        pub output: Option<String>,
        pub dot: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct DotConfig {
        pub theme: Option<String>,   // "light" | "dark"
        pub rankdir: Option<String>, // "LR" | "TB"
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct QueryConfig {
        pub default_format: Option<String>, // "text" | "json"
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct Config {
        pub connection: Option<ConnectionConfig>,
        pub export: Option<ExportConfig>,
        pub dot: Option<DotConfig>,
        pub query: Option<QueryConfig>,
    }

    fn default_config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE_NAME)
    }

    /// Parse the TOML file at `path`.
    ///
    /// # Errors
    /// `ExplorerError::Io` if it cannot be read, `ExplorerError::Config` if it is not valid TOML
    /// for this layout.
    pub fn load_config_at(path: &Path) -> Result<Config> {
        let data = fs::read_to_string(path)?;
        toml::from_str::<Config>(&data)
            .map_err(|e| ExplorerError::Config(format!("{}: {e}", path.display())))
    }

    /// Look for `movie-graph-explorer.toml` in `root`.
    ///
    /// # Errors
    /// Same as [`load_config_at`] when the file exists but is unreadable or invalid.
    pub fn load_config_near(root: &Path) -> Result<Option<Config>> {
        let p = default_config_path(root);
        if p.exists() {
            load_config_at(&p).map(Some)
        } else {
            Ok(None)
        }
    }
}
