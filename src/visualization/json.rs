use std::fs;
use std::path::Path;

use super::ExportGraph;
use crate::errors::Result;

/// Where exports land unless the caller picks another path.
pub const DEFAULT_EXPORT_PATH: &str = "exports/graph.json";

impl ExportGraph {
    /// `{"nodes": [...], "links": [...]}` with 2-space indentation. Non-ASCII text is
    /// written as UTF-8, not escaped.
    ///
    /// # Errors
    /// `ExplorerError::Serialization` if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// # Errors
    /// `ExplorerError::Serialization` if `data` is not an export document.
    pub fn from_json_str(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Write the document to `path`, creating missing parent directories and
    /// replacing any previous file.
    ///
    /// # Errors
    /// `ExplorerError::Io` if the directory or file cannot be written.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let data = self.to_json_pretty()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }

    /// # Errors
    /// `ExplorerError::Io` or `ExplorerError::Serialization`.
    pub fn load_json(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }
}
