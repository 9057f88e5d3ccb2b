use anyhow::{Context, Result, anyhow};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::translation::StringCatalog;

// @module: File and directory utilities

/// Extension of Xcode string catalogs
pub const CATALOG_EXTENSION: &str = "xcstrings";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let extension = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            let matches = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
            if path.is_file() && matches {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Find every string catalog below `dir`
    pub fn find_catalogs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        Self::find_files(dir, CATALOG_EXTENSION)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file atomically
    ///
    /// The content goes to a temporary file in the target directory which is
    /// then renamed over the destination, so readers never see a partial file.
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&parent)?;

        let mut temp = NamedTempFile::new_in(&parent)
            .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
        temp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to file: {:?}", path))?;
        temp.persist(path)
            .map_err(|e| anyhow!("Failed to replace {:?}: {}", path, e.error))?;

        Ok(())
    }

    /// Read and parse a string catalog
    pub fn read_catalog<P: AsRef<Path>>(path: P) -> Result<StringCatalog> {
        let path = path.as_ref();
        let content = Self::read_to_string(path)?;
        StringCatalog::from_json(&content)
            .with_context(|| format!("Invalid string catalog: {:?}", path))
    }

    /// Serialize and atomically write a string catalog
    pub fn write_catalog<P: AsRef<Path>>(path: P, catalog: &StringCatalog) -> Result<()> {
        let mut content = catalog.to_json_pretty()?;
        content.push('\n');
        Self::write_to_file(path, &content)
    }

    // @generates: Output path for a translated catalog
    // @params: input_file, output_dir (None = in place)
    pub fn output_path<P: AsRef<Path>>(input_file: P, output_dir: Option<&Path>) -> PathBuf {
        let input_file = input_file.as_ref();
        match (output_dir, input_file.file_name()) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => input_file.to_path_buf(),
        }
    }
}
