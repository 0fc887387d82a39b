//! Module Loading
//!
//! Reads content modules from a filesystem directory or from the bundled
//! corpus compiled into the binary. Every `*.json` file is one module, named
//! by its relative path without the extension (`anatomy/airway`).

use include_dir::{include_dir, Dir};
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use super::RawModule;
use crate::error::{LoadError, Result};

static BUNDLED: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/content");

/// Path filters applied to module files
#[derive(Debug, Clone, Default)]
pub struct LoadConfig {
    /// Skip modules whose relative path starts with any of these
    pub skip_prefixes: Vec<String>,
    /// When non-empty, only load modules under these prefixes
    pub include_prefixes: Vec<String>,
}

impl LoadConfig {
    fn accepts(&self, relative: &str) -> bool {
        if !self.include_prefixes.is_empty()
            && !self.include_prefixes.iter().any(|p| relative.starts_with(p.as_str()))
        {
            return false;
        }
        !self.skip_prefixes.iter().any(|p| relative.starts_with(p.as_str()))
    }
}

/// Load every module under `content_dir`, in sorted path order
pub fn load_from_directory(content_dir: &Path, config: &LoadConfig) -> Result<Vec<RawModule>> {
    let mut modules = Vec::new();

    for entry in WalkDir::new(content_dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_json(path) {
            continue;
        }

        let relative = path.strip_prefix(content_dir).map_err(|e| LoadError::InvalidModule {
            origin: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let relative_str = relative.to_string_lossy().replace('\\', "/");
        if !config.accepts(&relative_str) {
            continue;
        }

        let content = fs::read_to_string(path)?;
        let module = RawModule::from_json_str(&module_name(relative), &content)?;
        debug!(path = %relative_str, module = %module.name, entities = module.entities.len(), "read module file");
        modules.push(module);
    }

    Ok(modules)
}

/// Load every module from an embedded directory, in sorted path order
pub fn load_from_embedded(embedded_dir: &'static Dir<'static>, config: &LoadConfig) -> Result<Vec<RawModule>> {
    let mut files: Vec<(&Path, &str)> = Vec::new();
    collect_embedded_files(embedded_dir, &mut files)?;
    files.sort_by(|a, b| a.0.cmp(b.0));

    let mut modules = Vec::with_capacity(files.len());
    for (path, content) in files {
        let relative_str = path.to_string_lossy().replace('\\', "/");
        if !config.accepts(&relative_str) {
            continue;
        }
        modules.push(RawModule::from_json_str(&module_name(path), content)?);
    }
    Ok(modules)
}

/// Modules compiled in from the crate's `content/` directory
pub fn load_bundled(config: &LoadConfig) -> Result<Vec<RawModule>> {
    load_from_embedded(&BUNDLED, config)
}

/// Recursively collect JSON files from embedded directory
fn collect_embedded_files<'a>(dir: &'a Dir<'static>, files: &mut Vec<(&'a Path, &'a str)>) -> Result<()> {
    for file in dir.files() {
        let path = file.path();
        if !is_json(path) {
            continue;
        }
        let content = file.contents_utf8().ok_or_else(|| LoadError::InvalidModule {
            origin: path.display().to_string(),
            reason: "not valid UTF-8".to_string(),
        })?;
        files.push((path, content));
    }

    for subdir in dir.dirs() {
        collect_embedded_files(subdir, files)?;
    }
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension().map(|ext| ext == "json").unwrap_or(false)
}

/// `anatomy/airway.json` -> `anatomy/airway`
fn module_name(relative: &Path) -> String {
    relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
