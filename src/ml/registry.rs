//! File-backed model registry.
//!
//! One JSON document per fitted pipeline, keyed by name. This is the only
//! model persistence mechanism; callers check `exists` before predicting
//! against a previously saved model rather than relying on a well-known
//! path.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::ml::trainer::PredictionPipeline;

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    root: PathBuf,
}

impl ModelRegistry {
    /// Registry rooted at the given directory (created lazily on save).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ModelRegistry { root: root.into() }
    }

    /// Registry rooted at the configured model directory.
    pub fn from_settings(settings: &Settings) -> Self {
        ModelRegistry::new(settings.model_dir.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist a pipeline under `name`, overwriting any previous version.
    pub fn save(&self, name: &str, pipeline: &PredictionPipeline) -> Result<()> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.root)?;
        let file = File::create(&path)?;
        serde_json::to_writer(BufWriter::new(file), pipeline)?;
        log::info!("saved model '{}' to {}", name, path.display());
        Ok(())
    }

    /// Load the pipeline saved under `name`.
    pub fn load(&self, name: &str) -> Result<PredictionPipeline> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(Error::ModelNotFound(name.to_string()));
        }
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Whether a model is saved under `name`.
    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Delete the model saved under `name`.
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(Error::ModelNotFound(name.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    /// Saved model names, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(err) => return Err(err.into()),
        };
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Name of the most recently saved model, if any.
    pub fn latest(&self) -> Result<Option<String>> {
        let mut latest: Option<(std::time::SystemTime, String)> = None;
        for name in self.list()? {
            let modified = fs::metadata(self.path_for(&name)?)?.modified()?;
            let newer = latest
                .as_ref()
                .map(|(time, _)| modified > *time)
                .unwrap_or(true);
            if newer {
                latest = Some((modified, name));
            }
        }
        Ok(latest.map(|(_, name)| name))
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name
                .chars()
                .any(|c| matches!(c, '/' | '\\') || c.is_control())
            || name == "."
            || name == ".."
        {
            return Err(Error::InvalidInput(format!(
                "invalid model name: '{}'",
                name
            )));
        }
        Ok(self.root.join(format!("{}.json", name)))
    }
}
