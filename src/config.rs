//! Runtime settings for hosts embedding the library.

use std::env;
use std::path::PathBuf;

use serde::Deserialize;

/// Tunables shared by the cleaning, profiling, and ML layers.
///
/// Every field has a default; `from_env` lets a host override them through
/// `DATALENS_*` environment variables without a config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory the model registry stores fitted pipelines in.
    pub model_dir: PathBuf,
    /// Fraction of rows held out for evaluation.
    pub test_size: f64,
    /// Seed for splits and forest bootstrapping.
    pub random_seed: u64,
    /// Row count for table previews.
    pub preview_rows: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            model_dir: PathBuf::from("models"),
            test_size: 0.2,
            random_seed: 42,
            preview_rows: 5,
        }
    }
}

impl Settings {
    /// Defaults overridden by any `DATALENS_*` environment variables.
    pub fn from_env() -> Self {
        let mut settings = Settings::default();
        if let Ok(dir) = env::var("DATALENS_MODEL_DIR") {
            settings.model_dir = PathBuf::from(dir);
        }
        if let Some(v) = parse_env("DATALENS_TEST_SIZE") {
            settings.test_size = v;
        }
        if let Some(v) = parse_env("DATALENS_RANDOM_SEED") {
            settings.random_seed = v;
        }
        if let Some(v) = parse_env("DATALENS_PREVIEW_ROWS") {
            settings.preview_rows = v;
        }
        settings
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
