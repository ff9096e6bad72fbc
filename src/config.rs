//! Environment-driven pipeline configuration.
//!
//! `base_path`, threshold, ngram size, block bounds, and the parallel flag
//! are all caller-owned per the design; this struct is how the CLI
//! assembles them from the environment before calling into the library.
//! Library callers embedding this crate elsewhere can just build a
//! `PipelineConfig` directly and skip the environment entirely.

use std::env;
use std::path::PathBuf;

/// Detector's own bare default, per the design note distinguishing it
/// from the pipeline driver's default of 0.72.
pub const DETECTOR_DEFAULT_THRESHOLD: f64 = 0.7;
/// Default threshold used by `pipeline::preprocessing`.
pub const DRIVER_DEFAULT_THRESHOLD: f64 = 0.72;
pub const DEFAULT_NGRAM_N: usize = 2;
pub const DEFAULT_MIN_BLOCK: usize = 1;
pub const DEFAULT_MAX_BLOCK: usize = 500;
/// Below this many candidate pairs, worker-pool dispatch overhead
/// dominates and scoring runs serially regardless of the `parallel` flag.
pub const PARALLEL_PAIR_THRESHOLD: usize = 200;
pub const PARALLEL_CHUNK_SIZE: usize = 256;
pub const SORTED_NEIGHBORHOOD_BUCKET_SIZE: usize = 40;
pub const EARLY_EXIT_TOKEN_THRESHOLD: f64 = 0.2;
pub const PHONE_TAIL_MIN: usize = 7;
pub const PHONE_TAIL_MAX: usize = 10;
pub const YEARS_IN_PRACTICE_MIN: i64 = 0;
pub const YEARS_IN_PRACTICE_MAX: i64 = 60;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub threshold: f64,
    pub ngram_n: usize,
    pub min_block: usize,
    pub max_block: usize,
    pub parallel: bool,
    pub base_path: PathBuf,
    pub remove_outliers: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: DRIVER_DEFAULT_THRESHOLD,
            ngram_n: DEFAULT_NGRAM_N,
            min_block: DEFAULT_MIN_BLOCK,
            max_block: DEFAULT_MAX_BLOCK,
            parallel: false,
            base_path: PathBuf::from("."),
            remove_outliers: true,
        }
    }
}

impl PipelineConfig {
    /// Builds a config from the environment, falling back to defaults.
    /// Reads `DATA_PATH`, `DEDUP_THRESHOLD`, `DEDUP_NGRAM_N`,
    /// `DEDUP_MIN_BLOCK`, `DEDUP_MAX_BLOCK`, `DEDUP_PARALLEL`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            threshold: env_parsed("DEDUP_THRESHOLD").unwrap_or(defaults.threshold),
            ngram_n: env_parsed("DEDUP_NGRAM_N").unwrap_or(defaults.ngram_n),
            min_block: env_parsed("DEDUP_MIN_BLOCK").unwrap_or(defaults.min_block),
            max_block: env_parsed("DEDUP_MAX_BLOCK").unwrap_or(defaults.max_block),
            parallel: env_parsed("DEDUP_PARALLEL").unwrap_or(defaults.parallel),
            base_path: env::var("DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.base_path),
            remove_outliers: defaults.remove_outliers,
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Installs the env-filtered tracing subscriber, idempotent via `try_init`
/// so repeated calls (tests, embedding callers) never panic.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
