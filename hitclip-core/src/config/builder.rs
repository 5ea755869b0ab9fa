// ============================================================================
// hitclip-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for RunConfig
//
// Fluent API for creating RunConfig instances. Directories are required; every
// other field starts from the defaults in config/mod.rs.

use std::path::PathBuf;
use std::time::Duration;

use super::RunConfig;
use crate::error::{CoreError, CoreResult};

/// Builder for creating RunConfig instances.
///
/// # Examples
///
/// ```rust
/// use hitclip_core::config::RunConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = RunConfigBuilder::new()
///     .input_dir(PathBuf::from("/recordings"))
///     .output_dir(PathBuf::from("/clips"))
///     .delete_original(true)
///     .build()
///     .unwrap();
/// assert!(config.delete_original);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RunConfigBuilder {
    // Required fields
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,

    // Optional overrides
    sample_rate: Option<u64>,
    pre_secs: Option<f64>,
    post_secs: Option<f64>,
    delete_original: bool,
    merge_outputs: bool,
    reference_image: Option<PathBuf>,
    extraction_timeout: Option<Duration>,
    mse_threshold: Option<f64>,
}

impl RunConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory containing the recordings.
    pub fn input_dir(mut self, input_dir: PathBuf) -> Self {
        self.input_dir = Some(input_dir);
        self
    }

    /// Sets the directory clips are written to.
    pub fn output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = Some(output_dir);
        self
    }

    /// Sets the stride between inspected frames.
    pub fn sample_rate(mut self, sample_rate: u64) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Sets the seconds kept before each event.
    pub fn pre_secs(mut self, pre_secs: f64) -> Self {
        self.pre_secs = Some(pre_secs);
        self
    }

    /// Sets the seconds kept after each event.
    pub fn post_secs(mut self, post_secs: f64) -> Self {
        self.post_secs = Some(post_secs);
        self
    }

    /// Sets whether recordings are deleted after clipping.
    pub fn delete_original(mut self, delete: bool) -> Self {
        self.delete_original = delete;
        self
    }

    /// Sets whether clips are merged into a `-final.mp4`.
    pub fn merge_outputs(mut self, merge: bool) -> Self {
        self.merge_outputs = merge;
        self
    }

    /// Overrides the reference marker picture location.
    pub fn reference_image(mut self, path: PathBuf) -> Self {
        self.reference_image = Some(path);
        self
    }

    /// Overrides the per-extraction timeout.
    pub fn extraction_timeout(mut self, timeout: Duration) -> Self {
        self.extraction_timeout = Some(timeout);
        self
    }

    /// Overrides the MSE match threshold.
    pub fn mse_threshold(mut self, threshold: f64) -> Self {
        self.mse_threshold = Some(threshold);
        self
    }

    /// Builds the RunConfig. Fails if a required directory is missing.
    ///
    /// The result is not validated; call [`RunConfig::validate`] before a run.
    pub fn build(self) -> CoreResult<RunConfig> {
        let mut missing = Vec::new();
        if self.input_dir.is_none() {
            missing.push("Input directory cannot be empty".to_string());
        }
        if self.output_dir.is_none() {
            missing.push("Output directory cannot be empty".to_string());
        }
        let (Some(input_dir), Some(output_dir)) = (self.input_dir, self.output_dir) else {
            return Err(CoreError::InvalidConfig(missing));
        };

        let mut config = RunConfig::new(input_dir, output_dir);
        config.delete_original = self.delete_original;
        config.merge_outputs = self.merge_outputs;
        if let Some(sample_rate) = self.sample_rate {
            config.sample_rate = sample_rate;
        }
        if let Some(pre_secs) = self.pre_secs {
            config.pre_secs = pre_secs;
        }
        if let Some(post_secs) = self.post_secs {
            config.post_secs = post_secs;
        }
        if let Some(path) = self.reference_image {
            config.reference_image = path;
        }
        if let Some(timeout) = self.extraction_timeout {
            config.extraction_timeout = timeout;
        }
        if let Some(threshold) = self.mse_threshold {
            config.mse_threshold = threshold;
        }
        Ok(config)
    }
}
