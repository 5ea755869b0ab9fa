//! Configuration structures and constants for the hitclip-core library.
//!
//! A [`RunConfig`] is immutable for the duration of one run and must be
//! validated before any processing starts. Front ends that collect values as
//! text (the CLI settings record, a form) go through [`RawRunSettings`] and
//! [`RunConfig::from_raw`], which reports every problem at once instead of
//! stopping at the first.

mod builder;
pub mod utils;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

pub use builder::RunConfigBuilder;
use utils::{get_env_f64, get_env_path, get_env_u64};

// Default constants

/// Number of frames skipped between inspected frames.
pub const DEFAULT_SAMPLE_RATE: u64 = 30;

/// Seconds of gameplay kept before each event.
pub const DEFAULT_PRE_SECS: f64 = 4.0;

/// Seconds of gameplay kept after each event.
pub const DEFAULT_POST_SECS: f64 = 3.0;

/// Upper bound on a single ffmpeg extraction or merge before it is killed.
pub const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 120;

/// MSE below which a processed crop counts as the marker.
pub const DEFAULT_MSE_THRESHOLD: f64 = 220.0;

/// File name of the bundled reference marker picture.
pub const REFERENCE_IMAGE_FILENAME: &str = "expected.png";

/// Environment override for the reference marker picture location.
pub const ENV_REFERENCE_IMAGE: &str = "HITCLIP_REFERENCE_IMAGE";

/// Environment override for the MSE match threshold.
pub const ENV_MSE_THRESHOLD: &str = "HITCLIP_MSE_THRESHOLD";

/// Environment override for the extraction timeout in seconds.
pub const ENV_EXTRACTION_TIMEOUT: &str = "HITCLIP_EXTRACTION_TIMEOUT";

/// Main configuration for one clipping run.
///
/// # Examples
///
/// ```rust,no_run
/// use hitclip_core::config::RunConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = RunConfigBuilder::new()
///     .input_dir(PathBuf::from("/recordings"))
///     .output_dir(PathBuf::from("/clips"))
///     .sample_rate(15)
///     .pre_secs(2.0)
///     .post_secs(1.5)
///     .build()
///     .unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory containing the gameplay recordings
    pub input_dir: PathBuf,

    /// Directory where clips are written
    pub output_dir: PathBuf,

    /// Stride between inspected frames (must be positive)
    pub sample_rate: u64,

    /// Seconds kept before each event
    pub pre_secs: f64,

    /// Seconds kept after each event
    pub post_secs: f64,

    /// Remove each recording once all of its clips were written
    pub delete_original: bool,

    /// Concatenate the output directory's clips after each recording
    pub merge_outputs: bool,

    /// Location of the reference marker picture
    pub reference_image: PathBuf,

    /// Bound on each extraction subprocess
    pub extraction_timeout: Duration,

    /// MSE threshold for a positive match
    pub mse_threshold: f64,
}

impl RunConfig {
    /// Creates a configuration with defaults for everything but the directories.
    pub fn new(input_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_dir,
            output_dir,
            sample_rate: DEFAULT_SAMPLE_RATE,
            pre_secs: DEFAULT_PRE_SECS,
            post_secs: DEFAULT_POST_SECS,
            delete_original: false,
            merge_outputs: false,
            reference_image: default_reference_image(),
            extraction_timeout: Duration::from_secs(get_env_u64(
                ENV_EXTRACTION_TIMEOUT,
                DEFAULT_EXTRACTION_TIMEOUT_SECS,
            )),
            mse_threshold: get_env_f64(ENV_MSE_THRESHOLD, DEFAULT_MSE_THRESHOLD),
        }
    }

    /// Parses and validates text-form settings, collecting every violation.
    pub fn from_raw(raw: &RawRunSettings) -> CoreResult<Self> {
        let mut problems = Vec::new();

        let sample_rate = match raw.sample_rate.trim() {
            "" => {
                problems.push("Sample rate cannot be empty".to_string());
                None
            }
            text => match text.parse::<u64>() {
                Ok(0) => {
                    problems.push("Sample rate must be greater than zero".to_string());
                    None
                }
                Ok(value) => Some(value),
                Err(_) => {
                    problems.push(format!("Sample rate must be a whole number (got '{text}')"));
                    None
                }
            },
        };
        let pre_secs = parse_seconds("Pre", &raw.pre, &mut problems);
        let post_secs = parse_seconds("Post", &raw.post, &mut problems);

        let input_dir = PathBuf::from(raw.input_dir.trim());
        let output_dir = PathBuf::from(raw.output_dir.trim());
        check_directories(&input_dir, &output_dir, &mut problems);

        match (sample_rate, pre_secs, post_secs) {
            (Some(sample_rate), Some(pre_secs), Some(post_secs)) if problems.is_empty() => {
                let mut config = RunConfig::new(input_dir, output_dir);
                config.sample_rate = sample_rate;
                config.pre_secs = pre_secs;
                config.post_secs = post_secs;
                config.delete_original = raw.delete_original;
                config.merge_outputs = raw.merge_outputs;
                Ok(config)
            }
            _ => Err(CoreError::InvalidConfig(problems)),
        }
    }

    /// Checks a typed configuration, collecting every violation.
    pub fn validate(&self) -> CoreResult<()> {
        let mut problems = Vec::new();

        if self.sample_rate == 0 {
            problems.push("Sample rate must be greater than zero".to_string());
        }
        for (label, value) in [("Pre", self.pre_secs), ("Post", self.post_secs)] {
            if !value.is_finite() {
                problems.push(format!("{label} value must be a number"));
            } else if value < 0.0 {
                problems.push(format!("{label} value cannot be negative"));
            }
        }
        if self.extraction_timeout.is_zero() {
            problems.push("Extraction timeout must be greater than zero".to_string());
        }
        check_directories(&self.input_dir, &self.output_dir, &mut problems);

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidConfig(problems))
        }
    }
}

/// Run settings as text, the way a form or the settings record holds them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRunSettings {
    pub sample_rate: String,
    pub pre: String,
    pub post: String,
    pub delete_original: bool,
    pub merge_outputs: bool,
    pub input_dir: String,
    pub output_dir: String,
}

fn parse_seconds(label: &str, text: &str, problems: &mut Vec<String>) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        problems.push(format!("{label} value cannot be empty"));
        return None;
    }
    match text.parse::<f64>() {
        Ok(value) if !value.is_finite() => {
            problems.push(format!("{label} value must be a number (got '{text}')"));
            None
        }
        Ok(value) if value < 0.0 => {
            problems.push(format!("{label} value cannot be negative"));
            None
        }
        Ok(value) => Some(value),
        Err(_) => {
            problems.push(format!("{label} value must be a number (got '{text}')"));
            None
        }
    }
}

fn check_directories(input_dir: &Path, output_dir: &Path, problems: &mut Vec<String>) {
    let input_empty = input_dir.as_os_str().is_empty();
    let output_empty = output_dir.as_os_str().is_empty();

    if input_empty {
        problems.push("Input directory cannot be empty".to_string());
    } else if !input_dir.is_dir() {
        problems.push(format!("Input directory not found: {}", input_dir.display()));
    }

    if output_empty {
        problems.push("Output directory cannot be empty".to_string());
    } else if !output_dir.is_dir() {
        problems.push(format!("Output directory not found: {}", output_dir.display()));
    }

    if !input_empty && !output_empty && same_directory(input_dir, output_dir) {
        problems.push("Input & output directories must be different".to_string());
    }
}

fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Resolves the reference marker picture.
///
/// Order: `HITCLIP_REFERENCE_IMAGE`, `assets/expected.png` next to the running
/// executable, then the crate's own `assets/` directory.
pub fn default_reference_image() -> PathBuf {
    if let Some(path) = get_env_path(ENV_REFERENCE_IMAGE) {
        return path;
    }

    let beside_exe = std::env::current_exe().ok().and_then(|exe| {
        exe.parent()
            .map(|dir| dir.join("assets").join(REFERENCE_IMAGE_FILENAME))
    });
    match beside_exe {
        Some(path) if path.is_file() => path,
        _ => Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("assets")
            .join(REFERENCE_IMAGE_FILENAME),
    }
}
