// ============================================================================
// hitclip-cli/src/settings.rs
// ============================================================================
//
// PERSISTED SETTINGS: The per-user record of the last run's parameters
//
// The record lives at `~/.hitclip-settings.json`. Values are stored as text
// because that is how earlier releases wrote them; `delete_bool` may also
// appear as a bare number in records written by hand.

use crate::cli::ClipArgs;
use crate::error::{CliErrorContext, CliResult};

use hitclip_core::{CoreError, RawRunSettings};
use log::{debug, info};
use serde::{Deserialize, Deserializer, Serialize};

use std::fs;
use std::path::{Path, PathBuf};

/// File name of the settings record inside the home directory.
pub const SETTINGS_FILENAME: &str = ".hitclip-settings.json";

/// Contents of the settings record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredSettings {
    #[serde(rename = "sample_rate_input", deserialize_with = "text_or_number")]
    pub sample_rate: String,

    #[serde(rename = "pre_input", deserialize_with = "text_or_number")]
    pub pre: String,

    #[serde(rename = "post_input", deserialize_with = "text_or_number")]
    pub post: String,

    /// "1" to delete recordings after clipping, "0" to keep them
    #[serde(rename = "delete_bool", deserialize_with = "text_or_number")]
    pub delete: String,

    #[serde(rename = "input_directory")]
    pub input_dir: String,

    #[serde(rename = "output_directory")]
    pub output_dir: String,
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self {
            sample_rate: "30".to_string(),
            pre: "4".to_string(),
            post: "3".to_string(),
            delete: "0".to_string(),
            input_dir: String::new(),
            output_dir: String::new(),
        }
    }
}

impl StoredSettings {
    /// Reads the record at `path`, writing the defaults there first if it is missing.
    pub fn load_or_create(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            info!("Creating settings record at {}", path.display());
            let defaults = Self::default();
            defaults.save(path)?;
            return Ok(defaults);
        }

        let text = fs::read_to_string(path)
            .cli_with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings = serde_json::from_str(&text).map_err(|e| {
            CoreError::JsonParseError(format!("{}: {e}", path.display()))
        })?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Writes the record to `path`.
    pub fn save(&self, path: &Path) -> CliResult<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::JsonParseError(e.to_string()))?;
        fs::write(path, text)
            .cli_with_context(|| format!("Failed to write settings to {}", path.display()))?;
        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Overwrites stored values with those given on the command line.
    pub fn apply_args(&mut self, args: &ClipArgs) {
        if let Some(dir) = &args.input_dir {
            self.input_dir = dir.to_string_lossy().into_owned();
        }
        if let Some(dir) = &args.output_dir {
            self.output_dir = dir.to_string_lossy().into_owned();
        }
        if let Some(value) = &args.sample_rate {
            self.sample_rate = value.clone();
        }
        if let Some(value) = &args.pre {
            self.pre = value.clone();
        }
        if let Some(value) = &args.post {
            self.post = value.clone();
        }
        if args.delete_original {
            self.delete = "1".to_string();
        } else if args.keep_original {
            self.delete = "0".to_string();
        }
    }

    pub fn delete_enabled(&self) -> bool {
        matches!(self.delete.trim(), "1" | "true")
    }

    /// Text-form run settings, ready for `RunConfig::from_raw`.
    pub fn to_raw(&self, merge_outputs: bool) -> RawRunSettings {
        RawRunSettings {
            sample_rate: self.sample_rate.clone(),
            pre: self.pre.clone(),
            post: self.post.clone(),
            delete_original: self.delete_enabled(),
            merge_outputs,
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
        }
    }
}

/// Location of the settings record for the current user.
pub fn settings_path() -> CliResult<PathBuf> {
    ["HOME", "USERPROFILE"]
        .iter()
        .filter_map(|var| std::env::var_os(var))
        .find(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(SETTINGS_FILENAME))
        .cli_context("Could not determine the home directory (HOME is not set)")
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Int(value) => value.to_string(),
        TextOrNumber::Float(value) => value.to_string(),
    })
}
