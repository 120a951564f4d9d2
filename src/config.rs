use crate::error::ConvertError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub conversion: Conversion,
    #[serde(default)]
    pub engine: Engine,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub security: Security,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            conversion: Default::default(),
            engine: Default::default(),
            limits: Default::default(),
            logging: Default::default(),
            security: Default::default(),
        }
    }
}

/// Option record handed to the pdf2docx engine for a single run.
///
/// Defaults reproduce the upstream call exactly: whole document, no worker
/// processes, no debug artifacts, layout preservation on, both gap
/// thresholds at 5 layout units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    /// First page to convert, 0-based inclusive.
    pub start_page: u32,
    /// Page to stop before (exclusive). Unset means end of document.
    pub end_page: Option<u32>,
    pub multi_processing: bool,
    pub debug: bool,
    pub keep_format: bool,
    pub min_vertical_gap: f32,
    pub min_horizontal_gap: f32,
}
impl Default for Conversion {
    fn default() -> Self {
        Self {
            start_page: 0,
            end_page: None,
            multi_processing: false,
            debug: false,
            keep_format: true,
            min_vertical_gap: 5.0,
            min_horizontal_gap: 5.0,
        }
    }
}

impl Conversion {
    /// Reject ranges that cannot select any page.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if let Some(end) = self.end_page {
            if end <= self.start_page {
                return Err(ConvertError::InvalidOptions(format!(
                    "end_page ({end}) must be greater than start_page ({})",
                    self.start_page
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engine {
    /// Python interpreter running pdf2docx. "auto" resolves via the
    /// PDF2DOCX_PYTHON env var, then falls back to python3.
    pub python_exe: String,
    pub scripts_dir: String,
    pub convert_timeout_seconds: u64,
    pub doctor_timeout_seconds: u64,
    pub probe_timeout_seconds: u64,
    #[serde(default)]
    pub env: std::collections::BTreeMap<String, String>,
    pub keep_python_stderr: bool,
}
impl Default for Engine {
    fn default() -> Self {
        Self {
            python_exe: "auto".into(),
            scripts_dir: "scripts".into(),
            convert_timeout_seconds: 600,
            doctor_timeout_seconds: 30,
            probe_timeout_seconds: 120,
            env: Default::default(),
            keep_python_stderr: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    pub max_input_file_bytes: u64,
    pub max_input_pages: u32,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_file_bytes: 2 * 1024 * 1024 * 1024,
            max_input_pages: 20000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            // The conversion contract touches only the input and output
            // files, so file logging is opt-in.
            write_to_file: false,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Security {
    pub reject_url_inputs: bool,
    pub pin_scripts_dir: bool,
}
impl Default for Security {
    fn default() -> Self {
        Self {
            reject_url_inputs: true,
            pin_scripts_dir: true,
        }
    }
}
