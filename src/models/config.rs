use eink_dither::{DitherAlgorithm, PreprocessOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::DisplaySpec;

/// Environment variable naming the default config file
pub const CONFIG_ENV: &str = "XTCPRESS_CONFIG";

/// Reading orientation of the produced pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// How landscape mode treats pages taller than wide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    #[default]
    Nosplit,
    Split,
    Overlap,
}

/// Artifact kind written by a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xtc,
    Png,
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            other => Err(format!("unknown orientation: {other}")),
        }
    }
}

impl FromStr for SplitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nosplit" | "none" => Ok(Self::Nosplit),
            "split" => Ok(Self::Split),
            "overlap" => Ok(Self::Overlap),
            other => Err(format!("unknown split mode: {other}")),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xtc" => Ok(Self::Xtc),
            "png" => Ok(Self::Png),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Xtc => "xtc",
            Self::Png => "png",
        })
    }
}

/// Conversion settings loaded from config.yaml, overridable from the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Target panel size
    pub display: DisplaySpec,

    pub orientation: Orientation,

    pub split_mode: SplitMode,

    /// Dithering algorithm, e.g. "floyd-steinberg" or "atkinson"
    pub dither: DitherAlgorithm,

    /// Contrast stretch level 0-8 (0 disables)
    pub contrast: u8,

    /// Horizontal crop margin in percent
    pub margin_x: f32,

    /// Vertical crop margin in percent
    pub margin_y: f32,

    pub output_format: OutputFormat,

    /// Title written to container metadata (overrides sidecar metadata)
    pub title: Option<String>,

    /// Author written to container metadata (overrides sidecar metadata)
    pub author: Option<String>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            display: DisplaySpec::X4,
            orientation: Orientation::Portrait,
            split_mode: SplitMode::Nosplit,
            dither: DitherAlgorithm::FloydSteinberg,
            contrast: 0,
            margin_x: 0.0,
            margin_y: 0.0,
            output_format: OutputFormat::Xtc,
            title: None,
            author: None,
        }
    }
}

impl ConvertConfig {
    /// Load configuration from a YAML file.
    ///
    /// With no explicit path, `$XTCPRESS_CONFIG` is consulted. A missing or
    /// unparsable file yields the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from))
        {
            Some(path) => path,
            None => return Self::default(),
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        dither = %config.dither,
                        contrast = config.contrast,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Parse YAML text
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Preprocessing options with margins and contrast clamped to range
    pub fn preprocess_options(&self) -> PreprocessOptions {
        PreprocessOptions::new()
            .margins(self.margin_x, self.margin_y)
            .contrast(self.contrast)
    }
}
