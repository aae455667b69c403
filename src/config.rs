//! Run configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! TOML file, then `QUIRE_`-prefixed environment variables using `__` as the
//! section separator (`QUIRE_AFP__BITS_PER_PIXEL=4`).

use crate::error::PipelineError;
use quire_render_core::PaintingState;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Image headers carry the resolution in 16 bits.
const MAX_RESOLUTION: u32 = u16::MAX as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Afp,
    #[default]
    Pdf,
}

impl OutputFormat {
    /// Picks a format from an output file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "afp" => Ok(OutputFormat::Afp),
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(format!("unknown output format '{other}' (expected afp or pdf)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Afp => "afp",
            OutputFormat::Pdf => "pdf",
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AfpConfig {
    /// Device bit depth: 1, 4 or 8.
    pub bits_per_pixel: u8,
    pub color_images: bool,
    /// Dots per inch.
    pub resolution: u32,
}

impl Default for AfpConfig {
    fn default() -> Self {
        let state = PaintingState::default();
        Self {
            bits_per_pixel: state.bits_per_pixel,
            color_images: state.color_images,
            resolution: state.resolution,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Overrides every block's `line-height` factor when set.
    pub line_height: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub output: OutputConfig,
    pub afp: AfpConfig,
    pub layout: LayoutConfig,
    pub document: DocumentConfig,
}

impl RenderConfig {
    /// Loads configuration from `path` (if given) layered under the
    /// environment, then validates it.
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(config::Environment::with_prefix("QUIRE").separator("__"));

        let config: RenderConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Parses configuration from TOML text without consulting the environment.
    pub fn from_toml(source: &str) -> Result<Self, PipelineError> {
        let config: RenderConfig = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !matches!(self.afp.bits_per_pixel, 1 | 4 | 8) {
            return Err(PipelineError::InvalidConfig(format!(
                "afp.bits_per_pixel must be 1, 4 or 8, got {}",
                self.afp.bits_per_pixel
            )));
        }
        if self.afp.resolution == 0 || self.afp.resolution > MAX_RESOLUTION {
            return Err(PipelineError::InvalidConfig(format!(
                "afp.resolution must be between 1 and {MAX_RESOLUTION} dpi, got {}",
                self.afp.resolution
            )));
        }
        if let Some(lh) = self.layout.line_height
            && lh <= 0.0
        {
            return Err(PipelineError::InvalidConfig(format!(
                "layout.line_height must be positive, got {lh}"
            )));
        }
        Ok(())
    }

    pub fn painting_state(&self) -> PaintingState {
        PaintingState {
            bits_per_pixel: self.afp.bits_per_pixel,
            color_images: self.afp.color_images,
            resolution: self.afp.resolution,
        }
    }
}
