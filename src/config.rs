use crate::color_scale::ColorScale;
use crate::error::{LocusError, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 50.0,
            bottom: 20.0,
            left: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionsSettings {
    pub radius: f64,
    pub ld_colors: ColorScale,
}

impl Default for PositionsSettings {
    fn default() -> Self {
        Self {
            radius: 4.0,
            ld_colors: ColorScale::ld(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesSettings {
    /// Narrowest pixel width a gene is drawn with, so its label fits.
    pub min_display_range_width: f64,
    pub track_height: f64,
    pub fill: String,
}

impl Default for GenesSettings {
    fn default() -> Self {
        Self {
            min_display_range_width: 80.0,
            track_height: 40.0,
            fill: "#000099".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecombinationSettings {
    pub stroke: String,
    pub stroke_width: f64,
}

impl Default for RecombinationSettings {
    fn default() -> Self {
        Self {
            stroke: "#0000FF".to_string(),
            stroke_width: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub width: f64,
    pub positions_panel_height: f64,
    pub genes_panel_height: f64,
    pub margin: Margins,
    pub positions: PositionsSettings,
    pub genes: GenesSettings,
    pub recombination: RecombinationSettings,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            positions_panel_height: 225.0,
            genes_panel_height: 225.0,
            margin: Margins::default(),
            positions: PositionsSettings::default(),
            genes: GenesSettings::default(),
            recombination: RecombinationSettings::default(),
        }
    }
}

impl PlotConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let clip_width = self.width - self.margin.left - self.margin.right;
        if !(clip_width > 0.0) {
            return Err(LocusError::Config(format!(
                "width {} leaves no room between margins",
                self.width
            )));
        }
        for (name, height) in [
            ("positions_panel_height", self.positions_panel_height),
            ("genes_panel_height", self.genes_panel_height),
        ] {
            if !(height - self.margin.top - self.margin.bottom > 0.0) {
                return Err(LocusError::Config(format!(
                    "{name} {height} leaves no room between margins"
                )));
            }
        }
        if !(self.positions.radius > 0.0) {
            return Err(LocusError::Config("positions.radius must be positive".into()));
        }
        if !(self.genes.track_height > 0.0) {
            return Err(LocusError::Config("genes.track_height must be positive".into()));
        }
        if !self.genes.min_display_range_width.is_finite()
            || self.genes.min_display_range_width < 0.0
        {
            return Err(LocusError::Config(
                "genes.min_display_range_width must be a non-negative number".into(),
            ));
        }
        self.positions.ld_colors.validate()
    }

    pub fn height(&self) -> f64 {
        self.positions_panel_height + self.genes_panel_height
    }
}
