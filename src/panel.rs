use crate::config::Margins;
use crate::data_layer::{PanelContext, PanelLayer};
use crate::error::{LayoutError, LocusError, Result};
use crate::scale::LinearScale;
use crate::track_layout::Window;
use locustrack_render::ClipArea;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YAxis {
    Y1,
    Y2,
}

impl TryFrom<u8> for YAxis {
    type Error = LocusError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(YAxis::Y1),
            2 => Ok(YAxis::Y2),
            other => Err(LocusError::InvalidAxis(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PanelScales {
    window: Window,
    x: LinearScale,
    y1: Option<LinearScale>,
    y2: Option<LinearScale>,
}

/// A horizontal strip of the plot holding layers that share an x scale.
#[derive(Debug)]
pub struct Panel {
    id: String,
    origin: (f64, f64),
    width: f64,
    height: f64,
    margin: Margins,
    layers: Vec<PanelLayer>,
    y1_layer: Option<String>,
    y2_layer: Option<String>,
    scales: Option<PanelScales>,
}

impl Panel {
    pub fn new(id: impl Into<String>, origin: (f64, f64), width: f64, height: f64, margin: Margins) -> Self {
        Self {
            id: id.into(),
            origin,
            width,
            height,
            margin,
            layers: vec![],
            y1_layer: None,
            y2_layer: None,
            scales: None,
        }
    }

    #[inline(always)]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn layers(&self) -> &[PanelLayer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [PanelLayer] {
        &mut self.layers
    }

    pub fn layer(&self, layer_id: &str) -> Option<&PanelLayer> {
        self.layers.iter().find(|l| l.id() == layer_id)
    }

    pub fn add_layer(&mut self, layer: impl Into<PanelLayer>) -> Result<&mut Self> {
        let layer = layer.into();
        if self.layer(layer.id()).is_some() {
            return Err(LocusError::Config(format!(
                "panel '{}' already has a layer '{}'",
                self.id,
                layer.id()
            )));
        }
        self.layers.push(layer);
        Ok(self)
    }

    /// Makes `layer_id` drive the y1 or y2 axis of this panel.
    pub fn attach_to_y_axis(&mut self, layer_id: &str, axis: u8) -> Result<&mut Self> {
        let axis = YAxis::try_from(axis)?;
        if self.layer(layer_id).is_none() {
            return Err(LocusError::UnknownLayer {
                panel: self.id.clone(),
                layer: layer_id.to_string(),
            });
        }
        match axis {
            YAxis::Y1 => self.y1_layer = Some(layer_id.to_string()),
            YAxis::Y2 => self.y2_layer = Some(layer_id.to_string()),
        }
        Ok(self)
    }

    pub fn axis_of(&self, layer_id: &str) -> Option<YAxis> {
        if self.y1_layer.as_deref() == Some(layer_id) {
            Some(YAxis::Y1)
        } else if self.y2_layer.as_deref() == Some(layer_id) {
            Some(YAxis::Y2)
        } else {
            None
        }
    }

    pub fn clip_area(&self) -> ClipArea {
        ClipArea {
            x: self.origin.0 + self.margin.left,
            y: self.origin.1 + self.margin.top,
            width: self.width - self.margin.left - self.margin.right,
            height: self.height - self.margin.top - self.margin.bottom,
        }
    }

    fn y_scale_for(&self, layer_id: Option<&str>, clip: &ClipArea) -> std::result::Result<Option<LinearScale>, LayoutError> {
        let Some(layer) = layer_id.and_then(|id| self.layer(id)) else {
            return Ok(None);
        };
        let (low, high) = match layer.y_extent() {
            Some((low, high)) if high > low => (low, high),
            _ => (0.0, 1.0),
        };
        LinearScale::new((low, high), (clip.height, 0.0)).map(Some)
    }

    /// Rebuilds the x scale for `window` and the y scales from the attached
    /// layers' current extents. The previous scales stay if this fails.
    pub fn rebuild_scales(&mut self, window: Window) -> std::result::Result<(), LayoutError> {
        if window.end <= window.start {
            return Err(LayoutError::EmptyWindow {
                start: window.start as f64,
                end: window.end as f64,
            });
        }
        let clip = self.clip_area();
        let x = LinearScale::new((window.start as f64, window.end as f64), (0.0, clip.width))?;
        let y1 = self.y_scale_for(self.y1_layer.as_deref(), &clip)?;
        let y2 = self.y_scale_for(self.y2_layer.as_deref(), &clip)?;
        self.scales = Some(PanelScales { window, x, y1, y2 });
        Ok(())
    }

    pub fn x_scale(&self) -> Option<LinearScale> {
        self.scales.map(|s| s.x)
    }

    pub fn y_scale(&self, axis: YAxis) -> Option<LinearScale> {
        self.scales.and_then(|s| match axis {
            YAxis::Y1 => s.y1,
            YAxis::Y2 => s.y2,
        })
    }

    /// Scales as seen by one layer; `None` before the first scale build.
    pub fn context_for(&self, layer_id: &str) -> Option<PanelContext> {
        let scales = self.scales?;
        let y_scale = self.axis_of(layer_id).and_then(|axis| match axis {
            YAxis::Y1 => scales.y1,
            YAxis::Y2 => scales.y2,
        });
        Some(PanelContext {
            window: scales.window,
            x_scale: scales.x,
            y_scale,
        })
    }
}
