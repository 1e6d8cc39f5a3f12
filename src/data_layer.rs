//! The data layer lifecycle shared by all layer variants.
//!
//! A refresh hands a layer the raw records of a fetch. They are decoded and
//! transformed into a *staged* batch, the panel rebuilds its scales (which may
//! depend on the staged records), and only when the layout pass succeeds does
//! the staged batch replace the published snapshot and get drawn. Any failure
//! leaves both the previous records and the previous drawing in place.

use crate::error::{LayoutError, LocusError};
use crate::layer_genes::GenesLayer;
use crate::layer_positions::PositionsLayer;
use crate::layer_recombination::RecombinationRateLayer;
use crate::scale::LinearScale;
use crate::track_layout::Window;
use locustrack_render::{Canvas, CommandCanvas};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;

/// Scales and window a layer sees during layout and draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelContext {
    pub window: Window,
    pub x_scale: LinearScale,
    /// Scale of the y axis the layer is attached to, if any.
    pub y_scale: Option<LinearScale>,
}

pub trait DataLayer {
    type Record: DeserializeOwned + Clone + Debug + Send + Sync;

    fn id(&self) -> &str;

    /// Fields requested from the data source.
    fn fields(&self) -> Vec<String>;

    /// Post-fetch hook: derive fields from the raw records.
    fn transform(&self, _records: &mut [Self::Record]) {}

    /// Pre-render hook, run once the panel scales are known.
    fn layout(
        &mut self,
        _records: &mut [Self::Record],
        _ctx: &PanelContext,
    ) -> Result<(), LayoutError> {
        Ok(())
    }

    fn draw(&self, records: &[Self::Record], ctx: &PanelContext, canvas: &mut dyn Canvas);

    /// Value range the layer needs on its y axis.
    fn y_extent(&self, _records: &[Self::Record]) -> Option<(f64, f64)> {
        None
    }
}

/// A layer together with its published records and retained drawing.
#[derive(Debug)]
pub struct LayerSlot<L: DataLayer> {
    layer: L,
    data: Arc<Vec<L::Record>>,
    staged: Option<Vec<L::Record>>,
    canvas: CommandCanvas,
}

impl<L: DataLayer> LayerSlot<L> {
    pub fn new(layer: L) -> Self {
        Self {
            layer,
            data: Arc::new(vec![]),
            staged: None,
            canvas: CommandCanvas::new(),
        }
    }

    #[inline(always)]
    pub fn layer(&self) -> &L {
        &self.layer
    }

    /// Records of the last successful refresh.
    pub fn snapshot(&self) -> Arc<Vec<L::Record>> {
        Arc::clone(&self.data)
    }

    #[inline(always)]
    pub fn canvas(&self) -> &CommandCanvas {
        &self.canvas
    }

    /// Decodes fetched records and runs the transform hook on them.
    pub fn ingest(&mut self, body: Vec<serde_json::Value>) -> Result<usize, LocusError> {
        let mut records = body
            .into_iter()
            .map(serde_json::from_value::<L::Record>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| LocusError::Decode {
                layer: self.layer.id().to_string(),
                source,
            })?;
        self.layer.transform(&mut records);
        let count = records.len();
        self.staged = Some(records);
        Ok(count)
    }

    pub fn discard_staged(&mut self) {
        self.staged = None;
    }

    pub fn y_extent(&self) -> Option<(f64, f64)> {
        match &self.staged {
            Some(records) => self.layer.y_extent(records),
            None => self.layer.y_extent(&self.data),
        }
    }

    /// Lays out the staged records (or a copy of the published ones), then
    /// publishes them and redraws the canvas from scratch.
    pub fn layout_and_draw(&mut self, ctx: &PanelContext) -> Result<usize, LayoutError> {
        let mut records = match self.staged.take() {
            Some(records) => records,
            None => self.data.as_ref().clone(),
        };
        self.layer.layout(&mut records, ctx)?;
        self.data = Arc::new(records);
        self.canvas.clear();
        self.layer.draw(&self.data, ctx, &mut self.canvas);
        Ok(self.data.len())
    }
}

/// The layer variants a panel can hold.
#[derive(Debug)]
pub enum PanelLayer {
    Positions(LayerSlot<PositionsLayer>),
    RecombinationRate(LayerSlot<RecombinationRateLayer>),
    Genes(LayerSlot<GenesLayer>),
}

impl From<PositionsLayer> for PanelLayer {
    fn from(layer: PositionsLayer) -> Self {
        PanelLayer::Positions(LayerSlot::new(layer))
    }
}

impl From<RecombinationRateLayer> for PanelLayer {
    fn from(layer: RecombinationRateLayer) -> Self {
        PanelLayer::RecombinationRate(LayerSlot::new(layer))
    }
}

impl From<GenesLayer> for PanelLayer {
    fn from(layer: GenesLayer) -> Self {
        PanelLayer::Genes(LayerSlot::new(layer))
    }
}

impl PanelLayer {
    pub fn id(&self) -> &str {
        match self {
            PanelLayer::Positions(slot) => slot.layer().id(),
            PanelLayer::RecombinationRate(slot) => slot.layer().id(),
            PanelLayer::Genes(slot) => slot.layer().id(),
        }
    }

    pub fn fields(&self) -> Vec<String> {
        match self {
            PanelLayer::Positions(slot) => slot.layer().fields(),
            PanelLayer::RecombinationRate(slot) => slot.layer().fields(),
            PanelLayer::Genes(slot) => slot.layer().fields(),
        }
    }

    pub fn ingest(&mut self, body: Vec<serde_json::Value>) -> Result<usize, LocusError> {
        match self {
            PanelLayer::Positions(slot) => slot.ingest(body),
            PanelLayer::RecombinationRate(slot) => slot.ingest(body),
            PanelLayer::Genes(slot) => slot.ingest(body),
        }
    }

    pub fn discard_staged(&mut self) {
        match self {
            PanelLayer::Positions(slot) => slot.discard_staged(),
            PanelLayer::RecombinationRate(slot) => slot.discard_staged(),
            PanelLayer::Genes(slot) => slot.discard_staged(),
        }
    }

    pub fn y_extent(&self) -> Option<(f64, f64)> {
        match self {
            PanelLayer::Positions(slot) => slot.y_extent(),
            PanelLayer::RecombinationRate(slot) => slot.y_extent(),
            PanelLayer::Genes(slot) => slot.y_extent(),
        }
    }

    pub fn layout_and_draw(&mut self, ctx: &PanelContext) -> Result<usize, LayoutError> {
        match self {
            PanelLayer::Positions(slot) => slot.layout_and_draw(ctx),
            PanelLayer::RecombinationRate(slot) => slot.layout_and_draw(ctx),
            PanelLayer::Genes(slot) => slot.layout_and_draw(ctx),
        }
    }

    pub fn canvas(&self) -> &CommandCanvas {
        match self {
            PanelLayer::Positions(slot) => slot.canvas(),
            PanelLayer::RecombinationRate(slot) => slot.canvas(),
            PanelLayer::Genes(slot) => slot.canvas(),
        }
    }

    pub fn as_genes(&self) -> Option<&LayerSlot<GenesLayer>> {
        match self {
            PanelLayer::Genes(slot) => Some(slot),
            _ => None,
        }
    }
}
