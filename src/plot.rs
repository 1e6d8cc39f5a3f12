//! The plot: panels, the data source, and the refresh cycle.
//!
//! A refresh runs in three steps so that fetching can happen without holding
//! the plot mutably: [`LocusPlot::begin_refresh`] hands out a ticket carrying
//! a new generation, [`LocusPlot::fetch`] collects records for every layer,
//! and [`LocusPlot::complete_refresh`] applies them, unless a newer ticket
//! was issued in the meantime.

use crate::config::PlotConfig;
use crate::data_layer::PanelLayer;
use crate::data_source::{DataSource, FetchResponse};
use crate::error::{FetchError, LocusError, Result};
use crate::layer_genes::GenesLayer;
use crate::layer_positions::PositionsLayer;
use crate::layer_recombination::RecombinationRateLayer;
use crate::panel::Panel;
use crate::render_export::export_plot_svg;
use crate::track_layout::Window;
use locustrack_protocol::{Gene, LocusState};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const POSITIONS_PANEL_ID: &str = "positions";
pub const GENES_PANEL_ID: &str = "genes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
    state: LocusState,
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> &LocusState {
        &self.state
    }
}

#[derive(Debug)]
pub struct LayerFetch {
    pub panel: String,
    pub layer: String,
    pub result: std::result::Result<FetchResponse, FetchError>,
}

/// Fetched records of one refresh, not yet applied to the plot.
#[derive(Debug)]
pub struct FetchBatch {
    ticket: RefreshTicket,
    fetches: Vec<LayerFetch>,
}

impl FetchBatch {
    pub fn ticket(&self) -> &RefreshTicket {
        &self.ticket
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LayerStatus {
    Drawn { records: usize },
    FetchFailed { message: String },
    DecodeFailed { message: String },
    LayoutFailed { message: String },
    /// A newer refresh started before this one completed.
    Stale,
}

impl LayerStatus {
    pub fn is_drawn(&self) -> bool {
        matches!(self, LayerStatus::Drawn { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerOutcome {
    pub panel: String,
    pub layer: String,
    #[serde(flatten)]
    pub status: LayerStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshReport {
    pub generation: u64,
    pub outcomes: Vec<LayerOutcome>,
}

impl RefreshReport {
    pub fn all_drawn(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_drawn())
    }

    pub fn outcome(&self, panel: &str, layer: &str) -> Option<&LayerStatus> {
        self.outcomes
            .iter()
            .find(|o| o.panel == panel && o.layer == layer)
            .map(|o| &o.status)
    }
}

pub struct LocusPlot {
    id: String,
    state: LocusState,
    width: f64,
    height: f64,
    panels: Vec<Panel>,
    source: Box<dyn DataSource>,
    generation: u64,
}

impl std::fmt::Debug for LocusPlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocusPlot")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("panels", &self.panels)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl LocusPlot {
    pub fn new(id: impl Into<String>, width: f64, height: f64, source: Box<dyn DataSource>) -> Self {
        Self {
            id: id.into(),
            state: LocusState::default(),
            width,
            height,
            panels: vec![],
            source,
            generation: 0,
        }
    }

    /// Association positions with the recombination rate on a second axis,
    /// above the gene track panel.
    pub fn standard(id: impl Into<String>, config: &PlotConfig, source: Box<dyn DataSource>) -> Result<Self> {
        config.validate()?;
        let mut plot = Self::new(id, config.width, config.height(), source);

        let mut positions = Panel::new(
            POSITIONS_PANEL_ID,
            (0.0, 0.0),
            config.width,
            config.positions_panel_height,
            config.margin,
        );
        positions
            .add_layer(PositionsLayer::new(&config.positions))?
            .add_layer(RecombinationRateLayer::new(&config.recombination))?
            .attach_to_y_axis(crate::layer_positions::POSITIONS_LAYER_ID, 1)?
            .attach_to_y_axis(crate::layer_recombination::RECOMBINATION_LAYER_ID, 2)?;
        plot.add_panel(positions)?;

        let mut genes = Panel::new(
            GENES_PANEL_ID,
            (0.0, config.positions_panel_height),
            config.width,
            config.genes_panel_height,
            config.margin,
        );
        genes.add_layer(GenesLayer::new(&config.genes))?;
        plot.add_panel(genes)?;
        Ok(plot)
    }

    pub fn add_panel(&mut self, panel: Panel) -> Result<&mut Self> {
        if self.panel(panel.id()).is_some() {
            return Err(LocusError::Config(format!(
                "plot '{}' already has a panel '{}'",
                self.id,
                panel.id()
            )));
        }
        self.panels.push(panel);
        Ok(self)
    }

    #[inline(always)]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &LocusState {
        &self.state
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, panel_id: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.id() == panel_id)
    }

    pub fn panel_mut(&mut self, panel_id: &str) -> Option<&mut Panel> {
        self.panels.iter_mut().find(|p| p.id() == panel_id)
    }

    /// Element id prefix of a layer: `plot.panel.layer`.
    pub fn layer_base_id(&self, panel_id: &str, layer_id: &str) -> String {
        format!("{}.{}.{}", self.id, panel_id, layer_id)
    }

    /// Records of the first gene layer, as of its last successful refresh.
    pub fn genes(&self) -> Arc<Vec<Gene>> {
        self.panels
            .iter()
            .flat_map(|p| p.layers())
            .find_map(PanelLayer::as_genes)
            .map(|slot| slot.snapshot())
            .unwrap_or_default()
    }

    pub fn gene_tracks(&self) -> usize {
        self.panels
            .iter()
            .flat_map(|p| p.layers())
            .find_map(PanelLayer::as_genes)
            .map(|slot| slot.layer().tracks())
            .unwrap_or(0)
    }

    pub fn begin_refresh(&mut self, state: LocusState) -> RefreshTicket {
        self.generation += 1;
        tracing::info!(
            "refresh {} requested for {}:{}-{}",
            self.generation,
            state.chr,
            state.start,
            state.end
        );
        RefreshTicket {
            generation: self.generation,
            state,
        }
    }

    /// Fetches the fields of every layer. Requests run in parallel.
    pub fn fetch(&self, ticket: &RefreshTicket) -> FetchBatch {
        let requests: Vec<(String, String, Vec<String>)> = self
            .panels
            .iter()
            .flat_map(|panel| {
                panel
                    .layers()
                    .iter()
                    .map(|layer| (panel.id().to_string(), layer.id().to_string(), layer.fields()))
            })
            .collect();
        let source = self.source.as_ref();
        let state = &ticket.state;
        let fetches = requests
            .into_par_iter()
            .map(|(panel, layer, fields)| LayerFetch {
                result: source.fetch(state, &fields),
                panel,
                layer,
            })
            .collect();
        FetchBatch {
            ticket: ticket.clone(),
            fetches,
        }
    }

    /// Applies a fetched batch. Each layer publishes its new records and
    /// drawing only if decoding, scale building and layout all succeed for
    /// it; otherwise it keeps what it showed before.
    pub fn complete_refresh(&mut self, batch: FetchBatch) -> RefreshReport {
        let generation = batch.ticket.generation;
        if generation != self.generation {
            tracing::warn!(
                "dropping refresh {generation}: refresh {} is newer",
                self.generation
            );
            return RefreshReport {
                generation,
                outcomes: batch
                    .fetches
                    .into_iter()
                    .map(|f| LayerOutcome {
                        panel: f.panel,
                        layer: f.layer,
                        status: LayerStatus::Stale,
                    })
                    .collect(),
            };
        }

        let state = batch.ticket.state;
        let window = Window::new(state.start, state.end);
        let mut outcomes = vec![];
        let mut fetches = batch.fetches;

        for panel in self.panels.iter_mut() {
            let panel_id = panel.id().to_string();
            let mut pending: Vec<(String, Option<LayerStatus>)> = vec![];

            for layer in panel.layers_mut() {
                let layer_id = layer.id().to_string();
                let position = fetches
                    .iter()
                    .position(|f| f.panel == panel_id && f.layer == layer_id);
                let status = match position.map(|idx| fetches.swap_remove(idx).result) {
                    None => Some(LayerStatus::FetchFailed {
                        message: "layer was not part of the fetch".to_string(),
                    }),
                    Some(Err(e)) => {
                        tracing::warn!("{panel_id}.{layer_id}: fetch failed: {e}");
                        Some(LayerStatus::FetchFailed {
                            message: e.to_string(),
                        })
                    }
                    Some(Ok(response)) => match layer.ingest(response.body) {
                        Ok(_) => None,
                        Err(e) => {
                            tracing::warn!("{panel_id}.{layer_id}: {e}");
                            Some(LayerStatus::DecodeFailed {
                                message: e.to_string(),
                            })
                        }
                    },
                };
                pending.push((layer_id, status));
            }

            if let Err(e) = panel.rebuild_scales(window) {
                tracing::warn!("{panel_id}: cannot build scales: {e}");
                for layer in panel.layers_mut() {
                    layer.discard_staged();
                }
                for (layer_id, status) in pending {
                    outcomes.push(LayerOutcome {
                        panel: panel_id.clone(),
                        layer: layer_id,
                        status: status.unwrap_or_else(|| LayerStatus::LayoutFailed {
                            message: e.to_string(),
                        }),
                    });
                }
                continue;
            }

            for (layer_id, status) in pending {
                let status = match status {
                    Some(failed) => failed,
                    None => layout_layer(panel, &layer_id),
                };
                outcomes.push(LayerOutcome {
                    panel: panel_id.clone(),
                    layer: layer_id,
                    status,
                });
            }
        }

        let drawn = outcomes.iter().filter(|o| o.status.is_drawn()).count();
        // The region only moves once something shows it.
        if drawn > 0 {
            self.state = state;
        }
        tracing::info!(
            "refresh {generation} finished: {drawn}/{} layers drawn",
            outcomes.len()
        );
        RefreshReport {
            generation,
            outcomes,
        }
    }

    pub fn refresh(&mut self, state: LocusState) -> RefreshReport {
        let ticket = self.begin_refresh(state);
        let batch = self.fetch(&ticket);
        self.complete_refresh(batch)
    }

    pub fn render_svg(&self) -> String {
        export_plot_svg(self)
    }
}

fn layout_layer(panel: &mut Panel, layer_id: &str) -> LayerStatus {
    let panel_id = panel.id().to_string();
    let Some(ctx) = panel.context_for(layer_id) else {
        return LayerStatus::LayoutFailed {
            message: "panel has no scales".to_string(),
        };
    };
    let Some(layer) = panel.layers_mut().iter_mut().find(|l| l.id() == layer_id) else {
        return LayerStatus::LayoutFailed {
            message: format!("no layer '{layer_id}'"),
        };
    };
    match layer.layout_and_draw(&ctx) {
        Ok(records) => LayerStatus::Drawn { records },
        Err(e) => {
            tracing::warn!("{panel_id}.{layer_id}: layout failed: {e}");
            layer.discard_staged();
            LayerStatus::LayoutFailed {
                message: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_memory::MemorySource;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FlakySource {
        inner: MemorySource,
        failing: Arc<AtomicBool>,
    }

    impl DataSource for FlakySource {
        fn fetch(&self, state: &LocusState, fields: &[String]) -> std::result::Result<FetchResponse, FetchError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(FetchError::Status {
                    status: 503,
                    url: "memory://".to_string(),
                });
            }
            self.inner.fetch(state, fields)
        }
    }

    fn memory() -> MemorySource {
        MemorySource::from_json_value(json!({
            "base": [
                {"id": "rs1", "position": 1_200, "pvalue": 1e-8},
                {"id": "rs2", "position": 1_500, "pvalue": 0.003},
                {"id": "rs3", "position": 4_000, "pvalue": 0.5}
            ],
            "ld": [
                {"id": "rs1", "best": 1.0},
                {"id": "rs2", "best": 0.45}
            ],
            "recomb": [
                {"position": 1_000, "recomb_rate": 2.0},
                {"position": 2_000, "recomb_rate": 40.0},
                {"position": 3_000, "recomb_rate": 5.0}
            ],
            "gene": [
                {"gene_name": "AAA", "start": 1_000, "end": 1_800, "strand": "+",
                 "transcripts": [{"transcript_id": "AAA-001", "exons": [
                    {"exon_id": "AAA-e1", "start": 1_000, "end": 1_100},
                    {"exon_id": "AAA-e2", "start": 1_700, "end": 1_800}]}]},
                {"gene_name": "BBB", "start": 1_500, "end": 2_500, "strand": "-"},
                {"gene_name": "CCC", "start": 3_500, "end": 3_900, "strand": "+"}
            ]
        }))
        .unwrap()
    }

    fn plot() -> (LocusPlot, Arc<AtomicBool>) {
        let failing = Arc::new(AtomicBool::new(false));
        let source = FlakySource {
            inner: memory(),
            failing: Arc::clone(&failing),
        };
        let plot = LocusPlot::standard("plot", &PlotConfig::default(), Box::new(source)).unwrap();
        (plot, failing)
    }

    fn canvases(plot: &LocusPlot) -> Vec<locustrack_render::CommandCanvas> {
        plot.panels()
            .iter()
            .flat_map(|p| p.layers())
            .map(|l| l.canvas().clone())
            .collect()
    }

    #[test]
    fn test_standard_layout() {
        let (plot, _) = plot();
        let ids: Vec<&str> = plot.panels().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["positions", "genes"]);
        assert_eq!(plot.size(), (800.0, 450.0));
        assert_eq!(plot.layer_base_id("genes", "genes"), "plot.genes.genes");
        assert_eq!(plot.gene_tracks(), 1);
    }

    #[test]
    fn test_refresh_draws_every_layer() {
        let (mut plot, _) = plot();
        let report = plot.refresh(LocusState::new("1", 1_000, 5_000));
        assert!(report.all_drawn(), "{report:?}");
        assert_eq!(
            report.outcome("positions", "positions"),
            Some(&LayerStatus::Drawn { records: 3 })
        );
        assert_eq!(plot.genes().len(), 3);
        assert_eq!(plot.gene_tracks(), 2);
        assert_eq!(plot.genes()[1].track(), Some(2));
        assert_eq!(plot.state(), &LocusState::new("1", 1_000, 5_000));
    }

    #[test]
    fn test_stale_batch_changes_nothing() {
        let (mut plot, _) = plot();
        let old = plot.begin_refresh(LocusState::new("1", 1_000, 5_000));
        let new = plot.begin_refresh(LocusState::new("1", 3_000, 4_500));
        let old_batch = plot.fetch(&old);
        let new_batch = plot.fetch(&new);

        assert!(plot.complete_refresh(new_batch).all_drawn());
        let drawn = canvases(&plot);
        let report = plot.complete_refresh(old_batch);
        assert!(report.outcomes.iter().all(|o| o.status == LayerStatus::Stale));
        assert_eq!(canvases(&plot), drawn);
        assert_eq!(plot.state().start, 3_000);
        assert_eq!(plot.genes().len(), 1);
    }

    #[test]
    fn test_failed_fetch_keeps_last_good_state() {
        let (mut plot, failing) = plot();
        assert!(plot.refresh(LocusState::new("1", 1_000, 5_000)).all_drawn());
        let drawn = canvases(&plot);

        failing.store(true, Ordering::SeqCst);
        let report = plot.refresh(LocusState::new("1", 3_000, 4_500));
        assert!(report.outcomes.iter().all(|o| matches!(o.status, LayerStatus::FetchFailed { .. })));
        assert_eq!(canvases(&plot), drawn);
        assert_eq!(plot.genes().len(), 3);
    }

    #[test]
    fn test_empty_window_keeps_drawing() {
        let (mut plot, _) = plot();
        assert!(plot.refresh(LocusState::new("1", 1_000, 5_000)).all_drawn());
        let drawn = canvases(&plot);
        let tracks = plot.gene_tracks();

        let report = plot.refresh(LocusState::new("1", 1_500, 1_500));
        assert!(report.outcomes.iter().all(|o| matches!(o.status, LayerStatus::LayoutFailed { .. })));
        assert_eq!(canvases(&plot), drawn);
        assert_eq!(plot.gene_tracks(), tracks);
        assert_eq!(plot.genes().len(), 3);
    }

    #[test]
    fn test_failed_refresh_keeps_region_and_caption() {
        let (mut plot, failing) = plot();
        assert!(plot.refresh(LocusState::new("1", 1_000, 5_000)).all_drawn());

        let report = plot.refresh(LocusState::new("1", 1_500, 1_500));
        assert!(!report.outcomes.iter().any(|o| o.status.is_drawn()));
        assert_eq!(plot.state(), &LocusState::new("1", 1_000, 5_000));
        let svg = plot.render_svg();
        assert!(svg.contains("chr1:1000-5000"));
        assert!(!svg.contains("chr1:1500-1500"));

        failing.store(true, Ordering::SeqCst);
        plot.refresh(LocusState::new("1", 3_000, 4_500));
        assert_eq!(plot.state(), &LocusState::new("1", 1_000, 5_000));
    }

    #[test]
    fn test_decode_failure_is_per_layer() {
        let mut source = memory();
        source.insert(
            "gene",
            vec![json!({"gene_name": "BAD", "start": "x", "end": 10})
                .as_object()
                .cloned()
                .unwrap()],
        );
        let mut plot = LocusPlot::standard("plot", &PlotConfig::default(), Box::new(source)).unwrap();
        let report = plot.refresh(LocusState::new("1", 0, 5_000));
        assert!(matches!(
            report.outcome("genes", "genes"),
            Some(LayerStatus::DecodeFailed { .. })
        ));
        assert!(report.outcome("positions", "positions").unwrap().is_drawn());
        assert!(plot.genes().is_empty());
    }

    #[test]
    fn test_report_serializes_with_status_tag() {
        let report = RefreshReport {
            generation: 3,
            outcomes: vec![LayerOutcome {
                panel: "genes".to_string(),
                layer: "genes".to_string(),
                status: LayerStatus::Drawn { records: 2 },
            }],
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            json!({"generation": 3, "outcomes": [
                {"panel": "genes", "layer": "genes", "status": "drawn", "records": 2}
            ]})
        );
    }
}
