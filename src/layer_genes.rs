use crate::config::GenesSettings;
use crate::data_layer::{DataLayer, PanelContext};
use crate::error::LayoutError;
use crate::scale::Scale;
use crate::track_layout::{TrackLayout, pack_gene_tracks};
use locustrack_protocol::{DrawCommand, Exon, Gene, Transcript};
use locustrack_render::Canvas;

pub const GENES_LAYER_ID: &str = "genes";

const BOUNDARY_OFFSET: f64 = 20.0;
const BOUNDARY_HEIGHT: f64 = 3.0;
const LABEL_OFFSET: f64 = 30.0;
const EXON_OFFSET: f64 = 26.0;
const EXON_HEIGHT: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeneRef(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TranscriptRef {
    pub gene: GeneRef,
    pub transcript: usize,
}

impl TranscriptRef {
    pub fn gene(&self) -> GeneRef {
        self.gene
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExonRef {
    pub transcript: TranscriptRef,
    pub exon: usize,
}

impl ExonRef {
    pub fn transcript(&self) -> TranscriptRef {
        self.transcript
    }
}

/// Borrowed view over a gene list that resolves the index references above.
#[derive(Debug, Clone, Copy)]
pub struct GeneArena<'a> {
    genes: &'a [Gene],
}

impl<'a> GeneArena<'a> {
    pub fn new(genes: &'a [Gene]) -> Self {
        Self { genes }
    }

    pub fn gene(&self, r: GeneRef) -> Option<&'a Gene> {
        self.genes.get(r.0)
    }

    pub fn transcript(&self, r: TranscriptRef) -> Option<&'a Transcript> {
        self.gene(r.gene)?.transcripts.get(r.transcript)
    }

    pub fn exon(&self, r: ExonRef) -> Option<&'a Exon> {
        self.transcript(r.transcript)?.exons.get(r.exon)
    }

    pub fn exon_refs(&self, r: TranscriptRef) -> impl Iterator<Item = ExonRef> {
        let count = self.transcript(r).map(|t| t.exons.len()).unwrap_or(0);
        (0..count).map(move |exon| ExonRef { transcript: r, exon })
    }
}

/// Gene models packed onto tracks so that neither genes nor their labels overlap.
#[derive(Debug, Clone)]
pub struct GenesLayer {
    settings: GenesSettings,
    track_layout: TrackLayout,
}

impl GenesLayer {
    pub fn new(settings: &GenesSettings) -> Self {
        Self {
            settings: settings.clone(),
            track_layout: TrackLayout::default(),
        }
    }

    /// Track layout of the last successful layout pass.
    #[inline(always)]
    pub fn track_layout(&self) -> &TrackLayout {
        &self.track_layout
    }

    pub fn tracks(&self) -> usize {
        self.track_layout.tracks()
    }

    /// Pixel height the packed tracks need.
    pub fn content_height(&self) -> f64 {
        self.tracks() as f64 * self.settings.track_height
    }

    fn draw_gene(
        &self,
        arena: GeneArena,
        gene_ref: GeneRef,
        ctx: &PanelContext,
        canvas: &mut dyn Canvas,
    ) {
        let Some(gene) = arena.gene(gene_ref) else {
            return;
        };
        let Some(placement) = gene.placement else {
            return;
        };
        let track_y = placement.track as f64 * self.settings.track_height;
        let x = &ctx.x_scale;

        canvas.draw(DrawCommand::Rect {
            id: Some(gene.gene_name.clone()),
            class: "gene boundary".to_string(),
            x: x.forward(gene.start as f64),
            y: track_y - BOUNDARY_OFFSET,
            width: x.forward(gene.end as f64) - x.forward(gene.start as f64),
            height: BOUNDARY_HEIGHT,
            fill: self.settings.fill.clone(),
            title: Some(gene.gene_name.clone()),
        });

        canvas.draw(DrawCommand::Text {
            class: "gene label".to_string(),
            x: placement.display_range.label_x(),
            y: track_y - LABEL_OFFSET,
            anchor: placement.display_range.text_anchor,
            content: gene.label(),
        });

        // Only the first transcript is drawn.
        let first = TranscriptRef {
            gene: gene_ref,
            transcript: 0,
        };
        for exon_ref in arena.exon_refs(first) {
            let Some(exon) = arena.exon(exon_ref) else {
                continue;
            };
            canvas.draw(DrawCommand::Rect {
                id: Some(exon.exon_id.clone()),
                class: "gene exon".to_string(),
                x: x.forward(exon.start as f64),
                y: track_y - EXON_OFFSET,
                width: x.forward(exon.end as f64) - x.forward(exon.start as f64),
                height: EXON_HEIGHT,
                fill: self.settings.fill.clone(),
                title: None,
            });
        }
    }
}

impl Default for GenesLayer {
    fn default() -> Self {
        Self::new(&GenesSettings::default())
    }
}

impl DataLayer for GenesLayer {
    type Record = Gene;

    fn id(&self) -> &str {
        GENES_LAYER_ID
    }

    fn fields(&self) -> Vec<String> {
        vec!["gene:gene".to_string()]
    }

    fn layout(&mut self, records: &mut [Gene], ctx: &PanelContext) -> Result<(), LayoutError> {
        let layout = pack_gene_tracks(
            records,
            &ctx.x_scale,
            ctx.window,
            self.settings.min_display_range_width,
        )?;
        tracing::debug!(
            "packed {} genes onto {} tracks",
            records.len(),
            layout.tracks()
        );
        self.track_layout = layout;
        Ok(())
    }

    fn draw(&self, records: &[Gene], ctx: &PanelContext, canvas: &mut dyn Canvas) {
        let arena = GeneArena::new(records);
        for idx in 0..records.len() {
            self.draw_gene(arena, GeneRef(idx), ctx, canvas);
        }
    }
}
