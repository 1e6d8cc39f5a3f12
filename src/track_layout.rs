//! Gene track packing.
//!
//! Every gene gets a pixel *display range*: its genomic interval clipped to
//! the visible window, projected through the x scale and widened to a minimum
//! width so the label fits. Genes are then dealt onto numbered tracks (lanes)
//! in input order, each one onto the lowest track where its display range does
//! not collide with a gene already placed there.
//!
//! The input order is the processing order. Nothing is sorted, so the result is
//! reproducible for a given order but not a globally minimal packing.

use crate::error::LayoutError;
use crate::scale::Scale;
use locustrack_protocol::{DisplayDomain, DisplayRange, Gene, GenePlacement, TextAnchor};
use std::collections::BTreeMap;

/// Visible genomic window, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: u64,
    pub end: u64,
}

impl Window {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }
}

/// Track number → indices of the genes placed on it, in placement order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackIndex {
    tracks: BTreeMap<usize, Vec<usize>>,
}

impl TrackIndex {
    fn place(&mut self, track: usize, gene: usize) {
        self.tracks.entry(track).or_default().push(gene);
    }

    pub fn genes_on(&self, track: usize) -> &[usize] {
        self.tracks.get(&track).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.tracks.iter().map(|(track, genes)| (*track, genes.as_slice()))
    }
}

/// Result of one packing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackLayout {
    tracks: usize,
    index: TrackIndex,
}

impl Default for TrackLayout {
    fn default() -> Self {
        Self {
            tracks: 1,
            index: TrackIndex::default(),
        }
    }
}

impl TrackLayout {
    /// Number of tracks in use; at least 1.
    #[inline(always)]
    pub fn tracks(&self) -> usize {
        self.tracks
    }

    #[inline(always)]
    pub fn index(&self) -> &TrackIndex {
        &self.index
    }
}

/// Pixel range a gene occupies once the minimum width is enforced.
///
/// Too-narrow ranges are widened to exactly `min_width`. A gene cut off on
/// the left keeps its clipped start and anchors its label at `start`, one cut
/// off on the right keeps its clipped end and anchors at `end`. A gene inside
/// the window grows around its midpoint unless that would cross a window edge,
/// in which case it is pinned to that edge.
pub fn display_range<S: Scale + ?Sized>(
    gene: &Gene,
    scale: &S,
    window: Window,
    min_width: f64,
) -> DisplayRange {
    let mut start = scale.forward(gene.start.max(window.start) as f64);
    let mut end = scale.forward(gene.end.min(window.end) as f64);
    let mut width = end - start;
    let mut text_anchor = TextAnchor::Middle;
    if width < min_width {
        if gene.start < window.start {
            end = start + min_width;
            text_anchor = TextAnchor::Start;
        } else if gene.end > window.end {
            start = end - min_width;
            text_anchor = TextAnchor::End;
        } else {
            let centered_margin = (min_width - width) / 2.0;
            let window_left = scale.forward(window.start as f64);
            let window_right = scale.forward(window.end as f64);
            if start - centered_margin < window_left {
                start = window_left;
                end = start + min_width;
                text_anchor = TextAnchor::Start;
            } else if end + centered_margin > window_right {
                end = window_right;
                start = end - min_width;
                text_anchor = TextAnchor::End;
            } else {
                start -= centered_margin;
                end += centered_margin;
            }
        }
        width = end - start;
    }
    DisplayRange {
        start,
        end,
        width,
        text_anchor,
    }
}

/// Two ranges collide when their union is narrower than their summed widths.
/// Ranges that merely touch do not collide.
#[inline(always)]
pub fn collides(a: &DisplayRange, b: &DisplayRange) -> bool {
    let min_start = a.start.min(b.start);
    let max_end = a.end.max(b.end);
    (max_end - min_start) < (a.width + b.width)
}

fn check_finite(what: &str, value: f64) -> Result<f64, LayoutError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LayoutError::NonFinite {
            what: what.to_string(),
        })
    }
}

/// Assigns every gene a track and display range, writing `placement` in place.
///
/// On error no gene is modified.
pub fn pack_gene_tracks<S: Scale + ?Sized>(
    genes: &mut [Gene],
    scale: &S,
    window: Window,
    min_width: f64,
) -> Result<TrackLayout, LayoutError> {
    if window.end <= window.start {
        return Err(LayoutError::EmptyWindow {
            start: window.start as f64,
            end: window.end as f64,
        });
    }
    if !min_width.is_finite() || min_width < 0.0 {
        return Err(LayoutError::InvalidMinWidth(min_width));
    }
    let window_left = check_finite("window start", scale.forward(window.start as f64))?;
    let window_right = check_finite("window end", scale.forward(window.end as f64))?;
    if window_left == window_right {
        return Err(LayoutError::DegenerateScale);
    }

    let mut layout = TrackLayout::default();
    let mut placements: Vec<GenePlacement> = Vec::with_capacity(genes.len());
    for (idx, gene) in genes.iter().enumerate() {
        let range = display_range(gene, scale, window, min_width);
        check_finite(&gene.gene_name, range.start)?;
        check_finite(&gene.gene_name, range.end)?;

        let mut track = 1;
        while layout
            .index
            .genes_on(track)
            .iter()
            .any(|&placed| collides(&placements[placed].display_range, &range))
        {
            track += 1;
            if track > layout.tracks {
                layout.tracks = track;
            }
        }
        layout.index.place(track, idx);

        let domain_start = check_finite(&gene.gene_name, scale.invert(range.start))?;
        let domain_end = check_finite(&gene.gene_name, scale.invert(range.end))?;
        placements.push(GenePlacement {
            track,
            display_range: range,
            display_domain: DisplayDomain {
                start: domain_start,
                end: domain_end,
                width: domain_end - domain_start,
            },
        });
    }

    for (gene, placement) in genes.iter_mut().zip(placements) {
        gene.placement = Some(placement);
    }
    Ok(layout)
}
