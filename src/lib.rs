pub mod color_scale;
pub mod config;
pub mod data_layer;
pub mod data_source;
pub mod error;
pub mod layer_genes;
pub mod layer_positions;
pub mod layer_recombination;
pub mod panel;
pub mod plot;
pub mod render_export;
pub mod scale;
pub mod source_http;
pub mod source_memory;
pub mod track_layout;

pub use color_scale::{ColorScale, bucket};
pub use config::PlotConfig;
pub use data_source::{DataSource, FetchResponse};
pub use error::{FetchError, LayoutError, LocusError, Result};
pub use locustrack_protocol::{Gene, LocusState};
pub use plot::{LayerStatus, LocusPlot, RefreshReport};
pub use scale::{LinearScale, Scale};
pub use track_layout::{TrackLayout, Window, pack_gene_tracks};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version string shown by the CLI, including the build number when known.
pub fn display_version() -> &'static str {
    option_env!("LOCUSTRACK_DISPLAY_VERSION").unwrap_or(VERSION)
}
