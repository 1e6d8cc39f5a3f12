//! Shared, serde-serializable contracts between the LocusTrack layers, the
//! renderer and external data sources.

pub mod draw;
pub mod layout;
pub mod records;
pub mod state;

pub use draw::DrawCommand;
pub use layout::{DisplayDomain, DisplayRange, GenePlacement, TextAnchor};
pub use records::{Exon, Gene, Position, RecombinationPoint, Strand, Transcript};
pub use state::LocusState;
