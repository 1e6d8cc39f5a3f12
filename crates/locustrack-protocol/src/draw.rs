use crate::layout::TextAnchor;
use serde::{Deserialize, Serialize};

/// A primitive a layer asks the canvas to draw, in clip-area pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    Rect {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        class: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Circle {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        class: String,
        cx: f64,
        cy: f64,
        r: f64,
        fill: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Text {
        class: String,
        x: f64,
        y: f64,
        anchor: TextAnchor,
        content: String,
    },
    /// Open polyline through `points`.
    Path {
        class: String,
        points: Vec<(f64, f64)>,
        stroke: String,
        stroke_width: f64,
    },
}

impl DrawCommand {
    pub fn class(&self) -> &str {
        match self {
            DrawCommand::Rect { class, .. }
            | DrawCommand::Circle { class, .. }
            | DrawCommand::Text { class, .. }
            | DrawCommand::Path { class, .. } => class,
        }
    }
}
