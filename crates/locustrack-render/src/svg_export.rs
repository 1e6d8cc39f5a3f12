use locustrack_protocol::DrawCommand;
use svg::Document;
use svg::node::Node;
use svg::node::element::path::Data;
use svg::node::element::{Circle, ClipPath, Group, Path, Rectangle, Text, Title};

/// Drawable region of a panel, relative to the document origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Everything needed to place one layer's commands into a document.
#[derive(Debug, Clone, Copy)]
pub struct LayerGroup<'a> {
    pub base_id: &'a str,
    pub clip: ClipArea,
    pub commands: &'a [DrawCommand],
}

pub fn command_node(command: &DrawCommand) -> Box<dyn Node> {
    match command {
        DrawCommand::Rect {
            id,
            class,
            x,
            y,
            width,
            height,
            fill,
            title,
        } => {
            let mut rect = Rectangle::new()
                .set("class", class.as_str())
                .set("x", *x)
                .set("y", *y)
                .set("width", *width)
                .set("height", *height)
                .set("fill", fill.as_str());
            if let Some(id) = id {
                rect = rect.set("id", id.as_str());
            }
            if let Some(title) = title {
                rect = rect.add(Title::new(title.as_str()));
            }
            Box::new(rect)
        }
        DrawCommand::Circle {
            id,
            class,
            cx,
            cy,
            r,
            fill,
            title,
        } => {
            let mut circle = Circle::new()
                .set("class", class.as_str())
                .set("cx", *cx)
                .set("cy", *cy)
                .set("r", *r)
                .set("fill", fill.as_str());
            if let Some(id) = id {
                circle = circle.set("id", id.as_str());
            }
            if let Some(title) = title {
                circle = circle.add(Title::new(title.as_str()));
            }
            Box::new(circle)
        }
        DrawCommand::Text {
            class,
            x,
            y,
            anchor,
            content,
        } => Box::new(
            Text::new(content.as_str())
                .set("class", class.as_str())
                .set("x", *x)
                .set("y", *y)
                .set("text-anchor", anchor.as_str())
                .set("font-family", "sans-serif")
                .set("font-size", 12),
        ),
        DrawCommand::Path {
            class,
            points,
            stroke,
            stroke_width,
        } => {
            let mut data = Data::new();
            for (idx, (x, y)) in points.iter().enumerate() {
                let point = (*x as f32, *y as f32);
                data = if idx == 0 {
                    data.move_to(point)
                } else {
                    data.line_to(point)
                };
            }
            Box::new(
                Path::new()
                    .set("class", class.as_str())
                    .set("d", data)
                    .set("fill", "none")
                    .set("stroke", stroke.as_str())
                    .set("stroke-width", *stroke_width),
            )
        }
    }
}

/// Container group for one layer: translated to the clip origin, with its own
/// clip path and an inner group holding the drawn elements.
pub fn layer_group(layer: &LayerGroup) -> Group {
    let clip_id = format!("{}.clip", layer.base_id);
    let clip = ClipPath::new().set("id", clip_id.as_str()).add(
        Rectangle::new()
            .set("width", layer.clip.width)
            .set("height", layer.clip.height),
    );
    let mut inner = Group::new()
        .set("id", format!("{}.data_layer", layer.base_id))
        .set("clip-path", format!("url(#{clip_id})"));
    for command in layer.commands {
        inner = inner.add(command_node(command));
    }
    Group::new()
        .set("id", format!("{}.data_layer_container", layer.base_id))
        .set(
            "transform",
            format!("translate({},{})", layer.clip.x, layer.clip.y),
        )
        .add(clip)
        .add(inner)
}

pub fn document(width: f64, height: f64, groups: Vec<Group>) -> Document {
    let mut doc = Document::new()
        .set("viewBox", (0, 0, width, height))
        .set("width", width)
        .set("height", height)
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", width)
                .set("height", height)
                .set("fill", "#ffffff"),
        );
    for group in groups {
        doc = doc.add(group);
    }
    doc
}
