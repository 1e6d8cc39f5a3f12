//! Headless drawing surfaces for LocusTrack layers.
//!
//! Layers never talk to SVG directly: they push [`DrawCommand`]s into a
//! [`Canvas`]. The [`CommandCanvas`] keeps the commands of the last successful
//! draw so a panel can be serialized (or left untouched after a failed
//! refresh) at any time.

pub mod svg_export;

pub use locustrack_protocol::DrawCommand;
pub use svg_export::{ClipArea, LayerGroup, command_node, document, layer_group};

/// Draw target of a data layer.
pub trait Canvas {
    /// Drop everything drawn so far.
    fn clear(&mut self);

    fn draw(&mut self, command: DrawCommand);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandCanvas {
    commands: Vec<DrawCommand>,
}

impl CommandCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Commands carrying the given class name.
    pub fn with_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a DrawCommand> {
        self.commands.iter().filter(move |c| c.class() == class)
    }
}

impl Canvas for CommandCanvas {
    fn clear(&mut self) {
        self.commands.clear();
    }

    fn draw(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locustrack_protocol::TextAnchor;

    #[test]
    fn test_clear_drops_previous_commands() {
        let mut canvas = CommandCanvas::new();
        canvas.draw(DrawCommand::Text {
            class: "gene label".to_string(),
            x: 1.0,
            y: 2.0,
            anchor: TextAnchor::Start,
            content: "A".to_string(),
        });
        assert_eq!(canvas.len(), 1);
        assert_eq!(canvas.with_class("gene label").count(), 1);
        canvas.clear();
        assert!(canvas.is_empty());
    }
}
