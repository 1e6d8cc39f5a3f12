use crate::config::RecombinationSettings;
use crate::data_layer::{DataLayer, PanelContext};
use crate::scale::Scale;
use itertools::Itertools;
use locustrack_protocol::{DrawCommand, RecombinationPoint};
use locustrack_render::Canvas;

pub const RECOMBINATION_LAYER_ID: &str = "recombination_rate";

/// Lower bound of the recombination axis, in cM/Mb.
const MIN_RATE_AXIS: f64 = 100.0;

/// Recombination rate curve along the region, drawn against the second y axis.
#[derive(Debug, Clone)]
pub struct RecombinationRateLayer {
    stroke: String,
    stroke_width: f64,
}

impl RecombinationRateLayer {
    pub fn new(settings: &RecombinationSettings) -> Self {
        Self {
            stroke: settings.stroke.clone(),
            stroke_width: settings.stroke_width,
        }
    }
}

impl Default for RecombinationRateLayer {
    fn default() -> Self {
        Self::new(&RecombinationSettings::default())
    }
}

impl DataLayer for RecombinationRateLayer {
    type Record = RecombinationPoint;

    fn id(&self) -> &str {
        RECOMBINATION_LAYER_ID
    }

    fn fields(&self) -> Vec<String> {
        vec!["recomb:position".to_string(), "recomb:recomb_rate".to_string()]
    }

    fn draw(&self, records: &[RecombinationPoint], ctx: &PanelContext, canvas: &mut dyn Canvas) {
        let Some(y_scale) = ctx.y_scale else {
            tracing::warn!("recombination layer is not attached to a y axis; nothing drawn");
            return;
        };
        if records.len() < 2 {
            return;
        }
        let points = records
            .iter()
            .filter(|d| d.recomb_rate.is_finite())
            .sorted_by_key(|d| d.position)
            .map(|d| {
                (
                    ctx.x_scale.forward(d.position as f64),
                    y_scale.forward(d.recomb_rate),
                )
            })
            .collect();
        canvas.draw(DrawCommand::Path {
            class: "recombination_rate".to_string(),
            points,
            stroke: self.stroke.clone(),
            stroke_width: self.stroke_width,
        });
    }

    fn y_extent(&self, records: &[RecombinationPoint]) -> Option<(f64, f64)> {
        let max = records
            .iter()
            .map(|d| d.recomb_rate)
            .filter(|r| r.is_finite())
            .fold(MIN_RATE_AXIS, f64::max);
        Some((0.0, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::LinearScale;
    use crate::track_layout::Window;
    use locustrack_render::CommandCanvas;

    fn ctx() -> PanelContext {
        PanelContext {
            window: Window::new(0, 1000),
            x_scale: LinearScale::new((0.0, 1000.0), (0.0, 500.0)).unwrap(),
            y_scale: Some(LinearScale::new((0.0, 100.0), (100.0, 0.0)).unwrap()),
        }
    }

    #[test]
    fn test_curve_is_sorted_by_position() {
        let layer = RecombinationRateLayer::default();
        let records = vec![
            RecombinationPoint { position: 800, recomb_rate: 10.0 },
            RecombinationPoint { position: 200, recomb_rate: 50.0 },
            RecombinationPoint { position: 400, recomb_rate: 0.0 },
        ];
        let mut canvas = CommandCanvas::new();
        layer.draw(&records, &ctx(), &mut canvas);
        match &canvas.commands()[0] {
            DrawCommand::Path { points, stroke, .. } => {
                assert_eq!(points, &vec![(100.0, 50.0), (200.0, 100.0), (400.0, 90.0)]);
                assert_eq!(stroke, "#0000FF");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_extent_has_floor() {
        let layer = RecombinationRateLayer::default();
        let low = vec![RecombinationPoint { position: 1, recomb_rate: 3.0 }];
        assert_eq!(layer.y_extent(&low), Some((0.0, 100.0)));
        let high = vec![RecombinationPoint { position: 1, recomb_rate: 180.0 }];
        assert_eq!(layer.y_extent(&high), Some((0.0, 180.0)));
    }

    #[test]
    fn test_single_point_draws_nothing() {
        let layer = RecombinationRateLayer::default();
        let mut canvas = CommandCanvas::new();
        layer.draw(
            &[RecombinationPoint { position: 1, recomb_rate: 3.0 }],
            &ctx(),
            &mut canvas,
        );
        assert!(canvas.is_empty());
    }
}
