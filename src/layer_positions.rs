use crate::color_scale::ColorScale;
use crate::config::PositionsSettings;
use crate::data_layer::{DataLayer, PanelContext};
use crate::scale::Scale;
use locustrack_protocol::{DrawCommand, Position};
use locustrack_render::Canvas;
use rayon::prelude::*;
use serde_json::Value;

pub const POSITIONS_LAYER_ID: &str = "positions";

/// Numeric reading of a loosely typed source value. Numeric strings parse,
/// the empty string counts as 0, booleans as 1/0; anything else is missing.
pub fn numeric_value(value: Option<&Value>) -> Option<f64> {
    let ret = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    ret.filter(|v| !v.is_nan())
}

/// Association results: one circle per variant at (position, -log10 p),
/// colored by LD with the lead variant.
#[derive(Debug, Clone)]
pub struct PositionsLayer {
    radius: f64,
    colors: ColorScale,
}

impl PositionsLayer {
    pub fn new(settings: &PositionsSettings) -> Self {
        Self {
            radius: settings.radius,
            colors: settings.ld_colors.clone(),
        }
    }

    pub fn fill_color(&self, ld: Option<f64>) -> &str {
        self.colors.fill(ld)
    }
}

impl Default for PositionsLayer {
    fn default() -> Self {
        Self::new(&PositionsSettings::default())
    }
}

impl DataLayer for PositionsLayer {
    type Record = Position;

    fn id(&self) -> &str {
        POSITIONS_LAYER_ID
    }

    fn fields(&self) -> Vec<String> {
        ["id", "position", "pvalue", "refAllele", "ld:best"]
            .iter()
            .map(|f| f.to_string())
            .collect()
    }

    fn transform(&self, records: &mut [Position]) {
        records.par_iter_mut().for_each(|d| {
            d.ld = numeric_value(d.ld_best.as_ref());
            d.log10pval = d
                .pvalue
                .map(|p| -p.log10())
                .filter(|v| v.is_finite());
        });
    }

    fn draw(&self, records: &[Position], ctx: &PanelContext, canvas: &mut dyn Canvas) {
        let Some(y_scale) = ctx.y_scale else {
            tracing::warn!("positions layer is not attached to a y axis; nothing drawn");
            return;
        };
        let mut skipped = 0;
        for d in records {
            let Some(log10pval) = d.log10pval else {
                skipped += 1;
                continue;
            };
            canvas.draw(DrawCommand::Circle {
                id: Some(d.id.clone()),
                class: "position".to_string(),
                cx: ctx.x_scale.forward(d.position as f64),
                cy: y_scale.forward(log10pval),
                r: self.radius,
                fill: self.fill_color(d.ld).to_string(),
                title: Some(d.id.clone()),
            });
        }
        if skipped > 0 {
            tracing::debug!("skipped {skipped} positions without a usable p-value");
        }
    }

    fn y_extent(&self, records: &[Position]) -> Option<(f64, f64)> {
        records
            .iter()
            .filter_map(|d| d.log10pval)
            .reduce(f64::max)
            .map(|max| (0.0, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::LinearScale;
    use crate::track_layout::Window;
    use locustrack_render::CommandCanvas;
    use serde_json::json;

    fn position(id: &str, pos: u64, pvalue: Option<f64>, ld: Value) -> Position {
        serde_json::from_value(json!({
            "id": id, "position": pos, "pvalue": pvalue, "ld:best": ld
        }))
        .unwrap()
    }

    #[test]
    fn test_numeric_value_casts() {
        assert_eq!(numeric_value(Some(&json!(0.42))), Some(0.42));
        assert_eq!(numeric_value(Some(&json!(" 0.5 "))), Some(0.5));
        assert_eq!(numeric_value(Some(&json!(""))), Some(0.0));
        assert_eq!(numeric_value(Some(&json!(true))), Some(1.0));
        assert_eq!(numeric_value(Some(&json!("n/a"))), None);
        assert_eq!(numeric_value(Some(&json!([1]))), None);
        assert_eq!(numeric_value(None), None);
    }

    #[test]
    fn test_transform_derives_ld_and_log10pval() {
        let layer = PositionsLayer::default();
        let mut records = vec![
            position("rs1", 100, Some(1e-8), json!("0.9")),
            position("rs2", 200, Some(0.0), json!(0.1)),
            position("rs3", 300, None, Value::Null),
        ];
        layer.transform(&mut records);
        assert!((records[0].log10pval.unwrap() - 8.0).abs() < 1e-12);
        assert_eq!(records[0].ld, Some(0.9));
        assert_eq!(records[1].log10pval, None);
        assert_eq!(records[1].ld, Some(0.1));
        assert_eq!(records[2].ld, None);
        assert_eq!(layer.y_extent(&records), Some((0.0, records[0].log10pval.unwrap())));
    }

    #[test]
    fn test_draw_places_and_colors_circles() {
        let layer = PositionsLayer::default();
        let mut records = vec![
            position("rs1", 150, Some(0.01), json!(0.95)),
            position("rs2", 175, Some(0.1), Value::Null),
            position("rs3", 190, None, json!(0.5)),
        ];
        layer.transform(&mut records);
        let ctx = PanelContext {
            window: Window::new(100, 200),
            x_scale: LinearScale::new((100.0, 200.0), (0.0, 700.0)).unwrap(),
            y_scale: Some(LinearScale::new((0.0, 2.0), (200.0, 0.0)).unwrap()),
        };
        let mut canvas = CommandCanvas::new();
        layer.draw(&records, &ctx, &mut canvas);
        assert_eq!(canvas.len(), 2);
        match &canvas.commands()[0] {
            DrawCommand::Circle { id, cx, cy, fill, r, .. } => {
                assert_eq!(id.as_deref(), Some("rs1"));
                assert!((cx - 350.0).abs() < 1e-9);
                assert!(cy.abs() < 1e-9);
                assert_eq!(fill, "#d43f3a");
                assert_eq!(*r, 4.0);
            }
            other => panic!("unexpected command {other:?}"),
        }
        match &canvas.commands()[1] {
            DrawCommand::Circle { fill, .. } => assert_eq!(fill, "#B8B8B8"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_draw_without_y_axis_is_empty() {
        let layer = PositionsLayer::default();
        let mut records = vec![position("rs1", 150, Some(0.01), json!(0.95))];
        layer.transform(&mut records);
        let ctx = PanelContext {
            window: Window::new(100, 200),
            x_scale: LinearScale::new((100.0, 200.0), (0.0, 700.0)).unwrap(),
            y_scale: None,
        };
        let mut canvas = CommandCanvas::new();
        layer.draw(&records, &ctx, &mut canvas);
        assert!(canvas.is_empty());
    }
}
