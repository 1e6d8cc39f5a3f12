use crate::plot::LocusPlot;
use locustrack_render::{LayerGroup, document, layer_group};
use std::{fs, path::Path};
use svg::node::element::Text;

/// Serializes the retained drawing of every layer into one SVG document.
pub fn export_plot_svg(plot: &LocusPlot) -> String {
    let mut groups = vec![];
    for panel in plot.panels() {
        let clip = panel.clip_area();
        for layer in panel.layers() {
            let base_id = plot.layer_base_id(panel.id(), layer.id());
            groups.push(layer_group(&LayerGroup {
                base_id: &base_id,
                clip,
                commands: layer.canvas().commands(),
            }));
        }
    }
    let (width, height) = plot.size();
    let state = plot.state();
    let region = format!("chr{}:{}-{}", state.chr.trim_start_matches("chr"), state.start, state.end);
    document(width, height, groups)
        .add(
            Text::new(region)
                .set("id", format!("{}.region", plot.id()))
                .set("x", width / 2.0)
                .set("y", height - 4.0)
                .set("text-anchor", "middle")
                .set("font-family", "sans-serif")
                .set("font-size", 11),
        )
        .to_string()
}

pub fn export_plot_svg_to_path(plot: &LocusPlot, path: impl AsRef<Path>) -> std::io::Result<()> {
    fs::write(path, export_plot_svg(plot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotConfig;
    use crate::source_memory::MemorySource;
    use locustrack_protocol::LocusState;
    use serde_json::json;

    #[test]
    fn test_every_layer_gets_a_container() {
        let source = MemorySource::from_json_value(json!({
            "base": [{"id": "rs7", "position": 150, "pvalue": 1e-3}],
            "ld": [],
            "recomb": [],
            "gene": [{"gene_name": "XYZ", "start": 120, "end": 180, "strand": "-"}]
        }))
        .unwrap();
        let mut plot = LocusPlot::standard("lz", &PlotConfig::default(), Box::new(source)).unwrap();
        plot.refresh(LocusState::new("7", 100, 200));
        let svg = export_plot_svg(&plot);
        for base in ["lz.positions.positions", "lz.positions.recombination_rate", "lz.genes.genes"] {
            assert!(svg.contains(&format!("id=\"{base}.data_layer_container\"")), "{base}");
            assert!(svg.contains(&format!("id=\"{base}.clip\"")), "{base}");
            assert!(svg.contains(&format!("id=\"{base}.data_layer\"")), "{base}");
        }
        assert!(svg.contains("translate(50,245)"));
        assert!(svg.contains("id=\"rs7\""));
        assert!(svg.contains("←XYZ"));
        assert!(svg.contains("chr7:100-200"));
    }

    #[test]
    fn test_write_to_path() {
        let source = MemorySource::new();
        let plot = LocusPlot::standard("lz", &PlotConfig::default(), Box::new(source)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.svg");
        export_plot_svg_to_path(&plot, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("<svg"));
        assert!(text.contains("lz.genes.genes.data_layer"));
    }
}
