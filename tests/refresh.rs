use locustrack::source_memory::MemorySource;
use locustrack::{LayerStatus, LocusPlot, LocusState, PlotConfig};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::process::Command;

fn write_fixture(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let data = dir.join("region.json");
    fs::write(
        &data,
        serde_json::to_string(&json!({
            "base": [
                {"id": "10:114758349_C/T", "chr": "10", "position": 114_758_349, "pvalue": 2.1e-10, "refAllele": "C"},
                {"id": "10:114754071_T/C", "chr": "10", "position": 114_754_071, "pvalue": 4.0e-6, "refAllele": "T"},
                {"id": "10:114900000_G/A", "chr": "10", "position": 114_900_000, "pvalue": 0.04, "refAllele": "G"},
                {"id": "11:1000_A/G", "chr": "11", "position": 114_800_000, "pvalue": 1e-20, "refAllele": "A"}
            ],
            "ld": [
                {"id": "10:114758349_C/T", "best": 1},
                {"id": "10:114754071_T/C", "best": "0.72"}
            ],
            "gene": [
                {"gene_name": "TCF7L2", "gene_id": "ENSG00000148737", "chrom": "10",
                 "start": 114_710_009, "end": 114_927_437, "strand": "+",
                 "transcripts": [{"transcript_id": "ENST00000355995", "exons": [
                    {"exon_id": "ENSE00001", "start": 114_710_009, "end": 114_710_500},
                    {"exon_id": "ENSE00002", "start": 114_900_000, "end": 114_927_437}]}]},
                {"gene_name": "VTI1A", "chrom": "10", "start": 114_206_756, "end": 114_800_000, "strand": "+"},
                {"gene_name": "HABP2", "chrom": "10", "start": 115_312_000, "end": 115_345_000, "strand": "+"}
            ]
        }))
        .unwrap(),
    )
    .unwrap();
    let table = dir.join("recomb.tsv");
    fs::write(
        &table,
        "position\trecomb_rate\n114600000\t0.4\n114750000\t35.2\n114900000\t3.1\n115000000\t0.9\n",
    )
    .unwrap();
    (data, table)
}

#[test]
fn test_render_region_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let (data, table) = write_fixture(dir.path());
    let mut source = MemorySource::from_json_path(&data).unwrap();
    assert_eq!(source.load_table("recomb", &table).unwrap(), 4);

    let mut plot = LocusPlot::standard("tcf7l2", &PlotConfig::default(), Box::new(source)).unwrap();
    let report = plot.refresh(LocusState::new("10", 114_550_452, 115_067_678));
    assert!(report.all_drawn(), "{report:?}");
    assert_eq!(
        report.outcome("positions", "positions"),
        Some(&LayerStatus::Drawn { records: 3 })
    );
    assert_eq!(
        report.outcome("positions", "recombination_rate"),
        Some(&LayerStatus::Drawn { records: 4 })
    );
    assert_eq!(
        report.outcome("genes", "genes"),
        Some(&LayerStatus::Drawn { records: 2 })
    );
    assert_eq!(plot.gene_tracks(), 2);

    let svg = plot.render_svg();
    assert!(svg.contains("id=\"tcf7l2.genes.genes.data_layer_container\""));
    assert!(svg.contains("id=\"tcf7l2.positions.recombination_rate.clip\""));
    assert!(svg.contains("TCF7L2→"));
    assert!(svg.contains("#d43f3a"));
    assert!(svg.contains("ENSE00002"));
    assert!(!svg.contains("HABP2"));
}

#[test]
fn test_cli_render_and_layout() {
    let dir = tempfile::tempdir().unwrap();
    let (data, table) = write_fixture(dir.path());
    let output = dir.path().join("plot.svg");
    let bin = env!("CARGO_BIN_EXE_locustrack_cli");

    let run = Command::new(bin)
        .arg("render")
        .arg("--data")
        .arg(&data)
        .arg("--table")
        .arg(format!("recomb={}", table.display()))
        .args(["--chr", "10", "--start", "114550452", "--end", "115067678"])
        .arg("-o")
        .arg(&output)
        .output()
        .unwrap();
    assert!(run.status.success(), "{}", String::from_utf8_lossy(&run.stderr));
    let report: serde_json::Value = serde_json::from_slice(&run.stdout).unwrap();
    assert_eq!(report["generation"], 1);
    assert!(fs::read_to_string(&output).unwrap().contains("TCF7L2"));

    let run = Command::new(bin)
        .arg("layout")
        .arg("--data")
        .arg(&data)
        .arg("--table")
        .arg(format!("recomb={}", table.display()))
        .args(["--chr", "10", "--start", "114550452", "--end", "115067678"])
        .output()
        .unwrap();
    assert!(run.status.success(), "{}", String::from_utf8_lossy(&run.stderr));
    let layout: serde_json::Value = serde_json::from_slice(&run.stdout).unwrap();
    assert_eq!(layout["tracks"], 2);
    assert_eq!(layout["genes"][0]["gene_name"], "TCF7L2");
    assert_eq!(layout["genes"][0]["track"], 1);
    assert_eq!(layout["genes"][1]["track"], 2);
}

#[test]
fn test_cli_rejects_empty_region() {
    let run = Command::new(env!("CARGO_BIN_EXE_locustrack_cli"))
        .args(["layout", "--chr", "1", "--start", "500", "--end", "500"])
        .output()
        .unwrap();
    assert!(!run.status.success());
}
