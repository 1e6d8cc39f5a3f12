use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use locustrack::data_source::DataSource;
use locustrack::source_http::HttpSource;
use locustrack::source_memory::MemorySource;
use locustrack::{LocusPlot, LocusState, PlotConfig};
use serde::Serialize;
use std::path::PathBuf;

/// Render association, recombination and gene tracks of a genomic region to SVG.
#[derive(Debug, Parser)]
#[command(author, version = locustrack::display_version(), about)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Refresh the plot for a region and write it as SVG.
    Render(RenderArgs),
    /// Print the gene track assignment for a region as JSON.
    Layout(RegionArgs),
    /// Print the default configuration as JSON.
    Config,
}

#[derive(Debug, Args)]
struct RegionArgs {
    /// JSON document mapping namespaces to record arrays.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Tab-separated table loaded into a namespace, as `namespace=path`.
    #[arg(long = "table", value_name = "NS=PATH")]
    tables: Vec<String>,

    /// Base URL of a remote data API; used instead of local files.
    #[arg(long, conflicts_with_all = ["data", "tables"])]
    url: Option<String>,

    #[arg(long)]
    chr: String,

    #[arg(long)]
    start: u64,

    #[arg(long)]
    end: u64,

    /// Plot configuration (JSON); defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RenderArgs {
    #[command(flatten)]
    region: RegionArgs,

    /// Output SVG path.
    #[arg(short, long)]
    output: PathBuf,

    /// Plot id, used as prefix of all element ids.
    #[arg(long, default_value = "locustrack")]
    id: String,
}

#[derive(Serialize)]
struct GeneTrack<'a> {
    gene_name: &'a str,
    start: u64,
    end: u64,
    track: Option<usize>,
}

impl RegionArgs {
    fn state(&self) -> anyhow::Result<LocusState> {
        if self.end <= self.start {
            bail!("region end {} must be greater than start {}", self.end, self.start);
        }
        Ok(LocusState::new(self.chr.clone(), self.start, self.end))
    }

    fn config(&self) -> anyhow::Result<PlotConfig> {
        match &self.config {
            Some(path) => PlotConfig::load_from_path(path)
                .with_context(|| format!("could not load config '{}'", path.display())),
            None => Ok(PlotConfig::default()),
        }
    }

    fn source(&self) -> anyhow::Result<Box<dyn DataSource>> {
        if let Some(url) = &self.url {
            return Ok(Box::new(HttpSource::new(url.clone())?));
        }
        let mut source = match &self.data {
            Some(path) => MemorySource::from_json_path(path)
                .with_context(|| format!("could not load data '{}'", path.display()))?,
            None => MemorySource::new(),
        };
        for table in &self.tables {
            let Some((namespace, path)) = table.split_once('=') else {
                bail!("--table expects NS=PATH, got '{table}'");
            };
            let rows = source
                .load_table(namespace, path)
                .with_context(|| format!("could not load table '{path}'"))?;
            tracing::info!("loaded {rows} rows into namespace '{namespace}'");
        }
        Ok(Box::new(source))
    }

    fn plot(&self, id: &str) -> anyhow::Result<(LocusPlot, LocusState)> {
        let plot = LocusPlot::standard(id, &self.config()?, self.source()?)?;
        Ok((plot, self.state()?))
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render(args: &RenderArgs) -> anyhow::Result<()> {
    let (mut plot, state) = args.region.plot(&args.id)?;
    let report = plot.refresh(state);
    locustrack::render_export::export_plot_svg_to_path(&plot, &args.output)
        .with_context(|| format!("could not write '{}'", args.output.display()))?;
    tracing::info!("wrote {}", args.output.display());
    print_json(&report)
}

fn layout(args: &RegionArgs) -> anyhow::Result<()> {
    let (mut plot, state) = args.plot("locustrack")?;
    let report = plot.refresh(state);
    for outcome in report.outcomes.iter().filter(|o| !o.status.is_drawn()) {
        tracing::warn!("{}.{}: {:?}", outcome.panel, outcome.layer, outcome.status);
    }
    let genes = plot.genes();
    let tracks: Vec<GeneTrack> = genes
        .iter()
        .map(|g| GeneTrack {
            gene_name: &g.gene_name,
            start: g.start,
            end: g.end,
            track: g.track(),
        })
        .collect();
    print_json(&serde_json::json!({
        "tracks": plot.gene_tracks(),
        "genes": tracks,
    }))
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(match cli.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::ERROR,
        })
        .compact()
        .finish();
    tracing::subscriber::set_global_default(collector)?;

    match &cli.command {
        Commands::Render(args) => render(args)?,
        Commands::Layout(args) => layout(args)?,
        Commands::Config => print_json(&PlotConfig::default())?,
    }
    Ok(())
}
