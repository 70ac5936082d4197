//! catalog-bench - ingestion and tile-loading benchmarks for catalog maps.
//!
//! Samples a CSV catalog, times ingestion into the in-memory store at each
//! configured size, then drives the reference tile client over the largest
//! collection and reports mean tile latency per zoom level.

use anyhow::{bail, Context, Result};
use catalog_bench::bench::{run_ingestion_benchmark, run_map_benchmark, TimingSample, ZoomLevelLatency};
use catalog_bench::catalog::{jitter, sample, Catalog};
use catalog_bench::config::BenchmarkConfig;
use catalog_bench::error::IngestionError;
use catalog_bench::report::{render, write_csv_file, Series, SeriesSummary};
use catalog_bench::store::MemoryStore;
use catalog_bench::tiles::CatalogTileClient;
use catalog_bench::Error;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "catalog-bench", about = "Benchmark catalog ingestion and map tile loading", version)]
struct Args {
    /// Source catalog (CSV with a header row)
    #[arg(long, value_name = "CSV")]
    source: PathBuf,

    /// Benchmark configuration (YAML)
    #[arg(long, value_name = "YAML")]
    config: Option<PathBuf>,

    /// Output directory, overrides the configuration
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Random seed for position jitter, overrides the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Comma-separated target sizes, overrides the configuration
    #[arg(long, value_delimiter = ',')]
    sizes: Option<Vec<usize>>,

    /// Skip the ingestion benchmark
    #[arg(long)]
    skip_ingest: bool,

    /// Skip the map-load benchmark
    #[arg(long)]
    skip_map: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn load_config(&self) -> Result<BenchmarkConfig> {
        let mut config = match &self.config {
            Some(path) => BenchmarkConfig::load(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => BenchmarkConfig::default(),
        };
        if let Some(dir) = &self.out {
            config.output.dir.clone_from(dir);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(sizes) = &self.sizes {
            config.ingestion.sizes.clone_from(sizes);
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = args.load_config()?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let base = sample(&args.source).with_context(|| format!("Failed to sample {}", args.source.display()))?;
    log::info!("sampled {} rows from {}", base.len(), args.source.display());

    std::fs::create_dir_all(&config.output.dir)
        .with_context(|| format!("Failed to create {}", config.output.dir.display()))?;

    let store = MemoryStore::new();
    let mut largest = None;
    let mut aborted = None;

    if !args.skip_ingest {
        let bench = config.ingestion_benchmark()?;
        let mut target = |catalog: &Catalog| -> std::result::Result<(), IngestionError> {
            let name = store.insert(catalog)?;
            largest = Some(larger(largest.take(), (catalog.len(), name)));
            Ok(())
        };
        let samples = match run_ingestion_benchmark(&bench, &base, &mut target, &mut rng) {
            Ok(samples) => samples,
            Err(Error::IngestionAborted { size, completed, source }) => {
                log::error!("ingestion stopped at {size} rows: {source}");
                aborted = Some(format!("ingestion of {size} rows failed: {source}"));
                completed
            }
            Err(e) => return Err(e).context("Ingestion benchmark failed"),
        };
        report_timing(&config, &samples)?;
    }

    if !args.skip_map {
        let name = match largest {
            Some((_, name)) => name,
            None => store
                .insert(&jitter(&base, config.position_bounds()?, &mut rng))
                .context("Failed to load the base catalog for the map run")?,
        };
        let map = &config.map;
        let mut client = CatalogTileClient::from_store(&store, &name)?
            .tile_size(map.tile_size)
            .viewport(map.viewport.width, map.viewport.height)
            .zoom_range(map.min_zoom, map.max_zoom);

        log::info!("map run over {name}");
        let report = run_map_benchmark(&config.map_benchmark(), &mut client).context("Map benchmark failed")?;
        for warning in &report.warnings {
            println!("zoom {}: no tiles loaded ({} failed)", warning.zoom_level, warning.failed);
        }
        report_latency(&config, &report.levels)?;
    }

    if let Some(message) = aborted {
        bail!(message);
    }
    Ok(())
}

/// Keep the collection with more rows; ties go to the later one.
fn larger(current: Option<(usize, String)>, candidate: (usize, String)) -> (usize, String) {
    match current {
        Some(current) if current.0 > candidate.0 => current,
        _ => candidate,
    }
}

fn report_timing(config: &BenchmarkConfig, samples: &[TimingSample]) -> Result<()> {
    let series = Series::Timing(samples);
    if let Some(s) = SeriesSummary::of(series) {
        println!("ingestion: {} sizes, min {:.3}s, max {:.3}s, mean {:.3}s", s.count, s.min, s.max, s.mean);
    }
    write_outputs(config, series, "ingestion")
}

fn report_latency(config: &BenchmarkConfig, levels: &[ZoomLevelLatency]) -> Result<()> {
    let series = Series::ZoomLatency(levels);
    if let Some(s) = SeriesSummary::of(series) {
        println!("tile latency: {} zoom levels, min {:.3}s, max {:.3}s, mean {:.3}s", s.count, s.min, s.max, s.mean);
    }
    write_outputs(config, series, "map_latency")
}

fn write_outputs(config: &BenchmarkConfig, series: Series<'_>, stem: &str) -> Result<()> {
    let out = &config.output;
    if out.csv {
        let path = out.dir.join(format!("{stem}.csv"));
        write_csv_file(series, &path).with_context(|| format!("Failed to write {}", path.display()))?;
        written(&path);
    }
    if series.is_empty() || !(out.png || out.svg) {
        return Ok(());
    }
    let chart = render(series)?;
    if out.png {
        let path = out.dir.join(format!("{stem}.png"));
        chart.write_png(&path).with_context(|| format!("Failed to write {}", path.display()))?;
        written(&path);
    }
    if out.svg {
        let path = out.dir.join(format!("{stem}.svg"));
        chart.write_svg(&path).with_context(|| format!("Failed to write {}", path.display()))?;
        written(&path);
    }
    Ok(())
}

fn written(path: &Path) {
    println!("wrote {}", path.display());
}
