use rayon::ThreadPoolBuilder;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use anyhow::Result;
use tracing::*;

use depotopt::*;
use depotopt::extract;
use depotopt::graph::CostWeights;
use depotopt::qubo::{Coefficients, StructuralAggregation};
use depotopt::registry::{DegeneratePolicy, StationRegistry};
use depotopt::solve::Backend;
use stations::dataset::DataDir;
use stations::derived::nearest_site_distance;
use stations::raw::FromRaw;
use stations::select::{subsample, within_window, Window};

mod common;
use common::*;

use structopt::StructOpt;

/// Source of the isolation metric.
#[derive(Debug, Copy, Clone)]
enum Isolation {
    Hub,
    Nearest,
}

impl FromStr for Isolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s {
            "hub" => Ok(Self::Hub),
            "nearest" => Ok(Self::Nearest),
            _ => Err(format!("invalid string: {}", s))
        };
    }
}


#[derive(Debug, StructOpt)]
struct ClArgs {
    /// Data directory; defaults to $DATA_ROOT.
    #[structopt(long)]
    data: Option<PathBuf>,
    #[structopt(long, short="c", default_value="1", validator=clap_range_validator(Some(1), None))]
    cpus: usize,
    #[structopt(long="no-window", parse(from_flag=std::ops::Not::not))]
    window: bool,
    #[structopt(long, default_value="1")]
    window_start: f64,
    #[structopt(long, default_value="20")]
    window_end: f64,
    #[structopt(long="no-subsample", parse(from_flag=std::ops::Not::not))]
    subsample: bool,
    #[structopt(long="sample", default_value="20")]
    sample: usize,
    #[structopt(long, default_value="42")]
    sample_seed: u64,
    #[structopt(long, parse(try_from_str), possible_values=&["hub", "nearest"], default_value="hub")]
    isolation: Isolation,

    #[structopt(long="depots", short="k", default_value="4")]
    depots: usize,
    #[structopt(long, default_value="25", validator=clap_range_validator(Some(0.0), None))]
    threshold: f64,
    #[structopt(long, default_value="5")]
    cost_c: f64,
    #[structopt(long, default_value="3")]
    cost_d: f64,
    #[structopt(long, default_value="0.3")]
    cost_e: f64,
    #[structopt(short="A", default_value="100")]
    a: f64,
    #[structopt(short="B", default_value="100")]
    b: f64,
    #[structopt(short="C", default_value="100")]
    c: f64,
    #[structopt(long, parse(try_from_str), possible_values=&["all", "last"], default_value="all")]
    aggregation: StructuralAggregation,
    #[structopt(long, parse(try_from_str), possible_values=&["anneal", "exact"], default_value="anneal")]
    backend: Backend,
    #[structopt(long, default_value="10", validator=clap_range_validator(Some(1), None))]
    reads: usize,
    #[structopt(long, default_value="1000", validator=clap_range_validator(Some(1), None))]
    sweeps: usize,
    #[structopt(long, default_value="42")]
    seed: u64,
    /// Give every station this value when a metric is constant, instead of failing.
    #[structopt(long)]
    fill: Option<f64>,
    #[structopt(flatten)]
    output: OutputOptions,
}

impl ClArgs {
    fn config(&self) -> Config {
        Config {
            weights: CostWeights { c: self.cost_c, d: self.cost_d, e: self.cost_e },
            threshold: self.threshold,
            depots: self.depots,
            coefficients: Coefficients { a: self.a, b: self.b, c_pen: self.c },
            aggregation: self.aggregation,
            backend: self.backend,
            num_reads: self.reads,
            num_sweeps: self.sweeps,
            seed: self.seed,
            degenerate: self.fill.map(DegeneratePolicy::Fill).unwrap_or(DegeneratePolicy::Fail),
        }
    }
}


struct Report<'a> {
    registry: &'a StationRegistry,
    placement: Placement,
}

impl<'a> Report<'a> {
    fn write(&self, mut buf: impl Write, fmt: OutputFormat) -> Result<()> {
        match fmt {
            OutputFormat::Depots => {
                let depots = self.placement.solution().depots(self.registry)?;
                extract::write_depots(&depots, &mut buf)?;
            }
            OutputFormat::Summary => {
                self.placement.summary_json(self.registry.len()).write_pretty(&mut buf, 2)?;
            }
        }
        buf.flush()?;
        Ok(())
    }
}


fn main() -> Result<()> {
    let args: ClArgs = StructOpt::from_args();
    let _g = init_logging(args.output.log.as_ref())?;
    debug!(?args);
    ThreadPoolBuilder::new().num_threads(args.cpus).build_global()?;

    let dir = match args.data.as_ref() {
        Some(d) => DataDir::new(d)?,
        None => DataDir::from_env()?,
    };
    let mut raw = dir.load()?;

    let mut selected = raw.locations.0.clone();
    if args.window {
        let window = Window { start: args.window_start, end: args.window_end, ..Window::default() };
        selected = within_window(&selected, &window);
    }
    if args.subsample {
        selected = subsample(selected, args.sample, args.sample_seed)?;
    }
    if let Isolation::Nearest = args.isolation {
        raw.hub_distance = nearest_site_distance(&raw.distances);
    }
    let raw = raw.restrict(selected);
    let distances = raw.distances.clone();
    let registry = StationRegistry::from_raw(raw, dir.dir().to_string_lossy());

    let placement = place_depots(&registry, &distances, &args.config())?;
    let report = Report { registry: &registry, placement };
    report.write(args.output.writer()?, args.output.fmt)?;
    Ok(())
}
