use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser as ClapParser;

use rampart::{
    analyze_routing_distance, color_placement_grid, extract_critical_nets,
    extract_nearby_polygons, find_open_regions, scan_blockage, BlockageReport, Net, RouteReport,
    ScoreConfig, TriggerSpaceReport,
};
use tech::def::parse_def;
use tech::lef::parse_lef;
use tech::netlist::parse_dot;
use tech::wire_stats::parse_wire_stats;
use tech::{GridCell, LayerMap, PlacementGrid, Tech, TechError};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    if !(args.all || args.blockage || args.trigger || args.routing_distance) {
        bail!("select at least one metric: --blockage, --trigger, --routing-distance, or --all");
    }
    score(args)
}

/// Arguments to `rampart`.
#[derive(ClapParser)]
#[command(
    version,
    about,
    long_about = "Score the physical security of critical nets in a chip layout \
                  against additive Trojan insertion"
)]
pub struct Args {
    /// The GDSII layout to analyze.
    #[arg(long)]
    gds: PathBuf,
    /// The top-level cell name.
    #[arg(short = 'm', long)]
    top: String,
    /// The metal-stack LEF file.
    #[arg(long)]
    ms_lef: PathBuf,
    /// The standard-cell LEF file.
    #[arg(long)]
    sc_lef: PathBuf,
    /// The GDS layer-map file.
    #[arg(long)]
    layer_map: PathBuf,
    /// The placed-and-routed DEF file.
    #[arg(long)]
    def: PathBuf,
    /// The critical-net list (.dot node names).
    #[arg(long)]
    nets: PathBuf,
    /// A wire-length statistics report, for routing-distance sigma scores.
    #[arg(long)]
    wire_rpt: Option<PathBuf>,
    /// Step size for the same-layer blockage scan, in database units.
    #[arg(long, default_value_t = 1)]
    nb_step: i64,
    /// The GDS layer number of the lowest routing layer; everything below
    /// it is treated as device geometry.
    #[arg(long)]
    first_routing_layer: i16,
    /// The smallest open region (in placement sites) considered usable for
    /// a trigger.
    #[arg(long, default_value_t = 4)]
    trigger_size: usize,
    /// Calculate the critical net blockage metric.
    #[arg(short, long)]
    blockage: bool,
    /// Calculate the open trigger-space metric.
    #[arg(short, long)]
    trigger: bool,
    /// Calculate the routing-distance metric.
    #[arg(short, long)]
    routing_distance: bool,
    /// Calculate all metrics.
    #[arg(short, long)]
    all: bool,
    /// Emit reports as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn read(path: &PathBuf) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn score(args: Args) -> anyhow::Result<()> {
    let stack = parse_lef(&read(&args.ms_lef)?).context("failed to parse metal-stack LEF")?;
    let cells = parse_lef(&read(&args.sc_lef)?).context("failed to parse standard-cell LEF")?;
    let layer_map = LayerMap::parse(&read(&args.layer_map)?).context("failed to parse layer map")?;
    let tech = Tech::new(stack, cells, layer_map).context("failed to build technology model")?;

    let library = layout::import::import_gds(&args.gds)
        .with_context(|| format!("failed to import {}", args.gds.display()))?;
    let critical = parse_dot(&read(&args.nets)?);
    if critical.is_empty() {
        bail!("no critical nets listed in {}", args.nets.display());
    }

    let mut config = ScoreConfig::new(args.top.as_str());
    config.net_blockage_step = args.nb_step;
    config.first_routing_gds_layer = args.first_routing_layer;
    config.target_trigger_size = args.trigger_size;

    let run_blockage = args.all || args.blockage || args.routing_distance;
    let run_trigger = args.all || args.trigger || args.routing_distance;

    let mut nets: Vec<Net> = Vec::new();
    if run_blockage {
        nets = extract_critical_nets(&library, &tech, &config, &critical)?;
        extract_nearby_polygons(&library, &tech, &config, &mut nets)?;
        for net in nets.iter_mut() {
            for seg in net.segments.iter_mut() {
                let result = scan_blockage(seg, &tech, &config)?;
                seg.blockage = Some(result);
            }
        }
        if args.all || args.blockage {
            emit(&BlockageReport::from_nets(&nets), args.json)?;
        }
    }

    let mut regions: BTreeMap<usize, Vec<Vec<GridCell>>> = BTreeMap::new();
    let mut grid: Option<PlacementGrid> = None;
    if run_trigger {
        let def = parse_def(&read(&args.def)?).context("failed to parse DEF")?;
        let first_row = def.rows.first().ok_or(TechError::MissingRecord {
            what: "ROW records in DEF",
        })?;
        let site = tech
            .placement_sites
            .get(&first_row.site)
            .ok_or_else(|| TechError::UnknownSite {
                name: first_row.site.clone(),
            })?;
        let mut g = PlacementGrid::new(&def.rows, site)?;
        color_placement_grid(&library, &tech, &config, &mut g)?;
        regions = find_open_regions(&g);
        grid = Some(g);
        if args.all || args.trigger {
            emit(&TriggerSpaceReport::from_regions(&regions), args.json)?;
        }
    }

    if args.all || args.routing_distance {
        let wire_stats = match &args.wire_rpt {
            Some(path) => {
                Some(parse_wire_stats(&read(path)?).context("failed to parse wire report")?)
            }
            None => None,
        };
        let grid = grid.expect("trigger analysis ran");
        let estimates = analyze_routing_distance(
            &nets,
            &regions,
            &grid,
            &tech,
            wire_stats.as_ref(),
            &config,
        );
        emit(&RouteReport { estimates }, args.json)?;
    }

    Ok(())
}

fn emit<T: serde::Serialize + std::fmt::Display>(report: &T, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}
