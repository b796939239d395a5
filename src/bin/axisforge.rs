use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "axisforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Derive every output channel from one funscript.
    Process(ProcessArgs),
    /// Apply an event file to the channel files that share its base name.
    Events(EventsArgs),
    /// Generate an alpha/beta pair from one funscript.
    #[command(name = "convert-2d")]
    Convert2d(Convert2dArgs),
}

#[derive(Parser, Debug)]
struct ProcessArgs {
    /// Input funscript.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Configuration JSON; defaults apply to anything it leaves out.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep the intermediate `funscript-temp/` directory.
    #[arg(long)]
    keep_intermediates: bool,
}

#[derive(Parser, Debug)]
struct EventsArgs {
    /// Event file named `<base>.events.json`.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Event definitions JSON.
    #[arg(long)]
    definitions: PathBuf,

    /// Percent of the volume range kept free above the volume peak.
    #[arg(long, default_value_t = 10.0)]
    headroom: f64,

    /// Skip the backup of the files about to be rewritten.
    #[arg(long)]
    no_backup: bool,

    /// Only edit the axes named by each step, not their linked axes.
    #[arg(long)]
    no_linked: bool,
}

#[derive(Parser, Debug)]
struct Convert2dArgs {
    /// Input funscript.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory (defaults to the input's directory).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// circular, top-left-right, top-right-left, restim-original or tear-shaped.
    #[arg(long, default_value = "top-right-left")]
    algorithm: axisforge::MotionAlgorithm,

    #[arg(long, default_value_t = 25.0)]
    points_per_second: f64,

    #[arg(long, default_value_t = 0.1)]
    min_distance_from_center: f64,

    #[arg(long, default_value_t = 50.0)]
    speed_threshold_percent: f64,

    /// Seed for the restim-original side flips.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "axisforge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Process(args) => cmd_process(args),
        Command::Events(args) => cmd_events(args),
        Command::Convert2d(args) => cmd_convert_2d(args),
    }
}

fn cmd_process(args: ProcessArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => axisforge::ProcessorConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => axisforge::ProcessorConfig::default(),
    };
    if args.keep_intermediates {
        config.options.delete_intermediary_files = false;
    }

    let mut sink = axisforge::LogProgress;
    let report = axisforge::Processor::new(config)
        .process(&args.in_path, &mut sink)
        .with_context(|| format!("process '{}'", args.in_path.display()))?;

    for path in report.outputs.values() {
        println!("{}", path.display());
    }
    Ok(())
}

fn cmd_events(args: EventsArgs) -> anyhow::Result<()> {
    let definitions = axisforge::DefinitionsDoc::from_path(&args.definitions)?;
    let opts = axisforge::EventRunOptions {
        volume_headroom: args.headroom,
        apply_to_linked: !args.no_linked,
    };

    let dir = args
        .in_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let base = axisforge::event_base_name(&args.in_path)?;
    let snapshot = axisforge::DirectorySnapshot::new(dir, base);
    let snapshot: Option<&dyn axisforge::Snapshot> = if args.no_backup {
        None
    } else {
        Some(&snapshot)
    };

    let report = axisforge::run_events(&args.in_path, &definitions, &opts, snapshot)
        .with_context(|| format!("apply events '{}'", args.in_path.display()))?;
    for d in &report.diagnostics {
        eprintln!("skipped: {d}");
    }
    println!("{}", report.message);
    Ok(())
}

fn cmd_convert_2d(args: Convert2dArgs) -> anyhow::Result<()> {
    let input = axisforge::Funscript::from_path(&args.in_path)?;
    let cfg = axisforge::AlphaBetaConfig {
        algorithm: args.algorithm,
        points_per_second: args.points_per_second,
        min_distance_from_center: args.min_distance_from_center,
        speed_threshold_percent: args.speed_threshold_percent,
        seed: args.seed,
        ..axisforge::AlphaBetaConfig::default()
    };
    let pair = axisforge::generate_alpha_beta(&input.timeline, &cfg)?;

    let base = args
        .in_path
        .file_stem()
        .and_then(|s| s.to_str())
        .context("input path has no file name")?;
    let out_dir = match &args.out_dir {
        Some(dir) => dir.clone(),
        None => args
            .in_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    };

    for (axis, timeline) in [("alpha", pair.alpha), ("beta", pair.beta)] {
        let path = axisforge::axis_file_path(&out_dir, base, axis);
        axisforge::Funscript::new(timeline)
            .with_metadata(pair.metadata.clone())
            .save_to_path(&path)?;
        println!("{}", path.display());
    }
    Ok(())
}
