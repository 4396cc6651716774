use anyhow::Context;
use clap::Parser;
use frames::bridge::FrameBridge;
use generator::schedule::{build_fleet, load_snapshot};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use workflow::config::RunConfig;
use workflow::runner::Runner;

mod frames;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Replays fleet schedules through the fleet core")]
struct Args {
    /// Load a run config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Backend snapshot (JSON array of vehicle records) to replay instead of a synthetic fleet
    #[arg(long)]
    snapshot: Option<PathBuf>,
    #[arg(long, default_value_t = 4)]
    vehicles: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// First simulation minute to resolve
    #[arg(long, default_value_t = 0.0)]
    from: f64,
    /// Last simulation minute to resolve
    #[arg(long, default_value_t = 240.0)]
    until: f64,
    /// Simulation minutes per tick
    #[arg(long, default_value_t = 1.0)]
    step: f64,
    /// Reject out-of-bounds records instead of repairing them
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Write every tick frame as a JSON line ("-" for stdout)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Pace ticks on the wall clock until the span ends or Ctrl+C
    #[arg(long, default_value_t = false)]
    realtime: bool,
    #[arg(long)]
    tick_ms: Option<u64>,
}

fn open_sink(output: Option<PathBuf>) -> anyhow::Result<Option<Box<dyn Write + Send>>> {
    let Some(path) = output else {
        return Ok(None);
    };
    if path.as_os_str() == "-" {
        return Ok(Some(Box::new(io::stdout())));
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    let file = File::create(&path)
        .with_context(|| format!("creating frame output {}", path.display()))?;
    Ok(Some(Box::new(BufWriter::new(file))))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut run_config = if let Some(path) = args.config {
        RunConfig::load(path)?
    } else {
        let mut config = RunConfig::from_args(args.from, args.until, args.step);
        config.generator.vehicles = args.vehicles;
        config.generator.seed = args.seed;
        config
    };
    if args.strict {
        run_config.fleet.strict_mode = true;
    }
    if let Some(tick_ms) = args.tick_ms {
        run_config.tick_ms = tick_ms;
    }

    let fleet = match args.snapshot {
        Some(path) => load_snapshot(path)?,
        None => build_fleet(&run_config.generator, &run_config.fleet.bounds)?,
    };

    let runner = Runner::new(run_config)?;
    let mut bridge = FrameBridge::new(open_sink(args.output)?);
    bridge.publish_status(&format!(
        "replaying {} vehicles over t=[{}, {}]",
        fleet.len(),
        runner.config().start_time,
        runner.config().end_time
    ));

    let result = if args.realtime {
        runner.execute_realtime(&fleet, &mut bridge)?
    } else {
        runner.execute(&fleet, &mut bridge)?
    };

    let model = bridge.snapshot();
    eprintln!(
        "Replay -> ticks {}, resolved {}, corrections {}, rejected {}, history {}",
        result.ticks,
        result.metrics.resolved,
        result.metrics.corrections,
        result.metrics.rejected,
        result.corrections_logged
    );
    if let Some(frame) = result.last_frame {
        eprintln!(
            "Final t={} -> {} vehicles ({} moving), {} rejected, {} with diagnostics",
            frame.time,
            frame.vehicles.len(),
            frame.moving_count(),
            frame.rejected.len(),
            frame.diagnostics.len()
        );
    }
    for line in &model.recent_corrections {
        eprintln!("  corrected {}", line);
    }

    Ok(())
}
