//! # Pilot Control Unit
//!
//! Runs one match against a hardware backend: loads `robot.toml`, builds the
//! backend through the driver registry, then plays initialize → pre-match →
//! autonomous → operator control → disabled on a fixed timeline.
//!
//! With the `simulation` backend, `--advance N` scripts N presses of the
//! selector-advance button during pre-match, and `[[simulation.script]]`
//! frames in the config drive the robot afterwards.

use clap::Parser;
use pilot_common::config::{ConfigError, LogLevel};
use pilot_common::consts::DEFAULT_CONFIG_PATH;
use pilot_common::robot::config::ScriptFrame;
use pilot_control_unit::competition::{MatchTimeline, run_match};
use pilot_control_unit::config::{LoadedConfig, load_config_or_default};
use pilot_control_unit::context::RobotContext;
use pilot_control_unit::routine::DriveFor;
use pilot_hal::DriverRegistry;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

/// Pilot Control Unit: competition robot driver control
#[derive(Parser, Debug)]
#[command(name = "pilot_control_unit")]
#[command(version)]
#[command(about = "Driver-facing control logic for a competition robot")]
struct Args {
    /// Path to the robot configuration TOML. Missing file → built-in defaults.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Hardware backend to use.
    #[arg(long, default_value = "simulation")]
    driver: String,

    /// Pre-match (selector) duration in milliseconds; 0 skips the selector.
    #[arg(long, default_value_t = 3_000)]
    pre_match_ms: u64,

    /// Autonomous period in milliseconds.
    #[arg(long, default_value_t = 15_000)]
    autonomous_ms: u64,

    /// Operator-control period in milliseconds.
    #[arg(long, default_value_t = 105_000)]
    driver_ms: u64,

    /// Scripted selector-advance presses during pre-match (simulation only).
    #[arg(long, default_value_t = 0)]
    advance: u32,

    /// List registered drivers and exit.
    #[arg(long)]
    list_drivers: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // Load before tracing so `[shared] log_level` applies; report afterwards.
    let loaded = load_config_or_default(&args.config);
    let configured = loaded
        .as_ref()
        .map(|l| l.robot.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, configured);

    info!("Pilot Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args, loaded) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Pilot Control Unit shutdown complete");
}

fn run(
    args: &Args,
    loaded: Result<LoadedConfig, ConfigError>,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = DriverRegistry::with_builtin();
    if args.list_drivers {
        for name in registry.list_drivers() {
            println!("{name}");
        }
        return Ok(());
    }

    let mut loaded = loaded?;
    info!(
        "Config OK: service={}, loop={}ms, routines={}",
        loaded.robot.shared.service_name,
        loaded.robot.timing.loop_period_ms,
        loaded.catalog.len(),
    );

    if args.advance > 0 {
        if args.driver != "simulation" {
            warn!("--advance only affects the simulation driver");
        }
        let advance = loaded.robot.bindings.selector_advance;
        let presses = (0..args.advance)
            .flat_map(|_| [ScriptFrame::hold(1, &[advance]), ScriptFrame::hold(1, &[])]);
        let script = std::mem::take(&mut loaded.robot.simulation.script);
        loaded.robot.simulation.script = presses.chain(script).collect();
    }

    let backend = registry.create_backend(&args.driver, &loaded.robot)?;
    info!("Backend '{}' created", backend.driver);

    let mut ctx = RobotContext::new(loaded, backend)?;
    register_demo_routines(&mut ctx);

    // Ctrl-C ends the current phase and skips the rest of the match.
    let stop = Arc::new(AtomicBool::new(false));
    let phase = ctx.phase_flag();
    let s = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        s.store(true, Ordering::SeqCst);
        phase.store(false, Ordering::SeqCst);
    })?;

    let timeline = MatchTimeline {
        pre_match: Duration::from_millis(args.pre_match_ms),
        autonomous: Duration::from_millis(args.autonomous_ms),
        driver: Duration::from_millis(args.driver_ms),
    };
    let report = run_match(&mut ctx, &timeline, &stop)?;

    if let Some(auton) = &report.autonomous {
        info!(
            "Autonomous: #{} '{}' ({:?})",
            auton.index, auton.routine, auton.outcome
        );
    }
    if let Some(stats) = &report.operator {
        info!(
            "Operator control: {} cycles, avg {}us, max {}us, {} overruns",
            stats.cycle_count,
            stats.avg_cycle_us(),
            stats.max_cycle_us,
            stats.overruns
        );
    }
    let final_pose = ctx.chassis().pose();
    info!(
        "Final pose: x={:.3} y={:.3} heading={:.3}",
        final_pose.x, final_pose.y, final_pose.heading
    );
    ctx.shutdown();
    Ok(())
}

/// Simple drive-and-stop routines so the simulated match visibly moves.
fn register_demo_routines(ctx: &mut RobotContext) {
    let half_second = Duration::from_millis(500);
    let ids: Vec<String> = ctx
        .config()
        .catalog
        .entries()
        .iter()
        .map(|e| e.id.clone())
        .collect();
    for (i, id) in ids.into_iter().enumerate() {
        // Odd routines arc right, even routines arc left.
        let (left, right) = if i % 2 == 0 { (60, 40) } else { (40, 60) };
        ctx.register_routine(
            id,
            DriveFor {
                left,
                right,
                duration: half_second,
            },
        );
    }
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let directive: Directive = if args.verbose {
        Level::DEBUG.into()
    } else {
        configured
            .as_directive()
            .parse()
            .unwrap_or_else(|_| Level::INFO.into())
    };

    let filter = EnvFilter::from_default_env().add_directive(directive);

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
