//! # VELA Host
//!
//! Simulation host for VELA controllers: builds the simulated command slots,
//! an in-process command bus and the controller from its registry, walks the
//! controller through the lifecycle and drives the periodic update loop.
//!
//! A demo generator thread plays the non-real-time transport context: it
//! streams twist and gripper commands in bursts with silent gaps, so the
//! staleness interlock is visible in the status output.

mod config;
mod rt;

use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use vela_common::config::ConfigLoader;
use vela_common::lifecycle::{
    CallbackOutcome, LifecycleEvent, LifecycleStateMachine, TransitionResult, UpdateOutcome,
};
use vela_common::slots::{CommandSlot, SlotRegistry};
use vela_twist_controller::messages::{GripperVelocityCommand, TwistCommand, Vector3};
use vela_twist_controller::plugin::{ConfigureContext, Controller, ControllerRegistry};
use vela_twist_controller::transport::{LoopbackTransport, GRIPPER_CHANNEL, TWIST_CHANNEL};
use vela_twist_controller::TWIST_RELAY_TYPE_ID;

use crate::config::HostConfig;

/// VELA Host — periodic driver for the twist relay controller
#[derive(Parser, Debug)]
#[command(name = "vela_host")]
#[command(author = "VELA Robotics")]
#[command(version)]
#[command(about = "Simulation host for VELA velocity relay controllers")]
struct Args {
    /// Path to the host configuration TOML.
    #[arg(default_value = "config/host.toml")]
    config: PathBuf,

    /// Stop after N cycles (default: run until ctrl-c).
    #[arg(long)]
    cycles: Option<u64>,

    /// CPU core to pin the loop thread to (`rt` feature only).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (`rt` feature only).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!("VELA host v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("VELA host shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = load_host_config(&args.config)?;
    cfg.validate()?;
    info!(
        service = %cfg.shared.service_name,
        cycle_time_us = cfg.host.cycle_time_us,
        slots = cfg.host.command_slots.len(),
        "Config OK"
    );

    // Simulated hardware: one slot per configured name. The host keeps the
    // handles so it can report what the controller wrote.
    let mut slot_registry = SlotRegistry::new();
    let mut observed: Vec<CommandSlot> = Vec::with_capacity(cfg.host.command_slots.len());
    for name in &cfg.host.command_slots {
        observed.push(slot_registry.register(name)?);
    }

    let transport = Arc::new(LoopbackTransport::new());

    let controllers = ControllerRegistry::with_defaults();
    let mut controller = controllers.create(TWIST_RELAY_TYPE_ID)?;
    info!(type_id = TWIST_RELAY_TYPE_ID, "controller instantiated");

    // ── Lifecycle bring-up ──
    let mut lifecycle = LifecycleStateMachine::new();
    expect_success(controller.on_init(), "on_init")?;

    let ctx = ConfigureContext {
        params: cfg.controller.clone(),
        slots: &slot_registry,
        transport: transport.as_ref(),
    };
    expect_success(controller.on_configure(&ctx), "on_configure")?;
    commit(&mut lifecycle, LifecycleEvent::Configure)?;

    expect_success(controller.on_activate(), "on_activate")?;
    commit(&mut lifecycle, LifecycleEvent::Activate)?;
    info!(state = ?lifecycle.state(), "controller active");

    rt::configure_rt_thread(args.cpu_core, args.rt_priority)?;

    // ── Shutdown signal ──
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    // ── Demo command generator (the non-RT arrival context) ──
    let generator = spawn_demo_generator(
        Arc::clone(&transport),
        cfg.host.demo_rate_hz,
        Arc::clone(&running),
    );

    // ── Periodic loop ──
    let period = Duration::from_micros(cfg.host.cycle_time_us as u64);
    let mut cycles = 0u64;
    let mut cycle_errors = 0u64;
    let mut overruns = 0u64;

    while running.load(Ordering::SeqCst) && args.cycles.is_none_or(|max| cycles < max) {
        let cycle_start = Instant::now();

        if controller.update(cycle_start, period) == UpdateOutcome::Error {
            cycle_errors += 1;
        }
        cycles += 1;

        if cycles % cfg.host.status_interval_cycles == 0 {
            let values: Vec<f64> = observed.iter().map(|s| s.value()).collect();
            info!(cycle = cycles, ?values, "relay status");
        }

        let elapsed = cycle_start.elapsed();
        if elapsed > period {
            overruns += 1;
            warn!(?elapsed, ?period, "cycle overrun");
        } else {
            thread::sleep(period - elapsed);
        }
    }

    running.store(false, Ordering::SeqCst);
    if let Err(e) = generator.join() {
        warn!("demo generator panicked: {e:?}");
    }

    // ── Lifecycle teardown ──
    expect_success(controller.on_deactivate(), "on_deactivate")?;
    commit(&mut lifecycle, LifecycleEvent::Deactivate)?;
    commit(&mut lifecycle, LifecycleEvent::Finalize)?;

    info!(cycles, cycle_errors, overruns, "host loop finished");
    Ok(())
}

/// Load the host config, falling back to the built-in one when the file is
/// missing.
fn load_host_config(path: &PathBuf) -> Result<HostConfig, Box<dyn std::error::Error>> {
    use vela_common::config::ConfigError;

    match HostConfig::load(path) {
        Ok(cfg) => Ok(cfg),
        Err(ConfigError::FileNotFound) => {
            warn!(
                "No config file at '{}'. Using built-in simulation config.",
                path.display()
            );
            Ok(HostConfig::load_from_str(config::DEFAULT_CONFIG)?)
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Map a callback outcome onto the host's error handling.
fn expect_success(
    outcome: CallbackOutcome,
    callback: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        CallbackOutcome::Success => Ok(()),
        other => Err(format!("controller {callback} returned {other:?}").into()),
    }
}

/// Apply a lifecycle event, treating a rejection as fatal.
fn commit(
    lifecycle: &mut LifecycleStateMachine,
    event: LifecycleEvent,
) -> Result<(), Box<dyn std::error::Error>> {
    match lifecycle.handle_event(event) {
        TransitionResult::Ok(_) => Ok(()),
        TransitionResult::Rejected(reason) => {
            Err(format!("lifecycle rejected {event:?}: {reason}").into())
        }
    }
}

/// Stream demo twist/gripper commands: 2 s bursts with 1 s silent gaps, so
/// the staleness interlock fires visibly between bursts.
fn spawn_demo_generator(
    transport: Arc<LoopbackTransport>,
    rate_hz: f64,
    running: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        if rate_hz <= 0.0 {
            info!("demo generator disabled (rate 0)");
            return;
        }
        let tick = Duration::from_secs_f64(1.0 / rate_hz);
        let start = Instant::now();

        while running.load(Ordering::SeqCst) {
            let t = start.elapsed().as_secs_f64();

            if t % 3.0 < 2.0 {
                let phase = t * std::f64::consts::TAU * 0.2;
                transport.publish_twist(
                    TWIST_CHANNEL,
                    TwistCommand::new(
                        Instant::now(),
                        Vector3::new(0.05 * phase.sin(), 0.05 * phase.cos(), 0.0),
                        Vector3::new(0.0, 0.0, 0.2 * phase.sin()),
                    ),
                );
                let gripper = if (t as u64) % 2 == 0 { 0.02 } else { -0.02 };
                transport.publish_gripper(GRIPPER_CHANNEL, GripperVelocityCommand::new(gripper));
            }

            thread::sleep(tick);
        }
    })
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

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
