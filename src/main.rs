use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use instant::Instant;

use motionfield::ecs::components::DEFAULT_TRAIL_LEN;
use motionfield::{Hooks, LogSink, Preset, Runner, SessionConfig, TickPlan};

/// Run a motion scene headless, logging frames instead of drawing them.
#[derive(Parser, Debug)]
#[command(name = "motionfield", version, about)]
struct Args {
    /// Built-in scene to run (ignored when --config is given).
    #[arg(short, long, default_value = "cat-mouse-evasive", value_parser = parse_preset)]
    preset: Preset,

    /// TOML scene description.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wall-clock seconds to run before stopping.
    #[arg(short, long, default_value_t = 10.0)]
    seconds: f64,

    /// Seed for evasive turns and random paths.
    #[arg(long)]
    seed: Option<u64>,

    /// Keep a trail of recent positions for every body.
    #[arg(long)]
    trails: bool,

    /// Log one frame out of every N (frames are logged at debug level).
    #[arg(long, default_value_t = 60)]
    log_every: u64,
}

fn parse_preset(label: &str) -> Result<Preset, String> {
    Preset::from_label(label).ok_or_else(|| {
        let known: Vec<&str> = Preset::ALL.iter().map(|p| p.label()).collect();
        format!("unknown preset `{label}` (expected one of: {})", known.join(", "))
    })
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => {
            log::info!("Using preset {}", args.preset.label());
            args.preset.config()
        }
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.trails && config.trail == 0 {
        config.trail = DEFAULT_TRAIL_LEN;
    }
    if !(args.seconds.is_finite() && args.seconds >= 0.0) {
        return Err(format!("--seconds must be a non-negative number, got {}", args.seconds).into());
    }

    let (session, names) = config.build()?;
    let runner = Runner::new(session);
    let hooks = Hooks::new(LogSink::new(args.log_every)).with_state(|body, _field| {
        log::trace!("{} at ({:.2}, {:.2})", body.label, body.position.x, body.position.y);
    });
    runner.toggle(TickPlan::new(), hooks)?;

    let deadline = Instant::now() + Duration::from_secs_f64(args.seconds);
    while runner.is_running() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    runner.stop();

    runner.with_session(|session| {
        match session.last_stop() {
            Some(reason) => log::info!("Stopped after {:.2}s: {reason:?}", session.clock().as_secs_f64()),
            None => log::info!("Ran for {:.2}s", session.clock().as_secs_f64()),
        }
        let mut bodies: Vec<_> = names.iter().collect();
        bodies.sort_by_key(|entry| entry.1.id());
        for (name, &entity) in bodies {
            if let Ok(pos) = session.position(entity) {
                log::info!("{name}: ({:.2}, {:.2})", pos.x, pos.y);
            }
        }
    });
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("motionfield starting up");

    if let Err(e) = run(Args::parse()) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
