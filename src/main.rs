use chrono::Local;
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use procon_session::config::{AppConfig, BackendKind};
use procon_session::controller::{DeviceSession, GilrsSubsystem, InputSubsystem, SimulatedSubsystem};
use std::path::PathBuf;
use std::str::FromStr;
use std::thread;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Poll a Nintendo Switch Pro Controller and dump its state
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of refresh iterations
    #[arg(short = 'n', long)]
    iterations: Option<u32>,

    /// Pause between iterations in milliseconds
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Use the in-memory simulated controller instead of real hardware
    #[arg(long)]
    simulate: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Write the default config file and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() -> Result<()> {
    setup()?;
    let args = Args::parse();

    if args.write_default_config {
        let path = AppConfig::ensure_default_config()?;
        println!("Config: {}", path.display());
        return Ok(());
    }

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(iterations) = args.iterations {
        config.polling.iterations = iterations;
    }
    if let Some(interval_ms) = args.interval_ms {
        config.polling.interval_ms = interval_ms;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if args.simulate {
        config.backend.kind = BackendKind::Simulated;
    }

    setup_logging_env(&config.logging.level)?;
    debug!("Effective configuration: {:?}", config);

    match config.backend.kind {
        BackendKind::Gilrs => {
            let subsystem = GilrsSubsystem::new()
                .map_err(|e| eyre!("Failed to initialize input subsystem: {}", e))?;
            check_procon(DeviceSession::new(subsystem), &config);
        }
        BackendKind::Simulated => {
            info!("Using simulated input subsystem");
            check_procon(DeviceSession::new(SimulatedSubsystem::demo()), &config);
        }
    }

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    Ok(())
}

fn setup_logging_env(level: &str) -> Result<()> {
    let level = Level::from_str(level).map_err(|e| eyre!("Invalid log level '{}': {}", level, e))?;
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

// Scan once, then refresh and dump the controller state every interval,
// re-scanning whenever the controller has gone away.
fn check_procon<S: InputSubsystem>(mut session: DeviceSession<S>, config: &AppConfig) {
    if let Err(e) = session.scan() {
        warn!("Initial scan failed: {}", e);
        return;
    }

    if let Some(description) = session.describe_connected() {
        println!("{description}");
    }

    let count = config.polling.iterations;
    for i in 0..count {
        println!("loop {} ({})", i, Local::now().format("%H:%M:%S%.3f"));

        if !session.is_connected() {
            info!("Gamepad not connected, scanning again");
            if let Err(e) = session.scan() {
                warn!("Re-scan failed: {}", e);
                return;
            }
        }

        if let Err(e) = session.refresh() {
            warn!("Refresh failed: {}", e);
        }

        if let Some(report) = session.report() {
            println!("{report}");
        }

        if i + 1 < count {
            thread::sleep(config.polling.interval());
        }
    }

    info!("Finished {} iterations", count);
}
