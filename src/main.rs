//! vstick - headless host for the virtual stick engine
//!
//! Replays recorded pointer traces through the engine and prints the
//! resulting snapshots, optionally following config file edits.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use virtual_stick::config::{ConfigPatch, ConfigWatcher, StickConfig};
use virtual_stick::engine::{refresh_period, Callbacks, Joystick, JoystickActor, JoystickHandle};
use virtual_stick::geometry::Rect;
use virtual_stick::haptics::CountingHaptics;
use virtual_stick::paths::AppPaths;
use virtual_stick::snapshot::Snapshot;
use virtual_stick::surface::{HeadlessProbe, HeadlessSurface};
use virtual_stick::trace::{load_trace, TraceAction, TraceStep};

/// Virtual stick - map pointer drags to a normalized joystick vector
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the stick configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pointer trace to replay (CSV: t_ms,kind,id,x,y)
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Print snapshots as JSON lines
    #[arg(long)]
    json: bool,

    /// Reload the config file into the running engine when it changes
    #[arg(short, long)]
    watch: bool,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    print_config: bool,

    /// Print the configuration JSON schema and exit
    #[arg(long)]
    schema: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// JSON log file (defaults to vstick.log in the logs directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    if args.schema {
        let schema = schemars::schema_for!(StickConfig);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let paths = AppPaths::detect(args.config.as_deref());
    let log_file = args.log_file.clone().unwrap_or_else(|| paths.log_file());
    let _log_guard = init_logging(&args.log_level, &log_file);

    info!("Starting vstick v{}...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = paths.ensure_directories() {
        warn!("Failed to prepare {}: {:#}", paths.base_dir().display(), e);
    }

    let config_path = paths.config.to_string_lossy().into_owned();
    let (watcher, config) = if args.watch {
        let (watcher, config) = ConfigWatcher::new(config_path.clone()).await?;
        info!("Configuration loaded from {} with hot-reload enabled", config_path);
        (Some(watcher), config)
    } else {
        (None, load_config(&paths, args.config.is_some()).await?)
    };

    if args.print_config {
        print!("{}", serde_yaml::to_string(&config).context("Failed to serialize config")?);
        return Ok(());
    }

    let steps = match &args.trace {
        Some(path) => Some(load_trace(path).await?),
        None => None,
    };

    run_app(config, steps, watcher, args.json, shutdown_signal()).await?;

    info!("vstick shutdown complete");
    Ok(())
}

async fn load_config(paths: &AppPaths, explicit: bool) -> Result<StickConfig> {
    if paths.config.exists() {
        let config = StickConfig::load(&paths.config.to_string_lossy()).await?;
        info!("Configuration loaded from {}", paths.config.display());
        return Ok(config);
    }

    if explicit {
        bail!("Config file not found: {}", paths.config.display());
    }

    info!("No config at {}, using defaults", paths.config.display());
    Ok(StickConfig::default())
}

async fn run_app(
    config: StickConfig,
    steps: Option<Vec<TraceStep>>,
    mut watcher: Option<ConfigWatcher>,
    json: bool,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    let refresh_hz = config.refresh_hz;
    let surface = HeadlessSurface::new(Rect::new(0.0, 0.0, config.width, config.height));
    let probe = surface.probe();
    let haptics = CountingHaptics::new();

    let mut joystick = Joystick::new(Box::new(surface), Box::new(haptics.clone()), config)?;
    joystick.set_callbacks(Printer::new(json).callbacks());

    let handle = JoystickActor::spawn(joystick);

    let replay_done = async {
        match steps {
            Some(steps) => replay(&handle, &probe, steps, refresh_hz).await,
            None => std::future::pending().await,
        }
    };

    tokio::pin!(shutdown);
    tokio::pin!(replay_done);

    loop {
        tokio::select! {
            result = &mut replay_done => {
                result?;
                info!("Trace replay finished");
                break;
            }

            Some(new_config) = next_reload(&mut watcher) => {
                info!("Configuration file changed, reloading...");
                match handle.update_config(ConfigPatch::from(new_config)).await {
                    Ok(()) => info!("Configuration reloaded"),
                    Err(e) => warn!("Failed to reload config (keeping old config): {}", e),
                }
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping");
                break;
            }
        }
    }

    let final_state = handle.get_state().await?;
    handle.destroy().await;

    if json {
        println!(
            "{}",
            serde_json::json!({ "event": "summary", "haptic_pulses": haptics.pulses(), "snapshot": final_state })
        );
    } else {
        println!(
            "{} {} haptic pulse(s), final {}",
            "summary".bold().cyan(),
            haptics.pulses().to_string().green(),
            describe(&final_state)
        );
    }

    Ok(())
}

/// Feed trace steps into the engine at their recorded offsets
async fn replay(
    handle: &JoystickHandle,
    probe: &HeadlessProbe,
    steps: Vec<TraceStep>,
    refresh_hz: u32,
) -> Result<()> {
    let start = Instant::now();

    for step in steps {
        tokio::time::sleep_until(start + step.at).await;

        match step.action {
            TraceAction::Input(input) => handle.send_input(input),
            TraceAction::Resize { width, height } => {
                let center = probe.state().container.center();
                probe.set_container(Rect::centered_at(center, width, height));
                handle.rescale();
            }
        }
    }

    // Wait for queued input to drain, then let one more emission tick pass
    handle
        .get_state()
        .await
        .context("Stick engine stopped during replay")?;
    tokio::time::sleep(refresh_period(refresh_hz)).await;

    Ok(())
}

async fn next_reload(watcher: &mut Option<ConfigWatcher>) -> Option<StickConfig> {
    match watcher {
        Some(watcher) => watcher.next_config().await,
        None => std::future::pending().await,
    }
}

/// Prints engine callbacks, collapsing repeated identical snapshots
struct Printer {
    json: bool,
    last: Mutex<Option<Snapshot>>,
}

impl Printer {
    fn new(json: bool) -> Arc<Self> {
        Arc::new(Self {
            json,
            last: Mutex::new(None),
        })
    }

    fn callbacks(self: Arc<Self>) -> Callbacks {
        let start = self.clone();
        let change = self.clone();
        let end = self;
        Callbacks {
            on_start: Some(Arc::new(move |s: &Snapshot| start.print("start", s))),
            on_change: Some(Arc::new(move |s: &Snapshot| {
                if change.is_new(s) {
                    change.print("change", s);
                }
            })),
            on_end: Some(Arc::new(move |s: &Snapshot| end.print("end", s))),
        }
    }

    fn is_new(&self, snapshot: &Snapshot) -> bool {
        let mut last = self.last.lock();
        if last.as_ref() == Some(snapshot) {
            return false;
        }
        *last = Some(snapshot.clone());
        true
    }

    fn print(&self, event: &str, snapshot: &Snapshot) {
        if self.json {
            println!("{}", serde_json::json!({ "event": event, "snapshot": snapshot }));
            return;
        }

        let label = match event {
            "start" => format!("{:<6}", event).green().bold(),
            "end" => format!("{:<6}", event).red().bold(),
            _ => format!("{:<6}", event).normal(),
        };
        println!("{} {}", label, describe(snapshot));
    }
}

fn describe(snapshot: &Snapshot) -> String {
    format!(
        "dx={:+.3} dy={:+.3} dist={:.3} angle={:>7.1}° zone={} pressed={}",
        snapshot.delta.x,
        snapshot.delta.y,
        snapshot.distance,
        snapshot.angle_degrees(),
        snapshot.zone.as_deref().unwrap_or("-").yellow(),
        snapshot.pressed
    )
}

/// Console logs go to stderr, the file gets JSON lines.
///
/// An unwritable log file leaves console logging in place.
fn init_logging(level: &str, log_file: &Path) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // stdout carries snapshots
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let (writer, guard, file_error) = match open_log_file(log_file) {
        Ok((writer, guard)) => (Some(writer), Some(guard), None),
        Err(e) => (None, None, Some(e)),
    };
    let file_layer = writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        warn!("File logging disabled: {:#}", e);
    }

    guard
}

fn open_log_file(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .with_context(|| format!("Invalid log file path: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, name);
    Ok(tracing_appender::non_blocking(appender))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install CTRL+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}
