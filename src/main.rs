//! ═══════════════════════════════════════════════════════════════════════════════
//! CRIBWATCH — Unified Entry Point
//! ═══════════════════════════════════════════════════════════════════════════════
//! Single binary, subcommand dispatch. Replays recorded feeds through
//! the monitoring session for tuning and demos.
//! ═══════════════════════════════════════════════════════════════════════════════

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cribwatch::{
    ConsoleSink, EscalationStrategy, FeedEvent, MonitorConfig, MonitorSession, SessionEvent,
    ThresholdTable, TimePoint,
};

const RESET: &str = "\x1b[0m";

#[derive(Parser)]
#[command(name = "cribwatch")]
#[command(about = "Cribwatch - Baby Monitor Alerting Core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSONL feed of readings/thresholds through a session
    Replay {
        /// Feed file, one JSON event per line
        file: PathBuf,

        /// Use the priority-weighted escalation strategy
        #[arg(long)]
        priority: bool,

        /// Real-time pacing between feed lines (ms); 0 replays flat out
        #[arg(long, default_value = "0")]
        interval_ms: u64,

        /// JSON config file overriding the default parameters
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the default config and threshold table as JSON
    Defaults,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Replay {
            file,
            priority,
            interval_ms,
            config,
        } => cmd_replay(file, priority, interval_ms, config),
        Commands::Defaults => cmd_defaults(),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<MonitorConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).context("parsing config")?
        }
        None => MonitorConfig::default(),
    };
    config.validate().context("validating config")?;
    Ok(config)
}

fn cmd_replay(
    file: PathBuf,
    priority: bool,
    interval_ms: u64,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if priority {
        config.strategy = EscalationStrategy::PriorityWeighted;
    }

    let mut session = MonitorSession::new(
        config,
        ThresholdTable::infant_defaults(),
        Box::new(ConsoleSink),
    );

    let reader = BufReader::new(
        File::open(&file).with_context(|| format!("opening feed {}", file.display()))?,
    );

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event: FeedEvent = match serde_json::from_str(&line) {
            Ok(ev) => ev,
            Err(e) => {
                eprintln!("line {}: skipping malformed event: {}", line_no + 1, e);
                continue;
            }
        };

        let now = Instant::now();
        match event {
            FeedEvent::Reading(ev) => session.handle_raw(&ev, TimePoint::now()),
            FeedEvent::Threshold(ev) => session.handle_raw_threshold(&ev, now),
            FeedEvent::Cancel => session.cancel_alert(now),
        }
        session.tick(now);
        print_events(&mut session);

        if interval_ms > 0 {
            thread::sleep(Duration::from_millis(interval_ms));
        }
    }

    // Let pending timers (sound decay, popup hide) run out
    while let Some(deadline) = session.next_deadline() {
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
        session.tick(Instant::now());
        print_events(&mut session);
    }

    let level = session.level();
    println!(
        "\nfinal level: {}{}{}",
        level.color(),
        level.name(),
        RESET
    );
    println!("{}", serde_json::to_string_pretty(&session.stats())?);
    Ok(())
}

fn print_events(session: &mut MonitorSession) {
    for event in session.drain_events() {
        match event {
            SessionEvent::SafetyChanged { kind, safe } => {
                let (color, word) = if safe {
                    ("\x1b[32m", "safe")
                } else {
                    ("\x1b[31m", "unsafe")
                };
                println!("  {} -> {}{}{}", kind.name(), color, word, RESET);
            }
            SessionEvent::LevelChanged { from, to } => {
                println!(
                    "LEVEL {}{}{} -> {}{}{}",
                    from.color(),
                    from.name(),
                    RESET,
                    to.color(),
                    to.name(),
                    RESET
                );
            }
            SessionEvent::AlertFired { level } => {
                println!("{}ALERT FIRED ({}){}", level.color(), level.name(), RESET);
            }
            SessionEvent::PopupHidden => println!("  popup hidden"),
            SessionEvent::EvaluationSkipped { kind } => {
                println!("  {} skipped (no threshold)", kind.name());
            }
            SessionEvent::ReadingRejected { sensor_id } => {
                println!("  rejected reading from sensor {}", sensor_id);
            }
        }
    }
}

fn cmd_defaults() -> Result<()> {
    let config = MonitorConfig::default();
    let thresholds = ThresholdTable::infant_defaults();
    println!("{}", serde_json::to_string_pretty(&config)?);
    println!("{}", serde_json::to_string_pretty(&thresholds)?);
    Ok(())
}
