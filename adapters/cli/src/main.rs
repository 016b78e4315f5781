#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Number Rush in a terminal.

mod config;
mod input;
mod session;
mod terminal;

use std::{
    io::{self, BufRead},
    path::PathBuf,
    sync::{mpsc, Arc},
    thread,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use number_rush_core::TimerStartPolicy;
use number_rush_system_persistence::{
    DisabledRemote, FileStore, HttpRemoteStore, PersistenceGateway,
};
use number_rush_world::{Config, World};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{FileConfig, Settings};
use session::{Message, Session, SharedRemote};
use terminal::TerminalPresentation;

/// Click the board's numbers in ascending order before the timer runs out.
#[derive(Debug, Parser)]
#[command(name = "number-rush", version)]
struct Args {
    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for board generation. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// When the per-move countdown starts on a fresh board.
    #[arg(long, value_enum)]
    timer_start: Option<TimerStartArg>,
    /// Directory holding local saves.
    #[arg(long, value_name = "DIR")]
    save_dir: Option<PathBuf>,
}

/// Command-line spelling of [`TimerStartPolicy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TimerStartArg {
    /// Start counting as soon as the board appears.
    Immediate,
    /// Start counting after the first correct click.
    OnFirstMatch,
}

impl From<TimerStartArg> for TimerStartPolicy {
    fn from(value: TimerStartArg) -> Self {
        match value {
            TimerStartArg::Immediate => Self::Immediate,
            TimerStartArg::OnFirstMatch => Self::OnFirstMatch,
        }
    }
}

/// Entry point for the Number Rush command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&args, file, |name| std::env::var(name).ok());
    info!(
        seed = settings.seed,
        timer_start = ?settings.timer_start,
        save_dir = %settings.save_dir.display(),
        remote = settings.remote.is_some(),
        "starting session"
    );

    let local = FileStore::open(&settings.save_dir).with_context(|| {
        format!(
            "failed to prepare save directory at {}",
            settings.save_dir.display()
        )
    })?;
    let remote: SharedRemote = match settings.remote {
        Some(remote) => Arc::new(HttpRemoteStore::new(remote)),
        None => {
            info!("shared storage is not configured; save codes stay on this device");
            Arc::new(DisabledRemote)
        }
    };

    let world = World::new(Config::new(settings.timer_start, settings.seed));
    let (outbox, inbox) = mpsc::channel();
    spawn_stdin_reader(outbox.clone());

    let mut session = Session::new(
        world,
        PersistenceGateway::new(local, remote),
        TerminalPresentation::new(io::stdout()),
        outbox,
    );
    session.boot();
    session.run(&inbox);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn spawn_stdin_reader(outbox: mpsc::Sender<Message>) {
    let _ = thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if outbox.send(Message::Line(line)).is_err() {
                        return;
                    }
                }
                Err(error) => {
                    warn!(%error, "failed to read stdin");
                    break;
                }
            }
        }
        let _ = outbox.send(Message::Eof);
    });
}
