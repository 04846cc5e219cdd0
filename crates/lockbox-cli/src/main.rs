//! `lockbox`: interactive simulator for the compartment lock controller.
//!
//! Reads keypad input and lock sensor commands from stdin, runs the access
//! state machine against a simulated GPIO bank, draws the virtual display on
//! stdout and prints telemetry as JSON lines.

mod command;
mod config;
mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use lockbox_core::LockerConfig;
use lockbox_engine::{AccessStateMachine, VirtualDisplay};
use lockbox_hardware::mock::{MockGpio, MockKeypad, MockKeypadHandle};
use lockbox_hardware::{Clock, KeypadSource, SystemClock};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::command::{Command, parse_line};
use crate::telemetry::JsonLinesTelemetry;

#[derive(Debug, Parser)]
#[command(
    name = "lockbox",
    version,
    about = "Compartment lock controller simulator"
)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the polling interval in milliseconds.
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(ms) = cli.tick_ms {
        config.timing.tick_interval_ms = ms;
        config.validate().context("invalid --tick-ms")?;
    }

    if cli.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    run(config).await
}

async fn run(config: LockerConfig) -> anyhow::Result<()> {
    let tick = config.timing.tick_interval();
    let sensor_line = config.sensor.sensor_line;

    let gpio = MockGpio::new();
    let (keypad, keys) = MockKeypad::new();
    let display = VirtualDisplay::builder()
        .with_output(std::io::stdout())
        .build();

    let machine = AccessStateMachine::builder(gpio.clone(), gpio.clone(), SystemClock)
        .with_config(config)
        .with_telemetry(JsonLinesTelemetry::new(std::io::stdout()))
        .with_presentation(display)
        .build()
        .context("failed to start controller")?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let driver = {
        let shutdown = Arc::clone(&shutdown);
        tokio::task::spawn_blocking(move || drive(machine, keypad, tick, &shutdown))
    };

    info!(tick_ms = tick.as_millis() as u64, "simulator running");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    loop {
        let result = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            },
            res = lines.next_line() => res,
        };

        let line = match result {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("input closed");
                break;
            }
            Err(e) => {
                error!(error = %e, "failed to read input");
                break;
            }
        };

        match parse_line(&line) {
            Ok(Command::Keys(pressed)) => {
                for key in pressed {
                    keys.send_key(key).await?;
                }
            }
            Ok(Command::Lock(position)) => {
                // Keys typed earlier must be handled before the lock moves
                settle(&keys, tick).await;
                info!(%position, "moving lock");
                gpio.set_input(sensor_line, position.to_level());
                settle(&keys, tick).await;
            }
            Ok(Command::Quit) => break,
            Err(e) => warn!("{e:#}"),
        }
    }

    settle(&keys, tick).await;
    shutdown.store(true, Ordering::Relaxed);
    driver.await.context("controller thread panicked")?;

    Ok(())
}

/// Wait until every queued key has been polled and released.
async fn settle(keys: &MockKeypadHandle, tick: Duration) {
    while keys.queued() > 0 {
        tokio::time::sleep(tick).await;
    }
    tokio::time::sleep(tick * 2).await;
}

/// Polling loop, run on a blocking thread.
fn drive(
    mut machine: AccessStateMachine<MockGpio, MockGpio, SystemClock>,
    mut keypad: MockKeypad,
    tick: Duration,
    shutdown: &AtomicBool,
) {
    let clock = SystemClock;

    while !shutdown.load(Ordering::Relaxed) {
        let key = keypad.poll_key();
        let outcome = machine.tick(key);

        if let Some(fault) = outcome.fault {
            if fault.is_transient() {
                warn!(error = %fault, "tick faulted, retrying");
            } else {
                error!(error = %fault, "tick faulted");
            }
        }

        clock.sleep(tick);
    }

    info!(state = %machine.state(), "controller stopped");
}
