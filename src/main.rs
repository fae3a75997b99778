//! sprinklerd: irrigation relay controller daemon.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  JsonConfigFile   LogEventSink   MonotonicClock   PinDriver    │
//! │  (ConfigPort)     (EventSink)    (Clock)          (gpioset /   │
//! │                                                    cdev / sim) │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │             Controller (pure logic)                    │    │
//! │  │  Interlock · Read-back · Runtime cap · Heartbeat       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Processor thread (gpio-loop) ◀── Mailbox ◀── Gateway ◀── stdin │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Requests arrive one JSON object per line on stdin; each is answered
//! with one JSON line on stdout.  Logs go to stderr.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{error, info, warn};
use tracing_subscriber::EnvFilter;

use sprinkler::adapters::config_file::JsonConfigFile;
use sprinkler::adapters::hardware::build_driver;
use sprinkler::adapters::log_sink::LogEventSink;
use sprinkler::adapters::time::MonotonicClock;
use sprinkler::app::ports::ConfigPort;
use sprinkler::app::service::Controller;
use sprinkler::config::SystemConfig;
use sprinkler::error::Error;
use sprinkler::rpc::channels::Mailbox;
use sprinkler::rpc::codec::{decode_request, encode_bad_request, encode_response};
use sprinkler::rpc::engine::{self, Processor};
use sprinkler::rpc::gateway::Gateway;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sprinkler=info,sprinklerd=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config() -> Result<SystemConfig> {
    match JsonConfigFile::from_args_or_env(std::env::args().skip(1)) {
        Some(file) => {
            file.load()
                .map_err(Error::Config)
                .with_context(|| format!("loading {}", file.path().display()))
        }
        None => {
            warn!("No config file given, using built-in pin map");
            Ok(SystemConfig::default())
        }
    }
}

fn main() -> Result<()> {
    // ── 1. Logging and configuration ──────────────────────────
    init_logging();
    info!("sprinklerd {} starting", env!("CARGO_PKG_VERSION"));
    let config = load_config()?;

    // ── 2. Hardware ───────────────────────────────────────────
    let driver = build_driver(&config)
        .map_err(Error::Config)
        .context("opening pin backend")?;
    let mut controller =
        Controller::new(&config, driver, MonotonicClock::new()).context("building controller")?;

    let mut sink = LogEventSink::new();
    if let Err(e) = controller.start(config.reset_on_start, &mut sink) {
        error!("Initial reset failed, zone states unknown: {}", e);
    }

    // ── 3. Processor thread ───────────────────────────────────
    let mailbox = Arc::new(Mailbox::new());
    let processor = Processor::new(
        controller,
        mailbox.clone(),
        sink,
        Duration::from_millis(config.tick_interval_ms.into()),
    );
    let _worker = engine::spawn(processor).context("spawning processor thread")?;

    // ── 4. Console ────────────────────────────────────────────
    let gateway = Gateway::new(mailbox, Duration::from_millis(config.response_timeout_ms.into()));
    info!("Ready. Reading requests from stdin.");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = match decode_request(&line) {
            Ok(instruction) => encode_response(&gateway.submit(instruction)),
            Err(e) => {
                warn!("{}", e);
                encode_bad_request(&e)
            }
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}
