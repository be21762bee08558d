//! panelkit-host: drives the panel registry from a JSON-lines script.
//!
//! Each input line is either a plugin command (`open`, `attach`,
//! `close_panel`, `reap`, `status`) or a raw host event (`interaction`,
//! `close`, `disconnect`). One JSON report per line is written to stdout.

mod driver;
mod render;
mod script;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use panelkit_config::PanelkitConfig;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::driver::Driver;
use crate::script::parse_line;

#[derive(Parser)]
#[command(name = "panelkit-host", about = "Scripted host for panelkit panels")]
struct Args {
    /// Config file. Defaults to the platform config directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Script to replay. Reads stdin when omitted.
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Overrides `[logging] level` from the config.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Config warnings are emitted before the configured subscriber exists.
    let bootstrap = tracing_subscriber::fmt().with_env_filter("warn").finish();
    let config = tracing::subscriber::with_default(bootstrap, || {
        panelkit_config::load_config(args.config.as_deref())
    })
    .unwrap_or_else(|e| {
        eprintln!("panelkit-host: {e}, using defaults");
        PanelkitConfig::default()
    });

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.as_directive().to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("panelkit_host={level},panelkit_core={level}").into()),
        )
        .init();

    let driver = Arc::new(Driver::from_config(&config));
    spawn_event_logger(&driver);
    if config.registry.session_ttl_secs > 0 {
        spawn_reaper(&driver, &config);
    }

    let input: Box<dyn AsyncBufRead + Unpin + Send> = match &args.script {
        Some(path) => match tokio::fs::File::open(path).await {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "cannot open script");
                std::process::exit(1);
            }
        },
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    run(&driver, input).await;

    let closed = driver.registry().close_all();
    tracing::info!(closed, "panelkit-host shutting down");
}

async fn run(driver: &Driver, input: Box<dyn AsyncBufRead + Unpin + Send>) {
    let mut lines = input.lines();
    let mut line_no = 0usize;
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                return;
            }
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "input read failed");
                return;
            }
        };
        line_no += 1;

        match parse_line(&line) {
            Ok(Some(parsed)) => println!("{}", driver.handle(parsed)),
            Ok(None) => {}
            Err(e) => tracing::warn!(line = line_no, error = %e, "unparseable script line"),
        }
    }
}

/// Mirror lifecycle events into the log.
fn spawn_event_logger(driver: &Driver) {
    let mut rx = driver.registry().bus().subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => tracing::debug!(?event, "panel event"),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event logger lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

fn spawn_reaper(driver: &Arc<Driver>, config: &PanelkitConfig) {
    let driver = driver.clone();
    let ttl = Duration::from_secs(config.registry.session_ttl_secs);
    let interval = Duration::from_secs(u64::from(config.registry.reap_interval_secs));
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let reaped = driver.registry().reap_idle(ttl);
            tracing::debug!(reaped, sessions = driver.registry().count(), "reaper tick");
        }
    });
}
