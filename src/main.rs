use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

mod config;
mod events;
mod judge_api;
mod logging;
mod notifier;
mod submission_handler;
mod submission_tracker;
mod submission_url;
mod submit_monitor;
mod watcher;

use crate::config::AppConfig;
use events::{Delivery, InboundEvent, RequestCompleted};
use judge_api::JudgeApi;
use notifier::ChannelNotifier;
use submission_tracker::{SubmissionTracker, SubmissionTracking};
use submit_monitor::{is_submit_button, SubmitMonitors, Verdict};
use watcher::SubmissionWatcher;

const MONITOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Watches judge submission checks and forwards accepted results to the page.
#[derive(Debug, Parser)]
#[command(name = "judge-watch", version)]
struct Cli {
    /// Optional configuration file (toml, yaml or json).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of completed submissions remembered.
    #[arg(long)]
    max_stored: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?.with_overrides(cli.max_stored);

    logging::setup_logging(Path::new(&config.log_dir))?;
    info!("Starting judge-watch with {:?}", config);

    let (delivery_sender, delivery_receiver) = mpsc::channel(config.queue_capacity);
    let writer_handle = tokio::spawn(delivery_writer(delivery_receiver));

    let tracker = SubmissionTracker::new(config.max_stored);
    info!("Remembering up to {} completed submissions", tracker.max_stored());

    let watcher = SubmissionWatcher::new(
        tracker,
        JudgeApi::new(config.fetch_timeout())?,
        ChannelNotifier::new(delivery_sender),
    );

    let tracker = watcher.tracker();
    let (request_sender, request_receiver) = mpsc::channel(config.queue_capacity);
    let watcher_handle = tokio::spawn(watcher.run(request_receiver, config.max_concurrent_checks));

    event_loop(request_sender, &config).await?;

    // The request sender is gone now, so the watcher drains and exits,
    // which in turn closes the delivery channel.
    watcher_handle.await?;
    writer_handle.await??;

    let tracker = tracker.lock().await;
    info!(
        "Input closed, shutting down with {} submissions processed and {} in flight",
        tracker.processed_count(),
        tracker.processing_count()
    );
    Ok(())
}

async fn event_loop(
    request_sender: mpsc::Sender<RequestCompleted>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut monitors = SubmitMonitors::new(config.submit_timeout(), config.debounce());
    let mut ticker = tokio::time::interval(MONITOR_POLL_INTERVAL);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                match serde_json::from_str::<InboundEvent>(&line) {
                    Ok(InboundEvent::RequestCompleted { url, tab_id }) => {
                        if request_sender.send(RequestCompleted { url, tab_id }).await.is_err() {
                            error!("Failed to send request to watcher");
                        }
                    }
                    Ok(InboundEvent::SubmitClicked { tab_id, button_text, locator }) => {
                        if is_submit_button(&button_text, locator.as_deref()) {
                            monitors.submit_clicked(tab_id, Instant::now());
                        }
                    }
                    Ok(InboundEvent::DomMutation { tab_id, text }) => {
                        monitors.on_mutation(tab_id, Instant::now(), &text);
                    }
                    Err(e) => warn!("Skipping malformed event: {}", e),
                }
            }
            _ = ticker.tick() => {
                for (tab_id, verdict) in monitors.poll(Instant::now()) {
                    match verdict {
                        Verdict::Accepted => info!("Success detected in tab {}", tab_id),
                        Verdict::Failed => info!("Failed attempt in tab {}", tab_id),
                    }
                }
            }
        }
    }

    Ok(())
}

async fn delivery_writer(
    mut receiver: mpsc::Receiver<Delivery>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut stdout = tokio::io::stdout();

    while let Some(delivery) = receiver.recv().await {
        let mut line = serde_json::to_vec(&delivery)?;
        line.push(b'\n');
        stdout.write_all(&line).await?;
        stdout.flush().await?;
    }

    Ok(())
}
