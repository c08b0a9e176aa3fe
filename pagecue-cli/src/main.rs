//! pagecue command-line front end
//!
//! Evaluates rule sets against saved CRM pages, and runs the page
//! synchronizer against files on disk so overlay behavior can be observed
//! without a browser.
//!
//! Usage:
//!   pagecue evaluate --rules store.json --html page.html --url <address>
//!   pagecue context --url <address>
//!   pagecue watch --rules store.json --html page.html --url-file address.txt

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pagecue_cli::{
    evaluate_page, load_remote, load_snapshot, load_sync_config, watch_file, FileChange,
    FileHostPage, LogRenderer,
};
use pagecue_extract::ContextDetector;
use pagecue_sync::{ChannelNotifier, FileConfigStore, PageSynchronizer, SyncEvent};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "pagecue")]
#[command(about = "Contextual overlays for CRM record pages")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate rules against a saved page and print the result as JSON
    Evaluate {
        /// Store snapshot (rules and settings) as JSON
        #[arg(long)]
        rules: PathBuf,
        /// Saved page HTML
        #[arg(long)]
        html: PathBuf,
        /// Address the page was shown at
        #[arg(long)]
        url: String,
        /// Flat JSON object standing in for remote record data
        #[arg(long)]
        remote: Option<PathBuf>,
    },
    /// Print the page context detected for an address
    Context {
        #[arg(long)]
        url: String,
    },
    /// Drive the synchronizer against files until Ctrl-C
    Watch {
        /// Store snapshot (rules and settings) as JSON; edits are picked up
        #[arg(long)]
        rules: PathBuf,
        /// Page HTML; edits count as document mutations
        #[arg(long)]
        html: PathBuf,
        /// File holding the current page address
        #[arg(long)]
        url_file: PathBuf,
        /// Synchronizer timings (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Evaluate {
            rules,
            html,
            url,
            remote,
        } => {
            let snapshot = load_snapshot(&rules)?;
            let page = std::fs::read_to_string(&html)
                .with_context(|| format!("Failed to read page {}", html.display()))?;
            let remote = remote.as_deref().map(load_remote).transpose()?;
            let report = evaluate_page(&snapshot, &page, &url, remote);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Context { url } => {
            let context = ContextDetector::new().detect(&url);
            println!("{}", serde_json::to_string_pretty(&context)?);
        }
        Command::Watch {
            rules,
            html,
            url_file,
            config,
        } => watch(rules, html, url_file, config).await?,
    }
    Ok(())
}

async fn watch(
    rules: PathBuf,
    html: PathBuf,
    url_file: PathBuf,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = load_sync_config(config.as_deref())?;
    let poll = config.address_poll();

    let host = Arc::new(FileHostPage::new(&url_file, &html));
    let store = Arc::new(FileConfigStore::new(&rules));
    let (notifier, mut panel_rx) = ChannelNotifier::new();
    let orchestrator = LogRenderer::orchestrator().with_notifier(Arc::new(notifier));
    let (sync, handle, mut events) = PageSynchronizer::new(config, host, store, orchestrator);

    info!("Watching {} at the address in {}", html.display(), url_file.display());
    let sync_task = tokio::spawn(sync.run());
    tokio::spawn(watch_file(html, poll, FileChange::Document, handle.clone()));
    tokio::spawn(watch_file(rules, poll, FileChange::Config, handle.clone()));

    tokio::spawn(async move {
        while let Some(message) = panel_rx.recv().await {
            info!("Panel: {} items", message.items.len());
        }
    });
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                SyncEvent::CycleCompleted(report) => info!(
                    "Cycle {:?}: {} properties, matched {:?}",
                    report.trigger, report.property_count, report.matched
                ),
                SyncEvent::ReadinessTimedOut { attempts } => {
                    warn!("Page not ready after {} checks", attempts)
                }
                SyncEvent::Disabled { reason } => warn!("Synchronizer disabled: {}", reason),
                other => debug!("{:?}", other),
            }
        }
    });

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            info!("Shutting down");
            // The synchronizer stops on its own if the address file is unreadable.
            let _ = handle.shutdown().await;
        }
        _ = handle.closed() => {}
    }

    sync_task.await.context("Synchronizer task panicked")??;
    Ok(())
}
