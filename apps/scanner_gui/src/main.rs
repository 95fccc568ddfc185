//! Desktop console for a server-managed scan batch: observes the pushed
//! batch feed, renders the queue, and dispatches the scan/process/clear
//! commands against the backend.

use std::time::Duration;

mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::FeedHandle;
use crossbeam_channel::bounded;
use tracing_subscriber::EnvFilter;

use crate::controller::card::{BatchCard, CARD_SIZE_HINT};
use crate::ui::{DialogConfirm, ScannerGuiApp};

#[derive(Parser, Debug)]
#[command(name = "scanner_gui", about = "Operator console for batch barcode scanning")]
struct Args {
    /// Base URL of the batch backend.
    #[arg(long, default_value = "http://127.0.0.1:8123")]
    server_url: String,
    /// Seconds between background batch refreshes.
    #[arg(long, default_value_t = 5)]
    refresh_secs: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::info!(server_url = %args.server_url, "starting scanner gui");

    let (cmd_tx, cmd_rx) = bounded(64);
    let (ui_tx, ui_rx) = bounded(256);
    let feed = FeedHandle::new();

    backend_bridge::runtime::launch(
        args.server_url.clone(),
        feed.clone(),
        cmd_rx,
        ui_tx.clone(),
    );

    let mut card = BatchCard::new(
        cmd_tx,
        ui_tx,
        feed,
        Box::new(DialogConfirm),
        Duration::from_secs(args.refresh_secs.max(1)),
    );
    card.mount();

    let app = ScannerGuiApp::new(card, ui_rx);
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Barcode Scanner")
            .with_inner_size([480.0, 160.0 * CARD_SIZE_HINT as f32]),
        ..Default::default()
    };
    eframe::run_native(
        "scanner_gui",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|err| anyhow::anyhow!("failed to launch scanner gui: {err}"))
}
