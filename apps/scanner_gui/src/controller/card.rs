//! Batch View Controller: one mounted card instance owning the UI-only
//! state (input text, banner, in-flight flags, refresh timer) and the
//! sequencing of command dispatch against re-renders. The batch itself is
//! never mutated here; every visible change comes from a fresh feed
//! snapshot.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};

use client_core::FeedHandle;
use crossbeam_channel::Sender;
use shared::domain::{Batch, ItemStatus};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;

/// Minimum display-size hint reported to the mounting host, in layout rows.
pub const CARD_SIZE_HINT: u32 = 3;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);
const BANNER_AUTO_HIDE: Duration = Duration::from_secs(3);

const CLEAR_CONFIRM_QUESTION: &str = "Clear all items from batch?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Success,
    Error,
}

/// Transient status banner. Info and success banners auto-hide after a
/// fixed delay; error banners persist until replaced.
#[derive(Debug, Clone)]
pub struct BannerState {
    pub kind: BannerKind,
    pub message: String,
    shown_at: Instant,
}

impl BannerState {
    pub fn new(kind: BannerKind, message: impl Into<String>, now: Instant) -> Self {
        Self {
            kind,
            message: message.into(),
            shown_at: now,
        }
    }

    pub fn visible_at(&self, now: Instant) -> bool {
        match self.kind {
            BannerKind::Error => true,
            BannerKind::Info | BannerKind::Success => {
                now.duration_since(self.shown_at) < BANNER_AUTO_HIDE
            }
        }
    }
}

/// Capability-injected confirmation for destructive commands, so the
/// dispatch path is testable without a real dialog.
pub trait ConfirmPrompt {
    fn confirm(&self, question: &str) -> bool;
}

/// Periodic refresh ticker. At most one may be live per mounted card;
/// cancellation is synchronous so a replacement can never race a stale
/// duplicate.
pub struct RefreshTimer {
    cancelled: Arc<AtomicBool>,
    stop_tx: Sender<()>,
}

impl RefreshTimer {
    pub fn start(interval: Duration, ui_tx: Sender<UiEvent>) -> Self {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let thread_cancelled = Arc::clone(&cancelled);
        let ticker = crossbeam_channel::tick(interval);
        thread::spawn(move || loop {
            crossbeam_channel::select! {
                recv(stop_rx) -> _ => break,
                recv(ticker) -> _ => {
                    if thread_cancelled.load(Ordering::SeqCst) {
                        break;
                    }
                    if ui_tx.try_send(UiEvent::RefreshTick).is_err() {
                        break;
                    }
                }
            }
        });
        Self { cancelled, stop_tx }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _ = self.stop_tx.try_send(());
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    fn cancelled_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Render model for one item row.
#[derive(Debug, Clone)]
pub struct ItemRow {
    pub title: String,
    pub barcode: String,
    pub exists: bool,
    pub exists_badge: &'static str,
    pub backend_label: String,
    pub quantity: u32,
    pub status: ItemStatus,
    /// Present only for error-status items; always non-empty then.
    pub error_text: Option<String>,
}

/// Render model for the whole card, recomputed on every render trigger.
#[derive(Debug, Clone)]
pub struct CardView {
    pub item_count: usize,
    pub review_visible: bool,
    pub mode_label: &'static str,
    pub backend_count: usize,
    pub rows: Vec<ItemRow>,
}

pub struct BatchCard {
    cmd_tx: Sender<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    feed: FeedHandle,
    confirm: Box<dyn ConfirmPrompt>,
    refresh_interval: Duration,

    mounted: bool,
    refresh_timer: Option<RefreshTimer>,

    pub barcode_input: String,
    focus_requested: bool,
    banner: Option<BannerState>,

    scan_in_flight: bool,
    process_in_flight: bool,
    clear_in_flight: bool,

    batch: Batch,
    backends: Vec<String>,
    renders: u64,
}

impl BatchCard {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_tx: Sender<UiEvent>,
        feed: FeedHandle,
        confirm: Box<dyn ConfirmPrompt>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            cmd_tx,
            ui_tx,
            feed,
            confirm,
            refresh_interval,
            mounted: false,
            refresh_timer: None,
            barcode_input: String::new(),
            focus_requested: false,
            banner: None,
            scan_in_flight: false,
            process_in_flight: false,
            clear_in_flight: false,
            batch: Batch::default(),
            backends: Vec::new(),
            renders: 0,
        }
    }

    /// Set up the card. Re-entering cancels any previous refresh timer
    /// before starting a new one; a stale duplicate timer must never
    /// survive a remount.
    pub fn mount(&mut self) {
        if let Some(previous) = self.refresh_timer.take() {
            previous.cancel();
        }
        self.refresh_timer = Some(RefreshTimer::start(
            self.refresh_interval,
            self.ui_tx.clone(),
        ));
        self.mounted = true;
        self.focus_requested = true;
        self.read_snapshot();
    }

    pub fn unmount(&mut self) {
        if let Some(timer) = self.refresh_timer.take() {
            timer.cancel();
        }
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Host-facing lifecycle hook: the backend state changed; re-read and
    /// re-render within this event-loop turn.
    pub fn on_state_push(&mut self) {
        self.read_snapshot();
    }

    /// Timer tick: re-render the last snapshot and ask the worker to pull
    /// fresh state, but stay idle while the queue is drained to avoid
    /// pointless work. The pull matters between commands: item status
    /// transitions happen server-side and only arrive through a fetch.
    pub fn on_refresh_tick(&mut self, now: Instant) {
        let snapshot = self.feed.snapshot();
        if snapshot.batch.is_empty() {
            return;
        }
        self.batch = snapshot.batch;
        self.backends = snapshot.backends;
        self.renders += 1;
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::FetchState,
            &mut self.banner,
            now,
        );
    }

    /// Manual refresh affordance: re-render the last snapshot immediately
    /// and pull fresh state from the backend unconditionally.
    pub fn refresh(&mut self, now: Instant) {
        self.read_snapshot();
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::FetchState,
            &mut self.banner,
            now,
        );
    }

    fn read_snapshot(&mut self) {
        let snapshot = self.feed.snapshot();
        self.batch = snapshot.batch;
        self.backends = snapshot.backends;
        self.renders += 1;
    }

    pub fn handle_event(&mut self, event: UiEvent, now: Instant) {
        match event {
            UiEvent::StatePushed => self.on_state_push(),
            UiEvent::RefreshTick => self.on_refresh_tick(now),
            UiEvent::ScanCompleted { barcode, result } => {
                self.scan_in_flight = false;
                match result {
                    Ok(()) => {
                        self.show_banner(BannerKind::Success, format!("Scanned: {barcode}"), now);
                        self.barcode_input.clear();
                        self.focus_requested = true;
                    }
                    Err(err) => {
                        self.show_banner(BannerKind::Error, err.banner_text(), now);
                    }
                }
                self.renders += 1;
            }
            UiEvent::ProcessCompleted(result) => {
                self.process_in_flight = false;
                match result {
                    Ok(()) => self.show_banner(
                        BannerKind::Success,
                        "Batch processed successfully!",
                        now,
                    ),
                    Err(err) => self.show_banner(BannerKind::Error, err.banner_text(), now),
                }
                self.renders += 1;
            }
            UiEvent::ClearCompleted(result) => {
                self.clear_in_flight = false;
                match result {
                    Ok(()) => self.show_banner(BannerKind::Info, "Batch cleared", now),
                    Err(err) => self.show_banner(BannerKind::Error, err.banner_text(), now),
                }
                self.renders += 1;
            }
            UiEvent::Info(message) => {
                self.show_banner(BannerKind::Info, message, now);
            }
            UiEvent::Error(err) => {
                self.show_banner(BannerKind::Error, err.banner_text(), now);
            }
        }
    }

    /// Submit the current input as a scan. An empty or whitespace-only
    /// barcode is a pure client-side validation short-circuit: message
    /// shown, no remote call, control stays enabled.
    pub fn submit_scan(&mut self, now: Instant) {
        let barcode = self.barcode_input.trim().to_string();
        if barcode.is_empty() {
            self.show_banner(BannerKind::Error, "Please enter a barcode", now);
            return;
        }
        if self.scan_in_flight {
            return;
        }
        self.show_banner(BannerKind::Info, "Scanning...", now);
        if dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::ScanBarcode { barcode },
            &mut self.banner,
            now,
        ) {
            self.scan_in_flight = true;
        }
    }

    /// Commit the batch. Callable even when the queue is empty.
    pub fn process_batch(&mut self, now: Instant) {
        if self.process_in_flight {
            return;
        }
        if dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::ProcessBatch,
            &mut self.banner,
            now,
        ) {
            self.process_in_flight = true;
        }
    }

    /// Discard the batch, behind an explicit confirmation. A declined
    /// confirmation is a silent no-op and issues no call.
    pub fn clear_batch(&mut self, now: Instant) {
        if self.clear_in_flight {
            return;
        }
        if !self.confirm.confirm(CLEAR_CONFIRM_QUESTION) {
            return;
        }
        if dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::ClearBatch,
            &mut self.banner,
            now,
        ) {
            self.clear_in_flight = true;
        }
    }

    pub fn scan_enabled(&self) -> bool {
        !self.scan_in_flight
    }

    pub fn process_enabled(&self) -> bool {
        !self.process_in_flight
    }

    pub fn clear_enabled(&self) -> bool {
        !self.clear_in_flight
    }

    pub fn visible_banner(&self, now: Instant) -> Option<&BannerState> {
        self.banner.as_ref().filter(|banner| banner.visible_at(now))
    }

    fn show_banner(&mut self, kind: BannerKind, message: impl Into<String>, now: Instant) {
        self.banner = Some(BannerState::new(kind, message, now));
    }

    /// One-shot focus request for the barcode input, consumed by the
    /// painting layer.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    pub fn view(&self) -> CardView {
        let rows = self
            .batch
            .items
            .iter()
            .map(|item| ItemRow {
                title: item.display_title().to_string(),
                barcode: item.barcode.clone(),
                exists: item.exists,
                exists_badge: if item.exists { "✓ Exists" } else { "✗ New" },
                backend_label: item.backend_label.clone(),
                quantity: item.quantity,
                status: item.status,
                error_text: (item.status == ItemStatus::Error)
                    .then(|| item.error_text().to_string()),
            })
            .collect::<Vec<_>>();

        CardView {
            item_count: rows.len(),
            review_visible: !rows.is_empty(),
            mode_label: self.batch.mode.label(),
            backend_count: self.backends.len(),
            rows,
        }
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    #[cfg(test)]
    fn refresh_timer(&self) -> Option<&RefreshTimer> {
        self.refresh_timer.as_ref()
    }
}
