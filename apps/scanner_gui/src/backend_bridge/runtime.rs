//! Backend worker: owns the tokio runtime, drains the UI command queue,
//! executes remote batch calls, and feeds completions back to the surface
//! as UI events. Successful mutations schedule a delayed state refresh so
//! the backend's own propagation can settle first.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use client_core::{BatchCommands, CommandError, FeedHandle, HttpBatchService};
use crossbeam_channel::{Receiver, Sender};
use shared::protocol::ScanBarcodeRequest;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    server_url: String,
    feed: FeedHandle,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));
        let service: Arc<dyn BatchCommands> = Arc::new(HttpBatchService::new(server_url));
        runtime.block_on(drive(service, feed, cmd_rx, ui_tx));
    });
}

/// Worker loop, split from [`launch`] so tests can run it against a
/// scripted [`BatchCommands`] implementation.
pub(crate) async fn drive(
    service: Arc<dyn BatchCommands>,
    feed: FeedHandle,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    // First snapshot so the surface renders current state immediately.
    refresh_now(service.as_ref(), &feed, &ui_tx).await;

    while let Ok(cmd) = cmd_rx.recv() {
        let delay = cmd.refresh_delay();
        match cmd {
            BackendCommand::ScanBarcode { barcode } => {
                let result = service
                    .scan_barcode(ScanBarcodeRequest::new(barcode.clone()))
                    .await;
                let succeeded = report_scan(&ui_tx, barcode, result);
                if succeeded {
                    schedule_refresh(&service, &feed, &ui_tx, delay);
                }
            }
            BackendCommand::ProcessBatch => {
                let result = service.process_batch().await;
                let succeeded = result.is_ok();
                let _ = ui_tx.try_send(UiEvent::ProcessCompleted(result.map_err(|err| {
                    UiError::from_message(UiErrorContext::ProcessBatch, err.user_message())
                })));
                if succeeded {
                    schedule_refresh(&service, &feed, &ui_tx, delay);
                }
            }
            BackendCommand::ClearBatch => {
                let result = service.clear_batch().await;
                let succeeded = result.is_ok();
                let _ = ui_tx.try_send(UiEvent::ClearCompleted(result.map_err(|err| {
                    UiError::from_message(UiErrorContext::ClearBatch, err.user_message())
                })));
                if succeeded {
                    schedule_refresh(&service, &feed, &ui_tx, delay);
                }
            }
            BackendCommand::FetchState => {
                refresh_now(service.as_ref(), &feed, &ui_tx).await;
            }
        }
    }
}

fn report_scan(
    ui_tx: &Sender<UiEvent>,
    barcode: String,
    result: Result<(), CommandError>,
) -> bool {
    let succeeded = result.is_ok();
    if let Err(err) = &result {
        tracing::warn!(barcode = %barcode, error = %err, "scan_barcode rejected");
    }
    let _ = ui_tx.try_send(UiEvent::ScanCompleted {
        barcode,
        result: result
            .map_err(|err| UiError::from_message(UiErrorContext::Scan, err.user_message())),
    });
    succeeded
}

fn schedule_refresh(
    service: &Arc<dyn BatchCommands>,
    feed: &FeedHandle,
    ui_tx: &Sender<UiEvent>,
    delay: Option<Duration>,
) {
    let service = Arc::clone(service);
    let feed = feed.clone();
    let ui_tx = ui_tx.clone();
    tokio::spawn(async move {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        refresh_now(service.as_ref(), &feed, &ui_tx).await;
    });
}

async fn refresh_now(service: &dyn BatchCommands, feed: &FeedHandle, ui_tx: &Sender<UiEvent>) {
    match service.fetch_state().await {
        Ok(state) => {
            feed.set(state);
            let _ = ui_tx.try_send(UiEvent::StatePushed);
        }
        Err(err) => {
            // The last observed snapshot stays in place; a failed refresh is
            // logged, not surfaced, since the next push supersedes it.
            tracing::warn!(error = %err, "state refresh failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crossbeam_channel::bounded;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ScriptedService {
        scans: Mutex<Vec<String>>,
        fail_process: Option<String>,
        fetches: AtomicUsize,
        state: Value,
    }

    impl ScriptedService {
        fn new(state: Value) -> Self {
            Self {
                scans: Mutex::new(Vec::new()),
                fail_process: None,
                fetches: AtomicUsize::new(0),
                state,
            }
        }

        fn failing_process(message: &str) -> Self {
            let mut service = Self::new(json!({}));
            service.fail_process = Some(message.to_string());
            service
        }
    }

    #[async_trait]
    impl BatchCommands for ScriptedService {
        async fn scan_barcode(&self, request: ScanBarcodeRequest) -> Result<(), CommandError> {
            self.scans.lock().expect("lock").push(request.barcode);
            Ok(())
        }

        async fn process_batch(&self) -> Result<(), CommandError> {
            match &self.fail_process {
                Some(message) => Err(CommandError::Rejected {
                    message: message.clone(),
                }),
                None => Ok(()),
            }
        }

        async fn clear_batch(&self) -> Result<(), CommandError> {
            Ok(())
        }

        async fn fetch_state(&self) -> Result<Value, CommandError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.state.clone())
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn scan_success_reports_completion_and_schedules_a_refresh() {
        let state = json!({
            "entry_1": { "data": { "batch": { "items": [{ "barcode": "012345" }] } } }
        });
        let service = Arc::new(ScriptedService::new(state));
        let feed = FeedHandle::new();
        let (cmd_tx, cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded(32);

        cmd_tx
            .send(BackendCommand::ScanBarcode {
                barcode: "012345".to_string(),
            })
            .expect("queue scan");
        drop(cmd_tx);

        let dyn_service: Arc<dyn BatchCommands> = service.clone();
        drive(dyn_service, feed.clone(), cmd_rx, ui_tx).await;

        // Initial refresh, then the scan completion.
        let mut saw_completed = false;
        let mut pushes = 0;
        while let Ok(event) = ui_rx.recv_timeout(Duration::from_secs(2)) {
            match event {
                UiEvent::StatePushed => pushes += 1,
                UiEvent::ScanCompleted { barcode, result } => {
                    assert_eq!(barcode, "012345");
                    assert!(result.is_ok());
                    saw_completed = true;
                }
                _ => {}
            }
            // Initial push + post-scan delayed push.
            if saw_completed && pushes >= 2 {
                break;
            }
        }
        assert!(saw_completed);
        assert!(pushes >= 2);
        assert_eq!(service.scans.lock().expect("lock").as_slice(), ["012345"]);
        assert_eq!(feed.batch().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn process_failure_reports_the_message_and_skips_the_refresh() {
        let service = Arc::new(ScriptedService::failing_process("grocy offline"));
        let feed = FeedHandle::new();
        let (cmd_tx, cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded(32);

        cmd_tx.send(BackendCommand::ProcessBatch).expect("queue");
        drop(cmd_tx);

        let dyn_service: Arc<dyn BatchCommands> = service.clone();
        drive(dyn_service, feed, cmd_rx, ui_tx).await;

        let mut failure = None;
        while let Ok(event) = ui_rx.recv_timeout(Duration::from_millis(500)) {
            if let UiEvent::ProcessCompleted(result) = event {
                failure = result.err();
                break;
            }
        }
        let failure = failure.expect("process failure event");
        assert_eq!(failure.message(), "grocy offline");
        assert_eq!(failure.banner_text(), "Error processing batch: grocy offline");
        // Only the initial fetch; a failed command never triggers one.
        assert_eq!(service.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn explicit_fetch_refreshes_the_feed_without_a_delay() {
        let state = json!({
            "entry_1": { "data": { "batch": { "items": [{ "barcode": "9" }] } } }
        });
        let service = Arc::new(ScriptedService::new(state));
        let feed = FeedHandle::new();
        let (cmd_tx, cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded(32);

        cmd_tx.send(BackendCommand::FetchState).expect("queue");
        drop(cmd_tx);

        let dyn_service: Arc<dyn BatchCommands> = service;
        drive(dyn_service, feed.clone(), cmd_rx, ui_tx).await;

        let mut pushes = 0;
        while ui_rx.try_recv().is_ok() {
            pushes += 1;
        }
        assert!(pushes >= 2, "initial and explicit refresh both push");
        assert_eq!(feed.batch().len(), 1);
    }
}
