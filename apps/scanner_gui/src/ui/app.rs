//! egui shell for the batch card: paints the controller's render model and
//! forwards user actions back to it. No batch logic lives here.

use std::time::{Duration, Instant};

use eframe::egui;

use crate::controller::card::{BannerKind, BatchCard, ConfirmPrompt, ItemRow};
use shared::domain::ItemStatus;

const BANNER_INFO: egui::Color32 = egui::Color32::from_rgb(33, 150, 243);
const BANNER_SUCCESS: egui::Color32 = egui::Color32::from_rgb(76, 175, 80);
const BANNER_ERROR: egui::Color32 = egui::Color32::from_rgb(244, 67, 54);
const BADGE_EXISTS: egui::Color32 = BANNER_SUCCESS;
const BADGE_NEW: egui::Color32 = egui::Color32::from_rgb(255, 152, 0);

/// Blocking yes/no dialog for the discard confirmation.
pub struct DialogConfirm;

impl ConfirmPrompt for DialogConfirm {
    fn confirm(&self, question: &str) -> bool {
        rfd::MessageDialog::new()
            .set_title("Barcode Scanner")
            .set_description(question)
            .set_buttons(rfd::MessageButtons::YesNo)
            .show()
            == rfd::MessageDialogResult::Yes
    }
}

pub struct ScannerGuiApp {
    card: BatchCard,
    ui_rx: crossbeam_channel::Receiver<crate::controller::events::UiEvent>,
}

impl ScannerGuiApp {
    pub fn new(
        card: BatchCard,
        ui_rx: crossbeam_channel::Receiver<crate::controller::events::UiEvent>,
    ) -> Self {
        Self { card, ui_rx }
    }

    fn show_header(&mut self, ui: &mut egui::Ui, now: Instant) {
        let view = self.card.view();
        ui.horizontal(|ui| {
            ui.heading("Barcode Scanner");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(format!("{} items in batch", view.item_count)).weak(),
                );
                if ui.button("⟳").on_hover_text("Refresh").clicked() {
                    self.card.refresh(now);
                }
                ui.label(
                    egui::RichText::new(format!("mode: {}", view.mode_label))
                        .weak()
                        .small(),
                );
                if view.backend_count > 0 {
                    ui.label(
                        egui::RichText::new(format!("{} backends", view.backend_count))
                            .weak()
                            .small(),
                    );
                }
            });
        });
    }

    fn show_scanner_section(&mut self, ui: &mut egui::Ui, now: Instant) {
        ui.horizontal(|ui| {
            let edit = egui::TextEdit::singleline(&mut self.card.barcode_input)
                .id_salt("barcode_input")
                .hint_text("Scan barcode or enter manually")
                .desired_width(ui.available_width() - 80.0);
            let response = ui.add(edit);
            if self.card.take_focus_request() {
                response.request_focus();
            }

            let enter_pressed = ui.input(|i| i.key_pressed(egui::Key::Enter));
            let submit_from_input = response.lost_focus() && enter_pressed;

            let scan_clicked = ui
                .add_enabled(self.card.scan_enabled(), egui::Button::new("Scan"))
                .clicked();

            if submit_from_input || scan_clicked {
                self.card.submit_scan(now);
            }
        });

        if let Some(banner) = self.card.visible_banner(now) {
            let fill = match banner.kind {
                BannerKind::Info => BANNER_INFO,
                BannerKind::Success => BANNER_SUCCESS,
                BannerKind::Error => BANNER_ERROR,
            };
            egui::Frame::NONE
                .fill(fill)
                .corner_radius(4.0)
                .inner_margin(egui::Margin::symmetric(8, 6))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                });
        }
    }

    fn show_batch_section(&mut self, ui: &mut egui::Ui, now: Instant) {
        let view = self.card.view();
        if !view.review_visible {
            ui.add_space(8.0);
            ui.label(egui::RichText::new("No items in batch").weak());
            return;
        }

        ui.add_space(8.0);
        ui.separator();
        ui.heading("Batch Review");

        egui::ScrollArea::vertical()
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for row in &view.rows {
                    show_item_row(ui, row);
                }
            });

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(
                    self.card.process_enabled(),
                    egui::Button::new("Process Batch").fill(BANNER_SUCCESS),
                )
                .clicked()
            {
                self.card.process_batch(now);
            }
            if ui
                .add_enabled(
                    self.card.clear_enabled(),
                    egui::Button::new("Clear Batch").fill(BANNER_ERROR),
                )
                .clicked()
            {
                self.card.clear_batch(now);
            }
        });
    }
}

fn show_item_row(ui: &mut egui::Ui, row: &ItemRow) {
    let stroke = match row.status {
        ItemStatus::Error => egui::Stroke::new(1.0, BANNER_ERROR),
        _ => ui.visuals().widgets.noninteractive.bg_stroke,
    };
    egui::Frame::group(ui.style())
        .stroke(stroke)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                let title = if row.status == ItemStatus::Processed {
                    egui::RichText::new(&row.title).weak()
                } else {
                    egui::RichText::new(&row.title).strong()
                };
                ui.label(title).on_hover_text(row.status.as_str());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let badge = if row.exists { BADGE_EXISTS } else { BADGE_NEW };
                    ui.label(egui::RichText::new(row.exists_badge).color(badge).small());
                });
            });
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&row.barcode).weak().small());
                ui.label(egui::RichText::new(&row.backend_label).weak().small());
                ui.label(
                    egui::RichText::new(format!("Qty: {}", row.quantity))
                        .weak()
                        .small(),
                );
            });
            if let Some(error_text) = &row.error_text {
                ui.label(egui::RichText::new(error_text).color(BANNER_ERROR).small());
            }
        });
}

impl eframe::App for ScannerGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        while let Ok(event) = self.ui_rx.try_recv() {
            self.card.handle_event(event, now);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_header(ui, now);
            ui.add_space(6.0);
            self.show_scanner_section(ui, now);
            self.show_batch_section(ui, now);
        });

        // Keep draining events and expiring banners without user input.
        ctx.request_repaint_after(Duration::from_millis(100));
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.card.unmount();
    }
}
