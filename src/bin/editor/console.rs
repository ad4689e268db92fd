use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::log_capture::LogBuffer;

const TEXT_MUTED: egui::Color32 = egui::Color32::from_rgb(110, 110, 120);
const TEXT_SECONDARY: egui::Color32 = egui::Color32::from_rgb(160, 160, 170);

/// Console panel that displays captured log entries.
pub struct ConsolePanel {
    buffer: Arc<Mutex<LogBuffer>>,
    start_time: Instant,
    /// Minimum log level to display (inclusive).
    min_level: log::Level,
    /// Case-insensitive substring match on message and target.
    filter_text: String,
}

impl ConsolePanel {
    pub fn new(buffer: Arc<Mutex<LogBuffer>>) -> Self {
        Self {
            buffer,
            start_time: Instant::now(),
            min_level: log::Level::Info,
            filter_text: String::new(),
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for &level in &[
                log::Level::Error,
                log::Level::Warn,
                log::Level::Info,
                log::Level::Debug,
                log::Level::Trace,
            ] {
                let selected = self.min_level >= level;
                let label = egui::RichText::new(level_label(level)).color(level_color(level));
                if ui.selectable_label(selected, label).clicked() {
                    self.min_level = level;
                }
            }

            ui.separator();
            ui.label("Filter:");
            ui.text_edit_singleline(&mut self.filter_text);
            ui.separator();

            if ui.button("Clear").clicked() {
                if let Ok(mut buf) = self.buffer.lock() {
                    buf.clear();
                }
            }
        });

        ui.separator();

        let Ok(buf) = self.buffer.lock() else { return };
        let filter_lower = self.filter_text.to_lowercase();
        let entries: Vec<_> = buf
            .entries()
            .iter()
            .filter(|e| e.level <= self.min_level)
            .filter(|e| {
                filter_lower.is_empty()
                    || e.message.to_lowercase().contains(&filter_lower)
                    || e.target.to_lowercase().contains(&filter_lower)
            })
            .collect();

        let row_height = ui.text_style_height(&egui::TextStyle::Monospace) + 2.0;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show_rows(ui, row_height, entries.len(), |ui, row_range| {
                for entry in &entries[row_range] {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing.x = 4.0;

                        let elapsed = entry.timestamp.duration_since(self.start_time);
                        let time_str =
                            format!("{:>5}.{:03}", elapsed.as_secs(), elapsed.subsec_millis());
                        ui.label(egui::RichText::new(time_str).color(TEXT_MUTED).monospace());
                        ui.label(
                            egui::RichText::new(level_label(entry.level))
                                .color(level_color(entry.level))
                                .monospace(),
                        );
                        ui.label(
                            egui::RichText::new(&entry.target)
                                .color(TEXT_SECONDARY)
                                .monospace(),
                        );
                        ui.label(egui::RichText::new(&entry.message).monospace());
                    });
                }
            });
    }
}

fn level_label(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}

fn level_color(level: log::Level) -> egui::Color32 {
    match level {
        log::Level::Error => egui::Color32::from_rgb(230, 80, 80),
        log::Level::Warn => egui::Color32::from_rgb(230, 180, 60),
        log::Level::Info => egui::Color32::from_rgb(110, 200, 120),
        log::Level::Debug => egui::Color32::from_rgb(100, 160, 230),
        log::Level::Trace => TEXT_MUTED,
    }
}
