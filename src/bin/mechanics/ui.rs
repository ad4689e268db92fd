//! Stats and controls overlay.

use mechanics_demo::physics::{ContactKind, PunchHit};
use mechanics_demo::simulation::{FrameReport, Simulation};

pub struct OverlayState {
    pub visible: bool,
    pub show_debug_lines: bool,
    pub last_report: FrameReport,
    pub last_contact: Option<ContactKind>,
    pub last_punch: Option<PunchHit>,
    /// Ball contacts since start
    pub contacts: usize,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            visible: true,
            show_debug_lines: false,
            last_report: FrameReport::default(),
            last_contact: None,
            last_punch: None,
            contacts: 0,
        }
    }
}

fn contact_label(kind: Option<ContactKind>) -> &'static str {
    match kind {
        Some(ContactKind::BallTouchedFloor) => "floor",
        Some(ContactKind::BallHitNet) => "net",
        Some(ContactKind::Other) => "other",
        None => "none",
    }
}

/// Draw the overlay. Returns `true` if a reset was requested.
pub fn overlay(
    ctx: &egui::Context,
    state: &mut OverlayState,
    simulation: &mut Simulation,
    fps: f32,
) -> bool {
    if !state.visible {
        return false;
    }
    let mut reset = false;

    egui::Window::new("Mechanics")
        .default_pos([12.0, 12.0])
        .resizable(false)
        .show(ctx, |ui| {
            egui::Grid::new("stats").num_columns(2).show(ui, |ui| {
                ui.label("FPS");
                ui.label(format!("{fps:.0}"));
                ui.end_row();

                ui.label("Steps this frame");
                ui.label(state.last_report.steps.to_string());
                ui.end_row();

                ui.label("Blend factor");
                ui.label(format!("{:.3}", state.last_report.factor));
                ui.end_row();

                ui.label("Bodies");
                ui.label(simulation.physics.body_count().to_string());
                ui.end_row();

                ui.label("Contacts");
                ui.label(format!(
                    "{} (last: {})",
                    state.contacts,
                    contact_label(state.last_contact)
                ));
                ui.end_row();

                ui.label("Last punch");
                ui.label(match &state.last_punch {
                    Some(hit) => format!("{:.0}% of reach", hit.fraction * 100.0),
                    None => "-".to_string(),
                });
                ui.end_row();
            });

            ui.separator();

            ui.checkbox(&mut simulation.paused, "Paused (P)");
            ui.add(egui::Slider::new(&mut simulation.time_scale, 0.0..=4.0).text("Time scale"));

            let mut gravity = simulation.physics.gravity();
            let changed = ui
                .horizontal(|ui| {
                    ui.label("Gravity Y");
                    ui.add(egui::DragValue::new(&mut gravity.y).speed(0.1))
                        .changed()
                })
                .inner;
            if changed {
                simulation.physics.set_gravity(gravity);
            }

            ui.checkbox(&mut state.show_debug_lines, "Debug lines (F1)");

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Reset (R)").clicked() {
                    reset = true;
                }
                ui.label("Space punches, right mouse looks");
            });
        });

    reset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_starts_visible_without_lines() {
        let state = OverlayState::default();
        assert!(state.visible);
        assert!(!state.show_debug_lines);
        assert_eq!(contact_label(state.last_contact), "none");
    }
}
