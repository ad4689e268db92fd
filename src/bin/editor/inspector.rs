//! Property editor for one scene entity.

use glam::Vec3;
use mechanics_demo::scene::description::{EntityDescription, ModelSource};
use mechanics_demo::scene::ShaderKind;

fn vec3_row(ui: &mut egui::Ui, label: &str, value: &mut Vec3, speed: f32) -> bool {
    ui.label(label);
    let changed = ui
        .horizontal(|ui| {
            let mut changed = false;
            for component in [&mut value.x, &mut value.y, &mut value.z] {
                changed |= ui
                    .add(egui::DragValue::new(component).speed(speed).max_decimals(3))
                    .changed();
            }
            changed
        })
        .inner;
    ui.end_row();
    changed
}

fn model_label(model: &ModelSource) -> String {
    match model {
        ModelSource::Sphere => "sphere".to_string(),
        ModelSource::Cube => "cube".to_string(),
        ModelSource::Capsule => "capsule".to_string(),
        ModelSource::Obj(path) => path.display().to_string(),
    }
}

/// Returns `true` if any property changed.
pub fn entity_inspector(ui: &mut egui::Ui, entity: &mut EntityDescription) -> bool {
    let mut changed = false;

    egui::Grid::new("entity_properties")
        .num_columns(2)
        .show(ui, |ui| {
            ui.label("Name");
            changed |= ui.text_edit_singleline(&mut entity.name).changed();
            ui.end_row();

            ui.label("Model");
            ui.label(model_label(&entity.model));
            ui.end_row();

            changed |= vec3_row(ui, "Position", &mut entity.position, 0.1);

            let mut degrees = Vec3::from_array(entity.rotation_euler.to_array().map(f32::to_degrees));
            if vec3_row(ui, "Rotation", &mut degrees, 1.0) {
                entity.rotation_euler = Vec3::from_array(degrees.to_array().map(f32::to_radians));
                changed = true;
            }

            changed |= vec3_row(ui, "Scale", &mut entity.scale, 0.05);

            ui.label("Color");
            let mut color = entity.color.to_array();
            if ui.color_edit_button_rgba_unmultiplied(&mut color).changed() {
                entity.color = color.into();
                changed = true;
            }
            ui.end_row();

            ui.label("Shader");
            let mut shader = entity.shader_kind().unwrap_or_default();
            egui::ComboBox::from_id_source("shader")
                .selected_text(shader.label())
                .show_ui(ui, |ui| {
                    for kind in ShaderKind::ALL {
                        ui.selectable_value(&mut shader, kind, kind.label());
                    }
                });
            if shader.index() != entity.shader {
                entity.shader = shader.index();
                changed = true;
            }
            ui.end_row();

            ui.label("Visible");
            changed |= ui.checkbox(&mut entity.visible, "").changed();
            ui.end_row();
        });

    if let Some(body) = &mut entity.body {
        ui.separator();
        ui.label(format!("{:?} body, {:?}", body.kind, body.shape));
        egui::Grid::new("body_properties")
            .num_columns(2)
            .show(ui, |ui| {
                let material = &mut body.material;
                for (label, value, range) in [
                    ("Restitution", &mut material.restitution, 0.0..=1.0),
                    ("Friction", &mut material.friction, 0.0..=2.0),
                    ("Density", &mut material.density, 0.1..=20.0),
                    ("Angular damping", &mut material.angular_damping, 0.0..=10.0),
                ] {
                    ui.label(label);
                    changed |= ui.add(egui::Slider::new(value, range)).changed();
                    ui.end_row();
                }

                ui.label("Can sleep");
                changed |= ui.checkbox(&mut body.allow_sleep, "").changed();
                ui.end_row();
            });
    }

    changed
}
