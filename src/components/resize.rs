use egui::Ui;

use crate::structs::settings::{ResizeSettings, MAX_DIMENSION, MIN_DIMENSION, PRESETS};

/// `ratio` is the width/height ratio the lock keeps while editing.
pub fn resize_input(ui: &mut Ui, settings: &mut ResizeSettings, ratio: &mut f64) {
    ui.label("Quick presets");
    egui::Grid::new("resize_presets")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            for (index, preset) in PRESETS.iter().enumerate() {
                let label = format!("{} ({}×{})", preset.name, preset.width, preset.height);
                if ui.button(label).clicked() {
                    settings.apply_preset(preset);
                    *ratio = preset.ratio();
                }
                if index % 2 == 1 {
                    ui.end_row();
                }
            }
        });

    ui.add_space(8.0);

    let mut width = settings.width;
    ui.horizontal(|ui| {
        ui.label("Width: ");
        let input = egui::DragValue::new(&mut width)
            .range(MIN_DIMENSION..=MAX_DIMENSION)
            .suffix(" px");
        if ui.add(input).changed() {
            settings.set_width(width, *ratio);
        }
    });

    let mut height = settings.height;
    ui.horizontal(|ui| {
        ui.label("Height:");
        let input = egui::DragValue::new(&mut height)
            .range(MIN_DIMENSION..=MAX_DIMENSION)
            .suffix(" px");
        if ui.add(input).changed() {
            settings.set_height(height, *ratio);
        }
    });

    let mut locked = settings.maintain_aspect_ratio;
    if ui.checkbox(&mut locked, "Maintain aspect ratio").changed() {
        settings.maintain_aspect_ratio = locked;
        if locked {
            *ratio = settings.ratio();
        }
    }

    ui.add_space(8.0);

    if ui.button("Reset").clicked() {
        *settings = ResizeSettings::default();
        *ratio = settings.ratio();
    }
}
