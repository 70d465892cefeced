use egui::Ui;

use crate::structs::{
    file_type::OutputFormat,
    settings::{ResizeSettings, MAX_QUALITY, MIN_QUALITY, QUALITY_STEP},
};

pub fn encoding_input(ui: &mut Ui, settings: &mut ResizeSettings) {
    egui::ComboBox::from_label("Output format")
        .selected_text(settings.format.to_string())
        .show_ui(ui, |ui| {
            for format in OutputFormat::ALL {
                ui.selectable_value(&mut settings.format, format, format.to_string());
            }
        });

    ui.add(
        egui::Slider::new(&mut settings.quality, MIN_QUALITY..=MAX_QUALITY)
            .step_by(QUALITY_STEP as f64)
            .suffix("%")
            .text("Quality"),
    );

    match settings.format {
        OutputFormat::Original => {
            ui.label("Each image keeps the format it was loaded with.");
        }
        OutputFormat::Png => {
            ui.label("PNG is lossless, lower quality only means more compression effort.");
        }
        OutputFormat::Jpeg | OutputFormat::WebP => {}
    }
}
