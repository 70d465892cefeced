use egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::{
    types::ProcessedImage,
    util::format::{describe_change, format_file_size},
};

pub enum ResultsAction {
    SaveAll,
    Save(usize),
}

/// `original_total` is the size of the whole selection, failed files included.
pub fn results_table(
    ui: &mut Ui,
    results: &[ProcessedImage],
    original_total: u64,
) -> Option<ResultsAction> {
    let mut action = None;

    let processed_total: u64 = results.iter().map(|image| image.size).sum();

    ui.horizontal(|ui| {
        ui.label(format!("Original: {}", format_file_size(original_total)));
        ui.separator();
        ui.label(format!("Processed: {}", format_file_size(processed_total)));
        ui.separator();
        ui.label(describe_change(original_total, processed_total));
    });

    ui.add_space(4.0);

    if ui.button("Download all as ZIP").clicked() {
        action = Some(ResultsAction::SaveAll);
    }

    ui.add_space(4.0);

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::remainder().at_least(180.0).clip(true))
        .column(Column::auto().at_least(70.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::auto().at_least(110.0))
        .column(Column::auto())
        .header(20.0, |mut header| {
            for title in ["Name", "Size", "Dimensions", "Change", ""] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for (index, image) in results.iter().enumerate() {
                body.row(20.0, |mut row| {
                    row.col(|ui| {
                        ui.label(&image.name);
                    });
                    row.col(|ui| {
                        ui.label(format_file_size(image.size));
                    });
                    row.col(|ui| {
                        ui.label(image.dimensions.to_string());
                    });
                    row.col(|ui| {
                        ui.label(describe_change(image.original_size, image.size));
                    });
                    row.col(|ui| {
                        if ui.small_button("Download").clicked() {
                            action = Some(ResultsAction::Save(index));
                        }
                    });
                });
            }
        });

    action
}
