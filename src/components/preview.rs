use egui::{vec2, Color32, ColorImage, Context, Image, RichText, Sense, TextureHandle, TextureOptions, Ui};
use image::{imageops::FilterType, GenericImageView};

use crate::{
    types::{ProcessedImage, SourceImage},
    util::format::{describe_change, format_file_size},
};

pub const THUMBNAIL_SIDE: u32 = 128;
pub const FULL_PREVIEW_SIDE: u32 = 1600;

const TILE_WIDTH: f32 = 150.0;

#[derive(Clone)]
pub enum Thumbnail {
    Pending,
    Ready(TextureHandle),
    Failed,
}

pub enum PreviewAction {
    /// Index into the sources.
    Open(usize),
    /// Index into the results.
    OpenResult(usize),
    /// Index into the results.
    Save(usize),
    /// Index into the sources.
    Remove(usize),
}

/// Decodes `data` into an egui image no larger than `max_side` on either side.
/// Smaller images keep their size.
pub fn decode_preview(data: &[u8], max_side: u32) -> Option<ColorImage> {
    let mut img = image::load_from_memory(data).ok()?;

    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return None;
    }
    if width.max(height) > max_side {
        img = img.resize(max_side, max_side, FilterType::Triangle);
    }

    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Some(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

pub fn load_preview(ctx: &Context, name: &str, data: &[u8], max_side: u32) -> Option<TextureHandle> {
    let image = decode_preview(data, max_side)?;
    Some(ctx.load_texture(name, image, TextureOptions::LINEAR))
}

/// Result produced from the source at `source`, with its index in `results`.
pub fn result_for(results: &[ProcessedImage], source: usize) -> Option<(usize, &ProcessedImage)> {
    results
        .iter()
        .enumerate()
        .find(|(_, result)| result.source == source)
}

/// One tile per source: thumbnail, name, original size, and the outcome of
/// the last run once there is one.
pub fn preview_grid(
    ui: &mut Ui,
    files: &[SourceImage],
    thumbnails: &[Thumbnail],
    results: &[ProcessedImage],
    can_remove: bool,
) -> Option<PreviewAction> {
    let mut action = None;
    let side = THUMBNAIL_SIDE as f32;

    ui.horizontal_wrapped(|ui| {
        for (index, file) in files.iter().enumerate() {
            ui.group(|ui| {
                ui.set_width(TILE_WIDTH);
                ui.vertical(|ui| {
                    ui.allocate_ui(vec2(TILE_WIDTH, side), |ui| match thumbnails.get(index) {
                        Some(Thumbnail::Ready(texture)) => {
                            let response = ui
                                .add(
                                    Image::new(texture)
                                        .max_size(vec2(side, side))
                                        .sense(Sense::click()),
                                )
                                .on_hover_text("Click for full size");
                            if response.clicked() {
                                action = Some(PreviewAction::Open(index));
                            }
                        }
                        Some(Thumbnail::Failed) => {
                            ui.label("No preview");
                        }
                        _ => {
                            ui.spinner();
                        }
                    });

                    ui.add(egui::Label::new(RichText::new(&file.name).strong()).truncate())
                        .on_hover_text(file.kind.mime());
                    ui.small(format_file_size(file.size));

                    match result_for(results, index) {
                        Some((result_index, result)) => {
                            ui.colored_label(Color32::from_rgb(80, 170, 90), "✓ Processed");
                            ui.small(format!(
                                "{}, {}",
                                format_file_size(result.size),
                                result.dimensions
                            ));
                            ui.small(describe_change(result.original_size, result.size));
                            ui.horizontal(|ui| {
                                if ui.small_button("Download").clicked() {
                                    action = Some(PreviewAction::Save(result_index));
                                }
                                if ui.small_button("View").clicked() {
                                    action = Some(PreviewAction::OpenResult(result_index));
                                }
                            });
                        }
                        None => {
                            ui.small("Not processed");
                        }
                    }

                    ui.add_enabled_ui(can_remove, |ui| {
                        if ui.small_button("✖ Remove").clicked() {
                            action = Some(PreviewAction::Remove(index));
                        }
                    });
                });
            });
        }
    });

    action
}
