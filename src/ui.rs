use std::{
    path::PathBuf,
    sync::mpsc::{channel, Receiver, TryRecvError},
    thread,
    time::Duration,
};

use chrono::Utc;
use eframe::egui;
use log::{error, warn};

use crate::{
    components::{
        encoding::encoding_input,
        preview::{
            load_preview, preview_grid, PreviewAction, Thumbnail, FULL_PREVIEW_SIDE,
            THUMBNAIL_SIDE,
        },
        resize::resize_input,
        results::{results_table, ResultsAction},
    },
    process::convert_images,
    structs::{file_type::OutputFormat, settings::ResizeSettings, update::Update},
    types::{ProcessedImage, Progress, SourceImage},
    util::{
        export::{archive_file_name, save_archive, save_single},
        files::{load_sources, ACCEPTED_EXTENSIONS},
        format::{batch_totals, format_file_size},
    },
};

const LOG_LENGTH: usize = 18;

#[derive(PartialEq, Clone, Copy)]
enum Page {
    Home,
    Resize,
    Encoding,
    Results,
    About,
}

pub struct App {
    settings: ResizeSettings,
    /// Ratio the aspect lock holds while width or height is edited.
    reference_ratio: f64,

    page: Page,

    // Communication
    receiver: Option<Receiver<Update>>,

    // Messages
    messages: Vec<String>,

    files: Vec<SourceImage>,
    /// One per entry in `files`.
    thumbnails: Vec<Thumbnail>,
    /// Title and texture of the image shown at full size.
    preview: Option<(String, egui::TextureHandle)>,
    results: Vec<ProcessedImage>,
    progress: Option<Progress>,
}

impl Default for App {
    fn default() -> Self {
        let settings = ResizeSettings::default();

        Self {
            reference_ratio: settings.ratio(),
            settings,

            page: Page::Home,

            // Communication
            receiver: None,
            messages: Vec::new(),

            files: Vec::new(),
            thumbnails: Vec::new(),
            preview: None,
            results: Vec::new(),
            progress: None,
        }
    }
}

impl App {
    fn is_processing(&self) -> bool {
        self.receiver.is_some()
    }

    fn start_processing(&mut self) {
        if self.files.is_empty() || self.is_processing() {
            return;
        }

        let (sender, receiver) = channel::<Update>();
        self.receiver = Some(receiver);

        self.messages.clear();
        self.results.clear();
        self.progress = None;

        let settings = self.settings.clamped();
        let files = self.files.clone();

        thread::spawn(move || {
            convert_images(sender, files, settings);
        });
    }

    fn handle_messages(&mut self) {
        let Some(receiver) = &self.receiver else {
            return;
        };

        let mut updates = Vec::new();
        let mut disconnected = false;
        loop {
            match receiver.try_recv() {
                Ok(update) => updates.push(update),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        for update in updates {
            match update {
                Update::Message(msg) => self.push_message(msg),
                Update::Progress(progress) => {
                    self.push_message(format!(
                        "[{}/{}] {}",
                        progress.current, progress.total, progress.current_file_name
                    ));
                    self.progress = Some(progress);
                }
                Update::QueueCompleted(results, duration) => {
                    self.push_message(format!(
                        "Completed {} of {} in {:#?}",
                        results.len(),
                        self.files.len(),
                        duration
                    ));
                    self.results = results;
                    self.receiver = None;
                    if !self.results.is_empty() {
                        self.page = Page::Results;
                    }
                }
            }
        }

        // Worker went away without reporting completion
        if disconnected && self.receiver.is_some() {
            error!("Processing thread stopped before finishing the batch");
            self.push_message("Processing stopped unexpectedly".to_string());
            self.receiver = None;
        }
    }

    fn push_message(&mut self, message: String) {
        self.messages.push(message);

        if self.messages.len() > LOG_LENGTH {
            self.messages.remove(0);
        }
    }

    fn pick_files(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Select images")
            .add_filter("Images", ACCEPTED_EXTENSIONS)
            .pick_files();

        if let Some(paths) = picked {
            self.load_files(&paths);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let paths: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });

        if !paths.is_empty() {
            self.load_files(&paths);
        }
    }

    /// Replaces the current selection.
    fn load_files(&mut self, paths: &[PathBuf]) {
        if self.is_processing() {
            self.push_message("Wait for the current batch to finish".to_string());
            return;
        }

        let (accepted, rejected) = load_sources(paths);

        for (path, reason) in &rejected {
            self.push_message(format!("Skipped '{}': {}", path.display(), reason));
        }

        self.files = accepted;
        self.thumbnails = vec![Thumbnail::Pending; self.files.len()];
        self.preview = None;
        self.results.clear();
        self.progress = None;

        let total: u64 = self.files.iter().map(|file| file.size).sum();
        self.push_message(format!(
            "Selected {} images ({})",
            self.files.len(),
            format_file_size(total)
        ));
    }

    fn remove_file(&mut self, index: usize) {
        if self.is_processing() {
            return;
        }
        if let Some(removed) = remove_source(&mut self.files, &mut self.results, index) {
            if index < self.thumbnails.len() {
                self.thumbnails.remove(index);
            }
            self.push_message(format!("Removed '{}'", removed.name));
        }
    }

    /// Decodes at most one thumbnail per frame so the window stays responsive.
    fn load_next_thumbnail(&mut self, ctx: &egui::Context) {
        let Some(index) = self
            .thumbnails
            .iter()
            .position(|thumbnail| matches!(thumbnail, Thumbnail::Pending))
        else {
            return;
        };
        let Some(file) = self.files.get(index) else {
            return;
        };

        let name = format!("thumbnail-{}-{}", index, file.name);
        self.thumbnails[index] = match load_preview(ctx, &name, &file.data, THUMBNAIL_SIDE) {
            Some(texture) => Thumbnail::Ready(texture),
            None => {
                warn!("No preview for '{}'", file.name);
                Thumbnail::Failed
            }
        };
        ctx.request_repaint();
    }

    fn open_preview(&mut self, ctx: &egui::Context, name: &str, data: &[u8]) {
        match load_preview(ctx, name, data, FULL_PREVIEW_SIDE) {
            Some(texture) => self.preview = Some((name.to_string(), texture)),
            None => self.push_message(format!("Cannot preview '{}'", name)),
        }
    }

    fn handle_preview_action(&mut self, ctx: &egui::Context, action: PreviewAction) {
        match action {
            PreviewAction::Open(index) => {
                if let Some(file) = self.files.get(index) {
                    let (name, data) = (file.name.clone(), file.data.clone());
                    self.open_preview(ctx, &name, &data);
                }
            }
            PreviewAction::OpenResult(index) => {
                if let Some(result) = self.results.get(index) {
                    let (name, data) = (result.name.clone(), result.data.clone());
                    self.open_preview(ctx, &name, &data);
                }
            }
            PreviewAction::Save(index) => self.save_one(index),
            PreviewAction::Remove(index) => self.remove_file(index),
        }
    }

    fn preview_window(&mut self, ctx: &egui::Context) {
        let Some((title, texture)) = &self.preview else {
            return;
        };

        let mut open = true;
        egui::Window::new(title.as_str())
            .id(egui::Id::new("full_size_preview"))
            .open(&mut open)
            .default_size([800.0, 600.0])
            .resizable(true)
            .show(ctx, |ui| {
                ui.add(egui::Image::new(texture).shrink_to_fit());
            });

        if !open {
            self.preview = None;
        }
    }

    fn save_all(&mut self) {
        if self.results.is_empty() {
            return;
        }

        let target = rfd::FileDialog::new()
            .set_file_name(archive_file_name(Utc::now()))
            .add_filter("Zip archive", &["zip"])
            .save_file();

        if let Some(path) = target {
            match save_archive(&self.results, &path) {
                Ok(()) => self.push_message(format!("Saved archive '{}'", path.display())),
                Err(e) => {
                    error!("Failed to save archive '{}': {}", path.display(), e);
                    self.push_message(format!("Failed to save archive: {}", e));
                }
            }
        }
    }

    fn save_one(&mut self, index: usize) {
        let Some(image) = self.results.get(index) else {
            return;
        };

        let target = rfd::FileDialog::new()
            .set_file_name(&image.name)
            .save_file();

        if let Some(path) = target {
            let outcome = save_single(image, &path);
            match outcome {
                Ok(()) => self.push_message(format!("Saved '{}'", path.display())),
                Err(e) => {
                    error!("Failed to save '{}': {}", path.display(), e);
                    self.push_message(format!("Failed to save '{}': {}", path.display(), e));
                }
            }
        }
    }

    // Pages
    fn home_page(&mut self, ui: &mut egui::Ui) {
        ui.heading("Summary");
        ui.label(self.summary());

        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.heading("Images");
            ui.add_enabled_ui(!self.is_processing(), |ui| {
                if ui.button("Add images…").clicked() {
                    self.pick_files();
                }
            });
        });

        if self.files.is_empty() {
            ui.label("Drop JPEG, PNG or WebP files here, up to 50 MB each.");
        } else {
            let total: u64 = self.files.iter().map(|file| file.size).sum();
            ui.label(format!(
                "{} image{} selected, total size {}",
                self.files.len(),
                if self.files.len() == 1 { "" } else { "s" },
                format_file_size(total)
            ));

            let action = preview_grid(
                ui,
                &self.files,
                &self.thumbnails,
                &self.results,
                !self.is_processing(),
            );
            if let Some(action) = action {
                let ctx = ui.ctx().clone();
                self.handle_preview_action(&ctx, action);
            }
        }

        if let Some(progress) = self.progress.as_ref().filter(|_| self.is_processing()) {
            ui.add_space(4.0);
            ui.label(format!("Processing '{}'", progress.current_file_name));
        }

        ui.add_space(8.0);

        ui.heading("Logs");
        ui.label(self.messages.join("\n"));
    }

    fn summary(&self) -> String {
        let settings = &self.settings;

        let extension = match settings.format.extension() {
            Some(extension) => extension.to_string(),
            None => "{ext}".to_string(),
        };

        let resize = if settings.maintain_aspect_ratio {
            format!(
                "fitted inside {}px by {}px, keeping their aspect ratio",
                settings.width, settings.height
            )
        } else {
            format!("resized to {}px by {}px", settings.width, settings.height)
        };

        let format = match settings.format {
            OutputFormat::Original => "in their original format".to_string(),
            format => format!("as {}", format),
        };

        format!(
            "Your images will be saved as {{name}}_{{width}}x{{height}}_q{}.{}, {} and encoded {} at {}% quality.",
            settings.quality, extension, resize, format, settings.quality
        )
    }

    fn resize_page(&mut self, ui: &mut egui::Ui) {
        ui.heading("Resize options");
        resize_input(ui, &mut self.settings, &mut self.reference_ratio);
    }

    fn encoding_page(&mut self, ui: &mut egui::Ui) {
        ui.heading("Encoding options");
        encoding_input(ui, &mut self.settings);
    }

    fn results_page(&mut self, ui: &mut egui::Ui) {
        ui.heading("Results");

        if self.results.is_empty() {
            ui.label("Nothing processed yet.");
            return;
        }

        let (original_total, _) = batch_totals(&self.files, &self.results);
        match results_table(ui, &self.results, original_total) {
            Some(ResultsAction::SaveAll) => self.save_all(),
            Some(ResultsAction::Save(index)) => self.save_one(index),
            None => {}
        }
    }

    fn about_page(&mut self, ui: &mut egui::Ui) {
        ui.heading("About");
        ui.label("Bulk image resizer written in rust.");
        ui.label("Everything happens locally, no image ever leaves this machine.");
    }
}

/// Drops a source and the result that came from it, keeping the other
/// results pointing at the right source.
fn remove_source(
    files: &mut Vec<SourceImage>,
    results: &mut Vec<ProcessedImage>,
    index: usize,
) -> Option<SourceImage> {
    if index >= files.len() {
        return None;
    }

    let removed = files.remove(index);
    results.retain(|result| result.source != index);
    for result in results.iter_mut() {
        if result.source > index {
            result.source -= 1;
        }
    }

    Some(removed)
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // State
        self.handle_dropped_files(ctx);
        self.handle_messages();
        self.load_next_thumbnail(ctx);

        if self.is_processing() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        let percentage = self
            .progress
            .as_ref()
            .map(|progress| progress.percentage / 100.0)
            .unwrap_or(0.0);

        // Render
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(4.0);

            // Nav
            ui.horizontal(|ui| {
                for page in &[
                    Page::Home,
                    Page::Resize,
                    Page::Encoding,
                    Page::Results,
                    Page::About,
                ] {
                    let label = match page {
                        Page::Home => "Home",
                        Page::Resize => "Resize",
                        Page::Encoding => "Encoding",
                        Page::Results => "Results",
                        Page::About => "About",
                    };

                    if ui.selectable_label(self.page == *page, label).clicked() {
                        self.page = *page;
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Max), |ui| {
                    ui.add_space(10.0);
                    let can_run = !self.is_processing() && !self.files.is_empty();
                    ui.add_enabled_ui(can_run, |ui| {
                        if ui.button("Run").clicked() {
                            self.start_processing();
                        }
                    });

                    if self.progress.is_some() {
                        ui.label(format!("{:.0}%", percentage * 100.0));
                    }
                });
            });

            ui.add_space(8.0);

            ui.add(egui::ProgressBar::new(percentage).desired_height(8.0));

            ui.add_space(8.0);

            // Content
            egui::ScrollArea::vertical().show(ui, |ui| match self.page {
                Page::Home => self.home_page(ui),
                Page::Encoding => self.encoding_page(ui),
                Page::Resize => self.resize_page(ui),
                Page::Results => self.results_page(ui),
                Page::About => self.about_page(ui),
            });
        });

        self.preview_window(ctx);
    }
}
