use std::{sync::mpsc::Sender, time::Instant};

use image::{
    codecs::{
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType as PngFilter, PngEncoder},
    },
    imageops::FilterType,
    DynamicImage, GenericImageView,
};
use log::{debug, info, warn};

use crate::{
    error::ProcessError,
    structs::{
        file_type::{ImageKind, OutputFormat},
        settings::{ResizeSettings, MIN_QUALITY, QUALITY_STEP},
        update::Update,
    },
    types::{percentage, Dimensions, ProcessedImage, Progress, SourceImage},
};

const MIB: u64 = 1024 * 1024;
const WEBP_MAX_DIMENSION: u32 = 16383;

/// Runs a batch on the current thread, reporting back over `sender`.
pub fn convert_images(sender: Sender<Update>, files: Vec<SourceImage>, settings: ResizeSettings) {
    let start_time = Instant::now();
    let total = files.len();

    notify(
        &sender,
        Update::Message(format!("Processing {} files...", total)),
    );

    let mut current = 0;
    let results = process_images(&files, &settings, |_, file_name| {
        current += 1;
        notify(
            &sender,
            Update::Progress(Progress::new(current, total, file_name)),
        );
    });

    let failed = total - results.len();
    if failed > 0 {
        notify(
            &sender,
            Update::Message(format!("{} of {} files could not be processed", failed, total)),
        );
    }

    notify(
        &sender,
        Update::QueueCompleted(results, start_time.elapsed()),
    );
}

fn notify(sender: &Sender<Update>, update: Update) {
    if sender.send(update).is_err() {
        debug!("Update receiver is gone, continuing without reporting");
    }
}

/// Processes `files` in order, one at a time.
///
/// `on_progress` receives the completed percentage and the file name after
/// every attempt, successful or not. Files that fail are logged and left out
/// of the returned list, so it can be shorter than `files`.
pub fn process_images(
    files: &[SourceImage],
    settings: &ResizeSettings,
    on_progress: impl FnMut(f32, &str),
) -> Vec<ProcessedImage> {
    run_batch(files, &settings.clamped(), on_progress, process_image)
}

fn run_batch(
    files: &[SourceImage],
    settings: &ResizeSettings,
    mut on_progress: impl FnMut(f32, &str),
    mut process_one: impl FnMut(&SourceImage, &ResizeSettings) -> Result<ProcessedImage, ProcessError>,
) -> Vec<ProcessedImage> {
    let mut processed = Vec::with_capacity(files.len());

    info!("Processing batch of {} files", files.len());

    for (index, file) in files.iter().enumerate() {
        let start_time = Instant::now();

        match process_one(file, settings) {
            Ok(mut image) => {
                image.source = index;
                debug!(
                    "Processed '{}' -> '{}' ({} -> {} bytes) in {:.2?}",
                    file.name,
                    image.name,
                    image.original_size,
                    image.size,
                    start_time.elapsed()
                );
                processed.push(image);
            }
            Err(e) => {
                warn!("Failed to process '{}': {}", file.name, e);
            }
        }

        on_progress(percentage(index + 1, files.len()), &file.name);
    }

    info!(
        "Batch finished: {} of {} files processed",
        processed.len(),
        files.len()
    );

    processed
}

/// Decode, resize if needed, encode and rename a single file.
pub fn process_image(
    file: &SourceImage,
    settings: &ResizeSettings,
) -> Result<ProcessedImage, ProcessError> {
    let img = image::load_from_memory(&file.data)?;
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(ProcessError::EmptyImage);
    }

    let native = Dimensions::new(width, height);
    let target = compute_target_dimensions(native, settings);
    let kind = settings.format.resolve(file.kind);

    let data = if target != native {
        let resized = img.resize_exact(target.width, target.height, FilterType::Lanczos3);
        drop(img);
        encode_image(&resized, kind, settings.quality)?
    } else {
        let options = CompressOptions {
            max_width_or_height: target.max_side(),
            max_size: MIB * 1024 * settings.quality as u64 / 100,
            kind,
            quality: settings.quality,
        };
        compress(img, &options)?
    };

    Ok(ProcessedImage {
        name: output_file_name(&file.name, settings.format, target, settings.quality),
        size: data.len() as u64,
        data,
        dimensions: target,
        original_size: file.size,
        source: 0,
    })
}

/// Size the output should have for a source of `source` dimensions.
///
/// With the aspect lock on this fits the source inside the configured box
/// without ever enlarging it. Without the lock the box is used as-is.
pub fn compute_target_dimensions(source: Dimensions, settings: &ResizeSettings) -> Dimensions {
    let mut width = settings.width.max(1);
    let mut height = settings.height.max(1);

    if settings.maintain_aspect_ratio && source.width > 0 && source.height > 0 {
        if source.width <= width && source.height <= height {
            return source;
        }

        let ratio = source.width as f64 / source.height as f64;
        if width as f64 / height as f64 > ratio {
            width = (height as f64 * ratio).round() as u32;
        } else {
            height = (width as f64 / ratio).round() as u32;
        }
    }

    Dimensions::new(width.max(1), height.max(1))
}

/// `photo.JPG` -> `photo_1920x960_q80.jpg`
pub fn output_file_name(
    name: &str,
    format: OutputFormat,
    dimensions: Dimensions,
    quality: u8,
) -> String {
    let (stem, original_extension) = split_extension(name);

    let extension = match format.extension() {
        Some(extension) => extension.to_string(),
        None => original_extension
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "jpg".to_string()),
    };

    format!(
        "{}_{}x{}_q{}.{}",
        stem, dimensions.width, dimensions.height, quality, extension
    )
}

fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, extension))
            if !extension.is_empty() && !extension.contains(['/', '\\']) =>
        {
            (stem, Some(extension))
        }
        _ => (name, None),
    }
}

struct CompressOptions {
    max_width_or_height: u32,
    /// Advisory ceiling; lossy formats lower quality until they fit.
    max_size: u64,
    kind: ImageKind,
    quality: u8,
}

/// Recompression for images that keep their size.
fn compress(img: DynamicImage, options: &CompressOptions) -> Result<Vec<u8>, ProcessError> {
    let (width, height) = img.dimensions();
    let img = if width.max(height) > options.max_width_or_height {
        img.resize(
            options.max_width_or_height,
            options.max_width_or_height,
            FilterType::Lanczos3,
        )
    } else {
        img
    };

    let mut quality = options.quality;
    loop {
        let data = encode_image(&img, options.kind, quality)?;
        let fits = data.len() as u64 <= options.max_size;

        if fits || !options.kind.is_lossy() || quality <= MIN_QUALITY {
            if !fits {
                debug!(
                    "Output is {} bytes, above the {} byte ceiling",
                    data.len(),
                    options.max_size
                );
            }
            return Ok(data);
        }

        quality = quality.saturating_sub(QUALITY_STEP).max(MIN_QUALITY);
    }
}

fn encode_image(img: &DynamicImage, kind: ImageKind, quality: u8) -> Result<Vec<u8>, ProcessError> {
    let mut buf = Vec::new();

    match kind {
        ImageKind::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
                .map_err(|e| ProcessError::Encode(format!("JPEG: {}", e)))?;
        }

        ImageKind::Png => {
            let compression = if quality < 50 {
                CompressionType::Best
            } else {
                CompressionType::Default
            };
            img.write_with_encoder(PngEncoder::new_with_quality(
                &mut buf,
                compression,
                PngFilter::Adaptive,
            ))
            .map_err(|e| ProcessError::Encode(format!("PNG: {}", e)))?;
        }

        ImageKind::WebP => {
            if img.width() > WEBP_MAX_DIMENSION || img.height() > WEBP_MAX_DIMENSION {
                return Err(ProcessError::Encode(format!(
                    "WebP: {}x{} exceeds {} px per side",
                    img.width(),
                    img.height(),
                    WEBP_MAX_DIMENSION
                )));
            }
            let rgba = img.to_rgba8();
            let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
            let memory = encoder
                .encode_simple(false, quality as f32)
                .map_err(|e| ProcessError::Encode(format!("WebP: {:?}", e)))?;
            buf = memory.to_vec();
        }
    }

    if buf.is_empty() {
        return Err(ProcessError::Encode(format!("{} encoder produced no output", kind)));
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    use super::*;

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut cursor, format)
            .unwrap();
        cursor.into_inner()
    }

    fn settings(width: u32, height: u32, format: OutputFormat) -> ResizeSettings {
        ResizeSettings {
            width,
            height,
            quality: 80,
            maintain_aspect_ratio: true,
            format,
        }
    }

    #[test]
    fn locked_fit_is_width_constrained() {
        let target = compute_target_dimensions(
            Dimensions::new(4000, 2000),
            &settings(1920, 1080, OutputFormat::Original),
        );
        assert_eq!(target, Dimensions::new(1920, 960));
    }

    #[test]
    fn locked_fit_is_height_constrained() {
        let target = compute_target_dimensions(
            Dimensions::new(1000, 3000),
            &settings(1920, 1080, OutputFormat::Original),
        );
        assert_eq!(target, Dimensions::new(360, 1080));
    }

    #[test]
    fn locked_fit_keeps_images_already_inside_the_box() {
        let target = compute_target_dimensions(
            Dimensions::new(800, 600),
            &settings(1080, 1080, OutputFormat::Png),
        );
        assert_eq!(target, Dimensions::new(800, 600));
    }

    #[test]
    fn unlocked_uses_box_as_is() {
        let mut settings = settings(640, 640, OutputFormat::Original);
        settings.maintain_aspect_ratio = false;
        let target = compute_target_dimensions(Dimensions::new(4000, 2000), &settings);
        assert_eq!(target, Dimensions::new(640, 640));
    }

    #[test]
    fn locked_fit_preserves_ratio_within_a_pixel() {
        let sources = [(4000, 2000), (3000, 4000), (1234, 567), (7, 5000), (5000, 7)];
        let boxes = [(1920, 1080), (1080, 1080), (500, 1500), (8000, 1), (1, 1)];

        for &(sw, sh) in &sources {
            for &(bw, bh) in &boxes {
                let target = compute_target_dimensions(
                    Dimensions::new(sw, sh),
                    &settings(bw, bh, OutputFormat::Original),
                );
                assert!(target.width <= bw && target.height <= bh);

                // One axis is always derived from the other by rounding.
                let ratio = sw as f64 / sh as f64;
                let from_width = target.width as f64 / ratio;
                let from_height = target.height as f64 * ratio;
                assert!(
                    (from_width - target.height as f64).abs() <= 1.0
                        || (from_height - target.width as f64).abs() <= 1.0,
                    "{}x{} in {}x{} gave {}",
                    sw,
                    sh,
                    bw,
                    bh,
                    target
                );
            }
        }
    }

    #[test]
    fn naming_uses_computed_dimensions() {
        let name = output_file_name(
            "holiday.photo.JPG",
            OutputFormat::Original,
            Dimensions::new(1920, 960),
            80,
        );
        assert_eq!(name, "holiday.photo_1920x960_q80.jpg");
    }

    #[test]
    fn naming_follows_output_format() {
        let dims = Dimensions::new(100, 50);
        assert_eq!(output_file_name("a.png", OutputFormat::Jpeg, dims, 70), "a_100x50_q70.jpg");
        assert_eq!(output_file_name("a.jpg", OutputFormat::WebP, dims, 70), "a_100x50_q70.webp");
        assert_eq!(output_file_name("a.webp", OutputFormat::Png, dims, 70), "a_100x50_q70.png");
        assert_eq!(output_file_name("noext", OutputFormat::Original, dims, 70), "noext_100x50_q70.jpg");
    }

    #[test]
    fn naming_is_deterministic() {
        let dims = Dimensions::new(300, 200);
        let first = output_file_name("cat.jpeg", OutputFormat::Original, dims, 55);
        let second = output_file_name("cat.jpeg", OutputFormat::Original, dims, 55);
        assert_eq!(first, second);
        assert_eq!(first, "cat_300x200_q55.jpeg");
    }

    #[test]
    fn large_jpeg_is_resampled_to_fit() {
        let source = SourceImage::new("wide.jpg", encoded(400, 200, ImageFormat::Jpeg), ImageKind::Jpeg);
        let settings = settings(192, 108, OutputFormat::Original);

        let result = process_image(&source, &settings).unwrap();

        assert_eq!(result.dimensions, Dimensions::new(192, 96));
        assert!(result.name.ends_with("_192x96_q80.jpg"));
        assert_eq!(result.original_size, source.size);
        assert_eq!(result.size, result.data.len() as u64);

        let decoded = image::load_from_memory(&result.data).unwrap();
        assert_eq!(decoded.dimensions(), (192, 96));
        assert_eq!(
            image::guess_format(&result.data).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn image_inside_box_is_only_recompressed() {
        let source = SourceImage::new("small.png", encoded(80, 60, ImageFormat::Png), ImageKind::Png);
        let settings = settings(108, 108, OutputFormat::Png);

        let result = process_image(&source, &settings).unwrap();

        assert_eq!(result.dimensions, Dimensions::new(80, 60));
        assert_eq!(result.name, "small_80x60_q80.png");
        let decoded = image::load_from_memory(&result.data).unwrap();
        assert_eq!(decoded.dimensions(), (80, 60));
    }

    #[test]
    fn converts_to_webp() {
        let source = SourceImage::new("pic.png", encoded(64, 64, ImageFormat::Png), ImageKind::Png);
        let settings = settings(32, 32, OutputFormat::WebP);

        let result = process_image(&source, &settings).unwrap();

        assert_eq!(result.name, "pic_32x32_q80.webp");
        assert_eq!(
            image::guess_format(&result.data).unwrap(),
            ImageFormat::WebP
        );
    }

    #[test]
    fn transparent_png_can_become_jpeg() {
        let img = RgbaImage::from_pixel(20, 20, Rgba([10, 20, 30, 128]));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .unwrap();
        let source = SourceImage::new("alpha.png", cursor.into_inner(), ImageKind::Png);

        let result = process_image(&source, &settings(10, 10, OutputFormat::Jpeg)).unwrap();

        assert_eq!(
            image::guess_format(&result.data).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn corrupt_bytes_fail_to_decode() {
        let source = SourceImage::new("broken.jpg", b"not an image".to_vec(), ImageKind::Jpeg);
        let err = process_image(&source, &settings(100, 100, OutputFormat::Original)).unwrap_err();
        assert!(matches!(err, ProcessError::Decode(_)));
    }

    #[test]
    fn batch_skips_failures_and_always_reaches_100() {
        let files = vec![
            SourceImage::new("one.png", encoded(40, 20, ImageFormat::Png), ImageKind::Png),
            SourceImage::new("two.jpg", vec![0xFF, 0xD8, 0x00, 0x01], ImageKind::Jpeg),
            SourceImage::new("three.png", encoded(20, 40, ImageFormat::Png), ImageKind::Png),
        ];
        let settings = settings(10, 10, OutputFormat::Original);

        let mut calls: Vec<(f32, String)> = Vec::new();
        let results = process_images(&files, &settings, |percent, name| {
            calls.push((percent, name.to_string()));
        });

        assert_eq!(results.len(), 2);
        assert!(results[0].name.starts_with("one_"));
        assert!(results[1].name.starts_with("three_"));
        assert_eq!(results[0].source, 0);
        assert_eq!(results[1].source, 2);

        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].1, "two.jpg");
        assert!(calls.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(calls.last().unwrap().0, 100.0);
    }

    #[test]
    fn webp_encode_rejects_oversized_images() {
        let err = encode_image(&DynamicImage::new_rgba8(16384, 1), ImageKind::WebP, 80).unwrap_err();
        assert!(matches!(err, ProcessError::Encode(_)));
    }

    #[test]
    fn oversized_source_fails_at_encode() {
        let source = SourceImage::new("long.png", encoded(16384, 1, ImageFormat::Png), ImageKind::Png);
        let settings = ResizeSettings {
            width: 16384,
            height: 1,
            quality: 80,
            maintain_aspect_ratio: false,
            format: OutputFormat::WebP,
        };

        let err = process_image(&source, &settings).unwrap_err();

        assert!(matches!(err, ProcessError::Encode(_)));
    }

    #[test]
    fn batch_skips_encode_failures() {
        let files = vec![
            SourceImage::new("one.png", encoded(40, 20, ImageFormat::Png), ImageKind::Png),
            SourceImage::new("two.png", encoded(40, 20, ImageFormat::Png), ImageKind::Png),
            SourceImage::new("three.png", encoded(40, 20, ImageFormat::Png), ImageKind::Png),
        ];
        let settings = settings(10, 10, OutputFormat::WebP);

        let mut calls = Vec::new();
        let results = run_batch(
            &files,
            &settings,
            |percent, name| calls.push((percent, name.to_string())),
            |file, settings| {
                if file.name == "two.png" {
                    encode_image(&DynamicImage::new_rgba8(16384, 1), ImageKind::WebP, 80)?;
                }
                process_image(file, settings)
            },
        );

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, 0);
        assert_eq!(results[1].source, 2);
        assert!(results[1].name.ends_with(".webp"));
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].1, "two.png");
        assert_eq!(calls.last().unwrap().0, 100.0);
    }

    #[test]
    fn empty_batch_reports_nothing() {
        let mut calls = 0;
        let results = process_images(&[], &ResizeSettings::default(), |_, _| calls += 1);
        assert!(results.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn convert_images_sends_progress_then_completion() {
        let (sender, receiver) = std::sync::mpsc::channel();
        let files = vec![
            SourceImage::new("a.png", encoded(30, 30, ImageFormat::Png), ImageKind::Png),
            SourceImage::new("b.png", b"garbage".to_vec(), ImageKind::Png),
        ];

        convert_images(sender, files, settings(15, 15, OutputFormat::Original));

        let updates: Vec<Update> = receiver.try_iter().collect();
        let progress: Vec<&Progress> = updates
            .iter()
            .filter_map(|u| match u {
                Update::Progress(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(progress.len(), 2);
        assert_eq!(progress[0].current, 1);
        assert_eq!(progress[1].percentage, 100.0);

        match updates.last() {
            Some(Update::QueueCompleted(results, _)) => assert_eq!(results.len(), 1),
            _ => panic!("last update should be QueueCompleted"),
        }
    }

    #[test]
    fn compress_steps_quality_down_for_lossy_formats() {
        let img = image::load_from_memory(&encoded(64, 64, ImageFormat::Png)).unwrap();
        let options = CompressOptions {
            max_width_or_height: 64,
            max_size: 1,
            kind: ImageKind::Jpeg,
            quality: 90,
        };
        let low = compress(img.clone(), &options).unwrap();
        let high = encode_image(&img, ImageKind::Jpeg, 90).unwrap();
        assert!(low.len() < high.len());
    }
}
