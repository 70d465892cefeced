use crate::types::{ProcessedImage, SourceImage};

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// `1536` -> `1.5 KB`
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Signed change from `original` to `processed`, in percent.
pub fn size_change_percent(original: u64, processed: u64) -> Option<f64> {
    if original == 0 {
        return None;
    }
    Some((processed as f64 - original as f64) / original as f64 * 100.0)
}

/// Size of the whole selection and of everything that came out of it.
pub fn batch_totals(sources: &[SourceImage], results: &[ProcessedImage]) -> (u64, u64) {
    let original = sources.iter().map(|source| source.size).sum();
    let processed = results.iter().map(|image| image.size).sum();
    (original, processed)
}

/// `Reduced by 42.0%` / `Increased by 3.5%`
pub fn describe_change(original: u64, processed: u64) -> String {
    match size_change_percent(original, processed) {
        Some(change) if change < 0.0 => format!("Reduced by {:.1}%", change.abs()),
        Some(change) => format!("Increased by {:.1}%", change),
        None => "-".to_string(),
    }
}
