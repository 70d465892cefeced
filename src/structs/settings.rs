use super::file_type::OutputFormat;

pub const MIN_DIMENSION: u32 = 1;
pub const MAX_DIMENSION: u32 = 8000;
pub const MIN_QUALITY: u8 = 10;
pub const MAX_QUALITY: u8 = 100;
pub const QUALITY_STEP: u8 = 5;

#[derive(Clone, Debug, PartialEq)]
pub struct ResizeSettings {
    pub width: u32,
    pub height: u32,
    /// Percentage, 10 to 100 in steps of 5.
    pub quality: u8,
    pub maintain_aspect_ratio: bool,
    pub format: OutputFormat,
}

impl Default for ResizeSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            quality: 80,
            maintain_aspect_ratio: true,
            format: OutputFormat::Original,
        }
    }
}

impl ResizeSettings {
    /// Copy with every field pulled back inside its allowed range.
    pub fn clamped(&self) -> Self {
        let quality = self.quality.clamp(MIN_QUALITY, MAX_QUALITY);
        let snapped = (quality as u32 + QUALITY_STEP as u32 / 2) / QUALITY_STEP as u32
            * QUALITY_STEP as u32;

        Self {
            width: self.width.clamp(MIN_DIMENSION, MAX_DIMENSION),
            height: self.height.clamp(MIN_DIMENSION, MAX_DIMENSION),
            quality: (snapped as u8).clamp(MIN_QUALITY, MAX_QUALITY),
            ..self.clone()
        }
    }

    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }

    pub fn apply_preset(&mut self, preset: &Preset) {
        self.width = preset.width;
        self.height = preset.height;
    }

    /// Sets the width, dragging the height along when the lock is on.
    pub fn set_width(&mut self, width: u32, ratio: f64) {
        self.width = width.clamp(MIN_DIMENSION, MAX_DIMENSION);
        if self.maintain_aspect_ratio && ratio > 0.0 {
            self.height = linked(self.width as f64 / ratio);
        }
    }

    /// Sets the height, dragging the width along when the lock is on.
    pub fn set_height(&mut self, height: u32, ratio: f64) {
        self.height = height.clamp(MIN_DIMENSION, MAX_DIMENSION);
        if self.maintain_aspect_ratio && ratio > 0.0 {
            self.width = linked(self.height as f64 * ratio);
        }
    }
}

fn linked(value: f64) -> u32 {
    (value.round() as u32).clamp(MIN_DIMENSION, MAX_DIMENSION)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

impl Preset {
    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

pub const PRESETS: [Preset; 6] = [
    Preset { name: "HD", width: 1920, height: 1080 },
    Preset { name: "720p", width: 1280, height: 720 },
    Preset { name: "Instagram Square", width: 1080, height: 1080 },
    Preset { name: "Facebook Cover", width: 1200, height: 630 },
    Preset { name: "Twitter Header", width: 1500, height: 500 },
    Preset { name: "YouTube Thumbnail", width: 1280, height: 720 },
];
