use crate::structs::file_type::ImageKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn max_side(&self) -> u32 {
        self.width.max(self.height)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// An accepted input file, held in memory.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pub name: String,
    pub data: Vec<u8>,
    pub size: u64,
    pub kind: ImageKind,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, data: Vec<u8>, kind: ImageKind) -> Self {
        Self {
            name: name.into(),
            size: data.len() as u64,
            data,
            kind,
        }
    }
}

/// Output of one successfully processed source.
#[derive(Clone, Debug)]
pub struct ProcessedImage {
    pub name: String,
    pub data: Vec<u8>,
    pub size: u64,
    pub dimensions: Dimensions,
    pub original_size: u64,
    /// Index of the source in the batch it came from.
    pub source: usize,
}

#[derive(Clone, Debug)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub current_file_name: String,
    pub percentage: f32,
}

impl Progress {
    pub fn new(current: usize, total: usize, current_file_name: &str) -> Self {
        Self {
            current,
            total,
            current_file_name: current_file_name.to_string(),
            percentage: percentage(current, total),
        }
    }
}

pub fn percentage(done: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    done as f32 / total as f32 * 100.0
}
