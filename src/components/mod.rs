pub mod encoding;
pub mod preview;
pub mod resize;
pub mod results;
