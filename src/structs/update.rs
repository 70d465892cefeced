use std::time::Duration;

use crate::types::{ProcessedImage, Progress};

pub enum Update {
    Message(String),
    Progress(Progress),
    QueueCompleted(Vec<ProcessedImage>, Duration),
}
