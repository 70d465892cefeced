pub mod file_type;
pub mod settings;
pub mod update;
