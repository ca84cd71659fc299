pub mod claim;
pub mod settings;
pub mod types;
pub mod ui_event;
