use thiserror::Error;

use crate::models::types::{Card, Slot};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Unable to load settings ({0})")]
    LoadError(#[from] config::ConfigError),
    #[error("Invalid setting `{0}`: {1}")]
    InvalidValue(&'static str, String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Slot {0} is outside of the table")]
    SlotOutOfRange(Slot),
    #[error("Slot {slot} already holds card {card}")]
    SlotOccupied { slot: Slot, card: Card },
    #[error("Slot {0} holds no card")]
    SlotEmpty(Slot),
    #[error("Card {card} is already on slot {slot}")]
    CardOnTable { card: Card, slot: Slot },
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("{0}")]
    Settings(#[from] SettingsError),
    #[error("Dealer task failed ({0})")]
    DealerFailed(#[from] tokio::task::JoinError),
}
