use serde::{Deserialize, Serialize};

use crate::models::types::{Card, PlayerId, Slot};

/// One notification sent to the display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiEvent {
    RenderCard { slot: Slot, card: Card },
    ClearSlot { slot: Slot },
    SetToken { slot: Slot, player: PlayerId, present: bool },
    SetScore { player: PlayerId, score: u32 },
    SetCountdown { millis: u64, warn: bool },
    AnnounceWinners { players: Vec<PlayerId> },
    Dispose,
}
