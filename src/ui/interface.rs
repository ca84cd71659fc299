use crate::models::types::{Card, PlayerId, Slot};
use crate::models::ui_event::UiEvent;

/// Display collaborator. Every call is a notification; nothing waits on the display.
pub trait UserInterface: Send + Sync {
    fn render_card(&self, slot: Slot, card: Card);

    /// Clears the card on `slot` together with every token drawn on it.
    fn clear_slot(&self, slot: Slot);

    fn set_token(&self, slot: Slot, player: PlayerId, present: bool);

    fn set_score(&self, player: PlayerId, score: u32);

    fn set_countdown(&self, millis: u64, warn: bool);

    fn announce_winners(&self, players: &[PlayerId]);

    fn dispose(&self);
}

/// Adapter for displays that consume a stream of [`UiEvent`]s.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: UiEvent);
}

impl<T: EventSink> UserInterface for T {
    fn render_card(&self, slot: Slot, card: Card) {
        self.publish(UiEvent::RenderCard { slot, card });
    }

    fn clear_slot(&self, slot: Slot) {
        self.publish(UiEvent::ClearSlot { slot });
    }

    fn set_token(&self, slot: Slot, player: PlayerId, present: bool) {
        self.publish(UiEvent::SetToken { slot, player, present });
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        self.publish(UiEvent::SetScore { player, score });
    }

    fn set_countdown(&self, millis: u64, warn: bool) {
        self.publish(UiEvent::SetCountdown { millis, warn });
    }

    fn announce_winners(&self, players: &[PlayerId]) {
        self.publish(UiEvent::AnnounceWinners { players: players.to_vec() });
    }

    fn dispose(&self) {
        self.publish(UiEvent::Dispose);
    }
}
