use std::sync::Mutex;

use crate::models::types::{PlayerId, Slot};
use crate::models::ui_event::UiEvent;
use crate::ui::interface::EventSink;

/// Keeps every notification in memory, in arrival order.
#[derive(Default)]
pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<UiEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count(&self, predicate: impl Fn(&UiEvent) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    /// Winners from the last announcement, if the game has ended.
    pub fn winners(&self) -> Option<Vec<PlayerId>> {
        self.events().into_iter().rev().find_map(|event| match event {
            UiEvent::AnnounceWinners { players } => Some(players),
            _ => None,
        })
    }

    pub fn last_score(&self, player: PlayerId) -> Option<u32> {
        self.events().into_iter().rev().find_map(|event| match event {
            UiEvent::SetScore { player: p, score } if p == player => Some(score),
            _ => None,
        })
    }

    pub fn rendered_slots(&self) -> Vec<Slot> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                UiEvent::RenderCard { slot, .. } => Some(slot),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingUi {
    fn publish(&self, event: UiEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::interface::UserInterface;

    #[test]
    fn test_records_calls_in_order() {
        let ui = RecordingUi::new();
        ui.render_card(0, 5);
        ui.set_score(1, 2);
        ui.announce_winners(&[1]);

        assert_eq!(ui.events().len(), 3);
        assert_eq!(ui.events()[0], UiEvent::RenderCard { slot: 0, card: 5 });
        assert_eq!(ui.last_score(1), Some(2));
        assert_eq!(ui.winners(), Some(vec![1]));
        assert_eq!(ui.rendered_slots(), vec![0]);
    }
}
