use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::logger;
use crate::models::types::{Card, PlayerId, Slot, TOKEN_SIZE};
use crate::ui::interface::UserInterface;
use crate::utils::errors::TableError;

/// The face-up grid shared by the dealer and every player.
///
/// Cards and tokens live behind one lock, so the slot/card mapping, its inverse and
/// the token index are always observed together. Reads return a value that was
/// valid at some point during the call; callers that mutate must re-check.
pub struct Table {
    grid: RwLock<Grid>,
    ui: Arc<dyn UserInterface>,
}

struct Grid {
    slot_to_card: Vec<Option<Card>>,
    card_to_slot: Vec<Option<Slot>>,
    tokens: Vec<BTreeSet<PlayerId>>,
}

impl Grid {
    fn check_slot(&self, slot: Slot) -> Result<(), TableError> {
        if slot < self.slot_to_card.len() {
            Ok(())
        } else {
            Err(TableError::SlotOutOfRange(slot))
        }
    }

    fn take_card(&mut self, slot: Slot, ui: &dyn UserInterface) -> Result<Card, TableError> {
        self.check_slot(slot)?;
        let card = self.slot_to_card[slot].take().ok_or(TableError::SlotEmpty(slot))?;
        if let Some(entry) = self.card_to_slot.get_mut(card as usize) {
            *entry = None;
        }
        self.tokens[slot].clear();
        ui.clear_slot(slot);
        Ok(card)
    }
}

impl Table {
    pub fn new(table_size: usize, deck_size: u32, ui: Arc<dyn UserInterface>) -> Self {
        Self {
            grid: RwLock::new(Grid {
                slot_to_card: vec![None; table_size],
                card_to_slot: vec![None; deck_size as usize],
                tokens: vec![BTreeSet::new(); table_size],
            }),
            ui,
        }
    }

    pub async fn size(&self) -> usize {
        self.grid.read().await.slot_to_card.len()
    }

    /// Puts `card` on an empty `slot`.
    pub async fn place_card(&self, card: Card, slot: Slot) -> Result<(), TableError> {
        let mut grid = self.grid.write().await;
        grid.check_slot(slot)?;
        if let Some(existing) = grid.slot_to_card[slot] {
            return Err(TableError::SlotOccupied { slot, card: existing });
        }

        let index = card as usize;
        if let Some(&Some(existing)) = grid.card_to_slot.get(index) {
            return Err(TableError::CardOnTable { card, slot: existing });
        }
        if index >= grid.card_to_slot.len() {
            grid.card_to_slot.resize(index + 1, None);
        }
        grid.slot_to_card[slot] = Some(card);
        grid.card_to_slot[index] = Some(slot);
        self.ui.render_card(slot, card);
        logger!(DEBUG, "[TABLE] Placed card {card} on slot {slot}");
        Ok(())
    }

    /// Clears `slot` and every token resting on it, returning the card it held.
    pub async fn remove_card(&self, slot: Slot) -> Result<Card, TableError> {
        let mut grid = self.grid.write().await;
        let card = grid.take_card(slot, self.ui.as_ref())?;
        logger!(DEBUG, "[TABLE] Removed card {card} from slot {slot}");
        Ok(card)
    }

    /// Clears several slots under a single lock. Empty or unknown slots are skipped.
    pub async fn remove_cards(&self, slots: &[Slot]) -> Vec<Card> {
        let mut grid = self.grid.write().await;
        slots
            .iter()
            .filter_map(|&slot| grid.take_card(slot, self.ui.as_ref()).ok())
            .collect()
    }

    /// Records a token of `player` on `slot`. Refused when the slot holds no card.
    pub async fn place_token(&self, player: PlayerId, slot: Slot) -> bool {
        let mut grid = self.grid.write().await;
        if grid.check_slot(slot).is_err() || grid.slot_to_card[slot].is_none() {
            return false;
        }

        let inserted = grid.tokens[slot].insert(player);
        if inserted {
            self.ui.set_token(slot, player, true);
        }
        inserted
    }

    pub async fn remove_token(&self, player: PlayerId, slot: Slot) -> bool {
        let mut grid = self.grid.write().await;
        if grid.check_slot(slot).is_err() {
            return false;
        }

        let removed = grid.tokens[slot].remove(&player);
        if removed {
            self.ui.set_token(slot, player, false);
        }
        removed
    }

    pub async fn card_at(&self, slot: Slot) -> Option<Card> {
        self.grid.read().await.slot_to_card.get(slot).copied().flatten()
    }

    /// Same as [`Table::card_at`], for threads outside the runtime.
    pub fn blocking_card_at(&self, slot: Slot) -> Option<Card> {
        self.grid.blocking_read().slot_to_card.get(slot).copied().flatten()
    }

    /// The cards on `slots`, or `None` if any of them is empty.
    pub async fn cards_at(&self, slots: &[Slot; TOKEN_SIZE]) -> Option<[Card; TOKEN_SIZE]> {
        let grid = self.grid.read().await;
        let mut cards = [0; TOKEN_SIZE];
        for (card, &slot) in cards.iter_mut().zip(slots) {
            *card = grid.slot_to_card.get(slot).copied().flatten()?;
        }
        Some(cards)
    }

    pub async fn slot_of(&self, card: Card) -> Option<Slot> {
        self.grid.read().await.card_to_slot.get(card as usize).copied().flatten()
    }

    pub async fn cards(&self) -> Vec<Card> {
        self.grid.read().await.slot_to_card.iter().flatten().copied().collect()
    }

    pub async fn empty_slots(&self) -> Vec<Slot> {
        let grid = self.grid.read().await;
        (0..grid.slot_to_card.len())
            .filter(|&slot| grid.slot_to_card[slot].is_none())
            .collect()
    }

    pub async fn count_cards(&self) -> usize {
        self.grid.read().await.slot_to_card.iter().flatten().count()
    }

    pub async fn tokens_at(&self, slot: Slot) -> Vec<PlayerId> {
        let grid = self.grid.read().await;
        grid.tokens
            .get(slot)
            .map(|players| players.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Checks that both card indices agree and that tokens only rest on cards.
    pub async fn is_consistent(&self) -> bool {
        let grid = self.grid.read().await;
        let forward = grid.slot_to_card.iter().enumerate().all(|(slot, card)| match card {
            Some(card) => grid.card_to_slot.get(*card as usize) == Some(&Some(slot)),
            None => grid.tokens[slot].is_empty(),
        });
        let inverse = grid.card_to_slot.iter().enumerate().all(|(card, slot)| match slot {
            Some(slot) => grid.slot_to_card.get(*slot) == Some(&Some(card as Card)),
            None => true,
        });
        forward && inverse
    }
}
