use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::Instant;

use crate::game::input::ComputerInput;
use crate::game::table::Table;
use crate::logger;
use crate::models::claim::{Claim, ClaimOutcome};
use crate::models::types::{Card, PlayerId, Slot, TOKEN_SIZE};
use crate::ui::interface::UserInterface;
use crate::utils::logger::Logger;
use crate::utils::shutdown::terminated;

/// What a single selection did to the player's tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Placed,
    Removed,
    /// The third token landed; the slots must go to the dealer.
    Claimed([Slot; TOKEN_SIZE]),
    /// Frozen, the slot lost its card, or three tokens are already down.
    Ignored,
}

/// Shared state of one player.
///
/// The token array is changed by the player's own task through [`Player::select`]
/// and by the dealer while it resolves claims or resets the table. Both go through
/// the same lock, which is always taken before the table's.
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub human: bool,
    score: AtomicU32,
    state: Mutex<PlayerState>,
    table: Arc<Table>,
    ui: Arc<dyn UserInterface>,
    point_freeze: Duration,
    penalty_freeze: Duration,
}

#[derive(Default)]
struct PlayerState {
    tokens: [Option<Slot>; TOKEN_SIZE],
    freeze_until: Option<Instant>,
}

impl PlayerState {
    fn held(&self) -> usize {
        self.tokens.iter().flatten().count()
    }

    fn frozen(&self, now: Instant) -> bool {
        self.freeze_until.is_some_and(|until| now < until)
    }
}

impl Player {
    pub fn new(
        id: PlayerId,
        name: String,
        human: bool,
        table: Arc<Table>,
        ui: Arc<dyn UserInterface>,
        point_freeze: Duration,
        penalty_freeze: Duration,
    ) -> Self {
        Self {
            id,
            name,
            human,
            score: AtomicU32::new(0),
            state: Mutex::new(PlayerState::default()),
            table,
            ui,
            point_freeze,
            penalty_freeze,
        }
    }

    pub fn score(&self) -> u32 {
        self.score.load(Ordering::SeqCst)
    }

    /// Slots currently holding one of this player's tokens.
    pub async fn tokens(&self) -> Vec<Slot> {
        self.state.lock().await.tokens.iter().flatten().copied().collect()
    }

    pub async fn freeze_until(&self) -> Option<Instant> {
        self.state.lock().await.freeze_until
    }

    pub async fn is_frozen(&self) -> bool {
        self.state.lock().await.frozen(Instant::now())
    }

    /// Toggles a token on `slot`.
    ///
    /// A token already on the slot is taken back. Otherwise a new one is placed if
    /// fewer than three are down and the slot still holds a card.
    pub async fn select(&self, slot: Slot) -> Selection {
        let mut state = self.state.lock().await;
        if state.frozen(Instant::now()) {
            return Selection::Ignored;
        }

        if let Some(token) = state.tokens.iter_mut().find(|t| **t == Some(slot)) {
            *token = None;
            self.table.remove_token(self.id, slot).await;
            return Selection::Removed;
        }

        let Some(free) = state.tokens.iter().position(Option::is_none) else {
            return Selection::Ignored;
        };
        if !self.table.place_token(self.id, slot).await {
            return Selection::Ignored;
        }
        state.tokens[free] = Some(slot);

        if state.held() == TOKEN_SIZE {
            let mut slots = [0; TOKEN_SIZE];
            for (target, token) in slots.iter_mut().zip(state.tokens.iter().flatten()) {
                *target = *token;
            }
            return Selection::Claimed(slots);
        }

        Selection::Placed
    }

    /// True if the player's tokens are exactly `slots`, in any order.
    pub async fn holds_claim(&self, slots: &[Slot; TOKEN_SIZE]) -> bool {
        let state = self.state.lock().await;
        state.held() == TOKEN_SIZE
            && slots.iter().all(|slot| state.tokens.contains(&Some(*slot)))
    }

    /// Awards one point and freezes the player for the point duration.
    pub async fn point(&self) {
        let mut state = self.state.lock().await;
        let score = self.score.fetch_add(1, Ordering::SeqCst) + 1;
        state.freeze_until = Some(Instant::now() + self.point_freeze);
        self.ui.set_score(self.id, score);
        logger!(INFO, "[PLAYER {}] `{}` scored, now at {score}", self.id, self.name);
    }

    /// Takes every token back and freezes the player for the penalty duration.
    pub async fn penalty(&self) {
        let mut state = self.state.lock().await;
        self.take_back_tokens(&mut state, |_| true).await;
        state.freeze_until = Some(Instant::now() + self.penalty_freeze);
        logger!(INFO, "[PLAYER {}] `{}` penalized", self.id, self.name);
    }

    /// Takes every token back without freezing.
    pub async fn clear_tokens(&self) {
        let mut state = self.state.lock().await;
        self.take_back_tokens(&mut state, |_| true).await;
    }

    /// Takes back the tokens resting on any of `slots`.
    pub async fn remove_tokens_for_slots(&self, slots: &[Slot]) {
        let mut state = self.state.lock().await;
        self.take_back_tokens(&mut state, |slot| slots.contains(&slot)).await;
    }

    async fn take_back_tokens(&self, state: &mut PlayerState, matches: impl Fn(Slot) -> bool) {
        for token in state.tokens.iter_mut() {
            if let Some(slot) = *token {
                if matches(slot) {
                    *token = None;
                    self.table.remove_token(self.id, slot).await;
                }
            }
        }
    }
}

/// Takes back every token resting on `slots`, then clears those slots from the table.
///
/// Each player's lock is held, in id order, until the cards are gone, so no player
/// can put a token on a card that is about to leave.
pub async fn sweep_slots(players: &[Arc<Player>], table: &Table, slots: &[Slot]) -> Vec<Card> {
    let mut states = Vec::with_capacity(players.len());
    for player in players {
        states.push(player.state.lock().await);
    }

    for (player, state) in players.iter().zip(states.iter_mut()) {
        player.take_back_tokens(state, |slot| slots.contains(&slot)).await;
    }
    table.remove_cards(slots).await
}

/// True when every player's tokens match the table's token index exactly.
pub async fn tokens_agree(players: &[Arc<Player>], table: &Table) -> bool {
    let mut states = Vec::with_capacity(players.len());
    for player in players {
        states.push(player.state.lock().await);
    }

    let size = table.size().await;
    if states.iter().any(|state| state.tokens.iter().flatten().any(|&slot| slot >= size)) {
        return false;
    }
    for slot in 0..size {
        let on_table = table.tokens_at(slot).await;
        for (player, state) in players.iter().zip(&states) {
            if on_table.contains(&player.id) != state.tokens.contains(&Some(slot)) {
                return false;
            }
        }
    }
    true
}

/// The player's own task: turns delivered slots into tokens and claims.
pub struct PlayerTask {
    player: Arc<Player>,
    selections: mpsc::Receiver<Slot>,
    claims: mpsc::Sender<Claim>,
    stop: watch::Receiver<bool>,
    computer: Option<ComputerInput>,
}

impl PlayerTask {
    pub fn new(
        player: Arc<Player>,
        selections: mpsc::Receiver<Slot>,
        claims: mpsc::Sender<Claim>,
        stop: watch::Receiver<bool>,
        computer: Option<ComputerInput>,
    ) -> Self {
        Self { player, selections, claims, stop, computer }
    }

    pub async fn run(mut self) {
        let thread_name = format!("player-{}", self.player.id);
        Logger::thread_start(&thread_name);

        let computer = self.computer.take().map(|input| tokio::spawn(input.run()));

        loop {
            let slot = tokio::select! {
                _ = terminated(&mut self.stop) => break,
                slot = self.selections.recv() => slot,
            };

            let Some(slot) = slot else {
                // Nobody can press for this player any more.
                terminated(&mut self.stop).await;
                break;
            };

            match self.player.select(slot).await {
                Selection::Claimed(slots) => {
                    if !self.submit_claim(slots).await {
                        break;
                    }
                }
                Selection::Placed => logger!(DEBUG, "[PLAYER {}] Token on slot {slot}", self.player.id),
                Selection::Removed => logger!(DEBUG, "[PLAYER {}] Token off slot {slot}", self.player.id),
                Selection::Ignored => {}
            }
        }

        self.selections.close();
        if let Some(computer) = computer {
            if let Err(error) = computer.await {
                logger!(ERROR, "[PLAYER {}] Input generator failed ({error})", self.player.id);
            }
        }
        Logger::thread_stop(&thread_name);
    }

    /// Hands the claim to the dealer and waits for the verdict.
    /// Returns false when the player was told to stop meanwhile.
    async fn submit_claim(&mut self, slots: [Slot; TOKEN_SIZE]) -> bool {
        let id = self.player.id;
        let (claim, verdict) = Claim::new(id, slots);
        logger!(DEBUG, "[PLAYER {id}] Claiming slots {:?}", slots);

        tokio::select! {
            _ = terminated(&mut self.stop) => return false,
            sent = self.claims.send(claim) => {
                if sent.is_err() {
                    logger!(WARN, "[PLAYER {id}] Dealer is gone, claim dropped");
                    return true;
                }
            }
        }

        tokio::select! {
            _ = terminated(&mut self.stop) => false,
            verdict = verdict => {
                match verdict {
                    Ok(ClaimOutcome::Point) => logger!(DEBUG, "[PLAYER {id}] Claim accepted"),
                    Ok(ClaimOutcome::Penalty) => logger!(DEBUG, "[PLAYER {id}] Claim rejected"),
                    Ok(ClaimOutcome::Stale) => logger!(DEBUG, "[PLAYER {id}] Claim outdated"),
                    Err(_) => logger!(DEBUG, "[PLAYER {id}] Claim dropped by the dealer"),
                }
                true
            }
        }
    }
}
