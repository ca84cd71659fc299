use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::game::player::{sweep_slots, Player, PlayerTask};
use crate::game::set_validator::{contains_set, is_set};
use crate::game::table::Table;
use crate::logger;
use crate::models::claim::{Claim, ClaimOutcome};
use crate::models::settings::Settings;
use crate::models::types::{Card, PlayerId};
use crate::ui::interface::UserInterface;
use crate::utils::logger::Logger;
use crate::utils::shutdown::{is_terminated, terminated};

/// Longest the dealer sleeps between countdown refreshes.
const TICK: Duration = Duration::from_millis(1000);
/// Refresh rate once the countdown enters its warning window.
const WARNING_TICK: Duration = Duration::from_millis(10);

/// A player whose task the dealer starts, stops and joins.
pub struct Seat {
    pub player: Arc<Player>,
    task: Option<PlayerTask>,
    stop: watch::Sender<bool>,
    thread: Option<JoinHandle<()>>,
}

impl Seat {
    pub fn new(player: Arc<Player>, task: PlayerTask, stop: watch::Sender<bool>) -> Self {
        Self { player, task: Some(task), stop, thread: None }
    }
}

/// Drives the rounds: deals, runs the countdown, verifies claims and reshuffles.
pub struct Dealer {
    settings: Arc<Settings>,
    table: Arc<Table>,
    ui: Arc<dyn UserInterface>,
    seats: Vec<Seat>,
    deck: VecDeque<Card>,
    claims: mpsc::Receiver<Claim>,
    claims_open: bool,
    pending: VecDeque<Claim>,
    stop: watch::Receiver<bool>,
    reshuffle_time: Instant,
    reset_timer: bool,
    rng: StdRng,
}

impl Dealer {
    pub fn new(
        settings: Arc<Settings>,
        table: Arc<Table>,
        ui: Arc<dyn UserInterface>,
        seats: Vec<Seat>,
        claims: mpsc::Receiver<Claim>,
        stop: watch::Receiver<bool>,
        rng: StdRng,
    ) -> Self {
        let deck = (0..settings.deck_size).collect();
        let reshuffle_time = Instant::now() + settings.turn_timeout();
        Self {
            settings,
            table,
            ui,
            seats,
            deck,
            claims,
            claims_open: true,
            pending: VecDeque::new(),
            stop,
            reshuffle_time,
            reset_timer: false,
            rng,
        }
    }

    /// Runs the game to its end and returns the winners.
    pub async fn run(mut self) -> Vec<PlayerId> {
        Logger::thread_start("dealer");
        self.start_players();
        self.shuffle_deck();

        while !self.should_finish().await {
            self.place_cards_on_table().await;
            self.update_timer_display(true);
            self.timer_loop().await;
            self.update_timer_display(true);
            self.remove_all_cards_from_table().await;
        }

        self.terminate_players().await;
        let winners = self.announce_winners().await;
        Logger::thread_stop("dealer");
        winners
    }

    fn start_players(&mut self) {
        for seat in &mut self.seats {
            if let Some(task) = seat.task.take() {
                seat.thread = Some(tokio::spawn(task.run()));
            }
        }
        logger!(INFO, "[DEALER] Started {} players", self.seats.len());
    }

    /// Stops the players in reverse start order, waiting for each one.
    async fn terminate_players(&mut self) {
        // Claims left in the queue will never be verified.
        self.pending.clear();
        self.claims.close();
        while self.claims.try_recv().is_ok() {}

        for seat in self.seats.iter_mut().rev() {
            seat.stop.send_replace(true);
            if let Some(thread) = seat.thread.take() {
                if let Err(error) = thread.await {
                    logger!(ERROR, "[DEALER] Player {} did not stop cleanly ({error})", seat.player.id);
                }
            }
        }
    }

    /// The inner loop of a round, running until the countdown runs out.
    async fn timer_loop(&mut self) {
        while !is_terminated(&self.stop) && Instant::now() < self.reshuffle_time {
            self.sleep_until_woken_or_timeout().await;
            self.update_timer_display(false);
            self.resolve_claims().await;
            self.place_cards_on_table().await;

            if self.round_exhausted().await {
                logger!(INFO, "[DEALER] Deck is empty and the table holds no set");
                break;
            }
        }
    }

    /// Sleeps until the next countdown tick, a new claim, or a stop request.
    async fn sleep_until_woken_or_timeout(&mut self) {
        let now = Instant::now();
        let remaining = self.reshuffle_time.saturating_duration_since(now);
        let tick = if remaining <= self.settings.turn_timeout_warning() {
            WARNING_TICK
        } else {
            TICK
        };
        let wake_at = now + tick.min(remaining);

        tokio::select! {
            claim = self.claims.recv(), if self.claims_open => match claim {
                Some(claim) => self.pending.push_back(claim),
                None => self.claims_open = false,
            },
            _ = sleep_until(wake_at) => {}
            _ = terminated(&mut self.stop) => {}
        }
    }

    /// Verifies every queued claim, oldest first.
    async fn resolve_claims(&mut self) {
        while let Ok(claim) = self.claims.try_recv() {
            self.pending.push_back(claim);
        }
        while let Some(claim) = self.pending.pop_front() {
            self.resolve_claim(claim).await;
        }
    }

    async fn resolve_claim(&mut self, claim: Claim) -> ClaimOutcome {
        let outcome = self.judge_claim(&claim).await;
        logger!(
            DEBUG,
            "[DEALER] Claim of player {} on slots {:?}: {:?}",
            claim.player,
            claim.slots,
            outcome
        );
        // The player may have stopped waiting.
        let _ = claim.reply.send(outcome);
        outcome
    }

    async fn judge_claim(&mut self, claim: &Claim) -> ClaimOutcome {
        let Some(claimant) = self.seats.get(claim.player).map(|s| Arc::clone(&s.player)) else {
            logger!(WARN, "[DEALER] Claim from unknown player {}", claim.player);
            return ClaimOutcome::Stale;
        };

        if !claimant.holds_claim(&claim.slots).await {
            return ClaimOutcome::Stale;
        }
        let Some([card1, card2, card3]) = self.table.cards_at(&claim.slots).await else {
            return ClaimOutcome::Stale;
        };

        if !is_set(card1, card2, card3) {
            claimant.penalty().await;
            return ClaimOutcome::Penalty;
        }

        claimant.point().await;
        sweep_slots(&self.players(), &self.table, &claim.slots).await;
        if self.settings.reset_timer_on_set {
            self.reset_timer = true;
        }
        ClaimOutcome::Point
    }

    /// Deals from the deck into every empty slot.
    async fn place_cards_on_table(&mut self) {
        let mut placed = false;
        for slot in self.table.empty_slots().await {
            let Some(card) = self.deck.pop_front() else {
                break;
            };
            match self.table.place_card(card, slot).await {
                Ok(()) => placed = true,
                Err(error) => {
                    logger!(WARN, "[DEALER] Could not deal card {card} ({error})");
                    self.deck.push_front(card);
                }
            }

            let delay = self.settings.table_delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        if placed && self.reset_timer {
            self.update_timer_display(true);
        }
    }

    /// Restarts the countdown when `reset` is set, then shows the time left.
    fn update_timer_display(&mut self, reset: bool) {
        let now = Instant::now();
        if reset {
            self.reshuffle_time = now + self.settings.turn_timeout();
            self.reset_timer = false;
        }

        let remaining = self.reshuffle_time.saturating_duration_since(now);
        let warn = remaining <= self.settings.turn_timeout_warning();
        self.ui.set_countdown(remaining.as_millis() as u64, warn);
    }

    /// Takes every token back and returns all table cards to a reshuffled deck.
    async fn remove_all_cards_from_table(&mut self) {
        let slots: Vec<_> = (0..self.table.size().await).collect();
        let cards = sweep_slots(&self.players(), &self.table, &slots).await;
        logger!(DEBUG, "[DEALER] Returned {} cards to the deck", cards.len());
        self.deck.extend(cards);
        self.shuffle_deck();
    }

    fn players(&self) -> Vec<Arc<Player>> {
        self.seats.iter().map(|seat| Arc::clone(&seat.player)).collect()
    }

    fn shuffle_deck(&mut self) {
        self.deck.make_contiguous().shuffle(&mut self.rng);
    }

    /// The game is over once a stop was requested or no set is left anywhere.
    async fn should_finish(&self) -> bool {
        if is_terminated(&self.stop) {
            return true;
        }

        let mut remaining: Vec<Card> = self.deck.iter().copied().collect();
        remaining.extend(self.table.cards().await);
        !contains_set(&remaining)
    }

    /// True when nothing can be dealt and nothing on the table can be claimed.
    async fn round_exhausted(&self) -> bool {
        self.deck.is_empty() && !contains_set(&self.table.cards().await)
    }

    async fn announce_winners(&self) -> Vec<PlayerId> {
        let scores: Vec<(PlayerId, u32)> = self
            .seats
            .iter()
            .map(|seat| (seat.player.id, seat.player.score()))
            .collect();
        let winners = winners(&scores);

        self.ui.announce_winners(&winners);
        logger!(INFO, "[DEALER] Winners: {:?} (scores {:?})", winners, scores);
        tokio::time::sleep(self.settings.end_game_pause()).await;
        winners
    }
}

/// Every player holding the top score, sorted by id.
pub fn winners(scores: &[(PlayerId, u32)]) -> Vec<PlayerId> {
    let Some(best) = scores.iter().map(|(_, score)| *score).max() else {
        return Vec::new();
    };
    let mut winners: Vec<PlayerId> = scores
        .iter()
        .filter(|(_, score)| *score == best)
        .map(|(id, _)| *id)
        .collect();
    winners.sort_unstable();
    winners
}
