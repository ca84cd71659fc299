use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tokio::sync::{mpsc, watch};

use crate::game::table::Table;
use crate::logger;
use crate::models::types::{PlayerId, Slot};
use crate::utils::logger::Logger;
use crate::utils::shutdown::{is_terminated, terminated};

/// Delivers slot selections into one player's task.
///
/// The channel holds a single selection: a second press waits until the player
/// has picked up the first one.
#[derive(Clone)]
pub struct PlayerHandle {
    pub id: PlayerId,
    table: Arc<Table>,
    sender: mpsc::Sender<Slot>,
}

impl PlayerHandle {
    pub fn new(id: PlayerId, table: Arc<Table>, sender: mpsc::Sender<Slot>) -> Self {
        Self { id, table, sender }
    }

    /// Presses `slot` for this player. Returns false if the slot holds no card or
    /// the player has stopped.
    pub async fn key_pressed(&self, slot: Slot) -> bool {
        if self.table.card_at(slot).await.is_none() {
            return false;
        }
        self.sender.send(slot).await.is_ok()
    }

    /// Blocking twin of [`PlayerHandle::key_pressed`] for threads outside the runtime.
    pub fn key_pressed_blocking(&self, slot: Slot) -> bool {
        if self.table.blocking_card_at(slot).is_none() {
            return false;
        }
        self.sender.blocking_send(slot).is_ok()
    }
}

/// Self-driving input for a computer player: presses random occupied slots.
pub struct ComputerInput {
    handle: PlayerHandle,
    table_size: usize,
    delay: Duration,
    rng: StdRng,
    stop: watch::Receiver<bool>,
}

impl ComputerInput {
    pub fn new(
        handle: PlayerHandle,
        table_size: usize,
        delay: Duration,
        rng: StdRng,
        stop: watch::Receiver<bool>,
    ) -> Self {
        Self { handle, table_size, delay, rng, stop }
    }

    pub async fn run(mut self) {
        let thread_name = format!("computer-{}", self.handle.id);
        Logger::thread_start(&thread_name);

        while !is_terminated(&self.stop) {
            let slot = self.rng.random_range(0..self.table_size);
            tokio::select! {
                _ = terminated(&mut self.stop) => break,
                pressed = self.handle.key_pressed(slot) => {
                    if pressed {
                        logger!(DEBUG, "[PLAYER {}] Computer pressed slot {slot}", self.handle.id);
                    }
                }
            }

            tokio::select! {
                _ = terminated(&mut self.stop) => break,
                _ = tokio::time::sleep(self.delay) => {}
            }
        }

        Logger::thread_stop(&thread_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::recording::RecordingUi;
    use rand::SeedableRng;

    async fn table_with_cards(slots: &[Slot]) -> Arc<Table> {
        let table = Arc::new(Table::new(4, 81, Arc::new(RecordingUi::new())));
        for (card, &slot) in slots.iter().enumerate() {
            table.place_card(card as u32, slot).await.unwrap();
        }
        table
    }

    #[tokio::test]
    async fn test_press_on_empty_slot_is_rejected() {
        let table = table_with_cards(&[0]).await;
        let (sender, mut receiver) = mpsc::channel(1);
        let handle = PlayerHandle::new(0, table, sender);

        assert!(!handle.key_pressed(1).await);
        assert!(!handle.key_pressed(9).await);
        assert!(handle.key_pressed(0).await);
        assert_eq!(receiver.recv().await, Some(0));
    }

    #[tokio::test]
    async fn test_second_press_waits_for_the_first() {
        let table = table_with_cards(&[0, 1]).await;
        let (sender, mut receiver) = mpsc::channel(1);
        let handle = PlayerHandle::new(0, table, sender);

        assert!(handle.key_pressed(0).await);
        let second = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.key_pressed(1).await })
        };
        tokio::task::yield_now().await;
        assert!(!second.is_finished());

        assert_eq!(receiver.recv().await, Some(0));
        assert!(second.await.unwrap());
        assert_eq!(receiver.recv().await, Some(1));
    }

    #[tokio::test]
    async fn test_press_after_player_stopped() {
        let table = table_with_cards(&[0]).await;
        let (sender, receiver) = mpsc::channel(1);
        drop(receiver);
        let handle = PlayerHandle::new(0, table, sender);
        assert!(!handle.key_pressed(0).await);
    }

    #[test]
    fn test_blocking_press_from_a_plain_thread() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let table = runtime.block_on(table_with_cards(&[0, 1, 2]));
        let (sender, mut receiver) = mpsc::channel(1);
        let handle = PlayerHandle::new(0, table, sender);

        let presser = std::thread::spawn(move || {
            [handle.key_pressed_blocking(2), handle.key_pressed_blocking(3)]
        });
        assert_eq!(presser.join().unwrap(), [true, false]);
        assert_eq!(receiver.try_recv().ok(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_computer_presses_only_occupied_slots() {
        let table = table_with_cards(&[1, 3]).await;
        let (sender, mut receiver) = mpsc::channel(1);
        let (stop_sender, stop) = watch::channel(false);
        let handle = PlayerHandle::new(0, table, sender);
        let computer = ComputerInput::new(
            handle,
            4,
            Duration::from_millis(2),
            StdRng::seed_from_u64(7),
            stop,
        );
        let task = tokio::spawn(computer.run());

        for _ in 0..20 {
            let slot = receiver.recv().await.unwrap();
            assert!(slot == 1 || slot == 3);
        }

        stop_sender.send_replace(true);
        task.await.unwrap();
    }
}
