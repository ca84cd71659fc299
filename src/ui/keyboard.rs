use std::io::BufRead;
use std::thread::{self, JoinHandle};

use crate::game::input::PlayerHandle;
use crate::logger;
use crate::models::types::{PlayerId, Slot};

/// Parses a `<player> <slot>` line.
pub fn parse_selection(line: &str) -> Option<(PlayerId, Slot)> {
    let mut parts = line.split_whitespace();
    let player = parts.next()?.parse().ok()?;
    let slot = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((player, slot))
}

/// Reads selections for the human players from `input` on a plain OS thread.
///
/// The thread ends when the input closes. Presses for computer players or
/// unknown ids are refused.
pub fn spawn<R>(input: R, humans: Vec<PlayerHandle>) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let Some((player, slot)) = parse_selection(&line) else {
                logger!(WARN, "[UI] Expected `<player> <slot>`, got `{}`", line.trim());
                continue;
            };
            let Some(handle) = humans.iter().find(|handle| handle.id == player) else {
                logger!(WARN, "[UI] Player {player} does not take keyboard input");
                continue;
            };
            if !handle.key_pressed_blocking(slot) {
                logger!(DEBUG, "[UI] Press of player {player} on slot {slot} refused");
            }
        }
    })
}
