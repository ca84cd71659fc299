//! Concurrent engine for the "Set" card game: a dealer task owns the deck and the
//! countdown, player tasks place tokens on a shared table, and every three-token
//! claim is verified by the dealer in arrival order.

pub mod game;
pub mod models;
pub mod ui;
pub mod utils;
