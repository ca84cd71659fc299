use tokio::sync::oneshot;

use crate::models::types::{PlayerId, Slot, TOKEN_SIZE};

/// A player's three tokens, handed to the dealer for verification.
///
/// The slots are captured when the third token lands; the dealer re-checks them
/// against the table before scoring.
#[derive(Debug)]
pub struct Claim {
    pub player: PlayerId,
    pub slots: [Slot; TOKEN_SIZE],
    pub reply: oneshot::Sender<ClaimOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The cards formed a set and left the table.
    Point,
    /// The cards did not form a set.
    Penalty,
    /// A token or card moved before the dealer got to the claim.
    Stale,
}

impl Claim {
    pub fn new(player: PlayerId, slots: [Slot; TOKEN_SIZE]) -> (Self, oneshot::Receiver<ClaimOutcome>) {
        let (reply, receiver) = oneshot::channel();
        (Self { player, slots, reply }, receiver)
    }
}
