/// Card identifier in `[0, deck_size)`. Its base-3 digits are the card's features.
pub type Card = u32;

/// Table position in `[0, table_size)`.
pub type Slot = usize;

/// Player identifier, assigned from 0 in start order.
pub type PlayerId = usize;

/// Number of tokens that make up a claim.
pub const TOKEN_SIZE: usize = 3;
