//! Bidding for trump.

use serde::Serialize;

use crate::tractor::{Card, PlayerError, Rank, Seat, Suit};

/// The active bid. Its cards sit in the bidder's play zone until bidding
/// closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bid {
    pub bidder: Seat,
    pub cards: Vec<Card>,
}

impl Bid {
    /// The suit claimed by this bid. Jokers claim no suit.
    pub fn suit(&self) -> Option<Suit> {
        self.cards.first().and_then(|c| c.face.suit())
    }

    fn is_jokers(&self) -> bool {
        self.cards.first().is_some_and(|c| c.face.is_joker())
    }
}

/// Validates a bid against the active bid.
///
/// A single card must be of the trump rank. A pair must be two identical
/// trump cards, either of the trump rank or jokers. A new bidder must bid more
/// cards than the active bid, or a pair of jokers over any other pair. The
/// active bidder may only reinforce a single with its twin.
pub fn check_bid(
    active: Option<&Bid>,
    seat: Seat,
    cards: &[Card],
    trump_rank: Rank,
) -> Result<(), PlayerError> {
    if let Some(active) = active.filter(|a| a.bidder == seat) {
        return match (active.cards.as_slice(), cards) {
            ([held], [card]) if held.face == card.face => Ok(()),
            _ => Err(PlayerError::InvalidBid),
        };
    }

    match cards {
        [] => return Err(PlayerError::EmptySelection),
        [card] if card.face.rank() == Some(trump_rank) => {}
        [a, b] if a.face == b.face && (a.face.is_joker() || a.face.rank() == Some(trump_rank)) => {}
        _ => return Err(PlayerError::InvalidBid),
    }

    let Some(active) = active else {
        return Ok(());
    };
    let jokers = cards[0].face.is_joker();
    if active.cards.len() < cards.len() || (jokers && !active.is_jokers()) {
        Ok(())
    } else {
        Err(PlayerError::BidTooWeak)
    }
}
