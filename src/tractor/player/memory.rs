//! What a player remembers about the other hands.

use std::collections::{HashMap, HashSet};

use crate::tractor::{Seat, SuitClass, Trick};

/// Suits each seat has shown itself to be out of this round.
#[derive(Debug, Clone, Default)]
pub struct VoidMemory {
    voids: HashMap<Seat, HashSet<SuitClass>>,
}

impl VoidMemory {
    pub fn clear(&mut self) {
        self.voids.clear();
    }

    pub fn is_void(&self, seat: Seat, suit: SuitClass) -> bool {
        self.voids.get(&seat).is_some_and(|s| s.contains(&suit))
    }

    /// True if either opponent of `seat` is out of the suit.
    pub fn opponent_void(&self, seat: Seat, suit: SuitClass) -> bool {
        seat.opponents().iter().any(|&s| self.is_void(s, suit))
    }

    /// Records every follower that played outside the lead suit. Observing the
    /// same trick twice is harmless.
    pub fn observe(&mut self, trick: &Trick) {
        let suit = trick.lead_suit();
        for (seat, cards) in trick.plays().iter().skip(1) {
            if cards.iter().any(|c| c.suit != suit) {
                self.voids.entry(*seat).or_default().insert(suit);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tractor::card::cards;
    use crate::tractor::{Rank, Suit, Trump};

    #[test]
    fn test_observe() {
        let trump = Trump::new(Some(Suit::Spade), Rank::Two);
        let c = cards(&["4H", "6H", "3S", "5H", "7C"], trump);
        let hearts = SuitClass::Plain(Suit::Heart);

        let mut trick = Trick::new(0, Seat::North, vec![c[0]]);
        trick.play(Seat::East, vec![c[1]]);
        trick.play(Seat::South, vec![c[2]]);
        let mut memory = VoidMemory::default();
        memory.observe(&trick);
        assert!(memory.is_void(Seat::South, hearts));
        assert!(!memory.is_void(Seat::East, hearts));
        assert!(!memory.is_void(Seat::North, hearts));
        assert!(memory.opponent_void(Seat::East, hearts));
        assert!(!memory.opponent_void(Seat::North, hearts));

        memory.clear();
        assert!(!memory.is_void(Seat::South, hearts));
    }
}
