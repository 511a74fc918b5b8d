//! Tricks played during a round.

use delegate::delegate;

use crate::tractor::{Seat, Team, Trick};

/// Tricks played this round. Completed tricks form the taken pile.
#[derive(Debug, Clone, Default)]
pub struct Tricks {
    tricks: Vec<Trick>,
}

impl Tricks {
    delegate! {
        to self.tricks {
            pub fn len(&self) -> usize;
            pub fn is_empty(&self) -> bool;
            pub fn last(&self) -> Option<&Trick>;
            pub fn last_mut(&mut self) -> Option<&mut Trick>;
            pub fn iter(&self) -> std::slice::Iter<'_, Trick>;
        }
    }

    /// Opens a new trick.
    pub fn push(&mut self, trick: Trick) {
        assert!(self.current().is_none());
        self.tricks.push(trick);
    }

    /// The trick in progress, if any.
    pub fn current(&self) -> Option<&Trick> {
        self.last().filter(|t| !t.is_complete())
    }

    /// The number of cards played into tricks so far.
    pub fn card_count(&self) -> usize {
        self.tricks.iter().map(|t| t.cards().count()).sum()
    }

    /// Sums the points in completed tricks won by the specified team.
    pub fn points_won(&self, team: Team) -> u32 {
        self.tricks
            .iter()
            .filter(|t| t.is_complete() && t.best().0.team() == team)
            .map(Trick::points)
            .sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tractor::card::cards;
    use crate::tractor::{Rank, Suit, Trump};

    #[test]
    fn test_points_won() {
        let trump = Trump::new(Some(Suit::Heart), Rank::Three);
        let c = cards(&["5S", "KS", "10S", "4S", "AS", "6S", "7S", "8S"], trump);
        let mut tricks = Tricks::default();

        let mut trick = Trick::new(0, Seat::North, vec![c[0]]);
        for (i, seat) in Seat::North.order_from()[1..].iter().enumerate() {
            trick.play(*seat, vec![c[i + 1]]);
        }
        tricks.push(trick);
        assert_eq!(None, tricks.current().map(|t| t.number));
        assert_eq!(Some(Seat::East), tricks.last().map(|t| t.best().0));
        assert_eq!(25, tricks.points_won(Team::EastWest));
        assert_eq!(0, tricks.points_won(Team::NorthSouth));

        tricks.push(Trick::new(1, Seat::East, vec![c[4]]));
        assert_eq!(Some(1), tricks.current().map(|t| t.number));
        assert_eq!(5, tricks.card_count());
    }
}
