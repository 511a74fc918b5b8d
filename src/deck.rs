//! A deck of cards.

use std::iter::FromIterator;

use rand::seq::SliceRandom;
use rand::Rng;

/// A deck of cards. Cards are drawn from the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck<C> {
    cards: Vec<C>,
}

impl<C> Default for Deck<C> {
    fn default() -> Self {
        Self { cards: vec![] }
    }
}

impl<C> FromIterator<C> for Deck<C> {
    fn from_iter<T: IntoIterator<Item = C>>(iter: T) -> Self {
        let cards = iter.into_iter().collect();
        Self { cards }
    }
}

impl<C> From<Deck<C>> for Vec<C> {
    fn from(deck: Deck<C>) -> Self {
        deck.cards
    }
}

impl<C> Deck<C> {
    /// The number of cards remaining in the deck.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True if no cards remain.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Uniformly permutes the remaining cards.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Removes up to `n` cards from the end of the deck.
    pub fn take(&mut self, n: usize) -> Vec<C> {
        let idx = self.cards.len().saturating_sub(n);
        self.cards.split_off(idx)
    }

    /// Removes the next card from the deck.
    pub fn draw(&mut self) -> Option<C> {
        self.cards.pop()
    }

    /// Iterates over the remaining cards, from the bottom of the deck.
    pub fn iter(&self) -> std::slice::Iter<'_, C> {
        self.cards.iter()
    }
}
