//! Decomposition of a set of cards into tractors, pairs and singles.

use std::collections::HashSet;

use itertools::Itertools;
use serde::Serialize;

use super::{Card, CardId};

/// A partition of a set of cards into tractors, pairs and singles.
///
/// Tractors are ordered longest first, then by highest rank. Pairs and singles
/// are ordered by ascending rank. Each tractor lists its cards in ascending
/// rank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Decomposition {
    pub tractors: Vec<Vec<Card>>,
    pub pairs: Vec<[Card; 2]>,
    pub singles: Vec<Card>,
}

impl Decomposition {
    /// The number of components: tractors, pairs and singles.
    pub fn component_count(&self) -> usize {
        self.tractors.len() + self.pairs.len() + self.singles.len()
    }

    /// Iterates over every card in the decomposition.
    pub fn cards(&self) -> impl Iterator<Item = &Card> + '_ {
        self.tractors
            .iter()
            .flatten()
            .chain(self.pairs.iter().flatten())
            .chain(self.singles.iter())
    }

    /// Iterates over each component as a slice of cards, in comparison order.
    pub fn components(&self) -> impl Iterator<Item = &[Card]> + '_ {
        self.tractors
            .iter()
            .map(Vec::as_slice)
            .chain(self.pairs.iter().map(|p| p.as_slice()))
            .chain(self.singles.iter().map(std::slice::from_ref))
    }

    /// The component that decides comparisons between equally-shaped plays.
    pub fn lead_component(&self) -> Option<&[Card]> {
        self.components().next()
    }
}

fn sort_key(card: &Card) -> (u8, crate::french::Face, CardId) {
    (card.rank, card.face, card.id)
}

fn min_rank(cards: &[Card]) -> u8 {
    cards.iter().map(|c| c.rank).min().unwrap_or_default()
}

fn max_rank(cards: &[Card]) -> u8 {
    cards.iter().map(|c| c.rank).max().unwrap_or_default()
}

fn sort_tractors(tractors: &mut [Vec<Card>]) {
    tractors.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| max_rank(b).cmp(&max_rank(a)))
    });
}

fn is_next_pair(prev: &[Card; 2], next: &[Card; 2]) -> bool {
    next[0].suit == prev[0].suit && next[0].rank == prev[0].rank + 1
}

/// Splits cards into exact pairs and leftover singles. Pairs are ordered by
/// ascending rank.
fn split_pairs(cards: &[Card]) -> (Vec<[Card; 2]>, Vec<Card>) {
    let mut pairs = vec![];
    let mut singles = vec![];
    let sorted = cards.iter().copied().sorted_by_key(sort_key);
    for (_, group) in &sorted.chunk_by(|c| c.face) {
        for chunk in &group.chunks(2) {
            match chunk.collect_vec().as_slice() {
                [a, b] => pairs.push([*a, *b]),
                [a] => singles.push(*a),
                _ => unreachable!(),
            }
        }
    }
    (pairs, singles)
}

/// Decomposes a set of cards into tractors, pairs and singles.
///
/// Tractors are detected by a greedy left-to-right scan over the pairs in
/// ascending rank. This isn't guaranteed to find the longest possible tractor
/// when several pairs share a rank.
pub fn decompose(cards: &[Card], detect_tractors: bool) -> Decomposition {
    let (all_pairs, mut singles) = split_pairs(cards);

    let mut tractors = vec![];
    let mut pairs = vec![];
    let mut i = 0;
    while i < all_pairs.len() {
        let mut j = i + 1;
        if detect_tractors {
            while j < all_pairs.len() && is_next_pair(&all_pairs[j - 1], &all_pairs[j]) {
                j += 1;
            }
        }
        if j - i >= 2 {
            tractors.push(all_pairs[i..j].iter().flatten().copied().collect());
            i = j;
        } else {
            pairs.push(all_pairs[i]);
            i += 1;
        }
    }
    sort_tractors(&mut tractors);
    singles.sort_by_key(sort_key);

    Decomposition {
        tractors,
        pairs,
        singles,
    }
}

/// Finds every tractor made of exactly `pair_count` pairs, ordered by
/// ascending starting rank.
pub fn find_tractors(cards: &[Card], pair_count: usize) -> Vec<Vec<Card>> {
    let (pairs, _) = split_pairs(cards);
    let mut runs: Vec<Vec<[Card; 2]>> = pairs.iter().map(|p| vec![*p]).collect();
    for _ in 1..pair_count {
        runs = runs
            .into_iter()
            .flat_map(|run| {
                let last = *run.last().expect("runs are non-empty");
                pairs
                    .iter()
                    .filter(move |p| is_next_pair(&last, p))
                    .map(move |p| {
                        let mut run = run.clone();
                        run.push(*p);
                        run
                    })
            })
            .collect();
    }
    runs.into_iter()
        .filter(|run| run.len() == pair_count && pair_count >= 2)
        .map(|run| run.into_iter().flatten().collect())
        .collect()
}

/// Finds every pair, ordered by ascending rank.
pub fn find_pairs(cards: &[Card]) -> Vec<[Card; 2]> {
    split_pairs(cards).0
}

fn remove_cards(cards: &mut Vec<Card>, used: &[Card]) {
    let ids: HashSet<CardId> = used.iter().map(|c| c.id).collect();
    cards.retain(|c| !ids.contains(&c.id));
}

/// Carves the same shape as `template` out of `cards`: the same tractor
/// lengths and the same number of pairs, with the rest as singles. At each
/// step, the largest available component is taken.
///
/// Returns `None` if the shape can't be matched.
pub fn decompose_to_match(cards: &[Card], template: &Decomposition) -> Option<Decomposition> {
    let mut rest = cards.to_vec();
    let mut result = Decomposition::default();

    for tractor in &template.tractors {
        let found = find_tractors(&rest, tractor.len() / 2)
            .into_iter()
            .max_by_key(|t| (max_rank(t), min_rank(t)))?;
        remove_cards(&mut rest, &found);
        result.tractors.push(found);
    }
    sort_tractors(&mut result.tractors);

    for _ in &template.pairs {
        let found = find_pairs(&rest).pop()?;
        remove_cards(&mut rest, &found);
        result.pairs.push(found);
    }
    result.pairs.sort_by_key(|p| sort_key(&p[0]));

    rest.sort_by_key(sort_key);
    if rest.len() != template.singles.len() {
        return None;
    }
    result.singles = rest;
    Some(result)
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::tractor::card::{cards, shuffled_deck};
    use crate::tractor::{Rank, Suit, Trump};

    fn trump() -> Trump {
        Trump::new(Some(Suit::Spade), Rank::Two)
    }

    fn codes(cards: &[Card]) -> Vec<String> {
        cards.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_decompose_tractor_and_single() {
        let hand = cards(&["5H", "3H", "4H", "3H", "4H"], trump());
        let d = decompose(&hand, true);
        assert_eq!(1, d.tractors.len());
        assert_eq!(vec!["3H", "3H", "4H", "4H"], codes(&d.tractors[0]));
        assert!(d.pairs.is_empty());
        assert_eq!(vec!["5H"], codes(&d.singles));

        let d = decompose(&hand, false);
        assert!(d.tractors.is_empty());
        assert_eq!(2, d.pairs.len());
        assert_eq!(1, d.singles.len());
    }

    #[test]
    fn test_decompose_orders_tractors() {
        let hand = cards(
            &[
                "3H", "3H", "4H", "4H", "9H", "9H", "10H", "10H", "JH", "JH", "6D", "6D", "7D",
                "7D",
            ],
            trump(),
        );
        let d = decompose(&hand, true);
        assert_eq!(3, d.tractors.len());
        assert_eq!(6, d.tractors[0].len());
        assert_eq!(vec!["6D", "6D", "7D", "7D"], codes(&d.tractors[2]));
        assert_eq!(vec!["3H", "3H", "4H", "4H"], codes(&d.tractors[1]));
    }

    #[test]
    fn test_decompose_trump_tractor() {
        // Ace of trump runs into the offsuit trump rank, which runs into the
        // trump rank of the trump suit, which runs into the jokers.
        let hand = cards(
            &["AS", "AS", "2H", "2H", "JOKER1", "JOKER1", "JOKER2", "JOKER2"],
            trump(),
        );
        let d = decompose(&hand, true);
        assert_eq!(
            vec!["JOKER1", "JOKER1", "JOKER2", "JOKER2"],
            codes(&d.tractors[0])
        );
        assert_eq!(vec!["AS", "AS", "2H", "2H"], codes(&d.tractors[1]));

        // No tractor across a suit boundary.
        let hand = cards(&["AH", "AH", "3S", "3S"], trump());
        assert!(decompose(&hand, true).tractors.is_empty());
        let hand = cards(&["AC", "AC", "3D", "3D"], trump());
        assert!(decompose(&hand, true).tractors.is_empty());
    }

    #[test]
    fn test_decompose_greedy_scan() {
        // Two offsuit trump-rank pairs share a rank; the scan pairs the
        // later one with the trump-suit trump rank.
        let hand = cards(&["2C", "2C", "2H", "2H", "2S", "2S"], trump());
        let d = decompose(&hand, true);
        assert_eq!(vec!["2H", "2H", "2S", "2S"], codes(&d.tractors[0]));
        assert_eq!(vec!["2C", "2C"], codes(&d.pairs[0]));
    }

    #[test]
    fn test_decompose_partitions_random_hands() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let mut deck = shuffled_deck(trump(), &mut rng);
            let hand = deck.take(33);
            let d = decompose(&hand, true);
            let mut seen: Vec<CardId> = d.cards().map(|c| c.id).collect();
            seen.sort_unstable();
            let mut want: Vec<CardId> = hand.iter().map(|c| c.id).collect();
            want.sort_unstable();
            assert_eq!(want, seen);
        }
    }

    #[test]
    fn test_find_tractors() {
        let hand = cards(&["2C", "2C", "2H", "2H", "2S", "2S", "AS", "AS"], trump());
        let found = find_tractors(&hand, 2);
        let found: Vec<_> = found.iter().map(|t| codes(t)).collect();
        assert!(found.contains(&vec![
            "AS".to_string(),
            "AS".into(),
            "2C".into(),
            "2C".into()
        ]));
        assert!(found.contains(&vec![
            "2C".to_string(),
            "2C".into(),
            "2S".into(),
            "2S".into()
        ]));
        assert_eq!(4, found.len());
        assert_eq!(2, find_tractors(&hand, 3).len());
        assert!(find_tractors(&hand, 4).is_empty());
    }

    #[test]
    fn test_decompose_to_match() {
        let lead = cards(&["3H", "3H", "4H", "4H", "9H"], trump());
        let template = decompose(&lead, true);

        let hand = cards(&["6H", "6H", "7H", "7H", "8H"], trump());
        let m = decompose_to_match(&hand, &template).expect("matches");
        assert_eq!(vec!["6H", "6H", "7H", "7H"], codes(&m.tractors[0]));
        assert_eq!(vec!["8H"], codes(&m.singles));

        let hand = cards(&["6H", "6H", "8H", "8H", "9H"], trump());
        assert_eq!(None, decompose_to_match(&hand, &template));

        // Takes the largest pair.
        let lead = cards(&["3H", "3H", "5H"], trump());
        let template = decompose(&lead, true);
        let hand = cards(&["6H", "6H", "QH", "QH", "KH"], trump());
        let m = decompose_to_match(&hand[1..], &template);
        assert_eq!(None, m);
        let m = decompose_to_match(&hand[2..], &template).expect("matches");
        assert_eq!(vec!["QH", "QH"], codes(&m.pairs[0]));
        assert_eq!(vec!["KH"], codes(&m.singles));
    }
}
