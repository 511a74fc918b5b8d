//! Card selection for robot players.

use std::cmp::Reverse;
use std::collections::HashSet;

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use super::memory::VoidMemory;
use crate::tractor::card::{BOTTOM_SIZE, OFFSUIT_TRUMP_RANK};
use crate::tractor::decomp::{decompose, find_pairs, find_tractors};
use crate::tractor::trick::{check_follow, check_lead};
use crate::tractor::{Card, CardId, Rank, Seat, Suit, SuitClass, Trick};

/// What a player knows when leading a trick.
pub struct Lead<'a> {
    pub seat: Seat,
    pub hand: &'a [Card],
    pub voids: &'a VoidMemory,
}

impl Lead<'_> {
    fn opponent_void(&self, suit: SuitClass) -> bool {
        self.voids.opponent_void(self.seat, suit)
    }
}

/// What a player knows when following a trick.
pub struct Follow<'a> {
    pub seat: Seat,
    pub hand: &'a [Card],
    pub trick: &'a Trick,
}

type LeadStrategy = fn(&Lead<'_>, &mut StdRng) -> Option<Vec<Card>>;

/// Lead strategies, in order of preference. The first to come up with a play
/// wins.
const LEAD_STRATEGIES: &[(&str, LeadStrategy)] = &[
    ("tractor", lead_tractor),
    ("aces", lead_aces),
    ("face pair", lead_face_pair),
    ("teammate void", lead_teammate_void),
    ("fish trump", lead_fish_trump),
    ("trump pair", lead_trump_pair),
    ("plain pair", lead_plain_pair),
    ("safe suit", lead_safe_suit),
    ("first card", lead_first_card),
];

fn show(cards: &[Card]) -> String {
    cards.iter().join(" ")
}

fn suited(cards: &[Card], suit: SuitClass) -> Vec<Card> {
    cards.iter().filter(|c| c.suit == suit).copied().collect()
}

fn without(cards: &[Card], used: &[Card]) -> Vec<Card> {
    let ids: HashSet<CardId> = used.iter().map(|c| c.id).collect();
    cards
        .iter()
        .filter(|c| !ids.contains(&c.id))
        .copied()
        .collect()
}

fn is_ace(card: &Card) -> bool {
    card.face.rank() == Some(Rank::Ace)
}

fn is_face(card: &Card) -> bool {
    card.face.rank().is_some_and(Rank::is_face)
}

/// Picks the cards to lead with.
pub fn choose_lead(lead: &Lead<'_>, rng: &mut StdRng) -> Option<Vec<Card>> {
    LEAD_STRATEGIES.iter().find_map(|&(name, strategy)| {
        let cards = strategy(lead, rng).filter(|c| check_lead(c).is_ok())?;
        debug!(
            target: "tractor::bot",
            seat = %lead.seat,
            strategy = name,
            cards = %show(&cards),
            "lead"
        );
        Some(cards)
    })
}

fn lead_tractor(lead: &Lead<'_>, _: &mut StdRng) -> Option<Vec<Card>> {
    decompose(lead.hand, true)
        .tractors
        .into_iter()
        .find(|t| t.iter().all(|c| c.rank < OFFSUIT_TRUMP_RANK))
}

fn lead_aces(lead: &Lead<'_>, _: &mut StdRng) -> Option<Vec<Card>> {
    let ace = lead
        .hand
        .iter()
        .find(|c| !c.is_trump() && is_ace(c) && !lead.opponent_void(c.suit))?;
    Some(
        lead.hand
            .iter()
            .filter(|c| c.face == ace.face)
            .copied()
            .collect(),
    )
}

fn lead_face_pair(lead: &Lead<'_>, _: &mut StdRng) -> Option<Vec<Card>> {
    find_pairs(lead.hand)
        .into_iter()
        .find(|p| !p[0].is_trump() && is_face(&p[0]))
        .map(Vec::from)
}

fn lead_teammate_void(lead: &Lead<'_>, _: &mut StdRng) -> Option<Vec<Card>> {
    let teammate = lead.seat.teammate();
    Suit::all_suits()
        .iter()
        .map(|&s| SuitClass::Plain(s))
        .filter(|&s| lead.voids.is_void(teammate, s) && !lead.opponent_void(s))
        .find_map(|s| {
            lead.hand
                .iter()
                .filter(|c| c.suit == s)
                .max_by_key(|c| (c.points, c.rank))
                .map(|c| vec![*c])
        })
}

fn lead_fish_trump(lead: &Lead<'_>, rng: &mut StdRng) -> Option<Vec<Card>> {
    if !rng.gen_bool(0.6) {
        return None;
    }
    lead.hand
        .iter()
        .filter(|c| c.is_trump())
        .min_by_key(|c| c.rank)
        .map(|c| vec![*c])
}

fn lead_trump_pair(lead: &Lead<'_>, rng: &mut StdRng) -> Option<Vec<Card>> {
    if !rng.gen_bool(0.2) {
        return None;
    }
    find_pairs(lead.hand)
        .into_iter()
        .find(|p| p[0].is_trump())
        .map(Vec::from)
}

fn lead_plain_pair(lead: &Lead<'_>, rng: &mut StdRng) -> Option<Vec<Card>> {
    if !rng.gen_bool(0.8) {
        return None;
    }
    find_pairs(lead.hand)
        .into_iter()
        .filter(|p| !p[0].is_trump())
        .max_by_key(|p| p[0].strength())
        .map(Vec::from)
}

fn lead_safe_suit(lead: &Lead<'_>, _: &mut StdRng) -> Option<Vec<Card>> {
    lead.hand
        .iter()
        .find(|c| !lead.opponent_void(c.suit))
        .map(|c| vec![*c])
}

fn lead_first_card(lead: &Lead<'_>, _: &mut StdRng) -> Option<Vec<Card>> {
    lead.hand.first().map(|c| vec![*c])
}

/// Rates how safely a play holds a trick.
fn strength(cards: &[Card], lead: &[Card]) -> u8 {
    let (Some(first), Some(led)) = (cards.first(), lead.first()) else {
        return 0;
    };
    if first.is_trump() && !led.is_trump() {
        return 9;
    }
    match cards {
        [pair, _] if is_face(pair) => 8,
        [_, _] => 5,
        [card] if card.is_trump() && card.rank >= OFFSUIT_TRUMP_RANK => 10,
        [card] if card.is_trump() => 5,
        [card] if is_ace(card) => 9,
        [_] => 4,
        _ => 10,
    }
}

/// Picks the cards to follow with. The result always passes the follow check,
/// falling back to the minimal play.
pub fn choose_follow(follow: &Follow<'_>, rng: &mut StdRng) -> Vec<Card> {
    let trick = follow.trick;
    let (winner, best) = trick.best();
    let played = trick.len();
    let last = played == 3;
    let trump_lead = trick.lead_suit() == SuitClass::Trump;
    let points = trick.points();

    let (tactic, cards) = if played == 1 {
        if !trump_lead || points >= 10 || rng.gen_bool(0.4) {
            ("beat", beat(follow))
        } else {
            ("small", None)
        }
    } else if winner == follow.seat.teammate() {
        if strength(best, trick.lead()) >= 7 || last {
            ("feed", Some(feed(follow)))
        } else if !trump_lead || rng.gen_bool(0.7) {
            ("beat", beat(follow))
        } else {
            ("small", None)
        }
    } else if !last || points >= 10 || rng.gen_bool(0.3) {
        ("beat", beat(follow))
    } else {
        ("small", None)
    };

    let legal = cards.filter(|c| check_follow(c, follow.hand, trick.lead()).is_ok());
    let (tactic, cards) = match legal {
        Some(cards) => (tactic, cards),
        None => ("small", small(follow)),
    };
    debug!(
        target: "tractor::bot",
        seat = %follow.seat,
        tactic,
        cards = %show(&cards),
        "follow"
    );
    cards
}

/// Fills out a shape with the lowest components available: tractors of the
/// given pair counts, then pairs, then singles.
fn fill(
    mut rest: Vec<Card>,
    tractors: &[usize],
    pairs: usize,
    singles: usize,
) -> Option<Vec<Card>> {
    let mut out = vec![];
    for &n in tractors {
        let tractor = find_tractors(&rest, n).into_iter().next()?;
        rest = without(&rest, &tractor);
        out.extend(tractor);
    }
    for _ in 0..pairs {
        let pair = find_pairs(&rest).into_iter().next()?;
        rest = without(&rest, &pair);
        out.extend(pair);
    }
    if rest.len() < singles {
        return None;
    }
    out.extend(
        rest.into_iter()
            .sorted_by_key(|c| (c.points, c.rank))
            .take(singles),
    );
    Some(out)
}

/// Finds the lowest play that takes the lead in the trick. Candidates are
/// drawn from the lead suit, or from trump when out of the lead suit.
fn beat(follow: &Follow<'_>) -> Option<Vec<Card>> {
    let trick = follow.trick;
    let lead = trick.lead();
    let in_suit = suited(follow.hand, trick.lead_suit());
    let pool = if in_suit.is_empty() {
        suited(follow.hand, SuitClass::Trump)
    } else {
        in_suit
    };
    if pool.len() < lead.len() {
        return None;
    }

    let shape = trick.winning_decomposition();
    let mut tractors: Vec<usize> = shape.tractors.iter().map(|t| t.len() / 2).collect();
    let mut pairs = shape.pairs.len();
    let mut singles = shape.singles.len();
    let heads: Vec<Vec<Card>> = if !tractors.is_empty() {
        let n = tractors.remove(0);
        find_tractors(&pool, n)
    } else if pairs > 0 {
        pairs -= 1;
        find_pairs(&pool).into_iter().map(Vec::from).collect()
    } else {
        singles = singles.saturating_sub(1);
        pool.iter()
            .sorted_by_key(|c| c.rank)
            .map(|c| vec![*c])
            .collect()
    };

    heads.into_iter().find_map(|head| {
        let mut play = fill(without(&pool, &head), &tractors, pairs, singles)?;
        play.extend(head);
        (trick.would_win(&play) && check_follow(&play, follow.hand, lead).is_ok()).then_some(play)
    })
}

/// Gives points to a teammate who holds the trick: the highest-point pairs
/// and singles of the lead suit, then high-point cards from elsewhere.
fn feed(follow: &Follow<'_>) -> Vec<Card> {
    let lead = follow.trick.lead();
    let in_suit = suited(follow.hand, follow.trick.lead_suit());
    let generous = |c: &Card| (Reverse(c.points), c.rank);

    let mut chosen: Vec<Card> = find_pairs(&in_suit)
        .into_iter()
        .sorted_by_key(|p| generous(&p[0]))
        .take(find_pairs(lead).len())
        .flatten()
        .collect();
    for pool in [in_suit.as_slice(), follow.hand] {
        let need = lead.len().saturating_sub(chosen.len());
        let more: Vec<Card> = without(pool, &chosen)
            .into_iter()
            .sorted_by_key(generous)
            .take(need)
            .collect();
        chosen.extend(more);
    }
    chosen
}

/// The cheapest legal follow: the lowest pairs and singles of the lead suit,
/// then the lowest cards from elsewhere.
fn small(follow: &Follow<'_>) -> Vec<Card> {
    let lead = follow.trick.lead();
    let in_suit = suited(follow.hand, follow.trick.lead_suit());
    let cheap = |c: &Card| (c.points, c.strength());

    let mut chosen: Vec<Card> = find_pairs(&in_suit)
        .into_iter()
        .sorted_by_key(|p| cheap(&p[0]))
        .take(find_pairs(lead).len())
        .flatten()
        .collect();
    for pool in [in_suit.as_slice(), follow.hand] {
        let need = lead.len().saturating_sub(chosen.len());
        let more: Vec<Card> = without(pool, &chosen)
            .into_iter()
            .sorted_by_key(cheap)
            .take(need)
            .collect();
        chosen.extend(more);
    }
    chosen
}

/// Picks the cards to return to the bottom pile: the least valuable ones.
pub fn choose_bury(hand: &[Card]) -> Vec<Card> {
    hand.iter()
        .copied()
        .sorted_by_key(|c| (c.points, c.strength()))
        .take(BOTTOM_SIZE)
        .collect()
}

#[cfg(test)]
mod test {
    use rand::SeedableRng;

    use super::*;
    use crate::tractor::card::cards;
    use crate::tractor::Trump;

    const TRUMP: Trump = Trump {
        suit: Some(Suit::Spade),
        rank: Rank::Two,
    };

    fn codes(cards: &[Card]) -> Vec<String> {
        cards.iter().map(Card::to_string).collect()
    }

    /// Builds a trick from plays of codes. Ids are unique across the trick
    /// and the hand returned alongside it.
    fn trick_and_hand(plays: &[(Seat, &[&str])], hand: &[&str]) -> (Trick, Vec<Card>) {
        let all: Vec<&str> = plays
            .iter()
            .flat_map(|(_, c)| c.iter().copied())
            .chain(hand.iter().copied())
            .collect();
        let mut all = cards(&all, TRUMP).into_iter();
        let mut plays = plays.iter().map(|(seat, c)| {
            let cards: Vec<Card> = all.by_ref().take(c.len()).collect();
            (*seat, cards)
        });
        let (leader, lead) = plays.next().unwrap();
        let mut trick = Trick::new(0, leader, lead);
        for (seat, cards) in plays {
            trick.play(seat, cards);
        }
        (trick, all.collect())
    }

    #[test]
    fn test_lead_strategies() {
        let mut rng = StdRng::seed_from_u64(1);
        let voids = VoidMemory::default();
        let lead_with = |hand: &[Card], rng: &mut StdRng| {
            let lead = Lead {
                seat: Seat::North,
                hand,
                voids: &voids,
            };
            codes(&choose_lead(&lead, rng).unwrap())
        };

        let hand = cards(&["3H", "3H", "4H", "4H", "AC", "9D"], TRUMP);
        assert_eq!(vec!["3H", "3H", "4H", "4H"], lead_with(&hand, &mut rng));

        // Extreme trump tractors are held back.
        let hand = cards(&["2H", "2H", "2S", "2S", "AC", "9D"], TRUMP);
        assert_eq!(vec!["AC"], lead_with(&hand, &mut rng));

        let hand = cards(&["AC", "AC", "9D"], TRUMP);
        assert_eq!(vec!["AC", "AC"], lead_with(&hand, &mut rng));

        let hand = cards(&["QD", "QD", "9D", "KH"], TRUMP);
        assert_eq!(vec!["QD", "QD"], lead_with(&hand, &mut rng));
    }

    #[test]
    fn test_lead_avoids_voids() {
        let mut rng = StdRng::seed_from_u64(1);
        let c = cards(&["5C", "7C", "3S", "6C", "4D"], TRUMP);
        let mut trick = Trick::new(0, Seat::North, vec![c[0]]);
        trick.play(Seat::East, vec![c[1]]);
        trick.play(Seat::South, vec![c[2]]);
        trick.play(Seat::West, vec![c[3]]);
        let mut voids = VoidMemory::default();
        voids.observe(&trick);

        // West leads; the teammate (East) is fine in clubs, but South, an
        // opponent, is out of them.
        let hand = cards(&["AC", "KD"], TRUMP);
        let lead = Lead {
            seat: Seat::West,
            hand: &hand,
            voids: &voids,
        };
        assert_eq!(vec!["KD"], codes(&choose_lead(&lead, &mut rng).unwrap()));

        // North's teammate is out of clubs, and neither opponent is.
        let hand = cards(&["4C", "KC", "6D"], TRUMP);
        let lead = Lead {
            seat: Seat::North,
            hand: &hand,
            voids: &voids,
        };
        assert_eq!(vec!["KC"], codes(&choose_lead(&lead, &mut rng).unwrap()));
    }

    #[test]
    fn test_strength() {
        let c = cards(&["4H", "3S", "AH", "QH", "QH", "6H", "6H", "2D", "JOKER2"], TRUMP);
        assert_eq!(9, strength(&c[1..2], &c[0..1]));
        assert_eq!(9, strength(&c[2..3], &c[0..1]));
        assert_eq!(8, strength(&c[3..5], &c[3..5]));
        assert_eq!(5, strength(&c[5..7], &c[5..7]));
        assert_eq!(10, strength(&c[3..7], &c[3..7]));
        assert_eq!(10, strength(&c[7..8], &c[7..8]));
        assert_eq!(10, strength(&c[8..9], &c[1..2]));
        assert_eq!(5, strength(&c[1..2], &c[1..2]));
        assert_eq!(4, strength(&c[0..1], &c[0..1]));
    }

    #[test]
    fn test_beat_lowest() {
        let (trick, hand) = trick_and_hand(
            &[(Seat::North, &["9H"]), (Seat::East, &["JH"])],
            &["QH", "AH", "3H", "JOKER2"],
        );
        let follow = Follow {
            seat: Seat::South,
            hand: &hand,
            trick: &trick,
        };
        assert_eq!(vec!["QH"], codes(&beat(&follow).unwrap()));

        let (trick, hand) = trick_and_hand(
            &[(Seat::North, &["9H", "9H"])],
            &["QH", "QH", "3H", "4H", "4H"],
        );
        let follow = Follow {
            seat: Seat::East,
            hand: &hand,
            trick: &trick,
        };
        assert_eq!(vec!["QH", "QH"], codes(&beat(&follow).unwrap()));
    }

    #[test]
    fn test_beat_with_trump() {
        let (trick, hand) = trick_and_hand(&[(Seat::North, &["AH"])], &["5S", "3S", "9C"]);
        let follow = Follow {
            seat: Seat::East,
            hand: &hand,
            trick: &trick,
        };
        assert_eq!(vec!["3S"], codes(&beat(&follow).unwrap()));

        // Holding the lead suit, a trump can't be used.
        let (trick, hand) = trick_and_hand(&[(Seat::North, &["AH"])], &["5S", "3H"]);
        let follow = Follow {
            seat: Seat::East,
            hand: &hand,
            trick: &trick,
        };
        assert_eq!(None, beat(&follow));
    }

    #[test]
    fn test_feed_and_small() {
        let (trick, hand) = trick_and_hand(
            &[(Seat::North, &["7H", "7H"])],
            &["3H", "KH", "10H", "10H", "5C", "4D"],
        );
        let follow = Follow {
            seat: Seat::East,
            hand: &hand,
            trick: &trick,
        };
        assert_eq!(vec!["10H", "10H"], codes(&feed(&follow)));
        assert_eq!(vec!["10H", "10H"], codes(&small(&follow)));

        let (trick, hand) = trick_and_hand(
            &[(Seat::North, &["7H", "8H"])],
            &["3H", "KH", "5C", "4D"],
        );
        let follow = Follow {
            seat: Seat::East,
            hand: &hand,
            trick: &trick,
        };
        assert_eq!(vec!["KH", "3H"], codes(&feed(&follow)));
        assert_eq!(vec!["3H", "KH"], codes(&small(&follow)));

        let (trick, hand) = trick_and_hand(
            &[(Seat::North, &["7H", "8H"])],
            &["3H", "KC", "5C", "4D"],
        );
        let follow = Follow {
            seat: Seat::East,
            hand: &hand,
            trick: &trick,
        };
        assert_eq!(vec!["3H", "KC"], codes(&feed(&follow)));
        assert_eq!(vec!["3H", "4D"], codes(&small(&follow)));
    }

    #[test]
    fn test_follow_is_legal() {
        let mut rng = StdRng::seed_from_u64(3);
        let (trick, hand) = trick_and_hand(
            &[(Seat::North, &["7H", "7H"]), (Seat::East, &["3H", "4H"])],
            &["5H", "5H", "KC", "AH", "2S"],
        );
        for _ in 0..20 {
            let follow = Follow {
                seat: Seat::South,
                hand: &hand,
                trick: &trick,
            };
            let cards = choose_follow(&follow, &mut rng);
            assert_eq!(Ok(()), check_follow(&cards, &hand, trick.lead()));
        }
    }

    #[test]
    fn test_bury_lowest() {
        let hand = cards(
            &["5H", "KH", "3C", "4C", "6D", "7D", "8D", "9D", "JD", "JOKER2", "3S"],
            TRUMP,
        );
        assert_eq!(
            vec!["3C", "4C", "6D", "7D", "8D", "9D", "JD", "3S"],
            codes(&choose_bury(&hand))
        );
    }
}
