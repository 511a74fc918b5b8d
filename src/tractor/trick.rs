//! Tricks, and the legality of leads and follows.

use std::fmt::Display;

use serde::Serialize;

use super::decomp::{decompose, decompose_to_match, find_pairs, Decomposition};
use super::{card, Card, PlayerError, Seat, SuitClass};

/// The suit class shared by every card, if there is one.
pub fn common_suit(cards: &[Card]) -> Option<SuitClass> {
    let first = cards.first()?.suit;
    cards.iter().all(|c| c.suit == first).then_some(first)
}

fn min_rank(cards: &[Card]) -> u8 {
    cards.iter().map(|c| c.rank).min().unwrap_or_default()
}

fn max_rank(cards: &[Card]) -> u8 {
    cards.iter().map(|c| c.rank).max().unwrap_or_default()
}

fn count_suit(cards: &[Card], suit: SuitClass) -> usize {
    cards.iter().filter(|c| c.suit == suit).count()
}

/// Validates a lead and returns its decomposition. A lead with more than one
/// component is a throw, which is accepted here and checked separately with
/// [`beatable_component`].
pub fn check_lead(cards: &[Card]) -> Result<Decomposition, PlayerError> {
    if cards.is_empty() {
        return Err(PlayerError::EmptySelection);
    }
    if common_suit(cards).is_none() {
        return Err(PlayerError::MixedLead);
    }
    Ok(decompose(cards, true))
}

/// Validates a follow.
///
/// `hand` is the follower's whole hand, including the cards in `play`.
pub fn check_follow(play: &[Card], hand: &[Card], lead: &[Card]) -> Result<(), PlayerError> {
    let Some(lead_card) = lead.first() else {
        return Ok(());
    };
    if play.len() != lead.len() {
        return Err(PlayerError::WrongCount(lead.len()));
    }

    let suit = lead_card.suit;
    let held = count_suit(hand, suit);
    if count_suit(play, suit) < held.min(lead.len()) {
        return Err(PlayerError::MustFollowSuit(suit));
    }

    let lead_pairs = find_pairs(lead).len();
    if lead_pairs > 0 {
        let in_suit = |pairs: Vec<[Card; 2]>| pairs.iter().filter(|p| p[0].suit == suit).count();
        let played_pairs = in_suit(find_pairs(play));
        let held_pairs = in_suit(find_pairs(hand));
        if played_pairs < held_pairs && played_pairs < lead_pairs {
            return Err(PlayerError::MustFollowPairs(suit));
        }
    }
    Ok(())
}

fn beaten_by(component: &[Card], hand: &[Card], suit: SuitClass) -> bool {
    match component {
        [single] => hand.iter().any(|c| c.suit == suit && c.rank > single.rank),
        [pair, _] => find_pairs(hand)
            .iter()
            .any(|p| p[0].suit == suit && p[0].rank > pair.rank),
        tractor => decompose(hand, true).tractors.iter().any(|t| {
            t[0].suit == suit && t.len() >= tractor.len() && max_rank(t) > max_rank(tractor)
        }),
    }
}

/// Checks a throw against the other hands at the table. If any one hand could
/// beat one of the thrown components, returns the smallest such component,
/// which replaces the throw.
pub fn beatable_component<'a, I>(lead: &[Card], others: I) -> Option<Vec<Card>>
where
    I: IntoIterator<Item = &'a [Card]>,
{
    let suit = common_suit(lead)?;
    let decomp = decompose(lead, true);
    if decomp.component_count() < 2 {
        return None;
    }
    let others: Vec<&[Card]> = others.into_iter().collect();
    decomp
        .components()
        .filter(|comp| others.iter().any(|hand| beaten_by(comp, hand, suit)))
        .min_by_key(|comp| (comp.len(), max_rank(comp)))
        .map(<[Card]>::to_vec)
}

/// Matches a challenging play against the incumbent winner of a trick.
///
/// Returns the challenger's decomposition if it's strictly higher. The
/// challenger must be entirely of the lead suit, or entirely trump, and must
/// have the incumbent's shape.
pub fn challenge(
    cards: &[Card],
    incumbent: &Decomposition,
    lead_suit: SuitClass,
) -> Option<Decomposition> {
    let suit = common_suit(cards)?;
    if suit != lead_suit && suit != SuitClass::Trump {
        return None;
    }
    let matched = decompose_to_match(cards, incumbent)?;
    let higher = match (matched.lead_component(), incumbent.lead_component()) {
        (Some(ours), Some(theirs)) => min_rank(ours) > min_rank(theirs),
        _ => false,
    };
    higher.then_some(matched)
}

/// A trick played during a round.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trick {
    /// Zero-based position of this trick in the round.
    pub number: usize,
    plays: Vec<(Seat, Vec<Card>)>,
    best: usize,
    #[serde(skip)]
    winning: Decomposition,
}

impl Display for Trick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, (seat, cards)) in self.plays.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{seat}:")?;
            for (j, card) in cards.iter().enumerate() {
                if j != 0 {
                    write!(f, " ")?;
                }
                write!(f, "{card}")?;
            }
        }
        write!(f, "]")
    }
}

impl Trick {
    /// Opens a new trick with the specified lead.
    pub fn new(number: usize, leader: Seat, lead: Vec<Card>) -> Self {
        let winning = decompose(&lead, true);
        Self {
            number,
            plays: vec![(leader, lead)],
            best: 0,
            winning,
        }
    }

    /// The number of plays made into this trick.
    pub fn len(&self) -> usize {
        self.plays.len()
    }

    /// True when all four seats have played.
    pub fn is_complete(&self) -> bool {
        self.plays.len() == 4
    }

    pub fn plays(&self) -> &[(Seat, Vec<Card>)] {
        &self.plays
    }

    /// The leading seat.
    pub fn leader(&self) -> Seat {
        self.plays[0].0
    }

    /// The lead cards.
    pub fn lead(&self) -> &[Card] {
        &self.plays[0].1
    }

    /// The suit class of the lead.
    pub fn lead_suit(&self) -> SuitClass {
        self.plays[0].1[0].suit
    }

    /// The current winning seat and its cards.
    pub fn best(&self) -> (Seat, &[Card]) {
        let (seat, cards) = &self.plays[self.best];
        (*seat, cards)
    }

    /// The decomposition of the current winning play.
    pub fn winning_decomposition(&self) -> &Decomposition {
        &self.winning
    }

    /// Iterates over every card in the trick.
    pub fn cards(&self) -> impl Iterator<Item = &Card> + '_ {
        self.plays.iter().flat_map(|(_, cards)| cards.iter())
    }

    /// The total point value of the cards in the trick.
    pub fn points(&self) -> u32 {
        card::points(self.cards())
    }

    /// True if playing these cards now would take the lead in the trick.
    pub fn would_win(&self, cards: &[Card]) -> bool {
        challenge(cards, &self.winning, self.lead_suit()).is_some()
    }

    /// Plays cards into the trick, and recomputes the winner.
    pub fn play(&mut self, seat: Seat, cards: Vec<Card>) {
        assert!(!self.is_complete());
        self.plays.push((seat, cards));
        self.calculate_winner();
    }

    /// Replaces the lead, returning the cards originally led.
    pub fn replace_lead(&mut self, cards: Vec<Card>) -> Vec<Card> {
        let old = std::mem::replace(&mut self.plays[0].1, cards);
        self.calculate_winner();
        old
    }

    /// The bottom pile multiplier awarded by the current winning play.
    pub fn bottom_multiplier(&self) -> u32 {
        let decomp = decompose(self.best().1, true);
        if let Some(tractor) = decomp.tractors.first() {
            2 * tractor.len() as u32
        } else if !decomp.pairs.is_empty() {
            4
        } else {
            2
        }
    }

    fn calculate_winner(&mut self) {
        let lead_suit = self.lead_suit();
        self.best = 0;
        self.winning = decompose(self.lead(), true);
        for (i, (_, cards)) in self.plays.iter().enumerate().skip(1) {
            if let Some(matched) = challenge(cards, &self.winning, lead_suit) {
                self.best = i;
                self.winning = matched;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;

    use super::*;
    use crate::tractor::card::cards;
    use crate::tractor::{Rank, Suit, Trump};

    fn trump() -> Trump {
        Trump::new(Some(Suit::Spade), Rank::Two)
    }

    fn trick(plays: &[(char, &[&str])]) -> Trick {
        let mut plays = plays.iter().map(|(seat, codes)| {
            let seat = Seat::try_from(*seat).unwrap();
            (seat, cards(codes, trump()))
        });
        let (seat, lead) = plays.next().unwrap();
        let mut trick = Trick::new(0, seat, lead);
        for (seat, cards) in plays {
            trick.play(seat, cards);
        }
        trick
    }

    #[test]
    fn test_check_lead() {
        assert_matches!(check_lead(&[]), Err(PlayerError::EmptySelection));
        let mixed = cards(&["3H", "4D"], trump());
        assert_matches!(check_lead(&mixed), Err(PlayerError::MixedLead));
        // Trump-rank cards and jokers are all one suit.
        let trumps = cards(&["2H", "JOKER1", "5S"], trump());
        let d = check_lead(&trumps).unwrap();
        assert_eq!(3, d.component_count());
    }

    #[test]
    fn test_follow_suit() {
        let lead = cards(&["3H", "3H"], trump());
        let hand = cards(&["5H", "9H", "4C", "KD"], trump());
        assert_matches!(
            check_follow(&[hand[0], hand[2]], &hand, &lead),
            Err(PlayerError::MustFollowSuit(SuitClass::Plain(Suit::Heart)))
        );
        assert_matches!(
            check_follow(&hand[..1], &hand, &lead),
            Err(PlayerError::WrongCount(2))
        );
        assert_eq!(Ok(()), check_follow(&hand[..2], &hand, &lead));

        // Short in the lead suit: play what's held, then anything.
        let hand = cards(&["5H", "4C", "KD"], trump());
        assert_eq!(Ok(()), check_follow(&hand[..2], &hand, &lead));
        assert_matches!(
            check_follow(&hand[1..], &hand, &lead),
            Err(PlayerError::MustFollowSuit(_))
        );
    }

    #[test]
    fn test_follow_pairs() {
        let lead = cards(&["3H", "3H", "7H"], trump());
        let hand = cards(&["5H", "5H", "9H", "JH"], trump());
        assert_matches!(
            check_follow(&hand[1..], &hand, &lead),
            Err(PlayerError::MustFollowPairs(SuitClass::Plain(Suit::Heart)))
        );
        assert_eq!(Ok(()), check_follow(&hand[..3], &hand, &lead));

        // Pairs in other suits don't count.
        let hand = cards(&["5H", "9H", "JH", "4C", "4C"], trump());
        assert_eq!(Ok(()), check_follow(&hand[..3], &hand, &lead));
    }

    #[test]
    fn test_beatable_component() {
        let lead = cards(&["KH", "KH", "AH"], trump());
        let other = cards(&["5H", "QH", "3D"], trump());
        assert_eq!(None, beatable_component(&lead, [other.as_slice()]));

        let other = cards(&["AH", "AH", "3D"], trump());
        let beaten = beatable_component(&lead, [other.as_slice()]).unwrap();
        assert_eq!(2, beaten.len());
        assert_eq!("KH", beaten[0].to_string());

        // The smallest beatable component replaces the throw.
        let lead = cards(&["QH", "QH", "JH"], trump());
        let other = cards(&["AH", "AH"], trump());
        let beaten = beatable_component(&lead, [other.as_slice()]).unwrap();
        assert_eq!(vec!["JH".to_string()], vec![beaten[0].to_string()]);
        assert_eq!(1, beaten.len());

        // A single component isn't a throw.
        let lead = cards(&["3H"], trump());
        assert_eq!(None, beatable_component(&lead, [other.as_slice()]));
    }

    #[test]
    fn test_trump_beats_throw() {
        // A pair of kings and an ace, thrown in hearts.
        let mut t = trick(&[('N', &["KH", "KH", "AH"])]);
        assert!(!t.would_win(&cards(&["3S", "4S", "5S"], trump())));
        assert!(!t.would_win(&cards(&["3S", "3S", "4H"], trump())));
        assert!(t.would_win(&cards(&["3S", "3S", "4S"], trump())));

        t.play(Seat::East, cards(&["3S", "4S", "5S"], trump()));
        assert_eq!(Seat::North, t.best().0);
        t.play(Seat::South, cards(&["3S", "3S", "4S"], trump()));
        assert_eq!(Seat::South, t.best().0);
        assert_eq!(1, t.winning_decomposition().pairs.len());
        t.play(Seat::West, cards(&["6S", "6S", "3D"], trump()));
        assert_eq!(Seat::South, t.best().0);
    }

    #[test]
    fn test_trick_winner() {
        struct Case {
            trick: Trick,
            expect: Seat,
        }

        fn case(plays: &[(char, &[&str])], expect: Seat) -> Case {
            Case {
                trick: trick(plays),
                expect,
            }
        }

        let cases = [
            case(&[('N', &["9H"])], Seat::North),
            case(&[('N', &["9H"]), ('E', &["10H"])], Seat::East),
            case(&[('N', &["9H"]), ('E', &["AD"])], Seat::North),
            case(&[('N', &["AH"]), ('E', &["3S"])], Seat::East),
            case(&[('N', &["AH"]), ('E', &["3S"]), ('S', &["2D"])], Seat::South),
            case(
                &[('N', &["AH"]), ('E', &["JOKER1"]), ('S', &["JOKER1"])],
                Seat::East,
            ),
            // Pairs must be beaten by pairs.
            case(&[('N', &["3H", "3H"]), ('E', &["AH", "KH"])], Seat::North),
            case(&[('N', &["3H", "3H"]), ('E', &["4H", "4H"])], Seat::East),
            case(&[('N', &["3H", "3H"]), ('E', &["4S", "4S"])], Seat::East),
            // A mixed follow never wins.
            case(&[('N', &["3H", "3H"]), ('E', &["4S", "4H"])], Seat::North),
            // Tractors compare by their lowest pair.
            case(
                &[
                    ('W', &["3H", "3H", "4H", "4H"]),
                    ('N', &["5H", "5H", "6H", "6H"]),
                    ('E', &["3S", "3S", "5S", "5S"]),
                ],
                Seat::North,
            ),
        ];
        for case in cases {
            println!("{} -> {:?}", &case.trick, &case.expect);
            assert_eq!(case.expect, case.trick.best().0);
        }
    }

    #[test]
    fn test_bottom_multiplier() {
        assert_eq!(2, trick(&[('N', &["9H"])]).bottom_multiplier());
        assert_eq!(4, trick(&[('N', &["9H", "9H"])]).bottom_multiplier());
        assert_eq!(
            8,
            trick(&[('N', &["9H", "9H", "10H", "10H"])]).bottom_multiplier()
        );
    }

    #[test]
    fn test_replace_lead() {
        let mut t = trick(&[('N', &["3H", "KH"]), ('E', &["4H", "5H"])]);
        assert_eq!(Seat::East, t.best().0);
        let old = t.replace_lead(cards(&["3H"], trump()));
        assert_eq!(2, old.len());
        assert_eq!(1, t.lead().len());
    }
}
