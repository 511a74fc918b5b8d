//! Tractor cards, ranked under a trump configuration.

use std::fmt::Display;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::deck;
pub use crate::french::{Face, Rank, Suit};

/// Rank of a trump-rank card outside the trump suit.
pub const OFFSUIT_TRUMP_RANK: u8 = 52;
/// Rank of the trump-rank card of the trump suit.
pub const TRUMP_RANK_IN_SUIT: u8 = 53;
/// Rank of the small joker.
pub const SMALL_JOKER: u8 = 54;
/// Rank of the big joker.
pub const BIG_JOKER: u8 = 55;
/// Lowest rank of a trump-suit card that isn't a trump-rank card.
const TRUMP_SUIT_BASE: u8 = 40;

/// Number of cards in the two decks used for a round.
pub const DECK_SIZE: usize = 108;
/// Number of cards set aside as the bottom pile.
pub const BOTTOM_SIZE: usize = 8;

/// The trump configuration for a round.
///
/// The trump rank is known from the start of the round. The trump suit is
/// unknown until bidding closes, and may remain undetermined after a joker
/// bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trump {
    pub suit: Option<Suit>,
    pub rank: Rank,
}

impl Trump {
    pub fn new(suit: Option<Suit>, rank: Rank) -> Self {
        Self { suit, rank }
    }
}

/// Suit classification of a card, with every trump collapsed into one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SuitClass {
    Plain(Suit),
    Trump,
}
impl Display for SuitClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuitClass::Plain(suit) => suit.fmt(f),
            SuitClass::Trump => f.write_str("trump"),
        }
    }
}
impl Serialize for SuitClass {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
impl<'de> Deserialize<'de> for SuitClass {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Suit::try_from(c)
                .map(SuitClass::Plain)
                .map_err(|()| serde::de::Error::custom("not a suit")),
            _ if s == "trump" => Ok(SuitClass::Trump),
            _ => Err(serde::de::Error::custom("not a suit")),
        }
    }
}

/// The comparable attributes of a card under a trump configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranking {
    pub suit: SuitClass,
    pub rank: u8,
    pub points: u8,
}

/// Ranks a card face under the specified trump configuration.
///
/// Plain cards are numbered `suit_index * 13 + rank_index + 1`, where the suit
/// index skips the trump suit and the rank index skips the trump rank. Only
/// twelve rank indices are used per suit, so consecutive plain suits are
/// separated by a gap, and no run of ranks crosses a suit boundary.
pub fn rank_card(face: Face, trump: Trump) -> Ranking {
    let (rank, suit) = match face {
        Face::SmallJoker => return Ranking::trump(SMALL_JOKER, 0),
        Face::BigJoker => return Ranking::trump(BIG_JOKER, 0),
        Face::RankSuit(rank, suit) => (rank, suit),
    };
    let points = rank.points();
    let in_trump_suit = trump.suit == Some(suit);
    if rank == trump.rank {
        let value = if in_trump_suit {
            TRUMP_RANK_IN_SUIT
        } else {
            OFFSUIT_TRUMP_RANK
        };
        return Ranking::trump(value, points);
    }

    let rank_index = Rank::all_ranks()
        .iter()
        .filter(|&&r| r != trump.rank)
        .position(|&r| r == rank)
        .expect("rank is not the trump rank") as u8;
    if in_trump_suit {
        Ranking::trump(TRUMP_SUIT_BASE + rank_index, points)
    } else {
        let suit_index = Suit::all_suits()
            .iter()
            .filter(|&&s| Some(s) != trump.suit)
            .position(|&s| s == suit)
            .expect("suit is not the trump suit") as u8;
        Ranking {
            suit: SuitClass::Plain(suit),
            rank: suit_index * 13 + rank_index + 1,
            points,
        }
    }
}

impl Ranking {
    fn trump(rank: u8, points: u8) -> Self {
        Self {
            suit: SuitClass::Trump,
            rank,
            points,
        }
    }
}

/// Identity of a physical card. Distinct across both decks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CardId(pub u8);
impl Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A tractor card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Physical identity.
    pub id: CardId,
    /// Printed face.
    #[serde(rename = "code")]
    pub face: Face,
    /// Suit class under the current trump.
    pub suit: SuitClass,
    /// Rank under the current trump.
    pub rank: u8,
    /// Point value.
    pub points: u8,
}
impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.face.fmt(f)
    }
}

impl Card {
    /// Creates a new [`Card`], ranked under the specified trump.
    pub fn new(id: CardId, face: Face, trump: Trump) -> Self {
        let Ranking { suit, rank, points } = rank_card(face, trump);
        Self {
            id,
            face,
            suit,
            rank,
            points,
        }
    }

    /// Re-ranks the card under a (possibly refined) trump, keeping its identity.
    pub fn reparse(self, trump: Trump) -> Self {
        Self::new(self.id, self.face, trump)
    }

    pub fn is_trump(self) -> bool {
        self.suit == SuitClass::Trump
    }

    /// Strength used when ordering cards across suits: plain cards count by
    /// face alone, trumps by their rank.
    pub fn strength(self) -> u8 {
        match (self.suit, self.face.rank()) {
            (SuitClass::Plain(_), Some(rank)) => rank.index() as u8 + 1,
            _ => self.rank,
        }
    }
}

/// The two-deck tractor deck.
pub type Deck = deck::Deck<Card>;

/// Builds both decks, ranked under `trump`, in a uniformly random order.
pub fn shuffled_deck<R: Rng + ?Sized>(trump: Trump, rng: &mut R) -> Deck {
    let faces = Face::all_faces();
    let mut deck: Deck = faces
        .iter()
        .chain(faces.iter())
        .enumerate()
        .map(|(id, &face)| Card::new(CardId(id as u8), face, trump))
        .collect();
    deck.shuffle(rng);
    deck
}

/// Sums the point value of the cards.
pub fn points<'a, I: IntoIterator<Item = &'a Card>>(cards: I) -> u32 {
    cards.into_iter().map(|c| u32::from(c.points)).sum()
}

/// Builds cards from codes, with sequential ids. Used by tests.
#[cfg(test)]
pub fn cards(codes: &[&str], trump: Trump) -> Vec<Card> {
    codes
        .iter()
        .enumerate()
        .map(|(i, code)| {
            let face = code.parse().expect("valid code");
            Card::new(CardId(i as u8), face, trump)
        })
        .collect()
}
