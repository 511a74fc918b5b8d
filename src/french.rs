//! French-suited playing cards, plus the two jokers.

use std::convert::TryFrom;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}
impl Suit {
    /// All suits, in ranking order.
    pub fn all_suits() -> &'static [Suit; 4] {
        static SUITS: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];
        &SUITS
    }

    /// The single-letter code for this suit.
    pub fn to_abbr(self) -> char {
        match self {
            Suit::Club => 'C',
            Suit::Diamond => 'D',
            Suit::Heart => 'H',
            Suit::Spade => 'S',
        }
    }
}
impl TryFrom<char> for Suit {
    type Error = ();

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Ok(match c {
            'C' | 'c' => Suit::Club,
            'D' | 'd' => Suit::Diamond,
            'H' | 'h' => Suit::Heart,
            'S' | 's' => Suit::Spade,
            _ => return Err(()),
        })
    }
}
impl Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_abbr())
    }
}

/// Face rank, in ascending ladder order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}
impl Rank {
    /// All ranks, lowest first. This is also the order of the rank ladder.
    pub fn all_ranks() -> &'static [Rank; 13] {
        static RANKS: [Rank; 13] = [
            Rank::Two,
            Rank::Three,
            Rank::Four,
            Rank::Five,
            Rank::Six,
            Rank::Seven,
            Rank::Eight,
            Rank::Nine,
            Rank::Ten,
            Rank::Jack,
            Rank::Queen,
            Rank::King,
            Rank::Ace,
        ];
        &RANKS
    }

    /// Position on the ladder, where `Two` is zero.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Climbs the ladder by `delta` steps. Returns `None` if that would climb
    /// past the ace.
    pub fn climb(self, delta: u8) -> Option<Rank> {
        Rank::all_ranks()
            .get(self.index() + usize::from(delta))
            .copied()
    }

    /// Point value carried by cards of this rank.
    pub fn points(self) -> u8 {
        match self {
            Rank::Five => 5,
            Rank::Ten | Rank::King => 10,
            _ => 0,
        }
    }

    /// True for the court cards and the ace.
    pub fn is_face(self) -> bool {
        matches!(self, Rank::Jack | Rank::Queen | Rank::King | Rank::Ace)
    }
}
impl Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sym = match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        };
        f.write_str(sym)
    }
}
impl FromStr for Rank {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "2" => Rank::Two,
            "3" => Rank::Three,
            "4" => Rank::Four,
            "5" => Rank::Five,
            "6" => Rank::Six,
            "7" => Rank::Seven,
            "8" => Rank::Eight,
            "9" => Rank::Nine,
            "10" | "T" | "t" => Rank::Ten,
            "J" | "j" => Rank::Jack,
            "Q" | "q" => Rank::Queen,
            "K" | "k" => Rank::King,
            "A" | "a" => Rank::Ace,
            _ => return Err(()),
        })
    }
}

/// The printed face of a card, independent of any trump configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    RankSuit(Rank, Suit),
    SmallJoker,
    BigJoker,
}
impl Face {
    /// All 54 faces of a single deck.
    pub fn all_faces() -> Vec<Face> {
        itertools::iproduct!(Suit::all_suits(), Rank::all_ranks())
            .map(|(&s, &r)| Face::RankSuit(r, s))
            .chain([Face::SmallJoker, Face::BigJoker])
            .collect()
    }

    pub fn is_joker(self) -> bool {
        matches!(self, Face::SmallJoker | Face::BigJoker)
    }

    pub fn rank(self) -> Option<Rank> {
        match self {
            Face::RankSuit(r, _) => Some(r),
            _ => None,
        }
    }

    pub fn suit(self) -> Option<Suit> {
        match self {
            Face::RankSuit(_, s) => Some(s),
            _ => None,
        }
    }
}
impl Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Face::RankSuit(r, s) => write!(f, "{r}{s}"),
            Face::SmallJoker => f.write_str("JOKER1"),
            Face::BigJoker => f.write_str("JOKER2"),
        }
    }
}
impl FromStr for Face {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JOKER1" => return Ok(Face::SmallJoker),
            "JOKER2" => return Ok(Face::BigJoker),
            _ => (),
        }
        let mut chars = s.chars();
        let suit = chars.next_back().ok_or(())?;
        let rank = Rank::from_str(chars.as_str())?;
        Ok(Face::RankSuit(rank, Suit::try_from(suit)?))
    }
}
impl Serialize for Face {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
impl<'de> Deserialize<'de> for Face {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Face::from_str(&s).map_err(|()| serde::de::Error::custom("not a card code"))
    }
}
