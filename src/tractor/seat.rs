//! Table position.

use std::{convert::TryFrom, fmt::Display};

use serde::{Deserialize, Serialize};

/// Table position, represented as cardinal direction. Seat order is fixed
/// for the whole game, and play always proceeds clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Seat {
    North,
    East,
    South,
    West,
}
impl Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Seat::North => "North",
            Seat::East => "East",
            Seat::South => "South",
            Seat::West => "West",
        })
    }
}

impl TryFrom<char> for Seat {
    type Error = ();

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Ok(match c {
            'N' | 'n' => Seat::North,
            'E' | 'e' => Seat::East,
            'S' | 's' => Seat::South,
            'W' | 'w' => Seat::West,
            _ => return Err(()),
        })
    }
}

impl Seat {
    /// All table positions, in turn order.
    pub fn all_seats() -> &'static [Seat; 4] {
        static SEATS: [Seat; 4] = [Seat::North, Seat::East, Seat::South, Seat::West];
        &SEATS
    }

    /// Position of this seat in turn order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The team for this table position.
    pub fn team(self) -> Team {
        Team::from(self)
    }

    /// The partner sitting across the table.
    pub fn teammate(self) -> Seat {
        self.next().next()
    }

    /// The next table position in turn order.
    pub fn next(self) -> Seat {
        Seat::all_seats()[(self.index() + 1) % 4]
    }

    /// This seat followed by the other three, in turn order.
    pub fn order_from(self) -> [Seat; 4] {
        let second = self.next();
        let third = second.next();
        [self, second, third, third.next()]
    }

    /// The two seats on the other team.
    pub fn opponents(self) -> [Seat; 2] {
        [self.next(), self.teammate().next()]
    }
}

/// A team consists of the two seats opposite one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    NorthSouth,
    EastWest,
}
impl From<Seat> for Team {
    fn from(value: Seat) -> Self {
        match value {
            Seat::North | Seat::South => Team::NorthSouth,
            Seat::East | Seat::West => Team::EastWest,
        }
    }
}
impl Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Team::NorthSouth => "North/South",
            Team::EastWest => "East/West",
        })
    }
}
impl Team {
    /// The other team.
    pub fn other(self) -> Team {
        match self {
            Team::NorthSouth => Team::EastWest,
            Team::EastWest => Team::NorthSouth,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_turn_order() {
        assert_eq!(
            [Seat::West, Seat::North, Seat::East, Seat::South],
            Seat::West.order_from()
        );
        assert_eq!(Seat::South, Seat::North.teammate());
        assert_eq!(Seat::West, Seat::East.teammate());
        assert_eq!([Seat::South, Seat::North], Seat::East.opponents());
        for &seat in Seat::all_seats() {
            assert_eq!(seat.team(), seat.teammate().team());
            assert_ne!(seat.team(), seat.next().team());
        }
    }
}
