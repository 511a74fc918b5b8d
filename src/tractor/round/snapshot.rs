//! Public state of a round.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Phase, Round};
use crate::tractor::{Card, ExpectAction, Rank, Seat, Suit, Trick};

/// A snapshot of the public state of a round, as published to every seat
/// after each change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub hands: BTreeMap<Seat, Vec<Card>>,
    pub turn: Seat,
    pub seat_order: [Seat; 4],
    pub play_zones: BTreeMap<Seat, Vec<Card>>,
    pub trick_winner: Option<Seat>,
    pub points_won_this_trick: u32,
    pub active_bid: Vec<Card>,
    pub active_bidder: Option<Seat>,
    pub trump_suit: Option<Suit>,
    pub trump_rank: Rank,
    pub phase: Phase,
    pub throne_seat: Option<Seat>,
    pub throne_teammate_seat: Option<Seat>,
    pub team_rank: BTreeMap<Seat, Rank>,
    pub trick_starter: Option<Seat>,
    /// The seat expected to bury or play next.
    pub expect: Option<ExpectAction>,
    /// Zero-based number of the trick in play, or of the last trick.
    pub trick_number: Option<usize>,
    /// Points taken by the defenders so far.
    pub total_points_won: u32,
}

impl From<&Round> for Snapshot {
    fn from(round: &Round) -> Self {
        let seats = Seat::all_seats();
        let last = round.tricks().last();
        Snapshot {
            hands: seats
                .iter()
                .map(|&s| (s, round.hand(s).to_vec()))
                .collect(),
            turn: round.turn(),
            seat_order: *seats,
            play_zones: round.play_zones(),
            trick_winner: last.map(|t| t.best().0),
            points_won_this_trick: round.points_won_this_trick(),
            active_bid: round.bid().map(|b| b.cards.clone()).unwrap_or_default(),
            active_bidder: round.bid().map(|b| b.bidder),
            trump_suit: round.trump_suit(),
            trump_rank: round.trump().rank,
            phase: round.phase(),
            throne_seat: round.throne(),
            throne_teammate_seat: round.throne().map(Seat::teammate),
            team_rank: seats.iter().map(|&s| (s, round.team_rank(s))).collect(),
            trick_starter: round.trick_starter(),
            expect: round.next_action(),
            trick_number: last.map(|t| t.number),
            total_points_won: round.points_won(),
        }
    }
}

impl Snapshot {
    pub fn hand(&self, seat: Seat) -> &[Card] {
        self.hands.get(&seat).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn play_zone(&self, seat: Seat) -> &[Card] {
        self.play_zones
            .get(&seat)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Rebuilds the trick laid out in the play zones, which may be complete.
    pub fn trick(&self) -> Option<Trick> {
        if !matches!(self.phase, Phase::Playing | Phase::Finished) {
            return None;
        }
        let starter = self.trick_starter?;
        let mut plays = starter
            .order_from()
            .into_iter()
            .map(|s| (s, self.play_zone(s)))
            .take_while(|(_, cards)| !cards.is_empty());
        let (leader, lead) = plays.next()?;
        let mut trick = Trick::new(self.trick_number.unwrap_or_default(), leader, lead.to_vec());
        for (seat, cards) in plays {
            trick.play(seat, cards.to_vec());
        }
        Some(trick)
    }

    /// The trick in play, unless the next play is a lead.
    pub fn current_trick(&self) -> Option<Trick> {
        self.trick().filter(|t| !t.is_complete())
    }
}
