//! Robot player

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::memory::VoidMemory;
use super::strategy::{choose_bury, choose_follow, choose_lead, Follow, Lead};
use super::Player;
use crate::tractor::{
    ActionData, ActionType, Card, CardId, ExpectAction, Phase, Rank, Seat, Snapshot,
};

/// Chance of bidding a freshly dealt trump-rank card.
const BID_CHANCE: f64 = 0.3;

#[derive(Debug)]
pub struct Robot {
    seat: Seat,
    rng: StdRng,
    voids: VoidMemory,
    /// Cards seen in our hand this round.
    seen: HashSet<CardId>,
    /// A trump-rank card we've decided to bid.
    bid: Option<Card>,
    /// The phase of the last snapshot observed.
    phase: Phase,
}

impl Robot {
    pub fn new(seat: Seat, seed: u64) -> Self {
        Self {
            seat,
            rng: StdRng::seed_from_u64(seed),
            voids: VoidMemory::default(),
            seen: HashSet::new(),
            bid: None,
            phase: Phase::Ready,
        }
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    fn reset(&mut self) {
        self.voids.clear();
        self.seen.clear();
        self.bid = None;
    }

    /// Considers bidding each newly dealt trump-rank card.
    fn watch_deal(&mut self, snapshot: &Snapshot) {
        for &card in snapshot.hand(self.seat) {
            if !self.seen.insert(card.id) {
                continue;
            }
            let open = snapshot.active_bidder.is_none() && self.bid.is_none();
            if open
                && card.face.rank() == Some(snapshot.trump_rank)
                && (snapshot.trump_rank == Rank::Two || self.rng.gen_bool(BID_CHANCE))
            {
                debug!(target: "tractor::bot", seat = %self.seat, %card, "will bid");
                self.bid = Some(card);
            }
        }
    }

    fn play(&mut self, snapshot: &Snapshot) -> Option<Vec<Card>> {
        let hand = snapshot.hand(self.seat);
        match snapshot.current_trick() {
            Some(trick) => {
                let follow = Follow {
                    seat: self.seat,
                    hand,
                    trick: &trick,
                };
                Some(choose_follow(&follow, &mut self.rng))
            }
            None => {
                let lead = Lead {
                    seat: self.seat,
                    hand,
                    voids: &self.voids,
                };
                choose_lead(&lead, &mut self.rng)
            }
        }
    }
}

impl Player for Robot {
    fn observe(&mut self, snapshot: &Snapshot) {
        // A new round deals straight out of the last one.
        let previous = std::mem::replace(&mut self.phase, snapshot.phase);
        if previous != snapshot.phase && matches!(snapshot.phase, Phase::Ready | Phase::Dealing) {
            self.reset();
        }
        match snapshot.phase {
            Phase::Dealing => self.watch_deal(snapshot),
            Phase::Playing | Phase::Finished => {
                if let Some(trick) = snapshot.trick() {
                    self.voids.observe(&trick);
                }
            }
            _ => (),
        }
    }

    fn decide(&mut self, snapshot: &Snapshot) -> Option<ActionData> {
        match snapshot.phase {
            Phase::Dealing | Phase::Bidding { .. } => {
                let card = self.bid.take()?;
                let held = snapshot.hand(self.seat).iter().any(|c| c.id == card.id);
                (held && snapshot.active_bidder.is_none()).then(|| ActionData::bid(&[card]))
            }
            _ => match snapshot.expect {
                Some(ExpectAction { seat, action }) if seat == self.seat => match action {
                    ActionType::Bury => {
                        let cards = choose_bury(snapshot.hand(self.seat));
                        debug!(target: "tractor::bot", seat = %self.seat, "burying");
                        Some(ActionData::bury(&cards))
                    }
                    ActionType::Play => self.play(snapshot).map(|cards| ActionData::play(&cards)),
                    _ => None,
                },
                _ => None,
            },
        }
    }

    fn rejected(&mut self, message: &str) {
        debug!(target: "tractor::bot", seat = %self.seat, message, "rejected");
    }
}
