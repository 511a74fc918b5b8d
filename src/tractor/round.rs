//! Round management

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt::Display;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::card::{self, shuffled_deck, Face, BOTTOM_SIZE, DECK_SIZE};
use super::trick::{beatable_component, check_follow, check_lead};
use super::{
    Action, ActionData, ActionType, Card, CardId, Deck, Event, ExpectAction, PlayerError, Rank,
    RoundError, Seat, Suit, Team, Trick, Trump,
};

mod bidding;
mod scoring;
mod snapshot;
mod tricks;
pub use bidding::{check_bid, Bid};
pub use scoring::RoundSummary;
pub use snapshot::Snapshot;
pub use tricks::Tricks;


/// The phase of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Waiting for a deal trigger.
    Ready,
    /// Dealing one card per tick. Bids are accepted.
    Dealing,
    /// Counting down to the close of bidding.
    #[serde(rename_all = "camelCase")]
    Bidding { seconds_left: u32 },
    /// Nobody bid, so the bottom pile is revealed one card per tick.
    Revealing,
    /// Waiting for the throne to bury the bottom pile.
    Burying,
    /// Playing tricks.
    Playing,
    /// The round is over.
    Finished,
    /// The game is over.
    GameOver,
}
impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Phase::Ready => "ready",
            Phase::Dealing => "dealing",
            Phase::Bidding { .. } => "bidding",
            Phase::Revealing => "revealing",
            Phase::Burying => "burying",
            Phase::Playing => "playing",
            Phase::Finished => "finished",
            Phase::GameOver => "game over",
        })
    }
}

/// The timed phases, which advance on [`Round::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    Deal,
    BidCountdown,
    Reveal,
}

/// Configuration & initial conditions for a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// The trump rank, which is the throne team's rank.
    pub trump_rank: Rank,
    /// The throne, unless this is the first round of the game.
    pub throne: Option<Seat>,
    /// Each team's rank on the ladder.
    pub team_ranks: HashMap<Team, Rank>,
    /// Seconds that bidding stays open after the deal.
    pub bid_countdown_secs: u32,
}

impl RoundConfig {
    /// The configuration for the first round of a game.
    pub fn first(bid_countdown_secs: u32) -> Self {
        Self {
            trump_rank: Rank::Two,
            throne: None,
            team_ranks: [(Team::NorthSouth, Rank::Two), (Team::EastWest, Rank::Two)].into(),
            bid_countdown_secs,
        }
    }

    fn team_rank(&self, team: Team) -> Rank {
        self.team_ranks.get(&team).copied().unwrap_or(Rank::Two)
    }
}

/// The state machine for a round.
///
/// A round begins in [`Phase::Ready`]. A deal trigger starts the deal, which
/// hands out one card per [`tick`](Round::tick), starting from the throne.
/// Bids are accepted while dealing and during the countdown that follows.
///
/// When bidding closes, the trump suit is taken from the active bid. If nobody
/// bid, the bottom pile is revealed one card per tick instead. Either way, all
/// cards are re-ranked under the final trump, and the throne picks up the
/// bottom pile and buries eight cards.
///
/// Tricks follow, led first by the throne and then by the winner of each
/// trick. Points taken by the defenders accumulate, and the round finishes
/// when the hands are empty.
///
/// Events are queued as the round progresses, and may be drained with
/// [`pop_event`](Round::pop_event).
#[derive(Debug, Clone)]
pub struct Round {
    config: RoundConfig,
    trump: Trump,
    throne: Option<Seat>,
    phase: Phase,
    stock: Deck,
    bottom: Vec<Card>,
    hands: HashMap<Seat, Vec<Card>>,
    bid: Option<Bid>,
    revealed: Vec<Card>,
    reveal_best: Option<(Rank, Suit)>,
    tricks: Tricks,
    turn: Seat,
    pending_throw: Option<usize>,
    summary: Option<RoundSummary>,
    events: VecDeque<Event>,
}

/// Selects cards from a hand by id.
fn select(hand: &[Card], seat: Seat, ids: &[CardId]) -> Result<Vec<Card>, PlayerError> {
    if ids.is_empty() {
        return Err(PlayerError::EmptySelection);
    }
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .map(|&id| {
            if !seen.insert(id) {
                return Err(PlayerError::DuplicateCard(id));
            }
            hand.iter()
                .find(|c| c.id == id)
                .copied()
                .ok_or(PlayerError::CardNotHeld(seat, id))
        })
        .collect()
}

/// Removes cards from a hand.
fn discard(hand: &mut Vec<Card>, cards: &[Card]) {
    hand.retain(|c| !cards.iter().any(|d| d.id == c.id));
}

impl Round {
    /// Creates a new round from a full deck. The last eight cards of the deck
    /// form the bottom pile.
    pub fn new(config: RoundConfig, deck: Deck) -> Result<Self, RoundError> {
        if deck.len() != DECK_SIZE {
            return Err(RoundError::IncompleteDeck);
        }
        let ids: HashSet<CardId> = deck.iter().map(|c| c.id).collect();
        if ids.len() != DECK_SIZE {
            return Err(RoundError::DuplicateCard);
        }

        let trump = Trump::new(None, config.trump_rank);
        let mut stock: Deck = deck.iter().map(|c| c.reparse(trump)).collect();
        let bottom = stock.take(BOTTOM_SIZE);
        let throne = config.throne;
        Ok(Self {
            config,
            trump,
            throne,
            phase: Phase::Ready,
            stock,
            bottom,
            hands: Seat::all_seats().iter().map(|&s| (s, vec![])).collect(),
            bid: None,
            revealed: vec![],
            reveal_best: None,
            tricks: Tricks::default(),
            turn: throne.unwrap_or(Seat::North),
            pending_throw: None,
            summary: None,
            events: VecDeque::new(),
        })
    }

    /// Creates a new round with a shuffled deck.
    pub fn shuffled<R: Rng + ?Sized>(config: RoundConfig, rng: &mut R) -> Self {
        let deck = shuffled_deck(Trump::new(None, config.trump_rank), rng);
        Self::new(config, deck).expect("deck is valid")
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The trump used to rank cards. The suit is unknown until bidding closes.
    pub fn trump(&self) -> Trump {
        self.trump
    }

    /// The trump suit, as currently claimed.
    pub fn trump_suit(&self) -> Option<Suit> {
        match self.phase {
            Phase::Dealing | Phase::Bidding { .. } => self.bid.as_ref().and_then(Bid::suit),
            _ => self.trump.suit,
        }
    }

    /// The throne. Unknown during the first round's bidding.
    pub fn throne(&self) -> Option<Seat> {
        self.throne
    }

    pub fn hand(&self, seat: Seat) -> &[Card] {
        self.hands.get(&seat).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn bottom(&self) -> &[Card] {
        &self.bottom
    }

    pub fn bid(&self) -> Option<&Bid> {
        self.bid.as_ref()
    }

    pub fn tricks(&self) -> &Tricks {
        &self.tricks
    }

    /// The seat expected to play or bury next.
    pub fn turn(&self) -> Seat {
        self.turn
    }

    /// The trick whose throw is awaiting its check, if any.
    pub fn pending_throw(&self) -> Option<usize> {
        self.pending_throw
    }

    /// The outcome of the round, once finished.
    pub fn summary(&self) -> Option<RoundSummary> {
        self.summary
    }

    /// The timer that drives the current phase, if the phase is timed.
    pub fn timer(&self) -> Option<Timer> {
        match self.phase {
            Phase::Dealing => Some(Timer::Deal),
            Phase::Bidding { .. } => Some(Timer::BidCountdown),
            Phase::Revealing => Some(Timer::Reveal),
            _ => None,
        }
    }

    /// Returns the next action required to advance the round, when exactly one
    /// seat may take it.
    pub fn next_action(&self) -> Option<ExpectAction> {
        match self.phase {
            Phase::Burying => Some(ExpectAction::new(self.turn, ActionType::Bury)),
            Phase::Playing => Some(ExpectAction::new(self.turn, ActionType::Play)),
            _ => None,
        }
    }

    /// Pops the oldest event from the queue of events.
    pub fn pop_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// Counts every card, wherever it is.
    pub fn card_count(&self) -> usize {
        self.stock.len()
            + self.bottom.len()
            + self.hands.values().map(Vec::len).sum::<usize>()
            + self.bid.as_ref().map_or(0, |b| b.cards.len())
            + self.revealed.len()
            + self.tricks.card_count()
    }

    /// The cards laid face up in front of each seat.
    pub fn play_zones(&self) -> BTreeMap<Seat, Vec<Card>> {
        let mut zones: BTreeMap<Seat, Vec<Card>> =
            Seat::all_seats().iter().map(|&s| (s, vec![])).collect();
        match self.phase {
            Phase::Dealing | Phase::Bidding { .. } => {
                if let Some(bid) = &self.bid {
                    zones.insert(bid.bidder, bid.cards.clone());
                }
            }
            Phase::Revealing => {
                if let Some(throne) = self.throne {
                    zones.insert(throne, self.revealed.clone());
                }
            }
            _ => {
                if let Some(trick) = self.tricks.last() {
                    for (seat, cards) in trick.plays() {
                        zones.insert(*seat, cards.clone());
                    }
                }
            }
        }
        zones
    }

    /// Points taken by the defenders in the last trick, if it's complete.
    pub fn points_won_this_trick(&self) -> u32 {
        match (self.tricks.last(), self.throne) {
            (Some(trick), Some(throne)) if trick.is_complete() => {
                if trick.best().0.team() == throne.team() {
                    0
                } else {
                    trick.points()
                }
            }
            _ => 0,
        }
    }

    /// Points taken by the defenders so far, not counting the bottom pile.
    pub fn points_won(&self) -> u32 {
        self.throne
            .map_or(0, |t| self.tricks.points_won(t.team().other()))
    }

    /// Marks the end of the game.
    pub fn end_game(&mut self) {
        self.phase = Phase::GameOver;
    }

    /// Applies the specified action.
    pub fn apply_action(&mut self, Action { seat, data }: Action) -> Result<(), RoundError> {
        match data {
            ActionData::Deal => self.deal()?,
            ActionData::Bid { cards } => self.bid_cards(seat, &cards)?,
            ActionData::Bury { cards } => self.bury(seat, &cards)?,
            ActionData::Play { cards } => self.play(seat, &cards)?,
        }
        Ok(())
    }

    /// Starts the deal.
    pub fn deal(&mut self) -> Result<(), PlayerError> {
        if self.phase != Phase::Ready {
            return Err(PlayerError::UnexpectedAction(ActionType::Deal, self.phase));
        }
        info!(trump_rank = %self.trump.rank, throne = ?self.throne, "dealing");
        self.phase = Phase::Dealing;
        Ok(())
    }

    /// Advances the timed phase by one step.
    pub fn tick(&mut self) {
        match self.phase {
            Phase::Dealing => self.deal_card(),
            Phase::Bidding { seconds_left: 0 } => self.close_bidding(),
            Phase::Bidding { seconds_left } => {
                self.phase = Phase::Bidding {
                    seconds_left: seconds_left - 1,
                };
                self.events.push_back(Event::Countdown(seconds_left - 1));
            }
            Phase::Revealing => self.reveal_card(),
            _ => (),
        }
    }

    fn deal_card(&mut self) {
        let dealt = DECK_SIZE - BOTTOM_SIZE - self.stock.len();
        let start = self.throne.unwrap_or(Seat::North);
        if let Some(card) = self.stock.draw() {
            let seat = start.order_from()[dealt % 4];
            self.hands.entry(seat).or_default().push(card);
            self.events.push_back(Event::Dealt(seat, card));
        }
        if self.stock.is_empty() {
            let seconds_left = self.config.bid_countdown_secs;
            self.phase = Phase::Bidding { seconds_left };
            self.events.push_back(Event::Countdown(seconds_left));
        }
    }

    /// Bids for trump.
    pub fn bid_cards(&mut self, seat: Seat, ids: &[CardId]) -> Result<(), PlayerError> {
        if !matches!(self.phase, Phase::Dealing | Phase::Bidding { .. }) {
            return Err(PlayerError::UnexpectedAction(ActionType::Bid, self.phase));
        }
        let cards = select(self.hand(seat), seat, ids)?;
        check_bid(self.bid.as_ref(), seat, &cards, self.trump.rank)?;

        match &mut self.bid {
            Some(active) if active.bidder == seat => active.cards.extend(&cards),
            active => {
                if let Some(old) = active.take() {
                    self.hands.entry(old.bidder).or_default().extend(old.cards);
                }
                *active = Some(Bid {
                    bidder: seat,
                    cards: cards.clone(),
                });
            }
        }
        discard(self.hands.entry(seat).or_default(), &cards);
        debug!(%seat, cards = ?cards.iter().map(Card::to_string).collect::<Vec<_>>(), "bid");
        self.events.push_back(Event::Bid(seat, cards));
        Ok(())
    }

    fn close_bidding(&mut self) {
        let bidder = self.bid.as_ref().map(|b| b.bidder);
        let throne = self.throne.or(bidder).unwrap_or(Seat::North);
        self.throne = Some(throne);
        if let Some(suit) = self.bid.as_ref().map(Bid::suit) {
            self.trump.suit = suit;
            self.finish_bidding();
        } else {
            self.reveal_best = None;
            self.phase = Phase::Revealing;
        }
    }

    fn reveal_card(&mut self) {
        if self.bottom.is_empty() {
            self.trump.suit = self.reveal_best.map(|(_, suit)| suit);
            self.finish_bidding();
            return;
        }
        let card = self.bottom.remove(0);
        self.revealed.push(card);
        self.events.push_back(Event::Revealed(card));
        debug!(%card, "revealed");
        if let Face::RankSuit(rank, suit) = card.face {
            if rank == self.trump.rank {
                self.trump.suit = Some(suit);
                self.finish_bidding();
            } else if self.reveal_best.map_or(true, |(best, _)| rank > best) {
                self.reveal_best = Some((rank, suit));
            }
        }
    }

    /// Returns bids to their owners, re-ranks every card under the final
    /// trump, and hands the bottom pile to the throne.
    fn finish_bidding(&mut self) {
        let throne = self.throne.unwrap_or(Seat::North);
        if let Some(bid) = self.bid.take() {
            self.hands.entry(bid.bidder).or_default().extend(bid.cards);
        }
        self.bottom.append(&mut self.revealed);

        let trump = self.trump;
        for hand in self.hands.values_mut() {
            for card in hand.iter_mut() {
                *card = card.reparse(trump);
            }
        }
        let bottom: Vec<Card> = self.bottom.drain(..).map(|c| c.reparse(trump)).collect();
        self.hands.entry(throne).or_default().extend(bottom);

        info!(trump_suit = ?trump.suit, trump_rank = %trump.rank, %throne, "trump fixed");
        self.events.push_back(Event::TrumpFixed(trump));
        self.events.push_back(Event::BottomPile(throne));
        self.phase = Phase::Burying;
        self.turn = throne;
    }

    /// Buries the bottom pile.
    pub fn bury(&mut self, seat: Seat, ids: &[CardId]) -> Result<(), PlayerError> {
        if self.phase != Phase::Burying {
            return Err(PlayerError::UnexpectedAction(ActionType::Bury, self.phase));
        }
        let throne = self.turn;
        if seat != throne {
            return Err(PlayerError::NotThrone(throne));
        }
        if ids.len() != BOTTOM_SIZE {
            return Err(PlayerError::BuryCount {
                expect: BOTTOM_SIZE,
                actual: ids.len(),
            });
        }
        let cards = select(self.hand(seat), seat, ids)?;
        discard(self.hands.entry(seat).or_default(), &cards);
        debug!(%seat, points = card::points(&cards), "buried");
        self.bottom = cards;
        self.events.push_back(Event::Buried(seat));
        self.phase = Phase::Playing;
        Ok(())
    }

    /// Leads or follows a trick.
    ///
    /// A pending throw check on the current trick is settled before the play
    /// is validated.
    pub fn play(&mut self, seat: Seat, ids: &[CardId]) -> Result<(), PlayerError> {
        if self.phase != Phase::Playing {
            return Err(PlayerError::UnexpectedAction(ActionType::Play, self.phase));
        }
        if seat != self.turn {
            return Err(PlayerError::NotYourTurn(self.turn));
        }
        if let Some(number) = self.pending_throw {
            self.resolve_throw(number);
        }

        let hand = self.hand(seat);
        let cards = select(hand, seat, ids)?;
        match self.tricks.current() {
            None => {
                let decomp = check_lead(&cards)?;
                let number = self.tricks.len();
                if decomp.component_count() > 1 {
                    debug!(%seat, number, "throw pending");
                    self.pending_throw = Some(number);
                }
                self.tricks.push(Trick::new(number, seat, cards.clone()));
            }
            Some(trick) => {
                check_follow(&cards, hand, trick.lead())?;
                if let Some(trick) = self.tricks.last_mut() {
                    trick.play(seat, cards.clone());
                }
            }
        }
        discard(self.hands.entry(seat).or_default(), &cards);
        debug!(%seat, cards = ?cards.iter().map(Card::to_string).collect::<Vec<_>>(), "played");
        self.events.push_back(Event::Played(seat, cards));
        self.turn = seat.next();

        if self.tricks.last().is_some_and(Trick::is_complete) {
            self.end_trick();
        }
        Ok(())
    }

    /// Checks a throw against the other hands, and replaces it with the
    /// smallest beatable component if it fails. Returns true if the throw was
    /// corrected.
    ///
    /// Does nothing unless the specified trick still has a pending throw.
    pub fn resolve_throw(&mut self, number: usize) -> bool {
        if self.pending_throw != Some(number) {
            return false;
        }
        self.pending_throw = None;

        let Some(trick) = self.tricks.current().filter(|t| t.number == number && t.len() == 1)
        else {
            return false;
        };
        let leader = trick.leader();
        let others = Seat::all_seats()
            .iter()
            .filter(|&&s| s != leader)
            .map(|s| self.hand(*s));
        let Some(component) = beatable_component(trick.lead(), others) else {
            debug!(%leader, number, "throw stands");
            return false;
        };

        let Some(trick) = self.tricks.last_mut() else {
            return false;
        };
        let thrown = trick.replace_lead(component.clone());
        let mut returned = thrown;
        discard(&mut returned, &component);
        self.hands.entry(leader).or_default().extend(returned);
        debug!(
            %leader,
            number,
            component = ?component.iter().map(Card::to_string).collect::<Vec<_>>(),
            "throw corrected"
        );
        self.events
            .push_back(Event::ThrowCorrected(leader, component));
        true
    }

    fn end_trick(&mut self) {
        let Some(trick) = self.tricks.last() else {
            return;
        };
        let throne = self.throne.unwrap_or(Seat::North);
        let winner = trick.best().0;
        let points = if winner.team() == throne.team() {
            0
        } else {
            trick.points()
        };
        debug!(%trick, %winner, points, "trick");
        self.events.push_back(Event::Trick { winner, points });
        self.turn = winner;

        if self.hands.values().all(Vec::is_empty) {
            let bottom_points = card::points(&self.bottom);
            let mut total = self.tricks.points_won(throne.team().other());
            if winner.team() != throne.team() {
                total += trick.bottom_multiplier() * bottom_points;
            }
            let summary = RoundSummary::new(bottom_points, total);
            info!(
                total_points_won = total,
                bottom_points,
                throne_cedes = summary.throne_cedes,
                "round over"
            );
            self.summary = Some(summary);
            self.phase = Phase::Finished;
            self.events.push_back(Event::Round(summary));
        }
    }

    /// Returns a snapshot of the public state of the round.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from(self)
    }

    /// The leader of the trick in play, or of the last trick.
    pub fn trick_starter(&self) -> Option<Seat> {
        self.tricks.last().map(Trick::leader).or(self.throne)
    }

    fn team_rank(&self, seat: Seat) -> Rank {
        self.config.team_rank(seat.team())
    }
}
