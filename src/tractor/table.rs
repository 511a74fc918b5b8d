//! A table of players sharing one room.
//!
//! The table relays each published snapshot to its players, and sends their
//! decisions back to the room after a randomized think time, the way remote
//! clients would.

use std::collections::BTreeMap;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use super::{
    Command, Config, Outbound, Player, Robot, RoomError, RoomId, RoundError, RoundSummary, Rooms,
    Seat, Snapshot, Team,
};

pub struct Table {
    rooms: Rooms,
    room: RoomId,
    rng: StdRng,
    players: BTreeMap<Seat, Box<dyn Player>>,
    /// Decided commands, and when they'll reach the room.
    pending: BTreeMap<Seat, (Duration, Command)>,
    /// When the dealer next presses deal.
    deal_at: Option<Duration>,
    snapshot: Option<Snapshot>,
    summaries: Vec<RoundSummary>,
    winner: Option<Team>,
}

impl Table {
    pub fn new(
        config: Config,
        players: BTreeMap<Seat, Box<dyn Player>>,
    ) -> Result<Self, RoomError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let names = Seat::all_seats().map(|s| format!("{s}"));
        let room = RoomId::from("table");
        let mut rooms = Rooms::new(config);
        rooms.create(room.clone(), names)?;
        let mut table = Self {
            rooms,
            room,
            rng,
            players,
            pending: BTreeMap::new(),
            deal_at: None,
            snapshot: None,
            summaries: vec![],
            winner: None,
        };
        table.deal_at = Some(table.think());
        Ok(table)
    }

    /// Seats a robot in every seat.
    pub fn with_robots(config: Config) -> Result<Self, RoomError> {
        let base = config.seed.unwrap_or_else(rand::random);
        let players = Seat::all_seats()
            .iter()
            .map(|&seat| {
                let robot = Robot::new(seat, base.wrapping_add(1 + seat.index() as u64));
                (seat, Box::new(robot) as Box<dyn Player>)
            })
            .collect();
        Self::new(config, players)
    }

    pub fn rooms(&self) -> &Rooms {
        &self.rooms
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// Summaries of the rounds played so far.
    pub fn summaries(&self) -> &[RoundSummary] {
        &self.summaries
    }

    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    /// Plays until the game is over, or `max_rounds` more rounds are played.
    /// Stops early if nobody has anything left to do.
    pub fn run(&mut self, max_rounds: usize) -> Result<&[RoundSummary], RoomError> {
        let target = self.summaries.len().saturating_add(max_rounds);
        loop {
            self.dispatch();
            if self.winner.is_some() || self.summaries.len() >= target {
                break;
            }

            let action = self
                .pending
                .iter()
                .map(|(&seat, (due, _))| (*due, Some(seat)))
                .chain(self.deal_at.map(|due| (due, None)))
                .min();
            match (action, self.rooms.next_due()) {
                (Some((due, seat)), None) => {
                    self.rooms.advance(due);
                    self.act(seat)?;
                }
                (Some((due, seat)), Some(timer)) if due <= timer => {
                    self.rooms.advance(due);
                    self.act(seat)?;
                }
                (_, Some(timer)) => self.rooms.advance(timer),
                (None, None) => {
                    warn!(room = %self.room, "table stalled");
                    break;
                }
            }
        }
        Ok(&self.summaries)
    }

    fn think(&mut self) -> Duration {
        let ms = self.rng.gen_range(self.rooms.config().bot_think_ms());
        self.rooms.now() + Duration::from_millis(ms)
    }

    /// Sends a pending command to the room. With no seat, it's the dealer.
    fn act(&mut self, seat: Option<Seat>) -> Result<(), RoomError> {
        let (seat, command) = match seat {
            Some(seat) => match self.pending.remove(&seat) {
                Some((_, command)) => (seat, command),
                None => return Ok(()),
            },
            None => {
                self.deal_at = None;
                (Seat::North, Command::DealTrigger)
            }
        };
        match self.rooms.handle(&self.room, seat, command) {
            Err(RoomError::Round(RoundError::Player(_))) => Ok(()),
            result => result,
        }
    }

    /// Lets a player decide, unless it already has a command on the way.
    fn decide(&mut self, seat: Seat) {
        if self.pending.contains_key(&seat) {
            return;
        }
        let (Some(snapshot), Some(player)) = (&self.snapshot, self.players.get_mut(&seat)) else {
            return;
        };
        if let Some(data) = player.decide(snapshot) {
            let due = self.think();
            self.pending.insert(seat, (due, data.into()));
        }
    }

    /// Delivers every outbound message from the room.
    fn dispatch(&mut self) {
        while let Some(out) = self.rooms.pop_outbound() {
            match out {
                Outbound::State { snapshot, .. } => {
                    for player in self.players.values_mut() {
                        player.observe(&snapshot);
                    }
                    self.snapshot = Some(snapshot);
                    for &seat in Seat::all_seats() {
                        self.decide(seat);
                    }
                }
                Outbound::RoundEnd {
                    summary, winner, ..
                } => {
                    info!(
                        round = self.summaries.len() + 1,
                        points = summary.total_points_won,
                        "round over"
                    );
                    self.summaries.push(summary);
                    self.winner = winner;
                    if winner.is_none() {
                        self.deal_at = Some(self.think());
                    }
                }
                Outbound::Error { seat, message, .. } => {
                    if let Some(player) = self.players.get_mut(&seat) {
                        player.rejected(&message);
                    }
                    self.decide(seat);
                }
            }
        }
    }
}
