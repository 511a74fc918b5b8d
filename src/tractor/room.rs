//! Rooms, each running one game.
//!
//! Every room owns its [`Game`] and its pending timers. Commands for a room
//! are applied one at a time, and every change is published as an
//! [`Outbound`] message. Time is virtual: timers fire as [`Rooms::advance`]
//! moves the clock forward.

use std::collections::{HashMap, VecDeque};
use std::fmt::Display;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{
    Action, ActionData, CardId, Config, Event, Game, RoundError, RoundSummary, Seat, Snapshot,
    Team, Timer,
};

/// Identifies a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);
impl Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("no such room: {0}")]
    NoSuchRoom(RoomId),
    #[error("room already exists: {0}")]
    RoomExists(RoomId),
    #[error(transparent)]
    Round(#[from] RoundError),
}

/// A command sent to a room on behalf of a seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Opens the room, with the names of the players in seat order.
    CreateRound { seats: [String; 4] },
    Bid { cards: Vec<CardId> },
    BuryBottomPile { cards: Vec<CardId> },
    Play { cards: Vec<CardId> },
    /// Starts the deal, or the next round once the last one is finished.
    DealTrigger,
    /// Closes the room.
    DeleteRoom,
}

impl From<ActionData> for Command {
    fn from(data: ActionData) -> Self {
        match data {
            ActionData::Deal => Command::DealTrigger,
            ActionData::Bid { cards } => Command::Bid { cards },
            ActionData::Bury { cards } => Command::BuryBottomPile { cards },
            ActionData::Play { cards } => Command::Play { cards },
        }
    }
}

impl Command {
    fn into_action(self) -> Option<ActionData> {
        Some(match self {
            Command::CreateRound { .. } | Command::DeleteRoom => return None,
            Command::Bid { cards } => ActionData::Bid { cards },
            Command::BuryBottomPile { cards } => ActionData::Bury { cards },
            Command::Play { cards } => ActionData::Play { cards },
            Command::DealTrigger => ActionData::Deal,
        })
    }
}

/// A message published by a room.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outbound {
    /// The state of the round, sent to every seat after each change.
    State { room: RoomId, snapshot: Snapshot },
    /// The outcome of a finished round, and the winner if the game is over.
    RoundEnd {
        room: RoomId,
        summary: RoundSummary,
        winner: Option<Team>,
    },
    /// A rejected command, sent to the offending seat only.
    Error {
        room: RoomId,
        seat: Seat,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    /// Advances a timed phase.
    Tick(Timer),
    /// Settles the throw led into the numbered trick.
    ThrowCheck(usize),
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due: Duration,
    task: Task,
}

#[derive(Debug)]
struct Room {
    id: RoomId,
    names: [String; 4],
    game: Game,
    timers: Vec<Scheduled>,
}

impl Room {
    fn name(&self, seat: Seat) -> &str {
        &self.names[seat.index()]
    }

    fn fire(&mut self, task: Task) -> bool {
        let current = self.game.round().timer();
        match task {
            Task::Tick(timer) if current == Some(timer) => {
                self.game.tick();
                true
            }
            Task::ThrowCheck(number) => self.game.resolve_throw(number),
            _ => false,
        }
    }

    /// Drains game events into outbound messages, and brings the timers in
    /// line with the round. Publishes a snapshot if `changed`, or if any
    /// events were raised.
    fn settle(&mut self, now: Duration, config: &Config, changed: bool) -> Vec<Outbound> {
        let mut raised = false;
        let mut summary = None;
        let mut winner = None;
        while let Some(event) = self.game.pop_event() {
            raised = true;
            match event {
                Event::Round(s) => summary = Some(s),
                Event::Game(team) => winner = Some(team),
                _ => (),
            }
        }

        let mut out = vec![];
        if changed || raised {
            out.push(Outbound::State {
                room: self.id.clone(),
                snapshot: self.game.snapshot(),
            });
        }
        if let Some(summary) = summary {
            out.push(Outbound::RoundEnd {
                room: self.id.clone(),
                summary,
                winner,
            });
        }

        let round = self.game.round();
        let (timer, throw) = (round.timer(), round.pending_throw());
        self.timers.retain(|s| match s.task {
            Task::Tick(t) => Some(t) == timer,
            Task::ThrowCheck(n) => Some(n) == throw,
        });
        if let Some(timer) = timer {
            if !self.timers.iter().any(|s| s.task == Task::Tick(timer)) {
                let interval = match timer {
                    Timer::Deal => config.deal_interval(),
                    Timer::BidCountdown => config.bid_tick(),
                    Timer::Reveal => config.reveal_interval(),
                };
                self.timers.push(Scheduled {
                    due: now + interval,
                    task: Task::Tick(timer),
                });
            }
        }
        if let Some(number) = throw {
            if !self.timers.iter().any(|s| s.task == Task::ThrowCheck(number)) {
                debug!(room = %self.id, number, "throw check scheduled");
                self.timers.push(Scheduled {
                    due: now + config.throw_check(),
                    task: Task::ThrowCheck(number),
                });
            }
        }
        out
    }
}

/// The rooms on a server, with a virtual clock.
#[derive(Debug)]
pub struct Rooms {
    config: Config,
    now: Duration,
    created: u64,
    rooms: HashMap<RoomId, Room>,
    outbox: VecDeque<Outbound>,
}

impl Rooms {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            now: Duration::ZERO,
            created: 0,
            rooms: HashMap::new(),
            outbox: VecDeque::new(),
        }
    }

    /// The virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn game(&self, id: &RoomId) -> Option<&Game> {
        self.rooms.get(id).map(|r| &r.game)
    }

    /// Pops the oldest outbound message.
    pub fn pop_outbound(&mut self) -> Option<Outbound> {
        self.outbox.pop_front()
    }

    /// Opens a room. Each room gets its own seed, derived from the configured
    /// one.
    pub fn create(&mut self, id: RoomId, names: [String; 4]) -> Result<(), RoomError> {
        if self.rooms.contains_key(&id) {
            return Err(RoomError::RoomExists(id));
        }
        let mut config = self.config.clone();
        config.seed = config.seed.map(|s| s.wrapping_add(self.created));
        self.created += 1;

        info!(room = %id, players = ?names, "room created");
        let mut room = Room {
            id: id.clone(),
            names,
            game: Game::new(config),
            timers: vec![],
        };
        let out = room.settle(self.now, &self.config, true);
        self.outbox.extend(out);
        self.rooms.insert(id, room);
        Ok(())
    }

    /// Drops a room, along with its pending timers.
    pub fn delete(&mut self, id: &RoomId) -> Result<(), RoomError> {
        if self.rooms.remove(id).is_none() {
            return Err(RoomError::NoSuchRoom(id.clone()));
        }
        info!(room = %id, "room deleted");
        Ok(())
    }

    /// Applies a command from a seat. Illegal actions are also reported to
    /// the seat as an [`Outbound::Error`].
    pub fn handle(&mut self, id: &RoomId, seat: Seat, command: Command) -> Result<(), RoomError> {
        let action = match command {
            Command::CreateRound { seats } => return self.create(id.clone(), seats),
            Command::DeleteRoom => return self.delete(id),
            command => command.into_action(),
        };
        let room = self
            .rooms
            .get_mut(id)
            .ok_or_else(|| RoomError::NoSuchRoom(id.clone()))?;
        let Some(data) = action else {
            return Ok(());
        };

        let kind = data.action_type();
        let result = room.game.apply_action(Action::new(seat, data));
        let out = room.settle(self.now, &self.config, result.is_ok());
        self.outbox.extend(out);
        if let Err(err) = &result {
            warn!(
                room = %id,
                %seat,
                player = room.name(seat),
                action = %kind,
                %err,
                "command rejected"
            );
            if let RoundError::Player(err) = err {
                self.outbox.push_back(Outbound::Error {
                    room: id.clone(),
                    seat,
                    message: err.to_string(),
                });
            }
        }
        Ok(result?)
    }

    /// The time of the earliest pending timer in any room.
    pub fn next_due(&self) -> Option<Duration> {
        self.rooms
            .values()
            .flat_map(|r| r.timers.iter().map(|s| s.due))
            .min()
    }

    /// Moves the clock forward to `until`, firing every timer that falls due
    /// on the way, in order.
    pub fn advance(&mut self, until: Duration) {
        loop {
            let next = self
                .rooms
                .values()
                .flat_map(|r| r.timers.iter().enumerate().map(move |(i, s)| (s.due, &r.id, i)))
                .filter(|(due, _, _)| *due <= until)
                .min();
            let Some((due, id, index)) = next.map(|(due, id, i)| (due, id.clone(), i)) else {
                break;
            };
            self.now = self.now.max(due);
            let Some(room) = self.rooms.get_mut(&id) else {
                break;
            };
            let task = room.timers.remove(index).task;
            let changed = room.fire(task);
            let out = room.settle(self.now, &self.config, changed);
            self.outbox.extend(out);
        }
        self.now = self.now.max(until);
    }
}
