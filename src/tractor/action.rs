//! Actions

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::{Card, CardId, Seat};

/// Types of actions that a player can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    /// Trigger the deal for the next round.
    Deal,
    /// Claim trump with trump-rank cards or jokers.
    Bid,
    /// Bury the bottom pile.
    Bury,
    /// Lead or follow a trick.
    Play,
}
impl Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ActionType::Deal => "deal",
            ActionType::Bid => "bid",
            ActionType::Bury => "bury",
            ActionType::Play => "play",
        })
    }
}

/// The payload for actions that a player can take during the game. Cards are
/// referenced by identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionData {
    Deal,
    Bid { cards: Vec<CardId> },
    Bury { cards: Vec<CardId> },
    Play { cards: Vec<CardId> },
}

impl ActionData {
    /// The type of this action.
    pub fn action_type(&self) -> ActionType {
        match self {
            ActionData::Deal => ActionType::Deal,
            ActionData::Bid { .. } => ActionType::Bid,
            ActionData::Bury { .. } => ActionType::Bury,
            ActionData::Play { .. } => ActionType::Play,
        }
    }

    pub fn bid(cards: &[Card]) -> Self {
        ActionData::Bid {
            cards: cards.iter().map(|c| c.id).collect(),
        }
    }

    pub fn bury(cards: &[Card]) -> Self {
        ActionData::Bury {
            cards: cards.iter().map(|c| c.id).collect(),
        }
    }

    pub fn play(cards: &[Card]) -> Self {
        ActionData::Play {
            cards: cards.iter().map(|c| c.id).collect(),
        }
    }
}

/// The action that the round's state machine expects to happen next, when
/// exactly one seat is allowed to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectAction {
    /// The player expected to take the action.
    pub seat: Seat,
    /// The type of action.
    pub action: ActionType,
}

impl ExpectAction {
    /// Create a new [`ExpectAction`].
    pub fn new(seat: Seat, action: ActionType) -> Self {
        Self { seat, action }
    }
}

/// An action taken by a player during a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The player taking the action.
    pub seat: Seat,
    /// The action payload.
    pub data: ActionData,
}

impl Action {
    /// Create a new [`Action`].
    pub fn new(seat: Seat, data: ActionData) -> Self {
        Self { seat, data }
    }
}
