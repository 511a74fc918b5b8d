//! The game of tractor, also known as sheng ji.

mod action;
mod card;
mod config;
mod decomp;
mod error;
mod game;
mod player;
mod room;
mod round;
mod seat;
mod table;
mod trick;
pub use self::action::{Action, ActionData, ActionType, ExpectAction};
pub use self::card::{Card, CardId, Deck, Rank, Suit, SuitClass, Trump};
pub use self::config::Config;
pub use self::error::{PlayerError, RoundError};
pub use self::game::Game;
pub use self::player::{Player, Robot};
pub use self::room::{Command, Outbound, RoomError, RoomId, Rooms};
pub use self::round::{Phase, Round, RoundConfig, RoundSummary, Snapshot, Timer};
pub use self::seat::{Seat, Team};
pub use self::table::Table;
pub use self::trick::Trick;

/// An event that occurs during the game.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A card was dealt from the stock.
    Dealt(Seat, Card),
    /// A seat bid for trump.
    Bid(Seat, Vec<Card>),
    /// Seconds left before bidding closes.
    Countdown(u32),
    /// A card from the bottom pile was revealed.
    Revealed(Card),
    /// Bidding closed, and the trump was fixed.
    TrumpFixed(Trump),
    /// The throne picked up the bottom pile.
    BottomPile(Seat),
    /// The throne buried a new bottom pile.
    Buried(Seat),
    /// A seat led or followed.
    Played(Seat, Vec<Card>),
    /// A throw failed, and was replaced with one of its components.
    ThrowCorrected(Seat, Vec<Card>),
    /// The trick is over.
    Trick { winner: Seat, points: u32 },
    /// The round is over.
    Round(RoundSummary),
    /// The game is over.
    Game(Team),
}
