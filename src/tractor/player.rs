//! Players seated at a table.

use super::{ActionData, Snapshot};

mod memory;
mod robot;
mod strategy;

#[cfg(test)]
mod scripted;
#[cfg(test)]
pub use scripted::ScriptedPlayer;

pub use robot::Robot;

/// A trait that implements a tractor player.
///
/// Players only ever see the published [`Snapshot`]s, the same view a remote
/// client would have.
pub trait Player {
    /// A notification of a snapshot published to every seat.
    fn observe(&mut self, snapshot: &Snapshot);

    /// Chooses the player's next action, given the latest snapshot. Returns
    /// `None` if the player has nothing to do right now.
    fn decide(&mut self, snapshot: &Snapshot) -> Option<ActionData>;

    /// Indicates that the player's last action was rejected.
    fn rejected(&mut self, message: &str);
}
