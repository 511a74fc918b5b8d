//! A scripted player, for testing.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::Player;
use crate::tractor::{ActionData, Snapshot};

/// Takes scripted actions, one per decision, and keeps a shared log of the
/// rejections it receives.
#[derive(Debug, Default)]
pub struct ScriptedPlayer {
    actions: VecDeque<ActionData>,
    rejections: Rc<RefCell<Vec<String>>>,
}

impl Player for ScriptedPlayer {
    fn observe(&mut self, _: &Snapshot) {}

    fn decide(&mut self, _: &Snapshot) -> Option<ActionData> {
        self.actions.pop_front()
    }

    fn rejected(&mut self, message: &str) {
        self.rejections.borrow_mut().push(message.to_string());
    }
}

impl ScriptedPlayer {
    pub fn then(mut self, action: ActionData) -> Self {
        self.actions.push_back(action);
        self
    }

    /// The log of rejections, which outlives the player.
    pub fn rejections(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.rejections)
    }
}
