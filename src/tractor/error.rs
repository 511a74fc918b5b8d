//! Error types

use super::{ActionType, CardId, Phase, Seat, SuitClass};

/// An illegal action. These are raised before any state is changed, and are
/// reported only to the offending seat.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayerError {
    /// The action isn't accepted in the current phase of the round.
    #[error("cannot {0} during {1}")]
    UnexpectedAction(ActionType, Phase),

    /// Another player is expected to play.
    #[error("not your turn, waiting for {0}")]
    NotYourTurn(Seat),

    /// No cards were selected.
    #[error("no cards selected")]
    EmptySelection,

    /// The same card was selected twice.
    #[error("{0} selected more than once")]
    DuplicateCard(CardId),

    /// The player doesn't actually hold the card.
    #[error("{0} does not hold {1}")]
    CardNotHeld(Seat, CardId),

    /// A lead must be made of a single suit.
    #[error("lead cards must all be the same suit")]
    MixedLead,

    /// The follow doesn't have the same number of cards as the lead.
    #[error("must play {0} cards")]
    WrongCount(usize),

    /// The player must follow the lead suit.
    #[error("must follow {0}")]
    MustFollowSuit(SuitClass),

    /// The player must follow pairs with pairs.
    #[error("must follow pairs with pairs in {0}")]
    MustFollowPairs(SuitClass),

    /// The bid isn't one or two matching trump-rank cards or jokers.
    #[error("invalid bid")]
    InvalidBid,

    /// The bid doesn't overturn the active bid.
    #[error("bid does not overturn the active bid")]
    BidTooWeak,

    /// Only the throne may bury the bottom pile.
    #[error("only {0} may bury the bottom pile")]
    NotThrone(Seat),

    /// The bottom pile must be exactly eight cards.
    #[error("must bury exactly {expect} cards, not {actual}")]
    BuryCount { expect: usize, actual: usize },
}

/// A structural problem with the round or game, as opposed to an illegal
/// action by a player.
#[derive(Debug, thiserror::Error)]
pub enum RoundError {
    #[error("deck is missing cards")]
    IncompleteDeck,
    #[error("deck contains duplicate card")]
    DuplicateCard,
    #[error("round is still in progress")]
    RoundInProgress,
    #[error("game over")]
    GameOver,
    #[error(transparent)]
    Player(#[from] PlayerError),
}
