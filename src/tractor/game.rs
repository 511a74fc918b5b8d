//! Game management.
//!
//! A game consists of a sequence of [`Round`]s, after each of which the teams
//! climb the rank ladder from two to ace. A team already at ace that climbs
//! again wins the game.

use std::collections::{HashMap, VecDeque};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use super::{
    Action, ActionData, Config, Event, Phase, Rank, Round, RoundConfig, RoundError, RoundSummary,
    Seat, Snapshot, Team,
};

/// A game of tractor.
#[derive(Debug)]
pub struct Game {
    config: Config,
    rng: StdRng,
    /// The current round.
    round: Round,
    /// Each team's rank on the ladder.
    ranks: HashMap<Team, Rank>,
    /// The throne for the next round, once the current one is settled.
    next_throne: Option<Seat>,
    winner: Option<Team>,
    rounds: Vec<RoundSummary>,
    events: VecDeque<Event>,
}

impl Game {
    pub fn new(config: Config) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let round = Round::shuffled(RoundConfig::first(config.bid_countdown_secs), &mut rng);
        Self {
            config,
            rng,
            round,
            ranks: [(Team::NorthSouth, Rank::Two), (Team::EastWest, Rank::Two)].into(),
            next_throne: None,
            winner: None,
            rounds: vec![],
            events: VecDeque::new(),
        }
    }

    /// Returns an immutable reference to the current round.
    pub fn round(&self) -> &Round {
        &self.round
    }

    /// The specified team's rank on the ladder.
    pub fn rank(&self, team: Team) -> Rank {
        self.ranks.get(&team).copied().unwrap_or(Rank::Two)
    }

    /// Returns the winning team, if the game is over.
    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    /// Summaries of the rounds completed so far.
    pub fn rounds(&self) -> &[RoundSummary] {
        &self.rounds
    }

    pub fn snapshot(&self) -> Snapshot {
        self.round.snapshot()
    }

    /// Pops the oldest event from the round, or else from the game.
    pub fn pop_event(&mut self) -> Option<Event> {
        self.round.pop_event().or_else(|| self.events.pop_front())
    }

    /// Applies the specified action. A deal trigger after a finished round
    /// starts the next one.
    pub fn apply_action(&mut self, action: Action) -> Result<(), RoundError> {
        if self.winner.is_some() {
            return Err(RoundError::GameOver);
        }
        if action.data == ActionData::Deal && self.round.phase() == Phase::Finished {
            self.next_round()?;
        }
        self.round.apply_action(action)?;
        self.settle();
        Ok(())
    }

    /// Advances the timed phase of the round.
    pub fn tick(&mut self) {
        self.round.tick();
    }

    /// Settles a pending throw in the round.
    pub fn resolve_throw(&mut self, number: usize) -> bool {
        self.round.resolve_throw(number)
    }

    /// Replaces the finished round with a fresh one.
    pub fn next_round(&mut self) -> Result<(), RoundError> {
        if self.winner.is_some() {
            return Err(RoundError::GameOver);
        }
        let throne = match (self.round.phase(), self.next_throne) {
            (Phase::Finished, Some(throne)) => throne,
            _ => return Err(RoundError::RoundInProgress),
        };
        let config = RoundConfig {
            trump_rank: self.rank(throne.team()),
            throne: Some(throne),
            team_ranks: self.ranks.clone(),
            bid_countdown_secs: self.config.bid_countdown_secs,
        };
        self.round = Round::shuffled(config, &mut self.rng);
        self.next_throne = None;
        Ok(())
    }

    /// Applies the outcome of a finished round to the ladder, once.
    fn settle(&mut self) {
        if self.next_throne.is_some() {
            return;
        }
        let (Some(summary), Some(throne)) = (self.round.summary(), self.round.throne()) else {
            return;
        };
        self.rounds.push(summary);

        let throne_team = throne.team();
        for (team, delta) in [
            (throne_team, summary.throne_rank_delta),
            (throne_team.other(), summary.opposing_rank_delta),
        ] {
            if delta == 0 {
                continue;
            }
            let rank = self.rank(team);
            if rank == Rank::Ace {
                self.winner = Some(team);
            } else {
                self.ranks
                    .insert(team, rank.climb(delta).unwrap_or(Rank::Ace));
            }
        }

        self.next_throne = Some(if summary.throne_cedes {
            throne.next()
        } else {
            throne.teammate()
        });
        info!(
            ?summary,
            north_south = %self.rank(Team::NorthSouth),
            east_west = %self.rank(Team::EastWest),
            "round settled"
        );

        if let Some(team) = self.winner {
            info!(%team, "game over");
            self.round.end_game();
            self.events.push_back(Event::Game(team));
        }
    }
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;

    use super::*;
    use crate::tractor::PlayerError;

    fn play_round(game: &mut Game) {
        game.apply_action(Action::new(Seat::North, ActionData::Deal))
            .unwrap();
        while game.round().timer().is_some() {
            game.tick();
        }
        let throne = game.round().throne().unwrap();
        let bury = game.round().hand(throne)[..8].to_vec();
        game.apply_action(Action::new(throne, ActionData::bury(&bury)))
            .unwrap();
        while game.round().phase() == Phase::Playing {
            let seat = game.round().turn();
            let hand = game.round().hand(seat);
            let card = match game.round().tricks().current() {
                Some(trick) => *hand
                    .iter()
                    .find(|c| c.suit == trick.lead_suit())
                    .unwrap_or(&hand[0]),
                None => hand[0],
            };
            game.apply_action(Action::new(seat, ActionData::play(&[card])))
                .unwrap();
        }
    }

    #[test]
    fn test_ladder() {
        let mut game = Game::new(Config::fast().with_seed(5));
        assert_matches!(
            game.next_round(),
            Err(RoundError::RoundInProgress)
        );

        play_round(&mut game);
        let summary = *game.rounds().last().unwrap();
        let throne = game.round().throne().unwrap();
        let expect = |delta: u8| Rank::Two.climb(delta).unwrap();
        assert_eq!(expect(summary.throne_rank_delta), game.rank(throne.team()));
        assert_eq!(
            expect(summary.opposing_rank_delta),
            game.rank(throne.team().other())
        );

        // The next round is ranked by the new throne's team.
        let next = if summary.throne_cedes {
            throne.next()
        } else {
            throne.teammate()
        };
        game.apply_action(Action::new(Seat::South, ActionData::Deal))
            .unwrap();
        assert_eq!(Some(next), game.round().throne());
        assert_eq!(game.rank(next.team()), game.round().trump().rank);
        assert_eq!(Phase::Dealing, game.round().phase());
    }

    #[test]
    fn test_ace_leaves_ladder() {
        let mut game = Game::new(Config::fast().with_seed(9));
        game.ranks = [(Team::NorthSouth, Rank::Ace), (Team::EastWest, Rank::Ace)].into();
        while game.winner().is_none() {
            play_round(&mut game);
        }
        let winner = game.winner().unwrap();
        assert_eq!(Phase::GameOver, game.round().phase());
        let mut events = vec![];
        while let Some(event) = game.pop_event() {
            events.push(event);
        }
        assert_eq!(Some(&Event::Game(winner)), events.last());
        assert_matches!(
            game.apply_action(Action::new(Seat::North, ActionData::Deal)),
            Err(RoundError::GameOver)
        );
    }

    #[test]
    fn test_ladder_clamps_at_ace() {
        let mut game = Game::new(Config::fast().with_seed(2));
        game.ranks = [(Team::NorthSouth, Rank::King), (Team::EastWest, Rank::King)].into();
        play_round(&mut game);
        for team in [Team::NorthSouth, Team::EastWest] {
            assert!(matches!(game.rank(team), Rank::King | Rank::Ace));
        }
        assert_eq!(None, game.winner());
        assert_matches!(
            game.apply_action(Action::new(Seat::North, ActionData::bid(&[]))),
            Err(RoundError::Player(PlayerError::UnexpectedAction(..)))
        );
    }
}
