//! Timing and seeding configuration.

use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pacing for the timed phases of a round, and for the robots.
///
/// Missing fields take their default values when loaded from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds that bidding stays open once the deal completes.
    pub bid_countdown_secs: u32,
    /// Delay between dealt cards.
    pub deal_interval_ms: u64,
    /// Delay between bid countdown ticks.
    pub bid_tick_ms: u64,
    /// Delay between bottom pile reveals.
    pub reveal_interval_ms: u64,
    /// Delay before a throw is checked against the other hands.
    pub throw_check_ms: u64,
    /// Shortest robot think time.
    pub bot_think_min_ms: u64,
    /// Longest robot think time.
    pub bot_think_max_ms: u64,
    /// Seed for shuffles and robots. Drawn from entropy if unset.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bid_countdown_secs: 5,
            deal_interval_ms: 300,
            bid_tick_ms: 1000,
            reveal_interval_ms: 1000,
            throw_check_ms: 1000,
            bot_think_min_ms: 1500,
            bot_think_max_ms: 2500,
            seed: None,
        }
    }
}

impl Config {
    /// Short timings, for tests and quick self-play.
    pub fn fast() -> Self {
        Self {
            bid_countdown_secs: 1,
            deal_interval_ms: 30,
            reveal_interval_ms: 50,
            bot_think_min_ms: 10,
            bot_think_max_ms: 50,
            ..Self::default()
        }
    }

    /// Parses a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn deal_interval(&self) -> Duration {
        Duration::from_millis(self.deal_interval_ms)
    }

    pub fn bid_tick(&self) -> Duration {
        Duration::from_millis(self.bid_tick_ms)
    }

    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }

    pub fn throw_check(&self) -> Duration {
        Duration::from_millis(self.throw_check_ms)
    }

    /// Bounds on robot think time, in milliseconds.
    pub fn bot_think_ms(&self) -> RangeInclusive<u64> {
        self.bot_think_min_ms..=self.bot_think_max_ms.max(self.bot_think_min_ms)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_json() {
        let config = Config::from_json(r#"{"bid_countdown_secs": 2, "seed": 7}"#).unwrap();
        assert_eq!(2, config.bid_countdown_secs);
        assert_eq!(Some(7), config.seed);
        assert_eq!(Config::default().deal_interval_ms, config.deal_interval_ms);
        assert_eq!(Config::default(), Config::from_json("{}").unwrap());
    }
}
