//! Match configuration.
//!
//! [`MatchConfig`] collects the tunable parts of a match: the RNG seed,
//! starting hp, the two miss-rate ranges and the turn-order policy. Every
//! field has a default, so a JSON config only needs the fields it changes.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::{MatchConfig, TurnOrder};
//!
//! let config = MatchConfig::from_json(r#"{ "seed": 7, "turn_order": "random_lead" }"#).unwrap();
//! assert_eq!(config.seed, Some(7));
//! assert_eq!(config.turn_order, TurnOrder::RandomLead);
//! assert_eq!(config.starting_hp, 100);
//! ```

use serde::{Deserialize, Serialize};

use crate::combatant::{AttackIntent, STARTING_HP};
use crate::error::ConfigError;

/// Inclusive miss-rate range in percent.
///
/// Each attack draws a miss rate from this range and then rolls
/// `random_boolean(rate, 100 - rate)` to decide whether it misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissRange {
    /// Lowest miss rate.
    pub low: u32,
    /// Highest miss rate.
    pub high: u32,
}

impl MissRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    /// A range that never misses.
    pub const NEVER: Self = Self::new(0, 0);

    fn validate(self, field: &'static str) -> Result<(), ConfigError> {
        if self.low > self.high {
            return Err(ConfigError::InvalidMissRange {
                field,
                low: self.low,
                high: self.high,
            });
        }
        if self.high > 100 {
            return Err(ConfigError::MissRateAbovePercent {
                field,
                high: self.high,
            });
        }
        if self.low >= 100 {
            return Err(ConfigError::AlwaysMisses {
                field,
                low: self.low,
            });
        }
        Ok(())
    }
}

/// Who moves first within each slot pair of a round.
///
/// Damage is resolved simultaneously, so the order only matters for which
/// combatant consumes which RNG draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOrder {
    /// Team A slot i, then team B slot i.
    #[default]
    Interleaved,
    /// One `random_integer(0, 1)` draw per round picks the leading team.
    RandomLead,
}

/// Tunable match parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// RNG seed. `None` seeds from entropy.
    pub seed: Option<u32>,
    /// Hp of every fresh combatant.
    pub starting_hp: i32,
    /// Miss-rate range for single-target attacks.
    pub single_target_miss: MissRange,
    /// Miss-rate range for area attacks.
    pub area_miss: MissRange,
    /// First-mover policy.
    pub turn_order: TurnOrder,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: None,
            starting_hp: STARTING_HP,
            single_target_miss: MissRange::new(10, 30),
            area_miss: MissRange::new(15, 45),
            turn_order: TurnOrder::Interleaved,
        }
    }
}

impl MatchConfig {
    /// Returns the default config with `seed` set.
    #[must_use]
    pub fn seeded(seed: u32) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Returns a copy with both miss ranges replaced by `range`.
    #[must_use]
    pub const fn with_miss(mut self, range: MissRange) -> Self {
        self.single_target_miss = range;
        self.area_miss = range;
        self
    }

    /// Returns a copy with `starting_hp` replaced.
    #[must_use]
    pub const fn with_starting_hp(mut self, hp: i32) -> Self {
        self.starting_hp = hp;
        self
    }

    /// Returns a copy with `turn_order` replaced.
    #[must_use]
    pub const fn with_turn_order(mut self, turn_order: TurnOrder) -> Self {
        self.turn_order = turn_order;
        self
    }

    /// Returns the miss range that applies to `intent`.
    #[must_use]
    pub const fn miss_range(&self, intent: &AttackIntent) -> MissRange {
        if intent.is_area() {
            self.area_miss
        } else {
            self.single_target_miss
        }
    }

    /// Checks that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `starting_hp` is not positive, or a miss
    /// range is inverted, exceeds 100 percent or can never hit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_hp <= 0 {
            return Err(ConfigError::NonPositiveHp(self.starting_hp));
        }
        self.single_target_miss.validate("single_target_miss")?;
        self.area_miss.validate("area_miss")?;
        Ok(())
    }

    /// Parses a config from JSON and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or the first
    /// validation failure.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{CombatantId, Target};
    use crate::team::TeamId;

    #[test]
    fn default_matches_rules() {
        let config = MatchConfig::default();
        assert_eq!(config.seed, None);
        assert_eq!(config.starting_hp, 100);
        assert_eq!(config.single_target_miss, MissRange::new(10, 30));
        assert_eq!(config.area_miss, MissRange::new(15, 45));
        assert_eq!(config.turn_order, TurnOrder::Interleaved);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_json_is_default() {
        let config = MatchConfig::from_json("{}").unwrap();
        assert_eq!(config, MatchConfig::default());
    }

    #[test]
    fn rejects_inverted_range() {
        let err = MatchConfig::from_json(r#"{ "area_miss": { "low": 50, "high": 20 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidMissRange {
                field: "area_miss",
                low: 50,
                high: 20
            }
        ));
    }

    #[test]
    fn rejects_rate_above_percent() {
        let config = MatchConfig::default().with_miss(MissRange::new(10, 101));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissRateAbovePercent { high: 101, .. })
        ));
    }

    #[test]
    fn rejects_range_that_always_misses() {
        let config = MatchConfig::default().with_miss(MissRange::new(100, 100));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::AlwaysMisses { low: 100, .. })
        ));
    }

    #[test]
    fn rejects_non_positive_hp() {
        let config = MatchConfig::default().with_starting_hp(0);
        assert!(matches!(config.validate(), Err(ConfigError::NonPositiveHp(0))));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            MatchConfig::from_json("{ seed: "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn miss_range_follows_attack_kind() {
        let config = MatchConfig::default();
        let source = CombatantId::new(TeamId::A, 0);
        let single = AttackIntent {
            source,
            damage: 10,
            target: Target::Single(0),
        };
        let area = AttackIntent {
            source,
            damage: 5,
            target: Target::Area,
        };
        assert_eq!(config.miss_range(&single), config.single_target_miss);
        assert_eq!(config.miss_range(&area), config.area_miss);
    }

    #[test]
    fn serializes_turn_order_in_snake_case() {
        let json = serde_json::to_string(&MatchConfig::seeded(3)).unwrap();
        assert!(json.contains(r#""turn_order":"interleaved""#));
        assert!(json.contains(r#""seed":3"#));
    }
}
