//! Configuration errors.

use thiserror::Error;

/// Reasons a [`MatchConfig`](crate::config::MatchConfig) is rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A miss-rate range has its bounds inverted.
    #[error("{field}: miss range low {low} exceeds high {high}")]
    InvalidMissRange {
        /// Config field holding the range.
        field: &'static str,
        /// Lower bound as given.
        low: u32,
        /// Upper bound as given.
        high: u32,
    },

    /// A miss-rate bound is not a percentage.
    #[error("{field}: miss rate {high} is above 100 percent")]
    MissRateAbovePercent {
        /// Config field holding the range.
        field: &'static str,
        /// Offending upper bound.
        high: u32,
    },

    /// Every attack under this range misses, so no match could end.
    #[error("{field}: miss range starting at {low} never lets an attack land")]
    AlwaysMisses {
        /// Config field holding the range.
        field: &'static str,
        /// Lower bound as given.
        low: u32,
    },

    /// Combatants would start already defeated.
    #[error("starting hp must be positive, got {0}")]
    NonPositiveHp(i32),

    /// The config source is not valid JSON for a match config.
    #[error("failed to parse match config: {0}")]
    Parse(#[from] serde_json::Error),
}
