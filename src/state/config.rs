//! Game configuration.
//!
//! Board dimensions, the largest randomly spawned value, and the animation
//! window used to defer merge completion and end-of-move.

use serde::{Deserialize, Serialize};

/// Default board side length.
pub const DEFAULT_GRID_SIZE: usize = 4;

/// Default largest value a spawned tile may have.
pub const DEFAULT_MAX_SPAWN_VALUE: u32 = 4;

/// Default animation window (100 ms).
pub const DEFAULT_ANIMATION_DELAY_MS: i64 = 100;

/// Longest supported animation window (one minute).
pub const MAX_ANIMATION_DELAY_MS: i64 = 60_000;

/// Smallest supported board side length.
pub const MIN_GRID_SIZE: usize = 2;

/// Largest supported board side length.
pub const MAX_GRID_SIZE: usize = 16;

/// Value of the very first tile of a session.
pub const INITIAL_SPAWN_VALUE: u32 = 2;

/// Largest value the spawner will ever produce (2^9).
pub const SPAWN_VALUE_CAP: u32 = 512;

/// Session configuration.
///
/// Deserializing goes through [`Configuration::validate`], so a
/// `Configuration` value is always within the supported ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConfiguration")]
pub struct Configuration {
    /// Board is `grid_size` x `grid_size`
    grid_size: usize,

    /// Upper bound (inclusive) for randomly spawned values
    max_spawn_value: u32,

    /// Delay before merges complete and the move ends
    animation_delay_ms: i64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            max_spawn_value: DEFAULT_MAX_SPAWN_VALUE,
            animation_delay_ms: DEFAULT_ANIMATION_DELAY_MS,
        }
    }
}

/// Unvalidated wire form; missing fields take their defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawConfiguration {
    grid_size: usize,
    max_spawn_value: u32,
    animation_delay_ms: i64,
}

impl Default for RawConfiguration {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            max_spawn_value: DEFAULT_MAX_SPAWN_VALUE,
            animation_delay_ms: DEFAULT_ANIMATION_DELAY_MS,
        }
    }
}

impl TryFrom<RawConfiguration> for Configuration {
    type Error = ConfigError;

    fn try_from(raw: RawConfiguration) -> Result<Self, Self::Error> {
        let config = Self {
            grid_size: raw.grid_size,
            max_spawn_value: raw.max_spawn_value,
            animation_delay_ms: raw.animation_delay_ms,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Configuration {
    /// Create a validated configuration with the default animation delay.
    pub fn new(grid_size: usize, max_spawn_value: u32) -> Result<Self, ConfigError> {
        let config = Self {
            grid_size,
            max_spawn_value,
            animation_delay_ms: DEFAULT_ANIMATION_DELAY_MS,
        };
        config.validate()?;
        Ok(config)
    }

    /// Override the animation delay, clamped to `0..=MAX_ANIMATION_DELAY_MS`.
    pub fn with_animation_delay(mut self, delay: chrono::Duration) -> Self {
        self.animation_delay_ms = delay
            .num_milliseconds()
            .clamp(0, MAX_ANIMATION_DELAY_MS);
        self
    }

    /// Parse and validate a configuration from JSON.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let raw: RawConfiguration =
            serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::try_from(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&self.grid_size) {
            return Err(ConfigError::GridSizeOutOfRange(self.grid_size));
        }

        if !self.max_spawn_value.is_power_of_two() {
            return Err(ConfigError::SpawnValueNotPowerOfTwo(self.max_spawn_value));
        }

        if !(INITIAL_SPAWN_VALUE..=SPAWN_VALUE_CAP).contains(&self.max_spawn_value) {
            return Err(ConfigError::SpawnValueOutOfRange(self.max_spawn_value));
        }

        if !(0..=MAX_ANIMATION_DELAY_MS).contains(&self.animation_delay_ms) {
            return Err(ConfigError::AnimationDelayOutOfRange(self.animation_delay_ms));
        }

        Ok(())
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn max_spawn_value(&self) -> u32 {
        self.max_spawn_value
    }

    pub fn cell_count(&self) -> usize {
        self.grid_size * self.grid_size
    }

    pub fn animation_delay(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.animation_delay_ms)
    }

    /// Copy with a different grid size, validated.
    pub fn with_grid_size(self, grid_size: usize) -> Result<Self, ConfigError> {
        let config = Self { grid_size, ..self };
        config.validate()?;
        Ok(config)
    }

    /// Copy with a different max spawn value, validated.
    pub fn with_max_spawn_value(self, max_spawn_value: u32) -> Result<Self, ConfigError> {
        let config = Self {
            max_spawn_value,
            ..self
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "grid_size": self.grid_size,
            "max_spawn_value": self.max_spawn_value,
            "animation_delay_ms": self.animation_delay_ms
        })
    }
}

/// Powers of two from 2 up to `max` inclusive, capped at [`SPAWN_VALUE_CAP`].
pub fn spawn_values(max: u32) -> Vec<u32> {
    (1..=SPAWN_VALUE_CAP.trailing_zeros())
        .map(|exp| 1u32 << exp)
        .take_while(|value| *value <= max)
        .collect()
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    GridSizeOutOfRange(usize),
    SpawnValueNotPowerOfTwo(u32),
    SpawnValueOutOfRange(u32),
    AnimationDelayOutOfRange(i64),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GridSizeOutOfRange(n) => write!(
                f,
                "Grid size {} outside supported range {}..={}",
                n, MIN_GRID_SIZE, MAX_GRID_SIZE
            ),
            Self::SpawnValueNotPowerOfTwo(v) => {
                write!(f, "Max spawn value {} is not a power of two", v)
            }
            Self::SpawnValueOutOfRange(v) => write!(
                f,
                "Max spawn value {} outside supported range {}..={}",
                v, INITIAL_SPAWN_VALUE, SPAWN_VALUE_CAP
            ),
            Self::AnimationDelayOutOfRange(ms) => write!(
                f,
                "Animation delay {} ms outside supported range 0..={}",
                ms, MAX_ANIMATION_DELAY_MS
            ),
            Self::Parse(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_valid() {
        let config = Configuration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_size(), 4);
        assert_eq!(config.max_spawn_value(), 4);
        assert_eq!(config.cell_count(), 16);
        assert_eq!(config.animation_delay(), chrono::Duration::milliseconds(100));
    }

    #[test]
    fn test_new_rejects_bad_values() {
        assert_eq!(
            Configuration::new(1, 4),
            Err(ConfigError::GridSizeOutOfRange(1))
        );
        assert_eq!(
            Configuration::new(4, 6),
            Err(ConfigError::SpawnValueNotPowerOfTwo(6))
        );
        assert_eq!(
            Configuration::new(4, 1),
            Err(ConfigError::SpawnValueOutOfRange(1))
        );
        assert_eq!(
            Configuration::new(4, 1024),
            Err(ConfigError::SpawnValueOutOfRange(1024))
        );
        assert!(Configuration::new(6, 8).is_ok());
    }

    #[test]
    fn test_spawn_values() {
        assert_eq!(spawn_values(2), vec![2]);
        assert_eq!(spawn_values(4), vec![2, 4]);
        assert_eq!(spawn_values(32), vec![2, 4, 8, 16, 32]);
        assert_eq!(spawn_values(4096).last(), Some(&SPAWN_VALUE_CAP));
        assert!(spawn_values(1).is_empty());
    }

    #[test]
    fn test_from_json_defaults_missing_fields() {
        let config = Configuration::from_json(r#"{"grid_size": 5}"#).unwrap();
        assert_eq!(config.grid_size(), 5);
        assert_eq!(config.max_spawn_value(), DEFAULT_MAX_SPAWN_VALUE);
    }

    #[test]
    fn test_from_json_validates() {
        let err = Configuration::from_json(r#"{"max_spawn_value": 3}"#).unwrap_err();
        assert_eq!(err, ConfigError::SpawnValueNotPowerOfTwo(3));

        let err = Configuration::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_with_helpers() {
        let config = Configuration::default()
            .with_grid_size(3)
            .unwrap()
            .with_max_spawn_value(8)
            .unwrap()
            .with_animation_delay(chrono::Duration::milliseconds(-5));

        assert_eq!(config.grid_size(), 3);
        assert_eq!(config.max_spawn_value(), 8);
        assert_eq!(config.animation_delay(), chrono::Duration::zero());
        assert!(Configuration::default().with_grid_size(40).is_err());

        let slow = Configuration::default().with_animation_delay(chrono::Duration::days(3));
        assert_eq!(
            slow.animation_delay(),
            chrono::Duration::milliseconds(MAX_ANIMATION_DELAY_MS)
        );
    }

    #[test]
    fn test_from_json_rejects_extreme_delays() {
        let err = Configuration::from_json(&format!(r#"{{"animation_delay_ms": {}}}"#, i64::MAX))
            .unwrap_err();
        assert_eq!(err, ConfigError::AnimationDelayOutOfRange(i64::MAX));

        let err = Configuration::from_json(&format!(r#"{{"animation_delay_ms": {}}}"#, i64::MIN))
            .unwrap_err();
        assert_eq!(err, ConfigError::AnimationDelayOutOfRange(i64::MIN));

        let config = Configuration::from_json(r#"{"animation_delay_ms": 250}"#).unwrap();
        assert_eq!(config.animation_delay(), chrono::Duration::milliseconds(250));
    }

    #[test]
    fn test_serde_deserialize_validates() {
        let result = serde_json::from_str::<Configuration>(r#"{"grid_size": 0}"#);
        assert!(result.is_err());

        let result = serde_json::from_str::<Configuration>(r#"{"animation_delay_ms": -1}"#);
        assert!(result.is_err());

        let config: Configuration = serde_json::from_str(r#"{"grid_size": 6}"#).unwrap();
        assert_eq!(config.grid_size(), 6);
        assert_eq!(config.max_spawn_value(), DEFAULT_MAX_SPAWN_VALUE);
    }

    #[test]
    fn test_serialize_round_trips_through_validation() {
        let config = Configuration::new(5, 16).unwrap();
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<Configuration>(&text).unwrap(), config);
    }
}
